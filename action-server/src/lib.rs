//! Order Action Server - 订单动作可见性过滤服务端
//!
//! # 架构概述
//!
//! - **权限解析** (`acl`): 按角色生成 `动作 ID -> 是否允许` 表，默认放行
//! - **动作发现** (`discovery`): 共享缓存槽，合并页面上报的动作 ID
//! - **认证** (`auth`): JWT 会话验证与权限中间件
//! - **HTTP API** (`api`): 权限表、目录、扫描器启动参数、上报接口
//!
//! # 模块结构
//!
//! ```text
//! action-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、权限中间件
//! ├── acl/           # 角色规则、权限解析
//! ├── discovery/     # 发现缓存、模块扫描
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误、日志
//! ```

pub mod acl;
pub mod api;
pub mod auth;
pub mod core;
pub mod discovery;
pub mod utils;

// Re-export 公共类型
pub use acl::{ActionSettings, PermissionResolver, RoleGrantLookup, RoleId, StaticRoleRules};
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use discovery::{DiscoveryStore, ExpiringBlobStore, MemoryBlobStore, RedbBlobStore};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::init_logger;

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 加载 .env、读取配置并按配置初始化日志
pub fn setup_environment() -> Config {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    init_logger(&config.log_level, config.log_dir.as_deref());
    config
}
