use std::sync::Arc;

use crate::acl::{PermissionResolver, RoleGrantLookup, StaticRoleRules};
use crate::auth::JwtService;
use crate::core::{Config, Result};
use crate::discovery::{
    DiscoveryStore, ExpiringBlobStore, MemoryBlobStore, ModuleSource, RedbBlobStore,
    StaticModuleList,
};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，每个请求克隆一次。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | jwt_service | JWT 认证服务 |
/// | resolver | 权限解析 (内含发现缓存) |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// JWT 认证服务
    pub jwt_service: Arc<JwtService>,
    /// 订单动作权限解析
    pub resolver: PermissionResolver,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    pub fn new(config: Config, jwt_service: Arc<JwtService>, resolver: PermissionResolver) -> Self {
        Self {
            config,
            jwt_service,
            resolver,
        }
    }

    /// 按配置初始化外部适配器并组装状态
    pub fn initialize(config: &Config) -> Result<Self> {
        let store: Arc<dyn ExpiringBlobStore> = match &config.discovery_db_path {
            Some(path) => {
                tracing::info!(path = %path, "Using redb discovery cache");
                Arc::new(RedbBlobStore::open(path)?)
            }
            None => {
                tracing::info!("Using in-memory discovery cache");
                Arc::new(MemoryBlobStore::new())
            }
        };

        let rules: Arc<dyn RoleGrantLookup> = match &config.role_rules_path {
            Some(path) => {
                let table = StaticRoleRules::load(path)?;
                tracing::info!(path = %path, roles = table.role_count(), "Loaded role rules");
                Arc::new(table)
            }
            None => {
                tracing::warn!("ROLE_RULES_PATH not set, every role resolves to allow-all");
                Arc::new(StaticRoleRules::new())
            }
        };

        let modules: Arc<dyn ModuleSource> =
            Arc::new(StaticModuleList::new(config.installed_modules.clone()));

        Ok(Self::with_adapters(config.clone(), store, rules, modules))
    }

    /// 使用指定适配器组装状态 (测试与嵌入场景)
    pub fn with_adapters(
        config: Config,
        store: Arc<dyn ExpiringBlobStore>,
        rules: Arc<dyn RoleGrantLookup>,
        modules: Arc<dyn ModuleSource>,
    ) -> Self {
        let discovery = DiscoveryStore::new(store, modules)
            .with_ttl_secs(config.discovery_ttl_secs)
            .with_excluded_modules(config.scan_excluded_modules.clone());
        let resolver = PermissionResolver::new(discovery, rules, config.actions.clone());
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Self::new(config, jwt_service, resolver)
    }

    /// 发现缓存
    pub fn discovery(&self) -> &DiscoveryStore {
        self.resolver.discovery()
    }
}
