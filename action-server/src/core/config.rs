use crate::acl::ActionSettings;
use crate::auth::JwtConfig;
use crate::discovery::DEFAULT_DISCOVERY_TTL_SECS;

/// 默认扫描等待时间 (毫秒)
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 2000;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 (RUST_LOG 优先) |
/// | LOG_DIR | - | 日志目录 (按天滚动) |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | ORDER_ACTIONS_ENABLED | true | 是否启用动作过滤 |
/// | ORDER_ACTIONS_LIST | - | 逗号分隔的动作 ID，替换内置目录 |
/// | DISCOVERY_TTL_SECS | 86400 | 发现缓存有效期 |
/// | DISCOVERY_DB_PATH | - | redb 文件路径 (未设置则使用内存) |
/// | ROLE_RULES_PATH | - | 角色规则 JSON 文件 |
/// | INSTALLED_MODULES | - | 逗号分隔的已安装模块名 |
/// | SCAN_EXCLUDED_MODULES | - | 扫描时忽略的模块名 |
/// | SCAN_SETTLE_DELAY_MS | 2000 | 页面扫描等待时间 |
///
/// # 示例
///
/// ```ignore
/// HTTP_PORT=8080 ORDER_ACTIONS_LIST=cancel,hold cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | production
    pub environment: String,
    /// 日志级别
    pub log_level: String,
    /// 日志目录
    pub log_dir: Option<String>,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 动作过滤开关与目录覆盖
    pub actions: ActionSettings,
    /// 发现缓存有效期 (秒)
    pub discovery_ttl_secs: u64,
    /// 发现缓存持久化路径
    pub discovery_db_path: Option<String>,
    /// 角色规则文件
    pub role_rules_path: Option<String>,
    /// 已安装模块 (启发式扫描输入)
    pub installed_modules: Vec<String>,
    /// 扫描排除的模块
    pub scan_excluded_modules: Vec<String>,
    /// 页面扫描等待时间 (毫秒)
    pub scan_settle_delay_ms: u64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            http_port: env_parse("HTTP_PORT", 3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: env_opt("LOG_DIR"),
            request_timeout_ms: env_parse("REQUEST_TIMEOUT_MS", 30000),
            jwt: JwtConfig::default(),
            actions: ActionSettings {
                enabled: env_parse("ORDER_ACTIONS_ENABLED", true),
                override_ids: std::env::var("ORDER_ACTIONS_LIST")
                    .map(|raw| ActionSettings::parse_override_list(&raw))
                    .unwrap_or_default(),
            },
            discovery_ttl_secs: env_parse("DISCOVERY_TTL_SECS", DEFAULT_DISCOVERY_TTL_SECS),
            discovery_db_path: env_opt("DISCOVERY_DB_PATH"),
            role_rules_path: env_opt("ROLE_RULES_PATH"),
            installed_modules: env_list("INSTALLED_MODULES"),
            scan_excluded_modules: env_list("SCAN_EXCLUDED_MODULES"),
            scan_settle_delay_ms: env_parse("SCAN_SETTLE_DELAY_MS", DEFAULT_SETTLE_DELAY_MS),
        }
    }

    /// 测试用配置：不读取文件，全部使用内存适配器
    pub fn for_tests(jwt: JwtConfig) -> Self {
        Self {
            http_port: 0,
            environment: "test".into(),
            log_level: "debug".into(),
            log_dir: None,
            request_timeout_ms: 30000,
            jwt,
            actions: ActionSettings::default(),
            discovery_ttl_secs: DEFAULT_DISCOVERY_TTL_SECS,
            discovery_db_path: None,
            role_rules_path: None,
            installed_modules: Vec::new(),
            scan_excluded_modules: Vec::new(),
            scan_settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_list(key: &str) -> Vec<String> {
    std::env::var(key)
        .map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
