use thiserror::Error;

use crate::acl::RulesError;
use crate::discovery::StoreError;

/// 启动与运行错误
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("发现缓存初始化失败: {0}")]
    Store(#[from] StoreError),

    #[error("角色规则加载失败: {0}")]
    Rules(#[from] RulesError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("内部服务器错误: {0}")]
    Internal(#[from] anyhow::Error),
}

/// 服务器 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
