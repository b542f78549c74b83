//! 动作发现模块
//!
//! - [`DiscoveryStore`] - 共享发现缓存 (合并写入 + 懒加载)
//! - [`ExpiringBlobStore`] - 外部缓存接口 ([`MemoryBlobStore`], [`RedbBlobStore`])
//! - [`ModuleSource`] - 已安装模块列表接口

pub mod modules;
pub mod redb_store;
pub mod service;
pub mod store;

pub use modules::{ModuleSource, StaticModuleList};
pub use redb_store::RedbBlobStore;
pub use service::{DEFAULT_DISCOVERY_TTL_SECS, DISCOVERY_CACHE_KEY, DiscoveryStore};
pub use store::{ExpiringBlobStore, MemoryBlobStore, StoreError, StoreResult, StoredBlob};
