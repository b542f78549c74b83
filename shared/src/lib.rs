//! Shared types for the order action filter
//!
//! Types used by both the server (`action-server`) and the page scanner
//! (`action-scanner`): action catalogs, permission maps, normalization
//! rules and the collector wire format.

pub mod action;
pub mod bootstrap;
pub mod catalog;
pub mod collect;
pub mod permission;

// Re-exports
pub use action::{ActionCatalog, ActionDescriptor, normalize_action_id, normalize_text_id};
pub use bootstrap::ScannerBootstrap;
pub use catalog::{BUILT_IN_ACTIONS, built_in_catalog, built_in_label};
pub use collect::{CollectRequest, CollectResponse};
pub use permission::{PermissionEntry, PermissionMap};
pub use serde::{Deserialize, Serialize};
