//! Page context handed to the scanner

use serde::{Deserialize, Serialize};

use crate::permission::PermissionMap;

/// Everything the page scanner needs to start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerBootstrap {
    /// Filter switched on for this installation
    pub enabled: bool,
    /// Collector endpoint path or URL
    pub collect_url: String,
    /// Anti-forgery token forwarded with reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_key: Option<String>,
    /// Delay before the one-shot collection pass (milliseconds)
    pub settle_delay_ms: u64,
    /// Permissions for the current session's role
    pub permissions: PermissionMap,
}
