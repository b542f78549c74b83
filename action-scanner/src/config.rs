//! Scanner configuration

use std::time::Duration;

use shared::{PermissionMap, ScannerBootstrap};

/// Default wait before the one-shot collection pass
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(2000);

/// Page scanner configuration, usually built from the server's
/// [`ScannerBootstrap`]
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Run the filter and the collection pass at all
    pub enabled: bool,
    /// Collector endpoint (path or absolute URL)
    pub collect_url: String,
    /// Anti-forgery token forwarded with reports
    pub form_key: Option<String>,
    /// Upper bound on the wait before collecting; an explicit ready
    /// signal cuts it short
    pub settle_delay: Duration,
    /// Permissions for the current session's role
    pub permissions: PermissionMap,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            collect_url: String::new(),
            form_key: None,
            settle_delay: DEFAULT_SETTLE_DELAY,
            permissions: PermissionMap::new(),
        }
    }
}

impl ScannerConfig {
    pub fn new(permissions: PermissionMap) -> Self {
        Self {
            permissions,
            ..Default::default()
        }
    }

    /// Configuration that leaves the page untouched
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn with_collect_url(mut self, url: impl Into<String>) -> Self {
        self.collect_url = url.into();
        self
    }

    pub fn with_form_key(mut self, form_key: impl Into<String>) -> Self {
        self.form_key = Some(form_key.into());
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

impl From<ScannerBootstrap> for ScannerConfig {
    fn from(bootstrap: ScannerBootstrap) -> Self {
        Self {
            enabled: bootstrap.enabled,
            collect_url: bootstrap.collect_url,
            form_key: bootstrap.form_key,
            settle_delay: Duration::from_millis(bootstrap.settle_delay_ms),
            permissions: bootstrap.permissions,
        }
    }
}
