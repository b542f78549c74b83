//! Collector endpoint wire format

use serde::{Deserialize, Serialize};

use crate::action::ActionCatalog;

pub const MSG_COLLECTED: &str = "Actions collected successfully.";
pub const MSG_NOTHING_TO_COLLECT: &str = "No actions to collect.";

/// Body posted by the page scanner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectRequest {
    /// Observed actions (id -> label). May be absent.
    #[serde(default)]
    pub actions: Option<ActionCatalog>,
    /// Anti-forgery token; checked by the host, passed through here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_key: Option<String>,
}

impl CollectRequest {
    pub fn new(actions: ActionCatalog) -> Self {
        Self {
            actions: Some(actions),
            form_key: None,
        }
    }

    pub fn with_form_key(mut self, form_key: impl Into<String>) -> Self {
        self.form_key = Some(form_key.into());
        self
    }
}

/// Collector response. Failures travel in the payload, never in the status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl CollectResponse {
    /// Merge succeeded; `count` is the size of the stored catalog
    pub fn collected(count: usize) -> Self {
        Self {
            success: true,
            message: MSG_COLLECTED.to_string(),
            count: Some(count),
        }
    }

    pub fn nothing_to_collect() -> Self {
        Self {
            success: true,
            message: MSG_NOTHING_TO_COLLECT.to_string(),
            count: Some(0),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            count: None,
        }
    }
}
