//! Scanner error types

use thiserror::Error;

use crate::selector::SelectorError;

/// Scanner error type
#[derive(Debug, Error)]
pub enum ScannerError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Collector answered with a non-success status
    #[error("Collector returned HTTP {0}")]
    Status(u16),

    /// Collector answered `{success:false}`
    #[error("Collector rejected report: {0}")]
    Rejected(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid selector configuration
    #[error("Invalid selector: {0}")]
    Selector(#[from] SelectorError),
}

/// Result type for scanner operations
pub type ScannerResult<T> = Result<T, ScannerError>;
