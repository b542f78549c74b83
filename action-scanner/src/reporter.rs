//! Report newly seen actions to the collector endpoint

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use shared::{CollectRequest, CollectResponse};
use tokio::task::JoinHandle;

use crate::config::ScannerConfig;
use crate::error::{ScannerError, ScannerResult};

/// Sink for candidate action reports
#[async_trait]
pub trait ActionReporter: Send + Sync {
    async fn report(&self, request: &CollectRequest) -> ScannerResult<CollectResponse>;
}

/// POSTs reports as JSON to the collector endpoint
#[derive(Debug, Clone)]
pub struct HttpReporter {
    client: Client,
    url: String,
    token: Option<String>,
}

impl HttpReporter {
    /// Reporter for `path` (as found in the bootstrap) under `base_url`.
    /// An absolute `path` is used as is.
    pub fn new(base_url: &str, path: &str) -> Self {
        Self {
            client: Client::new(),
            url: join_url(base_url, path),
            token: None,
        }
    }

    /// Reporter for the collector endpoint named in `config`, or `None`
    /// when the bootstrap carried no endpoint
    pub fn from_config(base_url: &str, config: &ScannerConfig) -> Option<Self> {
        if config.collect_url.trim().is_empty() {
            return None;
        }
        Some(Self::new(base_url, &config.collect_url))
    }

    /// Set the session token sent as `Authorization: Bearer`
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ActionReporter for HttpReporter {
    async fn report(&self, request: &CollectRequest) -> ScannerResult<CollectResponse> {
        let mut builder = self.client.post(&self.url).json(request);
        if let Some(token) = &self.token {
            builder = builder.header(reqwest::header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScannerError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        let body: CollectResponse = serde_json::from_str(&text)?;
        if !body.success {
            return Err(ScannerError::Rejected(body.message));
        }
        Ok(body)
    }
}

/// Send `request` in the background. Failures are logged at debug level
/// and otherwise dropped; there is no retry.
pub fn spawn_report(reporter: Arc<dyn ActionReporter>, request: CollectRequest) -> JoinHandle<()> {
    tokio::spawn(async move {
        match reporter.report(&request).await {
            Ok(response) => {
                tracing::debug!(count = ?response.count, "Order actions reported");
            }
            Err(e) => {
                tracing::debug!(error = %e, "Order action report failed");
            }
        }
    })
}

fn join_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") || base_url.is_empty() {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://admin.local/", "/api/order-actions/collect"),
            "http://admin.local/api/order-actions/collect"
        );
        assert_eq!(
            join_url("http://admin.local", "https://other/collect"),
            "https://other/collect"
        );
        assert_eq!(join_url("", "/collect"), "/collect");
    }

    #[test]
    fn test_http_reporter_url() {
        let reporter = HttpReporter::new("http://admin.local", "api/order-actions/collect")
            .with_token("abc");
        assert_eq!(reporter.url(), "http://admin.local/api/order-actions/collect");
    }

    #[test]
    fn test_reporter_from_config() {
        let config = ScannerConfig::default().with_collect_url("/api/order-actions/collect");
        let reporter = HttpReporter::from_config("http://admin.local", &config).unwrap();
        assert_eq!(reporter.url(), "http://admin.local/api/order-actions/collect");

        assert!(HttpReporter::from_config("http://admin.local", &ScannerConfig::default()).is_none());
    }

    struct FailingReporter {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl ActionReporter for FailingReporter {
        async fn report(&self, _request: &CollectRequest) -> ScannerResult<CollectResponse> {
            *self.calls.lock() += 1;
            Err(ScannerError::Status(500))
        }
    }

    #[tokio::test]
    async fn test_spawned_report_swallows_failure() {
        let reporter = Arc::new(FailingReporter {
            calls: Mutex::new(0),
        });
        let handle = spawn_report(reporter.clone(), CollectRequest::default());

        assert!(handle.await.is_ok());
        assert_eq!(*reporter.calls.lock(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_collector_is_an_error() {
        let reporter = HttpReporter::new("http://127.0.0.1:1", "/collect");
        let request: CollectRequest = CollectRequest::new([("hold", "Hold")].into_iter().collect());
        assert!(matches!(
            reporter.report(&request).await,
            Err(ScannerError::Http(_))
        ));
    }
}
