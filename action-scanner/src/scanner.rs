//! Page scanner
//!
//! Ties the pieces together for one page lifetime:
//!
//! 1. [`PageScanner::start`] filters the menus already on the page.
//! 2. [`PageScanner::on_mutations`] filters every batch of added elements.
//! 3. [`PageScanner::run_collection`] waits for the page to settle (ready
//!    signal or settle delay, whichever comes first), then runs the
//!    one-shot collection: hint store plus a background report.
//!
//! Nothing here is ever torn down or re-shown.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use parking_lot::Mutex;
use shared::{ActionCatalog, CollectRequest};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::collector::ActionCollector;
use crate::config::ScannerConfig;
use crate::dom::Document;
use crate::filter::ActionFilter;
use crate::hint::{HintStore, MemoryHintStore, remember_candidates};
use crate::reporter::{ActionReporter, HttpReporter, spawn_report};

/// Result of the one-shot collection pass
#[derive(Debug)]
pub struct CollectOutcome {
    /// Candidate actions found on the page
    pub candidates: ActionCatalog,
    /// Whether the candidates went to the hint store
    pub hinted: bool,
    /// Background report, when one was sent
    pub report: Option<JoinHandle<()>>,
}

pub struct PageScanner {
    document: Arc<Mutex<Document>>,
    config: ScannerConfig,
    filter: ActionFilter,
    collector: ActionCollector,
    hints: Arc<dyn HintStore>,
    reporter: Option<Arc<dyn ActionReporter>>,
    ready: Arc<Notify>,
    collected: AtomicBool,
}

impl std::fmt::Debug for PageScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageScanner")
            .field("config", &self.config)
            .field("has_reporter", &self.reporter.is_some())
            .field("collected", &self.collected.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl PageScanner {
    pub fn new(document: Arc<Mutex<Document>>, config: ScannerConfig) -> Self {
        let filter = ActionFilter::new(config.permissions.clone());
        Self {
            document,
            config,
            filter,
            collector: ActionCollector::with_defaults(),
            hints: Arc::new(MemoryHintStore::new()),
            reporter: None,
            ready: Arc::new(Notify::new()),
            collected: AtomicBool::new(false),
        }
    }

    pub fn with_hint_store(mut self, hints: Arc<dyn HintStore>) -> Self {
        self.hints = hints;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ActionReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Report to the collector endpoint from the configuration, resolved
    /// against `base_url`. Without an endpoint no reporter is installed.
    pub fn with_http_reporter(self, base_url: &str, token: Option<&str>) -> Self {
        let Some(mut reporter) = HttpReporter::from_config(base_url, &self.config) else {
            tracing::warn!("No collector endpoint configured, actions will not be reported");
            return self;
        };
        if let Some(token) = token {
            reporter = reporter.with_token(token);
        }
        self.with_reporter(Arc::new(reporter))
    }

    pub fn has_reporter(&self) -> bool {
        self.reporter.is_some()
    }

    pub fn with_collector(mut self, collector: ActionCollector) -> Self {
        self.collector = collector;
        self
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn document(&self) -> &Arc<Mutex<Document>> {
        &self.document
    }

    pub fn filter(&self) -> &ActionFilter {
        &self.filter
    }

    /// Handle the host uses to announce that rendering is complete
    pub fn ready_signal(&self) -> Arc<Notify> {
        self.ready.clone()
    }

    /// Announce that rendering is complete
    pub fn signal_ready(&self) {
        self.ready.notify_one();
    }

    /// Startup pass: pending mutations plus existing action menus.
    /// Returns the number of elements hidden.
    pub fn start(&self) -> usize {
        if !self.config.enabled {
            return 0;
        }
        let mut doc = self.document.lock();
        let batch = doc.take_mutations();
        let hidden = self.filter.process_mutations(&mut doc, &batch)
            + self.filter.process_existing(&mut doc);
        tracing::debug!(hidden, "Order action filter started");
        hidden
    }

    /// Filter the elements added since the last call
    pub fn on_mutations(&self) -> usize {
        if !self.config.enabled {
            return 0;
        }
        let mut doc = self.document.lock();
        let batch = doc.take_mutations();
        if batch.is_empty() {
            return 0;
        }
        self.filter.process_mutations(&mut doc, &batch)
    }

    /// Wait for the ready signal or the settle delay, then collect
    pub async fn run_collection(&self) -> Option<CollectOutcome> {
        if !self.config.enabled {
            return None;
        }
        tokio::select! {
            _ = self.ready.notified() => {
                tracing::debug!("Page ready signal received");
            }
            _ = tokio::time::sleep(self.config.settle_delay) => {
                tracing::debug!(
                    delay_ms = self.config.settle_delay.as_millis() as u64,
                    "Settle delay elapsed"
                );
            }
        }
        self.collect_now()
    }

    /// One-shot collection pass. Runs at most once per scanner; later
    /// calls and disabled scanners return `None`. Must be called from
    /// within a Tokio runtime when a reporter is configured.
    pub fn collect_now(&self) -> Option<CollectOutcome> {
        if !self.config.enabled || self.collected.swap(true, Ordering::SeqCst) {
            return None;
        }

        let candidates = self.collector.collect(&self.document.lock());
        if candidates.is_empty() {
            tracing::debug!("No order actions found on page");
            return Some(CollectOutcome {
                candidates,
                hinted: false,
                report: None,
            });
        }

        let hinted = remember_candidates(self.hints.as_ref(), &candidates, Utc::now());

        let report = self.reporter.as_ref().map(|reporter| {
            let mut request = CollectRequest::new(candidates.clone());
            if let Some(form_key) = &self.config.form_key {
                request = request.with_form_key(form_key.clone());
            }
            spawn_report(reporter.clone(), request)
        });

        tracing::debug!(
            count = candidates.len(),
            hinted,
            reported = report.is_some(),
            "Collected order actions"
        );

        Some(CollectOutcome {
            candidates,
            hinted,
            report,
        })
    }
}
