//! Order action page scanner
//!
//! Client-side half of the order action filter. Works on an element tree
//! of the rendered admin page:
//!
//! - [`ActionFilter`] hides menu items whose action the role may not use
//! - [`ActionCollector`] finds the actions present on the page
//! - [`PageScanner`] runs both for one page lifetime, keeps a local hint
//!   and reports candidates to the server in the background

pub mod collector;
pub mod config;
pub mod dom;
pub mod error;
pub mod filter;
pub mod hint;
pub mod reporter;
pub mod scanner;
pub mod selector;

pub use collector::{ActionCollector, DEFAULT_SELECTORS, collect_actions};
pub use config::ScannerConfig;
pub use dom::{Document, Element, ElementSpec, MutationRecord, NodeId};
pub use error::{ScannerError, ScannerResult};
pub use filter::{ActionFilter, HIDDEN_CLASS};
pub use hint::{HINT_MAX_BYTES, HintStore, MemoryHintStore};
pub use reporter::{ActionReporter, HttpReporter, spawn_report};
pub use scanner::{CollectOutcome, PageScanner};
pub use selector::{SelectorError, SelectorList};
