//! Client-side hint store
//!
//! Keeps the last observed candidate map for a day so the page has it
//! before the collector round-trip completes. Not authoritative.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use shared::ActionCatalog;

/// Serialized candidate maps must be shorter than this to be kept
pub const HINT_MAX_BYTES: usize = 4000;

/// Hint lifetime (24 hours)
pub const HINT_TTL_SECS: i64 = 86_400;

/// Key under which candidate maps are stored
pub const HINT_KEY: &str = "order_actions_hint";

/// Small expiring key/value storage on the client
pub trait HintStore: Send + Sync {
    /// Value for `key` unless missing or expired at `now`
    fn get(&self, key: &str, now: DateTime<Utc>) -> Option<String>;

    fn set(&self, key: &str, value: String, expires_at: DateTime<Utc>);
}

/// Process-local hint store
#[derive(Debug, Default)]
pub struct MemoryHintStore {
    entries: Mutex<Vec<(String, String, DateTime<Utc>)>>,
}

impl MemoryHintStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HintStore for MemoryHintStore {
    fn get(&self, key: &str, now: DateTime<Utc>) -> Option<String> {
        self.entries
            .lock()
            .iter()
            .find(|(k, _, expires_at)| k == key && now < *expires_at)
            .map(|(_, value, _)| value.clone())
    }

    fn set(&self, key: &str, value: String, expires_at: DateTime<Utc>) {
        let mut entries = self.entries.lock();
        entries.retain(|(k, _, _)| k != key);
        entries.push((key.to_string(), value, expires_at));
    }
}

/// Store `candidates` as a hint when the compact JSON form is under
/// [`HINT_MAX_BYTES`]. Returns whether it was stored.
pub fn remember_candidates(
    store: &dyn HintStore,
    candidates: &ActionCatalog,
    now: DateTime<Utc>,
) -> bool {
    let json = candidates.to_json();
    if json.len() >= HINT_MAX_BYTES {
        tracing::debug!(bytes = json.len(), "Candidate map too large for hint store");
        return false;
    }
    store.set(HINT_KEY, json, now + Duration::seconds(HINT_TTL_SECS));
    true
}

/// Last stored candidate map, if still fresh and readable
pub fn load_candidates(store: &dyn HintStore, now: DateTime<Utc>) -> Option<ActionCatalog> {
    let json = store.get(HINT_KEY, now)?;
    match serde_json::from_str(&json) {
        Ok(catalog) => Some(catalog),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring unreadable action hint");
            None
        }
    }
}
