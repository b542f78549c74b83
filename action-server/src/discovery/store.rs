//! Keyed expiring blob store
//!
//! The discovery slot lives in an external cache. The core only needs
//! `get`/`put` on a single key; expiry is evaluated by the caller so that a
//! merge can still read an expired value.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt cache entry: {0}")]
    Corrupt(String),

    #[error("Storage task failed: {0}")]
    Task(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A cached value with its write time and lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub stored_at: DateTime<Utc>,
    pub ttl_secs: u64,
}

impl StoredBlob {
    pub fn new(bytes: Vec<u8>, stored_at: DateTime<Utc>, ttl_secs: u64) -> Self {
        Self {
            bytes,
            stored_at,
            ttl_secs,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        let ttl = i64::try_from(self.ttl_secs).unwrap_or(i64::MAX);
        self.stored_at
            .checked_add_signed(Duration::seconds(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

/// Single-key read/write access to an expiring cache.
///
/// Writes replace the whole value: concurrent read-modify-write cycles are
/// last-writer-wins.
#[async_trait]
pub trait ExpiringBlobStore: Send + Sync {
    /// Stored value for `key`, expired or not
    async fn get(&self, key: &str) -> StoreResult<Option<StoredBlob>>;

    async fn put(&self, key: &str, blob: StoredBlob) -> StoreResult<()>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    entries: DashMap<String, StoredBlob>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExpiringBlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> StoreResult<Option<StoredBlob>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn put(&self, key: &str, blob: StoredBlob) -> StoreResult<()> {
        self.entries.insert(key.to_string(), blob);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_boundary() {
        let stored_at = Utc::now();
        let blob = StoredBlob::new(b"{}".to_vec(), stored_at, 60);
        assert!(!blob.is_expired(stored_at + Duration::seconds(59)));
        assert!(blob.is_expired(stored_at + Duration::seconds(60)));
    }

    #[test]
    fn test_huge_ttl_never_overflows() {
        let blob = StoredBlob::new(Vec::new(), Utc::now(), u64::MAX);
        assert!(!blob.is_expired(Utc::now()));
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryBlobStore::new();
        assert!(store.get("slot").await.unwrap().is_none());

        let blob = StoredBlob::new(b"{\"a\":\"A\"}".to_vec(), Utc::now(), 10);
        store.put("slot", blob.clone()).await.unwrap();
        assert_eq!(store.get("slot").await.unwrap(), Some(blob));
    }
}
