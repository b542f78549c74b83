//! redb-backed blob store
//!
//! Survives restarts, so discovered actions are not lost when the server
//! is redeployed inside the ttl window.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

use super::store::{ExpiringBlobStore, StoreError, StoreResult, StoredBlob};

/// Blob table: key -> (stored_at millis, ttl secs, payload)
const BLOBS_TABLE: TableDefinition<&str, (i64, u64, &[u8])> = TableDefinition::new("blobs");

#[derive(Clone)]
pub struct RedbBlobStore {
    db: Arc<Database>,
}

impl RedbBlobStore {
    /// Open or create database
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open in-memory database (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        let db =
            Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StoreResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(BLOBS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }
}

/// redb transactions block (and commits fsync), so they run on the
/// blocking pool
#[async_trait]
impl ExpiringBlobStore for RedbBlobStore {
    async fn get(&self, key: &str) -> StoreResult<Option<StoredBlob>> {
        let db = self.db.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || read_blob(&db, &key))
            .await
            .map_err(|e| StoreError::Task(format!("Task join failed: {}", e)))?
    }

    async fn put(&self, key: &str, blob: StoredBlob) -> StoreResult<()> {
        let db = self.db.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || write_blob(&db, &key, &blob))
            .await
            .map_err(|e| StoreError::Task(format!("Task join failed: {}", e)))?
    }
}

fn read_blob(db: &Database, key: &str) -> StoreResult<Option<StoredBlob>> {
    let read_txn = db.begin_read()?;
    let table = read_txn.open_table(BLOBS_TABLE)?;

    match table.get(key)? {
        Some(guard) => {
            let (stored_at_ms, ttl_secs, payload) = guard.value();
            let stored_at = Utc
                .timestamp_millis_opt(stored_at_ms)
                .single()
                .ok_or_else(|| {
                    StoreError::Corrupt(format!("invalid timestamp {stored_at_ms} for {key}"))
                })?;
            Ok(Some(StoredBlob::new(payload.to_vec(), stored_at, ttl_secs)))
        }
        None => Ok(None),
    }
}

fn write_blob(db: &Database, key: &str, blob: &StoredBlob) -> StoreResult<()> {
    let write_txn = db.begin_write()?;
    {
        let mut table = write_txn.open_table(BLOBS_TABLE)?;
        table.insert(
            key,
            (
                blob.stored_at.timestamp_millis(),
                blob.ttl_secs,
                blob.bytes.as_slice(),
            ),
        )?;
    }
    write_txn.commit()?;
    Ok(())
}
