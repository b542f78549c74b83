//! Action discovery store
//!
//! One shared cache slot holds every action id reported by any session.
//! Reads lazily seed the slot from the module scan; writes merge into the
//! latest stored value and refresh the ttl.

use chrono::{DateTime, Utc};
use shared::{ActionCatalog, normalize_action_id};
use std::sync::Arc;

use super::modules::{ModuleSource, scan_modules};
use super::store::{ExpiringBlobStore, StoreResult, StoredBlob};

/// Cache key of the shared discovery slot
pub const DISCOVERY_CACHE_KEY: &str = "order_actions_discovered";

/// Default slot lifetime (24 hours)
pub const DEFAULT_DISCOVERY_TTL_SECS: u64 = 86_400;

#[derive(Clone)]
pub struct DiscoveryStore {
    store: Arc<dyn ExpiringBlobStore>,
    modules: Arc<dyn ModuleSource>,
    excluded_modules: Arc<Vec<String>>,
    ttl_secs: u64,
}

impl std::fmt::Debug for DiscoveryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryStore")
            .field("ttl_secs", &self.ttl_secs)
            .field("excluded_modules", &self.excluded_modules)
            .finish_non_exhaustive()
    }
}

impl DiscoveryStore {
    pub fn new(store: Arc<dyn ExpiringBlobStore>, modules: Arc<dyn ModuleSource>) -> Self {
        Self {
            store,
            modules,
            excluded_modules: Arc::new(Vec::new()),
            ttl_secs: DEFAULT_DISCOVERY_TTL_SECS,
        }
    }

    pub fn with_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    pub fn with_excluded_modules(mut self, excluded: Vec<String>) -> Self {
        self.excluded_modules = Arc::new(excluded);
        self
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Current discovered catalog, seeding the slot on a miss.
    pub async fn get_discovered(&self) -> ActionCatalog {
        self.get_discovered_at(Utc::now()).await
    }

    pub(crate) async fn get_discovered_at(&self, now: DateTime<Utc>) -> ActionCatalog {
        match self.store.get(DISCOVERY_CACHE_KEY).await {
            Ok(Some(blob)) if !blob.is_expired(now) => match decode(&blob.bytes) {
                Some(catalog) => return catalog,
                None => tracing::warn!("Discovered actions cache is corrupt, rebuilding"),
            },
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to read discovered actions cache"),
        }

        let catalog = scan_modules(self.modules.as_ref(), &self.excluded_modules);
        tracing::info!(count = catalog.len(), "Seeded discovered actions from module scan");

        if let Err(e) = self.write(&catalog, now).await {
            tracing::error!(error = %e, "Failed to store discovered actions");
        }
        catalog
    }

    /// Union `incoming` into the stored catalog and persist it.
    ///
    /// Expiry is ignored on the read side: reports always extend the latest
    /// stored value. Returns the total number of stored actions.
    pub async fn merge(&self, incoming: &ActionCatalog) -> StoreResult<usize> {
        self.merge_at(incoming, Utc::now()).await
    }

    pub(crate) async fn merge_at(
        &self,
        incoming: &ActionCatalog,
        now: DateTime<Utc>,
    ) -> StoreResult<usize> {
        let mut catalog = match self.store.get(DISCOVERY_CACHE_KEY).await? {
            Some(blob) => decode(&blob.bytes).unwrap_or_else(|| {
                tracing::warn!("Discovered actions cache is corrupt, starting from empty");
                ActionCatalog::new()
            }),
            None => ActionCatalog::new(),
        };

        let mut added = 0;
        for descriptor in incoming.descriptors() {
            let id = normalize_action_id(&descriptor.id);
            if id.is_empty() {
                continue;
            }
            if catalog.insert_if_absent(id, descriptor.label.clone()) {
                added += 1;
            }
        }

        self.write(&catalog, now).await?;
        tracing::info!(added, total = catalog.len(), "Merged discovered actions");
        Ok(catalog.len())
    }

    async fn write(&self, catalog: &ActionCatalog, now: DateTime<Utc>) -> StoreResult<()> {
        let bytes = serde_json::to_vec(catalog)?;
        self.store
            .put(DISCOVERY_CACHE_KEY, StoredBlob::new(bytes, now, self.ttl_secs))
            .await
    }
}

/// Decode a cached catalog; anything but a JSON object of strings is corrupt
fn decode(bytes: &[u8]) -> Option<ActionCatalog> {
    serde_json::from_slice(bytes).ok()
}
