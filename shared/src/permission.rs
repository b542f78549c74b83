//! Permission map handed to the page scanner

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::action::ActionCatalog;

/// Wire entry of a permission map: `{ "id": "cancel", "allowed": false }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionEntry {
    pub id: String,
    pub allowed: bool,
}

/// Mapping from action id to allowed/denied.
///
/// Advisory only: it drives UI hiding, not access control. Serialized as
/// `{ "<id>": { "id": "<id>", "allowed": <bool> } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, PermissionEntry>",
    into = "BTreeMap<String, PermissionEntry>"
)]
pub struct PermissionMap {
    entries: BTreeMap<String, bool>,
}

impl PermissionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every id of `catalog` mapped to `true`
    pub fn allow_all(catalog: &ActionCatalog) -> Self {
        Self {
            entries: catalog.ids().map(|id| (id.to_string(), true)).collect(),
        }
    }

    pub fn set(&mut self, id: impl Into<String>, allowed: bool) {
        self.entries.insert(id.into(), allowed);
    }

    pub fn get(&self, id: &str) -> Option<bool> {
        self.entries.get(id).copied()
    }

    /// `true` only when `id` is present and explicitly denied
    pub fn is_denied(&self, id: &str) -> bool {
        self.get(id) == Some(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(id, allowed)| (id.as_str(), *allowed))
    }

    /// Ids explicitly denied
    pub fn denied_ids(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|(_, allowed)| !allowed).map(|(id, _)| id)
    }
}

impl From<BTreeMap<String, PermissionEntry>> for PermissionMap {
    fn from(map: BTreeMap<String, PermissionEntry>) -> Self {
        Self {
            entries: map
                .into_iter()
                .map(|(key, entry)| (key, entry.allowed))
                .collect(),
        }
    }
}

impl From<PermissionMap> for BTreeMap<String, PermissionEntry> {
    fn from(map: PermissionMap) -> Self {
        map.entries
            .into_iter()
            .map(|(id, allowed)| {
                let entry = PermissionEntry {
                    id: id.clone(),
                    allowed,
                };
                (id, entry)
            })
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, bool)> for PermissionMap {
    fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(id, allowed)| (id.into(), allowed)).collect(),
        }
    }
}
