//! Action identifiers and catalogs
//!
//! An action id is a lowercase ASCII token. Ids taken from element
//! attributes keep underscores; ids derived from visible text collapse
//! every non-alphanumeric character (underscore included) to `_`. Both
//! rules are idempotent.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalize an attribute-derived action id (`id` or `data-action`).
///
/// Lowercases the input and replaces every character outside `[a-z0-9_]`
/// with `_`.
pub fn normalize_action_id(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Normalize visible text into an action id.
///
/// Lowercases the input and replaces every character outside `[a-z0-9]`
/// with `_`.
pub fn normalize_text_id(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// A single known action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    /// Normalized action id
    pub id: String,
    /// Display text
    pub label: String,
}

impl ActionDescriptor {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Mapping from action id to descriptor.
///
/// On the wire (collector payloads, cached blobs, hint store) a catalog is a
/// flat JSON object `{ "<id>": "<label>" }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct ActionCatalog {
    entries: BTreeMap<String, ActionDescriptor>,
}

impl ActionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&ActionDescriptor> {
        self.entries.get(id)
    }

    /// Label for `id`, if known
    pub fn label(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(|d| d.label.as_str())
    }

    /// Insert `id` unless it is already present.
    ///
    /// Returns `true` when the entry was added. The first label seen for an
    /// id is kept.
    pub fn insert_if_absent(&mut self, id: impl Into<String>, label: impl Into<String>) -> bool {
        let id = id.into();
        if self.entries.contains_key(&id) {
            return false;
        }
        let descriptor = ActionDescriptor::new(id.clone(), label);
        self.entries.insert(id, descriptor);
        true
    }

    /// Union `other` into `self`, keeping existing entries on conflict.
    ///
    /// Returns the number of entries added.
    pub fn merge(&mut self, other: &ActionCatalog) -> usize {
        let mut added = 0;
        for descriptor in other.descriptors() {
            if self.insert_if_absent(descriptor.id.clone(), descriptor.label.clone()) {
                added += 1;
            }
        }
        added
    }

    /// Key-wise union of two catalogs; `self` wins on conflict.
    pub fn union(&self, other: &ActionCatalog) -> ActionCatalog {
        let mut merged = self.clone();
        merged.merge(other);
        merged
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ActionDescriptor> {
        self.entries.values()
    }

    /// Compact JSON form (`{"id":"label",...}`)
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl From<BTreeMap<String, String>> for ActionCatalog {
    fn from(map: BTreeMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl From<ActionCatalog> for BTreeMap<String, String> {
    fn from(catalog: ActionCatalog) -> Self {
        catalog
            .entries
            .into_values()
            .map(|d| (d.id, d.label))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for ActionCatalog
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut catalog = ActionCatalog::new();
        for (id, label) in iter {
            catalog.insert_if_absent(id, label);
        }
        catalog
    }
}
