//! Role rule lookup
//!
//! Role/rule storage belongs to the host. The resolver only asks one
//! question: which rules does this role have for which resource tokens.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

/// Host role identifier
pub type RoleId = i64;

/// Prefix of action resource tokens (`action_<id>`)
pub const ACTION_RESOURCE_PREFIX: &str = "action_";

/// Resource token guarding an action
pub fn action_resource_token(action_id: &str) -> String {
    format!("{ACTION_RESOURCE_PREFIX}{action_id}")
}

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("Failed to read role rules: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid role rules: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Role rule backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RulePermission {
    Allow,
    Deny,
}

/// Explicit rules recorded for one role (resource token -> permission)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleRules {
    rules: BTreeMap<String, RulePermission>,
}

impl RoleRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow(mut self, resource: impl Into<String>) -> Self {
        self.rules.insert(resource.into(), RulePermission::Allow);
        self
    }

    pub fn deny(mut self, resource: impl Into<String>) -> Self {
        self.rules.insert(resource.into(), RulePermission::Deny);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Rule for `resource`, if one is defined
    pub fn permission_for(&self, resource: &str) -> Option<RulePermission> {
        self.rules.get(resource).copied()
    }

    /// Resource tokens explicitly granted
    pub fn granted_resources(&self) -> HashSet<&str> {
        self.rules
            .iter()
            .filter(|(_, p)| **p == RulePermission::Allow)
            .map(|(r, _)| r.as_str())
            .collect()
    }
}

#[async_trait]
pub trait RoleGrantLookup: Send + Sync {
    /// Rules for `role_id`; `None` when the role is unknown
    async fn role_rules(&self, role_id: RoleId) -> Result<Option<RoleRules>, RulesError>;
}

/// In-process rule table, optionally loaded from a JSON file:
///
/// ```json
/// { "2": { "action_cancel": "deny", "action_view": "allow" } }
/// ```
#[derive(Debug, Default)]
pub struct StaticRoleRules {
    roles: DashMap<RoleId, RoleRules>,
}

impl StaticRoleRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        let parsed: HashMap<RoleId, RoleRules> = serde_json::from_str(json)?;
        let table = Self::new();
        for (role_id, rules) in parsed {
            table.set_rules(role_id, rules);
        }
        Ok(table)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn set_rules(&self, role_id: RoleId, rules: RoleRules) {
        self.roles.insert(role_id, rules);
    }

    pub fn role_count(&self) -> usize {
        self.roles.len()
    }
}

#[async_trait]
impl RoleGrantLookup for StaticRoleRules {
    async fn role_rules(&self, role_id: RoleId) -> Result<Option<RoleRules>, RulesError> {
        Ok(self.roles.get(&role_id).map(|r| r.value().clone()))
    }
}
