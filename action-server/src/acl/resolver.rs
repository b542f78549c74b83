//! Permission resolver
//!
//! Builds the advisory permission map for a role. Every failure path is
//! fail-open: hiding a button is never the last line of defence, the
//! order endpoints enforce their own ACL.

use shared::{ActionCatalog, PermissionMap, built_in_catalog, built_in_label, normalize_action_id};
use std::sync::Arc;

use super::rules::{RoleGrantLookup, RoleId, RulePermission, action_resource_token};
use crate::discovery::DiscoveryStore;

/// Feature switches read from host configuration
#[derive(Debug, Clone)]
pub struct ActionSettings {
    /// Filter enabled
    pub enabled: bool,
    /// Replaces the built-in catalog when non-empty
    pub override_ids: Vec<String>,
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            override_ids: Vec::new(),
        }
    }
}

impl ActionSettings {
    /// Parse a comma-separated override list, dropping blanks
    pub fn parse_override_list(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(|s| normalize_action_id(s.trim()))
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Clone)]
pub struct PermissionResolver {
    discovery: DiscoveryStore,
    rules: Arc<dyn RoleGrantLookup>,
    settings: ActionSettings,
}

impl std::fmt::Debug for PermissionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionResolver")
            .field("discovery", &self.discovery)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl PermissionResolver {
    pub fn new(
        discovery: DiscoveryStore,
        rules: Arc<dyn RoleGrantLookup>,
        settings: ActionSettings,
    ) -> Self {
        Self {
            discovery,
            rules,
            settings,
        }
    }

    pub fn settings(&self) -> &ActionSettings {
        &self.settings
    }

    pub fn discovery(&self) -> &DiscoveryStore {
        &self.discovery
    }

    /// Built-in catalog, or the configured override list
    pub fn base_catalog(&self) -> ActionCatalog {
        if self.settings.override_ids.is_empty() {
            return built_in_catalog();
        }

        self.settings
            .override_ids
            .iter()
            .map(|id| {
                let label = built_in_label(id)
                    .map(str::to_string)
                    .unwrap_or_else(|| humanize(id));
                (id.clone(), label)
            })
            .collect()
    }

    /// Base catalog plus discovered actions; base entries win
    pub async fn catalog(&self) -> ActionCatalog {
        let discovered = self.discovery.get_discovered().await;
        self.base_catalog().union(&discovered)
    }

    /// Permission map for `role_id`.
    ///
    /// Only ids with an explicit `action_<id>` rule are overwritten; a role
    /// without any rules, an unknown role and a missing role all get every
    /// id allowed.
    pub async fn resolve(&self, role_id: Option<RoleId>) -> PermissionMap {
        let catalog = self.catalog().await;
        let mut permissions = PermissionMap::allow_all(&catalog);

        if !self.settings.enabled {
            return permissions;
        }
        let Some(role_id) = role_id else {
            return permissions;
        };

        let rules = match self.rules.role_rules(role_id).await {
            Ok(Some(rules)) => rules,
            Ok(None) => {
                tracing::debug!(role_id, "Unknown role, all actions allowed");
                return permissions;
            }
            Err(e) => {
                tracing::warn!(role_id, error = %e, "Role rule lookup failed, all actions allowed");
                return permissions;
            }
        };

        if rules.is_empty() {
            tracing::debug!(role_id, "Role has no explicit rules, all actions allowed");
            return permissions;
        }

        for id in catalog.ids() {
            if let Some(rule) = rules.permission_for(&action_resource_token(id)) {
                permissions.set(id, rule == RulePermission::Allow);
            }
        }

        tracing::debug!(
            role_id,
            denied = permissions.denied_ids().count(),
            "Resolved order action permissions"
        );
        permissions
    }

    /// Single-action check with the same fallbacks as [`resolve`](Self::resolve)
    pub async fn is_action_allowed(&self, role_id: Option<RoleId>, action_id: &str) -> bool {
        if !self.settings.enabled {
            return true;
        }
        let Some(role_id) = role_id else {
            return true;
        };

        let token = action_resource_token(&normalize_action_id(action_id));
        match self.rules.role_rules(role_id).await {
            Ok(Some(rules)) => rules.permission_for(&token) != Some(RulePermission::Deny),
            Ok(None) => true,
            Err(e) => {
                tracing::warn!(role_id, error = %e, "Role rule lookup failed, action allowed");
                true
            }
        }
    }
}

/// `print_labels` -> `Print labels`
fn humanize(id: &str) -> String {
    let spaced = id.replace('_', " ");
    let mut chars = spaced.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::rules::{RoleRules, RulesError, StaticRoleRules};
    use crate::discovery::{MemoryBlobStore, StaticModuleList};
    use async_trait::async_trait;
    use shared::BUILT_IN_ACTIONS;

    struct FailingRules;

    #[async_trait]
    impl RoleGrantLookup for FailingRules {
        async fn role_rules(&self, _role_id: RoleId) -> Result<Option<RoleRules>, RulesError> {
            Err(RulesError::Backend("connection refused".into()))
        }
    }

    fn discovery() -> DiscoveryStore {
        DiscoveryStore::new(
            Arc::new(MemoryBlobStore::new()),
            Arc::new(StaticModuleList::default()),
        )
    }

    fn resolver_with(rules: StaticRoleRules, settings: ActionSettings) -> PermissionResolver {
        PermissionResolver::new(discovery(), Arc::new(rules), settings)
    }

    #[tokio::test]
    async fn test_no_role_allows_everything() {
        let resolver = resolver_with(StaticRoleRules::new(), ActionSettings::default());
        resolver
            .discovery()
            .merge(&[("send_email", "Send Email")].into_iter().collect())
            .await
            .unwrap();

        let map = resolver.resolve(None).await;
        assert_eq!(map.len(), BUILT_IN_ACTIONS.len() + 1);
        assert!(map.iter().all(|(_, allowed)| allowed));
    }

    #[tokio::test]
    async fn test_explicit_denial_only_affects_that_action() {
        let rules = StaticRoleRules::new();
        rules.set_rules(5, RoleRules::new().deny("action_cancel"));
        let resolver = resolver_with(rules, ActionSettings::default());

        let map = resolver.resolve(Some(5)).await;
        assert_eq!(map.get("cancel"), Some(false));
        for (id, allowed) in map.iter() {
            if id != "cancel" {
                assert!(allowed, "{id} should be allowed");
            }
        }
    }

    #[tokio::test]
    async fn test_rules_apply_to_discovered_actions() {
        let rules = StaticRoleRules::new();
        rules.set_rules(
            5,
            RoleRules::new()
                .deny("action_send_email")
                .allow("action_cancel"),
        );
        let resolver = resolver_with(rules, ActionSettings::default());
        resolver
            .discovery()
            .merge(&[("send_email", "Send Email")].into_iter().collect())
            .await
            .unwrap();

        let map = resolver.resolve(Some(5)).await;
        assert_eq!(map.get("send_email"), Some(false));
        assert_eq!(map.get("cancel"), Some(true));
    }

    #[tokio::test]
    async fn test_unknown_or_ruleless_role_fails_open() {
        let rules = StaticRoleRules::new();
        rules.set_rules(1, RoleRules::new());
        let resolver = resolver_with(rules, ActionSettings::default());

        for role in [Some(1), Some(404)] {
            let map = resolver.resolve(role).await;
            assert_eq!(map.denied_ids().count(), 0);
        }
    }

    #[tokio::test]
    async fn test_lookup_failure_fails_open() {
        let resolver = PermissionResolver::new(
            discovery(),
            Arc::new(FailingRules),
            ActionSettings::default(),
        );
        assert_eq!(resolver.resolve(Some(1)).await.denied_ids().count(), 0);
        assert!(resolver.is_action_allowed(Some(1), "cancel").await);
    }

    #[tokio::test]
    async fn test_disabled_filter_allows_everything() {
        let rules = StaticRoleRules::new();
        rules.set_rules(5, RoleRules::new().deny("action_cancel"));
        let settings = ActionSettings {
            enabled: false,
            ..Default::default()
        };
        let resolver = resolver_with(rules, settings);

        assert_eq!(resolver.resolve(Some(5)).await.get("cancel"), Some(true));
        assert!(resolver.is_action_allowed(Some(5), "cancel").await);
    }

    #[tokio::test]
    async fn test_single_action_check() {
        let rules = StaticRoleRules::new();
        rules.set_rules(5, RoleRules::new().deny("action_cancel"));
        let resolver = resolver_with(rules, ActionSettings::default());

        assert!(!resolver.is_action_allowed(Some(5), "Cancel").await);
        assert!(resolver.is_action_allowed(Some(5), "hold").await);
        assert!(resolver.is_action_allowed(None, "cancel").await);
    }

    #[tokio::test]
    async fn test_override_list_replaces_built_in_catalog() {
        let settings = ActionSettings {
            enabled: true,
            override_ids: ActionSettings::parse_override_list(" cancel, print_labels ,, "),
        };
        let resolver = resolver_with(StaticRoleRules::new(), settings);

        let base = resolver.base_catalog();
        assert_eq!(base.len(), 2);
        assert_eq!(base.label("cancel"), Some("Cancel Order"));
        assert_eq!(base.label("print_labels"), Some("Print labels"));
    }

    #[tokio::test]
    async fn test_built_in_labels_win_over_discovered() {
        let resolver = resolver_with(StaticRoleRules::new(), ActionSettings::default());
        resolver
            .discovery()
            .merge(&[("cancel", "Cancel It")].into_iter().collect())
            .await
            .unwrap();

        let catalog = resolver.catalog().await;
        assert_eq!(catalog.label("cancel"), Some("Cancel Order"));
    }
}
