//! Built-in order action catalog

use crate::action::ActionCatalog;

/// Curated list of common order actions (id, label).
///
/// Entries here win over discovered actions that share an id.
pub const BUILT_IN_ACTIONS: &[(&str, &str)] = &[
    ("view", "View Order"),
    ("cancel", "Cancel Order"),
    ("hold", "Hold Order"),
    ("unhold", "Unhold Order"),
    ("invoice", "Invoice Order"),
    ("ship", "Ship Order"),
    ("reorder", "Reorder"),
    ("edit", "Edit Order"),
    ("creditmemo", "Credit Memo"),
    ("print", "Print"),
    ("print_invoice", "Print Invoices"),
    ("print_shipment", "Print PDF Shipments"),
    ("print_order", "Print PDF Orders"),
    ("print_all", "Print All"),
    ("add_comment", "Add Order Comments"),
    ("change_status", "Change Order Status"),
];

/// Label of a built-in action
pub fn built_in_label(id: &str) -> Option<&'static str> {
    BUILT_IN_ACTIONS
        .iter()
        .find(|(action_id, _)| *action_id == id)
        .map(|(_, label)| *label)
}

/// The full built-in catalog
pub fn built_in_catalog() -> ActionCatalog {
    BUILT_IN_ACTIONS.iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::normalize_action_id;

    #[test]
    fn test_built_in_ids_are_normalized_and_unique() {
        let catalog = built_in_catalog();
        assert_eq!(catalog.len(), BUILT_IN_ACTIONS.len());
        for (id, _) in BUILT_IN_ACTIONS {
            assert_eq!(normalize_action_id(id), *id);
        }
    }

    #[test]
    fn test_built_in_label_lookup() {
        assert_eq!(built_in_label("change_status"), Some("Change Order Status"));
        assert_eq!(built_in_label("teleport"), None);
    }
}
