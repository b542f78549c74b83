//! Visibility filter for action menu items
//!
//! Fed with mutation batches (and once with the existing menus on
//! startup), it hides every menu item whose text maps to a denied action.
//! Hidden items are never shown again.
//!
//! An id present in the permission map is decided by its own entry. Ids
//! missing from the map fall back to a substring match against every denied
//! id, so label variants like "Print Invoices" still hit `print_invoice`.
//! The fallback also over-matches ("uncancel" contains "cancel").

use shared::{PermissionMap, normalize_text_id};

use crate::dom::{Document, MutationRecord, NodeId};
use crate::selector::SelectorList;

/// Class added to every element hidden by the filter
pub const HIDDEN_CLASS: &str = "order-action-hidden";

const CONTAINER_CLASSES: &[&str] = &[
    "action-menu",
    "action-select-wrap",
    "actions-split",
    "action-menu-items",
];
const EXISTING_MENUS: &str = ".action-menu, .action-select-wrap, .actions-split";
const MENU_ITEMS: &str = "li, .action-menu-item, a.item";
const NESTED_ITEMS: &str = ".action-menu-item, .action-menu li, .item";

#[derive(Debug, Clone)]
pub struct ActionFilter {
    permissions: PermissionMap,
    existing_menus: SelectorList,
    menu_items: SelectorList,
    nested_items: SelectorList,
}

impl ActionFilter {
    pub fn new(permissions: PermissionMap) -> Self {
        Self {
            permissions,
            existing_menus: builtin(EXISTING_MENUS),
            menu_items: builtin(MENU_ITEMS),
            nested_items: builtin(NESTED_ITEMS),
        }
    }

    pub fn permissions(&self) -> &PermissionMap {
        &self.permissions
    }

    /// Advisory check. A known id follows its own entry; an unknown id is
    /// denied only when it overlaps an explicitly denied id by substring.
    pub fn is_allowed(&self, action_id: &str) -> bool {
        match self.permissions.get(action_id) {
            Some(allowed) => allowed,
            None => !self
                .permissions
                .denied_ids()
                .any(|denied| action_id.contains(denied) || denied.contains(action_id)),
        }
    }

    /// Startup pass over menus already on the page. Returns the number of
    /// newly hidden elements.
    pub fn process_existing(&self, doc: &mut Document) -> usize {
        let menus = self.existing_menus.query_all(doc, doc.root());
        menus
            .into_iter()
            .map(|menu| self.process_element(doc, menu))
            .sum()
    }

    /// Handle one batch of structural changes
    pub fn process_mutations(&self, doc: &mut Document, batch: &[MutationRecord]) -> usize {
        batch
            .iter()
            .flat_map(|record| record.added.iter().copied())
            .map(|node| self.process_element(doc, node))
            .sum()
    }

    /// Process an added (or existing) element: its menu items when it is an
    /// action container, itself when it looks like an item, then any
    /// nested items
    pub fn process_element(&self, doc: &mut Document, node: NodeId) -> usize {
        let Some(el) = doc.get(node) else {
            return 0;
        };
        let is_container = CONTAINER_CLASSES.iter().any(|c| el.has_class(c));
        let is_item = el.tag() == "li" || el.has_class("action-menu-item") || el.has_class("item");

        let mut hidden = 0;
        if is_container {
            for item in self.menu_items.query_all(doc, node) {
                hidden += self.process_item(doc, item) as usize;
            }
        }
        if is_item {
            hidden += self.process_item(doc, node) as usize;
        }
        for item in self.nested_items.query_all(doc, node) {
            hidden += self.process_item(doc, item) as usize;
        }
        hidden
    }

    /// Hide `item` when its action is denied. Returns `true` when the item
    /// became hidden by this call.
    pub fn process_item(&self, doc: &mut Document, item: NodeId) -> bool {
        let text = doc.text_content(item);
        let text = text.trim();
        if text.is_empty() {
            return false;
        }

        let action_id = normalize_text_id(text);
        let key = canonical_key(&action_id, text);
        if self.is_allowed(key) {
            return false;
        }

        let hidden = doc.hide(item, HIDDEN_CLASS);
        if hidden {
            tracing::debug!(action_id = %action_id, key, "Hid denied order action");
        }
        hidden
    }
}

/// Permission key for the actions whose labels vary between pages
fn canonical_key<'a>(action_id: &'a str, text: &str) -> &'a str {
    if action_id == "change_order_status" || text.contains("Change Order Status") {
        return "change_status";
    }
    match (action_id, text) {
        ("cancel", _) | (_, "Cancel") => "cancel",
        ("hold", _) | (_, "Hold") => "hold",
        ("unhold", _) | (_, "Unhold") => "unhold",
        _ => action_id,
    }
}

fn builtin(selector: &str) -> SelectorList {
    SelectorList::parse(selector).unwrap_or_else(|e| {
        tracing::error!(selector, error = %e, "Invalid built-in selector");
        SelectorList::empty()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementSpec;

    fn deny(ids: &[&str]) -> ActionFilter {
        let mut permissions: PermissionMap = shared::built_in_catalog()
            .ids()
            .map(|id| (id.to_string(), true))
            .collect();
        for id in ids {
            permissions.set(*id, false);
        }
        ActionFilter::new(permissions)
    }

    fn menu(items: &[&str]) -> ElementSpec {
        let mut ul = ElementSpec::new("ul").class("action-menu");
        for text in items {
            ul = ul.child(ElementSpec::new("li").text(*text));
        }
        ul
    }

    fn hidden_texts(doc: &Document) -> Vec<String> {
        doc.descendants(doc.root())
            .into_iter()
            .filter(|&id| doc.get(id).is_some_and(|el| el.is_display_none()))
            .map(|id| doc.text_content(id))
            .collect()
    }

    #[test]
    fn test_substring_fallback_denies_variants() {
        let filter = ActionFilter::new([("cancel", false)].into_iter().collect());
        assert!(!filter.is_allowed("cancel_order"));
        assert!(!filter.is_allowed("cancel"));
        assert!(!filter.is_allowed("uncancel"));
        assert!(filter.is_allowed("hold"));

        // overlap in either direction counts for unknown ids
        assert!(!filter.is_allowed("can"));
    }

    #[test]
    fn test_explicit_entry_beats_substring_fallback() {
        let permissions: PermissionMap = [
            ("hold", true),
            ("unhold", false),
            ("print_invoice", true),
            ("print", false),
        ]
        .into_iter()
        .collect();
        let filter = ActionFilter::new(permissions);
        assert!(filter.is_allowed("hold"));
        assert!(filter.is_allowed("print_invoice"));
        assert!(!filter.is_allowed("print_shipment"));

        let mut doc = Document::new();
        doc.append(doc.root(), menu(&["Hold", "Print Invoice", "Unhold"]));
        let batch = doc.take_mutations();

        assert_eq!(filter.process_mutations(&mut doc, &batch), 1);
        assert_eq!(hidden_texts(&doc), vec!["Unhold"]);
    }

    #[test]
    fn test_allowed_entries_never_deny() {
        let filter = deny(&[]);
        assert!(filter.is_allowed("print_invoice"));
        assert!(filter.is_allowed("something_new"));
    }

    #[test]
    fn test_empty_permissions_allow_everything() {
        let filter = ActionFilter::new(PermissionMap::new());
        assert!(filter.is_allowed("cancel"));
    }

    #[test]
    fn test_added_menu_hides_denied_items() {
        let filter = deny(&["cancel", "print_invoice"]);
        let mut doc = Document::new();
        doc.append(
            doc.root(),
            menu(&["Cancel", "Hold", "Print Invoices", "Send Email"]),
        );

        let batch = doc.take_mutations();
        let hidden = filter.process_mutations(&mut doc, &batch);

        assert_eq!(hidden, 2);
        assert_eq!(hidden_texts(&doc), vec!["Cancel", "Print Invoices"]);
    }

    #[test]
    fn test_hidden_item_gets_marker_class() {
        let filter = deny(&["hold"]);
        let mut doc = Document::new();
        let item = doc
            .append(doc.root(), ElementSpec::new("li").class("item").text("Hold"))
            .unwrap();

        let batch = doc.take_mutations();
        filter.process_mutations(&mut doc, &batch);

        let el = doc.get(item).unwrap();
        assert!(el.is_display_none());
        assert!(el.has_class(HIDDEN_CLASS));
    }

    #[test]
    fn test_change_order_status_uses_canonical_key() {
        let filter = deny(&["change_status"]);
        let mut doc = Document::new();
        doc.append(
            doc.root(),
            ElementSpec::new("div").class("action-select-wrap").child(
                ElementSpec::new("div")
                    .class("action-menu-item")
                    .text("Change Order Status to Complete"),
            ),
        );

        let batch = doc.take_mutations();
        assert_eq!(filter.process_mutations(&mut doc, &batch), 1);
    }

    #[test]
    fn test_unrelated_elements_are_untouched() {
        let filter = deny(&["cancel"]);
        let mut doc = Document::new();
        doc.append(
            doc.root(),
            ElementSpec::new("div")
                .class("grid")
                .child(ElementSpec::new("span").text("Cancel")),
        );

        let batch = doc.take_mutations();
        assert_eq!(filter.process_mutations(&mut doc, &batch), 0);
        assert!(hidden_texts(&doc).is_empty());
    }

    #[test]
    fn test_existing_menus_are_processed() {
        let filter = deny(&["cancel"]);
        let mut doc = Document::new();
        doc.append(
            doc.root(),
            ElementSpec::new("div")
                .class("actions-split")
                .child(menu(&["Hold", "Cancel"])),
        );
        doc.take_mutations();

        assert_eq!(filter.process_existing(&mut doc), 1);
        assert_eq!(hidden_texts(&doc), vec!["Cancel"]);
    }

    #[test]
    fn test_reprocessing_does_not_unhide() {
        let filter = deny(&["cancel"]);
        let mut doc = Document::new();
        let ul = doc.append(doc.root(), menu(&["Cancel"])).unwrap();
        let batch = doc.take_mutations();
        assert_eq!(filter.process_mutations(&mut doc, &batch), 1);

        let permissive = ActionFilter::new(PermissionMap::new());
        assert_eq!(permissive.process_element(&mut doc, ul), 0);
        assert_eq!(filter.process_element(&mut doc, ul), 0);
        assert_eq!(hidden_texts(&doc), vec!["Cancel"]);
    }
}
