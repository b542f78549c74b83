//! One-shot action collection
//!
//! Walks the known action containers of an order page and builds a
//! candidate catalog. An element's id comes from, in order: its `id`
//! attribute, its `data-action` attribute, its visible text. The first
//! element seen for an id supplies the label.

use shared::{ActionCatalog, normalize_action_id, normalize_text_id};

use crate::dom::{Document, NodeId};
use crate::error::ScannerResult;
use crate::selector::SelectorList;

/// Toolbar buttons, dropdown entries and split-button menus of the order
/// grid and order view pages
pub const DEFAULT_SELECTORS: &[&str] = &[
    ".admin__data-grid-header-row .action-select-wrap .action-menu li a",
    ".page-actions-buttons button",
    ".page-actions .actions-split .dropdown-menu li a",
    ".order-actions-toolbar button",
    ".order-details div.actions a",
    ".order-details div.actions button",
    ".order-actions button",
    ".action-select-wrap .action-menu-items .action-menu-item",
    ".admin__action-dropdown-menu .action-dropdown-menu-item",
];

/// Collects candidate actions with a fixed selector list
#[derive(Debug, Clone)]
pub struct ActionCollector {
    selectors: SelectorList,
}

impl ActionCollector {
    /// Collector over [`DEFAULT_SELECTORS`]
    pub fn with_defaults() -> Self {
        Self {
            selectors: SelectorList::parse_all(DEFAULT_SELECTORS).unwrap_or_else(|e| {
                tracing::error!(error = %e, "Invalid built-in action selectors");
                SelectorList::empty()
            }),
        }
    }

    pub fn new<S: AsRef<str>>(selectors: &[S]) -> ScannerResult<Self> {
        Ok(Self {
            selectors: SelectorList::parse_all(selectors)?,
        })
    }

    pub fn collect(&self, doc: &Document) -> ActionCatalog {
        let mut actions = ActionCatalog::new();
        for node in self.selectors.query_all(doc, doc.root()) {
            if let Some((id, label)) = candidate(doc, node) {
                actions.insert_if_absent(id, label);
            }
        }
        actions
    }
}

impl Default for ActionCollector {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Collect with [`DEFAULT_SELECTORS`]
pub fn collect_actions(doc: &Document) -> ActionCatalog {
    ActionCollector::with_defaults().collect(doc)
}

/// `(id, label)` for one matched element; `None` when it has no visible text
fn candidate(doc: &Document, node: NodeId) -> Option<(String, String)> {
    let el = doc.get(node)?;
    let text = doc.text_content(node);
    let label = text.trim();
    if label.is_empty() {
        return None;
    }

    let id = if let Some(id) = el.non_empty_attr("id") {
        normalize_action_id(id)
    } else if let Some(action) = el.non_empty_attr("data-action") {
        normalize_action_id(action)
    } else {
        normalize_text_id(label)
    };
    Some((id, label.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementSpec;

    fn toolbar(buttons: Vec<ElementSpec>) -> Document {
        let mut doc = Document::new();
        let mut bar = ElementSpec::new("div").class("page-actions-buttons");
        for button in buttons {
            bar = bar.child(button);
        }
        doc.append(doc.root(), bar);
        doc
    }

    #[test]
    fn test_id_priority() {
        let doc = toolbar(vec![
            ElementSpec::new("button")
                .id("Cancel-Order-Btn")
                .attr("data-action", "ignored")
                .text("Cancel"),
            ElementSpec::new("button").text("Print Invoices"),
            ElementSpec::new("button")
                .attr("data-action", "send_email")
                .text("Send Email"),
        ]);

        let actions = collect_actions(&doc);
        assert_eq!(actions.len(), 3);
        assert_eq!(actions.label("cancel_order_btn"), Some("Cancel"));
        assert_eq!(actions.label("print_invoices"), Some("Print Invoices"));
        assert_eq!(actions.label("send_email"), Some("Send Email"));
    }

    #[test]
    fn test_empty_attributes_fall_through() {
        let doc = toolbar(vec![
            ElementSpec::new("button")
                .id("")
                .attr("data-action", "")
                .text("Ship"),
        ]);
        assert_eq!(collect_actions(&doc).label("ship"), Some("Ship"));
    }

    #[test]
    fn test_blank_text_is_skipped() {
        let doc = toolbar(vec![
            ElementSpec::new("button").id("icon_only").text("   "),
            ElementSpec::new("button").child(ElementSpec::new("span")),
        ]);
        assert!(collect_actions(&doc).is_empty());
    }

    #[test]
    fn test_first_duplicate_wins() {
        let mut doc = Document::new();
        doc.append(
            doc.root(),
            ElementSpec::new("div").class("order-details").child(
                ElementSpec::new("div")
                    .class("actions")
                    .child(
                        ElementSpec::new("a")
                            .attr("data-action", "hold")
                            .text("Hold Order"),
                    )
                    .child(
                        ElementSpec::new("div").class("actions").child(
                            ElementSpec::new("button")
                                .attr("data-action", "hold")
                                .text("Put On Hold"),
                        ),
                    ),
            ),
        );

        let actions = collect_actions(&doc);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions.label("hold"), Some("Hold Order"));
    }

    #[test]
    fn test_label_is_trimmed_text_content() {
        let mut doc = Document::new();
        doc.append(
            doc.root(),
            ElementSpec::new("div").class("admin__data-grid-header-row").child(
                ElementSpec::new("div").class("action-select-wrap").child(
                    ElementSpec::new("ul").class("action-menu").child(
                        ElementSpec::new("li").child(
                            ElementSpec::new("a")
                                .text("  Print ")
                                .child(ElementSpec::new("span").text("Shipping Labels  ")),
                        ),
                    ),
                ),
            ),
        );

        let actions = collect_actions(&doc);
        assert_eq!(
            actions.label("print_shipping_labels"),
            Some("Print Shipping Labels")
        );
    }

    #[test]
    fn test_elements_outside_containers_are_ignored() {
        let mut doc = Document::new();
        doc.append(doc.root(), ElementSpec::new("button").text("Search"));
        assert!(collect_actions(&doc).is_empty());
    }

    #[test]
    fn test_custom_selectors() {
        let doc = toolbar(vec![ElementSpec::new("button").text("Invoice")]);
        let collector = ActionCollector::new(&["button"]).unwrap();
        assert_eq!(collector.collect(&doc).label("invoice"), Some("Invoice"));
        assert!(matches!(
            ActionCollector::new(&["button >"]),
            Err(crate::ScannerError::Selector(_))
        ));
    }
}
