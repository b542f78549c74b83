//! Installed-module heuristic scan
//!
//! Seeds the discovery catalog before any page has reported. Module names
//! follow `Vendor_Name`; a module whose name carries an action verb and
//! whose `Name` part mentions orders is assumed to contribute an order
//! action.

use shared::{ActionCatalog, normalize_action_id};

/// Verbs that suggest a module adds an order action
pub const ACTION_VERBS: &[&str] = &[
    "print", "export", "import", "send", "email", "download", "generate", "update", "create",
    "delete", "remove", "add", "edit", "change", "apply", "assign", "unassign",
];

/// Source of installed module names (host module registry)
pub trait ModuleSource: Send + Sync {
    fn module_names(&self) -> anyhow::Result<Vec<String>>;
}

/// Fixed module list, usually from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticModuleList {
    names: Vec<String>,
}

impl StaticModuleList {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }
}

impl ModuleSource for StaticModuleList {
    fn module_names(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.names.clone())
    }
}

/// Infer order actions from module names. Never fails; an unreadable
/// module list yields an empty catalog.
pub fn scan_modules(source: &dyn ModuleSource, excluded: &[String]) -> ActionCatalog {
    match source.module_names() {
        Ok(names) => scan_module_names(&names, excluded),
        Err(e) => {
            tracing::error!(error = %e, "Error scanning modules for order actions");
            ActionCatalog::new()
        }
    }
}

pub fn scan_module_names(names: &[String], excluded: &[String]) -> ActionCatalog {
    let mut catalog = ActionCatalog::new();

    for module in names {
        if excluded.iter().any(|e| e == module) {
            continue;
        }

        let lower = module.to_lowercase();
        if !ACTION_VERBS.iter().any(|verb| lower.contains(verb)) {
            continue;
        }

        let mut parts = module.split('_');
        let vendor = parts.next().unwrap_or_default();
        let name = parts.next().unwrap_or_default();
        if name.is_empty() || !name.to_lowercase().contains("order") {
            continue;
        }

        let id = normalize_action_id(&format!("{vendor}_{name}"));
        catalog.insert_if_absent(id, format!("{vendor} {name}"));
    }

    catalog
}
