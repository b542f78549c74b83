//! Page element tree
//!
//! A small arena model of the rendered admin page: elements with a tag,
//! attributes, class tokens and a text node, plus the two pieces of state
//! the filter touches (`display:none` and extra class tokens). Appends are
//! recorded as mutation batches the way a structural-change watcher would
//! deliver them.

use std::collections::BTreeMap;

/// Index of an element inside its [`Document`]
pub type NodeId = usize;

/// One element of the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    display_none: bool,
}

impl Element {
    /// Lowercase tag name
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Attribute value, treating an empty value as absent
    pub fn non_empty_attr(&self, name: &str) -> Option<&str> {
        self.attr(name).filter(|v| !v.is_empty())
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether `display:none` has been set on this element
    pub fn is_display_none(&self) -> bool {
        self.display_none
    }
}

/// Detached element description used to build trees
///
/// ```ignore
/// let menu = ElementSpec::new("ul")
///     .class("action-menu")
///     .child(ElementSpec::new("li").text("Cancel"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ElementSpec {
    tag: String,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    text: String,
    children: Vec<ElementSpec>,
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Default::default()
        }
    }

    /// Add one or more whitespace-separated class tokens
    pub fn class(mut self, classes: &str) -> Self {
        for token in classes.split_whitespace() {
            if !self.classes.iter().any(|c| c == token) {
                self.classes.push(token.to_string());
            }
        }
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    /// Text node placed before the children
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }
}

/// Elements added by one append, delivered together to the observer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationRecord {
    pub added: Vec<NodeId>,
}

/// Arena-backed page tree
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    pending: Vec<MutationRecord>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Tag of the synthetic root node
    pub const ROOT_TAG: &'static str = "#document";

    pub fn new() -> Self {
        let root = Element {
            tag: Self::ROOT_TAG.to_string(),
            attrs: BTreeMap::new(),
            classes: Vec::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
            display_none: false,
        };
        Self {
            nodes: vec![root],
            pending: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id)
    }

    /// Attach `spec` (and its subtree) under `parent`, recording one
    /// mutation record. Returns the id of the new top element, or `None`
    /// when `parent` does not exist.
    pub fn append(&mut self, parent: NodeId, spec: ElementSpec) -> Option<NodeId> {
        if parent >= self.nodes.len() {
            return None;
        }
        let id = self.insert(parent, spec);
        self.pending.push(MutationRecord { added: vec![id] });
        Some(id)
    }

    fn insert(&mut self, parent: NodeId, spec: ElementSpec) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Element {
            tag: spec.tag,
            attrs: spec.attrs,
            classes: spec.classes,
            text: spec.text,
            parent: Some(parent),
            children: Vec::new(),
            display_none: false,
        });
        self.nodes[parent].children.push(id);

        for child in spec.children {
            self.insert(id, child);
        }
        id
    }

    /// Drain the mutation records accumulated since the last call
    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.pending)
    }

    /// Concatenated text of the element and all of its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.push_text(id, &mut out);
        out
    }

    fn push_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        out.push_str(&node.text);
        for &child in &node.children {
            self.push_text(child, out);
        }
    }

    /// Ancestors from the parent up to the root
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.nodes.get(id).and_then(|n| n.parent),
        }
    }

    /// Descendants of `id` in document (pre-)order, `id` excluded
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.nodes.get(id) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.nodes[next].children.iter().rev().copied());
        }
        out
    }

    /// Set `display:none` and add `marker_class`. Returns `true` when the
    /// element was visible before the call.
    pub fn hide(&mut self, id: NodeId, marker_class: &str) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        let was_visible = !node.display_none;
        node.display_none = true;
        if !node.classes.iter().any(|c| c == marker_class) {
            node.classes.push(marker_class.to_string());
        }
        was_visible
    }
}

/// Iterator over an element's ancestors
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.nodes.get(current).and_then(|n| n.parent);
        Some(current)
    }
}
