//! Document Access
//!
//! The engine never touches a rendering engine directly. Focus enumeration
//! and auditing read the document through `DocumentView`, and focus moves go
//! through `FocusHost`. `aie_dom::Document` implements both.

use std::fmt::Debug;

use aie_dom::{Document, NodeId};

use crate::aria::{self, AriaRole};

/// Read-only view of a document subtree
pub trait DocumentView {
    /// Element handle
    type Node: Copy + Eq + Debug;

    /// Node from which `element_by_id` and `<label for>` lookups start
    fn document_root(&self) -> Self::Node;

    /// Descendants of `root` in document order, `root` excluded
    fn descendants(&self, root: Self::Node) -> Vec<Self::Node>;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Lowercased tag name; `None` for non-element nodes
    fn tag_name(&self, node: Self::Node) -> Option<&str>;

    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// Text of direct text children
    fn own_text(&self, node: Self::Node) -> String;

    /// Text of all descendant text nodes
    fn text_content(&self, node: Self::Node) -> String;

    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// Effective foreground color, resolved to `#rrggbb` or `rgb()` form
    fn foreground_color(&self, node: Self::Node) -> String;

    /// Effective background color, resolved to `#rrggbb` or `rgb()` form
    fn background_color(&self, node: Self::Node) -> String;

    fn has_attribute(&self, node: Self::Node, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    fn is_element(&self, node: Self::Node) -> bool {
        self.tag_name(node).is_some()
    }

    /// Explicit ARIA role, if recognised
    fn role(&self, node: Self::Node) -> Option<AriaRole> {
        self.attribute(node, "role").and_then(AriaRole::parse)
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    fn contains(&self, ancestor: Self::Node, node: Self::Node) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }
}

/// A document that also owns keyboard focus
pub trait FocusHost: DocumentView {
    fn focused(&self) -> Option<Self::Node>;

    /// Move focus; returns false if the node cannot take focus
    fn set_focus(&mut self, node: Self::Node) -> bool;
}

/// Collapse runs of whitespace and trim
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Accessible name, following (in order) `aria-labelledby`, `aria-label`,
/// associated `<label>` elements, `alt`, `title`, and finally content for
/// elements that take their name from content. Empty when none applies.
pub fn accessible_name<D: DocumentView>(doc: &D, node: D::Node) -> String {
    if let Some(refs) = doc.attribute(node, "aria-labelledby") {
        let name = aria::idrefs(refs)
            .filter_map(|id| doc.element_by_id(id))
            .map(|target| collapse_whitespace(&doc.text_content(target)))
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !name.is_empty() {
            return name;
        }
    }

    if let Some(label) = doc.attribute(node, "aria-label").map(collapse_whitespace) {
        if !label.is_empty() {
            return label;
        }
    }

    let label_text = associated_labels(doc, node)
        .into_iter()
        .map(|label| collapse_whitespace(&doc.text_content(label)))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if !label_text.is_empty() {
        return label_text;
    }

    for attr in ["alt", "title"] {
        if let Some(value) = doc.attribute(node, attr).map(collapse_whitespace) {
            if !value.is_empty() {
                return value;
            }
        }
    }

    let from_content = match doc.tag_name(node) {
        Some("button" | "a" | "summary" | "option" | "legend" | "caption" | "label") => true,
        _ => doc.role(node).is_some_and(|r| r.name_from_content()),
    };
    if from_content {
        return collapse_whitespace(&doc.text_content(node));
    }

    String::new()
}

/// `<label for=id>` elements plus a wrapping `<label>` ancestor
fn associated_labels<D: DocumentView>(doc: &D, node: D::Node) -> Vec<D::Node> {
    let mut labels = Vec::new();
    if let Some(id) = doc.attribute(node, "id").filter(|id| !id.is_empty()) {
        labels.extend(
            doc.descendants(doc.document_root())
                .into_iter()
                .filter(|n| doc.tag_name(*n) == Some("label") && doc.attribute(*n, "for") == Some(id)),
        );
    }
    let mut current = doc.parent(node);
    while let Some(p) = current {
        if doc.tag_name(p) == Some("label") {
            if !labels.contains(&p) {
                labels.push(p);
            }
            break;
        }
        current = doc.parent(p);
    }
    labels
}

impl DocumentView for Document {
    type Node = NodeId;

    fn document_root(&self) -> NodeId {
        self.tree.root()
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        self.tree.descendants(root)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.parent(node)
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        Document::tag_name(self, node)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        Document::attribute(self, node, name)
    }

    fn own_text(&self, node: NodeId) -> String {
        self.tree.own_text(node)
    }

    fn text_content(&self, node: NodeId) -> String {
        self.tree.text_content(node)
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.get_element_by_id(id)
    }

    fn foreground_color(&self, node: NodeId) -> String {
        self.effective_color(node).to_hex()
    }

    fn background_color(&self, node: NodeId) -> String {
        self.effective_background(node).to_hex()
    }

    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        Document::has_attribute(self, node, name)
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.tree.is_inclusive_ancestor(ancestor, node)
    }
}

impl FocusHost for Document {
    fn focused(&self) -> Option<NodeId> {
        self.active_element()
    }

    fn set_focus(&mut self, node: NodeId) -> bool {
        self.focus(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_precedence() {
        let mut doc = Document::new();
        let body = doc.body();
        let heading = doc.append_element(body, "h2", &[("id", "dlg-title")]).unwrap();
        doc.append_text(heading, "  Edit   profile ").unwrap();

        let labelled = doc.append_element(body, "div", &[("aria-labelledby", "dlg-title"), ("aria-label", "ignored")]).unwrap();
        assert_eq!(accessible_name(&doc, labelled), "Edit profile");

        let aria = doc.append_element(body, "button", &[("aria-label", "Close")]).unwrap();
        doc.append_text(aria, "X").unwrap();
        assert_eq!(accessible_name(&doc, aria), "Close");

        let content = doc.append_element(body, "button", &[]).unwrap();
        doc.append_text(content, "Save").unwrap();
        assert_eq!(accessible_name(&doc, content), "Save");

        let unnamed = doc.append_element(body, "input", &[("type", "text")]).unwrap();
        assert_eq!(accessible_name(&doc, unnamed), "");
    }

    #[test]
    fn test_label_association() {
        let mut doc = Document::new();
        let body = doc.body();
        let label = doc.append_element(body, "label", &[("for", "email")]).unwrap();
        doc.append_text(label, "Email").unwrap();
        let input = doc.append_element(body, "input", &[("id", "email")]).unwrap();
        assert_eq!(accessible_name(&doc, input), "Email");

        let wrapper = doc.append_element(body, "label", &[]).unwrap();
        doc.append_text(wrapper, "Remember me").unwrap();
        let checkbox = doc.append_element(wrapper, "input", &[("type", "checkbox")]).unwrap();
        assert_eq!(accessible_name(&doc, checkbox), "Remember me");
    }

    #[test]
    fn test_contains() {
        let mut doc = Document::new();
        let body = doc.body();
        let dialog = doc.append_element(body, "div", &[("role", "dialog")]).unwrap();
        let inner = doc.append_element(dialog, "button", &[]).unwrap();
        assert!(DocumentView::contains(&doc, dialog, inner));
        assert!(DocumentView::contains(&doc, dialog, dialog));
        assert!(!DocumentView::contains(&doc, inner, dialog));
        assert_eq!(doc.role(dialog), Some(AriaRole::Dialog));
    }
}
