//! Document - High-level document API

use crate::{Color, DOMTokenList, DomResult, DomTree, InlineStyle, NodeId};

/// Default text color when no ancestor declares one
const DEFAULT_COLOR: Color = Color::BLACK;
/// Default canvas color when no ancestor declares a background
const DEFAULT_BACKGROUND: Color = Color::WHITE;

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    html_element: NodeId,
    body_element: NodeId,
    /// Currently focused element
    focused: Option<NodeId>,
}

impl Document {
    /// Create a document with `<html><head/><body/></html>`
    pub fn new() -> Self {
        let mut tree = DomTree::new();
        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        // Freshly created nodes cannot violate the hierarchy
        let _ = tree.append_child(tree.root(), html);
        let _ = tree.append_child(html, head);
        let _ = tree.append_child(html, body);

        Self {
            tree,
            html_element: html,
            body_element: body,
            focused: None,
        }
    }

    /// Get `<html>` element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get `<body>` element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Create an element with attributes and append it to `parent`
    pub fn append_element(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> DomResult<NodeId> {
        let id = self.tree.create_element(tag);
        if let Some(elem) = self.tree.get_mut(id).and_then(|n| n.as_element_mut()) {
            for (name, value) in attrs {
                elem.set_attr(name, value);
            }
        }
        self.tree.append_child(parent, id)
    }

    /// Create a text node and append it to `parent`
    pub fn append_text(&mut self, parent: NodeId, content: &str) -> DomResult<NodeId> {
        let id = self.tree.create_text(content);
        self.tree.append_child(parent, id)
    }

    /// Detach a node from its parent
    pub fn remove(&mut self, id: NodeId) -> DomResult<NodeId> {
        let parent = self.tree.parent(id).ok_or(crate::DomError::NotAChild)?;
        if self.focused.is_some_and(|f| self.tree.is_inclusive_ancestor(id, f)) {
            self.focused = None;
        }
        self.tree.remove_child(parent, id)
    }

    /// Lowercased tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.tree.get(id)?.as_element().map(|e| e.tag.as_str())
    }

    /// Attribute value of an element
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.tree.get(id)?.as_element()?.get_attr(name)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.tree.get(id)
            .and_then(|n| n.as_element())
            .is_some_and(|e| e.has_attr(name))
    }

    /// Set an attribute on an element. Non-elements are ignored.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(elem) = self.tree.get_mut(id).and_then(|n| n.as_element_mut()) {
            elem.set_attr(name, value);
        }
    }

    /// Get connected element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.tree
            .descendants(self.tree.root())
            .into_iter()
            .find(|n| self.attribute(*n, "id") == Some(id))
    }

    /// Effective foreground color: nearest resolvable `color`
    pub fn effective_color(&self, id: NodeId) -> Color {
        self.inherited_style(id, InlineStyle::color).unwrap_or(DEFAULT_COLOR)
    }

    /// Effective background color: nearest non-transparent background
    pub fn effective_background(&self, id: NodeId) -> Color {
        self.inherited_style(id, InlineStyle::background_color).unwrap_or(DEFAULT_BACKGROUND)
    }

    fn inherited_style<F>(&self, id: NodeId, pick: F) -> Option<Color>
    where
        F: Fn(&InlineStyle) -> Option<Color>,
    {
        std::iter::once(id)
            .chain(self.tree.ancestors(id))
            .filter_map(|n| self.attribute(n, "style"))
            .find_map(|style| pick(&InlineStyle::parse(style)))
    }

    /// Currently focused element
    pub fn active_element(&self) -> Option<NodeId> {
        self.focused
    }

    /// Move focus to a connected element. Returns false if refused.
    pub fn focus(&mut self, id: NodeId) -> bool {
        let ok = self.tree.get(id).is_some_and(|n| n.is_element()) && self.tree.is_connected(id);
        if ok {
            self.focused = Some(id);
        } else {
            tracing::debug!("Refusing focus on detached or non-element node {:?}", id);
        }
        ok
    }

    /// Clear focus
    pub fn blur(&mut self) {
        self.focused = None;
    }

    /// Classes on the `<html>` element
    pub fn root_classes(&self) -> DOMTokenList {
        DOMTokenList::from_string(self.attribute(self.html_element, "class").unwrap_or(""))
    }

    /// Force a class on or off on the `<html>` element
    pub fn set_root_class(&mut self, class: &str, enabled: bool) {
        let mut classes = self.root_classes();
        classes.toggle(class, Some(enabled));
        let value = classes.value();
        self.set_attribute(self.html_element, "class", &value);
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_structure() {
        let doc = Document::new();
        assert_eq!(doc.tag_name(doc.document_element()), Some("html"));
        assert_eq!(doc.tag_name(doc.body()), Some("body"));
        assert_eq!(doc.tree.parent(doc.body()), Some(doc.document_element()));
    }

    #[test]
    fn test_get_element_by_id() {
        let mut doc = Document::new();
        let body = doc.body();
        let main = doc.append_element(body, "main", &[("id", "content")]).unwrap();
        assert_eq!(doc.get_element_by_id("content"), Some(main));
        assert_eq!(doc.get_element_by_id("missing"), None);

        doc.remove(main).unwrap();
        assert_eq!(doc.get_element_by_id("content"), None);
    }

    #[test]
    fn test_effective_colors_inherit() {
        let mut doc = Document::new();
        let body = doc.body();
        let panel = doc.append_element(body, "section", &[("style", "background-color: #333333; color: #eeeeee")]).unwrap();
        let p = doc.append_element(panel, "p", &[("style", "color: #777777")]).unwrap();
        let plain = doc.append_element(body, "p", &[]).unwrap();

        assert_eq!(doc.effective_color(p).to_hex(), "#777777");
        assert_eq!(doc.effective_background(p).to_hex(), "#333333");
        assert_eq!(doc.effective_color(plain), Color::BLACK);
        assert_eq!(doc.effective_background(plain), Color::WHITE);
    }

    #[test]
    fn test_unresolvable_color_inherits() {
        let mut doc = Document::new();
        let body = doc.body();
        let panel = doc.append_element(body, "div", &[("style", "color: white; background: #000 url(x.png)")]).unwrap();
        let p = doc.append_element(panel, "p", &[("style", "color: not-a-color; background: transparent")]).unwrap();

        assert_eq!(doc.effective_color(p), Color::WHITE);
        assert_eq!(doc.effective_background(p), Color::BLACK);
    }

    #[test]
    fn test_focus_requires_connected_element() {
        let mut doc = Document::new();
        let body = doc.body();
        let button = doc.append_element(body, "button", &[]).unwrap();
        let text = doc.append_text(button, "OK").unwrap();

        assert!(doc.focus(button));
        assert!(!doc.focus(text));
        assert_eq!(doc.active_element(), Some(button));

        doc.remove(button).unwrap();
        assert_eq!(doc.active_element(), None);
        assert!(!doc.focus(button));
    }

    #[test]
    fn test_root_classes() {
        let mut doc = Document::new();
        doc.set_root_class("high-contrast", true);
        doc.set_root_class("easy-reading", true);
        doc.set_root_class("high-contrast", false);
        assert_eq!(doc.attribute(doc.document_element(), "class"), Some("easy-reading"));
        assert!(doc.root_classes().contains("easy-reading"));
    }
}
