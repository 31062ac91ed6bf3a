//! Focus Containment
//!
//! Keeps Tab / Shift+Tab cycling inside a transient overlay.
//!
//! The focusable set is captured on `activate` and is not refreshed when
//! the overlay's content changes afterwards; callers re-activate to pick
//! up new elements.

use crate::document::{DocumentView, FocusHost};

/// Native controls that take focus without a tab marker
const FOCUSABLE_CONTROLS: [&str; 4] = ["button", "input", "select", "textarea"];

/// Tab index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabIndex {
    NotFocusable,       // tabindex="-1" or unparsable
    Sequential(i32),    // tabindex="0" or positive
}

impl TabIndex {
    pub fn parse(value: &str) -> Self {
        match value.trim().parse::<i32>() {
            Ok(n) if n < 0 => Self::NotFocusable,
            Ok(n) => Self::Sequential(n),
            Err(_) => Self::NotFocusable,
        }
    }

    pub fn is_focusable(&self) -> bool {
        matches!(self, Self::Sequential(_))
    }
}

/// Whether `node` takes part in sequential keyboard focus: native
/// controls, links with a target, or any element with a non-negative
/// `tabindex`. Disabled controls and hidden inputs are excluded.
pub fn is_focusable<D: DocumentView>(doc: &D, node: D::Node) -> bool {
    let Some(tag) = doc.tag_name(node) else {
        return false;
    };

    if FOCUSABLE_CONTROLS.contains(&tag) {
        if doc.has_attribute(node, "disabled") {
            return false;
        }
        return !(tag == "input" && doc.attribute(node, "type").is_some_and(|t| t.eq_ignore_ascii_case("hidden")));
    }

    if matches!(tag, "a" | "area") && doc.has_attribute(node, "href") {
        return true;
    }

    doc.attribute(node, "tabindex")
        .map(TabIndex::parse)
        .is_some_and(|t| t.is_focusable())
}

/// Focusable descendants of `root` in document order
pub fn focusable_elements<D: DocumentView>(doc: &D, root: D::Node) -> Vec<D::Node> {
    doc.descendants(root)
        .into_iter()
        .filter(|n| is_focusable(doc, *n))
        .collect()
}

/// Keyboard event delivered to the trap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyEvent {
    pub fn new(key: &str) -> Self {
        Self { key: key.into(), shift: false, ctrl: false, alt: false, meta: false }
    }

    pub fn tab() -> Self {
        Self::new("Tab")
    }

    pub fn shift_tab() -> Self {
        Self::tab().shift()
    }

    pub fn shift(mut self) -> Self { self.shift = true; self }
    pub fn ctrl(mut self) -> Self { self.ctrl = true; self }
    pub fn alt(mut self) -> Self { self.alt = true; self }

    fn is_plain_tab(&self) -> bool {
        self.key == "Tab" && !self.ctrl && !self.alt && !self.meta
    }

    pub fn is_forward_tab(&self) -> bool {
        self.is_plain_tab() && !self.shift
    }

    pub fn is_backward_tab(&self) -> bool {
        self.is_plain_tab() && self.shift
    }
}

/// What the host should do with a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition<N> {
    /// Default handling continues
    PassThrough,
    /// Default prevented; focus moves to the node
    Redirect(N),
}

/// Focusable set captured for a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusScope<N> {
    pub container: N,
    pub elements: Vec<N>,
}

impl<N: Copy> FocusScope<N> {
    pub fn first(&self) -> Option<N> {
        self.elements.first().copied()
    }

    pub fn last(&self) -> Option<N> {
        self.elements.last().copied()
    }
}

/// Focus containment controller (`Inactive` until activated)
#[derive(Debug)]
pub struct FocusTrap<N> {
    scope: Option<FocusScope<N>>,
    /// Element focused before activation, restored on deactivate
    return_focus: Option<N>,
}

impl<N> Default for FocusTrap<N> {
    fn default() -> Self {
        Self { scope: None, return_focus: None }
    }
}

impl<N: Copy + Eq + std::fmt::Debug> FocusTrap<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.scope.is_some()
    }

    pub fn scope(&self) -> Option<&FocusScope<N>> {
        self.scope.as_ref()
    }

    /// Capture the focusable set of `container` and start containing focus.
    /// Returns false, leaving the trap as it was, when the container has no
    /// focusable content. Re-activating an active trap refreshes its scope.
    pub fn activate<D>(&mut self, doc: &mut D, container: N) -> bool
    where
        D: FocusHost<Node = N>,
    {
        let elements = focusable_elements(&*doc, container);
        if elements.is_empty() {
            tracing::debug!("Focus trap on {:?} declined: no focusable elements", container);
            return false;
        }

        if self.scope.is_none() {
            self.return_focus = doc.focused().filter(|f| !doc.contains(container, *f));
        }

        let scope = FocusScope { container, elements };
        let inside = doc.focused().is_some_and(|f| doc.contains(container, f));
        if !inside {
            if let Some(first) = scope.first() {
                doc.set_focus(first);
            }
        }

        tracing::debug!("Focus trap active on {:?} ({} elements)", container, scope.elements.len());
        self.scope = Some(scope);
        true
    }

    /// Decide what a key event does given the currently focused node
    pub fn handle_key(&self, event: &KeyEvent, focused: Option<N>) -> KeyDisposition<N> {
        let Some(scope) = &self.scope else {
            return KeyDisposition::PassThrough;
        };
        let (Some(first), Some(last), Some(current)) = (scope.first(), scope.last(), focused) else {
            return KeyDisposition::PassThrough;
        };

        if event.is_forward_tab() && current == last {
            KeyDisposition::Redirect(first)
        } else if event.is_backward_tab() && current == first {
            KeyDisposition::Redirect(last)
        } else {
            KeyDisposition::PassThrough
        }
    }

    /// `handle_key` against the host's focus, applying any redirect
    pub fn dispatch_key<D>(&self, doc: &mut D, event: &KeyEvent) -> KeyDisposition<N>
    where
        D: FocusHost<Node = N>,
    {
        let disposition = self.handle_key(event, doc.focused());
        if let KeyDisposition::Redirect(target) = disposition {
            doc.set_focus(target);
        }
        disposition
    }

    /// Stop containing focus and restore the pre-activation focus. A second
    /// call is a no-op and returns false.
    pub fn deactivate<D>(&mut self, doc: &mut D) -> bool
    where
        D: FocusHost<Node = N>,
    {
        let Some(scope) = self.scope.take() else {
            return false;
        };
        if let Some(previous) = self.return_focus.take() {
            if !doc.set_focus(previous) {
                tracing::debug!("Previously focused {:?} is gone; focus not restored", previous);
            }
        }
        tracing::debug!("Focus trap released on {:?}", scope.container);
        true
    }
}
