//! Host abstraction traits for caret navigation.
//!
//! These traits define the interface between the navigation engine and the
//! DOM it measures. The browser implementation wraps `web-sys`; tests use the
//! in-memory DOM from [`crate::testing`]. Mutating methods take `&self`
//! because host DOM handles are shared references with interior mutability.

use std::fmt::Debug;

use smol_str::SmolStr;

use crate::types::{CaretAnchor, Rect};

/// The three node shapes traversal distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Text,
    Element,
    /// Comments, processing instructions and anything else without
    /// measurable text.
    Other,
}

/// Error type for host DOM operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node is not attached to a parent")]
    Detached,
    #[error("expected a text node")]
    NotText,
    #[error("host DOM error: {0}")]
    Host(String),
}

impl From<&str> for DomError {
    fn from(s: &str) -> Self {
        DomError::Host(s.to_string())
    }
}

impl From<String> for DomError {
    fn from(s: String) -> Self {
        DomError::Host(s)
    }
}

/// Tree, mutation and geometry access to the host document.
pub trait CaretDom {
    /// Node handle. Equality must be identity, not structural.
    type Node: Clone + PartialEq + Debug;

    fn kind(&self, node: &Self::Node) -> NodeKind;

    /// Text content of a text node; `None` for any other kind.
    fn text(&self, node: &Self::Node) -> Option<String>;

    /// Length of a text node in UTF-16 code units, 0 for other kinds.
    fn text_len(&self, node: &Self::Node) -> usize {
        self.text(node)
            .map(|text| text.encode_utf16().count())
            .unwrap_or(0)
    }

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Child nodes in document order.
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn previous_element_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    fn next_element_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Lowercase tag name for elements.
    fn tag_name(&self, node: &Self::Node) -> Option<SmolStr>;

    /// Resolved `display` value for elements.
    fn computed_display(&self, node: &Self::Node) -> Option<SmolStr>;

    /// Deep copy of `node`, not yet attached anywhere.
    fn deep_clone(&self, node: &Self::Node) -> Result<Self::Node, DomError>;

    /// Insert `new` as the next sibling of `reference`.
    fn insert_after(&self, reference: &Self::Node, new: &Self::Node) -> Result<(), DomError>;

    /// Detach `node` from its parent.
    fn remove(&self, node: &Self::Node) -> Result<(), DomError>;

    fn create_text(&self, text: &str) -> Result<Self::Node, DomError>;

    /// Create an inline marker element with the given class, holding a
    /// single text node with `text`.
    fn create_marker(&self, text: &str, class: &str) -> Result<Self::Node, DomError>;

    /// Replace `old` in its parent by `replacements`, in order.
    fn replace_with(&self, old: &Self::Node, replacements: &[Self::Node]) -> Result<(), DomError>;

    /// Viewport-relative box of a rendered node. `None` when the node is not
    /// in the document or has no layout.
    fn bounding_rect(&self, node: &Self::Node) -> Option<Rect>;
}

/// Access to the live selection.
///
/// Passed explicitly into the navigator so it never reaches for a global.
pub trait SelectionAccess<N> {
    /// Current anchor, if there is a selection at all.
    fn anchor(&self) -> Option<CaretAnchor<N>>;

    /// Collapse the selection to a caret at `anchor`.
    fn collapse(&mut self, anchor: &CaretAnchor<N>) -> Result<(), DomError>;
}

/// A measurement copy of an element, attached as its next sibling.
///
/// The copy inherits the original's width and styling, so geometry read from
/// it matches the original. It is removed from the document when the guard is
/// dropped, on every exit path.
pub struct CloneGuard<'a, D: CaretDom> {
    dom: &'a D,
    node: D::Node,
}

impl<'a, D: CaretDom> CloneGuard<'a, D> {
    /// Clone `original` and attach the copy right after it.
    pub fn attach(dom: &'a D, original: &D::Node) -> Result<Self, DomError> {
        if dom.parent(original).is_none() {
            return Err(DomError::Detached);
        }
        let node = dom.deep_clone(original)?;
        dom.insert_after(original, &node)?;
        tracing::trace!(target: "quire::caret", "attached measurement clone");
        Ok(Self { dom, node })
    }

    /// The attached copy.
    pub fn node(&self) -> &D::Node {
        &self.node
    }
}

impl<D: CaretDom> Drop for CloneGuard<'_, D> {
    fn drop(&mut self) {
        if let Err(err) = self.dom.remove(&self.node) {
            tracing::warn!(target: "quire::caret", %err, "failed to remove measurement clone");
        }
    }
}
