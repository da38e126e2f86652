//! Conversion between caret anchors and flat paragraph indices.
//!
//! A flat index counts UTF-16 units from the start of an ancestor element,
//! across all of its descendant text nodes in document order. Valid indices
//! for an ancestor with `n` units of text are `0..=n`.

use std::ops::ControlFlow;

use crate::dom::{CaretDom, NodeKind};
use crate::types::CaretAnchor;

/// Traversal order for [`TextNodes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraversalOrder {
    /// Document order.
    Forward,
    /// Reverse document order (last text node first).
    Reverse,
}

/// Depth-first iterator over the text nodes under a root.
///
/// Uses an explicit stack. An element's children are read when the element
/// is popped, so callers may replace a text node they were just handed
/// without disturbing the rest of the walk.
pub struct TextNodes<'a, D: CaretDom> {
    dom: &'a D,
    stack: Vec<D::Node>,
    order: TraversalOrder,
}

impl<'a, D: CaretDom> TextNodes<'a, D> {
    pub fn new(dom: &'a D, root: &D::Node, order: TraversalOrder) -> Self {
        Self {
            dom,
            stack: vec![root.clone()],
            order,
        }
    }
}

impl<D: CaretDom> Iterator for TextNodes<'_, D> {
    type Item = D::Node;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match self.dom.kind(&node) {
                NodeKind::Text => return Some(node),
                NodeKind::Element => {
                    let children = self.dom.children(&node);
                    // Stack pops last-pushed first.
                    match self.order {
                        TraversalOrder::Forward => self.stack.extend(children.into_iter().rev()),
                        TraversalOrder::Reverse => self.stack.extend(children),
                    }
                }
                NodeKind::Other => {}
            }
        }
        None
    }
}

/// Total text length under `node`, in UTF-16 units.
pub fn text_length<D: CaretDom>(dom: &D, node: &D::Node) -> usize {
    TextNodes::new(dom, node, TraversalOrder::Forward)
        .map(|text| dom.text_len(&text))
        .sum()
}

/// Convert `anchor` into a flat index relative to `ancestor`.
///
/// Returns `None` if the anchor's node is not a descendant of `ancestor`, or
/// if its offset is out of range for the node.
pub fn flatten<D: CaretDom>(
    dom: &D,
    anchor: &CaretAnchor<D::Node>,
    ancestor: &D::Node,
) -> Option<usize> {
    if anchor.node == *ancestor {
        return element_anchor_index(dom, ancestor, anchor.offset, 0);
    }
    let mut consumed = 0;
    match flatten_in(dom, ancestor, anchor, &mut consumed) {
        ControlFlow::Break(found) => found,
        ControlFlow::Continue(()) => None,
    }
}

fn flatten_in<D: CaretDom>(
    dom: &D,
    parent: &D::Node,
    anchor: &CaretAnchor<D::Node>,
    consumed: &mut usize,
) -> ControlFlow<Option<usize>> {
    for child in dom.children(parent) {
        let kind = dom.kind(&child);
        if child == anchor.node {
            let found = match kind {
                NodeKind::Text => {
                    (anchor.offset <= dom.text_len(&child)).then(|| *consumed + anchor.offset)
                }
                NodeKind::Element => element_anchor_index(dom, &child, anchor.offset, *consumed),
                NodeKind::Other => Some(*consumed),
            };
            return ControlFlow::Break(found);
        }
        match kind {
            NodeKind::Text => *consumed += dom.text_len(&child),
            NodeKind::Element => flatten_in(dom, &child, anchor, consumed)?,
            NodeKind::Other => {}
        }
    }
    ControlFlow::Continue(())
}

/// Element anchors use DOM semantics: the offset is a child index.
fn element_anchor_index<D: CaretDom>(
    dom: &D,
    element: &D::Node,
    child_index: usize,
    consumed: usize,
) -> Option<usize> {
    let children = dom.children(element);
    if child_index > children.len() {
        return None;
    }
    let before: usize = children[..child_index]
        .iter()
        .map(|child| text_length(dom, child))
        .sum();
    Some(consumed + before)
}

/// Convert a flat index under `ancestor` back into a text-node anchor.
///
/// An index on the boundary between two text nodes resolves to the start of
/// the later one. An index equal to the total length resolves to the end of
/// the last non-empty text node. Returns `None` past the end, or when there is
/// no text at all.
pub fn locate<D: CaretDom>(
    dom: &D,
    ancestor: &D::Node,
    index: usize,
) -> Option<CaretAnchor<D::Node>> {
    let mut consumed = 0;
    let mut last = None;
    for text in TextNodes::new(dom, ancestor, TraversalOrder::Forward) {
        let len = dom.text_len(&text);
        if len == 0 {
            continue;
        }
        if index < consumed + len {
            return Some(CaretAnchor::new(text, index - consumed));
        }
        consumed += len;
        last = Some((text, len));
    }
    match last {
        Some((text, len)) if index == consumed => Some(CaretAnchor::new(text, len)),
        _ => None,
    }
}
