//! DOM Selection API access.

use quire_caret_core::{CaretAnchor, DomError, SelectionAccess};
use web_sys::{Node, Window};

use crate::web_dom::js_error;

/// The window's live selection.
pub struct WebSelection {
    selection: web_sys::Selection,
}

impl WebSelection {
    /// Grab the current selection object, if the window has one.
    pub fn current(window: &Window) -> Option<Self> {
        let selection = window.get_selection().ok()??;
        Some(Self { selection })
    }

    pub fn inner(&self) -> &web_sys::Selection {
        &self.selection
    }
}

impl SelectionAccess<Node> for WebSelection {
    fn anchor(&self) -> Option<CaretAnchor<Node>> {
        let node = self.selection.anchor_node()?;
        Some(CaretAnchor::new(node, self.selection.anchor_offset() as usize))
    }

    fn collapse(&mut self, anchor: &CaretAnchor<Node>) -> Result<(), DomError> {
        tracing::trace!(
            target: "quire::caret",
            node_name = %anchor.node.node_name(),
            offset = anchor.offset,
            "collapsing selection"
        );
        self.selection
            .collapse_with_offset(Some(&anchor.node), anchor.offset as u32)
            .map_err(js_error)
    }
}
