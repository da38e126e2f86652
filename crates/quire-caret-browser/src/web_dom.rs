//! `web-sys` implementation of the host DOM.
//!
//! Geometry comes from `getBoundingClientRect()`, which already accounts for
//! wrapping, font metrics and sub-pixel positioning. Text nodes are measured
//! through a `Range` selecting their contents.

use quire_caret_core::{CaretDom, DomError, NodeKind, Rect, SmolStr};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Node, Window};

/// The browser document as a [`CaretDom`].
#[derive(Clone, Debug)]
pub struct WebDom {
    window: Window,
    document: Document,
}

impl WebDom {
    /// Wrap the current window's document.
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        Self::from_window(window)
    }

    pub fn from_window(window: Window) -> Option<Self> {
        let document = window.document()?;
        Some(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

/// Convert a thrown JS value into a [`DomError`].
pub(crate) fn js_error(err: JsValue) -> DomError {
    DomError::Host(format!("{:?}", err))
}

fn to_rect(rect: &web_sys::DomRect) -> Rect {
    Rect::new(rect.left(), rect.right(), rect.top(), rect.bottom())
}

impl CaretDom for WebDom {
    type Node = Node;

    fn kind(&self, node: &Node) -> NodeKind {
        match node.node_type() {
            Node::TEXT_NODE => NodeKind::Text,
            Node::ELEMENT_NODE => NodeKind::Element,
            _ => NodeKind::Other,
        }
    }

    fn text(&self, node: &Node) -> Option<String> {
        if node.node_type() == Node::TEXT_NODE {
            node.text_content()
        } else {
            None
        }
    }

    fn text_len(&self, node: &Node) -> usize {
        // CharacterData.length is already in UTF-16 units.
        node.dyn_ref::<web_sys::Text>()
            .map(|text| text.length() as usize)
            .unwrap_or(0)
    }

    fn parent(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn children(&self, node: &Node) -> Vec<Node> {
        let list = node.child_nodes();
        (0..list.length()).filter_map(|i| list.item(i)).collect()
    }

    fn previous_element_sibling(&self, node: &Node) -> Option<Node> {
        node.dyn_ref::<Element>()?
            .previous_element_sibling()
            .map(Node::from)
    }

    fn next_element_sibling(&self, node: &Node) -> Option<Node> {
        node.dyn_ref::<Element>()?
            .next_element_sibling()
            .map(Node::from)
    }

    fn tag_name(&self, node: &Node) -> Option<SmolStr> {
        node.dyn_ref::<Element>()
            .map(|element| SmolStr::new(element.tag_name().to_ascii_lowercase()))
    }

    fn computed_display(&self, node: &Node) -> Option<SmolStr> {
        let element = node.dyn_ref::<Element>()?;
        let style = self.window.get_computed_style(element).ok()??;
        style.get_property_value("display").ok().map(SmolStr::from)
    }

    fn deep_clone(&self, node: &Node) -> Result<Node, DomError> {
        node.clone_node_with_deep(true).map_err(js_error)
    }

    fn insert_after(&self, reference: &Node, new: &Node) -> Result<(), DomError> {
        let parent = reference.parent_node().ok_or(DomError::Detached)?;
        parent
            .insert_before(new, reference.next_sibling().as_ref())
            .map_err(js_error)?;
        Ok(())
    }

    fn remove(&self, node: &Node) -> Result<(), DomError> {
        let parent = node.parent_node().ok_or(DomError::Detached)?;
        parent.remove_child(node).map_err(js_error)?;
        Ok(())
    }

    fn create_text(&self, text: &str) -> Result<Node, DomError> {
        Ok(self.document.create_text_node(text).into())
    }

    fn create_marker(&self, text: &str, class: &str) -> Result<Node, DomError> {
        let span = self.document.create_element("span").map_err(js_error)?;
        span.set_class_name(class);
        span.append_child(&self.document.create_text_node(text))
            .map_err(js_error)?;
        Ok(span.into())
    }

    fn replace_with(&self, old: &Node, replacements: &[Node]) -> Result<(), DomError> {
        let parent = old.parent_node().ok_or(DomError::Detached)?;
        for node in replacements {
            parent.insert_before(node, Some(old)).map_err(js_error)?;
        }
        parent.remove_child(old).map_err(js_error)?;
        Ok(())
    }

    fn bounding_rect(&self, node: &Node) -> Option<Rect> {
        if !node.is_connected() {
            return None;
        }
        if let Some(element) = node.dyn_ref::<Element>() {
            return Some(to_rect(&element.get_bounding_client_rect()));
        }
        let range = self.document.create_range().ok()?;
        range.select_node_contents(node).ok()?;
        Some(to_rect(&range.get_bounding_client_rect()))
    }
}
