//! In-memory DOM with a deterministic monospace layout.
//!
//! Every `<p>` is a block stacked under the previous one. Text inside a block
//! wraps hard at `columns` characters; each character cell is
//! [`CHAR_WIDTH`] wide and each row [`LINE_HEIGHT`] tall. Only nodes attached
//! under [`MockDom::root`] have geometry, which is enough to exercise the
//! navigator without a browser.

use std::cell::RefCell;

use smol_str::SmolStr;

use crate::dom::{CaretDom, DomError, NodeKind, SelectionAccess};
use crate::types::{CaretAnchor, Rect};

pub const CHAR_WIDTH: f64 = 10.0;
pub const LINE_HEIGHT: f64 = 20.0;

const BLOCK_TAG: &str = "p";

/// Arena index of a mock node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Clone, Debug)]
enum NodeData {
    Text(String),
    Element {
        tag: SmolStr,
        class: Option<SmolStr>,
        display: Option<SmolStr>,
    },
    Comment(String),
}

#[derive(Clone, Debug)]
struct MockNode {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed DOM. Node 0 is the `<body>` root.
pub struct MockDom {
    nodes: RefCell<Vec<MockNode>>,
    columns: usize,
    hidden_markers: RefCell<Vec<String>>,
}

impl MockDom {
    /// A document whose paragraphs wrap at `columns` characters.
    pub fn new(columns: usize) -> Self {
        let root = MockNode {
            data: NodeData::Element {
                tag: SmolStr::new_static("body"),
                class: None,
                display: None,
            },
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: RefCell::new(vec![root]),
            columns: columns.max(1),
            hidden_markers: RefCell::new(Vec::new()),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a new element to `parent`.
    pub fn element(&self, tag: &str, parent: NodeId) -> NodeId {
        let node = self.detached_element(tag);
        self.append(parent, node);
        node
    }

    /// A new element with no parent.
    pub fn detached_element(&self, tag: &str) -> NodeId {
        self.alloc(NodeData::Element {
            tag: SmolStr::new(tag.to_ascii_lowercase()),
            class: None,
            display: None,
        })
    }

    /// Append a new text node to `parent`.
    pub fn text_node(&self, text: &str, parent: NodeId) -> NodeId {
        let node = self.alloc(NodeData::Text(text.to_string()));
        self.append(parent, node);
        node
    }

    /// Append a new comment node to `parent`.
    pub fn comment_node(&self, text: &str, parent: NodeId) -> NodeId {
        let node = self.alloc(NodeData::Comment(text.to_string()));
        self.append(parent, node);
        node
    }

    /// Override the computed `display` of an element.
    pub fn set_display(&self, node: NodeId, value: &str) {
        if let NodeData::Element { display, .. } = &mut self.nodes.borrow_mut()[node.0].data {
            *display = Some(SmolStr::new(value));
        }
    }

    /// Report no geometry for classed elements whose text is exactly `text`,
    /// as a host would for a marker that never got laid out.
    pub fn hide_marker(&self, text: &str) {
        self.hidden_markers.borrow_mut().push(text.to_string());
    }

    fn is_hidden_marker(&self, node: NodeId) -> bool {
        let classed = matches!(
            self.nodes.borrow()[node.0].data,
            NodeData::Element { class: Some(_), .. }
        );
        classed && {
            let text = self.text_content(&node);
            self.hidden_markers.borrow().iter().any(|hidden| *hidden == text)
        }
    }

    /// Serialize `node` as HTML (no escaping, no attributes but `class`).
    pub fn outer_html(&self, node: &NodeId) -> String {
        let mut out = String::new();
        self.write_html(*node, &mut out);
        out
    }

    /// Concatenated text of `node` and its descendants.
    pub fn text_content(&self, node: &NodeId) -> String {
        let nodes = self.nodes.borrow();
        let mut out = String::new();
        collect_text(&nodes, *node, &mut out);
        out
    }

    /// Number of attached elements carrying `class`.
    pub fn count_class(&self, class: &str) -> usize {
        let nodes = self.nodes.borrow();
        let mut count = 0;
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            let node = &nodes[id.0];
            if let NodeData::Element { class: Some(c), .. } = &node.data {
                if c == class {
                    count += 1;
                }
            }
            stack.extend(node.children.iter().copied());
        }
        count
    }

    fn alloc(&self, data: NodeData) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(MockNode {
            data,
            parent: None,
            children: Vec::new(),
        });
        NodeId(nodes.len() - 1)
    }

    fn append(&self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let mut nodes = self.nodes.borrow_mut();
        nodes[parent.0].children.push(child);
        nodes[child.0].parent = Some(parent);
    }

    fn detach(&self, node: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(parent) = nodes[node.0].parent.take() {
            nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let (data, children) = {
            let nodes = self.nodes.borrow();
            (nodes[id.0].data.clone(), nodes[id.0].children.clone())
        };
        match data {
            NodeData::Text(text) => out.push_str(&text),
            NodeData::Comment(text) => {
                out.push_str("<!--");
                out.push_str(&text);
                out.push_str("-->");
            }
            NodeData::Element { tag, class, .. } => {
                out.push('<');
                out.push_str(&tag);
                if let Some(class) = class {
                    out.push_str(" class=\"");
                    out.push_str(&class);
                    out.push('"');
                }
                out.push('>');
                for child in children {
                    self.write_html(child, out);
                }
                out.push_str("</");
                out.push_str(&tag);
                out.push('>');
            }
        }
    }

    fn is_attached(&self, id: NodeId) -> bool {
        let nodes = self.nodes.borrow();
        let mut current = id;
        loop {
            if current == self.root() {
                return true;
            }
            match nodes[current.0].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn is_block(&self, id: NodeId) -> bool {
        matches!(&self.nodes.borrow()[id.0].data, NodeData::Element { tag, .. } if tag == BLOCK_TAG)
    }

    fn enclosing_block(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            if self.is_block(current) {
                return Some(current);
            }
            current = self.nodes.borrow()[current.0].parent?;
        }
    }

    fn char_count(&self, id: NodeId) -> usize {
        self.text_content(&id).chars().count()
    }

    fn block_rows(&self, block: NodeId) -> usize {
        self.char_count(block).div_ceil(self.columns).max(1)
    }

    /// Top of `block`: total height of the attached blocks before it.
    fn block_top(&self, block: NodeId) -> f64 {
        let mut rows = 0;
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            if id == block {
                break;
            }
            if self.is_block(id) {
                rows += self.block_rows(id);
                continue;
            }
            let children = self.nodes.borrow()[id.0].children.clone();
            stack.extend(children.into_iter().rev());
        }
        rows as f64 * LINE_HEIGHT
    }

    /// Characters in `block` that come before `target` in document order.
    fn chars_before(&self, block: NodeId, target: NodeId) -> usize {
        let mut count = 0;
        let mut stack = vec![block];
        while let Some(id) = stack.pop() {
            if id == target {
                break;
            }
            let (data, children) = {
                let nodes = self.nodes.borrow();
                (nodes[id.0].data.clone(), nodes[id.0].children.clone())
            };
            match data {
                NodeData::Text(text) => count += text.chars().count(),
                NodeData::Element { .. } => stack.extend(children.into_iter().rev()),
                NodeData::Comment(_) => {}
            }
        }
        count
    }

    fn cell(&self, top: f64, index: usize) -> Rect {
        let row = (index / self.columns) as f64;
        let left = (index % self.columns) as f64 * CHAR_WIDTH;
        let cell_top = top + row * LINE_HEIGHT;
        Rect::new(left, left + CHAR_WIDTH, cell_top, cell_top + LINE_HEIGHT)
    }
}

fn collect_text(nodes: &[MockNode], id: NodeId, out: &mut String) {
    match &nodes[id.0].data {
        NodeData::Text(text) => out.push_str(text),
        NodeData::Element { .. } => {
            for child in &nodes[id.0].children {
                collect_text(nodes, *child, out);
            }
        }
        NodeData::Comment(_) => {}
    }
}

impl CaretDom for MockDom {
    type Node = NodeId;

    fn kind(&self, node: &NodeId) -> NodeKind {
        match self.nodes.borrow()[node.0].data {
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Element { .. } => NodeKind::Element,
            NodeData::Comment(_) => NodeKind::Other,
        }
    }

    fn text(&self, node: &NodeId) -> Option<String> {
        match &self.nodes.borrow()[node.0].data {
            NodeData::Text(text) => Some(text.clone()),
            _ => None,
        }
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.borrow()[node.0].parent
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.nodes.borrow()[node.0].children.clone()
    }

    fn previous_element_sibling(&self, node: &NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(&parent);
        let index = siblings.iter().position(|s| s == node)?;
        siblings[..index]
            .iter()
            .rev()
            .find(|s| self.kind(s) == NodeKind::Element)
            .copied()
    }

    fn next_element_sibling(&self, node: &NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(&parent);
        let index = siblings.iter().position(|s| s == node)?;
        siblings[index + 1..]
            .iter()
            .find(|s| self.kind(s) == NodeKind::Element)
            .copied()
    }

    fn tag_name(&self, node: &NodeId) -> Option<SmolStr> {
        match &self.nodes.borrow()[node.0].data {
            NodeData::Element { tag, .. } => Some(tag.clone()),
            _ => None,
        }
    }

    fn computed_display(&self, node: &NodeId) -> Option<SmolStr> {
        match &self.nodes.borrow()[node.0].data {
            NodeData::Element {
                display: Some(display),
                ..
            } => Some(display.clone()),
            NodeData::Element { tag, .. } => Some(SmolStr::new_static(
                match tag.as_str() {
                    "body" | "div" | "p" => "block",
                    _ => "inline",
                },
            )),
            _ => None,
        }
    }

    fn deep_clone(&self, node: &NodeId) -> Result<NodeId, DomError> {
        let (data, children) = {
            let nodes = self.nodes.borrow();
            (nodes[node.0].data.clone(), nodes[node.0].children.clone())
        };
        let copy = self.alloc(data);
        for child in children {
            let child_copy = self.deep_clone(&child)?;
            self.append(copy, child_copy);
        }
        Ok(copy)
    }

    fn insert_after(&self, reference: &NodeId, new: &NodeId) -> Result<(), DomError> {
        let parent = self.parent(reference).ok_or(DomError::Detached)?;
        self.detach(*new);
        let mut nodes = self.nodes.borrow_mut();
        let index = nodes[parent.0]
            .children
            .iter()
            .position(|c| c == reference)
            .ok_or("reference missing from its parent")?;
        nodes[parent.0].children.insert(index + 1, *new);
        nodes[new.0].parent = Some(parent);
        Ok(())
    }

    fn remove(&self, node: &NodeId) -> Result<(), DomError> {
        if self.parent(node).is_none() {
            return Err(DomError::Detached);
        }
        self.detach(*node);
        Ok(())
    }

    fn create_text(&self, text: &str) -> Result<NodeId, DomError> {
        Ok(self.alloc(NodeData::Text(text.to_string())))
    }

    fn create_marker(&self, text: &str, class: &str) -> Result<NodeId, DomError> {
        let marker = self.alloc(NodeData::Element {
            tag: SmolStr::new_static("span"),
            class: Some(SmolStr::new(class)),
            display: None,
        });
        let inner = self.create_text(text)?;
        self.append(marker, inner);
        Ok(marker)
    }

    fn replace_with(&self, old: &NodeId, replacements: &[NodeId]) -> Result<(), DomError> {
        let parent = self.parent(old).ok_or(DomError::Detached)?;
        for node in replacements {
            self.detach(*node);
        }
        let mut nodes = self.nodes.borrow_mut();
        let index = nodes[parent.0]
            .children
            .iter()
            .position(|c| c == old)
            .ok_or("node missing from its parent")?;
        let _replaced: Vec<_> = nodes[parent.0]
            .children
            .splice(index..=index, replacements.iter().copied())
            .collect();
        nodes[old.0].parent = None;
        for node in replacements {
            nodes[node.0].parent = Some(parent);
        }
        Ok(())
    }

    fn bounding_rect(&self, node: &NodeId) -> Option<Rect> {
        if !self.is_attached(*node) || self.is_hidden_marker(*node) {
            return None;
        }
        let block = self.enclosing_block(*node)?;
        let top = self.block_top(block);
        if block == *node {
            let width = self.columns as f64 * CHAR_WIDTH;
            let height = self.block_rows(block) as f64 * LINE_HEIGHT;
            return Some(Rect::new(0.0, width, top, top + height));
        }

        let start = self.chars_before(block, *node);
        let len = self.char_count(*node);
        if len == 0 {
            let cell = self.cell(top, start);
            return Some(Rect::new(cell.left, cell.left, cell.top, cell.bottom));
        }
        (start..start + len)
            .map(|index| self.cell(top, index))
            .reduce(|a, b| {
                Rect::new(
                    a.left.min(b.left),
                    a.right.max(b.right),
                    a.top.min(b.top),
                    a.bottom.max(b.bottom),
                )
            })
    }
}

/// Selection stand-in that records how often it was collapsed.
#[derive(Debug, Default)]
pub struct MockSelection {
    pub anchor: Option<CaretAnchor<NodeId>>,
    pub collapse_count: usize,
    /// Make `collapse` fail, as a host might for a detached node.
    pub fail_collapse: bool,
}

impl MockSelection {
    pub fn at(anchor: CaretAnchor<NodeId>) -> Self {
        Self {
            anchor: Some(anchor),
            ..Self::default()
        }
    }
}

impl SelectionAccess<NodeId> for MockSelection {
    fn anchor(&self) -> Option<CaretAnchor<NodeId>> {
        self.anchor.clone()
    }

    fn collapse(&mut self, anchor: &CaretAnchor<NodeId>) -> Result<(), DomError> {
        if self.fail_collapse {
            return Err("selection refused to collapse".into());
        }
        self.anchor = Some(anchor.clone());
        self.collapse_count += 1;
        Ok(())
    }
}
