//! Core navigation types: caret anchors, direction, geometry records.
//!
//! These types are host-agnostic. `N` is whatever node handle the host DOM
//! hands out (`web_sys::Node` in the browser, an arena id in tests).

/// A caret position: a node plus an offset into it.
///
/// For text nodes the offset counts UTF-16 code units, matching the DOM
/// Selection API. For element nodes it is a child index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaretAnchor<N> {
    pub node: N,
    pub offset: usize,
}

impl<N> CaretAnchor<N> {
    /// Create a new anchor.
    pub fn new(node: N, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// Vertical navigation direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Map a `KeyboardEvent.key` value to a direction.
    ///
    /// Only `ArrowUp` and `ArrowDown` are navigation keys; everything else
    /// (including modifier-only presses) returns `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(Self::Up),
            "ArrowDown" => Some(Self::Down),
            _ => None,
        }
    }
}

/// Viewport-relative bounding box in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Whether two boxes sit on the same rendered row.
    pub fn same_row(&self, other: &Rect, tolerance: f64) -> bool {
        (self.top - other.top).abs() <= tolerance
    }
}

/// Rendered position of one probed character.
///
/// `index` and `len` are in UTF-16 units from the start of the probed
/// element; `len` is 2 for characters outside the BMP.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharBox {
    pub index: usize,
    pub len: usize,
    pub left: f64,
    pub right: f64,
    pub top: f64,
}

/// Outcome of checking whether the caret sits on a paragraph's edge line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineBoundary {
    /// The caret shares a row with the paragraph's first (up) or last
    /// (down) character.
    pub on_boundary: bool,
    /// Horizontal position to preserve across the move.
    pub current_x: f64,
}
