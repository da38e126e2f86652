//! Edge-line detection for a caret inside a paragraph.
//!
//! The caret is on the boundary line when its character renders on the same
//! row as the paragraph's first character (moving up) or last character
//! (moving down). Only then should an arrow press leave the paragraph.

use crate::config::NavigatorConfig;
use crate::dom::{CaretDom, CloneGuard};
use crate::error::NavSkip;
use crate::probe::{MarkedRun, mark_range, unmark};
use crate::translate::{locate, text_length};
use crate::types::{CaretAnchor, Direction, LineBoundary, Rect};

/// Check whether flat `index` in `paragraph` sits on the edge line for
/// `direction`, and compute the horizontal position to carry over.
///
/// The x position is the left edge of the character after the caret, or the
/// right edge of the last character when the caret is at the very end.
pub fn analyze<D: CaretDom>(
    dom: &D,
    direction: Direction,
    paragraph: &D::Node,
    index: usize,
    config: &NavigatorConfig,
) -> Result<LineBoundary, NavSkip> {
    let guard = CloneGuard::attach(dom, paragraph)?;
    let clone = guard.node();

    let len = text_length(dom, clone);
    if index > len {
        return Err(NavSkip::IndexOutOfRange { index, len });
    }
    if len == 0 {
        // An empty paragraph is a single line.
        let rect = dom.bounding_rect(clone).ok_or(NavSkip::Unmeasurable)?;
        return Ok(LineBoundary {
            on_boundary: true,
            current_x: rect.left,
        });
    }

    let at_end = index == len;
    let caret_index = if at_end { len - 1 } else { index };
    let edge_index = match direction {
        Direction::Up => 0,
        Direction::Down => len - 1,
    };

    let edge = locate(dom, clone, edge_index).ok_or(NavSkip::Unlocatable(edge_index))?;
    let caret = locate(dom, clone, caret_index).ok_or(NavSkip::Unlocatable(caret_index))?;

    let class = config.marker_class.as_str();
    let (edge_rect, caret_rect) = if edge.node == caret.node {
        // One pass over the shared node covers both positions.
        let run = mark_range(dom, &edge.node, Some(edge.offset.max(caret.offset)), class)?;
        (
            marker_rect(dom, &run, edge.offset)?,
            marker_rect(dom, &run, caret.offset)?,
        )
    } else {
        // Restore each node before marking the next so markers never collide.
        (
            measure_once(dom, &edge, class)?,
            measure_once(dom, &caret, class)?,
        )
    };

    let on_boundary = edge_rect.same_row(&caret_rect, config.row_tolerance_px);
    let current_x = if at_end {
        caret_rect.right
    } else {
        caret_rect.left
    };

    tracing::trace!(
        target: "quire::caret",
        ?direction,
        index,
        len,
        edge_top = edge_rect.top,
        caret_top = caret_rect.top,
        on_boundary,
        current_x,
        "analyzed caret line"
    );

    Ok(LineBoundary {
        on_boundary,
        current_x,
    })
}

fn measure_once<D: CaretDom>(
    dom: &D,
    at: &CaretAnchor<D::Node>,
    class: &str,
) -> Result<Rect, NavSkip> {
    let run = mark_range(dom, &at.node, Some(at.offset), class)?;
    let rect = marker_rect(dom, &run, at.offset);
    unmark(dom, run)?;
    rect
}

fn marker_rect<D: CaretDom>(
    dom: &D,
    run: &MarkedRun<D::Node>,
    offset: usize,
) -> Result<Rect, NavSkip> {
    let Some(marker) = run.marker_at(offset) else {
        debug_assert!(false, "marked run does not cover offset {offset}");
        return Err(NavSkip::Invariant("marked run does not cover the measured offset"));
    };
    dom.bounding_rect(&marker.element)
        .ok_or(NavSkip::Unmeasurable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDom;

    fn config() -> NavigatorConfig {
        NavigatorConfig::default()
    }

    /// 25 characters at 10 columns: rows of 10, 10 and 5.
    fn three_line_paragraph(dom: &MockDom) -> crate::testing::NodeId {
        let container = dom.element("div", dom.root());
        let para = dom.element("p", container);
        dom.text_node("abcdefghijklmnopqrstuvwxy", para);
        para
    }

    #[test]
    fn test_up_boundary_only_on_first_line() {
        let dom = MockDom::new(10);
        let para = three_line_paragraph(&dom);
        for index in 0..=25 {
            let result = analyze(&dom, Direction::Up, &para, index, &config()).unwrap();
            assert_eq!(result.on_boundary, index < 10, "index {index}");
        }
    }

    #[test]
    fn test_down_boundary_only_on_last_line() {
        let dom = MockDom::new(10);
        let para = three_line_paragraph(&dom);
        for index in 0..=25 {
            let result = analyze(&dom, Direction::Down, &para, index, &config()).unwrap();
            assert_eq!(result.on_boundary, index >= 20, "index {index}");
        }
    }

    #[test]
    fn test_current_x_left_edge_or_end() {
        let dom = MockDom::new(10);
        let para = three_line_paragraph(&dom);

        let mid = analyze(&dom, Direction::Down, &para, 13, &config()).unwrap();
        assert_eq!(mid.current_x, 30.0);

        // After the last character: right edge of 'y' (column 4).
        let end = analyze(&dom, Direction::Down, &para, 25, &config()).unwrap();
        assert!(end.on_boundary);
        assert_eq!(end.current_x, 50.0);
    }

    #[test]
    fn test_edge_and_caret_in_different_nodes() {
        let dom = MockDom::new(10);
        let container = dom.element("div", dom.root());
        let para = dom.element("p", container);
        dom.text_node("abcdefghij", para);
        let em = dom.element("em", para);
        dom.text_node("klm", em);

        let up = analyze(&dom, Direction::Up, &para, 11, &config()).unwrap();
        assert!(!up.on_boundary);
        assert_eq!(up.current_x, 10.0);

        let down = analyze(&dom, Direction::Down, &para, 11, &config()).unwrap();
        assert!(down.on_boundary);

        let first_line = analyze(&dom, Direction::Down, &para, 2, &config()).unwrap();
        assert!(!first_line.on_boundary);
        assert_eq!(first_line.current_x, 20.0);

        assert_eq!(dom.count_class("quire-caret-marker"), 0);
        assert_eq!(dom.children(&container), vec![para]);
    }

    #[test]
    fn test_single_line_is_both_boundaries() {
        let dom = MockDom::new(40);
        let para = dom.element("p", dom.root());
        dom.text_node("short", para);
        for direction in [Direction::Up, Direction::Down] {
            for index in 0..=5 {
                assert!(analyze(&dom, direction, &para, index, &config())
                    .unwrap()
                    .on_boundary);
            }
        }
    }

    #[test]
    fn test_empty_paragraph() {
        let dom = MockDom::new(10);
        let para = dom.element("p", dom.root());
        let result = analyze(&dom, Direction::Down, &para, 0, &config()).unwrap();
        assert!(result.on_boundary);
        assert_eq!(result.current_x, 0.0);
    }

    #[test]
    fn test_index_out_of_range() {
        let dom = MockDom::new(10);
        let para = dom.element("p", dom.root());
        dom.text_node("abc", para);
        assert_eq!(
            analyze(&dom, Direction::Up, &para, 4, &config()),
            Err(NavSkip::IndexOutOfRange { index: 4, len: 3 })
        );
        assert_eq!(dom.count_class("quire-caret-marker"), 0);
    }

    #[test]
    fn test_detached_paragraph() {
        let dom = MockDom::new(10);
        let para = dom.detached_element("p");
        dom.text_node("abc", para);
        assert!(matches!(
            analyze(&dom, Direction::Up, &para, 0, &config()),
            Err(NavSkip::Dom(_))
        ));
    }
}
