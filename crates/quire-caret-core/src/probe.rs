//! Per-character geometry probing.
//!
//! There is no way to ask the host for line boxes, so we wrap characters in
//! individually measurable inline markers and read each marker's bounding
//! box. All marking happens on a measurement clone (see [`CloneGuard`]) so
//! the live selection is never disturbed.

use crate::config::NavigatorConfig;
use crate::dom::{CaretDom, CloneGuard, DomError};
use crate::error::NavSkip;
use crate::translate::{TextNodes, TraversalOrder};
use crate::types::CharBox;

/// One temporary marker wrapping a single character.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker<N> {
    /// The marker element.
    pub element: N,
    /// The text node inside the marker.
    pub text: N,
    /// Offset of the character within the original text node, UTF-16 units.
    pub offset: usize,
    /// UTF-16 length of the character (1 or 2).
    pub len: usize,
}

/// A text node that has been split into markers plus an unmarked tail.
#[derive(Clone, Debug)]
pub struct MarkedRun<N> {
    /// Element that now holds the markers.
    pub parent: N,
    pub markers: Vec<Marker<N>>,
    /// Remaining text after the last marker, as one plain text node.
    pub rest: Option<N>,
    original: String,
}

impl<N> MarkedRun<N> {
    /// Marker covering the UTF-16 `offset` of the original text.
    pub fn marker_at(&self, offset: usize) -> Option<&Marker<N>> {
        self.markers
            .iter()
            .find(|marker| marker.offset <= offset && offset < marker.offset + marker.len)
    }

    /// Text the run was made from.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// UTF-16 length of the original text.
    pub fn len(&self) -> usize {
        self.original.encode_utf16().count()
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }
}

/// Split `node` so every character up to and including UTF-16 offset
/// `through` sits in its own marker; the remainder stays as a single text
/// node. `None` marks the whole node.
///
/// No characters are added, removed or reordered. An empty text node is left
/// untouched and yields a run with no markers.
pub fn mark_range<D: CaretDom>(
    dom: &D,
    node: &D::Node,
    through: Option<usize>,
    marker_class: &str,
) -> Result<MarkedRun<D::Node>, DomError> {
    let original = dom.text(node).ok_or(DomError::NotText)?;
    let parent = dom.parent(node).ok_or(DomError::Detached)?;
    if original.is_empty() {
        return Ok(MarkedRun {
            parent,
            markers: Vec::new(),
            rest: Some(node.clone()),
            original,
        });
    }

    let mut markers = Vec::new();
    let mut offset = 0;
    let mut split_at = original.len();
    for (byte, ch) in original.char_indices() {
        if through.is_some_and(|last| offset > last) {
            split_at = byte;
            break;
        }
        let mut buf = [0u8; 4];
        let element = dom.create_marker(ch.encode_utf8(&mut buf), marker_class)?;
        let text = dom
            .children(&element)
            .into_iter()
            .next()
            .ok_or(DomError::NotText)?;
        let len = ch.len_utf16();
        markers.push(Marker {
            element,
            text,
            offset,
            len,
        });
        offset += len;
    }

    let rest = if split_at < original.len() {
        Some(dom.create_text(&original[split_at..])?)
    } else {
        None
    };

    let mut replacements: Vec<_> = markers.iter().map(|m| m.element.clone()).collect();
    replacements.extend(rest.iter().cloned());
    dom.replace_with(node, &replacements)?;

    tracing::trace!(
        target: "quire::caret",
        markers = markers.len(),
        has_rest = rest.is_some(),
        "marked text node"
    );

    Ok(MarkedRun {
        parent,
        markers,
        rest,
        original,
    })
}

/// Undo [`mark_range`], putting the original text back as one text node.
///
/// Returns the restored text node.
pub fn unmark<D: CaretDom>(dom: &D, run: MarkedRun<D::Node>) -> Result<D::Node, DomError> {
    let Some(first) = run.markers.first() else {
        // Nothing was split.
        return run.rest.ok_or(DomError::NotText);
    };
    let restored = dom.create_text(&run.original)?;
    dom.replace_with(&first.element, std::slice::from_ref(&restored))?;
    for marker in &run.markers[1..] {
        dom.remove(&marker.element)?;
    }
    if let Some(rest) = &run.rest {
        dom.remove(rest)?;
    }
    Ok(restored)
}

/// Measure every character under `element`, in document order.
///
/// Works on a clone attached next to `element`, using the configured marker
/// class. Returns an empty vector when measurement is unavailable (detached
/// element, host refused a mutation, a marker without layout); callers treat
/// that as "do nothing".
pub fn probe<D: CaretDom>(dom: &D, element: &D::Node, config: &NavigatorConfig) -> Vec<CharBox> {
    let guard = match CloneGuard::attach(dom, element) {
        Ok(guard) => guard,
        Err(err) => {
            tracing::debug!(target: "quire::caret", %err, "probe: cannot clone element");
            return Vec::new();
        }
    };

    match measure_all(dom, guard.node(), &config.marker_class) {
        Ok(records) => {
            tracing::trace!(
                target: "quire::caret",
                count = records.len(),
                rows = visual_lines(&records, config.row_tolerance_px).len(),
                "probe: measured"
            );
            records
        }
        Err(err) => {
            tracing::debug!(target: "quire::caret", %err, "probe: measurement failed");
            Vec::new()
        }
    }
}

fn measure_all<D: CaretDom>(
    dom: &D,
    root: &D::Node,
    marker_class: &str,
) -> Result<Vec<CharBox>, NavSkip> {
    let mut records = Vec::new();
    let mut consumed = 0;
    for text in TextNodes::new(dom, root, TraversalOrder::Forward) {
        let run = mark_range(dom, &text, None, marker_class)?;
        for marker in &run.markers {
            let rect = dom
                .bounding_rect(&marker.element)
                .ok_or(NavSkip::Unmeasurable)?;
            records.push(CharBox {
                index: consumed + marker.offset,
                len: marker.len,
                left: rect.left,
                right: rect.right,
                top: rect.top,
            });
        }
        consumed += run.len();
    }
    Ok(records)
}

/// Group probe records into rendered rows.
///
/// A new row starts whenever a record's `top` differs from the first record
/// of the current row by more than `tolerance`.
pub fn visual_lines(records: &[CharBox], tolerance: f64) -> Vec<Vec<CharBox>> {
    let mut lines: Vec<Vec<CharBox>> = Vec::new();
    for record in records {
        match lines.last_mut() {
            Some(line) if (line[0].top - record.top).abs() <= tolerance => line.push(*record),
            _ => lines.push(vec![*record]),
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDom;

    const MARKER: &str = "quire-caret-marker";

    #[test]
    fn test_mark_range_prefix() {
        let dom = MockDom::new(40);
        let para = dom.element("p", dom.root());
        let text = dom.text_node("abcd", para);

        let run = mark_range(&dom, &text, Some(1), MARKER).unwrap();
        assert_eq!(run.parent, para);
        assert_eq!(run.markers.len(), 2);
        assert_eq!(run.marker_at(1).map(|m| m.offset), Some(1));
        assert!(run.marker_at(2).is_none());
        insta::assert_snapshot!(
            dom.outer_html(&para),
            @r#"<p><span class="quire-caret-marker">a</span><span class="quire-caret-marker">b</span>cd</p>"#
        );

        let restored = unmark(&dom, run).unwrap();
        assert_eq!(dom.children(&para), vec![restored]);
        assert_eq!(dom.outer_html(&para), "<p>abcd</p>");
    }

    #[test]
    fn test_mark_range_whole_node() {
        let dom = MockDom::new(40);
        let para = dom.element("p", dom.root());
        let em = dom.element("em", para);
        let text = dom.text_node("xy", em);
        dom.text_node("z", para);

        let run = mark_range(&dom, &text, None, MARKER).unwrap();
        assert_eq!(run.parent, em);
        assert!(run.rest.is_none());
        insta::assert_snapshot!(
            dom.outer_html(&para),
            @r#"<p><em><span class="quire-caret-marker">x</span><span class="quire-caret-marker">y</span></em>z</p>"#
        );
    }

    #[test]
    fn test_mark_range_through_past_end() {
        let dom = MockDom::new(40);
        let para = dom.element("p", dom.root());
        let text = dom.text_node("ab", para);

        let run = mark_range(&dom, &text, Some(10), MARKER).unwrap();
        assert_eq!(run.markers.len(), 2);
        assert!(run.rest.is_none());
    }

    #[test]
    fn test_mark_range_surrogate_pair() {
        let dom = MockDom::new(40);
        let para = dom.element("p", dom.root());
        let text = dom.text_node("a😀b", para);

        // Offset 2 is the low half of the emoji; it belongs to the same marker.
        let run = mark_range(&dom, &text, Some(2), MARKER).unwrap();
        assert_eq!(run.markers.len(), 2);
        assert_eq!(run.marker_at(2).map(|m| (m.offset, m.len)), Some((1, 2)));
        assert_eq!(run.len(), 4);
        assert_eq!(dom.text_content(&para), "a😀b");
    }

    #[test]
    fn test_mark_range_empty_text_untouched() {
        let dom = MockDom::new(40);
        let para = dom.element("p", dom.root());
        let text = dom.text_node("", para);

        let run = mark_range(&dom, &text, None, MARKER).unwrap();
        assert!(run.markers.is_empty());
        assert_eq!(dom.children(&para), vec![text]);
        assert_eq!(unmark(&dom, run).unwrap(), text);
    }

    #[test]
    fn test_mark_range_rejects_elements() {
        let dom = MockDom::new(40);
        let para = dom.element("p", dom.root());
        assert!(matches!(
            mark_range(&dom, &para, None, MARKER),
            Err(DomError::NotText)
        ));
    }

    #[test]
    fn test_probe_records_and_cleanup() {
        let dom = MockDom::new(4);
        let container = dom.element("div", dom.root());
        let para = dom.element("p", container);
        dom.text_node("abc", para);
        let strong = dom.element("strong", para);
        dom.text_node("defg", strong);

        let config = NavigatorConfig::default();
        let records = probe(&dom, &para, &config);
        assert_eq!(records.len(), 7);
        assert_eq!(
            records.iter().map(|r| r.index).collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 4, 5, 6]
        );
        // Four columns of 10px: "abcd" on the first row, "efg" on the second.
        assert_eq!(records[3].left, 30.0);
        assert_eq!(records[3].right, 40.0);
        assert_eq!(records[4].left, 0.0);
        assert!(records[4].top > records[3].top);

        let lines = visual_lines(&records, config.row_tolerance_px);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 4);
        assert_eq!(lines[1].len(), 3);

        assert_eq!(dom.count_class(MARKER), 0);
        assert_eq!(dom.children(&container), vec![para]);
    }

    #[test]
    fn test_probe_detached_is_empty() {
        let dom = MockDom::new(10);
        let para = dom.detached_element("p");
        dom.text_node("text", para);
        assert!(probe(&dom, &para, &NavigatorConfig::default()).is_empty());
    }

    #[test]
    fn test_visual_lines_empty() {
        assert!(visual_lines(&[], 1.0).is_empty());
    }

    #[test]
    fn test_probe_unmeasurable_marker_is_empty() {
        let dom = MockDom::new(10);
        let para = dom.element("p", dom.root());
        dom.text_node("abcd", para);
        dom.hide_marker("c");
        assert!(probe(&dom, &para, &NavigatorConfig::default()).is_empty());
        assert_eq!(dom.count_class(MARKER), 0);
    }
}
