//! Finding the landing position in the adjacent paragraph.
//!
//! Moving down lands on the target paragraph's first row, moving up on its
//! last row. Characters are scanned from the near end of that row outward
//! (left to right going down, right to left going up). Within a row the
//! distance to the preserved x shrinks and then grows, so the scan stops at
//! the first increase.

use crate::config::NavigatorConfig;
use crate::dom::{CaretDom, CloneGuard};
use crate::error::NavSkip;
use crate::probe::mark_range;
use crate::translate::{TextNodes, TraversalOrder, flatten, locate};
use crate::types::{CaretAnchor, Direction, Rect};

/// Why a row scan ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScanStop {
    /// Distance to the target grew; the previous character was closest.
    DistanceGrew,
    /// Walked off the row without the distance growing.
    RowChanged,
    /// Ran out of characters.
    Exhausted,
}

#[derive(Clone, Debug)]
struct Candidate<N> {
    /// Text node inside the character's marker.
    text: N,
    len: usize,
    left: f64,
    right: f64,
    distance: f64,
}

struct RowScan<N> {
    target_x: f64,
    tolerance: f64,
    expected_top: Option<f64>,
    best: Option<Candidate<N>>,
}

impl<N: Clone> RowScan<N> {
    fn new(target_x: f64, tolerance: f64) -> Self {
        Self {
            target_x,
            tolerance,
            expected_top: None,
            best: None,
        }
    }

    /// Feed the next character in scan order. Returns `Some` once the scan
    /// should stop; the character that triggered the stop is not recorded.
    fn push(&mut self, text: &N, len: usize, rect: Rect) -> Option<ScanStop> {
        match self.expected_top {
            None => self.expected_top = Some(rect.top),
            Some(top) if (rect.top - top).abs() > self.tolerance => {
                return Some(ScanStop::RowChanged);
            }
            Some(_) => {}
        }

        let distance = (rect.left - self.target_x).abs();
        if self
            .best
            .as_ref()
            .is_some_and(|best| distance > best.distance)
        {
            return Some(ScanStop::DistanceGrew);
        }

        self.best = Some(Candidate {
            text: text.clone(),
            len,
            left: rect.left,
            right: rect.right,
            distance,
        });
        None
    }

    /// Turn the best character into a caret position inside its marker.
    ///
    /// The caret goes before the character unless its right edge is strictly
    /// closer to the target. Going up, a scan that ran off the row keeps the
    /// leftmost character of the last row without comparing edges.
    fn resolve(self, stop: ScanStop, direction: Direction) -> Option<CaretAnchor<N>> {
        let best = self.best?;
        let compare_edges = !(stop == ScanStop::RowChanged && direction == Direction::Up);
        let after = compare_edges && (best.right - self.target_x).abs() < best.distance;

        tracing::trace!(
            target: "quire::caret",
            ?stop,
            ?direction,
            left = best.left,
            right = best.right,
            after,
            "resolved landing character"
        );

        Some(CaretAnchor::new(best.text, if after { best.len } else { 0 }))
    }
}

/// Find the caret position in `paragraph` whose x is closest to `target_x`,
/// on its first row (`Down`) or last row (`Up`).
///
/// The returned anchor points into the live `paragraph`, not the measurement
/// clone.
pub fn locate_closest<D: CaretDom>(
    dom: &D,
    direction: Direction,
    paragraph: &D::Node,
    target_x: f64,
    config: &NavigatorConfig,
) -> Result<CaretAnchor<D::Node>, NavSkip> {
    let guard = CloneGuard::attach(dom, paragraph)?;
    let clone = guard.node();

    let order = match direction {
        Direction::Down => TraversalOrder::Forward,
        Direction::Up => TraversalOrder::Reverse,
    };

    let mut scan = RowScan::new(target_x, config.row_tolerance_px);
    let mut stop = ScanStop::Exhausted;
    'nodes: for text in TextNodes::new(dom, clone, order) {
        let run = mark_range(dom, &text, None, &config.marker_class)?;
        let markers: Box<dyn Iterator<Item = _>> = match direction {
            Direction::Down => Box::new(run.markers.iter()),
            Direction::Up => Box::new(run.markers.iter().rev()),
        };
        for marker in markers {
            let rect = dom
                .bounding_rect(&marker.element)
                .ok_or(NavSkip::Unmeasurable)?;
            if let Some(reason) = scan.push(&marker.text, marker.len, rect) {
                stop = reason;
                break 'nodes;
            }
        }
    }

    let in_clone = scan
        .resolve(stop, direction)
        .ok_or(NavSkip::NoTargetPosition)?;
    let index = flatten(dom, &in_clone, clone).ok_or(NavSkip::Invariant(
        "landing marker is not inside the measurement clone",
    ))?;
    locate(dom, paragraph, index).ok_or(NavSkip::Unlocatable(index))
}
