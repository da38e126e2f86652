//! quire-caret-core: caret line navigation across soft-wrapped paragraphs.
//!
//! Inside flex containers, browsers lose the caret's column when ArrowUp or
//! ArrowDown crosses from one wrapped paragraph into the next. This crate
//! recovers it using nothing but per-character bounding boxes:
//!
//! - `translate`: caret anchor ↔ flat index within a paragraph
//! - `probe`: per-character marker insertion and measurement on clones
//! - `boundary`: is the caret on the paragraph's first/last rendered row?
//! - `closest`: landing position in the adjacent paragraph
//! - `navigator`: the key-press entry point tying it together
//!
//! Everything is generic over [`CaretDom`] and [`SelectionAccess`], so the
//! same logic runs against `web-sys` in the browser and against
//! [`testing::MockDom`] in unit tests.

pub mod boundary;
pub mod closest;
pub mod config;
pub mod dom;
pub mod error;
pub mod navigator;
pub mod probe;
pub mod translate;
pub mod types;

#[cfg(any(test, feature = "test-dom"))]
pub mod testing;

pub use boundary::analyze;
pub use closest::locate_closest;
pub use config::NavigatorConfig;
pub use dom::{CaretDom, CloneGuard, DomError, NodeKind, SelectionAccess};
pub use error::{NavSkip, NavStage};
pub use navigator::{LineNavigator, NavOutcome};
pub use probe::{MarkedRun, Marker, mark_range, probe, unmark, visual_lines};
pub use smol_str::SmolStr;
pub use translate::{TextNodes, TraversalOrder, flatten, locate, text_length};
pub use types::{CaretAnchor, CharBox, Direction, LineBoundary, Rect};
