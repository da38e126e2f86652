//! Reasons a navigation pass stops without moving the caret.
//!
//! None of these reach the user. The navigator logs them at debug level and
//! lets the browser's own arrow-key handling stand.

use smol_str::SmolStr;

use crate::dom::{DomError, NodeKind};

/// Pipeline stages of a single key press, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NavStage {
    Idle,
    KeyFiltered,
    ContainerValidated,
    SelectionCaptured,
    IndexResolved,
    BoundaryChecked,
    TargetLocated,
    Applied,
}

/// Why the navigator left the caret alone.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NavSkip {
    // Preconditions
    #[error("not an ArrowUp/ArrowDown key")]
    NotNavigationKey,
    #[error("key event has no target node")]
    NoEventTarget,
    #[error("event target is not a flex container (display: {display:?})")]
    NotFlexContainer { display: Option<SmolStr> },
    #[error("no active selection")]
    NoSelection,
    #[error("selection anchor of kind {0:?} is not supported")]
    UnsupportedAnchor(NodeKind),
    #[error("element anchor on ArrowDown is not handled")]
    ElementAnchorUnhandled,

    // Structural lookups
    #[error("caret is not inside a paragraph")]
    NoParagraph,
    #[error("caret anchor is not contained in its paragraph")]
    Unflattenable,
    #[error("flat index {index} is past the paragraph end ({len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("flat index {0} has no text position")]
    Unlocatable(usize),
    #[error("caret is not on the paragraph's edge line")]
    NotOnBoundaryLine,
    #[error("no adjacent paragraph in that direction")]
    NoAdjacentParagraph,
    #[error("adjacent paragraph has no text position to land on")]
    NoTargetPosition,

    // Measurement
    #[error("geometry unavailable for a probed node")]
    Unmeasurable,
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("internal invariant violated: {0}")]
    Invariant(&'static str),
}
