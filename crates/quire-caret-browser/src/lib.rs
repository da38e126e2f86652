//! Browser DOM layer for quire caret navigation.
//!
//! This crate implements the `quire-caret-core` host traits over `web-sys`
//! and wires the navigator to `keydown` events. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `web_dom`: [`CaretDom`] over the live document
//! - `selection`: [`SelectionAccess`] over `window.getSelection()`
//! - `events`: keydown handling and listener lifetime
//!
//! # Re-exports
//!
//! This crate re-exports `quire-caret-core` for convenience, so consumers
//! only need to depend on `quire-caret-browser`.

// Re-export core crate
pub use quire_caret_core;
pub use quire_caret_core::*;

pub mod events;
pub mod selection;
pub mod web_dom;

pub use events::{LineNavigation, handle_keydown};
pub use selection::WebSelection;
pub use web_dom::WebDom;
