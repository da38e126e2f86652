//! Event handlers exposed to JavaScript.
//!
//! For hosts that run their own `keydown` handler instead of calling
//! `attach`. The handler returns whether the event was consumed; the
//! default action has already been prevented when it was.

use quire_caret_browser::{NavOutcome, handle_keydown};
use wasm_bindgen::prelude::*;
use web_sys::KeyboardEvent;

use crate::navigator::JsLineNavigator;

/// Result of handling an event.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// The caret moved and `preventDefault` was called.
    Handled,
    /// Event should pass through to browser.
    PassThrough,
}

impl<N> From<&NavOutcome<N>> for EventResult {
    fn from(outcome: &NavOutcome<N>) -> Self {
        if outcome.should_prevent_default() {
            EventResult::Handled
        } else {
            EventResult::PassThrough
        }
    }
}

#[wasm_bindgen]
impl JsLineNavigator {
    /// Handle a `keydown` event.
    #[wasm_bindgen(js_name = handleKeydown)]
    pub fn handle_keydown(&self, event: &KeyboardEvent) -> EventResult {
        let outcome = handle_keydown(&self.navigator, event);
        EventResult::from(&outcome)
    }

    /// Explain why a `keydown` event would be left to the browser.
    ///
    /// Runs the navigator like `handleKeydown` and returns the skip reason,
    /// or `undefined` if the caret moved.
    #[wasm_bindgen(js_name = handleKeydownVerbose)]
    pub fn handle_keydown_verbose(&self, event: &KeyboardEvent) -> Option<String> {
        handle_keydown(&self.navigator, event)
            .skip_reason()
            .map(|reason| reason.to_string())
    }
}
