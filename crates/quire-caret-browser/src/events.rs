//! Keydown wiring.
//!
//! [`handle_keydown`] runs the navigator for one event and prevents the
//! default action only when the caret actually moved. [`LineNavigation`]
//! keeps a `keydown` listener attached for as long as it lives.

use gloo_events::{EventListener, EventListenerOptions};
use quire_caret_core::{
    Direction, LineNavigator, NavOutcome, NavSkip, NavStage, NavigatorConfig,
};
use wasm_bindgen::JsCast;
use web_sys::{EventTarget, KeyboardEvent, Node};

use crate::selection::WebSelection;
use crate::web_dom::WebDom;

fn skipped(stage: NavStage, reason: NavSkip) -> NavOutcome<Node> {
    NavOutcome::Skipped { stage, reason }
}

/// Handle one `keydown` event.
///
/// The event's target is the container checked for `display: flex`.
pub fn handle_keydown(navigator: &LineNavigator, event: &KeyboardEvent) -> NavOutcome<Node> {
    let key = event.key();
    // Most keys stop here, before any DOM access.
    if Direction::from_key(&key).is_none() {
        return skipped(NavStage::Idle, NavSkip::NotNavigationKey);
    }

    let Some(target) = event
        .target()
        .and_then(|target| target.dyn_into::<Node>().ok())
    else {
        tracing::debug!(target: "quire::caret", "keydown without a node target");
        return skipped(NavStage::KeyFiltered, NavSkip::NoEventTarget);
    };
    let Some(dom) = WebDom::new() else {
        return skipped(
            NavStage::KeyFiltered,
            NavSkip::Dom("no window or document".into()),
        );
    };
    let Some(mut selection) = WebSelection::current(dom.window()) else {
        return skipped(NavStage::KeyFiltered, NavSkip::NoSelection);
    };

    let outcome = navigator.handle_key(&dom, &mut selection, &key, &target);
    if outcome.should_prevent_default() {
        event.prevent_default();
    }
    outcome
}

/// A `keydown` listener driving a [`LineNavigator`].
///
/// Dropping it removes the listener.
pub struct LineNavigation {
    _listener: EventListener,
}

impl LineNavigation {
    /// Listen for arrow keys on `target`, usually the editable flex container.
    pub fn attach(target: &EventTarget, config: NavigatorConfig) -> Self {
        let navigator = LineNavigator::new(config);
        let listener = EventListener::new_with_options(
            target,
            "keydown",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                handle_keydown(&navigator, event);
            },
        );
        Self {
            _listener: listener,
        }
    }
}
