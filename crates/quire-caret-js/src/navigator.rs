//! JsLineNavigator - the navigator wrapper for JavaScript.

use quire_caret_browser::{LineNavigation, LineNavigator, NavigatorConfig};
use wasm_bindgen::prelude::*;

/// Vertical caret navigation exposed to JavaScript.
#[wasm_bindgen]
pub struct JsLineNavigator {
    pub(crate) navigator: LineNavigator,
    listener: Option<LineNavigation>,
    element_id: Option<String>,
}

#[wasm_bindgen]
impl JsLineNavigator {
    /// Create a navigator.
    ///
    /// `config` is a plain object such as `{ paragraphTag: "p" }`; missing
    /// fields and `undefined` fall back to defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsLineNavigator, JsError> {
        let config: NavigatorConfig = if config.is_undefined() || config.is_null() {
            NavigatorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsError::new(&format!("Invalid navigator config: {}", e)))?
        };
        tracing::debug!(target: "quire::caret", ?config, "navigator created");

        Ok(Self {
            navigator: LineNavigator::new(config),
            listener: None,
            element_id: None,
        })
    }

    /// The active configuration as a plain object.
    #[wasm_bindgen(js_name = getConfig)]
    pub fn get_config(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(self.navigator.config())
            .map_err(|e| JsError::new(&format!("Failed to serialize config: {}", e)))
    }

    // === Attaching ===

    /// Listen for arrow keys on the element with the given id.
    ///
    /// Replaces any previous attachment.
    #[wasm_bindgen]
    pub fn attach(&mut self, element_id: &str) -> Result<(), JsError> {
        let window = web_sys::window().ok_or_else(|| JsError::new("No window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsError::new("No document"))?;
        let element = document
            .get_element_by_id(element_id)
            .ok_or_else(|| JsError::new(&format!("No element with id {}", element_id)))?;

        self.detach();
        self.listener = Some(LineNavigation::attach(
            &element,
            self.navigator.config().clone(),
        ));
        self.element_id = Some(element_id.to_string());
        tracing::debug!(target: "quire::caret", element_id, "navigation attached");
        Ok(())
    }

    /// Check if a listener is attached.
    #[wasm_bindgen(js_name = isAttached)]
    pub fn is_attached(&self) -> bool {
        self.listener.is_some()
    }

    /// Id of the element the listener is attached to.
    #[wasm_bindgen(js_name = attachedTo)]
    pub fn attached_to(&self) -> Option<String> {
        self.element_id.clone()
    }

    /// Remove the listener, if any.
    #[wasm_bindgen]
    pub fn detach(&mut self) {
        if let Some(id) = self.element_id.take() {
            tracing::debug!(target: "quire::caret", element_id = %id, "navigation detached");
        }
        self.listener = None;
    }
}
