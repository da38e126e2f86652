//! WASM bindings for quire caret navigation.
//!
//! Lets a JavaScript host attach vertical arrow-key navigation to an
//! editable flex container, or drive it from its own `keydown` handler.

mod events;
mod navigator;

pub use events::*;
pub use navigator::*;

use wasm_bindgen::prelude::*;

/// Install the panic hook and the console tracing subscriber.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    use tracing::Level;
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt;

    let (console_level, directives) = if cfg!(debug_assertions) {
        (Level::DEBUG, "debug")
    } else {
        (Level::WARN, "warn")
    };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    let reg = Registry::default()
        .with(EnvFilter::new(directives))
        .with(wasm_layer);

    // A host page may already have installed a subscriber.
    let _ = set_global_default(reg);
}
