//! Content-script entry point for the proofmark browser extension.
//!
//! Exposes a `LiveChecker` class to JavaScript. Constructing one and calling
//! `start()` registers every editable region on the page, keeps watching for
//! new ones, and attaches a correction trigger icon to each.

pub mod api;
pub mod icons;
pub mod observer;
pub mod storage;

pub use api::JsLiveChecker;
pub use icons::TriggerIcons;
pub use observer::RescanObserver;
pub use storage::LocalStorageSettingsStore;

use wasm_bindgen::prelude::*;

#[cfg(test)]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

/// Runs once when the module is instantiated.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages for wasm
    console_error_panic_hook::set_once();

    use tracing::Level;
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    let _ = set_global_default(Registry::default().with(wasm_layer));
}
