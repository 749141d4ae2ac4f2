mod api;
mod canvas;

pub use api::TileStreamMap;
pub use canvas::{Camera, CanvasContext, WebEngine, WebImage};

use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}
