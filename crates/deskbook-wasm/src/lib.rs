mod api;
mod bridge;
mod storage;

pub use api::BookingEngine;
pub use bridge::ApiBridge;
pub use storage::LocalStorage;

use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}
