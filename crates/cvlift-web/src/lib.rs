//! cvlift Web Frontend
//!
//! Leptos-based WASM landing page for the CV optimizer demo.

mod api;
mod app;
mod pages;
mod toast;

pub use app::App;

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}
