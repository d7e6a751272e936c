//! Browser bindings for the Watio accessibility engine.
//!
//! Adapters for `localStorage`, the document root, speech synthesis and
//! recognition, the hosted profile table, and the Yew components that expose
//! the engine to the dashboard.
#![forbid(unsafe_code)]
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod a11y;
pub mod app;
pub mod browser;
pub mod components;
pub mod config;
pub mod context;
pub mod dom;
pub mod hooks;
pub mod router;
pub mod supabase;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    dom::inject_style("watio-a11y-base", a11y::base_css());
    yew::Renderer::<app::App>::new().render();
}
