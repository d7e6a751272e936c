//! Browser implementations of the engine's host traits.
//!
//! Each adapter degrades to a harmless stand-in when the browser API is
//! missing, so the provider can be rendered outside a browser.

pub mod recognition;
pub mod speech;
pub mod storage;
pub mod surface;

pub use recognition::BrowserRecognizer;
pub use speech::BrowserSpeech;
pub use storage::{WebStore, WebStoreError};
pub use surface::DocumentSurface;
