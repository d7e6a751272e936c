#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;
use watio_access::{AccessibilityManager, PreferenceStore};
use watio_web::browser::{BrowserSpeech, DocumentSurface, WebStore};
use watio_web::dom;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn local_storage_round_trips_keys() {
    let store = WebStore::open();
    assert!(store.is_persistent());
    store.set("accessibility_font_size", "20").unwrap();
    assert_eq!(
        store.get("accessibility_font_size").unwrap().as_deref(),
        Some("20")
    );
    store.remove("accessibility_font_size").unwrap();
}

#[wasm_bindgen_test]
fn manager_paints_document_root() {
    let surface = DocumentSurface::from_document();
    assert!(surface.is_attached());
    let mut manager =
        AccessibilityManager::load(WebStore::open(), surface, BrowserSpeech::silent(), false);
    manager.set_high_contrast(true);
    let root = dom::document_root().unwrap();
    assert!(root.class_list().contains("high-contrast"));
    manager.set_high_contrast(false);
    assert!(!root.class_list().contains("high-contrast"));
}
