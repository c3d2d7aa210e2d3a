//! Browser-only checks, run with `wasm-pack test --headless --firefox`
#![cfg(target_arch = "wasm32")]

use deskbook_core::session::TOKEN_KEY;
use deskbook_core::TokenStorage;
use deskbook_wasm::{ApiBridge, BookingEngine, LocalStorage};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_local_storage_round_trip() {
    let mut storage = LocalStorage;
    storage.set("deskbook-test", "value");
    assert_eq!(storage.get("deskbook-test").as_deref(), Some("value"));
    storage.remove("deskbook-test");
    assert!(storage.get("deskbook-test").is_none());
}

#[wasm_bindgen_test]
fn test_bridge_restores_token() {
    let mut storage = LocalStorage;
    storage.set(TOKEN_KEY, "persisted");
    let bridge = ApiBridge::new("http://127.0.0.1:8080").unwrap();
    assert!(bridge.has_token());

    bridge.logout();
    assert!(!bridge.has_token());
    assert!(storage.get(TOKEN_KEY).is_none());
}

#[wasm_bindgen_test]
fn test_engine_rejects_bad_clock() {
    let err = BookingEngine::new("not a date", 0.0).err().unwrap();
    assert!(err.is_object());
}
