//! Browser tests: `wasm-pack test --headless --firefox crates/apps/web`

#![cfg(target_arch = "wasm32")]

use brickyard_web::create;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_creates_classed_elements() {
    let document = web_sys::window().unwrap().document().unwrap();
    let card = create(&document, "div", "piece-card selected").unwrap();
    assert_eq!(card.tag_name(), "DIV");
    assert!(card.class_list().contains("selected"));
}

#[wasm_bindgen_test]
fn test_mount_fails_without_host_markup() {
    assert!(brickyard_web::mount(None).is_err());
}
