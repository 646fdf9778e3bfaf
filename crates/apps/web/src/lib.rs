//! Brickyard browser front-end
//!
//! Binds the host page's elements to a [`brickyard_studio::Session`]. All
//! state transitions live in the studio crate; this crate only turns DOM
//! events into session calls and re-renders.
//!
//! The host page calls `mount()` once after loading the module, optionally
//! with the generation backend URL.

mod arrangement;
mod detect;
mod dom;
mod gateway;
mod library;
mod state;
mod upload;

use state::{refresh, App};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

pub use dom::create;

/// Backend the page talks to when `mount()` is given no URL
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5051";

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
}

/// Wire every control of the page and render the initial state
#[wasm_bindgen]
pub fn mount(backend_url: Option<String>) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no global window")?;
    let document = window.document().ok_or("window has no document")?;
    let backend_url = backend_url
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

    let shared = Rc::new(RefCell::new(App::new(window, document, backend_url.clone())));
    upload::attach(&shared)?;
    detect::attach(&shared)?;
    library::attach(&shared)?;
    arrangement::attach(&shared)?;
    arrangement::start_rotation(&shared)?;
    refresh(&shared);

    tracing::info!("Brickyard mounted against {backend_url}");
    Ok(())
}
