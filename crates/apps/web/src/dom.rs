//! Element ids of the host page and small DOM helpers

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement};

pub const UPLOAD_INPUT: &str = "upload-input";
pub const UPLOAD_ZONE: &str = "upload-zone";
pub const UPLOAD_PREVIEW: &str = "upload-preview";
pub const UPLOAD_INFO: &str = "upload-info";
pub const UPLOAD_CLEAR: &str = "upload-clear";

pub const GENERATE_BUTTON: &str = "generate-button";
pub const RESET_BUTTON: &str = "reset-button";
pub const STATUS: &str = "status";

pub const LIBRARY_SEARCH: &str = "library-search";
pub const LIBRARY_TYPE: &str = "library-type";
pub const LIBRARY_VIEW: &str = "library-view";
pub const LIBRARY_LIST: &str = "library-list";
pub const SELECTION_SUMMARY: &str = "selection-summary";
pub const SELECTION_CLEAR: &str = "selection-clear";

pub const ARRANGEMENT_CANVAS: &str = "arrangement-canvas";
pub const ROTATE_TOGGLE: &str = "rotate-toggle";
pub const ZOOM_IN: &str = "zoom-in";
pub const ZOOM_OUT: &str = "zoom-out";
pub const ZOOM_LABEL: &str = "zoom-label";
pub const LAYOUT_CYCLE: &str = "layout-cycle";
pub const VIEW_RESET: &str = "view-reset";

/// Attribute carrying a piece id on library cards and arrangement blocks
pub const PIECE_ID_ATTR: &str = "data-piece-id";
pub const PIECE_INDEX_ATTR: &str = "data-index";

/// Look up an element by id and cast it
pub fn element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("#{id} has an unexpected element type")))
}

pub fn create(document: &Document, tag: &str, class: &str) -> Result<HtmlElement, JsValue> {
    let element: HtmlElement = document.create_element(tag)?.dyn_into()?;
    element.set_class_name(class);
    Ok(element)
}

/// Attach a listener for the lifetime of the page
pub fn on(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Nearest element (self included) carrying a piece id, from an event target
pub fn piece_element(event: &Event) -> Option<Element> {
    event
        .target()?
        .dyn_into::<Element>()
        .ok()?
        .closest(&format!("[{PIECE_ID_ATTR}]"))
        .ok()
        .flatten()
}

/// Best-effort message out of a thrown JS value
pub fn js_error(value: JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    match value.dyn_ref::<js_sys::Error>() {
        Some(error) => String::from(error.message()),
        None => format!("{value:?}"),
    }
}
