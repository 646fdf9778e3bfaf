//! Arrangement canvas: colored blocks, zoom, layout, drops and rotation

use crate::dom::{self, create, element, on, PIECE_ID_ATTR, PIECE_INDEX_ATTR};
use crate::library::start_drag;
use crate::state::{refresh, App, Shared};
use brickyard_pieces::Piece;
use brickyard_studio::{Rect, ZoomDirection};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, HtmlElement};

/// Block edge per stud at 100% zoom
const STUD_PX: f64 = 24.0;

/// Rendered block size in pixels
pub fn block_size(piece: &Piece, zoom: f64) -> (f64, f64) {
    let (w, h) = piece.footprint().unwrap_or((1, 1));
    (w as f64 * STUD_PX * zoom, h as f64 * STUD_PX * zoom)
}

pub fn attach(shared: &Shared) -> Result<(), JsValue> {
    let document = shared.borrow().document.clone();
    let canvas: HtmlElement = element(&document, dom::ARRANGEMENT_CANVAS)?;

    let controls: [(&str, fn(&mut App)); 5] = [
        (dom::ROTATE_TOGGLE, |app| {
            app.session.arrangement_mut().toggle_rotation();
        }),
        (dom::ZOOM_IN, |app| {
            app.session.arrangement_mut().adjust_zoom(ZoomDirection::In);
        }),
        (dom::ZOOM_OUT, |app| {
            app.session.arrangement_mut().adjust_zoom(ZoomDirection::Out);
        }),
        (dom::LAYOUT_CYCLE, |app| {
            app.session.arrangement_mut().cycle_layout();
        }),
        (dom::VIEW_RESET, |app| app.session.reset_view()),
    ];
    for (id, action) in controls {
        let button: HtmlElement = element(&document, id)?;
        let shared = shared.clone();
        on(&button, "click", move |_| {
            action(&mut shared.borrow_mut());
            refresh(&shared);
        })?;
    }

    on(&canvas, "dragover", |event| event.prevent_default())?;
    on(&canvas, "dragstart", start_drag)?;
    {
        let shared = shared.clone();
        let target = canvas.clone();
        on(&canvas, "drop", move |event| {
            event.prevent_default();
            let Some(drag) = event.dyn_ref::<DragEvent>() else {
                return;
            };
            let Some(payload) = drag
                .data_transfer()
                .and_then(|transfer| transfer.get_data("text/plain").ok())
            else {
                return;
            };
            let bounds = target.get_bounding_client_rect();
            let rect = Rect {
                left: bounds.left(),
                top: bounds.top(),
                width: bounds.width(),
                height: bounds.height(),
            };
            let dropped = shared.borrow_mut().session.drop_piece(
                &payload,
                drag.client_x() as f64,
                drag.client_y() as f64,
                rect,
            );
            if let Some((id, position)) = dropped {
                tracing::debug!("placed {id} at {:.1}%, {:.1}%", position.x, position.y);
                refresh(&shared);
            }
        })?;
    }
    Ok(())
}

fn render_block(app: &App, piece: &Piece) -> Result<HtmlElement, JsValue> {
    let block = create(&app.document, "div", "piece-block")?;
    let (width, height) = block_size(piece, app.session.arrangement().zoom());
    let index = app
        .session
        .batch()
        .iter()
        .position(|p| p.id == piece.id)
        .unwrap_or_default();

    block.set_attribute(PIECE_ID_ATTR, piece.id.as_str())?;
    block.set_attribute(PIECE_INDEX_ATTR, &index.to_string())?;
    block.set_draggable(true);
    block.set_title(&piece.display_name());

    let style = block.style();
    style.set_property("background-color", &piece.color)?;
    style.set_property("width", &format!("{width:.0}px"))?;
    style.set_property("height", &format!("{height:.0}px"))?;

    let label = create(&app.document, "span", "piece-block-label")?;
    label.set_text_content(Some(&piece.display_name()));
    block.append_child(&label)?;
    Ok(block)
}

pub fn render(app: &App) -> Result<(), JsValue> {
    let canvas: HtmlElement = element(&app.document, dom::ARRANGEMENT_CANVAS)?;
    let rotate: HtmlElement = element(&app.document, dom::ROTATE_TOGGLE)?;
    let zoom_label: HtmlElement = element(&app.document, dom::ZOOM_LABEL)?;
    let layout: HtmlElement = element(&app.document, dom::LAYOUT_CYCLE)?;

    let arrangement = app.session.arrangement();
    rotate.set_text_content(Some(if arrangement.is_rotating() {
        "Pause rotation"
    } else {
        "Resume rotation"
    }));
    zoom_label.set_text_content(Some(&format!("{}%", arrangement.zoom_percent())));
    layout.set_text_content(Some(&format!("Layout: {}", arrangement.layout().label())));

    canvas.set_inner_html("");
    let selected = app.session.selected_pieces();
    if selected.is_empty() {
        let hint = create(&app.document, "p", "arrangement-empty")?;
        hint.set_text_content(Some("Select pieces in the library or drag them here"));
        canvas.append_child(&hint)?;
        return Ok(());
    }

    let (flowing, pinned) = arrangement.partition(&selected);
    let stage = create(
        &app.document,
        "div",
        &format!("arrangement-stage layout-{}", arrangement.layout().label()),
    )?;
    for piece in flowing {
        let block = render_block(app, piece)?;
        stage.append_child(&block)?;
    }
    canvas.append_child(&stage)?;

    for (piece, position) in pinned {
        let block = render_block(app, piece)?;
        block.class_list().add_1("pinned")?;
        let style = block.style();
        style.set_property("left", &format!("{:.2}%", position.x))?;
        style.set_property("top", &format!("{:.2}%", position.y))?;
        canvas.append_child(&block)?;
    }
    Ok(())
}

/// Apply the current spin angle to every block
fn spin_blocks(app: &App, now_ms: f64) -> Result<(), JsValue> {
    let angle = app.session.arrangement().rotation_angle(now_ms);
    let blocks = app.document.query_selector_all(".piece-block")?;
    let transform = format!("rotateX(20deg) rotateY({angle:.4}rad)");
    for i in 0..blocks.length() {
        if let Some(block) = blocks.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) {
            block.style().set_property("transform", &transform)?;
        }
    }
    Ok(())
}

/// Drive auto-rotation from `requestAnimationFrame` for the page's lifetime
pub fn start_rotation(shared: &Shared) -> Result<(), JsValue> {
    type FrameCallback = Closure<dyn FnMut(f64)>;
    let callback: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
    let next_frame = callback.clone();
    let window = shared.borrow().window.clone();
    let frame_window = window.clone();
    let shared = shared.clone();

    *callback.borrow_mut() = Some(Closure::new(move |now: f64| {
        if let Ok(app) = shared.try_borrow() {
            if let Err(e) = spin_blocks(&app, now) {
                tracing::warn!("rotation frame failed: {}", dom::js_error(e));
            }
        }
        if let Some(cb) = next_frame.borrow().as_ref() {
            let _ = frame_window.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }));

    if let Some(cb) = callback.borrow().as_ref() {
        window.request_animation_frame(cb.as_ref().unchecked_ref())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickyard_pieces::mock_batch;

    #[test]
    fn test_block_size_follows_footprint_and_zoom() {
        let batch = mock_batch();
        assert_eq!(block_size(&batch[1], 1.0), (48.0, 96.0));
        assert_eq!(block_size(&batch[2], 2.0), (48.0, 48.0));

        let mut odd = batch[0].clone();
        odd.dimensions = "auto".into();
        assert_eq!(block_size(&odd, 0.5), (12.0, 12.0));
    }
}
