//! Library cards: search, type filter, selection and downloads

use crate::dom::{self, create, element, on, piece_element, PIECE_ID_ATTR, PIECE_INDEX_ATTR};
use crate::state::{refresh, App, Shared};
use brickyard_pieces::{Piece, PieceId};
use brickyard_studio::{
    piece_types, selection_summary, DragPayload, Download, EmptyState, TypeFilter, ViewMode,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    DragEvent, Element, Event, HtmlAnchorElement, HtmlElement, HtmlInputElement, HtmlOptionElement,
    HtmlSelectElement,
};

pub fn attach(shared: &Shared) -> Result<(), JsValue> {
    let document = shared.borrow().document.clone();
    let search: HtmlInputElement = element(&document, dom::LIBRARY_SEARCH)?;
    let type_select: HtmlSelectElement = element(&document, dom::LIBRARY_TYPE)?;
    let view: HtmlElement = element(&document, dom::LIBRARY_VIEW)?;
    let list: HtmlElement = element(&document, dom::LIBRARY_LIST)?;
    let clear: HtmlElement = element(&document, dom::SELECTION_CLEAR)?;

    {
        let shared = shared.clone();
        let input = search.clone();
        on(&search, "input", move |_| {
            shared.borrow_mut().session.library_mut().set_query(input.value());
            refresh(&shared);
        })?;
    }
    {
        let shared = shared.clone();
        let select = type_select.clone();
        on(&type_select, "change", move |_| {
            let filter = TypeFilter::from_control(&select.value());
            shared.borrow_mut().session.library_mut().set_type_filter(filter);
            refresh(&shared);
        })?;
    }
    {
        let shared = shared.clone();
        on(&view, "click", move |_| {
            shared.borrow_mut().session.library_mut().toggle_view();
            refresh(&shared);
        })?;
    }
    {
        let shared = shared.clone();
        on(&list, "click", move |event| {
            // Download links keep their native behavior
            if is_download_click(&event) {
                return;
            }
            let Some(id) = piece_element(&event).and_then(|el| el.get_attribute(PIECE_ID_ATTR))
            else {
                return;
            };
            let toggled = shared.borrow_mut().session.toggle_piece(&PieceId::from(id));
            if toggled.is_some() {
                refresh(&shared);
            }
        })?;
    }
    on(&list, "dragstart", start_drag)?;
    {
        let shared = shared.clone();
        on(&clear, "click", move |_| {
            shared.borrow_mut().session.clear_selection();
            refresh(&shared);
        })?;
    }
    Ok(())
}

fn is_download_click(event: &Event) -> bool {
    event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
        .and_then(|el| el.closest("a.piece-download").ok().flatten())
        .is_some()
}

/// Put the dragged piece's payload on the transfer as `text/plain`
pub fn start_drag(event: Event) {
    let Some(el) = piece_element(&event) else {
        return;
    };
    let Some(id) = el.get_attribute(PIECE_ID_ATTR) else {
        return;
    };
    let index = el
        .get_attribute(PIECE_INDEX_ATTR)
        .and_then(|i| i.parse().ok())
        .unwrap_or_default();
    let payload = DragPayload::new(PieceId::from(id), index).to_json();

    if let Some(transfer) = event.dyn_ref::<DragEvent>().and_then(DragEvent::data_transfer) {
        if transfer.set_data("text/plain", &payload).is_err() {
            tracing::warn!("could not attach drag payload");
        }
        transfer.set_effect_allowed("copyMove");
    }
}

/// `Brick · 1x2 · 95%`
pub fn card_meta(piece: &Piece) -> String {
    format!(
        "{} · {} · {:.0}%",
        piece.piece_type,
        piece.dimensions,
        piece.confidence * 100.0
    )
}

fn render_type_options(app: &App, select: &HtmlSelectElement) -> Result<(), JsValue> {
    select.set_inner_html("");
    let all = HtmlOptionElement::new_with_text_and_value("All types", "all")?;
    select.append_child(&all)?;
    for piece_type in piece_types(app.session.batch()) {
        let option = HtmlOptionElement::new_with_text_and_value(piece_type.as_str(), piece_type.as_str())?;
        select.append_child(&option)?;
    }
    select.set_value(app.session.library().type_filter().control_value());
    Ok(())
}

fn render_card(app: &App, piece: &Piece, index: usize) -> Result<HtmlElement, JsValue> {
    let document = &app.document;
    let selected = app.session.selection().contains(&piece.id);

    let card = create(document, "div", "piece-card")?;
    card.class_list().toggle_with_force("selected", selected)?;
    card.set_attribute(PIECE_ID_ATTR, piece.id.as_str())?;
    card.set_attribute(PIECE_INDEX_ATTR, &index.to_string())?;
    card.set_draggable(true);

    let swatch = create(document, "div", "piece-swatch")?;
    swatch.style().set_property("background-color", &piece.color)?;
    card.append_child(&swatch)?;

    if let Some(preview) = &piece.preview_url {
        let img = create(document, "img", "piece-preview")?;
        img.set_attribute("src", preview)?;
        img.set_attribute("alt", &piece.display_name())?;
        card.append_child(&img)?;
    }

    let name = create(document, "div", "piece-name")?;
    name.set_text_content(Some(&piece.display_name()));
    card.append_child(&name)?;

    let meta = create(document, "div", "piece-meta")?;
    meta.set_text_content(Some(&card_meta(piece)));
    card.append_child(&meta)?;

    if let Some(download) = Download::for_piece(piece) {
        let link: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
        link.set_class_name("piece-download");
        link.set_href(&download.url);
        link.set_download(&download.file_name);
        link.set_text_content(Some("Download"));
        card.append_child(&link)?;
    }
    Ok(card)
}

pub fn render(app: &App) -> Result<(), JsValue> {
    let type_select: HtmlSelectElement = element(&app.document, dom::LIBRARY_TYPE)?;
    let view: HtmlElement = element(&app.document, dom::LIBRARY_VIEW)?;
    let list: HtmlElement = element(&app.document, dom::LIBRARY_LIST)?;
    let summary: HtmlElement = element(&app.document, dom::SELECTION_SUMMARY)?;
    let clear: HtmlElement = element(&app.document, dom::SELECTION_CLEAR)?;

    let session = &app.session;
    let batch = session.batch();
    let library = session.library();

    render_type_options(app, &type_select)?;

    let view_mode = library.view();
    view.set_text_content(Some(match view_mode {
        ViewMode::Grid => "List view",
        ViewMode::List => "Grid view",
    }));
    list.set_class_name(match view_mode {
        ViewMode::Grid => "library-list grid",
        ViewMode::List => "library-list list",
    });

    list.set_inner_html("");
    match library.empty_state(batch) {
        Some(state) => {
            let empty = create(&app.document, "p", "library-empty")?;
            empty.set_text_content(Some(match state {
                EmptyState::NoPieces => "No pieces yet. Upload an image and generate 3D models.",
                EmptyState::NoMatches => "No pieces match your search.",
            }));
            list.append_child(&empty)?;
        }
        None => {
            for piece in library.visible(batch) {
                let index = batch.iter().position(|p| p.id == piece.id).unwrap_or_default();
                let card = render_card(app, piece, index)?;
                list.append_child(&card)?;
            }
        }
    }

    let selected = session.selection().len();
    summary.set_text_content(Some(&selection_summary(selected)));
    clear.set_hidden(selected == 0);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickyard_pieces::mock_batch;

    #[test]
    fn test_card_meta() {
        let batch = mock_batch();
        assert_eq!(card_meta(&batch[0]), "brick · 1x2 · 95%");
        assert_eq!(card_meta(&batch[2]), "tile · 1x1 · 88%");
    }
}
