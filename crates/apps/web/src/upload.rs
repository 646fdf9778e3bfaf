//! Picker, drop zone and preview

use crate::dom::{self, element, on};
use crate::state::{refresh, App, Shared};
use brickyard_studio::upload::{ACCEPTED_EXTENSIONS, SIZE_HINT_BYTES};
use brickyard_studio::{FileCandidate, UploadError, UploadedImage};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, Event, File, FileList, FileReader, HtmlElement, HtmlImageElement, HtmlInputElement};

pub fn attach(shared: &Shared) -> Result<(), JsValue> {
    let document = shared.borrow().document.clone();
    let input: HtmlInputElement = element(&document, dom::UPLOAD_INPUT)?;
    let zone: HtmlElement = element(&document, dom::UPLOAD_ZONE)?;
    let clear: HtmlElement = element(&document, dom::UPLOAD_CLEAR)?;

    let accept: Vec<String> = ACCEPTED_EXTENSIONS.iter().map(|ext| format!(".{ext}")).collect();
    input.set_accept(&format!("image/*,{}", accept.join(",")));

    {
        let shared = shared.clone();
        let picker = input.clone();
        on(&input, "change", move |_| {
            if let Some(files) = picker.files() {
                take_files(&shared, &files);
            }
        })?;
    }
    {
        let shared = shared.clone();
        let picker = input.clone();
        on(&zone, "click", move |_| {
            if !shared.borrow().session.upload().is_disabled() {
                picker.click();
            }
        })?;
    }
    on(&zone, "dragover", |event| event.prevent_default())?;
    {
        let shared = shared.clone();
        on(&zone, "drop", move |event| {
            event.prevent_default();
            let files = event
                .dyn_ref::<DragEvent>()
                .and_then(DragEvent::data_transfer)
                .and_then(|transfer| transfer.files());
            if let Some(files) = files {
                take_files(&shared, &files);
            }
        })?;
    }
    {
        let shared = shared.clone();
        let picker = input.clone();
        on(&clear, "click", move |event| {
            event.stop_propagation();
            {
                let mut app = shared.borrow_mut();
                app.session.clear_image();
                app.file = None;
            }
            picker.set_value("");
            refresh(&shared);
        })?;
    }
    Ok(())
}

fn take_files(shared: &Shared, files: &FileList) {
    let files: Vec<File> = (0..files.length()).filter_map(|i| files.item(i)).collect();
    let candidates: Vec<FileCandidate> = files
        .iter()
        .map(|file| FileCandidate {
            name: file.name(),
            mime: file.type_(),
            size: file.size() as u64,
        })
        .collect();

    let checked = shared.borrow().session.upload().validate(&candidates);
    let file = match checked {
        Ok(index) => files.get(index).cloned(),
        Err(UploadError::NoFile) => None,
        Err(e) => {
            shared.borrow().alert(&e.to_string());
            None
        }
    };
    if let Some(file) = file {
        if let Err(e) = read_file(shared.clone(), file) {
            tracing::error!("failed to read image: {}", dom::js_error(e));
        }
    }
}

/// Read the file into a data URL and install it as the preview
fn read_file(shared: Shared, file: File) -> Result<(), JsValue> {
    let reader = FileReader::new()?;
    let reader_for_load = reader.clone();
    let loaded = file.clone();

    let onload = Closure::<dyn FnMut(Event)>::once(move |_: Event| {
        let data_url = reader_for_load
            .result()
            .ok()
            .and_then(|result| result.as_string())
            .unwrap_or_default();
        let image = UploadedImage {
            name: loaded.name(),
            size: loaded.size() as u64,
            mime: loaded.type_(),
            data_url,
        };

        let outcome = {
            let mut app = shared.borrow_mut();
            let outcome = app.session.upload_image(image);
            if outcome.is_ok() {
                app.file = Some(loaded);
            }
            outcome
        };
        match outcome {
            Ok(()) => refresh(&shared),
            Err(e) => shared.borrow().alert(&e.to_string()),
        }
    });

    reader.set_onload(Some(onload.as_ref().unchecked_ref()));
    reader.read_as_data_url(&file)?;
    onload.forget();
    Ok(())
}

pub fn render(app: &App) -> Result<(), JsValue> {
    let preview: HtmlImageElement = element(&app.document, dom::UPLOAD_PREVIEW)?;
    let info: HtmlElement = element(&app.document, dom::UPLOAD_INFO)?;
    let clear: HtmlElement = element(&app.document, dom::UPLOAD_CLEAR)?;
    let zone: HtmlElement = element(&app.document, dom::UPLOAD_ZONE)?;
    let input: HtmlInputElement = element(&app.document, dom::UPLOAD_INPUT)?;

    match app.session.image() {
        Some(image) => {
            preview.set_src(&image.data_url);
            preview.set_alt(&image.name);
            preview.set_hidden(false);
            info.set_text_content(Some(&format!("{} ({})", image.name, image.size_label())));
            clear.set_hidden(false);
        }
        None => {
            preview.remove_attribute("src")?;
            preview.set_hidden(true);
            info.set_text_content(Some(&format!(
                "PNG, JPG, GIF, BMP or WEBP up to {}MB",
                SIZE_HINT_BYTES / 1024 / 1024
            )));
            clear.set_hidden(true);
        }
    }

    let disabled = app.session.upload().is_disabled();
    input.set_disabled(disabled);
    zone.class_list().toggle_with_force("disabled", disabled)?;
    Ok(())
}
