//! Browser-side call to the generation backend

use crate::dom::js_error;
use brickyard_pieces::{interpret_generation, Piece};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, FormData, Request, RequestInit, Response, Window};

const GENERATION_PATH: &str = "/api/3d-generation";

/// Upload `file` to `{backend_url}/api/3d-generation` and return its pieces.
///
/// Every failure comes back as a message for the user; the caller keeps
/// its previous batch.
pub async fn generate(window: &Window, backend_url: &str, file: &File) -> Result<Vec<Piece>, String> {
    let form = FormData::new().map_err(js_error)?;
    form.append_with_blob_and_filename("image", file, &file.name())
        .map_err(js_error)?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(&form);

    let url = format!("{}{GENERATION_PATH}", backend_url.trim_end_matches('/'));
    let request = Request::new_with_str_and_init(&url, &init).map_err(js_error)?;
    tracing::info!("Calling {url} for 3D generation");

    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| {
            format!(
                "Failed to connect to backend server. Make sure the backend is running at {backend_url}: {}",
                js_error(e)
            )
        })?
        .dyn_into()
        .map_err(js_error)?;

    let status = response.status();
    let body = JsFuture::from(response.text().map_err(js_error)?)
        .await
        .map_err(js_error)?
        .as_string()
        .unwrap_or_default();
    tracing::debug!("backend answered {status}");

    let pieces = interpret_generation(status, &body).map_err(|e| e.to_string())?;
    tracing::info!("Generated {} 3D models", pieces.len());
    Ok(pieces)
}
