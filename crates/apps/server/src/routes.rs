//! `POST /api/detect-pieces` and `GET /api/health`

use crate::config::ExecutionMode;
use crate::error::ApiError;
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use brickyard_gateway::{DetectionMethod, ImagePayload, PieceDetector};
use brickyard_pieces::{development_batch, DetectionResponse, HealthStatus};
use std::sync::Arc;

/// Uploads above the 10 MB UI hint are still accepted up to this size
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Shared, read-only handler state
#[derive(Clone)]
pub struct AppState {
    detector: Arc<dyn PieceDetector>,
    mode: ExecutionMode,
    service: String,
}

impl AppState {
    pub fn new(
        detector: Arc<dyn PieceDetector>,
        mode: ExecutionMode,
        service: impl Into<String>,
    ) -> Self {
        Self {
            detector,
            mode,
            service: service.into(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/detect-pieces", post(detect_pieces))
        .route("/api/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".into(),
        service: state.service.clone(),
    })
}

/// Fields pulled out of the upload form
#[derive(Default)]
struct DetectForm {
    image: Option<ImagePayload>,
    method: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<DetectForm, String> {
    let mut form = DetectForm::default();
    while let Some(field) = multipart.next_field().await.map_err(|e| e.body_text())? {
        match field.name() {
            Some("image") => {
                let file_name = field.file_name().unwrap_or("image").to_string();
                let mime = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| e.body_text())?;
                if !bytes.is_empty() {
                    form.image = Some(ImagePayload::new(bytes.to_vec(), file_name, mime));
                }
            }
            Some("method") => {
                let value = field.text().await.map_err(|e| e.body_text())?;
                form.method = Some(value.trim().to_string()).filter(|v| !v.is_empty());
            }
            _ => {}
        }
    }
    Ok(form)
}

async fn detect_pieces(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DetectionResponse>, ApiError> {
    let outcome = match multipart {
        Ok(multipart) => run_detection(&state, multipart).await,
        Err(rejection) => Err(ApiError::DetectionFailed(rejection.body_text())),
    };

    match outcome {
        Ok(response) => Ok(Json(response)),
        Err(ApiError::MissingImage) => Err(ApiError::MissingImage),
        Err(err) if state.mode.is_development() => {
            tracing::warn!("{err}; answering with development pieces");
            Ok(Json(DetectionResponse::new(development_batch(), "mock")))
        }
        Err(err) => {
            tracing::error!("{err}");
            Err(err)
        }
    }
}

async fn run_detection(state: &AppState, multipart: Multipart) -> Result<DetectionResponse, ApiError> {
    let form = read_form(multipart).await.map_err(ApiError::DetectionFailed)?;
    let image = form.image.ok_or(ApiError::MissingImage)?;

    let requested = form.method.unwrap_or_else(|| DetectionMethod::default().to_string());
    let method = DetectionMethod::from_form_value(Some(&requested));
    if method.as_str() != requested {
        tracing::debug!("unrecognized method {requested:?}, using {method}");
    }

    tracing::info!(
        "detecting pieces in {} ({} bytes) with {method}",
        image.file_name,
        image.bytes.len()
    );
    let pieces = state
        .detector
        .detect(method, &image)
        .await
        .map_err(|e| ApiError::DetectionFailed(e.to_string()))?;

    Ok(DetectionResponse::new(pieces, requested))
}
