use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use brickyard_pieces::ErrorBody;
use thiserror::Error;

/// Errors returned by the HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No image provided")]
    MissingImage,

    #[error("Detection failed: {0}")]
    DetectionFailed(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingImage => StatusCode::BAD_REQUEST,
            ApiError::DetectionFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            ApiError::MissingImage => ErrorBody {
                error: "No image provided".into(),
                message: None,
            },
            ApiError::DetectionFailed(message) => ErrorBody {
                error: "Detection failed".into(),
                message: Some(message.clone()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
