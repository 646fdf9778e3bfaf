//! JSON envelopes exchanged with the browser and the generation backend

use crate::normalize::generated_pieces;
use crate::piece::Piece;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Successful body of `POST /api/detect-pieces`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResponse {
    pub success: bool,
    pub pieces: Vec<Piece>,
    pub method: String,
    pub count: usize,
}

impl DetectionResponse {
    pub fn new(pieces: Vec<Piece>, method: impl Into<String>) -> Self {
        Self {
            success: true,
            count: pieces.len(),
            pieces,
            method: method.into(),
        }
    }
}

/// Error body shared by the detection endpoint and the generation backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Health report served at `/api/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Why a generation backend response could not be turned into pieces
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationFailure {
    #[error("API error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("{0}")]
    Unsuccessful(String),

    #[error("No 3D models generated")]
    Empty,

    #[error("malformed generation response: {0}")]
    Malformed(String),
}

#[derive(Debug, Default, Deserialize)]
struct GenerationEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl GenerationEnvelope {
    fn reason(&self) -> Option<String> {
        self.error
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| self.message.clone().filter(|s| !s.is_empty()))
    }
}

/// Interpret a generation backend reply (`/api/3d-generation`,
/// `/api/segment-and-generate`).
///
/// Non-2xx statuses, `success: false` and empty piece lists are all
/// failures; the caller keeps its previous batch in every failure case.
pub fn interpret_generation(status: u16, body: &str) -> Result<Vec<Piece>, GenerationFailure> {
    let is_success = (200..300).contains(&status);
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) if !is_success => {
            return Err(GenerationFailure::Provider {
                status,
                message: "Unknown error".into(),
            })
        }
        Err(e) => return Err(GenerationFailure::Malformed(e.to_string())),
    };

    let envelope: GenerationEnvelope = serde_json::from_value(value.clone()).unwrap_or_default();

    if !is_success {
        return Err(GenerationFailure::Provider {
            status,
            message: envelope.reason().unwrap_or_else(|| "Unknown error".into()),
        });
    }

    if !envelope.success {
        return Err(GenerationFailure::Unsuccessful(
            envelope
                .reason()
                .unwrap_or_else(|| "API returned unsuccessful response".into()),
        ));
    }

    let has_pieces = value
        .get("pieces")
        .and_then(Value::as_array)
        .is_some_and(|p| !p.is_empty());
    if !has_pieces {
        return Err(GenerationFailure::Empty);
    }

    generated_pieces(&value).map_err(|e| GenerationFailure::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::PieceType;
    use serde_json::json;

    #[test]
    fn test_detection_response_count_matches() {
        let response = DetectionResponse::new(crate::mock::mock_batch(), "trellis");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["count"], 4);
        assert_eq!(value["pieces"].as_array().unwrap().len(), 4);
        assert_eq!(value["method"], "trellis");
    }

    #[test]
    fn test_error_body_omits_missing_message() {
        let body = ErrorBody {
            error: "No image provided".into(),
            message: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "error": "No image provided" })
        );
    }

    #[test]
    fn test_generation_success() {
        let body = json!({
            "success": true,
            "pieces": [{
                "id": "hunyuan3d_1",
                "name": "Generated LEGO 3D Model",
                "type": "3d_model",
                "color": "#3b82f6",
                "dimensions": "1x1",
                "assetUrl": "https://replicate.delivery/mesh.glb",
                "previewUrl": "https://replicate.delivery/mesh.glb",
                "confidence": 0.95,
                "method": "tencent-hunyuan3d-2"
            }],
            "method": "tencent-hunyuan3d-2",
            "count": 1
        })
        .to_string();

        let pieces = interpret_generation(200, &body).unwrap();
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].piece_type, PieceType::Model3d);
        assert_eq!(
            pieces[0].asset_url.as_deref(),
            Some("https://replicate.delivery/mesh.glb")
        );
    }

    #[test]
    fn test_generation_confidence_clamped() {
        let body = r#"{"success":true,"pieces":[{"id":"h","name":"M","type":"3d_model","confidence":95,"method":"tencent-hunyuan3d-2"}]}"#;
        let pieces = interpret_generation(200, body).unwrap();
        assert!((0.0..=1.0).contains(&pieces[0].confidence));
        assert_eq!(pieces[0].confidence, 1.0);
    }

    #[test]
    fn test_generation_provider_error_names_status() {
        let body = json!({ "success": false, "error": "Tencent Hunyuan3D-2 API failed: quota" });
        let err = interpret_generation(500, &body.to_string()).unwrap_err();
        assert_eq!(
            err,
            GenerationFailure::Provider {
                status: 500,
                message: "Tencent Hunyuan3D-2 API failed: quota".into()
            }
        );
        assert_eq!(
            err.to_string(),
            "API error (500): Tencent Hunyuan3D-2 API failed: quota"
        );

        let err = interpret_generation(502, "<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, GenerationFailure::Provider { status: 502, .. }));
    }

    #[test]
    fn test_generation_unsuccessful_and_empty() {
        let err = interpret_generation(200, r#"{"success": false, "message": "busy"}"#).unwrap_err();
        assert_eq!(err, GenerationFailure::Unsuccessful("busy".into()));

        let err = interpret_generation(200, r#"{"success": true, "pieces": []}"#).unwrap_err();
        assert_eq!(err, GenerationFailure::Empty);

        let err = interpret_generation(200, r#"{"success": true}"#).unwrap_err();
        assert_eq!(err, GenerationFailure::Empty);
    }

    #[test]
    fn test_generation_malformed_json() {
        let err = interpret_generation(200, "not json").unwrap_err();
        assert!(matches!(err, GenerationFailure::Malformed(_)));
    }
}
