//! Request, strategy and error types for the provider gateway

use base64::{engine::general_purpose::STANDARD, Engine as _};
use brickyard_pieces::{NormalizeError, ResponseKind};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Gateway error types
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("No image provided")]
    MissingImage,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("No 3D models generated")]
    EmptyResult,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("{0} is required for this provider")]
    MissingCredential(&'static str),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl From<NormalizeError> for GatewayError {
    fn from(error: NormalizeError) -> Self {
        GatewayError::Parse(error.to_string())
    }
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Raw uploaded image as forwarded to a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime: String,
}

impl ImagePayload {
    /// Create a payload; an empty MIME type is guessed from the file name
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>, mime: impl Into<String>) -> Self {
        let file_name = file_name.into();
        let mime = mime.into();
        let mime = if mime.trim().is_empty() {
            guess_mime(&file_name).to_string()
        } else {
            mime
        };
        Self {
            bytes,
            file_name,
            mime,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `data:<mime>;base64,<bytes>` as expected by the Spaces predict API
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// MIME type for an image file name, by extension
pub fn guess_mime(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Detection method named by the endpoint's `method` form field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DetectionMethod {
    #[default]
    Trellis,
    SegmentAnything,
    YoloLego,
}

impl DetectionMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            DetectionMethod::Trellis => "trellis",
            DetectionMethod::SegmentAnything => "segment-anything",
            DetectionMethod::YoloLego => "yolo-lego",
        }
    }

    /// Lenient form-field parsing: missing or unrecognized values use Trellis
    pub fn from_form_value(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for DetectionMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "trellis" => Ok(DetectionMethod::Trellis),
            "segment-anything" => Ok(DetectionMethod::SegmentAnything),
            "yolo-lego" => Ok(DetectionMethod::YoloLego),
            other => Err(format!("unknown detection method: {other}")),
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which Trellis deployment the Trellis method talks to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TrellisRoute {
    /// Hugging Face Spaces predict API, JSON body with a data URL
    #[default]
    HfSpaces,
    /// Hugging Face Inference API, multipart with a bearer token
    HfInference,
    /// Self-hosted Trellis service, multipart
    Local,
}

impl TrellisRoute {
    pub fn as_str(self) -> &'static str {
        match self {
            TrellisRoute::HfSpaces => "hf_spaces",
            TrellisRoute::HfInference => "hf_inference",
            TrellisRoute::Local => "local",
        }
    }
}

impl FromStr for TrellisRoute {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "hf_spaces" => Ok(TrellisRoute::HfSpaces),
            "hf_inference" => Ok(TrellisRoute::HfInference),
            "local" => Ok(TrellisRoute::Local),
            other => Err(format!("unknown Trellis route: {other}")),
        }
    }
}

impl fmt::Display for TrellisRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Endpoint of the local generation backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GenerationRoute {
    #[default]
    SingleImage,
    SegmentAndGenerate,
}

impl GenerationRoute {
    pub fn path(self) -> &'static str {
        match self {
            GenerationRoute::SingleImage => "/api/3d-generation",
            GenerationRoute::SegmentAndGenerate => "/api/segment-and-generate",
        }
    }
}

impl FromStr for GenerationRoute {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "single" | "3d-generation" => Ok(GenerationRoute::SingleImage),
            "segment" | "segment-and-generate" => Ok(GenerationRoute::SegmentAndGenerate),
            other => Err(format!("unknown generation route: {other}")),
        }
    }
}

/// Every way the gateway can turn an image into pieces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Local generation backend; failures always surface
    Generate(GenerationRoute),
    /// Hosted detection providers behind `/api/detect-pieces`
    Detect(DetectionMethod),
}

impl Strategy {
    /// Payload family the strategy's provider answers with
    pub fn response_kind(self) -> ResponseKind {
        match self {
            Strategy::Generate(_) => ResponseKind::Generation,
            Strategy::Detect(DetectionMethod::Trellis) => ResponseKind::Trellis,
            Strategy::Detect(DetectionMethod::SegmentAnything) => ResponseKind::SegmentAnything,
            Strategy::Detect(DetectionMethod::YoloLego) => ResponseKind::Yolo,
        }
    }

    /// Whether failures and empty results are replaced by the mock batch
    pub fn falls_back_to_mock(self) -> bool {
        matches!(self, Strategy::Detect(DetectionMethod::Trellis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_form_value_defaults_to_trellis() {
        assert_eq!(DetectionMethod::from_form_value(None), DetectionMethod::Trellis);
        assert_eq!(
            DetectionMethod::from_form_value(Some("segment-anything")),
            DetectionMethod::SegmentAnything
        );
        assert_eq!(
            DetectionMethod::from_form_value(Some("yolo-lego")),
            DetectionMethod::YoloLego
        );
        assert_eq!(
            DetectionMethod::from_form_value(Some("hunyuan")),
            DetectionMethod::Trellis
        );
        assert!("hunyuan".parse::<DetectionMethod>().is_err());
    }

    #[test]
    fn test_data_url() {
        let image = ImagePayload::new(b"abc".to_vec(), "set.png", "image/png");
        assert_eq!(image.data_url(), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_mime_guessed_when_missing() {
        let image = ImagePayload::new(vec![1], "Photo.JPG", "");
        assert_eq!(image.mime, "image/jpeg");
        assert_eq!(guess_mime("notes.txt"), "application/octet-stream");
    }

    #[test]
    fn test_strategy_kinds_and_fallback() {
        let trellis = Strategy::Detect(DetectionMethod::Trellis);
        assert_eq!(trellis.response_kind(), ResponseKind::Trellis);
        assert!(trellis.falls_back_to_mock());

        let yolo = Strategy::Detect(DetectionMethod::YoloLego);
        assert_eq!(yolo.response_kind(), ResponseKind::Yolo);
        assert!(!yolo.falls_back_to_mock());

        let generate = Strategy::Generate(GenerationRoute::SegmentAndGenerate);
        assert_eq!(generate.response_kind(), ResponseKind::Generation);
        assert!(!generate.falls_back_to_mock());
        assert_eq!(
            GenerationRoute::SegmentAndGenerate.path(),
            "/api/segment-and-generate"
        );
    }

    #[test]
    fn test_route_parsing() {
        assert_eq!("local".parse::<TrellisRoute>(), Ok(TrellisRoute::Local));
        assert_eq!(
            "hf_inference".parse::<TrellisRoute>(),
            Ok(TrellisRoute::HfInference)
        );
        assert!("replicate".parse::<TrellisRoute>().is_err());
        assert_eq!(
            "segment".parse::<GenerationRoute>(),
            Ok(GenerationRoute::SegmentAndGenerate)
        );
    }
}
