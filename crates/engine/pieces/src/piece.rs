//! The normalized piece record shared by every provider

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default color for pieces whose provider reports none (LEGO red)
pub const DEFAULT_COLOR: &str = "#ef4444";

/// Default footprint token
pub const DEFAULT_DIMENSIONS: &str = "1x1";

/// Default confidence when a provider omits one
pub const DEFAULT_CONFIDENCE: f64 = 0.9;

/// Identifier of a piece, unique within one generation batch
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(String);

impl PieceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PieceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PieceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Kind of LEGO element
///
/// Serialized as a plain lowercase string. Strings that do not name a known
/// kind survive a round trip through [`PieceType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PieceType {
    Brick,
    Plate,
    Tile,
    Slope,
    /// Whole generated model from an image-to-3D backend
    Model3d,
    Other(String),
}

impl PieceType {
    pub fn as_str(&self) -> &str {
        match self {
            PieceType::Brick => "brick",
            PieceType::Plate => "plate",
            PieceType::Tile => "tile",
            PieceType::Slope => "slope",
            PieceType::Model3d => "3d_model",
            PieceType::Other(other) => other,
        }
    }

    /// Infer a kind from free-form provider fields.
    ///
    /// Keywords are checked in the order plate, tile, slope, brick against
    /// both the name and the type hint; anything else is a brick.
    pub fn infer(name: &str, type_hint: &str) -> Self {
        let name = name.to_lowercase();
        let hint = type_hint.to_lowercase();
        let mentions = |keyword: &str| name.contains(keyword) || hint.contains(keyword);

        if mentions("plate") {
            PieceType::Plate
        } else if mentions("tile") {
            PieceType::Tile
        } else if mentions("slope") {
            PieceType::Slope
        } else {
            PieceType::Brick
        }
    }
}

impl From<String> for PieceType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "brick" => PieceType::Brick,
            "plate" => PieceType::Plate,
            "tile" => PieceType::Tile,
            "slope" => PieceType::Slope,
            "3d_model" => PieceType::Model3d,
            _ => PieceType::Other(value),
        }
    }
}

impl From<PieceType> for String {
    fn from(value: PieceType) -> Self {
        match value {
            PieceType::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance tag recording which provider produced a piece
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Method {
    Trellis,
    SegmentAnything,
    Yolo,
    Hunyuan3d,
    Mock,
    Other(String),
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::Trellis => "trellis",
            Method::SegmentAnything => "segment-anything",
            Method::Yolo => "yolo",
            Method::Hunyuan3d => "tencent-hunyuan3d-2",
            Method::Mock => "mock",
            Method::Other(other) => other,
        }
    }
}

impl From<String> for Method {
    fn from(value: String) -> Self {
        match value.as_str() {
            "trellis" => Method::Trellis,
            "segment-anything" => Method::SegmentAnything,
            "yolo" => Method::Yolo,
            "tencent-hunyuan3d-2" => Method::Hunyuan3d,
            "mock" => Method::Mock,
            _ => Method::Other(value),
        }
    }
}

impl From<Method> for String {
    fn from(value: Method) -> Self {
        match value {
            Method::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected or generated LEGO piece.
///
/// Pieces are created by the gateway (or the mock generator) and never
/// mutated afterwards; the UI only filters and selects them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    pub id: PieceId,
    pub name: String,
    #[serde(rename = "type")]
    pub piece_type: PieceType,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_dimensions")]
    pub dimensions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    pub method: Method,
    /// Provider extras (segmentation mask, bounding box, raw item)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn default_dimensions() -> String {
    DEFAULT_DIMENSIONS.to_string()
}

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

impl Piece {
    /// Create a piece with default color, footprint and confidence
    pub fn new(
        id: impl Into<PieceId>,
        name: impl Into<String>,
        piece_type: PieceType,
        method: Method,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            piece_type,
            color: default_color(),
            dimensions: default_dimensions(),
            asset_url: None,
            preview_url: None,
            confidence: DEFAULT_CONFIDENCE,
            method,
            metadata: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_dimensions(mut self, dimensions: impl Into<String>) -> Self {
        self.dimensions = dimensions.into();
        self
    }

    pub fn with_asset_url(mut self, url: Option<String>) -> Self {
        self.asset_url = url;
        self
    }

    pub fn with_preview_url(mut self, url: Option<String>) -> Self {
        self.preview_url = url;
        self
    }

    /// Set the confidence, clamped to `0.0..=1.0`
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Label shown in the UI; falls back to the id when the name is blank
    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            format!("Piece {}", self.id)
        } else {
            self.name.clone()
        }
    }

    /// Stud footprint parsed from the `WxH` dimensions token
    pub fn footprint(&self) -> Option<(u32, u32)> {
        parse_dimensions(&self.dimensions)
    }
}

/// Parse a `WxH` token such as `2x4`
pub fn parse_dimensions(token: &str) -> Option<(u32, u32)> {
    let (w, h) = token.trim().split_once(['x', 'X'])?;
    let w = w.trim().parse().ok()?;
    let h = h.trim().parse().ok()?;
    (w > 0 && h > 0).then_some((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_piece_serializes_camel_case() {
        let piece = Piece::new("trellis_0", "LEGO Piece 1", PieceType::Plate, Method::Trellis)
            .with_asset_url(Some("https://example.com/a.glb".into()));

        let value = serde_json::to_value(&piece).unwrap();
        assert_eq!(value["type"], "plate");
        assert_eq!(value["assetUrl"], "https://example.com/a.glb");
        assert_eq!(value["method"], "trellis");
        assert!(value.get("previewUrl").is_none());
        assert!(value.get("metadata").is_none());
    }

    #[test]
    fn test_unknown_type_round_trips() {
        let piece: Piece = serde_json::from_value(json!({
            "id": "x",
            "name": "Wheel",
            "type": "wheel",
            "method": "custom-provider",
        }))
        .unwrap();

        assert_eq!(piece.piece_type, PieceType::Other("wheel".into()));
        assert_eq!(piece.method, Method::Other("custom-provider".into()));
        assert_eq!(piece.color, DEFAULT_COLOR);
        assert_eq!(piece.dimensions, DEFAULT_DIMENSIONS);

        let back = serde_json::to_value(&piece).unwrap();
        assert_eq!(back["type"], "wheel");
    }

    #[test]
    fn test_backend_model_type() {
        let piece: Piece = serde_json::from_value(json!({
            "id": "hunyuan3d_1",
            "name": "Generated LEGO 3D Model",
            "type": "3d_model",
            "assetUrl": null,
            "confidence": 0.95,
            "method": "tencent-hunyuan3d-2",
        }))
        .unwrap();
        assert_eq!(piece.piece_type, PieceType::Model3d);
        assert_eq!(piece.method, Method::Hunyuan3d);
        assert!(piece.asset_url.is_none());
    }

    #[test]
    fn test_type_inference_keyword_order() {
        assert_eq!(PieceType::infer("Flat Plate", ""), PieceType::Plate);
        assert_eq!(PieceType::infer("", "TILE"), PieceType::Tile);
        assert_eq!(PieceType::infer("Roof slope", "brick"), PieceType::Slope);
        assert_eq!(PieceType::infer("plate tile", ""), PieceType::Plate);
        assert_eq!(PieceType::infer("", ""), PieceType::Brick);
    }

    #[test]
    fn test_confidence_clamped() {
        let piece = Piece::new("a", "A", PieceType::Brick, Method::Mock);
        assert_eq!(piece.clone().with_confidence(1.7).confidence, 1.0);
        assert_eq!(piece.clone().with_confidence(-0.2).confidence, 0.0);
        assert_eq!(piece.with_confidence(f64::NAN).confidence, 0.0);
    }

    #[test]
    fn test_parse_dimensions() {
        assert_eq!(parse_dimensions("2x4"), Some((2, 4)));
        assert_eq!(parse_dimensions(" 1X6 "), Some((1, 6)));
        assert_eq!(parse_dimensions("0x2"), None);
        assert_eq!(parse_dimensions("big"), None);
    }

    #[test]
    fn test_display_name_fallback() {
        let piece = Piece::new("sam_3", " ", PieceType::Brick, Method::SegmentAnything);
        assert_eq!(piece.display_name(), "Piece sam_3");
    }
}
