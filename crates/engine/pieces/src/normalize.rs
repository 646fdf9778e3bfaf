//! Mapping of provider-specific JSON payloads into [`Piece`] records
//!
//! Each provider family has its own handler, selected by [`ResponseKind`].
//! Handlers never invent a mock batch themselves: an empty result or an
//! unrecognized shape is reported to the caller, whose fallback policy
//! decides what the user sees.

use crate::palette::{random_color, random_dimensions};
use crate::piece::{Method, Piece, PieceId, PieceType, DEFAULT_COLOR, DEFAULT_CONFIDENCE};
use rand::Rng;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Confidence above which an unlabeled-looking detection is still kept
pub const YOLO_CONFIDENCE_THRESHOLD: f64 = 0.7;

const SAM_DEFAULT_CONFIDENCE: f64 = 0.8;
/// Used for keyword-matched detections that report no score; same value the
/// generation backend assigns to segmented pieces
const YOLO_DEFAULT_CONFIDENCE: f64 = 0.8;
const YOLO_KEYWORDS: [&str; 3] = ["toy", "block", "brick"];

/// Payload family a provider responds with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    /// Trellis image-to-3D: `data[]`, `predictions[]` or `assets[]`
    Trellis,
    /// Segment Anything: `segments[]`
    SegmentAnything,
    /// Object detection: `predictions[]`
    Yolo,
    /// Local generation backend envelope: `pieces[]`
    Generation,
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResponseKind::Trellis => "trellis",
            ResponseKind::SegmentAnything => "segment-anything",
            ResponseKind::Yolo => "yolo",
            ResponseKind::Generation => "generation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("unrecognized {0} response shape")]
    UnrecognizedShape(ResponseKind),

    #[error("malformed piece list: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NormalizeError>;

/// Normalize a provider response body into pieces with batch-unique ids.
///
/// `rng` fills in colors and footprints for Trellis items that omit them.
pub fn normalize<R: Rng + ?Sized>(
    kind: ResponseKind,
    body: &Value,
    rng: &mut R,
) -> Result<Vec<Piece>> {
    let pieces = match kind {
        ResponseKind::Trellis => normalize_trellis(body, rng)?,
        ResponseKind::SegmentAnything => normalize_segments(body)?,
        ResponseKind::Yolo => normalize_predictions(body)?,
        ResponseKind::Generation => normalize_generated(body)?,
    };
    Ok(ensure_unique_ids(pieces))
}

fn normalize_trellis<R: Rng + ?Sized>(body: &Value, rng: &mut R) -> Result<Vec<Piece>> {
    let items = item_array(body, &["data", "predictions", "assets"])
        .ok_or(NormalizeError::UnrecognizedShape(ResponseKind::Trellis))?;

    let pieces = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| item.as_object().map(|obj| (index, obj)))
        .map(|(index, obj)| {
            let name_hint = str_field(obj, &["name"]).unwrap_or_default();
            let type_hint = str_field(obj, &["type"]).unwrap_or_default();
            let color = str_field(obj, &["color"]).unwrap_or_else(|| random_color(rng).into());
            let dimensions =
                str_field(obj, &["dimensions"]).unwrap_or_else(|| random_dimensions(rng).into());

            Piece::new(
                format!("trellis_{index}"),
                format!("LEGO Piece {}", index + 1),
                PieceType::infer(&name_hint, &type_hint),
                Method::Trellis,
            )
            .with_color(color)
            .with_dimensions(dimensions)
            .with_asset_url(str_field(obj, &["glb_url", "asset_url", "url"]))
            .with_preview_url(str_field(obj, &["preview_url", "image_url", "thumbnail"]))
            .with_confidence(num_field(obj, &["confidence", "score"]).unwrap_or(DEFAULT_CONFIDENCE))
            .with_metadata(json!({ "originalData": Value::Object(obj.clone()) }))
        })
        .collect();

    Ok(pieces)
}

fn normalize_segments(body: &Value) -> Result<Vec<Piece>> {
    let segments = item_array(body, &["segments"])
        .ok_or(NormalizeError::UnrecognizedShape(ResponseKind::SegmentAnything))?;

    // Every segment is a piece; non-object entries get the defaults
    let empty = Map::new();
    let pieces = segments
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            let obj = segment.as_object().unwrap_or(&empty);
            let mut piece = Piece::new(
                format!("sam_{index}"),
                format!("LEGO Piece {}", index + 1),
                PieceType::Brick,
                Method::SegmentAnything,
            )
            .with_color(str_field(obj, &["color"]).unwrap_or_else(|| DEFAULT_COLOR.into()))
            .with_confidence(num_field(obj, &["confidence", "score"]).unwrap_or(SAM_DEFAULT_CONFIDENCE));

            if let Some(mask) = obj.get("mask").filter(|m| !m.is_null()) {
                piece = piece.with_metadata(json!({ "mask": mask }));
            }
            piece
        })
        .collect();

    Ok(pieces)
}

fn normalize_predictions(body: &Value) -> Result<Vec<Piece>> {
    let predictions = item_array(body, &["predictions"])
        .ok_or(NormalizeError::UnrecognizedShape(ResponseKind::Yolo))?;

    let pieces = predictions
        .iter()
        .enumerate()
        .filter_map(|(index, prediction)| prediction.as_object().map(|obj| (index, obj)))
        .filter_map(|(index, obj)| {
            let label = str_field(obj, &["label"])?;
            let confidence = num_field(obj, &["confidence", "score"]);
            let lowered = label.to_lowercase();
            let looks_like_lego = YOLO_KEYWORDS.iter().any(|k| lowered.contains(k))
                || confidence.is_some_and(|c| c > YOLO_CONFIDENCE_THRESHOLD);
            if !looks_like_lego {
                return None;
            }

            let mut metadata = Map::new();
            metadata.insert("label".into(), Value::String(label));
            if let Some(bbox) = obj.get("bbox").or_else(|| obj.get("box")) {
                metadata.insert("bbox".into(), bbox.clone());
            }

            Some(
                Piece::new(
                    format!("yolo_{index}"),
                    format!("LEGO Piece {}", index + 1),
                    PieceType::Brick,
                    Method::Yolo,
                )
                .with_confidence(confidence.unwrap_or(YOLO_DEFAULT_CONFIDENCE))
                .with_metadata(Value::Object(metadata)),
            )
        })
        .collect();

    Ok(pieces)
}

/// Pieces from a generation backend envelope, already in [`Piece`] shape
pub fn generated_pieces(body: &Value) -> Result<Vec<Piece>> {
    normalize_generated(body).map(ensure_unique_ids)
}

fn normalize_generated(body: &Value) -> Result<Vec<Piece>> {
    let pieces = body
        .get("pieces")
        .filter(|p| p.is_array())
        .ok_or(NormalizeError::UnrecognizedShape(ResponseKind::Generation))?;
    let pieces: Vec<Piece> = serde_json::from_value(pieces.clone())?;
    Ok(pieces
        .into_iter()
        .enumerate()
        .map(|(index, piece)| sanitize_generated(index, piece))
        .collect())
}

/// Hold backend pieces to the same invariants as the detection handlers:
/// confidence in `0.0..=1.0`, non-empty name and type
fn sanitize_generated(index: usize, mut piece: Piece) -> Piece {
    if piece.name.trim().is_empty() {
        piece.name = format!("LEGO Piece {}", index + 1);
    }
    if piece.piece_type.as_str().trim().is_empty() {
        piece.piece_type = PieceType::infer(&piece.name, "");
    }
    let confidence = piece.confidence;
    piece.with_confidence(confidence)
}

/// Rename duplicate ids by appending `_2`, `_3`, ... so ids stay unique
/// within the batch.
pub fn ensure_unique_ids(pieces: Vec<Piece>) -> Vec<Piece> {
    let mut seen: HashSet<PieceId> = HashSet::with_capacity(pieces.len());
    pieces
        .into_iter()
        .map(|mut piece| {
            if seen.contains(&piece.id) {
                let base = piece.id.as_str().to_string();
                let mut n = 2;
                while seen.contains(&PieceId::new(format!("{base}_{n}"))) {
                    n += 1;
                }
                tracing::debug!("renaming duplicate piece id {base} to {base}_{n}");
                piece.id = PieceId::new(format!("{base}_{n}"));
            }
            seen.insert(piece.id.clone());
            piece
        })
        .collect()
}

/// The body itself when it is an array, else the first named array field
fn item_array<'a>(body: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    if let Some(items) = body.as_array() {
        return Some(items);
    }
    keys.iter().find_map(|key| body.get(*key).and_then(Value::as_array))
}

/// First non-empty string among `keys`
fn str_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// First positive number among `keys`; zero counts as absent
fn num_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| obj.get(*key).and_then(Value::as_f64))
        .find(|n| *n > 0.0)
}
