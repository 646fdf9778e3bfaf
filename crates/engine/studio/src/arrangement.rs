//! Arrangement canvas: rotation, zoom, layout and dropped positions
//!
//! Purely visual. Nothing here models physics or geometry; positions are
//! percentages of the drop target's bounding box.

use brickyard_pieces::{Piece, PieceId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::TAU;

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 3.0;
pub const ZOOM_STEP: f64 = 1.2;

/// Auto-rotation speed in radians per millisecond
const ROTATION_RATE: f64 = 0.001;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayoutMode {
    #[default]
    Grid,
    List,
    Isometric,
}

impl LayoutMode {
    /// Next mode in the cycle grid → list → isometric → grid
    pub fn next(self) -> Self {
        match self {
            LayoutMode::Grid => LayoutMode::List,
            LayoutMode::List => LayoutMode::Isometric,
            LayoutMode::Isometric => LayoutMode::Grid,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LayoutMode::Grid => "grid",
            LayoutMode::List => "list",
            LayoutMode::Isometric => "isometric",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Data carried by a drag from a piece block, as `text/plain` JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragPayload {
    pub piece_id: PieceId,
    pub index: usize,
}

impl DragPayload {
    pub fn new(piece_id: PieceId, index: usize) -> Self {
        Self { piece_id, index }
    }

    pub fn to_json(&self) -> String {
        // A struct of a string and an integer always serializes
        serde_json::to_string(self).unwrap_or_default()
    }

    /// `None` for anything that is not a piece drag (files, foreign text)
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }
}

/// Offset inside the canvas, in percent of its width and height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Bounding box of the drop target in client coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Percentage offset of a client point; `None` for a degenerate box
    pub fn relative_position(&self, client_x: f64, client_y: f64) -> Option<Position> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        Some(Position {
            x: (client_x - self.left) / self.width * 100.0,
            y: (client_y - self.top) / self.height * 100.0,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Arrangement {
    rotating: bool,
    zoom: f64,
    layout: LayoutMode,
    positions: HashMap<PieceId, Position>,
}

impl Default for Arrangement {
    fn default() -> Self {
        Self {
            rotating: true,
            zoom: 1.0,
            layout: LayoutMode::default(),
            positions: HashMap::new(),
        }
    }
}

impl Arrangement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_rotating(&self) -> bool {
        self.rotating
    }

    pub fn toggle_rotation(&mut self) -> bool {
        self.rotating = !self.rotating;
        self.rotating
    }

    /// Current spin angle for a block, given a monotonic clock in ms
    pub fn rotation_angle(&self, now_ms: f64) -> f64 {
        if self.rotating {
            (now_ms * ROTATION_RATE).rem_euclid(TAU)
        } else {
            0.0
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Multiply or divide by [`ZOOM_STEP`], clamped to
    /// [`MIN_ZOOM`]..=[`MAX_ZOOM`]
    pub fn adjust_zoom(&mut self, direction: ZoomDirection) -> f64 {
        let next = match direction {
            ZoomDirection::In => self.zoom * ZOOM_STEP,
            ZoomDirection::Out => self.zoom / ZOOM_STEP,
        };
        self.zoom = next.clamp(MIN_ZOOM, MAX_ZOOM);
        self.zoom
    }

    pub fn zoom_percent(&self) -> u32 {
        (self.zoom * 100.0).round() as u32
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    pub fn cycle_layout(&mut self) -> LayoutMode {
        self.layout = self.layout.next();
        self.layout
    }

    pub fn position(&self, id: &PieceId) -> Option<Position> {
        self.positions.get(id).copied()
    }

    pub fn place(&mut self, id: PieceId, position: Position) {
        self.positions.insert(id, position);
    }

    /// Forget positions of pieces that left the batch
    pub fn retain_batch(&mut self, batch: &[Piece]) {
        self.positions
            .retain(|id, _| batch.iter().any(|piece| &piece.id == id));
    }

    /// Zoom back to 1.0 and forget all positions. Rotation and layout stay.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.positions.clear();
    }

    /// Split `pieces` into those laid out by the current mode and those
    /// pinned at a dropped position
    pub fn partition<'a>(&self, pieces: &[&'a Piece]) -> (Vec<&'a Piece>, Vec<(&'a Piece, Position)>) {
        let mut flowing = Vec::new();
        let mut pinned = Vec::new();
        for &piece in pieces {
            match self.position(&piece.id) {
                Some(position) => pinned.push((piece, position)),
                None => flowing.push(piece),
            }
        }
        (flowing, pinned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickyard_pieces::mock_batch;

    #[test]
    fn test_zoom_clamped_under_repeated_steps() {
        let mut arrangement = Arrangement::new();
        for _ in 0..20 {
            arrangement.adjust_zoom(ZoomDirection::In);
        }
        assert_eq!(arrangement.zoom(), MAX_ZOOM);
        assert_eq!(arrangement.zoom_percent(), 300);

        for _ in 0..20 {
            arrangement.adjust_zoom(ZoomDirection::Out);
        }
        assert_eq!(arrangement.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_zoom_steps_multiplicatively() {
        let mut arrangement = Arrangement::new();
        let zoomed = arrangement.adjust_zoom(ZoomDirection::In);
        assert!((zoomed - 1.2).abs() < 1e-9);
        assert_eq!(arrangement.zoom_percent(), 120);
        let back = arrangement.adjust_zoom(ZoomDirection::Out);
        assert!((back - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_layout_cycles_through_three_modes() {
        let mut arrangement = Arrangement::new();
        assert_eq!(arrangement.cycle_layout(), LayoutMode::List);
        assert_eq!(arrangement.cycle_layout(), LayoutMode::Isometric);
        assert_eq!(arrangement.cycle_layout(), LayoutMode::Grid);
    }

    #[test]
    fn test_rotation_toggle_and_angle() {
        let mut arrangement = Arrangement::new();
        assert!(arrangement.is_rotating());
        assert!((arrangement.rotation_angle(1500.0) - 1.5).abs() < 1e-9);
        assert!(!arrangement.toggle_rotation());
        assert_eq!(arrangement.rotation_angle(1500.0), 0.0);
    }

    #[test]
    fn test_relative_position() {
        let rect = Rect {
            left: 100.0,
            top: 50.0,
            width: 400.0,
            height: 200.0,
        };
        assert_eq!(
            rect.relative_position(300.0, 150.0),
            Some(Position { x: 50.0, y: 50.0 })
        );
        let empty = Rect { width: 0.0, ..rect };
        assert_eq!(empty.relative_position(300.0, 150.0), None);
    }

    #[test]
    fn test_drag_payload_wire_format() {
        let payload = DragPayload::new(PieceId::from("trellis_1"), 0);
        assert_eq!(payload.to_json(), r#"{"pieceId":"trellis_1","index":0}"#);
        assert_eq!(DragPayload::parse(&payload.to_json()), Some(payload));
        assert_eq!(DragPayload::parse("C:\\photos\\set.jpg"), None);
    }

    #[test]
    fn test_reset_and_partition() {
        let batch = mock_batch();
        let refs: Vec<&Piece> = batch.iter().collect();
        let mut arrangement = Arrangement::new();
        arrangement.place(batch[1].id.clone(), Position { x: 10.0, y: 20.0 });
        arrangement.adjust_zoom(ZoomDirection::In);

        let (flowing, pinned) = arrangement.partition(&refs);
        assert_eq!(flowing.len(), 3);
        assert_eq!(pinned.len(), 1);
        assert_eq!(pinned[0].0.id, batch[1].id);

        arrangement.reset();
        assert_eq!(arrangement.zoom(), 1.0);
        assert!(arrangement.position(&batch[1].id).is_none());
        assert!(arrangement.is_rotating());
    }
}
