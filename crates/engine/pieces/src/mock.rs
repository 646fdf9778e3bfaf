//! Fixed piece batches used when a provider cannot deliver real results

use crate::piece::{Method, Piece, PieceType};

/// The four representative pieces substituted when a fallback-enabled
/// provider fails or yields nothing usable.
pub fn mock_batch() -> Vec<Piece> {
    vec![
        Piece::new("trellis_1", "LEGO Brick 1x2", PieceType::Brick, Method::Trellis)
            .with_color("#ef4444")
            .with_dimensions("1x2")
            .with_confidence(0.95),
        Piece::new("trellis_2", "LEGO Plate 2x4", PieceType::Plate, Method::Trellis)
            .with_color("#3b82f6")
            .with_dimensions("2x4")
            .with_confidence(0.92),
        Piece::new("trellis_3", "LEGO Tile 1x1", PieceType::Tile, Method::Trellis)
            .with_color("#10b981")
            .with_dimensions("1x1")
            .with_confidence(0.88),
        Piece::new("trellis_4", "LEGO Slope 1x2", PieceType::Slope, Method::Trellis)
            .with_color("#f59e0b")
            .with_dimensions("1x2")
            .with_confidence(0.90),
    ]
}

/// Batch served by the detection endpoint in development mode when detection
/// fails: the first three mock pieces, re-tagged as `mock_N` / `mock`.
pub fn development_batch() -> Vec<Piece> {
    mock_batch()
        .into_iter()
        .take(3)
        .enumerate()
        .map(|(i, piece)| Piece {
            id: format!("mock_{}", i + 1).into(),
            method: Method::Mock,
            ..piece
        })
        .collect()
}
