//! Piece model for Brickyard
//!
//! Every provider Brickyard talks to (Trellis, Segment Anything, YOLO-style
//! detectors, the local image-to-3D backend) answers with its own JSON shape.
//! This crate owns the one shape the rest of the workspace agrees on,
//! [`Piece`], together with:
//!
//! - **Normalization**: per-provider mapping into pieces ([`normalize`])
//! - **Mock batches**: fixed fallbacks when a provider delivers nothing
//! - **Envelopes**: the JSON bodies of the detection endpoint and the
//!   generation backend
//!
//! # Example
//!
//! ```
//! use brickyard_pieces::{normalize, ResponseKind};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let body = serde_json::json!({ "data": [{ "name": "2x4 plate", "glb_url": "a.glb" }] });
//! let mut rng = StdRng::seed_from_u64(1);
//! let pieces = normalize(ResponseKind::Trellis, &body, &mut rng).unwrap();
//!
//! assert_eq!(pieces[0].id.as_str(), "trellis_0");
//! assert_eq!(pieces[0].piece_type.as_str(), "plate");
//! ```

pub mod mock;
pub mod normalize;
pub mod palette;
pub mod piece;
pub mod response;

pub use mock::{development_batch, mock_batch};
pub use normalize::{normalize, NormalizeError, ResponseKind};
pub use piece::{parse_dimensions, Method, Piece, PieceId, PieceType};
pub use response::{
    interpret_generation, DetectionResponse, ErrorBody, GenerationFailure, HealthStatus,
};
