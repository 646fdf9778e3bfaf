//! Brickyard server crate.
//!
//! Serves the detection endpoint used by the demo front-end. Each request
//! is forwarded to a [`PieceDetector`](brickyard_gateway::PieceDetector),
//! normally the provider gateway, and answered with a
//! [`DetectionResponse`](brickyard_pieces::DetectionResponse).

pub mod config;
pub mod error;
pub mod routes;

pub use config::{ExecutionMode, ServerConfig};
pub use error::ApiError;
pub use routes::{router, AppState, MAX_UPLOAD_BYTES};
