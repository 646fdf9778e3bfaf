//! Provider gateway for Brickyard
//!
//! Forwards an uploaded image to one of the services that can turn it into
//! LEGO pieces and normalizes whatever comes back:
//!
//! - **Generation backend**: the local image-to-3D service
//!   (`/api/3d-generation`, `/api/segment-and-generate`)
//! - **Trellis**: Hugging Face Spaces, Hugging Face Inference or a local
//!   deployment, with mock fallback
//! - **Segment Anything** and **YOLO**: Hugging Face hosted models
//!
//! # Example
//!
//! ```no_run
//! use brickyard_gateway::{DetectionMethod, GatewayClient, ImagePayload};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GatewayClient::from_env();
//!     let image = ImagePayload::new(std::fs::read("set.png")?, "set.png", "image/png");
//!
//!     let pieces = client.detect(DetectionMethod::Trellis, &image).await?;
//!     for piece in &pieces {
//!         println!("{} {} {}", piece.id, piece.piece_type, piece.dimensions);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod detector;
pub mod types;

pub use client::GatewayClient;
pub use config::GatewayConfig;
pub use detector::PieceDetector;
pub use types::{
    guess_mime, DetectionMethod, GatewayError, GenerationRoute, ImagePayload, Result, Strategy,
    TrellisRoute,
};
