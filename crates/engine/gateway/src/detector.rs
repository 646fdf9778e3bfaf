//! Seam between the inbound endpoint and the provider gateway

use crate::client::GatewayClient;
use crate::types::{DetectionMethod, ImagePayload, Result};
use async_trait::async_trait;
use brickyard_pieces::Piece;

/// Anything that can turn an uploaded image into pieces for a detection
/// method. Implemented by [`GatewayClient`]; servers hold it as
/// `Arc<dyn PieceDetector>` so tests can substitute a canned detector.
#[async_trait]
pub trait PieceDetector: Send + Sync {
    async fn detect(&self, method: DetectionMethod, image: &ImagePayload) -> Result<Vec<Piece>>;
}

#[async_trait]
impl PieceDetector for GatewayClient {
    async fn detect(&self, method: DetectionMethod, image: &ImagePayload) -> Result<Vec<Piece>> {
        GatewayClient::detect(self, method, image).await
    }
}
