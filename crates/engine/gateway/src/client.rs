//! HTTP client for the generation backend and the hosted detection providers

use crate::config::GatewayConfig;
use crate::types::{
    DetectionMethod, GatewayError, GenerationRoute, ImagePayload, Result, Strategy, TrellisRoute,
};
use brickyard_pieces::{
    interpret_generation, mock_batch, normalize, GenerationFailure, HealthStatus, Piece,
};
use reqwest::{multipart, Client, RequestBuilder};
use serde_json::{json, Value};
use std::time::Duration;

/// Gateway to every provider Brickyard can turn an image into pieces with.
///
/// Each call is a single attempt: there is no retry or backoff, and the only
/// recovery is the mock batch substituted on the Trellis path.
///
/// # Example
///
/// ```no_run
/// use brickyard_gateway::{GatewayClient, GatewayConfig, GenerationRoute, ImagePayload};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = GatewayClient::new(GatewayConfig::from_env());
///
///     let status = client.health_check().await?;
///     println!("{} is {}", status.service, status.status);
///
///     let bytes = std::fs::read("set.jpg")?;
///     let image = ImagePayload::new(bytes, "set.jpg", "image/jpeg");
///     let pieces = client.generate(GenerationRoute::SingleImage, &image).await?;
///     println!("Generated {} pieces", pieces.len());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    config: GatewayConfig,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(GatewayConfig::from_env())
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Check the generation backend's `/api/health` endpoint
    pub async fn health_check(&self) -> Result<HealthStatus> {
        let url = format!("{}/api/health", self.config.generation_base());
        let request = self.client.get(&url);
        let (status, body) = self
            .send(request, &url, self.config.health_timeout)
            .await?;

        if !(200..300).contains(&status) {
            return Err(GatewayError::Provider {
                status,
                message: provider_message(&body),
            });
        }
        serde_json::from_str(&body)
            .map_err(|e| GatewayError::Parse(format!("Failed to parse health response: {e}")))
    }

    /// Run any strategy
    pub async fn run(&self, strategy: Strategy, image: &ImagePayload) -> Result<Vec<Piece>> {
        match strategy {
            Strategy::Generate(route) => self.generate(route, image).await,
            Strategy::Detect(method) => self.detect(method, image).await,
        }
    }

    /// Send the image to the local generation backend.
    ///
    /// Every failure, including an empty piece list, is returned to the
    /// caller; nothing is substituted.
    pub async fn generate(&self, route: GenerationRoute, image: &ImagePayload) -> Result<Vec<Piece>> {
        ensure_image(image)?;
        let url = format!("{}{}", self.config.generation_base(), route.path());
        tracing::info!("Generating 3D pieces via {url}");

        let request = self.client.post(&url).multipart(image_form(image)?);
        let (status, body) = self
            .send(request, &url, self.config.request_timeout)
            .await?;

        interpret_generation(status, &body).map_err(|failure| match failure {
            GenerationFailure::Provider { status, message } => {
                GatewayError::Provider { status, message }
            }
            GenerationFailure::Unsuccessful(message) => GatewayError::Provider { status, message },
            GenerationFailure::Empty => GatewayError::EmptyResult,
            GenerationFailure::Malformed(message) => GatewayError::Parse(message),
        })
    }

    /// Run one of the hosted detection methods.
    ///
    /// An empty Trellis result is [`GatewayError::EmptyResult`]; with
    /// `trellis_fallback` enabled that and every other Trellis failure
    /// becomes the mock batch. The other methods propagate errors and may
    /// legitimately return zero pieces.
    pub async fn detect(&self, method: DetectionMethod, image: &ImagePayload) -> Result<Vec<Piece>> {
        ensure_image(image)?;
        let strategy = Strategy::Detect(method);

        let result = self.detect_once(method, image).await;
        if !strategy.falls_back_to_mock() {
            return result;
        }

        let result = result.and_then(|pieces| {
            if pieces.is_empty() {
                Err(GatewayError::EmptyResult)
            } else {
                Ok(pieces)
            }
        });
        if !self.config.trellis_fallback {
            return result;
        }

        result.or_else(|e| {
            tracing::warn!("Trellis detection failed, falling back to mock pieces: {e}");
            Ok(mock_batch())
        })
    }

    async fn detect_once(&self, method: DetectionMethod, image: &ImagePayload) -> Result<Vec<Piece>> {
        let body = match method {
            DetectionMethod::Trellis => self.call_trellis(image).await?,
            DetectionMethod::SegmentAnything => {
                let url = self.config.sam_url();
                self.post_multipart(&url, image, Some(self.api_key()?)).await?
            }
            DetectionMethod::YoloLego => {
                let url = self.config.yolo_url();
                self.post_multipart(&url, image, Some(self.api_key()?)).await?
            }
        };

        let kind = Strategy::Detect(method).response_kind();
        let pieces = normalize(kind, &body, &mut rand::rng())?;
        tracing::info!("{method} detected {} pieces", pieces.len());
        Ok(pieces)
    }

    async fn call_trellis(&self, image: &ImagePayload) -> Result<Value> {
        match self.config.trellis_route {
            TrellisRoute::HfSpaces => {
                let url = &self.config.trellis_spaces_url;
                let payload = json!({
                    "data": [
                        image.data_url(),
                        "trellis",
                        { "num_inference_steps": 50, "guidance_scale": 7.5 },
                        { "extract_glb": true, "extract_gaussian": false },
                    ]
                });
                let request = self.client.post(url).json(&payload);
                let (status, body) = self
                    .send(request, url, self.config.request_timeout)
                    .await?;
                read_json(status, &body)
            }
            TrellisRoute::HfInference => {
                let url = self.config.trellis_inference_url();
                self.post_multipart(&url, image, Some(self.api_key()?)).await
            }
            TrellisRoute::Local => {
                self.post_multipart(&self.config.trellis_local_url, image, None)
                    .await
            }
        }
    }

    async fn post_multipart(
        &self,
        url: &str,
        image: &ImagePayload,
        bearer: Option<&str>,
    ) -> Result<Value> {
        let mut request = self.client.post(url).multipart(image_form(image)?);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        let (status, body) = self
            .send(request, url, self.config.request_timeout)
            .await?;
        read_json(status, &body)
    }

    /// Send a request with the given timeout and read the whole body
    async fn send(
        &self,
        request: RequestBuilder,
        url: &str,
        timeout: Duration,
    ) -> Result<(u16, String)> {
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_send_error(e, url, timeout))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| map_send_error(e, url, timeout))?;
        tracing::debug!("{url} answered {status} ({} bytes)", body.len());
        Ok((status, body))
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or(GatewayError::MissingCredential("HUGGINGFACE_API_KEY"))
    }
}

impl Default for GatewayClient {
    fn default() -> Self {
        Self::new(GatewayConfig::default())
    }
}

fn map_send_error(error: reqwest::Error, url: &str, timeout: Duration) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout(timeout)
    } else if error.is_connect() {
        GatewayError::Connection(format!(
            "Failed to connect to {url}. Make sure the service is running."
        ))
    } else {
        GatewayError::Request(error)
    }
}

fn ensure_image(image: &ImagePayload) -> Result<()> {
    if image.is_empty() {
        return Err(GatewayError::MissingImage);
    }
    Ok(())
}

fn image_form(image: &ImagePayload) -> Result<multipart::Form> {
    let part = multipart::Part::bytes(image.bytes.clone())
        .file_name(image.file_name.clone())
        .mime_str(&image.mime)?;
    Ok(multipart::Form::new().part("image", part))
}

fn read_json(status: u16, body: &str) -> Result<Value> {
    if !(200..300).contains(&status) {
        return Err(GatewayError::Provider {
            status,
            message: provider_message(body),
        });
    }
    serde_json::from_str(body).map_err(|e| GatewayError::Parse(e.to_string()))
}

/// Best human-readable reason in an error body
fn provider_message(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        ["error", "message", "detail"]
            .iter()
            .find_map(|key| value.get(key).and_then(Value::as_str).map(str::to_string))
    });
    match from_json {
        Some(message) => message,
        None if body.trim().is_empty() => "Unknown error".into(),
        None => body.trim().chars().take(200).collect(),
    }
}
