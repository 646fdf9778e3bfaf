//! Provider endpoints, credentials and timeouts

use crate::types::TrellisRoute;
use std::env;
use std::time::Duration;

pub const DEFAULT_GENERATION_URL: &str = "http://localhost:5051";
pub const DEFAULT_HF_INFERENCE_URL: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_TRELLIS_SPACES_URL: &str = "https://trellis-community-trellis.hf.space/api/predict";
pub const DEFAULT_TRELLIS_LOCAL_URL: &str = "http://localhost:5000/api/trellis";

/// Generation can take minutes on a cold GPU
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(600);
const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

const SAM_MODEL: &str = "facebook/sam-vit-huge";
const YOLO_MODEL: &str = "ultralytics/yolov8n";
const TRELLIS_MODEL: &str = "trellis-community/TRELLIS";

/// Configuration for [`GatewayClient`](crate::GatewayClient).
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the local generation backend
    pub generation_url: String,
    /// Base URL of the Hugging Face Inference API, without the model path
    pub hf_inference_url: String,
    /// Full URL of the Trellis Spaces predict endpoint
    pub trellis_spaces_url: String,
    /// Full URL of a self-hosted Trellis service
    pub trellis_local_url: String,
    pub trellis_route: TrellisRoute,
    /// Substitute the mock batch when Trellis fails or finds nothing
    pub trellis_fallback: bool,
    /// Bearer credential for Hugging Face hosted models
    pub api_key: Option<String>,
    pub request_timeout: Duration,
    pub health_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            generation_url: DEFAULT_GENERATION_URL.into(),
            hf_inference_url: DEFAULT_HF_INFERENCE_URL.into(),
            trellis_spaces_url: DEFAULT_TRELLIS_SPACES_URL.into(),
            trellis_local_url: DEFAULT_TRELLIS_LOCAL_URL.into(),
            trellis_route: TrellisRoute::default(),
            trellis_fallback: true,
            api_key: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
        }
    }
}

impl GatewayConfig {
    /// Builds a configuration from `BRICKYARD_*` environment variables and
    /// `HUGGINGFACE_API_KEY`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let trellis_route = match var("BRICKYARD_TRELLIS_ROUTE") {
            Some(route) => route.parse::<TrellisRoute>().unwrap_or_else(|e: String| {
                tracing::warn!("{e}, using {}", defaults.trellis_route);
                defaults.trellis_route
            }),
            None => defaults.trellis_route,
        };
        let request_timeout = var("BRICKYARD_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        Self {
            generation_url: var("BRICKYARD_GENERATION_URL").unwrap_or(defaults.generation_url),
            hf_inference_url: var("BRICKYARD_HF_INFERENCE_URL").unwrap_or(defaults.hf_inference_url),
            trellis_spaces_url: var("BRICKYARD_TRELLIS_SPACES_URL")
                .unwrap_or(defaults.trellis_spaces_url),
            trellis_local_url: var("BRICKYARD_TRELLIS_LOCAL_URL")
                .unwrap_or(defaults.trellis_local_url),
            trellis_route,
            trellis_fallback: defaults.trellis_fallback,
            api_key: var("HUGGINGFACE_API_KEY"),
            request_timeout,
            health_timeout: defaults.health_timeout,
        }
    }

    pub fn with_generation_url(mut self, url: impl Into<String>) -> Self {
        self.generation_url = url.into();
        self
    }

    pub fn with_hf_inference_url(mut self, url: impl Into<String>) -> Self {
        self.hf_inference_url = url.into();
        self
    }

    pub fn with_trellis_spaces_url(mut self, url: impl Into<String>) -> Self {
        self.trellis_spaces_url = url.into();
        self
    }

    pub fn with_trellis_local_url(mut self, url: impl Into<String>) -> Self {
        self.trellis_local_url = url.into();
        self
    }

    pub fn with_trellis_route(mut self, route: TrellisRoute) -> Self {
        self.trellis_route = route;
        self
    }

    pub fn with_trellis_fallback(mut self, enabled: bool) -> Self {
        self.trellis_fallback = enabled;
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    pub fn generation_base(&self) -> &str {
        self.generation_url.trim_end_matches('/')
    }

    pub fn sam_url(&self) -> String {
        self.model_url(SAM_MODEL)
    }

    pub fn yolo_url(&self) -> String {
        self.model_url(YOLO_MODEL)
    }

    pub fn trellis_inference_url(&self) -> String {
        self.model_url(TRELLIS_MODEL)
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/{model}", self.hf_inference_url.trim_end_matches('/'))
    }
}
