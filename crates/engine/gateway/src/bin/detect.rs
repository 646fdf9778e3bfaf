//! brickyard-detect - run the provider gateway from the command line

use anyhow::Context;
use brickyard_gateway::{
    DetectionMethod, GatewayClient, GatewayConfig, GenerationRoute, ImagePayload, TrellisRoute,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Turn photos of LEGO sets into pieces using the configured providers
#[derive(Parser)]
#[command(name = "brickyard-detect")]
#[command(about = "Detect or generate LEGO pieces from an image", long_about = None)]
struct Cli {
    /// Generation backend URL
    #[arg(long, global = true, env = "BRICKYARD_GENERATION_URL")]
    generation_url: Option<String>,

    /// Hugging Face Inference API base URL
    #[arg(long, global = true, env = "BRICKYARD_HF_INFERENCE_URL")]
    hf_inference_url: Option<String>,

    /// Trellis deployment (hf_spaces, hf_inference, local)
    #[arg(long, global = true, env = "BRICKYARD_TRELLIS_ROUTE")]
    trellis_route: Option<TrellisRoute>,

    /// Hugging Face API key
    #[arg(long, global = true, env = "HUGGINGFACE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "BRICKYARD_REQUEST_TIMEOUT_SECS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the generation backend's health
    Health,

    /// Run a hosted detection method
    Detect {
        /// Image file to upload
        image: PathBuf,

        /// trellis, segment-anything or yolo-lego
        #[arg(long, default_value = "trellis")]
        method: DetectionMethod,

        /// Fail instead of substituting mock pieces on the Trellis path
        #[arg(long)]
        no_fallback: bool,
    },

    /// Generate pieces with the local backend
    Generate {
        /// Image file to upload
        image: PathBuf,

        /// single or segment
        #[arg(long, default_value = "single")]
        route: GenerationRoute,
    },
}

impl Cli {
    fn config(&self) -> GatewayConfig {
        let mut config = GatewayConfig::from_env();
        if let Some(url) = &self.generation_url {
            config.generation_url = url.clone();
        }
        if let Some(url) = &self.hf_inference_url {
            config.hf_inference_url = url.clone();
        }
        if let Some(route) = self.trellis_route {
            config.trellis_route = route;
        }
        if let Some(secs) = self.timeout {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(key) = &self.api_key {
            config.api_key = Some(key.clone());
        }
        config
    }
}

fn load_image(path: &Path) -> anyhow::Result<ImagePayload> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".into());
    Ok(ImagePayload::new(bytes, file_name, ""))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = cli.config();

    let pieces = match cli.command {
        Commands::Health => {
            let client = GatewayClient::new(config);
            let status = client.health_check().await?;
            println!("{}: {}", status.service, status.status);
            anyhow::ensure!(status.is_healthy(), "backend reported {}", status.status);
            return Ok(());
        }
        Commands::Detect {
            image,
            method,
            no_fallback,
        } => {
            config.trellis_fallback = !no_fallback;
            let client = GatewayClient::new(config);
            client.detect(method, &load_image(&image)?).await?
        }
        Commands::Generate { image, route } => {
            let client = GatewayClient::new(config);
            client.generate(route, &load_image(&image)?).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&pieces)?);
    eprintln!("{} pieces", pieces.len());
    Ok(())
}
