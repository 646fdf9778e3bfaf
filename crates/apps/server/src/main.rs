use anyhow::Context;
use brickyard_gateway::GatewayClient;
use brickyard_server::{router, AppState, ServerConfig};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::from_env()?;
    if config.gateway.api_key.is_none() {
        tracing::warn!("HUGGINGFACE_API_KEY is not set; segment-anything and yolo-lego will fail");
    }

    let detector = Arc::new(GatewayClient::new(config.gateway.clone()));
    let app = router(AppState::new(detector, config.mode, config.service_name.clone()));

    let listener = TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("binding {}", config.bind_address))?;
    tracing::info!(
        "{} listening on {} in {} mode",
        config.service_name,
        listener.local_addr()?,
        config.mode
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}
