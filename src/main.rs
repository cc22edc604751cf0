//! trak-ai server binary

use anyhow::Result;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;
use trak_ai::{run_server, AiConfig, AiService, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("trak_ai=info,tower_http=info")),
        )
        .init();

    let config = AiConfig::from_env()?;
    tracing::info!(
        model = %config.default_model,
        endpoint = %config.default_endpoint,
        "loaded configuration"
    );

    let service = AiService::new(config)?;
    let addr: SocketAddr = std::env::var("TRAK_AI_BIND")
        .unwrap_or_else(|_| "127.0.0.1:8000".to_string())
        .parse()?;

    run_server(AppState::new(service), addr).await?;
    Ok(())
}
