//! Server setup and routing

use crate::{handlers, state::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;

/// Create the API router with all AI routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/ai/status", get(handlers::status))
        .route("/ai/generate-title", post(handlers::generate_title))
        .route("/ai/generate-summary", post(handlers::generate_summary))
        .route("/ai/generate-category", post(handlers::generate_category))
        .route("/ai/enhance-task", post(handlers::enhance_task))
        .route("/ai/chat", post(handlers::chat))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run the HTTP server until shutdown
pub async fn run_server(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "trak-ai listening");
    axum::serve(listener, app).await
}
