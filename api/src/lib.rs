pub mod ask;
pub mod config;
pub mod error;
pub mod health;
pub mod rag_client;
pub mod scratch;
pub mod status_payload;
pub mod upload;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use config::RelayConfig;
use rag_client::RagClient;
use scratch::ScratchDir;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub rag: RagClient,
    pub scratch: ScratchDir,
}

impl AppState {
    pub async fn new(config: RelayConfig) -> Result<Self> {
        let rag = RagClient::new(&config)?;
        let scratch = ScratchDir::open(&config.upload_dir).await?;

        Ok(Self {
            config: Arc::new(config),
            rag,
            scratch,
        })
    }
}

/// All relay routes. Binding a listener is left to the caller so tests can
/// drive the router in-process.
pub fn build_router(state: AppState) -> Router {
    let upload_limit = match state.config.max_upload_bytes {
        Some(max) => DefaultBodyLimit::max(max),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route("/", get(health::health))
        .route("/upload", post(upload::upload).layer(upload_limit))
        .route("/ask", post(ask::ask))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
