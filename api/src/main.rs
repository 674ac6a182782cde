use relay_api::{build_router, config::RelayConfig, AppState};

#[tokio::main]
async fn main() {
    // Initialize environment variables and logging
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = RelayConfig::from_env();
    log::info!(
        "Relaying to RAG service at {} (uploads in {})",
        config.rag_service_url,
        config.upload_dir.display()
    );

    let port = config.port;
    let state = match AppState::new(config).await {
        Ok(state) => state,
        Err(e) => {
            log::error!("Failed to initialize relay: {:#}", e);
            std::process::exit(1);
        }
    };

    let app = build_router(state);

    let listener = match tokio::net::TcpListener::bind(("0.0.0.0", port)).await {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("Failed to bind port {}: {}", port, e);
            std::process::exit(1);
        }
    };

    log::info!("Backend server running on port {}", port);
    if let Err(e) = axum::serve(listener, app).await {
        log::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
