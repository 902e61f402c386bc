//! services/api/src/bin/api.rs

use api_lib::{bootstrap, config::Config, error::ApiError, web::build_router};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Configuration & logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!(
        bind_address = %config.bind_address,
        persistent = config.database_url.is_some(),
        "Configuration loaded"
    );

    // --- 2. Storage & shared state ---
    let app_state = bootstrap::initialize(config.clone()).await?;
    let app = build_router(app_state);

    // --- 3. Serve until interrupted ---
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Momentum API listening on {}", config.bind_address);
    info!("Swagger UI at http://{}/swagger-ui", config.bind_address);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}
