// ==============================================================================
// main.rs - Weather API Gateway Entry Point
// ==============================================================================
// Description: Axum web server for the user and weather API
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use weather_api_gateway::{
    build_router,
    config::{Config, LogFormat},
    middleware::rate_limit::client_limiter,
    AppState,
};

// How often idle rate limit entries are dropped
const LIMITER_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;

    init_tracing(config.log_format);

    info!("Starting Weather API Gateway v{}", env!("CARGO_PKG_VERSION"));

    // Initialize application state
    let state = AppState::new(&config).context("Failed to initialize application state")?;

    let limiter = client_limiter(config.rate_limit_max, config.rate_limit_window)
        .context("Invalid rate limit configuration")?;
    let sweeper = limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(LIMITER_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            sweeper.retain_recent();
        }
    });

    // Build router with all endpoints
    let app = build_router(state, &config, limiter);

    // Bind server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("API Gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Run server
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("API Gateway stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Compact => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
