// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Smartcar delivery API server.

use smartcar_delivery::{config::Config, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Malformed configuration is fatal
    let config = Config::from_env().map_err(|e| {
        tracing::error!(error = %e, "Invalid configuration, refusing to start");
        e
    })?;
    tracing::info!(
        port = config.port,
        mode = ?config.smartcar_mode,
        "Starting Smartcar delivery API"
    );

    let port = config.port;
    let state = Arc::new(AppState::from_config(config)?);

    // Build router
    let app = smartcar_delivery::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("smartcar_delivery=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
