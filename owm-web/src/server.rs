use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{Router, routing::get};
use owm_core::{Config, Units, WeatherProvider};

use crate::handlers;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn WeatherProvider>,
    pub default_city: Arc<str>,
    pub units: Units,
}

impl AppState {
    pub fn new(provider: Arc<dyn WeatherProvider>, config: &Config) -> Self {
        Self {
            provider,
            default_city: Arc::from(config.default_city.as_str()),
            units: config.units,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index).post(handlers::index_submit))
        .route("/coords", get(handlers::coords))
        .route("/onecall", get(handlers::one_call))
        .route("/sw.js", get(handlers::service_worker))
        .route("/static/{*path}", get(handlers::static_asset))
        .route("/ping", get(handlers::ping))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
    }
}
