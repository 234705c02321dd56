// =============================================================================
// Trade Insight — Main Entry Point
// =============================================================================
//
// Serves the indicator engine and the strategy advisor over HTTP.  Nothing is
// computed in the background: every request builds its own indicator series
// from the CSV it was given (or the quote feed) and drops it when done.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod advisor;
mod api;
mod app_state;
mod indicators;
mod market_data;
mod position_size;
mod runtime_config;
mod types;

use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::runtime_config::RuntimeConfig;

const DEFAULT_CONFIG_PATH: &str = "advisor_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        Trade Insight — Starting Up                       ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let config_path =
        std::env::var("ADVISOR_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());

    let mut config = RuntimeConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });
    config.apply_env_overrides();

    let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
    if api_key.trim().is_empty() {
        warn!("OPENAI_API_KEY is not set; /analyze and /share will answer 503");
    }

    info!(
        min_rows = config.min_rows,
        language = %config.language,
        model = %config.llm.model,
        "Advisor configured"
    );

    // ── 2. Build shared state ────────────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, api_key));

    // ── 3. Start the API server ──────────────────────────────────────────
    let app = api::rest::router(state.clone());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "API server listening");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "API server failed");
        }
    });

    info!("Ready. Press Ctrl+C to stop.");

    // ── 4. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received — stopping gracefully");

    if let Err(e) = state.runtime_config.read().save(&config_path) {
        error!(error = %e, "Failed to save runtime config on shutdown");
    }

    info!("Trade Insight shut down complete.");
    Ok(())
}
