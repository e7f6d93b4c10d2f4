//! Mission Control -- anomaly tracking for the Manus blockchain and Copilot
//! integration.
//!
//! This crate provides the in-memory anomaly registry, the web-search and
//! ledger clients it leans on, layered configuration, and the HTTP API that
//! ties them together.

pub mod anomaly;
pub mod api;
pub mod blockchain;
pub mod config;
pub mod search;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;

use crate::anomaly::AnomalyRegistry;
use crate::api::state::AppState;
use crate::blockchain::LedgerClient;
use crate::config::AppConfig;

/// Build the shared application state from configuration.
pub fn build_state(config: &AppConfig) -> Result<AppState> {
    let registry = Arc::new(AnomalyRegistry::new());
    let search = search::provider_from_config(&config.search)
        .context("failed to initialise search provider")?;
    let ledger = Arc::new(LedgerClient::new(
        config.ledger.node_url.as_str(),
        config.ledger.network_id.as_str(),
        config.ledger.enable_planetary,
    ));
    Ok(AppState::new(registry, search, ledger))
}

/// Start the Mission Control daemon: initial scan, then the API server.
pub async fn serve(config: AppConfig) -> Result<()> {
    // 1. Wire up components
    let state = build_state(&config)?;

    // 2. Initial anomaly scan
    tracing::info!("running initial anomaly detection");
    let detected = state.registry.detect().await;
    tracing::info!(count = detected.len(), "initial anomalies detected");

    // 3. Start API server
    let addr = config.server.bind_address();
    let app = api::router(state, config.server.request_timeout());

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(
        %addr,
        environment = %config.server.environment,
        "Mission Control listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server exited gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutting down server");
}
