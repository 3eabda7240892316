//! ticket-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use ticket_gateway::app_state::AppState;
use ticket_gateway::build_app;
use ticket_gateway::config::{GatewayConfig, LogFormat};
use ticket_gateway::persistence::{InboxStore, MemoryStore, PostgresStore, TicketStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    tracing::info!(
        addr = %config.listen_addr,
        fee_rate = %config.fee_rate,
        persistence = config.persistence_enabled,
        "starting ticket-gateway"
    );

    let (tickets, inbox): (Arc<dyn TicketStore>, Arc<dyn InboxStore>) =
        if config.persistence_enabled {
            let store = Arc::new(
                PostgresStore::connect(&config)
                    .await
                    .context("connecting to PostgreSQL")?,
            );
            (Arc::clone(&store) as Arc<dyn TicketStore>, store as Arc<dyn InboxStore>)
        } else {
            tracing::warn!("persistence disabled, using in-memory store");
            let store = Arc::new(MemoryStore::new());
            (Arc::clone(&store) as Arc<dyn TicketStore>, store as Arc<dyn InboxStore>)
        };

    if config.admin_api_token.is_none() {
        tracing::warn!("ADMIN_API_TOKEN not set, admin routes are unauthenticated");
    }

    let app_state = AppState::new(&config, tickets, inbox);
    let app = build_app(app_state, Duration::from_secs(config.request_timeout_secs));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown signal received");
}
