//! # ticket-gateway
//!
//! REST and WebSocket backend for an event-ticketing platform: private
//! event listings with share links, oversell-proof ticket purchase, and an
//! admin inbox for contact messages and partner requests.
//!
//! The purchase path checks inventory, increments the sold counter, and
//! inserts the ticket as one atomic unit at the storage layer, so
//! concurrent buyers can never push `quantity_sold` past `quantity`.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── PurchaseService / ListingService / InboxService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     └── TicketStore + InboxStore (persistence/)
//!           ├── MemoryStore (per-listing locks)
//!           └── PostgresStore (conditional UPDATE in a transaction)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

/// Builds the full HTTP application: REST routes, `/ws`, and middleware.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws::handler::ws_handler))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
