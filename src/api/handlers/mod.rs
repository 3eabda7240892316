//! REST endpoint handlers organized by resource.

pub mod inbox;
pub mod listings;
pub mod purchase;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(listings::routes())
        .merge(purchase::routes())
        .merge(inbox::routes())
}
