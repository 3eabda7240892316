//! REST API layer: route handlers, DTOs, extractors, and router composition.
//!
//! Resource endpoints are mounted under `/api/v1`; the purchase endpoint
//! lives at `/api/private-event-purchase` where the checkout page posts.

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod openapi;

use axum::Router;

use crate::app_state::AppState;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::purchase::purchase_route())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
    };

    router
}
