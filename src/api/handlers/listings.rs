//! Private event handlers: create, get, share link, admin ticket list.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::dto::{
    AdminTicketDto, CreateListingRequest, ListingDto, PaginationMeta, PaginationParams,
};
use crate::api::extract::{AdminAuth, ApiJson};
use crate::app_state::AppState;
use crate::domain::EventId;
use crate::error::{ErrorResponse, GatewayError};

/// A page of tickets of one listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct TicketListResponse {
    /// Tickets on this page, oldest first.
    pub data: Vec<AdminTicketDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// `POST /private-events` — Create a private event.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] on invalid input.
#[utoipa::path(
    post,
    path = "/api/v1/private-events",
    tag = "Events",
    summary = "Create a private event",
    description = "Creates a listing with a fixed inventory and a share link token.",
    request_body = CreateListingRequest,
    responses(
        (status = 201, description = "Listing created", body = ListingDto),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn create_listing(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateListingRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let new = req.into_new_listing().map_err(|raw| {
        GatewayError::InvalidRequest(format!("unknown visibility: {raw}"))
    })?;
    let listing = state.listing_service.create_listing(new).await?;
    Ok((StatusCode::CREATED, Json(ListingDto::from(listing))))
}

/// `GET /private-events/:id` — Listing details with remaining inventory.
///
/// # Errors
///
/// Returns [`GatewayError::EventNotFound`] if the listing does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/private-events/{id}",
    tag = "Events",
    summary = "Get a private event",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Listing details", body = ListingDto),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let listing = state
        .listing_service
        .get_listing(EventId::from_uuid(id))
        .await?;
    Ok(Json(ListingDto::from(listing)))
}

/// `GET /share/:token` — Resolve a share link.
///
/// # Errors
///
/// Returns [`GatewayError::ShareLinkNotFound`] if no listing carries the token.
#[utoipa::path(
    get,
    path = "/api/v1/share/{token}",
    tag = "Events",
    summary = "Resolve a share link",
    params(
        ("token" = String, Path, description = "Share token"),
    ),
    responses(
        (status = 200, description = "Listing details", body = ListingDto),
        (status = 404, description = "Unknown share link", body = ErrorResponse),
    )
)]
pub async fn get_shared_listing(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let listing = state.listing_service.get_by_share_token(&token).await?;
    Ok(Json(ListingDto::from(listing)))
}

/// `GET /admin/private-events/:id/tickets` — Tickets issued for a listing.
///
/// # Errors
///
/// Returns [`GatewayError::Unauthorized`] without admin credentials and
/// [`GatewayError::EventNotFound`] if the listing does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/admin/private-events/{id}/tickets",
    tag = "Admin",
    summary = "List tickets of an event",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
        PaginationParams,
    ),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Paginated ticket list", body = TicketListResponse),
        (status = 401, description = "Missing or wrong admin token", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn list_event_tickets(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let params = params.clamped();
    let tickets = state
        .purchase_service
        .list_tickets(EventId::from_uuid(id))
        .await?;

    let total = tickets.len() as u64;
    let data: Vec<AdminTicketDto> = tickets
        .into_iter()
        .skip(params.offset())
        .take(params.per_page as usize)
        .map(AdminTicketDto::from)
        .collect();

    Ok(Json(TicketListResponse {
        data,
        pagination: params.meta(total),
    }))
}

/// Listing routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/private-events", post(create_listing))
        .route("/private-events/{id}", get(get_listing))
        .route("/share/{token}", get(get_shared_listing))
        .route(
            "/admin/private-events/{id}/tickets",
            get(list_event_tickets),
        )
}
