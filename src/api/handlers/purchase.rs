//! Ticket purchase and ticket lookup handlers.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{PurchaseRequestDto, PurchaseResponse, TicketDto};
use crate::api::extract::ApiJson;
use crate::app_state::AppState;
use crate::domain::TicketId;
use crate::error::{ErrorResponse, GatewayError};

/// Header carrying the caller's retry token.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// `POST /api/private-event-purchase` — Buy tickets for a listing.
///
/// # Errors
///
/// Returns [`GatewayError`] on invalid input, unknown listing, insufficient
/// inventory, or storage failure.
#[utoipa::path(
    post,
    path = "/api/private-event-purchase",
    tag = "Purchase",
    summary = "Purchase tickets",
    description = "Atomically checks inventory, records the ticket, and increments the sold counter. Repeating a request with the same Idempotency-Key returns the original ticket.",
    request_body = PurchaseRequestDto,
    params(
        ("Idempotency-Key" = Option<String>, Header, description = "Retry token (16-128 visible ASCII characters)"),
    ),
    responses(
        (status = 200, description = "Tickets issued", body = PurchaseResponse),
        (status = 400, description = "Invalid request or insufficient inventory", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
pub async fn purchase_tickets(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<PurchaseRequestDto>,
) -> Result<impl IntoResponse, GatewayError> {
    let header_key = headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .map(|v| {
            v.to_str().map(str::to_string).map_err(|_| {
                GatewayError::InvalidRequest("Idempotency-Key must be ASCII".to_string())
            })
        })
        .transpose()?;

    let request = body.into_request(header_key)?;
    let receipt = state.purchase_service.purchase(request).await?;
    Ok(Json(PurchaseResponse::from(receipt)))
}

/// `GET /tickets/:id` — Ticket details for the confirmation page.
///
/// # Errors
///
/// Returns [`GatewayError::TicketNotFound`] if the ticket does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/tickets/{id}",
    tag = "Purchase",
    summary = "Get a ticket",
    description = "Returns the ticket code, quantity, and amount charged. Buyer contact details other than the name are withheld.",
    params(
        ("id" = uuid::Uuid, Path, description = "Ticket UUID"),
    ),
    responses(
        (status = 200, description = "Ticket details", body = TicketDto),
        (status = 404, description = "Ticket not found", body = ErrorResponse),
    )
)]
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let ticket = state
        .purchase_service
        .get_ticket(TicketId::from_uuid(id))
        .await?;
    Ok(Json(TicketDto::from(ticket)))
}

/// Purchase route, mounted at the root under `/api`.
pub fn purchase_route() -> Router<AppState> {
    Router::new().route("/api/private-event-purchase", post(purchase_tickets))
}

/// Ticket lookup routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/tickets/{id}", get(get_ticket))
}
