//! Contact and partner form handlers plus admin triage.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};

use crate::api::dto::{
    ContactMessageRequest, InboxItemDto, InboxListResponse, InboxQuery, PaginationParams,
    PartnerRequestRequest, UpdateStatusRequest,
};
use crate::api::extract::{AdminAuth, ApiJson};
use crate::app_state::AppState;
use crate::domain::{InboxItemId, InboxKind};
use crate::error::{ErrorResponse, GatewayError};

/// `POST /contact-messages` — Submit the contact form.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for missing fields.
#[utoipa::path(
    post,
    path = "/api/v1/contact-messages",
    tag = "Inbox",
    summary = "Submit a contact message",
    request_body = ContactMessageRequest,
    responses(
        (status = 201, description = "Message stored as unread", body = InboxItemDto),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn submit_contact_message(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ContactMessageRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let item = state
        .inbox_service
        .submit(InboxKind::ContactMessage, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(InboxItemDto::from(item))))
}

/// `POST /partner-requests` — Submit the partner form.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for missing fields.
#[utoipa::path(
    post,
    path = "/api/v1/partner-requests",
    tag = "Inbox",
    summary = "Submit a partner request",
    request_body = PartnerRequestRequest,
    responses(
        (status = 201, description = "Request stored as pending", body = InboxItemDto),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn submit_partner_request(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<PartnerRequestRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let item = state
        .inbox_service
        .submit(InboxKind::PartnerRequest, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(InboxItemDto::from(item))))
}

/// `GET /admin/contact-messages` — List contact messages.
///
/// # Errors
///
/// Returns [`GatewayError::Unauthorized`] without admin credentials and
/// [`GatewayError::InvalidStatus`] for an unknown status filter.
#[utoipa::path(
    get,
    path = "/api/v1/admin/contact-messages",
    tag = "Admin",
    summary = "List contact messages",
    params(InboxQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Paginated messages, newest first", body = InboxListResponse),
        (status = 400, description = "Unknown status filter", body = ErrorResponse),
        (status = 401, description = "Missing or wrong admin token", body = ErrorResponse),
    )
)]
pub async fn list_contact_messages(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Query(query): Query<InboxQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    list(&state, InboxKind::ContactMessage, query).await
}

/// `GET /admin/partner-requests` — List partner requests.
///
/// # Errors
///
/// Returns [`GatewayError::Unauthorized`] without admin credentials and
/// [`GatewayError::InvalidStatus`] for an unknown status filter.
#[utoipa::path(
    get,
    path = "/api/v1/admin/partner-requests",
    tag = "Admin",
    summary = "List partner requests",
    params(InboxQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Paginated requests, newest first", body = InboxListResponse),
        (status = 400, description = "Unknown status filter", body = ErrorResponse),
        (status = 401, description = "Missing or wrong admin token", body = ErrorResponse),
    )
)]
pub async fn list_partner_requests(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Query(query): Query<InboxQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    list(&state, InboxKind::PartnerRequest, query).await
}

/// `PATCH /admin/contact-messages/:id` — Change a message's status.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidStatus`] for an unknown status and
/// [`GatewayError::InboxItemNotFound`] for an unknown id.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/contact-messages/{id}",
    tag = "Admin",
    summary = "Update contact message status",
    description = "Allowed statuses: unread, read, resolved.",
    params(
        ("id" = uuid::Uuid, Path, description = "Message UUID"),
    ),
    request_body = UpdateStatusRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated message", body = InboxItemDto),
        (status = 400, description = "Unknown status", body = ErrorResponse),
        (status = 401, description = "Missing or wrong admin token", body = ErrorResponse),
        (status = 404, description = "Message not found", body = ErrorResponse),
    )
)]
pub async fn update_contact_message(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    ApiJson(req): ApiJson<UpdateStatusRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    update(&state, InboxKind::ContactMessage, id, &req.status).await
}

/// `PATCH /admin/partner-requests/:id` — Change a request's status.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidStatus`] for an unknown status and
/// [`GatewayError::InboxItemNotFound`] for an unknown id.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/partner-requests/{id}",
    tag = "Admin",
    summary = "Update partner request status",
    description = "Allowed statuses: pending, reviewed, contacted, declined.",
    params(
        ("id" = uuid::Uuid, Path, description = "Request UUID"),
    ),
    request_body = UpdateStatusRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated request", body = InboxItemDto),
        (status = 400, description = "Unknown status", body = ErrorResponse),
        (status = 401, description = "Missing or wrong admin token", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse),
    )
)]
pub async fn update_partner_request(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    ApiJson(req): ApiJson<UpdateStatusRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    update(&state, InboxKind::PartnerRequest, id, &req.status).await
}

async fn list(
    state: &AppState,
    kind: InboxKind,
    query: InboxQuery,
) -> Result<Json<InboxListResponse>, GatewayError> {
    let defaults = PaginationParams::default();
    let params = PaginationParams {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    }
    .clamped();

    let page = state
        .inbox_service
        .list(kind, query.status.as_deref(), params.page, params.per_page)
        .await?;

    Ok(Json(InboxListResponse {
        data: page.items.into_iter().map(InboxItemDto::from).collect(),
        pagination: params.meta(page.total),
    }))
}

async fn update(
    state: &AppState,
    kind: InboxKind,
    id: uuid::Uuid,
    status: &str,
) -> Result<Json<InboxItemDto>, GatewayError> {
    let item = state
        .inbox_service
        .update_status(kind, InboxItemId::from_uuid(id), status)
        .await?;
    Ok(Json(InboxItemDto::from(item)))
}

/// Inbox routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/contact-messages", post(submit_contact_message))
        .route("/partner-requests", post(submit_partner_request))
        .route("/admin/contact-messages", get(list_contact_messages))
        .route("/admin/contact-messages/{id}", patch(update_contact_message))
        .route("/admin/partner-requests", get(list_partner_requests))
        .route("/admin/partner-requests/{id}", patch(update_partner_request))
}
