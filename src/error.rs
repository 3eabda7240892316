//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to an HTTP status code and a stable upper-snake error code. Storage
//! and internal failures are logged in full but reach the client only as a
//! generic message.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "success": false,
///   "message": "Only 0 tickets available",
///   "error": "INSUFFICIENT_TICKETS"
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Human-readable message, safe to show to the buyer.
    pub message: String,
    /// Stable machine-readable code.
    pub error: String,
}

/// Server-side error enum with HTTP status code mapping.
///
/// | Category        | HTTP Status                 |
/// |-----------------|-----------------------------|
/// | Validation      | 400 Bad Request             |
/// | Business rule   | 400 Bad Request             |
/// | Access          | 401 Unauthorized            |
/// | Not found       | 404 Not Found               |
/// | Server          | 500 Internal Server Error   |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Status string not valid for the inbox kind.
    #[error("invalid {kind} status: {status}")]
    InvalidStatus {
        /// Inbox kind label.
        kind: &'static str,
        /// Rejected status.
        status: String,
    },

    /// Event listing with the given ID was not found.
    #[error("event not found: {0}")]
    EventNotFound(uuid::Uuid),

    /// No listing matches the share token.
    #[error("share link not found")]
    ShareLinkNotFound,

    /// Ticket with the given ID was not found.
    #[error("ticket not found: {0}")]
    TicketNotFound(uuid::Uuid),

    /// Inbox item with the given ID was not found.
    #[error("inbox item not found: {0}")]
    InboxItemNotFound(uuid::Uuid),

    /// Not enough inventory left for the requested quantity.
    #[error("Only {available} tickets available")]
    InsufficientTickets {
        /// Units remaining at the time of the check.
        available: u32,
    },

    /// Missing or wrong admin credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the stable error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::InvalidStatus { .. } => "INVALID_STATUS",
            Self::EventNotFound(_) | Self::ShareLinkNotFound => "EVENT_NOT_FOUND",
            Self::TicketNotFound(_) => "TICKET_NOT_FOUND",
            Self::InboxItemNotFound(_) => "NOT_FOUND",
            Self::InsufficientTickets { .. } => "INSUFFICIENT_TICKETS",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::PersistenceError(_) => "PERSISTENCE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::InvalidStatus { .. }
            | Self::InsufficientTickets { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::EventNotFound(_)
            | Self::ShareLinkNotFound
            | Self::TicketNotFound(_)
            | Self::InboxItemNotFound(_) => StatusCode::NOT_FOUND,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the client. Server-side failures are opaque.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidRequest(msg) => msg.clone(),
            Self::EventNotFound(_) | Self::ShareLinkNotFound => "Event not found".to_string(),
            Self::TicketNotFound(_) => "Ticket not found".to_string(),
            Self::InboxItemNotFound(_) => "Item not found".to_string(),
            Self::Unauthorized => "Admin credentials required".to_string(),
            Self::PersistenceError(_) | Self::Internal(_) => {
                "Failed to process request".to_string()
            }
            Self::InvalidStatus { .. } | Self::InsufficientTickets { .. } => self.to_string(),
        }
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        } else {
            tracing::debug!(error = %self, code = self.error_code(), "request rejected");
        }
        let body = ErrorResponse {
            success: false,
            message: self.public_message(),
            error: self.error_code().to_string(),
        };
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_tickets_message_states_remaining_count() {
        let err = GatewayError::InsufficientTickets { available: 0 };
        assert_eq!(err.public_message(), "Only 0 tickets available");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn persistence_errors_are_opaque() {
        let err = GatewayError::PersistenceError(
            "duplicate key value violates unique constraint".to_string(),
        );
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().contains("constraint"));
        assert_eq!(err.error_code(), "PERSISTENCE_ERROR");
    }

    #[test]
    fn not_found_variants_map_to_404() {
        for err in [
            GatewayError::EventNotFound(uuid::Uuid::new_v4()),
            GatewayError::ShareLinkNotFound,
            GatewayError::TicketNotFound(uuid::Uuid::new_v4()),
            GatewayError::InboxItemNotFound(uuid::Uuid::new_v4()),
        ] {
            assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn validation_message_passes_through() {
        let err = GatewayError::InvalidRequest("eventId is required".to_string());
        assert_eq!(err.public_message(), "eventId is required");
        assert_eq!(err.error_code(), "INVALID_REQUEST");
    }
}
