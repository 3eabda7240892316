//! Contact message and partner request DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::PaginationMeta;
use crate::domain::InboxItem;
use crate::service::Submission;

/// Request body for `POST /api/v1/contact-messages`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ContactMessageRequest {
    /// Sender name.
    #[serde(default)]
    pub name: String,
    /// Sender email.
    #[serde(default)]
    pub email: String,
    /// Subject line.
    #[serde(default)]
    pub subject: String,
    /// Message body.
    #[serde(default)]
    pub message: String,
}

impl From<ContactMessageRequest> for Submission {
    fn from(req: ContactMessageRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            subject: req.subject,
            message: req.message,
        }
    }
}

/// Request body for `POST /api/v1/partner-requests`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PartnerRequestRequest {
    /// Contact name.
    #[serde(default)]
    pub name: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
    /// Company or venue.
    #[serde(default)]
    pub company: String,
    /// What the partner proposes.
    #[serde(default)]
    pub message: String,
}

impl From<PartnerRequestRequest> for Submission {
    fn from(req: PartnerRequestRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            subject: req.company,
            message: req.message,
        }
    }
}

/// Query parameters of the admin inbox lists.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct InboxQuery {
    /// Only items in this status.
    #[serde(default)]
    pub status: Option<String>,
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default)]
    pub page: Option<u32>,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// Request body of the admin status update.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// New status.
    pub status: String,
}

/// One inbox item.
#[derive(Debug, Serialize, ToSchema)]
pub struct InboxItemDto {
    /// Item id.
    pub id: uuid::Uuid,
    /// Sender name.
    pub name: String,
    /// Sender email.
    pub email: String,
    /// Subject, or company for partner requests.
    pub subject: String,
    /// Body.
    pub message: String,
    /// Current status.
    pub status: String,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

impl From<InboxItem> for InboxItemDto {
    fn from(item: InboxItem) -> Self {
        Self {
            id: *item.id.as_uuid(),
            name: item.name,
            email: item.email,
            subject: item.subject,
            message: item.message,
            status: item.status,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// A page of inbox items.
#[derive(Debug, Serialize, ToSchema)]
pub struct InboxListResponse {
    /// Items on this page, newest first.
    pub data: Vec<InboxItemDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
