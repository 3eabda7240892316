//! Admin inbox: contact messages and partner requests.
//!
//! Both kinds are plain status-tagged records. The only mutation is a
//! single-field status change, validated against the kind's status set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::InboxItemId;
use crate::error::GatewayError;

/// Which inbox an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InboxKind {
    /// Messages from the public contact form (`contact_messages`).
    ContactMessage,
    /// Partnership enquiries (`partner_requests`).
    PartnerRequest,
}

impl InboxKind {
    /// Status assigned on submission.
    #[must_use]
    pub const fn initial_status(&self) -> &'static str {
        match self {
            Self::ContactMessage => "unread",
            Self::PartnerRequest => "pending",
        }
    }

    /// Statuses an item of this kind may take.
    #[must_use]
    pub const fn allowed_statuses(&self) -> &'static [&'static str] {
        match self {
            Self::ContactMessage => &["unread", "read", "resolved"],
            Self::PartnerRequest => &["pending", "reviewed", "contacted", "declined"],
        }
    }

    /// Validates `status` for this kind and returns its canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidStatus`] if the status is not in
    /// [`Self::allowed_statuses`].
    pub fn validate_status(&self, status: &str) -> Result<&'static str, GatewayError> {
        let wanted = status.trim().to_ascii_lowercase();
        self.allowed_statuses()
            .iter()
            .copied()
            .find(|s| *s == wanted)
            .ok_or_else(|| GatewayError::InvalidStatus {
                kind: self.label(),
                status: status.to_string(),
            })
    }

    /// Human-readable label used in messages.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ContactMessage => "contact message",
            Self::PartnerRequest => "partner request",
        }
    }

    /// Backing table name.
    #[must_use]
    pub const fn table(&self) -> &'static str {
        match self {
            Self::ContactMessage => "contact_messages",
            Self::PartnerRequest => "partner_requests",
        }
    }
}

/// A contact message or partner request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxItem {
    /// Item identifier.
    pub id: InboxItemId,
    /// Which inbox the item lives in.
    pub kind: InboxKind,
    /// Sender name.
    pub name: String,
    /// Sender email.
    pub email: String,
    /// Subject line, or company name for partner requests.
    pub subject: String,
    /// Message body.
    pub message: String,
    /// Current status, one of [`InboxKind::allowed_statuses`].
    pub status: String,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

impl InboxItem {
    /// Creates a freshly submitted item in the kind's initial status.
    #[must_use]
    pub fn submitted(
        kind: InboxKind,
        name: String,
        email: String,
        subject: String,
        message: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: InboxItemId::new(),
            kind,
            name,
            email,
            subject,
            message,
            status: kind.initial_status().to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}
