//! Inbox service: public contact and partner forms plus admin triage.

use std::sync::Arc;

use crate::domain::{InboxItem, InboxItemId, InboxKind};
use crate::error::GatewayError;
use crate::persistence::{InboxPage, InboxStore};

const MAX_FIELD_LEN: usize = 200;
const MAX_MESSAGE_LEN: usize = 5000;

/// A form submission before validation.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Sender name.
    pub name: String,
    /// Sender email.
    pub email: String,
    /// Subject line, or company name for partner requests.
    pub subject: String,
    /// Body.
    pub message: String,
}

/// Stores submissions and lets admins move them through their statuses.
#[derive(Debug, Clone)]
pub struct InboxService {
    store: Arc<dyn InboxStore>,
}

impl InboxService {
    /// Creates a new `InboxService`.
    #[must_use]
    pub fn new(store: Arc<dyn InboxStore>) -> Self {
        Self { store }
    }

    /// Validates and stores a submission in its kind's initial status.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for missing or oversized
    /// fields and [`GatewayError::PersistenceError`] if the store fails.
    pub async fn submit(
        &self,
        kind: InboxKind,
        submission: Submission,
    ) -> Result<InboxItem, GatewayError> {
        let name = required("name", &submission.name, MAX_FIELD_LEN)?;
        let email = required("email", &submission.email, MAX_FIELD_LEN)?;
        if !email.contains('@') {
            return Err(GatewayError::InvalidRequest(
                "email must be a valid address".to_string(),
            ));
        }
        let subject_field = match kind {
            InboxKind::ContactMessage => "subject",
            InboxKind::PartnerRequest => "company",
        };
        let subject = required(subject_field, &submission.subject, MAX_FIELD_LEN)?;
        let message = required("message", &submission.message, MAX_MESSAGE_LEN)?;

        let item = InboxItem::submitted(kind, name, email, subject, message);
        self.store.insert_item(item.clone()).await?;
        tracing::info!(kind = kind.label(), id = %item.id, "inbox item submitted");
        Ok(item)
    }

    /// Lists one page of items, newest first.
    ///
    /// `page` is 1-indexed; callers clamp it and `per_page` beforehand.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidStatus`] for an unknown status filter
    /// and [`GatewayError::PersistenceError`] if the store fails.
    pub async fn list(
        &self,
        kind: InboxKind,
        status: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> Result<InboxPage, GatewayError> {
        let status = status
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| kind.validate_status(s))
            .transpose()?;
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        self.store.list_items(kind, status, offset, per_page).await
    }

    /// Changes the status of one item.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidStatus`] for an unknown status and
    /// [`GatewayError::InboxItemNotFound`] for an unknown id.
    pub async fn update_status(
        &self,
        kind: InboxKind,
        id: InboxItemId,
        status: &str,
    ) -> Result<InboxItem, GatewayError> {
        let status = kind.validate_status(status.trim())?;
        let item = self
            .store
            .update_status(kind, id, status)
            .await?
            .ok_or(GatewayError::InboxItemNotFound(*id.as_uuid()))?;
        tracing::info!(kind = kind.label(), %id, status, "inbox status updated");
        Ok(item)
    }
}

fn required(field: &str, value: &str, max: usize) -> Result<String, GatewayError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(GatewayError::InvalidRequest(format!("{field} is required")));
    }
    if value.chars().count() > max {
        return Err(GatewayError::InvalidRequest(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(value.to_string())
}
