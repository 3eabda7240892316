//! Issued tickets and buyer contact details.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ticket_code::TicketCode;
use super::{EventId, TicketId};
use crate::error::GatewayError;

/// Lifecycle state of a ticket. Only `Active` is issued today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Valid for entry.
    Active,
    /// Voided by the organiser.
    Cancelled,
    /// Money returned to the buyer.
    Refunded,
}

impl TicketStatus {
    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }

    /// Parses the storage representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "cancelled" => Some(Self::Cancelled),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }
}

/// Contact details of the person buying tickets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerInfo {
    /// Full name.
    pub name: String,
    /// Email address; receives the ticket.
    pub email: String,
    /// Phone number.
    pub phone: String,
}

impl BuyerInfo {
    /// Builds buyer details from raw request fields, trimming whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the name, email or phone
    /// is missing, or the email has no `@` with text on both sides.
    pub fn new(
        name: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Self, GatewayError> {
        let name = name.map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "buyerInfo.name is required".to_string(),
            ));
        }
        let email = email.map(str::trim).unwrap_or_default();
        if email.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "buyerInfo.email is required".to_string(),
            ));
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => {
                return Err(GatewayError::InvalidRequest(format!(
                    "invalid buyer email: {email}"
                )));
            }
        }
        let phone = phone.map(str::trim).unwrap_or_default();
        if phone.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "buyerInfo.phone is required".to_string(),
            ));
        }
        Ok(Self {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        })
    }
}

/// A purchased allocation of one or more inventory units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Primary key.
    pub id: TicketId,
    /// Owning event.
    pub event_id: EventId,
    /// Buyer contact details.
    pub buyer: BuyerInfo,
    /// Number of units covered by this ticket.
    pub quantity: u32,
    /// Net amount per unit after the platform fee.
    pub price_paid: Decimal,
    /// Gross amount charged to the buyer.
    pub total_price: Decimal,
    /// Payment reference shown to the buyer.
    pub payment_reference: String,
    /// Transaction id reported by the checkout widget.
    pub transaction_id: Option<String>,
    /// Lifecycle state.
    pub status: TicketStatus,
    /// Code printed on the ticket.
    pub ticket_code: TicketCode,
    /// Scoped idempotency key the ticket was issued under.
    pub idempotency_key: Option<String>,
    /// Issue timestamp.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn buyer_requires_every_field() {
        let phone = Some("+351900000000");
        assert!(BuyerInfo::new(None, Some("a@b.c"), phone).is_err());
        assert!(BuyerInfo::new(Some("  "), Some("a@b.c"), phone).is_err());
        assert!(BuyerInfo::new(Some("Ana"), None, phone).is_err());
        assert!(BuyerInfo::new(Some("Ana"), Some("not-an-email"), phone).is_err());
        assert!(BuyerInfo::new(Some("Ana"), Some("@b.c"), phone).is_err());
        assert!(matches!(
            BuyerInfo::new(Some("Ana"), Some("a@b.c"), Some("  ")),
            Err(GatewayError::InvalidRequest(msg)) if msg == "buyerInfo.phone is required"
        ));
        assert!(BuyerInfo::new(Some("Ana"), Some("a@b.c"), None).is_err());
    }

    #[test]
    fn buyer_fields_are_trimmed() {
        let Ok(buyer) =
            BuyerInfo::new(Some(" Ana "), Some(" ana@example.com "), Some(" +351900000000 "))
        else {
            panic!("valid buyer rejected");
        };
        assert_eq!(buyer.name, "Ana");
        assert_eq!(buyer.email, "ana@example.com");
        assert_eq!(buyer.phone, "+351900000000");
    }

    #[test]
    fn status_round_trip() {
        for status in [
            TicketStatus::Active,
            TicketStatus::Cancelled,
            TicketStatus::Refunded,
        ] {
            assert_eq!(TicketStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TicketStatus::parse("pending"), None);
    }
}
