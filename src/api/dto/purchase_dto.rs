//! Purchase and ticket DTOs.
//!
//! The purchase endpoint speaks camelCase JSON to match the checkout page.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{BuyerInfo, EventId, Ticket};
use crate::error::GatewayError;
use crate::service::{PurchaseReceipt, PurchaseRequest};

/// Buyer contact block of a purchase request.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BuyerInfoDto {
    /// Full name.
    #[serde(default)]
    pub name: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
}

/// Request body for `POST /api/private-event-purchase`.
///
/// Fields are optional on the wire so that a missing field yields a
/// descriptive 400 instead of a generic decode error.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequestDto {
    /// Listing UUID.
    #[serde(default)]
    pub event_id: Option<String>,
    /// Units to buy; at least one.
    #[serde(default)]
    pub quantity: Option<i64>,
    /// Buyer contact details.
    #[serde(default)]
    pub buyer_info: Option<BuyerInfoDto>,
    /// Reference from the checkout widget.
    #[serde(default)]
    pub payment_reference: Option<String>,
    /// Transaction id from the checkout widget.
    #[serde(default)]
    pub transaction_id: Option<String>,
    /// Retry token; the `Idempotency-Key` header takes precedence.
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

impl PurchaseRequestDto {
    /// Validates the wire fields into a [`PurchaseRequest`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] naming the first missing or
    /// malformed field.
    pub fn into_request(
        self,
        header_key: Option<String>,
    ) -> Result<PurchaseRequest, GatewayError> {
        let event_id = self
            .event_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| GatewayError::InvalidRequest("eventId is required".to_string()))?;
        let event_id = uuid::Uuid::parse_str(event_id)
            .map(EventId::from_uuid)
            .map_err(|_| GatewayError::InvalidRequest("eventId must be a UUID".to_string()))?;

        let quantity = self
            .quantity
            .ok_or_else(|| GatewayError::InvalidRequest("quantity is required".to_string()))?;
        if quantity < 1 {
            return Err(GatewayError::InvalidRequest(
                "quantity must be at least 1".to_string(),
            ));
        }
        let quantity = i32::try_from(quantity)
            .ok()
            .and_then(|q| u32::try_from(q).ok())
            .ok_or_else(|| GatewayError::InvalidRequest("quantity is too large".to_string()))?;

        let buyer = self
            .buyer_info
            .ok_or_else(|| GatewayError::InvalidRequest("buyerInfo is required".to_string()))?;
        let buyer = BuyerInfo::new(
            buyer.name.as_deref(),
            buyer.email.as_deref(),
            buyer.phone.as_deref(),
        )?;

        let idempotency_token = header_key
            .or(self.idempotency_key)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        Ok(PurchaseRequest {
            event_id,
            quantity,
            buyer,
            payment_reference: self.payment_reference,
            transaction_id: self.transaction_id,
            idempotency_token,
        })
    }
}

/// Success body of `POST /api/private-event-purchase`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    /// Always `true`.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: String,
    /// Units left on the listing.
    pub tickets_remaining: u32,
    /// Issued ticket id.
    pub ticket_id: uuid::Uuid,
    /// Printed ticket code.
    pub ticket_code: String,
    /// Payment reference.
    pub reference: String,
    /// Confirmation page URL.
    pub redirect_url: String,
    /// `true` when an earlier request with the same key issued the ticket.
    pub replayed: bool,
}

impl From<PurchaseReceipt> for PurchaseResponse {
    fn from(receipt: PurchaseReceipt) -> Self {
        let message = if receipt.replayed {
            "Purchase already completed".to_string()
        } else {
            format!(
                "Successfully purchased {} ticket{}",
                receipt.ticket.quantity,
                if receipt.ticket.quantity == 1 { "" } else { "s" }
            )
        };
        Self {
            success: true,
            message,
            tickets_remaining: receipt.tickets_remaining,
            ticket_id: *receipt.ticket.id.as_uuid(),
            ticket_code: receipt.ticket.ticket_code.to_string(),
            reference: receipt.ticket.payment_reference,
            redirect_url: receipt.redirect_url,
            replayed: receipt.replayed,
        }
    }
}

/// Public view of a ticket for the confirmation page.
///
/// Buyer contact details other than the name are withheld.
#[derive(Debug, Serialize, ToSchema)]
pub struct TicketDto {
    /// Ticket id.
    pub ticket_id: uuid::Uuid,
    /// Listing id.
    pub event_id: uuid::Uuid,
    /// Printed ticket code.
    pub ticket_code: String,
    /// Buyer name.
    pub buyer_name: String,
    /// Units covered.
    pub quantity: u32,
    /// Gross amount charged.
    #[schema(value_type = String)]
    pub total_price: Decimal,
    /// Payment reference.
    pub reference: String,
    /// Ticket status.
    pub status: String,
    /// Issue time.
    pub created_at: DateTime<Utc>,
}

impl From<Ticket> for TicketDto {
    fn from(ticket: Ticket) -> Self {
        Self {
            ticket_id: *ticket.id.as_uuid(),
            event_id: *ticket.event_id.as_uuid(),
            ticket_code: ticket.ticket_code.to_string(),
            buyer_name: ticket.buyer.name,
            quantity: ticket.quantity,
            total_price: ticket.total_price,
            reference: ticket.payment_reference,
            status: ticket.status.as_str().to_string(),
            created_at: ticket.created_at,
        }
    }
}

/// Admin view of a ticket, including ledger amounts and contact details.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminTicketDto {
    /// Ticket id.
    pub ticket_id: uuid::Uuid,
    /// Printed ticket code.
    pub ticket_code: String,
    /// Buyer name.
    pub buyer_name: String,
    /// Buyer email.
    pub buyer_email: String,
    /// Buyer phone.
    pub buyer_phone: String,
    /// Units covered.
    pub quantity: u32,
    /// Net amount per unit recorded in the ledger.
    #[schema(value_type = String)]
    pub price_paid: Decimal,
    /// Gross amount charged.
    #[schema(value_type = String)]
    pub total_price: Decimal,
    /// Payment reference.
    pub reference: String,
    /// Checkout transaction id.
    pub transaction_id: Option<String>,
    /// Ticket status.
    pub status: String,
    /// Issue time.
    pub created_at: DateTime<Utc>,
}

impl From<Ticket> for AdminTicketDto {
    fn from(ticket: Ticket) -> Self {
        Self {
            ticket_id: *ticket.id.as_uuid(),
            ticket_code: ticket.ticket_code.to_string(),
            buyer_name: ticket.buyer.name,
            buyer_email: ticket.buyer.email,
            buyer_phone: ticket.buyer.phone,
            quantity: ticket.quantity,
            price_paid: ticket.price_paid,
            total_price: ticket.total_price,
            reference: ticket.payment_reference,
            transaction_id: ticket.transaction_id,
            status: ticket.status.as_str().to_string(),
            created_at: ticket.created_at,
        }
    }
}
