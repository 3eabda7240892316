//! Database row models and their conversion into domain types.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::{
    BuyerInfo, EventId, EventListing, InboxItem, InboxItemId, InboxKind, Location, Schedule,
    Ticket, TicketCode, TicketId, TicketStatus, Visibility,
};
use crate::error::GatewayError;

/// A row of the `private_events` table.
#[derive(Debug, Clone, FromRow)]
pub struct ListingRow {
    /// Primary key.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Event date.
    pub event_date: NaiveDate,
    /// Start time.
    pub start_time: Option<NaiveTime>,
    /// End time.
    pub end_time: Option<NaiveTime>,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// State or region.
    pub state: String,
    /// Country.
    pub country: String,
    /// `public` or `private`.
    pub visibility: String,
    /// Whether tickets cost money.
    pub is_paid: bool,
    /// Unit price.
    pub unit_price: Decimal,
    /// Total inventory.
    pub quantity: i32,
    /// Units sold.
    pub quantity_sold: i32,
    /// Share link token.
    pub share_token: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ListingRow> for EventListing {
    type Error = GatewayError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        let visibility = Visibility::parse(&row.visibility).ok_or_else(|| {
            GatewayError::PersistenceError(format!("unknown visibility {:?}", row.visibility))
        })?;
        Ok(Self {
            id: EventId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            schedule: Schedule {
                date: row.event_date,
                start_time: row.start_time,
                end_time: row.end_time,
            },
            location: Location {
                address: row.address,
                city: row.city,
                state: row.state,
                country: row.country,
            },
            visibility,
            is_paid: row.is_paid,
            unit_price: row.unit_price,
            quantity: non_negative(row.quantity, "quantity")?,
            quantity_sold: non_negative(row.quantity_sold, "quantity_sold")?,
            share_token: row.share_token,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A row of the `private_event_tickets` table.
#[derive(Debug, Clone, FromRow)]
pub struct TicketRow {
    /// Primary key.
    pub id: Uuid,
    /// Owning event.
    pub event_id: Uuid,
    /// Buyer name.
    pub buyer_name: String,
    /// Buyer email.
    pub buyer_email: String,
    /// Buyer phone.
    pub buyer_phone: String,
    /// Units purchased.
    pub quantity: i32,
    /// Net amount per unit.
    pub price_paid: Decimal,
    /// Gross amount charged.
    pub total_price: Decimal,
    /// Payment reference.
    pub payment_reference: String,
    /// Checkout transaction id.
    pub transaction_id: Option<String>,
    /// Ticket status.
    pub status: String,
    /// Printed ticket code.
    pub ticket_code: String,
    /// Scoped idempotency key.
    pub idempotency_key: Option<String>,
    /// Issue timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = GatewayError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        let status = TicketStatus::parse(&row.status).ok_or_else(|| {
            GatewayError::PersistenceError(format!("unknown ticket status {:?}", row.status))
        })?;
        Ok(Self {
            id: TicketId::from_uuid(row.id),
            event_id: EventId::from_uuid(row.event_id),
            buyer: BuyerInfo {
                name: row.buyer_name,
                email: row.buyer_email,
                phone: row.buyer_phone,
            },
            quantity: non_negative(row.quantity, "ticket quantity")?,
            price_paid: row.price_paid,
            total_price: row.total_price,
            payment_reference: row.payment_reference,
            transaction_id: row.transaction_id,
            status,
            ticket_code: TicketCode::from_stored(row.ticket_code),
            idempotency_key: row.idempotency_key,
            created_at: row.created_at,
        })
    }
}

/// A row of `contact_messages` or `partner_requests`.
#[derive(Debug, Clone, FromRow)]
pub struct InboxRow {
    /// Primary key.
    pub id: Uuid,
    /// Sender name.
    pub name: String,
    /// Sender email.
    pub email: String,
    /// Subject or company.
    pub subject: String,
    /// Message body.
    pub message: String,
    /// Status string.
    pub status: String,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl InboxRow {
    /// Converts the row into a domain item of the given kind.
    #[must_use]
    pub fn into_item(self, kind: InboxKind) -> InboxItem {
        InboxItem {
            id: InboxItemId::from_uuid(self.id),
            kind,
            name: self.name,
            email: self.email,
            subject: self.subject,
            message: self.message,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn non_negative(value: i32, field: &str) -> Result<u32, GatewayError> {
    u32::try_from(value)
        .map_err(|_| GatewayError::PersistenceError(format!("negative {field}: {value}")))
}
