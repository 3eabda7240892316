//! Listing DTOs.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{EventListing, Location, Schedule, Visibility};
use crate::service::NewListing;

/// Request body for `POST /api/v1/private-events`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateListingRequest {
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Event date (`YYYY-MM-DD`).
    pub date: NaiveDate,
    /// Start time (`HH:MM:SS`).
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    /// End time (`HH:MM:SS`).
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    /// Street address.
    #[serde(default)]
    pub address: String,
    /// City.
    #[serde(default)]
    pub city: String,
    /// State or region.
    #[serde(default)]
    pub state: String,
    /// Country.
    #[serde(default)]
    pub country: String,
    /// `"public"` or `"private"`. Defaults to private.
    #[serde(default)]
    pub visibility: Option<String>,
    /// Whether tickets cost money.
    #[serde(default)]
    pub is_paid: bool,
    /// Price per ticket (decimal string or number).
    #[serde(default)]
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    /// Total inventory.
    pub quantity: u32,
}

impl CreateListingRequest {
    /// Converts the body into a [`NewListing`]; unknown visibility strings
    /// are returned as `Err` with the offending value.
    ///
    /// # Errors
    ///
    /// Returns the rejected visibility string.
    pub fn into_new_listing(self) -> Result<NewListing, String> {
        let visibility = match self.visibility.as_deref().map(str::trim) {
            None | Some("") => Visibility::Private,
            Some(raw) => Visibility::parse(&raw.to_ascii_lowercase()).ok_or_else(|| raw.to_string())?,
        };
        Ok(NewListing {
            name: self.name,
            description: self.description,
            schedule: Schedule {
                date: self.date,
                start_time: self.start_time,
                end_time: self.end_time,
            },
            location: Location {
                address: self.address,
                city: self.city,
                state: self.state,
                country: self.country,
            },
            visibility,
            is_paid: self.is_paid,
            unit_price: self.unit_price,
            quantity: self.quantity,
        })
    }
}

/// Listing details returned by create, get, and share-link lookups.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListingDto {
    /// Listing id.
    pub event_id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Event date.
    pub date: NaiveDate,
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
    /// Price per ticket.
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    /// Total inventory.
    pub quantity: u32,
    /// Units sold.
    pub quantity_sold: u32,
    /// Units still available.
    pub tickets_remaining: u32,
    /// `true` when nothing is left.
    pub sold_out: bool,
    /// Share link token.
    pub share_token: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<EventListing> for ListingDto {
    fn from(listing: EventListing) -> Self {
        let tickets_remaining = listing.tickets_remaining();
        let sold_out = listing.is_sold_out();
        Self {
            event_id: *listing.id.as_uuid(),
            name: listing.name,
            description: listing.description,
            date: listing.schedule.date,
            start_time: listing.schedule.start_time,
            end_time: listing.schedule.end_time,
            address: listing.location.address,
            city: listing.location.city,
            state: listing.location.state,
            country: listing.location.country,
            visibility: listing.visibility.as_str().to_string(),
            is_paid: listing.is_paid,
            unit_price: listing.unit_price,
            quantity: listing.quantity,
            quantity_sold: listing.quantity_sold,
            tickets_remaining,
            sold_out,
            share_token: listing.share_token,
            created_at: listing.created_at,
        }
    }
}
