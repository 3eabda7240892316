//! Listing service: creates private events and resolves share links.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use rand::distributions::Alphanumeric;
use rust_decimal::Decimal;

use crate::domain::{
    EventBus, EventId, EventListing, Location, Schedule, TicketingEvent, Visibility,
};
use crate::error::GatewayError;
use crate::persistence::TicketStore;

/// Length of generated share tokens.
pub const SHARE_TOKEN_LEN: usize = 22;

const MAX_NAME_LEN: usize = 200;
const MAX_PRICE_SCALE: u32 = 2;
/// Highest accepted unit price.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Input for a new listing, already decoded from the wire.
#[derive(Debug, Clone)]
pub struct NewListing {
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Date and optional times.
    pub schedule: Schedule,
    /// Venue.
    pub location: Location,
    /// Discoverability.
    pub visibility: Visibility,
    /// Whether tickets cost money.
    pub is_paid: bool,
    /// Price per unit; ignored for free events.
    pub unit_price: Decimal,
    /// Total inventory.
    pub quantity: u32,
}

/// Creates and looks up [`EventListing`]s.
#[derive(Debug, Clone)]
pub struct ListingService {
    store: Arc<dyn TicketStore>,
    event_bus: EventBus,
}

impl ListingService {
    /// Creates a new `ListingService`.
    #[must_use]
    pub fn new(store: Arc<dyn TicketStore>, event_bus: EventBus) -> Self {
        Self { store, event_bus }
    }

    /// Validates and stores a new listing with a fresh share token.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for invalid input and
    /// [`GatewayError::PersistenceError`] if the store fails.
    pub async fn create_listing(&self, new: NewListing) -> Result<EventListing, GatewayError> {
        validate(&new)?;

        let now = Utc::now();
        let listing = EventListing {
            id: EventId::new(),
            name: new.name.trim().to_string(),
            description: new.description,
            schedule: new.schedule,
            location: new.location,
            visibility: new.visibility,
            is_paid: new.is_paid,
            unit_price: if new.is_paid {
                new.unit_price
            } else {
                Decimal::ZERO
            },
            quantity: new.quantity,
            quantity_sold: 0,
            share_token: share_token(),
            created_at: now,
            updated_at: now,
        };

        self.store.create_listing(listing.clone()).await?;
        tracing::info!(event_id = %listing.id, quantity = listing.quantity, "listing created");

        let _ = self.event_bus.publish(TicketingEvent::ListingCreated {
            event_id: listing.id,
            name: listing.name.clone(),
            quantity: listing.quantity,
            timestamp: now,
        });

        Ok(listing)
    }

    /// Loads a listing by id.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EventNotFound`] if it does not exist.
    pub async fn get_listing(&self, id: EventId) -> Result<EventListing, GatewayError> {
        self.store
            .get_listing(id)
            .await?
            .ok_or(GatewayError::EventNotFound(*id.as_uuid()))
    }

    /// Resolves a share link token.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ShareLinkNotFound`] if no listing carries it.
    pub async fn get_by_share_token(&self, token: &str) -> Result<EventListing, GatewayError> {
        self.store
            .find_listing_by_share_token(token)
            .await?
            .ok_or(GatewayError::ShareLinkNotFound)
    }
}

fn validate(new: &NewListing) -> Result<(), GatewayError> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(GatewayError::InvalidRequest("name is required".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(GatewayError::InvalidRequest(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    if new.quantity == 0 {
        return Err(GatewayError::InvalidRequest(
            "quantity must be at least 1".to_string(),
        ));
    }
    if i32::try_from(new.quantity).is_err() {
        return Err(GatewayError::InvalidRequest("quantity is too large".to_string()));
    }
    if let (Some(start), Some(end)) = (new.schedule.start_time, new.schedule.end_time)
        && end <= start
    {
        return Err(GatewayError::InvalidRequest(
            "end_time must be after start_time".to_string(),
        ));
    }
    if !new.is_paid {
        return Ok(());
    }
    if new.unit_price <= Decimal::ZERO {
        return Err(GatewayError::InvalidRequest(
            "paid events need a positive unit_price".to_string(),
        ));
    }
    if new.unit_price.normalize().scale() > MAX_PRICE_SCALE {
        return Err(GatewayError::InvalidRequest(format!(
            "unit_price must have at most {MAX_PRICE_SCALE} decimal places"
        )));
    }
    if new.unit_price > MAX_UNIT_PRICE {
        return Err(GatewayError::InvalidRequest(format!(
            "unit_price must be at most {MAX_UNIT_PRICE}"
        )));
    }
    Ok(())
}

fn share_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SHARE_TOKEN_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;
    use crate::persistence::MemoryStore;

    fn new_listing() -> NewListing {
        let Some(date) = NaiveDate::from_ymd_opt(2026, 12, 31) else {
            panic!("bad date");
        };
        NewListing {
            name: "  Rooftop NYE  ".to_string(),
            description: "Invite only".to_string(),
            schedule: Schedule {
                date,
                start_time: NaiveTime::from_hms_opt(21, 0, 0),
                end_time: NaiveTime::from_hms_opt(23, 59, 0),
            },
            location: Location::default(),
            visibility: Visibility::Private,
            is_paid: true,
            unit_price: Decimal::new(4500, 2),
            quantity: 40,
        }
    }

    fn service() -> ListingService {
        ListingService::new(Arc::new(MemoryStore::new()), EventBus::new(16))
    }

    #[tokio::test]
    async fn create_then_resolve_by_id_and_share_token() {
        let service = service();
        let Ok(created) = service.create_listing(new_listing()).await else {
            panic!("create failed");
        };
        assert_eq!(created.name, "Rooftop NYE");
        assert_eq!(created.share_token.len(), SHARE_TOKEN_LEN);
        assert_eq!(created.tickets_remaining(), 40);

        let by_id = service.get_listing(created.id).await.ok();
        assert_eq!(by_id.map(|l| l.id), Some(created.id));
        let by_token = service.get_by_share_token(&created.share_token).await.ok();
        assert_eq!(by_token.map(|l| l.id), Some(created.id));
    }

    #[tokio::test]
    async fn free_events_store_zero_price() {
        let service = service();
        let mut input = new_listing();
        input.is_paid = false;
        let Ok(created) = service.create_listing(input).await else {
            panic!("create failed");
        };
        assert_eq!(created.unit_price, Decimal::ZERO);
    }

    #[tokio::test]
    async fn invalid_listings_are_rejected() {
        let service = service();

        let mut blank = new_listing();
        blank.name = "   ".to_string();
        let mut empty = new_listing();
        empty.quantity = 0;
        let mut backwards = new_listing();
        backwards.schedule.end_time = NaiveTime::from_hms_opt(20, 0, 0);
        let mut unpriced = new_listing();
        unpriced.unit_price = Decimal::ZERO;
        let mut sub_cent = new_listing();
        sub_cent.unit_price = Decimal::new(199_999, 4);
        let mut overpriced = new_listing();
        overpriced.unit_price = Decimal::new(10_000_000_000, 0);

        for input in [blank, empty, backwards, unpriced, sub_cent, overpriced] {
            assert!(matches!(
                service.create_listing(input).await,
                Err(GatewayError::InvalidRequest(_))
            ));
        }
    }

    #[tokio::test]
    async fn price_limits_are_inclusive() {
        let service = service();
        let mut top = new_listing();
        top.unit_price = MAX_UNIT_PRICE;
        assert!(service.create_listing(top).await.is_ok());

        let mut trailing_zeros = new_listing();
        trailing_zeros.unit_price = Decimal::new(199_900, 4);
        let Ok(created) = service.create_listing(trailing_zeros).await else {
            panic!("19.9900 should be accepted");
        };
        assert_eq!(created.unit_price, Decimal::new(1999, 2));
    }

    #[tokio::test]
    async fn unknown_lookups_are_not_found() {
        let service = service();
        assert!(matches!(
            service.get_listing(EventId::new()).await,
            Err(GatewayError::EventNotFound(_))
        ));
        assert!(matches!(
            service.get_by_share_token("missing").await,
            Err(GatewayError::ShareLinkNotFound)
        ));
    }
}
