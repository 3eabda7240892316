//! Event listing: a ticketed occasion with a fixed inventory.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::EventId;

/// Whether a listing appears in public search or only through its share link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Listed publicly.
    Public,
    /// Reachable only through the share link.
    Private,
}

impl Visibility {
    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }

    /// Parses the storage representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "public" => Some(Self::Public),
            "private" => Some(Self::Private),
            _ => None,
        }
    }
}

/// Date and optional start/end time of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Calendar date.
    pub date: NaiveDate,
    /// Doors/start time.
    pub start_time: Option<NaiveTime>,
    /// End time.
    pub end_time: Option<NaiveTime>,
}

/// Postal location of an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// State or region.
    pub state: String,
    /// Country.
    pub country: String,
}

/// A ticketed event and its inventory counters.
///
/// `quantity_sold` is only ever changed by the store's atomic purchase
/// commit; it never exceeds `quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventListing {
    /// Listing identifier.
    pub id: EventId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// When the event takes place.
    pub schedule: Schedule,
    /// Where the event takes place.
    pub location: Location,
    /// Public or private.
    pub visibility: Visibility,
    /// Whether tickets cost money.
    pub is_paid: bool,
    /// Price of one ticket; zero for free events.
    pub unit_price: Decimal,
    /// Total inventory.
    pub quantity: u32,
    /// Units sold so far.
    pub quantity_sold: u32,
    /// Token used in the share link.
    pub share_token: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last inventory or metadata change.
    pub updated_at: DateTime<Utc>,
}

impl EventListing {
    /// Units still available for purchase.
    #[must_use]
    pub const fn tickets_remaining(&self) -> u32 {
        self.quantity.saturating_sub(self.quantity_sold)
    }

    /// Returns `true` if `requested` more units fit in the inventory.
    #[must_use]
    pub fn can_fulfil(&self, requested: u32) -> bool {
        self.quantity_sold
            .checked_add(requested)
            .is_some_and(|total| total <= self.quantity)
    }

    /// Returns `true` once every unit has been sold.
    #[must_use]
    pub const fn is_sold_out(&self) -> bool {
        self.quantity_sold >= self.quantity
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn listing(quantity: u32, quantity_sold: u32) -> EventListing {
        let now = Utc::now();
        EventListing {
            id: EventId::new(),
            name: "Rooftop Session".to_string(),
            description: "Acoustic night".to_string(),
            schedule: Schedule {
                date: now.date_naive(),
                start_time: NaiveTime::from_hms_opt(19, 0, 0),
                end_time: NaiveTime::from_hms_opt(23, 0, 0),
            },
            location: Location {
                address: "1 Main St".to_string(),
                city: "Lisbon".to_string(),
                state: "Lisboa".to_string(),
                country: "PT".to_string(),
            },
            visibility: Visibility::Private,
            is_paid: true,
            unit_price: Decimal::new(2500, 2),
            quantity,
            quantity_sold,
            share_token: "share-token".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn remaining_counts_unsold_units() {
        assert_eq!(listing(5, 3).tickets_remaining(), 2);
        assert_eq!(listing(5, 5).tickets_remaining(), 0);
    }

    #[test]
    fn can_fulfil_respects_inventory() {
        let l = listing(5, 3);
        assert!(l.can_fulfil(2));
        assert!(!l.can_fulfil(3));
        assert!(!l.can_fulfil(u32::MAX));
    }

    #[test]
    fn sold_out_when_counter_reaches_quantity() {
        assert!(listing(5, 5).is_sold_out());
        assert!(!listing(5, 4).is_sold_out());
    }

    #[test]
    fn visibility_round_trip() {
        assert_eq!(Visibility::parse("private"), Some(Visibility::Private));
        assert_eq!(Visibility::parse(Visibility::Public.as_str()), Some(Visibility::Public));
        assert_eq!(Visibility::parse("hidden"), None);
    }
}
