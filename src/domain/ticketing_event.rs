//! Domain events reflecting inventory changes.
//!
//! Every committed purchase emits a [`TicketingEvent`] through the
//! [`super::EventBus`]. Events are forwarded to WebSocket subscribers of
//! the affected listing.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{EventId, TicketId};

/// Domain event emitted after a state change has been committed.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum TicketingEvent {
    /// A new listing was created.
    ListingCreated {
        /// Listing identifier.
        event_id: EventId,
        /// Listing name.
        name: String,
        /// Total inventory.
        quantity: u32,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Tickets were issued against a listing.
    TicketsPurchased {
        /// Listing identifier.
        event_id: EventId,
        /// Issued ticket.
        ticket_id: TicketId,
        /// Units purchased.
        quantity: u32,
        /// Units still available after the purchase.
        tickets_remaining: u32,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The last unit of a listing was sold.
    EventSoldOut {
        /// Listing identifier.
        event_id: EventId,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl TicketingEvent {
    /// Returns the listing this event concerns.
    #[must_use]
    pub fn event_id(&self) -> EventId {
        match self {
            Self::ListingCreated { event_id, .. }
            | Self::TicketsPurchased { event_id, .. }
            | Self::EventSoldOut { event_id, .. } => *event_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::ListingCreated { .. } => "listing_created",
            Self::TicketsPurchased { .. } => "tickets_purchased",
            Self::EventSoldOut { .. } => "event_sold_out",
        }
    }
}
