//! Domain layer: identifiers, listings, tickets, pricing, and events.
//!
//! Everything here is storage-agnostic. Inventory is mutated only through
//! [`crate::persistence::TicketStore::commit_purchase`].

pub mod event_bus;
pub mod event_listing;
pub mod idempotency;
pub mod ids;
pub mod inbox;
pub mod pricing;
pub mod ticket;
pub mod ticket_code;
pub mod ticketing_event;

pub use event_bus::EventBus;
pub use event_listing::{EventListing, Location, Schedule, Visibility};
pub use idempotency::IdempotencyKey;
pub use ids::{EventId, InboxItemId, TicketId};
pub use inbox::{InboxItem, InboxKind};
pub use pricing::{FeeRate, PriceBreakdown};
pub use ticket::{BuyerInfo, Ticket, TicketStatus};
pub use ticket_code::TicketCode;
pub use ticketing_event::TicketingEvent;
