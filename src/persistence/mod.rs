//! Persistence layer: listings, tickets, and the admin inbox.
//!
//! [`TicketStore`] is the only place inventory is mutated. Its
//! [`TicketStore::commit_purchase`] performs the idempotency lookup, the
//! conditional `quantity_sold` increment and the ticket insert as one atomic
//! unit, serialized per event. Two implementations are provided:
//! [`MemoryStore`] for single-process deployments and tests, and
//! [`PostgresStore`] backed by `sqlx::PgPool`.

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;

use crate::domain::{EventId, EventListing, InboxItem, InboxItemId, InboxKind, Ticket, TicketId};
use crate::error::GatewayError;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Result of an atomic purchase commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The ticket was inserted and inventory reduced.
    Issued {
        /// The stored ticket.
        ticket: Ticket,
        /// Units left after this purchase.
        tickets_remaining: u32,
    },
    /// A ticket already exists under the same idempotency key; nothing changed.
    Replayed {
        /// The ticket issued by the original request.
        ticket: Ticket,
        /// Units currently left.
        tickets_remaining: u32,
    },
    /// The generated ticket code is already taken; nothing changed.
    CodeCollision,
}

/// Storage for listings and tickets.
#[async_trait]
pub trait TicketStore: Send + Sync + fmt::Debug {
    /// Short name of the backend, reported by the health endpoint.
    fn backend_name(&self) -> &'static str;

    /// Stores a new listing.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the id or share token is
    /// already taken, or [`GatewayError::PersistenceError`] on storage failure.
    async fn create_listing(&self, listing: EventListing) -> Result<(), GatewayError>;

    /// Loads a listing by id.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn get_listing(&self, id: EventId) -> Result<Option<EventListing>, GatewayError>;

    /// Loads a listing through its share token.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn find_listing_by_share_token(
        &self,
        token: &str,
    ) -> Result<Option<EventListing>, GatewayError>;

    /// Atomically records `ticket` and adds `ticket.quantity` to the owning
    /// listing's `quantity_sold`, or changes nothing.
    ///
    /// If `ticket.idempotency_key` matches an existing ticket, that ticket is
    /// returned as [`CommitOutcome::Replayed`] and inventory is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EventNotFound`] if the listing does not exist,
    /// [`GatewayError::InsufficientTickets`] if the inventory cannot cover
    /// the quantity, or [`GatewayError::PersistenceError`] on storage failure.
    async fn commit_purchase(&self, ticket: Ticket) -> Result<CommitOutcome, GatewayError>;

    /// Loads a ticket by id.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn get_ticket(&self, id: TicketId) -> Result<Option<Ticket>, GatewayError>;

    /// Lists the tickets of a listing, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn list_tickets(&self, event_id: EventId) -> Result<Vec<Ticket>, GatewayError>;
}

/// One page of inbox items plus the total match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxPage {
    /// Items on this page, newest first.
    pub items: Vec<InboxItem>,
    /// Number of items matching the filter across all pages.
    pub total: u64,
}

/// Storage for contact messages and partner requests.
#[async_trait]
pub trait InboxStore: Send + Sync + fmt::Debug {
    /// Stores a newly submitted item.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn insert_item(&self, item: InboxItem) -> Result<(), GatewayError>;

    /// Lists items of `kind`, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn list_items(
        &self,
        kind: InboxKind,
        status: Option<&str>,
        offset: u32,
        limit: u32,
    ) -> Result<InboxPage, GatewayError>;

    /// Sets the status of one item and returns the updated item, or `None`
    /// if no item of that kind has the id.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    async fn update_status(
        &self,
        kind: InboxKind,
        id: InboxItemId,
        status: &str,
    ) -> Result<Option<InboxItem>, GatewayError>;
}
