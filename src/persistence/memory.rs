//! In-memory store with per-event fine-grained locking.
//!
//! Listings live in a `RwLock<HashMap<...>>` where each entry sits behind
//! its own [`tokio::sync::Mutex`]. A purchase holds only its event's mutex
//! for the whole check-increment-insert sequence, so purchases for the same
//! event are serialized while purchases for different events run
//! concurrently.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};

use super::{CommitOutcome, InboxPage, InboxStore, TicketStore};
use crate::domain::{
    EventId, EventListing, InboxItem, InboxItemId, InboxKind, Ticket, TicketCode, TicketId,
};
use crate::error::GatewayError;

/// Per-event state guarded by one mutex.
#[derive(Debug)]
struct ListingSlot {
    listing: EventListing,
    ticket_ids: Vec<TicketId>,
    idempotency: HashMap<String, TicketId>,
}

/// Process-local implementation of [`TicketStore`] and [`InboxStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    listings: RwLock<HashMap<EventId, Arc<Mutex<ListingSlot>>>>,
    share_tokens: RwLock<HashMap<String, EventId>>,
    tickets: RwLock<HashMap<TicketId, Ticket>>,
    ticket_codes: Mutex<HashSet<TicketCode>>,
    inbox: RwLock<HashMap<InboxItemId, InboxItem>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, id: EventId) -> Option<Arc<Mutex<ListingSlot>>> {
        self.listings.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create_listing(&self, listing: EventListing) -> Result<(), GatewayError> {
        let mut map = self.listings.write().await;
        let mut tokens = self.share_tokens.write().await;
        if map.contains_key(&listing.id) {
            return Err(GatewayError::InvalidRequest(format!(
                "event {} already exists",
                listing.id
            )));
        }
        if tokens.contains_key(&listing.share_token) {
            return Err(GatewayError::InvalidRequest(
                "share token already in use".to_string(),
            ));
        }
        tokens.insert(listing.share_token.clone(), listing.id);
        map.insert(
            listing.id,
            Arc::new(Mutex::new(ListingSlot {
                listing,
                ticket_ids: Vec::new(),
                idempotency: HashMap::new(),
            })),
        );
        Ok(())
    }

    async fn get_listing(&self, id: EventId) -> Result<Option<EventListing>, GatewayError> {
        let Some(slot) = self.slot(id).await else {
            return Ok(None);
        };
        let slot = slot.lock().await;
        Ok(Some(slot.listing.clone()))
    }

    async fn find_listing_by_share_token(
        &self,
        token: &str,
    ) -> Result<Option<EventListing>, GatewayError> {
        let id = self.share_tokens.read().await.get(token).copied();
        match id {
            Some(id) => self.get_listing(id).await,
            None => Ok(None),
        }
    }

    async fn commit_purchase(&self, ticket: Ticket) -> Result<CommitOutcome, GatewayError> {
        let slot_lock = self
            .slot(ticket.event_id)
            .await
            .ok_or(GatewayError::EventNotFound(*ticket.event_id.as_uuid()))?;
        let mut slot = slot_lock.lock().await;

        if let Some(key) = ticket.idempotency_key.as_deref()
            && let Some(existing_id) = slot.idempotency.get(key).copied()
        {
            let existing = self
                .tickets
                .read()
                .await
                .get(&existing_id)
                .cloned()
                .ok_or_else(|| {
                    GatewayError::Internal(format!("idempotency entry without ticket {existing_id}"))
                })?;
            return Ok(CommitOutcome::Replayed {
                ticket: existing,
                tickets_remaining: slot.listing.tickets_remaining(),
            });
        }

        if !slot.listing.can_fulfil(ticket.quantity) {
            return Err(GatewayError::InsufficientTickets {
                available: slot.listing.tickets_remaining(),
            });
        }

        // Every guard is taken before the first write: a commit dropped while
        // waiting leaves the store untouched.
        let mut codes = self.ticket_codes.lock().await;
        let mut tickets = self.tickets.write().await;
        if codes.contains(&ticket.ticket_code) {
            return Ok(CommitOutcome::CodeCollision);
        }

        codes.insert(ticket.ticket_code.clone());
        slot.listing.quantity_sold = slot.listing.quantity_sold.saturating_add(ticket.quantity);
        slot.listing.updated_at = Utc::now();
        slot.ticket_ids.push(ticket.id);
        if let Some(key) = ticket.idempotency_key.clone() {
            slot.idempotency.insert(key, ticket.id);
        }
        tickets.insert(ticket.id, ticket.clone());

        Ok(CommitOutcome::Issued {
            ticket,
            tickets_remaining: slot.listing.tickets_remaining(),
        })
    }

    async fn get_ticket(&self, id: TicketId) -> Result<Option<Ticket>, GatewayError> {
        Ok(self.tickets.read().await.get(&id).cloned())
    }

    async fn list_tickets(&self, event_id: EventId) -> Result<Vec<Ticket>, GatewayError> {
        let Some(slot) = self.slot(event_id).await else {
            return Ok(Vec::new());
        };
        let ids = slot.lock().await.ticket_ids.clone();
        let tickets = self.tickets.read().await;
        Ok(ids.iter().filter_map(|id| tickets.get(id).cloned()).collect())
    }
}

#[async_trait]
impl InboxStore for MemoryStore {
    async fn insert_item(&self, item: InboxItem) -> Result<(), GatewayError> {
        self.inbox.write().await.insert(item.id, item);
        Ok(())
    }

    async fn list_items(
        &self,
        kind: InboxKind,
        status: Option<&str>,
        offset: u32,
        limit: u32,
    ) -> Result<InboxPage, GatewayError> {
        let inbox = self.inbox.read().await;
        let mut matching: Vec<&InboxItem> = inbox
            .values()
            .filter(|item| item.kind == kind)
            .filter(|item| status.is_none_or(|s| item.status == s))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(InboxPage { items, total })
    }

    async fn update_status(
        &self,
        kind: InboxKind,
        id: InboxItemId,
        status: &str,
    ) -> Result<Option<InboxItem>, GatewayError> {
        let mut inbox = self.inbox.write().await;
        let Some(item) = inbox.get_mut(&id).filter(|item| item.kind == kind) else {
            return Ok(None);
        };
        item.status = status.to_string();
        item.updated_at = Utc::now();
        Ok(Some(item.clone()))
    }
}
