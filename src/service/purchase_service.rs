//! Purchase service: prices, identifies and commits ticket purchases.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::ticket_code::generate_reference;
use crate::domain::{
    BuyerInfo, EventBus, EventId, FeeRate, IdempotencyKey, Ticket, TicketCode, TicketId,
    TicketStatus, TicketingEvent,
};
use crate::error::GatewayError;
use crate::persistence::{CommitOutcome, TicketStore};

/// Attempts at drawing an unused ticket code before giving up.
const MAX_CODE_ATTEMPTS: u32 = 5;

/// Settings that shape every purchase.
#[derive(Debug, Clone)]
pub struct PurchaseSettings {
    /// Platform fee deducted in the ledger.
    pub fee_rate: FeeRate,
    /// Prefix of generated references.
    pub reference_prefix: String,
    /// Origin of the confirmation page; empty for a relative redirect.
    pub public_base_url: String,
}

impl Default for PurchaseSettings {
    fn default() -> Self {
        Self {
            fee_rate: FeeRate::default(),
            reference_prefix: "TKT".to_string(),
            public_base_url: String::new(),
        }
    }
}

/// A validated purchase request.
#[derive(Debug, Clone)]
pub struct PurchaseRequest {
    /// Listing to buy from.
    pub event_id: EventId,
    /// Units wanted; at least one.
    pub quantity: u32,
    /// Buyer contact details.
    pub buyer: BuyerInfo,
    /// Reference from the checkout widget, if any.
    pub payment_reference: Option<String>,
    /// Transaction id from the checkout widget, if any.
    pub transaction_id: Option<String>,
    /// Caller-supplied retry token.
    pub idempotency_token: Option<String>,
}

/// What the buyer gets back from a successful purchase.
#[derive(Debug, Clone)]
pub struct PurchaseReceipt {
    /// The issued (or replayed) ticket.
    pub ticket: Ticket,
    /// Units left on the listing.
    pub tickets_remaining: u32,
    /// Confirmation page URL.
    pub redirect_url: String,
    /// `true` when an earlier request with the same key issued the ticket.
    pub replayed: bool,
}

/// Orchestrates the reservation sequence.
///
/// Validation, pricing and identifier generation happen here; the
/// inventory check, counter increment and ticket insert are delegated to
/// [`TicketStore::commit_purchase`] as one atomic unit.
#[derive(Debug, Clone)]
pub struct PurchaseService {
    store: Arc<dyn TicketStore>,
    event_bus: EventBus,
    settings: PurchaseSettings,
}

impl PurchaseService {
    /// Creates a new `PurchaseService`.
    #[must_use]
    pub fn new(store: Arc<dyn TicketStore>, event_bus: EventBus, settings: PurchaseSettings) -> Self {
        Self {
            store,
            event_bus,
            settings,
        }
    }

    /// Returns the configured fee rate.
    #[must_use]
    pub fn fee_rate(&self) -> FeeRate {
        self.settings.fee_rate
    }

    /// Purchases `request.quantity` tickets.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for bad input,
    /// [`GatewayError::EventNotFound`] for an unknown listing,
    /// [`GatewayError::InsufficientTickets`] when inventory is short, and
    /// [`GatewayError::PersistenceError`] if the store fails.
    pub async fn purchase(&self, request: PurchaseRequest) -> Result<PurchaseReceipt, GatewayError> {
        if request.quantity == 0 {
            return Err(GatewayError::InvalidRequest(
                "quantity must be at least 1".to_string(),
            ));
        }

        let listing = self
            .store
            .get_listing(request.event_id)
            .await?
            .ok_or(GatewayError::EventNotFound(*request.event_id.as_uuid()))?;

        let idempotency_key = request
            .idempotency_token
            .as_deref()
            .map(|token| IdempotencyKey::scoped(listing.id, &request.buyer.email, token))
            .transpose()?;

        let pricing =
            self.settings
                .fee_rate
                .breakdown(listing.unit_price, request.quantity, listing.is_paid)?;

        let now = Utc::now();
        let payment_reference = request
            .payment_reference
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map_or_else(
                || generate_reference(&self.settings.reference_prefix, now),
                str::to_string,
            );
        let transaction_id = request
            .transaction_id
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let ticket = Ticket {
                id: TicketId::new(),
                event_id: listing.id,
                buyer: request.buyer.clone(),
                quantity: request.quantity,
                price_paid: pricing.price_paid,
                total_price: pricing.total_price,
                payment_reference: payment_reference.clone(),
                transaction_id: transaction_id.clone(),
                status: TicketStatus::Active,
                ticket_code: TicketCode::generate(),
                idempotency_key: idempotency_key.as_ref().map(|k| k.as_str().to_string()),
                created_at: now,
            };

            match self.store.commit_purchase(ticket).await? {
                CommitOutcome::Issued {
                    ticket,
                    tickets_remaining,
                } => {
                    tracing::info!(
                        event_id = %ticket.event_id,
                        ticket_id = %ticket.id,
                        quantity = ticket.quantity,
                        tickets_remaining,
                        "tickets issued"
                    );
                    self.publish_purchase(&ticket, tickets_remaining);
                    return Ok(self.receipt(ticket, tickets_remaining, false));
                }
                CommitOutcome::Replayed {
                    ticket,
                    tickets_remaining,
                } => {
                    tracing::info!(
                        event_id = %ticket.event_id,
                        ticket_id = %ticket.id,
                        "idempotent replay, returning original ticket"
                    );
                    return Ok(self.receipt(ticket, tickets_remaining, true));
                }
                CommitOutcome::CodeCollision => {
                    tracing::warn!(attempt, event_id = %listing.id, "ticket code collision");
                }
            }
        }

        Err(GatewayError::Internal(format!(
            "no unique ticket code after {MAX_CODE_ATTEMPTS} attempts"
        )))
    }

    /// Loads a ticket by id.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::TicketNotFound`] if no such ticket exists.
    pub async fn get_ticket(&self, id: TicketId) -> Result<Ticket, GatewayError> {
        self.store
            .get_ticket(id)
            .await?
            .ok_or(GatewayError::TicketNotFound(*id.as_uuid()))
    }

    /// Lists every ticket of a listing, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EventNotFound`] if the listing does not exist.
    pub async fn list_tickets(&self, event_id: EventId) -> Result<Vec<Ticket>, GatewayError> {
        if self.store.get_listing(event_id).await?.is_none() {
            return Err(GatewayError::EventNotFound(*event_id.as_uuid()));
        }
        self.store.list_tickets(event_id).await
    }

    fn publish_purchase(&self, ticket: &Ticket, tickets_remaining: u32) {
        let now = Utc::now();
        let _ = self.event_bus.publish(TicketingEvent::TicketsPurchased {
            event_id: ticket.event_id,
            ticket_id: ticket.id,
            quantity: ticket.quantity,
            tickets_remaining,
            timestamp: now,
        });
        if tickets_remaining == 0 {
            tracing::info!(event_id = %ticket.event_id, "event sold out");
            let _ = self.event_bus.publish(TicketingEvent::EventSoldOut {
                event_id: ticket.event_id,
                timestamp: now,
            });
        }
    }

    fn receipt(&self, ticket: Ticket, tickets_remaining: u32, replayed: bool) -> PurchaseReceipt {
        let redirect_url = format!(
            "{}/ticket-confirmation?ticketId={}&code={}",
            self.settings.public_base_url, ticket.id, ticket.ticket_code
        );
        PurchaseReceipt {
            ticket,
            tickets_remaining,
            redirect_url,
            replayed,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::EventListing;
    use crate::domain::event_listing::tests::listing;
    use crate::persistence::MemoryStore;

    fn buyer() -> BuyerInfo {
        BuyerInfo {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            phone: "+351900000000".to_string(),
        }
    }

    fn request(event_id: EventId, quantity: u32) -> PurchaseRequest {
        PurchaseRequest {
            event_id,
            quantity,
            buyer: buyer(),
            payment_reference: None,
            transaction_id: None,
            idempotency_token: None,
        }
    }

    async fn service_with(l: EventListing) -> (PurchaseService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let Ok(()) = store.create_listing(l).await else {
            panic!("create failed");
        };
        let dyn_store: Arc<dyn TicketStore> = Arc::clone(&store) as Arc<dyn TicketStore>;
        let service = PurchaseService::new(dyn_store, EventBus::new(64), PurchaseSettings::default());
        (service, store)
    }

    fn dec(s: &str) -> Decimal {
        let Ok(d) = Decimal::from_str(s) else {
            panic!("bad decimal {s}");
        };
        d
    }

    #[tokio::test]
    async fn last_units_sell_then_further_requests_fail() {
        let l = listing(5, 3);
        let id = l.id;
        let (service, store) = service_with(l).await;

        let Ok(receipt) = service.purchase(request(id, 2)).await else {
            panic!("purchase failed");
        };
        assert_eq!(receipt.tickets_remaining, 0);
        assert!(!receipt.replayed);

        let second = service.purchase(request(id, 1)).await;
        let Err(err) = second else {
            panic!("oversold");
        };
        assert_eq!(err.public_message(), "Only 0 tickets available");

        let Ok(Some(after)) = store.get_listing(id).await else {
            panic!("listing missing");
        };
        assert_eq!(after.quantity_sold, 5);
        assert_eq!(store.list_tickets(id).await.map(|t| t.len()).ok(), Some(1));
    }

    #[tokio::test]
    async fn ledger_stores_net_and_buyer_pays_gross() {
        let mut l = listing(10, 0);
        l.unit_price = dec("100.00");
        let id = l.id;
        let (service, _) = service_with(l).await;

        let Ok(receipt) = service.purchase(request(id, 3)).await else {
            panic!("purchase failed");
        };
        assert_eq!(receipt.ticket.price_paid, dec("90"));
        assert_eq!(receipt.ticket.total_price, dec("300"));
    }

    #[tokio::test]
    async fn free_event_costs_nothing() {
        let mut l = listing(10, 0);
        l.is_paid = false;
        let id = l.id;
        let (service, _) = service_with(l).await;

        let Ok(receipt) = service.purchase(request(id, 2)).await else {
            panic!("purchase failed");
        };
        assert_eq!(receipt.ticket.total_price, Decimal::ZERO);
        assert_eq!(receipt.ticket.price_paid, Decimal::ZERO);
    }

    #[tokio::test]
    async fn retry_with_same_token_returns_same_ticket() {
        let l = listing(10, 0);
        let id = l.id;
        let (service, store) = service_with(l).await;

        let mut req = request(id, 2);
        req.idempotency_token = Some("checkout-attempt-000042".to_string());

        let Ok(first) = service.purchase(req.clone()).await else {
            panic!("first purchase failed");
        };
        let Ok(second) = service.purchase(req).await else {
            panic!("retry failed");
        };
        assert_eq!(first.ticket.id, second.ticket.id);
        assert_eq!(first.ticket.ticket_code, second.ticket.ticket_code);
        assert!(second.replayed);

        let Ok(Some(after)) = store.get_listing(id).await else {
            panic!("listing missing");
        };
        assert_eq!(after.quantity_sold, 2);
    }

    #[tokio::test]
    async fn generated_reference_and_redirect() {
        let l = listing(10, 0);
        let id = l.id;
        let (service, _) = service_with(l).await;

        let Ok(receipt) = service.purchase(request(id, 1)).await else {
            panic!("purchase failed");
        };
        assert!(receipt.ticket.payment_reference.starts_with("TKT-"));
        assert_eq!(
            receipt.redirect_url,
            format!(
                "/ticket-confirmation?ticketId={}&code={}",
                receipt.ticket.id, receipt.ticket.ticket_code
            )
        );
    }

    #[tokio::test]
    async fn caller_payment_reference_is_kept() {
        let l = listing(10, 0);
        let id = l.id;
        let (service, _) = service_with(l).await;

        let mut req = request(id, 1);
        req.payment_reference = Some("PAY-778899".to_string());
        req.transaction_id = Some("txn_123".to_string());
        let Ok(receipt) = service.purchase(req).await else {
            panic!("purchase failed");
        };
        assert_eq!(receipt.ticket.payment_reference, "PAY-778899");
        assert_eq!(receipt.ticket.transaction_id.as_deref(), Some("txn_123"));
    }

    #[tokio::test]
    async fn zero_quantity_and_unknown_event_are_rejected() {
        let l = listing(10, 0);
        let id = l.id;
        let (service, _) = service_with(l).await;

        assert!(matches!(
            service.purchase(request(id, 0)).await,
            Err(GatewayError::InvalidRequest(_))
        ));
        assert!(matches!(
            service.purchase(request(EventId::new(), 1)).await,
            Err(GatewayError::EventNotFound(_))
        ));
    }

    #[tokio::test]
    async fn sell_out_is_published() {
        let l = listing(1, 0);
        let id = l.id;
        let (service, _) = service_with(l).await;
        let mut rx = service.event_bus.subscribe();

        let Ok(_) = service.purchase(request(id, 1)).await else {
            panic!("purchase failed");
        };
        let Ok(first) = rx.recv().await else {
            panic!("no event");
        };
        let Ok(second) = rx.recv().await else {
            panic!("no sold-out event");
        };
        assert_eq!(first.event_type_str(), "tickets_purchased");
        assert_eq!(second.event_type_str(), "event_sold_out");
    }

    #[tokio::test]
    async fn concurrent_purchases_exhaust_inventory_exactly() {
        let l = listing(7, 0);
        let id = l.id;
        let (service, store) = service_with(l).await;
        let service = Arc::new(service);

        let mut handles = Vec::new();
        for _ in 0..20 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(
                async move { service.purchase(request(id, 1)).await },
            ));
        }
        let mut ok = 0;
        for handle in handles {
            match handle.await {
                Ok(Ok(_)) => ok += 1,
                Ok(Err(GatewayError::InsufficientTickets { .. })) => {}
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(ok, 7);
        let Ok(Some(after)) = store.get_listing(id).await else {
            panic!("listing missing");
        };
        assert_eq!(after.quantity_sold, 7);
    }
}
