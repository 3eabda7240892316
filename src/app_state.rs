//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::domain::EventBus;
use crate::persistence::{InboxStore, TicketStore};
use crate::service::{InboxService, ListingService, PurchaseService, PurchaseSettings};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Ticket purchase flow.
    pub purchase_service: Arc<PurchaseService>,
    /// Listing creation and lookup.
    pub listing_service: Arc<ListingService>,
    /// Contact and partner inbox.
    pub inbox_service: Arc<InboxService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
    /// Bearer token for admin routes; `None` leaves them open.
    pub admin_token: Option<Arc<str>>,
    /// Name of the active storage backend, reported by `/health`.
    pub storage_backend: &'static str,
}

impl AppState {
    /// Wires the services over the given stores.
    #[must_use]
    pub fn new(
        config: &GatewayConfig,
        tickets: Arc<dyn TicketStore>,
        inbox: Arc<dyn InboxStore>,
    ) -> Self {
        let event_bus = EventBus::new(config.event_bus_capacity);
        let storage_backend = tickets.backend_name();

        let settings = PurchaseSettings {
            fee_rate: config.fee_rate,
            reference_prefix: config.reference_prefix.clone(),
            public_base_url: config.public_base_url.clone(),
        };

        Self {
            purchase_service: Arc::new(PurchaseService::new(
                Arc::clone(&tickets),
                event_bus.clone(),
                settings,
            )),
            listing_service: Arc::new(ListingService::new(tickets, event_bus.clone())),
            inbox_service: Arc::new(InboxService::new(inbox)),
            event_bus,
            admin_token: config.admin_api_token.as_deref().map(Arc::from),
            storage_backend,
        }
    }
}
