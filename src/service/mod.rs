//! Service layer: business logic orchestration.
//!
//! [`PurchaseService`] runs the reservation sequence, [`ListingService`]
//! manages private events and share links, and [`InboxService`] handles the
//! contact and partner forms. Services emit events through the
//! [`super::domain::EventBus`].

pub mod inbox_service;
pub mod listing_service;
pub mod purchase_service;

pub use inbox_service::{InboxService, Submission};
pub use listing_service::{ListingService, NewListing};
pub use purchase_service::{PurchaseReceipt, PurchaseRequest, PurchaseService, PurchaseSettings};
