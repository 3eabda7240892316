//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The endpoint at `/ws` streams live availability changes
//! (`tickets_purchased`, `event_sold_out`, `listing_created`) for the
//! listings a client subscribes to.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
