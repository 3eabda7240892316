//! WebSocket connection loop.
//!
//! Reads commands from one client and forwards the [`TicketingEvent`]s
//! of the listings it follows.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::{SubscriptionManager, parse_ids};
use crate::domain::{EventId, TicketingEvent};
use crate::service::ListingService;

/// Runs the read/write loop for a single WebSocket connection.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<TicketingEvent>,
    listings: Arc<ListingService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_text_message(&text, &mut subs, &listings).await;
                        if let Some(json) = reply
                            && ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(event) => {
                        if !subs.matches(event.event_id()) {
                            continue;
                        }
                        let payload = match serde_json::to_value(&event) {
                            Ok(payload) => payload,
                            Err(e) => {
                                tracing::warn!(error = %e, "failed to encode ws event");
                                continue;
                            }
                        };
                        let msg = WsMessage::new(
                            uuid::Uuid::new_v4().to_string(),
                            WsMessageType::Event,
                            payload,
                        );
                        let Ok(json) = serde_json::to_string(&msg) else {
                            continue;
                        };
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles one text frame and returns the JSON reply, if any.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    listings: &ListingService,
) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return serde_json::to_string(&WsMessage::error(String::new(), 400, "malformed JSON"))
            .ok();
    };
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return serde_json::to_string(&WsMessage::error(msg.id, 404, "unknown command")).ok();
    };

    let reply = match command {
        WsCommand::Subscribe { event_ids } => {
            let parsed = parse_ids(&event_ids);
            subs.subscribe(&parsed.ids, parsed.wildcard);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "subscribed": parsed.ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "rejected": parsed.rejected,
                    "count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::Unsubscribe { event_ids } => {
            let parsed = parse_ids(&event_ids);
            subs.unsubscribe(&parsed.ids, parsed.wildcard);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "unsubscribed": parsed.ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "remaining_count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::GetAvailability { event_id } => {
            let Ok(uuid) = event_id.trim().parse::<uuid::Uuid>() else {
                return serde_json::to_string(&WsMessage::error(msg.id, 400, "invalid event_id"))
                    .ok();
            };
            match listings.get_listing(EventId::from_uuid(uuid)).await {
                Ok(listing) => WsMessage::new(
                    msg.id,
                    WsMessageType::Response,
                    serde_json::json!({
                        "event_id": listing.id,
                        "tickets_remaining": listing.tickets_remaining(),
                        "sold_out": listing.is_sold_out(),
                    }),
                ),
                Err(e) => WsMessage::error(msg.id, e.status_code().as_u16(), &e.public_message()),
            }
        }
    };

    serde_json::to_string(&reply).ok()
}
