//! WebSocket message types: envelope and commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Builds a server message stamped with the current time.
    #[must_use]
    pub fn new(id: String, msg_type: WsMessageType, payload: serde_json::Value) -> Self {
        Self {
            id,
            msg_type,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Builds an error reply.
    #[must_use]
    pub fn error(id: String, code: u16, message: &str) -> Self {
        Self::new(
            id,
            WsMessageType::Error,
            serde_json::json!({ "code": code, "message": message }),
        )
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands that a client can send in the envelope payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Receive events for specific listings. `["*"]` for all.
    Subscribe {
        /// Listing UUIDs or `"*"`.
        event_ids: Vec<String>,
    },
    /// Stop receiving events for specific listings. `"*"` drops the wildcard.
    Unsubscribe {
        /// Listing UUIDs or `"*"`.
        event_ids: Vec<String>,
    },
    /// Current remaining inventory of one listing.
    GetAvailability {
        /// Listing UUID.
        event_id: String,
    },
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_command_decodes_from_envelope() {
        let text = r#"{
            "id": "req-1",
            "type": "command",
            "timestamp": "2026-01-01T00:00:00Z",
            "payload": {"command": "subscribe", "event_ids": ["*"]}
        }"#;
        let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
            panic!("envelope decode failed");
        };
        assert_eq!(msg.msg_type, WsMessageType::Command);
        let Ok(cmd) = serde_json::from_value::<WsCommand>(msg.payload) else {
            panic!("command decode failed");
        };
        assert_eq!(
            cmd,
            WsCommand::Subscribe {
                event_ids: vec!["*".to_string()]
            }
        );
    }
}
