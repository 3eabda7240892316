//! Per-connection subscription manager.
//!
//! Tracks which listings a WebSocket client follows and filters the
//! broadcast stream server-side.

use std::collections::HashSet;

use crate::domain::EventId;

/// Wildcard token accepted in `event_ids`.
pub const WILDCARD: &str = "*";

/// Listing ids parsed from a command, plus whether `"*"` was present.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedIds {
    /// Valid listing ids.
    pub ids: Vec<EventId>,
    /// `true` if the wildcard was present.
    pub wildcard: bool,
    /// Entries that were neither a UUID nor the wildcard.
    pub rejected: Vec<String>,
}

/// Splits raw `event_ids` into listing ids, wildcard, and rejects.
#[must_use]
pub fn parse_ids(raw: &[String]) -> ParsedIds {
    let mut parsed = ParsedIds::default();
    for s in raw {
        let s = s.trim();
        if s == WILDCARD {
            parsed.wildcard = true;
        } else if let Ok(uuid) = s.parse::<uuid::Uuid>() {
            parsed.ids.push(EventId::from_uuid(uuid));
        } else {
            parsed.rejected.push(s.to_string());
        }
    }
    parsed
}

/// Subscriptions of a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Followed listings. Ignored while `subscribe_all` is set.
    event_ids: HashSet<EventId>,
    /// Wildcard subscription.
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Follows the listings; `wildcard` enables the catch-all.
    pub fn subscribe(&mut self, ids: &[EventId], wildcard: bool) {
        self.subscribe_all |= wildcard;
        self.event_ids.extend(ids.iter().copied());
    }

    /// Unfollows the listings; `wildcard` disables the catch-all.
    pub fn unsubscribe(&mut self, ids: &[EventId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
        }
        for id in ids {
            self.event_ids.remove(id);
        }
    }

    /// Returns `true` if events of `event_id` should be forwarded.
    #[must_use]
    pub fn matches(&self, event_id: EventId) -> bool {
        self.subscribe_all || self.event_ids.contains(&event_id)
    }

    /// Number of explicitly followed listings.
    #[must_use]
    pub fn count(&self) -> usize {
        self.event_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}
