//! Idempotency keys for purchase retries.
//!
//! A caller-supplied token is scoped to the event and the buyer's email so
//! the same token from two different buyers never collides, and a replayed
//! request from the same buyer returns the ticket it was first issued.

use std::fmt;

use super::EventId;
use crate::error::GatewayError;

/// Minimum accepted token length.
pub const MIN_TOKEN_LEN: usize = 16;
/// Maximum accepted token length.
pub const MAX_TOKEN_LEN: usize = 128;

/// Fully scoped idempotency key: `{event_id}:{email}:{token}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Scopes `token` to the given event and buyer email.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the token is shorter than
    /// [`MIN_TOKEN_LEN`], longer than [`MAX_TOKEN_LEN`], or contains
    /// characters outside visible ASCII.
    pub fn scoped(event_id: EventId, buyer_email: &str, token: &str) -> Result<Self, GatewayError> {
        let token = token.trim();
        if !(MIN_TOKEN_LEN..=MAX_TOKEN_LEN).contains(&token.len()) {
            return Err(GatewayError::InvalidRequest(format!(
                "idempotency key must be between {MIN_TOKEN_LEN} and {MAX_TOKEN_LEN} characters"
            )));
        }
        if !token.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(GatewayError::InvalidRequest(
                "idempotency key must be visible ASCII".to_string(),
            ));
        }
        Ok(Self(format!(
            "{event_id}:{}:{token}",
            buyer_email.trim().to_ascii_lowercase()
        )))
    }

    /// Returns the scoped key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    const TOKEN: &str = "7d9f2c1e-retry-0001";

    #[test]
    fn scopes_by_event_and_lowercased_email() {
        let event_id = EventId::new();
        let Ok(a) = IdempotencyKey::scoped(event_id, "Ana@Example.com", TOKEN) else {
            panic!("valid key rejected");
        };
        let Ok(b) = IdempotencyKey::scoped(event_id, "ana@example.com ", TOKEN) else {
            panic!("valid key rejected");
        };
        assert_eq!(a, b);
        assert_eq!(a.as_str(), format!("{event_id}:ana@example.com:{TOKEN}"));
    }

    #[test]
    fn different_buyers_get_different_keys() {
        let event_id = EventId::new();
        let a = IdempotencyKey::scoped(event_id, "a@example.com", TOKEN).ok();
        let b = IdempotencyKey::scoped(event_id, "b@example.com", TOKEN).ok();
        assert!(a.is_some());
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_bad_tokens() {
        let event_id = EventId::new();
        assert!(IdempotencyKey::scoped(event_id, "a@b.c", "short").is_err());
        assert!(IdempotencyKey::scoped(event_id, "a@b.c", &"x".repeat(129)).is_err());
        assert!(IdempotencyKey::scoped(event_id, "a@b.c", "has spaces inside it").is_err());
    }
}
