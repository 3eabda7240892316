//! Human-facing ticket codes and purchase references.
//!
//! A [`TicketCode`] is drawn from its own random source and never derived
//! from the ticket's primary key. Uniqueness is enforced by the store; the
//! purchase service regenerates on collision.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Crockford base32 alphabet: no `I`, `L`, `O` or `U`.
const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Number of symbols in a ticket code (50 bits of entropy).
pub const TICKET_CODE_LEN: usize = 10;

/// Short, upper-case, unambiguous token printed on a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketCode(String);

impl TicketCode {
    /// Generates a fresh random code.
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Generates a code from the supplied RNG.
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..TICKET_CODE_LEN)
            .map(|_| {
                let idx = rng.gen_range(0..ALPHABET.len());
                ALPHABET.get(idx).copied().map_or('0', char::from)
            })
            .collect();
        Self(code)
    }

    /// Wraps a code loaded from storage.
    #[must_use]
    pub fn from_stored(code: String) -> Self {
        Self(code)
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds a purchase reference of the form `{prefix}-{unix_millis}-{nnnnnn}`.
#[must_use]
pub fn generate_reference(prefix: &str, now: DateTime<Utc>) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{prefix}-{}-{suffix:06}", now.timestamp_millis())
}
