//! Capability secrets.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rng::DeterministicRng;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Number of characters in a generated secret (72 bits of entropy).
const SECRET_LEN: usize = 12 * 8 / 6;

/// A shared-secret capability token.
///
/// Domains present their secret on every call into the hub, and the hub
/// presents the same secret when calling the domain. Users carry their own.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wraps an existing token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Generates a fresh URL-safe token.
    pub fn generate(rng: &mut dyn DeterministicRng) -> Self {
        let last = u32::try_from(ALPHABET.len() - 1).unwrap_or(0);
        let token = (0..SECRET_LEN)
            .map(|_| char::from(ALPHABET[rng.next_u32_range(0, last) as usize % ALPHABET.len()]))
            .collect();
        Self(token)
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}
