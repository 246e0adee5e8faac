//! Numeric identifiers shared by the hub and the domain servers.
//!
//! Identifiers are small integers on the wire so that players can type them
//! (`take 412`), and newtypes in code so they cannot be mixed up.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a token is not a numeric identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a numeric identifier: {0:?}")]
pub struct ParseIdError(String);

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Digits only: "+3" must not resolve to an item.
                if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(ParseIdError(s.to_owned()));
                }
                s.parse::<u32>()
                    .map(Self)
                    .map_err(|_| ParseIdError(s.to_owned()))
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a registered domain server.
    DomainId
);

numeric_id!(
    /// Identifier of a logged-in user.
    UserId
);

numeric_id!(
    /// Identifier of an item template.
    ItemId
);
