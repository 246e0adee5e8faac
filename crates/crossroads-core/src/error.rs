//! Domain error types.

use thiserror::Error;

/// Top-level protocol error type.
///
/// Only protocol violations are errors. Game-logic negatives ("there is no
/// paper here") are successful responses carrying narrative text.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A capability secret was missing or did not match.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// An unknown user, domain or item was referenced.
    #[error("not found: {0}")]
    NotFound(String),

    /// A request was malformed or missing required fields.
    #[error("validation error: {0}")]
    Validation(String),

    /// The operation is invalid for the current mode or session state.
    #[error("state conflict: {0}")]
    StateConflict(String),

    /// A cross-server call timed out or was refused.
    #[error("remote call failed: {0}")]
    Remote(String),

    /// An infrastructure error (poisoned lock, broken invariant).
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
