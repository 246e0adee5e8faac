//! Application layer for the Hub Authority context.

pub mod command_handlers;
pub mod query_handlers;

use std::sync::{Mutex, MutexGuard};

use crossroads_core::error::DomainError;

/// Locks a mutex, mapping poisoning to an infrastructure error.
pub(crate) fn lock<'a, T: ?Sized>(
    mutex: &'a Mutex<T>,
    what: &str,
) -> Result<MutexGuard<'a, T>, DomainError> {
    mutex
        .lock()
        .map_err(|e| DomainError::Infrastructure(format!("{what} mutex poisoned: {e}")))
}
