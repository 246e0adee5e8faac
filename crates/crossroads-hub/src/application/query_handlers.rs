//! Query handlers for the Hub Authority context.

use std::sync::Mutex;

use crossroads_core::error::DomainError;
use crossroads_core::ids::ItemId;
use tracing::debug;

use super::lock;
use crate::domain::aggregates::HubAuthority;
use crate::domain::commands::QueryItems;
use crate::domain::mode::Mode;

/// Returns the hub's current mode.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the hub mutex is poisoned.
pub fn current_mode(hub: &Mutex<HubAuthority>) -> Result<Mode, DomainError> {
    Ok(lock(hub, "hub")?.mode())
}

/// Handles a domain's custody query.
///
/// # Errors
///
/// Returns authentication and lookup errors from the hub, and
/// `DomainError::Validation` unless exactly one filter is supplied.
pub fn handle_query_items(
    query: &QueryItems,
    hub: &Mutex<HubAuthority>,
) -> Result<Vec<ItemId>, DomainError> {
    let found = lock(hub, "hub")?.query(&query.request)?;
    debug!(
        correlation_id = %query.correlation_id,
        domain_id = %query.request.domain,
        count = found.len(),
        "items queried"
    );
    Ok(found)
}
