//! Custody records and the rules for moving items between them.

use crossroads_core::error::DomainError;
use crossroads_core::ids::DomainId;
use crossroads_core::item::{Destination, LocationTag};

use super::templates::ItemTemplate;

/// Where one of a user's items currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum Custody {
    /// In the user's inventory, whichever domain they are in.
    Carried,
    /// Left in a domain at a location only that domain understands.
    Dropped { domain: DomainId, tag: LocationTag },
}

impl Custody {
    /// Custody that results from `domain` moving an item to `destination`.
    #[must_use]
    pub fn from_destination(destination: &Destination, domain: DomainId) -> Self {
        match destination {
            Destination::Carried => Self::Carried,
            Destination::At(tag) => Self::Dropped {
                domain,
                tag: tag.clone(),
            },
        }
    }

    #[must_use]
    pub fn is_carried(&self) -> bool {
        matches!(self, Self::Carried)
    }

    /// The domain holding the item, if it was dropped.
    #[must_use]
    pub fn dropped_in(&self) -> Option<DomainId> {
        match self {
            Self::Carried => None,
            Self::Dropped { domain, .. } => Some(*domain),
        }
    }
}

/// Decides whether `requester` may move `template` from `current` custody to
/// `destination`, returning the new custody on success.
///
/// Checks run in a fixed order so the reported reason is stable.
///
/// # Errors
///
/// - `StateConflict` if the move would not change anything.
/// - `Unauthorized` if the item has no custody record and the requester is
///   neither its home nor a host.
/// - `Unauthorized` if the item is in custody, the destination is not the
///   inventory and the requester is not the item's home.
/// - `Unauthorized` if the item was dropped in a different domain.
pub fn authorize_transfer(
    template: &ItemTemplate,
    requester: DomainId,
    current: Option<&Custody>,
    destination: &Destination,
) -> Result<Custody, DomainError> {
    let next = Custody::from_destination(destination, requester);

    if current == Some(&next) {
        return Err(DomainError::StateConflict(
            "Cannot move item to where it already is".to_owned(),
        ));
    }

    let Some(current) = current else {
        if template.may_place(requester) {
            return Ok(next);
        }
        return Err(DomainError::Unauthorized(
            "Cannot generate items that don't belong to you".to_owned(),
        ));
    };

    if !next.is_carried() && !template.is_home(requester) {
        return Err(DomainError::Unauthorized(
            "Cannot move or remove items that don't belong to you".to_owned(),
        ));
    }

    if let Some(holder) = current.dropped_in() {
        if holder != requester {
            return Err(DomainError::Unauthorized(
                "That item has been dropped in a different domain".to_owned(),
            ));
        }
    }

    Ok(next)
}
