//! Request and response bodies exchanged between clients, the hub and the
//! domain servers.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{DomainId, ItemId, UserId};
use crate::item::{Destination, ItemRecord, ItemSpec};
use crate::secret::Secret;

/// Body of `POST /register` (domain → hub).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// URL the hub should use to reach the domain.
    pub url: String,
    /// Domain display name.
    pub name: String,
    /// Domain description shown by `region`.
    pub description: String,
    /// Items this domain owns.
    pub items: Vec<ItemSpec>,
}

/// Reply to a successful registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// The domain's identifier.
    pub id: DomainId,
    /// Identifiers of the registered items, in request order.
    pub items: Vec<ItemId>,
    /// Capability secret for every later call.
    pub secret: Secret,
}

/// Body of `POST /transfer` (domain → hub).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    /// The requesting domain.
    pub domain: DomainId,
    /// The requesting domain's secret.
    pub secret: Secret,
    /// The user whose custody record changes.
    pub user: UserId,
    /// The item being moved.
    pub item: ItemId,
    /// Where the item goes.
    pub to: Destination,
}

/// Body of `POST /query` (domain → hub).
///
/// Exactly one of `location` and `depth` must be present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The requesting domain.
    pub domain: DomainId,
    /// The requesting domain's secret.
    pub secret: Secret,
    /// The user being asked about.
    pub user: UserId,
    /// Ask which items sit at this location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Destination>,
    /// Ask which hosted prizes of this tier the user has not acquired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
}

/// The single filter a query selects.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryFilter {
    /// Items whose custody record equals this destination.
    Location(Destination),
    /// Unacquired hosted prizes of this tier.
    Tier(u32),
}

impl QueryRequest {
    /// Resolves the exclusive `location`/`depth` choice.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when both or neither are supplied.
    pub fn filter(&self) -> Result<QueryFilter, DomainError> {
        match (&self.location, self.depth) {
            (Some(location), None) => Ok(QueryFilter::Location(location.clone())),
            (None, Some(depth)) => Ok(QueryFilter::Tier(depth)),
            _ => Err(DomainError::Validation(
                "must provide location xor depth".to_owned(),
            )),
        }
    }
}

/// Body of `POST /arrive` (hub → domain).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArriveRequest {
    /// The domain's secret, proving the caller is the hub.
    pub secret: Secret,
    /// The arriving user.
    pub user: UserId,
    /// Carried items whose home is this domain.
    pub owned: Vec<ItemRecord>,
    /// Carried items homed elsewhere.
    pub carried: Vec<ItemRecord>,
    /// Items the user left in this domain, with their location tags.
    pub dropped: Vec<ItemRecord>,
    /// Hosted items the user has not acquired yet, with their tiers.
    pub prize: Vec<ItemRecord>,
}

/// Reply to `POST /arrive`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArriveResponse {
    /// Prizes whose tier this domain has no room for.
    pub unused_items_depth: Vec<ItemRecord>,
}

/// Body of `POST /depart` (hub → domain).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartRequest {
    /// The departing user.
    pub user: UserId,
}

/// Body of `POST /dropped` (hub → domain).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroppedRequest {
    /// The domain's secret, proving the caller is the hub.
    pub secret: Secret,
    /// The user dropping the item.
    pub user: UserId,
    /// The dropped item.
    pub item: ItemRecord,
}

/// Body of `POST /command` on a domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainCommandRequest {
    /// The acting user.
    pub user: UserId,
    /// Tokenized command.
    pub command: Vec<String>,
}

/// Body of `POST /command` on the hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubCommandRequest {
    /// The acting user.
    pub user: UserId,
    /// The user's secret.
    pub secret: Secret,
    /// Tokenized command.
    pub command: Vec<String>,
}

/// Public description of a domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainBrief {
    /// Where the domain is served.
    pub url: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
}

/// Reply to `GET /login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The new user's identifier.
    pub id: UserId,
    /// The new user's secret.
    pub secret: Secret,
    /// The domain the user starts in.
    pub domain: DomainBrief,
}

/// Generic `{ "ok": ... }` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    /// Human-readable acknowledgement.
    pub ok: String,
}

impl OkResponse {
    /// Creates an acknowledgement.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { ok: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query(body: serde_json::Value) -> QueryRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_query_filter_requires_exactly_one_selector() {
        let both = query(json!({
            "domain": 1, "secret": "s", "user": 0, "location": "inventory", "depth": 1
        }));
        let neither = query(json!({ "domain": 1, "secret": "s", "user": 0 }));

        assert!(matches!(both.filter(), Err(DomainError::Validation(_))));
        assert!(matches!(neither.filter(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_query_filter_by_location_or_depth() {
        let by_location = query(json!({
            "domain": 1, "secret": "s", "user": 0, "location": "inventory"
        }));
        let by_depth = query(json!({ "domain": 1, "secret": "s", "user": 0, "depth": 1 }));

        assert_eq!(
            by_location.filter().unwrap(),
            QueryFilter::Location(Destination::Carried)
        );
        assert_eq!(by_depth.filter().unwrap(), QueryFilter::Tier(1));
    }

    #[test]
    fn test_arrive_request_accepts_hub_shape() {
        let request: ArriveRequest = serde_json::from_value(json!({
            "secret": "abc",
            "user": 3,
            "owned": [],
            "carried": [],
            "dropped": [{
                "id": 5, "name": "paper", "description": "d",
                "verb": { "read": "r" }, "location": "classroom"
            }],
            "prize": [{ "id": 9, "name": "toy", "description": "t", "verb": {}, "depth": 1 }]
        }))
        .unwrap();

        assert_eq!(request.user, UserId(3));
        assert_eq!(
            request.dropped[0]
                .dropped_at
                .as_ref()
                .and_then(|tag| tag.as_room()),
            Some("classroom")
        );
        assert_eq!(request.prize[0].tier, Some(1));
    }
}
