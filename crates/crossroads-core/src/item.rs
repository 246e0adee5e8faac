//! Item records as they travel between the hub and the domains.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::ItemId;

/// Wire sentinel meaning "in the user's hands".
pub const CARRIED: &str = "inventory";

/// An opaque, domain-defined location for a dropped item.
///
/// The hub stores the tag verbatim and echoes it back on the next arrival;
/// only the domain that produced it interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationTag(serde_json::Value);

impl LocationTag {
    /// Tag naming a room of the producing domain.
    #[must_use]
    pub fn room(room_id: &str) -> Self {
        Self(serde_json::Value::String(room_id.to_owned()))
    }

    /// Wraps an arbitrary JSON value returned by a domain.
    #[must_use]
    pub fn from_value(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Returns the room id if this tag is a plain string.
    #[must_use]
    pub fn as_room(&self) -> Option<&str> {
        self.0.as_str()
    }
}

/// Where a custody change moves an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Destination {
    /// Into the user's hands.
    Carried,
    /// Dropped at a location of the requesting domain.
    At(LocationTag),
}

impl From<serde_json::Value> for Destination {
    fn from(value: serde_json::Value) -> Self {
        if value.as_str() == Some(CARRIED) {
            Self::Carried
        } else {
            Self::At(LocationTag(value))
        }
    }
}

impl From<Destination> for serde_json::Value {
    fn from(destination: Destination) -> Self {
        match destination {
            Destination::Carried => serde_json::Value::String(CARRIED.to_owned()),
            Destination::At(tag) => tag.0,
        }
    }
}

fn default_item_name() -> String {
    "thing".to_owned()
}

fn default_item_description() -> String {
    "error: owner did not describe this item".to_owned()
}

/// An item as declared by a domain at registration time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSpec {
    /// Display name.
    #[serde(default = "default_item_name")]
    pub name: String,
    /// Text returned by `look <item>`.
    #[serde(default = "default_item_description")]
    pub description: String,
    /// Canned responses keyed by verb (`read` → "The paper reads ...").
    #[serde(rename = "verb", default)]
    pub verbs: BTreeMap<String, String>,
    /// Requested accessibility tier; negative values clamp to zero.
    #[serde(rename = "depth", default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<i64>,
}

impl ItemSpec {
    /// The declared tier, if any, clamped to be non-negative.
    #[must_use]
    pub fn tier(&self) -> Option<u32> {
        self.depth
            .map(|depth| u32::try_from(depth.max(0)).unwrap_or(u32::MAX))
    }
}

/// An item snapshot sent to a domain (arrival lists, drop notices).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Hub-assigned identifier.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Text returned by `look <item>`.
    pub description: String,
    /// Canned responses keyed by verb.
    #[serde(rename = "verb", default)]
    pub verbs: BTreeMap<String, String>,
    /// Accessibility tier; only sent for prizes.
    #[serde(rename = "depth", default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<u32>,
    /// Where the user last dropped this item; only sent for dropped items.
    #[serde(rename = "location", default, skip_serializing_if = "Option::is_none")]
    pub dropped_at: Option<LocationTag>,
}

impl ItemRecord {
    /// Tier with the "always reachable" default applied.
    #[must_use]
    pub fn effective_tier(&self) -> u32 {
        self.tier.unwrap_or(0)
    }

    /// True if `query` names this item, by numeric id or by exact name.
    #[must_use]
    pub fn answers_to(&self, query: &str) -> bool {
        match query.parse::<ItemId>() {
            Ok(id) => id == self.id,
            Err(_) => self.name == query,
        }
    }

    /// The canned response for `verb`, if the item declares one.
    #[must_use]
    pub fn verb_response(&self, verb: &str) -> Option<&str> {
        self.verbs.get(verb).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_destination_inventory_sentinel_is_carried() {
        let destination: Destination = serde_json::from_value(json!("inventory")).unwrap();
        assert_eq!(destination, Destination::Carried);
    }

    #[test]
    fn test_destination_other_values_are_opaque_tags() {
        let destination: Destination = serde_json::from_value(json!("classroom")).unwrap();
        assert_eq!(destination, Destination::At(LocationTag::room("classroom")));

        let destination: Destination = serde_json::from_value(json!([3, "x"])).unwrap();
        match destination {
            Destination::At(tag) => assert_eq!(tag.as_room(), None),
            Destination::Carried => panic!("expected an opaque tag"),
        }
    }

    #[test]
    fn test_item_spec_defaults_and_clamps_depth() {
        let spec: ItemSpec = serde_json::from_value(json!({ "depth": -4 })).unwrap();
        assert_eq!(spec.name, "thing");
        assert!(spec.verbs.is_empty());
        assert_eq!(spec.tier(), Some(0));

        let spec: ItemSpec = serde_json::from_value(json!({ "name": "paper" })).unwrap();
        assert_eq!(spec.tier(), None);
    }

    #[test]
    fn test_item_record_wire_shape_uses_short_keys() {
        let record = ItemRecord {
            id: ItemId(12),
            name: "key".to_owned(),
            description: "A small key.".to_owned(),
            verbs: BTreeMap::new(),
            tier: Some(1),
            dropped_at: None,
        };

        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["depth"], 1);
        assert!(value.get("location").is_none());
        assert!(value["verb"].is_object());
    }

    #[test]
    fn test_answers_to_matches_id_or_name() {
        let record = ItemRecord {
            id: ItemId(12),
            name: "key".to_owned(),
            description: String::new(),
            verbs: BTreeMap::new(),
            tier: None,
            dropped_at: None,
        };

        assert!(record.answers_to("12"));
        assert!(record.answers_to("key"));
        assert!(!record.answers_to("13"));
        assert!(!record.answers_to("Key"));
    }
}
