//! Domain content packs.

use std::collections::BTreeMap;
use std::path::Path;

use crossroads_core::item::ItemSpec;
use serde::Deserialize;
use tracing::debug;

use crate::ContentError;

const BUILTIN_PACK: &str = include_str!("../packs/siebel.yaml");

/// Where an exit leads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ExitSpec {
    /// Another room of the same domain.
    Room(String),
    /// Out of the domain; the hub interprets it as a journey.
    Journey {
        /// Direction handed to the hub's `journey` command.
        journey: String,
    },
}

/// Narrative strings for a puzzle fixture set.
#[derive(Debug, Clone, Deserialize)]
pub struct PuzzleTexts {
    pub interior: String,
    pub container_shut: String,
    pub container_open: String,
    pub open_locked: String,
    pub opened: String,
    pub already_open: String,
    pub closed: String,
    pub already_closed: String,
    pub unlocked: String,
    pub locked: String,
    pub missing_key: String,
    pub switch_raised: String,
    pub switch_lowered: String,
    pub switch_up: String,
    pub switch_down: String,
    pub display_blank: String,
    pub display_prompt: String,
    pub display_solved: String,
    pub password_accepted: String,
    /// `{word}` is replaced by the rejected password.
    pub password_rejected: String,
}

/// The container + switch + display fixture set of one room.
#[derive(Debug, Clone, Deserialize)]
pub struct PuzzleSpec {
    /// Name players use for the container (`open cabinet`).
    pub container: String,
    /// Name of the switch inside the container.
    pub switch: String,
    /// Name of the display driven by the switch.
    pub display: String,
    /// Name of the item that locks and unlocks the container.
    pub key_item: String,
    /// Word that solves the display.
    pub password: String,
    /// Tier of the items the container hides.
    pub tier: u32,
    /// Narrative strings.
    pub texts: PuzzleTexts,
}

/// One room of the base graph.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomSpec {
    /// Short name used on revisits.
    pub name: String,
    /// Long description used by `look` and first visits.
    pub description: String,
    /// Exits keyed by direction.
    #[serde(default)]
    pub exits: BTreeMap<String, ExitSpec>,
    /// Readable fixtures (`read sign`) keyed by name.
    #[serde(default)]
    pub signs: BTreeMap<String, String>,
    /// Optional puzzle fixture set.
    #[serde(default)]
    pub puzzle: Option<PuzzleSpec>,
}

/// An item the domain registers, with its optional static placement.
#[derive(Debug, Clone, Deserialize)]
pub struct PackItem {
    /// The registration record sent to the hub.
    #[serde(flatten)]
    pub spec: ItemSpec,
    /// Room the item starts in; unplaced items only enter play via the hub.
    #[serde(default)]
    pub placed_in: Option<String>,
}

/// A complete domain content pack.
#[derive(Debug, Clone, Deserialize)]
pub struct DomainPack {
    /// Domain display name.
    pub name: String,
    /// Domain description.
    pub description: String,
    /// Room every arrival starts in.
    pub entry: String,
    /// The base room graph.
    pub rooms: BTreeMap<String, RoomSpec>,
    /// Items the domain owns, in registration order.
    #[serde(default)]
    pub items: Vec<PackItem>,
    /// Which room hosts prizes of each tier.
    #[serde(default)]
    pub prize_rooms: BTreeMap<u32, String>,
}

impl DomainPack {
    /// Loads the pack compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if the embedded pack is malformed.
    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_yaml(BUILTIN_PACK)
    }

    /// Loads and validates a pack from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading domain content pack");
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parses and validates a pack from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Parse` for malformed YAML and
    /// `ContentError::Invalid` for dangling room references.
    pub fn from_yaml(yaml: &str) -> Result<Self, ContentError> {
        let pack: Self = serde_yaml::from_str(yaml)?;
        pack.validate()?;
        Ok(pack)
    }

    /// Item registration records, in order.
    #[must_use]
    pub fn item_specs(&self) -> Vec<ItemSpec> {
        self.items.iter().map(|item| item.spec.clone()).collect()
    }

    fn validate(&self) -> Result<(), ContentError> {
        let known = |room: &str| self.rooms.contains_key(room);

        if !known(&self.entry) {
            return Err(ContentError::Invalid(format!(
                "entry room {:?} is not defined",
                self.entry
            )));
        }
        for (room_id, room) in &self.rooms {
            for (direction, exit) in &room.exits {
                if let ExitSpec::Room(target) = exit {
                    if !known(target) {
                        return Err(ContentError::Invalid(format!(
                            "exit {direction:?} of {room_id:?} leads to unknown room {target:?}"
                        )));
                    }
                }
            }
        }
        for (tier, room) in &self.prize_rooms {
            if !known(room) {
                return Err(ContentError::Invalid(format!(
                    "tier {tier} prizes go to unknown room {room:?}"
                )));
            }
        }
        for item in &self.items {
            if let Some(room) = &item.placed_in {
                if !known(room) {
                    return Err(ContentError::Invalid(format!(
                        "item {:?} is placed in unknown room {room:?}",
                        item.spec.name
                    )));
                }
            }
        }
        Ok(())
    }
}
