//! Expedition packs: the hub's stand-in for other domains.
//!
//! The strings here are opaque flavor text as far as custody is concerned;
//! what matters is which loot each scenario hands out.

use crossroads_core::item::ItemSpec;
use serde::Deserialize;

use crate::ContentError;

const BUILTIN_EXPEDITIONS: &str = include_str!("../packs/expeditions.yaml");

/// Number of messages in every scenario's arc.
pub const ARC_LENGTH: usize = 3;

/// One simulated excursion into other domains.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// The item this scenario's other domain offers (and later requires).
    pub loot: ItemSpec,
    /// `[key missing, success, already solved]`; the success message has a
    /// `{}` placeholder for the names of the unlocked items.
    pub messages: Vec<String>,
}

impl Scenario {
    /// Message shown when the user journeys without the loot in hand.
    #[must_use]
    pub fn blocked_message(&self) -> &str {
        &self.messages[0]
    }

    /// Message shown when the expedition succeeds.
    #[must_use]
    pub fn success_message(&self, found: &str) -> String {
        self.messages[1].replacen("{}", found, 1)
    }

    /// Message shown on every journey after success.
    #[must_use]
    pub fn idle_message(&self) -> &str {
        &self.messages[2]
    }
}

/// The set of scenarios the hub chooses from when play begins.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpeditionPack {
    /// Alternative scenarios; one is picked per game.
    pub scenarios: Vec<Scenario>,
    /// A tier-1 prize every game hosts alongside the scenario loot.
    pub companion: ItemSpec,
}

impl ExpeditionPack {
    /// Loads the expeditions compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if the embedded pack is malformed.
    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_yaml(BUILTIN_EXPEDITIONS)
    }

    /// Parses and validates an expedition pack.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Invalid` if there are no scenarios or a
    /// scenario's arc is not exactly three messages long.
    pub fn from_yaml(yaml: &str) -> Result<Self, ContentError> {
        let pack: Self = serde_yaml::from_str(yaml)?;
        if pack.scenarios.is_empty() {
            return Err(ContentError::Invalid(
                "expedition pack has no scenarios".to_owned(),
            ));
        }
        if let Some(bad) = pack
            .scenarios
            .iter()
            .find(|scenario| scenario.messages.len() != ARC_LENGTH)
        {
            return Err(ContentError::Invalid(format!(
                "scenario {:?} needs exactly {ARC_LENGTH} messages",
                bad.loot.name
            )));
        }
        Ok(pack)
    }
}
