//! The cross-domain journey sub-plot.
//!
//! One scenario is chosen when play begins. Journeying with its loot in hand
//! unlocks the host domain's hidden items exactly once per game.

use crossroads_content::expedition::Scenario;
use crossroads_core::ids::ItemId;

/// Cardinal directions a journey may take.
pub const CARDINAL_DIRECTIONS: [&str; 4] = ["north", "south", "east", "west"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExpeditionStage {
    Unsolved,
    Solved,
}

/// What a journey produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JourneyOutcome {
    /// The key item was not carried.
    Blocked(String),
    /// The key item opened the way; `found` are now the traveller's.
    Unlocked { message: String, found: Vec<ItemId> },
    /// Nothing left to find.
    Idle(String),
}

impl JourneyOutcome {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Blocked(message) | Self::Idle(message) => message,
            Self::Unlocked { message, .. } => message,
        }
    }
}

/// Game-wide expedition state.
#[derive(Debug, Clone)]
pub struct Expedition {
    scenario: Scenario,
    key: ItemId,
    hidden: Vec<ItemId>,
    stage: ExpeditionStage,
}

impl Expedition {
    #[must_use]
    pub fn new(scenario: Scenario, key: ItemId, hidden: Vec<ItemId>) -> Self {
        Self {
            scenario,
            key,
            hidden,
            stage: ExpeditionStage::Unsolved,
        }
    }

    /// The item that must be carried to succeed.
    #[must_use]
    pub fn key(&self) -> ItemId {
        self.key
    }

    /// Advances the sub-plot. `name_of` renders the unlocked items for the
    /// success message.
    pub fn journey(
        &mut self,
        carrying_key: bool,
        name_of: impl Fn(ItemId) -> String,
    ) -> JourneyOutcome {
        match self.stage {
            ExpeditionStage::Solved => {
                JourneyOutcome::Idle(self.scenario.idle_message().to_owned())
            }
            ExpeditionStage::Unsolved if !carrying_key => {
                JourneyOutcome::Blocked(self.scenario.blocked_message().to_owned())
            }
            ExpeditionStage::Unsolved => {
                self.stage = ExpeditionStage::Solved;
                let names: Vec<String> = self.hidden.iter().map(|id| name_of(*id)).collect();
                JourneyOutcome::Unlocked {
                    message: self.scenario.success_message(&names.join(" and ")),
                    found: self.hidden.clone(),
                }
            }
        }
    }
}

/// Whether `direction` is one the hub knows how to journey in.
#[must_use]
pub fn is_cardinal(direction: &str) -> bool {
    CARDINAL_DIRECTIONS.contains(&direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossroads_content::expedition::ExpeditionPack;

    fn expedition() -> Expedition {
        let pack = ExpeditionPack::builtin().unwrap();
        Expedition::new(pack.scenarios[0].clone(), ItemId(500), vec![ItemId(11)])
    }

    #[test]
    fn test_journey_without_key_is_blocked_and_can_be_retried() {
        // Arrange
        let mut expedition = expedition();

        // Act
        let blocked = expedition.journey(false, |_| "key".to_owned());
        let retried = expedition.journey(true, |_| "key".to_owned());

        // Assert
        assert!(matches!(blocked, JourneyOutcome::Blocked(_)));
        assert!(matches!(retried, JourneyOutcome::Unlocked { .. }));
    }

    #[test]
    fn test_journey_with_key_unlocks_hidden_items_once() {
        // Arrange
        let mut expedition = expedition();

        // Act
        let first = expedition.journey(true, |_| "key".to_owned());
        let second = expedition.journey(true, |_| "key".to_owned());

        // Assert
        match first {
            JourneyOutcome::Unlocked { message, found } => {
                assert_eq!(found, vec![ItemId(11)]);
                assert!(message.contains("find a key."));
            }
            other => panic!("expected unlock, got {other:?}"),
        }
        assert!(matches!(second, JourneyOutcome::Idle(_)));
    }

    #[test]
    fn test_cardinal_directions() {
        assert!(is_cardinal("east"));
        assert!(!is_cardinal("up"));
        assert!(!is_cardinal("East"));
    }
}
