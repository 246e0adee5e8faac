//! The immutable room graph and the mutable per-session room state.

use std::collections::BTreeMap;

use crossroads_content::pack::{DomainPack, ExitSpec, PuzzleSpec, RoomSpec};
use crossroads_core::ids::ItemId;

use super::fixtures::PuzzleState;

/// Where an exit leads, once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitResolution {
    /// Another room of this domain.
    ToRoom(String),
    /// Out of the domain; the hub should run a journey in this direction.
    CrossDomainSignal(String),
}

/// The domain's base graph, shared read-only by every session.
#[derive(Debug, Clone)]
pub struct RoomGraph {
    pack: DomainPack,
}

impl RoomGraph {
    #[must_use]
    pub fn new(pack: DomainPack) -> Self {
        Self { pack }
    }

    #[must_use]
    pub fn pack(&self) -> &DomainPack {
        &self.pack
    }

    #[must_use]
    pub fn entry(&self) -> &str {
        &self.pack.entry
    }

    #[must_use]
    pub fn room(&self, id: &str) -> Option<&RoomSpec> {
        self.pack.rooms.get(id)
    }

    #[must_use]
    pub fn puzzle(&self, id: &str) -> Option<&PuzzleSpec> {
        self.room(id).and_then(|room| room.puzzle.as_ref())
    }

    /// Resolves `direction` from `room`; `None` means there is no such exit.
    #[must_use]
    pub fn exit(&self, room: &str, direction: &str) -> Option<ExitResolution> {
        let exit = self.room(room)?.exits.get(direction)?;
        Some(match exit {
            ExitSpec::Room(target) => ExitResolution::ToRoom(target.clone()),
            ExitSpec::Journey { journey } => ExitResolution::CrossDomainSignal(journey.clone()),
        })
    }

    /// The room that hosts prizes of `tier`, if the domain has one.
    #[must_use]
    pub fn prize_room(&self, tier: u32) -> Option<&str> {
        self.pack.prize_rooms.get(&tier).map(String::as_str)
    }

    /// A fresh copy of every room's mutable state, with fixtures reset.
    #[must_use]
    pub fn fresh_rooms(&self) -> BTreeMap<String, RoomState> {
        self.pack
            .rooms
            .iter()
            .map(|(id, spec)| {
                let state = RoomState {
                    items: Vec::new(),
                    puzzle: spec.puzzle.as_ref().map(PuzzleState::new),
                };
                (id.clone(), state)
            })
            .collect()
    }
}

/// One room's mutable state within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomState {
    items: Vec<ItemId>,
    pub puzzle: Option<PuzzleState>,
}

impl RoomState {
    /// Item ids in placement order.
    #[must_use]
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    #[must_use]
    pub fn contains(&self, item: ItemId) -> bool {
        self.items.contains(&item)
    }

    /// Adds an item unless it is already here.
    pub fn place(&mut self, item: ItemId) {
        if !self.contains(item) {
            self.items.push(item);
        }
    }

    /// Removes an item, reporting whether it was here.
    pub fn remove(&mut self, item: ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|id| *id != item);
        self.items.len() != before
    }

    /// Tier exposed by an open container in this room.
    #[must_use]
    pub fn open_tier(&self) -> Option<u32> {
        self.puzzle
            .as_ref()
            .filter(|puzzle| puzzle.is_open())
            .map(|puzzle| puzzle.tier)
    }
}
