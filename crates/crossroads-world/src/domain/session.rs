//! Per-user sessions: location, visit history, inventory partitions and an
//! independent copy of the mutable room state.

use std::collections::{BTreeMap, BTreeSet};

use crossroads_core::ids::{ItemId, UserId};
use crossroads_core::item::{ItemRecord, LocationTag};

use super::rooms::{RoomGraph, RoomState};

/// The four inventory partitions the hub classifies items into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    /// Held, and homed in this domain.
    Owned,
    /// Held, and homed elsewhere.
    Carried,
    /// Left by this user somewhere in this domain.
    Dropped,
    /// Offered by this domain and not yet taken.
    Prize,
}

/// How an item in a room presents itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Lying in the open.
    Here,
    /// Inside the room's open container.
    Inside,
    /// Not visible or reachable.
    Hidden,
}

/// A user's state within this domain.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserId,
    location: String,
    visited: BTreeSet<String>,
    owned: BTreeMap<ItemId, ItemRecord>,
    carried: BTreeMap<ItemId, ItemRecord>,
    dropped: BTreeMap<ItemId, ItemRecord>,
    prize: BTreeMap<ItemId, ItemRecord>,
    arrived: bool,
    rooms: BTreeMap<String, RoomState>,
    /// Records of every item currently in one of `rooms`.
    catalog: BTreeMap<ItemId, ItemRecord>,
}

impl Session {
    /// A fresh session over a copy of the base graph with its static items.
    #[must_use]
    pub fn new(user: UserId, graph: &RoomGraph, placements: &[(String, ItemRecord)]) -> Self {
        let mut session = Self {
            user,
            location: graph.entry().to_owned(),
            visited: BTreeSet::new(),
            owned: BTreeMap::new(),
            carried: BTreeMap::new(),
            dropped: BTreeMap::new(),
            prize: BTreeMap::new(),
            arrived: false,
            rooms: graph.fresh_rooms(),
            catalog: BTreeMap::new(),
        };
        for (room, record) in placements {
            session.place_in_room(room, record.clone());
        }
        session
    }

    /// Clears the partitions and puts the user back at the entry room.
    pub fn reset_for_arrival(&mut self, entry: &str) {
        self.owned.clear();
        self.carried.clear();
        self.dropped.clear();
        self.prize.clear();
        self.location = entry.to_owned();
        self.visited.insert(entry.to_owned());
        self.arrived = true;
    }

    #[must_use]
    pub fn is_arrived(&self) -> bool {
        self.arrived
    }

    pub fn mark_departed(&mut self) {
        self.arrived = false;
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Moves the user, returning `true` on a first visit.
    pub fn move_to(&mut self, room: &str) -> bool {
        room.clone_into(&mut self.location);
        self.visited.insert(room.to_owned())
    }

    #[must_use]
    pub fn partition(&self, partition: Partition) -> &BTreeMap<ItemId, ItemRecord> {
        match partition {
            Partition::Owned => &self.owned,
            Partition::Carried => &self.carried,
            Partition::Dropped => &self.dropped,
            Partition::Prize => &self.prize,
        }
    }

    /// Records an item in a partition, replacing any earlier record.
    pub fn hold(&mut self, partition: Partition, record: ItemRecord) {
        let target = match partition {
            Partition::Owned => &mut self.owned,
            Partition::Carried => &mut self.carried,
            Partition::Dropped => &mut self.dropped,
            Partition::Prize => &mut self.prize,
        };
        target.insert(record.id, record);
    }

    #[must_use]
    pub fn room(&self, id: &str) -> Option<&RoomState> {
        self.rooms.get(id)
    }

    pub fn room_mut(&mut self, id: &str) -> Option<&mut RoomState> {
        self.rooms.get_mut(id)
    }

    /// Puts an item in a room, removing it from any other room first.
    /// Returns `false` (and places nothing) if the room is unknown.
    pub fn place_in_room(&mut self, room: &str, record: ItemRecord) -> bool {
        if !self.rooms.contains_key(room) {
            return false;
        }
        self.unplace(record.id);
        if let Some(state) = self.rooms.get_mut(room) {
            state.place(record.id);
        }
        self.catalog.insert(record.id, record);
        true
    }

    /// Removes an item from every room ledger, returning its record.
    pub fn unplace(&mut self, item: ItemId) -> Option<ItemRecord> {
        for state in self.rooms.values_mut() {
            state.remove(item);
        }
        self.catalog.remove(&item)
    }

    /// The room currently holding `item`, if any.
    #[must_use]
    pub fn room_of(&self, item: ItemId) -> Option<&str> {
        self.rooms
            .iter()
            .find(|(_, state)| state.contains(item))
            .map(|(id, _)| id.as_str())
    }

    /// How `item` presents itself in `room`.
    #[must_use]
    pub fn placement(&self, room: &str, item: ItemId) -> Placement {
        let (Some(state), Some(record)) = (self.rooms.get(room), self.catalog.get(&item)) else {
            return Placement::Hidden;
        };
        if !state.contains(item) {
            return Placement::Hidden;
        }
        if record.dropped_at.is_some() || record.effective_tier() == 0 {
            Placement::Here
        } else if state.open_tier() == Some(record.effective_tier()) {
            Placement::Inside
        } else {
            Placement::Hidden
        }
    }

    /// Items of `room` with the given placement, in ledger order.
    #[must_use]
    pub fn items_placed(&self, room: &str, placement: Placement) -> Vec<&ItemRecord> {
        let Some(state) = self.rooms.get(room) else {
            return Vec::new();
        };
        state
            .items()
            .iter()
            .filter(|id| self.placement(room, **id) == placement)
            .filter_map(|id| self.catalog.get(id))
            .collect()
    }

    /// Resolves a name or id among held items, owned first.
    #[must_use]
    pub fn find_held(&self, query: &str) -> Option<&ItemRecord> {
        self.owned
            .values()
            .chain(self.carried.values())
            .find(|record| record.answers_to(query))
    }

    #[must_use]
    pub fn holds_item_named(&self, name: &str) -> bool {
        self.owned
            .values()
            .chain(self.carried.values())
            .any(|record| record.name == name)
    }

    /// Moves a held item to the current room as a drop, returning its tag.
    pub fn drop_here(&mut self, item: ItemId) -> Option<LocationTag> {
        let mut record = self
            .owned
            .remove(&item)
            .or_else(|| self.carried.remove(&item))?;
        let tag = LocationTag::room(&self.location);
        record.dropped_at = Some(tag.clone());
        self.dropped.insert(item, record.clone());
        let here = self.location.clone();
        self.place_in_room(&here, record);
        Some(tag)
    }

    /// Moves an item out of the rooms into the user's hands.
    pub fn pick_up(&mut self, item: ItemId, owned: bool) -> Option<&ItemRecord> {
        let mut record = self
            .unplace(item)
            .or_else(|| self.prize.get(&item).cloned())?;
        self.prize.remove(&item);
        self.dropped.remove(&item);
        record.dropped_at = None;
        let target = if owned {
            &mut self.owned
        } else {
            &mut self.carried
        };
        target.insert(item, record);
        target.get(&item)
    }

    /// Every item id this session places in a room or holds.
    pub fn located_items(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.rooms
            .values()
            .flat_map(|state| state.items().iter().copied())
            .chain(self.owned.keys().copied())
            .chain(self.carried.keys().copied())
    }
}
