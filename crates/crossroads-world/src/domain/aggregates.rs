//! The `WorldServer` aggregate: the room graph, the hub link and every
//! user session of one domain server.
//!
//! Methods are synchronous and run under the caller's lock. `take` needs the
//! hub's approval, so `command` hands back a plan and `commit_take` applies it
//! once the hub has agreed.

use std::collections::{BTreeMap, BTreeSet};

use crossroads_content::pack::DomainPack;
use crossroads_core::error::DomainError;
use crossroads_core::ids::{DomainId, ItemId, UserId};
use crossroads_core::item::{Destination, ItemRecord, LocationTag};
use crossroads_core::protocol::{
    ArriveRequest, ArriveResponse, DepartRequest, DomainCommandRequest, DroppedRequest,
    RegisterRequest, RegisterResponse, TransferRequest,
};
use crossroads_core::secret::Secret;
use tracing::{info, warn};

use super::interpreter::{Interpretation, interpret, take_refusal, taken};
use super::rooms::RoomGraph;
use super::session::{Partition, Session};

pub const NOT_ARRIVED: &str = "You have to journey to this domain before you can send it commands.";

/// The registration this domain holds with its hub.
#[derive(Debug, Clone)]
pub struct HubLink {
    pub hub_url: String,
    pub domain: DomainId,
    pub secret: Secret,
    /// Ids the hub assigned to this domain's own items.
    home_items: BTreeSet<ItemId>,
}

impl HubLink {
    #[must_use]
    pub fn is_home(&self, item: ItemId) -> bool {
        self.home_items.contains(&item)
    }
}

/// A take waiting on the hub.
#[derive(Debug, Clone)]
pub struct TakePlan {
    /// The item as the room showed it when the take was planned.
    pub record: ItemRecord,
    /// What the user typed, for the refusal text.
    pub query: String,
    pub hub_url: String,
    pub transfer: TransferRequest,
}

/// What a player command produced.
#[derive(Debug, Clone)]
pub enum CommandOutcome {
    Reply(String),
    Take(TakePlan),
}

/// Hub URLs are compared and joined without surrounding space or a
/// trailing slash.
#[must_use]
pub fn normalize_hub_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

/// One domain server's whole in-memory state.
#[derive(Debug)]
pub struct WorldServer {
    graph: RoomGraph,
    link: Option<HubLink>,
    /// Statically placed items, known once the hub has assigned ids.
    base_placements: Vec<(String, ItemRecord)>,
    sessions: BTreeMap<UserId, Session>,
}

impl WorldServer {
    #[must_use]
    pub fn new(pack: DomainPack) -> Self {
        Self {
            graph: RoomGraph::new(pack),
            link: None,
            base_placements: Vec::new(),
            sessions: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn graph(&self) -> &RoomGraph {
        &self.graph
    }

    #[must_use]
    pub fn link(&self) -> Option<&HubLink> {
        self.link.as_ref()
    }

    #[must_use]
    pub fn session(&self, user: UserId) -> Option<&Session> {
        self.sessions.get(&user)
    }

    /// The registration payload for `POST /register`.
    #[must_use]
    pub fn registration_request(&self, public_url: &str) -> RegisterRequest {
        let pack = self.graph.pack();
        RegisterRequest {
            url: public_url.to_owned(),
            name: pack.name.clone(),
            description: pack.description.clone(),
            items: pack.item_specs(),
        }
    }

    /// Stores the hub's answer to a registration and resets every session.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Remote` if the hub assigned a different number
    /// of item ids than were registered.
    pub fn connect(&mut self, hub_url: &str, response: RegisterResponse) -> Result<(), DomainError> {
        let items = &self.graph.pack().items;
        if response.items.len() != items.len() {
            return Err(DomainError::Remote(format!(
                "hub assigned {} item ids for {} items",
                response.items.len(),
                items.len()
            )));
        }

        self.base_placements = items
            .iter()
            .zip(&response.items)
            .filter_map(|(item, id)| {
                let room = item.placed_in.clone()?;
                let record = ItemRecord {
                    id: *id,
                    name: item.spec.name.clone(),
                    description: item.spec.description.clone(),
                    verbs: item.spec.verbs.clone(),
                    tier: item.spec.tier(),
                    dropped_at: None,
                };
                Some((room, record))
            })
            .collect();
        self.sessions.clear();
        info!(
            hub_url = %hub_url,
            domain = %response.id,
            items = response.items.len(),
            "registered with hub"
        );
        self.link = Some(HubLink {
            hub_url: hub_url.to_owned(),
            domain: response.id,
            secret: response.secret,
            home_items: response.items.into_iter().collect(),
        });
        Ok(())
    }

    fn require_secret(&self, secret: &Secret) -> Result<&HubLink, DomainError> {
        let link = self.link.as_ref().ok_or_else(|| {
            DomainError::Unauthorized("domain is not registered with a hub".to_owned())
        })?;
        if link.secret != *secret {
            return Err(DomainError::Unauthorized("Invalid secret".to_owned()));
        }
        Ok(link)
    }

    /// Rebuilds a user's session from the hub's view of their items.
    ///
    /// Room state (fixtures, earlier drops) survives a re-arrival; the
    /// partitions are replaced wholesale and the user starts at the entry.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Unauthorized` before registration or for a
    /// wrong secret.
    pub fn arrive(&mut self, request: &ArriveRequest) -> Result<ArriveResponse, DomainError> {
        self.require_secret(&request.secret)?;
        let graph = &self.graph;
        let base_placements = &self.base_placements;
        let session = self
            .sessions
            .entry(request.user)
            .or_insert_with(|| Session::new(request.user, graph, base_placements));
        session.reset_for_arrival(graph.entry());

        let keep: BTreeSet<ItemId> = base_placements
            .iter()
            .map(|(_, record)| record.id)
            .chain(request.dropped.iter().map(|record| record.id))
            .chain(request.prize.iter().map(|record| record.id))
            .collect();
        let stale: Vec<ItemId> = session
            .located_items()
            .filter(|id| !keep.contains(id))
            .collect();
        for item in stale {
            session.unplace(item);
        }

        for record in &request.owned {
            session.unplace(record.id);
            session.hold(Partition::Owned, record.clone());
        }
        for record in &request.carried {
            session.unplace(record.id);
            session.hold(Partition::Carried, record.clone());
        }
        for record in &request.dropped {
            session.hold(Partition::Dropped, record.clone());
            let room = record.dropped_at.as_ref().and_then(LocationTag::as_room);
            if !room.is_some_and(|room| session.place_in_room(room, record.clone())) {
                warn!(user = %request.user, item = %record.id, "dropped item has no known room");
            }
        }

        let mut unused = Vec::new();
        for record in &request.prize {
            match graph.prize_room(record.effective_tier()) {
                Some(room) => {
                    session.hold(Partition::Prize, record.clone());
                    session.place_in_room(room, record.clone());
                }
                None => unused.push(record.clone()),
            }
        }

        info!(
            user = %request.user,
            owned = request.owned.len(),
            carried = request.carried.len(),
            dropped = request.dropped.len(),
            prizes = request.prize.len(),
            unused = unused.len(),
            "user arrived"
        );
        Ok(ArriveResponse {
            unused_items_depth: unused,
        })
    }

    /// Marks a user as gone; commands are refused until the next arrival.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for a user who never arrived.
    pub fn depart(&mut self, request: &DepartRequest) -> Result<(), DomainError> {
        let session = self
            .sessions
            .get_mut(&request.user)
            .ok_or_else(|| DomainError::NotFound(format!("User {} not known", request.user)))?;
        session.mark_departed();
        info!(user = %request.user, "user departed");
        Ok(())
    }

    /// Leaves a held item in the user's current room.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Unauthorized` for a wrong secret,
    /// `DomainError::NotFound` for an unknown user or an item the user does
    /// not hold, and `DomainError::StateConflict` for a departed user.
    pub fn dropped(&mut self, request: &DroppedRequest) -> Result<LocationTag, DomainError> {
        self.require_secret(&request.secret)?;
        let session = self
            .sessions
            .get_mut(&request.user)
            .ok_or_else(|| DomainError::NotFound(format!("User {} not known", request.user)))?;
        if !session.is_arrived() {
            return Err(DomainError::StateConflict(format!(
                "User {} is not in this domain",
                request.user
            )));
        }
        session.drop_here(request.item.id).ok_or_else(|| {
            DomainError::NotFound(format!("User does not hold item {}", request.item.id))
        })
    }

    /// Interprets a player command.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StateConflict` for a user who has departed.
    pub fn command(&mut self, request: &DomainCommandRequest) -> Result<CommandOutcome, DomainError> {
        let Some(session) = self.sessions.get_mut(&request.user) else {
            return Ok(CommandOutcome::Reply(NOT_ARRIVED.to_owned()));
        };
        if !session.is_arrived() {
            return Err(DomainError::StateConflict(format!(
                "User {} has left this domain",
                request.user
            )));
        }

        match interpret(session, &self.graph, &request.command) {
            Interpretation::Reply(text) => Ok(CommandOutcome::Reply(text)),
            Interpretation::Take { record, query } => {
                let Some(link) = &self.link else {
                    return Ok(CommandOutcome::Reply(take_refusal(&query)));
                };
                let item = record.id;
                Ok(CommandOutcome::Take(TakePlan {
                    record,
                    query,
                    hub_url: link.hub_url.clone(),
                    transfer: TransferRequest {
                        domain: link.domain,
                        secret: link.secret.clone(),
                        user: request.user,
                        item,
                        to: Destination::Carried,
                    },
                }))
            }
        }
    }

    /// Moves an approved take into the user's hands.
    ///
    /// The hub has already recorded the item as carried, so the take always
    /// succeeds here. If the item left the room while the transfer was in
    /// flight, the planned record is put straight into the user's hands.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the session vanished meanwhile.
    pub fn commit_take(&mut self, user: UserId, plan: &TakePlan) -> Result<String, DomainError> {
        let item = plan.record.id;
        let owned = self.link.as_ref().is_some_and(|link| link.is_home(item));
        let session = self
            .sessions
            .get_mut(&user)
            .ok_or_else(|| DomainError::NotFound(format!("User {user} not known")))?;
        if session.pick_up(item, owned).is_none() {
            warn!(user = %user, item = %item, "approved take no longer in the room, re-syncing");
            let mut record = plan.record.clone();
            record.dropped_at = None;
            let partition = if owned {
                Partition::Owned
            } else {
                Partition::Carried
            };
            session.hold(partition, record);
        }
        Ok(taken(&plan.record.name))
    }
}
