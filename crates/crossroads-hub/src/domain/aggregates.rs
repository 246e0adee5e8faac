//! The `HubAuthority` aggregate: single owner of every hub registry.
//!
//! All methods are synchronous and run under the caller's lock. Anything that
//! needs a remote call is split into a planning step that returns what to
//! send and a commit step that applies the answer.

use std::collections::BTreeMap;

use crossroads_content::expedition::ExpeditionPack;
use crossroads_core::error::DomainError;
use crossroads_core::ids::{DomainId, ItemId, UserId};
use crossroads_core::item::{ItemRecord, LocationTag};
use crossroads_core::protocol::{
    ArriveRequest, DepartRequest, DomainBrief, DroppedRequest, QueryFilter, QueryRequest,
    RegisterRequest, RegisterResponse, TransferRequest,
};
use crossroads_core::rng::{DeterministicRng, choose_index};
use crossroads_core::secret::Secret;

use super::custody::{Custody, authorize_transfer};
use super::expedition::{Expedition, JourneyOutcome, is_cardinal};
use super::mode::{Mode, ModeChange};
use super::templates::{ItemHome, TemplateStore};

/// Upper bound (inclusive) for randomly seeded domain and item ids.
const ID_SEED_MAX: u32 = 999;

/// Domains this hub accepts at once.
const MAX_DOMAINS: usize = 1;

const SCORE_TEXT: &str = "There's no scoreboard because you are the only user.";

/// A registered domain server.
#[derive(Debug, Clone)]
pub struct DomainRecord {
    pub id: DomainId,
    pub url: String,
    pub name: String,
    pub description: String,
    pub secret: Secret,
    /// Items homed elsewhere that this domain offers as prizes.
    pub loot: Vec<ItemId>,
}

impl DomainRecord {
    #[must_use]
    pub fn brief(&self) -> DomainBrief {
        DomainBrief {
            url: self.url.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

/// A logged-in user and the custody record of everything they have touched.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: UserId,
    pub secret: Secret,
    pub current_domain: DomainId,
    inventory: BTreeMap<ItemId, Custody>,
}

impl UserRecord {
    #[must_use]
    pub fn custody(&self, item: ItemId) -> Option<&Custody> {
        self.inventory.get(&item)
    }

    pub fn holdings(&self) -> impl Iterator<Item = (ItemId, &Custody)> {
        self.inventory.iter().map(|(id, custody)| (*id, custody))
    }

    pub fn carried(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.holdings()
            .filter(|(_, custody)| custody.is_carried())
            .map(|(id, _)| id)
    }

    #[must_use]
    pub fn is_carrying(&self, item: ItemId) -> bool {
        self.custody(item).is_some_and(Custody::is_carried)
    }
}

/// An arrival handshake ready to be sent.
#[derive(Debug, Clone)]
pub struct ArrivalNotice {
    pub domain_url: String,
    pub request: ArriveRequest,
}

/// What the `drop` command decided before any remote call.
#[derive(Debug, Clone)]
pub enum DropPlan {
    /// Nothing to send; answer the user directly.
    Reply(String),
    /// Ask the user's current domain where the item lands.
    Send {
        domain: DomainId,
        domain_url: String,
        request: DroppedRequest,
    },
}

/// What the `journey` command decided before any remote call.
#[derive(Debug, Clone)]
pub enum JourneyPlan {
    /// The direction was not understood; nothing changed.
    Reply(String),
    /// The expedition ran; the user's domain must be told to re-sync.
    Travel {
        message: String,
        domain_url: String,
        depart: DepartRequest,
        arrival: ArrivalNotice,
    },
}

/// The hub's whole in-memory world.
#[derive(Debug)]
pub struct HubAuthority {
    mode: Mode,
    domains: BTreeMap<DomainId, DomainRecord>,
    users: BTreeMap<UserId, UserRecord>,
    templates: TemplateStore,
    expedition: Option<Expedition>,
    expeditions: ExpeditionPack,
}

impl HubAuthority {
    /// Creates an empty hub in setup mode.
    #[must_use]
    pub fn new(expeditions: ExpeditionPack) -> Self {
        Self {
            mode: Mode::Setup,
            domains: BTreeMap::new(),
            users: BTreeMap::new(),
            templates: TemplateStore::new(),
            expedition: None,
            expeditions,
        }
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn domains(&self) -> impl Iterator<Item = &DomainRecord> {
        self.domains.values()
    }

    #[must_use]
    pub fn domain(&self, id: DomainId) -> Option<&DomainRecord> {
        self.domains.get(&id)
    }

    pub fn users(&self) -> impl Iterator<Item = &UserRecord> {
        self.users.values()
    }

    #[must_use]
    pub fn user(&self, id: UserId) -> Option<&UserRecord> {
        self.users.get(&id)
    }

    #[must_use]
    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    #[must_use]
    pub fn expedition(&self) -> Option<&Expedition> {
        self.expedition.as_ref()
    }

    #[must_use]
    pub fn is_registered_url(&self, url: &str) -> bool {
        self.domains.values().any(|domain| domain.url == url)
    }

    // ---- Mode machine -----------------------------------------------------

    /// Handles a client's request to switch modes.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StateConflict` while a transition is in progress
    /// or when entering play with no domains registered.
    pub fn request_mode(
        &mut self,
        requested: Mode,
        rng: &mut dyn DeterministicRng,
    ) -> Result<ModeChange, DomainError> {
        if requested == self.mode {
            return Ok(ModeChange::Unchanged(requested));
        }
        if self.mode == Mode::Locked {
            return Err(DomainError::StateConflict(
                "Error: request sent midway through handling another request.".to_owned(),
            ));
        }
        match requested {
            Mode::Setup => {
                self.reset();
                Ok(ModeChange::Changed(Mode::Setup))
            }
            Mode::Play => {
                self.enter_play(rng)?;
                Ok(ModeChange::Changed(Mode::Play))
            }
            Mode::Locked => Err(DomainError::Validation(
                "locked mode cannot be requested".to_owned(),
            )),
        }
    }

    /// `setup → locked → play`.
    ///
    /// # Errors
    ///
    /// See [`Self::lock_for_play`] and [`Self::complete_play`].
    pub fn enter_play(&mut self, rng: &mut dyn DeterministicRng) -> Result<(), DomainError> {
        self.lock_for_play()?;
        if let Err(error) = self.complete_play(rng) {
            self.mode = Mode::Setup;
            return Err(error);
        }
        Ok(())
    }

    /// First half of entering play: freezes the hub.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StateConflict` unless in setup mode with at
    /// least one registered domain.
    pub fn lock_for_play(&mut self) -> Result<(), DomainError> {
        if self.mode != Mode::Setup {
            return Err(DomainError::StateConflict(format!(
                "cannot enter play from {} mode",
                self.mode
            )));
        }
        if self.domains.is_empty() {
            return Err(DomainError::StateConflict(
                "Must register at least one domain before entering play mode.".to_owned(),
            ));
        }
        self.mode = Mode::Locked;
        Ok(())
    }

    /// Second half of entering play: assigns loot and opens the hub.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StateConflict` unless the hub is locked.
    pub fn complete_play(&mut self, rng: &mut dyn DeterministicRng) -> Result<(), DomainError> {
        if self.mode != Mode::Locked {
            return Err(DomainError::StateConflict(
                "loot can only be assigned while locked".to_owned(),
            ));
        }
        self.assign_loot(rng)?;
        self.mode = Mode::Play;
        Ok(())
    }

    /// Clears every registry and returns to setup mode.
    pub fn reset(&mut self) {
        self.mode = Mode::Setup;
        self.domains.clear();
        self.users.clear();
        self.templates.clear();
        self.expedition = None;
    }

    fn assign_loot(&mut self, rng: &mut dyn DeterministicRng) -> Result<(), DomainError> {
        let Some(host) = self.domains.keys().next().copied() else {
            return Err(DomainError::StateConflict(
                "no domain can host loot".to_owned(),
            ));
        };
        let index = choose_index(rng, self.expeditions.scenarios.len())
            .ok_or_else(|| DomainError::Infrastructure("expedition pack is empty".to_owned()))?;
        let scenario = self.expeditions.scenarios[index].clone();
        let companion = self.expeditions.companion.clone();

        let hidden: Vec<ItemId> = self
            .templates
            .iter()
            .filter(|template| template.tier.is_some())
            .map(|template| template.id)
            .collect();

        let key = self
            .templates
            .free_id_from(rng.next_u32_range(0, ID_SEED_MAX));
        self.templates.insert(key, &scenario.loot, ItemHome::Elsewhere)?;
        self.templates.add_host(key, host)?;

        let toy = self.templates.free_id_from(key.0);
        self.templates.insert(toy, &companion, ItemHome::Elsewhere)?;
        self.templates.add_host(toy, host)?;

        if let Some(domain) = self.domains.get_mut(&host) {
            domain.loot = vec![key, toy];
        }
        self.expedition = Some(Expedition::new(scenario, key, hidden));
        Ok(())
    }

    // ---- Registration -----------------------------------------------------

    /// Registers a domain and its item templates.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StateConflict` outside setup mode, for a
    /// duplicate URL, or when the hub already has its domain.
    pub fn register_domain(
        &mut self,
        request: &RegisterRequest,
        rng: &mut dyn DeterministicRng,
    ) -> Result<RegisterResponse, DomainError> {
        if self.mode != Mode::Setup {
            return Err(DomainError::StateConflict(
                "Central server is not in setup mode".to_owned(),
            ));
        }
        if self.is_registered_url(&request.url) {
            return Err(DomainError::StateConflict(
                "Cannot register same domain more than once".to_owned(),
            ));
        }
        if self.domains.len() >= MAX_DOMAINS {
            return Err(DomainError::StateConflict(
                "This hub server only supports a single domain at a time.".to_owned(),
            ));
        }

        let mut id = DomainId(rng.next_u32_range(0, ID_SEED_MAX));
        while self.domains.contains_key(&id) {
            id = DomainId(id.0.wrapping_add(1));
        }
        let secret = Secret::generate(rng);

        let mut next = rng.next_u32_range(0, ID_SEED_MAX);
        let mut items = Vec::with_capacity(request.items.len());
        for spec in &request.items {
            let item = self.templates.free_id_from(next);
            self.templates.insert(item, spec, ItemHome::Domain(id))?;
            items.push(item);
            next = item.0.wrapping_add(1);
        }

        self.domains.insert(
            id,
            DomainRecord {
                id,
                url: request.url.clone(),
                name: request.name.clone(),
                description: request.description.clone(),
                secret: secret.clone(),
                loot: Vec::new(),
            },
        );

        Ok(RegisterResponse { id, items, secret })
    }

    // ---- Users ------------------------------------------------------------

    /// Creates a user in a randomly chosen domain.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StateConflict` outside play mode or once every
    /// user id has been handed out.
    pub fn login(
        &mut self,
        rng: &mut dyn DeterministicRng,
    ) -> Result<(&UserRecord, DomainBrief), DomainError> {
        if self.mode != Mode::Play {
            return Err(DomainError::StateConflict(
                "Players cannot log in during setup".to_owned(),
            ));
        }
        let ids: Vec<DomainId> = self.domains.keys().copied().collect();
        let index = choose_index(rng, ids.len())
            .ok_or_else(|| DomainError::StateConflict("no domains registered".to_owned()))?;
        let domain = self.require_domain(ids[index])?.brief();

        let id = next_user_id(self.users.len())?;
        let user = UserRecord {
            id,
            secret: Secret::generate(rng),
            current_domain: ids[index],
            inventory: BTreeMap::new(),
        };
        let user = self.users.entry(id).or_insert(user);
        Ok((user, domain))
    }

    /// Checks a user's credentials.
    ///
    /// # Errors
    ///
    /// `StateConflict` outside play, `NotFound` for an unknown user,
    /// `Unauthorized` for a wrong secret.
    pub fn authenticate_user(
        &self,
        user: UserId,
        secret: &Secret,
    ) -> Result<&UserRecord, DomainError> {
        self.require_play()?;
        let record = self.require_user(user)?;
        if &record.secret != secret {
            return Err(DomainError::Unauthorized("Invalid secret".to_owned()));
        }
        Ok(record)
    }

    /// Checks a domain's credentials.
    ///
    /// # Errors
    ///
    /// `StateConflict` outside play, `NotFound` for an unknown domain,
    /// `Unauthorized` for a wrong secret.
    pub fn authenticate_domain(
        &self,
        domain: DomainId,
        secret: &Secret,
    ) -> Result<&DomainRecord, DomainError> {
        self.require_play()?;
        let record = self.require_domain(domain)?;
        if &record.secret != secret {
            return Err(DomainError::Unauthorized("Invalid secret".to_owned()));
        }
        Ok(record)
    }

    // ---- Custody protocol -------------------------------------------------

    /// The single write path for item custody.
    ///
    /// # Errors
    ///
    /// Authentication errors, `NotFound` for an unknown user or item, and the
    /// custody rule violations of [`authorize_transfer`].
    pub fn transfer(&mut self, request: &TransferRequest) -> Result<(), DomainError> {
        self.authenticate_domain(request.domain, &request.secret)?;
        self.require_user(request.user)?;
        let template = self.templates.require(request.item)?;
        let user = self
            .users
            .get_mut(&request.user)
            .ok_or_else(|| DomainError::NotFound(format!("User {} not known", request.user)))?;

        let next = authorize_transfer(
            template,
            request.domain,
            user.inventory.get(&request.item),
            &request.to,
        )?;
        user.inventory.insert(request.item, next);
        Ok(())
    }

    /// Read-only custody lookup for a domain.
    ///
    /// # Errors
    ///
    /// Authentication errors, `NotFound` for an unknown user, `Validation`
    /// unless exactly one filter is given.
    pub fn query(&self, request: &QueryRequest) -> Result<Vec<ItemId>, DomainError> {
        let domain = self.authenticate_domain(request.domain, &request.secret)?;
        let user = self.require_user(request.user)?;

        let found = match request.filter()? {
            QueryFilter::Location(destination) => {
                let wanted = Custody::from_destination(&destination, domain.id);
                user.holdings()
                    .filter(|(_, custody)| **custody == wanted)
                    .map(|(id, _)| id)
                    .collect()
            }
            QueryFilter::Tier(tier) => domain
                .loot
                .iter()
                .copied()
                .filter(|id| user.custody(*id).is_none())
                .filter(|id| self.templates.get(*id).and_then(|t| t.tier) == Some(tier))
                .collect(),
        };
        Ok(found)
    }

    /// Builds the arrival handshake for `user` entering their current domain.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unknown user or domain.
    pub fn arrival_notice(&self, user: UserId) -> Result<ArrivalNotice, DomainError> {
        let user = self.require_user(user)?;
        let domain = self.require_domain(user.current_domain)?;

        let mut request = ArriveRequest {
            secret: domain.secret.clone(),
            user: user.id,
            owned: Vec::new(),
            carried: Vec::new(),
            dropped: Vec::new(),
            prize: Vec::new(),
        };

        for (id, custody) in user.holdings() {
            let template = self.templates.require(id)?;
            match custody {
                Custody::Carried if template.is_home(domain.id) => {
                    request.owned.push(template.record());
                }
                Custody::Carried => request.carried.push(template.record()),
                Custody::Dropped { domain: held_by, tag } if *held_by == domain.id => {
                    request.dropped.push(ItemRecord {
                        dropped_at: Some(tag.clone()),
                        ..template.record()
                    });
                }
                Custody::Dropped { .. } => {}
            }
        }
        for id in &domain.loot {
            if user.custody(*id).is_none() {
                request.prize.push(self.templates.require(*id)?.prize_record());
            }
        }

        Ok(ArrivalNotice {
            domain_url: domain.url.clone(),
            request,
        })
    }

    // ---- User commands ----------------------------------------------------

    /// `region`: where the user is.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unknown user or domain.
    pub fn region_text(&self, user: UserId) -> Result<String, DomainError> {
        let user = self.require_user(user)?;
        let here = self.require_domain(user.current_domain)?;
        Ok(format!(
            "You are in domain <strong>{}</strong>\n{}\n\nFor this MP, there is no detail available about other domains in the region.",
            here.name, here.description
        ))
    }

    /// `inventory`: what the user is carrying.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unknown user.
    pub fn inventory_text(&self, user: UserId) -> Result<String, DomainError> {
        let user = self.require_user(user)?;
        let lines: Vec<String> = user
            .carried()
            .filter_map(|id| self.templates.get(id))
            .map(|template| format!("<li>{} <sub>{}</sub></li>", template.name, template.id))
            .collect();
        if lines.is_empty() {
            return Ok("You are not carrying anything.".to_owned());
        }
        Ok(format!("You are carrying:<ul>{}</ul>", lines.concat()))
    }

    /// `score`: fixed text while the hub holds a single user.
    #[must_use]
    pub fn score_text(&self) -> &'static str {
        SCORE_TEXT
    }

    /// `drop <item>`: resolves the item among carried ones.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unknown user or domain.
    pub fn plan_drop(&self, user: UserId, words: &[String]) -> Result<DropPlan, DomainError> {
        if words.is_empty() {
            return Ok(DropPlan::Reply(
                "What do you want to drop?\n<code>inventory</code> will show your options"
                    .to_owned(),
            ));
        }
        let user = self.require_user(user)?;
        let wanted = words.join(" ");
        let gear: Vec<ItemId> = user.carried().collect();

        let item = match wanted.parse::<ItemId>() {
            Ok(id) if gear.contains(&id) => id,
            _ => {
                let named: Vec<ItemId> = gear
                    .iter()
                    .copied()
                    .filter(|id| self.templates.get(*id).is_some_and(|t| t.name == wanted))
                    .collect();
                match named.as_slice() {
                    [] => return Ok(DropPlan::Reply(format!("You have no {wanted} to drop"))),
                    [only] => *only,
                    several => {
                        let options: String = several
                            .iter()
                            .map(|id| {
                                format!("<li><code>drop {id}</code> to drop {wanted} <sub>{id}</sub></li>")
                            })
                            .collect();
                        return Ok(DropPlan::Reply(format!(
                            "You have more than one {wanted}: please disambiguate which one you mean by using one of the following:<ul>{options}</ul>"
                        )));
                    }
                }
            }
        };

        let domain = self.require_domain(user.current_domain)?;
        Ok(DropPlan::Send {
            domain: domain.id,
            domain_url: domain.url.clone(),
            request: DroppedRequest {
                secret: domain.secret.clone(),
                user: user.id,
                item: self.templates.require(item)?.record(),
            },
        })
    }

    /// Commits a drop the domain accepted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StateConflict` if the item stopped being carried
    /// while the domain was being asked.
    pub fn record_drop(
        &mut self,
        user: UserId,
        item: ItemId,
        domain: DomainId,
        tag: LocationTag,
    ) -> Result<String, DomainError> {
        let name = self.templates.require(item)?.name.clone();
        let record = self
            .users
            .get_mut(&user)
            .ok_or_else(|| DomainError::NotFound(format!("User {user} not known")))?;
        if !record.is_carrying(item) {
            return Err(DomainError::StateConflict(format!(
                "item {item} is no longer carried"
            )));
        }
        record.inventory.insert(item, Custody::Dropped { domain, tag });
        Ok(format!("{name} <sub>{item}</sub> dropped."))
    }

    /// `journey <direction>`: runs the expedition and plans the re-sync.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unknown user or domain.
    pub fn journey(&mut self, user: UserId, words: &[String]) -> Result<JourneyPlan, DomainError> {
        let direction_ok = matches!(words, [direction] if is_cardinal(direction));
        if !direction_ok {
            return Ok(JourneyPlan::Reply(
                "I only know how to journey in cardinal directions".to_owned(),
            ));
        }

        let key = self
            .expedition
            .as_ref()
            .map(Expedition::key)
            .ok_or_else(|| DomainError::Infrastructure("play mode has no expedition".to_owned()))?;
        let carrying_key = self.require_user(user)?.is_carrying(key);

        let templates = &self.templates;
        let outcome = match self.expedition.as_mut() {
            Some(expedition) => expedition.journey(carrying_key, |id| {
                templates
                    .get(id)
                    .map_or_else(|| id.to_string(), |t| t.name.clone())
            }),
            None => {
                return Err(DomainError::Infrastructure(
                    "play mode has no expedition".to_owned(),
                ));
            }
        };

        if let JourneyOutcome::Unlocked { found, .. } = &outcome {
            if let Some(record) = self.users.get_mut(&user) {
                for id in found {
                    record.inventory.insert(*id, Custody::Carried);
                }
            }
        }

        let arrival = self.arrival_notice(user)?;
        Ok(JourneyPlan::Travel {
            message: outcome.message().to_owned(),
            domain_url: arrival.domain_url.clone(),
            depart: DepartRequest { user },
            arrival,
        })
    }

    // ---- Lookups ----------------------------------------------------------

    fn require_play(&self) -> Result<(), DomainError> {
        if self.mode == Mode::Play {
            Ok(())
        } else {
            Err(DomainError::StateConflict(
                "Only available during play".to_owned(),
            ))
        }
    }

    fn require_user(&self, id: UserId) -> Result<&UserRecord, DomainError> {
        self.users
            .get(&id)
            .ok_or_else(|| DomainError::NotFound(format!("User {id} not known")))
    }

    fn require_domain(&self, id: DomainId) -> Result<&DomainRecord, DomainError> {
        self.domains
            .get(&id)
            .ok_or_else(|| DomainError::NotFound(format!("Domain {id} not known")))
    }
}

/// User ids are dense: the next id is the number of users so far.
fn next_user_id(existing: usize) -> Result<UserId, DomainError> {
    u32::try_from(existing)
        .map(UserId)
        .map_err(|_| DomainError::StateConflict("No more players can log in".to_owned()))
}
