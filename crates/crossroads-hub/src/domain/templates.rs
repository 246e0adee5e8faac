//! Item templates: the hub's immutable catalog of every item in the game.

use std::collections::{BTreeMap, BTreeSet};

use crossroads_core::error::DomainError;
use crossroads_core::ids::{DomainId, ItemId};
use crossroads_core::item::{ItemRecord, ItemSpec};

/// Which domain an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemHome {
    /// Registered by this domain.
    Domain(DomainId),
    /// Supplied by the hub on behalf of the wider region.
    Elsewhere,
}

/// Registered description of one item.
#[derive(Debug, Clone)]
pub struct ItemTemplate {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub verbs: BTreeMap<String, String>,
    pub tier: Option<u32>,
    pub home: ItemHome,
    hosts: BTreeSet<DomainId>,
}

impl ItemTemplate {
    #[must_use]
    pub fn is_home(&self, domain: DomainId) -> bool {
        self.home == ItemHome::Domain(domain)
    }

    /// Whether `domain` may place this item into the world.
    #[must_use]
    pub fn may_place(&self, domain: DomainId) -> bool {
        self.is_home(domain) || self.hosts.contains(&domain)
    }

    /// The record a domain receives for an item it is shown or handed.
    #[must_use]
    pub fn record(&self) -> ItemRecord {
        ItemRecord {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            verbs: self.verbs.clone(),
            tier: None,
            dropped_at: None,
        }
    }

    /// The record a domain receives for a prize it hosts, tier included.
    #[must_use]
    pub fn prize_record(&self) -> ItemRecord {
        ItemRecord {
            tier: Some(self.tier.unwrap_or(0)),
            ..self.record()
        }
    }
}

/// The template catalog, keyed by item id.
#[derive(Debug, Default)]
pub struct TemplateStore {
    templates: BTreeMap<ItemId, ItemTemplate>,
}

impl TemplateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// First unused id at or after `start`.
    #[must_use]
    pub fn free_id_from(&self, start: u32) -> ItemId {
        let mut candidate = start;
        while self.templates.contains_key(&ItemId(candidate)) {
            candidate = candidate.wrapping_add(1);
        }
        ItemId(candidate)
    }

    /// Adds a template under an unused id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StateConflict` if the id is already taken.
    pub fn insert(
        &mut self,
        id: ItemId,
        spec: &ItemSpec,
        home: ItemHome,
    ) -> Result<&ItemTemplate, DomainError> {
        if self.templates.contains_key(&id) {
            return Err(DomainError::StateConflict(format!(
                "item id {id} is already registered"
            )));
        }
        let template = ItemTemplate {
            id,
            name: spec.name.clone(),
            description: spec.description.clone(),
            verbs: spec.verbs.clone(),
            tier: spec.tier(),
            home,
            hosts: BTreeSet::new(),
        };
        Ok(self.templates.entry(id).or_insert(template))
    }

    /// Grants `domain` the right to place item `id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if there is no such template.
    pub fn add_host(&mut self, id: ItemId, domain: DomainId) -> Result<(), DomainError> {
        let template = self
            .templates
            .get_mut(&id)
            .ok_or_else(|| DomainError::NotFound(format!("item {id}")))?;
        template.hosts.insert(domain);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&ItemTemplate> {
        self.templates.get(&id)
    }

    /// Looks up a template, failing with `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if there is no such template.
    pub fn require(&self, id: ItemId) -> Result<&ItemTemplate, DomainError> {
        self.get(id)
            .ok_or_else(|| DomainError::NotFound(format!("item {id}")))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemTemplate> {
        self.templates.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn clear(&mut self) {
        self.templates.clear();
    }
}
