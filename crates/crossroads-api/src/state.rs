//! Shared application state.

use std::sync::{Arc, Mutex};

use crossroads_core::client::{DomainClient, HubClient};
use crossroads_core::rng::DeterministicRng;
use crossroads_hub::domain::aggregates::HubAuthority;
use crossroads_world::domain::aggregates::WorldServer;

/// State shared across the hub's request handlers.
#[derive(Clone)]
pub struct HubState {
    /// The hub's registries.
    pub hub: Arc<Mutex<HubAuthority>>,
    /// RNG for ids, secrets and loot assignment.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    /// Client for calls into domain servers.
    pub domains: Arc<dyn DomainClient>,
    /// URL the hub advertises to domains.
    pub public_url: Arc<str>,
}

impl HubState {
    /// Create new hub state.
    #[must_use]
    pub fn new(
        hub: HubAuthority,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
        domains: Arc<dyn DomainClient>,
        public_url: &str,
    ) -> Self {
        Self {
            hub: Arc::new(Mutex::new(hub)),
            rng,
            domains,
            public_url: Arc::from(public_url),
        }
    }
}

/// State shared across a domain server's request handlers.
#[derive(Clone)]
pub struct WorldState {
    /// The room graph, hub link and sessions.
    pub world: Arc<Mutex<WorldServer>>,
    /// Client for calls into the hub.
    pub hub: Arc<dyn HubClient>,
    /// URL this domain advertises to the hub.
    pub public_url: Arc<str>,
}

impl WorldState {
    /// Create new domain server state.
    #[must_use]
    pub fn new(world: WorldServer, hub: Arc<dyn HubClient>, public_url: &str) -> Self {
        Self {
            world: Arc::new(Mutex::new(world)),
            hub,
            public_url: Arc::from(public_url),
        }
    }
}
