//! Crossroads hub server entry point.

use std::error::Error;
use std::sync::{Arc, Mutex};

use crossroads_api::app;
use crossroads_api::config::{HUB_PORT, ServerConfig};
use crossroads_api::state::HubState;
use crossroads_content::expedition::ExpeditionPack;
use crossroads_core::rng::{DeterministicRng, SystemRng};
use crossroads_hub::domain::aggregates::HubAuthority;
use crossroads_remote::RemoteClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    app::init_tracing();

    tracing::info!("Starting Crossroads hub server");

    let config = ServerConfig::from_env(HUB_PORT)?;
    let expeditions = ExpeditionPack::builtin()?;
    let domains = Arc::new(RemoteClient::new(config.remote_timeout)?);
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(SystemRng::new()));

    let state = HubState::new(
        HubAuthority::new(expeditions),
        rng,
        domains,
        &config.public_url,
    );

    app::serve(&config, app::hub_router(state)).await?;

    Ok(())
}
