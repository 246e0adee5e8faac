//! Crossroads domain server entry point.

use std::error::Error;
use std::sync::Arc;

use crossroads_api::app;
use crossroads_api::config::{ServerConfig, WORLD_PORT};
use crossroads_api::state::WorldState;
use crossroads_content::pack::DomainPack;
use crossroads_remote::RemoteClient;
use crossroads_world::domain::aggregates::WorldServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    app::init_tracing();

    tracing::info!("Starting Crossroads domain server");

    let config = ServerConfig::from_env(WORLD_PORT)?;
    let pack = match &config.content_pack {
        Some(path) => DomainPack::load(path)?,
        None => DomainPack::builtin()?,
    };
    tracing::info!(domain = %pack.name, rooms = pack.rooms.len(), "content pack loaded");

    let hub = Arc::new(RemoteClient::new(config.remote_timeout)?);
    let state = WorldState::new(WorldServer::new(pack), hub, &config.public_url);

    app::serve(&config, app::world_router(state)).await?;

    Ok(())
}
