//! Command handlers for the Domain server context.
//!
//! The world lock is never held across a call to the hub: the hub may call
//! straight back into this server while it answers.

use std::sync::Mutex;

use crossroads_core::client::HubClient;
use crossroads_core::error::DomainError;
use crossroads_core::item::LocationTag;
use crossroads_core::protocol::ArriveResponse;
use tracing::{info, warn};

use super::lock;
use crate::domain::aggregates::{CommandOutcome, WorldServer, normalize_hub_url};
use crate::domain::commands::{ArriveUser, ConnectHub, DepartUser, DropItem, RunCommand};
use crate::domain::interpreter::take_refusal;

const REGISTERED: &str = "Domain registered successfully";

/// Handles the `ConnectHub` command: registers this domain with a hub.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an empty hub URL, and whatever the
/// hub answered if registration failed.
pub async fn handle_connect_hub(
    command: &ConnectHub,
    world: &Mutex<WorldServer>,
    hub: &dyn HubClient,
) -> Result<String, DomainError> {
    let hub_url = normalize_hub_url(&command.hub_url);
    if hub_url.is_empty() {
        return Err(DomainError::Validation("hub URL is required".to_owned()));
    }

    let request = lock(world, "world")?.registration_request(&command.public_url);
    let response = hub.register(&hub_url, &request).await.inspect_err(|e| {
        warn!(
            correlation_id = %command.correlation_id,
            %hub_url,
            error = %e,
            "hub registration failed"
        );
    })?;

    lock(world, "world")?.connect(&hub_url, response)?;
    info!(correlation_id = %command.correlation_id, %hub_url, "connected to hub");
    Ok(REGISTERED.to_owned())
}

/// Handles the `ArriveUser` command.
///
/// # Errors
///
/// Returns `DomainError::Unauthorized` before registration or for a wrong
/// secret.
pub fn handle_arrive(
    command: &ArriveUser,
    world: &Mutex<WorldServer>,
) -> Result<ArriveResponse, DomainError> {
    let mut world = lock(world, "world")?;
    let response = world.arrive(&command.request)?;
    info!(
        correlation_id = %command.correlation_id,
        user_id = %command.request.user,
        "arrival handled"
    );
    Ok(response)
}

/// Handles the `DepartUser` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for a user who never arrived.
pub fn handle_depart(command: &DepartUser, world: &Mutex<WorldServer>) -> Result<(), DomainError> {
    let mut world = lock(world, "world")?;
    world.depart(&command.request)
}

/// Handles the `DropItem` command, returning where the item landed.
///
/// # Errors
///
/// Returns authentication, lookup and presence errors from the world.
pub fn handle_dropped(
    command: &DropItem,
    world: &Mutex<WorldServer>,
) -> Result<LocationTag, DomainError> {
    let mut world = lock(world, "world")?;
    let tag = world.dropped(&command.request)?;
    info!(
        correlation_id = %command.correlation_id,
        user_id = %command.request.user,
        item_id = %command.request.item.id,
        "item dropped"
    );
    Ok(tag)
}

/// Handles a player command, returning the narrative reply.
///
/// A `take` asks the hub first and only moves the item once the hub has
/// accepted; a refusal leaves the world untouched.
///
/// # Errors
///
/// Returns `DomainError::StateConflict` for a departed user.
pub async fn handle_command(
    command: &RunCommand,
    world: &Mutex<WorldServer>,
    hub: &dyn HubClient,
) -> Result<String, DomainError> {
    let user = command.request.user;
    let outcome = lock(world, "world")?.command(&command.request)?;

    let plan = match outcome {
        CommandOutcome::Reply(text) => return Ok(text),
        CommandOutcome::Take(plan) => plan,
    };

    match hub.transfer(&plan.hub_url, &plan.transfer).await {
        Ok(()) => {
            info!(
                correlation_id = %command.correlation_id,
                user_id = %user,
                item_id = %plan.record.id,
                "item taken"
            );
            lock(world, "world")?.commit_take(user, &plan)
        }
        Err(e) => {
            info!(
                correlation_id = %command.correlation_id,
                user_id = %user,
                item_id = %plan.record.id,
                error = %e,
                "hub refused take"
            );
            Ok(take_refusal(&plan.query))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use crossroads_content::pack::DomainPack;
    use crossroads_core::error::DomainError;
    use crossroads_core::ids::{DomainId, ItemId, UserId};
    use crossroads_core::item::ItemRecord;
    use crossroads_core::protocol::{
        ArriveRequest, DepartRequest, DomainCommandRequest, DroppedRequest, RegisterResponse,
    };
    use crossroads_core::secret::Secret;
    use crossroads_test_support::{FailingHubClient, RecordingHubClient};
    use uuid::Uuid;

    use super::*;

    fn registration() -> RegisterResponse {
        RegisterResponse {
            id: DomainId(3),
            items: vec![ItemId(40), ItemId(41)],
            secret: Secret::new("s3cret"),
        }
    }

    fn world() -> Mutex<WorldServer> {
        Mutex::new(WorldServer::new(DomainPack::builtin().unwrap()))
    }

    async fn connect(world: &Mutex<WorldServer>, hub: &dyn HubClient) -> Result<String, DomainError> {
        let command = ConnectHub {
            correlation_id: Uuid::new_v4(),
            hub_url: " http://hub.test/ ".to_owned(),
            public_url: "http://world.test".to_owned(),
        };
        handle_connect_hub(&command, world, hub).await
    }

    fn arrive(world: &Mutex<WorldServer>) {
        let command = ArriveUser {
            correlation_id: Uuid::new_v4(),
            request: ArriveRequest {
                secret: Secret::new("s3cret"),
                user: UserId(0),
                owned: Vec::new(),
                carried: Vec::new(),
                dropped: Vec::new(),
                prize: Vec::new(),
            },
        };
        handle_arrive(&command, world).unwrap();
    }

    async fn say(world: &Mutex<WorldServer>, hub: &dyn HubClient, words: &[&str]) -> String {
        let command = RunCommand {
            correlation_id: Uuid::new_v4(),
            request: DomainCommandRequest {
                user: UserId(0),
                command: words.iter().map(|w| (*w).to_owned()).collect(),
            },
        };
        handle_command(&command, world, hub).await.unwrap()
    }

    #[tokio::test]
    async fn test_connect_registers_with_normalized_url() {
        // Arrange
        let world = world();
        let hub = RecordingHubClient::new(registration());

        // Act
        let ack = connect(&world, &hub).await.unwrap();

        // Assert
        assert_eq!(ack, "Domain registered successfully");
        let registrations = hub.registrations();
        assert_eq!(registrations.len(), 1);
        assert_eq!(registrations[0].0, "http://hub.test");
        assert_eq!(registrations[0].1.url, "http://world.test");
        let world = world.lock().unwrap();
        assert_eq!(world.link().unwrap().domain, DomainId(3));
    }

    #[tokio::test]
    async fn test_connect_failure_leaves_world_unregistered() {
        let world = world();

        let result = connect(&world, &FailingHubClient).await;

        assert!(matches!(result, Err(DomainError::Remote(_))));
        assert!(world.lock().unwrap().link().is_none());
    }

    #[tokio::test]
    async fn test_take_commits_after_hub_accepts() {
        // Arrange
        let world = world();
        let hub = RecordingHubClient::new(registration());
        connect(&world, &hub).await.unwrap();
        arrive(&world);

        // Act
        let reply = say(&world, &hub, &["take", "paper"]).await;
        let look = say(&world, &hub, &["look"]).await;

        // Assert
        assert_eq!(reply, "paper was taken.");
        assert!(!look.contains("paper"));
        let transfers = hub.transfers();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].item, ItemId(40));
        assert_eq!(transfers[0].user, UserId(0));
    }

    #[tokio::test]
    async fn test_refused_take_changes_nothing() {
        // Arrange
        let world = world();
        let hub = RecordingHubClient::new(registration());
        connect(&world, &hub).await.unwrap();
        arrive(&world);

        // Act
        let reply = say(&world, &FailingHubClient, &["take", "paper"]).await;
        let look = say(&world, &FailingHubClient, &["look"]).await;

        // Assert
        assert_eq!(reply, "There's no paper here to take");
        assert!(look.contains("There is a paper <sub>40</sub> here."));
    }

    #[test]
    fn test_depart_then_drop_conflicts() {
        let world = world();
        world
            .lock()
            .unwrap()
            .connect("http://hub.test", registration())
            .unwrap();
        arrive(&world);

        handle_depart(
            &DepartUser {
                correlation_id: Uuid::new_v4(),
                request: DepartRequest { user: UserId(0) },
            },
            &world,
        )
        .unwrap();
        let result = handle_dropped(
            &DropItem {
                correlation_id: Uuid::new_v4(),
                request: DroppedRequest {
                    secret: Secret::new("s3cret"),
                    user: UserId(0),
                    item: ItemRecord {
                        id: ItemId(40),
                        name: "paper".to_owned(),
                        description: String::new(),
                        verbs: BTreeMap::new(),
                        tier: None,
                        dropped_at: None,
                    },
                },
            },
            &world,
        );

        assert!(matches!(result, Err(DomainError::StateConflict(_))));
    }
}
