//! Command handlers for the Hub Authority context.
//!
//! Each handler locks the hub only around synchronous aggregate calls and
//! releases it before talking to a domain server, so a domain calling back
//! into the hub mid-request never finds it held.

use std::sync::Mutex;

use crossroads_core::client::DomainClient;
use crossroads_core::error::DomainError;
use crossroads_core::ids::UserId;
use crossroads_core::protocol::{LoginResponse, RegisterResponse};
use crossroads_core::rng::DeterministicRng;
use tracing::{info, warn};

use super::lock;
use crate::domain::aggregates::{ArrivalNotice, DropPlan, HubAuthority, JourneyPlan};
use crate::domain::commands::{
    ChangeMode, ConnectDomain, HubVerb, LoginUser, RegisterDomain, RunUserCommand, TransferItem,
};
use crate::domain::mode::{Mode, ModeChange};

const UNKNOWN_COMMAND: &str = "I don't know how to do that";
const DROP_REFUSED: &str = "You try to drop it, but the domain won't let you";

/// Handles the `RegisterDomain` command.
///
/// # Errors
///
/// Returns `DomainError::StateConflict` outside setup mode, for a duplicate
/// URL, or when a domain is already registered.
pub fn handle_register_domain(
    command: &RegisterDomain,
    hub: &Mutex<HubAuthority>,
    rng: &Mutex<dyn DeterministicRng + Send>,
) -> Result<RegisterResponse, DomainError> {
    let mut hub = lock(hub, "hub")?;
    let mut rng = lock(rng, "RNG")?;
    let response = hub.register_domain(&command.request, &mut *rng)?;
    info!(
        correlation_id = %command.correlation_id,
        domain_id = %response.id,
        items = response.items.len(),
        "domain registered"
    );
    Ok(response)
}

/// Handles the `ChangeMode` command, returning the acknowledgement text.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an unknown mode and
/// `DomainError::StateConflict` for an illegal transition.
pub fn handle_change_mode(
    command: &ChangeMode,
    hub: &Mutex<HubAuthority>,
    rng: &Mutex<dyn DeterministicRng + Send>,
) -> Result<String, DomainError> {
    let requested = Mode::requested(command.requested.trim())?;
    let mut hub = lock(hub, "hub")?;
    let mut rng = lock(rng, "RNG")?;
    let change = hub.request_mode(requested, &mut *rng)?;
    if let ModeChange::Changed(mode) = change {
        info!(correlation_id = %command.correlation_id, %mode, "hub mode changed");
    }
    Ok(change.message())
}

/// Handles the `LoginUser` command: creates the user, then runs the arrival
/// handshake with their starting domain.
///
/// # Errors
///
/// Returns `DomainError::StateConflict` outside play mode. A failed arrival
/// is logged, not returned.
pub async fn handle_login(
    command: &LoginUser,
    hub: &Mutex<HubAuthority>,
    rng: &Mutex<dyn DeterministicRng + Send>,
    domains: &dyn DomainClient,
) -> Result<LoginResponse, DomainError> {
    let (response, notice) = {
        let mut hub = lock(hub, "hub")?;
        let mut rng = lock(rng, "RNG")?;
        let (user, domain) = hub.login(&mut *rng)?;
        let response = LoginResponse {
            id: user.id,
            secret: user.secret.clone(),
            domain,
        };
        if hub.users().count() > 1 {
            warn!(
                correlation_id = %command.correlation_id,
                "more than one user logged in; the hub is built for a single user"
            );
        }
        let notice = hub.arrival_notice(response.id)?;
        (response, notice)
    };

    info!(correlation_id = %command.correlation_id, user_id = %response.id, "user logged in");
    notify_arrival(domains, &notice).await;
    Ok(response)
}

/// Handles the `TransferItem` command.
///
/// # Errors
///
/// Returns authentication, lookup and custody-rule errors from the hub.
pub fn handle_transfer(command: &TransferItem, hub: &Mutex<HubAuthority>) -> Result<(), DomainError> {
    let mut hub = lock(hub, "hub")?;
    hub.transfer(&command.request)?;
    info!(
        correlation_id = %command.correlation_id,
        domain_id = %command.request.domain,
        user_id = %command.request.user,
        item_id = %command.request.item,
        "item transferred"
    );
    Ok(())
}

/// Handles the `ConnectDomain` command: asks a domain server to register.
///
/// # Errors
///
/// Returns `DomainError::StateConflict` outside setup mode and
/// `DomainError::Remote` if the domain could not be reached or refused.
pub async fn handle_connect_domain(
    command: &ConnectDomain,
    hub: &Mutex<HubAuthority>,
    domains: &dyn DomainClient,
) -> Result<String, DomainError> {
    {
        let hub = lock(hub, "hub")?;
        if hub.mode() != Mode::Setup {
            return Err(DomainError::StateConflict(
                "Central server is not in setup mode.".to_owned(),
            ));
        }
        if hub.is_registered_url(&command.domain_url) {
            return Ok("That domain server has already been registered.".to_owned());
        }
    }

    let ack = domains
        .connect_hub(&command.domain_url, &command.hub_url)
        .await
        .inspect_err(|e| {
            warn!(
                correlation_id = %command.correlation_id,
                domain_url = %command.domain_url,
                error = %e,
                "domain registration failed"
            );
        })?;
    Ok(ack)
}

/// Handles a user's hub-level command, returning the narrative reply.
///
/// # Errors
///
/// Returns authentication errors for the user. Game-level failures are
/// replies, not errors.
pub async fn handle_user_command(
    command: &RunUserCommand,
    hub: &Mutex<HubAuthority>,
    domains: &dyn DomainClient,
) -> Result<String, DomainError> {
    let request = &command.request;
    {
        let hub = lock(hub, "hub")?;
        hub.authenticate_user(request.user, &request.secret)?;
    }

    let (verb, words) = HubVerb::parse(&request.command);
    info!(
        correlation_id = %command.correlation_id,
        user_id = %request.user,
        ?verb,
        "hub command"
    );

    match verb {
        HubVerb::Journey => journey(request.user, words, hub, domains).await,
        HubVerb::Drop => drop_item(request.user, words, hub, domains).await,
        HubVerb::Region | HubVerb::Inventory | HubVerb::Score | HubVerb::Unknown => {
            reply_locally(verb, request.user, hub)
        }
    }
}

fn reply_locally(verb: HubVerb, user: UserId, hub: &Mutex<HubAuthority>) -> Result<String, DomainError> {
    let hub = lock(hub, "hub")?;
    match verb {
        HubVerb::Region => hub.region_text(user),
        HubVerb::Inventory => hub.inventory_text(user),
        HubVerb::Score => Ok(hub.score_text().to_owned()),
        HubVerb::Journey | HubVerb::Drop | HubVerb::Unknown => Ok(UNKNOWN_COMMAND.to_owned()),
    }
}

async fn journey(
    user: UserId,
    words: &[String],
    hub: &Mutex<HubAuthority>,
    domains: &dyn DomainClient,
) -> Result<String, DomainError> {
    let plan = {
        let mut hub = lock(hub, "hub")?;
        hub.journey(user, words)?
    };

    match plan {
        JourneyPlan::Reply(text) => Ok(text),
        JourneyPlan::Travel {
            message,
            domain_url,
            depart,
            arrival,
        } => {
            if let Err(e) = domains.depart(&domain_url, &depart).await {
                warn!(%domain_url, user_id = %user, error = %e, "depart notification failed");
            }
            notify_arrival(domains, &arrival).await;
            Ok(message)
        }
    }
}

async fn drop_item(
    user: UserId,
    words: &[String],
    hub: &Mutex<HubAuthority>,
    domains: &dyn DomainClient,
) -> Result<String, DomainError> {
    let plan = {
        let hub = lock(hub, "hub")?;
        hub.plan_drop(user, words)?
    };
    let (domain, domain_url, request) = match plan {
        DropPlan::Reply(text) => return Ok(text),
        DropPlan::Send {
            domain,
            domain_url,
            request,
        } => (domain, domain_url, request),
    };

    let tag = match domains.dropped(&domain_url, &request).await {
        Ok(tag) => tag,
        Err(e) => {
            warn!(%domain_url, user_id = %user, item_id = %request.item.id, error = %e, "domain refused drop");
            return Ok(DROP_REFUSED.to_owned());
        }
    };

    let mut hub = lock(hub, "hub")?;
    hub.record_drop(user, request.item.id, domain, tag)
}

async fn notify_arrival(domains: &dyn DomainClient, notice: &ArrivalNotice) {
    match domains.arrive(&notice.domain_url, &notice.request).await {
        Ok(response) if !response.unused_items_depth.is_empty() => {
            info!(
                domain_url = %notice.domain_url,
                unused = response.unused_items_depth.len(),
                "domain could not place some prizes"
            );
        }
        Ok(_) => {}
        Err(e) => {
            warn!(domain_url = %notice.domain_url, user_id = %notice.request.user, error = %e, "arrival handshake failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crossroads_content::expedition::ExpeditionPack;
    use crossroads_core::error::DomainError;
    use crossroads_core::ids::UserId;
    use crossroads_core::item::{Destination, ItemSpec, LocationTag};
    use crossroads_core::protocol::{
        HubCommandRequest, LoginResponse, RegisterRequest, RegisterResponse, TransferRequest,
    };
    use crossroads_core::rng::DeterministicRng;
    use crossroads_core::secret::Secret;
    use crossroads_test_support::{FailingDomainClient, MockRng, RecordingDomainClient};
    use uuid::Uuid;

    use super::*;

    struct Fixture {
        hub: Mutex<HubAuthority>,
        rng: Mutex<MockRng>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                hub: Mutex::new(HubAuthority::new(ExpeditionPack::builtin().unwrap())),
                rng: Mutex::new(MockRng),
            }
        }

        fn rng(&self) -> &Mutex<dyn DeterministicRng + Send> {
            &self.rng
        }

        fn register(&self) -> RegisterResponse {
            let command = RegisterDomain {
                correlation_id: Uuid::new_v4(),
                request: RegisterRequest {
                    url: "http://world.test".to_owned(),
                    name: "MP10".to_owned(),
                    description: "An example domain.".to_owned(),
                    items: vec![
                        ItemSpec {
                            name: "paper".to_owned(),
                            description: "A piece of paper.".to_owned(),
                            verbs: std::collections::BTreeMap::new(),
                            depth: None,
                        },
                        ItemSpec {
                            name: "key".to_owned(),
                            description: "A small key.".to_owned(),
                            verbs: std::collections::BTreeMap::new(),
                            depth: Some(1),
                        },
                    ],
                },
            };
            handle_register_domain(&command, &self.hub, self.rng()).unwrap()
        }

        fn change_mode(&self, requested: &str) -> Result<String, DomainError> {
            let command = ChangeMode {
                correlation_id: Uuid::new_v4(),
                requested: requested.to_owned(),
            };
            handle_change_mode(&command, &self.hub, self.rng())
        }

        async fn login(&self, domains: &dyn DomainClient) -> LoginResponse {
            let command = LoginUser {
                correlation_id: Uuid::new_v4(),
            };
            handle_login(&command, &self.hub, self.rng(), domains)
                .await
                .unwrap()
        }

        async fn run(
            &self,
            login: &LoginResponse,
            words: &[&str],
            domains: &dyn DomainClient,
        ) -> Result<String, DomainError> {
            let command = RunUserCommand {
                correlation_id: Uuid::new_v4(),
                request: HubCommandRequest {
                    user: login.id,
                    secret: login.secret.clone(),
                    command: words.iter().map(|w| (*w).to_owned()).collect(),
                },
            };
            handle_user_command(&command, &self.hub, domains).await
        }

        fn carry(&self, registered: &RegisterResponse, user: UserId, index: usize) {
            let command = TransferItem {
                correlation_id: Uuid::new_v4(),
                request: TransferRequest {
                    domain: registered.id,
                    secret: registered.secret.clone(),
                    user,
                    item: registered.items[index],
                    to: Destination::Carried,
                },
            };
            handle_transfer(&command, &self.hub).unwrap();
        }
    }

    #[test]
    fn test_change_mode_round_trip() {
        // Arrange
        let fixture = Fixture::new();

        // Act / Assert
        assert!(matches!(
            fixture.change_mode("play"),
            Err(DomainError::StateConflict(_))
        ));
        fixture.register();
        assert_eq!(fixture.change_mode("play").unwrap(), "Now in play mode");
        assert_eq!(fixture.change_mode("play").unwrap(), "Already in play mode");
        assert_eq!(fixture.change_mode("setup").unwrap(), "Now in setup mode");
        assert!(matches!(
            fixture.change_mode("dance"),
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_login_runs_arrival_handshake() {
        // Arrange
        let fixture = Fixture::new();
        let registered = fixture.register();
        fixture.change_mode("play").unwrap();
        let domains = RecordingDomainClient::new(LocationTag::room("foyer"));

        // Act
        let login = fixture.login(&domains).await;

        // Assert
        assert_eq!(login.domain.url, "http://world.test");
        let arrivals = domains.arrivals();
        assert_eq!(arrivals.len(), 1);
        let (url, request) = &arrivals[0];
        assert_eq!(url, "http://world.test");
        assert_eq!(request.user, login.id);
        assert_eq!(request.secret, registered.secret);
        assert_eq!(request.prize.len(), 2);
    }

    #[tokio::test]
    async fn test_login_survives_unreachable_domain() {
        let fixture = Fixture::new();
        fixture.register();
        fixture.change_mode("play").unwrap();

        let login = fixture.login(&FailingDomainClient).await;

        assert_eq!(login.id, UserId(0));
    }

    #[tokio::test]
    async fn test_user_command_requires_valid_secret() {
        // Arrange
        let fixture = Fixture::new();
        fixture.register();
        fixture.change_mode("play").unwrap();
        let domains = RecordingDomainClient::new(LocationTag::room("foyer"));
        let mut login = fixture.login(&domains).await;
        login.secret = Secret::new("wrong");

        // Act
        let result = fixture.run(&login, &["inventory"], &domains).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_drop_round_trips_through_domain() {
        // Arrange
        let fixture = Fixture::new();
        let registered = fixture.register();
        fixture.change_mode("play").unwrap();
        let domains = RecordingDomainClient::new(LocationTag::room("classroom"));
        let login = fixture.login(&domains).await;
        fixture.carry(&registered, login.id, 0);

        // Act
        let reply = fixture.run(&login, &["drop", "paper"], &domains).await.unwrap();
        let inventory = fixture.run(&login, &["inventory"], &domains).await.unwrap();

        // Assert
        assert_eq!(
            reply,
            format!("paper <sub>{}</sub> dropped.", registered.items[0])
        );
        assert_eq!(inventory, "You are not carrying anything.");
        let drops = domains.drops();
        assert_eq!(drops.len(), 1);
        assert_eq!(drops[0].1.item.id, registered.items[0]);
    }

    #[tokio::test]
    async fn test_drop_refused_by_domain_keeps_item_carried() {
        // Arrange
        let fixture = Fixture::new();
        let registered = fixture.register();
        fixture.change_mode("play").unwrap();
        let login = fixture.login(&FailingDomainClient).await;
        fixture.carry(&registered, login.id, 0);

        // Act
        let reply = fixture
            .run(&login, &["drop", "paper"], &FailingDomainClient)
            .await
            .unwrap();
        let inventory = fixture
            .run(&login, &["inventory"], &FailingDomainClient)
            .await
            .unwrap();

        // Assert
        assert_eq!(reply, DROP_REFUSED);
        assert!(inventory.contains("paper"));
    }

    #[tokio::test]
    async fn test_journey_departs_then_rearrives() {
        // Arrange
        let fixture = Fixture::new();
        fixture.register();
        fixture.change_mode("play").unwrap();
        let domains = RecordingDomainClient::new(LocationTag::room("foyer"));
        let login = fixture.login(&domains).await;

        // Act
        let reply = fixture.run(&login, &["journey", "east"], &domains).await.unwrap();

        // Assert
        assert!(reply.starts_with("You journey in other domains"));
        assert_eq!(domains.departures().len(), 1);
        assert_eq!(domains.arrivals().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_and_fixed_commands() {
        let fixture = Fixture::new();
        fixture.register();
        fixture.change_mode("play").unwrap();
        let domains = RecordingDomainClient::new(LocationTag::room("foyer"));
        let login = fixture.login(&domains).await;

        let unknown = fixture.run(&login, &["dance"], &domains).await.unwrap();
        let score = fixture.run(&login, &["score"], &domains).await.unwrap();

        assert_eq!(unknown, UNKNOWN_COMMAND);
        assert_eq!(score, "There's no scoreboard because you are the only user.");
    }

    #[tokio::test]
    async fn test_connect_domain_forwards_hub_url() {
        // Arrange
        let fixture = Fixture::new();
        let domains = RecordingDomainClient::new(LocationTag::room("foyer"));
        let command = ConnectDomain {
            correlation_id: Uuid::new_v4(),
            domain_url: "http://world.test".to_owned(),
            hub_url: "http://hub.test".to_owned(),
        };

        // Act
        let ack = handle_connect_domain(&command, &fixture.hub, &domains)
            .await
            .unwrap();

        // Assert
        assert_eq!(ack, "Domain registered.");
        assert_eq!(
            domains.connections(),
            vec![("http://world.test".to_owned(), "http://hub.test".to_owned())]
        );
    }

    #[tokio::test]
    async fn test_connect_domain_reports_remote_failure() {
        let fixture = Fixture::new();
        let command = ConnectDomain {
            correlation_id: Uuid::new_v4(),
            domain_url: "http://world.test".to_owned(),
            hub_url: "http://hub.test".to_owned(),
        };

        let result = handle_connect_domain(&command, &fixture.hub, &FailingDomainClient).await;

        assert!(matches!(result, Err(DomainError::Remote(_))));
    }
}
