//! Commands for the Domain server context.

use crossroads_core::command::Command;
use crossroads_core::protocol::{
    ArriveRequest, DepartRequest, DomainCommandRequest, DroppedRequest,
};
use uuid::Uuid;

/// Command to register this domain with a hub.
#[derive(Debug, Clone)]
pub struct ConnectHub {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Hub base URL, as received.
    pub hub_url: String,
    /// URL the hub should use to reach this domain.
    pub public_url: String,
}

impl Command for ConnectHub {
    fn command_type(&self) -> &'static str {
        "world.connect_hub"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to start or resume a user's session.
#[derive(Debug, Clone)]
pub struct ArriveUser {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The hub's arrival payload.
    pub request: ArriveRequest,
}

impl Command for ArriveUser {
    fn command_type(&self) -> &'static str {
        "world.arrive_user"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to mark a user as gone.
#[derive(Debug, Clone)]
pub struct DepartUser {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The hub's departure payload.
    pub request: DepartRequest,
}

impl Command for DepartUser {
    fn command_type(&self) -> &'static str {
        "world.depart_user"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to leave a held item where the user stands.
#[derive(Debug, Clone)]
pub struct DropItem {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The hub's drop payload.
    pub request: DroppedRequest,
}

impl Command for DropItem {
    fn command_type(&self) -> &'static str {
        "world.drop_item"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to interpret a player's words.
#[derive(Debug, Clone)]
pub struct RunCommand {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The forwarded command.
    pub request: DomainCommandRequest,
}

impl Command for RunCommand {
    fn command_type(&self) -> &'static str {
        "world.run_command"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
