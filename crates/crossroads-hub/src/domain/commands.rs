//! Commands for the Hub Authority context.

use crossroads_core::command::Command;
use crossroads_core::protocol::{
    HubCommandRequest, QueryRequest, RegisterRequest, TransferRequest,
};
use uuid::Uuid;

/// Command to register a domain server.
#[derive(Debug, Clone)]
pub struct RegisterDomain {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The registration payload sent by the domain.
    pub request: RegisterRequest,
}

impl Command for RegisterDomain {
    fn command_type(&self) -> &'static str {
        "hub.register_domain"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to switch the hub between setup and play.
#[derive(Debug, Clone)]
pub struct ChangeMode {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Requested mode name, as sent by the client.
    pub requested: String,
}

impl Command for ChangeMode {
    fn command_type(&self) -> &'static str {
        "hub.change_mode"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to log a new user in.
#[derive(Debug, Clone)]
pub struct LoginUser {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for LoginUser {
    fn command_type(&self) -> &'static str {
        "hub.login_user"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to change an item's custody.
#[derive(Debug, Clone)]
pub struct TransferItem {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The transfer payload sent by the domain.
    pub request: TransferRequest,
}

impl Command for TransferItem {
    fn command_type(&self) -> &'static str {
        "hub.transfer_item"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Query for item ids by location or prize tier.
#[derive(Debug, Clone)]
pub struct QueryItems {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The query payload sent by the domain.
    pub request: QueryRequest,
}

impl Command for QueryItems {
    fn command_type(&self) -> &'static str {
        "hub.query_items"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command asking a domain server to register itself with this hub.
#[derive(Debug, Clone)]
pub struct ConnectDomain {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Where the domain server listens.
    pub domain_url: String,
    /// The URL this hub advertises.
    pub hub_url: String,
}

impl Command for ConnectDomain {
    fn command_type(&self) -> &'static str {
        "hub.connect_domain"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command carrying a user's hub-level verb.
#[derive(Debug, Clone)]
pub struct RunUserCommand {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user, their secret and the command tokens.
    pub request: HubCommandRequest,
}

impl Command for RunUserCommand {
    fn command_type(&self) -> &'static str {
        "hub.run_user_command"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Hub-level verbs a user can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubVerb {
    Region,
    Journey,
    Inventory,
    Score,
    Drop,
    Unknown,
}

impl HubVerb {
    /// Splits a token list into its verb and the remaining words.
    #[must_use]
    pub fn parse(tokens: &[String]) -> (Self, &[String]) {
        let Some((first, rest)) = tokens.split_first() else {
            return (Self::Unknown, tokens);
        };
        let verb = match first.as_str() {
            "region" => Self::Region,
            "journey" => Self::Journey,
            "inventory" => Self::Inventory,
            "score" => Self::Score,
            "drop" => Self::Drop,
            _ => Self::Unknown,
        };
        (verb, rest)
    }
}
