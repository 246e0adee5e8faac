//! Remote-call seams between the hub and the domain servers.
//!
//! Application handlers talk to the other server only through these traits,
//! so tests can swap in recording, failing or in-process implementations.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::item::LocationTag;
use crate::protocol::{
    ArriveRequest, ArriveResponse, DepartRequest, DroppedRequest, RegisterRequest,
    RegisterResponse, TransferRequest,
};

/// Calls a domain server makes into the hub.
#[async_trait]
pub trait HubClient: Send + Sync {
    /// Registers the domain with the hub at `hub_url`.
    async fn register(
        &self,
        hub_url: &str,
        request: &RegisterRequest,
    ) -> Result<RegisterResponse, DomainError>;

    /// Asks the hub to change an item's custody record.
    async fn transfer(&self, hub_url: &str, request: &TransferRequest) -> Result<(), DomainError>;
}

/// Calls the hub makes into a domain server.
#[async_trait]
pub trait DomainClient: Send + Sync {
    /// Tells the domain at `domain_url` to register itself with `hub_url`.
    ///
    /// Returns the domain's acknowledgement text.
    async fn connect_hub(&self, domain_url: &str, hub_url: &str) -> Result<String, DomainError>;

    /// Runs the arrival handshake for a user.
    async fn arrive(
        &self,
        domain_url: &str,
        request: &ArriveRequest,
    ) -> Result<ArriveResponse, DomainError>;

    /// Marks a user as departed.
    async fn depart(&self, domain_url: &str, request: &DepartRequest) -> Result<(), DomainError>;

    /// Drops an item where the user stands; returns the domain's location tag.
    async fn dropped(
        &self,
        domain_url: &str,
        request: &DroppedRequest,
    ) -> Result<LocationTag, DomainError>;
}
