//! Crossroads — HTTP clients for cross-server calls.
//!
//! `RemoteClient` implements both `HubClient` (domain → hub) and
//! `DomainClient` (hub → domain) over `reqwest`, with one timeout applied to
//! every request. Non-success statuses come back as the matching
//! `DomainError` so a caller can relay them unchanged.

pub mod client;
pub mod error;

pub use client::RemoteClient;
pub use error::ClientError;
