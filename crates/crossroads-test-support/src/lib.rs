//! Shared test mocks and utilities for the Crossroads servers.

mod clients;
mod rng;

pub use clients::{
    FailingDomainClient, FailingHubClient, RecordingDomainClient, RecordingHubClient,
};
pub use rng::{MockRng, SequenceRng};
