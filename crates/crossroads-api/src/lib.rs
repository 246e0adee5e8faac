//! Crossroads — HTTP surface for the hub and domain servers.
//!
//! The library half holds everything the two binaries share, so the
//! integration tests can build the same routers in-process.

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
