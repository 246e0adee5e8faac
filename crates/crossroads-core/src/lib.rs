//! Crossroads Core — shared protocol vocabulary.
//!
//! This crate defines the identifiers, wire records, error taxonomy and
//! remote-call seams that both the hub and the domain servers depend on.
//! It contains no infrastructure code.

pub mod client;
pub mod command;
pub mod error;
pub mod ids;
pub mod item;
pub mod protocol;
pub mod rng;
pub mod secret;
