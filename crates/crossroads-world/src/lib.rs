//! Crossroads — Domain server bounded context.
//!
//! A domain server owns a room graph, per-user sessions over that graph and
//! the command interpreter players talk to. Custody changes always go
//! through the hub; this crate only mirrors what the hub has confirmed.

pub mod application;
pub mod domain;
