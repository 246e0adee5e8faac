//! Route modules, one per server.

pub mod health;
pub mod hub;
pub mod world;
