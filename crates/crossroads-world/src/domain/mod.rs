//! Domain server model: rooms, fixtures, sessions and the interpreter.

pub mod aggregates;
pub mod commands;
pub mod fixtures;
pub mod grammar;
pub mod interpreter;
pub mod rooms;
pub mod session;
