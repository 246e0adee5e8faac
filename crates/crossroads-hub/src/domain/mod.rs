//! Hub model: registries, templates, custody rules and the mode machine.

pub mod aggregates;
pub mod commands;
pub mod custody;
pub mod expedition;
pub mod mode;
pub mod templates;
