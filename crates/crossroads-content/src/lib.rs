//! Crossroads — content packs.
//!
//! A content pack is everything that makes one domain different from
//! another: its rooms, exits, fixtures, items and the table deciding which
//! room hosts prizes of each tier. The hub's simulated "other domains" are a
//! second, much smaller kind of pack. Packs are YAML documents validated on
//! load; the built-in ones are compiled into the binary.

pub mod expedition;
pub mod pack;

use thiserror::Error;

pub use expedition::{ExpeditionPack, Scenario};
pub use pack::{DomainPack, ExitSpec, PackItem, PuzzleSpec, PuzzleTexts, RoomSpec};

/// Errors raised while loading a content pack.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The pack file could not be read.
    #[error("could not read content pack: {0}")]
    Io(#[from] std::io::Error),

    /// The pack is not valid YAML for the expected schema.
    #[error("could not parse content pack: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The pack parsed but is internally inconsistent.
    #[error("invalid content pack: {0}")]
    Invalid(String),
}
