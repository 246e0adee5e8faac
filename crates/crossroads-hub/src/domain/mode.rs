//! The hub's setup/play mode machine.

use std::fmt;

use crossroads_core::error::DomainError;

/// Global hub mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Domains may register; nobody may log in.
    Setup,
    /// Transient state while loot is being assigned; everything is refused.
    Locked,
    /// Users may log in and play; registration is closed.
    Play,
}

impl Mode {
    /// Parses a mode a client may ask for. `locked` is internal only.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for anything but `setup` or `play`.
    pub fn requested(name: &str) -> Result<Self, DomainError> {
        match name {
            "setup" => Ok(Self::Setup),
            "play" => Ok(Self::Play),
            other => Err(DomainError::Validation(format!("Unknown mode {other:?}"))),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Locked => "locked",
            Self::Play => "play",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a mode request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeChange {
    Unchanged(Mode),
    Changed(Mode),
}

impl ModeChange {
    /// Acknowledgement text for the requesting client.
    #[must_use]
    pub fn message(self) -> String {
        match self {
            Self::Unchanged(mode) => format!("Already in {mode} mode"),
            Self::Changed(mode) => format!("Now in {mode} mode"),
        }
    }
}
