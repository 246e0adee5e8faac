//! Puzzle fixtures: container, switch and display state machines.
//!
//! Every transition lives here. The interpreter only decides which
//! transition a command asks for and renders the outcome.

use crossroads_content::pack::{PuzzleSpec, PuzzleTexts};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Locked,
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchState {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Blank,
    Prompt,
    Solved,
}

impl DisplayState {
    /// The display follows the switch, except that a solved display stays
    /// solved.
    #[must_use]
    pub fn powered(self, on: bool) -> Self {
        match (self, on) {
            (Self::Solved, _) => Self::Solved,
            (_, true) => Self::Prompt,
            (_, false) => Self::Blank,
        }
    }
}

/// Result of a fixture command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureOutcome {
    Opened,
    AlreadyOpen,
    OpenLocked,
    Closed,
    AlreadyClosed,
    Unlocked,
    Locked,
    MissingKey,
    SwitchRaised,
    SwitchLowered,
    PasswordAccepted,
    PasswordRejected(String),
    /// The command means nothing in the fixtures' current state.
    NotApplicable,
}

impl FixtureOutcome {
    /// The narrative line for this outcome, if it has one.
    #[must_use]
    pub fn text(&self, texts: &PuzzleTexts) -> Option<String> {
        let text = match self {
            Self::Opened => &texts.opened,
            Self::AlreadyOpen => &texts.already_open,
            Self::OpenLocked => &texts.open_locked,
            Self::Closed => &texts.closed,
            Self::AlreadyClosed => &texts.already_closed,
            Self::Unlocked => &texts.unlocked,
            Self::Locked => &texts.locked,
            Self::MissingKey => &texts.missing_key,
            Self::SwitchRaised => &texts.switch_raised,
            Self::SwitchLowered => &texts.switch_lowered,
            Self::PasswordAccepted => &texts.password_accepted,
            Self::PasswordRejected(word) => {
                return Some(texts.password_rejected.replace("{word}", word));
            }
            Self::NotApplicable => return None,
        };
        Some(text.clone())
    }
}

/// Live state of one room's fixture set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleState {
    pub container: ContainerState,
    pub switch: SwitchState,
    pub display: DisplayState,
    /// Tier of the items the container exposes when open.
    pub tier: u32,
}

impl PuzzleState {
    /// Initial state: locked, switched off, blank.
    #[must_use]
    pub fn new(spec: &PuzzleSpec) -> Self {
        Self {
            container: ContainerState::Locked,
            switch: SwitchState::Down,
            display: DisplayState::Blank,
            tier: spec.tier,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.container == ContainerState::Open
    }

    pub fn open(&mut self) -> FixtureOutcome {
        match self.container {
            ContainerState::Locked => FixtureOutcome::OpenLocked,
            ContainerState::Closed => {
                self.container = ContainerState::Open;
                FixtureOutcome::Opened
            }
            ContainerState::Open => FixtureOutcome::AlreadyOpen,
        }
    }

    pub fn close(&mut self) -> FixtureOutcome {
        match self.container {
            ContainerState::Open => {
                self.container = ContainerState::Closed;
                FixtureOutcome::Closed
            }
            ContainerState::Locked | ContainerState::Closed => FixtureOutcome::AlreadyClosed,
        }
    }

    /// `use <key> <container>`: toggles the lock of a shut container.
    pub fn turn_key(&mut self, holding_key: bool) -> FixtureOutcome {
        if !holding_key {
            return FixtureOutcome::MissingKey;
        }
        match self.container {
            ContainerState::Locked => {
                self.container = ContainerState::Closed;
                FixtureOutcome::Unlocked
            }
            ContainerState::Closed => {
                self.container = ContainerState::Locked;
                FixtureOutcome::Locked
            }
            ContainerState::Open => FixtureOutcome::NotApplicable,
        }
    }

    /// `use <switch>`: only reachable with the container open.
    pub fn flip_switch(&mut self) -> FixtureOutcome {
        if !self.is_open() {
            return FixtureOutcome::NotApplicable;
        }
        let (switch, outcome) = match self.switch {
            SwitchState::Down => (SwitchState::Up, FixtureOutcome::SwitchRaised),
            SwitchState::Up => (SwitchState::Down, FixtureOutcome::SwitchLowered),
        };
        self.switch = switch;
        self.display = self.display.powered(switch == SwitchState::Up);
        outcome
    }

    /// `tell <display> <word>`: only meaningful at the prompt.
    pub fn tell(&mut self, word: &str, password: &str) -> FixtureOutcome {
        if self.display != DisplayState::Prompt {
            return FixtureOutcome::NotApplicable;
        }
        if word == password {
            self.display = DisplayState::Solved;
            FixtureOutcome::PasswordAccepted
        } else {
            FixtureOutcome::PasswordRejected(word.to_owned())
        }
    }

    /// Description of the container for `look <container>`, without contents.
    #[must_use]
    pub fn container_text<'a>(&self, texts: &'a PuzzleTexts) -> &'a str {
        if self.is_open() {
            &texts.container_open
        } else {
            &texts.container_shut
        }
    }

    /// Description of the switch, visible only with the container open.
    #[must_use]
    pub fn switch_text<'a>(&self, texts: &'a PuzzleTexts) -> Option<&'a str> {
        if !self.is_open() {
            return None;
        }
        Some(match self.switch {
            SwitchState::Up => &texts.switch_up,
            SwitchState::Down => &texts.switch_down,
        })
    }

    #[must_use]
    pub fn display_text<'a>(&self, texts: &'a PuzzleTexts) -> &'a str {
        match self.display {
            DisplayState::Blank => &texts.display_blank,
            DisplayState::Prompt => &texts.display_prompt,
            DisplayState::Solved => &texts.display_solved,
        }
    }
}
