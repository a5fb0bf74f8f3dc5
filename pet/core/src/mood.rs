//! Mood Derivation
//!
//! Mood is never chosen, only derived: health picks a band, death overrides
//! everything. The idle animation follows directly from the mood.

use serde::{Deserialize, Serialize};

use crate::action::Action;

/// Derived classification of the pet's well-being
///
/// The numeric codes are what the save file stores in its `mood` field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodCode {
    /// Health 75-100
    #[default]
    Happy = 0,
    /// Health 50-74
    Middle = 1,
    /// Health 25-49
    Angry = 2,
    /// Health 0-24
    Sad = 3,
    /// Not alive
    Dead = 4,
}

impl MoodCode {
    /// Derive the mood from current health and liveness
    #[must_use]
    pub fn derive(health: i32, alive: bool) -> Self {
        if !alive {
            return Self::Dead;
        }
        match health {
            75.. => Self::Happy,
            50..=74 => Self::Middle,
            25..=49 => Self::Angry,
            _ => Self::Sad,
        }
    }

    /// The animation shown while nothing else is playing
    #[must_use]
    pub fn idle_action(self) -> Action {
        match self {
            Self::Happy => Action::Happy,
            Self::Middle => Action::Middle,
            Self::Angry => Action::Angry,
            Self::Sad => Action::Sad,
            Self::Dead => Action::Dead,
        }
    }

    /// Numeric code written to the save file
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Short label for status lines
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Middle => "okay",
            Self::Angry => "grumpy",
            Self::Sad => "sad",
            Self::Dead => "dead",
        }
    }
}
