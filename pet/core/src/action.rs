//! Action and Background Tables
//!
//! The fixed set of animation identifiers the pet can show, and the fixed set
//! of background scenes it can stand in front of. Nothing outside these two
//! enums can ever reach `PetState`, so an unknown action name is rejected at
//! the parsing boundary instead of deep inside the simulation.
//!
//! Both tables are immutable. Sprite-sheet coordinates live next to the
//! action they describe so surfaces never need a separate lookup map.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Errors
// =============================================================================

/// An action identifier that is not part of the fixed action table
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ActionParseError {
    /// Unknown action name
    #[error("unknown action `{0}`")]
    UnknownAction(String),
}

/// A background index outside the scene table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("background index {0} is out of range (0..{count})", count = Background::ALL.len())]
pub struct BackgroundIndexError(pub usize);

// =============================================================================
// Sprite Regions
// =============================================================================

/// Location of an animation strip on the sprite sheet
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteRegion {
    /// Sheet row
    pub row: u8,
    /// First frame column
    pub start: u8,
    /// Number of frames in the strip
    pub count: u8,
}

impl SpriteRegion {
    const fn new(row: u8, start: u8, count: u8) -> Self {
        Self { row, start, count }
    }
}

// =============================================================================
// Actions
// =============================================================================

/// Every animation the pet (or a composited item) can play
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Idle, health 75-100
    Happy,
    /// Idle, health 50-74
    Middle,
    /// Idle, health 0-24
    Sad,
    /// Idle, health 25-49
    Angry,
    /// Dance, left-leaning loop
    Dance,
    /// Dance, right-leaning loop (also a random-event outcome)
    DanceReverse,
    /// Sleeping
    Sleep,
    /// Eating (paired with a food secondary)
    Eat,
    /// Rice ball secondary
    Oniguri,
    /// Dessert secondary
    Dessert,
    /// Random-event outcome, longest animation
    #[serde(alias = "fustrated")]
    Frustrated,
    /// Terminal state
    Dead,
    /// Poop event animation
    Pooping,
    /// Random-event outcome
    Attention,
    /// Random-event outcome
    Look,
    /// Poop secondary
    Poop,
}

impl Action {
    /// All actions in sprite-sheet order
    pub const ALL: [Action; 16] = [
        Action::Happy,
        Action::Middle,
        Action::Sad,
        Action::Dance,
        Action::Sleep,
        Action::Angry,
        Action::Oniguri,
        Action::Frustrated,
        Action::Eat,
        Action::Dead,
        Action::Dessert,
        Action::Pooping,
        Action::DanceReverse,
        Action::Attention,
        Action::Look,
        Action::Poop,
    ];

    /// Identifier used in save files and by renderers
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Middle => "middle",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Dance => "dance",
            Self::DanceReverse => "dance_reverse",
            Self::Sleep => "sleep",
            Self::Eat => "eat",
            Self::Oniguri => "oniguri",
            Self::Dessert => "dessert",
            Self::Frustrated => "frustrated",
            Self::Dead => "dead",
            Self::Pooping => "pooping",
            Self::Attention => "attention",
            Self::Look => "look",
            Self::Poop => "poop",
        }
    }

    /// Where this animation lives on the sprite sheet
    #[must_use]
    pub fn sprite_region(self) -> SpriteRegion {
        match self {
            Self::Happy => SpriteRegion::new(0, 0, 4),
            Self::Middle => SpriteRegion::new(0, 0, 2),
            Self::Sad => SpriteRegion::new(0, 4, 4),
            Self::Dance => SpriteRegion::new(0, 8, 4),
            Self::Sleep => SpriteRegion::new(1, 0, 4),
            Self::Angry => SpriteRegion::new(1, 4, 4),
            Self::Oniguri => SpriteRegion::new(1, 8, 4),
            Self::Frustrated => SpriteRegion::new(2, 0, 10),
            Self::Eat => SpriteRegion::new(3, 0, 4),
            Self::Dead => SpriteRegion::new(3, 4, 4),
            Self::Dessert => SpriteRegion::new(3, 8, 4),
            Self::Pooping => SpriteRegion::new(4, 0, 4),
            Self::DanceReverse => SpriteRegion::new(4, 4, 4),
            Self::Attention => SpriteRegion::new(5, 0, 4),
            Self::Look => SpriteRegion::new(5, 4, 4),
            Self::Poop => SpriteRegion::new(5, 8, 1),
        }
    }

    /// Whether this action is an item composited beside the pet
    #[must_use]
    pub fn is_item(self) -> bool {
        matches!(self, Self::Oniguri | Self::Dessert | Self::Poop)
    }

    /// Food is drawn on the left of the pet, everything else on the right
    #[must_use]
    pub fn is_food(self) -> bool {
        matches!(self, Self::Oniguri | Self::Dessert)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Older save files carry the sheet's original spelling
        if s == "fustrated" {
            return Ok(Self::Frustrated);
        }
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ActionParseError::UnknownAction(s.to_string()))
    }
}

// =============================================================================
// Backgrounds
// =============================================================================

/// Background scenes, in persisted index order
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    /// Indoor morning
    #[default]
    Morning,
    /// Clear sky
    Heavenly,
    /// Rain
    Rainy,
    /// Indoor sunset
    Sunset,
    /// Indoor night
    Night,
    /// Outdoor day
    Outside,
    /// Outdoor sunset
    SunsetOutside,
    /// Outdoor night
    NightOutside,
}

impl Background {
    /// All scenes in index order
    pub const ALL: [Background; 8] = [
        Background::Morning,
        Background::Heavenly,
        Background::Rainy,
        Background::Sunset,
        Background::Night,
        Background::Outside,
        Background::SunsetOutside,
        Background::NightOutside,
    ];

    /// Look up a scene by its persisted index
    pub fn from_index(index: usize) -> Result<Self, BackgroundIndexError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(BackgroundIndexError(index))
    }

    /// Persisted index of this scene
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Next scene, wrapping after the last one
    #[must_use]
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Outdoor scenes get the outdoor night variant when the pet sleeps
    #[must_use]
    pub fn is_outdoor(self) -> bool {
        matches!(
            self,
            Self::Outside | Self::SunsetOutside | Self::NightOutside
        )
    }

    /// Night scene used while sleeping in front of this one
    #[must_use]
    pub fn night_variant(self) -> Self {
        if self.is_outdoor() {
            Self::NightOutside
        } else {
            Self::Night
        }
    }

    /// Identifier used by renderers and logs
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Heavenly => "heavenly",
            Self::Rainy => "rainy",
            Self::Sunset => "sunset",
            Self::Night => "night",
            Self::Outside => "outside",
            Self::SunsetOutside => "sunset_outside",
            Self::NightOutside => "night_outside",
        }
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Tests
// =============================================================================
