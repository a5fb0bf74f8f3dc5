//! Sekitoritchi's Sprite Sheet
//!
//! Every action is a loop of poses. The number of frames in each loop comes
//! from the action's sprite region, so the terminal plays the same rhythm a
//! bitmap sheet would. Faces and skin tone change per action; the poses are
//! shared.
//!
//! Pattern keys:
//!
//! ```text
//!   H  topknot        S  skin          B  mawashi
//!   e  eye (on skin)  m  mouth (on skin)
//!   z  sleep bubble   x  sweat / anger mark
//! ```

use std::collections::HashMap;

use ratatui::style::Color;

use sekitoritchi_core::Action;

use super::sprites::{build_animation, build_frame, Animation, Frame, PaletteEntry, SpriteSheet};
use crate::theme::{
    DANGO_GREEN, DANGO_PINK, FACE, HAIR, MAWASHI, NORI, POOP, RICE, SKEWER, SKIN, SKIN_FLUSHED,
    SKIN_GHOST, SKIN_PALE, STINK,
};

// ============================================================================
// Poses (9 x 7)
// ============================================================================

const STAND: &[&str] = &[
    "   HHH   ",
    "  SSSSS  ",
    "  SeSeS  ",
    "  SSmSS  ",
    " SSSSSSS ",
    " SSBBBSS ",
    "  SS SS  ",
];

const BOUNCE: &[&str] = &[
    "         ",
    "   HHH   ",
    "  SSSSS  ",
    "  SeSeS  ",
    "S SSmSS S",
    " SSBBBSS ",
    "  SS SS  ",
];

const ARMS_UP: &[&str] = &[
    "S  HHH  S",
    "S SSSSS S",
    " SSeSeSS ",
    "  SSmSS  ",
    "  SSSSS  ",
    "  SBBBS  ",
    " SS   SS ",
];

const LEAN_LEFT: &[&str] = &[
    "  HHH    ",
    " SSSSS   ",
    " SeSeS   ",
    " SSmSS S ",
    "SSSSSSSS ",
    " SSBBBSS ",
    "  SS  SS ",
];

const LEAN_RIGHT: &[&str] = &[
    "    HHH  ",
    "   SSSSS ",
    "   SeSeS ",
    " S SSmSS ",
    " SSSSSSSS",
    " SSBBBSS ",
    " SS  SS  ",
];

const SQUAT: &[&str] = &[
    "         ",
    "   HHH   ",
    "  SSSSS  ",
    "  SeSeS  ",
    " SSSmSSS ",
    "SSSBBBSSS",
    " SS   SS ",
];

const SLUMP: &[&str] = &[
    "         ",
    "   HHH   ",
    "  SSSSS  ",
    "  SeSeS  ",
    "  SSmSS  ",
    " SSSSSSS ",
    " SSBBBSS ",
];

const STOMP: &[&str] = &[
    "   HHH x ",
    "  SSSSS  ",
    "  SeSeS  ",
    "S SSmSS S",
    "SSSSSSSSS",
    " SSBBBSS ",
    " SS    SS",
];

const LYING: &[&str] = &[
    "         ",
    "         ",
    "         ",
    "         ",
    " SSSSSS  ",
    "HSeSBBBSS",
    " SmSSSSS ",
];

const SNOOZE_A: &[&str] = &[
    "         ",
    "      z  ",
    "    z    ",
    "         ",
    " SSSSSS  ",
    "HSeSBBBSS",
    " SmSSSSS ",
];

const SNOOZE_B: &[&str] = &[
    "       z ",
    "     z   ",
    "         ",
    "         ",
    " SSSSSS  ",
    "HSeSBBBSS",
    " SmSSSSS ",
];

const PEEK: &[&str] = &[
    "   HHH  x",
    "  SSSSS  ",
    "  SeSeS  ",
    "  SSmSS S",
    " SSSSSSS ",
    " SSBBBSS ",
    "  SS SS  ",
];

// ============================================================================
// Items (3 x 3)
// ============================================================================

const ONIGURI: &[&[&str]] = &[
    &[" W ", "WWW", "WNW"],
    &[" W ", "WW ", "WN "],
    &["   ", "W  ", "WN "],
    &["   ", "   ", " . "],
];

const DESSERT: &[&[&str]] = &[
    &["P", "W", "G", "k"],
    &[" ", "W", "G", "k"],
    &[" ", " ", "G", "k"],
    &[" ", " ", " ", "k"],
];

const POOP_PILE: &[&[&str]] = &[&[" ~ ", " o ", "ooo"]];

// ============================================================================
// Faces
// ============================================================================

/// Eye and mouth glyphs plus skin tone for an action
fn face(action: Action) -> (char, char, Color) {
    match action {
        Action::Happy | Action::Dance | Action::DanceReverse => ('^', 'v', SKIN),
        Action::Middle | Action::Look => ('o', '-', SKIN),
        Action::Sad => (';', 'n', SKIN_PALE),
        Action::Angry | Action::Frustrated => ('>', 'A', SKIN_FLUSHED),
        Action::Sleep => ('-', 'o', SKIN),
        Action::Eat => ('^', 'O', SKIN),
        Action::Pooping => ('>', '~', SKIN_FLUSHED),
        Action::Attention => ('O', 'o', SKIN),
        Action::Dead => ('x', '_', SKIN_GHOST),
        Action::Oniguri | Action::Dessert | Action::Poop => ('o', '-', SKIN),
    }
}

/// Poses an action cycles through
fn poses(action: Action) -> &'static [&'static [&'static str]] {
    match action {
        Action::Happy => &[STAND, BOUNCE],
        Action::Middle => &[STAND],
        Action::Sad => &[SLUMP],
        Action::Angry => &[STAND, STOMP],
        Action::Dance => &[ARMS_UP, LEAN_LEFT, ARMS_UP, LEAN_RIGHT],
        Action::DanceReverse => &[ARMS_UP, LEAN_RIGHT, ARMS_UP, LEAN_LEFT],
        Action::Sleep => &[SNOOZE_A, SNOOZE_B],
        Action::Eat => &[SQUAT, STAND],
        Action::Frustrated => &[STOMP, STAND, STOMP, SQUAT],
        Action::Dead => &[LYING],
        Action::Pooping => &[SQUAT, SLUMP],
        Action::Attention => &[ARMS_UP, PEEK],
        Action::Look => &[LEAN_LEFT, STAND, LEAN_RIGHT, STAND],
        Action::Oniguri | Action::Dessert | Action::Poop => &[STAND],
    }
}

fn pet_palette(action: Action) -> Vec<PaletteEntry> {
    let (eye, mouth, skin) = face(action);
    vec![
        ('H', '█', HAIR, Color::Reset),
        ('S', '█', skin, Color::Reset),
        ('B', '█', MAWASHI, Color::Reset),
        ('e', eye, FACE, skin),
        ('m', mouth, FACE, skin),
        ('z', 'z', Color::White, Color::Reset),
        ('x', '#', Color::Rgb(255, 90, 90), Color::Reset),
    ]
}

fn item_palette() -> Vec<PaletteEntry> {
    vec![
        ('W', '█', RICE, Color::Reset),
        ('N', '█', NORI, Color::Reset),
        ('P', '●', DANGO_PINK, Color::Reset),
        ('G', '●', DANGO_GREEN, Color::Reset),
        ('k', '|', SKEWER, Color::Reset),
        ('o', '█', POOP, Color::Reset),
        ('~', '~', STINK, Color::Reset),
        ('.', '.', RICE, Color::Reset),
    ]
}

fn pet_animation(action: Action) -> Animation {
    let palette = pet_palette(action);
    let cycle = poses(action);
    let count = usize::from(action.sprite_region().count.max(1));
    let frames: Vec<Frame> = (0..count)
        .map(|i| build_frame(cycle[i % cycle.len()], &palette))
        .collect();
    Animation { frames }
}

fn item_animation(action: Action) -> Animation {
    let patterns = match action {
        Action::Oniguri => ONIGURI,
        Action::Dessert => DESSERT,
        _ => POOP_PILE,
    };
    build_animation(patterns, &item_palette())
}

/// Build the sheet for every action
pub fn load_sheet() -> SpriteSheet {
    let animations: HashMap<Action, Animation> = Action::ALL
        .into_iter()
        .map(|action| {
            let animation = if action.is_item() {
                item_animation(action)
            } else {
                pet_animation(action)
            };
            (action, animation)
        })
        .collect();
    SpriteSheet { animations }
}
