//! Theme and Colors
//!
//! Sekitoritchi's palette - designed for blocky pixel art on a 256-colour
//! or truecolor terminal.
//!
//! The wrestler uses warm skin tones, a black topknot and an indigo
//! mawashi. Scenes get a sky, a floor and one accent each.

use ratatui::style::Color;

use sekitoritchi_core::{Background, MoodCode};

// ============================================================================
// Wrestler Palette
// ============================================================================

/// Skin - warm peach (main color)
pub const SKIN: Color = Color::Rgb(246, 196, 160);

/// Skin when angry - flushed
pub const SKIN_FLUSHED: Color = Color::Rgb(240, 140, 120);

/// Skin when sad - a little pale
pub const SKIN_PALE: Color = Color::Rgb(220, 200, 185);

/// Skin once the pet has died
pub const SKIN_GHOST: Color = Color::Rgb(170, 170, 180);

/// Topknot
pub const HAIR: Color = Color::Rgb(30, 30, 35);

/// Mawashi (belt)
pub const MAWASHI: Color = Color::Rgb(60, 60, 140);

/// Eyes and mouth
pub const FACE: Color = Color::Rgb(40, 30, 30);

// ============================================================================
// Item Palette
// ============================================================================

/// Rice
pub const RICE: Color = Color::Rgb(250, 250, 245);

/// Nori wrap
pub const NORI: Color = Color::Rgb(30, 70, 40);

/// Dango, pink ball
pub const DANGO_PINK: Color = Color::Rgb(250, 170, 190);

/// Dango, green ball
pub const DANGO_GREEN: Color = Color::Rgb(150, 200, 120);

/// Skewer
pub const SKEWER: Color = Color::Rgb(180, 140, 90);

/// Poop
pub const POOP: Color = Color::Rgb(120, 80, 40);

/// Stink lines
pub const STINK: Color = Color::Rgb(160, 190, 90);

// ============================================================================
// UI Colors
// ============================================================================

/// Name and accents
pub const ACCENT: Color = Color::Rgb(230, 90, 60);

/// System/dim text
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Rejections and warnings
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Confirmations
pub const SUCCESS_GREEN: Color = Color::Rgb(120, 230, 120);

/// Health bar fill
pub const HEALTH_FILL: Color = Color::Rgb(220, 60, 80);

/// Colour for a mood label
pub fn mood_color(mood: MoodCode) -> Color {
    match mood {
        MoodCode::Happy => Color::Rgb(255, 223, 128),
        MoodCode::Middle => Color::Rgb(200, 200, 200),
        MoodCode::Angry => ERROR_RED,
        MoodCode::Sad => Color::Rgb(150, 180, 255),
        MoodCode::Dead => DIM_GRAY,
    }
}

// ============================================================================
// Scene Palettes
// ============================================================================

/// What sits in the sky of a scene
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accent {
    /// A sun disc
    Sun,
    /// A crescent and scattered stars
    Moon,
    /// Falling drops
    Rain,
    /// Drifting clouds
    Clouds,
}

/// Colours for one background
#[derive(Clone, Copy, Debug)]
pub struct ScenePalette {
    /// Upper part of the sky
    pub sky_top: Color,
    /// Sky near the horizon
    pub sky_low: Color,
    /// Floor (tatami indoors, grass outdoors)
    pub ground: Color,
    /// Accent in the sky
    pub accent: Accent,
    /// Accent colour
    pub accent_color: Color,
}

/// Palette for a background
pub fn scene_palette(background: Background) -> ScenePalette {
    let tatami = Color::Rgb(196, 180, 120);
    let grass = Color::Rgb(90, 150, 70);
    let night_grass = Color::Rgb(30, 60, 40);

    match background {
        Background::Morning => ScenePalette {
            sky_top: Color::Rgb(150, 200, 240),
            sky_low: Color::Rgb(200, 225, 245),
            ground: tatami,
            accent: Accent::Sun,
            accent_color: Color::Rgb(255, 230, 120),
        },
        Background::Heavenly => ScenePalette {
            sky_top: Color::Rgb(200, 215, 255),
            sky_low: Color::Rgb(245, 235, 255),
            ground: Color::Rgb(235, 230, 240),
            accent: Accent::Clouds,
            accent_color: Color::Rgb(255, 255, 255),
        },
        Background::Rainy => ScenePalette {
            sky_top: Color::Rgb(90, 100, 115),
            sky_low: Color::Rgb(120, 130, 140),
            ground: Color::Rgb(150, 140, 100),
            accent: Accent::Rain,
            accent_color: Color::Rgb(170, 200, 240),
        },
        Background::Sunset => ScenePalette {
            sky_top: Color::Rgb(200, 100, 120),
            sky_low: Color::Rgb(250, 160, 90),
            ground: tatami,
            accent: Accent::Sun,
            accent_color: Color::Rgb(255, 120, 60),
        },
        Background::Night => ScenePalette {
            sky_top: Color::Rgb(15, 20, 50),
            sky_low: Color::Rgb(35, 40, 80),
            ground: Color::Rgb(90, 80, 60),
            accent: Accent::Moon,
            accent_color: Color::Rgb(250, 240, 190),
        },
        Background::Outside => ScenePalette {
            sky_top: Color::Rgb(90, 160, 230),
            sky_low: Color::Rgb(170, 210, 240),
            ground: grass,
            accent: Accent::Clouds,
            accent_color: Color::Rgb(255, 255, 255),
        },
        Background::SunsetOutside => ScenePalette {
            sky_top: Color::Rgb(180, 90, 130),
            sky_low: Color::Rgb(245, 150, 80),
            ground: Color::Rgb(110, 120, 60),
            accent: Accent::Sun,
            accent_color: Color::Rgb(255, 120, 60),
        },
        Background::NightOutside => ScenePalette {
            sky_top: Color::Rgb(10, 15, 40),
            sky_low: Color::Rgb(25, 35, 70),
            ground: night_grass,
            accent: Accent::Moon,
            accent_color: Color::Rgb(250, 240, 190),
        },
    }
}
