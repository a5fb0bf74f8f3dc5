//! Sprite Definitions
//!
//! Blocky pixel art using Unicode block elements and colors.
//! Each cell has its own foreground color, and optionally a background so
//! facial features can sit on skin instead of on the scene.

use std::collections::HashMap;

use ratatui::style::Color;

use sekitoritchi_core::Action;

/// A single colored cell in a sprite
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColoredCell {
    /// The character to display
    pub ch: char,
    /// Foreground color
    pub fg: Color,
    /// Background color (`Reset` keeps whatever is underneath)
    pub bg: Color,
}

impl ColoredCell {
    /// Create a new colored cell
    pub const fn new(ch: char, fg: Color, bg: Color) -> Self {
        Self { ch, fg, bg }
    }

    /// Empty/transparent cell
    pub const fn empty() -> Self {
        Self {
            ch: ' ',
            fg: Color::Reset,
            bg: Color::Reset,
        }
    }

    /// Check if cell is empty/transparent
    pub fn is_empty(&self) -> bool {
        self.ch == ' '
    }
}

/// A single animation frame with per-cell coloring
#[derive(Clone, Debug)]
pub struct Frame {
    /// 2D grid of colored cells (row-major)
    pub cells: Vec<Vec<ColoredCell>>,
    /// Width in terminal cells
    pub width: u16,
    /// Height in terminal cells
    pub height: u16,
}

impl Frame {
    /// Create a frame from a grid of colored cells
    pub fn new(cells: Vec<Vec<ColoredCell>>) -> Self {
        let height = u16::try_from(cells.len()).unwrap_or(u16::MAX);
        let width = cells
            .iter()
            .map(|row| u16::try_from(row.len()).unwrap_or(u16::MAX))
            .max()
            .unwrap_or(0);

        Self {
            cells,
            width,
            height,
        }
    }

    /// Get cell at position (returns empty if out of bounds)
    pub fn get(&self, x: u16, y: u16) -> &ColoredCell {
        static EMPTY: ColoredCell = ColoredCell::empty();
        self.cells
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .unwrap_or(&EMPTY)
    }
}

/// An animation sequence
#[derive(Clone, Debug)]
pub struct Animation {
    /// Frames in sequence (always looped)
    pub frames: Vec<Frame>,
}

impl Animation {
    /// Frame `index`, wrapping around
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        if self.frames.is_empty() {
            return None;
        }
        self.frames.get(index % self.frames.len())
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether there is nothing to show
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Every animation, by action
pub struct SpriteSheet {
    /// Animations by action
    pub animations: HashMap<Action, Animation>,
}

impl SpriteSheet {
    /// Get the animation for an action
    pub fn get(&self, action: Action) -> Option<&Animation> {
        self.animations.get(&action)
    }
}

// ============================================================================
// Sprite Builder Helpers
// ============================================================================

/// One palette entry: pattern key, glyph, foreground, background
pub type PaletteEntry = (char, char, Color, Color);

/// Parse a sprite definition using a color map
///
/// Format: each character in the pattern maps to a glyph and colours in the
/// palette. Special: ' ' (space) is always transparent.
///
/// Example:
/// ```ignore
/// let palette = [('S', '█', SKIN, Color::Reset), ('e', 'o', FACE, SKIN)];
/// let pattern = [
///     "  SSS  ",
///     " SeSeS ",
///     "  SSS  ",
/// ];
/// ```
pub fn build_frame(pattern: &[&str], palette: &[PaletteEntry]) -> Frame {
    let color_map: HashMap<char, (char, Color, Color)> = palette
        .iter()
        .map(|&(key, ch, fg, bg)| (key, (ch, fg, bg)))
        .collect();

    let cells: Vec<Vec<ColoredCell>> = pattern
        .iter()
        .map(|line| {
            line.chars()
                .map(|c| {
                    if c == ' ' {
                        ColoredCell::empty()
                    } else if let Some(&(ch, fg, bg)) = color_map.get(&c) {
                        ColoredCell::new(ch, fg, bg)
                    } else {
                        // Unknown char - show as-is in default color
                        ColoredCell::new(c, Color::Reset, Color::Reset)
                    }
                })
                .collect()
        })
        .collect();

    Frame::new(cells)
}

/// Build an animation from several patterns sharing one palette
pub fn build_animation(patterns: &[&[&str]], palette: &[PaletteEntry]) -> Animation {
    Animation {
        frames: patterns
            .iter()
            .map(|pattern| build_frame(pattern, palette))
            .collect(),
    }
}
