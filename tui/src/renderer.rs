//! Terminal Renderer
//!
//! Implements the core [`Renderer`] seam with text cells: paints the scene,
//! stands the wrestler on the floor, and puts the item beside him (food on
//! the left, poop on the right). Every call returns the whole loop of
//! frames so the player can cycle them without asking again.

use std::time::Duration;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;

use sekitoritchi_core::{Action, Background, Renderer};

use crate::avatar::{load_sheet, Frame, SpriteSheet};
use crate::theme::{scene_palette, Accent, ScenePalette};

/// Time each frame stays on screen
pub const FRAME_DURATION: Duration = Duration::from_millis(100);

/// Gap between the pet and an item
const ITEM_GAP: i32 = 2;

/// A rendered loop of frames
#[derive(Clone, Debug)]
pub struct SceneFrames {
    /// Frames in order, each covering the whole scene area
    pub frames: Vec<Buffer>,
    /// Time each frame stays up
    pub frame_duration: Duration,
}

/// Text-cell renderer for one scene area
pub struct TerminalRenderer {
    sheet: SpriteSheet,
    width: u16,
    height: u16,
}

impl TerminalRenderer {
    /// Renderer for a `width` x `height` scene
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            sheet: load_sheet(),
            width,
            height,
        }
    }

    /// Change the scene size
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    /// Current scene size
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn area(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    fn horizon(&self) -> u16 {
        self.height.saturating_mul(2) / 3
    }
}

impl Renderer for TerminalRenderer {
    type Surface = SceneFrames;

    fn render_frame(
        &mut self,
        action: Action,
        background: Background,
        secondary: Option<Action>,
    ) -> SceneFrames {
        let palette = scene_palette(background);
        let pet = self.sheet.get(action);
        let item = secondary.and_then(|s| self.sheet.get(s).map(|a| (s, a)));

        let count = pet
            .map_or(1, |a| a.len())
            .max(item.map_or(1, |(_, a)| a.len()))
            .max(1);

        let (w, h) = (i32::from(self.width), i32::from(self.height));
        let floor = h - 1;

        let frames = (0..count)
            .map(|i| {
                let mut buf = Buffer::empty(self.area());
                paint_scene(&mut buf, &palette, self.horizon(), i);

                let mut pet_x = w / 2;
                let mut pet_w = 0;
                if let Some(frame) = pet.and_then(|a| a.frame(i)) {
                    pet_w = i32::from(frame.width);
                    pet_x = (w - pet_w) / 2;
                    let y = floor - i32::from(frame.height) + 1;
                    draw_sprite(&mut buf, frame, pet_x, y);
                }

                if let Some((kind, anim)) = item {
                    if let Some(frame) = anim.frame(i) {
                        let fw = i32::from(frame.width);
                        let x = if kind.is_food() {
                            pet_x - ITEM_GAP - fw
                        } else {
                            pet_x + pet_w + ITEM_GAP
                        };
                        let y = floor - i32::from(frame.height) + 1;
                        draw_sprite(&mut buf, frame, x, y);
                    }
                }
                buf
            })
            .collect();

        SceneFrames {
            frames,
            frame_duration: FRAME_DURATION,
        }
    }
}

/// Paint sky, accent and floor
fn paint_scene(buf: &mut Buffer, palette: &ScenePalette, horizon: u16, tick: usize) {
    let area = buf.area;
    let mid_sky = horizon / 2;

    for y in 0..area.height {
        for x in 0..area.width {
            let cell = &mut buf[(x, y)];
            if y < horizon {
                let sky = if y < mid_sky {
                    palette.sky_top
                } else {
                    palette.sky_low
                };
                cell.set_char(' ').set_bg(sky);
            } else {
                let texture = (usize::from(x) * 7 + usize::from(y) * 3) % 11 == 0;
                cell.set_char(if texture { ',' } else { ' ' })
                    .set_fg(darken(palette.ground))
                    .set_bg(palette.ground);
            }
        }
    }

    let accent_x = area.width.saturating_mul(3) / 4;
    match palette.accent {
        Accent::Sun => {
            put_str(buf, accent_x, 1, "▄██▄", palette.accent_color, horizon);
            put_str(buf, accent_x, 2, "▀██▀", palette.accent_color, horizon);
        }
        Accent::Moon => {
            for y in 0..horizon {
                for x in 0..area.width {
                    if (usize::from(x) * 13 + usize::from(y) * 7) % 29 == 0 {
                        put_str(buf, x, y, "·", Color::White, horizon);
                    }
                }
            }
            put_str(buf, accent_x, 1, "☾", palette.accent_color, horizon);
        }
        Accent::Rain => {
            for y in 0..horizon {
                for x in 0..area.width {
                    if (usize::from(x) + usize::from(y) * 3 + tick) % 7 == 0 {
                        put_str(buf, x, y, "╷", palette.accent_color, horizon);
                    }
                }
            }
        }
        Accent::Clouds => {
            put_str(buf, area.width / 5, 1, "▄███▄", palette.accent_color, horizon);
            put_str(buf, area.width.saturating_mul(3) / 5, 2, "▄██▄", palette.accent_color, horizon);
        }
    }
}

/// Write text in the sky, keeping each cell's background
fn put_str(buf: &mut Buffer, x: u16, y: u16, text: &str, fg: Color, horizon: u16) {
    if y >= horizon {
        return;
    }
    let area = buf.area;
    for (i, ch) in text.chars().enumerate() {
        let Ok(offset) = u16::try_from(i) else {
            break;
        };
        let cx = x.saturating_add(offset);
        if cx >= area.width || y >= area.height {
            break;
        }
        buf[(cx, y)].set_char(ch).set_fg(fg);
    }
}

/// Draw a sprite with its top-left at (`x`, `y`), clipping to the buffer
fn draw_sprite(buf: &mut Buffer, frame: &Frame, x: i32, y: i32) {
    let area = buf.area;
    for (row_idx, row) in frame.cells.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            let (Ok(dx), Ok(dy)) = (
                u16::try_from(x + col_idx as i32),
                u16::try_from(y + row_idx as i32),
            ) else {
                continue;
            };
            if dx >= area.width || dy >= area.height {
                continue;
            }
            let target = &mut buf[(dx, dy)];
            target.set_char(cell.ch).set_fg(cell.fg);
            if cell.bg != Color::Reset {
                target.set_bg(cell.bg);
            }
        }
    }
}

fn darken(color: Color) -> Color {
    match color {
        Color::Rgb(r, g, b) => Color::Rgb(r / 4 * 3, g / 4 * 3, b / 4 * 3),
        other => other,
    }
}
