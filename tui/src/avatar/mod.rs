//! Avatar System
//!
//! The wrestler on screen. It expresses the pet's state through:
//! - Blocky pixel art sprites with per-cell coloring
//! - One looping animation per action at ~10fps
//! - Item sprites beside him (food, poop)
//! - The scene behind him, which changes with the chosen background
//!
//! The avatar only re-renders when what is on screen would actually change;
//! otherwise it keeps cycling the frames it already has.

mod animation;
mod sheet;
mod sprites;

use std::time::Duration;

use ratatui::buffer::Buffer;

use sekitoritchi_core::{Action, Background, PetSnapshot, Renderer};

use crate::renderer::TerminalRenderer;

pub use animation::AnimationEngine;
pub use sheet::load_sheet;
pub use sprites::{build_animation, build_frame, Animation, ColoredCell, Frame, SpriteSheet};

/// Everything that decides which frames are showing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SceneKey {
    action: Action,
    scene: Background,
    overlay: Option<Action>,
    size: (u16, u16),
}

/// The animated wrestler and his scene
pub struct Avatar {
    renderer: TerminalRenderer,
    engine: AnimationEngine,
    showing: Option<SceneKey>,
}

impl Avatar {
    /// Create an avatar for a `width` x `height` scene
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            renderer: TerminalRenderer::new(width, height),
            engine: AnimationEngine::new(),
            showing: None,
        }
    }

    /// Change the scene size (frames are re-rendered on the next `show`)
    pub fn resize(&mut self, width: u16, height: u16) {
        self.renderer.resize(width, height);
    }

    /// Show what a snapshot describes
    ///
    /// Returns `true` if new frames were rendered.
    pub fn show(&mut self, snapshot: &PetSnapshot) -> bool {
        let key = SceneKey {
            action: snapshot.action,
            scene: snapshot.scene,
            overlay: snapshot.overlay(),
            size: self.renderer.size(),
        };
        if self.showing == Some(key) {
            return false;
        }

        let restart = self.showing.map(|k| k.action) != Some(key.action);
        let frames = self.renderer.render_snapshot(snapshot);
        self.engine.play(frames, restart);
        self.showing = Some(key);
        true
    }

    /// Update animation (call every frame)
    pub fn update(&mut self, delta: Duration) {
        self.engine.update(delta);
    }

    /// Copy the current frame into `buf`
    pub fn render(&self, buf: &mut Buffer) {
        let Some(frame) = self.engine.current_frame() else {
            return;
        };
        let area = buf.area;
        let src = frame.area;
        for y in 0..area.height.min(src.height) {
            for x in 0..area.width.min(src.width) {
                buf[(area.x + x, area.y + y)] = frame[(src.x + x, src.y + y)].clone();
            }
        }
    }

    /// Action currently animating
    pub fn current_action(&self) -> Option<Action> {
        self.showing.map(|k| k.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;
    use sekitoritchi_core::PetState;

    #[test]
    fn test_show_renders_once_per_change() {
        let mut avatar = Avatar::new(30, 10);
        let snap = PetState::default().snapshot(false);

        assert!(avatar.show(&snap));
        assert!(!avatar.show(&snap));
        assert_eq!(avatar.current_action(), Some(Action::Happy));

        avatar.resize(20, 8);
        assert!(avatar.show(&snap));
    }

    #[test]
    fn test_render_fills_layer() {
        let mut avatar = Avatar::new(12, 9);
        avatar.show(&PetState::default().snapshot(false));
        let mut buf = Buffer::empty(Rect::new(0, 0, 12, 9));
        avatar.render(&mut buf);
        assert_ne!(buf[(0, 0)].bg, ratatui::style::Color::Reset);
    }
}
