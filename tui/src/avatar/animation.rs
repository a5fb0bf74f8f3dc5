//! Animation Engine
//!
//! Manages playback of a rendered frame loop: frame timing and looping.

use std::time::Duration;

use ratatui::buffer::Buffer;

use crate::renderer::{SceneFrames, FRAME_DURATION};

/// Engine that manages animation playback
pub struct AnimationEngine {
    /// Frames currently playing
    frames: Vec<Buffer>,
    /// Time each frame stays up
    frame_duration: Duration,
    /// Current frame index
    current_frame: usize,
    /// Time accumulated on current frame
    frame_time: Duration,
}

impl AnimationEngine {
    /// Create an engine with nothing to play
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            frame_duration: FRAME_DURATION,
            current_frame: 0,
            frame_time: Duration::ZERO,
        }
    }

    /// Advance by `delta`, looping at the end
    pub fn update(&mut self, delta: Duration) {
        if self.frames.is_empty() || self.frame_duration.is_zero() {
            return;
        }

        self.frame_time += delta;
        while self.frame_time >= self.frame_duration {
            self.frame_time -= self.frame_duration;
            self.current_frame = (self.current_frame + 1) % self.frames.len();
        }
    }

    /// Switch to a new loop
    ///
    /// With `restart` the loop begins at its first frame; otherwise the
    /// current position carries over so a redraw does not stutter.
    pub fn play(&mut self, scene: SceneFrames, restart: bool) {
        self.frames = scene.frames;
        self.frame_duration = scene.frame_duration;
        if restart || self.frames.is_empty() {
            self.current_frame = 0;
            self.frame_time = Duration::ZERO;
        } else {
            self.current_frame %= self.frames.len();
        }
    }

    /// Get the current frame for rendering
    pub fn current_frame(&self) -> Option<&Buffer> {
        self.frames.get(self.current_frame)
    }

    /// Index of the frame on screen
    pub fn frame_index(&self) -> usize {
        self.current_frame
    }
}

impl Default for AnimationEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;

    fn scene(count: usize) -> SceneFrames {
        SceneFrames {
            frames: vec![Buffer::empty(Rect::new(0, 0, 1, 1)); count],
            frame_duration: Duration::from_millis(100),
        }
    }

    #[test]
    fn test_frames_advance_and_loop() {
        let mut engine = AnimationEngine::new();
        engine.play(scene(3), true);

        engine.update(Duration::from_millis(99));
        assert_eq!(engine.frame_index(), 0);
        engine.update(Duration::from_millis(1));
        assert_eq!(engine.frame_index(), 1);
        engine.update(Duration::from_millis(250));
        assert_eq!(engine.frame_index(), 0);
    }

    #[test]
    fn test_play_without_restart_keeps_position() {
        let mut engine = AnimationEngine::new();
        engine.play(scene(4), true);
        engine.update(Duration::from_millis(300));
        assert_eq!(engine.frame_index(), 3);

        engine.play(scene(2), false);
        assert_eq!(engine.frame_index(), 1);
        engine.play(scene(2), true);
        assert_eq!(engine.frame_index(), 0);
    }
}
