//! Renderer Seam
//!
//! The core never draws. A view layer implements [`Renderer`] for whatever
//! surface it owns and calls it each time the observer hub publishes.

use crate::action::{Action, Background};
use crate::state::PetSnapshot;

/// Turns an action, a background and an optional item into something
/// displayable
pub trait Renderer {
    /// Displayable output (a frame sequence, a widget, a buffer...)
    type Surface;

    /// Produce the frames for `action` composited over `background`
    ///
    /// `secondary` is an item sprite drawn next to the pet (food, poop).
    fn render_frame(
        &mut self,
        action: Action,
        background: Background,
        secondary: Option<Action>,
    ) -> Self::Surface;

    /// Render whatever a snapshot says is on screen right now
    fn render_snapshot(&mut self, snapshot: &PetSnapshot) -> Self::Surface {
        self.render_frame(snapshot.action, snapshot.scene, snapshot.overlay())
    }
}
