//! A single compositor layer

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use super::LayerId;

/// An independently drawn region with its own buffer
#[derive(Debug)]
pub struct Layer {
    /// Layer identity
    pub id: LayerId,
    /// Position and size on screen
    pub bounds: Rect,
    /// Stacking order (higher is in front)
    pub z_index: i32,
    /// Whether the layer is composited
    pub visible: bool,
    /// Content, in layer-local coordinates
    pub buffer: Buffer,
}

impl Layer {
    /// Create an empty, visible layer
    pub fn new(id: LayerId, bounds: Rect, z_index: i32) -> Self {
        Self {
            id,
            bounds,
            z_index,
            visible: true,
            buffer: Buffer::empty(Rect::new(0, 0, bounds.width, bounds.height)),
        }
    }
}
