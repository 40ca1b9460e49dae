use crate::axis::Axis;

/// A rectangle in absolute pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl PixelRect {
    /// Rectangle starting at `offset` on the main axis and 0 on the cross axis.
    pub fn along(axis: Axis, offset: u32, main: u32, cross: u32) -> PixelRect {
        let (x, y) = axis.size(offset, 0);
        let (w, h) = axis.size(main, cross);
        PixelRect { x, y, w, h }
    }

    pub fn size(self) -> (u32, u32) {
        (self.w, self.h)
    }

    /// Exclusive right edge.
    pub fn right(self) -> u32 {
        self.x + self.w
    }

    /// Exclusive bottom edge.
    pub fn bottom(self) -> u32 {
        self.y + self.h
    }
}
