use std::fmt;

/// Axis along which images are laid out.
///
/// "Main" and "cross" follow the flexbox convention: frames are concatenated
/// along the main axis and rescaled to a common size on the cross axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

impl Axis {
    /// Extent of `(width, height)` along the main axis.
    pub fn main(self, (width, height): (u32, u32)) -> u32 {
        match self {
            Axis::Horizontal => width,
            Axis::Vertical => height,
        }
    }

    /// Extent of `(width, height)` along the cross axis.
    pub fn cross(self, (width, height): (u32, u32)) -> u32 {
        match self {
            Axis::Horizontal => height,
            Axis::Vertical => width,
        }
    }

    /// Build a `(width, height)` pair from main and cross extents.
    pub fn size(self, main: u32, cross: u32) -> (u32, u32) {
        match self {
            Axis::Horizontal => (main, cross),
            Axis::Vertical => (cross, main),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Horizontal => write!(f, "horizontal"),
            Axis::Vertical => write!(f, "vertical"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_main_is_width() {
        let axis = Axis::Horizontal;
        assert_eq!(axis.main((100, 50)), 100);
        assert_eq!(axis.cross((100, 50)), 50);
        assert_eq!(axis.size(100, 50), (100, 50));
    }

    #[test]
    fn vertical_main_is_height() {
        let axis = Axis::Vertical;
        assert_eq!(axis.main((100, 50)), 50);
        assert_eq!(axis.cross((100, 50)), 100);
        assert_eq!(axis.size(50, 100), (100, 50));
    }

    #[test]
    fn size_inverts_main_and_cross() {
        for axis in [Axis::Horizontal, Axis::Vertical] {
            let size = (37, 81);
            assert_eq!(axis.size(axis.main(size), axis.cross(size)), size);
        }
    }
}
