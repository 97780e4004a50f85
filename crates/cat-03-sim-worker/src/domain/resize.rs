//! Target size for the post-render resize.
//!
//! The encoder writes one GIF pixel per cell. The resizer scales the shorter
//! side up to the smallest whole multiple of itself that reaches the
//! requested size.

/// Side the resizer is told to scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Width,
    Height,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Width => "width",
            Axis::Height => "height",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeTarget {
    pub axis: Axis,
    pub size: u32,
}

impl ResizeTarget {
    /// `scale = ceil(gif_size / min(w, h))`, `size = min(w, h) * scale`,
    /// along the width when `w < h`.
    pub fn compute(gif_size: u32, width: u32, height: u32) -> ResizeTarget {
        let short = width.min(height).max(1);
        let scale = gif_size.div_ceil(short).max(1);
        ResizeTarget {
            axis: if width < height { Axis::Width } else { Axis::Height },
            size: short.saturating_mul(scale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_canvas() {
        let t = ResizeTarget::compute(200, 5, 5);
        assert_eq!(t, ResizeTarget { axis: Axis::Height, size: 200 });
    }

    #[test]
    fn test_rounds_up_to_whole_multiple() {
        // ceil(200 / 7) = 29, 7 * 29 = 203
        let t = ResizeTarget::compute(200, 7, 12);
        assert_eq!(t.axis, Axis::Width);
        assert_eq!(t.size, 203);
    }

    #[test]
    fn test_large_canvas_keeps_size() {
        let t = ResizeTarget::compute(200, 500, 300);
        assert_eq!(t.axis, Axis::Height);
        assert_eq!(t.size, 300);
    }
}
