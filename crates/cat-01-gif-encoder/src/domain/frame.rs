//! One animation frame.

use crate::error::EncodeError;
use shared_types::Rect;

/// Cell states of one generation, positioned in cell space.
///
/// `pixels` is row-major over `rect`. A frame with an empty rectangle has
/// no live cells and renders as background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    rect: Rect,
    pixels: Vec<u8>,
    delay: u16,
}

impl Frame {
    /// Create a frame, checking that the buffer covers `rect` exactly.
    pub fn new(rect: Rect, pixels: Vec<u8>, delay: u16) -> Result<Self, EncodeError> {
        if pixels.len() != rect.area() {
            return Err(EncodeError::PixelCountMismatch {
                expected: rect.area(),
                actual: pixels.len(),
            });
        }
        Ok(Self {
            rect,
            pixels,
            delay,
        })
    }

    /// A frame with no live cells.
    pub fn empty(delay: u16) -> Self {
        Self {
            rect: Rect::new(0, 0, 0, 0),
            pixels: Vec::new(),
            delay,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Delay in hundredths of a second.
    pub fn delay(&self) -> u16 {
        self.delay
    }

    pub fn set_delay(&mut self, delay: u16) {
        self.delay = delay;
    }

    pub fn is_empty(&self) -> bool {
        self.rect.is_empty()
    }

    /// State at a cell-space position; 0 outside the frame.
    pub fn pixel_at(&self, x: i64, y: i64) -> u8 {
        if !self.rect.contains(x, y) {
            return 0;
        }
        let idx = (y - self.rect.y) as usize * self.rect.width as usize + (x - self.rect.x) as usize;
        self.pixels[idx]
    }

    /// Same frame moved by `(dx, dy)` cells.
    pub fn translated(mut self, dx: i64, dy: i64) -> Self {
        self.rect.x += dx;
        self.rect.y += dy;
        self
    }
}
