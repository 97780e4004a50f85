//! Error types for the GIF encoder

use thiserror::Error;

/// Errors raised while building palettes, frames or documents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("Cannot encode an animation with no frames")]
    NoFrames,

    #[error("Canvas has zero width or height")]
    EmptyCanvas,

    #[error("Canvas too large: {width}x{height} (maximum 65535 in each dimension)")]
    CanvasTooLarge { width: u32, height: u32 },

    #[error("Frame pixel buffer has {actual} entries, expected {expected}")]
    PixelCountMismatch { expected: usize, actual: usize },

    #[error("Invalid state count: {0} (must be between 1 and 256)")]
    InvalidStateCount(u16),

    #[error("Pixel value {value} does not fit a palette of {colors} colours")]
    PixelOutOfPalette { value: u8, colors: usize },
}
