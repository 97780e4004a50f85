pub mod builder;

pub use builder::{FrameBuilder, FrameSet, DEFAULT_GIF_SIZE};
