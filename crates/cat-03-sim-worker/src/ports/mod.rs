//! Ports: the post-render resizer.

use crate::domain::resize::ResizeTarget;
use crate::error::ResizeError;
use std::path::Path;

/// Scales a finished GIF.
pub trait Resizer: Send + Sync {
    fn resize(&self, input: &Path, output: &Path, target: ResizeTarget) -> Result<(), ResizeError>;
}
