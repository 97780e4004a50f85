//! Ports: the external renderer.
//!
//! Some rules can only be simulated by an external program. The builder
//! hands it the current pattern as RLE and gets back a list of frames and
//! optional custom state colours.

use crate::error::RendererError;
use cat_01_gif_encoder::Frame;
use shared_types::Rgb;
use std::collections::BTreeMap;

/// Which external program to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererMode {
    /// General-purpose viewer. Its output repeats the input as the first
    /// frame and its offsets are one cell off.
    Viewer,
    /// Rule-loader simulator, used for engine rules named `__*`.
    RuleLoader,
}

impl RendererMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RendererMode::Viewer => "viewer",
            RendererMode::RuleLoader => "rule_loader",
        }
    }
}

/// One render invocation.
#[derive(Debug, Clone)]
pub struct RenderRequest<'a> {
    pub rle: &'a str,
    pub generations: u64,
    pub step: u64,
    pub mode: RendererMode,
}

/// Frames produced by the renderer, without delays.
#[derive(Debug, Clone, Default)]
pub struct RenderedFrames {
    pub frames: Vec<Frame>,
    /// Colours for states, as reported in the `@COLOR` section.
    pub colors: BTreeMap<u8, Rgb>,
}

/// External renderer.
pub trait ExternalRenderer: Send + Sync {
    fn render(&self, request: &RenderRequest<'_>) -> Result<RenderedFrames, RendererError>;
}
