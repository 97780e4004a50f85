//! Error types for the frame builder

use cat_01_gif_encoder::EncodeError;
use shared_types::{DomainError, ErrorCategory};
use sim_engine::EngineError;
use thiserror::Error;

/// Errors from running a frame script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Invalid part: {0}")]
    InvalidPart(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Renderer(#[from] RendererError),

    #[error("Frame error: {0}")]
    Frame(#[from] EncodeError),
}

impl ScriptError {
    /// Category when this is an expected failure; `None` for faults.
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            ScriptError::InvalidPart(_) => Some(ErrorCategory::Command),
            ScriptError::Engine(e) => Some(e.category()),
            ScriptError::Renderer(e) => e.category(),
            ScriptError::Frame(_) => None,
        }
    }

    pub fn to_domain(&self) -> Option<DomainError> {
        self.category()
            .map(|c| DomainError::from_parts(c, self.to_string()))
    }
}

/// Errors from the external renderer.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("External renderer is not available for {0} mode")]
    NotConfigured(&'static str),

    #[error("Renderer I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Renderer command `{command}` failed with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Malformed renderer output: {0}")]
    MalformedOutput(String),
}

impl RendererError {
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            RendererError::NotConfigured(_) => Some(ErrorCategory::Command),
            _ => None,
        }
    }
}
