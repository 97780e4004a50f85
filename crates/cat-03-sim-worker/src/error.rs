//! Error types for the worker

use cat_01_gif_encoder::EncodeError;
use cat_02_frame_builder::ScriptError;
use shared_types::{DomainError, ErrorCategory};
use sim_engine::EngineError;
use thiserror::Error;

/// Everything that can go wrong while executing one task.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("GIF encoding failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Resize(#[from] ResizeError),

    #[error("Failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl WorkerError {
    /// Category for expected failures; `None` for faults.
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            WorkerError::Script(e) => e.category(),
            WorkerError::Engine(e) => Some(e.category()),
            _ => None,
        }
    }

    pub fn to_domain(&self) -> Option<DomainError> {
        self.category()
            .map(|c| DomainError::from_parts(c, self.to_string()))
    }
}

/// Errors from the post-render resizer.
#[derive(Debug, Error)]
pub enum ResizeError {
    #[error("Resizer I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Resizer `{program}` failed with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Invalid worker configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Output directory {0} is not usable: {1}")]
    OutputDir(String, std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let err = WorkerError::from(ScriptError::InvalidPart("x".into()));
        assert_eq!(err.category(), Some(ErrorCategory::Command));
        assert_eq!(err.to_string(), "Invalid part: x");

        let err = WorkerError::from(EngineError::InvalidRule("Q".into()));
        assert_eq!(err.category(), Some(ErrorCategory::Rule));

        let err = WorkerError::from(EncodeError::NoFrames);
        assert_eq!(err.category(), None);
        assert!(err.to_domain().is_none());
    }
}
