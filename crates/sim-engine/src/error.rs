//! Error types for the simulation engine

use shared_types::{DomainError, ErrorCategory};
use thiserror::Error;

/// Errors raised while parsing rules and patterns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Unsupported rule: {0}")]
    UnsupportedRule(String),

    #[error("{0}")]
    InvalidPattern(String),

    #[error("State {state} is out of range for rule {rule}")]
    StateOutOfRange { state: u8, rule: String },
}

impl EngineError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EngineError::InvalidRule(_) | EngineError::UnsupportedRule(_) => ErrorCategory::Rule,
            EngineError::InvalidPattern(_) | EngineError::StateOutOfRange { .. } => {
                ErrorCategory::Command
            }
        }
    }
}

impl From<EngineError> for DomainError {
    fn from(err: EngineError) -> Self {
        DomainError::from_parts(err.category(), err.to_string())
    }
}
