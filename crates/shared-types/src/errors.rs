//! # Error Types
//!
//! Expected failures that a worker reports back as part of the protocol.
//! Anything not expressible as a [`DomainError`] is an unexpected fault.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Category of an expected failure.
///
/// The wire names are fixed by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Bad user input: unknown directive, malformed script, missing pattern.
    #[serde(rename = "BotError")]
    Command,
    /// The rule string could not be understood by the engine.
    #[serde(rename = "RuleError")]
    Rule,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Command => "BotError",
            ErrorCategory::Rule => "RuleError",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An expected, user-facing failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{0}")]
    Command(String),

    #[error("{0}")]
    Rule(String),
}

impl DomainError {
    pub fn command(message: impl Into<String>) -> Self {
        DomainError::Command(message.into())
    }

    pub fn rule(message: impl Into<String>) -> Self {
        DomainError::Rule(message.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DomainError::Command(_) => ErrorCategory::Command,
            DomainError::Rule(_) => ErrorCategory::Rule,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            DomainError::Command(m) | DomainError::Rule(m) => m,
        }
    }

    pub fn from_parts(category: ErrorCategory, message: impl Into<String>) -> Self {
        match category {
            ErrorCategory::Command => DomainError::Command(message.into()),
            ErrorCategory::Rule => DomainError::Rule(message.into()),
        }
    }
}
