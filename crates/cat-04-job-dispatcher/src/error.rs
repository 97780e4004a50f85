//! Error types for the dispatcher

use shared_types::{DomainError, ErrorCategory};
use thiserror::Error;

/// Why a job did not produce a payload. Timeouts are not errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// Expected failure raised by the task, forwarded unchanged.
    #[error("{message}")]
    Domain {
        category: ErrorCategory,
        message: String,
    },

    /// The worker failed unexpectedly or died with the job in flight.
    #[error("Worker error: {0}")]
    Worker(String),

    /// No worker could be started.
    #[error("Worker unavailable: {0}")]
    WorkerUnavailable(String),

    /// The payload did not have the expected shape.
    #[error("Malformed result: {0}")]
    Decode(String),

    #[error("Dispatcher is not running")]
    SupervisorGone,

    #[error("Dispatcher is shutting down")]
    ShuttingDown,
}

impl JobError {
    /// The expected failure, if this is one.
    pub fn as_domain(&self) -> Option<DomainError> {
        match self {
            JobError::Domain { category, message } => {
                Some(DomainError::from_parts(*category, message.clone()))
            }
            _ => None,
        }
    }
}

/// Failure to start a worker instance.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("Failed to spawn worker `{program}`: {source}")]
    Process {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker {0} pipe was not captured")]
    Pipe(&'static str),

    #[error("Failed to start worker thread: {0}")]
    Thread(#[source] std::io::Error),
}

/// Failure to hand a request to a running worker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("Worker connection is closed")]
    Closed,
}
