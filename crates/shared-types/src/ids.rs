//! Identifiers for jobs and worker instances.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Correlation id of a single job.
///
/// Allocated by the dispatcher from a monotonically increasing counter and
/// echoed back by the worker in its reply. Never reused within one
/// dispatcher's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(u64);

impl JobId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// The id following this one.
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generation number of a worker instance.
///
/// Every spawn gets a fresh generation. Events tagged with an older
/// generation belong to a worker that has already been replaced and are
/// discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerInstanceId(u64);

impl WorkerInstanceId {
    /// Generation before any worker has been spawned.
    pub const NONE: Self = Self(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for WorkerInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_is_transparent_on_the_wire() {
        let id = JobId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let back: JobId = serde_json::from_str("42").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_ids_advance() {
        assert_eq!(JobId::new(7).next().get(), 8);
        assert_eq!(WorkerInstanceId::NONE.next(), WorkerInstanceId::new(1));
        assert_eq!(WorkerInstanceId::new(3).to_string(), "#3");
    }
}
