//! Worker lifecycle and dispatcher statistics.

use serde::Serialize;
use shared_types::WorkerInstanceId;
use std::fmt;

/// Lifecycle of the current worker instance.
///
/// ```text
/// Spawning ──► Alive ──► Faulted | Exited ──► Spawning ──► ...
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Spawning,
    Alive,
    /// The worker reported a fault, could not be written to, or could not
    /// be spawned.
    Faulted,
    Exited,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Spawning => "spawning",
            WorkerState::Alive => "alive",
            WorkerState::Faulted => "faulted",
            WorkerState::Exited => "exited",
        }
    }

    pub fn is_alive(&self) -> bool {
        matches!(self, WorkerState::Alive)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a new worker instance is being spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartReason {
    /// First spawn when the dispatcher starts.
    Startup,
    Timeout,
    Fault,
    Exit,
    /// A request could not be handed to the worker.
    SendFailed,
    /// Retry after an earlier spawn failed.
    Respawn,
}

impl RestartReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestartReason::Startup => "startup",
            RestartReason::Timeout => "timeout",
            RestartReason::Fault => "fault",
            RestartReason::Exit => "exit",
            RestartReason::SendFailed => "send_failed",
            RestartReason::Respawn => "respawn",
        }
    }
}

/// Snapshot returned by [`DispatcherHandle::stats`](crate::DispatcherHandle::stats).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatcherStats {
    pub pending: usize,
    pub instance: WorkerInstanceId,
    pub state: WorkerState,
    /// Spawn attempts after the first one.
    pub restarts: u64,
    pub submitted: u64,
    /// Jobs resolved with a payload.
    pub completed: u64,
    /// Jobs resolved with an error of any kind.
    pub failed: u64,
    pub timed_out: u64,
}
