//! Pending job table.
//!
//! Maps correlation ids to waiting callers. Removing an entry is the only
//! way to resolve a caller, so whichever of reply, deadline or worker loss
//! gets there first wins and the others find nothing.

use crate::error::JobError;
use shared_types::{JobId, TaskKind, WorkerInstanceId};
use std::collections::HashMap;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::debug;

/// What a caller receives: a payload, `None` on timeout, or an error.
pub type JobResult = Result<Option<serde_json::Value>, JobError>;

/// One outstanding job.
#[derive(Debug)]
pub struct PendingJob {
    responder: oneshot::Sender<JobResult>,
    /// Armed timer; `None` for unbounded jobs.
    deadline: Option<AbortHandle>,
    pub kind: TaskKind,
    pub submitted_at: Instant,
    /// Worker instance the request was sent to.
    pub instance: WorkerInstanceId,
}

impl PendingJob {
    pub fn new(
        responder: oneshot::Sender<JobResult>,
        deadline: Option<AbortHandle>,
        kind: TaskKind,
        instance: WorkerInstanceId,
    ) -> Self {
        Self {
            responder,
            deadline,
            kind,
            submitted_at: Instant::now(),
            instance,
        }
    }

    /// Hand the result to the caller. Returns `false` if the caller has
    /// already gone away.
    pub fn resolve(mut self, result: JobResult) -> bool {
        self.cancel_deadline();
        self.responder.send(result).is_ok()
    }

    fn cancel_deadline(&mut self) {
        if let Some(handle) = self.deadline.take() {
            handle.abort();
        }
    }
}

/// Jobs waiting for their worker reply, keyed by correlation id.
#[derive(Debug, Default)]
pub struct PendingTable {
    jobs: HashMap<JobId, PendingJob>,
}

impl PendingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: JobId, job: PendingJob) {
        debug!(job_id = %id, kind = %job.kind, instance = %job.instance, "Registered pending job");
        self.jobs.insert(id, job);
    }

    /// Remove a job, if it is still pending.
    pub fn take(&mut self, id: JobId) -> Option<PendingJob> {
        self.jobs.remove(&id)
    }

    /// Remove every job, oldest first.
    pub fn drain(&mut self) -> Vec<(JobId, PendingJob)> {
        let mut jobs: Vec<_> = self.jobs.drain().collect();
        jobs.sort_by_key(|(id, _)| *id);
        jobs
    }

    pub fn contains(&self, id: JobId) -> bool {
        self.jobs.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
