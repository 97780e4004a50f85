//! Caller-side handle to the supervisor.

use super::supervisor::Command;
use crate::domain::{Deadline, DispatcherStats, JobResult};
use crate::error::JobError;
use serde::de::DeserializeOwned;
use shared_types::{Identified, PatternType, SimSummary, TaskPayload};
use tokio::sync::{mpsc, oneshot};

/// Cheap to clone; every clone talks to the same supervisor. The supervisor
/// shuts down once the last handle is dropped.
#[derive(Debug, Clone)]
pub struct DispatcherHandle {
    commands: mpsc::Sender<Command>,
}

impl DispatcherHandle {
    pub(crate) fn new(commands: mpsc::Sender<Command>) -> Self {
        Self { commands }
    }

    /// Submit a task and wait for it to resolve.
    ///
    /// `Ok(None)` means the deadline elapsed first.
    pub async fn submit(&self, payload: TaskPayload, deadline: Deadline) -> JobResult {
        let (responder, response) = oneshot::channel();
        self.commands
            .send(Command::Submit {
                payload,
                deadline,
                responder,
            })
            .await
            .map_err(|_| JobError::SupervisorGone)?;
        response.await.map_err(|_| JobError::SupervisorGone)?
    }

    /// Run a `sim` script against a pattern. `argv[0]` is the command name
    /// and is ignored by the worker.
    pub async fn simulate(
        &self,
        argv: Vec<String>,
        pattern_source: impl Into<String>,
        deadline: Deadline,
    ) -> Result<Option<SimSummary>, JobError> {
        let payload = TaskPayload::Sim {
            argv,
            pattern_source: pattern_source.into(),
        };
        decode(self.submit(payload, deadline).await?)
    }

    pub async fn identify(
        &self,
        pattern_source: impl Into<String>,
        generation_limit: u64,
        deadline: Deadline,
    ) -> Result<Option<Identified>, JobError> {
        let payload = TaskPayload::Identify {
            pattern_source: pattern_source.into(),
            generation_limit,
        };
        decode(self.submit(payload, deadline).await?)
    }

    pub async fn basic_identify(
        &self,
        pattern_source: impl Into<String>,
        generation_limit: u64,
        deadline: Deadline,
    ) -> Result<Option<PatternType>, JobError> {
        let payload = TaskPayload::BasicIdentify {
            pattern_source: pattern_source.into(),
            generation_limit,
        };
        decode(self.submit(payload, deadline).await?)
    }

    pub async fn stats(&self) -> Result<DispatcherStats, JobError> {
        let (responder, response) = oneshot::channel();
        self.commands
            .send(Command::Stats { responder })
            .await
            .map_err(|_| JobError::SupervisorGone)?;
        response.await.map_err(|_| JobError::SupervisorGone)
    }

    /// Fail every pending job with [`JobError::ShuttingDown`], stop the
    /// worker and wait for the supervisor to exit.
    pub async fn shutdown(&self) -> Result<(), JobError> {
        let (responder, response) = oneshot::channel();
        self.commands
            .send(Command::Shutdown { responder })
            .await
            .map_err(|_| JobError::SupervisorGone)?;
        response.await.map_err(|_| JobError::SupervisorGone)
    }
}

fn decode<T: DeserializeOwned>(value: Option<serde_json::Value>) -> Result<Option<T>, JobError> {
    value
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| JobError::Decode(e.to_string()))
}
