//! Supervisor actor.
//!
//! A single task owns the worker link, the pending table and all counters.
//! It reacts to three inputs, worker events first:
//!
//! ```text
//!   worker events ──┐
//!   deadline ids  ──┼──► Supervisor ──► WorkerLink::send
//!   commands      ──┘        │
//!                            └──► oneshot responders
//! ```
//!
//! Events carry the instance that produced them. Anything from an instance
//! other than the current one is ignored, so a timeout and the exit it
//! provokes restart the worker once, not twice.

use super::handle::DispatcherHandle;
use crate::domain::{
    Deadline, DispatcherConfig, DispatcherStats, JobResult, PendingJob, PendingTable,
    RestartReason, WorkerState,
};
use crate::error::{JobError, LinkError};
use crate::ports::{EventSender, InstanceEvent, WorkerEvent, WorkerLink, WorkerSpawner};
use caterer_telemetry::{
    metric_inc, metric_observe, JOBS_COMPLETED, JOBS_SUBMITTED, JOB_DURATION, JOB_TIMEOUTS,
    PENDING_JOBS, WORKER_RESTARTS,
};
use shared_types::{JobId, TaskOutcome, TaskPayload, TaskReply, TaskRequest, WorkerInstanceId};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// Requests from [`DispatcherHandle`].
#[derive(Debug)]
pub(crate) enum Command {
    Submit {
        payload: TaskPayload,
        deadline: Deadline,
        responder: oneshot::Sender<JobResult>,
    },
    Stats {
        responder: oneshot::Sender<DispatcherStats>,
    },
    Shutdown {
        responder: oneshot::Sender<()>,
    },
}

#[derive(Debug, Default)]
struct Counters {
    restarts: u64,
    submitted: u64,
    completed: u64,
    failed: u64,
    timed_out: u64,
}

pub struct Supervisor {
    config: DispatcherConfig,
    spawner: Arc<dyn WorkerSpawner>,
    link: Option<Box<dyn WorkerLink>>,
    instance: WorkerInstanceId,
    state: WorkerState,
    last_spawn_error: Option<String>,
    pending: PendingTable,
    next_id: JobId,
    counters: Counters,
    events_tx: EventSender,
    events_rx: mpsc::UnboundedReceiver<InstanceEvent>,
    deadlines_tx: mpsc::UnboundedSender<JobId>,
    deadlines_rx: mpsc::UnboundedReceiver<JobId>,
    commands: mpsc::Receiver<Command>,
}

impl Supervisor {
    /// Spawn the supervisor on the current tokio runtime. The first worker
    /// instance is started straight away.
    pub fn start(config: DispatcherConfig, spawner: Arc<dyn WorkerSpawner>) -> DispatcherHandle {
        let (commands_tx, commands) = mpsc::channel(config.command_buffer.max(1));
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (deadlines_tx, deadlines_rx) = mpsc::unbounded_channel();

        let supervisor = Supervisor {
            config,
            spawner,
            link: None,
            instance: WorkerInstanceId::NONE,
            state: WorkerState::Spawning,
            last_spawn_error: None,
            pending: PendingTable::new(),
            next_id: JobId::new(1),
            counters: Counters::default(),
            events_tx,
            events_rx,
            deadlines_tx,
            deadlines_rx,
            commands,
        };
        tokio::spawn(supervisor.run());
        DispatcherHandle::new(commands_tx)
    }

    async fn run(mut self) {
        info!(
            default_timeout_ms = self.config.default_timeout.as_millis() as u64,
            renderer_timeout_ms = self.config.renderer_timeout.as_millis() as u64,
            "Dispatcher starting"
        );
        self.restart(RestartReason::Startup, "");

        loop {
            tokio::select! {
                biased;
                Some(event) = self.events_rx.recv() => self.on_event(event),
                Some(id) = self.deadlines_rx.recv() => self.on_deadline(id),
                command = self.commands.recv() => match command {
                    Some(Command::Submit { payload, deadline, responder }) => {
                        self.submit(payload, deadline, responder);
                    }
                    Some(Command::Stats { responder }) => {
                        let _ = responder.send(self.stats());
                    }
                    Some(Command::Shutdown { responder }) => {
                        self.shutdown();
                        let _ = responder.send(());
                        return;
                    }
                    None => {
                        self.shutdown();
                        return;
                    }
                },
            }
        }
    }

    fn submit(
        &mut self,
        payload: TaskPayload,
        deadline: Deadline,
        responder: oneshot::Sender<JobResult>,
    ) {
        let kind = payload.kind();
        self.counters.submitted += 1;
        metric_inc!(JOBS_SUBMITTED, &[kind.as_str()]);

        if !self.state.is_alive() {
            self.restart(RestartReason::Respawn, "Worker restarted");
        }
        if !self.state.is_alive() {
            let reason = self
                .last_spawn_error
                .clone()
                .unwrap_or_else(|| "no worker running".to_string());
            self.counters.failed += 1;
            metric_inc!(JOBS_COMPLETED, &[kind.as_str(), "unavailable"]);
            let _ = responder.send(Err(JobError::WorkerUnavailable(reason)));
            return;
        }

        let id = self.next_id;
        self.next_id = id.next();

        let timer = deadline.resolve(&self.config).map(|after| {
            let expired = self.deadlines_tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(after).await;
                let _ = expired.send(id);
            })
            .abort_handle()
        });

        self.pending
            .insert(id, PendingJob::new(responder, timer, kind, self.instance));
        PENDING_JOBS.set(self.pending.len() as f64);

        let sent = match self.link.as_mut() {
            Some(link) => link.send(TaskRequest::new(id, payload)),
            None => Err(LinkError::Closed),
        };
        if let Err(e) = sent {
            warn!(job_id = %id, instance = %self.instance, error = %e, "Failed to hand job to worker");
            self.state = WorkerState::Faulted;
            self.restart(RestartReason::SendFailed, &format!("Failed to send job: {e}"));
        }
    }

    fn on_event(&mut self, event: InstanceEvent) {
        if event.instance != self.instance {
            debug!(
                instance = %event.instance,
                current = %self.instance,
                event = ?event.event,
                "Ignoring event from a previous worker instance"
            );
            return;
        }
        match event.event {
            WorkerEvent::Reply(reply) => self.on_reply(reply),
            WorkerEvent::Fault(message) => {
                error!(instance = %event.instance, error = %message, "Worker fault");
                self.state = WorkerState::Faulted;
                self.restart(RestartReason::Fault, &format!("Worker fault: {message}"));
            }
            WorkerEvent::Exited(code) => {
                warn!(instance = %event.instance, code = ?code, "Worker exited");
                self.state = WorkerState::Exited;
                let detail = match code {
                    Some(code) => format!("Worker exited with code {code}"),
                    None => "Worker exited".to_string(),
                };
                self.restart(RestartReason::Exit, &detail);
            }
        }
    }

    fn on_reply(&mut self, reply: TaskReply) {
        let id = reply.id;
        let Some(job) = self.pending.take(id) else {
            debug!(job_id = %id, "Dropping reply for a job that is no longer pending");
            return;
        };
        let (result, outcome) = match reply.outcome {
            TaskOutcome::Success(data) => (Ok(Some(data)), "success"),
            TaskOutcome::ExpectedFailure { category, message } => {
                (Err(JobError::Domain { category, message }), "expected_failure")
            }
            TaskOutcome::UnexpectedFailure { message } => {
                error!(job_id = %id, kind = %job.kind, error = %message, "Job failed unexpectedly");
                (Err(JobError::Worker(message)), "unexpected_failure")
            }
        };
        self.finish(id, job, result, outcome);
    }

    fn on_deadline(&mut self, id: JobId) {
        let Some(job) = self.pending.take(id) else {
            return;
        };
        warn!(job_id = %id, kind = %job.kind, instance = %job.instance, "Job timed out");
        metric_inc!(JOB_TIMEOUTS, &[job.kind.as_str()]);
        self.finish(id, job, Ok(None), "timeout");
        self.restart(RestartReason::Timeout, "Worker restarted after a job timed out");
    }

    /// Resolve a job already removed from the pending table.
    fn finish(&mut self, id: JobId, job: PendingJob, result: JobResult, outcome: &'static str) {
        match &result {
            Ok(Some(_)) => self.counters.completed += 1,
            Ok(None) => self.counters.timed_out += 1,
            Err(_) => self.counters.failed += 1,
        }
        let kind = job.kind.as_str();
        metric_inc!(JOBS_COMPLETED, &[kind, outcome]);
        metric_observe!(
            JOB_DURATION,
            &[kind],
            job.submitted_at.elapsed().as_secs_f64()
        );
        PENDING_JOBS.set(self.pending.len() as f64);

        debug!(job_id = %id, kind, outcome, "Job resolved");
        if !job.resolve(result) {
            debug!(job_id = %id, "Caller went away before the job resolved");
        }
    }

    fn fail_pending(&mut self, error: JobError, outcome: &'static str) {
        let jobs = self.pending.drain();
        if jobs.is_empty() {
            return;
        }
        warn!(count = jobs.len(), error = %error, "Failing pending jobs");
        for (id, job) in jobs {
            self.finish(id, job, Err(error.clone()), outcome);
        }
    }

    /// Replace the current instance with a new one.
    ///
    /// Pending jobs fail with `detail`; they were sent to the old instance
    /// and will never be answered.
    fn restart(&mut self, reason: RestartReason, detail: &str) {
        self.state = WorkerState::Spawning;
        self.fail_pending(JobError::Worker(detail.to_string()), "worker_lost");
        if let Some(mut link) = self.link.take() {
            link.terminate();
        }

        self.instance = self.instance.next();
        if reason != RestartReason::Startup {
            self.counters.restarts += 1;
            metric_inc!(WORKER_RESTARTS, &[reason.as_str()]);
        }

        match self.spawner.spawn(self.instance, self.events_tx.clone()) {
            Ok(link) => {
                self.link = Some(link);
                self.state = WorkerState::Alive;
                self.last_spawn_error = None;
                info!(instance = %self.instance, reason = reason.as_str(), "Worker instance ready");
            }
            Err(e) => {
                error!(instance = %self.instance, reason = reason.as_str(), error = %e, "Failed to spawn worker");
                self.state = WorkerState::Faulted;
                self.last_spawn_error = Some(e.to_string());
            }
        }
    }

    fn shutdown(&mut self) {
        info!(pending = self.pending.len(), "Dispatcher shutting down");
        self.fail_pending(JobError::ShuttingDown, "shutdown");
        if let Some(mut link) = self.link.take() {
            link.terminate();
        }
        self.state = WorkerState::Exited;
    }

    fn stats(&self) -> DispatcherStats {
        DispatcherStats {
            pending: self.pending.len(),
            instance: self.instance,
            state: self.state,
            restarts: self.counters.restarts,
            submitted: self.counters.submitted,
            completed: self.counters.completed,
            failed: self.counters.failed,
            timed_out: self.counters.timed_out,
        }
    }
}
