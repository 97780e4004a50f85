//! Ports: how the dispatcher starts and talks to a worker.
//!
//! A [`WorkerSpawner`] starts one worker instance and returns a
//! [`WorkerLink`] for sending it requests. Everything the worker says back
//! arrives on the shared event channel, tagged with the instance that
//! produced it.

use crate::error::{LinkError, SpawnError};
use shared_types::{TaskReply, TaskRequest, WorkerInstanceId};
use tokio::sync::mpsc;

/// Something a worker instance did.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEvent {
    Reply(TaskReply),
    /// The instance failed in a way that leaves it unusable.
    Fault(String),
    /// The instance is gone, with its exit code when there is one.
    Exited(Option<i32>),
}

/// A [`WorkerEvent`] tagged with its instance generation.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceEvent {
    pub instance: WorkerInstanceId,
    pub event: WorkerEvent,
}

impl InstanceEvent {
    pub fn new(instance: WorkerInstanceId, event: WorkerEvent) -> Self {
        Self { instance, event }
    }
}

/// Sender half of the event channel handed to every instance.
pub type EventSender = mpsc::UnboundedSender<InstanceEvent>;

/// Dispatcher-side handle of one running worker instance.
pub trait WorkerLink: Send {
    /// Queue a request. Does not wait for the worker to read it.
    fn send(&mut self, request: TaskRequest) -> Result<(), LinkError>;

    /// Stop the instance. Never fails; the instance may already be gone.
    fn terminate(&mut self);
}

/// Starts worker instances.
pub trait WorkerSpawner: Send + Sync {
    /// Start instance `instance`, reporting its events on `events`.
    ///
    /// Called from within the dispatcher's tokio runtime.
    fn spawn(
        &self,
        instance: WorkerInstanceId,
        events: EventSender,
    ) -> Result<Box<dyn WorkerLink>, SpawnError>;
}
