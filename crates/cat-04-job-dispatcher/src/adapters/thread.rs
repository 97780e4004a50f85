//! Worker hosted on a dedicated OS thread in the same process.
//!
//! Requests go over a std channel to a thread that runs the
//! [`TaskHandler`] one request at a time. The thread reports `Exited` when
//! its request channel closes, or `Fault` if it unwinds.
//!
//! A thread cannot be killed. `terminate` closes the request channel and
//! forgets the instance; a task still running keeps its core busy until it
//! finishes, and its reply is discarded as stale. Abandoning a busy thread
//! is logged at `warn`. Use the process host in production, where a stuck
//! task is killed with its process.

use crate::error::{LinkError, SpawnError};
use crate::ports::{EventSender, InstanceEvent, WorkerEvent, WorkerLink, WorkerSpawner};
use shared_types::{TaskHandler, TaskRequest, WorkerInstanceId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

/// Spawns a thread per worker instance, all sharing one handler.
#[derive(Clone)]
pub struct ThreadSpawner {
    handler: Arc<dyn TaskHandler>,
}

impl ThreadSpawner {
    pub fn new(handler: Arc<dyn TaskHandler>) -> Self {
        Self { handler }
    }
}

impl std::fmt::Debug for ThreadSpawner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadSpawner").finish_non_exhaustive()
    }
}

impl WorkerSpawner for ThreadSpawner {
    fn spawn(
        &self,
        instance: WorkerInstanceId,
        events: EventSender,
    ) -> Result<Box<dyn WorkerLink>, SpawnError> {
        Ok(Box::new(self.spawn_thread(instance, events)?))
    }
}

impl ThreadSpawner {
    fn spawn_thread(
        &self,
        instance: WorkerInstanceId,
        events: EventSender,
    ) -> Result<ThreadLink, SpawnError> {
        let (tx, rx) = mpsc::channel::<TaskRequest>();
        let handler = Arc::clone(&self.handler);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&in_flight);

        thread::Builder::new()
            .name(format!("sim-worker-{}", instance.get()))
            .spawn(move || {
                let _guard = ExitGuard {
                    instance,
                    events: events.clone(),
                };
                for request in rx {
                    let id = request.id;
                    let reply = handler.handle(request);
                    counter.fetch_sub(1, Ordering::SeqCst);
                    if events
                        .send(InstanceEvent::new(instance, WorkerEvent::Reply(reply)))
                        .is_err()
                    {
                        break;
                    }
                    debug!(job_id = %id, instance = %instance, "Worker thread replied");
                }
            })
            .map_err(SpawnError::Thread)?;

        info!(instance = %instance, "Worker thread spawned");
        Ok(ThreadLink {
            instance,
            requests: Some(tx),
            in_flight,
        })
    }
}

struct ThreadLink {
    instance: WorkerInstanceId,
    requests: Option<mpsc::Sender<TaskRequest>>,
    /// Requests sent but not yet handled.
    in_flight: Arc<AtomicUsize>,
}

impl ThreadLink {
    /// Close the request channel. Returns how many requests the thread is
    /// still running or holding.
    fn abandon(&mut self) -> usize {
        if self.requests.take().is_none() {
            return 0;
        }
        let busy = self.in_flight.load(Ordering::SeqCst);
        if busy > 0 {
            warn!(
                instance = %self.instance,
                in_flight = busy,
                "Abandoning busy worker thread; its task runs on until it finishes"
            );
        }
        busy
    }
}

impl WorkerLink for ThreadLink {
    fn send(&mut self, request: TaskRequest) -> Result<(), LinkError> {
        let requests = self.requests.as_ref().ok_or(LinkError::Closed)?;
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        requests.send(request).map_err(|_| {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            LinkError::Closed
        })
    }

    fn terminate(&mut self) {
        self.abandon();
    }
}

/// Reports how the worker thread ended, including by unwinding.
struct ExitGuard {
    instance: WorkerInstanceId,
    events: EventSender,
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        let event = if thread::panicking() {
            WorkerEvent::Fault("worker thread panicked".to_string())
        } else {
            WorkerEvent::Exited(Some(0))
        };
        let _ = self.events.send(InstanceEvent::new(self.instance, event));
    }
}
