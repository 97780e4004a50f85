//! Worker hosted in a child process speaking JSON lines over stdio.
//!
//! ```text
//!            requests ──► writer task ──► child stdin
//! dispatcher                                  │ sim-worker
//!            events ◄── reader task ◄── child stdout
//!                  ◄── waiter task (exit status, kill)
//! ```
//!
//! The waiter reports `Exited` only after the reader has drained stdout, so
//! replies written just before the child exits are still delivered.

use crate::error::{LinkError, SpawnError};
use crate::ports::{EventSender, InstanceEvent, WorkerEvent, WorkerLink, WorkerSpawner};
use shared_types::{TaskReply, TaskRequest, WorkerInstanceId};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Spawns `program args...` per worker instance.
#[derive(Debug, Clone)]
pub struct ProcessSpawner {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessSpawner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl WorkerSpawner for ProcessSpawner {
    fn spawn(
        &self,
        instance: WorkerInstanceId,
        events: EventSender,
    ) -> Result<Box<dyn WorkerLink>, SpawnError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SpawnError::Process {
                program: self.program.display().to_string(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or(SpawnError::Pipe("stdin"))?;
        let stdout = child.stdout.take().ok_or(SpawnError::Pipe("stdout"))?;
        let pid = child.id();

        let (requests_tx, requests_rx) = mpsc::unbounded_channel();
        let (kill_tx, kill_rx) = oneshot::channel();

        tokio::spawn(write_requests(stdin, requests_rx, instance, events.clone()));
        let reader = tokio::spawn(read_replies(stdout, instance, events.clone()));
        tokio::spawn(wait_for_exit(child, kill_rx, reader, instance, events));

        info!(instance = %instance, pid = ?pid, program = %self.program.display(), "Worker process spawned");

        Ok(Box::new(ProcessLink {
            requests: requests_tx,
            kill: Some(kill_tx),
        }))
    }
}

struct ProcessLink {
    requests: mpsc::UnboundedSender<TaskRequest>,
    kill: Option<oneshot::Sender<()>>,
}

impl WorkerLink for ProcessLink {
    fn send(&mut self, request: TaskRequest) -> Result<(), LinkError> {
        self.requests.send(request).map_err(|_| LinkError::Closed)
    }

    fn terminate(&mut self) {
        if let Some(kill) = self.kill.take() {
            let _ = kill.send(());
        }
    }
}

async fn write_requests(
    mut stdin: ChildStdin,
    mut requests: mpsc::UnboundedReceiver<TaskRequest>,
    instance: WorkerInstanceId,
    events: EventSender,
) {
    while let Some(request) = requests.recv().await {
        let id = request.id;
        let mut line = match serde_json::to_vec(&request) {
            Ok(line) => line,
            Err(e) => {
                let reply = TaskReply::unexpected(id, format!("Failed to encode request: {e}"));
                let _ = events.send(InstanceEvent::new(instance, WorkerEvent::Reply(reply)));
                continue;
            }
        };
        line.push(b'\n');

        let written = async {
            stdin.write_all(&line).await?;
            stdin.flush().await
        }
        .await;
        if let Err(e) = written {
            let _ = events.send(InstanceEvent::new(
                instance,
                WorkerEvent::Fault(format!("Failed to write to worker: {e}")),
            ));
            return;
        }
        debug!(job_id = %id, instance = %instance, "Request written to worker");
    }
}

async fn read_replies(stdout: ChildStdout, instance: WorkerInstanceId, events: EventSender) {
    let mut lines = BufReader::new(stdout).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<TaskReply>(line) {
                    Ok(reply) => {
                        if events
                            .send(InstanceEvent::new(instance, WorkerEvent::Reply(reply)))
                            .is_err()
                        {
                            return;
                        }
                    }
                    Err(e) => {
                        warn!(instance = %instance, error = %e, "Discarding unparseable worker output");
                    }
                }
            }
            Ok(None) => return,
            Err(e) => {
                let _ = events.send(InstanceEvent::new(
                    instance,
                    WorkerEvent::Fault(format!("Failed to read from worker: {e}")),
                ));
                return;
            }
        }
    }
}

async fn wait_for_exit(
    mut child: Child,
    kill: oneshot::Receiver<()>,
    reader: JoinHandle<()>,
    instance: WorkerInstanceId,
    events: EventSender,
) {
    let status = tokio::select! {
        status = child.wait() => status,
        // Fires on terminate() and when the link is dropped.
        _ = kill => {
            if let Err(e) = child.kill().await {
                warn!(instance = %instance, error = %e, "Failed to kill worker process");
            }
            child.wait().await
        }
    };

    let _ = reader.await;
    let code = match status {
        Ok(status) => status.code(),
        Err(e) => {
            warn!(instance = %instance, error = %e, "Failed to collect worker exit status");
            None
        }
    };
    debug!(instance = %instance, code = ?code, "Worker process exited");
    let _ = events.send(InstanceEvent::new(instance, WorkerEvent::Exited(code)));
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use shared_types::{JobId, TaskOutcome, TaskPayload};
    use std::time::Duration;
    use tokio::time::timeout;

    /// Answers one request with its own id, then exits with status 3.
    const ONE_SHOT: &str = r#"read line; id=$(echo "$line" | sed 's/.*"id":\([0-9]*\).*/\1/'); echo "{\"id\":$id,\"ok\":true,\"data\":$id}"; exit 3"#;

    fn request(id: u64) -> TaskRequest {
        TaskRequest::new(
            JobId::new(id),
            TaskPayload::BasicIdentify {
                pattern_source: "o!".into(),
                generation_limit: 1,
            },
        )
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<InstanceEvent>) -> InstanceEvent {
        timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("no event from worker")
            .expect("event channel closed")
    }

    #[tokio::test]
    async fn test_reply_then_exit() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let spawner = ProcessSpawner::new("sh").with_args(["-c", ONE_SHOT]);
        let instance = WorkerInstanceId::new(4);
        let mut link = spawner.spawn(instance, tx).unwrap();
        link.send(request(17)).unwrap();

        let event = next(&mut rx).await;
        assert_eq!(event.instance, instance);
        match event.event {
            WorkerEvent::Reply(reply) => {
                assert_eq!(reply.id, JobId::new(17));
                assert_eq!(reply.outcome, TaskOutcome::Success(serde_json::json!(17)));
            }
            other => panic!("expected reply, got {other:?}"),
        }
        assert_eq!(next(&mut rx).await.event, WorkerEvent::Exited(Some(3)));
    }

    #[tokio::test]
    async fn test_terminate_kills_child() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let spawner = ProcessSpawner::new("sleep").with_args(["30"]);
        let mut link = spawner.spawn(WorkerInstanceId::new(1), tx).unwrap();
        link.terminate();
        // Killed by a signal: no exit code.
        assert_eq!(next(&mut rx).await.event, WorkerEvent::Exited(None));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let spawner = ProcessSpawner::new("/nonexistent/sim-worker");
        assert!(matches!(
            spawner.spawn(WorkerInstanceId::new(1), tx),
            Err(SpawnError::Process { .. })
        ));
    }
}
