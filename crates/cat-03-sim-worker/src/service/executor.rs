//! Task execution.
//!
//! Every request produces exactly one reply. Expected failures (bad script,
//! bad rule) become `ExpectedFailure` with their category; everything else,
//! including a panic inside the task, becomes `UnexpectedFailure`.

use crate::domain::resize::ResizeTarget;
use crate::error::WorkerError;
use crate::ports::Resizer;
use cat_02_frame_builder::{ExternalRenderer, FrameBuilder};
use caterer_telemetry::{metric_inc, metric_observe, GIF_BYTES, GIF_FRAMES, TASKS_HANDLED};
use shared_types::{
    JobId, SimSummary, TaskHandler, TaskOutcome, TaskPayload, TaskReply, TaskRequest,
};
use sim_engine::SimulationEngine;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// File name of the GIF written straight by the encoder for job `id`.
pub fn base_gif_name(id: JobId) -> String {
    format!("sim_base_{id}.gif")
}

/// File name of the resized GIF for job `id`.
pub fn final_gif_name(id: JobId) -> String {
    format!("sim_{id}.gif")
}

/// Runs tasks against a simulation engine.
#[derive(Clone)]
pub struct TaskExecutor {
    engine: Arc<dyn SimulationEngine>,
    builder: FrameBuilder,
    resizer: Option<Arc<dyn Resizer>>,
    output_dir: PathBuf,
}

impl TaskExecutor {
    pub fn new(engine: Arc<dyn SimulationEngine>, output_dir: impl AsRef<Path>) -> Self {
        Self {
            builder: FrameBuilder::new(Arc::clone(&engine)),
            engine,
            resizer: None,
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn with_renderer(mut self, renderer: Option<Arc<dyn ExternalRenderer>>) -> Self {
        self.builder = self.builder.with_renderer(renderer);
        self
    }

    pub fn with_resizer(mut self, resizer: Option<Arc<dyn Resizer>>) -> Self {
        self.resizer = resizer;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Run one task to its result payload. Output files are named after `id`.
    pub fn execute(
        &self,
        id: JobId,
        payload: &TaskPayload,
    ) -> Result<serde_json::Value, WorkerError> {
        match payload {
            TaskPayload::Sim {
                argv,
                pattern_source,
            } => Ok(serde_json::to_value(self.sim(id, argv, pattern_source)?)?),
            TaskPayload::Identify {
                pattern_source,
                generation_limit,
            } => {
                let pattern = self.engine.parse_pattern(pattern_source)?;
                let identified = self.engine.identify(pattern.as_ref(), *generation_limit);
                Ok(serde_json::to_value(identified)?)
            }
            TaskPayload::BasicIdentify {
                pattern_source,
                generation_limit,
            } => {
                let pattern = self.engine.parse_pattern(pattern_source)?;
                let pattern_type = self.engine.find_type(pattern.as_ref(), *generation_limit);
                Ok(serde_json::to_value(pattern_type)?)
            }
        }
    }

    /// Parse, run the script, encode and optionally resize.
    ///
    /// `argv[0]` is the command name and is skipped. Each job writes its own
    /// files, which are never rewritten afterwards.
    pub fn sim(
        &self,
        id: JobId,
        argv: &[String],
        pattern_source: &str,
    ) -> Result<SimSummary, WorkerError> {
        let started = Instant::now();
        let pattern = self.engine.parse_pattern(pattern_source)?;
        let args = argv.get(1..).unwrap_or_default();
        let set = self.builder.build(pattern, args)?;
        let parse_time = started.elapsed();

        let gif = set.encode()?;
        metric_observe!(GIF_BYTES, gif.len() as f64);
        metric_observe!(GIF_FRAMES, set.frames.len() as f64);

        let base = self.output_dir.join(base_gif_name(id));
        gif.write_to(&base)?;

        let (width, height) = (set.canvas.width, set.canvas.height);
        let gif_path = match &self.resizer {
            Some(resizer) => {
                let target = ResizeTarget::compute(set.gif_size, width, height);
                let output = self.output_dir.join(final_gif_name(id));
                resizer.resize(&base, &output, target)?;
                output
            }
            None => base,
        };

        debug!(
            frames = set.frames.len(),
            width,
            height,
            bytes = gif.len(),
            parse_ms = parse_time.as_millis() as u64,
            total_ms = started.elapsed().as_millis() as u64,
            "Simulation rendered"
        );

        Ok(SimSummary {
            parse_time_ms: parse_time.as_secs_f64() * 1000.0,
            description: set.description,
            gif_path,
            width,
            height,
            frames: set.frames.len(),
        })
    }
}

impl TaskHandler for TaskExecutor {
    fn handle(&self, request: TaskRequest) -> TaskReply {
        let TaskRequest { id, payload } = request;
        let kind = payload.kind();
        let started = Instant::now();

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.execute(id, &payload)));
        let outcome = match result {
            Ok(Ok(data)) => TaskOutcome::Success(data),
            Ok(Err(err)) => match err.to_domain() {
                Some(domain) => {
                    info!(job_id = %id, kind = %kind, error = %err, "Task rejected");
                    TaskOutcome::from(domain)
                }
                None => {
                    error!(job_id = %id, kind = %kind, error = %err, "Task failed");
                    TaskOutcome::UnexpectedFailure {
                        message: err.to_string(),
                    }
                }
            },
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(job_id = %id, kind = %kind, panic = %message, "Task panicked");
                TaskOutcome::UnexpectedFailure {
                    message: format!("task panicked: {message}"),
                }
            }
        };

        let label = match &outcome {
            TaskOutcome::Success(_) => "success",
            TaskOutcome::ExpectedFailure { .. } => "expected_failure",
            TaskOutcome::UnexpectedFailure { .. } => "unexpected_failure",
        };
        metric_inc!(TASKS_HANDLED, &[kind.as_str(), label]);
        if started.elapsed().as_secs() >= 10 {
            warn!(job_id = %id, kind = %kind, elapsed_ms = started.elapsed().as_millis() as u64, "Slow task");
        }

        TaskReply::new(id, outcome)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
