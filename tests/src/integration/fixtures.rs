//! Shared fixtures for the integration tests and benchmarks.

use cat_03_sim_worker::TaskExecutor;
use cat_04_job_dispatcher::{
    DispatcherConfig, DispatcherHandle, Supervisor, ThreadSpawner,
};
use shared_types::{TaskHandler, TaskPayload, TaskReply, TaskRequest};
use sim_engine::{LifeEngine, SimulationEngine};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub const BLINKER: &str = "x = 3, y = 1, rule = B3/S23\n3o!\n";
pub const GLIDER: &str = "x = 3, y = 3, rule = B3/S23\nbo$2bo$3o!\n";
pub const BRIANS_BRAIN: &str = "x = 2, y = 1, rule = B2/S/C3\nAB!\n";

/// Argument word that makes [`HangingHandler`] stall.
pub const HANG: &str = "hang";

pub fn engine() -> Arc<dyn SimulationEngine> {
    Arc::new(LifeEngine::new())
}

pub fn argv(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// One decoded GIF frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub delay: u16,
    pub indices: Vec<u8>,
}

/// Decode with the `gif` crate into `(width, height, frames)`.
pub fn decode_gif(bytes: &[u8]) -> Result<(u16, u16, Vec<DecodedFrame>), gif::DecodingError> {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::Indexed);
    let mut decoder = options.read_info(bytes)?;
    let (width, height) = (decoder.width(), decoder.height());
    let mut frames = Vec::new();
    while let Some(frame) = decoder.read_next_frame()? {
        frames.push(DecodedFrame {
            delay: frame.delay,
            indices: frame.buffer.to_vec(),
        });
    }
    Ok((width, height, frames))
}

/// The real executor, except that a `sim` whose arguments contain
/// [`HANG`] blocks for `stall` first.
pub struct HangingHandler {
    inner: TaskExecutor,
    stall: Duration,
}

impl HangingHandler {
    pub fn new(output_dir: &Path, stall: Duration) -> Self {
        Self {
            inner: TaskExecutor::new(engine(), output_dir),
            stall,
        }
    }
}

impl TaskHandler for HangingHandler {
    fn handle(&self, request: TaskRequest) -> TaskReply {
        if let TaskPayload::Sim { argv, .. } = &request.payload {
            if argv.iter().any(|a| a == HANG) {
                std::thread::sleep(self.stall);
                return TaskReply::unexpected(request.id, "stalled job finished late");
            }
        }
        self.inner.handle(request)
    }
}

/// Dispatcher over a thread worker running `handler`.
pub fn start_thread_dispatcher(
    handler: Arc<dyn TaskHandler>,
    default_timeout: Duration,
) -> DispatcherHandle {
    let config = DispatcherConfig {
        default_timeout,
        ..DispatcherConfig::default()
    };
    Supervisor::start(config, Arc::new(ThreadSpawner::new(handler)))
}

/// Dispatcher over the real executor writing into `output_dir`.
pub fn start_executor_dispatcher(output_dir: &Path) -> DispatcherHandle {
    start_thread_dispatcher(
        Arc::new(TaskExecutor::new(engine(), output_dir)),
        Duration::from_secs(30),
    )
}
