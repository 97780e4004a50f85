//! Startup wiring: worker host selection and dispatcher start.

use crate::config::{RuntimeConfig, WorkerMode};
use cat_04_job_dispatcher::{
    DispatcherHandle, ProcessSpawner, Supervisor, ThreadSpawner, WorkerSpawner,
};
use sim_engine::SimulationEngine;
use std::sync::Arc;
use tracing::{info, warn};

/// Worker host for the configured mode.
///
/// Process workers read their own settings from the inherited environment.
pub fn build_spawner(
    config: &RuntimeConfig,
    engine: Arc<dyn SimulationEngine>,
) -> Arc<dyn WorkerSpawner> {
    match config.worker_mode {
        WorkerMode::Process => {
            info!(program = %config.worker_bin.display(), "Using process worker");
            Arc::new(ProcessSpawner::new(&config.worker_bin))
        }
        WorkerMode::Thread => {
            warn!(
                output_dir = %config.worker.output_dir.display(),
                "Using thread worker; timed-out tasks cannot be stopped in this mode"
            );
            let executor = config.worker.build_executor(engine);
            Arc::new(ThreadSpawner::new(Arc::new(executor)))
        }
    }
}

/// Start the dispatcher. Must be called inside a tokio runtime.
pub fn start_dispatcher(
    config: &RuntimeConfig,
    engine: Arc<dyn SimulationEngine>,
) -> DispatcherHandle {
    Supervisor::start(config.dispatcher_config(), build_spawner(config, engine))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cat_04_job_dispatcher::Deadline;
    use sim_engine::LifeEngine;

    #[tokio::test]
    async fn test_thread_mode_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RuntimeConfig {
            worker_mode: WorkerMode::Thread,
            ..RuntimeConfig::default()
        };
        config.worker.output_dir = dir.path().to_path_buf();

        let handle = start_dispatcher(&config, Arc::new(LifeEngine::new()));
        let pt = handle
            .basic_identify("3o!", 16, Deadline::Default)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pt.period, 2);

        let stats = handle.stats().await.unwrap();
        assert_eq!(stats.completed, 1);
        handle.shutdown().await.unwrap();
    }
}
