//! # Runtime Configuration
//!
//! Everything is read from `CATERER_*` environment variables; unset or blank
//! variables keep their defaults.
//!
//! | Variable | Default |
//! |---|---|
//! | `CATERER_WORKER_MODE` | `process` (`thread` runs the worker in-process; tests and development only) |
//! | `CATERER_WORKER_BIN` | `sim-worker` next to the current executable |
//! | `CATERER_JOB_TIMEOUT_SECS` | `30` |
//! | `CATERER_RENDERER_TIMEOUT_SECS` | `300` |
//! | `CATERER_ADMINS` | empty; comma-separated user ids allowed `notimeout` |
//!
//! Worker settings (`CATERER_OUTPUT_DIR`, `CATERER_RENDERER_CMD`, ...) are
//! described on [`WorkerConfig`].

use cat_03_sim_worker::{ConfigError as WorkerConfigError, WorkerConfig};
use cat_04_job_dispatcher::{DispatcherConfig, DEFAULT_JOB_TIMEOUT, DEFAULT_RENDERER_TIMEOUT};
use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const WORKER_BIN_NAME: &str = "sim-worker";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown worker mode `{0}` (expected `process` or `thread`)")]
    InvalidWorkerMode(String),

    #[error("{var} must be a whole number of seconds, got `{value}`")]
    InvalidSeconds { var: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("Worker binary {0} does not exist")]
    WorkerBinMissing(PathBuf),

    #[error(transparent)]
    Worker(#[from] WorkerConfigError),
}

/// Where the simulation worker runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkerMode {
    /// Child process speaking JSON lines over stdio.
    #[default]
    Process,
    /// OS thread inside the runtime process. For tests and development
    /// only: a timed-out task cannot be stopped and keeps its core busy.
    Thread,
}

impl FromStr for WorkerMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "process" => Ok(WorkerMode::Process),
            "thread" => Ok(WorkerMode::Thread),
            _ => Err(ConfigError::InvalidWorkerMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub worker_mode: WorkerMode,
    /// Program spawned in [`WorkerMode::Process`].
    pub worker_bin: PathBuf,
    pub job_timeout: Duration,
    /// Deadline for scripts that drive the external renderer.
    pub renderer_timeout: Duration,
    /// User ids allowed to lift the deadline with `notimeout`.
    pub admins: BTreeSet<String>,
    pub worker: WorkerConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_mode: WorkerMode::default(),
            worker_bin: default_worker_bin(),
            job_timeout: DEFAULT_JOB_TIMEOUT,
            renderer_timeout: DEFAULT_RENDERER_TIMEOUT,
            admins: BTreeSet::new(),
            worker: WorkerConfig::default(),
        }
    }
}

/// `sim-worker` in the directory of the running executable.
fn default_worker_bin() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(WORKER_BIN_NAME)))
        .unwrap_or_else(|| PathBuf::from(WORKER_BIN_NAME))
}

impl RuntimeConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::from_vars(|name| env::var(name).ok())?;
        config.worker = WorkerConfig::from_env();
        Ok(config)
    }

    /// Build from an arbitrary variable lookup. Worker settings keep their
    /// defaults.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| var(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(mode) = var("CATERER_WORKER_MODE") {
            config.worker_mode = mode.parse()?;
        }
        if let Some(bin) = var("CATERER_WORKER_BIN") {
            config.worker_bin = PathBuf::from(bin);
        }
        if let Some(secs) = var("CATERER_JOB_TIMEOUT_SECS") {
            config.job_timeout = parse_seconds("CATERER_JOB_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = var("CATERER_RENDERER_TIMEOUT_SECS") {
            config.renderer_timeout = parse_seconds("CATERER_RENDERER_TIMEOUT_SECS", &secs)?;
        }
        if let Some(admins) = var("CATERER_ADMINS") {
            config.admins = admins
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect();
        }
        Ok(config)
    }

    /// Check the configuration before starting anything.
    ///
    /// Creates the worker output directory when it is missing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.job_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("CATERER_JOB_TIMEOUT_SECS"));
        }
        if self.renderer_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("CATERER_RENDERER_TIMEOUT_SECS"));
        }
        if self.worker_mode == WorkerMode::Process && !self.worker_bin.exists() {
            return Err(ConfigError::WorkerBinMissing(self.worker_bin.clone()));
        }
        self.worker.validate()?;
        Ok(())
    }

    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            default_timeout: self.job_timeout,
            renderer_timeout: self.renderer_timeout,
            ..DispatcherConfig::default()
        }
    }

    pub fn is_admin(&self, user: &str) -> bool {
        self.admins.contains(user)
    }
}

fn parse_seconds(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::InvalidSeconds {
            var,
            value: value.to_string(),
        })
}
