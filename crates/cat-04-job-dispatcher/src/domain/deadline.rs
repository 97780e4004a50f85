//! Per-job deadline policy.

use super::DispatcherConfig;
use std::time::Duration;

/// How long a caller is willing to wait for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Deadline {
    /// The configured default (30 s unless overridden).
    #[default]
    Default,
    /// The configured external renderer deadline.
    Renderer,
    After(Duration),
    /// Wait until the job completes or the worker dies.
    Never,
}

impl Deadline {
    /// Concrete timeout, `None` for an unbounded wait.
    pub fn resolve(self, config: &DispatcherConfig) -> Option<Duration> {
        match self {
            Deadline::Default => Some(config.default_timeout),
            Deadline::Renderer => Some(config.renderer_timeout),
            Deadline::After(d) => Some(d),
            Deadline::Never => None,
        }
    }
}
