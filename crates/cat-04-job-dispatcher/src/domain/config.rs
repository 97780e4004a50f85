//! Dispatcher configuration.

use std::time::Duration;

/// Default deadline for ordinary jobs.
pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(30);

/// Default deadline for jobs that drive the external renderer.
pub const DEFAULT_RENDERER_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Deadline for [`Deadline::Default`](super::Deadline::Default).
    pub default_timeout: Duration,
    /// Deadline for [`Deadline::Renderer`](super::Deadline::Renderer).
    pub renderer_timeout: Duration,
    /// Capacity of the command channel.
    pub command_buffer: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_JOB_TIMEOUT,
            renderer_timeout: DEFAULT_RENDERER_TIMEOUT,
            command_buffer: 64,
        }
    }
}
