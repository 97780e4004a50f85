//! # Caterer Telemetry
//!
//! Logging and metrics shared by the runtime, the dispatcher and the
//! worker.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` registry with an `EnvFilter`, pretty
//!   output for development and JSON in containers
//! - **Metrics**: Prometheus counters, gauges and histograms in a global
//!   registry, rendered with [`encode_metrics`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use caterer_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).expect("telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CATERER_LOG_LEVEL` | `info` | Log level filter (`RUST_LOG` also honoured) |
//! | `CATERER_JSON_LOGS` | container-dependent | JSON log lines |
//! | `CATERER_CONSOLE_OUTPUT` | `true` | Emit log lines at all |
//! | `CATERER_SERVICE_NAME` | `caterer` | Name in the startup line |

mod config;
pub mod metrics;
mod tracing_setup;

pub use config::{LogTarget, TelemetryConfig};
pub use metrics::{
    encode_metrics, register_metrics, GIF_BYTES, GIF_FRAMES, JOBS_COMPLETED, JOBS_SUBMITTED,
    JOB_DURATION, JOB_TIMEOUTS, PENDING_JOBS, TASKS_HANDLED, WORKER_RESTARTS,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and register metrics.
///
/// Returns a guard that should be held for the lifetime of the process.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    register_metrics()?;
    tracing_setup::init_tracing(&config)?;
    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}

/// Convenience macro for recording a metric with a value.
#[macro_export]
macro_rules! metric_observe {
    ($metric:expr, $value:expr) => {
        $metric.observe($value)
    };
    ($metric:expr, $labels:expr, $value:expr) => {
        $metric.with_label_values($labels).observe($value)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_macros() {
        metric_inc!(TASKS_HANDLED, &["sim", "success"]);
        metric_observe!(GIF_BYTES, 1024.0);
        metric_observe!(JOB_DURATION, &["identify"], 0.5);
        assert!(TASKS_HANDLED.with_label_values(&["sim", "success"]).get() >= 1.0);
    }
}
