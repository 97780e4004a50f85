//! Prometheus metrics.
//!
//! All metrics follow the naming convention: `caterer_<component>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: jobs submitted, completed, timed out; worker restarts
//! - **Gauge**: jobs currently pending
//! - **Histogram**: job duration, GIF size, frames per GIF

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, HistogramVec, Opts,
    Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // DISPATCHER METRICS
    // =========================================================================

    /// Jobs accepted by the dispatcher
    pub static ref JOBS_SUBMITTED: CounterVec = CounterVec::new(
        Opts::new("caterer_dispatcher_jobs_submitted_total", "Jobs submitted to the dispatcher"),
        &["kind"]  // kind: sim/identify/basic_identify
    ).expect("metric creation failed");

    /// Jobs resolved, by outcome
    pub static ref JOBS_COMPLETED: CounterVec = CounterVec::new(
        Opts::new("caterer_dispatcher_jobs_completed_total", "Jobs resolved by the dispatcher"),
        &["kind", "outcome"]  // outcome: success/expected_failure/unexpected_failure/worker_lost/timeout
    ).expect("metric creation failed");

    /// Jobs whose deadline elapsed
    pub static ref JOB_TIMEOUTS: CounterVec = CounterVec::new(
        Opts::new("caterer_dispatcher_job_timeouts_total", "Jobs that hit their deadline"),
        &["kind"]
    ).expect("metric creation failed");

    /// Worker restarts
    pub static ref WORKER_RESTARTS: CounterVec = CounterVec::new(
        Opts::new("caterer_dispatcher_worker_restarts_total", "Worker instances spawned after the first"),
        &["reason"]  // reason: timeout/fault/exit/send_failed/respawn
    ).expect("metric creation failed");

    /// Jobs waiting for a reply
    pub static ref PENDING_JOBS: Gauge = Gauge::new(
        "caterer_dispatcher_pending_jobs",
        "Jobs currently waiting for a worker reply"
    ).expect("metric creation failed");

    /// Time from submission to resolution
    pub static ref JOB_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "caterer_dispatcher_job_duration_seconds",
            "Time from submission to resolution"
        ).buckets(exponential_buckets(0.01, 2.0, 15).expect("valid buckets")),
        &["kind"]
    ).expect("metric creation failed");

    // =========================================================================
    // WORKER METRICS
    // =========================================================================

    /// Tasks handled by a worker executor
    pub static ref TASKS_HANDLED: CounterVec = CounterVec::new(
        Opts::new("caterer_worker_tasks_total", "Tasks handled by the worker"),
        &["kind", "outcome"]
    ).expect("metric creation failed");

    /// Size of encoded GIFs
    pub static ref GIF_BYTES: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "caterer_worker_gif_size_bytes",
            "Size of encoded GIFs before resizing"
        ).buckets(exponential_buckets(256.0, 4.0, 10).expect("valid buckets"))
    ).expect("metric creation failed");

    /// Frames per encoded GIF
    pub static ref GIF_FRAMES: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "caterer_worker_gif_frames",
            "Number of frames per encoded GIF"
        ).buckets(exponential_buckets(1.0, 4.0, 9).expect("valid buckets"))
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; already registered collectors are skipped.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Dispatcher
        Box::new(JOBS_SUBMITTED.clone()),
        Box::new(JOBS_COMPLETED.clone()),
        Box::new(JOB_TIMEOUTS.clone()),
        Box::new(WORKER_RESTARTS.clone()),
        Box::new(PENDING_JOBS.clone()),
        Box::new(JOB_DURATION.clone()),
        // Worker
        Box::new(TASKS_HANDLED.clone()),
        Box::new(GIF_BYTES.clone()),
        Box::new(GIF_FRAMES.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
    ($histogram:expr, $labels:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram.with_label_values($labels))
    };
}
