//! Dispatcher domain: configuration, deadlines, the pending table and
//! worker state.

pub mod config;
pub mod deadline;
pub mod pending;
pub mod state;

pub use config::DispatcherConfig;
pub use deadline::Deadline;
pub use pending::{JobResult, PendingJob, PendingTable};
pub use state::{DispatcherStats, RestartReason, WorkerState};
