//! # Job Dispatcher
//!
//! Runs simulation jobs on a supervised worker and hands each caller exactly
//! one outcome.
//!
//! ## Guarantees
//!
//! - Every job gets a unique correlation id; replies are matched by id.
//! - Every job resolves exactly once: payload, `None` (deadline elapsed) or
//!   an error.
//! - A timed-out job restarts the worker. A worker fault or exit fails every
//!   pending job and restarts the worker.
//! - Events from an instance that has been replaced are ignored, so a
//!   timeout racing with the exit it causes restarts the worker once.
//!
//! ## Worker lifecycle
//!
//! ```text
//!            spawn ok
//! Spawning ───────────► Alive ──── reply ────► Alive
//!    ▲  │                 │
//!    │  │ spawn failed    │ fault / exit / timeout / send failed
//!    │  ▼                 ▼
//!    │ Faulted        Faulted | Exited
//!    │  │                 │
//!    └──┴── next submit ──┘ (immediately, for a live instance)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let handle = Supervisor::start(DispatcherConfig::default(), Arc::new(spawner));
//! match handle.basic_identify("3o!", 1000, Deadline::Default).await {
//!     Ok(Some(pt)) => println!("{}", pt.description()),
//!     Ok(None) => println!("timed out"),
//!     Err(e) => println!("{e}"),
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::{ProcessSpawner, ThreadSpawner};
pub use domain::{
    Deadline, DispatcherConfig, DispatcherStats, JobResult, RestartReason, WorkerState,
};
pub use domain::config::{DEFAULT_JOB_TIMEOUT, DEFAULT_RENDERER_TIMEOUT};
pub use error::{JobError, LinkError, SpawnError};
pub use ports::{EventSender, InstanceEvent, WorkerEvent, WorkerLink, WorkerSpawner};
pub use service::{DispatcherHandle, Supervisor};
