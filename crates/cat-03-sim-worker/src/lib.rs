//! # CAT-03 Simulation Worker
//!
//! Executes one task at a time and answers with exactly one reply.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): resize target computation
//! - **Ports Layer** (`ports/`): [`Resizer`]
//! - **Adapters Layer** (`adapters/`): [`GifsicleResizer`]
//! - **Service Layer** (`service/`): [`TaskExecutor`], the
//!   [`TaskHandler`](shared_types::TaskHandler) implementation
//! - **Hosts** (`host/`): the stdio loop used by the `sim-worker` binary.
//!   The in-process thread host lives with the dispatcher, which only needs
//!   a `TaskHandler`.
//!
//! ## Task Flow (`sim`)
//!
//! ```text
//! patternSource ──parse──► Pattern ──FrameBuilder──► FrameSet
//!                                                       │
//!                                   encode ◄────────────┘
//!                                      │
//!                  <output_dir>/sim_base_<id>.gif ──Resizer──► sim_<id>.gif
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod host;
pub mod ports;
pub mod service;

pub use adapters::GifsicleResizer;
pub use config::WorkerConfig;
pub use domain::resize::{Axis, ResizeTarget};
pub use error::{ConfigError, ResizeError, WorkerError};
pub use host::run_stdio_loop;
pub use ports::Resizer;
pub use service::{base_gif_name, final_gif_name, TaskExecutor};
