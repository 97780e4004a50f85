//! # Shared Types Crate
//!
//! Types that cross crate boundaries: job and worker identifiers, cell
//! geometry, colours, the results a worker produces and the JSON wire
//! protocol spoken between the dispatcher and its worker.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that travels between the
//!   dispatcher and a worker is defined here.
//! - **Opaque payloads**: the dispatcher never inspects success payloads; it
//!   forwards `serde_json::Value` and typed helpers decode at the edge.

pub mod errors;
pub mod geometry;
pub mod ids;
pub mod ipc;
pub mod results;

pub use errors::*;
pub use geometry::*;
pub use ids::*;
pub use ipc::*;
pub use results::*;
