//! Worker hosts.

pub mod process;
pub mod thread;

pub use process::ProcessSpawner;
pub use thread::ThreadSpawner;
