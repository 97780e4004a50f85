//! Supervisor actor and its handle.

mod handle;
mod supervisor;

pub use handle::DispatcherHandle;
pub use supervisor::Supervisor;
