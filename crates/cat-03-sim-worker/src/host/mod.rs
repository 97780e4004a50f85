//! Worker hosts.

pub mod stdio;

pub use stdio::run_stdio_loop;
