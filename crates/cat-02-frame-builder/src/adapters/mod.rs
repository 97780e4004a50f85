//! Adapters for the external renderer.

pub mod command;
pub mod renderer_output;

pub use command::{CommandRenderer, CommandTemplate};
pub use renderer_output::parse_renderer_output;
