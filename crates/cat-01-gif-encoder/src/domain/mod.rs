//! Domain layer: frames and palettes.

pub mod frame;
pub mod palette;
