//! Domain layer: rules, the sparse pattern and classification.

pub mod classify;
pub mod pattern;
pub mod rule;
