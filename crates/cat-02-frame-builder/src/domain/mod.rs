//! Script tokens, canvas layout and the stabilization detector.

pub mod layout;
pub mod script;
pub mod stability;
