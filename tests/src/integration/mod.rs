//! Cross-crate integration tests.

pub mod fixtures;

#[cfg(test)]
mod chat_commands;
#[cfg(test)]
mod pipeline;
#[cfg(test)]
mod supervision;
