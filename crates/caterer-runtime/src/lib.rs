//! # Caterer Runtime
//!
//! Startup and command handling around the job dispatcher.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (logs to stderr, metrics registry)
//! 2. Load [`RuntimeConfig`] from the environment and validate it
//! 3. Build the worker host (child process or thread) and start the
//!    dispatcher
//! 4. Serve commands through [`Commands`]
//!
//! ```text
//! chat command ──► Commands ──► DispatcherHandle ──► Supervisor ──► worker
//!      ▲              │                                              │
//!      └── Reply ◄────┴──────────── JobResult ◄──────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config/` - `CATERER_*` environment configuration
//! - `wiring/` - worker host selection and dispatcher start
//! - `commands/` - `sim`, `identify`, `basic_identify` handlers and wording
//! - `stats/` - per-rule sim counter

pub mod commands;
pub mod config;
pub mod stats;
pub mod wiring;

pub use commands::{CommandError, Commands, Invocation, Reply, SoupSpec};
pub use config::{ConfigError, RuntimeConfig, WorkerMode};
pub use stats::{RuleCount, RuleStats};
pub use wiring::{build_spawner, start_dispatcher};

/// Split a shell line into command words and an optional inline pattern.
///
/// Everything after ` | ` is the pattern; `$` keeps its RLE meaning, and
/// `\n` escapes stand for newlines so a header fits on one line.
pub fn parse_shell_line(line: &str) -> Option<(Vec<String>, Option<String>)> {
    let (command, pattern) = match line.split_once(" | ") {
        Some((command, pattern)) => (command, Some(pattern.trim().replace("\\n", "\n"))),
        None => (line, None),
    };
    let argv: Vec<String> = command.split_whitespace().map(str::to_string).collect();
    if argv.is_empty() {
        return None;
    }
    Some((argv, pattern.filter(|p| !p.is_empty())))
}
