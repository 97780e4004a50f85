//! Reply wording.

use cat_04_job_dispatcher::JobError;
use shared_types::{DomainError, ErrorCategory, PatternType};
use sim_engine::EngineError;
use std::fmt::Write as _;
use std::path::PathBuf;
use thiserror::Error;

/// What a command sends back to the chat.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reply {
    pub content: Option<String>,
    /// Attachment, the rendered GIF for `sim`.
    pub file: Option<PathBuf>,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            file: None,
        }
    }
}

/// Why a command produced no result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("{0}")]
    Domain(DomainError),

    #[error("Timed out!")]
    TimedOut,

    /// Details are logged, never shown.
    #[error("{0}")]
    Internal(String),
}

impl CommandError {
    pub fn command(message: impl Into<String>) -> Self {
        CommandError::Domain(DomainError::command(message))
    }

    /// Text shown to the user.
    pub fn reply_text(&self) -> String {
        match self {
            CommandError::Domain(err) => match err.category() {
                ErrorCategory::Command => format!("Error: {}", err.message()),
                ErrorCategory::Rule => format!("Rule error: {}", err.message()),
            },
            CommandError::TimedOut => "Error: Timed out!".to_string(),
            CommandError::Internal(_) => "Internal error".to_string(),
        }
    }
}

impl From<DomainError> for CommandError {
    fn from(err: DomainError) -> Self {
        CommandError::Domain(err)
    }
}

impl From<EngineError> for CommandError {
    fn from(err: EngineError) -> Self {
        CommandError::Domain(err.into())
    }
}

impl From<JobError> for CommandError {
    fn from(err: JobError) -> Self {
        match err.as_domain() {
            Some(domain) => CommandError::Domain(domain),
            None => CommandError::Internal(err.to_string()),
        }
    }
}

/// Multi-line summary of an identification.
pub fn format_pattern_type(
    title: &str,
    pt: &PatternType,
    heat: Option<f64>,
    apgcode: Option<&str>,
) -> String {
    let mut out = format!("{title}\n");
    if pt.period > 0 {
        let _ = writeln!(out, "Period: {}", pt.period);
    }
    if pt.displacement != (0, 0) {
        let _ = writeln!(
            out,
            "Displacement: ({}, {})",
            pt.displacement.0, pt.displacement.1
        );
    }
    if pt.stabilized_at > 0 {
        let _ = writeln!(out, "Stabilizes at: {}", pt.stabilized_at);
    }

    let pops = if pt.period > 0 {
        let end = (pt.stabilized_at + pt.period) as usize;
        &pt.populations[..end.min(pt.populations.len())]
    } else {
        &pt.populations[..]
    };
    if let (Some(min), Some(max)) = (pops.iter().min(), pops.iter().max()) {
        let avg = pops.iter().sum::<u64>() as f64 / pops.len() as f64;
        let _ = writeln!(
            out,
            "Populations: {min} | {} | {max}",
            (avg * 100.0).round() / 100.0
        );
    }

    if pt.period > 1 {
        if let Some(heat) = heat {
            let _ = writeln!(out, "Heat: {heat}");
        }
    }
    if let Some(code) = apgcode.filter(|c| *c != "PATHOLOGICAL") {
        let _ = writeln!(out, "{code}");
    }
    out.trim_end().to_string()
}
