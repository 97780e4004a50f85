//! # Dispatcher <-> Worker Protocol
//!
//! One request produces exactly one reply carrying the same [`JobId`].
//! In process mode each message is a single JSON object on its own line.
//!
//! ```text
//! request   {"id":1,"type":"sim","argv":["sim","30"],"patternSource":"x = 3, y = 1\n3o!"}
//! success   {"id":1,"ok":true,"data":{...}}
//! expected  {"id":1,"ok":false,"error":"Invalid part: foo","intentional":true,"type":"BotError"}
//! fault     {"id":1,"ok":false,"error":"...","intentional":false}
//! ```

use crate::errors::{DomainError, ErrorCategory};
use crate::ids::JobId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of task, used for logging and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Sim,
    Identify,
    BasicIdentify,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Sim => "sim",
            TaskKind::Identify => "identify",
            TaskKind::BasicIdentify => "basic_identify",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task-specific request fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskPayload {
    /// Run a frame script and render it to a GIF.
    #[serde(rename_all = "camelCase")]
    Sim {
        argv: Vec<String>,
        pattern_source: String,
    },
    /// Full identification of a pattern.
    #[serde(rename_all = "camelCase")]
    Identify {
        pattern_source: String,
        generation_limit: u64,
    },
    /// Period / displacement / population only.
    #[serde(rename_all = "camelCase")]
    BasicIdentify {
        pattern_source: String,
        generation_limit: u64,
    },
}

impl TaskPayload {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskPayload::Sim { .. } => TaskKind::Sim,
            TaskPayload::Identify { .. } => TaskKind::Identify,
            TaskPayload::BasicIdentify { .. } => TaskKind::BasicIdentify,
        }
    }

    pub fn pattern_source(&self) -> &str {
        match self {
            TaskPayload::Sim { pattern_source, .. }
            | TaskPayload::Identify { pattern_source, .. }
            | TaskPayload::BasicIdentify { pattern_source, .. } => pattern_source,
        }
    }
}

/// A request as sent to the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRequest {
    pub id: JobId,
    #[serde(flatten)]
    pub payload: TaskPayload,
}

impl TaskRequest {
    pub fn new(id: JobId, payload: TaskPayload) -> Self {
        Self { id, payload }
    }
}

/// Result of one task as seen by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    /// Task-specific payload, forwarded to the caller untouched.
    Success(serde_json::Value),
    /// A [`DomainError`] raised on purpose by the task.
    ExpectedFailure {
        category: ErrorCategory,
        message: String,
    },
    /// Anything else, with diagnostic text.
    UnexpectedFailure { message: String },
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success(_))
    }
}

impl From<DomainError> for TaskOutcome {
    fn from(err: DomainError) -> Self {
        TaskOutcome::ExpectedFailure {
            category: err.category(),
            message: err.message().to_string(),
        }
    }
}

/// A reply as sent by the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireReply", into = "WireReply")]
pub struct TaskReply {
    pub id: JobId,
    pub outcome: TaskOutcome,
}

impl TaskReply {
    pub fn new(id: JobId, outcome: TaskOutcome) -> Self {
        Self { id, outcome }
    }

    pub fn success(id: JobId, data: serde_json::Value) -> Self {
        Self::new(id, TaskOutcome::Success(data))
    }

    pub fn unexpected(id: JobId, message: impl Into<String>) -> Self {
        Self::new(
            id,
            TaskOutcome::UnexpectedFailure {
                message: message.into(),
            },
        )
    }
}

/// Flat JSON shape of a reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireReply {
    id: JobId,
    ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    intentional: Option<bool>,
    /// Error class name; only `BotError` marks a command error.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
}

impl From<WireReply> for TaskReply {
    fn from(wire: WireReply) -> Self {
        let outcome = if wire.ok {
            TaskOutcome::Success(wire.data.unwrap_or(serde_json::Value::Null))
        } else {
            let message = wire.error.unwrap_or_default();
            if wire.intentional.unwrap_or(false) {
                // Anything intentional that is not explicitly a command error
                // is reported as a rule error.
                let category = match wire.category.as_deref() {
                    Some(name) if name == ErrorCategory::Command.as_str() => ErrorCategory::Command,
                    _ => ErrorCategory::Rule,
                };
                TaskOutcome::ExpectedFailure { category, message }
            } else {
                TaskOutcome::UnexpectedFailure { message }
            }
        };
        TaskReply {
            id: wire.id,
            outcome,
        }
    }
}

impl From<TaskReply> for WireReply {
    fn from(reply: TaskReply) -> Self {
        let id = reply.id;
        match reply.outcome {
            TaskOutcome::Success(data) => WireReply {
                id,
                ok: true,
                data: Some(data),
                error: None,
                intentional: None,
                category: None,
            },
            TaskOutcome::ExpectedFailure { category, message } => WireReply {
                id,
                ok: false,
                data: None,
                error: Some(message),
                intentional: Some(true),
                category: Some(category.as_str().to_string()),
            },
            TaskOutcome::UnexpectedFailure { message } => WireReply {
                id,
                ok: false,
                data: None,
                error: Some(message),
                intentional: Some(false),
                category: None,
            },
        }
    }
}

/// Something that turns a request into its reply.
///
/// Implemented by the worker's executor; in-process worker hosts call it on
/// their own thread.
pub trait TaskHandler: Send + Sync + 'static {
    fn handle(&self, request: TaskRequest) -> TaskReply;
}
