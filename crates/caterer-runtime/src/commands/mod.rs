//! # Command Handlers
//!
//! The calling layer in front of the dispatcher. Handlers pick the pattern
//! (attached RLE or a random soup), decide the deadline policy, submit the
//! job and turn the outcome into reply text.
//!
//! | Command | Job | Deadline |
//! |---|---|---|
//! | `sim [notimeout] [rand ...] [time] <script>` | `sim` | renderer deadline if the script uses `ca` |
//! | `identify [notimeout] [limit]` | `identify` | default |
//! | `basic_identify` / `minmax-less` `[notimeout] [limit]` | `basic_identify` | default |
//! | `simstats` | none | none |
//!
//! `notimeout` lifts the deadline and is reserved for admins.

mod reply;
mod soup;

pub use reply::{format_pattern_type, CommandError, Reply};
pub use soup::SoupSpec;

use crate::stats::RuleStats;
use cat_04_job_dispatcher::{Deadline, DispatcherHandle};
use sim_engine::{Pattern, SimulationEngine};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Generation limit when `identify` is not given one.
pub const DEFAULT_IDENTIFY_LIMIT: u64 = 256;

const STATS_SHOWN: usize = 10;

/// One command as received from the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub user: String,
    /// Command words, `argv[0]` being the command name.
    pub argv: Vec<String>,
    /// RLE attached to or referenced by the message.
    pub pattern: Option<String>,
}

impl Invocation {
    pub fn new(user: impl Into<String>, argv: Vec<String>, pattern: Option<String>) -> Self {
        Self {
            user: user.into(),
            argv,
            pattern,
        }
    }
}

#[derive(Clone)]
pub struct Commands {
    dispatcher: DispatcherHandle,
    engine: Arc<dyn SimulationEngine>,
    admins: Arc<BTreeSet<String>>,
    stats: Arc<RuleStats>,
}

impl Commands {
    pub fn new(
        dispatcher: DispatcherHandle,
        engine: Arc<dyn SimulationEngine>,
        admins: BTreeSet<String>,
    ) -> Self {
        Self {
            dispatcher,
            engine,
            admins: Arc::new(admins),
            stats: Arc::new(RuleStats::new()),
        }
    }

    pub fn rule_stats(&self) -> &RuleStats {
        &self.stats
    }

    /// Run a command and word its reply. Never fails: errors become text.
    pub async fn run(&self, invocation: Invocation) -> Reply {
        let name = invocation.argv.first().cloned().unwrap_or_default();
        let result = match name.as_str() {
            "sim" => self.sim(invocation).await,
            "identify" => self.identify(invocation).await,
            "basic_identify" | "minmax-less" => self.basic_identify(invocation).await,
            "simstats" => Ok(self.sim_stats()),
            other => Err(CommandError::command(format!("Unknown command: {other}"))),
        };
        result.unwrap_or_else(|err| {
            if let CommandError::Internal(detail) = &err {
                error!(command = %name, error = %detail, "Command failed");
            }
            Reply::text(err.reply_text())
        })
    }

    pub async fn sim(&self, invocation: Invocation) -> Result<Reply, CommandError> {
        let started = Instant::now();
        let mut argv = invocation.argv;
        let no_timeout = self.take_no_timeout(&invocation.user, &mut argv)?;

        let pattern = if argv.get(1).map(String::as_str) == Some("rand") {
            let (spec, used) = SoupSpec::parse(&argv[2..])?;
            argv.drain(1..2 + used);
            spec.build(self.engine.as_ref(), &mut rand::thread_rng())?
        } else {
            self.find_pattern(invocation.pattern.as_deref())?
        };
        let output_time = take_word(&mut argv, "time");

        let deadline = if no_timeout {
            Deadline::Never
        } else if uses_renderer(&argv, pattern.as_ref()) {
            Deadline::Renderer
        } else {
            Deadline::Default
        };
        let rule = pattern.rule_str().to_string();

        let summary = self
            .dispatcher
            .simulate(argv, pattern.to_rle(), deadline)
            .await?
            .ok_or(CommandError::TimedOut)?;
        self.stats.record(&rule);
        info!(
            rule = %rule,
            frames = summary.frames,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Sim complete"
        );

        let content = if output_time {
            let total = (started.elapsed().as_secs_f64() * 1000.0).round() / 1000.0;
            let parse = summary.parse_time_ms.round() / 1000.0;
            let mut text = format!("Took {total} seconds ({parse} to parse)");
            if let Some(desc) = &summary.description {
                text.push('\n');
                text.push_str(desc);
            }
            Some(text)
        } else {
            summary.description.clone()
        };
        Ok(Reply {
            content,
            file: Some(summary.gif_path),
        })
    }

    pub async fn identify(&self, invocation: Invocation) -> Result<Reply, CommandError> {
        let mut argv = invocation.argv;
        let deadline = self.deadline(&invocation.user, &mut argv)?;
        let limit = parse_limit(argv.get(1));
        let pattern = self.find_pattern(invocation.pattern.as_deref())?;

        let identified = self
            .dispatcher
            .identify(pattern.to_rle(), limit, deadline)
            .await?
            .ok_or(CommandError::TimedOut)?;
        Ok(Reply::text(format_pattern_type(
            &identified.description,
            &identified.pattern_type,
            identified.heat,
            Some(&identified.apgcode),
        )))
    }

    pub async fn basic_identify(&self, invocation: Invocation) -> Result<Reply, CommandError> {
        let mut argv = invocation.argv;
        let deadline = self.deadline(&invocation.user, &mut argv)?;
        let limit = parse_limit(argv.get(1));
        let pattern = self.find_pattern(invocation.pattern.as_deref())?;

        let pt = self
            .dispatcher
            .basic_identify(pattern.to_rle(), limit, deadline)
            .await?
            .ok_or(CommandError::TimedOut)?;
        Ok(Reply::text(format_pattern_type(
            &pt.description(),
            &pt,
            None,
            None,
        )))
    }

    /// Most simulated rules.
    pub fn sim_stats(&self) -> Reply {
        let top = self.stats.top(STATS_SHOWN);
        if top.is_empty() {
            return Reply::text("No sims yet");
        }
        let lines: Vec<String> = top
            .iter()
            .map(|entry| format!("{}: {}", entry.rule, entry.count))
            .collect();
        Reply::text(lines.join("\n"))
    }

    fn deadline(&self, user: &str, argv: &mut Vec<String>) -> Result<Deadline, CommandError> {
        Ok(if self.take_no_timeout(user, argv)? {
            Deadline::Never
        } else {
            Deadline::Default
        })
    }

    /// Strip a leading `notimeout`, which only admins may use.
    fn take_no_timeout(&self, user: &str, argv: &mut Vec<String>) -> Result<bool, CommandError> {
        if argv.get(1).map(String::as_str) != Some("notimeout") {
            return Ok(false);
        }
        if !self.admins.contains(user) {
            return Err(CommandError::command(
                "You must be an admin to use notimeout!",
            ));
        }
        argv.remove(1);
        Ok(true)
    }

    fn find_pattern(&self, source: Option<&str>) -> Result<Box<dyn Pattern>, CommandError> {
        let source = source.ok_or_else(|| CommandError::command("Cannot find RLE"))?;
        Ok(self.engine.parse_pattern(source)?)
    }
}

/// Remove `word` if it is the first argument.
fn take_word(argv: &mut Vec<String>, word: &str) -> bool {
    if argv.get(1).map(String::as_str) == Some(word) {
        argv.remove(1);
        true
    } else {
        false
    }
}

fn uses_renderer(argv: &[String], pattern: &dyn Pattern) -> bool {
    pattern.requires_external_renderer() || argv.iter().skip(1).any(|a| a == "ca")
}

fn parse_limit(arg: Option<&String>) -> u64 {
    arg.and_then(|a| a.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v as u64)
        .unwrap_or(DEFAULT_IDENTIFY_LIMIT)
}
