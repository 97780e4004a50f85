//! External renderer driven through a command line.

use crate::adapters::renderer_output::parse_renderer_output;
use crate::error::RendererError;
use crate::ports::{ExternalRenderer, RenderRequest, RenderedFrames, RendererMode};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;
use tracing::{debug, warn};

const INPUT_FILE: &str = "in.rle";
const OUTPUT_FILE: &str = "out.rle";

/// A command line with `{gens}`, `{step}`, `{input}` and `{output}`
/// placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    program: String,
    args: Vec<String>,
}

impl CommandTemplate {
    /// Split a template on whitespace. `None` when it is blank.
    pub fn parse(template: &str) -> Option<Self> {
        let mut words = template.split_whitespace().map(str::to_string);
        let program = words.next()?;
        Some(Self {
            program,
            args: words.collect(),
        })
    }

    /// Program and arguments with placeholders filled in.
    pub fn render(&self, gens: u64, step: u64, input: &Path, output: &Path) -> (String, Vec<String>) {
        let fill = |s: &str| {
            s.replace("{gens}", &gens.to_string())
                .replace("{step}", &step.to_string())
                .replace("{input}", &input.to_string_lossy())
                .replace("{output}", &output.to_string_lossy())
        };
        (fill(&self.program), self.args.iter().map(|a| fill(a)).collect())
    }
}

/// [`ExternalRenderer`] that runs a configured program per mode and reads
/// its output file.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    work_dir: PathBuf,
    viewer: Option<CommandTemplate>,
    rule_loader: Option<CommandTemplate>,
}

impl CommandRenderer {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            viewer: None,
            rule_loader: None,
        }
    }

    pub fn with_viewer(mut self, template: Option<CommandTemplate>) -> Self {
        self.viewer = template;
        self
    }

    pub fn with_rule_loader(mut self, template: Option<CommandTemplate>) -> Self {
        self.rule_loader = template;
        self
    }

    fn template(&self, mode: RendererMode) -> Option<&CommandTemplate> {
        match mode {
            RendererMode::Viewer => self.viewer.as_ref(),
            RendererMode::RuleLoader => self.rule_loader.as_ref(),
        }
    }
}

impl ExternalRenderer for CommandRenderer {
    fn render(&self, request: &RenderRequest<'_>) -> Result<RenderedFrames, RendererError> {
        let template = self
            .template(request.mode)
            .ok_or(RendererError::NotConfigured(request.mode.as_str()))?;

        let input = self.work_dir.join(INPUT_FILE);
        let output = self.work_dir.join(OUTPUT_FILE);
        std::fs::write(&input, request.rle)?;
        match std::fs::remove_file(&output) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let (program, args) = template.render(request.generations, request.step, &input, &output);
        let started = Instant::now();
        let result = Command::new(&program)
            .args(&args)
            .current_dir(&self.work_dir)
            .output()?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            warn!(
                program = %program,
                status = %result.status,
                "External renderer failed"
            );
            return Err(RendererError::CommandFailed {
                command: format!("{} {}", program, args.join(" ")),
                status: result.status.to_string(),
                stderr,
            });
        }

        let text = std::fs::read_to_string(&output)?;
        let rendered = parse_renderer_output(&text, request.mode)?;
        debug!(
            mode = request.mode.as_str(),
            generations = request.generations,
            step = request.step,
            frames = rendered.frames.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "External render complete"
        );
        Ok(rendered)
    }
}
