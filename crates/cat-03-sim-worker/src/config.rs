//! Worker configuration.

use crate::adapters::GifsicleResizer;
use crate::error::ConfigError;
use crate::ports::Resizer;
use crate::service::TaskExecutor;
use cat_02_frame_builder::{CommandRenderer, CommandTemplate, ExternalRenderer};
use sim_engine::SimulationEngine;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration shared by the process and thread hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Directory receiving `sim_base_<id>.gif`, `sim_<id>.gif` and renderer files.
    pub output_dir: PathBuf,
    /// Viewer command template; `None` disables the external renderer.
    pub renderer_cmd: Option<String>,
    /// Command template for `__*` engine rules.
    pub rule_loader_cmd: Option<String>,
    /// Resizer program; `None` leaves the base GIF as the final one.
    pub resizer: Option<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            renderer_cmd: None,
            rule_loader_cmd: None,
            resizer: None,
        }
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl WorkerConfig {
    /// Create configuration from environment variables.
    ///
    /// - `CATERER_OUTPUT_DIR` (default `.`)
    /// - `CATERER_RENDERER_CMD`
    /// - `CATERER_RULE_LOADER_CMD`
    /// - `CATERER_RESIZER`
    pub fn from_env() -> Self {
        Self {
            output_dir: non_empty("CATERER_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            renderer_cmd: non_empty("CATERER_RENDERER_CMD"),
            rule_loader_cmd: non_empty("CATERER_RULE_LOADER_CMD"),
            resizer: non_empty("CATERER_RESIZER"),
        }
    }

    /// Make sure the output directory exists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| ConfigError::OutputDir(self.output_dir.display().to_string(), e))
    }

    /// Assemble an executor for `engine`.
    pub fn build_executor(&self, engine: Arc<dyn SimulationEngine>) -> TaskExecutor {
        let viewer = self.renderer_cmd.as_deref().and_then(CommandTemplate::parse);
        let rule_loader = self
            .rule_loader_cmd
            .as_deref()
            .and_then(CommandTemplate::parse);
        let renderer: Option<Arc<dyn ExternalRenderer>> =
            if viewer.is_some() || rule_loader.is_some() {
                Some(Arc::new(
                    CommandRenderer::new(&self.output_dir)
                        .with_viewer(viewer)
                        .with_rule_loader(rule_loader),
                ))
            } else {
                None
            };
        let resizer: Option<Arc<dyn Resizer>> = self
            .resizer
            .as_ref()
            .map(|program| Arc::new(GifsicleResizer::new(program.clone())) as Arc<dyn Resizer>);

        TaskExecutor::new(engine, &self.output_dir)
            .with_renderer(renderer)
            .with_resizer(resizer)
    }
}
