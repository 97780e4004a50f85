//! Resizer backed by `gifsicle`.

use crate::domain::resize::ResizeTarget;
use crate::error::ResizeError;
use crate::ports::Resizer;
use std::fs::File;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Runs `<program> --resize-<axis> <size> -O3 <input> > <output>`.
#[derive(Debug, Clone)]
pub struct GifsicleResizer {
    program: String,
}

impl GifsicleResizer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn args(target: ResizeTarget, input: &Path) -> Vec<String> {
        vec![
            format!("--resize-{}", target.axis.as_str()),
            target.size.to_string(),
            "-O3".to_string(),
            input.to_string_lossy().into_owned(),
        ]
    }
}

impl Resizer for GifsicleResizer {
    fn resize(&self, input: &Path, output: &Path, target: ResizeTarget) -> Result<(), ResizeError> {
        let out = File::create(output)?;
        let result = Command::new(&self.program)
            .args(Self::args(target, input))
            .stdout(Stdio::from(out))
            .stderr(Stdio::piped())
            .output()?;
        if !result.status.success() {
            return Err(ResizeError::Failed {
                program: self.program.clone(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }
        debug!(
            axis = target.axis.as_str(),
            size = target.size,
            output = %output.display(),
            "Resized GIF"
        );
        Ok(())
    }
}
