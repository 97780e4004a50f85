//! Frame script interpreter.
//!
//! ## Directives
//!
//! | Directive      | Effect                                                   |
//! |----------------|----------------------------------------------------------|
//! | `N`            | run N generations, one frame each                        |
//! | `N K`          | run N generations, one frame every K                     |
//! | `F fps`        | delay of following frames becomes `ceil(100 / F)`        |
//! | `size S`       | output size for the resizer                              |
//! | `wait N`       | repeat the current frame N times                         |
//! | `jump N`       | advance N generations without frames                     |
//! | `ca`           | toggle external renderer mode                            |
//! | `stable`       | run until the population settles                         |
//! | `identify [M]` | run one full cycle, then M-1 more                        |
//! | `setrule R`    | rebuild the pattern under rule R                         |
//!
//! With a single part every `N` runs `N - 1` generations, so `sim 30`
//! yields 30 frames including the initial one.

use crate::domain::layout::{bounding_box, default_delay, fps_delay};
use crate::domain::script::{join_tokens, Script, Token};
use crate::domain::stability::{StabilityDetector, STABLE_GENERATION_LIMIT};
use crate::error::{RendererError, ScriptError};
use crate::ports::{ExternalRenderer, RenderRequest, RendererMode};
use cat_01_gif_encoder::{encode, EncodeError, Frame, GifDocument, Palette};
use shared_types::{PaletteFamily, Rect, Rgb};
use sim_engine::{Pattern, SimulationEngine};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Output size used when the script has no `size` directive.
pub const DEFAULT_GIF_SIZE: u32 = 200;

/// Frames ready for encoding, with everything needed to build the palette.
#[derive(Debug, Clone)]
pub struct FrameSet {
    pub frames: Vec<Frame>,
    /// Shared canvas in world coordinates.
    pub canvas: Rect,
    pub gif_size: u32,
    pub states: u16,
    pub palette_family: PaletteFamily,
    pub rule_colors: BTreeMap<u8, Rgb>,
    pub custom_colors: BTreeMap<u8, Rgb>,
    /// Classification text from an `identify` directive.
    pub description: Option<String>,
}

impl FrameSet {
    pub fn palette(&self) -> Result<Palette, EncodeError> {
        Palette::builder(self.states)
            .family(self.palette_family)
            .rule_colors(self.rule_colors.clone())
            .custom_colors(self.custom_colors.clone())
            .build()
    }

    pub fn encode(&self) -> Result<GifDocument, EncodeError> {
        let palette = self.palette()?;
        encode(self.canvas, &palette, &self.frames)
    }
}

/// Runs scripts against patterns.
#[derive(Clone)]
pub struct FrameBuilder {
    engine: Arc<dyn SimulationEngine>,
    renderer: Option<Arc<dyn ExternalRenderer>>,
}

impl FrameBuilder {
    pub fn new(engine: Arc<dyn SimulationEngine>) -> Self {
        Self {
            engine,
            renderer: None,
        }
    }

    pub fn with_renderer(mut self, renderer: Option<Arc<dyn ExternalRenderer>>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Run `args` (command name already removed) against `pattern`.
    pub fn build<S: AsRef<str>>(
        &self,
        pattern: Box<dyn Pattern>,
        args: &[S],
    ) -> Result<FrameSet, ScriptError> {
        let script = Script::parse(args);
        let delay = match script.leading_fps() {
            Some(fps) => Some(fps_delay(fps).ok_or_else(|| invalid(&script.parts()[0]))?),
            None => None,
        };

        let mut run = Run {
            frames: vec![(snapshot(pattern.as_ref())?, delay)],
            palette_family: pattern.palette_family(),
            rule_colors: pattern.rule_colors().cloned().unwrap_or_default(),
            states: pattern.states(),
            pattern,
            delay,
            gif_size: DEFAULT_GIF_SIZE,
            renderer_mode: false,
            custom_colors: BTreeMap::new(),
            description: None,
            single_part: script.is_single_part(),
        };

        for part in script.parts() {
            let mut rest = part.as_slice();
            while !rest.is_empty() {
                let consumed = self.directive(&mut run, rest)?;
                rest = &rest[consumed..];
            }
        }

        Ok(run.finish())
    }

    /// Apply the directive at the start of `tokens`, returning how many
    /// tokens it used.
    fn directive(&self, run: &mut Run, tokens: &[Token]) -> Result<usize, ScriptError> {
        let arg = tokens.get(1);
        match &tokens[0] {
            Token::Number(fps) if arg.is_some_and(|t| t.is_word("fps")) => {
                run.delay = Some(fps_delay(*fps).ok_or_else(|| invalid(tokens))?);
                Ok(2)
            }
            first @ Token::Number(_) => {
                let mut generations = first.as_count().ok_or_else(|| invalid(tokens))?;
                let (step, used) = match arg {
                    Some(t @ Token::Number(_)) => (
                        t.as_count().filter(|s| *s > 0).ok_or_else(|| invalid(tokens))?,
                        2,
                    ),
                    _ => (1, 1),
                };
                if run.single_part {
                    generations = generations.saturating_sub(1);
                }
                if generations > 0 {
                    if run.renderer_mode || run.pattern.requires_external_renderer() {
                        self.render(run, generations, step)?;
                    } else {
                        for _ in 0..generations.div_ceil(step) {
                            run.pattern.run(step);
                            run.capture()?;
                        }
                    }
                }
                Ok(used)
            }
            Token::Word(word) => match word.as_str() {
                "size" => {
                    let size = count_arg(tokens)?;
                    if size == 0 || size > u64::from(u32::MAX) {
                        return Err(invalid(tokens));
                    }
                    run.gif_size = size as u32;
                    Ok(2)
                }
                "wait" => {
                    let n = count_arg(tokens)?;
                    let frame = snapshot(run.pattern.as_ref())?;
                    for _ in 0..n {
                        run.frames.push((frame.clone(), run.delay));
                    }
                    Ok(2)
                }
                "jump" => {
                    run.pattern.run(count_arg(tokens)?);
                    Ok(2)
                }
                "ca" => {
                    run.renderer_mode = !run.renderer_mode;
                    Ok(1)
                }
                "stable" => {
                    run.run_until_stable()?;
                    Ok(1)
                }
                "identify" => {
                    let cycles = match arg {
                        Some(t @ Token::Number(_)) => Some(t.as_count().ok_or_else(|| invalid(tokens))?),
                        _ => None,
                    };
                    self.identify(run, cycles)?;
                    Ok(if cycles.is_some() { 2 } else { 1 })
                }
                "setrule" => {
                    let Some(Token::Word(rule)) = arg else {
                        return Err(invalid(tokens));
                    };
                    let pattern = self.engine.create_pattern(rule, &run.pattern.cells())?;
                    run.states = run.states.max(pattern.states());
                    run.pattern = pattern;
                    Ok(2)
                }
                _ => Err(invalid(tokens)),
            },
        }
    }

    fn identify(&self, run: &mut Run, cycles: Option<u64>) -> Result<(), ScriptError> {
        let pattern_type = self
            .engine
            .find_type(run.pattern.as_ref(), STABLE_GENERATION_LIMIT);
        run.description = Some(pattern_type.description());
        for _ in 0..pattern_type.stabilized_at + pattern_type.period {
            run.pattern.run_generation();
            run.capture()?;
        }
        if let Some(m) = cycles {
            if pattern_type.period > 0 {
                for _ in 0..m.saturating_sub(1) * pattern_type.period {
                    run.pattern.run_generation();
                    run.capture()?;
                }
            }
        }
        Ok(())
    }

    /// Hand the pattern to the external renderer. The pattern itself is not
    /// advanced.
    fn render(&self, run: &mut Run, generations: u64, step: u64) -> Result<(), ScriptError> {
        let mode = if run.renderer_mode || !run.pattern.rule_str().starts_with("__") {
            RendererMode::Viewer
        } else {
            RendererMode::RuleLoader
        };
        let renderer = self
            .renderer
            .as_ref()
            .ok_or(RendererError::NotConfigured(mode.as_str()))?;
        let rle = run.pattern.to_rle();
        let rendered = renderer.render(&RenderRequest {
            rle: &rle,
            generations,
            step,
            mode,
        })?;
        debug!(
            mode = mode.as_str(),
            frames = rendered.frames.len(),
            colors = rendered.colors.len(),
            "Rendered frames externally"
        );
        run.custom_colors.extend(rendered.colors);
        let delay = run.delay;
        run.frames
            .extend(rendered.frames.into_iter().map(|f| (f, delay)));
        Ok(())
    }
}

/// Mutable state of one script run.
struct Run {
    pattern: Box<dyn Pattern>,
    frames: Vec<(Frame, Option<u16>)>,
    delay: Option<u16>,
    gif_size: u32,
    renderer_mode: bool,
    states: u16,
    palette_family: PaletteFamily,
    rule_colors: BTreeMap<u8, Rgb>,
    custom_colors: BTreeMap<u8, Rgb>,
    description: Option<String>,
    single_part: bool,
}

impl Run {
    fn capture(&mut self) -> Result<(), ScriptError> {
        let frame = snapshot(self.pattern.as_ref())?;
        self.frames.push((frame, self.delay));
        Ok(())
    }

    fn run_until_stable(&mut self) -> Result<(), ScriptError> {
        let mut detector = StabilityDetector::new();
        for _ in 0..STABLE_GENERATION_LIMIT {
            self.pattern.run_generation();
            self.capture()?;
            if detector.observe(self.pattern.population()) {
                break;
            }
        }
        debug!(
            generations = detector.observed() + 1,
            "Stable directive finished"
        );
        Ok(())
    }

    fn finish(self) -> FrameSet {
        let canvas = bounding_box(self.frames.iter().map(|(f, _)| f.rect()));
        let fallback = default_delay(self.frames.len());
        let frames = self
            .frames
            .into_iter()
            .map(|(mut frame, delay)| {
                frame.set_delay(delay.unwrap_or(fallback));
                frame
            })
            .collect();
        FrameSet {
            frames,
            canvas,
            gif_size: self.gif_size,
            states: self.states,
            palette_family: self.palette_family,
            rule_colors: self.rule_colors,
            custom_colors: self.custom_colors,
            description: self.description,
        }
    }
}

fn snapshot(pattern: &dyn Pattern) -> Result<Frame, ScriptError> {
    match pattern.rect() {
        Some(rect) => Ok(Frame::new(rect, pattern.pixels(), 0)?),
        None => Ok(Frame::empty(0)),
    }
}

fn count_arg(tokens: &[Token]) -> Result<u64, ScriptError> {
    tokens
        .get(1)
        .and_then(Token::as_count)
        .ok_or_else(|| invalid(tokens))
}

fn invalid(tokens: &[Token]) -> ScriptError {
    ScriptError::InvalidPart(join_tokens(tokens))
}
