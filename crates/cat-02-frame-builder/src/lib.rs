//! # CAT-02 Frame Builder
//!
//! Interprets the frame script of a `sim` command: starting from a parsed
//! pattern it runs generations, captures frames, and computes the shared
//! canvas and frame delays handed to the GIF encoder.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): tokenizer, canvas/delay rules and the
//!   `stable` population detector.
//! - **Ports Layer** (`ports/`): [`ExternalRenderer`] for rules the engine
//!   cannot run itself.
//! - **Adapters Layer** (`adapters/`): [`CommandRenderer`], which drives a
//!   configured program through `in.rle` / `out.rle` files.
//! - **Service Layer** (`service/`): [`FrameBuilder`].
//!
//! ## Data Flow
//!
//! ```text
//! argv ──► Script ──► FrameBuilder ──► FrameSet ──► GIF encoder
//!                        │    ▲
//!                        ▼    │
//!               SimulationEngine / ExternalRenderer
//! ```
//!
//! ## Usage Example
//!
//! ```ignore
//! use cat_02_frame_builder::FrameBuilder;
//! use sim_engine::{LifeEngine, SimulationEngine};
//! use std::sync::Arc;
//!
//! let engine = Arc::new(LifeEngine::new());
//! let pattern = engine.parse_pattern("x = 3, y = 1, rule = B3/S23\n3o!")?;
//! let set = FrameBuilder::new(engine).build(pattern, &["30", "2"])?;
//! let gif = set.encode()?;
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::{CommandRenderer, CommandTemplate};
pub use domain::stability::STABLE_GENERATION_LIMIT;
pub use error::{RendererError, ScriptError};
pub use ports::{ExternalRenderer, RenderRequest, RenderedFrames, RendererMode};
pub use service::{FrameBuilder, FrameSet, DEFAULT_GIF_SIZE};
