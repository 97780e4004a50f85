//! # Simulation Engine
//!
//! The cellular automaton engine consumed by the frame builder and the
//! worker.
//!
//! ## Architecture
//!
//! - **Ports Layer** (`ports/`): the [`Pattern`] and [`SimulationEngine`]
//!   traits. Everything downstream works through these.
//! - **Domain Layer** (`domain/`): rule parsing, the sparse
//!   [`LifePattern`] and engine-independent classification
//!   ([`find_type`], [`identify`]).
//! - **RLE** (`rle`): reading and writing run-length encoded patterns.
//! - **Engine** (`engine`): [`LifeEngine`], the reference engine for
//!   Life-like (`B3/S23`) and Generations (`B2/S/C3`) rules.
//!
//! ## Usage Example
//!
//! ```ignore
//! use sim_engine::{LifeEngine, SimulationEngine};
//!
//! let engine = LifeEngine::new();
//! let mut p = engine.parse_pattern("x = 3, y = 1, rule = B3/S23\n3o!")?;
//! p.run(1);
//! assert_eq!(p.population(), 3);
//! ```

pub mod domain;
pub mod engine;
pub mod error;
pub mod ports;
pub mod rle;

pub use domain::classify::{apgcode, find_type, identify};
pub use domain::pattern::LifePattern;
pub use domain::rule::Rule;
pub use engine::LifeEngine;
pub use error::EngineError;
pub use ports::{Pattern, SimulationEngine};

/// Rule used when a pattern does not name one.
pub const DEFAULT_RULE: &str = "B3/S23";
