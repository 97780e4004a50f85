//! Ports for the simulation engine.
//!
//! - [`Pattern`]: a mutable pattern that can be advanced and inspected.
//! - [`SimulationEngine`]: builds patterns and classifies them.

use crate::error::EngineError;
use shared_types::{Cell, Identified, PaletteFamily, PatternType, Rect, Rgb};
use std::collections::BTreeMap;
use std::fmt;

/// A pattern under some rule.
pub trait Pattern: Send + fmt::Debug {
    /// Rule string in canonical form.
    fn rule_str(&self) -> &str;

    /// Number of cell states, including the dead state.
    fn states(&self) -> u16;

    /// Generations run so far.
    fn generation(&self) -> u64;

    /// Number of non-dead cells.
    fn population(&self) -> u64;

    /// Advance one generation.
    fn run_generation(&mut self);

    /// Advance `generations` generations.
    fn run(&mut self, generations: u64) {
        for _ in 0..generations {
            self.run_generation();
        }
    }

    /// Bounding rectangle of the non-dead cells, `None` when empty.
    fn rect(&self) -> Option<Rect>;

    /// Row-major cell states covering [`Pattern::rect`].
    fn pixels(&self) -> Vec<u8>;

    /// All non-dead cells.
    fn cells(&self) -> Vec<Cell>;

    fn to_rle(&self) -> String;

    fn boxed_clone(&self) -> Box<dyn Pattern>;

    fn palette_family(&self) -> PaletteFamily {
        PaletteFamily::Standard
    }

    /// Colours the rule itself assigns to states.
    fn rule_colors(&self) -> Option<&BTreeMap<u8, Rgb>> {
        None
    }

    /// Whether this pattern can only be simulated by the external renderer.
    fn requires_external_renderer(&self) -> bool {
        false
    }
}

impl Clone for Box<dyn Pattern> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

/// Cellular automaton engine.
pub trait SimulationEngine: Send + Sync {
    /// Parse pattern text (RLE with optional header).
    fn parse_pattern(&self, text: &str) -> Result<Box<dyn Pattern>, EngineError>;

    /// Build a pattern under `rule` from explicit cells.
    fn create_pattern(&self, rule: &str, cells: &[Cell]) -> Result<Box<dyn Pattern>, EngineError>;

    /// Period, displacement and population series, searching up to `limit`
    /// generations.
    fn find_type(&self, pattern: &dyn Pattern, limit: u64) -> PatternType;

    /// Full identification, searching up to `limit` generations.
    fn identify(&self, pattern: &dyn Pattern, limit: u64) -> Identified;
}
