//! Reference engine for Life-like and Generations rules.

use crate::domain::classify;
use crate::domain::pattern::LifePattern;
use crate::domain::rule::Rule;
use crate::error::EngineError;
use crate::ports::{Pattern, SimulationEngine};
use crate::{rle, DEFAULT_RULE};
use shared_types::{Cell, Identified, PatternType};
use tracing::debug;

/// [`SimulationEngine`] backed by [`LifePattern`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LifeEngine;

impl LifeEngine {
    pub fn new() -> Self {
        Self
    }
}

impl SimulationEngine for LifeEngine {
    fn parse_pattern(&self, text: &str) -> Result<Box<dyn Pattern>, EngineError> {
        let parsed = rle::parse(text)?;
        let rule = Rule::parse(parsed.rule.as_deref().unwrap_or(DEFAULT_RULE))?;
        if let Some(cell) = parsed
            .cells
            .iter()
            .find(|c| u16::from(c.state) >= rule.states())
        {
            return Err(EngineError::StateOutOfRange {
                state: cell.state,
                rule: rule.canonical(),
            });
        }
        Ok(Box::new(LifePattern::new(rule, parsed.cells)))
    }

    fn create_pattern(&self, rule: &str, cells: &[Cell]) -> Result<Box<dyn Pattern>, EngineError> {
        let rule = Rule::parse(rule)?;
        let states = rule.states();
        let kept: Vec<Cell> = cells
            .iter()
            .copied()
            .filter(|c| u16::from(c.state) < states)
            .collect();
        if kept.len() != cells.len() {
            debug!(
                dropped = cells.len() - kept.len(),
                rule = %rule.canonical(),
                "Dropped cells with states the new rule does not have"
            );
        }
        Ok(Box::new(LifePattern::new(rule, kept)))
    }

    fn find_type(&self, pattern: &dyn Pattern, limit: u64) -> PatternType {
        classify::find_type(pattern, limit)
    }

    fn identify(&self, pattern: &dyn Pattern, limit: u64) -> Identified {
        classify::identify(pattern, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ErrorCategory;

    #[test]
    fn test_parse_defaults_to_life() {
        let p = LifeEngine::new().parse_pattern("3o!").unwrap();
        assert_eq!(p.rule_str(), "B3/S23");
        assert_eq!(p.states(), 2);
        assert_eq!(p.population(), 3);
    }

    #[test]
    fn test_parse_rejects_bad_rule_as_rule_error() {
        let err = LifeEngine::new()
            .parse_pattern("x = 1, y = 1, rule = nonsense\no!")
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Rule);
    }

    #[test]
    fn test_parse_rejects_state_out_of_range() {
        let err = LifeEngine::new()
            .parse_pattern("x = 1, y = 1, rule = B3/S23\nB!")
            .unwrap_err();
        assert!(matches!(err, EngineError::StateOutOfRange { state: 2, .. }));
        assert_eq!(err.category(), ErrorCategory::Command);
    }

    #[test]
    fn test_create_pattern_changes_rule() {
        let engine = LifeEngine::new();
        let p = engine
            .parse_pattern("x = 2, y = 1, rule = B2/S/C3\nAB!")
            .unwrap();
        let q = engine.create_pattern("B3/S23", &p.cells()).unwrap();
        assert_eq!(q.rule_str(), "B3/S23");
        assert_eq!(q.population(), 1);
    }

    #[test]
    fn test_to_rle_reparses() {
        let engine = LifeEngine::new();
        let p = engine.parse_pattern("bo$2bo$3o!").unwrap();
        let q = engine.parse_pattern(&p.to_rle()).unwrap();
        assert_eq!(p.cells(), q.cells());
    }
}
