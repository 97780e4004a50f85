//! Task result payloads.
//!
//! These travel as the `data` field of a successful reply and are decoded by
//! the dispatcher's typed helpers.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Result of a `sim` task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimSummary {
    /// Time spent running the script, before encoding.
    pub parse_time_ms: f64,
    /// Text produced by an `identify` directive, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Final GIF on disk.
    pub gif_path: PathBuf,
    /// Canvas size in cells.
    pub width: u32,
    pub height: u32,
    /// Number of frames encoded.
    pub frames: usize,
}

/// Basic classification of a pattern's evolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternType {
    /// Period of the eventual cycle; 0 when none was found within the limit.
    pub period: u64,
    /// Translation per period, `(dx, dy)`.
    pub displacement: (i64, i64),
    /// First generation of the cycle.
    pub stabilized_at: u64,
    /// Population of every generation examined, starting at generation 0.
    pub populations: Vec<u64>,
}

impl PatternType {
    /// True when the pattern became empty.
    pub fn died(&self) -> bool {
        self.period > 0
            && self
                .populations
                .get(self.stabilized_at as usize)
                .is_some_and(|&pop| pop == 0)
    }

    /// Short human-readable classification.
    pub fn description(&self) -> String {
        if self.period == 0 {
            return "Unidentified".to_string();
        }
        if self.died() {
            return format!("Died at generation {}", self.stabilized_at);
        }
        let (dx, dy) = (self.displacement.0.abs(), self.displacement.1.abs());
        if dx == 0 && dy == 0 {
            if self.period == 1 {
                "Still life".to_string()
            } else {
                format!("Period {} oscillator", self.period)
            }
        } else if dx == 0 || dy == 0 {
            format!("{} orthogonal spaceship", speed(dx.max(dy), self.period))
        } else if dx == dy {
            format!("{} diagonal spaceship", speed(dx, self.period))
        } else {
            format!(
                "({}, {})c/{} oblique spaceship",
                dx.max(dy),
                dx.min(dy),
                self.period
            )
        }
    }
}

fn speed(cells: i64, period: u64) -> String {
    if cells == 1 {
        format!("c/{period}")
    } else {
        format!("{cells}c/{period}")
    }
}

/// Full identification of a pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identified {
    #[serde(flatten)]
    pub pattern_type: PatternType,
    /// Catalogue code of the stabilized phase, `PATHOLOGICAL` when unknown.
    pub apgcode: String,
    /// Average number of cells changing state per generation over one
    /// period, for oscillators and spaceships.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heat: Option<f64>,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(period: u64, displacement: (i64, i64), pops: Vec<u64>) -> PatternType {
        PatternType {
            period,
            displacement,
            stabilized_at: 0,
            populations: pops,
        }
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(pt(1, (0, 0), vec![4]).description(), "Still life");
        assert_eq!(pt(2, (0, 0), vec![3, 3]).description(), "Period 2 oscillator");
        assert_eq!(
            pt(4, (1, 1), vec![5; 4]).description(),
            "c/4 diagonal spaceship"
        );
        assert_eq!(
            pt(4, (0, -2), vec![9; 4]).description(),
            "2c/4 orthogonal spaceship"
        );
        assert_eq!(pt(0, (0, 0), vec![1, 2]).description(), "Unidentified");
    }

    #[test]
    fn test_died() {
        let t = PatternType {
            period: 1,
            displacement: (0, 0),
            stabilized_at: 2,
            populations: vec![2, 1, 0],
        };
        assert!(t.died());
        assert_eq!(t.description(), "Died at generation 2");
    }

    #[test]
    fn test_identified_flattens_pattern_type() {
        let id = Identified {
            pattern_type: pt(1, (0, 0), vec![4]),
            apgcode: "xs4_33".into(),
            heat: None,
            description: "Still life".into(),
        };
        let value = serde_json::to_value(&id).unwrap();
        assert_eq!(value["period"], 1);
        assert_eq!(value["apgcode"], "xs4_33");
        assert!(value.get("heat").is_none());
    }
}
