//! Engine-independent pattern classification.
//!
//! Works only through the [`Pattern`] port: the pattern is cloned and run
//! forward, hashing each generation's cells relative to their bounding box
//! until a shape repeats.

use crate::ports::Pattern;
use shared_types::{Cell, Identified, PatternType};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

const WECHSLER: &[u8; 32] = b"0123456789abcdefghijklmnopqrstuv";
const RUN_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Code used when no cycle was found.
pub const PATHOLOGICAL: &str = "PATHOLOGICAL";

/// Find the period, displacement and population series of `pattern`,
/// examining at most `limit` generations.
pub fn find_type(pattern: &dyn Pattern, limit: u64) -> PatternType {
    let mut p = pattern.boxed_clone();
    let mut seen: HashMap<u64, (u64, i64, i64)> = HashMap::new();
    let mut populations = Vec::new();

    for gen in 0..=limit {
        populations.push(p.population());
        let (key, ox, oy) = shape_key(&p.cells());
        if let Some(&(first, fx, fy)) = seen.get(&key) {
            return PatternType {
                period: gen - first,
                displacement: (ox - fx, oy - fy),
                stabilized_at: first,
                populations,
            };
        }
        seen.insert(key, (gen, ox, oy));
        if gen < limit {
            p.run_generation();
        }
    }

    PatternType {
        period: 0,
        displacement: (0, 0),
        stabilized_at: 0,
        populations,
    }
}

/// Full identification: classification plus catalogue code and heat.
pub fn identify(pattern: &dyn Pattern, limit: u64) -> Identified {
    let pattern_type = find_type(pattern, limit);
    let description = pattern_type.description();
    if pattern_type.period == 0 {
        return Identified {
            pattern_type,
            apgcode: PATHOLOGICAL.to_string(),
            heat: None,
            description,
        };
    }

    let mut phase = pattern.boxed_clone();
    phase.run(pattern_type.stabilized_at);
    let code = apgcode(&pattern_type, &phase.cells());

    let heat = if pattern_type.period > 1 || pattern_type.displacement != (0, 0) {
        Some(heat(phase.as_mut(), pattern_type.period))
    } else {
        None
    };

    Identified {
        pattern_type,
        apgcode: code,
        heat,
        description,
    }
}

/// Catalogue code for the stabilized phase `cells` of a classified pattern.
///
/// The prefix names the object class (`xs` still life with population,
/// `xp` oscillator, `xq` spaceship, both with period); the suffix is the
/// extended Wechsler encoding of the phase as given, without searching
/// other orientations for a canonical form.
pub fn apgcode(pattern_type: &PatternType, cells: &[Cell]) -> String {
    if pattern_type.period == 0 {
        return PATHOLOGICAL.to_string();
    }
    let live: Vec<Cell> = cells.iter().copied().filter(|c| c.state != 0).collect();
    if live.is_empty() {
        return "xs0_0".to_string();
    }
    let prefix = if pattern_type.displacement != (0, 0) {
        format!("xq{}", pattern_type.period)
    } else if pattern_type.period == 1 {
        format!("xs{}", live.len())
    } else {
        format!("xp{}", pattern_type.period)
    };
    format!("{prefix}_{}", wechsler(&live))
}

fn wechsler(cells: &[Cell]) -> String {
    let min_x = cells.iter().map(|c| c.x).min().unwrap_or(0);
    let min_y = cells.iter().map(|c| c.y).min().unwrap_or(0);
    let max_x = cells.iter().map(|c| c.x).max().unwrap_or(0);
    let max_y = cells.iter().map(|c| c.y).max().unwrap_or(0);
    let live: HashSet<(i64, i64)> = cells.iter().map(|c| (c.x - min_x, c.y - min_y)).collect();

    let width = max_x - min_x + 1;
    let strips = (max_y - min_y) / 5 + 1;
    let mut out = String::new();
    for strip in 0..strips {
        if strip > 0 {
            out.push('z');
        }
        let mut columns: Vec<u8> = (0..width)
            .map(|x| {
                (0..5).fold(0u8, |acc, bit| {
                    if live.contains(&(x, strip * 5 + bit)) {
                        acc | (1 << bit)
                    } else {
                        acc
                    }
                })
            })
            .collect();
        while columns.last() == Some(&0) {
            columns.pop();
        }
        push_strip(&mut out, &columns);
    }
    out
}

fn push_strip(out: &mut String, columns: &[u8]) {
    let mut i = 0;
    while i < columns.len() {
        if columns[i] != 0 {
            out.push(char::from(WECHSLER[columns[i] as usize]));
            i += 1;
            continue;
        }
        let mut run = columns[i..].iter().take_while(|&&c| c == 0).count();
        i += run;
        while run > 0 {
            match run {
                1 => {
                    out.push('0');
                    run = 0;
                }
                2 => {
                    out.push('w');
                    run = 0;
                }
                3 => {
                    out.push('x');
                    run = 0;
                }
                _ => {
                    let take = run.min(39);
                    out.push('y');
                    out.push(char::from(RUN_DIGITS[take - 4]));
                    run -= take;
                }
            }
        }
    }
}

/// Average number of cells changing state per generation over one period.
fn heat(phase: &mut dyn Pattern, period: u64) -> f64 {
    let mut total = 0u64;
    let mut prev = state_map(&phase.cells());
    for _ in 0..period {
        phase.run_generation();
        let next = state_map(&phase.cells());
        total += prev
            .iter()
            .filter(|(pos, state)| next.get(*pos) != Some(*state))
            .count() as u64;
        total += next.keys().filter(|pos| !prev.contains_key(*pos)).count() as u64;
        prev = next;
    }
    total as f64 / period as f64
}

fn state_map(cells: &[Cell]) -> HashMap<(i64, i64), u8> {
    cells.iter().map(|c| ((c.x, c.y), c.state)).collect()
}

/// Hash of the cells relative to their bounding box, plus the box origin.
fn shape_key(cells: &[Cell]) -> (u64, i64, i64) {
    let ox = cells.iter().map(|c| c.x).min().unwrap_or(0);
    let oy = cells.iter().map(|c| c.y).min().unwrap_or(0);
    let mut normalized: Vec<(i64, i64, u8)> =
        cells.iter().map(|c| (c.x - ox, c.y - oy, c.state)).collect();
    normalized.sort_unstable();
    let mut hasher = DefaultHasher::new();
    normalized.hash(&mut hasher);
    (hasher.finish(), ox, oy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pattern::LifePattern;
    use crate::domain::rule::Rule;

    fn life(cells: &[(i64, i64)]) -> LifePattern {
        LifePattern::new(
            Rule::parse("B3/S23").unwrap(),
            cells.iter().map(|&(x, y)| Cell::new(x, y, 1)),
        )
    }

    #[test]
    fn test_block_is_still_life() {
        let t = find_type(&life(&[(0, 0), (1, 0), (0, 1), (1, 1)]), 100);
        assert_eq!(t.period, 1);
        assert_eq!(t.displacement, (0, 0));
        assert_eq!(t.stabilized_at, 0);
        assert_eq!(t.description(), "Still life");
    }

    #[test]
    fn test_blinker_period_two() {
        let t = find_type(&life(&[(0, 0), (1, 0), (2, 0)]), 100);
        assert_eq!(t.period, 2);
        assert_eq!(t.displacement, (0, 0));
        assert_eq!(t.populations, vec![3, 3, 3]);
    }

    #[test]
    fn test_glider_is_spaceship() {
        let t = find_type(&life(&[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)]), 100);
        assert_eq!(t.period, 4);
        assert_eq!(t.displacement, (1, 1));
        assert_eq!(t.description(), "c/4 diagonal spaceship");
    }

    #[test]
    fn test_dying_pattern() {
        let t = find_type(&life(&[(0, 0)]), 100);
        assert!(t.died());
        assert_eq!(t.stabilized_at, 1);
    }

    #[test]
    fn test_limit_reached_is_unidentified() {
        // Glider needs 4 generations to repeat.
        let t = find_type(&life(&[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)]), 2);
        assert_eq!(t.period, 0);
        assert_eq!(t.populations.len(), 3);
    }

    #[test]
    fn test_identify_codes() {
        let block = identify(&life(&[(0, 0), (1, 0), (0, 1), (1, 1)]), 100);
        assert_eq!(block.apgcode, "xs4_33");
        assert_eq!(block.heat, None);

        let blinker = identify(&life(&[(0, 0), (1, 0), (2, 0)]), 100);
        assert_eq!(blinker.apgcode, "xp2_111");
        assert_eq!(blinker.heat, Some(4.0));

        let glider = identify(&life(&[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)]), 100);
        assert!(glider.apgcode.starts_with("xq4_"));
    }

    #[test]
    fn test_wechsler_zero_runs() {
        let cells = vec![Cell::new(0, 0, 1), Cell::new(5, 0, 1), Cell::new(0, 5, 1)];
        // Columns 1..4 are empty in the first strip.
        assert_eq!(wechsler(&cells), "1y01z1");
    }
}
