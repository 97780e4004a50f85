//! Sparse pattern for Life-like and Generations rules.

use crate::domain::rule::Rule;
use crate::ports::Pattern;
use crate::rle;
use shared_types::{Cell, Rect};
use std::collections::HashMap;

/// Pattern stored as a map of non-dead cells.
///
/// State 1 is alive; states `2..states` are dying cells of a Generations
/// rule, which do not count as neighbours and cannot be reborn until they
/// decay to 0.
#[derive(Debug, Clone)]
pub struct LifePattern {
    rule: Rule,
    rule_str: String,
    cells: HashMap<(i64, i64), u8>,
    generation: u64,
}

impl LifePattern {
    /// Build from cells. Cells with state 0 are ignored.
    pub fn new(rule: Rule, cells: impl IntoIterator<Item = Cell>) -> Self {
        let cells = cells
            .into_iter()
            .filter(|c| c.state != 0)
            .map(|c| ((c.x, c.y), c.state))
            .collect();
        Self {
            rule_str: rule.canonical(),
            rule,
            cells,
            generation: 0,
        }
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// State at a position.
    pub fn get(&self, x: i64, y: i64) -> u8 {
        self.cells.get(&(x, y)).copied().unwrap_or(0)
    }

    fn step(&mut self) {
        let mut counts: HashMap<(i64, i64), u8> = HashMap::with_capacity(self.cells.len() * 4);
        for (&(x, y), &state) in &self.cells {
            if state != 1 {
                continue;
            }
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if dx != 0 || dy != 0 {
                        *counts.entry((x + dx, y + dy)).or_insert(0) += 1;
                    }
                }
            }
        }

        let states = self.rule.states();
        let mut next = HashMap::with_capacity(self.cells.len());

        for (&pos, &n) in &counts {
            if !self.cells.contains_key(&pos) && self.rule.is_born(n) {
                next.insert(pos, 1);
            }
        }

        for (&pos, &state) in &self.cells {
            let n = counts.get(&pos).copied().unwrap_or(0);
            let after = if state == 1 {
                if self.rule.survives(n) {
                    1
                } else if states > 2 {
                    2
                } else {
                    0
                }
            } else {
                let decayed = u16::from(state) + 1;
                if decayed >= states {
                    0
                } else {
                    decayed as u8
                }
            };
            if after != 0 {
                next.insert(pos, after);
            }
        }

        self.cells = next;
        self.generation += 1;
    }
}

impl Pattern for LifePattern {
    fn rule_str(&self) -> &str {
        &self.rule_str
    }

    fn states(&self) -> u16 {
        self.rule.states()
    }

    fn generation(&self) -> u64 {
        self.generation
    }

    fn population(&self) -> u64 {
        self.cells.len() as u64
    }

    fn run_generation(&mut self) {
        self.step();
    }

    fn run(&mut self, generations: u64) {
        for _ in 0..generations {
            if self.cells.is_empty() {
                self.generation += 1;
                continue;
            }
            self.step();
        }
    }

    fn rect(&self) -> Option<Rect> {
        let mut keys = self.cells.keys();
        let &(x0, y0) = keys.next()?;
        let (min_x, min_y, max_x, max_y) = keys.fold((x0, y0, x0, y0), |(a, b, c, d), &(x, y)| {
            (a.min(x), b.min(y), c.max(x), d.max(y))
        });
        Some(Rect::from_edges(min_x, min_y, max_x + 1, max_y + 1))
    }

    fn pixels(&self) -> Vec<u8> {
        let Some(rect) = self.rect() else {
            return Vec::new();
        };
        let mut out = vec![0u8; rect.area()];
        let width = rect.width as usize;
        for (&(x, y), &state) in &self.cells {
            let idx = (y - rect.y) as usize * width + (x - rect.x) as usize;
            out[idx] = state;
        }
        out
    }

    fn cells(&self) -> Vec<Cell> {
        let mut cells: Vec<Cell> = self
            .cells
            .iter()
            .map(|(&(x, y), &state)| Cell::new(x, y, state))
            .collect();
        cells.sort_by_key(|c| (c.y, c.x));
        cells
    }

    fn to_rle(&self) -> String {
        rle::write(&self.cells(), &self.rule_str, self.states())
    }

    fn boxed_clone(&self) -> Box<dyn Pattern> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn life(cells: &[(i64, i64)]) -> LifePattern {
        LifePattern::new(
            Rule::parse("B3/S23").unwrap(),
            cells.iter().map(|&(x, y)| Cell::new(x, y, 1)),
        )
    }

    #[test]
    fn test_blinker_oscillates() {
        let mut p = life(&[(0, 1), (1, 1), (2, 1)]);
        p.run_generation();
        assert_eq!(p.rect(), Some(Rect::new(1, 0, 1, 3)));
        p.run_generation();
        assert_eq!(p.rect(), Some(Rect::new(0, 1, 3, 1)));
        assert_eq!(p.generation(), 2);
        assert_eq!(p.population(), 3);
    }

    #[test]
    fn test_glider_moves() {
        let mut p = life(&[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)]);
        let before = p.rect().unwrap();
        p.run(4);
        let after = p.rect().unwrap();
        assert_eq!((after.x - before.x, after.y - before.y), (1, 1));
        assert_eq!(p.population(), 5);
    }

    #[test]
    fn test_generations_decay() {
        let rule = Rule::parse("B2/S/C3").unwrap();
        let mut p = LifePattern::new(rule, [Cell::new(0, 0, 1), Cell::new(1, 0, 1)]);
        p.run_generation();
        // Both parents die into state 2; two births above and two below.
        assert_eq!(p.get(0, 0), 2);
        assert_eq!(p.get(1, 0), 2);
        assert_eq!(p.get(0, -1), 1);
        assert_eq!(p.get(1, 1), 1);
        p.run_generation();
        assert_eq!(p.get(0, 0), 0);
    }

    #[test]
    fn test_pixels_are_row_major() {
        let p = life(&[(10, 10), (11, 11)]);
        assert_eq!(p.rect(), Some(Rect::new(10, 10, 2, 2)));
        assert_eq!(p.pixels(), vec![1, 0, 0, 1]);
    }

    #[test]
    fn test_empty_pattern_keeps_counting() {
        let mut p = life(&[]);
        assert_eq!(p.rect(), None);
        assert!(p.pixels().is_empty());
        p.run(5);
        assert_eq!(p.generation(), 5);
    }
}
