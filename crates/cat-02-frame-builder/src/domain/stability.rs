//! Population-based stabilization detector for the `stable` directive.
//!
//! After each generation the detector sees the new population and decides
//! whether to stop: the pattern died, the last 16 samples repeat with some
//! period `p`, or they grow by the same amount every `p` generations. Only
//! periods `p < i / 16` are tried at generation `i`, so a pattern must run
//! at least 32 generations before it can be declared stable.

/// Hard ceiling on generations run by `stable`.
pub const STABLE_GENERATION_LIMIT: u64 = 120_000;

const WINDOW: usize = 16;

/// Tracks population history across generations.
#[derive(Debug, Default, Clone)]
pub struct StabilityDetector {
    populations: Vec<u64>,
}

impl StabilityDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the population after the next generation. Returns `true` when
    /// the run should stop.
    pub fn observe(&mut self, population: u64) -> bool {
        if population == 0 {
            return true;
        }
        let max_period = self.populations.len() / WINDOW;
        let pop = population as i64;
        if (1..max_period).any(|period| self.is_periodic(pop, period))
            || (1..max_period).any(|period| self.is_arithmetic(pop, period))
        {
            return true;
        }
        self.populations.push(population);
        false
    }

    /// Generations observed without stopping.
    pub fn observed(&self) -> usize {
        self.populations.len()
    }

    fn back(&self, offset: usize) -> i64 {
        self.populations[self.populations.len() - offset] as i64
    }

    fn is_periodic(&self, pop: i64, period: usize) -> bool {
        (1..WINDOW).all(|j| pop == self.back(period * j))
    }

    fn is_arithmetic(&self, pop: i64, period: usize) -> bool {
        let diff = pop - self.back(period);
        (1..WINDOW).all(|j| diff == self.back(period * j) - self.back(period * (j + 1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_until_stable(pops: impl Iterator<Item = u64>) -> Option<usize> {
        let mut detector = StabilityDetector::new();
        for (i, pop) in pops.enumerate() {
            if detector.observe(pop) {
                return Some(i);
            }
        }
        None
    }

    #[test]
    fn test_constant_population_stops_at_32() {
        assert_eq!(run_until_stable(std::iter::repeat(3).take(1000)), Some(32));
    }

    #[test]
    fn test_period_two_oscillation() {
        let pops = (0..1000u64).map(|i| if i % 2 == 0 { 10 } else { 14 });
        let stop = run_until_stable(pops).unwrap();
        assert!(stop <= 48);
    }

    #[test]
    fn test_linear_growth_is_detected() {
        let pops = (0..1000u64).map(|i| 20 + 5 * i);
        assert_eq!(run_until_stable(pops), Some(32));
    }

    #[test]
    fn test_sawtooth_growth_is_detected() {
        // Period-3 cycle that gains 6 cells per cycle, like a gun.
        let pops = (0..2000u64).map(|i| 50 + 2 * (i / 3) * 3 + [0, 4, 1][(i % 3) as usize]);
        assert!(run_until_stable(pops).is_some());
    }

    #[test]
    fn test_death_stops_immediately() {
        assert_eq!(run_until_stable([5, 3, 0, 7].into_iter()), Some(2));
    }

    #[test]
    fn test_chaotic_sequence_never_stops() {
        let mut x = 12345u64;
        let pops = (0..500).map(move |_| {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (x >> 33) % 1000 + 1
        });
        assert_eq!(run_until_stable(pops), None);
    }
}
