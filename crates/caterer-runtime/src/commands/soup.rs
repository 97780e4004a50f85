//! Random soups for `sim rand [WxH] [fill%] <rule>`.

use rand::Rng;
use shared_types::{Cell, DomainError};
use sim_engine::{Pattern, SimulationEngine};

const DEFAULT_SIDE: u32 = 16;
const DEFAULT_FILL: f64 = 0.5;
const MAX_AREA: u64 = 1 << 20;

#[derive(Debug, Clone, PartialEq)]
pub struct SoupSpec {
    pub width: u32,
    pub height: u32,
    /// Chance of a cell being alive, `0.0..=1.0`.
    pub fill: f64,
    pub rule: String,
}

impl SoupSpec {
    /// Parse the arguments following `rand`. Returns the spec and how many
    /// arguments it used.
    pub fn parse(args: &[String]) -> Result<(Self, usize), DomainError> {
        let mut used = 0;
        let (mut width, mut height) = (DEFAULT_SIDE, DEFAULT_SIDE);
        if let Some((w, h)) = args.get(used).and_then(|a| parse_size(a)) {
            (width, height) = (w, h);
            used += 1;
        }

        let mut fill = DEFAULT_FILL;
        if let Some(percent) = args.get(used).and_then(|a| a.strip_suffix('%')) {
            let value: f64 = percent
                .parse()
                .map_err(|_| DomainError::command(format!("Invalid fill: {percent}%")))?;
            if !(0.0..=100.0).contains(&value) {
                return Err(DomainError::command(format!("Invalid fill: {percent}%")));
            }
            fill = value / 100.0;
            used += 1;
        }

        let rule = args
            .get(used)
            .ok_or_else(|| DomainError::command("Expected a rule"))?
            .clone();
        used += 1;

        if width == 0 || height == 0 || u64::from(width) * u64::from(height) > MAX_AREA {
            return Err(DomainError::command(format!(
                "Invalid soup size: {width}x{height}"
            )));
        }
        Ok((
            Self {
                width,
                height,
                fill,
                rule,
            },
            used,
        ))
    }

    /// Fill a `width` x `height` box at the origin.
    ///
    /// Multi-state rules give each live cell a random live state.
    pub fn build<R: Rng>(
        &self,
        engine: &dyn SimulationEngine,
        rng: &mut R,
    ) -> Result<Box<dyn Pattern>, DomainError> {
        let states = engine.create_pattern(&self.rule, &[])?.states();
        let mut cells = Vec::new();
        for y in 0..i64::from(self.height) {
            for x in 0..i64::from(self.width) {
                if rng.gen::<f64>() < self.fill {
                    let state = if states <= 2 {
                        1
                    } else {
                        rng.gen_range(1..states.min(256)) as u8
                    };
                    cells.push(Cell::new(x, y, state));
                }
            }
        }
        Ok(engine.create_pattern(&self.rule, &cells)?)
    }
}

fn parse_size(arg: &str) -> Option<(u32, u32)> {
    let (w, h) = arg.split_once('x')?;
    if w.is_empty() || h.is_empty() || !w.bytes().chain(h.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((w.parse().ok()?, h.parse().ok()?))
}
