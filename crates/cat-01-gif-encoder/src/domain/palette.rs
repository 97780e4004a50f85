//! Global colour table.
//!
//! Entry 0 is always the background. Entries `1..2^b` are resolved per
//! state, first match wins:
//!
//! 1. states the rule does not have: black
//! 2. two-state rules: white
//! 3. colours the rule itself defines
//! 4. the rule family's fixed table (History, Super, Investigator)
//! 5. custom colours reported by the external renderer
//! 6. a red-to-yellow hue ramp over the live states

use crate::error::EncodeError;
use shared_types::{PaletteFamily, Rgb};
use std::collections::BTreeMap;

/// Background colour (entry 0).
pub const BACKGROUND: Rgb = Rgb::new(0x36, 0x39, 0x3E);

const HISTORY_COLORS: [[u8; 3]; 6] = [
    [0, 255, 0],
    [0, 0, 128],
    [216, 255, 216],
    [255, 0, 0],
    [255, 255, 0],
    [96, 96, 96],
];

const SUPER_COLORS: [[u8; 3]; 25] = [
    [0, 255, 0],
    [0, 0, 160],
    [255, 216, 255],
    [255, 0, 0],
    [255, 255, 0],
    [96, 96, 96],
    [255, 105, 180],
    [128, 0, 128],
    [0, 191, 255],
    [0, 64, 128],
    [64, 224, 208],
    [0, 128, 64],
    [255, 255, 255],
    [255, 99, 71],
    [250, 128, 114],
    [219, 112, 147],
    [255, 165, 0],
    [245, 222, 179],
    [0, 255, 255],
    [192, 192, 192],
    [192, 255, 128],
    [255, 182, 193],
    [0, 255, 127],
    [0, 0, 0],
    [255, 0, 127],
];

const INVESTIGATOR_COLORS: [[u8; 3]; 20] = [
    [0, 236, 91],
    [0, 192, 255],
    [255, 0, 0],
    [255, 255, 255],
    [75, 75, 75],
    [233, 41, 255],
    [64, 0, 128],
    [255, 230, 0],
    [150, 128, 0],
    [130, 200, 0],
    [120, 40, 0],
    [255, 140, 0],
    [140, 70, 0],
    [0, 0, 255],
    [192, 192, 192],
    [128, 128, 128],
    [255, 112, 140],
    [249, 237, 249],
    [0, 152, 127],
    [0, 73, 59],
];

/// Resolved global colour table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    bit_width: u8,
    entries: Vec<Rgb>,
}

impl Palette {
    pub fn builder(states: u16) -> PaletteBuilder {
        PaletteBuilder::new(states)
    }

    /// Bits per pixel value; also the LZW minimum code size.
    pub fn bit_width(&self) -> u8 {
        self.bit_width
    }

    /// Number of entries, always `2^bit_width`.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Rgb] {
        &self.entries
    }

    pub fn clear_code(&self) -> u16 {
        1 << self.bit_width
    }

    pub fn end_code(&self) -> u16 {
        self.clear_code() + 1
    }

    /// Width of every code in the image data.
    pub fn code_width(&self) -> u8 {
        self.bit_width + 1
    }

    /// Packed-fields byte of the logical screen descriptor.
    pub fn screen_flags(&self) -> u8 {
        0xF0 | (self.bit_width - 1)
    }
}

/// Smallest `b >= 2` with `2^b >= states`.
pub fn bit_width_for(states: u16) -> u8 {
    let mut b = 2u8;
    while (1u32 << b) < u32::from(states) {
        b += 1;
    }
    b
}

/// Builder for [`Palette`].
#[derive(Debug, Clone)]
pub struct PaletteBuilder {
    states: u16,
    family: PaletteFamily,
    rule_colors: BTreeMap<u8, Rgb>,
    custom_colors: BTreeMap<u8, Rgb>,
}

impl PaletteBuilder {
    pub fn new(states: u16) -> Self {
        Self {
            states,
            family: PaletteFamily::Standard,
            rule_colors: BTreeMap::new(),
            custom_colors: BTreeMap::new(),
        }
    }

    pub fn family(mut self, family: PaletteFamily) -> Self {
        self.family = family;
        self
    }

    pub fn rule_colors(mut self, colors: BTreeMap<u8, Rgb>) -> Self {
        self.rule_colors = colors;
        self
    }

    pub fn custom_colors(mut self, colors: BTreeMap<u8, Rgb>) -> Self {
        self.custom_colors = colors;
        self
    }

    pub fn build(self) -> Result<Palette, EncodeError> {
        if self.states == 0 || self.states > 256 {
            return Err(EncodeError::InvalidStateCount(self.states));
        }
        let bit_width = bit_width_for(self.states);
        let size = 1usize << bit_width;
        let mut entries = Vec::with_capacity(size);
        entries.push(BACKGROUND);
        for value in 1..size {
            entries.push(self.resolve(value));
        }
        Ok(Palette { bit_width, entries })
    }

    fn resolve(&self, value: usize) -> Rgb {
        let states = usize::from(self.states);
        if value >= states {
            return Rgb::BLACK;
        }
        if states == 2 {
            return Rgb::WHITE;
        }
        // value < states <= 256
        let key = value as u8;
        if let Some(c) = self.rule_colors.get(&key) {
            return *c;
        }
        let table: &[[u8; 3]] = match self.family {
            PaletteFamily::History => &HISTORY_COLORS,
            PaletteFamily::Super => &SUPER_COLORS,
            PaletteFamily::Investigator => &INVESTIGATOR_COLORS,
            PaletteFamily::Standard => &[],
        };
        if let Some(c) = table.get(value - 1) {
            return Rgb::from(*c);
        }
        if let Some(c) = self.custom_colors.get(&key) {
            return *c;
        }
        hue_ramp(value, states)
    }
}

/// `(255, max(0, ceil((v-1)/(states-2)*256) - 1), 0)` for `states >= 3`.
fn hue_ramp(value: usize, states: usize) -> Rgb {
    let ratio = (value - 1) as f64 / (states - 2) as f64;
    let green = ((ratio * 256.0).ceil() - 1.0).clamp(0.0, 255.0);
    Rgb::new(255, green as u8, 0)
}
