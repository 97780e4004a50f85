//! # Geometry and Colour
//!
//! Cell-space rectangles, RGB colours and the palette families a rule may
//! request.
//!
//! Coordinates are cell coordinates on an unbounded plane. A [`Rect`] is
//! half-open: it covers `x..x + width` and `y..y + height`.

use serde::{Deserialize, Serialize};

/// A single cell: position and state. State 0 is dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: i64,
    pub y: i64,
    pub state: u8,
}

impl Cell {
    pub const fn new(x: i64, y: i64, state: u8) -> Self {
        Self { x, y, state }
    }
}

/// Axis-aligned half-open rectangle in cell space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i64 {
        self.x + i64::from(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i64 {
        self.y + i64::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of cells covered.
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Smallest rectangle covering both. Empty rectangles are ignored.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Rect::from_edges(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Grow by `margin` cells on every side.
    pub fn expand(&self, margin: u32) -> Rect {
        let m = i64::from(margin);
        Rect::from_edges(self.x - m, self.y - m, self.right() + m, self.bottom() + m)
    }

    /// Build from inclusive left/top and exclusive right/bottom edges.
    ///
    /// Degenerate or inverted edges produce an empty rectangle anchored at
    /// `(left, top)`. Extents that overflow `u32` saturate.
    pub fn from_edges(left: i64, top: i64, right: i64, bottom: i64) -> Rect {
        let width = u32::try_from((right - left).max(0)).unwrap_or(u32::MAX);
        let height = u32::try_from((bottom - top).max(0)).unwrap_or(u32::MAX);
        Rect::new(left, top, width, height)
    }
}

/// 24-bit colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

/// Fixed colour table a rule family asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaletteFamily {
    /// No fixed table; colours come from the rule, custom colours or the
    /// hue ramp.
    #[default]
    Standard,
    /// LifeHistory-style rules.
    History,
    /// Super-style rules.
    Super,
    /// Investigator-style rules.
    Investigator,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_and_expand() {
        let a = Rect::new(0, 0, 2, 2);
        let b = Rect::new(-1, -1, 2, 2);
        let u = a.union(&b).expand(1);
        assert_eq!(u.x, -2);
        assert_eq!(u.y, -2);
        assert_eq!(u.right(), 3);
        assert_eq!(u.bottom(), 3);
        assert_eq!(u.width, 5);
    }

    #[test]
    fn test_union_ignores_empty() {
        let a = Rect::new(5, 5, 0, 0);
        let b = Rect::new(1, 2, 3, 4);
        assert_eq!(a.union(&b), b);
        assert_eq!(b.union(&a), b);
    }

    #[test]
    fn test_from_edges_inverted_is_empty() {
        let r = Rect::from_edges(3, 3, 1, 1);
        assert!(r.is_empty());
        assert_eq!(r.area(), 0);
    }

    #[test]
    fn test_contains_is_half_open() {
        let r = Rect::new(0, 0, 2, 2);
        assert!(r.contains(1, 1));
        assert!(!r.contains(2, 1));
        assert!(!r.contains(-1, 0));
    }
}
