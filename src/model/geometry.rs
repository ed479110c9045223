//! Stage-space geometry.

use serde::{Deserialize, Serialize};

/// A point in stage pixel coordinates (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Snap to whole pixels, rounding halves up.
    pub fn rounded(self) -> Self {
        Self::new(round_half_up(self.x), round_half_up(self.y))
    }

    /// Clamp into an axis-aligned box.
    pub fn clamped(self, bounds: &Bounds) -> Self {
        Self::new(
            self.x.clamp(bounds.min_x, bounds.max_x),
            self.y.clamp(bounds.min_y, bounds.max_y),
        )
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation towards `other`; `t = 0` is `self`, `t = 1` is `other`.
    pub fn lerp(self, other: Point, t: f64) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// Inclusive rectangle used to keep dragged items on (or near) the stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub const fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }
}

/// `Math.round` semantics: x.5 goes up, also for negatives.
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
