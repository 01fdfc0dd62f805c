//! Canvas-space points.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// An `(x, y)` position in canvas (pixel) space, before any resolution scaling.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to `other`.
    pub fn distance_sq(self, other: Point2D) -> f64 {
        DVec2::from(self).distance_squared(other.into())
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Point2D) -> f64 {
        self.distance_sq(other).sqrt()
    }

    /// Translates by a fixed offset.
    pub fn offset(self, dx: f64, dy: f64) -> Point2D {
        Point2D::new(self.x + dx, self.y + dy)
    }

    /// Both coordinates are finite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<DVec2> for Point2D {
    fn from(v: DVec2) -> Self {
        Point2D::new(v.x, v.y)
    }
}

impl From<Point2D> for DVec2 {
    fn from(p: Point2D) -> Self {
        DVec2::new(p.x, p.y)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Point2D::new(x, y)
    }
}

impl std::fmt::Display for Point2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

impl std::str::FromStr for Point2D {
    type Err = String;

    /// Parses `"x,y"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected 'x,y', got '{s}'"))?;
        let x: f64 = x.trim().parse().map_err(|e| format!("bad x in '{s}': {e}"))?;
        let y: f64 = y.trim().parse().map_err(|e| format!("bad y in '{s}': {e}"))?;
        Ok(Point2D::new(x, y))
    }
}
