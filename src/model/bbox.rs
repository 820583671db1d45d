//! Axis-aligned bounding box in native image pixel coordinates.

use serde::{Deserialize, Serialize};

/// The four corners of a box, in hit-test priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// All corners in the fixed hit-test priority order.
    pub fn all() -> &'static [Corner] {
        &[
            Corner::TopLeft,
            Corner::TopRight,
            Corner::BottomLeft,
            Corner::BottomRight,
        ]
    }

    /// The corner diagonally opposite this one.
    pub fn opposite(&self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }
}

/// The four borders of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

/// An axis-aligned bounding box `(x1, y1, x2, y2)` in image pixels.
///
/// Invariant: `x1 <= x2` and `y1 <= y2`. Construction through [`BBox::new`]
/// normalizes by swapping, so stored boxes always satisfy it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BBox {
    /// Create a normalized box from two opposite corners in any order.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Create a normalized box from two corner points.
    pub fn from_corners(p1: (f32, f32), p2: (f32, f32)) -> Self {
        Self::new(p1.0, p1.1, p2.0, p2.1)
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Get a corner point.
    pub fn corner(&self, corner: Corner) -> (f32, f32) {
        match corner {
            Corner::TopLeft => (self.x1, self.y1),
            Corner::TopRight => (self.x2, self.y1),
            Corner::BottomLeft => (self.x1, self.y2),
            Corner::BottomRight => (self.x2, self.y2),
        }
    }

    /// The box as a `[x1, y1, x2, y2]` coordinate array.
    pub fn coords(&self) -> [f32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

impl From<[f32; 4]> for BBox {
    fn from(c: [f32; 4]) -> Self {
        BBox::new(c[0], c[1], c[2], c[3])
    }
}

impl From<BBox> for [f32; 4] {
    fn from(b: BBox) -> Self {
        b.coords()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_swapped_corners() {
        let b = BBox::new(50.0, 80.0, 10.0, 20.0);
        assert_eq!(b, BBox::new(10.0, 20.0, 50.0, 80.0));
        assert_eq!(b.width(), 40.0);
        assert_eq!(b.height(), 60.0);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let b = BBox::new(90.0, 5.0, 30.0, 70.0);
        let again = BBox::new(b.x1, b.y1, b.x2, b.y2);
        assert_eq!(b, again);
    }

    #[test]
    fn test_corner_points() {
        let b = BBox::new(10.0, 20.0, 50.0, 80.0);
        assert_eq!(b.corner(Corner::TopLeft), (10.0, 20.0));
        assert_eq!(b.corner(Corner::TopRight), (50.0, 20.0));
        assert_eq!(b.corner(Corner::BottomLeft), (10.0, 80.0));
        assert_eq!(b.corner(Corner::BottomRight), (50.0, 80.0));
    }

    #[test]
    fn test_opposite_corner() {
        assert_eq!(Corner::TopLeft.opposite(), Corner::BottomRight);
        assert_eq!(Corner::BottomLeft.opposite(), Corner::TopRight);
    }

    #[test]
    fn test_serde_as_coordinate_array() {
        let b: BBox = serde_json::from_str("[50.0, 80.0, 10.0, 20.0]").unwrap();
        assert_eq!(b, BBox::new(10.0, 20.0, 50.0, 80.0));
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, "[10.0,20.0,50.0,80.0]");
    }
}
