//! Math type re-exports and CMDL-specific math utilities.
//!
//! This module re-exports the `glam` vector types used by the model and
//! provides the axis-aligned bounding box stored in every CMDL header.

pub use glam::{Vec2, Vec3, Vec4};

use std::fmt;

/// Axis-aligned bounding box (min/max corners).
#[derive(Clone, Copy, Default, PartialEq)]
pub struct AABox {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABox {
    /// Empty bounding box (inverted, will expand on first point).
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create a new bounding box from min and max points.
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Bounding box enclosing all points, or `EMPTY` for no points.
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut bbox = Self::EMPTY;
        for &p in points {
            bbox.expand_by_point(p);
        }
        bbox
    }

    /// Check if this box is empty (has no volume).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this box to include a point.
    #[inline]
    pub fn expand_by_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Get the center of the box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the size (extent) of the box.
    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

impl fmt::Debug for AABox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AABox([{}, {}, {}] - [{}, {}, {}])",
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let bbox = AABox::from_points(&[
            Vec3::new(1.0, -2.0, 0.5),
            Vec3::new(-1.0, 4.0, 0.0),
        ]);
        assert_eq!(bbox.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(bbox.max, Vec3::new(1.0, 4.0, 0.5));
        assert_eq!(bbox.center(), Vec3::new(0.0, 1.0, 0.25));
    }

    #[test]
    fn test_empty() {
        assert!(AABox::EMPTY.is_empty());
        assert!(AABox::from_points(&[]).is_empty());
        assert!(!AABox::new(Vec3::ZERO, Vec3::ONE).is_empty());
    }
}
