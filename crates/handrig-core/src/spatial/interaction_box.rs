//! Sensor interaction volume used to normalize raw coordinates

use super::{Point3D, Vector3D};
use serde::{Deserialize, Serialize};

/// Axis-aligned region of sensor space in which hands are tracked.
///
/// Stored as center plus per-axis size, the way sensors report it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionBox {
    pub center: Point3D,
    pub size: Vector3D,
}

impl InteractionBox {
    /// Create a box from its center and per-axis size
    pub fn new(center: Point3D, size: Vector3D) -> Self {
        Self { center, size }
    }

    /// Create a box from min/max corners
    pub fn from_min_max(min: Point3D, max: Point3D) -> Self {
        Self {
            center: min.lerp(&max, 0.5),
            size: max - min,
        }
    }

    pub fn min(&self) -> Point3D {
        self.center + self.size * -0.5
    }

    pub fn max(&self) -> Point3D {
        self.center + self.size * 0.5
    }

    /// Map a sensor-space point into the unit cube spanned by this box.
    ///
    /// With `clamp` each axis is limited to `[0, 1]`; otherwise points
    /// outside the box extrapolate linearly. An axis of zero size maps to
    /// the cube's middle.
    pub fn normalize_point(&self, point: Point3D, clamp: bool) -> Point3D {
        let axis = |p: f32, c: f32, s: f32| -> f32 {
            if s.abs() <= f32::EPSILON || !s.is_finite() {
                return 0.5;
            }
            let n = (p - c) / s + 0.5;
            if clamp {
                n.clamp(0.0, 1.0)
            } else {
                n
            }
        };

        Point3D::new(
            axis(point.x, self.center.x, self.size.x),
            axis(point.y, self.center.y, self.size.y),
            axis(point.z, self.center.z, self.size.z),
        )
    }
}

impl Default for InteractionBox {
    /// Typical desktop controller volume, in millimetres
    fn default() -> Self {
        Self {
            center: Point3D::new(0.0, 200.0, 0.0),
            size: Vector3D::new(235.0, 235.0, 147.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> InteractionBox {
        InteractionBox::from_min_max(Point3D::new(-100.0, 0.0, -50.0), Point3D::new(100.0, 200.0, 50.0))
    }

    #[test]
    fn test_center_maps_to_half() {
        let b = cube();
        assert_eq!(b.normalize_point(b.center, true), Point3D::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_corners() {
        let b = cube();
        assert_eq!(b.normalize_point(b.min(), true), Point3D::new(0.0, 0.0, 0.0));
        assert_eq!(b.normalize_point(b.max(), true), Point3D::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_clamp_versus_extrapolate() {
        let b = cube();
        let outside = Point3D::new(300.0, -200.0, 0.0);
        assert_eq!(b.normalize_point(outside, true), Point3D::new(1.0, 0.0, 0.5));
        assert_eq!(b.normalize_point(outside, false), Point3D::new(2.0, -1.0, 0.5));
    }

    #[test]
    fn test_flat_box_has_no_nan() {
        let b = InteractionBox::new(Point3D::ORIGIN, Vector3D::new(100.0, 0.0, 100.0));
        let n = b.normalize_point(Point3D::new(10.0, 10.0, 10.0), false);
        assert!(n.is_finite());
        assert_eq!(n.y, 0.5);
    }
}
