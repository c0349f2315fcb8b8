//! 3D point representation

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A point in sensor or scene space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3D {
    #[serde(deserialize_with = "super::nullable_f32")]
    pub x: f32,
    #[serde(deserialize_with = "super::nullable_f32")]
    pub y: f32,
    #[serde(deserialize_with = "super::nullable_f32")]
    pub z: f32,
}

impl Point3D {
    /// Origin point (0, 0, 0)
    pub const ORIGIN: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a new 3D point
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point3D) -> f32 {
        (*other - *self).magnitude()
    }

    /// Linear interpolation between two points
    pub fn lerp(&self, other: &Point3D, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f32; 3]> for Point3D {
    fn from(v: [f32; 3]) -> Self {
        Point3D::new(v[0], v[1], v[2])
    }
}

impl Add<super::Vector3D> for Point3D {
    type Output = Point3D;

    fn add(self, rhs: super::Vector3D) -> Self::Output {
        Point3D::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3D {
    type Output = super::Vector3D;

    fn sub(self, rhs: Self) -> Self::Output {
        super::Vector3D::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Point3D::ORIGIN;
        let b = Point3D::new(3.0, 4.0, 0.0);
        assert!((a.distance(&b) - 5.0).abs() < 0.0001);
    }

    #[test]
    fn test_null_coordinate_reads_as_nan() {
        let p: Point3D = serde_json::from_str(r#"{"x": null, "y": 2.0, "z": 3.0}"#).unwrap();
        assert!(p.x.is_nan());
        assert_eq!((p.y, p.z), (2.0, 3.0));
        assert!(!p.is_finite());
    }

    #[test]
    fn test_lerp_midpoint() {
        let a = Point3D::new(-2.0, 0.0, 4.0);
        let b = Point3D::new(2.0, 6.0, 8.0);
        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid, Point3D::new(0.0, 3.0, 6.0));
    }
}
