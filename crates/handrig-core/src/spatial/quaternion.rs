//! Quaternion representation for 3D rotations

use super::Vector3D;
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// Directions shorter than this are treated as degenerate
const DEGENERATE_EPSILON: f32 = 1e-6;

/// A quaternion for representing 3D rotations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quaternion {
    /// Identity quaternion (no rotation)
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Create a new quaternion
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Create a quaternion from axis-angle representation
    pub fn from_axis_angle(axis: Vector3D, angle_radians: f32) -> Self {
        let half_angle = angle_radians / 2.0;
        let sin_half = half_angle.sin();
        let cos_half = half_angle.cos();
        let normalized = axis.normalize();

        Self {
            x: normalized.x * sin_half,
            y: normalized.y * sin_half,
            z: normalized.z * sin_half,
            w: cos_half,
        }
    }

    /// Create a rotation from Euler angles in degrees.
    ///
    /// Rotates `z` degrees around the z axis, then `x` around the x axis,
    /// then `y` around the y axis.
    pub fn from_euler_degrees(x: f32, y: f32, z: f32) -> Self {
        let qx = Self::from_axis_angle(Vector3D::RIGHT, x.to_radians());
        let qy = Self::from_axis_angle(Vector3D::UP, y.to_radians());
        let qz = Self::from_axis_angle(Vector3D::FORWARD, z.to_radians());
        (qy * qx * qz).normalize()
    }

    /// Rotation whose forward (+Z) axis points along `forward` and whose up
    /// axis is as close to `up` as possible.
    ///
    /// Returns `None` for a zero-length (or non-finite) `forward`. When
    /// `forward` is parallel to `up` a substitute up axis is used, so any
    /// returned rotation is finite.
    pub fn look_rotation(forward: Vector3D, up: Vector3D) -> Option<Self> {
        let mag = forward.magnitude();
        if !mag.is_finite() || mag < DEGENERATE_EPSILON {
            return None;
        }
        let z = forward * (1.0 / mag);

        let mut x = up.cross(&z);
        if x.magnitude_squared() < DEGENERATE_EPSILON {
            // forward is (anti)parallel to up
            let alt = if z.y > 0.0 { Vector3D::BACK } else { Vector3D::FORWARD };
            x = alt.cross(&z);
        }
        let x = x.normalize();
        let y = z.cross(&x);

        Some(Self::from_basis(x, y, z))
    }

    /// Build a quaternion from the columns of an orthonormal rotation matrix
    fn from_basis(x: Vector3D, y: Vector3D, z: Vector3D) -> Self {
        let (m00, m01, m02) = (x.x, y.x, z.x);
        let (m10, m11, m12) = (x.y, y.y, z.y);
        let (m20, m21, m22) = (x.z, y.z, z.z);

        let trace = m00 + m11 + m22;
        let q = if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Self::new((m21 - m12) / s, (m02 - m20) / s, (m10 - m01) / s, 0.25 * s)
        } else if m00 > m11 && m00 > m22 {
            let s = (1.0 + m00 - m11 - m22).sqrt() * 2.0;
            Self::new(0.25 * s, (m01 + m10) / s, (m02 + m20) / s, (m21 - m12) / s)
        } else if m11 > m22 {
            let s = (1.0 + m11 - m00 - m22).sqrt() * 2.0;
            Self::new((m01 + m10) / s, 0.25 * s, (m12 + m21) / s, (m02 - m20) / s)
        } else {
            let s = (1.0 + m22 - m00 - m11).sqrt() * 2.0;
            Self::new((m02 + m20) / s, (m12 + m21) / s, 0.25 * s, (m10 - m01) / s)
        };
        q.normalize()
    }

    /// Get the magnitude of the quaternion
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    /// Normalize the quaternion
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag > 0.0 {
            Self {
                x: self.x / mag,
                y: self.y / mag,
                z: self.z / mag,
                w: self.w / mag,
            }
        } else {
            Self::IDENTITY
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }

    /// Rotate a vector by this quaternion
    pub fn rotate_vector(&self, v: Vector3D) -> Vector3D {
        let q_vec = Vector3D::new(self.x, self.y, self.z);
        let uv = q_vec.cross(&v);
        let uuv = q_vec.cross(&uv);
        v + (uv * self.w + uuv) * 2.0
    }

    /// Get the forward vector (where this rotation points)
    pub fn forward(&self) -> Vector3D {
        self.rotate_vector(Vector3D::FORWARD)
    }

    /// Get the up vector
    pub fn up(&self) -> Vector3D {
        self.rotate_vector(Vector3D::UP)
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Quaternion {
    type Output = Quaternion;

    fn mul(self, rhs: Self) -> Self::Output {
        Quaternion::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn assert_vec_eq(a: Vector3D, b: Vector3D) {
        assert!((a - b).magnitude() < 0.0001, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_90_degree_rotation() {
        let q = Quaternion::from_axis_angle(Vector3D::UP, PI / 2.0);
        assert_vec_eq(q.rotate_vector(Vector3D::FORWARD), Vector3D::RIGHT);
    }

    #[test]
    fn test_look_rotation_forward_is_identity() {
        let q = Quaternion::look_rotation(Vector3D::FORWARD, Vector3D::UP).unwrap();
        assert!((q.w.abs() - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_look_rotation_points_forward_axis() {
        let dir = Vector3D::new(1.0, 2.0, -3.0);
        let q = Quaternion::look_rotation(dir, Vector3D::UP).unwrap();
        assert_vec_eq(q.forward(), dir.normalize());
        // Up stays in the vertical plane containing the direction
        assert!(q.up().y > 0.0);
    }

    #[test]
    fn test_look_rotation_parallel_to_up() {
        let q = Quaternion::look_rotation(Vector3D::UP * 3.0, Vector3D::UP).unwrap();
        assert!(q.is_finite());
        assert_vec_eq(q.forward(), Vector3D::UP);

        let q = Quaternion::look_rotation(Vector3D::DOWN, Vector3D::UP).unwrap();
        assert!(q.is_finite());
        assert_vec_eq(q.forward(), Vector3D::DOWN);
    }

    #[test]
    fn test_look_rotation_degenerate() {
        assert!(Quaternion::look_rotation(Vector3D::ZERO, Vector3D::UP).is_none());
        let nan = Vector3D::new(f32::NAN, 0.0, 1.0);
        assert!(Quaternion::look_rotation(nan, Vector3D::UP).is_none());
    }

    #[test]
    fn test_euler_yaw_only() {
        let q = Quaternion::from_euler_degrees(0.0, 90.0, 0.0);
        assert_vec_eq(q.forward(), Vector3D::RIGHT);
    }

    #[test]
    fn test_euler_order_roll_before_pitch() {
        // Roll leaves forward untouched, so only pitch moves it
        let q = Quaternion::from_euler_degrees(-90.0, 0.0, 45.0);
        assert_vec_eq(q.forward(), Vector3D::UP);
    }
}
