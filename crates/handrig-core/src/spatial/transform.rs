//! Position and rotation of a scene entity

use super::{Point3D, Quaternion, Vector3D};
use serde::{Deserialize, Serialize};

/// Local position plus rotation, as last assigned to an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Point3D,
    pub rotation: Quaternion,
}

impl Transform {
    /// Identity transform (origin, no rotation)
    pub fn identity() -> Self {
        Self {
            position: Point3D::ORIGIN,
            rotation: Quaternion::IDENTITY,
        }
    }

    /// Get the forward direction of this transform
    pub fn forward(&self) -> Vector3D {
        self.rotation.forward()
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Point3D::ORIGIN);
        assert_eq!(t.rotation, Quaternion::IDENTITY);
        assert_eq!(t.forward(), Vector3D::FORWARD);
    }
}
