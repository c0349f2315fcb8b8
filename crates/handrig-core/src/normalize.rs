//! Sensor space to scene space mapping
//!
//! Two stages: the frame's interaction box maps a raw point into the unit
//! cube, then a fixed affine remap places that cube in the scene. The
//! default remap yields a 10-unit cube centred on the x/y origin, pushed
//! 15 units along depth with the depth axis inverted:
//!
//! ```text
//! scene = (u*10 - 5, v*10 - 5, -w*10 + 15)
//! ```

use serde::{Deserialize, Serialize};

use crate::spatial::{InteractionBox, Point3D};

/// Affine remap from the unit cube into scene space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneRemap {
    pub scale: f32,
    pub offset: Point3D,
    /// Flip the depth axis so sensor "towards the user" becomes scene "near"
    pub invert_depth: bool,
}

impl SceneRemap {
    pub const SCALE: f32 = 10.0;
    pub const OFFSET: Point3D = Point3D {
        x: -5.0,
        y: -5.0,
        z: 15.0,
    };

    pub fn apply(&self, unit: Point3D) -> Point3D {
        let depth = if self.invert_depth { -unit.z } else { unit.z };
        Point3D::new(
            unit.x * self.scale + self.offset.x,
            unit.y * self.scale + self.offset.y,
            depth * self.scale + self.offset.z,
        )
    }
}

impl Default for SceneRemap {
    fn default() -> Self {
        Self {
            scale: Self::SCALE,
            offset: Self::OFFSET,
            invert_depth: true,
        }
    }
}

/// What is being normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointKind {
    Palm,
    Joint,
}

/// Maps raw sensor points into scene space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalizer {
    /// Clamp palm positions to the interaction box
    pub clamp_palm: bool,
    /// Clamp joint positions to the interaction box
    pub clamp_joints: bool,
    pub remap: SceneRemap,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            clamp_palm: true,
            clamp_joints: true,
            remap: SceneRemap::default(),
        }
    }
}

impl Normalizer {
    /// Raw sensor point to unit-cube coordinates
    pub fn normalize(&self, point: Point3D, volume: &InteractionBox, kind: PointKind) -> Point3D {
        let clamp = match kind {
            PointKind::Palm => self.clamp_palm,
            PointKind::Joint => self.clamp_joints,
        };
        volume.normalize_point(point, clamp)
    }

    /// Unit-cube coordinates to scene space
    pub fn to_scene(&self, unit: Point3D) -> Point3D {
        self.remap.apply(unit)
    }

    /// Raw sensor point straight to scene space
    pub fn scene_point(&self, point: Point3D, volume: &InteractionBox, kind: PointKind) -> Point3D {
        self.to_scene(self.normalize(point, volume, kind))
    }
}
