//! Spatial primitives for sensor and scene coordinates
//!
//! Scene space uses a left-handed, Y-up convention:
//! - X: Right (+) / Left (-)
//! - Y: Up (+) / Down (-)
//! - Z: Forward (+), away from the viewer
//!
//! Sensor space is the device's own millimetre frame; it only ever reaches
//! the scene through [`InteractionBox`] normalization.

use serde::{Deserialize, Deserializer};

mod interaction_box;
mod point3d;
mod quaternion;
mod transform;
mod vector3d;

pub use interaction_box::InteractionBox;
pub use point3d::Point3D;
pub use quaternion::Quaternion;
pub use transform::Transform;
pub use vector3d::Vector3D;

/// Reads a coordinate that JSON wrote as `null`, which is how serde_json
/// encodes NaN and infinities
fn nullable_f32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    Ok(Option::<f32>::deserialize(deserializer)?.unwrap_or(f32::NAN))
}
