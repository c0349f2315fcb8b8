//! Per-finger and palm transform computation
//!
//! Joints are placed at their normalized scene positions. Each segment sits
//! halfway between its two joints and faces the outer one. A joint or
//! segment whose inputs are missing or non-finite keeps the transform it had
//! last tick.

use crate::normalize::{Normalizer, PointKind};
use crate::pool::{EntityPose, FingerSlot};
use crate::scene::{Result, SceneGraph};
use crate::sensor::{SensorFinger, SensorHand, JOINTS_PER_FINGER, SEGMENTS_PER_FINGER};
use crate::spatial::{InteractionBox, Quaternion, Vector3D};

/// Where along a bone its segment entity is placed
const SEGMENT_T: f32 = 0.5;

/// What a single finger update touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FingerUpdate {
    pub joints: usize,
    pub segments: usize,
    /// Segments whose direction was degenerate and kept their old rotation
    pub degenerate: usize,
}

/// Position the joints and segments of one finger
pub fn resolve_finger<S: SceneGraph + ?Sized>(
    slot: &mut FingerSlot,
    finger: &SensorFinger,
    volume: &InteractionBox,
    normalizer: &Normalizer,
    scene: &mut S,
) -> Result<FingerUpdate> {
    let mut update = FingerUpdate::default();
    let mut resolved = [false; JOINTS_PER_FINGER];

    for (i, raw) in finger.joints.iter().take(JOINTS_PER_FINGER).enumerate() {
        let position = normalizer.scene_point(*raw, volume, PointKind::Joint);
        if !position.is_finite() {
            continue;
        }
        let joint = &mut slot.joints[i];
        scene.set_local_position(joint.entity, position)?;
        joint.transform.position = position;
        resolved[i] = true;
        update.joints += 1;
    }

    for i in 0..SEGMENTS_PER_FINGER {
        if !(resolved[i] && resolved[i + 1]) {
            continue;
        }
        let start = slot.joints[i].transform.position;
        let end = slot.joints[i + 1].transform.position;
        let segment = &mut slot.segments[i];

        let position = start.lerp(&end, SEGMENT_T);
        scene.set_local_position(segment.entity, position)?;
        segment.transform.position = position;
        update.segments += 1;

        match Quaternion::look_rotation(end - position, Vector3D::UP) {
            Some(rotation) => {
                scene.set_rotation(segment.entity, rotation)?;
                segment.transform.rotation = rotation;
            }
            None => update.degenerate += 1,
        }
    }

    Ok(update)
}

/// Palm rotation from the hand's pitch, yaw and roll.
///
/// Pitch is negated going into the scene; yaw and roll carry over directly.
pub fn palm_rotation(hand: &SensorHand) -> Quaternion {
    Quaternion::from_euler_degrees(
        -hand.pitch().to_degrees(),
        hand.yaw().to_degrees(),
        hand.roll().to_degrees(),
    )
}

/// Position and orient the palm entity
pub fn resolve_palm<S: SceneGraph + ?Sized>(
    palm: &mut EntityPose,
    hand: &SensorHand,
    volume: &InteractionBox,
    normalizer: &Normalizer,
    scene: &mut S,
) -> Result<()> {
    let position = normalizer.scene_point(hand.palm_position, volume, PointKind::Palm);
    if position.is_finite() {
        scene.set_local_position(palm.entity, position)?;
        palm.transform.position = position;
    }

    let rotation = palm_rotation(hand);
    if rotation.is_finite() {
        scene.set_rotation(palm.entity, rotation)?;
        palm.transform.rotation = rotation;
    }
    Ok(())
}
