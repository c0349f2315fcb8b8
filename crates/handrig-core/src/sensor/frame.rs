//! Immutable per-tick sensor data

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::spatial::{InteractionBox, Point3D, Vector3D};

/// Joints reported per finger, metacarpal base through tip
pub const JOINTS_PER_FINGER: usize = 4;
/// Bones between consecutive joints
pub const SEGMENTS_PER_FINGER: usize = JOINTS_PER_FINGER - 1;
/// Fingers per hand, thumb through pinky
pub const FINGERS_PER_HAND: usize = 5;

/// Sensor-assigned hand token.
///
/// Stable while a hand stays in view; the sensor may hand the same value
/// to a different hand later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandId(pub i32);

impl fmt::Display for HandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Finger type, indexed the way sensors number them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "FingerRepr", into = "u8")]
pub enum FingerKind {
    Thumb = 0,
    Index = 1,
    Middle = 2,
    Ring = 3,
    Pinky = 4,
}

impl FingerKind {
    pub const ALL: [FingerKind; FINGERS_PER_HAND] = [
        Self::Thumb,
        Self::Index,
        Self::Middle,
        Self::Ring,
        Self::Pinky,
    ];

    /// Array index (0-4)
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thumb => "thumb",
            Self::Index => "index",
            Self::Middle => "middle",
            Self::Ring => "ring",
            Self::Pinky => "pinky",
        }
    }
}

impl TryFrom<u8> for FingerKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| format!("finger type {} out of range 0-4", value))
    }
}

/// Wire form of a finger type: its index or its lowercase name
#[derive(Deserialize)]
#[serde(untagged)]
enum FingerRepr {
    Index(u8),
    Name(String),
}

impl TryFrom<FingerRepr> for FingerKind {
    type Error = String;

    fn try_from(repr: FingerRepr) -> Result<Self, Self::Error> {
        match repr {
            FingerRepr::Index(i) => Self::try_from(i),
            FingerRepr::Name(name) => Self::ALL
                .into_iter()
                .find(|k| k.as_str().eq_ignore_ascii_case(&name))
                .ok_or_else(|| format!("unknown finger type {:?}", name)),
        }
    }
}

impl From<FingerKind> for u8 {
    fn from(kind: FingerKind) -> Self {
        kind as u8
    }
}

/// One finger as reported by the sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorFinger {
    pub kind: FingerKind,
    /// Up to four joint positions in sensor space; fewer means the tail
    /// joints were not resolved this frame
    #[serde(default)]
    pub joints: Vec<Point3D>,
}

impl SensorFinger {
    pub fn new(kind: FingerKind, joints: Vec<Point3D>) -> Self {
        Self { kind, joints }
    }
}

/// One tracked hand in a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorHand {
    pub id: HandId,
    pub handedness: Handedness,
    pub palm_position: Point3D,
    /// Palm-to-fingers direction
    #[serde(default = "default_direction")]
    pub direction: Vector3D,
    /// Normal pointing out of the palm
    #[serde(default = "default_palm_normal")]
    pub palm_normal: Vector3D,
    #[serde(default)]
    pub fingers: Vec<SensorFinger>,
}

fn default_direction() -> Vector3D {
    Vector3D::BACK
}

fn default_palm_normal() -> Vector3D {
    Vector3D::DOWN
}

impl SensorHand {
    /// A level, palm-down hand with no finger data
    pub fn new(id: HandId, handedness: Handedness, palm_position: Point3D) -> Self {
        Self {
            id,
            handedness,
            palm_position,
            direction: default_direction(),
            palm_normal: default_palm_normal(),
            fingers: Vec::new(),
        }
    }

    pub fn with_orientation(mut self, direction: Vector3D, palm_normal: Vector3D) -> Self {
        self.direction = direction;
        self.palm_normal = palm_normal;
        self
    }

    pub fn with_finger(mut self, finger: SensorFinger) -> Self {
        self.fingers.push(finger);
        self
    }

    pub fn pitch(&self) -> f32 {
        self.direction.pitch()
    }

    pub fn yaw(&self) -> f32 {
        self.direction.yaw()
    }

    pub fn roll(&self) -> f32 {
        self.palm_normal.roll()
    }
}

/// One polling snapshot of every hand the sensor sees
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorFrame {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub hands: Vec<SensorHand>,
    #[serde(default)]
    pub interaction_box: InteractionBox,
}

impl SensorFrame {
    /// A frame with no hands, used before the first poll
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(id: u64, interaction_box: InteractionBox, hands: Vec<SensorHand>) -> Self {
        Self {
            id,
            hands,
            interaction_box,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }

    /// First hand carrying `id`
    pub fn hand(&self, id: HandId) -> Option<&SensorHand> {
        self.hands.iter().find(|h| h.id == id)
    }

    pub fn contains(&self, id: HandId) -> bool {
        self.hand(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finger_kind_from_index() {
        assert_eq!(FingerKind::try_from(0u8), Ok(FingerKind::Thumb));
        assert_eq!(FingerKind::try_from(4u8), Ok(FingerKind::Pinky));
        assert!(FingerKind::try_from(5u8).is_err());
    }

    #[test]
    fn test_frame_json_defaults() {
        let json = r#"{"id": 3, "hands": [{"id": 7, "handedness": "left",
            "palm_position": {"x": 0.0, "y": 200.0, "z": 0.0},
            "fingers": [{"kind": 1, "joints": []}]}]}"#;
        let frame: SensorFrame = serde_json::from_str(json).unwrap();
        let hand = frame.hand(HandId(7)).unwrap();
        assert_eq!(hand.handedness, Handedness::Left);
        assert_eq!(hand.direction, Vector3D::BACK);
        assert_eq!(hand.fingers[0].kind, FingerKind::Index);
        assert_eq!(frame.interaction_box, InteractionBox::default());
    }

    #[test]
    fn test_finger_kind_by_name() {
        let finger: SensorFinger = serde_json::from_str(r#"{"kind": "Ring"}"#).unwrap();
        assert_eq!(finger.kind, FingerKind::Ring);
        assert!(finger.joints.is_empty());
    }

    #[test]
    fn test_rejects_unknown_finger() {
        let json = r#"{"kind": 9, "joints": []}"#;
        assert!(serde_json::from_str::<SensorFinger>(json).is_err());
        let json = r#"{"kind": "claw", "joints": []}"#;
        assert!(serde_json::from_str::<SensorFinger>(json).is_err());
    }
}
