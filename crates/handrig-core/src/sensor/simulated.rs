//! Synthetic sensor for development without hardware
//!
//! Generates deterministic hands that drift around the interaction box and
//! periodically leave and re-enter view under the same identity, which
//! exercises the full add/update/remove cycle.

use super::source::{SensorError, SensorSource};
use super::{
    FingerKind, HandId, Handedness, SensorFinger, SensorFrame, SensorHand, JOINTS_PER_FINGER,
};
use crate::spatial::{InteractionBox, Point3D, Vector3D};

/// Distance between consecutive simulated joints, in millimetres
const JOINT_SPACING: f32 = 22.0;
/// Lateral distance between simulated finger bases, in millimetres
const FINGER_SPREAD: f32 = 19.0;

/// Parameters for [`SimulatedSource`]
#[derive(Debug, Clone)]
pub struct SimulationSettings {
    /// Identity of each simulated hand; even positions are left hands
    pub hand_ids: Vec<i32>,
    /// Ticks a hand stays in view per cycle
    pub visible_ticks: u64,
    /// Ticks a hand stays out of view per cycle
    pub hidden_ticks: u64,
    pub interaction_box: InteractionBox,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            hand_ids: vec![7, 12],
            visible_ticks: 30,
            hidden_ticks: 10,
            interaction_box: InteractionBox::default(),
        }
    }
}

pub struct SimulatedSource {
    settings: SimulationSettings,
    tick: u64,
}

impl SimulatedSource {
    pub fn new(settings: SimulationSettings) -> Self {
        Self { settings, tick: 0 }
    }

    /// Whether the hand at `slot` in the settings is in view on `tick`
    fn visible(&self, slot: usize, tick: u64) -> bool {
        let cycle = self.settings.visible_ticks + self.settings.hidden_ticks;
        if cycle == 0 || self.settings.hidden_ticks == 0 {
            return true;
        }
        // Stagger hands so they do not all vanish together
        let offset = slot as u64 * (self.settings.visible_ticks / 2).max(1);
        (tick + offset) % cycle < self.settings.visible_ticks
    }

    fn hand(&self, slot: usize, id: i32, tick: u64) -> SensorHand {
        let b = &self.settings.interaction_box;
        let theta = tick as f32 * 0.05 + slot as f32 * std::f32::consts::FRAC_PI_2;
        let side = if slot % 2 == 0 { -1.0 } else { 1.0 };
        let handedness = if slot % 2 == 0 {
            Handedness::Left
        } else {
            Handedness::Right
        };

        let palm = Point3D::new(
            b.center.x + side * b.size.x * 0.2 + theta.cos() * b.size.x * 0.1,
            b.center.y + theta.sin() * b.size.y * 0.15,
            b.center.z + (theta * 0.5).sin() * b.size.z * 0.2,
        );
        let direction = Vector3D::new(theta.sin() * 0.2, 0.1, -1.0).normalize();
        let lateral = Vector3D::RIGHT;

        let mut hand = SensorHand::new(HandId(id), handedness, palm)
            .with_orientation(direction, Vector3D::DOWN);

        for kind in FingerKind::ALL {
            let spread = (kind.index() as f32 - 2.0) * FINGER_SPREAD * -side;
            let base = palm + lateral * spread + direction * 30.0;
            let curl = (theta + kind.index() as f32).sin().abs() * 0.3;
            let joints = (0..JOINTS_PER_FINGER)
                .map(|j| {
                    let along = direction * (j as f32 * JOINT_SPACING);
                    let droop = Vector3D::DOWN * (j as f32 * JOINT_SPACING * curl);
                    base + along + droop
                })
                .collect();
            hand = hand.with_finger(SensorFinger::new(kind, joints));
        }
        hand
    }
}

impl SensorSource for SimulatedSource {
    fn latest_frame(&mut self) -> Result<SensorFrame, SensorError> {
        let tick = self.tick;
        self.tick += 1;

        let hands = self
            .settings
            .hand_ids
            .iter()
            .enumerate()
            .filter(|(slot, _)| self.visible(*slot, tick))
            .map(|(slot, id)| self.hand(slot, *id, tick))
            .collect();

        Ok(SensorFrame::new(tick + 1, self.settings.interaction_box, hands))
    }
}
