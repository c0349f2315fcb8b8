//! Read-only view of the pool after a completed tick

use serde::Serialize;

use crate::pool::{EntityPose, FingerSlot, HandSlotPool};
use crate::scene::EntityId;
use crate::sensor::{FingerKind, HandId, Handedness};
use crate::spatial::Transform;

/// One entity and where it was last placed
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PoseView {
    pub entity: EntityId,
    pub transform: Transform,
}

impl From<&EntityPose> for PoseView {
    fn from(pose: &EntityPose) -> Self {
        Self {
            entity: pose.entity,
            transform: pose.transform,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FingerView {
    pub kind: FingerKind,
    pub joints: Vec<PoseView>,
    pub segments: Vec<PoseView>,
}

impl FingerView {
    fn new(kind: FingerKind, slot: &FingerSlot) -> Self {
        Self {
            kind,
            joints: slot.joints.iter().map(PoseView::from).collect(),
            segments: slot.segments.iter().map(PoseView::from).collect(),
        }
    }
}

/// An occupied slot as seen from outside the tracker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandView {
    pub slot: usize,
    pub id: HandId,
    pub handedness: Handedness,
    pub palm: PoseView,
    pub fingers: Vec<FingerView>,
}

impl HandView {
    pub fn finger(&self, kind: FingerKind) -> Option<&FingerView> {
        self.fingers.iter().find(|f| f.kind == kind)
    }

    pub fn entity_count(&self) -> usize {
        1 + self
            .fingers
            .iter()
            .map(|f| f.joints.len() + f.segments.len())
            .sum::<usize>()
    }
}

/// Every tracked hand at the end of one tick
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HandsSnapshot {
    pub tick: u64,
    pub frame_id: u64,
    pub capacity: usize,
    pub hands: Vec<HandView>,
}

impl HandsSnapshot {
    pub fn capture(pool: &HandSlotPool, tick: u64, frame_id: u64) -> Self {
        let hands = pool
            .occupied()
            .filter_map(|slot| {
                let bound = slot.binding()?;
                Some(HandView {
                    slot: slot.index(),
                    id: bound.id,
                    handedness: bound.handedness,
                    palm: PoseView::from(&bound.palm),
                    fingers: FingerKind::ALL
                        .iter()
                        .map(|&kind| FingerView::new(kind, bound.finger(kind)))
                        .collect(),
                })
            })
            .collect();

        Self {
            tick,
            frame_id,
            capacity: pool.capacity(),
            hands,
        }
    }

    pub fn by_slot(&self, slot: usize) -> Option<&HandView> {
        self.hands.iter().find(|h| h.slot == slot)
    }

    pub fn by_handedness(&self, handedness: Handedness) -> Option<&HandView> {
        self.hands.iter().find(|h| h.handedness == handedness)
    }

    pub fn by_id(&self, id: HandId) -> Option<&HandView> {
        self.hands.iter().find(|h| h.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::ENTITIES_PER_HAND;
    use crate::scene::MemoryScene;
    use crate::sensor::SensorHand;
    use crate::spatial::Point3D;

    #[test]
    fn test_capture() {
        let mut scene = MemoryScene::new();
        let mut pool = HandSlotPool::new(2);
        let hand = SensorHand::new(HandId(5), Handedness::Right, Point3D::ORIGIN);
        pool.try_bind(&hand, &mut scene, 1);

        let snapshot = HandsSnapshot::capture(&pool, 1, 10);
        assert_eq!(snapshot.hands.len(), 1);
        assert_eq!(snapshot.capacity, 2);

        let view = snapshot.by_handedness(Handedness::Right).unwrap();
        assert_eq!(view.slot, 0);
        assert_eq!(view.entity_count(), ENTITIES_PER_HAND);
        assert_eq!(view.finger(FingerKind::Thumb).unwrap().segments.len(), 3);
        assert!(snapshot.by_handedness(Handedness::Left).is_none());
        assert_eq!(snapshot.by_id(HandId(5)), snapshot.by_slot(0));
    }
}
