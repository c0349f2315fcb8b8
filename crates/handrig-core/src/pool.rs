//! Fixed-capacity pool of hand slots
//!
//! A slot is either free or bound to one sensor identity. Binding creates
//! every entity the hand needs (one palm, four joints and three segments per
//! finger); releasing destroys them all. Entity handles only exist inside a
//! bound slot, so a free slot cannot leak or alias them.

use tracing::{debug, warn};

use crate::normalize::Normalizer;
use crate::resolver::{resolve_finger, resolve_palm};
use crate::scene::{EntityId, SceneError, SceneGraph, Template};
use crate::sensor::{
    FingerKind, HandId, Handedness, SensorHand, FINGERS_PER_HAND, JOINTS_PER_FINGER,
    SEGMENTS_PER_FINGER,
};
use crate::spatial::{InteractionBox, Transform};

/// Entities owned by one bound slot
pub const ENTITIES_PER_HAND: usize =
    1 + FINGERS_PER_HAND * (JOINTS_PER_FINGER + SEGMENTS_PER_FINGER);

/// An entity plus the transform last written to it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityPose {
    pub entity: EntityId,
    pub transform: Transform,
}

impl EntityPose {
    pub fn new(entity: EntityId) -> Self {
        Self {
            entity,
            transform: Transform::identity(),
        }
    }
}

/// Entities for one finger. Segment `i` joins joint `i` to joint `i + 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FingerSlot {
    pub joints: [EntityPose; JOINTS_PER_FINGER],
    pub segments: [EntityPose; SEGMENTS_PER_FINGER],
}

impl FingerSlot {
    fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.joints
            .iter()
            .chain(self.segments.iter())
            .map(|pose| pose.entity)
    }
}

/// State held by an occupied slot
#[derive(Debug, Clone)]
pub struct BoundHand {
    pub id: HandId,
    pub handedness: Handedness,
    pub palm: EntityPose,
    pub fingers: [FingerSlot; FINGERS_PER_HAND],
    /// Latest sensor data for this hand
    pub hand: SensorHand,
    pub bound_at_tick: u64,
    pub refreshed_at_tick: Option<u64>,
}

impl BoundHand {
    pub fn finger(&self, kind: FingerKind) -> &FingerSlot {
        &self.fingers[kind.index()]
    }

    /// Every entity this hand owns, palm first
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        std::iter::once(self.palm.entity).chain(self.fingers.iter().flat_map(FingerSlot::entities))
    }
}

/// One position in the pool
#[derive(Debug, Clone)]
pub struct HandSlot {
    index: usize,
    binding: Option<BoundHand>,
}

impl HandSlot {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_occupied(&self) -> bool {
        self.binding.is_some()
    }

    pub fn binding(&self) -> Option<&BoundHand> {
        self.binding.as_ref()
    }

    pub fn id(&self) -> Option<HandId> {
        self.binding.as_ref().map(|b| b.id)
    }

    pub fn handedness(&self) -> Option<Handedness> {
        self.binding.as_ref().map(|b| b.handedness)
    }
}

#[derive(Debug, Clone)]
pub struct HandSlotPool {
    slots: Vec<HandSlot>,
    parent: Option<EntityId>,
}

impl HandSlotPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity)
                .map(|index| HandSlot {
                    index,
                    binding: None,
                })
                .collect(),
            parent: None,
        }
    }

    /// Attach every entity the pool creates under `parent`
    pub fn with_parent(mut self, parent: EntityId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[HandSlot] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&HandSlot> {
        self.slots.get(index)
    }

    pub fn occupied(&self) -> impl Iterator<Item = &HandSlot> + '_ {
        self.slots.iter().filter(|s| s.is_occupied())
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied().count()
    }

    pub fn is_full(&self) -> bool {
        self.occupied_count() == self.capacity()
    }

    /// Index of the slot bound to `id`
    pub fn slot_for(&self, id: HandId) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.id() == Some(id))
    }

    /// First occupied slot holding a hand of the given handedness
    pub fn by_handedness(&self, handedness: Handedness) -> Option<&HandSlot> {
        self.occupied()
            .find(|s| s.handedness() == Some(handedness))
    }

    /// Bind `hand` to a slot, creating its entities.
    ///
    /// Returns the existing index when the identity is already bound. When
    /// every slot is taken, or the scene refuses to create the entities, the
    /// hand is dropped and `None` is returned.
    pub fn try_bind<S: SceneGraph + ?Sized>(
        &mut self,
        hand: &SensorHand,
        scene: &mut S,
        tick: u64,
    ) -> Option<usize> {
        if let Some(index) = self.slot_for(hand.id) {
            return Some(index);
        }

        let Some(index) = self.slots.iter().position(|s| !s.is_occupied()) else {
            debug!(hand = %hand.id, capacity = self.capacity(), "Pool full, dropping hand");
            return None;
        };

        let mut created = Vec::with_capacity(ENTITIES_PER_HAND);
        let entities = allocate(scene, self.parent, &mut created);
        let (palm, fingers) = match entities {
            Ok(entities) => entities,
            Err(e) => {
                warn!(hand = %hand.id, error = %e, "Failed to create hand entities");
                for entity in created {
                    if let Err(e) = scene.destroy(entity) {
                        warn!(%entity, error = %e, "Failed to roll back entity");
                    }
                }
                return None;
            }
        };

        debug!(hand = %hand.id, slot = index, handedness = hand.handedness.as_str(), "Bound hand");
        self.slots[index].binding = Some(BoundHand {
            id: hand.id,
            handedness: hand.handedness,
            palm,
            fingers,
            hand: hand.clone(),
            bound_at_tick: tick,
            refreshed_at_tick: None,
        });
        Some(index)
    }

    /// Recompute every transform of the hand bound at `index`.
    ///
    /// Returns `false` when the slot is free or bound to another identity.
    /// Scene failures are logged; the rest of the hand is still updated.
    pub fn refresh<S: SceneGraph + ?Sized>(
        &mut self,
        index: usize,
        hand: &SensorHand,
        volume: &InteractionBox,
        normalizer: &Normalizer,
        scene: &mut S,
        tick: u64,
    ) -> bool {
        let Some(bound) = self.slots.get_mut(index).and_then(|s| s.binding.as_mut()) else {
            return false;
        };
        if bound.id != hand.id {
            debug!(slot = index, bound = %bound.id, hand = %hand.id, "Refresh with mismatched identity");
            return false;
        }

        for finger in &hand.fingers {
            let slot = &mut bound.fingers[finger.kind.index()];
            match resolve_finger(slot, finger, volume, normalizer, scene) {
                Ok(update) if update.degenerate > 0 => {
                    debug!(hand = %hand.id, finger = finger.kind.as_str(), segments = update.degenerate, "Degenerate segment direction, keeping rotation");
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(hand = %hand.id, finger = finger.kind.as_str(), error = %e, "Failed to update finger");
                }
            }
        }

        if let Err(e) = resolve_palm(&mut bound.palm, hand, volume, normalizer, scene) {
            warn!(hand = %hand.id, error = %e, "Failed to update palm");
        }

        bound.handedness = hand.handedness;
        bound.hand = hand.clone();
        bound.refreshed_at_tick = Some(tick);
        true
    }

    /// Destroy the entities of the hand at `index` and free the slot.
    ///
    /// Returns `false` if the slot was already free.
    pub fn release<S: SceneGraph + ?Sized>(&mut self, index: usize, scene: &mut S) -> bool {
        let Some(bound) = self.slots.get_mut(index).and_then(|s| s.binding.take()) else {
            return false;
        };

        for entity in bound.entities() {
            if let Err(e) = scene.destroy(entity) {
                warn!(hand = %bound.id, %entity, error = %e, "Failed to destroy entity");
            }
        }
        debug!(hand = %bound.id, slot = index, "Released hand");
        true
    }

    /// Release every occupied slot, returning how many were freed
    pub fn release_all<S: SceneGraph + ?Sized>(&mut self, scene: &mut S) -> usize {
        let mut released = 0;
        for index in 0..self.slots.len() {
            if self.release(index, scene) {
                released += 1;
            }
        }
        released
    }
}

fn spawn<S: SceneGraph + ?Sized>(
    scene: &mut S,
    template: Template,
    parent: Option<EntityId>,
    created: &mut Vec<EntityId>,
) -> Result<EntityPose, SceneError> {
    let entity = scene.instantiate(template, parent)?;
    created.push(entity);
    Ok(EntityPose::new(entity))
}

fn spawn_poses<const N: usize, S: SceneGraph + ?Sized>(
    scene: &mut S,
    template: Template,
    parent: Option<EntityId>,
    created: &mut Vec<EntityId>,
) -> Result<[EntityPose; N], SceneError> {
    let mut poses = [EntityPose::new(EntityId(0)); N];
    for pose in &mut poses {
        *pose = spawn(scene, template, parent, created)?;
    }
    Ok(poses)
}

/// Create the palm and every finger entity, recording each id in `created`
fn allocate<S: SceneGraph + ?Sized>(
    scene: &mut S,
    parent: Option<EntityId>,
    created: &mut Vec<EntityId>,
) -> Result<(EntityPose, [FingerSlot; FINGERS_PER_HAND]), SceneError> {
    let palm = spawn(scene, Template::Palm, parent, created)?;

    let mut finger = || -> Result<FingerSlot, SceneError> {
        Ok(FingerSlot {
            joints: spawn_poses(&mut *scene, Template::Joint, parent, &mut *created)?,
            segments: spawn_poses(&mut *scene, Template::Segment, parent, &mut *created)?,
        })
    };
    let fingers = [finger()?, finger()?, finger()?, finger()?, finger()?];

    Ok((palm, fingers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::MemoryScene;
    use crate::spatial::Point3D;

    fn hand(id: i32, handedness: Handedness) -> SensorHand {
        SensorHand::new(HandId(id), handedness, Point3D::new(0.0, 200.0, 0.0))
    }

    #[test]
    fn test_bind_creates_all_entities() {
        let mut scene = MemoryScene::new();
        let mut pool = HandSlotPool::new(2);

        let index = pool.try_bind(&hand(7, Handedness::Left), &mut scene, 1).unwrap();
        assert_eq!(index, 0);
        assert_eq!(scene.len(), ENTITIES_PER_HAND);
        assert_eq!(scene.count(Template::Palm), 1);
        assert_eq!(scene.count(Template::Joint), 20);
        assert_eq!(scene.count(Template::Segment), 15);

        let bound = pool.get(0).unwrap().binding().unwrap();
        assert_eq!(bound.handedness, Handedness::Left);
        assert_eq!(bound.bound_at_tick, 1);
        assert!(bound.entities().all(|e| scene.contains(e)));
    }

    #[test]
    fn test_bind_is_idempotent_per_identity() {
        let mut scene = MemoryScene::new();
        let mut pool = HandSlotPool::new(2);

        assert_eq!(pool.try_bind(&hand(7, Handedness::Left), &mut scene, 1), Some(0));
        assert_eq!(pool.try_bind(&hand(7, Handedness::Left), &mut scene, 2), Some(0));
        assert_eq!(pool.occupied_count(), 1);
        assert_eq!(scene.created(), ENTITIES_PER_HAND);
    }

    #[test]
    fn test_full_pool_drops_silently() {
        let mut scene = MemoryScene::new();
        let mut pool = HandSlotPool::new(1);

        assert!(pool.try_bind(&hand(1, Handedness::Left), &mut scene, 1).is_some());
        assert!(pool.try_bind(&hand(2, Handedness::Right), &mut scene, 1).is_none());
        assert!(pool.is_full());
        assert_eq!(scene.len(), ENTITIES_PER_HAND);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut scene = MemoryScene::new();
        let mut pool = HandSlotPool::new(2);
        pool.try_bind(&hand(7, Handedness::Left), &mut scene, 1);

        assert!(pool.release(0, &mut scene));
        assert!(scene.is_empty());
        assert_eq!(scene.destroyed(), ENTITIES_PER_HAND);

        assert!(!pool.release(0, &mut scene));
        assert!(!pool.release(5, &mut scene));
        assert_eq!(scene.destroyed(), ENTITIES_PER_HAND);
        assert!(!pool.get(0).unwrap().is_occupied());
    }

    #[test]
    fn test_rebind_gets_fresh_entities() {
        let mut scene = MemoryScene::new();
        let mut pool = HandSlotPool::new(1);

        pool.try_bind(&hand(7, Handedness::Left), &mut scene, 1);
        let before: Vec<EntityId> = pool.get(0).unwrap().binding().unwrap().entities().collect();
        pool.release(0, &mut scene);
        pool.try_bind(&hand(7, Handedness::Left), &mut scene, 2);
        let after: Vec<EntityId> = pool.get(0).unwrap().binding().unwrap().entities().collect();

        assert!(before.iter().all(|e| !after.contains(e)));
    }

    #[test]
    fn test_failed_allocation_rolls_back() {
        let mut scene = MemoryScene::with_limit(ENTITIES_PER_HAND + 10);
        let mut pool = HandSlotPool::new(2);

        assert!(pool.try_bind(&hand(1, Handedness::Left), &mut scene, 1).is_some());
        assert!(pool.try_bind(&hand(2, Handedness::Right), &mut scene, 1).is_none());
        assert_eq!(pool.occupied_count(), 1);
        assert_eq!(scene.len(), ENTITIES_PER_HAND);
    }

    #[test]
    fn test_entities_attach_to_parent() {
        let mut scene = MemoryScene::new();
        let root = scene.instantiate(Template::Palm, None).unwrap();
        let mut pool = HandSlotPool::new(1).with_parent(root);
        pool.try_bind(&hand(3, Handedness::Right), &mut scene, 1);

        let bound = pool.get(0).unwrap().binding().unwrap();
        assert!(bound.entities().all(|e| scene.get(e).unwrap().parent == Some(root)));
    }

    #[test]
    fn test_refresh_requires_matching_binding() {
        let mut scene = MemoryScene::new();
        let mut pool = HandSlotPool::new(2);
        let volume = InteractionBox::default();
        let n = Normalizer::default();

        assert!(!pool.refresh(0, &hand(7, Handedness::Left), &volume, &n, &mut scene, 1));
        pool.try_bind(&hand(7, Handedness::Left), &mut scene, 1);
        assert!(!pool.refresh(0, &hand(8, Handedness::Left), &volume, &n, &mut scene, 1));
        assert!(pool.refresh(0, &hand(7, Handedness::Left), &volume, &n, &mut scene, 2));
        assert_eq!(pool.get(0).unwrap().binding().unwrap().refreshed_at_tick, Some(2));
    }

    #[test]
    fn test_lookup_by_handedness() {
        let mut scene = MemoryScene::new();
        let mut pool = HandSlotPool::new(3);
        pool.try_bind(&hand(1, Handedness::Right), &mut scene, 1);
        pool.try_bind(&hand(2, Handedness::Left), &mut scene, 1);

        assert_eq!(pool.by_handedness(Handedness::Left).unwrap().id(), Some(HandId(2)));
        assert_eq!(pool.slot_for(HandId(1)), Some(0));
        assert_eq!(pool.release_all(&mut scene), 2);
        assert!(pool.by_handedness(Handedness::Right).is_none());
    }
}
