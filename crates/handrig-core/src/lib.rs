//! handrig-core: drive a rigged 3D hand model from a hand-tracking sensor
//!
//! Each tick the tracker takes one sensor frame and:
//! - binds newly seen hands to a fixed-capacity pool of slots
//! - creates one palm, twenty joint and fifteen segment entities per hand
//! - maps sensor positions into the scene and orients every bone
//! - destroys the entities of hands that left the frame

pub mod normalize;
pub mod pool;
pub mod reconcile;
pub mod resolver;
pub mod scene;
pub mod sensor;
pub mod snapshot;
pub mod spatial;
pub mod tracker;

// Re-export commonly used types
pub use normalize::{Normalizer, PointKind, SceneRemap};
pub use pool::{HandSlot, HandSlotPool, ENTITIES_PER_HAND};
pub use reconcile::{reconcile, ReconcileReport};
pub use scene::{EntityId, MemoryScene, SceneError, SceneGraph, Template};
pub use sensor::{
    FingerKind, HandId, Handedness, ReplaySource, ScriptedSource, SensorError, SensorFinger,
    SensorFrame, SensorHand, SensorSource, SimulatedSource, SimulationSettings,
};
pub use snapshot::{HandView, HandsSnapshot};
pub use spatial::{InteractionBox, Point3D, Quaternion, Transform, Vector3D};
pub use tracker::{HandTracker, TrackerConfig, TrackerStats};
