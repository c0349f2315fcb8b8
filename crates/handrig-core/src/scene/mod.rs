//! Scene-graph collaborator
//!
//! The tracker only ever creates, moves, rotates and destroys opaque
//! entities. Anything that can do those four things can host the hands.

mod memory;

pub use memory::{MemoryEntity, MemoryScene};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::spatial::{Point3D, Quaternion};

/// Opaque handle to a scene object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity:{}", self.0)
    }
}

/// Which template an entity is instantiated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    Palm,
    Joint,
    Segment,
}

/// Errors reported by a scene graph
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("Unknown entity: {0}")]
    UnknownEntity(EntityId),

    #[error("Scene is full ({limit} entities)")]
    CapacityExceeded { limit: usize },

    #[error("Template unavailable: {0:?}")]
    MissingTemplate(Template),
}

pub type Result<T> = std::result::Result<T, SceneError>;

/// Capability set the tracker needs from a scene graph
pub trait SceneGraph {
    /// Create a new entity from `template`, attached under `parent`
    fn instantiate(&mut self, template: Template, parent: Option<EntityId>) -> Result<EntityId>;

    fn destroy(&mut self, entity: EntityId) -> Result<()>;

    fn set_local_position(&mut self, entity: EntityId, position: Point3D) -> Result<()>;

    fn set_rotation(&mut self, entity: EntityId, rotation: Quaternion) -> Result<()>;
}
