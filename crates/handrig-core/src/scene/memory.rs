//! In-memory scene graph
//!
//! Keeps every live entity in a map and never reuses an id, which makes it
//! the reference host for tests and for the command-line runner.

use std::collections::BTreeMap;

use super::{EntityId, Result, SceneError, SceneGraph, Template};
use crate::spatial::{Point3D, Quaternion, Transform};

/// A live entity in a [`MemoryScene`]
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryEntity {
    pub template: Template,
    pub parent: Option<EntityId>,
    pub transform: Transform,
}

#[derive(Debug, Default)]
pub struct MemoryScene {
    entities: BTreeMap<EntityId, MemoryEntity>,
    next_id: u64,
    created: usize,
    destroyed: usize,
    limit: Option<usize>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse to hold more than `limit` live entities at once
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn get(&self, entity: EntityId) -> Option<&MemoryEntity> {
        self.entities.get(&entity)
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Total entities ever created
    pub fn created(&self) -> usize {
        self.created
    }

    /// Total entities ever destroyed
    pub fn destroyed(&self) -> usize {
        self.destroyed
    }

    /// Live entities instantiated from `template`
    pub fn count(&self, template: Template) -> usize {
        self.entities
            .values()
            .filter(|e| e.template == template)
            .count()
    }

    fn entity_mut(&mut self, entity: EntityId) -> Result<&mut MemoryEntity> {
        self.entities
            .get_mut(&entity)
            .ok_or(SceneError::UnknownEntity(entity))
    }
}

impl SceneGraph for MemoryScene {
    fn instantiate(&mut self, template: Template, parent: Option<EntityId>) -> Result<EntityId> {
        if let Some(limit) = self.limit {
            if self.entities.len() >= limit {
                return Err(SceneError::CapacityExceeded { limit });
            }
        }
        if let Some(parent) = parent {
            if !self.contains(parent) {
                return Err(SceneError::UnknownEntity(parent));
            }
        }

        self.next_id += 1;
        let id = EntityId(self.next_id);
        self.entities.insert(
            id,
            MemoryEntity {
                template,
                parent,
                transform: Transform::identity(),
            },
        );
        self.created += 1;
        Ok(id)
    }

    fn destroy(&mut self, entity: EntityId) -> Result<()> {
        self.entities
            .remove(&entity)
            .ok_or(SceneError::UnknownEntity(entity))?;
        self.destroyed += 1;
        Ok(())
    }

    fn set_local_position(&mut self, entity: EntityId, position: Point3D) -> Result<()> {
        self.entity_mut(entity)?.transform.position = position;
        Ok(())
    }

    fn set_rotation(&mut self, entity: EntityId, rotation: Quaternion) -> Result<()> {
        self.entity_mut(entity)?.transform.rotation = rotation;
        Ok(())
    }
}
