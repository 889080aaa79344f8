//! Fluent entity assembly with collaborator checks.

use crate::components::Component;
use crate::error::AssemblyError;

use super::{Entity, EntityId, EntityTag};

/// Assembles an [`Entity`] component by component.
///
/// Registration order is the order of [`with`](Self::with) calls, and so the
/// order components tick in. [`build`](Self::build) runs
/// [`Entity::initialize`] so a wiring defect surfaces here rather than
/// mid-simulation.
///
/// # Example
///
/// ```
/// use glam::Vec2;
/// use driftfield_core::components::{BoundaryWrap, Physics, Transform};
/// use driftfield_core::entity::{EntityBuilder, EntityId, EntityTag};
///
/// let rock = EntityBuilder::new(EntityId::new(1), EntityTag::Enemy)
///     .with(Transform::new(Vec2::ZERO, 0.0))
///     .with(Physics::kinematic())
///     .with(BoundaryWrap::new())
///     .build()
///     .unwrap();
///
/// assert_eq!(rock.all().count(), 3);
/// ```
#[derive(Debug)]
pub struct EntityBuilder {
    entity: Entity,
}

impl EntityBuilder {
    /// Starts an empty entity.
    #[must_use]
    pub fn new(id: EntityId, tag: EntityTag) -> Self {
        Self {
            entity: Entity::new(id, tag),
        }
    }

    /// Registers a component.
    #[must_use]
    pub fn with(mut self, component: impl Into<Component>) -> Self {
        self.entity.add(component);
        self
    }

    /// Finishes assembly.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::MissingCollaborator`] if any component lacks
    /// a collaborator it depends on.
    pub fn build(self) -> Result<Entity, AssemblyError> {
        self.entity.initialize()?;
        Ok(self.entity)
    }
}
