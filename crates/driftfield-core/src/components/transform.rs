//! Position and heading.

use glam::Vec2;

use crate::bus::{Event, EventBus};
use crate::entity::EntityId;

/// Position and heading of an entity.
///
/// Fields are private: every mutation goes through a setter that publishes
/// [`Event::TransformChanged`] with the new absolute state.
///
/// Rotation is in degrees and unbounded. A rotation of zero faces +X and
/// positive angles turn counter-clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    owner: EntityId,
    position: Vec2,
    rotation: f32,
}

impl Transform {
    /// Creates a transform at `position` facing `rotation` degrees.
    #[must_use]
    pub const fn new(position: Vec2, rotation: f32) -> Self {
        Self {
            owner: EntityId::UNASSIGNED,
            position,
            rotation,
        }
    }

    pub(crate) fn bind(&mut self, owner: EntityId) {
        self.owner = owner;
    }

    /// Entity this transform belongs to.
    #[must_use]
    pub const fn owner(&self) -> EntityId {
        self.owner
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Current rotation in degrees.
    #[must_use]
    pub const fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Unit vector the entity faces.
    #[must_use]
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.rotation.to_radians())
    }

    /// Moves to `position`.
    pub fn set_position(&mut self, position: Vec2, bus: &EventBus) {
        self.position = position;
        self.publish(bus);
    }

    /// Turns to `rotation` degrees.
    pub fn set_rotation(&mut self, rotation: f32, bus: &EventBus) {
        self.rotation = rotation;
        self.publish(bus);
    }

    /// Moves by `delta`.
    pub fn move_by(&mut self, delta: Vec2, bus: &EventBus) {
        self.position += delta;
        self.publish(bus);
    }

    fn publish(&self, bus: &EventBus) {
        bus.publish(Event::TransformChanged {
            entity: self.owner,
            position: self.position,
            rotation: self.rotation,
        });
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 0.0)
    }
}
