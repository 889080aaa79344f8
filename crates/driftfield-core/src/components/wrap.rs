//! Toroidal wrapping at the field edges.
//!
//! Entities spawned outside the field only start wrapping once they have been
//! inside it; until then they cross the edge freely.

use glam::Vec2;

use crate::context::TickContext;
use crate::entity::Entity;
use crate::Bounds;

use super::Transform;

/// Toroidal edge correction.
///
/// Wrapping stays disarmed until the entity has been seen inside the play
/// field once, so enemies spawned just outside an edge can drift in without
/// being thrown back to the edge they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundaryWrap {
    seen_inside: bool,
}

impl BoundaryWrap {
    /// Creates a disarmed wrap.
    #[must_use]
    pub const fn new() -> Self {
        Self { seen_inside: false }
    }

    /// Returns true once the entity has been observed inside the bounds.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.seen_inside
    }

    /// Disarms wrapping until the entity re-enters the bounds.
    pub fn reset(&mut self) {
        self.seen_inside = false;
    }

    pub(crate) fn tick(&mut self, entity: &mut Entity, ctx: &mut TickContext<'_>) {
        let Some(transform) = entity.component_mut::<Transform>() else {
            return;
        };
        let position = transform.position();
        if !self.seen_inside {
            self.seen_inside = ctx.bounds.contains(position);
            return;
        }
        if let Some(wrapped) = wrap_position(position, ctx.bounds) {
            transform.set_position(wrapped, ctx.bus);
        }
    }
}

/// Maps a point beyond an edge onto the opposite edge, each axis on its own.
///
/// Returns `None` when `position` is inside `bounds`.
#[must_use]
pub fn wrap_position(position: Vec2, bounds: Bounds) -> Option<Vec2> {
    let mut wrapped = position;
    if position.x > bounds.max.x {
        wrapped.x = bounds.min.x;
    } else if position.x < bounds.min.x {
        wrapped.x = bounds.max.x;
    }
    if position.y > bounds.max.y {
        wrapped.y = bounds.min.y;
    } else if position.y < bounds.min.y {
        wrapped.y = bounds.max.y;
    }
    (wrapped != position).then_some(wrapped)
}
