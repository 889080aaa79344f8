//! Velocity integration for anything that moves.

use glam::Vec2;

use crate::bus::{Event, EventBus};
use crate::context::TickContext;
use crate::entity::{Entity, EntityId};

use super::Transform;

/// Rigid-body-lite velocity integrator.
///
/// A body with `mass <= 0` is kinematic: forces and impulses leave its
/// velocity untouched and it only moves by having its velocity set.
///
/// Every velocity mutation publishes exactly one [`Event::PhysicsChanged`]
/// with the resulting velocity and its magnitude. [`clamp_speed`](Self::clamp_speed)
/// is the exception: it never publishes, and callers clamp right after a
/// mutation that already did.
#[derive(Debug, Clone, PartialEq)]
pub struct Physics {
    owner: EntityId,
    velocity: Vec2,
    mass: f32,
    friction: f32,
}

impl Physics {
    /// Creates a body at rest.
    ///
    /// # Arguments
    ///
    /// * `mass` - Positive for dynamic bodies, zero or less for kinematic
    /// * `friction` - Fraction of velocity kept per second, in `(0, 1]`
    #[must_use]
    pub const fn new(mass: f32, friction: f32) -> Self {
        Self {
            owner: EntityId::UNASSIGNED,
            velocity: Vec2::ZERO,
            mass,
            friction,
        }
    }

    /// A frictionless body that ignores forces.
    #[must_use]
    pub const fn kinematic() -> Self {
        Self::new(0.0, 1.0)
    }

    pub(crate) fn bind(&mut self, owner: EntityId) {
        self.owner = owner;
    }

    /// Current velocity.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Magnitude of the current velocity.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Body mass.
    #[must_use]
    pub const fn mass(&self) -> f32 {
        self.mass
    }

    /// Per-second velocity retention.
    #[must_use]
    pub const fn friction(&self) -> f32 {
        self.friction
    }

    /// Returns true if forces and impulses are ignored.
    #[must_use]
    pub fn is_kinematic(&self) -> bool {
        self.mass <= 0.0
    }

    /// Replaces the velocity.
    pub fn set_velocity(&mut self, velocity: Vec2, bus: &EventBus) {
        self.velocity = velocity;
        self.publish(bus);
    }

    /// Adds `delta` to the velocity.
    pub fn add_velocity(&mut self, delta: Vec2, bus: &EventBus) {
        self.velocity += delta;
        self.publish(bus);
    }

    /// Accelerates by `force / mass` for `dt` seconds.
    pub fn apply_force(&mut self, force: Vec2, dt: f32, bus: &EventBus) {
        if !self.is_kinematic() {
            self.velocity += force / self.mass * dt;
        }
        self.publish(bus);
    }

    /// Changes velocity instantly by `impulse / mass`.
    pub fn apply_impulse(&mut self, impulse: Vec2, bus: &EventBus) {
        if !self.is_kinematic() {
            self.velocity += impulse / self.mass;
        }
        self.publish(bus);
    }

    /// Decays velocity by `coefficient` per second for `dt` seconds.
    pub fn apply_friction(&mut self, coefficient: f32, dt: f32, bus: &EventBus) {
        self.velocity *= coefficient.powf(dt);
        self.publish(bus);
    }

    /// Rescales the velocity down to `max` if it is faster. Does not publish.
    pub fn clamp_speed(&mut self, max: f32) {
        let speed = self.velocity.length();
        if speed > max && speed > 0.0 {
            self.velocity *= max.max(0.0) / speed;
        }
    }

    /// Applies friction, moves the transform by `velocity * dt`, then
    /// publishes the velocity.
    pub(crate) fn tick(&mut self, entity: &mut Entity, ctx: &mut TickContext<'_>) {
        if self.friction < 1.0 {
            self.velocity *= self.friction.powf(ctx.dt);
        }
        if let Some(transform) = entity.component_mut::<Transform>() {
            transform.move_by(self.velocity * ctx.dt, ctx.bus);
        }
        self.publish(ctx.bus);
    }

    fn publish(&self, bus: &EventBus) {
        bus.publish(Event::PhysicsChanged {
            entity: self.owner,
            velocity: self.velocity,
            speed: self.velocity.length(),
        });
    }
}
