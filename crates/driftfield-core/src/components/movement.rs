//! Movement strategies layered over the shared [`Physics`] integrator.
//!
//! Each strategy only decides what the velocity should be. Integration,
//! friction, and wrapping happen in the components registered after it.

use glam::Vec2;

use crate::context::TickContext;
use crate::entity::Entity;

use super::{Physics, Transform};

// =============================================================================
// Player
// =============================================================================

/// Input-driven thrust and steering for the player craft.
///
/// A steering vector strong enough to count (see
/// [`InputSource::steering`](crate::input::InputSource::steering)) overrides
/// the axes for that tick: the craft snaps to face it and thrusts along it.
/// Otherwise the rotation axis turns the craft and the forward axis thrusts
/// along its heading.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerMovement {
    acceleration: f32,
    max_speed: f32,
    rotation_speed: f32,
    control_enabled: bool,
}

impl PlayerMovement {
    /// Creates an enabled controller.
    ///
    /// # Arguments
    ///
    /// * `acceleration` - Thrust force at full input
    /// * `max_speed` - Speed cap applied after thrust
    /// * `rotation_speed` - Degrees per second at full rotation input
    #[must_use]
    pub const fn new(acceleration: f32, max_speed: f32, rotation_speed: f32) -> Self {
        Self {
            acceleration,
            max_speed,
            rotation_speed,
            control_enabled: true,
        }
    }

    /// Returns true while input is applied.
    #[must_use]
    pub const fn control_enabled(&self) -> bool {
        self.control_enabled
    }

    /// Enables or disables input handling.
    pub fn set_control_enabled(&mut self, enabled: bool) {
        self.control_enabled = enabled;
    }

    /// Speed cap.
    #[must_use]
    pub const fn max_speed(&self) -> f32 {
        self.max_speed
    }

    pub(crate) fn tick(&mut self, entity: &mut Entity, ctx: &mut TickContext<'_>) {
        if !self.control_enabled {
            return;
        }
        let Some(transform) = entity.component_mut::<Transform>() else {
            return;
        };

        let thrust = if let Some(direction) = ctx.input.steering() {
            transform.set_rotation(direction.y.atan2(direction.x).to_degrees(), ctx.bus);
            direction.clamp_length_max(1.0)
        } else {
            let turn = ctx.input.rotation_axis();
            if turn != 0.0 {
                let rotation = transform.rotation() + turn * self.rotation_speed * ctx.dt;
                transform.set_rotation(rotation, ctx.bus);
            }
            transform.forward() * ctx.input.forward_axis()
        };

        let Some(physics) = entity.component_mut::<Physics>() else {
            return;
        };
        if thrust != Vec2::ZERO {
            physics.apply_force(thrust * self.acceleration, ctx.dt, ctx.bus);
        }
        physics.clamp_speed(self.max_speed);
    }
}

// =============================================================================
// Pursuit
// =============================================================================

/// Re-aims at the tick's target every tick.
///
/// Without a target the current velocity is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct PursuitMovement {
    speed: f32,
}

impl PursuitMovement {
    /// Creates a pursuer moving at `speed`.
    #[must_use]
    pub const fn new(speed: f32) -> Self {
        Self { speed }
    }

    /// Chase speed.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    pub(crate) fn tick(&mut self, entity: &mut Entity, ctx: &mut TickContext<'_>) {
        let (Some(target), Some(position)) = (ctx.target, entity.position()) else {
            return;
        };
        let direction = (target - position).normalize_or_zero();
        if let Some(physics) = entity.component_mut::<Physics>() {
            physics.set_velocity(direction * self.speed, ctx.bus);
        }
    }
}

// =============================================================================
// Linear
// =============================================================================

/// Constant heading at constant speed.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearMovement {
    direction: Vec2,
    speed: f32,
}

impl LinearMovement {
    /// Creates a mover heading along `direction`. Zero means standing still.
    #[must_use]
    pub fn new(direction: Vec2, speed: f32) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            speed,
        }
    }

    /// Unit heading, or zero.
    #[must_use]
    pub const fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Travel speed.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Points the mover along `direction`.
    pub fn set_direction(&mut self, direction: Vec2) {
        self.direction = direction.normalize_or_zero();
    }

    pub(crate) fn tick(&mut self, entity: &mut Entity, ctx: &mut TickContext<'_>) {
        let desired = self.direction * self.speed;
        if let Some(physics) = entity.component_mut::<Physics>() {
            if physics.velocity() != desired {
                physics.set_velocity(desired, ctx.bus);
            }
        }
    }
}
