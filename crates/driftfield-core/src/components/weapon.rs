//! Rate-limited bullet fire while the trigger is held.
//!
//! The weapon does not own bullets. It pushes a fire command and the arena
//! draws one from the projectile pool.

use crate::context::{Command, TickContext};
use crate::entity::Entity;

use super::Transform;

/// Rate-limited gun firing while the trigger is held.
///
/// Bullets live in a pool outside the entity, so firing queues a
/// [`Command::FireBullet`] from the entity's position along its heading.
#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    fire_interval: f32,
    cooldown: f32,
    enabled: bool,
}

impl Weapon {
    /// Creates a ready gun firing `fire_rate` shots per second.
    #[must_use]
    pub fn new(fire_rate: f32) -> Self {
        Self {
            fire_interval: fire_rate.recip(),
            cooldown: 0.0,
            enabled: true,
        }
    }

    /// Seconds between shots.
    #[must_use]
    pub const fn fire_interval(&self) -> f32 {
        self.fire_interval
    }

    /// Returns true if the trigger is honored.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Enables or disables firing.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Makes the next shot available immediately.
    pub fn reset(&mut self) {
        self.cooldown = 0.0;
    }

    pub(crate) fn tick(&mut self, entity: &mut Entity, ctx: &mut TickContext<'_>) {
        self.cooldown = (self.cooldown - ctx.dt).max(0.0);
        if !self.enabled || !ctx.input.fire_held() || self.cooldown > 0.0 {
            return;
        }
        let Some(transform) = entity.component::<Transform>() else {
            return;
        };
        ctx.push(Command::FireBullet {
            source: entity.id(),
            origin: transform.position(),
            direction: transform.forward(),
        });
        self.cooldown = self.fire_interval;
    }
}
