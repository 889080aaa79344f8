//! The charge-based beam weapon.
//!
//! A press spends one charge and opens a beam for a fixed duration; the beam
//! follows the ship until its timer completes or the laser is reset. Charges
//! regenerate one at a time on their own clock, independent of firing.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::bus::{Event, EventBus};
use crate::context::TickContext;
use crate::entity::{Entity, EntityId};
use crate::timer::{DeferredTimer, TimerToken};

use super::Transform;

/// The segment a live beam covers, for the host's collision query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaserBeam {
    /// Start of the beam
    pub origin: Vec2,
    /// Unit direction
    pub direction: Vec2,
    /// Length
    pub range: f32,
    /// Thickness
    pub width: f32,
}

impl LaserBeam {
    /// Far end of the beam.
    #[must_use]
    pub fn end(&self) -> Vec2 {
        self.origin + self.direction * self.range
    }
}

/// Charge-based beam weapon fired on the edge-triggered signal.
///
/// Each shot spends one charge; spent charges come back one at a time every
/// `recharge_time` seconds. Only one beam is live at a time and it tracks the
/// owner's position and heading until its duration runs out.
#[derive(Debug, Clone, PartialEq)]
pub struct Laser {
    owner: EntityId,
    charges: u32,
    max_charges: u32,
    recharge_time: f32,
    recharge_elapsed: f32,
    duration: f32,
    width: f32,
    range: f32,
    beam_timer: DeferredTimer,
    beam_token: Option<TimerToken>,
    beam: Option<LaserBeam>,
    enabled: bool,
}

impl Laser {
    /// Creates a fully charged laser.
    #[must_use]
    pub const fn new(
        max_charges: u32,
        recharge_time: f32,
        duration: f32,
        width: f32,
        range: f32,
    ) -> Self {
        Self {
            owner: EntityId::UNASSIGNED,
            charges: max_charges,
            max_charges,
            recharge_time,
            recharge_elapsed: 0.0,
            duration,
            width,
            range,
            beam_timer: DeferredTimer::new(),
            beam_token: None,
            beam: None,
            enabled: true,
        }
    }

    pub(crate) fn bind(&mut self, owner: EntityId) {
        self.owner = owner;
    }

    /// Charges available.
    #[must_use]
    pub const fn charges(&self) -> u32 {
        self.charges
    }

    /// Charge capacity.
    #[must_use]
    pub const fn max_charges(&self) -> u32 {
        self.max_charges
    }

    /// The live beam, if any.
    #[must_use]
    pub const fn beam(&self) -> Option<LaserBeam> {
        self.beam
    }

    /// Returns true while a beam is live.
    #[must_use]
    pub const fn is_firing(&self) -> bool {
        self.beam.is_some()
    }

    /// Enables or disables firing. Recharging continues either way.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Refills every charge and ends any live beam.
    pub fn reset(&mut self, bus: &EventBus) {
        self.end_beam(bus);
        self.charges = self.max_charges;
        self.recharge_elapsed = 0.0;
        self.publish_charges(bus);
    }

    fn end_beam(&mut self, bus: &EventBus) {
        self.beam_token = None;
        self.beam_timer.cancel();
        if self.beam.take().is_some() {
            bus.publish(Event::LaserEnded { entity: self.owner });
        }
    }

    fn publish_charges(&self, bus: &EventBus) {
        bus.publish(Event::ChargesChanged {
            entity: self.owner,
            charges: self.charges,
            max_charges: self.max_charges,
        });
    }

    fn recharge(&mut self, dt: f32, bus: &EventBus) {
        if self.charges >= self.max_charges {
            self.recharge_elapsed = 0.0;
            return;
        }
        self.recharge_elapsed += dt;
        let mut regained = false;
        while self.recharge_elapsed >= self.recharge_time && self.charges < self.max_charges {
            self.recharge_elapsed -= self.recharge_time;
            self.charges += 1;
            regained = true;
        }
        if regained {
            self.publish_charges(bus);
        }
    }

    pub(crate) fn tick(&mut self, entity: &mut Entity, ctx: &mut TickContext<'_>) {
        self.recharge(ctx.dt, ctx.bus);

        let done = self.beam_timer.tick(ctx.dt);
        if done.is_some() && done == self.beam_token {
            self.end_beam(ctx.bus);
        }

        let Some(transform) = entity.component::<Transform>() else {
            return;
        };
        let origin = transform.position();
        let direction = transform.forward();

        if let Some(beam) = self.beam.as_mut() {
            beam.origin = origin;
            beam.direction = direction;
            return;
        }

        if !self.enabled || !ctx.input.fire_pressed() || self.charges == 0 {
            return;
        }
        self.charges -= 1;
        self.beam_token = Some(self.beam_timer.start(self.duration));
        self.beam = Some(LaserBeam {
            origin,
            direction,
            range: self.range,
            width: self.width,
        });
        ctx.bus.publish(Event::LaserFired {
            entity: self.owner,
            origin,
            direction,
            range: self.range,
            width: self.width,
        });
        self.publish_charges(ctx.bus);
    }
}
