//! Hit points and the immunity window that follows a hit.

use crate::bus::{Event, EventBus};
use crate::context::TickContext;
use crate::entity::EntityId;
use crate::timer::{DeferredTimer, TimerToken};

/// Result of [`Health::take_damage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Immune, dead already, or zero damage
    Ignored,
    /// Health dropped and an immunity window opened
    Damaged,
    /// Health reached zero
    Died,
}

/// Hit points with a post-hit immunity window.
///
/// The window is a [`DeferredTimer`]: a new hit cannot land while it runs,
/// and [`reset`](Self::reset) cancels it outright. Only the completion of
/// the window's own start closes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Health {
    owner: EntityId,
    current: u32,
    max: u32,
    invincibility_duration: f32,
    bounce_force: f32,
    invincibility: DeferredTimer,
    window: Option<TimerToken>,
}

impl Health {
    /// Creates full health.
    ///
    /// # Arguments
    ///
    /// * `max` - Starting and maximum health
    /// * `invincibility_duration` - Seconds of immunity after a hit
    /// * `bounce_force` - Impulse applied away from whatever dealt the hit
    #[must_use]
    pub const fn new(max: u32, invincibility_duration: f32, bounce_force: f32) -> Self {
        Self {
            owner: EntityId::UNASSIGNED,
            current: max,
            max,
            invincibility_duration,
            bounce_force,
            invincibility: DeferredTimer::new(),
            window: None,
        }
    }

    pub(crate) fn bind(&mut self, owner: EntityId) {
        self.owner = owner;
    }

    /// Remaining health.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Maximum health.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Knock-back impulse magnitude.
    #[must_use]
    pub const fn bounce_force(&self) -> f32 {
        self.bounce_force
    }

    /// Returns true while hits are ignored.
    #[must_use]
    pub const fn is_invincible(&self) -> bool {
        self.invincibility.is_pending()
    }

    /// Returns true once health has reached zero.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Applies `amount` damage.
    ///
    /// Publishes [`Event::HealthChanged`] for every landed hit, followed by
    /// [`Event::PlayerDied`] when health reaches zero or by
    /// [`Event::InvincibilityChanged`] when the immunity window opens.
    pub fn take_damage(&mut self, amount: u32, bus: &EventBus) -> DamageOutcome {
        if amount == 0 || self.is_dead() || self.is_invincible() {
            return DamageOutcome::Ignored;
        }
        self.current = self.current.saturating_sub(amount);
        bus.publish(Event::HealthChanged {
            entity: self.owner,
            health: self.current,
            max_health: self.max,
        });

        if self.is_dead() {
            bus.publish(Event::PlayerDied { entity: self.owner });
            return DamageOutcome::Died;
        }

        self.window = Some(self.invincibility.start(self.invincibility_duration));
        bus.publish(Event::InvincibilityChanged {
            entity: self.owner,
            active: true,
        });
        DamageOutcome::Damaged
    }

    /// Restores full health and drops any immunity window.
    pub fn reset(&mut self, bus: &EventBus) {
        self.window = None;
        if self.invincibility.cancel() {
            bus.publish(Event::InvincibilityChanged {
                entity: self.owner,
                active: false,
            });
        }
        self.current = self.max;
        bus.publish(Event::HealthChanged {
            entity: self.owner,
            health: self.current,
            max_health: self.max,
        });
    }

    pub(crate) fn tick(&mut self, ctx: &mut TickContext<'_>) {
        let done = self.invincibility.tick(ctx.dt);
        if done.is_some() && done == self.window {
            self.window = None;
            ctx.bus.publish(Event::InvincibilityChanged {
                entity: self.owner,
                active: false,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{EventKind, Mailbox};
    use crate::input::InputState;
    use crate::Bounds;

    fn health() -> Health {
        let mut health = Health::new(3, 1.0, 50.0);
        health.bind(EntityId::new(1));
        health
    }

    fn tick(health: &mut Health, bus: &EventBus, dt: f32) {
        let mut commands = Vec::new();
        let mut ctx = TickContext {
            dt,
            bus,
            bounds: Bounds::new(10.0, 10.0),
            input: &InputState::IDLE,
            target: None,
            commands: &mut commands,
        };
        health.tick(&mut ctx);
    }

    #[test]
    fn hit_opens_immunity_window() {
        let bus = EventBus::new();
        let mailbox = Mailbox::attach(
            &bus,
            &[EventKind::HealthChanged, EventKind::InvincibilityChanged],
        );
        let mut health = health();

        assert_eq!(health.take_damage(1, &bus), DamageOutcome::Damaged);
        assert_eq!(health.current(), 2);
        assert!(health.is_invincible());
        assert_eq!(
            mailbox.take(),
            vec![
                Event::HealthChanged {
                    entity: EntityId::new(1),
                    health: 2,
                    max_health: 3,
                },
                Event::InvincibilityChanged {
                    entity: EntityId::new(1),
                    active: true,
                },
            ]
        );
    }

    #[test]
    fn hits_during_window_are_ignored() {
        let bus = EventBus::new();
        let mut health = health();
        health.take_damage(1, &bus);

        assert_eq!(health.take_damage(1, &bus), DamageOutcome::Ignored);
        assert_eq!(health.current(), 2);
    }

    #[test]
    fn window_closes_after_duration() {
        let bus = EventBus::new();
        let mut health = health();
        health.take_damage(1, &bus);
        let mailbox = Mailbox::attach(&bus, &[EventKind::InvincibilityChanged]);

        tick(&mut health, &bus, 0.6);
        assert!(health.is_invincible());
        tick(&mut health, &bus, 0.6);

        assert!(!health.is_invincible());
        assert_eq!(mailbox.len(), 1);
        assert_eq!(health.take_damage(1, &bus), DamageOutcome::Damaged);
    }

    #[test]
    fn lethal_hit_publishes_death() {
        let bus = EventBus::new();
        let mailbox = Mailbox::attach(&bus, &[EventKind::PlayerDied]);
        let mut health = health();

        assert_eq!(health.take_damage(5, &bus), DamageOutcome::Died);
        assert_eq!(health.current(), 0);
        assert!(!health.is_invincible());
        assert_eq!(mailbox.len(), 1);
        assert_eq!(health.take_damage(1, &bus), DamageOutcome::Ignored);
    }

    #[test]
    fn reset_restores_and_cancels_window() {
        let bus = EventBus::new();
        let mut health = health();
        health.take_damage(1, &bus);

        health.reset(&bus);

        assert_eq!(health.current(), 3);
        assert!(!health.is_invincible());
        let mailbox = Mailbox::attach(&bus, &[EventKind::InvincibilityChanged]);
        tick(&mut health, &bus, 5.0);
        assert!(mailbox.is_empty());
    }

    #[test]
    fn window_reopened_after_reset_runs_its_full_length() {
        let bus = EventBus::new();
        let mut health = health();
        health.take_damage(1, &bus);
        tick(&mut health, &bus, 0.8);
        health.reset(&bus);
        health.take_damage(1, &bus);
        let mailbox = Mailbox::attach(&bus, &[EventKind::InvincibilityChanged]);

        tick(&mut health, &bus, 0.8);
        assert!(health.is_invincible());
        assert!(mailbox.is_empty());

        tick(&mut health, &bus, 0.3);
        assert!(!health.is_invincible());
        assert_eq!(
            mailbox.take(),
            vec![Event::InvincibilityChanged {
                entity: EntityId::new(1),
                active: false,
            }]
        );
        tick(&mut health, &bus, 5.0);
        assert!(mailbox.is_empty());
    }
}
