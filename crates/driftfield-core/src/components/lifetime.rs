//! Timed self-removal for short-lived entities.

use crate::context::{Command, TickContext};
use crate::entity::Entity;
use crate::timer::DeferredTimer;

/// Counts down and asks the arena to return its entity when time is up.
///
/// The countdown is running from construction; [`reset`](Self::reset)
/// restarts it for a reused entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Lifetime {
    duration: f32,
    timer: DeferredTimer,
}

impl Lifetime {
    /// Creates a lifetime of `duration` seconds.
    #[must_use]
    pub fn new(duration: f32) -> Self {
        let mut timer = DeferredTimer::new();
        timer.start(duration);
        Self { duration, timer }
    }

    /// Seconds left, never negative.
    #[must_use]
    pub fn remaining(&self) -> f32 {
        self.timer.remaining().map_or(0.0, |remaining| remaining.max(0.0))
    }

    /// Returns true once the lifetime has run out.
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        !self.timer.is_pending()
    }

    /// Starts the countdown over.
    pub fn reset(&mut self) {
        self.timer.start(self.duration);
    }

    pub(crate) fn tick(&mut self, entity: &mut Entity, ctx: &mut TickContext<'_>) {
        if self.timer.tick(ctx.dt).is_some() {
            ctx.push(Command::Expire {
                entity: entity.id(),
            });
        }
    }
}
