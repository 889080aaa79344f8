//! Cancellable countdowns for effects that end after a fixed duration.
//!
//! A [`DeferredTimer`] is ticked by its owner every frame. Starting a timer
//! replaces any pending one, and every start bumps a generation so a token
//! handed out earlier can be recognized as superseded: owners keep the token
//! of the start they care about and compare it against what `tick` yields.

use serde::{Deserialize, Serialize};

/// Identifies one particular start of a [`DeferredTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerToken(u64);

/// A single pending completion, counted down explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeferredTimer {
    remaining: Option<f32>,
    generation: u64,
}

impl DeferredTimer {
    /// Creates an idle timer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            remaining: None,
            generation: 0,
        }
    }

    /// Starts a countdown of `duration` seconds, replacing any pending one.
    pub fn start(&mut self, duration: f32) -> TimerToken {
        self.generation += 1;
        self.remaining = Some(duration.max(0.0));
        TimerToken(self.generation)
    }

    /// Cancels the pending countdown. Returns `false` if nothing was pending.
    ///
    /// A cancelled countdown never fires.
    pub fn cancel(&mut self) -> bool {
        self.remaining.take().is_some()
    }

    /// Advances the countdown by `dt`.
    ///
    /// Returns the token of the start that completed on this tick. A given
    /// start completes at most once.
    pub fn tick(&mut self, dt: f32) -> Option<TimerToken> {
        let remaining = self.remaining.as_mut()?;
        *remaining -= dt;
        if *remaining <= 0.0 {
            self.remaining = None;
            Some(TimerToken(self.generation))
        } else {
            None
        }
    }

    /// Returns true while a countdown is running.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.remaining.is_some()
    }

    /// Seconds left on the running countdown.
    #[must_use]
    pub const fn remaining(&self) -> Option<f32> {
        self.remaining
    }
}
