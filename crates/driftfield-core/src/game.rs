//! Game state machine gating when the arena runs.
//!
//! ```text
//! WaitingToStart ──start_game──▶ Playing ──PlayerDied──▶ GameOver
//!                                  ▲                        │
//!                                  └──────start_game────────┘
//! ```
//!
//! The machine never polls. It moves only on [`GameStateMachine::start_game`]
//! and on a game-over condition, and reaches the arena through the
//! [`GameCollaborators`] trait.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bus::{Event, EventBus};

/// Top-level game phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// Before the first game
    #[default]
    WaitingToStart,
    /// The arena is live
    Playing,
    /// The player died; the field is frozen
    GameOver,
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WaitingToStart => write!(f, "WaitingToStart"),
            Self::Playing => write!(f, "Playing"),
            Self::GameOver => write!(f, "GameOver"),
        }
    }
}

/// What the state machine drives on each transition.
pub trait GameCollaborators {
    /// Returns every active enemy to its pool.
    fn clear_enemies(&mut self, bus: &EventBus);

    /// Turns timed spawning on or off.
    fn set_spawning(&mut self, enabled: bool);

    /// Restores the player's position, rotation, velocity, health, and
    /// control.
    fn reset_player(&mut self, bus: &EventBus);

    /// Enables or disables player input.
    fn set_player_control(&mut self, enabled: bool);

    /// Zeroes every active enemy's velocity.
    fn freeze_enemies(&mut self, bus: &EventBus);
}

/// Owner of the single [`GameState`] value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameStateMachine {
    state: GameState,
}

impl GameStateMachine {
    /// Creates a machine in [`GameState::WaitingToStart`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: GameState::WaitingToStart,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> GameState {
        self.state
    }

    /// Returns true while the arena is live.
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        matches!(self.state, GameState::Playing)
    }

    fn transition(&mut self, to: GameState, bus: &EventBus) {
        let from = self.state;
        self.state = to;
        info!(%from, %to, "game state changed");
        bus.publish(Event::GameStateChanged { from, to });
    }

    /// Starts a fresh game. Does nothing while already playing.
    ///
    /// Returns true if a game was started.
    pub fn start_game(&mut self, arena: &mut dyn GameCollaborators, bus: &EventBus) -> bool {
        if self.is_playing() {
            return false;
        }
        arena.clear_enemies(bus);
        arena.set_spawning(true);
        arena.reset_player(bus);
        self.transition(GameState::Playing, bus);
        bus.publish(Event::GameStarted);
        true
    }

    /// Ends the running game. Does nothing unless playing.
    ///
    /// Returns true if the game ended.
    pub fn game_over(&mut self, arena: &mut dyn GameCollaborators, bus: &EventBus) -> bool {
        if !self.is_playing() {
            return false;
        }
        arena.set_player_control(false);
        arena.freeze_enemies(bus);
        arena.set_spawning(false);
        self.transition(GameState::GameOver, bus);
        true
    }

    /// Reacts to a bus event. Only [`Event::PlayerDied`] has an effect.
    pub fn handle_event(
        &mut self,
        event: &Event,
        arena: &mut dyn GameCollaborators,
        bus: &EventBus,
    ) {
        if let Event::PlayerDied { .. } = event {
            self.game_over(arena, bus);
        }
    }
}
