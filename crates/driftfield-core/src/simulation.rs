//! Simulation module: the frame-driven driver the host calls once per frame.
//!
//! The `Simulation` owns the event bus, the game state machine, and the arena,
//! and runs one deterministic tick per [`Simulation::step`]:
//!
//! 1. **ARENA**: While playing, every entity ticks and queued commands apply
//! 2. **CONDITIONS**: Game-over conditions raised during the tick reach the
//!    state machine
//! 3. **ADVANCE**: The tick counter increments
//!
//! # Determinism
//!
//! Given the same configuration, seed, inputs, and collision reports, the
//! simulation publishes the same events in the same order:
//! - Spawner draws come from a `ChaCha8Rng` seeded from the master seed
//! - Enemies and bullets are iterated in id order (via `BTreeMap`)
//! - Entity ids are allocated monotonically
//!
//! # Example
//!
//! ```
//! use driftfield_core::config::ArenaConfig;
//! use driftfield_core::input::InputState;
//! use driftfield_core::simulation::Simulation;
//! use driftfield_core::GameState;
//! # fn config() -> ArenaConfig {
//! #     serde_json::from_str(include_str!("../tests/arena.json")).unwrap()
//! # }
//!
//! let mut sim = Simulation::new(config(), 42).unwrap();
//! sim.start_game();
//!
//! for _ in 0..10 {
//!     sim.step(1.0 / 60.0, &InputState::IDLE);
//! }
//!
//! assert_eq!(sim.tick(), 10);
//! assert_eq!(sim.state(), GameState::Playing);
//! ```

use std::fmt;

use glam::Vec2;
use tracing::{info, trace};

use crate::arena::{Arena, Collision};
use crate::bus::{EventBus, EventKind, Mailbox};
use crate::config::ArenaConfig;
use crate::entity::EntityId;
use crate::error::ArenaError;
use crate::game::{GameState, GameStateMachine};
use crate::input::InputSource;
use crate::spawner::EnemyKind;

// =============================================================================
// Simulation
// =============================================================================

/// The top-level orchestrator.
///
/// `Simulation` manages:
/// - The [`EventBus`] every component publishes on
/// - The [`GameStateMachine`] gating whether the arena ticks
/// - The [`Arena`] holding every entity
/// - A [`Mailbox`] routing `PlayerDied` to the state machine after each tick
pub struct Simulation {
    bus: EventBus,
    machine: GameStateMachine,
    arena: Arena,
    conditions: Mailbox,
    tick: u64,
    master_seed: u64,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("state", &self.machine.state())
            .field("arena", &self.arena)
            .field("bus", &self.bus)
            .field("tick", &self.tick)
            .field("master_seed", &self.master_seed)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Validates `config` and assembles every entity.
    ///
    /// The simulation starts in [`GameState::WaitingToStart`] at tick 0.
    ///
    /// # Arguments
    ///
    /// * `config` - Arena tuning
    /// * `seed` - Master seed for the spawner's random draws
    ///
    /// # Errors
    ///
    /// [`ArenaError::Config`] for out-of-range settings,
    /// [`ArenaError::Assembly`] for miswired roles.
    pub fn new(config: ArenaConfig, seed: u64) -> Result<Self, ArenaError> {
        config.validate()?;
        let bus = EventBus::new();
        let conditions = Mailbox::attach(&bus, &[EventKind::PlayerDied]);
        let arena = Arena::new(&config, seed)?;
        info!(seed, width = config.arena.width, height = config.arena.height, "simulation created");
        Ok(Self {
            bus,
            machine: GameStateMachine::new(),
            arena,
            conditions,
            tick: 0,
            master_seed: seed,
        })
    }

    /// Starts a game. Does nothing while one is running.
    pub fn start_game(&mut self) -> bool {
        self.conditions.take();
        self.machine.start_game(&mut self.arena, &self.bus)
    }

    /// Runs one tick of `dt` seconds with the given input.
    ///
    /// Entities only move while [`GameState::Playing`].
    pub fn step(&mut self, dt: f32, input: &dyn InputSource) {
        if self.machine.is_playing() {
            self.arena.tick(dt, &self.bus, input);
        }
        self.dispatch_conditions();
        self.tick += 1;
        trace!(tick = self.tick, "step");
    }

    /// Applies the consequences of a contact the host detected.
    ///
    /// Reports are ignored unless a game is running. A lethal contact ends the
    /// game before this returns.
    pub fn resolve_collision(&mut self, collision: Collision) -> bool {
        if !self.machine.is_playing() {
            return false;
        }
        let applied = self.arena.resolve_collision(collision, &self.bus);
        self.dispatch_conditions();
        applied
    }

    /// Places an enemy directly, bypassing the spawn timer.
    ///
    /// Publishes [`crate::Event::EnemySpawned`] on the simulation's bus.
    /// Returns `None` if the kind's pool has been cleared.
    pub fn spawn_enemy(
        &mut self,
        kind: EnemyKind,
        position: Vec2,
        direction: Vec2,
    ) -> Option<EntityId> {
        self.arena
            .spawner_mut()
            .spawn(kind, position, direction, &self.bus)
    }

    fn dispatch_conditions(&mut self) {
        for event in self.conditions.take() {
            self.machine.handle_event(&event, &mut self.arena, &self.bus);
        }
    }

    /// The event bus. Subscribe here for presentation, scoring, and UI.
    #[must_use]
    pub const fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Current game state.
    #[must_use]
    pub const fn state(&self) -> GameState {
        self.machine.state()
    }

    /// Read-only view of every entity.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Mutable access to the arena, for scripted setups and tests.
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Number of completed steps.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// The master seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.master_seed
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Event;
    use crate::config::fixture;
    use crate::error::ConfigError;
    use crate::input::InputState;

    #[test]
    fn new_rejects_invalid_config() {
        let mut config = fixture();
        config.arena.width = -1.0;
        assert!(matches!(
            Simulation::new(config, 1),
            Err(ArenaError::Config(ConfigError::OutOfRange {
                field: "arena.width",
                ..
            }))
        ));
    }

    #[test]
    fn starts_waiting_at_tick_zero() {
        let sim = Simulation::new(fixture(), 12345).unwrap();
        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.seed(), 12345);
        assert_eq!(sim.state(), GameState::WaitingToStart);
    }

    #[test]
    fn nothing_moves_before_start() {
        let mut sim = Simulation::new(fixture(), 1).unwrap();
        let thrust = InputState {
            forward: 1.0,
            ..InputState::IDLE
        };
        for _ in 0..120 {
            sim.step(1.0 / 60.0, &thrust);
        }
        assert_eq!(sim.arena().player().position(), Some(Vec2::ZERO));
        assert_eq!(sim.arena().spawner().active_count(), 0);
        assert_eq!(sim.tick(), 120);
    }

    #[test]
    fn collisions_ignored_unless_playing() {
        let mut sim = Simulation::new(fixture(), 1).unwrap();
        let enemy = sim
            .spawn_enemy(EnemyKind::Pursuer, Vec2::ONE, Vec2::ZERO)
            .unwrap();
        assert!(!sim.resolve_collision(Collision::PlayerHitEnemy { enemy }));
    }

    #[test]
    fn lethal_contact_ends_game_immediately() {
        let mut config = fixture();
        config.health.max_health = 1;
        let mut sim = Simulation::new(config, 1).unwrap();
        sim.start_game();
        let mailbox = Mailbox::attach(sim.bus(), &[EventKind::GameStateChanged]);
        let enemy = sim
            .spawn_enemy(EnemyKind::Pursuer, Vec2::new(5.0, 0.0), Vec2::ZERO)
            .unwrap();

        assert!(sim.resolve_collision(Collision::PlayerHitEnemy { enemy }));

        assert_eq!(sim.state(), GameState::GameOver);
        assert_eq!(
            mailbox.take(),
            vec![Event::GameStateChanged {
                from: GameState::Playing,
                to: GameState::GameOver,
            }]
        );
    }
}
