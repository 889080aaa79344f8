//! # Driftfield Core
//!
//! Simulation kernel for Driftfield, a wrap-around 2D arcade arena.
//!
//! This crate provides the deterministic simulation kernel: a player craft,
//! pooled hostiles that fragment when destroyed, pooled projectiles, and a
//! toroidal play field. Rendering, UI, and input devices live outside the
//! kernel and talk to it through the [`bus::EventBus`] and the
//! [`input::InputSource`] contract.
//!
//! ## Architecture
//!
//! - **Entities**: component registries keyed by [`entity::ComponentKind`]
//! - **Components**: transform, physics, wrap, movement, health, weapons
//! - **Bus**: synchronous publish/subscribe for presentation and scoring
//! - **Pools**: reusable entity instances for hostiles and projectiles
//! - **Spawner**: weighted edge spawning with asteroid fragmentation
//! - **Game**: the state machine gating when the arena ticks
//!
//! ## Usage
//!
//! ```rust,ignore
//! use driftfield_core::{config::ArenaConfig, input::InputState, simulation::Simulation};
//!
//! let config: ArenaConfig = load_settings()?;
//! let mut sim = Simulation::new(config, 42)?;
//! sim.start_game();
//! sim.step(1.0 / 60.0, &InputState::IDLE);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod arena;
pub mod bus;
pub mod components;
pub mod config;
pub mod context;
pub mod entity;
pub mod error;
pub mod game;
pub mod input;
pub mod pool;
pub mod projectile;
pub mod simulation;
pub mod spawner;
pub mod timer;

#[cfg(test)]
mod tests;

use glam::Vec2;
use serde::{Deserialize, Serialize};

// Re-exports for convenience
pub use arena::{Arena, Collision};
pub use bus::{Event, EventBus, EventKind, Mailbox, SubscriptionId};
pub use config::ArenaConfig;
pub use entity::{Entity, EntityId, EntityTag};
pub use error::{ArenaError, AssemblyError, ConfigError};
pub use game::{GameState, GameStateMachine};
pub use simulation::Simulation;

/// Axis-aligned playable rectangle.
///
/// Edges are inclusive: a point lying exactly on an edge is inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner (left, bottom)
    pub min: Vec2,
    /// Maximum corner (right, top)
    pub max: Vec2,
}

impl Bounds {
    /// Create bounds from dimensions (centered at origin).
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(-width / 2.0, -height / 2.0),
            max: Vec2::new(width / 2.0, height / 2.0),
        }
    }

    /// Create bounds from min/max corners.
    #[must_use]
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Get the center of the bounds.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Get the size of the bounds.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Check if a point is inside the bounds.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Grow the bounds by `margin` on every side.
    #[must_use]
    pub fn widened(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(margin),
            max: self.max + Vec2::splat(margin),
        }
    }
}

#[cfg(test)]
mod bounds_tests {
    use super::*;

    #[test]
    fn new_is_centered() {
        let bounds = Bounds::new(200.0, 100.0);
        assert_eq!(bounds.min, Vec2::new(-100.0, -50.0));
        assert_eq!(bounds.max, Vec2::new(100.0, 50.0));
        assert_eq!(bounds.center(), Vec2::ZERO);
        assert_eq!(bounds.size(), Vec2::new(200.0, 100.0));
    }

    #[test]
    fn contains_is_edge_inclusive() {
        let bounds = Bounds::new(10.0, 10.0);
        assert!(bounds.contains(Vec2::new(5.0, 5.0)));
        assert!(bounds.contains(Vec2::new(-5.0, 0.0)));
        assert!(!bounds.contains(Vec2::new(5.01, 0.0)));
        assert!(!bounds.contains(Vec2::new(0.0, -5.5)));
    }

    #[test]
    fn widened_grows_every_side() {
        let bounds = Bounds::new(10.0, 10.0).widened(2.0);
        assert_eq!(bounds.min, Vec2::new(-7.0, -7.0));
        assert_eq!(bounds.max, Vec2::new(7.0, 7.0));
    }
}
