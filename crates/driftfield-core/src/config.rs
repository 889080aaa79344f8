//! Numeric tuning for the arena.
//!
//! Every record derives `Deserialize` with `deny_unknown_fields` and carries no
//! defaults: a missing field fails deserialization, and
//! [`ArenaConfig::validate`] rejects out-of-range values before any entity is
//! built. Where the settings come from (file, asset, network) is the host's
//! business.
//!
//! # Example
//!
//! ```
//! use driftfield_core::config::ArenaConfig;
//!
//! let json = r#"{
//!     "arena": { "width": 800.0, "height": 600.0 },
//!     "movement": { "acceleration": 400.0, "max_speed": 300.0, "friction": 0.5,
//!                   "rotation_speed": 180.0, "mass": 1.0 },
//!     "enemies": { "asteroid_speed": 80.0, "pursuer_speed": 60.0, "fragment_speed": 120.0,
//!                  "max_active": 20, "fragment_count": 2, "fragment_spread_degrees": 30.0 },
//!     "spawn": { "interval": 1.5, "safety_distance": 40.0,
//!                "weights": { "asteroid": 3.0, "pursuer": 1.0 } },
//!     "health": { "max_health": 3, "invincibility_duration": 1.0, "bounce_force": 200.0,
//!                 "contact_damage": 1 },
//!     "weapon": { "fire_rate": 5.0, "bullet_lifetime": 1.2, "bullet_speed": 500.0 },
//!     "laser": { "max_charges": 3, "recharge_time": 4.0, "duration": 0.5, "width": 12.0,
//!                "range": 600.0 }
//! }"#;
//!
//! let config: ArenaConfig = serde_json::from_str(json).unwrap();
//! config.validate().unwrap();
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::Bounds;

/// Playable rectangle dimensions, centered on the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArenaSize {
    /// Horizontal extent
    pub width: f32,
    /// Vertical extent
    pub height: f32,
}

/// Player craft handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MovementConfig {
    /// Thrust force at full forward input
    pub acceleration: f32,
    /// Speed cap applied after thrust
    pub max_speed: f32,
    /// Per-second velocity retention in `(0, 1]`
    pub friction: f32,
    /// Turn rate in degrees per second at full rotation input
    pub rotation_speed: f32,
    /// Player mass
    pub mass: f32,
}

/// Hostile tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnemyConfig {
    /// Asteroid travel speed
    pub asteroid_speed: f32,
    /// Pursuer chase speed
    pub pursuer_speed: f32,
    /// Fragment travel speed
    pub fragment_speed: f32,
    /// Spawning pauses while this many enemies are active
    pub max_active: usize,
    /// Fragments produced by one destroyed asteroid
    pub fragment_count: u32,
    /// Angle between neighbouring fragments, in degrees
    pub fragment_spread_degrees: f32,
}

/// Relative spawn likelihood per spawnable kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpawnWeights {
    /// Asteroid weight
    pub asteroid: f32,
    /// Pursuer weight
    pub pursuer: f32,
}

impl SpawnWeights {
    /// Sum of all weights.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.asteroid + self.pursuer
    }
}

/// Spawner timing and placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpawnConfig {
    /// Seconds between spawns
    pub interval: f32,
    /// Distance outside the rectangle at which enemies appear
    pub safety_distance: f32,
    /// Kind weights
    pub weights: SpawnWeights,
}

/// Player durability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthConfig {
    /// Starting and maximum health
    pub max_health: u32,
    /// Damage immunity after a hit, in seconds
    pub invincibility_duration: f32,
    /// Impulse pushing the player away from what hit it
    pub bounce_force: f32,
    /// Damage dealt by touching an enemy
    pub contact_damage: u32,
}

/// Primary gun.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeaponConfig {
    /// Shots per second while the trigger is held
    pub fire_rate: f32,
    /// Seconds a bullet lives
    pub bullet_lifetime: f32,
    /// Bullet travel speed
    pub bullet_speed: f32,
}

/// Charge-based beam weapon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LaserConfig {
    /// Charge capacity
    pub max_charges: u32,
    /// Seconds to regain one charge
    pub recharge_time: f32,
    /// Seconds a beam lasts
    pub duration: f32,
    /// Beam width
    pub width: f32,
    /// Beam length
    pub range: f32,
}

/// Complete arena tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArenaConfig {
    /// Play field size
    pub arena: ArenaSize,
    /// Player handling
    pub movement: MovementConfig,
    /// Hostiles
    pub enemies: EnemyConfig,
    /// Spawner
    pub spawn: SpawnConfig,
    /// Player durability
    pub health: HealthConfig,
    /// Primary gun
    pub weapon: WeaponConfig,
    /// Beam weapon
    pub laser: LaserConfig,
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            requirement: "positive",
            value,
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            requirement: "non-negative",
            value,
        })
    }
}

#[allow(clippy::cast_precision_loss)]
fn at_least_one(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value >= 1 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            requirement: "at least 1",
            value: value as f32,
        })
    }
}

impl ArenaConfig {
    /// Checks every field against its accepted range.
    ///
    /// # Errors
    ///
    /// Returns the first offending field as [`ConfigError::OutOfRange`], or
    /// [`ConfigError::NoSpawnWeight`] when no kind can be spawned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("arena.width", self.arena.width)?;
        positive("arena.height", self.arena.height)?;

        let movement = &self.movement;
        positive("movement.acceleration", movement.acceleration)?;
        positive("movement.max_speed", movement.max_speed)?;
        if !(movement.friction > 0.0 && movement.friction <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "movement.friction",
                requirement: "in (0, 1]",
                value: movement.friction,
            });
        }
        positive("movement.rotation_speed", movement.rotation_speed)?;
        positive("movement.mass", movement.mass)?;

        let enemies = &self.enemies;
        positive("enemies.asteroid_speed", enemies.asteroid_speed)?;
        positive("enemies.pursuer_speed", enemies.pursuer_speed)?;
        positive("enemies.fragment_speed", enemies.fragment_speed)?;
        at_least_one("enemies.max_active", enemies.max_active as u64)?;
        non_negative(
            "enemies.fragment_spread_degrees",
            enemies.fragment_spread_degrees,
        )?;

        let spawn = &self.spawn;
        positive("spawn.interval", spawn.interval)?;
        non_negative("spawn.safety_distance", spawn.safety_distance)?;
        non_negative("spawn.weights.asteroid", spawn.weights.asteroid)?;
        non_negative("spawn.weights.pursuer", spawn.weights.pursuer)?;
        let total = spawn.weights.total();
        if total <= 0.0 {
            return Err(ConfigError::NoSpawnWeight { total });
        }

        let health = &self.health;
        at_least_one("health.max_health", u64::from(health.max_health))?;
        non_negative(
            "health.invincibility_duration",
            health.invincibility_duration,
        )?;
        non_negative("health.bounce_force", health.bounce_force)?;

        let weapon = &self.weapon;
        positive("weapon.fire_rate", weapon.fire_rate)?;
        positive("weapon.bullet_lifetime", weapon.bullet_lifetime)?;
        positive("weapon.bullet_speed", weapon.bullet_speed)?;

        let laser = &self.laser;
        positive("laser.recharge_time", laser.recharge_time)?;
        positive("laser.duration", laser.duration)?;
        positive("laser.width", laser.width)?;
        positive("laser.range", laser.range)?;

        Ok(())
    }

    /// The playable rectangle described by [`ArenaSize`].
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.arena.width, self.arena.height)
    }
}

/// The arena shipped with the test suite, read from `tests/arena.json`.
#[cfg(test)]
pub(crate) fn fixture() -> ArenaConfig {
    serde_json::from_str(include_str!("../tests/arena.json"))
        .expect("tests/arena.json should deserialize")
}
