//! Arena module: the player, the hostiles, and the bullets in one play field.
//!
//! The Arena owns every entity in the simulation. It provides:
//! - The per-tick order (player, spawner, enemies, bullets, then commands)
//! - Collision consequences for contacts reported by the host
//! - The [`GameCollaborators`] surface the state machine drives
//!
//! # Architecture
//!
//! Enemies and bullets live in pools keyed by [`EntityId`] in `BTreeMap`s, so
//! iteration order is id order and a seeded run replays identically. Entity
//! ids come from one shared [`EntityIdAllocator`]; the player is always the
//! first id handed out.
//!
//! Collision *detection* is the host's job. The host queries geometry (entity
//! positions, [`Arena::laser_beam`]) and reports contacts as [`Collision`]s.
//! Reports naming entities that are no longer live are ignored.
//!
//! # Example
//!
//! ```
//! use driftfield_core::arena::Arena;
//! use driftfield_core::bus::EventBus;
//! use driftfield_core::config::ArenaConfig;
//! use driftfield_core::input::InputState;
//! # fn config() -> ArenaConfig {
//! #     serde_json::from_str(include_str!("../tests/arena.json")).unwrap()
//! # }
//!
//! let bus = EventBus::new();
//! let mut arena = Arena::new(&config(), 1).unwrap();
//!
//! let thrust = InputState { forward: 1.0, ..InputState::IDLE };
//! arena.tick(1.0 / 60.0, &bus, &thrust);
//!
//! assert!(arena.player().velocity().unwrap().x > 0.0);
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bus::EventBus;
use crate::components::{
    BoundaryWrap, DamageOutcome, Health, Laser, LaserBeam, Physics, PlayerMovement, Transform,
    Weapon,
};
use crate::config::ArenaConfig;
use crate::context::{Command, TickContext};
use crate::entity::{roles, Entity, EntityId, EntityIdAllocator};
use crate::error::AssemblyError;
use crate::game::GameCollaborators;
use crate::input::{InputSource, InputState};
use crate::projectile::ProjectilePool;
use crate::spawner::EnemySpawner;
use crate::Bounds;

/// A contact reported by the host's collision query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Collision {
    /// A bullet touched an enemy.
    BulletHitEnemy {
        /// The bullet
        bullet: EntityId,
        /// The enemy
        enemy: EntityId,
    },
    /// The live laser beam touched an enemy.
    LaserHitEnemy {
        /// The enemy
        enemy: EntityId,
    },
    /// The player touched an enemy.
    PlayerHitEnemy {
        /// The enemy
        enemy: EntityId,
    },
}

/// Every entity in play.
#[derive(Debug)]
pub struct Arena {
    bounds: Bounds,
    player: Entity,
    spawner: EnemySpawner,
    projectiles: ProjectilePool,
    contact_damage: u32,
}

impl Arena {
    /// Builds the player, the enemy pools, and the bullet pool.
    ///
    /// # Arguments
    ///
    /// * `config` - Validated arena tuning
    /// * `seed` - Seed for the spawner's random draws
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError`] if any role is miswired.
    pub fn new(config: &ArenaConfig, seed: u64) -> Result<Self, AssemblyError> {
        let ids = EntityIdAllocator::new();
        let player = roles::player_ship(ids.allocate(), config)?;
        let spawner = EnemySpawner::new(config, ids.clone(), seed)?;
        let projectiles = ProjectilePool::new(&config.weapon, ids)?;
        Ok(Self {
            bounds: config.bounds(),
            player,
            spawner,
            projectiles,
            contact_damage: config.health.contact_damage,
        })
    }

    /// Advances every entity by `dt` and applies the commands they queued.
    ///
    /// Order: player, spawn timer, enemies (chasing the player's position),
    /// bullets, then queued commands.
    pub fn tick(&mut self, dt: f32, bus: &EventBus, input: &dyn InputSource) {
        let mut commands = Vec::new();

        self.player.tick(&mut TickContext {
            dt,
            bus,
            bounds: self.bounds,
            input,
            target: None,
            commands: &mut commands,
        });

        self.spawner.tick(dt, bus);

        let target = self.player.position();
        self.spawner.tick_enemies(&mut TickContext {
            dt,
            bus,
            bounds: self.bounds,
            input: &InputState::IDLE,
            target,
            commands: &mut commands,
        });

        self.projectiles.tick(&mut TickContext {
            dt,
            bus,
            bounds: self.bounds,
            input: &InputState::IDLE,
            target: None,
            commands: &mut commands,
        });

        self.apply_commands(commands, bus);
    }

    fn apply_commands(&mut self, commands: Vec<Command>, bus: &EventBus) {
        for command in commands {
            match command {
                Command::FireBullet {
                    origin, direction, ..
                } => {
                    self.projectiles.fire(origin, direction, bus);
                }
                Command::Expire { entity } => {
                    self.projectiles.release(entity, bus);
                }
            }
        }
    }

    /// Applies the consequences of a reported contact.
    ///
    /// - Bullet on enemy: the bullet is returned and the enemy destroyed.
    /// - Laser on enemy: the enemy is destroyed, if a beam is live.
    /// - Player on enemy: the player takes contact damage and is knocked away
    ///   from the enemy, which is destroyed. Contacts during the player's
    ///   immunity window change nothing.
    ///
    /// Destroyed asteroids fragment. Returns false if the report was ignored.
    pub fn resolve_collision(&mut self, collision: Collision, bus: &EventBus) -> bool {
        match collision {
            Collision::BulletHitEnemy { bullet, enemy } => {
                if !self.projectiles.contains(bullet) || !self.spawner.is_active(enemy) {
                    return false;
                }
                self.projectiles.release(bullet, bus);
                self.spawner.destroy(enemy, bus);
                true
            }
            Collision::LaserHitEnemy { enemy } => {
                if self.laser_beam().is_none() || !self.spawner.is_active(enemy) {
                    return false;
                }
                self.spawner.destroy(enemy, bus);
                true
            }
            Collision::PlayerHitEnemy { enemy } => self.player_contact(enemy, bus),
        }
    }

    fn player_contact(&mut self, enemy: EntityId, bus: &EventBus) -> bool {
        let Some(enemy_position) = self.spawner.entity(enemy).and_then(Entity::position) else {
            return false;
        };
        let Some(health) = self.player.component_mut::<Health>() else {
            return false;
        };
        let outcome = health.take_damage(self.contact_damage, bus);
        let bounce = health.bounce_force();
        debug!(enemy = %enemy, outcome = ?outcome, "player contact");

        match outcome {
            DamageOutcome::Ignored => return false,
            DamageOutcome::Damaged => {
                let (position, forward) = self
                    .player
                    .component::<Transform>()
                    .map_or((Vec2::ZERO, Vec2::X), |t| (t.position(), t.forward()));
                let away = (position - enemy_position)
                    .try_normalize()
                    .unwrap_or(-forward);
                if let Some(physics) = self.player.component_mut::<Physics>() {
                    physics.apply_impulse(away * bounce, bus);
                }
            }
            DamageOutcome::Died => {}
        }
        self.spawner.destroy(enemy, bus);
        true
    }

    /// The live laser beam, if the player is firing.
    #[must_use]
    pub fn laser_beam(&self) -> Option<LaserBeam> {
        self.player.component::<Laser>().and_then(Laser::beam)
    }

    /// The playable rectangle.
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// The player craft.
    #[must_use]
    pub const fn player(&self) -> &Entity {
        &self.player
    }

    /// The player craft, mutably.
    pub fn player_mut(&mut self) -> &mut Entity {
        &mut self.player
    }

    /// The enemy spawner.
    #[must_use]
    pub const fn spawner(&self) -> &EnemySpawner {
        &self.spawner
    }

    /// The enemy spawner, mutably.
    pub fn spawner_mut(&mut self) -> &mut EnemySpawner {
        &mut self.spawner
    }

    /// Bullets in flight.
    #[must_use]
    pub const fn projectiles(&self) -> &ProjectilePool {
        &self.projectiles
    }
}

impl GameCollaborators for Arena {
    fn clear_enemies(&mut self, bus: &EventBus) {
        self.spawner.clear_all(bus);
        self.projectiles.clear_all(bus);
    }

    fn set_spawning(&mut self, enabled: bool) {
        self.spawner.set_enabled(enabled);
    }

    fn reset_player(&mut self, bus: &EventBus) {
        let player = &mut self.player;
        if let Some(transform) = player.component_mut::<Transform>() {
            transform.set_position(Vec2::ZERO, bus);
            transform.set_rotation(0.0, bus);
        }
        if let Some(physics) = player.component_mut::<Physics>() {
            physics.set_velocity(Vec2::ZERO, bus);
        }
        if let Some(wrap) = player.component_mut::<BoundaryWrap>() {
            wrap.reset();
        }
        if let Some(health) = player.component_mut::<Health>() {
            health.reset(bus);
        }
        if let Some(weapon) = player.component_mut::<Weapon>() {
            weapon.reset();
        }
        if let Some(laser) = player.component_mut::<Laser>() {
            laser.reset(bus);
        }
        self.set_player_control(true);
    }

    fn set_player_control(&mut self, enabled: bool) {
        let player = &mut self.player;
        if let Some(movement) = player.component_mut::<PlayerMovement>() {
            movement.set_control_enabled(enabled);
        }
        if let Some(weapon) = player.component_mut::<Weapon>() {
            weapon.set_enabled(enabled);
        }
        if let Some(laser) = player.component_mut::<Laser>() {
            laser.set_enabled(enabled);
        }
    }

    fn freeze_enemies(&mut self, bus: &EventBus) {
        self.spawner.freeze_all(bus);
    }
}
