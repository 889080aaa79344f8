//! Enemy spawning, active-set tracking, and asteroid fragmentation.
//!
//! # Architecture
//!
//! Each [`EnemyKind`] has its own [`Pool`] of fully assembled entities, built
//! by cloning a prototype under a freshly allocated id. The spawner tracks
//! every live enemy in an [`EnemyRecord`] keyed by entity id; iteration is in
//! id order so runs with the same seed are reproducible.
//!
//! Spawning is off until the game state machine turns it on. While on, a
//! time accumulator releases one enemy per configured interval, carrying any
//! overflow into the next interval.
//!
//! # Example
//!
//! ```
//! use driftfield_core::bus::EventBus;
//! use driftfield_core::config::ArenaConfig;
//! use driftfield_core::entity::EntityIdAllocator;
//! use driftfield_core::spawner::EnemySpawner;
//! # fn config() -> ArenaConfig {
//! #     serde_json::from_str(include_str!("../tests/arena.json")).unwrap()
//! # }
//!
//! let bus = EventBus::new();
//! let mut spawner = EnemySpawner::new(&config(), EntityIdAllocator::new(), 7).unwrap();
//! spawner.set_enabled(true);
//! spawner.tick(10.0, &bus);
//! assert_eq!(spawner.active_count(), 1);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bus::{Event, EventBus};
use crate::components::{BoundaryWrap, LinearMovement, Physics};
use crate::config::{ArenaConfig, EnemyConfig, SpawnConfig, SpawnWeights};
use crate::context::TickContext;
use crate::entity::{roles, Entity, EntityId, EntityIdAllocator};
use crate::error::AssemblyError;
use crate::pool::{Pool, PoolKey};
use crate::Bounds;

// =============================================================================
// Kinds and records
// =============================================================================

/// Hostile variety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Large rock flying straight through the field; splits when destroyed
    Asteroid,
    /// Chases the player
    Pursuer,
    /// Piece of a destroyed asteroid; never splits further
    Fragment,
}

impl EnemyKind {
    /// Every kind, in pool order.
    pub const ALL: [Self; 3] = [Self::Asteroid, Self::Pursuer, Self::Fragment];

    /// Pool index of this kind.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asteroid => write!(f, "Asteroid"),
            Self::Pursuer => write!(f, "Pursuer"),
            Self::Fragment => write!(f, "Fragment"),
        }
    }
}

/// Side of the play field an enemy enters from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Above the field
    Top,
    /// Below the field
    Bottom,
    /// Left of the field
    Left,
    /// Right of the field
    Right,
}

impl Edge {
    /// Every edge.
    pub const ALL: [Self; 4] = [Self::Top, Self::Bottom, Self::Left, Self::Right];
}

/// A live enemy as the spawner tracks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyRecord {
    /// The enemy entity
    pub entity: EntityId,
    /// Its kind
    pub kind: EnemyKind,
    /// Its slot in the kind's pool
    pub key: PoolKey,
}

/// Picks a spawnable kind for a `roll` drawn uniformly from `[0, total)`.
///
/// Weights are compared cumulatively in the fixed order asteroid, pursuer;
/// a roll at or beyond the total falls to the last kind.
#[must_use]
pub fn pick_weighted(weights: &SpawnWeights, roll: f32) -> EnemyKind {
    let table = [
        (EnemyKind::Asteroid, weights.asteroid),
        (EnemyKind::Pursuer, weights.pursuer),
    ];
    let mut cumulative = 0.0;
    for (kind, weight) in table {
        cumulative += weight;
        if roll < cumulative {
            return kind;
        }
    }
    EnemyKind::Pursuer
}

// =============================================================================
// Spawner
// =============================================================================

/// Weighted edge spawner owning one pool per enemy kind.
pub struct EnemySpawner {
    pools: [Pool<Entity>; 3],
    active: BTreeMap<EntityId, EnemyRecord>,
    rng: ChaCha8Rng,
    enabled: bool,
    accumulator: f32,
    bounds: Bounds,
    spawn: SpawnConfig,
    enemies: EnemyConfig,
}

impl EnemySpawner {
    /// Creates a disabled spawner.
    ///
    /// # Arguments
    ///
    /// * `config` - Arena tuning; only bounds, spawn, and enemy settings are read
    /// * `ids` - Shared id allocator, used whenever a pool builds an enemy
    /// * `seed` - Seed for edge, position, and kind draws
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError`] if an enemy prototype is miswired.
    pub fn new(
        config: &ArenaConfig,
        ids: EntityIdAllocator,
        seed: u64,
    ) -> Result<Self, AssemblyError> {
        let pool = |prototype: Entity| {
            let ids = ids.clone();
            Pool::new(move || prototype.clone_as(ids.allocate()))
        };
        let asteroid = roles::enemy(EntityId::UNASSIGNED, EnemyKind::Asteroid, &config.enemies)?;
        let pursuer = roles::enemy(EntityId::UNASSIGNED, EnemyKind::Pursuer, &config.enemies)?;
        let fragment = roles::enemy(EntityId::UNASSIGNED, EnemyKind::Fragment, &config.enemies)?;

        Ok(Self {
            pools: [pool(asteroid), pool(pursuer), pool(fragment)],
            active: BTreeMap::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            enabled: false,
            accumulator: 0.0,
            bounds: config.bounds(),
            spawn: config.spawn,
            enemies: config.enemies,
        })
    }

    /// Turns timed spawning on or off. Repeating the current state is a no-op.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        debug!(enabled, "spawning toggled");
    }

    /// Returns true while timed spawning is on.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Time banked toward the next spawn.
    #[must_use]
    pub const fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Builds `count` idle enemies of `kind` ahead of time.
    pub fn pre_warm(&mut self, kind: EnemyKind, count: usize) {
        self.pools[kind.index()].pre_warm(count);
    }

    /// Advances the spawn timer, spawning at most one enemy.
    ///
    /// Does nothing while disabled or while the active count is at the cap.
    pub fn tick(&mut self, dt: f32, bus: &EventBus) -> Option<EntityId> {
        if !self.enabled || self.active.len() >= self.enemies.max_active {
            return None;
        }
        self.accumulator += dt;
        if self.accumulator < self.spawn.interval {
            return None;
        }
        self.accumulator -= self.spawn.interval;
        self.spawn_random(bus)
    }

    /// Spawns one enemy of a weighted-random kind at a random edge.
    pub fn spawn_random(&mut self, bus: &EventBus) -> Option<EntityId> {
        let total = self.spawn.weights.total();
        if total <= 0.0 {
            return None;
        }
        let edge = Edge::ALL[self.rng.gen_range(0..Edge::ALL.len())];
        let position = self.edge_position(edge);
        let kind = pick_weighted(&self.spawn.weights, self.rng.gen_range(0.0..total));
        let direction = match kind {
            EnemyKind::Asteroid => (self.inside_point() - position).normalize_or_zero(),
            EnemyKind::Pursuer | EnemyKind::Fragment => Vec2::ZERO,
        };
        self.spawn(kind, position, direction, bus)
    }

    fn edge_position(&mut self, edge: Edge) -> Vec2 {
        let outer = self.bounds.widened(self.spawn.safety_distance);
        match edge {
            Edge::Top => Vec2::new(self.rng.gen_range(outer.min.x..=outer.max.x), outer.max.y),
            Edge::Bottom => Vec2::new(self.rng.gen_range(outer.min.x..=outer.max.x), outer.min.y),
            Edge::Left => Vec2::new(outer.min.x, self.rng.gen_range(outer.min.y..=outer.max.y)),
            Edge::Right => Vec2::new(outer.max.x, self.rng.gen_range(outer.min.y..=outer.max.y)),
        }
    }

    fn inside_point(&mut self) -> Vec2 {
        let bounds = self.bounds;
        Vec2::new(
            self.rng.gen_range(bounds.min.x..=bounds.max.x),
            self.rng.gen_range(bounds.min.y..=bounds.max.y),
        )
    }

    /// Places a pooled enemy of `kind` at `position`.
    ///
    /// Straight-flying kinds head along `direction`; pursuers ignore it.
    /// Returns `None` if the kind's pool has been cleared.
    pub fn spawn(
        &mut self,
        kind: EnemyKind,
        position: Vec2,
        direction: Vec2,
        bus: &EventBus,
    ) -> Option<EntityId> {
        let pool = &mut self.pools[kind.index()];
        let key = pool.acquire()?;
        let entity = pool.get_mut(key)?;

        entity.place_at(position, bus);
        let velocity = match entity.component_mut::<LinearMovement>() {
            Some(movement) => {
                movement.set_direction(direction);
                movement.direction() * movement.speed()
            }
            None => Vec2::ZERO,
        };
        if let Some(physics) = entity.component_mut::<Physics>() {
            physics.set_velocity(velocity, bus);
        }

        let id = entity.id();
        self.active.insert(
            id,
            EnemyRecord {
                entity: id,
                kind,
                key,
            },
        );
        debug!(entity = %id, kind = ?kind, x = position.x, y = position.y, "enemy spawned");
        bus.publish(Event::EnemySpawned {
            entity: id,
            kind,
            position,
        });
        Some(id)
    }

    /// Removes an enemy from play and releases it to its pool.
    ///
    /// Publishes [`Event::EnemyDestroyed`]. Unknown ids are ignored.
    pub fn return_enemy(&mut self, id: EntityId, bus: &EventBus) -> Option<EnemyRecord> {
        let record = self.active.remove(&id)?;
        bus.publish(Event::EnemyDestroyed {
            entity: id,
            kind: record.kind,
        });
        self.pools[record.kind.index()].release(record.key);
        debug!(entity = %id, kind = ?record.kind, "enemy returned");
        Some(record)
    }

    /// Destroys an enemy: asteroids split into fragments, anything else is
    /// simply returned.
    ///
    /// Returns the ids of any fragments spawned.
    pub fn destroy(&mut self, id: EntityId, bus: &EventBus) -> Vec<EntityId> {
        match self.active.get(&id).map(|record| record.kind) {
            Some(EnemyKind::Asteroid) => self.fragment(id, bus),
            Some(_) => {
                self.return_enemy(id, bus);
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    /// Returns an asteroid and fans fragments backward from where it was.
    ///
    /// Each fragment heads along the reverse of the asteroid's travel
    /// direction rotated by `(i - n/2 + 0.5) * spread`. Does nothing unless
    /// `id` is an active asteroid.
    pub fn fragment(&mut self, id: EntityId, bus: &EventBus) -> Vec<EntityId> {
        let Some(record) = self.active.get(&id).copied() else {
            return Vec::new();
        };
        if record.kind != EnemyKind::Asteroid {
            return Vec::new();
        }
        let Some(asteroid) = self.pools[record.kind.index()].get(record.key) else {
            return Vec::new();
        };
        let position = asteroid.position().unwrap_or(Vec2::ZERO);
        let reverse = -travel_direction(asteroid);

        self.return_enemy(id, bus);

        let count = self.enemies.fragment_count;
        let step = self.enemies.fragment_spread_degrees.to_radians();
        #[allow(clippy::cast_precision_loss)]
        let half = count as f32 / 2.0;
        let fragments: Vec<EntityId> = (0..count)
            .filter_map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let offset = (i as f32 - half + 0.5) * step;
                let direction = Vec2::from_angle(offset).rotate(reverse);
                self.spawn(EnemyKind::Fragment, position, direction, bus)
            })
            .collect();
        debug!(entity = %id, fragments = fragments.len(), "asteroid fragmented");
        fragments
    }

    /// Returns every active enemy. Yields how many were returned.
    pub fn clear_all(&mut self, bus: &EventBus) -> usize {
        let ids: Vec<EntityId> = self.active.keys().copied().collect();
        for id in &ids {
            self.return_enemy(*id, bus);
        }
        ids.len()
    }

    /// Zeroes every active enemy's velocity without removing it.
    pub fn freeze_all(&mut self, bus: &EventBus) {
        for record in self.active.values() {
            let physics = self.pools[record.kind.index()]
                .get_mut(record.key)
                .and_then(Entity::component_mut::<Physics>);
            if let Some(physics) = physics {
                physics.set_velocity(Vec2::ZERO, bus);
            }
        }
    }

    /// Ticks every active enemy in id order.
    ///
    /// An enemy that has never entered the field and has drifted more than
    /// twice the safety distance past an edge can no longer wrap back in; it
    /// is returned to its pool.
    pub fn tick_enemies(&mut self, ctx: &mut TickContext<'_>) {
        let reach = self.bounds.widened(2.0 * self.spawn.safety_distance);
        let mut strays = Vec::new();
        for record in self.active.values() {
            if let Some(entity) = self.pools[record.kind.index()].get_mut(record.key) {
                entity.tick(ctx);
                if is_stray(entity, reach) {
                    strays.push(record.entity);
                }
            }
        }
        for id in strays {
            debug!(entity = %id, "enemy lost beyond the field");
            self.return_enemy(id, ctx.bus);
        }
    }

    /// Number of active enemies.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of active enemies of `kind`.
    #[must_use]
    pub fn count_of(&self, kind: EnemyKind) -> usize {
        self.active.values().filter(|record| record.kind == kind).count()
    }

    /// Returns true if `id` is an active enemy.
    #[must_use]
    pub fn is_active(&self, id: EntityId) -> bool {
        self.active.contains_key(&id)
    }

    /// Record of an active enemy.
    #[must_use]
    pub fn record(&self, id: EntityId) -> Option<&EnemyRecord> {
        self.active.get(&id)
    }

    /// Every active record in id order.
    pub fn records(&self) -> impl Iterator<Item = &EnemyRecord> + '_ {
        self.active.values()
    }

    /// An active enemy's entity.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        let record = self.active.get(&id)?;
        self.pools[record.kind.index()].get(record.key)
    }

    /// An active enemy's entity, mutably.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let record = self.active.get(&id)?;
        self.pools[record.kind.index()].get_mut(record.key)
    }

    /// The pool backing `kind`.
    #[must_use]
    pub fn pool(&self, kind: EnemyKind) -> &Pool<Entity> {
        &self.pools[kind.index()]
    }
}

fn is_stray(entity: &Entity, reach: Bounds) -> bool {
    let armed = entity
        .component::<BoundaryWrap>()
        .map_or(true, BoundaryWrap::is_armed);
    !armed && entity.position().is_some_and(|position| !reach.contains(position))
}

/// Unit heading of a moving enemy, falling back to its configured heading,
/// then to +X.
fn travel_direction(entity: &Entity) -> Vec2 {
    let velocity = entity.velocity().unwrap_or(Vec2::ZERO).normalize_or_zero();
    if velocity != Vec2::ZERO {
        return velocity;
    }
    entity
        .component::<LinearMovement>()
        .map(LinearMovement::direction)
        .filter(|direction| *direction != Vec2::ZERO)
        .unwrap_or(Vec2::X)
}

impl fmt::Debug for EnemySpawner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnemySpawner")
            .field("enabled", &self.enabled)
            .field("accumulator", &self.accumulator)
            .field("active", &self.active.len())
            .field("pools", &self.pools)
            .finish_non_exhaustive()
    }
}
