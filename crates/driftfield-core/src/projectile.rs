//! Pooled bullets.
//!
//! Bullets are ordinary entities (transform, linear movement, physics, wrap,
//! lifetime) recycled through a [`Pool`]. Firing and expiry publish
//! [`Event::BulletFired`] and [`Event::BulletExpired`] for scoring and
//! presentation.

use std::collections::BTreeMap;

use glam::Vec2;
use tracing::debug;

use crate::bus::{Event, EventBus};
use crate::components::{Lifetime, LinearMovement, Physics};
use crate::config::WeaponConfig;
use crate::context::TickContext;
use crate::entity::{roles, Entity, EntityId, EntityIdAllocator};
use crate::error::AssemblyError;
use crate::pool::{Pool, PoolKey};

/// Bullets in flight and their backing pool.
#[derive(Debug)]
pub struct ProjectilePool {
    pool: Pool<Entity>,
    active: BTreeMap<EntityId, PoolKey>,
}

impl ProjectilePool {
    /// Creates an empty bullet pool.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError`] if the bullet prototype is miswired.
    pub fn new(config: &WeaponConfig, ids: EntityIdAllocator) -> Result<Self, AssemblyError> {
        let prototype = roles::bullet(EntityId::UNASSIGNED, config)?;
        Ok(Self {
            pool: Pool::new(move || prototype.clone_as(ids.allocate())),
            active: BTreeMap::new(),
        })
    }

    /// Launches a bullet from `origin` along `direction`.
    pub fn fire(&mut self, origin: Vec2, direction: Vec2, bus: &EventBus) -> Option<EntityId> {
        let key = self.pool.acquire()?;
        let entity = self.pool.get_mut(key)?;
        let direction = direction.normalize_or_zero();

        entity.place_at(origin, bus);
        if let Some(lifetime) = entity.component_mut::<Lifetime>() {
            lifetime.reset();
        }
        let velocity = match entity.component_mut::<LinearMovement>() {
            Some(movement) => {
                movement.set_direction(direction);
                direction * movement.speed()
            }
            None => Vec2::ZERO,
        };
        if let Some(physics) = entity.component_mut::<Physics>() {
            physics.set_velocity(velocity, bus);
        }

        let id = entity.id();
        self.active.insert(id, key);
        bus.publish(Event::BulletFired {
            entity: id,
            position: origin,
            direction,
        });
        Some(id)
    }

    /// Returns a bullet to the pool. Unknown ids are ignored.
    pub fn release(&mut self, id: EntityId, bus: &EventBus) -> bool {
        let Some(key) = self.active.remove(&id) else {
            return false;
        };
        self.pool.release(key);
        bus.publish(Event::BulletExpired { entity: id });
        true
    }

    /// Returns every bullet in flight.
    pub fn clear_all(&mut self, bus: &EventBus) {
        let ids: Vec<EntityId> = self.active.keys().copied().collect();
        for id in ids {
            self.release(id, bus);
        }
        debug!("projectiles cleared");
    }

    /// Ticks every bullet in id order.
    pub fn tick(&mut self, ctx: &mut TickContext<'_>) {
        for key in self.active.values() {
            if let Some(entity) = self.pool.get_mut(*key) {
                entity.tick(ctx);
            }
        }
    }

    /// Returns true if `id` is in flight.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.active.contains_key(&id)
    }

    /// Ids of bullets in flight, ascending.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.active.keys().copied()
    }

    /// Number of bullets in flight.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// A bullet in flight.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.pool.get(*self.active.get(&id)?)
    }

    /// The backing pool.
    #[must_use]
    pub fn pool(&self) -> &Pool<Entity> {
        &self.pool
    }
}
