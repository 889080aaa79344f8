//! Per-tick context handed to every tickable component.
//!
//! Components mutate their own entity directly. Anything that reaches beyond
//! the entity (spawning a bullet, returning themselves to a pool) is queued as
//! a [`Command`] and applied by the arena once every entity has ticked.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::bus::EventBus;
use crate::entity::EntityId;
use crate::input::InputSource;
use crate::Bounds;

/// A request a component cannot fulfil from inside its own entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Launch a pooled bullet.
    FireBullet {
        /// The firing entity
        source: EntityId,
        /// Muzzle position
        origin: Vec2,
        /// Unit travel direction
        direction: Vec2,
    },
    /// Return an entity whose lifetime ran out.
    Expire {
        /// The expired entity
        entity: EntityId,
    },
}

/// Everything a component may read or emit during one tick.
pub struct TickContext<'a> {
    /// Step length in seconds
    pub dt: f32,
    /// Notification channel
    pub bus: &'a EventBus,
    /// The playable rectangle
    pub bounds: Bounds,
    /// Control signals for this tick
    pub input: &'a dyn InputSource,
    /// Position pursuers steer toward
    pub target: Option<Vec2>,
    /// Deferred requests, applied after all entities tick
    pub commands: &'a mut Vec<Command>,
}

impl TickContext<'_> {
    /// Queues a command for the arena.
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }
}
