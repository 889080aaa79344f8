//! Event bus decoupling simulation state changes from their consumers.
//!
//! Presentation, scoring, and UI never poll the kernel: they subscribe to the
//! [`EventBus`] and receive [`Event`]s carrying absolute, ready-to-use state.
//!
//! # Dispatch
//!
//! - `publish` is synchronous: every handler subscribed to the event's
//!   [`EventKind`] runs, in subscription order, before `publish` returns.
//! - Dispatch is re-entrant within one thread. A handler may publish,
//!   subscribe, or unsubscribe; the running publish keeps the handler list it
//!   started with.
//! - No ordering is promised across different event kinds.
//!
//! The bus uses `Rc`/`RefCell` internally and is therefore neither `Send` nor
//! `Sync`. Cross-thread publication is not supported.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use driftfield_core::bus::{Event, EventBus, EventKind};
//!
//! let bus = EventBus::new();
//! let started = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&started);
//! let id = bus.subscribe(EventKind::GameStarted, move |_| counter.set(counter.get() + 1));
//!
//! bus.publish(Event::GameStarted);
//! assert_eq!(started.get(), 1);
//!
//! bus.unsubscribe(EventKind::GameStarted, id);
//! bus.publish(Event::GameStarted);
//! assert_eq!(started.get(), 1);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::entity::EntityId;
use crate::game::GameState;
use crate::spawner::EnemyKind;

// =============================================================================
// Events
// =============================================================================

/// Discriminant of an [`Event`], used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    /// A transform's position or rotation changed.
    TransformChanged,
    /// A physics body's velocity changed.
    PhysicsChanged,
    /// An enemy entered the arena.
    EnemySpawned,
    /// An enemy left the active set.
    EnemyDestroyed,
    /// A bullet left the muzzle.
    BulletFired,
    /// A bullet returned to its pool.
    BulletExpired,
    /// The player's health changed.
    HealthChanged,
    /// The player's damage immunity window opened or closed.
    InvincibilityChanged,
    /// The player's health reached zero.
    PlayerDied,
    /// A laser beam started.
    LaserFired,
    /// A laser beam ended.
    LaserEnded,
    /// The number of available laser charges changed.
    ChargesChanged,
    /// A new game began.
    GameStarted,
    /// The game state machine moved between states.
    GameStateChanged,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 14] = [
        Self::TransformChanged,
        Self::PhysicsChanged,
        Self::EnemySpawned,
        Self::EnemyDestroyed,
        Self::BulletFired,
        Self::BulletExpired,
        Self::HealthChanged,
        Self::InvincibilityChanged,
        Self::PlayerDied,
        Self::LaserFired,
        Self::LaserEnded,
        Self::ChargesChanged,
        Self::GameStarted,
        Self::GameStateChanged,
    ];
}

/// A notification published on the [`EventBus`].
///
/// Payloads carry absolute state (never deltas) so consumers can treat each
/// event as authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// New absolute transform of an entity.
    TransformChanged {
        /// Owning entity
        entity: EntityId,
        /// Position after the change
        position: Vec2,
        /// Rotation in degrees after the change
        rotation: f32,
    },
    /// New velocity of an entity.
    PhysicsChanged {
        /// Owning entity
        entity: EntityId,
        /// Velocity after the change
        velocity: Vec2,
        /// Magnitude of `velocity`
        speed: f32,
    },
    /// An enemy was placed at its spawn position.
    EnemySpawned {
        /// The spawned enemy
        entity: EntityId,
        /// Its kind
        kind: EnemyKind,
        /// Spawn position
        position: Vec2,
    },
    /// An enemy was removed from play and returned to its pool.
    EnemyDestroyed {
        /// The removed enemy
        entity: EntityId,
        /// Its kind
        kind: EnemyKind,
    },
    /// A bullet was fired.
    BulletFired {
        /// The bullet
        entity: EntityId,
        /// Muzzle position
        position: Vec2,
        /// Unit travel direction
        direction: Vec2,
    },
    /// A bullet expired or hit something.
    BulletExpired {
        /// The bullet
        entity: EntityId,
    },
    /// Player health after damage or reset.
    HealthChanged {
        /// The damaged entity
        entity: EntityId,
        /// Remaining health
        health: u32,
        /// Maximum health
        max_health: u32,
    },
    /// Damage immunity toggled.
    InvincibilityChanged {
        /// The affected entity
        entity: EntityId,
        /// Whether immunity is now active
        active: bool,
    },
    /// Health reached zero. This is the game-over condition.
    PlayerDied {
        /// The dead entity
        entity: EntityId,
    },
    /// A laser beam started.
    LaserFired {
        /// The firing entity
        entity: EntityId,
        /// Beam origin
        origin: Vec2,
        /// Unit beam direction
        direction: Vec2,
        /// Beam length
        range: f32,
        /// Beam width
        width: f32,
    },
    /// A laser beam ended.
    LaserEnded {
        /// The firing entity
        entity: EntityId,
    },
    /// Available laser charges changed.
    ChargesChanged {
        /// The owning entity
        entity: EntityId,
        /// Charges available now
        charges: u32,
        /// Charge capacity
        max_charges: u32,
    },
    /// A game started.
    GameStarted,
    /// The game state machine transitioned.
    GameStateChanged {
        /// Previous state
        from: GameState,
        /// New state
        to: GameState,
    },
}

impl Event {
    /// Returns the subscription key for this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::TransformChanged { .. } => EventKind::TransformChanged,
            Self::PhysicsChanged { .. } => EventKind::PhysicsChanged,
            Self::EnemySpawned { .. } => EventKind::EnemySpawned,
            Self::EnemyDestroyed { .. } => EventKind::EnemyDestroyed,
            Self::BulletFired { .. } => EventKind::BulletFired,
            Self::BulletExpired { .. } => EventKind::BulletExpired,
            Self::HealthChanged { .. } => EventKind::HealthChanged,
            Self::InvincibilityChanged { .. } => EventKind::InvincibilityChanged,
            Self::PlayerDied { .. } => EventKind::PlayerDied,
            Self::LaserFired { .. } => EventKind::LaserFired,
            Self::LaserEnded { .. } => EventKind::LaserEnded,
            Self::ChargesChanged { .. } => EventKind::ChargesChanged,
            Self::GameStarted => EventKind::GameStarted,
            Self::GameStateChanged { .. } => EventKind::GameStateChanged,
        }
    }

    /// Returns the entity this event concerns, if any.
    #[must_use]
    pub const fn entity(&self) -> Option<EntityId> {
        match self {
            Self::TransformChanged { entity, .. }
            | Self::PhysicsChanged { entity, .. }
            | Self::EnemySpawned { entity, .. }
            | Self::EnemyDestroyed { entity, .. }
            | Self::BulletFired { entity, .. }
            | Self::BulletExpired { entity }
            | Self::HealthChanged { entity, .. }
            | Self::InvincibilityChanged { entity, .. }
            | Self::PlayerDied { entity }
            | Self::LaserFired { entity, .. }
            | Self::LaserEnded { entity }
            | Self::ChargesChanged { entity, .. } => Some(*entity),
            Self::GameStarted | Self::GameStateChanged { .. } => None,
        }
    }
}

// =============================================================================
// Event Bus
// =============================================================================

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler = Rc<dyn Fn(&Event)>;

/// Synchronous publish/subscribe channel keyed by [`EventKind`].
///
/// The bus lives as long as the simulation; subscribers attach and detach as
/// their owners come and go.
pub struct EventBus {
    handlers: RefCell<HashMap<EventKind, Vec<(SubscriptionId, Handler)>>>,
    next_id: Cell<u64>,
}

impl EventBus {
    /// Creates a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
        }
    }

    /// Subscribes `handler` to every future event of `kind`.
    ///
    /// Handlers for the same kind run in the order they subscribed.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers
            .borrow_mut()
            .entry(kind)
            .or_default()
            .push((id, Rc::new(handler)));
        id
    }

    /// Removes a subscription.
    ///
    /// Returns `false` (and does nothing) if `id` is not subscribed to `kind`.
    pub fn unsubscribe(&self, kind: EventKind, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let Some(list) = handlers.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(subscription, _)| *subscription != id);
        before != list.len()
    }

    /// Delivers `event` to every handler currently subscribed to its kind.
    pub fn publish(&self, event: Event) {
        let kind = event.kind();
        // Snapshot so handlers can touch the bus while we dispatch.
        let snapshot: Vec<Handler> = match self.handlers.borrow().get(&kind) {
            Some(list) if !list.is_empty() => list.iter().map(|(_, h)| Rc::clone(h)).collect(),
            _ => return,
        };
        trace!(?kind, handlers = snapshot.len(), "publish");
        for handler in snapshot {
            handler(&event);
        }
    }

    /// Number of handlers subscribed to `kind`.
    #[cfg(test)]
    pub(crate) fn subscriber_count(&self, kind: EventKind) -> usize {
        self.handlers.borrow().get(&kind).map_or(0, Vec::len)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.handlers.borrow();
        let mut kinds: Vec<(EventKind, usize)> =
            handlers.iter().map(|(kind, list)| (*kind, list.len())).collect();
        kinds.sort();
        f.debug_struct("EventBus")
            .field("subscriptions", &kinds)
            .field("next_id", &self.next_id.get())
            .finish()
    }
}

// =============================================================================
// Mailbox
// =============================================================================

/// Buffers events for an owner that reacts after the tick instead of inside it.
///
/// The simulation uses a mailbox to route the game-over condition to the
/// state machine once every entity has finished ticking.
#[derive(Debug, Clone, Default)]
pub struct Mailbox {
    inbox: Rc<RefCell<Vec<Event>>>,
    subscriptions: Vec<(EventKind, SubscriptionId)>,
}

impl Mailbox {
    /// Subscribes a buffering handler for each of `kinds`.
    #[must_use]
    pub fn attach(bus: &EventBus, kinds: &[EventKind]) -> Self {
        let inbox: Rc<RefCell<Vec<Event>>> = Rc::default();
        let subscriptions = kinds
            .iter()
            .map(|&kind| {
                let sink = Rc::clone(&inbox);
                let id = bus.subscribe(kind, move |event| sink.borrow_mut().push(event.clone()));
                (kind, id)
            })
            .collect();
        Self {
            inbox,
            subscriptions,
        }
    }

    /// Removes every subscription this mailbox holds. Buffered events remain.
    pub fn detach(&mut self, bus: &EventBus) {
        for (kind, id) in self.subscriptions.drain(..) {
            bus.unsubscribe(kind, id);
        }
    }

    /// Drains and returns every buffered event in arrival order.
    #[must_use]
    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.inbox.borrow_mut())
    }

    /// Number of buffered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inbox.borrow().len()
    }

    /// Returns true if nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inbox.borrow().is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
