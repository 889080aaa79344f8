//! Entity module: identities and the per-entity component registry.
//!
//! This module provides the composition container every other subsystem
//! builds on:
//! - [`EntityId`]: Unique identifier for entities
//! - [`EntityTag`]: Role classification (player, enemy, projectile)
//! - [`ComponentKind`]: Registry key, one slot per kind
//! - [`Entity`]: The registry itself
//!
//! # Architecture
//!
//! An entity holds at most one component per [`ComponentKind`] in a fixed
//! array indexed by the kind's discriminant, plus the order in which kinds
//! were registered. Entities have no behavior of their own: [`Entity::tick`]
//! drives each tickable component in registration order, lending it the rest
//! of the entity so it can reach its collaborators by kind.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use driftfield_core::components::{Physics, Transform};
//! use driftfield_core::entity::{ComponentKind, Entity, EntityId, EntityTag};
//!
//! let mut entity = Entity::new(EntityId::new(42), EntityTag::Enemy);
//! entity.add(Transform::new(Vec2::ZERO, 0.0));
//! entity.add(Physics::new(1.0, 1.0));
//!
//! assert!(entity.has(ComponentKind::Physics));
//! assert_eq!(entity.all().count(), 2);
//! ```

mod builder;
pub mod roles;

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::bus::EventBus;
use crate::components::{BoundaryWrap, Component, ComponentType, Physics, Transform};
use crate::context::TickContext;
use crate::error::AssemblyError;

pub use builder::EntityBuilder;

// =============================================================================
// Identity
// =============================================================================

/// Unique identifier for an entity.
///
/// `EntityId` is a newtype wrapper around `u64`. Identifiers are handed out
/// by an [`EntityIdAllocator`] and are never reused within one simulation.
///
/// # Example
///
/// ```
/// use driftfield_core::entity::EntityId;
///
/// let id1 = EntityId::new(1);
/// let id2 = EntityId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Placeholder carried by prototypes that have not been given an identity.
    pub const UNASSIGNED: Self = Self(u64::MAX);

    /// Creates a new `EntityId` from a raw `u64` value.
    ///
    /// # Arguments
    ///
    /// * `id` - The raw identifier value
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Monotonic source of [`EntityId`]s.
///
/// Clones share one counter, so pool factories can hold their own handle.
#[derive(Debug, Clone, Default)]
pub struct EntityIdAllocator {
    next: Rc<Cell<u64>>,
}

impl EntityIdAllocator {
    /// Creates an allocator whose first id is `EntityId(0)`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next unused id.
    pub fn allocate(&self) -> EntityId {
        let id = self.next.get();
        self.next.set(id + 1);
        EntityId(id)
    }

    /// Number of ids handed out so far.
    #[must_use]
    pub fn allocated(&self) -> u64 {
        self.next.get()
    }
}

/// Role an entity plays in the arena.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    /// The player-controlled craft
    Player,
    /// Any hostile
    Enemy,
    /// A bullet in flight
    Projectile,
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "Player"),
            Self::Enemy => write!(f, "Enemy"),
            Self::Projectile => write!(f, "Projectile"),
        }
    }
}

// =============================================================================
// Component keys
// =============================================================================

bitflags! {
    /// What the registry may do with a component.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ComponentCaps: u8 {
        /// Plain state, read and written by others
        const PASSIVE = 1 << 0;
        /// Driven once per tick by [`Entity::tick`]
        const TICKABLE = 1 << 1;
        /// Checked by [`Entity::initialize`] once the entity is assembled
        const INITIALIZABLE = 1 << 2;
    }
}

/// Registry key. Each entity holds at most one component per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Position and rotation
    Transform,
    /// Velocity integration
    Physics,
    /// Toroidal edge correction
    BoundaryWrap,
    /// Input-driven thrust and steering
    PlayerMovement,
    /// Chases a target
    PursuitMovement,
    /// Constant heading
    LinearMovement,
    /// Damage and immunity
    Health,
    /// Rate-limited bullet gun
    Weapon,
    /// Charge-based beam
    Laser,
    /// Self-expiry
    Lifetime,
}

impl ComponentKind {
    /// Number of kinds, and so the registry's slot count.
    pub const COUNT: usize = 10;

    /// Slot index of this kind.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Capabilities every component of this kind has.
    #[must_use]
    pub const fn caps(self) -> ComponentCaps {
        match self {
            Self::Transform => ComponentCaps::PASSIVE,
            Self::Health | Self::Lifetime => ComponentCaps::TICKABLE,
            Self::Physics
            | Self::BoundaryWrap
            | Self::PlayerMovement
            | Self::PursuitMovement
            | Self::LinearMovement
            | Self::Weapon
            | Self::Laser => ComponentCaps::TICKABLE.union(ComponentCaps::INITIALIZABLE),
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// =============================================================================
// Entity
// =============================================================================

/// A composition container: an identity plus one optional component per kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    id: EntityId,
    tag: EntityTag,
    slots: [Option<Component>; ComponentKind::COUNT],
    order: Vec<ComponentKind>,
}

impl Entity {
    /// Creates an entity with no components.
    ///
    /// # Arguments
    ///
    /// * `id` - Unique identifier for this entity
    /// * `tag` - Role in the arena
    #[must_use]
    pub fn new(id: EntityId, tag: EntityTag) -> Self {
        Self {
            id,
            tag,
            slots: std::array::from_fn(|_| None),
            order: Vec::new(),
        }
    }

    /// Returns the entity's unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's role.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        self.tag
    }

    /// Registers `component`, replacing any existing component of its kind.
    ///
    /// A replacement keeps the kind's original position in registration
    /// order. Returns the replaced component.
    pub fn add(&mut self, component: impl Into<Component>) -> Option<Component> {
        let mut component = component.into();
        component.bind(self.id);
        let kind = component.kind();
        let previous = self.slots[kind.index()].replace(component);
        if !self.order.contains(&kind) {
            self.order.push(kind);
        }
        previous
    }

    /// Component registered under `kind`.
    #[must_use]
    pub fn get(&self, kind: ComponentKind) -> Option<&Component> {
        self.slots[kind.index()].as_ref()
    }

    /// Mutable component registered under `kind`.
    pub fn get_mut(&mut self, kind: ComponentKind) -> Option<&mut Component> {
        self.slots[kind.index()].as_mut()
    }

    /// Returns true if a component of `kind` is registered.
    #[must_use]
    pub fn has(&self, kind: ComponentKind) -> bool {
        self.slots[kind.index()].is_some()
    }

    /// Unregisters and returns the component of `kind`.
    pub fn remove(&mut self, kind: ComponentKind) -> Option<Component> {
        self.order.retain(|registered| *registered != kind);
        self.slots[kind.index()].take()
    }

    /// Every component, in registration order.
    pub fn all(&self) -> impl Iterator<Item = &Component> + '_ {
        self.order
            .iter()
            .filter_map(|kind| self.slots[kind.index()].as_ref())
    }

    /// Every tickable component, in registration order.
    ///
    /// The iterator is built fresh on each call, so components added since
    /// the previous call are included.
    pub fn all_tickable(&self) -> impl Iterator<Item = &Component> + '_ {
        self.all()
            .filter(|component| component.caps().contains(ComponentCaps::TICKABLE))
    }

    /// Typed lookup.
    #[must_use]
    pub fn component<T: ComponentType>(&self) -> Option<&T> {
        self.get(T::KIND).and_then(T::from_ref)
    }

    /// Typed mutable lookup.
    pub fn component_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        self.get_mut(T::KIND).and_then(T::from_mut)
    }

    /// Ticks every tickable component once, in registration order.
    ///
    /// Each component is lifted out of its slot while it runs so it can
    /// borrow the rest of the entity mutably. A component that removes or
    /// replaces itself during its own tick stays removed or replaced.
    pub fn tick(&mut self, ctx: &mut TickContext<'_>) {
        let kinds: Vec<ComponentKind> = self.all_tickable().map(Component::kind).collect();
        for kind in kinds {
            let Some(mut component) = self.slots[kind.index()].take() else {
                continue;
            };
            component.tick(self, ctx);
            let slot = &mut self.slots[kind.index()];
            if slot.is_none() && self.order.contains(&kind) {
                *slot = Some(component);
            }
        }
    }

    /// Checks every initializable component's collaborators.
    ///
    /// # Errors
    ///
    /// Returns the first missing collaborator found, in registration order.
    pub fn initialize(&self) -> Result<(), AssemblyError> {
        self.all()
            .filter(|component| component.caps().contains(ComponentCaps::INITIALIZABLE))
            .try_for_each(|component| component.initialize(self))
    }

    /// Fails unless a component of `requires` is registered.
    ///
    /// # Errors
    ///
    /// [`AssemblyError::MissingCollaborator`] naming `component` as the
    /// dependent.
    pub fn require(
        &self,
        component: ComponentKind,
        requires: ComponentKind,
    ) -> Result<(), AssemblyError> {
        if self.has(requires) {
            Ok(())
        } else {
            Err(AssemblyError::MissingCollaborator {
                entity: self.id,
                component,
                requires,
            })
        }
    }

    /// Copies this entity under a new identity.
    ///
    /// Components that publish events are rebound to `id`.
    #[must_use]
    pub fn clone_as(&self, id: EntityId) -> Self {
        let mut entity = self.clone();
        entity.id = id;
        for component in entity.slots.iter_mut().flatten() {
            component.bind(id);
        }
        entity
    }

    /// Moves the entity to a fresh position and disarms wrapping until it
    /// enters the play field again.
    pub fn place_at(&mut self, position: Vec2, bus: &EventBus) {
        if let Some(transform) = self.component_mut::<Transform>() {
            transform.set_position(position, bus);
        }
        if let Some(wrap) = self.component_mut::<BoundaryWrap>() {
            wrap.reset();
        }
    }

    /// Current position, if the entity has a transform.
    #[must_use]
    pub fn position(&self) -> Option<Vec2> {
        self.component::<Transform>().map(Transform::position)
    }

    /// Current velocity, if the entity has a physics body.
    #[must_use]
    pub fn velocity(&self) -> Option<Vec2> {
        self.component::<Physics>().map(Physics::velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Health, LinearMovement, Physics};

    mod entity_id_tests {
        use super::*;

        #[test]
        fn new_creates_id_with_value() {
            let id = EntityId::new(42);
            assert_eq!(id.as_u64(), 42);
        }

        #[test]
        fn ordering() {
            let mut ids = vec![EntityId::new(3), EntityId::new(1), EntityId::new(2)];
            ids.sort();
            assert_eq!(ids, vec![EntityId::new(1), EntityId::new(2), EntityId::new(3)]);
        }

        #[test]
        fn debug_format() {
            assert_eq!(format!("{:?}", EntityId::new(42)), "EntityId(42)");
        }

        #[test]
        fn display_format() {
            assert_eq!(format!("{}", EntityId::new(42)), "42");
        }

        #[test]
        fn u64_conversions() {
            let id: EntityId = 42u64.into();
            let raw: u64 = id.into();
            assert_eq!(raw, 42);
        }

        #[test]
        fn allocator_is_monotonic_and_shared() {
            let ids = EntityIdAllocator::new();
            let shared = ids.clone();

            assert_eq!(ids.allocate(), EntityId::new(0));
            assert_eq!(shared.allocate(), EntityId::new(1));
            assert_eq!(ids.allocate(), EntityId::new(2));
            assert_eq!(shared.allocated(), 3);
        }
    }

    mod component_kind_tests {
        use super::*;

        #[test]
        fn indices_are_dense() {
            assert_eq!(ComponentKind::Transform.index(), 0);
            assert_eq!(ComponentKind::Lifetime.index(), ComponentKind::COUNT - 1);
        }

        #[test]
        fn transform_is_passive() {
            let caps = ComponentKind::Transform.caps();
            assert!(caps.contains(ComponentCaps::PASSIVE));
            assert!(!caps.contains(ComponentCaps::TICKABLE));
        }

        #[test]
        fn physics_is_tickable_and_initializable() {
            let caps = ComponentKind::Physics.caps();
            assert!(caps.contains(ComponentCaps::TICKABLE | ComponentCaps::INITIALIZABLE));
        }

        #[test]
        fn display_is_variant_name() {
            assert_eq!(ComponentKind::BoundaryWrap.to_string(), "BoundaryWrap");
        }
    }

    mod registry_tests {
        use super::*;

        fn entity() -> Entity {
            Entity::new(EntityId::new(1), EntityTag::Enemy)
        }

        #[test]
        fn get_after_add_returns_instance() {
            let mut entity = entity();
            entity.add(Transform::new(Vec2::new(3.0, 4.0), 90.0));

            let transform = entity.component::<Transform>().unwrap();
            assert_eq!(transform.position(), Vec2::new(3.0, 4.0));
            assert_eq!(transform.rotation(), 90.0);
            assert!(entity.has(ComponentKind::Transform));
        }

        #[test]
        fn second_add_replaces() {
            let mut entity = entity();
            assert!(entity.add(Physics::new(1.0, 1.0)).is_none());
            let replaced = entity.add(Physics::new(5.0, 0.5));

            assert!(replaced.is_some());
            assert_eq!(entity.all().count(), 1);
            assert_eq!(entity.component::<Physics>().unwrap().mass(), 5.0);
        }

        #[test]
        fn replacement_keeps_registration_position() {
            let mut entity = entity();
            entity.add(Transform::default());
            entity.add(Physics::new(1.0, 1.0));
            entity.add(Transform::new(Vec2::ONE, 0.0));

            let kinds: Vec<_> = entity.all().map(Component::kind).collect();
            assert_eq!(kinds, vec![ComponentKind::Transform, ComponentKind::Physics]);
        }

        #[test]
        fn missing_lookup_is_none() {
            let entity = entity();
            assert!(entity.get(ComponentKind::Health).is_none());
            assert!(entity.component::<Health>().is_none());
            assert!(!entity.has(ComponentKind::Health));
        }

        #[test]
        fn remove_unregisters() {
            let mut entity = entity();
            entity.add(Transform::default());
            entity.add(Physics::new(1.0, 1.0));

            assert!(entity.remove(ComponentKind::Transform).is_some());
            assert!(entity.remove(ComponentKind::Transform).is_none());
            assert_eq!(entity.all().count(), 1);
        }

        #[test]
        fn all_tickable_skips_passive_and_sees_late_additions() {
            let mut entity = entity();
            entity.add(Transform::default());
            entity.add(Physics::new(1.0, 1.0));
            assert_eq!(entity.all_tickable().count(), 1);

            entity.add(LinearMovement::new(Vec2::X, 10.0));
            let kinds: Vec<_> = entity.all_tickable().map(Component::kind).collect();
            assert_eq!(kinds, vec![ComponentKind::Physics, ComponentKind::LinearMovement]);
        }

        #[test]
        fn add_binds_owner() {
            let mut entity = Entity::new(EntityId::new(9), EntityTag::Enemy);
            entity.add(Transform::default());
            assert_eq!(entity.component::<Transform>().unwrap().owner(), EntityId::new(9));
        }

        #[test]
        fn clone_as_rebinds_owner() {
            let mut prototype = Entity::new(EntityId::UNASSIGNED, EntityTag::Enemy);
            prototype.add(Transform::default());

            let copy = prototype.clone_as(EntityId::new(5));
            assert_eq!(copy.id(), EntityId::new(5));
            assert_eq!(copy.component::<Transform>().unwrap().owner(), EntityId::new(5));
        }
    }

    mod assembly_tests {
        use super::*;

        #[test]
        fn physics_without_transform_fails() {
            let mut entity = Entity::new(EntityId::new(3), EntityTag::Enemy);
            entity.add(Physics::new(1.0, 1.0));

            assert_eq!(
                entity.initialize(),
                Err(AssemblyError::MissingCollaborator {
                    entity: EntityId::new(3),
                    component: ComponentKind::Physics,
                    requires: ComponentKind::Transform,
                })
            );
        }

        #[test]
        fn complete_entity_initializes() {
            let mut entity = Entity::new(EntityId::new(3), EntityTag::Enemy);
            entity.add(Transform::default());
            entity.add(Physics::new(1.0, 1.0));
            entity.add(LinearMovement::new(Vec2::X, 1.0));
            assert_eq!(entity.initialize(), Ok(()));
        }
    }
}
