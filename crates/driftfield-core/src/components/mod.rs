//! Components: the units of state and behavior an [`Entity`] is built from.
//!
//! Every concrete component is a plain struct in its own module. [`Component`]
//! is the closed set stored in an entity's registry; [`ComponentType`] maps a
//! concrete struct back to its variant for typed lookups.
//!
//! # Tick order
//!
//! Components tick in registration order. Role constructors register
//! movement before physics and physics before wrap, so steering feeds the
//! integrator and the integrator's result is corrected in the same tick.

mod health;
mod laser;
mod lifetime;
mod movement;
mod physics;
mod transform;
mod weapon;
mod wrap;

pub use health::{DamageOutcome, Health};
pub use laser::{Laser, LaserBeam};
pub use lifetime::Lifetime;
pub use movement::{LinearMovement, PlayerMovement, PursuitMovement};
pub use physics::Physics;
pub use transform::Transform;
pub use weapon::Weapon;
pub use wrap::{wrap_position, BoundaryWrap};

use crate::context::TickContext;
use crate::entity::{ComponentCaps, ComponentKind, Entity, EntityId};
use crate::error::AssemblyError;

/// Any component an entity can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    /// See [`Transform`]
    Transform(Transform),
    /// See [`Physics`]
    Physics(Physics),
    /// See [`BoundaryWrap`]
    BoundaryWrap(BoundaryWrap),
    /// See [`PlayerMovement`]
    PlayerMovement(PlayerMovement),
    /// See [`PursuitMovement`]
    PursuitMovement(PursuitMovement),
    /// See [`LinearMovement`]
    LinearMovement(LinearMovement),
    /// See [`Health`]
    Health(Health),
    /// See [`Weapon`]
    Weapon(Weapon),
    /// See [`Laser`]
    Laser(Laser),
    /// See [`Lifetime`]
    Lifetime(Lifetime),
}

/// A concrete component type with a fixed registry slot.
pub trait ComponentType: Sized {
    /// The slot this type occupies.
    const KIND: ComponentKind;

    /// Downcasts a stored component.
    fn from_ref(component: &Component) -> Option<&Self>;

    /// Downcasts a stored component mutably.
    fn from_mut(component: &mut Component) -> Option<&mut Self>;
}

macro_rules! component_types {
    ($($variant:ident),* $(,)?) => {
        $(
            impl ComponentType for $variant {
                const KIND: ComponentKind = ComponentKind::$variant;

                fn from_ref(component: &Component) -> Option<&Self> {
                    match component {
                        Component::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }

                fn from_mut(component: &mut Component) -> Option<&mut Self> {
                    match component {
                        Component::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }

            impl From<$variant> for Component {
                fn from(component: $variant) -> Self {
                    Self::$variant(component)
                }
            }
        )*

        impl Component {
            /// Registry slot of this component.
            #[must_use]
            pub const fn kind(&self) -> ComponentKind {
                match self {
                    $(Self::$variant(_) => ComponentKind::$variant,)*
                }
            }
        }
    };
}

component_types!(
    Transform,
    Physics,
    BoundaryWrap,
    PlayerMovement,
    PursuitMovement,
    LinearMovement,
    Health,
    Weapon,
    Laser,
    Lifetime,
);

impl Component {
    /// Capabilities of this component.
    #[must_use]
    pub const fn caps(&self) -> ComponentCaps {
        self.kind().caps()
    }

    /// Records the entity this component publishes events for.
    pub(crate) fn bind(&mut self, owner: EntityId) {
        match self {
            Self::Transform(transform) => transform.bind(owner),
            Self::Physics(physics) => physics.bind(owner),
            Self::Health(health) => health.bind(owner),
            Self::Laser(laser) => laser.bind(owner),
            Self::BoundaryWrap(_)
            | Self::PlayerMovement(_)
            | Self::PursuitMovement(_)
            | Self::LinearMovement(_)
            | Self::Weapon(_)
            | Self::Lifetime(_) => {}
        }
    }

    /// Advances this component by one tick.
    ///
    /// `entity` is the owning entity with this component lifted out of it.
    pub fn tick(&mut self, entity: &mut Entity, ctx: &mut TickContext<'_>) {
        match self {
            Self::Transform(_) => {}
            Self::Physics(physics) => physics.tick(entity, ctx),
            Self::BoundaryWrap(wrap) => wrap.tick(entity, ctx),
            Self::PlayerMovement(movement) => movement.tick(entity, ctx),
            Self::PursuitMovement(movement) => movement.tick(entity, ctx),
            Self::LinearMovement(movement) => movement.tick(entity, ctx),
            Self::Health(health) => health.tick(ctx),
            Self::Weapon(weapon) => weapon.tick(entity, ctx),
            Self::Laser(laser) => laser.tick(entity, ctx),
            Self::Lifetime(lifetime) => lifetime.tick(entity, ctx),
        }
    }

    /// Verifies the collaborators this component reads through `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::MissingCollaborator`] for the first absent
    /// dependency.
    pub fn initialize(&self, entity: &Entity) -> Result<(), AssemblyError> {
        let kind = self.kind();
        let requires: &[ComponentKind] = match self {
            Self::Physics(_) | Self::BoundaryWrap(_) | Self::Weapon(_) | Self::Laser(_) => {
                &[ComponentKind::Transform]
            }
            Self::PlayerMovement(_) | Self::PursuitMovement(_) => {
                &[ComponentKind::Transform, ComponentKind::Physics]
            }
            Self::LinearMovement(_) => &[ComponentKind::Physics],
            Self::Transform(_) | Self::Health(_) | Self::Lifetime(_) => &[],
        };
        requires
            .iter()
            .try_for_each(|&required| entity.require(kind, required))
    }
}
