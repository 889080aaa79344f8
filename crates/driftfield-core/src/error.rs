//! Assembly-time error types.
//!
//! The kernel never fails mid-simulation: foreseeable bad states (releasing an
//! inactive pool entry, a missing component, a stale collision report) are
//! silent no-ops. Only wiring defects are reported, and only while the arena
//! is being assembled.

use thiserror::Error;

use crate::entity::{ComponentKind, EntityId};

/// A configuration record is missing a usable value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A numeric setting lies outside its accepted range.
    #[error("config field `{field}` must be {requirement}, got {value}")]
    OutOfRange {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human-readable description of the accepted range.
        requirement: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// No enemy kind has a positive spawn weight.
    #[error("spawn weights must sum to a positive value, got {total}")]
    NoSpawnWeight {
        /// Sum of all configured weights.
        total: f32,
    },
}

/// An entity was assembled without a component another component depends on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    /// A component's required collaborator is absent from its entity.
    #[error("{component} on entity {entity} requires a {requires} component")]
    MissingCollaborator {
        /// The entity being assembled.
        entity: EntityId,
        /// The component whose dependency is missing.
        component: ComponentKind,
        /// The missing dependency.
        requires: ComponentKind,
    },
}

/// Any failure raised while constructing a [`Simulation`](crate::simulation::Simulation).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArenaError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Entity wiring defect.
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}
