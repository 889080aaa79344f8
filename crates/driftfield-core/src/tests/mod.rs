//! Cross-module tests driving a whole [`crate::Simulation`].
//!
//! - `determinism.rs`: Same seed and inputs replay the same event stream
//! - `integration.rs`: Game lifecycle, spawning, combat, and wrap end to end
//! - `helpers.rs`: Config loading, scripted input, and a host-side contact query

mod helpers;
mod integration;

pub use helpers::*;
