//! Test helpers for setting up simulations and playing them like a host would.

use std::collections::BTreeSet;

use glam::Vec2;

use crate::arena::{Arena, Collision};
use crate::bus::{Event, EventBus, EventKind, Mailbox};
use crate::config::ArenaConfig;
use crate::entity::{Entity, EntityId};
use crate::input::InputState;
use crate::simulation::Simulation;

/// Fixed frame step used throughout the scenario tests.
pub const DT: f32 = 1.0 / 60.0;

/// Contact distance for the host-side collision query.
pub const CONTACT_RADIUS: f32 = 16.0;

// =============================================================================
// Setup
// =============================================================================

/// Installs a test-writer subscriber so `tracing` output lands in captured
/// test logs. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// The reference tuning, loaded the way a host would load it.
pub fn config() -> ArenaConfig {
    crate::config::fixture()
}

/// A simulation built from [`config`] that has not started yet.
pub fn new_sim(seed: u64) -> Simulation {
    init_tracing();
    Simulation::new(config(), seed).expect("reference config should be valid")
}

/// A simulation built from [`config`] with a game already running.
pub fn playing_sim(seed: u64) -> Simulation {
    let mut sim = new_sim(seed);
    assert!(sim.start_game());
    sim
}

/// Buffers every event published on `bus`.
pub fn record_all(bus: &EventBus) -> Mailbox {
    Mailbox::attach(bus, &EventKind::ALL)
}

/// Counts events of `kind` in `events`.
pub fn count(events: &[Event], kind: EventKind) -> usize {
    events.iter().filter(|event| event.kind() == kind).count()
}

// =============================================================================
// Host Simulation
// =============================================================================

/// Deterministic pseudo-player: thrusts, turns, fires bursts, and triggers the
/// laser now and then.
pub fn scripted_input(tick: u64) -> InputState {
    InputState {
        forward: if tick % 90 < 60 { 1.0 } else { 0.0 },
        rotation: if (tick / 45) % 2 == 0 { 0.5 } else { -0.5 },
        direction: None,
        fire_held: tick % 7 < 4,
        fire_pressed: tick % 150 == 10,
    }
}

/// Naive circle-overlap query over everything in the arena.
///
/// Each enemy is claimed by at most one bullet; unclaimed enemies touching
/// the player produce a player contact.
pub fn detect_collisions(arena: &Arena) -> Vec<Collision> {
    let spawner = arena.spawner();
    let enemies: Vec<(EntityId, Vec2)> = spawner
        .records()
        .filter_map(|record| {
            let position = spawner.entity(record.entity)?.position()?;
            Some((record.entity, position))
        })
        .collect();

    let mut claimed = BTreeSet::new();
    let mut hits = Vec::new();
    for bullet in arena.projectiles().ids() {
        let Some(at) = arena.projectiles().entity(bullet).and_then(Entity::position) else {
            continue;
        };
        let hit = enemies
            .iter()
            .find(|(enemy, position)| {
                !claimed.contains(enemy) && position.distance(at) < CONTACT_RADIUS
            });
        if let Some(&(enemy, _)) = hit {
            claimed.insert(enemy);
            hits.push(Collision::BulletHitEnemy { bullet, enemy });
        }
    }

    if let Some(player) = arena.player().position() {
        for &(enemy, position) in &enemies {
            if !claimed.contains(&enemy) && position.distance(player) < CONTACT_RADIUS {
                hits.push(Collision::PlayerHitEnemy { enemy });
            }
        }
    }
    hits
}

/// Steps `ticks` frames of [`scripted_input`], resolving detected contacts
/// after each frame.
pub fn run_scripted(sim: &mut Simulation, ticks: u64) {
    for _ in 0..ticks {
        let input = scripted_input(sim.tick());
        sim.step(DT, &input);
        for collision in detect_collisions(sim.arena()) {
            sim.resolve_collision(collision);
        }
    }
}

/// Steps `ticks` frames with no input.
pub fn run_idle(sim: &mut Simulation, ticks: u64) {
    for _ in 0..ticks {
        sim.step(DT, &InputState::IDLE);
    }
}
