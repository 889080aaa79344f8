//! End-to-end tests of the simulation pipeline.
//!
//! These drive a [`Simulation`] the way a host does: step with input, query
//! geometry, report contacts, and watch the bus.

use glam::Vec2;

use crate::arena::Collision;
use crate::bus::{Event, EventKind};
use crate::components::{Health, PlayerMovement};
use crate::game::GameState;
use crate::input::InputState;
use crate::simulation::Simulation;
use crate::spawner::EnemyKind;

use super::helpers::{
    count, detect_collisions, new_sim, playing_sim, record_all, run_idle, run_scripted, DT,
};

fn health(sim: &Simulation) -> u32 {
    sim.arena()
        .player()
        .component::<Health>()
        .map_or(0, Health::current)
}

/// Lands three contacts, waiting out the immunity window between them.
fn kill_player(sim: &mut Simulation) {
    for hit in 0..3 {
        let enemy = sim
            .spawn_enemy(EnemyKind::Pursuer, Vec2::new(5.0, 0.0), Vec2::ZERO)
            .unwrap();
        assert!(sim.resolve_collision(Collision::PlayerHitEnemy { enemy }));
        if hit < 2 {
            run_idle(sim, 70);
        }
    }
}

// =============================================================================
// Game Lifecycle
// =============================================================================

mod lifecycle_tests {
    use super::*;

    #[test]
    fn start_game_twice_starts_once() {
        let mut sim = new_sim(1);
        let mailbox = record_all(sim.bus());

        assert!(sim.start_game());
        assert!(!sim.start_game());

        let events = mailbox.take();
        assert_eq!(count(&events, EventKind::GameStarted), 1);
        assert_eq!(count(&events, EventKind::GameStateChanged), 1);
        assert_eq!(sim.state(), GameState::Playing);
    }

    #[test]
    fn three_contacts_end_the_game() {
        let mut sim = playing_sim(7);
        let mailbox = record_all(sim.bus());

        kill_player(&mut sim);

        assert_eq!(sim.state(), GameState::GameOver);
        assert_eq!(health(&sim), 0);
        assert!(!sim.arena().spawner().is_enabled());
        let movement = sim.arena().player().component::<PlayerMovement>().unwrap();
        assert!(!movement.control_enabled());

        let events = mailbox.take();
        let healths: Vec<u32> = events
            .iter()
            .filter_map(|event| match event {
                Event::HealthChanged { health, .. } => Some(*health),
                _ => None,
            })
            .collect();
        assert_eq!(healths, vec![2, 1, 0]);
        assert_eq!(count(&events, EventKind::PlayerDied), 1);
        assert!(events.contains(&Event::GameStateChanged {
            from: GameState::Playing,
            to: GameState::GameOver,
        }));
    }

    #[test]
    fn field_freezes_after_game_over() {
        let mut sim = playing_sim(7);
        sim.spawn_enemy(EnemyKind::Asteroid, Vec2::new(-200.0, 100.0), Vec2::X);
        kill_player(&mut sim);

        let spawner = sim.arena().spawner();
        let before: Vec<_> = spawner
            .records()
            .map(|record| spawner.entity(record.entity).and_then(|e| e.position()))
            .collect();
        let active = spawner.active_count();

        run_idle(&mut sim, 120);

        let spawner = sim.arena().spawner();
        let after: Vec<_> = spawner
            .records()
            .map(|record| spawner.entity(record.entity).and_then(|e| e.position()))
            .collect();
        assert_eq!(spawner.active_count(), active);
        assert_eq!(before, after);
        assert!(spawner.records().all(|record| {
            spawner.entity(record.entity).and_then(|e| e.velocity()) == Some(Vec2::ZERO)
        }));
    }

    #[test]
    fn restart_clears_the_field_and_restores_the_player() {
        let mut sim = playing_sim(9);
        sim.spawn_enemy(EnemyKind::Asteroid, Vec2::new(-200.0, 100.0), Vec2::X);
        kill_player(&mut sim);
        let lingering = sim.arena().spawner().active_count();
        assert!(lingering > 0);
        let mailbox = record_all(sim.bus());

        assert!(sim.start_game());

        let events = mailbox.take();
        assert_eq!(count(&events, EventKind::EnemyDestroyed), lingering);
        assert_eq!(sim.arena().spawner().active_count(), 0);
        assert!(sim.arena().spawner().is_enabled());
        assert_eq!(health(&sim), 3);
        assert_eq!(sim.arena().player().position(), Some(Vec2::ZERO));
        assert_eq!(sim.state(), GameState::Playing);
    }
}

// =============================================================================
// Spawning and Movement
// =============================================================================

mod field_tests {
    use super::*;

    #[test]
    fn spawner_follows_the_interval() {
        let mut sim = playing_sim(3);
        let mailbox = record_all(sim.bus());

        run_idle(&mut sim, 95);

        let events = mailbox.take();
        assert_eq!(count(&events, EventKind::EnemySpawned), 1);
        assert_eq!(sim.arena().spawner().active_count(), 1);
    }

    #[test]
    fn spawned_enemies_start_outside_the_field() {
        let mut sim = playing_sim(5);
        let mailbox = record_all(sim.bus());

        run_idle(&mut sim, 600);

        let bounds = sim.arena().bounds();
        let spawns: Vec<Vec2> = mailbox
            .take()
            .iter()
            .filter_map(|event| match event {
                Event::EnemySpawned { position, .. } => Some(*position),
                _ => None,
            })
            .collect();
        assert!(!spawns.is_empty());
        assert!(spawns.iter().all(|position| !bounds.contains(*position)));
    }

    #[test]
    fn pursuers_close_on_the_player() {
        let mut sim = playing_sim(1);
        let enemy = sim
            .spawn_enemy(EnemyKind::Pursuer, Vec2::new(200.0, 0.0), Vec2::ZERO)
            .unwrap();

        run_idle(&mut sim, 60);

        let position = sim
            .arena()
            .spawner()
            .entity(enemy)
            .and_then(|e| e.position())
            .unwrap();
        assert!(position.length() < 150.0);
    }

    #[test]
    fn player_wraps_across_the_edge() {
        let mut sim = playing_sim(1);
        let thrust = InputState {
            forward: 1.0,
            ..InputState::IDLE
        };
        let bounds = sim.arena().bounds();

        let mut wrapped = false;
        let mut previous = 0.0;
        for _ in 0..600 {
            sim.step(DT, &thrust);
            let position = sim.arena().player().position().unwrap();
            assert!(bounds.contains(position), "{position} escaped {bounds:?}");
            wrapped |= position.x < previous;
            previous = position.x;
        }
        assert!(wrapped);
    }
}

// =============================================================================
// Combat
// =============================================================================

mod combat_tests {
    use super::*;

    #[test]
    fn bullet_splits_an_asteroid() {
        let mut sim = playing_sim(2);
        let asteroid = sim
            .spawn_enemy(EnemyKind::Asteroid, Vec2::new(100.0, 0.0), -Vec2::X)
            .unwrap();
        let fire = InputState {
            fire_held: true,
            ..InputState::IDLE
        };

        for _ in 0..60 {
            sim.step(DT, &fire);
            for collision in detect_collisions(sim.arena()) {
                sim.resolve_collision(collision);
            }
            if !sim.arena().spawner().is_active(asteroid) {
                break;
            }
        }

        assert!(!sim.arena().spawner().is_active(asteroid));
        assert_eq!(sim.arena().spawner().count_of(EnemyKind::Fragment), 2);
    }

    #[test]
    fn laser_fires_and_ends() {
        let mut sim = playing_sim(4);
        let mailbox = record_all(sim.bus());
        let press = InputState {
            fire_pressed: true,
            ..InputState::IDLE
        };

        sim.step(DT, &press);
        assert!(sim.arena().laser_beam().is_some());

        run_idle(&mut sim, 40);
        assert!(sim.arena().laser_beam().is_none());

        let events = mailbox.take();
        assert_eq!(count(&events, EventKind::LaserFired), 1);
        assert_eq!(count(&events, EventKind::LaserEnded), 1);
        assert!(events.contains(&Event::ChargesChanged {
            entity: sim.arena().player().id(),
            charges: 2,
            max_charges: 3,
        }));
    }

    #[test]
    fn pooled_bookkeeping_balances_under_play() {
        let mut sim = playing_sim(11);
        let mailbox = record_all(sim.bus());

        run_scripted(&mut sim, 900);

        let events = mailbox.take();
        let fired = count(&events, EventKind::BulletFired);
        let expired = count(&events, EventKind::BulletExpired);
        assert!(fired > 0);
        assert_eq!(fired, expired + sim.arena().projectiles().active_count());

        let spawned = count(&events, EventKind::EnemySpawned);
        let destroyed = count(&events, EventKind::EnemyDestroyed);
        assert_eq!(spawned, destroyed + sim.arena().spawner().active_count());
    }
}
