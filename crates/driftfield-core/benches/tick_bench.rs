use criterion::{black_box, criterion_group, criterion_main, Criterion};
use driftfield_core::bus::{EventBus, EventKind};
use driftfield_core::config::ArenaConfig;
use driftfield_core::input::InputState;
use driftfield_core::spawner::EnemyKind;
use driftfield_core::{Event, Simulation};
use glam::Vec2;

fn config() -> ArenaConfig {
    serde_json::from_str(include_str!("../tests/arena.json")).expect("bench config should parse")
}

/// A running game with a full field of enemies.
fn crowded_sim() -> Simulation {
    let mut sim = Simulation::new(config(), 1).expect("bench config should be valid");
    sim.start_game();
    for i in 0..20 {
        let angle = (i as f32 / 20.0) * std::f32::consts::TAU;
        let kind = if i % 3 == 0 {
            EnemyKind::Pursuer
        } else {
            EnemyKind::Asteroid
        };
        sim.spawn_enemy(kind, Vec2::from_angle(angle) * 250.0, -Vec2::from_angle(angle));
    }
    sim
}

fn bench_step_idle(c: &mut Criterion) {
    let mut sim = crowded_sim();

    c.bench_function("step_idle", |b| {
        b.iter(|| {
            sim.step(black_box(1.0 / 60.0), &InputState::IDLE);
        })
    });
}

fn bench_step_firing(c: &mut Criterion) {
    // Held trigger keeps the bullet pool cycling
    let mut sim = crowded_sim();
    let input = InputState {
        forward: 1.0,
        rotation: 0.3,
        fire_held: true,
        ..InputState::IDLE
    };

    c.bench_function("step_firing", |b| {
        b.iter(|| {
            sim.step(black_box(1.0 / 60.0), &input);
        })
    });
}

fn bench_publish(c: &mut Criterion) {
    let bus = EventBus::new();
    for _ in 0..4 {
        bus.subscribe(EventKind::GameStarted, |event| {
            black_box(event);
        });
    }

    c.bench_function("publish_four_subscribers", |b| {
        b.iter(|| bus.publish(black_box(Event::GameStarted)))
    });
}

criterion_group!(benches, bench_step_idle, bench_step_firing, bench_publish);
criterion_main!(benches);
