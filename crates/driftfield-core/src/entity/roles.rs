//! Component sets for each role in the arena.
//!
//! Every role registers its steering component first, then [`Physics`], then
//! [`BoundaryWrap`], which fixes the per-entity tick order.

use glam::Vec2;

use crate::components::{
    BoundaryWrap, Health, Laser, Lifetime, LinearMovement, Physics, PlayerMovement,
    PursuitMovement, Transform, Weapon,
};
use crate::config::{ArenaConfig, EnemyConfig, WeaponConfig};
use crate::error::AssemblyError;
use crate::spawner::EnemyKind;

use super::{Entity, EntityBuilder, EntityId, EntityTag};

/// Builds the player craft at the origin.
///
/// # Errors
///
/// Propagates [`AssemblyError`] from [`EntityBuilder::build`].
pub fn player_ship(id: EntityId, config: &ArenaConfig) -> Result<Entity, AssemblyError> {
    let movement = &config.movement;
    let health = &config.health;
    let laser = &config.laser;
    EntityBuilder::new(id, EntityTag::Player)
        .with(Transform::new(Vec2::ZERO, 0.0))
        .with(PlayerMovement::new(
            movement.acceleration,
            movement.max_speed,
            movement.rotation_speed,
        ))
        .with(Physics::new(movement.mass, movement.friction))
        .with(BoundaryWrap::new())
        .with(Health::new(
            health.max_health,
            health.invincibility_duration,
            health.bounce_force,
        ))
        .with(Weapon::new(config.weapon.fire_rate))
        .with(Laser::new(
            laser.max_charges,
            laser.recharge_time,
            laser.duration,
            laser.width,
            laser.range,
        ))
        .build()
}

/// Builds a hostile of `kind` with no heading.
///
/// Asteroids and fragments fly straight; pursuers chase the tick's target.
/// All hostiles are kinematic.
///
/// # Errors
///
/// Propagates [`AssemblyError`] from [`EntityBuilder::build`].
pub fn enemy(id: EntityId, kind: EnemyKind, config: &EnemyConfig) -> Result<Entity, AssemblyError> {
    let builder = EntityBuilder::new(id, EntityTag::Enemy).with(Transform::default());
    let builder = match kind {
        EnemyKind::Asteroid => builder.with(LinearMovement::new(Vec2::ZERO, config.asteroid_speed)),
        EnemyKind::Fragment => builder.with(LinearMovement::new(Vec2::ZERO, config.fragment_speed)),
        EnemyKind::Pursuer => builder.with(PursuitMovement::new(config.pursuer_speed)),
    };
    builder
        .with(Physics::kinematic())
        .with(BoundaryWrap::new())
        .build()
}

/// Builds a bullet with no heading.
///
/// # Errors
///
/// Propagates [`AssemblyError`] from [`EntityBuilder::build`].
pub fn bullet(id: EntityId, config: &WeaponConfig) -> Result<Entity, AssemblyError> {
    EntityBuilder::new(id, EntityTag::Projectile)
        .with(Transform::default())
        .with(LinearMovement::new(Vec2::ZERO, config.bullet_speed))
        .with(Physics::kinematic())
        .with(BoundaryWrap::new())
        .with(Lifetime::new(config.bullet_lifetime))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Component;
    use crate::config::fixture;
    use crate::entity::ComponentKind;

    fn tick_order(entity: &Entity) -> Vec<ComponentKind> {
        entity.all_tickable().map(Component::kind).collect()
    }

    #[test]
    fn player_ticks_movement_physics_wrap_in_order() {
        let player = player_ship(EntityId::new(0), &fixture()).unwrap();
        let order = tick_order(&player);
        assert_eq!(
            &order[..3],
            &[
                ComponentKind::PlayerMovement,
                ComponentKind::Physics,
                ComponentKind::BoundaryWrap,
            ]
        );
        assert!(player.has(ComponentKind::Health));
        assert!(player.has(ComponentKind::Laser));
    }

    #[test]
    fn pursuer_uses_pursuit_movement() {
        let pursuer = enemy(EntityId::new(1), EnemyKind::Pursuer, &fixture().enemies).unwrap();
        assert_eq!(
            tick_order(&pursuer),
            vec![
                ComponentKind::PursuitMovement,
                ComponentKind::Physics,
                ComponentKind::BoundaryWrap,
            ]
        );
        assert!(pursuer.component::<Physics>().unwrap().is_kinematic());
    }

    #[test]
    fn fragment_uses_fragment_speed() {
        let config = fixture();
        let fragment = enemy(EntityId::new(2), EnemyKind::Fragment, &config.enemies).unwrap();
        let movement = fragment.component::<LinearMovement>().unwrap();
        assert_eq!(movement.speed(), config.enemies.fragment_speed);
    }

    #[test]
    fn bullet_has_lifetime() {
        let config = fixture();
        let bullet = bullet(EntityId::new(3), &config.weapon).unwrap();
        assert_eq!(
            bullet.component::<Lifetime>().unwrap().remaining(),
            config.weapon.bullet_lifetime
        );
        assert_eq!(bullet.tag(), EntityTag::Projectile);
    }
}
