//! Снаряды: ranged атака мобов и Fireball
//!
//! Снаряд летит по прямой в плоскости XZ. Стена: исчезает,
//! первый враждебный живой актор (не владелец): DamageRequest + исчезает.

use bevy::prelude::*;

use super::damage::DamageRequest;
use crate::components::{are_enemies, Actor, Faction, Vitals};
use crate::logger;
use crate::physics::layers::{self, COLLISION_LAYER_WALLS};
use crate::physics::{flat, look_rotation, CollisionWorld};
use crate::signals::{VisualCue, VisualKind};

/// Радиус попадания снаряда
pub const PROJECTILE_RADIUS: f32 = 0.3;

/// Снаряд в полёте
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Projectile {
    pub owner: Entity,
    pub owner_faction: Faction,
    pub direction: Vec3,
    pub speed: f32,
    pub remaining_lifetime: f32,
    pub damage: f32,
    pub knockback: f32,
    pub radius: f32,
}

/// Параметры запуска снаряда
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileLaunch {
    pub owner: Entity,
    pub owner_faction: Faction,
    pub origin: Vec3,
    pub direction: Vec3,
    pub speed: f32,
    pub lifetime: f32,
    pub damage: f32,
    pub knockback: f32,
}

/// Spawn снаряда на 1 unit впереди и выше `origin`
pub fn spawn_projectile(commands: &mut Commands, launch: ProjectileLaunch) -> Entity {
    let direction = flat(launch.direction).normalize_or_zero();
    let position = launch.origin + direction + Vec3::Y;

    let mut transform = Transform::from_translation(position);
    if direction != Vec3::ZERO {
        transform.rotation = look_rotation(direction);
    }

    commands
        .spawn((
            transform,
            Projectile {
                owner: launch.owner,
                owner_faction: launch.owner_faction,
                direction,
                speed: launch.speed,
                remaining_lifetime: launch.lifetime,
                damage: launch.damage,
                knockback: launch.knockback,
                radius: PROJECTILE_RADIUS,
            },
            layers::projectile_groups(),
        ))
        .id()
}

/// Система: полёт, попадания и время жизни снарядов
pub fn advance_projectiles(
    mut commands: Commands,
    mut projectiles: Query<(Entity, &mut Projectile, &mut Transform)>,
    targets: Query<(&Actor, &Vitals)>,
    collision: Res<CollisionWorld>,
    time: Res<Time<Fixed>>,
    mut damage_requests: EventWriter<DamageRequest>,
    mut visuals: EventWriter<VisualCue>,
) {
    let delta = time.delta_secs();
    let provider = collision.provider();

    let mut entities: Vec<Entity> = projectiles.iter().map(|(entity, _, _)| entity).collect();
    entities.sort();

    for entity in entities {
        let Ok((_, mut projectile, mut transform)) = projectiles.get_mut(entity) else {
            continue;
        };

        let travel = projectile.speed * delta;
        if let Some(hit) = provider.raycast(transform.translation, projectile.direction, travel, COLLISION_LAYER_WALLS) {
            visuals.write(VisualCue {
                kind: VisualKind::ProjectileImpact,
                position: hit.point,
                attach_to: None,
            });
            commands.entity(entity).despawn();
            continue;
        }

        transform.translation += projectile.direction * travel;
        let position = transform.translation;

        let victim = provider
            .overlap_sphere(position, projectile.radius, None)
            .into_iter()
            .filter(|candidate| *candidate != projectile.owner)
            .filter_map(|candidate| {
                let (actor, vitals) = targets.get(candidate).ok()?;
                (vitals.is_alive() && are_enemies(projectile.owner_faction, actor.faction)).then_some(candidate)
            })
            .min();

        if let Some(victim) = victim {
            // Дробный урон усекается
            damage_requests.write(
                DamageRequest::new(victim, Some(projectile.owner), projectile.damage as i32)
                    .with_knockback(projectile.direction * projectile.knockback),
            );
            visuals.write(VisualCue {
                kind: VisualKind::ProjectileImpact,
                position,
                attach_to: Some(victim),
            });
            logger::log(&format!("🔥 Projectile {:?} hit {:?}", entity, victim));
            commands.entity(entity).despawn();
            continue;
        }

        projectile.remaining_lifetime -= delta;
        if projectile.remaining_lifetime <= 0.0 {
            commands.entity(entity).despawn();
        }
    }
}
