//! Physics systems: kinetic step, интеграция, стены, контакты, rapier sync
//!
//! Порядок (FixedUpdate, SimulationSet::Movement):
//! 1. drive_kinetic_bodies: KineticBody::step → velocity + rotation
//! 2. integrate_kinetic_bodies: headless: translation += velocity × dt
//! 3. resolve_wall_contacts: выталкивание из стен, impulse стирается
//! 4. sync_velocity_to_rapier: velocity → rapier `Velocity` (если есть)
//! 5. sync_collision_bodies: позиции → CollisionWorld
//! 6. detect_contacts: пересечения тел/attack volumes → ContactEvent

use std::collections::HashSet;

use bevy::prelude::*;
use bevy_rapier3d::prelude::{Collider, RigidBody, Velocity};

use super::collision::{BodyProxy, CollisionWorld, ContactEvent, ContactPhase, ContactSource};
use super::kinetic::{flat, KineticBody};
use super::layers::{self, interacts, COLLISION_LAYER_ACTORS, COLLISION_MASK_ACTORS};
use crate::components::{Actor, Faction};

/// Физическое тело в headless мире (круг в XZ)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct CollisionBody {
    pub radius: f32,
    pub layer: u32,
    pub mask: u32,
}

impl Default for CollisionBody {
    fn default() -> Self {
        Self {
            radius: 0.5,
            layer: COLLISION_LAYER_ACTORS,
            mask: COLLISION_MASK_ACTORS,
        }
    }
}

impl CollisionBody {
    pub fn new(radius: f32, layer: u32, mask: u32) -> Self {
        Self { radius, layer, mask }
    }
}

/// Trigger volume атаки перед телом (сфера на `reach` по forward)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct AttackVolume {
    pub reach: f32,
    pub radius: f32,
}

impl Default for AttackVolume {
    fn default() -> Self {
        Self { reach: 1.0, radius: 1.0 }
    }
}

impl AttackVolume {
    pub fn center(&self, transform: &Transform) -> Vec3 {
        transform.translation + flat(*transform.forward()).normalize_or_zero() * self.reach
    }
}

/// Система: один шаг kinetic модели
pub fn drive_kinetic_bodies(mut query: Query<(&mut KineticBody, &mut Transform)>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for (mut body, mut transform) in query.iter_mut() {
        body.step(&mut transform, delta);
    }
}

/// Система интеграции velocity → Transform (headless режим, без Rapier)
///
/// Entities с rapier `RigidBody` двигает rapier (через `Velocity`).
pub fn integrate_kinetic_bodies(
    mut query: Query<(&KineticBody, &mut Transform), Without<RigidBody>>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (body, mut transform) in query.iter_mut() {
        transform.translation += body.velocity * delta;

        // Пол арены
        if transform.translation.y < body.ground_height {
            transform.translation.y = body.ground_height;
        }
    }
}

/// Система: выталкивание из стен; удар о стену гасит impulse
pub fn resolve_wall_contacts(
    world: Res<CollisionWorld>,
    mut query: Query<(&mut Transform, &mut KineticBody, &CollisionBody)>,
) {
    for (mut transform, mut body, shape) in query.iter_mut() {
        if shape.mask & layers::COLLISION_LAYER_WALLS == 0 {
            continue;
        }

        if let Some(pushed) = world.provider().resolve_walls(transform.translation, shape.radius) {
            transform.translation = pushed;
            body.erase_impulse();
        }
    }
}

/// Система: KineticBody.velocity → rapier Velocity
pub fn sync_velocity_to_rapier(mut query: Query<(&KineticBody, &mut Velocity)>) {
    for (body, mut rapier_velocity) in query.iter_mut() {
        rapier_velocity.linvel = body.velocity;
    }
}

/// Система: актуальные позиции тел → CollisionWorld
pub fn sync_collision_bodies(
    mut world: ResMut<CollisionWorld>,
    query: Query<(Entity, &Transform, &CollisionBody, Option<&Actor>)>,
) {
    let mut bodies: Vec<BodyProxy> = query
        .iter()
        .map(|(entity, transform, shape, actor)| BodyProxy {
            entity,
            position: transform.translation,
            radius: shape.radius,
            faction: actor.map(|a| a.faction).unwrap_or(Faction::Neutral),
            layer: shape.layer,
        })
        .collect();

    // Детерминированный порядок независимо от порядка archetype'ов
    bodies.sort_by_key(|body| body.entity);
    world.provider_mut().sync_bodies(&bodies);
}

/// Система: headless детекция контактов (тело ↔ тело, attack volume ↔ тело)
///
/// Begin: впервые в этом шаге, Stay: продолжение контакта.
pub fn detect_contacts(
    bodies: Query<(Entity, &Transform, &CollisionBody)>,
    volumes: Query<(Entity, &Transform, &AttackVolume)>,
    mut contacts: EventWriter<ContactEvent>,
    mut previous: Local<HashSet<(Entity, Entity, ContactSource)>>,
) {
    let mut shapes: Vec<(Entity, Vec3, CollisionBody)> =
        bodies.iter().map(|(e, t, shape)| (e, t.translation, *shape)).collect();
    shapes.sort_by_key(|(entity, _, _)| *entity);

    let mut current = HashSet::new();
    let mut emit = |a: Entity, b: Entity, source: ContactSource, current: &mut HashSet<(Entity, Entity, ContactSource)>| {
        let key = (a, b, source);
        let phase = if previous.contains(&key) {
            ContactPhase::Stay
        } else {
            ContactPhase::Begin
        };
        current.insert(key);
        contacts.write(ContactEvent { a, b, phase, source });
    };

    for (i, (a, pos_a, shape_a)) in shapes.iter().enumerate() {
        for (b, pos_b, shape_b) in shapes.iter().skip(i + 1) {
            if !interacts(shape_a.layer, shape_a.mask, shape_b.layer, shape_b.mask) {
                continue;
            }
            if flat(*pos_a - *pos_b).length() <= shape_a.radius + shape_b.radius {
                emit(*a, *b, ContactSource::Body, &mut current);
            }
        }
    }

    let mut attackers: Vec<_> = volumes.iter().collect();
    attackers.sort_by_key(|(entity, _, _)| *entity);
    for (attacker, transform, volume) in attackers {
        let center = volume.center(transform);
        for (other, position, shape) in &shapes {
            if *other == attacker || shape.layer & COLLISION_LAYER_ACTORS == 0 {
                continue;
            }
            if flat(center - *position).length() <= volume.radius + shape.radius {
                emit(attacker, *other, ContactSource::AttackVolume, &mut current);
            }
        }
    }

    *previous = current;
}

/// Spawn helper для kinetic персонажа под rapier
///
/// Создает entity с полным набором компонентов:
/// - Transform
/// - KineticBody + CollisionBody
/// - Rapier: RigidBody + Collider (capsule) + Velocity + CollisionGroups
pub fn spawn_kinetic_character(commands: &mut Commands, position: Vec3, body: KineticBody) -> Entity {
    commands
        .spawn((
            Transform::from_translation(position),
            body,
            CollisionBody::default(),
            // Rapier physics
            RigidBody::KinematicPositionBased,
            Collider::capsule_y(0.5, 0.4), // Высота 1.0m (0.5 + 0.5), радиус 0.4m
            Velocity::default(),
            layers::actor_groups(),
        ))
        .id()
}
