//! Target acquisition + ревалидация target каждый шаг.

use bevy::prelude::*;

use crate::ai::components::{AIState, CreatureBrain, CreatureConfig, TargetView};
use crate::ai::decision::target_is_valid;
use crate::components::{are_enemies, Actor, Faction, Vitals};
use crate::logger;
use crate::physics::{flat, planar_angle_deg, CollisionWorld, KineticBody};

type TargetItem = (&'static Transform, &'static Actor, &'static Vitals, Option<&'static KineticBody>);

/// Что существо видит о `entity` (None: entity исчезла или не актор)
fn observe(
    collision: &CollisionWorld,
    targets: &Query<TargetItem>,
    faction: Faction,
    position: Vec3,
    forward: Vec3,
    entity: Entity,
) -> Option<TargetView> {
    let (transform, actor, vitals, body) = targets.get(entity).ok()?;
    let target_position = transform.translation;

    Some(TargetView {
        entity,
        position: target_position,
        velocity: body.map(|b| b.velocity).unwrap_or_default(),
        distance: flat(target_position - position).length(),
        angle: planar_angle_deg(forward, target_position - position),
        wall_between: collision.is_wall_between(position, target_position),
        alive: vitals.is_alive(),
        hostile: are_enemies(faction, actor.faction),
    })
}

/// Система: ревалидация текущей target, иначе поиск ближайшего врага в chase radius
///
/// Новую target сквозь стену не берём; уже взятая target за стеной остаётся
/// (стена блокирует только атаку).
pub fn perceive_targets(
    collision: Res<CollisionWorld>,
    mut creatures: Query<(Entity, &AIState, &mut CreatureBrain, &CreatureConfig, &Actor, &Transform)>,
    targets: Query<TargetItem>,
) {
    for (entity, state, mut brain, config, actor, transform) in creatures.iter_mut() {
        if *state == AIState::Dead {
            continue;
        }

        let position = transform.translation;
        let forward = flat(*transform.forward());

        if let Some(current) = brain.target {
            match observe(&collision, &targets, actor.faction, position, forward, current.entity) {
                Some(view) if target_is_valid(&view, config.chase_radius) => {
                    brain.target = Some(view);
                    continue;
                }
                _ => {
                    logger::log(&format!("🎯 {:?}: target {:?} lost", entity, current.entity));
                    brain.target = None;
                }
            }
        }

        let nearest = collision
            .provider()
            .overlap_sphere(position, config.chase_radius, None)
            .into_iter()
            .filter(|candidate| *candidate != entity)
            .filter_map(|candidate| observe(&collision, &targets, actor.faction, position, forward, candidate))
            .filter(|view| target_is_valid(view, config.chase_radius) && !view.wall_between)
            .min_by(|a, b| a.distance.total_cmp(&b.distance).then(a.entity.cmp(&b.entity)));

        if let Some(view) = nearest {
            logger::log(&format!(
                "🎯 {:?}: acquired target {:?} at {:.1}m",
                entity, view.entity, view.distance
            ));
            brain.target = Some(view);
        }
    }
}
