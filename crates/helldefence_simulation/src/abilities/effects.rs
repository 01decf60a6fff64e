//! Эффекты способностей, которые живут в ядре
//!
//! - Fireball (любая способность с ProjectileSpec): урон-снаряд
//! - Domestication: ближайший Mob в радиусе 60 становится PlayerPet
//!
//! Остальные способности: внешний effect слой по `AbilityEffectSpawned`.

use bevy::prelude::*;

use super::catalog::{AbilityCatalog, AbilityId};
use super::systems::AbilityEffectSpawned;
use crate::ai::{CreatureBrain, CreatureCommand};
use crate::combat::projectile::{spawn_projectile, ProjectileLaunch};
use crate::components::{Actor, Faction, Vitals};
use crate::logger;
use crate::physics::{flat, CollisionWorld};

/// Радиус поиска цели для Domestication
pub const DOMESTICATION_RADIUS: f32 = 60.0;

/// Система: эффекты завершённых кастов
pub fn spawn_ability_effects(
    mut commands: Commands,
    mut effects: EventReader<AbilityEffectSpawned>,
    catalog: Res<AbilityCatalog>,
    collision: Res<CollisionWorld>,
    casters: Query<(&Actor, &Transform)>,
    mobs: Query<(&Transform, &Vitals, &Actor), With<CreatureBrain>>,
    mut creature_commands: EventWriter<CreatureCommand>,
) {
    for effect in effects.read() {
        let Some(spec) = catalog.get(effect.ability) else {
            continue;
        };

        if let Some(projectile) = spec.projectile {
            let Ok((actor, transform)) = casters.get(effect.caster) else {
                continue;
            };
            let direction = flat(effect.aim_point - effect.origin)
                .try_normalize()
                .unwrap_or_else(|| flat(*transform.forward()).normalize_or_zero());

            spawn_projectile(
                &mut commands,
                ProjectileLaunch {
                    owner: effect.caster,
                    owner_faction: actor.faction,
                    origin: effect.origin,
                    direction,
                    speed: projectile.speed,
                    lifetime: projectile.lifetime,
                    damage: effect.damage,
                    knockback: effect.knockback,
                },
            );
            continue;
        }

        if effect.ability == AbilityId::Domestication {
            let target = nearest_living_mob(&collision, &mobs, effect.origin, DOMESTICATION_RADIUS);
            match target {
                Some(target) => {
                    creature_commands.write(CreatureCommand::domesticate(target, None));
                }
                None => {
                    logger::log(&format!("🐾 {:?}: no mob to domesticate", effect.caster));
                }
            }
        }
    }
}

fn nearest_living_mob(
    collision: &CollisionWorld,
    mobs: &Query<(&Transform, &Vitals, &Actor), With<CreatureBrain>>,
    origin: Vec3,
    radius: f32,
) -> Option<Entity> {
    collision
        .provider()
        .overlap_sphere(origin, radius, Some(Faction::Mob))
        .into_iter()
        .filter_map(|entity| {
            let (transform, vitals, actor) = mobs.get(entity).ok()?;
            // Фракция могла смениться после sync_bodies
            (vitals.is_alive() && actor.faction == Faction::Mob)
                .then(|| (entity, flat(transform.translation - origin).length()))
        })
        .min_by(|(a_entity, a), (b_entity, b)| a.total_cmp(b).then(a_entity.cmp(b_entity)))
        .map(|(entity, _)| entity)
}
