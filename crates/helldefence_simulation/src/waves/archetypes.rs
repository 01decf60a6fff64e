//! Creature archetypes: шаблоны мобов для волн

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::source::ArchetypeId;
use crate::abilities::{AbilityCaster, AbilityId};
use crate::ai::{CreatureBundle, CreatureConfig, RangedAttack};
use crate::components::{Actor, Faction, Vitals};
use crate::physics::{AttackVolume, CollisionBody, KineticBody};
use crate::stats::{BaseStats, StatAggregator};

/// Шаблон существа: AI tuning + базовые характеристики + тело
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureArchetype {
    pub config: CreatureConfig,
    pub base: BaseStats,
    pub body_radius: f32,
}

impl Default for CreatureArchetype {
    fn default() -> Self {
        Self {
            config: CreatureConfig::default(),
            base: BaseStats {
                max_health: 40,
                regeneration: 0,
                speed: 4.0,
                mass: 1.0,
            },
            body_radius: 0.5,
        }
    }
}

/// Resource: archetypes по имени
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureArchetypes {
    pub archetypes: BTreeMap<ArchetypeId, CreatureArchetype>,
}

impl Default for CreatureArchetypes {
    fn default() -> Self {
        let imp = CreatureArchetype::default();

        let brute = CreatureArchetype {
            config: CreatureConfig {
                damage: 20,
                hit_force: 400.0,
                attack_distance: 4.0,
                attack_duration: 1.5,
                rest_time: 3.0,
                drop_chance: 0.4,
                ..Default::default()
            },
            base: BaseStats {
                max_health: 120,
                regeneration: 0,
                speed: 3.0,
                mass: 3.0,
            },
            body_radius: 0.8,
        };

        let thrower = CreatureArchetype {
            config: CreatureConfig {
                damage: 8,
                attack_distance: 12.0,
                chase_radius: 20.0,
                effect_moment: 0.6,
                ranged: Some(RangedAttack::default()),
                ..Default::default()
            },
            ..Default::default()
        };

        let shaman = CreatureArchetype {
            config: CreatureConfig {
                attack_distance: 10.0,
                chase_radius: 20.0,
                effect_moment: 0.8,
                cast_ability: Some(AbilityId::Fireball),
                ..Default::default()
            },
            base: BaseStats {
                max_health: 60,
                regeneration: 1,
                speed: 3.5,
                mass: 1.0,
            },
            ..Default::default()
        };

        let archetypes = BTreeMap::from([
            (ArchetypeId::from("imp"), imp),
            (ArchetypeId::from("brute"), brute),
            (ArchetypeId::from("thrower"), thrower),
            (ArchetypeId::from("shaman"), shaman),
        ]);

        Self { archetypes }
    }
}

impl CreatureArchetypes {
    pub fn get(&self, id: &ArchetypeId) -> Option<&CreatureArchetype> {
        self.archetypes.get(id)
    }

    pub fn contains(&self, id: &ArchetypeId) -> bool {
        self.archetypes.contains_key(id)
    }

    pub fn insert(&mut self, id: ArchetypeId, archetype: CreatureArchetype) {
        self.archetypes.insert(id, archetype);
    }
}

/// Spawn существа по archetype (Mob, headless тело)
///
/// `health_multiplier`: масштаб max health (кооп на двоих).
pub fn spawn_creature(
    commands: &mut Commands,
    archetype: &CreatureArchetype,
    position: Vec3,
    health_multiplier: f32,
) -> Entity {
    let mut base = archetype.base;
    base.max_health = (base.max_health as f32 * health_multiplier.max(0.0)).round() as u32;

    let body = KineticBody {
        speed: base.speed,
        mass: base.mass,
        ..Default::default()
    };

    let config = archetype.config.clone();
    let melee = config.is_melee();
    let reach = config.attack_distance * 0.5;
    let cast_ability = config.cast_ability;

    let mut entity = commands.spawn((
        Actor::new(Faction::Mob),
        Vitals::new(base.max_health, base.regeneration),
        StatAggregator::new(base),
        Transform::from_translation(position),
        body,
        CollisionBody {
            radius: archetype.body_radius,
            ..Default::default()
        },
        CreatureBundle::new(config),
    ));

    if melee {
        entity.insert(AttackVolume { reach, radius: reach });
    }
    if let Some(ability) = cast_ability {
        entity.insert(AbilityCaster::with_abilities([ability]));
    }

    entity.id()
}
