//! Каталог способностей (read-only метаданные)
//!
//! Resource вместо глобальной таблицы: каждая подсистема получает его
//! через `Res<AbilityCatalog>`, host может вставить свой до SimulationPlugin.

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect, Serialize, Deserialize)]
pub enum AbilityId {
    Fireball,
    Scourge,
    Teleport,
    Gravity,
    PlasmaField,
    Domestication,
    BulletStorm,
    GroundShock,
    LavaBeam,
}

impl AbilityId {
    pub const ALL: [AbilityId; 9] = [
        AbilityId::Fireball,
        AbilityId::Scourge,
        AbilityId::Teleport,
        AbilityId::Gravity,
        AbilityId::PlasmaField,
        AbilityId::Domestication,
        AbilityId::BulletStorm,
        AbilityId::GroundShock,
        AbilityId::LavaBeam,
    ];

    /// Способности, которые выдаёт BuffStand в special-слот
    pub const SPECIAL_POOL: [AbilityId; 4] = [
        AbilityId::GroundShock,
        AbilityId::LavaBeam,
        AbilityId::Domestication,
        AbilityId::Gravity,
    ];
}

/// NormalCast: выбрать, прицелиться, каст с доворотом; InstantCast: сразу
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum CastKind {
    NormalCast,
    InstantCast,
}

/// Дистанция точки каста от кастера (для NormalCast прицела)
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct CastDistance {
    pub default: f32,
    pub min: f32,
    pub max: f32,
}

impl CastDistance {
    pub const fn new(default: f32, min: f32, max: f32) -> Self {
        Self { default, min, max }
    }

    pub fn clamp(&self, distance: f32) -> f32 {
        distance.clamp(self.min, self.max)
    }
}

impl Default for CastDistance {
    fn default() -> Self {
        Self::new(10.0, 5.0, 30.0)
    }
}

/// Снаряд способности (fireball)
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct ProjectileSpec {
    pub speed: f32,
    pub lifetime: f32,
}

#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub struct AbilitySpec {
    pub kind: CastKind,
    /// Windup (секунды)
    pub cast_time: f32,
    /// Базовый кулдаун до stat-модификаторов
    pub cooldown: f32,
    pub base_damage: f32,
    /// Knockback сила (см. IMPULSE_SCALE)
    pub knockback: f32,
    pub cast_distance: CastDistance,
    pub projectile: Option<ProjectileSpec>,
}

impl AbilitySpec {
    fn new(kind: CastKind, cast_time: f32, cooldown: f32) -> Self {
        Self {
            kind,
            cast_time,
            cooldown,
            base_damage: 0.0,
            knockback: 0.0,
            cast_distance: CastDistance::default(),
            projectile: None,
        }
    }

    fn with_damage(mut self, base_damage: f32, knockback: f32) -> Self {
        self.base_damage = base_damage;
        self.knockback = knockback;
        self
    }

    fn with_distance(mut self, default: f32, min: f32, max: f32) -> Self {
        self.cast_distance = CastDistance::new(default, min, max);
        self
    }

    fn with_projectile(mut self, speed: f32, lifetime: f32) -> Self {
        self.projectile = Some(ProjectileSpec { speed, lifetime });
        self
    }

    pub fn is_instant(&self) -> bool {
        self.kind == CastKind::InstantCast
    }
}

/// Resource: AbilityId → AbilitySpec
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct AbilityCatalog {
    specs: BTreeMap<AbilityId, AbilitySpec>,
}

impl Default for AbilityCatalog {
    fn default() -> Self {
        use CastKind::*;

        let specs = BTreeMap::from([
            (
                AbilityId::Fireball,
                AbilitySpec::new(NormalCast, 0.2, 3.0)
                    .with_damage(10.0, 500.0)
                    .with_distance(10.0, 5.0, 30.0)
                    .with_projectile(10.0, 1.5),
            ),
            (AbilityId::Scourge, AbilitySpec::new(InstantCast, 1.0, 4.0)),
            (AbilityId::Teleport, AbilitySpec::new(NormalCast, 0.05, 8.0).with_distance(20.0, 3.0, 30.0)),
            (AbilityId::Gravity, AbilitySpec::new(NormalCast, 0.2, 15.0).with_distance(10.0, 5.0, 30.0)),
            (AbilityId::PlasmaField, AbilitySpec::new(InstantCast, 0.0, 20.0)),
            (AbilityId::Domestication, AbilitySpec::new(InstantCast, 0.1, 120.0)),
            (AbilityId::BulletStorm, AbilitySpec::new(NormalCast, 0.3, 20.0).with_distance(10.0, 0.5, 35.0)),
            (AbilityId::GroundShock, AbilitySpec::new(InstantCast, 0.1, 30.0).with_damage(10.0, 15.0)),
            (AbilityId::LavaBeam, AbilitySpec::new(NormalCast, 0.3, 25.0).with_distance(10.0, 5.0, 30.0)),
        ]);

        Self { specs }
    }
}

impl AbilityCatalog {
    pub fn get(&self, ability: AbilityId) -> Option<&AbilitySpec> {
        self.specs.get(&ability)
    }

    pub fn insert(&mut self, ability: AbilityId, spec: AbilitySpec) {
        self.specs.insert(ability, spec);
    }

    pub fn cast_kind(&self, ability: AbilityId) -> Option<CastKind> {
        self.get(ability).map(|spec| spec.kind)
    }
}
