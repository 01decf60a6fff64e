//! Combat system module
//!
//! ECS ответственность:
//! - Damage pipeline: DamageRequest → Vitals → DamageDealt / EntityDied
//! - Melee: attack volume contacts → DamageRequest (hit lock до re-arm)
//! - Projectiles: ranged атака мобов, Fireball
//! - Cleanup: DespawnAfter для трупов
//!
//! Источники урона никогда не трогают Vitals напрямую.

use bevy::prelude::*;

pub mod damage;
pub mod melee;
pub mod projectile;


// Re-export основных типов
pub use damage::{DamageDealt, DamageRequest, Dead, DespawnAfter, EntityDied, LastHitBy};
pub use melee::resolve_attack_hits;
pub use projectile::{spawn_projectile, Projectile, ProjectileLaunch, PROJECTILE_RADIUS};

use crate::SimulationSet;

/// Combat Plugin
///
/// Порядок выполнения (SimulationSet::Combat):
/// 1. resolve_attack_hits: контакты attack volume → DamageRequest
/// 2. advance_projectiles: полёт снарядов → DamageRequest
/// 3. apply_damage: DamageRequest → Vitals + knockback → DamageDealt
/// 4. death_watch: health == 0 → Dead + EntityDied
///
/// SimulationSet::Lifecycle: despawn_after_timeout
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<DamageRequest>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>()
            .register_type::<DespawnAfter>()
            .register_type::<Projectile>();

        app.add_systems(
            FixedUpdate,
            (
                melee::resolve_attack_hits,
                projectile::advance_projectiles,
                damage::apply_damage,
                damage::death_watch,
            )
                .chain() // Последовательное выполнение
                .in_set(SimulationSet::Combat),
        )
        .add_systems(FixedUpdate, damage::despawn_after_timeout.in_set(SimulationSet::Lifecycle));
    }
}
