//! Abilities: каталог, кулдауны, cast state machine, эффекты
//!
//! Архитектура:
//! - catalog: AbilityId + AbilitySpec (read-only resource)
//! - cooldown: CooldownTracker (0.1 сек тики)
//! - cast: AbilityCaster (Idle → Selected → Casting → Idle), чистые переходы
//! - systems: CastRequest → команды → кулдаун/поворот/сигналы/эффект
//! - effects: Fireball снаряд, Domestication

use bevy::prelude::*;

pub mod cast;
pub mod catalog;
pub mod cooldown;
pub mod effects;
pub mod systems;


pub use cast::{AbilityCaster, CastCommand, CastError, CastState};
pub use catalog::{AbilityCatalog, AbilityId, AbilitySpec, CastDistance, CastKind, ProjectileSpec};
pub use cooldown::{ticks_for, CooldownTracker, COOLDOWN_TICK};
pub use effects::DOMESTICATION_RADIUS;
pub use systems::{AbilityEffectSpawned, CastAction, CastRequest};

use crate::SimulationSet;

/// Abilities Plugin
///
/// Порядок выполнения (SimulationSet::Abilities):
/// 1. register_new_casters: кулдауны для свежезаспавненных кастеров
/// 2. process_cast_requests
/// 3. advance_casts
/// 4. tick_cooldowns
/// 5. spawn_ability_effects
pub struct AbilitiesPlugin;

impl Plugin for AbilitiesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AbilityCatalog>()
            .add_event::<CastRequest>()
            .add_event::<AbilityEffectSpawned>()
            .add_systems(
                FixedUpdate,
                (
                    register_new_casters,
                    systems::process_cast_requests,
                    systems::advance_casts,
                    cooldown::tick_cooldowns,
                    effects::spawn_ability_effects,
                )
                    .chain()
                    .in_set(SimulationSet::Abilities),
            );
    }
}

/// Система: регистрирует кулдауны способностей, заданных при spawn
fn register_new_casters(mut casters: Query<(&AbilityCaster, &mut CooldownTracker), Added<AbilityCaster>>) {
    for (caster, mut tracker) in casters.iter_mut() {
        caster.register_all(&mut tracker);
    }
}
