//! Stat/buff aggregation
//!
//! Архитектура:
//! - modifier: StatModifier (Constant | Quota, timed или permanent)
//! - aggregator: StatAggregator (multiset модификаторов → DerivedStats)
//! - systems: истечение модификаторов + push в Vitals/KineticBody

use bevy::prelude::*;

pub mod aggregator;
pub mod modifier;
pub mod systems;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod aggregator_tests;

pub use aggregator::{effective_cooldown, effective_damage, BaseStats, DerivedStats, StatAggregator, MIN_MASS};
pub use modifier::{ModifierId, ModifierKind, StatCategory, StatModifier, PERMANENT};
pub use systems::{apply_stat_modifiers, expire_stat_modifiers, push_derived_stats};

use crate::SimulationSet;

/// Stats Plugin
///
/// Порядок выполнения (SimulationSet::Stats):
/// 1. expire_stat_modifiers
/// 2. apply_stat_modifiers: push в Vitals/KineticBody до AI и движения
/// 3. regenerate_vitals
pub struct StatsPlugin;

impl Plugin for StatsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (
                systems::expire_stat_modifiers,
                systems::apply_stat_modifiers,
                crate::components::regenerate_vitals,
            )
                .chain()
                .in_set(SimulationSet::Stats),
        );
    }
}
