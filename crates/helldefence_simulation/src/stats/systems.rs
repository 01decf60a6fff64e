//! Stat systems: истечение модификаторов + push DerivedStats в Vitals/KineticBody

use bevy::prelude::*;

use super::aggregator::{DerivedStats, StatAggregator};
use crate::components::Vitals;
use crate::logger;
use crate::physics::KineticBody;

/// Система: уменьшает lifetime модификаторов, удаляет истёкшие
pub fn expire_stat_modifiers(mut query: Query<(Entity, &mut StatAggregator)>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for (entity, mut aggregator) in query.iter_mut() {
        if aggregator.is_empty() {
            continue;
        }

        let expired = aggregator.advance(delta);
        if expired > 0 {
            logger::log(&format!("⏳ {:?}: {} modifier(s) expired", entity, expired));
        }
    }
}

/// Система: ленивый recompute + push maxHealth/regeneration/speed/mass
pub fn apply_stat_modifiers(
    mut query: Query<(&mut StatAggregator, Option<&mut Vitals>, Option<&mut KineticBody>)>,
) {
    for (mut aggregator, vitals, body) in query.iter_mut() {
        let Some(derived) = aggregator.recompute_if_dirty() else {
            continue;
        };

        push_derived_stats(&derived, vitals.map(|v| v.into_inner()), body.map(|b| b.into_inner()));
    }
}

/// Записывает производные характеристики во владельца
pub fn push_derived_stats(derived: &DerivedStats, vitals: Option<&mut Vitals>, body: Option<&mut KineticBody>) {
    if let Some(vitals) = vitals {
        vitals.set_max(derived.max_health);
        vitals.set_regeneration(derived.regeneration);
    }

    if let Some(body) = body {
        body.speed = derived.speed;
        body.mass = derived.mass;
    }
}
