//! Pickups module: аптечки и buff stands
//!
//! # Architecture
//!
//! **Health kits:**
//! - Моб умирает → `LootDropped` (шанс `drop_chance`) → `HealthKit` на месте трупа
//! - Подбирается игроком после `pickable_delay`, исчезает через `lifetime`
//!
//! **Buff stands:**
//! - `WaveEvent::Started` → каждый стенд разыгрывает награду (stat / special / full heal)
//! - Первый коснувшийся игрок забирает награду, стенд пустеет до следующей волны

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod systems;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod systems_tests;

// Re-exports
pub use components::{roll_buff_reward, BuffReward, BuffStand, HealthKit, PickupSettings};
pub use events::{LootDropped, PickupCollected, PickupKind};
pub use systems::{spawn_buff_stand, spawn_health_kit};

use crate::SimulationSet;

/// Pickups plugin
///
/// SimulationSet::Lifecycle (после Movement, контакты этого шага уже есть):
/// 1. spawn_loot_health_kits
/// 2. tick_health_kits
/// 3. collect_pickups
/// 4. refresh_buff_stands
pub struct PickupsPlugin;

impl Plugin for PickupsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PickupSettings>()
            .add_event::<LootDropped>()
            .add_event::<PickupCollected>()
            .register_type::<HealthKit>()
            .add_systems(
                FixedUpdate,
                (
                    systems::spawn_loot_health_kits,
                    systems::tick_health_kits,
                    systems::collect_pickups,
                    systems::refresh_buff_stands,
                )
                    .chain()
                    .in_set(SimulationSet::Lifecycle),
            );
    }
}
