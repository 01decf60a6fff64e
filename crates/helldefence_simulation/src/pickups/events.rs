//! Pickup events
//!
//! - `LootDropped`: моб при смерти выбросил лут (аптечку)
//! - `PickupCollected`: игрок подобрал аптечку / награду стенда

use bevy::prelude::*;

use super::components::BuffReward;

/// Моб выбросил лут на месте смерти
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct LootDropped {
    pub source: Entity,
    pub position: Vec3,
}

/// Что именно подобрано
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickupKind {
    HealthKit { amount: i32 },
    Buff(BuffReward),
}

/// Игрок подобрал pickup
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PickupCollected {
    pub collector: Entity,
    pub pickup: Entity,
    pub kind: PickupKind,
}
