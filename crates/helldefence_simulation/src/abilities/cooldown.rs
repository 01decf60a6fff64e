//! Ability cooldown tracker
//!
//! Кулдауны идут дискретными тиками по 0.1 сек: длительность `d` занимает ровно
//! `ceil(d / 0.1)` тиков. Незарегистрированная способность никогда не ready.

use std::collections::BTreeMap;

use bevy::prelude::*;

use super::catalog::AbilityId;
use crate::stats::effective_cooldown;

/// Длительность одного тика кулдауна (секунды)
pub const COOLDOWN_TICK: f32 = 0.1;

/// Допуск на накопление float при 60Hz шагах (6 × 1/60 ≈ 0.1)
const TICK_EPSILON: f32 = 1e-4;

/// Относительный допуск `d / 0.1` к ближайшей границе тика (f32 ошибка деления)
const TICK_BOUNDARY_EPSILON: f32 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct CooldownEntry {
    remaining_ticks: u32,
    total_ticks: u32,
}

/// Количество тиков для длительности
pub fn ticks_for(duration: f32) -> u32 {
    if duration <= 0.0 {
        return 0;
    }
    let ticks = duration / COOLDOWN_TICK;
    let boundary = ticks.round();
    let ticks = if (ticks - boundary).abs() <= boundary.max(1.0) * TICK_BOUNDARY_EPSILON {
        boundary
    } else {
        ticks
    };
    (ticks.ceil() as u32).max(1)
}

/// Per-entity map ability → оставшийся кулдаун
#[derive(Component, Debug, Clone, Default)]
pub struct CooldownTracker {
    entries: BTreeMap<AbilityId, CooldownEntry>,
    accumulator: f32,
}

impl CooldownTracker {
    /// Регистрирует способность (сразу ready)
    pub fn register(&mut self, ability: AbilityId) {
        self.entries.insert(ability, CooldownEntry::default());
    }

    pub fn unregister(&mut self, ability: AbilityId) {
        self.entries.remove(&ability);
    }

    pub fn is_registered(&self, ability: AbilityId) -> bool {
        self.entries.contains_key(&ability)
    }

    /// Запускает кулдаун `base − constant − base × quota` (≥ 0).
    /// Возвращает эффективную длительность; для незарегистрированной: `None`.
    pub fn start_cooldown(
        &mut self,
        ability: AbilityId,
        base_duration: f32,
        cooldown_constant: f32,
        cooldown_quota: f32,
    ) -> Option<f32> {
        let entry = self.entries.get_mut(&ability)?;
        let duration = effective_cooldown(base_duration, cooldown_constant, cooldown_quota);
        let ticks = ticks_for(duration);
        *entry = CooldownEntry {
            remaining_ticks: ticks,
            total_ticks: ticks,
        };
        Some(duration)
    }

    /// `true` = способность ГОТОВА (кулдаун "доступен"), не "есть ожидание".
    pub fn has_cooldown(&self, ability: AbilityId) -> bool {
        self.entries.get(&ability).is_some_and(|entry| entry.remaining_ticks == 0)
    }

    /// Алиас `has_cooldown` с однозначным именем
    pub fn is_ready(&self, ability: AbilityId) -> bool {
        self.has_cooldown(ability)
    }

    /// Процент оставшегося кулдауна [0, 100]; `None`: не зарегистрирована
    pub fn percent_remaining(&self, ability: AbilityId) -> Option<f32> {
        let entry = self.entries.get(&ability)?;
        if entry.total_ticks == 0 {
            return Some(0.0);
        }
        Some(entry.remaining_ticks as f32 / entry.total_ticks as f32 * 100.0)
    }

    pub fn abilities(&self) -> impl Iterator<Item = AbilityId> + '_ {
        self.entries.keys().copied()
    }

    /// Один тик (0.1 сек) для всех активных кулдаунов
    pub fn tick(&mut self) {
        for entry in self.entries.values_mut() {
            entry.remaining_ticks = entry.remaining_ticks.saturating_sub(1);
        }
    }

    /// Накопить delta, прогнать целые тики. Возвращает количество тиков.
    pub fn advance(&mut self, delta: f32) -> u32 {
        self.accumulator += delta.max(0.0);

        let mut ticks = 0;
        while self.accumulator >= COOLDOWN_TICK - TICK_EPSILON {
            self.accumulator -= COOLDOWN_TICK;
            self.tick();
            ticks += 1;
        }
        self.accumulator = self.accumulator.max(0.0);
        ticks
    }
}

/// Система: продвигает все трекеры (FixedUpdate)
pub fn tick_cooldowns(mut query: Query<&mut CooldownTracker>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for mut tracker in query.iter_mut() {
        tracker.advance(delta);
    }
}
