//! StatAggregator: набор timed модификаторов → DerivedStats
//!
//! Порядок свёртки фиксирован:
//! 1. base значения
//! 2. все Constant модификаторы (health/regen: целые, остальное float)
//! 3. все Quota модификаторы относительно constant-adjusted значения
//!
//! Damage/Cooldown quota не сворачиваются в одно число, а копятся в отдельные
//! множители для downstream систем (урон способностей, кулдауны).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::modifier::{ModifierId, ModifierKind, StatCategory, StatModifier};

/// Минимальная масса (деление на массу в KineticBody)
pub const MIN_MASS: f32 = 0.01;

/// Базовые характеристики сущности (до модификаторов)
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct BaseStats {
    pub max_health: u32,
    pub regeneration: u32,
    pub speed: f32,
    pub mass: f32,
}

impl Default for BaseStats {
    fn default() -> Self {
        Self {
            max_health: 100,
            regeneration: 1,
            speed: 5.0,
            mass: 1.0,
        }
    }
}

/// Snapshot производных характеристик
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect, Serialize, Deserialize)]
pub struct DerivedStats {
    pub max_health: u32,
    pub regeneration: u32,
    pub speed: f32,
    pub mass: f32,
    pub damage_constant: f32,
    pub damage_quota: f32,
    pub cooldown_constant: f32,
    pub cooldown_quota: f32,
}

impl DerivedStats {
    pub fn from_base(base: &BaseStats) -> Self {
        Self {
            max_health: base.max_health,
            regeneration: base.regeneration,
            speed: base.speed,
            mass: base.mass,
            ..Default::default()
        }
    }

    /// Финальный урон способности/атаки: (base + dc) × (1 + dq)
    pub fn effective_damage(&self, base_damage: f32) -> f32 {
        effective_damage(base_damage, self.damage_constant, self.damage_quota)
    }

    /// Эффективный кулдаун: base − cc − base × cq, не меньше 0
    pub fn effective_cooldown(&self, base_cooldown: f32) -> f32 {
        effective_cooldown(base_cooldown, self.cooldown_constant, self.cooldown_quota)
    }
}

pub fn effective_damage(base_damage: f32, damage_constant: f32, damage_quota: f32) -> f32 {
    ((base_damage + damage_constant) * (1.0 + damage_quota)).max(0.0)
}

pub fn effective_cooldown(base_cooldown: f32, cooldown_constant: f32, cooldown_quota: f32) -> f32 {
    (base_cooldown - cooldown_constant - base_cooldown * cooldown_quota).max(0.0)
}

/// Компонент: модификаторы + кэш DerivedStats
///
/// Мутации помечают агрегатор dirty; пересчёт ленивый
/// (`apply_stat_modifiers` раз в шаг или явный `recompute`).
#[derive(Component, Debug, Clone)]
pub struct StatAggregator {
    pub base: BaseStats,
    modifiers: Vec<(ModifierId, StatModifier)>,
    next_id: u64,
    derived: DerivedStats,
    dirty: bool,
}

impl Default for StatAggregator {
    fn default() -> Self {
        Self::new(BaseStats::default())
    }
}

impl StatAggregator {
    pub fn new(base: BaseStats) -> Self {
        Self {
            base,
            modifiers: Vec::new(),
            next_id: 0,
            derived: DerivedStats::from_base(&base),
            // Первый пересчёт пушит base в Vitals/KineticBody
            dirty: true,
        }
    }

    pub fn add_modifier(&mut self, modifier: StatModifier) -> ModifierId {
        let id = ModifierId(self.next_id);
        self.next_id += 1;
        self.modifiers.push((id, modifier));
        self.dirty = true;
        id
    }

    pub fn remove_modifier(&mut self, id: ModifierId) -> bool {
        let before = self.modifiers.len();
        self.modifiers.retain(|(existing, _)| *existing != id);
        let removed = self.modifiers.len() != before;
        self.dirty |= removed;
        removed
    }

    pub fn clear(&mut self) {
        if !self.modifiers.is_empty() {
            self.modifiers.clear();
            self.dirty = true;
        }
    }

    pub fn set_base(&mut self, base: BaseStats) {
        self.base = base;
        self.dirty = true;
    }

    pub fn modifiers(&self) -> impl Iterator<Item = (ModifierId, &StatModifier)> {
        self.modifiers.iter().map(|(id, m)| (*id, m))
    }

    pub fn modifier(&self, id: ModifierId) -> Option<&StatModifier> {
        self.modifiers.iter().find(|(existing, _)| *existing == id).map(|(_, m)| m)
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Последний посчитанный snapshot (может быть устаревшим, если dirty)
    pub fn derived(&self) -> &DerivedStats {
        &self.derived
    }

    /// Уменьшает lifetime у timed модификаторов, удаляет истёкшие.
    /// Возвращает количество удалённых.
    pub fn advance(&mut self, delta: f32) -> usize {
        let before = self.modifiers.len();
        self.modifiers.retain_mut(|(_, modifier)| {
            if modifier.is_permanent() {
                return true;
            }
            modifier.remaining_lifetime -= delta;
            modifier.remaining_lifetime > 0.0
        });

        let expired = before - self.modifiers.len();
        if expired > 0 {
            self.dirty = true;
        }
        expired
    }

    /// Пересчитывает DerivedStats (идемпотентно при неизменном наборе)
    pub fn recompute(&mut self) -> DerivedStats {
        self.derived = fold_modifiers(&self.base, self.modifiers.iter().map(|(_, m)| m));
        self.dirty = false;
        self.derived
    }

    /// Пересчёт только если набор менялся
    pub fn recompute_if_dirty(&mut self) -> Option<DerivedStats> {
        if self.dirty {
            Some(self.recompute())
        } else {
            None
        }
    }
}

/// Свёртка: base → все Constant → все Quota
pub fn fold_modifiers<'a>(
    base: &BaseStats,
    modifiers: impl Iterator<Item = &'a StatModifier> + Clone,
) -> DerivedStats {
    let mut max_health = base.max_health as i64;
    let mut regeneration = base.regeneration as i64;
    let mut derived = DerivedStats::from_base(base);

    // Фаза 1: Constant
    for modifier in modifiers.clone().filter(|m| m.kind == ModifierKind::Constant) {
        let value = modifier.value;
        match modifier.category {
            StatCategory::MaxHealth => max_health += value as i64,
            StatCategory::Regeneration => regeneration += value as i64,
            StatCategory::Speed => derived.speed += value,
            StatCategory::Mass => derived.mass += value,
            StatCategory::Damage => derived.damage_constant += value,
            StatCategory::Cooldown => derived.cooldown_constant += value,
        }
    }

    // Фаза 2: Quota (относительно уже constant-adjusted значения)
    for modifier in modifiers.filter(|m| m.kind == ModifierKind::Quota) {
        let value = modifier.value;
        match modifier.category {
            StatCategory::MaxHealth => max_health += (max_health as f32 * value) as i64,
            StatCategory::Regeneration => regeneration += (regeneration as f32 * value) as i64,
            StatCategory::Speed => derived.speed += derived.speed * value,
            StatCategory::Mass => derived.mass += derived.mass * value,
            StatCategory::Damage => derived.damage_quota += value,
            StatCategory::Cooldown => derived.cooldown_quota += value,
        }
    }

    // Clamp, не reject
    derived.max_health = max_health.clamp(0, u32::MAX as i64) as u32;
    derived.regeneration = regeneration.clamp(0, u32::MAX as i64) as u32;
    derived.speed = derived.speed.max(0.0);
    derived.mass = derived.mass.max(MIN_MASS);
    derived
}
