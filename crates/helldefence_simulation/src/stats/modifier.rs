//! Модификаторы характеристик (баффы)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// `remaining_lifetime` для бессрочного модификатора
pub const PERMANENT: f32 = -1.0;

/// Какую характеристику меняет модификатор
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum StatCategory {
    MaxHealth,
    Regeneration,
    Speed,
    Mass,
    /// Бонус урона (constant → damage_constant, quota → damage_quota)
    Damage,
    /// Сокращение кулдаунов (constant → cooldown_constant, quota → cooldown_quota)
    Cooldown,
}

impl StatCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            StatCategory::MaxHealth => "Max Health",
            StatCategory::Regeneration => "Regeneration",
            StatCategory::Speed => "Speed",
            StatCategory::Mass => "Mass",
            StatCategory::Damage => "Damage",
            StatCategory::Cooldown => "Cooldown",
        }
    }
}

/// Constant: абсолютная прибавка, Quota: доля от constant-adjusted значения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum ModifierKind {
    Constant,
    Quota,
}

/// Стабильный ID модификатора внутри одного StatAggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct ModifierId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct StatModifier {
    pub category: StatCategory,
    pub kind: ModifierKind,
    pub value: f32,
    /// Секунды до истечения; `PERMANENT` (-1): никогда
    pub remaining_lifetime: f32,
}

impl StatModifier {
    pub fn constant(category: StatCategory, value: f32, lifetime: f32) -> Self {
        Self {
            category,
            kind: ModifierKind::Constant,
            value,
            remaining_lifetime: lifetime,
        }
    }

    pub fn quota(category: StatCategory, value: f32, lifetime: f32) -> Self {
        Self {
            category,
            kind: ModifierKind::Quota,
            value,
            remaining_lifetime: lifetime,
        }
    }

    pub fn permanent(mut self) -> Self {
        self.remaining_lifetime = PERMANENT;
        self
    }

    pub fn with_lifetime(mut self, lifetime: f32) -> Self {
        self.remaining_lifetime = lifetime;
        self
    }

    pub fn is_permanent(&self) -> bool {
        self.remaining_lifetime == PERMANENT
    }

    /// Текст для stat-панели: "+10% Speed", "+2 Speed"
    pub fn description(&self) -> String {
        let name = self.category.display_name();
        match self.kind {
            ModifierKind::Quota => format!("{}% {}", signed((self.value * 100.0).round()), name),
            ModifierKind::Constant => format!("{} {}", signed(self.value), name),
        }
    }
}

fn signed(value: f32) -> String {
    if value >= 0.0 {
        format!("+{}", value)
    } else {
        format!("{}", value)
    }
}
