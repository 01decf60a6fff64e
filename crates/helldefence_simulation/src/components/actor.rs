//! Базовые компоненты акторов: Actor, Faction, отношение враждебности

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::vitals::Vitals;

/// Фракция (тег) актора
///
/// Меняется в runtime (Domestication: Mob → PlayerPet), поэтому
/// враждебность всегда проверяется заново через `are_enemies`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum Faction {
    Player,
    #[default]
    Mob,
    PlayerPet,
    /// Пикапы, декорации: ни с кем не враждуют
    Neutral,
}

impl Faction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Faction::Player => "Player",
            Faction::Mob => "Mob",
            Faction::PlayerPet => "PlayerPet",
            Faction::Neutral => "Neutral",
        }
    }
}

/// Симметричное, нетранзитивное отношение враждебности
///
/// Player ↔ Mob, PlayerPet ↔ Mob. Player и PlayerPet: союзники.
pub fn are_enemies(a: Faction, b: Faction) -> bool {
    matches!(
        (a, b),
        (Faction::Player, Faction::Mob)
            | (Faction::Mob, Faction::Player)
            | (Faction::PlayerPet, Faction::Mob)
            | (Faction::Mob, Faction::PlayerPet)
    )
}

/// Актор (игрок, моб, питомец): базовый компонент для живых существ
///
/// Автоматически добавляет Vitals через Required Components.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Vitals, Transform)]
pub struct Actor {
    pub faction: Faction,
}

impl Actor {
    pub fn new(faction: Faction) -> Self {
        Self { faction }
    }

    pub fn is_enemy_of(&self, other: &Actor) -> bool {
        are_enemies(self.faction, other.faction)
    }
}
