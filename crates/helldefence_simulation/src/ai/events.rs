//! AI events: внешние команды существам + уведомления о переходах FSM

use bevy::prelude::*;

use super::components::AIState;

/// Прибавка к max health и лечение при приручении
pub const DOMESTICATION_BONUS_HEALTH: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CreatureCommandKind {
    /// Идти к точке (свежий моб волны): форсирует Roaming
    SetDestination(Vec3),
    /// Mob → PlayerPet; `Some(duration)`: обратно в Mob по истечении
    Domesticate { duration: Option<f32> },
}

/// Событие: команда конкретному существу (waves, способности)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct CreatureCommand {
    pub creature: Entity,
    pub kind: CreatureCommandKind,
}

impl CreatureCommand {
    pub fn set_destination(creature: Entity, point: Vec3) -> Self {
        Self {
            creature,
            kind: CreatureCommandKind::SetDestination(point),
        }
    }

    pub fn domesticate(creature: Entity, duration: Option<f32>) -> Self {
        Self {
            creature,
            kind: CreatureCommandKind::Domesticate { duration },
        }
    }
}

/// Событие: FSM перешла из одного состояния в другое
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AIStateChanged {
    pub entity: Entity,
    pub from: AIState,
    pub to: AIState,
}
