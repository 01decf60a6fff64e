//! Creature AI module
//!
//! Priority FSM: Dead > Resting > Attacking > Chasing > Roaming > Idle.
//!
//! Архитектура:
//! - components: AIState, CreatureConfig, CreatureBrain (target + countdown таймеры)
//! - decision: чистые функции (Perception → AIState, enter/exit → Vec<AiCommand>)
//! - roaming: wall probe, случайные точки, выход из тупика
//! - systems: perception → FSM → команды KineticBody/сигналам
//! - events: CreatureCommand (SetDestination, Domesticate), AIStateChanged

use bevy::prelude::*;

pub mod components;
pub mod decision;
pub mod events;
pub mod roaming;
pub mod systems;


// Re-export основных типов
pub use components::{AIState, AttackSequence, CreatureBrain, CreatureConfig, RangedAttack, RoamDelay, TargetView};
pub use decision::{predict_aim_point, resolve_state, AiCommand, Perception, ATTACK_ROTATION_RATE};
pub use events::{AIStateChanged, CreatureCommand, CreatureCommandKind, DOMESTICATION_BONUS_HEALTH};

use crate::SimulationSet;

/// AI Plugin
///
/// Порядок выполнения (SimulationSet::Ai):
/// 1. apply_creature_commands: SetDestination / Domesticate
/// 2. revert_domestication: временные питомцы
/// 3. perceive_targets: ревалидация/поиск target
/// 4. update_creature_ai: таймеры, переходы FSM, поведение
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<CreatureCommand>()
            .add_event::<AIStateChanged>()
            .register_type::<AIState>()
            .register_type::<CreatureConfig>()
            .register_type::<CreatureBrain>()
            .add_systems(
                FixedUpdate,
                (
                    systems::apply_creature_commands,
                    systems::revert_domestication,
                    systems::perceive_targets,
                    systems::update_creature_ai,
                )
                    .chain() // Последовательное выполнение для детерминизма
                    .in_set(SimulationSet::Ai),
            );
    }
}

/// Bundle для спавна существа
#[derive(Bundle, Default)]
pub struct CreatureBundle {
    pub brain: CreatureBrain,
    pub config: CreatureConfig,
    pub state: AIState,
}

impl CreatureBundle {
    pub fn new(config: CreatureConfig) -> Self {
        Self {
            config: config.normalized(),
            ..Default::default()
        }
    }
}
