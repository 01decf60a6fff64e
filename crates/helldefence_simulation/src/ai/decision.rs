//! Чистая логика AI: выбор состояния, enter/exit команды, прицеливание
//!
//! Никаких ECS запросов: системы собирают `Perception`, получают
//! `AIState` + `Vec<AiCommand>` и применяют их к KineticBody/сигналам.

use bevy::prelude::*;

use super::components::{AIState, CreatureConfig, TargetView};
use crate::physics::{flat, planar_angle_deg};

/// Снимок того, что существо знает о себе и target на этот шаг
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    pub dead: bool,
    pub resting: bool,
    pub attack_in_progress: bool,
    pub attack_armed: bool,
    pub roams: bool,
    pub chase_radius: f32,
    pub attack_distance: f32,
    pub field_of_view: f32,
    pub target: Option<TargetView>,
}

impl Perception {
    pub fn new(config: &CreatureConfig) -> Self {
        Self {
            dead: false,
            resting: false,
            attack_in_progress: false,
            attack_armed: true,
            roams: config.roams,
            chase_radius: config.chase_radius,
            attack_distance: config.attack_distance,
            field_of_view: config.field_of_view,
            target: None,
        }
    }

    pub fn can_attack(&self) -> bool {
        if self.attack_in_progress {
            return true;
        }
        let Some(target) = self.target else {
            return false;
        };

        target.distance <= self.attack_distance
            && target.angle < self.field_of_view
            && self.attack_armed
            && !self.resting
            && !target.wall_between
            && target.alive
            && target.hostile
    }

    pub fn can_chase(&self) -> bool {
        let Some(target) = self.target else {
            return false;
        };

        // Стена мешает только атаке: преследуем, пока target жива и в радиусе
        target.distance <= self.chase_radius && target.alive && target.hostile && !self.resting && !self.attack_in_progress
    }
}

/// Приоритет: Dead > Resting > Attacking > Chasing > Roaming > Idle
pub fn resolve_state(perception: &Perception) -> AIState {
    if perception.dead {
        AIState::Dead
    } else if perception.resting {
        AIState::Resting
    } else if perception.can_attack() {
        AIState::Attacking
    } else if perception.can_chase() {
        AIState::Chasing
    } else if perception.roams && !perception.attack_in_progress {
        AIState::Roaming
    } else {
        AIState::Idle
    }
}

/// Target, которую надо отпустить (смерть, вне радиуса, фракция сменилась).
/// Стена не в счёт: она блокирует только захват и атаку.
pub fn target_is_valid(target: &TargetView, chase_radius: f32) -> bool {
    target.alive && target.hostile && target.distance <= chase_radius
}

/// Замах моба: доворот к точке атаки заканчивается на середине анимации
pub const ATTACK_ROTATION_RATE: f32 = 2.0;

/// Команды поведения AI
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AiCommand {
    /// Сбросить intent движения
    Stop,
    SetDestination(Vec3),
    SetOnlyRotate(bool),
    /// Отменить отложенный roam
    CancelRoamDelay,
    Walk(bool),
    Attack(bool),
    /// Доворот к точке за duration
    FaceToward { point: Vec3, duration: f32 },
    StopRotation,
    Die,
}

/// Exit/enter эффекты перехода `from → to`
pub fn transition_commands(from: AIState, to: AIState) -> Vec<AiCommand> {
    let mut commands = Vec::new();
    if from == to {
        return commands;
    }

    match from {
        AIState::Chasing | AIState::Attacking => commands.push(AiCommand::SetOnlyRotate(false)),
        AIState::Roaming => commands.push(AiCommand::CancelRoamDelay),
        _ => {}
    }

    match to {
        AIState::Idle | AIState::Resting => {
            commands.push(AiCommand::Walk(false));
            commands.push(AiCommand::Stop);
        }
        AIState::Roaming => commands.push(AiCommand::Walk(true)),
        AIState::Attacking => {
            if matches!(from, AIState::Chasing | AIState::Roaming) {
                commands.push(AiCommand::Walk(false));
            }
        }
        AIState::Dead => {
            commands.push(AiCommand::Walk(false));
            commands.push(AiCommand::Die);
            commands.push(AiCommand::Stop);
            commands.push(AiCommand::StopRotation);
        }
        AIState::Chasing => {}
    }

    commands
}

/// Поведение Chasing за шаг: идём к target, в радиусе атаки только доворачиваемся
pub fn chase_commands(target: &TargetView, self_position: Vec3, config: &CreatureConfig, only_rotate: bool) -> Vec<AiCommand> {
    let mut commands = vec![AiCommand::SetDestination(Vec3::new(
        target.position.x,
        self_position.y,
        target.position.z,
    ))];

    if target.distance > config.attack_distance {
        commands.push(AiCommand::Walk(true));
        if only_rotate {
            commands.push(AiCommand::SetOnlyRotate(false));
        }
    } else if !only_rotate {
        commands.push(AiCommand::SetOnlyRotate(true));
        if config.walk_anim_during_rotation {
            commands.push(AiCommand::Walk(false));
        }
    }

    commands
}

/// Точка упреждения: `target + velocity × prediction_offset × dt`
///
/// Если упреждение уходит за спину атакующего (target бежит навстречу),
/// берём сырую позицию target.
pub fn predict_aim_point(self_position: Vec3, target_position: Vec3, target_velocity: Vec3, prediction_offset: f32, delta: f32) -> Vec3 {
    let mut predicted = target_position + target_velocity * prediction_offset * delta;
    predicted.y = self_position.y;

    let to_predicted = flat(predicted - self_position);
    if to_predicted.length_squared() <= f32::EPSILON {
        return target_position;
    }

    let from_self = planar_angle_deg(target_position - self_position, to_predicted);
    let from_target = planar_angle_deg(self_position - target_position, to_predicted);
    if from_self > from_target {
        target_position
    } else {
        predicted
    }
}
