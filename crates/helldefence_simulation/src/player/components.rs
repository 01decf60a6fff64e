//! Player control components
//!
//! Host (движок, тесты, сеть) пишет `PlayerInput` каждый кадр;
//! `handle_player_input` превращает его в CastRequest и direction.

use bevy::prelude::*;

use crate::abilities::{AbilityId, CastDistance};
use crate::physics::{flat, rotate_yaw};

/// Скорость изменения дистанции прицела от axis.y (m/s)
pub const AIM_RADIAL_SPEED: f32 = 70.0;
/// Скорость вращения прицела вокруг игрока от axis.x (градусы/с)
pub const AIM_ORBIT_SPEED: f32 = 150.0;

/// Input игрока за шаг
///
/// `pressed_slot` и `cancel`: edge-события: система забирает их каждый шаг.
/// `movement`: level: держится, пока host его не сбросит.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerInput {
    /// x → +X арены, y → +Z арены; длина > 1 режется
    pub movement: Vec2,
    pub pressed_slot: Option<AbilityId>,
    pub cancel: bool,
}

impl PlayerInput {
    pub fn press(&mut self, slot: AbilityId) {
        self.pressed_slot = Some(slot);
    }

    /// Направление движения в плоскости арены
    pub fn direction(&self) -> Vec3 {
        let movement = self.movement.clamp_length_max(1.0);
        Vec3::new(movement.x, 0.0, movement.y)
    }
}

/// Player-controlled актор
///
/// AI таких не трогает (нет CreatureBrain). Прицел NormalCast способности
/// хранится как смещение от игрока, чтобы knockback не сбивал его.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Reflect)]
#[reflect(Component)]
#[require(PlayerInput)]
pub struct PlayerController {
    pub aim_offset: Vec3,
    /// Последний отправленный аниматору Walk флаг
    pub walking: bool,
}

impl PlayerController {
    pub fn aim_point(&self, position: Vec3) -> Vec3 {
        position + self.aim_offset
    }

    /// Прицел на default дистанции перед игроком
    pub fn reset_aim(&mut self, transform: &Transform, range: CastDistance) {
        let forward = flat(*transform.forward()).normalize_or(Vec3::NEG_Z);
        self.aim_offset = forward * range.default;
    }

    /// axis.y двигает прицел к/от игрока, axis.x вращает вокруг
    pub fn steer_aim(&mut self, movement: Vec2, delta: f32, range: CastDistance) {
        let offset = flat(self.aim_offset);
        let distance = offset.length();
        let heading = offset.normalize_or(Vec3::NEG_Z);

        let distance = range.clamp(distance + movement.y * AIM_RADIAL_SPEED * delta);
        let heading = rotate_yaw(heading, movement.x * AIM_ORBIT_SPEED * delta);
        self.aim_offset = heading * distance;
    }
}
