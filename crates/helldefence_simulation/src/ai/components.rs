//! Creature AI components (state, config, brain timers).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::abilities::AbilityId;

/// AI FSM состояния (priority-driven)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub enum AIState {
    /// Начальное состояние после спавна
    #[default]
    Idle,
    /// Случайное блуждание (или идём к заданной точке волны)
    Roaming,
    /// Преследование target
    Chasing,
    /// Замах/атака (включая незавершённую)
    Attacking,
    /// Отдых после атаки
    Resting,
    /// Terminal
    Dead,
}

impl AIState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AIState::Idle => "Idle",
            AIState::Roaming => "Roaming",
            AIState::Chasing => "Chasing",
            AIState::Attacking => "Attacking",
            AIState::Resting => "Resting",
            AIState::Dead => "Dead",
        }
    }
}

/// Дальняя атака: снаряд в момент `effect_moment`
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct RangedAttack {
    pub speed: f32,
    pub lifetime: f32,
}

impl Default for RangedAttack {
    fn default() -> Self {
        Self {
            speed: 10.0,
            lifetime: 4.0,
        }
    }
}

/// Параметры существа (tuning)
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct CreatureConfig {
    pub damage: i32,
    /// Knockback сила удара (делится на IMPULSE_SCALE × mass)
    pub hit_force: f32,
    pub chase_radius: f32,
    pub attack_distance: f32,
    /// Период перезарядки атаки (не меньше attack_duration)
    pub attack_frequency: f32,
    /// Длительность анимации атаки (секунды)
    pub attack_duration: f32,
    /// 0: без отдыха
    pub rest_time: f32,
    pub prediction_offset: f32,
    /// Полуугол конуса атаки (градусы)
    pub field_of_view: f32,
    /// Труп исчезает через N секунд
    pub disappear_time: f32,
    /// Доля attack_duration, в которую срабатывает ranged/cast эффект
    pub effect_moment: f32,
    /// false: без цели стоим на месте (Idle)
    pub roams: bool,
    pub walk_anim_during_rotation: bool,
    /// Шанс выпадения аптечки при смерти
    pub drop_chance: f32,
    pub ranged: Option<RangedAttack>,
    /// Способность, которую существо кастует в момент атаки
    pub cast_ability: Option<AbilityId>,
}

impl Default for CreatureConfig {
    fn default() -> Self {
        Self {
            damage: 11,
            hit_force: 200.0,
            chase_radius: 15.0,
            attack_distance: 6.0,
            attack_frequency: 4.0,
            attack_duration: 1.0,
            rest_time: 2.0,
            prediction_offset: 15.0,
            field_of_view: 15.0,
            disappear_time: 4.0,
            effect_moment: 1.0,
            roams: true,
            walk_anim_during_rotation: false,
            drop_chance: 0.2,
            ranged: None,
            cast_ability: None,
        }
    }
}

impl CreatureConfig {
    /// attack_frequency не может быть короче самой атаки
    pub fn normalized(mut self) -> Self {
        self.attack_duration = self.attack_duration.max(0.0);
        if self.attack_frequency < self.attack_duration {
            self.attack_frequency = self.attack_duration;
        }
        self.effect_moment = self.effect_moment.clamp(0.0, 1.0);
        self
    }

    pub fn is_melee(&self) -> bool {
        self.ranged.is_none() && self.cast_ability.is_none()
    }
}

/// Что AI видит о текущей target (кэш на шаг, пишет `perceive_targets`)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct TargetView {
    pub entity: Entity,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Горизонтальная дистанция
    pub distance: f32,
    /// Угол между forward и направлением на target (градусы)
    pub angle: f32,
    pub wall_between: bool,
    pub alive: bool,
    pub hostile: bool,
}

/// Одна атака: от замаха до конца анимации
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct AttackSequence {
    pub elapsed: f32,
    pub duration: f32,
    /// Момент ranged/cast эффекта (секунды от начала)
    pub effect_at: f32,
    pub effect_fired: bool,
    pub aim_point: Vec3,
}

/// Отложенный roam: destination выбрана, ждём задержку
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct RoamDelay {
    pub remaining: f32,
    pub destination: Vec3,
}

/// Brain существа: target + все countdown таймеры
///
/// Отмена = сброс поля (никаких отложенных задач).
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(AIState)]
pub struct CreatureBrain {
    pub target: Option<TargetView>,
    /// Атака перезаряжена
    pub attack_armed: bool,
    pub rearm_timer: f32,
    pub attack: Option<AttackSequence>,
    pub rest_timer: f32,
    pub roam_delay: Option<RoamDelay>,
    /// Удар уже попал в этом цикле атаки
    pub hit_locked: bool,
    /// Some: временный PlayerPet, по истечении снова Mob
    pub domestication_timer: Option<f32>,
    /// Последний отправленный Walk флаг (сигналим только изменения)
    pub walking: bool,
}

impl Default for CreatureBrain {
    fn default() -> Self {
        Self {
            target: None,
            attack_armed: true,
            rearm_timer: 0.0,
            attack: None,
            rest_timer: 0.0,
            roam_delay: None,
            hit_locked: false,
            domestication_timer: None,
            walking: false,
        }
    }
}

impl CreatureBrain {
    pub fn target_entity(&self) -> Option<Entity> {
        self.target.map(|view| view.entity)
    }

    pub fn is_attacking(&self) -> bool {
        self.attack.is_some()
    }

    pub fn is_resting(&self) -> bool {
        self.rest_timer > 0.0
    }

    /// Смерть/смена фракции: сбрасываем бой и все таймеры боя
    pub fn reset_combat(&mut self) {
        self.target = None;
        self.attack = None;
        self.rest_timer = 0.0;
        self.roam_delay = None;
        self.rearm_timer = 0.0;
        self.attack_armed = true;
        self.hit_locked = false;
    }
}
