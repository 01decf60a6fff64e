//! Ability cast state machine
//!
//! Idle → Selected → Casting → Idle (Casting → Idle через cancel).
//!
//! Машина чистая: каждая операция возвращает список `CastCommand`,
//! а `abilities::systems` применяет их (кулдаун, поворот, сигналы, эффект).
//! Таймер windup: поле `elapsed` в состоянии, отмена = сброс состояния.

use bevy::prelude::*;
use thiserror::Error;

use super::catalog::{AbilityCatalog, AbilityId, CastKind};
use super::cooldown::CooldownTracker;

const WINDUP_EPSILON: f32 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub enum CastState {
    #[default]
    Idle,
    /// Выбрана NormalCast способность, идёт прицеливание
    Selected(AbilityId),
    /// Windup: эффект появится, когда elapsed ≥ duration
    Casting {
        ability: AbilityId,
        elapsed: f32,
        duration: f32,
        aim_point: Vec3,
    },
}

/// Side-effect команды перехода
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CastCommand {
    /// Флаг `isCasting` для аниматора
    SetCastingFlag(bool),
    /// Отмена (в отличие от нормального завершения)
    CastCancelled,
    /// Доворот к точке каста за время windup (только NormalCast)
    RotateToward { point: Vec3, duration: f32 },
    StopRotation,
    StartCooldown(AbilityId),
    SpawnEffect { ability: AbilityId, aim_point: Vec3 },
}

/// Недопустимый переход. Вызывающий код логирует и игнорирует.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CastError {
    #[error("cast already in progress")]
    AlreadyCasting,
    #[error("no cast in progress")]
    NotCasting,
    #[error("ability {0:?} is not ready")]
    NotReady(AbilityId),
    #[error("ability {0:?} is not owned by the caster")]
    NotOwned(AbilityId),
    #[error("ability {0:?} is missing from the catalog")]
    UnknownAbility(AbilityId),
}

/// Компонент: способности кастера + его cast state machine
#[derive(Component, Debug, Clone, Default)]
#[require(CooldownTracker)]
pub struct AbilityCaster {
    state: CastState,
    /// Известные способности (порядок = слоты)
    known: Vec<AbilityId>,
    /// Единственный special-слот (награда BuffStand, сбрасывается после волны)
    special: Option<AbilityId>,
}

impl AbilityCaster {
    pub fn with_abilities(abilities: impl IntoIterator<Item = AbilityId>) -> Self {
        let mut known = Vec::new();
        for ability in abilities {
            if !known.contains(&ability) {
                known.push(ability);
            }
        }
        Self {
            known,
            ..Default::default()
        }
    }

    pub fn state(&self) -> &CastState {
        &self.state
    }

    pub fn known(&self) -> &[AbilityId] {
        &self.known
    }

    pub fn special(&self) -> Option<AbilityId> {
        self.special
    }

    pub fn owns(&self, ability: AbilityId) -> bool {
        self.known.contains(&ability) || self.special == Some(ability)
    }

    pub fn is_casting(&self) -> bool {
        matches!(self.state, CastState::Casting { .. })
    }

    pub fn selected(&self) -> Option<AbilityId> {
        match self.state {
            CastState::Selected(ability) => Some(ability),
            _ => None,
        }
    }

    pub fn casting_ability(&self) -> Option<AbilityId> {
        match self.state {
            CastState::Casting { ability, .. } => Some(ability),
            _ => None,
        }
    }

    /// Регистрирует кулдаун новых способностей (spawn с `with_abilities`)
    pub fn register_all(&self, tracker: &mut CooldownTracker) {
        for ability in self.known.iter().chain(self.special.iter()) {
            if !tracker.is_registered(*ability) {
                tracker.register(*ability);
            }
        }
    }

    pub fn add_ability(&mut self, ability: AbilityId, tracker: &mut CooldownTracker) {
        if !self.known.contains(&ability) {
            self.known.push(ability);
            tracker.register(ability);
        }
    }

    pub fn remove_ability(&mut self, ability: AbilityId, tracker: &mut CooldownTracker) {
        let before = self.known.len();
        self.known.retain(|known| *known != ability);
        if self.known.len() != before {
            self.forget(ability, tracker);
        }
    }

    pub fn set_special_ability(&mut self, ability: AbilityId, tracker: &mut CooldownTracker) {
        self.clear_special_ability(tracker);
        self.special = Some(ability);
        if !tracker.is_registered(ability) {
            tracker.register(ability);
        }
    }

    pub fn clear_special_ability(&mut self, tracker: &mut CooldownTracker) {
        if let Some(previous) = self.special.take() {
            self.forget(previous, tracker);
        }
    }

    fn forget(&mut self, ability: AbilityId, tracker: &mut CooldownTracker) {
        // Та же способность может остаться в другом слоте
        if self.owns(ability) {
            return;
        }
        tracker.unregister(ability);
        if self.state == CastState::Selected(ability) {
            self.state = CastState::Idle;
        }
    }

    /// Выбор способности. `None` снимает выбор и разрешён всегда.
    pub fn select(&mut self, ability: Option<AbilityId>, tracker: &CooldownTracker) -> Result<(), CastError> {
        let Some(ability) = ability else {
            if let CastState::Selected(_) = self.state {
                self.state = CastState::Idle;
            }
            return Ok(());
        };

        if self.is_casting() {
            return Err(CastError::AlreadyCasting);
        }
        if !self.owns(ability) {
            return Err(CastError::NotOwned(ability));
        }
        if !tracker.has_cooldown(ability) {
            return Err(CastError::NotReady(ability));
        }

        self.state = CastState::Selected(ability);
        Ok(())
    }

    /// Idle/Selected → Casting. Windup на cast_time способности.
    pub fn cast(
        &mut self,
        ability: AbilityId,
        aim_point: Vec3,
        tracker: &CooldownTracker,
        catalog: &AbilityCatalog,
    ) -> Result<Vec<CastCommand>, CastError> {
        if self.is_casting() {
            return Err(CastError::AlreadyCasting);
        }
        if !self.owns(ability) {
            return Err(CastError::NotOwned(ability));
        }
        if !tracker.has_cooldown(ability) {
            return Err(CastError::NotReady(ability));
        }
        let spec = catalog.get(ability).ok_or(CastError::UnknownAbility(ability))?;

        let duration = spec.cast_time.max(0.0);
        self.state = CastState::Casting {
            ability,
            elapsed: 0.0,
            duration,
            aim_point,
        };

        let mut commands = vec![CastCommand::SetCastingFlag(true)];
        if spec.kind == CastKind::NormalCast {
            commands.push(CastCommand::RotateToward {
                point: aim_point,
                duration,
            });
        }
        Ok(commands)
    }

    /// Продвигает windup. По завершении: стоп поворота → флаг → кулдаун → эффект.
    pub fn advance(&mut self, delta: f32) -> Vec<CastCommand> {
        let CastState::Casting {
            ability,
            elapsed,
            duration,
            aim_point,
        } = &mut self.state
        else {
            return Vec::new();
        };

        *elapsed += delta.max(0.0);
        if *elapsed + WINDUP_EPSILON < *duration {
            return Vec::new();
        }

        let (ability, aim_point) = (*ability, *aim_point);
        self.state = CastState::Idle;
        vec![
            CastCommand::StopRotation,
            CastCommand::SetCastingFlag(false),
            CastCommand::StartCooldown(ability),
            CastCommand::SpawnEffect { ability, aim_point },
        ]
    }

    /// Отмена windup: таймеры сбрасываются, эффекта и кулдауна нет
    pub fn cancel(&mut self) -> Result<Vec<CastCommand>, CastError> {
        if !self.is_casting() {
            return Err(CastError::NotCasting);
        }

        self.state = CastState::Idle;
        Ok(vec![
            CastCommand::StopRotation,
            CastCommand::SetCastingFlag(false),
            CastCommand::CastCancelled,
        ])
    }
}
