//! Ability systems: запросы каста → CastMachine → применение команд
//!
//! Порядок (SimulationSet::Abilities):
//! 1. process_cast_requests: select/cast/cancel от игрока и AI
//! 2. advance_casts: windup таймеры, смерть прерывает каст
//! 3. tick_cooldowns: 0.1 сек тики
//! 4. spawn_ability_effects: эффекты завершённых кастов

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::cast::{AbilityCaster, CastCommand, CastError};
use super::catalog::{AbilityCatalog, AbilityId};
use super::cooldown::CooldownTracker;
use crate::components::Vitals;
use crate::logger;
use crate::physics::KineticBody;
use crate::signals::{AnimationSignal, AnimationSignalKind, SoundCue, SoundKind};
use crate::stats::{DerivedStats, StatAggregator};

/// Доворот при касте: ровно за время windup
const CAST_ROTATION_RATE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CastAction {
    Select(Option<AbilityId>),
    Cast { ability: AbilityId, aim_point: Vec3 },
    Cancel,
}

/// Событие: запрос к cast machine кастера (input слой / AI)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct CastRequest {
    pub caster: Entity,
    pub action: CastAction,
}

impl CastRequest {
    pub fn cast(caster: Entity, ability: AbilityId, aim_point: Vec3) -> Self {
        Self {
            caster,
            action: CastAction::Cast { ability, aim_point },
        }
    }

    pub fn select(caster: Entity, ability: Option<AbilityId>) -> Self {
        Self {
            caster,
            action: CastAction::Select(ability),
        }
    }

    pub fn cancel(caster: Entity) -> Self {
        Self {
            caster,
            action: CastAction::Cancel,
        }
    }
}

/// Событие: каст завершён, эффект появляется у кастера
///
/// Fireball/Domestication обрабатываются ядром, остальное: внешний effect слой.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct AbilityEffectSpawned {
    pub caster: Entity,
    pub ability: AbilityId,
    pub origin: Vec3,
    pub aim_point: Vec3,
    /// Урон с учётом damage модификаторов кастера
    pub damage: f32,
    pub knockback: f32,
}

type CasterItem = (
    Entity,
    &'static mut AbilityCaster,
    &'static mut CooldownTracker,
    &'static Transform,
    Option<&'static mut KineticBody>,
    Option<&'static StatAggregator>,
    Option<&'static Vitals>,
);

/// Куда cast machine пишет свои эффекты
#[derive(SystemParam)]
pub struct CastOutputs<'w> {
    signals: EventWriter<'w, AnimationSignal>,
    sounds: EventWriter<'w, SoundCue>,
    effects: EventWriter<'w, AbilityEffectSpawned>,
}

/// Система: обработка CastRequest
pub fn process_cast_requests(
    mut requests: EventReader<CastRequest>,
    catalog: Res<AbilityCatalog>,
    mut casters: Query<CasterItem>,
    mut outputs: CastOutputs,
) {
    for request in requests.read() {
        let Ok((entity, mut caster, mut tracker, transform, body, stats, vitals)) = casters.get_mut(request.caster) else {
            logger::log(&format!("🚫 CastRequest: {:?} is not a caster", request.caster));
            continue;
        };

        if vitals.is_some_and(|v| v.is_dead()) {
            continue;
        }

        let result: Result<Vec<CastCommand>, CastError> = match request.action {
            CastAction::Select(ability) => caster.select(ability, &tracker).map(|_| Vec::new()),
            CastAction::Cast { ability, aim_point } => caster.cast(ability, aim_point, &tracker, &catalog),
            CastAction::Cancel => caster.cancel(),
        };

        match result {
            Ok(commands) => {
                if let CastAction::Cast { ability, .. } = request.action {
                    logger::log(&format!("🔮 {:?} casting {:?}", entity, ability));
                }
                let derived = stats.map(|s| *s.derived()).unwrap_or_default();
                apply_cast_commands(
                    entity,
                    &commands,
                    &catalog,
                    &mut tracker,
                    transform,
                    body.map(|b| b.into_inner()),
                    &derived,
                    &mut outputs,
                );
            }
            Err(error) => {
                // InvalidTransition: input/AI слой должен сам гейтить, тут только лог
                logger::log(&format!("🚫 {:?}: cast request {:?} ignored: {}", entity, request.action, error));
            }
        }
    }
}

/// Система: windup таймеры; мёртвый кастер отменяет каст
pub fn advance_casts(
    catalog: Res<AbilityCatalog>,
    time: Res<Time<Fixed>>,
    mut casters: Query<CasterItem>,
    mut outputs: CastOutputs,
) {
    let delta = time.delta_secs();

    for (entity, mut caster, mut tracker, transform, body, stats, vitals) in casters.iter_mut() {
        if !caster.is_casting() {
            continue;
        }

        let commands = if vitals.is_some_and(|v| v.is_dead()) {
            logger::log(&format!("💀 {:?}: cast interrupted by death", entity));
            caster.cancel().unwrap_or_default()
        } else {
            caster.advance(delta)
        };

        if commands.is_empty() {
            continue;
        }

        let derived = stats.map(|s| *s.derived()).unwrap_or_default();
        apply_cast_commands(
            entity,
            &commands,
            &catalog,
            &mut tracker,
            transform,
            body.map(|b| b.into_inner()),
            &derived,
            &mut outputs,
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_cast_commands(
    entity: Entity,
    commands: &[CastCommand],
    catalog: &AbilityCatalog,
    tracker: &mut CooldownTracker,
    transform: &Transform,
    mut body: Option<&mut KineticBody>,
    derived: &DerivedStats,
    outputs: &mut CastOutputs,
) {
    for command in commands {
        match *command {
            CastCommand::SetCastingFlag(casting) => {
                outputs
                    .signals
                    .write(AnimationSignal::new(entity, AnimationSignalKind::Casting(casting)));
            }
            CastCommand::CastCancelled => {
                outputs
                    .signals
                    .write(AnimationSignal::new(entity, AnimationSignalKind::CastCancelled));
                logger::log(&format!("✋ {:?}: cast cancelled", entity));
            }
            CastCommand::RotateToward { point, duration } => {
                if let Some(body) = body.as_deref_mut() {
                    body.ease_rotation_to(transform.rotation, transform.translation, point, duration, CAST_ROTATION_RATE);
                }
            }
            CastCommand::StopRotation => {
                if let Some(body) = body.as_deref_mut() {
                    body.stop_rotation();
                }
            }
            CastCommand::StartCooldown(ability) => {
                let Some(spec) = catalog.get(ability) else {
                    continue;
                };
                tracker.start_cooldown(ability, spec.cooldown, derived.cooldown_constant, derived.cooldown_quota);
            }
            CastCommand::SpawnEffect { ability, aim_point } => {
                let Some(spec) = catalog.get(ability) else {
                    continue;
                };
                outputs.sounds.write(SoundCue {
                    entity,
                    sound: SoundKind::Cast,
                });
                outputs.effects.write(AbilityEffectSpawned {
                    caster: entity,
                    ability,
                    origin: transform.translation,
                    aim_point,
                    damage: derived.effective_damage(spec.base_damage),
                    knockback: spec.knockback,
                });
            }
        }
    }
}
