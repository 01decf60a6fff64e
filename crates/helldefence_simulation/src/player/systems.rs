//! Player systems: input → select/cast/cancel + direction, реакция на смерть
//!
//! Порядок (SimulationSet::Input):
//! 1. handle_player_death: стоп движения, сброс impulse/выбора
//! 2. handle_player_input: CastRequest'ы читает Abilities в этом же шаге

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::components::{PlayerController, PlayerInput};
use crate::abilities::{AbilityCaster, AbilityCatalog, AbilityId, CastKind, CastRequest, CooldownTracker};
use crate::combat::EntityDied;
use crate::components::{Actor, Faction, Vitals};
use crate::logger;
use crate::physics::{CollisionBody, KineticBody, KineticMode};
use crate::signals::{AnimationSignal, AnimationSignalKind, SoundCue, SoundKind};
use crate::stats::{BaseStats, StatAggregator};

/// Ниже этого input считается "стоим" (для Walk флага)
const WALK_THRESHOLD_SQ: f32 = 1e-4;

type PlayerItem = (
    Entity,
    &'static mut PlayerController,
    &'static mut PlayerInput,
    &'static AbilityCaster,
    &'static CooldownTracker,
    &'static mut KineticBody,
    &'static Transform,
    &'static Vitals,
);

#[derive(SystemParam)]
pub struct PlayerOutputs<'w> {
    cast_requests: EventWriter<'w, CastRequest>,
    signals: EventWriter<'w, AnimationSignal>,
}

/// Система: PlayerInput → CastRequest + KineticBody direction
///
/// Правила слотов:
/// - ничего не выбрано: InstantCast кастуется сразу, NormalCast выбирается (прицел перед игроком)
/// - повторное нажатие выбранного слота кастует в прицел
/// - cancel снимает выбор или прерывает windup
///
/// Пока способность выбрана или кастуется, axis двигает прицел, игрок стоит.
pub fn handle_player_input(
    time: Res<Time<Fixed>>,
    catalog: Res<AbilityCatalog>,
    mut players: Query<PlayerItem>,
    mut outputs: PlayerOutputs,
) {
    let delta = time.delta_secs();

    let mut players: Vec<_> = players.iter_mut().collect();
    players.sort_by_key(|(entity, ..)| *entity);

    for (entity, mut controller, mut input, caster, tracker, mut body, transform, vitals) in players {
        let movement = input.movement.clamp_length_max(1.0);
        let direction = input.direction();
        let pressed = input.pressed_slot.take();
        let cancel = std::mem::take(&mut input.cancel);

        if vitals.is_dead() {
            continue;
        }

        let selected = caster.selected();
        let casting = caster.is_casting();
        let free = selected.is_none() && !casting;

        let direction = if free { direction } else { Vec3::ZERO };
        body.set_direction(direction);

        let walking = direction.length_squared() > WALK_THRESHOLD_SQ;
        if walking != controller.walking {
            controller.walking = walking;
            outputs
                .signals
                .write(AnimationSignal::new(entity, AnimationSignalKind::Walk(walking)));
        }

        if let (Some(ability), false) = (selected, casting) {
            let range = catalog.get(ability).map(|spec| spec.cast_distance).unwrap_or_default();
            controller.steer_aim(movement, delta, range);
        }

        if let Some(slot) = pressed {
            press_slot(entity, slot, &mut controller, caster, tracker, transform, &catalog, &mut outputs);
        }

        if cancel {
            if casting {
                outputs.cast_requests.write(CastRequest::cancel(entity));
            } else if selected.is_some() {
                outputs.cast_requests.write(CastRequest::select(entity, None));
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn press_slot(
    entity: Entity,
    slot: AbilityId,
    controller: &mut PlayerController,
    caster: &AbilityCaster,
    tracker: &CooldownTracker,
    transform: &Transform,
    catalog: &AbilityCatalog,
    outputs: &mut PlayerOutputs,
) {
    if !caster.owns(slot) {
        logger::log(&format!("🎮 {:?}: slot {:?} is empty", entity, slot));
        return;
    }
    if caster.is_casting() {
        return;
    }

    match caster.selected() {
        None => {
            if !tracker.has_cooldown(slot) {
                return;
            }
            let Some(spec) = catalog.get(slot) else {
                logger::log_warning(&format!("🎮 {:?}: {:?} has no catalog entry", entity, slot));
                return;
            };

            match spec.kind {
                CastKind::InstantCast => {
                    outputs
                        .cast_requests
                        .write(CastRequest::cast(entity, slot, transform.translation));
                }
                CastKind::NormalCast => {
                    controller.reset_aim(transform, spec.cast_distance);
                    outputs.cast_requests.write(CastRequest::select(entity, Some(slot)));
                }
            }
        }
        Some(selected) if selected == slot => {
            let aim_point = controller.aim_point(transform.translation);
            outputs.cast_requests.write(CastRequest::cast(entity, slot, aim_point));
        }
        // Другой слот при выборе игнорируется
        Some(_) => {}
    }
}

/// Система: смерть игрока → стоп, сброс impulse и выбора, Die сигнал
///
/// Windup прерывает `advance_casts` (мёртвый кастер).
pub fn handle_player_death(
    mut deaths: EventReader<EntityDied>,
    mut players: Query<(
        &mut PlayerController,
        &mut PlayerInput,
        &mut KineticBody,
        Option<(&mut AbilityCaster, &CooldownTracker)>,
    )>,
    mut signals: EventWriter<AnimationSignal>,
    mut sounds: EventWriter<SoundCue>,
) {
    for died in deaths.read() {
        let Ok((mut controller, mut input, mut body, caster)) = players.get_mut(died.entity) else {
            continue;
        };

        body.stop();
        body.erase_impulse();
        *input = PlayerInput::default();

        if let Some((mut caster, tracker)) = caster {
            if let Err(error) = caster.select(None, tracker) {
                logger::log(&format!("🎮 {:?}: deselect on death failed: {}", died.entity, error));
            }
        }

        if controller.walking {
            controller.walking = false;
            signals.write(AnimationSignal::new(died.entity, AnimationSignalKind::Walk(false)));
        }
        signals.write(AnimationSignal::new(died.entity, AnimationSignalKind::Die));
        sounds.write(SoundCue {
            entity: died.entity,
            sound: SoundKind::Death,
        });

        logger::log_info(&format!("💀 Player {:?} died", died.entity));
    }
}

/// Спавнит игрока: Player actor + stats + kinetic body (Direction mode) + caster
pub fn spawn_player(
    commands: &mut Commands,
    position: Vec3,
    abilities: impl IntoIterator<Item = AbilityId>,
) -> Entity {
    let base = BaseStats::default();

    commands
        .spawn((
            Actor::new(Faction::Player),
            Vitals::new(base.max_health, base.regeneration),
            StatAggregator::new(base),
            Transform::from_translation(position),
            KineticBody {
                mode: KineticMode::Direction,
                speed: base.speed,
                mass: base.mass,
                ..Default::default()
            },
            CollisionBody::default(),
            AbilityCaster::with_abilities(abilities),
            PlayerController::default(),
        ))
        .id()
}
