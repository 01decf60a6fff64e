//! Внешние команды существам: точка назначения, приручение, возврат в Mob.

use bevy::prelude::*;

use crate::ai::components::{AIState, CreatureBrain};
use crate::ai::events::{CreatureCommand, CreatureCommandKind, DOMESTICATION_BONUS_HEALTH};
use crate::components::{Actor, Faction, Vitals};
use crate::logger;
use crate::physics::KineticBody;
use crate::signals::{VisualCue, VisualKind};
use crate::stats::{push_derived_stats, StatAggregator, StatCategory, StatModifier, PERMANENT};

type CommandedItem = (
    &'static mut AIState,
    &'static mut CreatureBrain,
    &'static mut Actor,
    &'static mut KineticBody,
    &'static mut Vitals,
    &'static Transform,
    Option<&'static mut StatAggregator>,
);

/// Система: обработка CreatureCommand
pub fn apply_creature_commands(
    mut events: EventReader<CreatureCommand>,
    mut creatures: Query<CommandedItem>,
    mut visuals: EventWriter<VisualCue>,
) {
    for command in events.read() {
        let Ok((mut state, mut brain, mut actor, mut body, mut vitals, transform, aggregator)) =
            creatures.get_mut(command.creature)
        else {
            continue;
        };

        if *state == AIState::Dead || vitals.is_dead() {
            continue;
        }

        match command.kind {
            CreatureCommandKind::SetDestination(point) => {
                *state = AIState::Roaming;
                brain.roam_delay = None;
                body.only_rotate = false;
                body.set_destination(point);
            }
            CreatureCommandKind::Domesticate { duration } => {
                actor.faction = Faction::PlayerPet;
                *state = AIState::Idle;
                brain.reset_combat();
                brain.domestication_timer = duration;
                body.stop();
                body.only_rotate = false;
                body.stop_rotation();

                match aggregator {
                    Some(mut aggregator) => {
                        aggregator.add_modifier(StatModifier::constant(
                            StatCategory::MaxHealth,
                            DOMESTICATION_BONUS_HEALTH as f32,
                            PERMANENT,
                        ));
                        let derived = aggregator.recompute();
                        push_derived_stats(&derived, Some(&mut *vitals), None);
                    }
                    None => {
                        let max = vitals.max + DOMESTICATION_BONUS_HEALTH as u32;
                        vitals.set_max(max);
                    }
                }
                vitals.increase(DOMESTICATION_BONUS_HEALTH);

                visuals.write(VisualCue {
                    kind: VisualKind::Domesticated,
                    position: transform.translation,
                    attach_to: Some(command.creature),
                });
                logger::log_info(&format!("🐾 {:?} domesticated ({:?})", command.creature, duration));
            }
        }
    }
}

/// Система: временный PlayerPet снова становится Mob
pub fn revert_domestication(
    mut creatures: Query<(Entity, &mut AIState, &mut CreatureBrain, &mut Actor, &mut KineticBody)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut state, mut brain, mut actor, mut body) in creatures.iter_mut() {
        let Some(remaining) = brain.domestication_timer else {
            continue;
        };

        let remaining = remaining - delta;
        if remaining > 0.0 {
            brain.domestication_timer = Some(remaining);
            continue;
        }

        brain.domestication_timer = None;
        if *state == AIState::Dead {
            continue;
        }

        actor.faction = Faction::Mob;
        *state = AIState::Idle;
        brain.reset_combat();
        body.stop();
        body.only_rotate = false;
        body.stop_rotation();
        logger::log(&format!("🐾 {:?} went wild again", entity));
    }
}
