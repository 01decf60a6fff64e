//! FSM AI systems: таймеры, переходы, поведение состояний, смерть.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier3d::prelude::CollisionGroups;
use rand::Rng;

use crate::abilities::CastRequest;
use crate::ai::components::{AIState, AttackSequence, CreatureBrain, CreatureConfig, RoamDelay};
use crate::ai::decision::{
    chase_commands, predict_aim_point, resolve_state, transition_commands, AiCommand, Perception, ATTACK_ROTATION_RATE,
};
use crate::ai::events::AIStateChanged;
use crate::ai::roaming::{
    faces_destination, find_escape_destination, is_destination_blocked, is_going_to_hit_wall, random_destination,
    random_roam_delay,
};
use crate::combat::projectile::{spawn_projectile, ProjectileLaunch};
use crate::combat::DespawnAfter;
use crate::components::{Actor, Vitals};
use crate::logger;
use crate::physics::layers::{self, COLLISION_LAYER_DEAD, COLLISION_MASK_DEAD};
use crate::physics::{flat, CollisionBody, CollisionWorld, KineticBody};
use crate::pickups::LootDropped;
use crate::signals::{AnimationSignal, AnimationSignalKind, SoundCue, SoundKind};
use crate::DeterministicRng;

type CreatureItem = (
    Entity,
    &'static mut AIState,
    &'static mut CreatureBrain,
    &'static CreatureConfig,
    &'static Actor,
    &'static Vitals,
    &'static Transform,
    &'static mut KineticBody,
    Option<&'static mut CollisionBody>,
    Option<&'static mut CollisionGroups>,
);

/// Выходы AI за шаг (события + отложенные spawn/insert)
#[derive(SystemParam)]
pub struct AiOutputs<'w, 's> {
    commands: Commands<'w, 's>,
    signals: EventWriter<'w, AnimationSignal>,
    sounds: EventWriter<'w, SoundCue>,
    cast_requests: EventWriter<'w, CastRequest>,
    loot: EventWriter<'w, LootDropped>,
    state_changes: EventWriter<'w, AIStateChanged>,
}

/// Применяет AI команды к body/brain/сигналам
pub fn apply_ai_commands(
    entity: Entity,
    ai_commands: &[AiCommand],
    brain: &mut CreatureBrain,
    body: &mut KineticBody,
    transform: &Transform,
    signals: &mut EventWriter<AnimationSignal>,
) {
    for command in ai_commands {
        match *command {
            AiCommand::Stop => body.stop(),
            AiCommand::SetDestination(point) => body.set_destination(point),
            AiCommand::SetOnlyRotate(only_rotate) => body.only_rotate = only_rotate,
            AiCommand::CancelRoamDelay => brain.roam_delay = None,
            AiCommand::Walk(walking) => {
                if brain.walking != walking {
                    brain.walking = walking;
                    signals.write(AnimationSignal::new(entity, AnimationSignalKind::Walk(walking)));
                }
            }
            AiCommand::Attack(attacking) => {
                signals.write(AnimationSignal::new(entity, AnimationSignalKind::Attack(attacking)));
            }
            AiCommand::FaceToward { point, duration } => {
                body.ease_rotation_to(
                    transform.rotation,
                    transform.translation,
                    point,
                    duration,
                    ATTACK_ROTATION_RATE,
                );
            }
            AiCommand::StopRotation => body.stop_rotation(),
            AiCommand::Die => {
                signals.write(AnimationSignal::new(entity, AnimationSignalKind::Die));
            }
        }
    }
}

/// Система: главный цикл creature AI
///
/// Порядок внутри шага для каждого существа:
/// 1. таймеры (re-arm, отдых, атака + effect moment, отложенный roam)
/// 2. resolve_state → exit/enter команды
/// 3. поведение текущего состояния
pub fn update_creature_ai(
    time: Res<Time<Fixed>>,
    collision: Res<CollisionWorld>,
    mut rng: ResMut<DeterministicRng>,
    mut creatures: Query<CreatureItem>,
    mut outputs: AiOutputs,
) {
    let delta = time.delta_secs();

    // RNG расходуется в порядке Entity, а не archetype'ов
    let mut order: Vec<Entity> = creatures.iter().map(|item| item.0).collect();
    order.sort();

    for entity in order {
        let Ok((entity, mut state, mut brain, config, actor, vitals, transform, mut body, shape, groups)) =
            creatures.get_mut(entity)
        else {
            continue;
        };

        if *state == AIState::Dead {
            continue;
        }

        if vitals.is_alive() {
            advance_timers(entity, &mut brain, config, actor, transform, &mut body, delta, &mut outputs);
        }

        let perception = Perception {
            dead: vitals.is_dead(),
            resting: brain.is_resting(),
            attack_in_progress: brain.is_attacking(),
            attack_armed: brain.attack_armed,
            target: brain.target,
            ..Perception::new(config)
        };
        let previous = *state;
        let next = resolve_state(&perception);

        if next != previous {
            logger::log(&format!("🧠 {:?}: {} → {}", entity, previous.as_str(), next.as_str()));
            *state = next;
            let transition = transition_commands(previous, next);
            apply_ai_commands(entity, &transition, &mut brain, &mut body, transform, &mut outputs.signals);
            outputs.state_changes.write(AIStateChanged {
                entity,
                from: previous,
                to: next,
            });
        }

        match next {
            AIState::Dead => {
                if previous != AIState::Dead {
                    on_death(
                        entity,
                        &mut brain,
                        config,
                        transform,
                        shape.map(|s| s.into_inner()),
                        groups.map(|g| g.into_inner()),
                        &mut rng,
                        &mut outputs,
                    );
                }
            }
            AIState::Roaming => {
                roam(entity, &mut brain, transform, &mut body, &collision, &mut rng, &mut outputs.signals);
            }
            AIState::Chasing => {
                if let Some(target) = brain.target {
                    let chase = chase_commands(&target, transform.translation, config, body.only_rotate);
                    apply_ai_commands(entity, &chase, &mut brain, &mut body, transform, &mut outputs.signals);
                }
            }
            AIState::Attacking => {
                if brain.attack_armed && !brain.is_attacking() {
                    start_attack(entity, &mut brain, config, transform, &mut body, delta, &mut outputs);
                }
            }
            AIState::Idle | AIState::Resting => {}
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn advance_timers(
    entity: Entity,
    brain: &mut CreatureBrain,
    config: &CreatureConfig,
    actor: &Actor,
    transform: &Transform,
    body: &mut KineticBody,
    delta: f32,
    outputs: &mut AiOutputs,
) {
    if !brain.attack_armed {
        brain.rearm_timer -= delta;
        if brain.rearm_timer <= 0.0 {
            brain.rearm_timer = 0.0;
            brain.attack_armed = true;
            brain.hit_locked = false;
        }
    }

    if brain.rest_timer > 0.0 {
        brain.rest_timer = (brain.rest_timer - delta).max(0.0);
    }

    if let Some(mut attack) = brain.attack {
        attack.elapsed += delta;

        if !attack.effect_fired && attack.elapsed >= attack.effect_at {
            attack.effect_fired = true;
            fire_attack_effect(entity, brain, config, actor, transform, attack.aim_point, delta, outputs);
        }

        if attack.elapsed >= attack.duration {
            brain.attack = None;
            outputs
                .signals
                .write(AnimationSignal::new(entity, AnimationSignalKind::Attack(false)));
            if config.rest_time > 0.0 {
                brain.rest_timer = config.rest_time;
            }
        } else {
            brain.attack = Some(attack);
        }
    }

    if let Some(mut delay) = brain.roam_delay {
        delay.remaining -= delta;
        if delay.remaining <= 0.0 {
            brain.roam_delay = None;
            body.set_destination(delay.destination);
            apply_ai_commands(entity, &[AiCommand::Walk(true)], brain, body, transform, &mut outputs.signals);
        } else {
            brain.roam_delay = Some(delay);
        }
    }
}

fn start_attack(
    entity: Entity,
    brain: &mut CreatureBrain,
    config: &CreatureConfig,
    transform: &Transform,
    body: &mut KineticBody,
    delta: f32,
    outputs: &mut AiOutputs,
) {
    let Some(target) = brain.target else {
        return;
    };

    let position = transform.translation;
    let aim_point = predict_aim_point(position, target.position, target.velocity, config.prediction_offset, delta);
    let duration = config.attack_duration;

    brain.attack_armed = false;
    brain.rearm_timer = config.attack_frequency.max(duration);
    brain.hit_locked = false;
    brain.attack = Some(AttackSequence {
        elapsed: 0.0,
        duration,
        effect_at: duration * config.effect_moment,
        effect_fired: config.is_melee(),
        aim_point,
    });

    apply_ai_commands(
        entity,
        &[
            AiCommand::FaceToward { point: aim_point, duration },
            AiCommand::Attack(true),
            AiCommand::Stop,
        ],
        brain,
        body,
        transform,
        &mut outputs.signals,
    );
    outputs.sounds.write(SoundCue {
        entity,
        sound: SoundKind::Attack,
    });

    logger::log(&format!("⚔️ {:?} attacks {:?}", entity, target.entity));
}

/// Ranged/cast эффект в момент `effect_moment`
#[allow(clippy::too_many_arguments)]
fn fire_attack_effect(
    entity: Entity,
    brain: &CreatureBrain,
    config: &CreatureConfig,
    actor: &Actor,
    transform: &Transform,
    fallback_aim: Vec3,
    delta: f32,
    outputs: &mut AiOutputs,
) {
    let position = transform.translation;
    let aim_point = brain
        .target
        .map(|t| predict_aim_point(position, t.position, t.velocity, config.prediction_offset, delta))
        .unwrap_or(fallback_aim);

    if let Some(ranged) = config.ranged {
        let forward = flat(*transform.forward()).normalize_or_zero();
        let direction = flat(aim_point - position).try_normalize().unwrap_or(forward);

        spawn_projectile(
            &mut outputs.commands,
            ProjectileLaunch {
                owner: entity,
                owner_faction: actor.faction,
                origin: position,
                direction,
                speed: ranged.speed,
                lifetime: ranged.lifetime,
                damage: config.damage as f32,
                knockback: config.hit_force,
            },
        );
    } else if let Some(ability) = config.cast_ability {
        outputs.cast_requests.write(CastRequest::cast(entity, ability, aim_point));
    }
}

fn roam(
    entity: Entity,
    brain: &mut CreatureBrain,
    transform: &Transform,
    body: &mut KineticBody,
    collision: &CollisionWorld,
    rng: &mut DeterministicRng,
    signals: &mut EventWriter<AnimationSignal>,
) {
    let provider = collision.provider();
    let position = transform.translation;
    let forward = flat(*transform.forward()).normalize_or_zero();

    if is_going_to_hit_wall(provider, position, forward) {
        if let Some(destination) = body.destination {
            if faces_destination(position, forward, destination)
                || is_destination_blocked(provider, position, destination)
            {
                brain.roam_delay = None;
                match find_escape_destination(provider, &mut rng.rng, position, forward) {
                    Some(escape) => {
                        body.set_destination(escape);
                        apply_ai_commands(entity, &[AiCommand::Walk(true)], brain, body, transform, signals);
                    }
                    None => {
                        logger::log(&format!("🧱 {:?}: boxed in, roaming stopped", entity));
                        apply_ai_commands(
                            entity,
                            &[AiCommand::Stop, AiCommand::Walk(false)],
                            brain,
                            body,
                            transform,
                            signals,
                        );
                    }
                }
            }
        }
    }

    if body.destination.is_none() && brain.roam_delay.is_none() {
        brain.roam_delay = Some(RoamDelay {
            remaining: random_roam_delay(&mut rng.rng),
            destination: random_destination(&mut rng.rng, position, forward),
        });
        apply_ai_commands(entity, &[AiCommand::Walk(false)], brain, body, transform, signals);
    }
}

#[allow(clippy::too_many_arguments)]
fn on_death(
    entity: Entity,
    brain: &mut CreatureBrain,
    config: &CreatureConfig,
    transform: &Transform,
    shape: Option<&mut CollisionBody>,
    groups: Option<&mut CollisionGroups>,
    rng: &mut DeterministicRng,
    outputs: &mut AiOutputs,
) {
    brain.reset_combat();
    brain.domestication_timer = None;

    outputs.sounds.write(SoundCue {
        entity,
        sound: SoundKind::Death,
    });

    if let Some(shape) = shape {
        shape.layer = COLLISION_LAYER_DEAD;
        shape.mask = COLLISION_MASK_DEAD;
    }
    if let Some(groups) = groups {
        *groups = layers::dead_groups();
    }

    if rng.rng.gen::<f32>() < config.drop_chance {
        outputs.loot.write(LootDropped {
            source: entity,
            position: transform.translation,
        });
    }

    outputs
        .commands
        .entity(entity)
        .try_insert(DespawnAfter::new(config.disappear_time));

    logger::log(&format!(
        "💀 {:?} died, despawn in {:.1}s",
        entity, config.disappear_time
    ));
}
