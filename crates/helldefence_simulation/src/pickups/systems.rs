//! Pickup systems: лут → аптечки, таймеры аптечек, подбор, розыгрыш стендов

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::components::{roll_buff_reward, BuffReward, BuffStand, HealthKit, PickupSettings};
use super::events::{LootDropped, PickupCollected, PickupKind};
use crate::abilities::{AbilityCaster, CooldownTracker};
use crate::components::{Actor, Faction, Vitals};
use crate::logger;
use crate::physics::layers::{COLLISION_LAYER_ACTORS, COLLISION_LAYER_PICKUPS};
use crate::physics::{CollisionBody, ContactEvent, ContactSource};
use crate::signals::{SoundCue, SoundKind, VisualCue, VisualKind};
use crate::stats::StatAggregator;
use crate::waves::WaveEvent;
use crate::DeterministicRng;

type CollectorItem = (
    &'static Actor,
    &'static mut Vitals,
    &'static Transform,
    Option<&'static mut StatAggregator>,
    Option<&'static mut AbilityCaster>,
    Option<&'static mut CooldownTracker>,
);

/// Выходы подбора
#[derive(SystemParam)]
pub struct PickupOutputs<'w> {
    collected: EventWriter<'w, PickupCollected>,
    sounds: EventWriter<'w, SoundCue>,
    visuals: EventWriter<'w, VisualCue>,
}

/// Spawn аптечки (trigger на слое Pickups)
pub fn spawn_health_kit(commands: &mut Commands, position: Vec3, settings: &PickupSettings) -> Entity {
    commands
        .spawn((
            Transform::from_translation(position),
            HealthKit::from_settings(settings),
            CollisionBody::new(settings.pickup_radius, COLLISION_LAYER_PICKUPS, COLLISION_LAYER_ACTORS),
        ))
        .id()
}

/// Spawn пустого buff stand'а (награда появится на старте волны)
pub fn spawn_buff_stand(commands: &mut Commands, position: Vec3, settings: &PickupSettings) -> Entity {
    commands
        .spawn((
            Transform::from_translation(position),
            BuffStand::default(),
            CollisionBody::new(settings.pickup_radius, COLLISION_LAYER_PICKUPS, COLLISION_LAYER_ACTORS),
        ))
        .id()
}

/// Система: LootDropped → аптечка на месте трупа
pub fn spawn_loot_health_kits(
    mut commands: Commands,
    mut loot: EventReader<LootDropped>,
    settings: Res<PickupSettings>,
) {
    for drop in loot.read() {
        let kit = spawn_health_kit(&mut commands, drop.position, &settings);
        logger::log(&format!("💊 {:?} dropped health kit {:?}", drop.source, kit));
    }
}

/// Система: задержка подбора + время жизни аптечек
pub fn tick_health_kits(mut commands: Commands, mut kits: Query<(Entity, &mut HealthKit)>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for (entity, mut kit) in kits.iter_mut() {
        kit.pickable_in = (kit.pickable_in - delta).max(0.0);
        kit.remaining_lifetime -= delta;
        if kit.remaining_lifetime <= 0.0 {
            commands.entity(entity).despawn();
        }
    }
}

/// Система: игрок касается аптечки или стенда
pub fn collect_pickups(
    mut commands: Commands,
    mut contacts: EventReader<ContactEvent>,
    kits: Query<&HealthKit>,
    mut stands: Query<&mut BuffStand>,
    mut collectors: Query<CollectorItem>,
    mut outputs: PickupOutputs,
) {
    let mut consumed: Vec<Entity> = Vec::new();

    for contact in contacts.read() {
        if contact.source != ContactSource::Body {
            continue;
        }

        for (pickup, collector) in [(contact.a, contact.b), (contact.b, contact.a)] {
            if consumed.contains(&pickup) {
                continue;
            }

            let Ok((actor, mut vitals, transform, aggregator, caster, tracker)) = collectors.get_mut(collector) else {
                continue;
            };
            if actor.faction != Faction::Player || vitals.is_dead() {
                continue;
            }

            if let Ok(kit) = kits.get(pickup) {
                if !kit.is_pickable() {
                    continue;
                }

                vitals.increase(kit.amount);
                consumed.push(pickup);
                commands.entity(pickup).despawn();

                outputs.visuals.write(VisualCue {
                    kind: VisualKind::Heal,
                    position: transform.translation,
                    attach_to: Some(collector),
                });
                finish_pickup(&mut outputs, collector, pickup, PickupKind::HealthKit { amount: kit.amount });
                logger::log(&format!("💊 {:?} picked up health kit (+{})", collector, kit.amount));
                continue;
            }

            let Ok(mut stand) = stands.get_mut(pickup) else {
                continue;
            };
            let Some(reward) = stand.take() else {
                continue;
            };
            consumed.push(pickup);

            let visual = match reward {
                BuffReward::Stat(modifier) => {
                    match aggregator {
                        Some(mut aggregator) => {
                            aggregator.add_modifier(modifier);
                        }
                        None => logger::log_warning(&format!("{:?} has no StatAggregator for stat buff", collector)),
                    }
                    VisualKind::StatBuff
                }
                BuffReward::Special(ability) => {
                    match (caster, tracker) {
                        (Some(mut caster), Some(mut tracker)) => caster.set_special_ability(ability, &mut tracker),
                        _ => logger::log_warning(&format!("{:?} cannot hold special ability {:?}", collector, ability)),
                    }
                    VisualKind::AbilityGranted
                }
                BuffReward::FullHeal => {
                    vitals.restore_full();
                    VisualKind::Heal
                }
            };

            outputs.visuals.write(VisualCue {
                kind: visual,
                position: transform.translation,
                attach_to: Some(collector),
            });
            finish_pickup(&mut outputs, collector, pickup, PickupKind::Buff(reward));
            logger::log_info(&format!("✨ {:?} took buff {:?}", collector, reward));
        }
    }
}

fn finish_pickup(outputs: &mut PickupOutputs, collector: Entity, pickup: Entity, kind: PickupKind) {
    outputs.sounds.write(SoundCue {
        entity: collector,
        sound: SoundKind::Pickup,
    });
    outputs.collected.write(PickupCollected {
        collector,
        pickup,
        kind,
    });
}

/// Система: на старте волны стенды разыгрывают новые награды
pub fn refresh_buff_stands(
    mut wave_events: EventReader<WaveEvent>,
    mut stands: Query<(Entity, &mut BuffStand)>,
    settings: Res<PickupSettings>,
    mut rng: ResMut<DeterministicRng>,
) {
    let started = wave_events
        .read()
        .filter(|event| matches!(event, WaveEvent::Started { .. }))
        .count();
    if started == 0 {
        return;
    }

    let mut entities: Vec<Entity> = stands.iter().map(|(entity, _)| entity).collect();
    entities.sort();

    for entity in entities {
        let Ok((_, mut stand)) = stands.get_mut(entity) else {
            continue;
        };
        stand.reward = roll_buff_reward(&settings, &mut rng.rng);
        logger::log(&format!("🎁 BuffStand {:?}: {:?}", entity, stand.reward));
    }
}
