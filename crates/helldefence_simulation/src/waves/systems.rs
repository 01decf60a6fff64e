//! Wave systems: director tick → spawn мобов, события, сброс special способностей

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use rand::Rng;

use super::archetypes::{spawn_creature, CreatureArchetypes};
use super::director::{WaveAction, WaveDirector, WaveSettings, WaveView};
use super::events::WaveEvent;
use super::source::ActiveWaveSource;
use crate::abilities::{AbilityCaster, CooldownTracker};
use crate::ai::CreatureCommand;
use crate::components::{Actor, Faction, Vitals};
use crate::logger;
use crate::signals::{SoundCue, SoundKind};
use crate::DeterministicRng;

/// Выходы director'а за шаг
#[derive(SystemParam)]
pub struct WaveOutputs<'w, 's> {
    commands: Commands<'w, 's>,
    wave_events: EventWriter<'w, WaveEvent>,
    creature_commands: EventWriter<'w, CreatureCommand>,
    sounds: EventWriter<'w, SoundCue>,
}

/// Система: один шаг WaveDirector
#[allow(clippy::too_many_arguments)]
pub fn run_wave_director(
    time: Res<Time<Fixed>>,
    settings: Res<WaveSettings>,
    source: Res<ActiveWaveSource>,
    archetypes: Res<CreatureArchetypes>,
    mut director: ResMut<WaveDirector>,
    mut rng: ResMut<DeterministicRng>,
    actors: Query<(Entity, &Actor, &Vitals)>,
    mut casters: Query<(&Actor, &mut AbilityCaster, &mut CooldownTracker)>,
    mut outputs: WaveOutputs,
) {
    if director.is_finished() {
        return;
    }

    let mut players: Vec<(Entity, bool)> = actors
        .iter()
        .filter(|(_, actor, _)| actor.faction == Faction::Player)
        .map(|(entity, _, vitals)| (entity, vitals.is_alive()))
        .collect();
    players.sort();

    // Моб волны "жив", пока он существует, жив и всё ещё враг игроку
    let wave_alive = director.spawned.iter().any(|mob| {
        actors
            .get(*mob)
            .is_ok_and(|(_, actor, vitals)| vitals.is_alive() && actor.faction == Faction::Mob)
    });

    let view = WaveView {
        wave_alive,
        players_present: players.len(),
        players_alive: players.iter().filter(|(_, alive)| *alive).count(),
    };

    let actions = director.tick(time.delta_secs(), &settings, source.source(), view);
    let health_multiplier = settings.health_multiplier(players.len());

    for action in actions {
        match action {
            WaveAction::Started { wave, mobs } => {
                outputs.wave_events.write(WaveEvent::Started { wave });
                for (player, _) in &players {
                    outputs.sounds.write(SoundCue {
                        entity: *player,
                        sound: SoundKind::WaveStarted,
                    });
                }
                logger::log_info(&format!("🌊 Wave {} started ({} mobs)", wave, mobs));
            }
            WaveAction::Spawn(id) => {
                let Some(archetype) = archetypes.get(&id) else {
                    logger::log_warning(&format!("Wave {}: unknown archetype '{}', skipped", director.wave, id));
                    continue;
                };

                let spawn_point = if settings.spawn_points.is_empty() {
                    Vec3::ZERO
                } else {
                    settings.spawn_points[rng.rng.gen_range(0..settings.spawn_points.len())]
                };
                let spread = settings.destination_spread.max(f32::EPSILON);
                let destination = Vec3::new(
                    rng.rng.gen_range(-spread..spread),
                    0.0,
                    rng.rng.gen_range(-spread..spread),
                );

                let mob = spawn_creature(&mut outputs.commands, archetype, spawn_point, health_multiplier);
                outputs
                    .creature_commands
                    .write(CreatureCommand::set_destination(mob, destination));
                director.spawned.push(mob);

                logger::log(&format!("👹 Spawned {} {:?} at {:?}", id, mob, spawn_point));
            }
            WaveAction::SpawningFinished { wave } => {
                logger::log(&format!("🌊 Wave {}: all {} mobs spawned", wave, director.spawned.len()));
            }
            WaveAction::Cleared { wave } => {
                outputs.wave_events.write(WaveEvent::Cleared { wave });

                // Special способности живут одну волну
                for (actor, mut caster, mut tracker) in casters.iter_mut() {
                    if actor.faction == Faction::Player {
                        caster.clear_special_ability(&mut tracker);
                    }
                }
                logger::log_info(&format!("✅ Wave {} cleared", wave));
            }
            WaveAction::Won { waves_cleared } => {
                outputs.wave_events.write(WaveEvent::Won { waves_cleared });
                logger::log_info(&format!("🏆 Arena won after {} waves", waves_cleared));
            }
            WaveAction::GameOver { wave } => {
                outputs.wave_events.write(WaveEvent::GameOver { wave });
                logger::log_info(&format!("💀 Game over on wave {}", wave));
            }
        }
    }
}
