//! Headless симуляция HellDefence
//!
//! Арена 50×50, два игрока-бота против волн. Печатает события волн и итог.
//! Seed: первый аргумент (по умолчанию 42).

use bevy::prelude::*;
use helldefence_simulation::abilities::AbilityId;
use helldefence_simulation::{
    create_headless_app, set_log_level, spawn_player, step_simulation, AbilityCaster, Actor, ArenaCollision,
    CollisionWorld, Faction, LogLevel, PlayerController, PlayerInput, Vitals, WaveDirector, WaveEvent,
};

const ARENA_HALF_SIZE: f32 = 25.0;
/// 10 минут игрового времени
const MAX_STEPS: u32 = 60 * 60 * 10;

fn main() {
    let seed = std::env::args().nth(1).and_then(|arg| arg.parse().ok()).unwrap_or(42);
    println!("Starting HellDefence headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    set_log_level(LogLevel::Info);
    app.insert_resource(CollisionWorld::new(ArenaCollision::square(ARENA_HALF_SIZE)));

    let players: Vec<Entity> = [Vec3::new(-2.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)]
        .into_iter()
        .map(|position| spawn_player(&mut app.world_mut().commands(), position, [AbilityId::Fireball]))
        .collect();
    app.world_mut().flush();

    for step in 0..MAX_STEPS {
        drive_bots(app.world_mut(), &players);
        step_simulation(&mut app);

        for event in app.world().resource::<Events<WaveEvent>>().iter_current_update_events() {
            println!("Step {}: {:?}", step, event);
        }

        if step % 600 == 0 {
            let entity_count = app.world().entities().len();
            let director = app.world().resource::<WaveDirector>();
            println!(
                "Step {}: {} entities, wave {} ({})",
                step,
                entity_count,
                director.wave,
                director.phase.as_str()
            );
        }

        if app.world().resource::<WaveDirector>().is_finished() {
            break;
        }
    }

    let director = app.world().resource::<WaveDirector>();
    println!(
        "Simulation complete: {} after {} cleared waves",
        director.phase.as_str(),
        director.waves_cleared()
    );
}

/// Простейший бот: выбрать Fireball, навести на ближайшего моба, кастовать
fn drive_bots(world: &mut World, players: &[Entity]) {
    let mut actors = world.query::<(&Actor, &Vitals, &Transform)>();
    let mobs: Vec<Vec3> = actors
        .iter(world)
        .filter(|(actor, vitals, _)| actor.faction == Faction::Mob && vitals.is_alive())
        .map(|(_, _, transform)| transform.translation)
        .collect();

    for &player in players {
        let Some(position) = world.get::<Transform>(player).map(|t| t.translation) else {
            continue;
        };
        let selected = world.get::<AbilityCaster>(player).and_then(|caster| caster.selected());
        let target = mobs
            .iter()
            .copied()
            .min_by(|a, b| a.distance_squared(position).total_cmp(&b.distance_squared(position)));

        let Some(target) = target else {
            continue;
        };

        if selected.is_some() {
            if let Some(mut controller) = world.get_mut::<PlayerController>(player) {
                controller.aim_offset = Vec3::new(target.x - position.x, 0.0, target.z - position.z);
            }
        }
        if let Some(mut input) = world.get_mut::<PlayerInput>(player) {
            input.press(AbilityId::Fireball);
        }
    }
}
