//! Arena integration test
//!
//! Полный headless App (SimulationPlugin): игроки + волны + AI + урон
//!
//! Проверяем:
//! - Волна стартует и спавнит мобов по таблице
//! - Смерть всех мобов → Cleared → следующая волна
//! - Смерть всех игроков → GameOver
//! - Инварианты Vitals/Transform на длинном прогоне, без паники

use bevy::prelude::*;
use helldefence_simulation::abilities::AbilityId;
use helldefence_simulation::ai::CreatureBrain;
use helldefence_simulation::waves::{ActiveWaveSource, WaveSettings};
use helldefence_simulation::*;

/// Helper: headless арена с быстрыми волнами из `table`
fn create_arena_app(seed: u64, table: WaveTable) -> App {
    let mut app = create_headless_app(seed);
    set_log_level(LogLevel::Warning);

    let settings = WaveSettings {
        prepare_time: 0.5,
        spawn_delay: 0.5,
        spawn_interval: 0.2,
        max_waves: 3,
        ..Default::default()
    };
    app.insert_resource(WaveDirector::new(&settings))
        .insert_resource(settings)
        .insert_resource(ActiveWaveSource::new(table))
        .insert_resource(CollisionWorld::new(ArenaCollision::square(25.0)));

    app
}

fn spawn_test_player(app: &mut App, position: Vec3) -> Entity {
    let player = spawn_player(&mut app.world_mut().commands(), position, [AbilityId::Fireball]);
    app.world_mut().flush();
    player
}

/// Шаг + события волн этого шага
fn step_collect(app: &mut App, events: &mut Vec<WaveEvent>) {
    step_simulation(app);
    events.extend(
        app.world()
            .resource::<Events<WaveEvent>>()
            .iter_current_update_events()
            .copied(),
    );
}

fn living_mobs(app: &mut App) -> Vec<Entity> {
    let world = app.world_mut();
    let mut query = world.query::<(Entity, &Actor, &Vitals)>();
    let mut mobs: Vec<Entity> = query
        .iter(world)
        .filter(|(_, actor, vitals)| actor.faction == Faction::Mob && vitals.is_alive())
        .map(|(entity, _, _)| entity)
        .collect();
    mobs.sort();
    mobs
}

fn imps(count: usize) -> Vec<waves::ArchetypeId> {
    (0..count).map(|_| "imp".into()).collect()
}

/// Test: первая волна стартует и спавнит мобов таблицы
#[test]
fn test_wave_spawns_mobs() {
    let mut app = create_arena_app(42, WaveTable::new(vec![imps(3), imps(1)]));
    spawn_test_player(&mut app, Vec3::ZERO);

    let mut events = Vec::new();
    // 0.5 prepare + 0.5 delay + 2 × 0.2 interval < 2 s
    for _ in 0..120 {
        step_collect(&mut app, &mut events);
    }

    assert!(events.contains(&WaveEvent::Started { wave: 1 }));
    let mobs = living_mobs(&mut app);
    assert_eq!(mobs.len(), 3);
    for mob in mobs {
        assert!(app.world().get::<CreatureBrain>(mob).is_some());
    }
    assert_eq!(app.world().resource::<WaveDirector>().wave, 1);
}

/// Test: все мобы волны мертвы → Cleared, следующая волна
#[test]
fn test_killing_wave_clears_it() {
    let mut app = create_arena_app(7, WaveTable::new(vec![imps(2), imps(1)]));
    spawn_test_player(&mut app, Vec3::ZERO);

    let mut events = Vec::new();
    for _ in 0..90 {
        step_collect(&mut app, &mut events);
    }
    let mobs = living_mobs(&mut app);
    assert_eq!(mobs.len(), 2);

    for mob in mobs {
        if let Some(mut vitals) = app.world_mut().get_mut::<Vitals>(mob) {
            vitals.decrease(10_000);
        }
    }

    // Проверка зачистки раз в 3 s
    for _ in 0..(60 * 5) {
        step_collect(&mut app, &mut events);
    }

    assert!(events.contains(&WaveEvent::Cleared { wave: 1 }), "events: {:?}", events);
    assert_eq!(app.world().resource::<WaveDirector>().wave, 2);
}

/// Test: все игроки мертвы → GameOver
#[test]
fn test_all_players_dead_is_game_over() {
    let mut app = create_arena_app(3, WaveTable::new(vec![imps(1)]));
    let player = spawn_test_player(&mut app, Vec3::ZERO);

    if let Some(mut vitals) = app.world_mut().get_mut::<Vitals>(player) {
        vitals.decrease(10_000);
    }

    let mut events = Vec::new();
    // GameOver проверяется раз в 5 s
    for _ in 0..(60 * 6) {
        step_collect(&mut app, &mut events);
    }

    assert!(events.contains(&WaveEvent::GameOver { wave: 1 }), "events: {:?}", events);
    assert!(app.world().resource::<WaveDirector>().is_finished());
    assert!(app.world().get::<Dead>(player).is_some());
}

/// Test: инварианты на длинном прогоне с дефолтными archetypes
#[test]
fn test_arena_invariants_30_seconds() {
    let table = WaveTable::new(vec![
        vec!["imp".into(), "brute".into(), "thrower".into(), "shaman".into()],
        imps(4),
    ]);
    let mut app = create_arena_app(123, table);
    spawn_test_player(&mut app, Vec3::new(-2.0, 0.0, 0.0));
    spawn_test_player(&mut app, Vec3::new(2.0, 0.0, 0.0));

    let mut events = Vec::new();
    for tick in 0..(60 * 30) {
        step_collect(&mut app, &mut events);

        if tick % 30 == 0 {
            check_invariants(&mut app, tick);
        }
    }

    assert!(events.contains(&WaveEvent::Started { wave: 1 }));
}

// --- Helpers ---

fn check_invariants(app: &mut App, tick: usize) {
    let world = app.world_mut();

    let mut vitals = world.query::<(Entity, &Vitals)>();
    for (entity, vitals) in vitals.iter(world) {
        assert!(
            vitals.current <= vitals.max,
            "Tick {}: {:?} health.current ({}) > health.max ({})",
            tick,
            entity,
            vitals.current,
            vitals.max
        );
    }

    let mut transforms = world.query::<(Entity, &Transform)>();
    for (entity, transform) in transforms.iter(world) {
        assert!(
            transform.translation.is_finite(),
            "Tick {}: {:?} position is not finite: {:?}",
            tick,
            entity,
            transform.translation
        );
    }
}
