//! HellDefence Simulation Core
//!
//! ECS-симуляция волновой арены на Bevy 0.16 (headless, fixed step 60Hz)
//!
//! Архитектура:
//! - ECS = игровые правила (AI, способности, статы, урон, волны)
//! - Host (движок/клиент) = рендер, анимации, звук; читает signals, пишет PlayerInput
//! - Физика снаружи: CollisionProvider (headless ArenaCollision или rapier)
//!
//! Порядок шага (FixedUpdate, SimulationSet):
//! Input → Stats → Ai → Abilities → Combat → Movement → Lifecycle

use std::time::Duration;

use bevy::ecs::schedule::ExecutorKind;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod abilities;
pub mod ai;
pub mod combat;
pub mod components;
pub mod logger;
pub mod physics;
pub mod pickups;
pub mod player;
pub mod signals;
pub mod stats;
pub mod waves;

// Re-export базовых типов для удобства
pub use abilities::{AbilitiesPlugin, AbilityCaster, AbilityCatalog, AbilityId, CastError, CastRequest, CooldownTracker};
pub use ai::{AIPlugin, AIState, CreatureBrain, CreatureCommand, CreatureConfig};
pub use combat::{CombatPlugin, DamageDealt, DamageRequest, Dead, EntityDied};
pub use components::*;
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel, LogPrinter};
pub use physics::{ArenaCollision, CollisionWorld, KineticBody, KineticMode, PhysicsPlugin};
pub use pickups::PickupsPlugin;
pub use player::{spawn_player, PlayerController, PlayerInput, PlayerPlugin};
pub use signals::{AnimationSignal, AnimationSignalKind, SignalsPlugin, SoundCue, VisualCue};
pub use stats::{StatAggregator, StatModifier, StatsPlugin};
pub use waves::{WaveDirector, WaveEvent, WaveSource, WaveTable, WavesPlugin};

/// Fixed simulation rate
pub const SIMULATION_HZ: f64 = 60.0;

/// Длительность одного шага симуляции
pub fn simulation_timestep() -> Duration {
    Duration::from_secs_f64(1.0 / SIMULATION_HZ)
}

/// Фазы шага симуляции (FixedUpdate), строго последовательно
///
/// События между фазами: Input → CastRequest → Abilities; contacts (Movement) →
/// Combat следующего шага и Lifecycle этого же шага.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// PlayerInput, sync collision bodies
    Input,
    /// Модификаторы → DerivedStats → Vitals/KineticBody, регенерация
    Stats,
    /// Perception + FSM существ
    Ai,
    /// Cast machine, кулдауны, эффекты
    Abilities,
    /// Attack contacts, снаряды, урон, смерть
    Combat,
    /// Kinetic bodies → velocity → позиция, стены, контакты
    Movement,
    /// Pickups, волны, деспавн
    Lifecycle,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Host может вставить свой seed заранее
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        // Один поток в fixed step: порядок spawn'ов и RNG не зависит от планировщика
        app.edit_schedule(FixedUpdate, |schedule| {
            schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        });

        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_duration(simulation_timestep()))
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Input,
                    SimulationSet::Stats,
                    SimulationSet::Ai,
                    SimulationSet::Abilities,
                    SimulationSet::Combat,
                    SimulationSet::Movement,
                    SimulationSet::Lifecycle,
                )
                    .chain(),
            )
            // Подсистемы
            .add_plugins((
                SignalsPlugin,
                PhysicsPlugin,
                StatsPlugin,
                AbilitiesPlugin,
                AIPlugin,
                CombatPlugin,
                PickupsPlugin,
                WavesPlugin,
                PlayerPlugin,
            ));
    }
}

/// Детерминистичный RNG resource (seeded)
///
/// Все случайные решения (роуминг, точки спавна, лут, buff stands) идут через него.
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт headless App: MinimalPlugins + вся симуляция, время ручное
///
/// Каждый `app.update()` продвигает время ровно на один fixed step,
/// поэтому прогон не зависит от wall clock.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(TimeUpdateStrategy::ManualDuration(simulation_timestep()))
        .add_plugins(SimulationPlugin);

    // Первый update только запускает часы (delta = 0, FixedUpdate не идёт)
    app.update();

    app
}

/// Один шаг симуляции (один FixedUpdate)
pub fn step_simulation(app: &mut App) {
    app.update();
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
