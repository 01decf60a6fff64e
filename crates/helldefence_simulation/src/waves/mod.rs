//! Waves module: волны мобов на арене
//!
//! Архитектура:
//! - source: WaveSource trait (`get_wave(n)`), WaveTable (serde), WaveError
//! - archetypes: CreatureArchetypes resource + spawn_creature
//! - director: WaveDirector state machine (чистая, `tick → Vec<WaveAction>`)
//! - systems: run_wave_director (spawn, события, сброс special способностей)

use bevy::prelude::*;

pub mod archetypes;
pub mod director;
pub mod events;
pub mod source;
pub mod systems;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod director_tests;

// Re-exports
pub use archetypes::{spawn_creature, CreatureArchetype, CreatureArchetypes};
pub use director::{WaveAction, WaveDirector, WavePhase, WaveSettings, WaveView};
pub use events::WaveEvent;
pub use source::{ActiveWaveSource, ArchetypeId, WaveError, WaveSource, WaveTable};

use crate::SimulationSet;

/// Waves plugin
///
/// Director стартует в BeforeWave сразу после добавления plugin'а.
/// Host может вставить свои WaveSettings / ActiveWaveSource / CreatureArchetypes заранее.
pub struct WavesPlugin;

impl Plugin for WavesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WaveSettings>()
            .init_resource::<ActiveWaveSource>()
            .init_resource::<CreatureArchetypes>()
            .add_event::<WaveEvent>();

        // Director читает settings, вставленные host'ом
        if !app.world().contains_resource::<WaveDirector>() {
            let director = WaveDirector::new(app.world().resource::<WaveSettings>());
            app.insert_resource(director);
        }

        app.add_systems(FixedUpdate, systems::run_wave_director.in_set(SimulationSet::Lifecycle));
    }
}
