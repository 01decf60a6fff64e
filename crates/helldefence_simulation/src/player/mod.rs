//! Player module: управление игроком
//!
//! Архитектура:
//! - components: PlayerInput (пишет host), PlayerController (прицел, Walk флаг)
//! - systems: input → CastRequest/direction, смерть игрока, spawn_player
//!
//! Акторы с PlayerController не имеют CreatureBrain: AI их не трогает.

use bevy::prelude::*;

pub mod components;
pub mod systems;


pub use components::{PlayerController, PlayerInput, AIM_ORBIT_SPEED, AIM_RADIAL_SPEED};
pub use systems::{handle_player_death, handle_player_input, spawn_player};

use crate::SimulationSet;

/// Player Plugin
///
/// Порядок выполнения (SimulationSet::Input):
/// 1. handle_player_death
/// 2. handle_player_input
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<PlayerController>().add_systems(
            FixedUpdate,
            (systems::handle_player_death, systems::handle_player_input)
                .chain()
                .in_set(SimulationSet::Input),
        );
    }
}
