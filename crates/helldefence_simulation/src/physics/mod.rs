//! Physics module: kinetic движение + collision provider
//!
//! Архитектура:
//! - kinetic: KineticBody (intent + impulse → velocity/orientation)
//! - collision: CollisionProvider trait, CollisionWorld resource, ArenaCollision (headless)
//! - layers: битовые маски слоёв + rapier CollisionGroups
//! - systems: step/интеграция/стены/контакты/rapier sync

use bevy::prelude::*;

pub mod collision;
pub mod kinetic;
pub mod layers;
pub mod systems;

pub use collision::{
    is_wall_between, ArenaCollision, BodyProxy, CollisionProvider, CollisionWorld, ContactEvent, ContactPhase,
    ContactSource, RayHit, Wall,
};
pub use kinetic::{flat, look_rotation, planar_angle_deg, rotate_yaw, KineticBody, KineticMode, RotationEase, IMPULSE_SCALE};
pub use systems::{spawn_kinetic_character, AttackVolume, CollisionBody};

use crate::SimulationSet;

/// Physics Plugin
///
/// Порядок выполнения (SimulationSet::Movement):
/// 1. drive_kinetic_bodies
/// 2. integrate_kinetic_bodies (headless)
/// 3. resolve_wall_contacts
/// 4. sync_velocity_to_rapier
/// 5. sync_collision_bodies
/// 6. detect_contacts
pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CollisionWorld>()
            .add_event::<ContactEvent>()
            .register_type::<KineticBody>()
            .register_type::<CollisionBody>()
            .add_systems(FixedUpdate, systems::sync_collision_bodies.in_set(SimulationSet::Input))
            .add_systems(
                FixedUpdate,
                (
                    systems::drive_kinetic_bodies,
                    systems::integrate_kinetic_bodies,
                    systems::resolve_wall_contacts,
                    systems::sync_velocity_to_rapier,
                    systems::sync_collision_bodies,
                    systems::detect_contacts,
                )
                    .chain()
                    .in_set(SimulationSet::Movement),
            );
    }
}
