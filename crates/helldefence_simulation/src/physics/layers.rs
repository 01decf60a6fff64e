//! Collision Layers Constants
//!
//! Centralised константы слоёв для всего проекта.
//!
//! ## Архитектура:
//! - **Layers (битовая маска):** На каком слое находится объект
//! - **Mask (битовая маска):** С какими слоями объект коллидирует
//!
//! ## Layers:
//! - Layer 1 (0b1 = 1): Actors (игроки, мобы, питомцы)
//! - Layer 2 (0b10 = 2): Walls (стены арены, препятствия)
//! - Layer 3 (0b100 = 4): Projectiles (снаряды мобов, fireball)
//! - Layer 4 (0b1000 = 8): Pickups (аптечки, buff stands)
//! - Layer 5 (0b10000 = 16): Dead (трупы: ни с чем не коллидируют)

use bevy_rapier3d::prelude::{CollisionGroups, Group};

// ============================================================================
// Layer Битовые Маски (на каком слое объект находится)
// ============================================================================

pub const COLLISION_LAYER_ACTORS: u32 = 0b1;

pub const COLLISION_LAYER_WALLS: u32 = 0b10;

pub const COLLISION_LAYER_PROJECTILES: u32 = 0b100;

pub const COLLISION_LAYER_PICKUPS: u32 = 0b1000;

pub const COLLISION_LAYER_DEAD: u32 = 0b10000;

// ============================================================================
// Mask Битовые Маски (с чем объект коллидирует)
// ============================================================================

/// Actors коллайдят с Actors + Walls + Pickups (триггеры)
pub const COLLISION_MASK_ACTORS: u32 = COLLISION_LAYER_ACTORS | COLLISION_LAYER_WALLS | COLLISION_LAYER_PICKUPS;

/// Projectiles коллайдят с Actors + Walls, не друг с другом
pub const COLLISION_MASK_PROJECTILES: u32 = COLLISION_LAYER_ACTORS | COLLISION_LAYER_WALLS;

/// Трупы лежат только на стенах/полу
pub const COLLISION_MASK_DEAD: u32 = COLLISION_LAYER_WALLS;

/// Raycast для wall-occlusion (AI LOS, roaming probe)
pub const COLLISION_MASK_RAYCAST_WALLS: u32 = COLLISION_LAYER_WALLS;

// ============================================================================
// Rapier helpers
// ============================================================================

pub fn groups(layer: u32, mask: u32) -> CollisionGroups {
    CollisionGroups::new(Group::from_bits_truncate(layer), Group::from_bits_truncate(mask))
}

pub fn actor_groups() -> CollisionGroups {
    groups(COLLISION_LAYER_ACTORS, COLLISION_MASK_ACTORS)
}

pub fn projectile_groups() -> CollisionGroups {
    groups(COLLISION_LAYER_PROJECTILES, COLLISION_MASK_PROJECTILES)
}

pub fn dead_groups() -> CollisionGroups {
    groups(COLLISION_LAYER_DEAD, COLLISION_MASK_DEAD)
}

/// Получить название слоя для debug логов
pub fn get_layer_name(layer_bits: u32) -> &'static str {
    match layer_bits {
        COLLISION_LAYER_ACTORS => "Actors",
        COLLISION_LAYER_WALLS => "Walls",
        COLLISION_LAYER_PROJECTILES => "Projectiles",
        COLLISION_LAYER_PICKUPS => "Pickups",
        COLLISION_LAYER_DEAD => "Dead",
        _ => "Unknown",
    }
}

/// Должны ли объекты на этих слоях/масках взаимодействовать
pub fn interacts(layer_a: u32, mask_a: u32, layer_b: u32, mask_b: u32) -> bool {
    (layer_a & mask_b) != 0 && (layer_b & mask_a) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dead_bodies_ignore_actors() {
        assert!(!interacts(COLLISION_LAYER_DEAD, COLLISION_MASK_DEAD, COLLISION_LAYER_ACTORS, COLLISION_MASK_ACTORS));
        assert!(interacts(COLLISION_LAYER_ACTORS, COLLISION_MASK_ACTORS, COLLISION_LAYER_ACTORS, COLLISION_MASK_ACTORS));
    }

    #[test]
    fn test_projectiles_ignore_projectiles() {
        assert!(!interacts(
            COLLISION_LAYER_PROJECTILES,
            COLLISION_MASK_PROJECTILES,
            COLLISION_LAYER_PROJECTILES,
            COLLISION_MASK_PROJECTILES
        ));
        assert!(interacts(
            COLLISION_LAYER_PROJECTILES,
            COLLISION_MASK_PROJECTILES,
            COLLISION_LAYER_ACTORS,
            COLLISION_MASK_ACTORS
        ));
    }

    #[test]
    fn test_layer_names() {
        assert_eq!(get_layer_name(COLLISION_LAYER_WALLS), "Walls");
        assert_eq!(get_layer_name(0b1100), "Unknown");
    }
}
