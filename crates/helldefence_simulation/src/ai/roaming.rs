//! Roaming: случайные точки, wall probe, выход из тупика

use bevy::prelude::*;
use rand::Rng;

use crate::physics::layers::COLLISION_LAYER_WALLS;
use crate::physics::{flat, planar_angle_deg, rotate_yaw, CollisionProvider};

/// Дистанция до новой точки roaming
pub const ROAM_DISTANCE: f32 = 20.0;
/// Разброс дистанции при выходе из тупика (±)
pub const ESCAPE_DISTANCE_SPREAD: f32 = 10.0;
/// Дальность лучей wall probe
pub const PROBE_DISTANCE: f32 = 4.0;
/// Дальность проверки кандидатов при выходе из тупика
pub const ESCAPE_PROBE_DISTANCE: f32 = 10.0;
pub const ESCAPE_ATTEMPTS: usize = 20;
/// Боковые лучи probe и порог "смотрим на destination" (градусы)
pub const PROBE_SIDE_ANGLE: f32 = 30.0;

/// Лучи пускаем с высоты корпуса
fn probe_origin(position: Vec3) -> Vec3 {
    position + Vec3::Y
}

fn wall_hit(provider: &dyn CollisionProvider, origin: Vec3, direction: Vec3, distance: f32) -> bool {
    provider
        .raycast(origin, direction, distance, COLLISION_LAYER_WALLS)
        .is_some()
}

/// Три луча: forward и ±30°
pub fn is_going_to_hit_wall(provider: &dyn CollisionProvider, position: Vec3, forward: Vec3) -> bool {
    let origin = probe_origin(position);
    [0.0, -PROBE_SIDE_ANGLE, PROBE_SIDE_ANGLE]
        .into_iter()
        .any(|angle| wall_hit(provider, origin, rotate_yaw(forward, angle), PROBE_DISTANCE))
}

/// Луч в сторону destination упирается в стену
pub fn is_destination_blocked(provider: &dyn CollisionProvider, position: Vec3, destination: Vec3) -> bool {
    let direction = flat(destination - position);
    if direction.length_squared() <= f32::EPSILON {
        return false;
    }
    wall_hit(provider, probe_origin(position), direction, PROBE_DISTANCE)
}

pub fn faces_destination(position: Vec3, forward: Vec3, destination: Vec3) -> bool {
    let to_destination = flat(destination - position);
    to_destination.length_squared() > f32::EPSILON && planar_angle_deg(forward, to_destination) < PROBE_SIDE_ANGLE
}

/// Случайная точка roaming: heading в [1°, 360°) от forward, 20 вперёд
pub fn random_destination(rng: &mut impl Rng, position: Vec3, forward: Vec3) -> Vec3 {
    let angle = rng.gen_range(1.0..360.0_f32);
    position + rotate_yaw(flat(forward).normalize_or_zero(), angle) * ROAM_DISTANCE
}

/// Задержка перед тем, как пойти к новой точке
pub fn random_roam_delay(rng: &mut impl Rng) -> f32 {
    rng.gen_range(1.0..2.0)
}

/// До 20 попыток найти свободное направление в [30°, 330°) от forward
///
/// Возвращает новую destination (20 ± 10 вперёд по найденному направлению).
pub fn find_escape_destination(
    provider: &dyn CollisionProvider,
    rng: &mut impl Rng,
    position: Vec3,
    forward: Vec3,
) -> Option<Vec3> {
    let forward = flat(forward).normalize_or_zero();
    let origin = probe_origin(position);

    for _ in 0..ESCAPE_ATTEMPTS {
        let angle = rng.gen_range(PROBE_SIDE_ANGLE..360.0 - PROBE_SIDE_ANGLE);
        let direction = rotate_yaw(forward, angle);

        if !wall_hit(provider, origin, direction, ESCAPE_PROBE_DISTANCE) {
            let distance = ROAM_DISTANCE + rng.gen_range(-ESCAPE_DISTANCE_SPREAD..ESCAPE_DISTANCE_SPREAD);
            return Some(position + direction * distance);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::ArenaCollision;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn corridor_end() -> ArenaCollision {
        // Стена поперёк пути на z = 3
        ArenaCollision::default().with_wall(Vec2::new(-10.0, 3.0), Vec2::new(10.0, 3.0))
    }

    #[test]
    fn test_probe_detects_wall_ahead() {
        let arena = corridor_end();

        assert!(is_going_to_hit_wall(&arena, Vec3::ZERO, Vec3::Z));
        assert!(!is_going_to_hit_wall(&arena, Vec3::ZERO, -Vec3::Z));
    }

    #[test]
    fn test_side_ray_catches_wall() {
        // Стена справа-впереди под 30°, forward луч проходит мимо
        let arena = ArenaCollision::default().with_wall(Vec2::new(0.8, 2.0), Vec2::new(3.0, 2.0));

        assert!(!wall_hit(&arena, Vec3::Y, Vec3::Z, PROBE_DISTANCE));
        assert!(is_going_to_hit_wall(&arena, Vec3::ZERO, Vec3::Z));
    }

    #[test]
    fn test_faces_destination() {
        assert!(faces_destination(Vec3::ZERO, Vec3::Z, Vec3::new(1.0, 0.0, 10.0)));
        assert!(!faces_destination(Vec3::ZERO, Vec3::Z, Vec3::new(10.0, 0.0, 1.0)));
    }

    #[test]
    fn test_escape_finds_open_direction() {
        let arena = corridor_end();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let destination = find_escape_destination(&arena, &mut rng, Vec3::ZERO, Vec3::Z).expect("open space behind");
        let travelled = flat(destination).length();

        assert!(planar_angle_deg(Vec3::Z, destination) >= PROBE_SIDE_ANGLE - 1e-3, "Не прямо в стену");
        assert!((10.0..=30.0).contains(&travelled));
    }

    #[test]
    fn test_escape_fails_when_boxed_in() {
        let arena = ArenaCollision::square(2.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        assert_eq!(find_escape_destination(&arena, &mut rng, Vec3::ZERO, Vec3::Z), None);
    }

    #[test]
    fn test_random_destination_distance() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..16 {
            let destination = random_destination(&mut rng, Vec3::ZERO, Vec3::Z);
            assert!((flat(destination).length() - ROAM_DISTANCE).abs() < 1e-3);
            let delay = random_roam_delay(&mut rng);
            assert!((1.0..2.0).contains(&delay));
        }
    }
}
