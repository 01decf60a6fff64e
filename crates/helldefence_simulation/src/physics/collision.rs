//! Collision provider: внешний мир коллизий для ядра
//!
//! Ядро не решает коллизии само, а делает синхронные запросы:
//! - `overlap_sphere`: кто в радиусе (target acquisition, domestication, attack volume)
//! - `raycast`: wall occlusion, roaming probe
//! - контакты приходят событиями `ContactEvent`
//!
//! `ArenaCollision`: headless реализация (стены-отрезки + тела-круги в плоскости XZ).
//! Движок-хост может подставить свою реализацию через `CollisionWorld::new`.

use bevy::prelude::*;

use super::kinetic::flat;
use super::layers::{COLLISION_LAYER_ACTORS, COLLISION_LAYER_WALLS};
use crate::components::Faction;

/// Результат raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// `None` для стен
    pub entity: Option<Entity>,
    pub point: Vec3,
    pub distance: f32,
    pub layer: u32,
}

/// Тело, зарегистрированное в provider'е на этот шаг
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyProxy {
    pub entity: Entity,
    pub position: Vec3,
    pub radius: f32,
    pub faction: Faction,
    pub layer: u32,
}

pub trait CollisionProvider: Send + Sync + 'static {
    /// Entities, чьи тела пересекают сферу (опционально: только указанной фракции)
    fn overlap_sphere(&self, center: Vec3, radius: f32, faction: Option<Faction>) -> Vec<Entity>;

    /// Ближайшее попадание луча по слоям `layers`
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, layers: u32) -> Option<RayHit>;

    /// Обновить тела (headless провайдер хранит копию позиций)
    fn sync_bodies(&mut self, _bodies: &[BodyProxy]) {}

    /// Выталкивание круга из стен; `None`: контакта нет
    fn resolve_walls(&self, _position: Vec3, _radius: f32) -> Option<Vec3> {
        None
    }
}

/// Resource: активный collision provider
#[derive(Resource)]
pub struct CollisionWorld {
    provider: Box<dyn CollisionProvider>,
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self::new(ArenaCollision::default())
    }
}

impl CollisionWorld {
    pub fn new(provider: impl CollisionProvider) -> Self {
        Self {
            provider: Box::new(provider),
        }
    }

    pub fn provider(&self) -> &dyn CollisionProvider {
        self.provider.as_ref()
    }

    pub fn provider_mut(&mut self) -> &mut dyn CollisionProvider {
        self.provider.as_mut()
    }

    /// Стена между двумя точками?
    pub fn is_wall_between(&self, from: Vec3, to: Vec3) -> bool {
        is_wall_between(self.provider(), from, to)
    }
}

pub fn is_wall_between(provider: &dyn CollisionProvider, from: Vec3, to: Vec3) -> bool {
    let delta = flat(to - from);
    let distance = delta.length();
    if distance <= f32::EPSILON {
        return false;
    }

    provider
        .raycast(from, delta / distance, distance, COLLISION_LAYER_WALLS)
        .is_some_and(|hit| hit.distance < distance)
}

/// Фаза контакта (trigger callbacks)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Begin,
    Stay,
}

/// Что именно коснулось: тело или trigger volume атаки (`a`: владелец volume)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactSource {
    Body,
    AttackVolume,
}

/// Событие: контакт двух тел (от provider'а или headless detection)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ContactEvent {
    pub a: Entity,
    pub b: Entity,
    pub phase: ContactPhase,
    pub source: ContactSource,
}

impl ContactEvent {
    /// Второй участник контакта, если `entity`: один из них
    pub fn other(&self, entity: Entity) -> Option<Entity> {
        if self.a == entity {
            Some(self.b)
        } else if self.b == entity {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Стена: отрезок в плоскости XZ
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wall {
    pub start: Vec2,
    pub end: Vec2,
}

impl Wall {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    fn closest_point(&self, point: Vec2) -> Vec2 {
        let segment = self.end - self.start;
        let length_sq = segment.length_squared();
        if length_sq <= f32::EPSILON {
            return self.start;
        }
        let t = ((point - self.start).dot(segment) / length_sq).clamp(0.0, 1.0);
        self.start + segment * t
    }

    /// Параметр луча `t` пересечения с отрезком
    fn ray_intersection(&self, origin: Vec2, direction: Vec2) -> Option<f32> {
        let segment = self.end - self.start;
        let denominator = direction.perp_dot(segment);
        if denominator.abs() <= f32::EPSILON {
            return None; // параллельны
        }

        let offset = self.start - origin;
        let t = offset.perp_dot(segment) / denominator;
        let u = offset.perp_dot(direction) / denominator;
        (t >= 0.0 && (0.0..=1.0).contains(&u)).then_some(t)
    }
}

/// Headless arena: стены + тела
#[derive(Debug, Clone, Default)]
pub struct ArenaCollision {
    pub walls: Vec<Wall>,
    bodies: Vec<BodyProxy>,
}

impl ArenaCollision {
    /// Квадратная арена [-half, half] × [-half, half]
    pub fn square(half_size: f32) -> Self {
        let corners = [
            Vec2::new(-half_size, -half_size),
            Vec2::new(half_size, -half_size),
            Vec2::new(half_size, half_size),
            Vec2::new(-half_size, half_size),
        ];
        let walls = (0..4).map(|i| Wall::new(corners[i], corners[(i + 1) % 4])).collect();

        Self { walls, bodies: Vec::new() }
    }

    pub fn with_wall(mut self, start: Vec2, end: Vec2) -> Self {
        self.walls.push(Wall::new(start, end));
        self
    }

    pub fn bodies(&self) -> &[BodyProxy] {
        &self.bodies
    }
}

fn xz(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

fn ray_circle(origin: Vec2, direction: Vec2, center: Vec2, radius: f32) -> Option<f32> {
    let to_center = center - origin;
    let projection = to_center.dot(direction);
    let closest_sq = to_center.length_squared() - projection * projection;
    let radius_sq = radius * radius;
    if closest_sq > radius_sq {
        return None;
    }
    let t = projection - (radius_sq - closest_sq).sqrt();
    (t >= 0.0).then_some(t)
}

impl CollisionProvider for ArenaCollision {
    fn overlap_sphere(&self, center: Vec3, radius: f32, faction: Option<Faction>) -> Vec<Entity> {
        let center = xz(center);
        self.bodies
            .iter()
            .filter(|body| body.layer & COLLISION_LAYER_ACTORS != 0)
            .filter(|body| faction.is_none_or(|f| f == body.faction))
            .filter(|body| xz(body.position).distance(center) <= radius + body.radius)
            .map(|body| body.entity)
            .collect()
    }

    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, layers: u32) -> Option<RayHit> {
        let origin_2d = xz(origin);
        let direction_2d = xz(direction).normalize_or_zero();
        if direction_2d == Vec2::ZERO || max_distance <= 0.0 {
            return None;
        }

        let mut best: Option<(f32, Option<Entity>, u32)> = None;
        let mut consider = |t: f32, entity: Option<Entity>, layer: u32| {
            if t <= max_distance && best.is_none_or(|(bt, _, _)| t < bt) {
                best = Some((t, entity, layer));
            }
        };

        if layers & COLLISION_LAYER_WALLS != 0 {
            for wall in &self.walls {
                if let Some(t) = wall.ray_intersection(origin_2d, direction_2d) {
                    consider(t, None, COLLISION_LAYER_WALLS);
                }
            }
        }

        for body in self.bodies.iter().filter(|b| b.layer & layers != 0) {
            let center = xz(body.position);
            // Луч из тела не попадает в само тело
            if center.distance(origin_2d) <= body.radius {
                continue;
            }
            if let Some(t) = ray_circle(origin_2d, direction_2d, center, body.radius) {
                consider(t, Some(body.entity), body.layer);
            }
        }

        best.map(|(distance, entity, layer)| {
            let point_2d = origin_2d + direction_2d * distance;
            RayHit {
                entity,
                point: Vec3::new(point_2d.x, origin.y, point_2d.y),
                distance,
                layer,
            }
        })
    }

    fn sync_bodies(&mut self, bodies: &[BodyProxy]) {
        self.bodies.clear();
        self.bodies.extend_from_slice(bodies);
    }

    fn resolve_walls(&self, position: Vec3, radius: f32) -> Option<Vec3> {
        let mut point = xz(position);
        let mut moved = false;

        for wall in &self.walls {
            let closest = wall.closest_point(point);
            let offset = point - closest;
            let distance = offset.length();
            if distance < radius {
                let normal = if distance > f32::EPSILON {
                    offset / distance
                } else {
                    (wall.end - wall.start).perp().normalize_or_zero()
                };
                point = closest + normal * radius;
                moved = true;
            }
        }

        moved.then(|| Vec3::new(point.x, position.y, point.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(index: u32, position: Vec3, faction: Faction) -> BodyProxy {
        BodyProxy {
            entity: Entity::from_raw(index),
            position,
            radius: 0.5,
            faction,
            layer: COLLISION_LAYER_ACTORS,
        }
    }

    #[test]
    fn test_overlap_sphere_with_faction_filter() {
        let mut arena = ArenaCollision::square(50.0);
        arena.sync_bodies(&[
            body(1, Vec3::new(3.0, 0.0, 0.0), Faction::Mob),
            body(2, Vec3::new(0.0, 0.0, 4.0), Faction::Player),
            body(3, Vec3::new(30.0, 0.0, 0.0), Faction::Mob),
        ]);

        let all = arena.overlap_sphere(Vec3::ZERO, 10.0, None);
        assert_eq!(all, vec![Entity::from_raw(1), Entity::from_raw(2)]);

        let mobs = arena.overlap_sphere(Vec3::ZERO, 10.0, Some(Faction::Mob));
        assert_eq!(mobs, vec![Entity::from_raw(1)]);
    }

    #[test]
    fn test_raycast_hits_wall() {
        let arena = ArenaCollision::default().with_wall(Vec2::new(5.0, -5.0), Vec2::new(5.0, 5.0));

        let hit = arena.raycast(Vec3::ZERO, Vec3::X, 10.0, COLLISION_LAYER_WALLS);

        let hit = hit.expect("Луч должен попасть в стену");
        assert!((hit.distance - 5.0).abs() < 1e-4);
        assert_eq!(hit.entity, None);
    }

    #[test]
    fn test_raycast_respects_max_distance_and_layers() {
        let mut arena = ArenaCollision::default().with_wall(Vec2::new(5.0, -5.0), Vec2::new(5.0, 5.0));
        arena.sync_bodies(&[body(7, Vec3::new(3.0, 0.0, 0.0), Faction::Mob)]);

        assert!(arena.raycast(Vec3::ZERO, Vec3::X, 4.0, COLLISION_LAYER_WALLS).is_none());

        let hit = arena
            .raycast(Vec3::ZERO, Vec3::X, 10.0, COLLISION_LAYER_WALLS | COLLISION_LAYER_ACTORS)
            .expect("Тело ближе стены");
        assert_eq!(hit.entity, Some(Entity::from_raw(7)));
        assert!((hit.distance - 2.5).abs() < 1e-4);
    }

    #[test]
    fn test_wall_between() {
        let world = CollisionWorld::new(ArenaCollision::default().with_wall(Vec2::new(2.0, -1.0), Vec2::new(2.0, 1.0)));

        assert!(world.is_wall_between(Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0)));
        assert!(!world.is_wall_between(Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0)));
        assert!(!world.is_wall_between(Vec3::ZERO, Vec3::new(1.5, 0.0, 0.0)));
    }

    #[test]
    fn test_resolve_walls_pushes_out() {
        let arena = ArenaCollision::square(10.0);

        let pushed = arena.resolve_walls(Vec3::new(9.8, 1.0, 0.0), 0.5).expect("Контакт со стеной");
        assert!((pushed.x - 9.5).abs() < 1e-4);
        assert_eq!(pushed.y, 1.0);

        assert!(arena.resolve_walls(Vec3::ZERO, 0.5).is_none());
    }
}
