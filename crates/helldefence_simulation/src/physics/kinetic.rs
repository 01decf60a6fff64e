//! Kinetic body: модель движения для всех мобильных entity
//!
//! Архитектура:
//! - Intent (destination | direction) + внешний impulse → velocity каждый шаг
//! - Impulse затухает с постоянным friction
//! - Ориентация доворачивается к heading через slerp (turn_rate)
//! - Timed look-at (`ease_rotation_to`) перекрывает heading-поворот, пока активен
//!
//! Сам body позицию не интегрирует: velocity уходит в physics provider
//! (rapier `Velocity`) или в headless интеграцию (`integrate_kinetic_bodies`).

use bevy::prelude::*;

use crate::stats::MIN_MASS;

/// `add_impulse(force)` делится на `IMPULSE_SCALE × mass`.
/// Knockback силы мобов/способностей (200, 500) подобраны под этот масштаб.
pub const IMPULSE_SCALE: f32 = 50.0;

const MIN_DIRECTION_SQ: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum KineticMode {
    /// Идём к точке (мобы, AI)
    #[default]
    Destination,
    /// Идём по направлению (игрок с input axis)
    Direction,
    /// Только impulse + gravity (снаряды, предметы)
    Passive,
}

/// Timed look-at: lerp ориентации от `from` к `to`
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct RotationEase {
    pub from: Quat,
    pub to: Quat,
    pub elapsed: f32,
    pub duration: f32,
    /// Множитель скорости: 2.0 = доворот за половину duration
    pub rate: f32,
}

impl RotationEase {
    fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed * self.rate / self.duration).clamp(0.0, 1.0)
    }
}

/// Kinetic body компонент
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct KineticBody {
    pub mode: KineticMode,
    pub destination: Option<Vec3>,
    /// Direction mode: желаемое направление (длина ≤ 1: аналоговый input)
    pub direction: Vec3,
    /// Накопленный внешний impulse (m/s)
    pub impulse: Vec3,
    /// Intent только поворачивает, velocity от intent = 0 (impulse работает)
    pub only_rotate: bool,
    /// m/s
    pub speed: f32,
    /// Скорость доворота (доля slerp за секунду)
    pub turn_rate: f32,
    /// Затухание impulse (m/s²)
    pub friction: f32,
    pub mass: f32,
    /// m/s²
    pub gravity: f32,
    /// Высота пола арены
    pub ground_height: f32,
    /// Последняя посчитанная velocity
    pub velocity: Vec3,
    pub rotation_ease: Option<RotationEase>,
}

impl Default for KineticBody {
    fn default() -> Self {
        Self {
            mode: KineticMode::Destination,
            destination: None,
            direction: Vec3::ZERO,
            impulse: Vec3::ZERO,
            only_rotate: false,
            speed: 5.0,
            turn_rate: 5.0,
            friction: 5.0,
            mass: 1.0,
            gravity: -9.81,
            ground_height: 0.0,
            velocity: Vec3::ZERO,
            rotation_ease: None,
        }
    }
}

impl KineticBody {
    pub fn with_mode(mut self, mode: KineticMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed.max(0.0);
        self
    }

    pub fn set_destination(&mut self, point: Vec3) {
        self.mode = KineticMode::Destination;
        self.destination = Some(point);
    }

    pub fn set_direction(&mut self, direction: Vec3) {
        self.mode = KineticMode::Direction;
        self.direction = flat(direction).clamp_length_max(1.0);
    }

    pub fn add_impulse(&mut self, force: Vec3) {
        self.impulse += force / (IMPULSE_SCALE * self.mass.max(MIN_MASS));
    }

    pub fn erase_impulse(&mut self) {
        self.impulse = Vec3::ZERO;
    }

    /// Сбрасывает intent (destination/direction) и горизонтальную velocity.
    /// Impulse не трогаем: knockback долетает.
    pub fn stop(&mut self) {
        self.destination = None;
        self.direction = Vec3::ZERO;
        self.velocity.x = 0.0;
        self.velocity.z = 0.0;
    }

    pub fn is_moving(&self) -> bool {
        match self.mode {
            KineticMode::Destination => self.destination.is_some() && !self.only_rotate,
            KineticMode::Direction => self.direction.length_squared() > MIN_DIRECTION_SQ,
            KineticMode::Passive => false,
        }
    }

    /// Timed look-at на точку (cast windup, замах моба)
    pub fn ease_rotation_to(&mut self, current: Quat, position: Vec3, point: Vec3, duration: f32, rate: f32) {
        let heading = flat(point - position);
        if heading.length_squared() <= MIN_DIRECTION_SQ {
            return;
        }

        self.rotation_ease = Some(RotationEase {
            from: current,
            to: look_rotation(heading),
            elapsed: 0.0,
            duration: duration.max(0.0),
            rate: rate.max(0.0),
        });
    }

    pub fn stop_rotation(&mut self) {
        self.rotation_ease = None;
    }

    fn decay_impulse(&mut self, delta: f32) {
        let decay = self.friction.max(0.0) * delta;
        if self.impulse.length() <= decay {
            self.impulse = Vec3::ZERO;
        } else {
            self.impulse -= self.impulse.normalize() * decay;
        }
    }

    /// Один шаг модели: затухание impulse, velocity, ориентация.
    ///
    /// Ориентация пишется в `transform.rotation`, позиция не меняется.
    pub fn step(&mut self, transform: &mut Transform, delta: f32) -> Vec3 {
        self.decay_impulse(delta);

        let position = transform.translation;
        let grounded = position.y <= self.ground_height;
        let vertical = if grounded {
            0.0
        } else {
            self.velocity.y.min(0.0) + self.gravity * delta
        };

        let mut heading = None;
        let planar = match self.mode {
            KineticMode::Destination => match self.destination {
                Some(destination) => {
                    let to_target = flat(destination - position);
                    let distance = to_target.length();
                    if distance <= self.speed * delta || distance * distance <= MIN_DIRECTION_SQ {
                        self.destination = None;
                        Vec3::ZERO
                    } else {
                        let dir = to_target / distance;
                        heading = Some(dir);
                        if self.only_rotate {
                            Vec3::ZERO
                        } else {
                            dir * self.speed
                        }
                    }
                }
                None => Vec3::ZERO,
            },
            KineticMode::Direction => {
                if self.direction.length_squared() > MIN_DIRECTION_SQ {
                    heading = Some(self.direction.normalize());
                    let forward = flat(*transform.forward()).normalize_or_zero();
                    forward * self.speed * self.direction.length()
                } else {
                    Vec3::ZERO
                }
            }
            KineticMode::Passive => Vec3::ZERO,
        };

        self.velocity = match self.mode {
            // Брошенный предмет: impulse делится на массу, взлёт сохраняется
            KineticMode::Passive => {
                let rising = if grounded { self.velocity.y.max(0.0) } else { self.velocity.y };
                let vertical = rising + self.gravity * delta;
                let vertical = if grounded { vertical.max(0.0) } else { vertical };
                self.impulse / self.mass.max(MIN_MASS) + Vec3::Y * vertical
            }
            _ => planar + self.impulse + Vec3::Y * vertical,
        };
        self.rotate(transform, heading, delta);
        self.velocity
    }

    fn rotate(&mut self, transform: &mut Transform, heading: Option<Vec3>, delta: f32) {
        if let Some(mut ease) = self.rotation_ease {
            ease.elapsed += delta;
            transform.rotation = ease.from.slerp(ease.to, ease.progress());
            self.rotation_ease = if ease.elapsed >= ease.duration { None } else { Some(ease) };
            return;
        }

        if self.mode == KineticMode::Passive {
            return;
        }

        if let Some(heading) = heading {
            let t = (self.turn_rate.max(0.0) * delta).min(1.0);
            transform.rotation = transform.rotation.slerp(look_rotation(heading), t);
        }
    }
}

/// Проекция на горизонтальную плоскость XZ
pub fn flat(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Ориентация, при которой `forward()` смотрит вдоль `heading` (yaw-only)
pub fn look_rotation(heading: Vec3) -> Quat {
    let heading = flat(heading);
    if heading.length_squared() <= MIN_DIRECTION_SQ {
        return Quat::IDENTITY;
    }
    Transform::IDENTITY.looking_to(heading, Vec3::Y).rotation
}

/// Угол (градусы) между двумя направлениями в плоскости XZ
pub fn planar_angle_deg(a: Vec3, b: Vec3) -> f32 {
    let a = flat(a);
    let b = flat(b);
    if a.length_squared() <= MIN_DIRECTION_SQ || b.length_squared() <= MIN_DIRECTION_SQ {
        return 0.0;
    }
    a.angle_between(b).to_degrees()
}

/// Поворот направления вокруг вертикали (градусы)
pub fn rotate_yaw(direction: Vec3, degrees: f32) -> Vec3 {
    Quat::from_rotation_y(degrees.to_radians()) * direction
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn grounded() -> Transform {
        Transform::from_translation(Vec3::ZERO)
    }

    #[test]
    fn test_impulse_decays_to_zero() {
        let mut body = KineticBody::default();
        body.impulse = Vec3::new(1.0, 0.0, 0.0);
        let mut transform = grounded();

        // friction 5 m/s² → 1 m/s гасится за 0.2 сек (12-13 шагов)
        for _ in 0..15 {
            body.step(&mut transform, DT);
        }

        assert_eq!(body.impulse, Vec3::ZERO);
    }

    #[test]
    fn test_impulse_clamped_when_below_decay_step() {
        let mut body = KineticBody::default();
        body.impulse = Vec3::new(0.01, 0.0, 0.0);

        body.step(&mut grounded(), DT);

        assert_eq!(body.impulse, Vec3::ZERO, "Маленький impulse не меняет знак");
    }

    #[test]
    fn test_add_impulse_scales_by_mass() {
        let mut body = KineticBody { mass: 2.0, ..Default::default() };
        body.add_impulse(Vec3::new(200.0, 0.0, 0.0));

        assert_eq!(body.impulse, Vec3::new(2.0, 0.0, 0.0), "200 / (50 × 2) = 2");
    }

    #[test]
    fn test_destination_velocity() {
        let mut body = KineticBody::default();
        body.set_destination(Vec3::new(10.0, 0.0, 0.0));

        let velocity = body.step(&mut grounded(), DT);

        assert!((velocity - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-4, "velocity = {:?}", velocity);
    }

    #[test]
    fn test_destination_cleared_within_one_step() {
        let mut body = KineticBody::default();
        let mut transform = grounded();
        // speed × dt = 0.083
        body.set_destination(Vec3::new(0.05, 0.0, 0.0));

        let velocity = body.step(&mut transform, DT);

        assert!(body.destination.is_none());
        assert_eq!(velocity, Vec3::ZERO);
    }

    #[test]
    fn test_only_rotate_keeps_impulse() {
        let mut body = KineticBody::default();
        body.set_destination(Vec3::new(10.0, 0.0, 0.0));
        body.only_rotate = true;
        body.impulse = Vec3::new(0.0, 0.0, 2.0);
        let mut transform = grounded();

        let velocity = body.step(&mut transform, DT);

        assert_eq!(velocity.x, 0.0, "Intent не двигает при only_rotate");
        assert!(velocity.z > 1.9, "Impulse продолжает действовать");
        assert!(body.destination.is_some());
        assert_ne!(transform.rotation, Quat::IDENTITY, "Но поворот к цели идёт");
    }

    #[test]
    fn test_direction_mode_uses_forward() {
        let mut body = KineticBody::default();
        let mut transform = grounded();
        // Identity смотрит в -Z
        body.set_direction(Vec3::new(0.0, 0.0, -1.0));

        let velocity = body.step(&mut transform, DT);

        assert!((velocity - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-4, "velocity = {:?}", velocity);
    }

    #[test]
    fn test_direction_clamped() {
        let mut body = KineticBody::default();
        body.set_direction(Vec3::new(3.0, 7.0, 4.0));

        assert!((body.direction.length() - 1.0).abs() < 1e-5);
        assert_eq!(body.direction.y, 0.0);
    }

    #[test]
    fn test_heading_converges() {
        let mut body = KineticBody::default();
        let mut transform = grounded();
        body.set_destination(Vec3::new(100.0, 0.0, 0.0));

        for _ in 0..120 {
            body.step(&mut transform, DT);
        }

        let forward = *transform.forward();
        assert!(planar_angle_deg(forward, Vec3::X) < 1.0, "forward = {:?}", forward);
    }

    #[test]
    fn test_rotation_ease_finishes_at_half_duration_with_rate_two() {
        let mut body = KineticBody::default();
        let mut transform = grounded();
        body.ease_rotation_to(transform.rotation, Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0), 1.0, 2.0);

        for _ in 0..30 {
            body.step(&mut transform, DT);
        }

        let forward = *transform.forward();
        assert!(planar_angle_deg(forward, Vec3::Z) < 1.0, "forward = {:?}", forward);
        assert!(body.rotation_ease.is_some(), "Ease живёт всю duration");
    }

    #[test]
    fn test_passive_mode_falls() {
        let mut body = KineticBody::default().with_mode(KineticMode::Passive);
        let mut transform = Transform::from_translation(Vec3::new(0.0, 5.0, 0.0));

        let v1 = body.step(&mut transform, DT);
        let v2 = body.step(&mut transform, DT);

        assert!(v1.y < 0.0);
        assert!(v2.y < v1.y, "Гравитация накапливается");
    }

    #[test]
    fn test_passive_mode_divides_impulse_by_mass() {
        let mut body = KineticBody {
            mass: 2.0,
            ..KineticBody::default().with_mode(KineticMode::Passive)
        };
        body.impulse = Vec3::new(4.0, 0.0, 0.0);

        let velocity = body.step(&mut grounded(), DT);

        // friction 5 × dt срезает impulse до 3.9167, затем / mass
        let expected = (4.0 - 5.0 * DT) / 2.0;
        assert!((velocity.x - expected).abs() < 1e-4, "velocity = {:?}", velocity);
        assert_eq!(velocity.y, 0.0, "На полу не проваливаемся");
    }

    #[test]
    fn test_passive_mode_keeps_upward_velocity() {
        let mut body = KineticBody::default().with_mode(KineticMode::Passive);
        body.velocity = Vec3::new(0.0, 3.0, 0.0);
        let mut transform = Transform::from_translation(Vec3::new(0.0, 2.0, 0.0));

        let velocity = body.step(&mut transform, DT);

        assert!((velocity.y - (3.0 - 9.81 * DT)).abs() < 1e-4, "velocity = {:?}", velocity);
    }

    #[test]
    fn test_stop_clears_intent() {
        let mut body = KineticBody::default();
        body.set_destination(Vec3::new(10.0, 0.0, 0.0));
        body.impulse = Vec3::new(1.0, 0.0, 0.0);

        body.stop();

        assert!(body.destination.is_none());
        assert!(!body.is_moving());
        assert_eq!(body.impulse, Vec3::new(1.0, 0.0, 0.0));
    }
}
