//! Vital stats: здоровье + периодическая регенерация
//!
//! Смерть level-triggered (`current == 0`), потребители опрашивают `is_dead()`.
//! Edge-событие `EntityDied` генерирует `combat::death_watch` ровно один раз.

use bevy::prelude::*;

/// Период регенерации по умолчанию (секунды)
pub const DEFAULT_REGEN_PERIOD: f32 = 3.0;

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Vitals {
    pub current: u32,
    pub max: u32,
    /// HP за один тик регенерации
    pub regeneration: u32,
    pub regen_period: f32,
    /// Countdown до следующего тика регенерации
    pub regen_timer: f32,
}

impl Default for Vitals {
    fn default() -> Self {
        Self::new(100, 1)
    }
}

impl Vitals {
    pub fn new(max: u32, regeneration: u32) -> Self {
        Self {
            current: max,
            max,
            regeneration,
            regen_period: DEFAULT_REGEN_PERIOD,
            regen_timer: DEFAULT_REGEN_PERIOD,
        }
    }

    pub fn with_current(mut self, current: u32) -> Self {
        self.current = current.min(self.max);
        self
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Доля здоровья в [0, 1]
    pub fn health_quota(&self) -> f32 {
        if self.max == 0 {
            return 0.0;
        }
        self.current as f32 / self.max as f32
    }

    /// Лечение. Мёртвых не лечим (смерть терминальна).
    pub fn increase(&mut self, amount: i32) {
        if amount <= 0 || self.is_dead() {
            return;
        }
        self.current = self.current.saturating_add(amount as u32).min(self.max);
    }

    pub fn decrease(&mut self, amount: i32) {
        if amount <= 0 {
            return;
        }
        self.current = self.current.saturating_sub(amount as u32);
    }

    /// Полное лечение (BuffStand). Мёртвых не поднимает.
    pub fn restore_full(&mut self) {
        if self.is_alive() {
            self.current = self.max;
        }
    }

    /// Новый максимум (из StatAggregator / Domestication), current clamp'ится
    pub fn set_max(&mut self, max: u32) {
        self.max = max;
        self.current = self.current.min(max);
    }

    pub fn set_regeneration(&mut self, regeneration: u32) {
        self.regeneration = regeneration;
    }

    /// Продвигает таймер регенерации, возвращает количество сработавших тиков
    pub fn advance_regeneration(&mut self, delta: f32) -> u32 {
        if self.regen_period <= 0.0 {
            return 0;
        }

        let mut ticks = 0;
        self.regen_timer -= delta;
        while self.regen_timer <= 0.0 {
            self.regen_timer += self.regen_period;
            self.increase(self.regeneration as i32);
            ticks += 1;
        }
        ticks
    }
}

/// Система: регенерация HP (FixedUpdate)
pub fn regenerate_vitals(mut query: Query<&mut Vitals>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for mut vitals in query.iter_mut() {
        vitals.advance_regeneration(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regeneration_three_periods() {
        let mut vitals = Vitals::new(100, 5).with_current(40);

        for _ in 0..3 {
            vitals.advance_regeneration(DEFAULT_REGEN_PERIOD);
        }

        assert_eq!(vitals.current, 55, "40 + 3 × 5 = 55");
    }

    #[test]
    fn test_regeneration_no_tick_before_period() {
        let mut vitals = Vitals::new(100, 5).with_current(40);

        let ticks = vitals.advance_regeneration(2.9);

        assert_eq!(ticks, 0);
        assert_eq!(vitals.current, 40);
    }

    #[test]
    fn test_regeneration_fixed_steps() {
        let mut vitals = Vitals::new(100, 5).with_current(40);

        // 9.5 секунд при 60Hz: тики на 3, 6, 9
        for _ in 0..570 {
            vitals.advance_regeneration(1.0 / 60.0);
        }

        assert_eq!(vitals.current, 55);
    }

    #[test]
    fn test_decrease_clamps_at_zero() {
        let mut vitals = Vitals::new(100, 1);
        vitals.decrease(250);

        assert_eq!(vitals.current, 0);
        assert!(vitals.is_dead());
        assert!(!vitals.is_alive());
    }

    #[test]
    fn test_increase_clamps_at_max() {
        let mut vitals = Vitals::new(100, 1).with_current(95);
        vitals.increase(50);

        assert_eq!(vitals.current, 100);
    }

    #[test]
    fn test_non_positive_amounts_are_noop() {
        let mut vitals = Vitals::new(100, 1).with_current(50);
        vitals.increase(0);
        vitals.increase(-10);
        vitals.decrease(0);
        vitals.decrease(-10);

        assert_eq!(vitals.current, 50);
    }

    #[test]
    fn test_dead_does_not_regenerate() {
        let mut vitals = Vitals::new(100, 5).with_current(0);
        vitals.advance_regeneration(30.0);

        assert!(vitals.is_dead(), "Смерть терминальна");
    }

    #[test]
    fn test_set_max_clamps_current() {
        let mut vitals = Vitals::new(150, 1);
        vitals.set_max(100);

        assert_eq!(vitals.current, 100);
        assert_eq!(vitals.health_quota(), 1.0);
    }
}
