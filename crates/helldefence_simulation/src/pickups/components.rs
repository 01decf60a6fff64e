//! Pickup components + tuning
//!
//! HealthKit: выпадает из мобов, подбирается через `pickable_delay`, живёт `lifetime`.
//! BuffStand: на старте волны разыгрывает награду, первый игрок забирает её.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::abilities::AbilityId;
use crate::logger;
use crate::stats::{StatCategory, StatModifier};

/// Аптечка на полу арены
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct HealthKit {
    pub amount: i32,
    /// Countdown до возможности подобрать
    pub pickable_in: f32,
    pub remaining_lifetime: f32,
}

impl HealthKit {
    pub fn from_settings(settings: &PickupSettings) -> Self {
        Self {
            amount: settings.health_kit_amount,
            pickable_in: settings.health_kit_pickable_delay,
            remaining_lifetime: settings.health_kit_lifetime,
        }
    }

    pub fn is_pickable(&self) -> bool {
        self.pickable_in <= 0.0
    }
}

/// Награда buff stand'а
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BuffReward {
    /// Временный модификатор (lifetime уже выставлен)
    Stat(StatModifier),
    /// Special способность до конца волны
    Special(AbilityId),
    FullHeal,
}

/// Стенд с баффом; `reward == None`: пуст до следующей волны
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct BuffStand {
    pub reward: Option<BuffReward>,
}

impl BuffStand {
    pub fn has_reward(&self) -> bool {
        self.reward.is_some()
    }

    /// Забрать награду (стенд пустеет)
    pub fn take(&mut self) -> Option<BuffReward> {
        self.reward.take()
    }
}

/// Resource: tuning аптечек и стендов
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupSettings {
    pub health_kit_amount: i32,
    pub health_kit_pickable_delay: f32,
    pub health_kit_lifetime: f32,
    /// Радиус тела аптечки/стенда для контактов
    pub pickup_radius: f32,
    /// Веса розыгрыша стенда (сумма должна быть 100)
    pub stat_weight: u32,
    pub special_weight: u32,
    pub full_heal_weight: u32,
    pub stat_buff_duration: f32,
    pub stat_pool: Vec<StatModifier>,
    pub special_pool: Vec<AbilityId>,
}

impl Default for PickupSettings {
    fn default() -> Self {
        Self {
            health_kit_amount: 20,
            health_kit_pickable_delay: 1.0,
            health_kit_lifetime: 20.0,
            pickup_radius: 0.5,
            stat_weight: 45,
            special_weight: 5,
            full_heal_weight: 50,
            stat_buff_duration: 300.0,
            stat_pool: vec![
                StatModifier::constant(StatCategory::Speed, 2.0, 300.0),
                StatModifier::quota(StatCategory::Cooldown, 0.1, 300.0),
                StatModifier::quota(StatCategory::Damage, 0.1, 300.0),
                StatModifier::constant(StatCategory::Regeneration, 2.0, 300.0),
                StatModifier::constant(StatCategory::MaxHealth, 50.0, 300.0),
                StatModifier::quota(StatCategory::Speed, 0.1, 300.0),
            ],
            special_pool: AbilityId::SPECIAL_POOL.to_vec(),
        }
    }
}

/// Розыгрыш награды стенда: d100 против весов stat → special → heal
///
/// Веса с суммой != 100: стенд пуст (ошибка конфига, логируем).
pub fn roll_buff_reward(settings: &PickupSettings, rng: &mut impl Rng) -> Option<BuffReward> {
    let total = settings.stat_weight + settings.special_weight + settings.full_heal_weight;
    if total != 100 {
        logger::log_warning(&format!("BuffStand weights sum to {} (expected 100)", total));
        return None;
    }

    let roll = rng.gen_range(1..=100);

    if roll <= settings.stat_weight && !settings.stat_pool.is_empty() {
        let modifier = settings.stat_pool[rng.gen_range(0..settings.stat_pool.len())];
        return Some(BuffReward::Stat(modifier.with_lifetime(settings.stat_buff_duration)));
    }

    if roll <= settings.stat_weight + settings.special_weight && !settings.special_pool.is_empty() {
        let ability = settings.special_pool[rng.gen_range(0..settings.special_pool.len())];
        return Some(BuffReward::Special(ability));
    }

    (settings.full_heal_weight > 0).then_some(BuffReward::FullHeal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_roll_distribution_follows_weights() {
        let settings = PickupSettings::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let (mut stats, mut specials, mut heals) = (0, 0, 0);
        for _ in 0..10_000 {
            match roll_buff_reward(&settings, &mut rng) {
                Some(BuffReward::Stat(modifier)) => {
                    assert_eq!(modifier.remaining_lifetime, 300.0);
                    stats += 1;
                }
                Some(BuffReward::Special(ability)) => {
                    assert!(AbilityId::SPECIAL_POOL.contains(&ability));
                    specials += 1;
                }
                Some(BuffReward::FullHeal) => heals += 1,
                None => panic!("Веса по умолчанию дают награду всегда"),
            }
        }

        // 45 / 5 / 50 ± запас
        assert!((4000..5000).contains(&stats), "stats = {}", stats);
        assert!((300..700).contains(&specials), "specials = {}", specials);
        assert!((4500..5500).contains(&heals), "heals = {}", heals);
    }

    #[test]
    fn test_invalid_weights_give_nothing() {
        let settings = PickupSettings {
            full_heal_weight: 10,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert_eq!(roll_buff_reward(&settings, &mut rng), None);
    }

    #[test]
    fn test_heal_only_stand() {
        let settings = PickupSettings {
            stat_weight: 0,
            special_weight: 0,
            full_heal_weight: 100,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        for _ in 0..100 {
            assert_eq!(roll_buff_reward(&settings, &mut rng), Some(BuffReward::FullHeal));
        }
    }

    #[test]
    fn test_stand_take_empties_it() {
        let mut stand = BuffStand {
            reward: Some(BuffReward::FullHeal),
        };

        assert_eq!(stand.take(), Some(BuffReward::FullHeal));
        assert!(!stand.has_reward());
        assert_eq!(stand.take(), None);
    }
}
