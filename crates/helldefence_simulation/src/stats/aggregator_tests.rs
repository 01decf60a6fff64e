//! Tests for StatAggregator.

#[cfg(test)]
mod tests {
    use super::super::aggregator::*;
    use super::super::modifier::*;

    fn base() -> BaseStats {
        BaseStats {
            max_health: 100,
            regeneration: 2,
            speed: 5.0,
            mass: 1.0,
        }
    }

    #[test]
    fn test_recompute_without_modifiers_equals_base() {
        let mut agg = StatAggregator::new(base());
        let derived = agg.recompute();

        assert_eq!(derived.max_health, 100);
        assert_eq!(derived.regeneration, 2);
        assert_eq!(derived.speed, 5.0);
        assert_eq!(derived.mass, 1.0);
        assert_eq!(derived.damage_constant, 0.0);
        assert_eq!(derived.cooldown_quota, 0.0);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut agg = StatAggregator::new(base());
        agg.add_modifier(StatModifier::constant(StatCategory::Speed, 2.0, 300.0));
        agg.add_modifier(StatModifier::quota(StatCategory::Speed, 0.1, 300.0));
        agg.add_modifier(StatModifier::quota(StatCategory::MaxHealth, 0.25, PERMANENT));
        agg.add_modifier(StatModifier::quota(StatCategory::Damage, 0.1, 300.0));

        let first = agg.recompute();
        let second = agg.recompute();

        assert_eq!(first, second, "Повторный recompute без мутаций должен давать тот же snapshot");
        assert!(!agg.is_dirty());
    }

    #[test]
    fn test_constants_fold_before_quotas_regardless_of_insertion_order() {
        let quota = StatModifier::quota(StatCategory::Speed, 0.5, PERMANENT);
        let constant = StatModifier::constant(StatCategory::Speed, 5.0, PERMANENT);

        let mut quota_first = StatAggregator::new(base());
        quota_first.add_modifier(quota);
        quota_first.add_modifier(constant);

        let mut constant_first = StatAggregator::new(base());
        constant_first.add_modifier(constant);
        constant_first.add_modifier(quota);

        // (5 + 5) × 1.5 = 15, а не 5 × 1.5 + 5 = 12.5
        assert_eq!(quota_first.recompute().speed, 15.0);
        assert_eq!(constant_first.recompute().speed, 15.0);
    }

    #[test]
    fn test_health_quota_truncates_to_integer() {
        let mut agg = StatAggregator::new(base());
        agg.add_modifier(StatModifier::constant(StatCategory::MaxHealth, 50.0, PERMANENT));
        agg.add_modifier(StatModifier::quota(StatCategory::MaxHealth, 0.105, PERMANENT));

        // 150 + trunc(150 × 0.105 = 15.75) = 165
        assert_eq!(agg.recompute().max_health, 165);
    }

    #[test]
    fn test_damage_and_cooldown_quotas_accumulate_separately() {
        let mut agg = StatAggregator::new(base());
        agg.add_modifier(StatModifier::quota(StatCategory::Damage, 0.1, 300.0));
        agg.add_modifier(StatModifier::quota(StatCategory::Damage, 0.1, 300.0));
        agg.add_modifier(StatModifier::quota(StatCategory::Cooldown, 0.1, 300.0));

        let derived = agg.recompute();

        assert!((derived.damage_quota - 0.2).abs() < 1e-6);
        assert!((derived.cooldown_quota - 0.1).abs() < 1e-6);
        // Speed/MaxHealth не затронуты
        assert_eq!(derived.speed, 5.0);
        assert_eq!(derived.max_health, 100);
    }

    #[test]
    fn test_effective_damage_example() {
        let derived = DerivedStats {
            damage_constant: 2.0,
            damage_quota: 0.5,
            ..Default::default()
        };

        assert_eq!(derived.effective_damage(10.0), 18.0, "(10 + 2) × 1.5 = 18");
    }

    #[test]
    fn test_effective_cooldown_example() {
        let derived = DerivedStats {
            cooldown_constant: 5.0,
            cooldown_quota: 0.1,
            ..Default::default()
        };

        assert_eq!(derived.effective_cooldown(20.0), 13.0, "20 − 5 − 2 = 13");
        assert_eq!(derived.effective_cooldown(3.0), 0.0, "Кулдаун не уходит в минус");
    }

    #[test]
    fn test_permanent_modifier_never_expires() {
        let mut agg = StatAggregator::new(base());
        let id = agg.add_modifier(StatModifier::constant(StatCategory::Speed, 1.0, PERMANENT));

        for _ in 0..10_000 {
            agg.advance(1.0);
        }

        assert!(agg.modifier(id).is_some(), "Permanent модификатор пережил все шаги");
        assert_eq!(agg.recompute().speed, 6.0);
    }

    #[test]
    fn test_timed_modifier_expires() {
        let mut agg = StatAggregator::new(base());
        agg.add_modifier(StatModifier::constant(StatCategory::Speed, 2.0, 1.0));
        agg.recompute();

        assert_eq!(agg.advance(0.5), 0);
        assert!(!agg.is_dirty());

        assert_eq!(agg.advance(0.5), 1);
        assert!(agg.is_dirty(), "Истечение помечает агрегатор dirty");
        assert_eq!(agg.recompute().speed, 5.0);
    }

    #[test]
    fn test_duplicate_modifiers_are_timed_independently() {
        let mut agg = StatAggregator::new(base());
        agg.add_modifier(StatModifier::constant(StatCategory::Speed, 1.0, 1.0));
        agg.add_modifier(StatModifier::constant(StatCategory::Speed, 1.0, 3.0));

        agg.advance(2.0);

        assert_eq!(agg.len(), 1);
        assert_eq!(agg.recompute().speed, 6.0);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut agg = StatAggregator::new(base());
        let a = agg.add_modifier(StatModifier::constant(StatCategory::Mass, 1.0, PERMANENT));
        let b = agg.add_modifier(StatModifier::constant(StatCategory::Mass, 2.0, PERMANENT));
        agg.recompute();

        assert!(agg.remove_modifier(a));
        assert!(!agg.remove_modifier(a), "Повторное удаление: no-op");
        assert_eq!(agg.recompute().mass, 3.0);
        assert!(agg.modifier(b).is_some());

        agg.clear();
        assert!(agg.is_empty());
        assert_eq!(agg.recompute().mass, 1.0);
    }

    #[test]
    fn test_negative_values_are_clamped() {
        let mut agg = StatAggregator::new(base());
        agg.add_modifier(StatModifier::constant(StatCategory::Speed, -50.0, PERMANENT));
        agg.add_modifier(StatModifier::constant(StatCategory::Mass, -50.0, PERMANENT));
        agg.add_modifier(StatModifier::constant(StatCategory::MaxHealth, -500.0, PERMANENT));

        let derived = agg.recompute();

        assert_eq!(derived.speed, 0.0);
        assert_eq!(derived.mass, MIN_MASS);
        assert_eq!(derived.max_health, 0);
    }
}
