//! Tests for pickup systems.

#[cfg(test)]
mod tests {
    use super::super::systems::{collect_pickups, refresh_buff_stands, spawn_loot_health_kits, tick_health_kits};
    use crate::abilities::{AbilityCaster, AbilityId};
    use crate::components::{Actor, Faction, Vitals};
    use crate::physics::{ContactEvent, ContactPhase, ContactSource};
    use crate::pickups::{
        spawn_buff_stand, spawn_health_kit, BuffReward, BuffStand, HealthKit, LootDropped, PickupCollected,
        PickupSettings,
    };
    use crate::signals::{SoundCue, VisualCue};
    use crate::stats::{StatAggregator, StatCategory, StatModifier};
    use crate::waves::WaveEvent;
    use crate::DeterministicRng;
    use bevy::prelude::*;
    use std::time::Duration;

    fn setup_app(settings: PickupSettings) -> App {
        let mut app = App::new();
        app.add_event::<ContactEvent>()
            .add_event::<LootDropped>()
            .add_event::<PickupCollected>()
            .add_event::<SoundCue>()
            .add_event::<VisualCue>()
            .add_event::<WaveEvent>()
            .insert_resource(settings)
            .insert_resource(DeterministicRng::new(11))
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .add_systems(
                Update,
                (spawn_loot_health_kits, tick_health_kits, collect_pickups, refresh_buff_stands).chain(),
            );
        app
    }

    fn step(app: &mut App) {
        app.world_mut()
            .resource_mut::<Time<Fixed>>()
            .advance_by(Duration::from_secs_f64(1.0 / 60.0));
        app.update();
    }

    fn touch(app: &mut App, a: Entity, b: Entity) {
        app.world_mut().send_event(ContactEvent {
            a,
            b,
            phase: ContactPhase::Begin,
            source: ContactSource::Body,
        });
    }

    fn spawn_player(app: &mut App, current: u32) -> Entity {
        app.world_mut()
            .spawn((
                Actor::new(Faction::Player),
                Vitals::new(100, 0).with_current(current),
                StatAggregator::default(),
                AbilityCaster::with_abilities([AbilityId::Fireball]),
            ))
            .id()
    }

    fn spawn_kit(app: &mut App) -> Entity {
        let settings = app.world().resource::<PickupSettings>().clone();
        let kit = spawn_health_kit(&mut app.world_mut().commands(), Vec3::ZERO, &settings);
        app.world_mut().flush();
        kit
    }

    fn spawn_stand(app: &mut App, reward: BuffReward) -> Entity {
        let settings = app.world().resource::<PickupSettings>().clone();
        let stand = spawn_buff_stand(&mut app.world_mut().commands(), Vec3::ZERO, &settings);
        app.world_mut().flush();
        app.world_mut().get_mut::<BuffStand>(stand).expect("BuffStand").reward = Some(reward);
        stand
    }

    fn health(app: &App, entity: Entity) -> Option<u32> {
        app.world().get::<Vitals>(entity).map(|v| v.current)
    }

    #[test]
    fn test_health_kit_respects_pickable_delay() {
        let mut app = setup_app(PickupSettings {
            health_kit_pickable_delay: 0.05,
            ..Default::default()
        });
        let player = spawn_player(&mut app, 50);
        let kit = spawn_kit(&mut app);

        touch(&mut app, player, kit);
        step(&mut app);
        assert_eq!(health(&app, player), Some(50), "Аптечку ещё нельзя подобрать");

        for _ in 0..3 {
            step(&mut app);
        }
        touch(&mut app, kit, player);
        step(&mut app);

        assert_eq!(health(&app, player), Some(70));
        assert!(app.world().get_entity(kit).is_err(), "Аптечка израсходована");
    }

    #[test]
    fn test_mob_cannot_pick_up_kit() {
        let mut app = setup_app(PickupSettings {
            health_kit_pickable_delay: 0.0,
            ..Default::default()
        });
        let mob = app
            .world_mut()
            .spawn((Actor::new(Faction::Mob), Vitals::new(100, 0).with_current(10)))
            .id();
        let kit = spawn_kit(&mut app);

        touch(&mut app, mob, kit);
        step(&mut app);

        assert_eq!(health(&app, mob), Some(10));
        assert!(app.world().get_entity(kit).is_ok());
    }

    #[test]
    fn test_health_kit_expires() {
        let mut app = setup_app(PickupSettings {
            health_kit_lifetime: 0.04,
            ..Default::default()
        });
        let kit = spawn_kit(&mut app);

        step(&mut app);
        step(&mut app);
        assert!(app.world().get::<HealthKit>(kit).is_some());

        step(&mut app);
        assert!(app.world().get_entity(kit).is_err());
    }

    #[test]
    fn test_loot_spawns_health_kit() {
        let mut app = setup_app(PickupSettings::default());
        app.world_mut().send_event(LootDropped {
            source: Entity::PLACEHOLDER,
            position: Vec3::new(3.0, 0.0, 4.0),
        });
        step(&mut app);

        let mut query = app.world_mut().query::<(&HealthKit, &Transform)>();
        let kits: Vec<_> = query.iter(app.world()).collect();
        assert_eq!(kits.len(), 1);
        assert_eq!(kits[0].1.translation, Vec3::new(3.0, 0.0, 4.0));
        assert_eq!(kits[0].0.amount, 20);
    }

    #[test]
    fn test_full_heal_stand_is_consumed() {
        let mut app = setup_app(PickupSettings::default());
        let player = spawn_player(&mut app, 30);
        let stand = spawn_stand(&mut app, BuffReward::FullHeal);

        touch(&mut app, player, stand);
        step(&mut app);

        assert_eq!(health(&app, player), Some(100));
        assert!(app.world().get::<BuffStand>(stand).is_some_and(|s| !s.has_reward()));

        // Второе касание: пусто
        app.world_mut().get_mut::<Vitals>(player).expect("Vitals").decrease(40);
        touch(&mut app, player, stand);
        step(&mut app);
        assert_eq!(health(&app, player), Some(60));
    }

    #[test]
    fn test_special_ability_stand() {
        let mut app = setup_app(PickupSettings::default());
        let player = spawn_player(&mut app, 100);
        let stand = spawn_stand(&mut app, BuffReward::Special(AbilityId::GroundShock));

        touch(&mut app, stand, player);
        step(&mut app);

        let caster = app.world().get::<AbilityCaster>(player).expect("AbilityCaster");
        assert_eq!(caster.special(), Some(AbilityId::GroundShock));
    }

    #[test]
    fn test_stat_stand_adds_modifier() {
        let mut app = setup_app(PickupSettings::default());
        let player = spawn_player(&mut app, 100);
        let modifier = StatModifier::constant(StatCategory::Speed, 2.0, 300.0);
        let stand = spawn_stand(&mut app, BuffReward::Stat(modifier));

        touch(&mut app, player, stand);
        step(&mut app);

        let aggregator = app.world().get::<StatAggregator>(player).expect("StatAggregator");
        assert_eq!(aggregator.len(), 1);
        assert!(aggregator.is_dirty());
    }

    #[test]
    fn test_wave_start_refreshes_stands() {
        let mut app = setup_app(PickupSettings::default());
        let settings = PickupSettings::default();
        let stand = spawn_buff_stand(&mut app.world_mut().commands(), Vec3::ZERO, &settings);
        app.world_mut().flush();

        step(&mut app);
        assert!(app.world().get::<BuffStand>(stand).is_some_and(|s| !s.has_reward()));

        app.world_mut().send_event(WaveEvent::Started { wave: 1 });
        step(&mut app);
        assert!(app.world().get::<BuffStand>(stand).is_some_and(|s| s.has_reward()));
    }
}
