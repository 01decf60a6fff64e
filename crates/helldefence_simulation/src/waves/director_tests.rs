//! Tests for WaveDirector state machine.

#[cfg(test)]
mod tests {
    use super::super::director::{WaveAction, WaveDirector, WavePhase, WaveSettings, WaveView};
    use super::super::source::{ArchetypeId, WaveTable};

    const DT: f32 = 0.1;

    fn settings() -> WaveSettings {
        WaveSettings {
            max_waves: 2,
            ..Default::default()
        }
    }

    fn table() -> WaveTable {
        WaveTable::new(vec![
            vec!["imp".into(), "imp".into()],
            vec!["brute".into()],
            vec!["imp".into()],
        ])
    }

    fn players_alive() -> WaveView {
        WaveView {
            wave_alive: false,
            players_present: 1,
            players_alive: 1,
        }
    }

    /// Тикает, пока director не выдаст действие, удовлетворяющее `until`
    fn run_until(
        director: &mut WaveDirector,
        settings: &WaveSettings,
        table: &WaveTable,
        view: WaveView,
        max_seconds: f32,
        until: impl Fn(&WaveAction) -> bool,
    ) -> (f32, Vec<WaveAction>) {
        let mut elapsed = 0.0;
        let mut seen = Vec::new();
        while elapsed < max_seconds {
            elapsed += DT;
            let actions = director.tick(DT, settings, table, view);
            let done = actions.iter().any(&until);
            seen.extend(actions);
            if done {
                return (elapsed, seen);
            }
        }
        (elapsed, seen)
    }

    #[test]
    fn test_wave_starts_after_prepare_time() {
        let settings = settings();
        let table = table();
        let mut director = WaveDirector::new(&settings);

        let (elapsed, actions) = run_until(&mut director, &settings, &table, players_alive(), 10.0, |a| {
            matches!(a, WaveAction::Started { .. })
        });

        assert!((elapsed - 5.0).abs() < 0.15, "elapsed = {}", elapsed);
        assert!(actions.contains(&WaveAction::Started { wave: 1, mobs: 2 }));
        assert!(matches!(director.phase, WavePhase::Spawning { .. }));
    }

    #[test]
    fn test_spawn_delay_and_interval() {
        let settings = settings();
        let table = table();
        let mut director = WaveDirector::new(&settings);
        run_until(&mut director, &settings, &table, players_alive(), 10.0, |a| {
            matches!(a, WaveAction::Started { .. })
        });

        let (first, _) = run_until(&mut director, &settings, &table, players_alive(), 10.0, |a| {
            matches!(a, WaveAction::Spawn(_))
        });
        assert!((first - 3.0).abs() < 0.15, "first spawn after {}", first);

        let (second, actions) = run_until(&mut director, &settings, &table, players_alive(), 10.0, |a| {
            matches!(a, WaveAction::Spawn(_))
        });
        assert!((second - 0.8).abs() < 0.15, "second spawn after {}", second);
        assert_eq!(actions[0], WaveAction::Spawn(ArchetypeId::new("imp")));
        assert!(actions.contains(&WaveAction::SpawningFinished { wave: 1 }));
        assert!(matches!(director.phase, WavePhase::InProgress { .. }));
    }

    #[test]
    fn test_wave_not_cleared_while_mobs_alive() {
        let settings = settings();
        let table = table();
        let mut director = WaveDirector::new(&settings);
        run_until(&mut director, &settings, &table, players_alive(), 20.0, |a| {
            matches!(a, WaveAction::SpawningFinished { .. })
        });

        let alive = WaveView {
            wave_alive: true,
            ..players_alive()
        };
        let (_, actions) = run_until(&mut director, &settings, &table, alive, 30.0, |a| {
            matches!(a, WaveAction::Cleared { .. })
        });
        assert!(actions.is_empty());
        assert_eq!(director.wave, 1);

        // Все умерли → проверка каждые 3 с
        let (elapsed, actions) = run_until(&mut director, &settings, &table, players_alive(), 10.0, |a| {
            matches!(a, WaveAction::Cleared { .. })
        });
        assert!(elapsed <= 3.15, "elapsed = {}", elapsed);
        assert_eq!(actions, vec![WaveAction::Cleared { wave: 1 }]);
        assert_eq!(director.wave, 2);
        assert!(matches!(director.phase, WavePhase::BeforeWave { .. }));
    }

    #[test]
    fn test_won_after_max_waves() {
        let settings = settings();
        let table = table();
        let mut director = WaveDirector::new(&settings);

        let (_, actions) = run_until(&mut director, &settings, &table, players_alive(), 100.0, |a| {
            matches!(a, WaveAction::Won { .. })
        });

        assert!(actions.contains(&WaveAction::Cleared { wave: 1 }));
        assert!(actions.contains(&WaveAction::Cleared { wave: 2 }));
        assert!(actions.contains(&WaveAction::Won { waves_cleared: 2 }));
        assert!(!actions.iter().any(|a| matches!(a, WaveAction::Started { wave: 3, .. })));
        assert!(director.is_finished());
        assert_eq!(director.waves_cleared(), 2);

        // Терминальное состояние
        assert!(director.tick(DT, &settings, &table, players_alive()).is_empty());
    }

    #[test]
    fn test_won_when_source_runs_out() {
        let settings = WaveSettings {
            max_waves: 15,
            ..Default::default()
        };
        let table = WaveTable::new(vec![vec!["imp".into()]]);
        let mut director = WaveDirector::new(&settings);

        let (_, actions) = run_until(&mut director, &settings, &table, players_alive(), 100.0, |a| {
            matches!(a, WaveAction::Won { .. })
        });

        assert!(actions.contains(&WaveAction::Won { waves_cleared: 1 }));
        assert_eq!(director.phase, WavePhase::Won);
    }

    #[test]
    fn test_game_over_checked_every_five_seconds() {
        let settings = settings();
        let table = table();
        let mut director = WaveDirector::new(&settings);
        let dead = WaveView {
            wave_alive: false,
            players_present: 2,
            players_alive: 0,
        };

        let (elapsed, actions) = run_until(&mut director, &settings, &table, dead, 20.0, |a| {
            matches!(a, WaveAction::GameOver { .. })
        });

        assert!((elapsed - 5.0).abs() < 0.15, "elapsed = {}", elapsed);
        assert!(actions.contains(&WaveAction::GameOver { wave: 1 }));
        assert_eq!(director.phase, WavePhase::GameOver);
    }

    #[test]
    fn test_no_players_never_game_over() {
        let settings = settings();
        let table = table();
        let mut director = WaveDirector::new(&settings);
        let empty = WaveView::default();

        let (_, actions) = run_until(&mut director, &settings, &table, empty, 30.0, |a| {
            matches!(a, WaveAction::GameOver { .. })
        });

        assert!(!actions.iter().any(|a| matches!(a, WaveAction::GameOver { .. })));
    }

    #[test]
    fn test_two_player_health_multiplier() {
        let settings = WaveSettings::default();

        assert_eq!(settings.health_multiplier(1), 1.0);
        assert_eq!(settings.health_multiplier(2), 1.8);
    }
}
