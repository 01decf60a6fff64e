//! Wave director: BeforeWave → Spawning → InProgress → (Cleared → BeforeWave | Won), GameOver
//!
//! Чистая state machine: `tick` получает снимок мира (`WaveView`) и возвращает
//! список `WaveAction`, которые система превращает в spawn'ы и события.

use std::collections::VecDeque;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::source::{ArchetypeId, WaveSource};

/// Resource: tuning волн
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveSettings {
    /// Пауза перед волной
    pub prepare_time: f32,
    /// Задержка от старта волны до первого моба
    pub spawn_delay: f32,
    pub spawn_interval: f32,
    /// Начальная destination моба: случайная точка в ±spread от центра арены
    pub destination_spread: f32,
    pub clear_check_interval: f32,
    pub game_over_check_interval: f32,
    pub max_waves: u32,
    pub health_multiplier_per_extra_player: f32,
    pub spawn_points: Vec<Vec3>,
}

impl Default for WaveSettings {
    fn default() -> Self {
        Self {
            prepare_time: 5.0,
            spawn_delay: 3.0,
            spawn_interval: 0.8,
            destination_spread: 5.0,
            clear_check_interval: 3.0,
            game_over_check_interval: 5.0,
            max_waves: 15,
            health_multiplier_per_extra_player: 1.8,
            spawn_points: vec![
                Vec3::new(-20.0, 0.0, 0.0),
                Vec3::new(20.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, -20.0),
                Vec3::new(0.0, 0.0, 20.0),
            ],
        }
    }
}

impl WaveSettings {
    /// Множитель здоровья мобов для `players` игроков
    pub fn health_multiplier(&self, players: usize) -> f32 {
        if players >= 2 {
            self.health_multiplier_per_extra_player
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WavePhase {
    BeforeWave { remaining: f32 },
    Spawning { delay: f32, queue: VecDeque<ArchetypeId> },
    InProgress { check_in: f32 },
    Won,
    GameOver,
}

impl WavePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            WavePhase::BeforeWave { .. } => "BeforeWave",
            WavePhase::Spawning { .. } => "Spawning",
            WavePhase::InProgress { .. } => "InProgress",
            WavePhase::Won => "Won",
            WavePhase::GameOver => "GameOver",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, WavePhase::Won | WavePhase::GameOver)
    }
}

/// Что director хочет от мира на этом шаге
#[derive(Debug, Clone, PartialEq)]
pub enum WaveAction {
    Started { wave: u32, mobs: usize },
    Spawn(ArchetypeId),
    SpawningFinished { wave: u32 },
    Cleared { wave: u32 },
    Won { waves_cleared: u32 },
    GameOver { wave: u32 },
}

/// Снимок мира для director'а
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WaveView {
    /// Жив ли хоть один моб текущей волны (и всё ещё Mob)
    pub wave_alive: bool,
    pub players_present: usize,
    pub players_alive: usize,
}

/// Resource: состояние волн
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct WaveDirector {
    pub phase: WavePhase,
    /// Номер текущей (или следующей) волны, с 1
    pub wave: u32,
    /// Мобы текущей волны
    pub spawned: Vec<Entity>,
    pub game_over_check_in: f32,
}

impl Default for WaveDirector {
    fn default() -> Self {
        Self::new(&WaveSettings::default())
    }
}

impl WaveDirector {
    pub fn new(settings: &WaveSettings) -> Self {
        Self {
            phase: WavePhase::BeforeWave {
                remaining: settings.prepare_time,
            },
            wave: 1,
            spawned: Vec::new(),
            game_over_check_in: settings.game_over_check_interval,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_finished()
    }

    /// Волны, пройденные до конца
    pub fn waves_cleared(&self) -> u32 {
        match self.phase {
            WavePhase::Won => self.wave,
            _ => self.wave.saturating_sub(1),
        }
    }

    /// Один шаг state machine
    pub fn tick(
        &mut self,
        delta: f32,
        settings: &WaveSettings,
        source: &dyn WaveSource,
        view: WaveView,
    ) -> Vec<WaveAction> {
        let mut actions = Vec::new();

        if self.is_finished() {
            return actions;
        }

        self.game_over_check_in -= delta;
        if self.game_over_check_in <= 0.0 {
            self.game_over_check_in += settings.game_over_check_interval.max(f32::EPSILON);
            if view.players_present > 0 && view.players_alive == 0 {
                self.phase = WavePhase::GameOver;
                actions.push(WaveAction::GameOver { wave: self.wave });
                return actions;
            }
        }

        match &mut self.phase {
            WavePhase::BeforeWave { remaining } => {
                *remaining -= delta;
                if *remaining > 0.0 {
                    return actions;
                }

                match source.get_wave(self.wave) {
                    Some(mobs) => {
                        actions.push(WaveAction::Started {
                            wave: self.wave,
                            mobs: mobs.len(),
                        });
                        self.spawned.clear();
                        self.phase = WavePhase::Spawning {
                            delay: settings.spawn_delay,
                            queue: mobs.into(),
                        };
                    }
                    None => {
                        // Волн больше нет: победа
                        self.wave = self.wave.saturating_sub(1);
                        self.phase = WavePhase::Won;
                        actions.push(WaveAction::Won {
                            waves_cleared: self.wave,
                        });
                    }
                }
            }
            WavePhase::Spawning { delay, queue } => {
                *delay -= delta;
                while *delay <= 0.0 {
                    let Some(next) = queue.pop_front() else {
                        break;
                    };
                    actions.push(WaveAction::Spawn(next));
                    *delay += settings.spawn_interval.max(f32::EPSILON);
                }

                if queue.is_empty() {
                    actions.push(WaveAction::SpawningFinished { wave: self.wave });
                    self.phase = WavePhase::InProgress {
                        check_in: settings.clear_check_interval,
                    };
                }
            }
            WavePhase::InProgress { check_in } => {
                *check_in -= delta;
                if *check_in > 0.0 {
                    return actions;
                }
                *check_in += settings.clear_check_interval.max(f32::EPSILON);

                if view.wave_alive {
                    return actions;
                }

                actions.push(WaveAction::Cleared { wave: self.wave });
                self.spawned.clear();

                if self.wave >= settings.max_waves {
                    self.phase = WavePhase::Won;
                    actions.push(WaveAction::Won {
                        waves_cleared: self.wave,
                    });
                } else {
                    self.wave += 1;
                    self.phase = WavePhase::BeforeWave {
                        remaining: settings.prepare_time,
                    };
                }
            }
            WavePhase::Won | WavePhase::GameOver => {}
        }

        actions
    }
}
