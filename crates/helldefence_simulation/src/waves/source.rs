//! Wave data: какие archetypes выходят в волне N
//!
//! Ядро знает только `WaveSource::get_wave(n)`. Формат файлов: забота хоста;
//! `WaveTable`: in-memory реализация (serde), её можно собрать из любого формата.

use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::archetypes::CreatureArchetypes;

/// Имя archetype'а существа ("imp", "brute", ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchetypeId(pub String);

impl ArchetypeId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ArchetypeId {
    fn from(name: &str) -> Self {
        Self::new(name.trim())
    }
}

impl fmt::Display for ArchetypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait WaveSource: Send + Sync + 'static {
    /// Состав волны `wave` (нумерация с 1); `None`: волн больше нет
    fn get_wave(&self, wave: u32) -> Option<Vec<ArchetypeId>>;
}

/// Ошибки валидации wave data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaveError {
    #[error("wave table is empty")]
    EmptyTable,
    #[error("wave {wave} has no creatures")]
    EmptyWave { wave: u32 },
    #[error("wave {wave} references unknown archetype '{archetype}'")]
    UnknownArchetype { wave: u32, archetype: ArchetypeId },
}

/// In-memory wave table: `waves[0]`: первая волна
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WaveTable {
    pub waves: Vec<Vec<ArchetypeId>>,
}

impl WaveTable {
    pub fn new(waves: Vec<Vec<ArchetypeId>>) -> Self {
        Self { waves }
    }

    /// Нарастающие волны из стандартных archetypes (imp / brute / thrower / shaman)
    pub fn ramp(count: u32) -> Self {
        let waves = (1..=count)
            .map(|wave| {
                let mut mobs = Vec::new();
                mobs.extend((0..wave + 2).map(|_| ArchetypeId::from("imp")));
                mobs.extend((0..wave / 3).map(|_| ArchetypeId::from("brute")));
                mobs.extend((0..wave / 4).map(|_| ArchetypeId::from("thrower")));
                mobs.extend((0..wave / 5).map(|_| ArchetypeId::from("shaman")));
                mobs
            })
            .collect();

        Self { waves }
    }

    pub fn len(&self) -> usize {
        self.waves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Проверка: непустые волны, все archetypes известны
    pub fn validate(&self, archetypes: &CreatureArchetypes) -> Result<(), WaveError> {
        if self.waves.is_empty() {
            return Err(WaveError::EmptyTable);
        }

        for (index, wave) in self.waves.iter().enumerate() {
            let number = index as u32 + 1;
            if wave.is_empty() {
                return Err(WaveError::EmptyWave { wave: number });
            }
            if let Some(unknown) = wave.iter().find(|id| !archetypes.contains(id)) {
                return Err(WaveError::UnknownArchetype {
                    wave: number,
                    archetype: unknown.clone(),
                });
            }
        }

        Ok(())
    }
}

impl WaveSource for WaveTable {
    fn get_wave(&self, wave: u32) -> Option<Vec<ArchetypeId>> {
        let index = wave.checked_sub(1)? as usize;
        self.waves.get(index).cloned()
    }
}

/// Resource: активный источник волн
#[derive(Resource)]
pub struct ActiveWaveSource {
    source: Box<dyn WaveSource>,
}

impl Default for ActiveWaveSource {
    fn default() -> Self {
        Self::new(WaveTable::ramp(15))
    }
}

impl ActiveWaveSource {
    pub fn new(source: impl WaveSource) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    pub fn source(&self) -> &dyn WaveSource {
        self.source.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_wave_is_one_based() {
        let table = WaveTable::new(vec![vec!["imp".into()], vec!["brute".into(), "imp".into()]]);

        assert_eq!(table.get_wave(0), None);
        assert_eq!(table.get_wave(1), Some(vec![ArchetypeId::new("imp")]));
        assert_eq!(table.get_wave(2).map(|w| w.len()), Some(2));
        assert_eq!(table.get_wave(3), None);
    }

    #[test]
    fn test_ramp_grows() {
        let table = WaveTable::ramp(15);

        assert_eq!(table.len(), 15);
        assert_eq!(table.get_wave(1).map(|w| w.len()), Some(3));
        let last = table.get_wave(15).unwrap_or_default();
        assert!(last.contains(&ArchetypeId::new("shaman")));
        assert!(last.len() > 3);
    }

    #[test]
    fn test_validate() {
        let archetypes = CreatureArchetypes::default();

        assert_eq!(WaveTable::ramp(15).validate(&archetypes), Ok(()));
        assert_eq!(WaveTable::default().validate(&archetypes), Err(WaveError::EmptyTable));
        assert_eq!(
            WaveTable::new(vec![vec!["imp".into()], vec![]]).validate(&archetypes),
            Err(WaveError::EmptyWave { wave: 2 })
        );
        assert_eq!(
            WaveTable::new(vec![vec!["imp".into(), "dragon".into()]]).validate(&archetypes),
            Err(WaveError::UnknownArchetype {
                wave: 1,
                archetype: ArchetypeId::new("dragon"),
            })
        );
    }

    #[test]
    fn test_error_messages() {
        let error = WaveError::UnknownArchetype {
            wave: 3,
            archetype: ArchetypeId::new("dragon"),
        };
        assert_eq!(error.to_string(), "wave 3 references unknown archetype 'dragon'");
    }

    #[test]
    fn test_archetype_id_trims() {
        assert_eq!(ArchetypeId::from(" imp \r"), ArchetypeId::new("imp"));
    }
}
