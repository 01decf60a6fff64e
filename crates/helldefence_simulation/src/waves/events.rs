//! Wave events (для UI / звука / buff stands)

use bevy::prelude::*;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveEvent {
    Started { wave: u32 },
    Cleared { wave: u32 },
    Won { waves_cleared: u32 },
    GameOver { wave: u32 },
}
