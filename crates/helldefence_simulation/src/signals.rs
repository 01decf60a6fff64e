//! Signals для внешних коллабораторов (аниматор, аудио, VFX)
//!
//! Ядро только пишет события и никогда их не ждёт.
//! Host (движок) читает их через `EventReader` и проигрывает как хочет.

use bevy::prelude::*;

/// Intent-флаги для аниматора
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationSignalKind {
    Walk(bool),
    Attack(bool),
    Die,
    Casting(bool),
    CastCancelled,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct AnimationSignal {
    pub entity: Entity,
    pub kind: AnimationSignalKind,
}

impl AnimationSignal {
    pub fn new(entity: Entity, kind: AnimationSignalKind) -> Self {
        Self { entity, kind }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundKind {
    Attack,
    Death,
    Hit,
    Cast,
    Pickup,
    WaveStarted,
}

/// "Проиграй звук X" (позиционный, от entity)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct SoundCue {
    pub entity: Entity,
    pub sound: SoundKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualKind {
    Hit,
    Heal,
    StatBuff,
    AbilityGranted,
    Domesticated,
    ProjectileImpact,
}

/// "Заспавни визуал Y в позе"
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct VisualCue {
    pub kind: VisualKind,
    pub position: Vec3,
    /// Прицепить к entity (эффект лечения на игроке)
    pub attach_to: Option<Entity>,
}

pub struct SignalsPlugin;

impl Plugin for SignalsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AnimationSignal>()
            .add_event::<SoundCue>()
            .add_event::<VisualCue>();
    }
}
