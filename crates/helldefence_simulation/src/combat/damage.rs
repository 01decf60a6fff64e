//! Damage pipeline: DamageRequest → Vitals + knockback → DamageDealt / EntityDied
//!
//! Источники урона (удар моба, снаряд, способности внешнего effect слоя)
//! только пишут `DamageRequest`; здоровье меняется в одном месте.

use bevy::prelude::*;

use crate::components::Vitals;
use crate::logger;
use crate::physics::KineticBody;
use crate::signals::{SoundCue, SoundKind, VisualCue, VisualKind};

/// Событие: нанести урон `target`
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DamageRequest {
    pub target: Entity,
    pub source: Option<Entity>,
    pub amount: i32,
    /// Сила отбрасывания (уже с направлением), делится на массу цели
    pub knockback: Vec3,
}

impl DamageRequest {
    pub fn new(target: Entity, source: Option<Entity>, amount: i32) -> Self {
        Self {
            target,
            source,
            amount,
            knockback: Vec3::ZERO,
        }
    }

    pub fn with_knockback(mut self, force: Vec3) -> Self {
        self.knockback = force;
        self
    }
}

/// Событие: урон нанесен
///
/// Генерируется после применения damage к Vitals.
/// Используется для UI, звуков, эффектов.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct DamageDealt {
    pub attacker: Option<Entity>,
    pub target: Entity,
    pub damage: u32,
    pub target_died: bool,
}

/// Событие: entity умер (health == 0), ровно один раз
#[derive(Event, Debug, Clone, PartialEq)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Компонент-маркер: entity мертв (Vitals::is_dead)
///
/// Ставит `death_watch`; деспавн отдельно (`DespawnAfter`).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Dead;

/// Кто последним нанес урон (для EntityDied::killer)
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct LastHitBy(pub Entity);

/// Компонент: деспавн через `remaining` секунд
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct DespawnAfter {
    pub remaining: f32,
}

impl DespawnAfter {
    pub fn new(seconds: f32) -> Self {
        Self {
            remaining: seconds.max(0.0),
        }
    }
}

/// Система: применение DamageRequest
pub fn apply_damage(
    mut commands: Commands,
    mut requests: EventReader<DamageRequest>,
    mut targets: Query<(&mut Vitals, Option<&mut KineticBody>, &Transform)>,
    mut damage_dealt: EventWriter<DamageDealt>,
    mut sounds: EventWriter<SoundCue>,
    mut visuals: EventWriter<VisualCue>,
) {
    for request in requests.read() {
        if request.amount <= 0 {
            continue;
        }

        let Ok((mut vitals, body, transform)) = targets.get_mut(request.target) else {
            logger::log_warning(&format!("DamageRequest: target {:?} has no Vitals", request.target));
            continue;
        };

        // Труп не добиваем
        if vitals.is_dead() {
            continue;
        }

        let before = vitals.current;
        vitals.decrease(request.amount);
        let dealt = before - vitals.current;

        if let Some(mut body) = body {
            if request.knockback != Vec3::ZERO {
                body.add_impulse(request.knockback);
            }
        }

        if let Some(source) = request.source {
            commands.entity(request.target).try_insert(LastHitBy(source));
        }

        damage_dealt.write(DamageDealt {
            attacker: request.source,
            target: request.target,
            damage: dealt,
            target_died: vitals.is_dead(),
        });
        sounds.write(SoundCue {
            entity: request.target,
            sound: SoundKind::Hit,
        });
        visuals.write(VisualCue {
            kind: VisualKind::Hit,
            position: transform.translation,
            attach_to: Some(request.target),
        });

        logger::log(&format!(
            "💥 {:?} → {:?}: {} damage (hp {}/{})",
            request.source, request.target, dealt, vitals.current, vitals.max
        ));
    }
}

/// Система: level-triggered смерть → EntityDied один раз + маркер Dead
///
/// Ловит и смерть не от DamageRequest (внешний `Vitals::decrease`).
pub fn death_watch(
    mut commands: Commands,
    query: Query<(Entity, &Vitals, Option<&LastHitBy>), Without<Dead>>,
    mut entity_died: EventWriter<EntityDied>,
) {
    for (entity, vitals, last_hit) in query.iter() {
        if vitals.is_alive() {
            continue;
        }

        commands.entity(entity).try_insert(Dead);
        entity_died.write(EntityDied {
            entity,
            killer: last_hit.map(|hit| hit.0),
        });

        logger::log_info(&format!("☠️ Entity {:?} killed by {:?}", entity, last_hit.map(|hit| hit.0)));
    }
}

/// Система: деспавн entities с истёкшим DespawnAfter
pub fn despawn_after_timeout(
    mut commands: Commands,
    mut query: Query<(Entity, &mut DespawnAfter)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut timer) in query.iter_mut() {
        timer.remaining -= delta;
        if timer.remaining <= 0.0 {
            commands.entity(entity).despawn();
        }
    }
}
