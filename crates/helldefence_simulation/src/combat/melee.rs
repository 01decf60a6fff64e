//! Melee: контакт attack volume → урон + отбрасывание
//!
//! # Flow
//!
//! ```text
//! update_creature_ai: start_attack (brain.attack = Some, hit_locked = false)
//!   ↓
//! detect_contacts: AttackVolume ∩ тело → ContactEvent { source: AttackVolume }
//!   ↓
//! resolve_attack_hits: враждебный живой target → DamageRequest, hit_locked = true
//!   ↓
//! re-arm (attack_frequency) снимает hit_locked
//! ```

use bevy::prelude::*;

use super::damage::DamageRequest;
use crate::ai::{CreatureBrain, CreatureConfig};
use crate::components::{Actor, Vitals};
use crate::logger;
use crate::physics::{flat, ContactEvent, ContactSource};

/// Система: попадания melee атак
pub fn resolve_attack_hits(
    mut contacts: EventReader<ContactEvent>,
    mut attackers: Query<(&mut CreatureBrain, &CreatureConfig, &Actor, &Vitals, &Transform)>,
    targets: Query<(&Actor, &Vitals, &Transform)>,
    mut damage_requests: EventWriter<DamageRequest>,
) {
    for contact in contacts.read() {
        if contact.source != ContactSource::AttackVolume {
            continue;
        }

        let Ok((mut brain, config, attacker, attacker_vitals, attacker_transform)) = attackers.get_mut(contact.a) else {
            continue;
        };

        if !config.is_melee() || !brain.is_attacking() || brain.hit_locked || attacker_vitals.is_dead() {
            continue;
        }

        let Ok((target, target_vitals, target_transform)) = targets.get(contact.b) else {
            continue;
        };

        if !attacker.is_enemy_of(target) || target_vitals.is_dead() {
            continue;
        }

        let direction = flat(target_transform.translation - attacker_transform.translation).normalize_or_zero();
        damage_requests.write(
            DamageRequest::new(contact.b, Some(contact.a), config.damage).with_knockback(direction * config.hit_force),
        );
        brain.hit_locked = true;

        logger::log(&format!("⚔️ {:?} hit {:?} for {}", contact.a, contact.b, config.damage));
    }
}
