//! Базовые ECS компоненты акторов
//!
//! Организация по доменам:
//! - actor: faction + отношение враждебности (Actor, Faction, are_enemies)
//! - vitals: здоровье и регенерация (Vitals, regenerate_vitals)
//!
//! Остальные компоненты живут рядом со своими системами (physics, ai, abilities, stats).

pub mod actor;
pub mod vitals;

// Re-exports для удобного импорта
pub use actor::*;
pub use vitals::*;
