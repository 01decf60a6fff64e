//! AI systems (creature behaviour per simulation step)

pub mod commands;
pub mod fsm;
pub mod perception;

// Re-export all systems
pub use commands::*;
pub use fsm::*;
pub use perception::*;
