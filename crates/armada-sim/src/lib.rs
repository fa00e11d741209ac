//! Arena orchestration for ARMADA.
//!
//! Owns the hecs world of hostile ships, runs the AI systems in a fixed
//! order each tick, and produces ArenaSnapshots for the host game.

pub mod engine;
pub mod error;
pub mod external;
pub mod population;
pub mod systems;
pub mod world_setup;

pub use armada_core as core;
pub use engine::Orchestrator;
pub use error::ArenaError;

#[cfg(test)]
mod tests;
