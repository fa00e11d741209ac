//! Systems that operate on the arena each tick.
//!
//! Systems are free functions over the population (or the bare `World` when
//! that is all they touch). They own no state; timers and buffers they need
//! are passed in by the orchestrator.

pub mod behavior;
pub mod bounds;
pub mod cleanup;
pub mod clustering;
pub mod formations;
pub mod navigation;
pub mod roster;
pub mod snapshot;
pub mod swarm;
pub mod tactical;
pub mod wave_spawner;
