//! Swarm AI for ARMADA.
//!
//! Pure algorithms on plain data: class profiles, navigation with obstacle
//! avoidance, formation geometry, the per-ship behavior state machine, the
//! tactical coordinator and swarm flocking.

pub mod flocking;
pub mod formation;
pub mod fsm;
pub mod navigator;
pub mod profiles;
pub mod shapes;
pub mod tactics;

pub use armada_core as core;
