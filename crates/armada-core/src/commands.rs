//! Host commands sent to the arena.
//!
//! Commands are queued and applied at the start of the next tick, so the
//! agent and formation collections are never mutated mid-pass.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{AgentId, FormationId, Personality};

/// All host-side actions on the swarm.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ArenaCommand {
    // --- Population ---
    /// Spawn one ship. A missing personality is rolled from the arena RNG.
    SpawnAgent {
        class: ShipClass,
        position: DVec3,
        personality: Option<Personality>,
    },
    /// Spawn a wave of `count` ships at the next spawn point, ignoring the timer.
    SpawnWave { count: usize },
    /// Mark a ship destroyed. It leaves its formation and the arena during
    /// the next tick's cleanup.
    RemoveAgent { agent: AgentId },
    /// Mark every ship destroyed; ships and emptied formations go at the
    /// next cleanup.
    ClearAll,

    // --- Damage (owned by the host's weapon system) ---
    /// Subtract `amount` from a ship's health.
    ApplyDamage { agent: AgentId, amount: f64 },
    /// Overwrite a ship's health.
    SetHealth { agent: AgentId, health: f64 },

    // --- Formations ---
    /// Switch a formation to another shape.
    ChangeFormation {
        formation: FormationId,
        shape: FormationShape,
    },
}
