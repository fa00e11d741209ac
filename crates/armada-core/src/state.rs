//! Arena snapshot: the complete visible state handed to the host each tick.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{AgentId, FormationId, SimTime, TargetId};

/// Complete arena state after a tick. Rendering reads this; it never
/// reaches into the simulation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    pub time: SimTime,
    /// Agents ordered by id.
    pub agents: Vec<AgentView>,
    /// Formations ordered by id.
    pub formations: Vec<FormationView>,
    /// Current difficulty level reported by the host's scaler.
    pub difficulty_level: u32,
    /// Tactics chosen during this tick, in evaluation order.
    pub tactics: Vec<TacticView>,
}

/// One ship as seen by the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentView {
    pub id: AgentId,
    pub class: ShipClass,
    pub position: DVec3,
    pub velocity: DVec3,
    pub forward: DVec3,
    pub up: DVec3,
    pub health: f64,
    pub max_health: f64,
    pub state: BehaviorState,
    pub formation: Option<FormationId>,
    pub slot: Option<usize>,
    pub target: Option<TargetId>,
}

/// One formation as seen by the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormationView {
    pub id: FormationId,
    pub shape: FormationShape,
    pub center: DVec3,
    pub direction: DVec3,
    pub scale: f64,
    /// Members in slot order; the first is the leader.
    pub members: Vec<AgentId>,
    /// World-space slot targets in slot order.
    pub slots: Vec<DVec3>,
}

/// A tactic executed during the tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TacticView {
    pub formation: Option<FormationId>,
    pub tactic: TacticKind,
    pub effectiveness: f64,
}
