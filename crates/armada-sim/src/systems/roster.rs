//! Roster system: a read-only copy of every agent taken once per tick.
//!
//! Cross-agent reads (allies, obstacles, group membership) go through the
//! roster so no system observes another agent half-updated.

use glam::DVec3;

use armada_ai::fsm::BehaviorMachine;
use armada_core::components::*;
use armada_core::enums::{BehaviorState, ShipClass};
use armada_core::types::{AgentId, Basis, Personality, TargetId};

use crate::population::Population;

#[derive(Debug, Clone, Copy)]
pub struct AgentRecord {
    pub id: AgentId,
    pub class: ShipClass,
    pub position: DVec3,
    pub velocity: DVec3,
    pub basis: Basis,
    pub health_ratio: f64,
    pub personality: Personality,
    pub state: BehaviorState,
    pub link: Option<FormationLink>,
    pub target: Option<TargetId>,
}

impl AgentRecord {
    /// Whether the agent is fighting rather than cruising.
    pub fn is_engaged(&self) -> bool {
        self.target.is_some() && matches!(self.state, BehaviorState::Attack | BehaviorState::Support)
    }
}

/// Records for all live agents, ordered by id.
pub fn take(population: &Population) -> Vec<AgentRecord> {
    let mut records: Vec<AgentRecord> = population
        .world
        .query::<(
            &AgentId,
            &Kinematics,
            &Hull,
            &Pilot,
            &Targeting,
            &BehaviorMachine,
            Option<&FormationLink>,
        )>()
        .iter()
        .map(|(_entity, (id, kin, hull, pilot, targeting, machine, link))| AgentRecord {
            id: *id,
            class: pilot.class,
            position: kin.position,
            velocity: kin.velocity,
            basis: kin.basis,
            health_ratio: hull.ratio(),
            personality: pilot.personality,
            state: machine.state(),
            link: link.copied(),
            target: targeting.target,
        })
        .collect();
    records.sort_by_key(|r| r.id);
    records
}

pub fn find(records: &[AgentRecord], id: AgentId) -> Option<&AgentRecord> {
    records
        .binary_search_by_key(&id, |r| r.id)
        .ok()
        .map(|i| &records[i])
}
