//! Snapshot system: builds the ArenaSnapshot handed to the host.
//!
//! This system is read-only; it never modifies the world.

use armada_ai::fsm::BehaviorMachine;
use armada_core::components::*;
use armada_core::state::*;
use armada_core::types::{AgentId, SimTime};

use crate::population::Population;

pub fn build_snapshot(
    population: &Population,
    time: &SimTime,
    difficulty_level: u32,
    tactics: Vec<TacticView>,
) -> ArenaSnapshot {
    ArenaSnapshot {
        time: *time,
        agents: build_agents(population),
        formations: build_formations(population),
        difficulty_level,
        tactics,
    }
}

fn build_agents(population: &Population) -> Vec<AgentView> {
    let mut agents: Vec<AgentView> = population
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
        .map(|(_, (id, kin, hull, pilot, targeting, machine, link))| AgentView {
            id: *id,
            class: pilot.class,
            position: kin.position,
            velocity: kin.velocity,
            forward: kin.basis.forward,
            up: kin.basis.up,
            health: hull.health,
            max_health: hull.max_health,
            state: machine.state(),
            formation: link.map(|l| l.formation),
            slot: link.map(|l| l.slot),
            target: targeting.target,
        })
        .collect();
    agents.sort_by_key(|a| a.id);
    agents
}

fn build_formations(population: &Population) -> Vec<FormationView> {
    population
        .formations()
        .map(|formation| FormationView {
            id: formation.id(),
            shape: formation.shape(),
            center: formation.center(),
            direction: formation.direction(),
            scale: formation.scale(),
            members: formation.member_ids(),
            slots: formation.slot_positions(),
        })
        .collect()
}
