//! Cleanup system: removes destroyed agents and disposes empty formations.

use armada_ai::tactics::{GroupKey, TacticalCoordinator};
use armada_core::components::Hull;
use armada_core::config::FormationConfig;
use armada_core::types::AgentId;

use crate::external::CommunicationHub;
use crate::population::Population;

/// Remove every agent with health at or below zero.
///
/// Each one leaves its formation first (electing a new leader if it led),
/// then its entity is despawned and the hub is told. Formations left
/// without members are dropped along with their tactical timers.
/// Uses a pre-allocated buffer to avoid per-tick allocation.
pub fn run<H: CommunicationHub + ?Sized>(
    population: &mut Population,
    coordinator: &mut TacticalCoordinator,
    hub: &mut H,
    despawn_buffer: &mut Vec<AgentId>,
    cfg: &FormationConfig,
) {
    despawn_buffer.clear();
    for (_entity, (id, hull)) in population.world.query_mut::<(&AgentId, &Hull)>() {
        if hull.is_destroyed() {
            despawn_buffer.push(*id);
        }
    }
    despawn_buffer.sort();

    for agent in despawn_buffer.drain(..) {
        let formation = population.leave(agent, cfg);
        population.despawn(agent);
        hub.unregister(agent);
        tracing::info!(agent = agent.0, formation = formation.map(|f| f.0), "agent removed");
    }

    for formation in population.dispose_empty_formations() {
        coordinator.forget(GroupKey::Formation(formation));
        tracing::info!(formation = formation.0, "formation disposed");
    }

    debug_assert!(
        population
            .world
            .query::<&Hull>()
            .iter()
            .all(|(_, hull)| !hull.is_destroyed()),
        "destroyed agent survived cleanup"
    );
}
