//! Formation system: dynamic adjustment and slot targets.

use armada_ai::formation::MemberState;
use armada_core::config::FormationConfig;

use crate::population::Population;
use crate::systems::roster::{self, AgentRecord};

/// Expand formations with an engaged member, contract idle ones, force
/// Sphere under heavy attrition, then re-derive every slot target from the
/// leader.
pub fn run(population: &mut Population, roster: &[AgentRecord], dt: f64, cfg: &FormationConfig) {
    for formation in population.formations.values_mut() {
        let engaged = formation
            .members()
            .iter()
            .filter_map(|m| roster::find(roster, m.agent))
            .any(AgentRecord::is_engaged);
        formation.adjust(engaged, dt, cfg);

        formation.update(
            |agent| {
                roster::find(roster, agent).map(|r| MemberState {
                    position: r.position,
                    velocity: r.velocity,
                    basis: r.basis,
                    engaged: r.is_engaged(),
                })
            },
            cfg,
        );
    }
}
