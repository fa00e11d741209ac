//! Swarm system: separation and cohesion at their own cadence.

use glam::DVec3;

use armada_ai::flocking::swarm_correction;
use armada_ai::profiles::get_profile;
use armada_core::components::{Kinematics, Pilot};
use armada_core::config::SwarmConfig;
use armada_core::types::AgentId;

use crate::population::Population;

/// Advance the swarm timer; when it fires, nudge every velocity by its
/// flocking correction. Corrections are computed from one set of positions
/// and applied afterwards. Returns whether the pass ran.
pub fn run(population: &mut Population, timer: &mut f64, dt: f64, cfg: &SwarmConfig) -> bool {
    *timer += dt;
    if *timer < cfg.interval_secs {
        return false;
    }
    *timer = 0.0;

    let mut agents: Vec<(AgentId, DVec3)> = population
        .world
        .query::<(&AgentId, &Kinematics)>()
        .iter()
        .map(|(_, (id, kin))| (*id, kin.position))
        .collect();
    agents.sort_by_key(|(id, _)| *id);
    let positions: Vec<DVec3> = agents.iter().map(|(_, p)| *p).collect();

    let corrections: Vec<(AgentId, DVec3)> = agents
        .iter()
        .map(|(id, position)| (*id, swarm_correction(*position, &positions, cfg)))
        .filter(|(_, correction)| *correction != DVec3::ZERO)
        .collect();

    for (agent, correction) in corrections {
        let Some(entity) = population.entity(agent) else {
            continue;
        };
        if let Ok((kin, pilot)) = population
            .world
            .query_one_mut::<(&mut Kinematics, &Pilot)>(entity)
        {
            let max_speed = get_profile(pilot.class).max_speed;
            kin.velocity = (kin.velocity + correction).clamp_length_max(max_speed);
        }
    }
    true
}
