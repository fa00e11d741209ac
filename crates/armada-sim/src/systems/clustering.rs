//! Clustering system: gathers unassigned agents into formations.
//!
//! Unassigned agents near a formation with free capacity join it. The rest
//! are grouped by single linkage (any two within `cluster_radius` share a
//! cluster) and every cluster of at least `min_cluster_size` becomes a new
//! V formation, members added in id order so the lowest id leads.

use glam::DVec3;

use armada_core::components::{FormationLink, Kinematics};
use armada_core::config::ArenaConfig;
use armada_core::enums::FormationShape;
use armada_core::types::{AgentId, FormationId};

use crate::population::Population;

/// Returns the ids of formations created by this pass.
pub fn run(population: &mut Population, config: &ArenaConfig) -> Vec<FormationId> {
    let unassigned = unassigned_agents(population);
    if unassigned.is_empty() {
        return Vec::new();
    }

    let remaining: Vec<(AgentId, DVec3)> = unassigned
        .into_iter()
        .filter(|(agent, position)| !join_nearby(population, *agent, *position, config))
        .collect();

    let mut created = Vec::new();
    for cluster in single_linkage(&remaining, config.cluster_radius) {
        if cluster.len() < config.min_cluster_size {
            continue;
        }
        if let Some(id) = population.create_formation(FormationShape::V, &cluster, &config.formation) {
            created.push(id);
        }
    }
    created
}

fn unassigned_agents(population: &Population) -> Vec<(AgentId, DVec3)> {
    let mut agents: Vec<(AgentId, DVec3)> = population
        .world
        .query::<(&AgentId, &Kinematics, Option<&FormationLink>)>()
        .iter()
        .filter(|(_, (_, _, link))| link.is_none())
        .map(|(_, (id, kin, _))| (*id, kin.position))
        .collect();
    agents.sort_by_key(|(id, _)| *id);
    agents
}

/// Join the nearest formation with room that has a member within the join
/// radius. Returns whether the agent joined.
fn join_nearby(population: &mut Population, agent: AgentId, position: DVec3, config: &ArenaConfig) -> bool {
    let mut best: Option<(FormationId, f64)> = None;
    for formation in population.formations() {
        if formation.is_full(&config.formation) {
            continue;
        }
        let nearest = formation
            .member_ids()
            .into_iter()
            .filter_map(|member| population.kinematics(member))
            .map(|kin| kin.position.distance(position))
            .fold(f64::INFINITY, f64::min);
        if nearest <= config.formation_join_radius && best.is_none_or(|(_, d)| nearest < d) {
            best = Some((formation.id(), nearest));
        }
    }

    match best {
        Some((formation, _)) => population.join(formation, agent, &config.formation),
        None => false,
    }
}

/// Connected components of the "within `radius`" graph. Each component is
/// sorted by id; components are ordered by their lowest id.
pub fn single_linkage(agents: &[(AgentId, DVec3)], radius: f64) -> Vec<Vec<AgentId>> {
    let mut parent: Vec<usize> = (0..agents.len()).collect();

    fn root(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for i in 0..agents.len() {
        for j in (i + 1)..agents.len() {
            if agents[i].1.distance(agents[j].1) <= radius {
                let (a, b) = (root(&mut parent, i), root(&mut parent, j));
                if a != b {
                    parent[a.max(b)] = a.min(b);
                }
            }
        }
    }

    let mut clusters: Vec<Vec<AgentId>> = Vec::new();
    let mut slot_of_root: Vec<Option<usize>> = vec![None; agents.len()];
    for i in 0..agents.len() {
        let r = root(&mut parent, i);
        let slot = *slot_of_root[r].get_or_insert_with(|| {
            clusters.push(Vec::new());
            clusters.len() - 1
        });
        clusters[slot].push(agents[i].0);
    }
    for cluster in &mut clusters {
        cluster.sort();
    }
    clusters
}
