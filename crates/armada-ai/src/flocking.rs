//! Swarm-level steering corrections: separation and cohesion.
//!
//! Applied at a lower cadence than the per-ship navigator, on top of its
//! output. Neighbor lists are supplied by the caller.

use glam::DVec3;

use armada_core::config::SwarmConfig;

/// Push away from neighbors closer than `radius`, stronger when closer.
pub fn separation(position: DVec3, neighbors: &[DVec3], radius: f64, strength: f64) -> DVec3 {
    if radius <= 0.0 || strength <= 0.0 {
        return DVec3::ZERO;
    }

    let mut force = DVec3::ZERO;
    for neighbor in neighbors {
        let away = position - *neighbor;
        let distance = away.length();
        if distance > 0.0 && distance < radius {
            force += away / distance * (1.0 - distance / radius) * strength;
        }
    }
    force
}

/// Pull toward the centroid of the neighbors.
pub fn cohesion(position: DVec3, neighbors: &[DVec3], strength: f64) -> DVec3 {
    if neighbors.is_empty() {
        return DVec3::ZERO;
    }
    let centroid = neighbors.iter().copied().sum::<DVec3>() / neighbors.len() as f64;
    (centroid - position) * strength
}

/// Velocity correction for one ship from all others in `positions`
/// (which may include the ship itself). Only neighbors within the
/// configured radius count.
pub fn swarm_correction(position: DVec3, positions: &[DVec3], cfg: &SwarmConfig) -> DVec3 {
    let neighbors: Vec<DVec3> = positions
        .iter()
        .copied()
        .filter(|p| {
            let d = p.distance(position);
            d > 0.0 && d <= cfg.neighbor_radius
        })
        .collect();

    separation(position, &neighbors, cfg.separation_radius, cfg.separation_strength)
        + cohesion(position, &neighbors, cfg.cohesion_strength)
}
