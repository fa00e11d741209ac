//! Entity spawn factories and wave placement.
//!
//! Builds the component bundle of a new agent and decides where a wave
//! appears and what it is made of.

use std::f64::consts::TAU;

use glam::DVec3;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use armada_ai::fsm::BehaviorMachine;
use armada_ai::navigator::Navigator;
use armada_ai::profiles::get_profile;
use armada_core::components::*;
use armada_core::config::SpawnConfig;
use armada_core::enums::ShipClass;
use armada_core::types::{AgentId, Personality, WorldBounds};

/// Components of a freshly spawned agent. Formation membership is added
/// later by clustering.
pub type AgentBundle = (
    AgentId,
    Kinematics,
    Hull,
    Pilot,
    Targeting,
    BehaviorMachine,
    Navigator,
);

pub fn agent_bundle(
    id: AgentId,
    class: ShipClass,
    position: DVec3,
    personality: Personality,
) -> AgentBundle {
    let profile = get_profile(class);
    (
        id,
        Kinematics::at(position),
        Hull::new(profile.max_health),
        Pilot { class, personality },
        Targeting::default(),
        BehaviorMachine::new(position),
        Navigator::new(),
    )
}

/// Uniform personality in [0, 1]³.
pub fn roll_personality<R: Rng + ?Sized>(rng: &mut R) -> Personality {
    Personality::new(rng.gen(), rng.gen(), rng.gen())
}

/// Relative spawn weights in `ShipClass::ALL` order. Bombers and
/// interceptors become more common as the level rises.
pub fn class_weights(level: u32) -> [u32; 4] {
    [4, 5, level.min(5), (level * 2).min(6)]
}

pub fn roll_class<R: Rng + ?Sized>(rng: &mut R, level: u32) -> ShipClass {
    match WeightedIndex::new(class_weights(level)) {
        Ok(dist) => ShipClass::ALL[dist.sample(rng)],
        Err(_) => ShipClass::Fighter,
    }
}

/// Wave size for a level: the configured range, shifted up one ship every
/// two levels.
pub fn roll_wave_size<R: Rng + ?Sized>(rng: &mut R, level: u32, cfg: &SpawnConfig) -> usize {
    let base = if cfg.wave_size_max > cfg.wave_size_min {
        rng.gen_range(cfg.wave_size_min..=cfg.wave_size_max)
    } else {
        cfg.wave_size_min
    };
    base + (level.saturating_sub(1) / 2) as usize
}

/// A point `min_distance..max_distance` away from `reference`, kept inside
/// the bounds with room for a wave grid of `margin`.
pub fn spawn_point<R: Rng + ?Sized>(
    rng: &mut R,
    reference: DVec3,
    bounds: &WorldBounds,
    margin: f64,
    cfg: &SpawnConfig,
) -> DVec3 {
    let heading = rng.gen_range(0.0..TAU);
    let pitch: f64 = rng.gen_range(-0.3..0.3);
    let direction = DVec3::new(
        heading.cos() * pitch.cos(),
        pitch.sin(),
        heading.sin() * pitch.cos(),
    );
    let distance = if cfg.max_distance > cfg.min_distance {
        rng.gen_range(cfg.min_distance..cfg.max_distance)
    } else {
        cfg.min_distance
    };
    keep_inside(bounds, reference + direction * distance, margin)
}

/// Pull `point` back so that it lies at least `margin` inside the bounds.
pub fn keep_inside(bounds: &WorldBounds, point: DVec3, margin: f64) -> DVec3 {
    let limit = (bounds.radius - margin).max(0.0);
    let offset = point - bounds.center;
    if offset.length() <= limit {
        return point;
    }
    bounds.center + offset.normalize_or_zero() * limit
}

/// Positions of `count` ships in a square grid on the horizontal plane,
/// centered on `center`.
pub fn wave_grid(center: DVec3, count: usize, spacing: f64) -> Vec<DVec3> {
    if count == 0 {
        return Vec::new();
    }
    let cols = (count as f64).sqrt().ceil() as usize;
    let rows = count.div_ceil(cols);
    let half_cols = (cols - 1) as f64 / 2.0;
    let half_rows = (rows - 1) as f64 / 2.0;

    (0..count)
        .map(|i| {
            let col = (i % cols) as f64 - half_cols;
            let row = (i / cols) as f64 - half_rows;
            center + DVec3::new(col * spacing, 0.0, row * spacing)
        })
        .collect()
}

/// Half the diagonal of the grid `wave_grid` lays out for `count` ships.
pub fn grid_extent(count: usize, spacing: f64) -> f64 {
    let cols = (count.max(1) as f64).sqrt().ceil();
    cols * spacing * std::f64::consts::FRAC_1_SQRT_2
}
