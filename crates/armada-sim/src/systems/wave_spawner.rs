//! Wave spawning system: spawns waves on a timer scaled by difficulty.

use glam::DVec3;
use rand::Rng;

use armada_core::config::ArenaConfig;
use armada_core::types::{AgentId, Contact};

use crate::external::DifficultyScaling;
use crate::population::Population;
use crate::world_setup;

/// Population cap after the difficulty multiplier.
pub fn max_population<D: DifficultyScaling + ?Sized>(difficulty: &D, config: &ArenaConfig) -> usize {
    let scaled = config.spawn.base_max_population as f64 * difficulty.max_population_multiplier();
    scaled.round().max(0.0) as usize
}

/// Seconds between waves after the difficulty multiplier.
pub fn spawn_interval<D: DifficultyScaling + ?Sized>(difficulty: &D, config: &ArenaConfig) -> f64 {
    config.spawn.base_interval_secs * difficulty.spawn_interval_multiplier()
}

/// Advance the spawn timer and spawn a wave when it fires, the population
/// is under its cap and a player exists to place the wave against.
/// Waves are trimmed so the cap is never exceeded.
pub fn run<R: Rng + ?Sized, D: DifficultyScaling + ?Sized>(
    population: &mut Population,
    rng: &mut R,
    timer: &mut f64,
    player: Option<&Contact>,
    difficulty: &D,
    dt: f64,
    config: &ArenaConfig,
) -> Vec<AgentId> {
    if !config.spawn.enabled {
        return Vec::new();
    }
    *timer += dt;
    if *timer < spawn_interval(difficulty, config) {
        return Vec::new();
    }
    let Some(player) = player else {
        return Vec::new();
    };
    let cap = max_population(difficulty, config);
    if population.len() >= cap {
        return Vec::new();
    }
    *timer = 0.0;

    let level = difficulty.level();
    let size = world_setup::roll_wave_size(rng, level, &config.spawn).min(cap - population.len());
    spawn_wave(population, rng, player.position, size, level, config)
}

/// Spawn `count` ships in a grid around a fresh spawn point near `reference`.
pub fn spawn_wave<R: Rng + ?Sized>(
    population: &mut Population,
    rng: &mut R,
    reference: DVec3,
    count: usize,
    level: u32,
    config: &ArenaConfig,
) -> Vec<AgentId> {
    if count == 0 {
        return Vec::new();
    }
    let margin = world_setup::grid_extent(count, config.spawn.grid_spacing);
    let center = world_setup::spawn_point(rng, reference, &config.bounds, margin, &config.spawn);

    let ids: Vec<AgentId> = world_setup::wave_grid(center, count, config.spawn.grid_spacing)
        .into_iter()
        .map(|position| {
            let class = world_setup::roll_class(rng, level);
            let personality = world_setup::roll_personality(rng);
            population.spawn(class, position, personality)
        })
        .collect();

    tracing::info!(count, level, x = center.x, y = center.y, z = center.z, "wave spawned");
    ids
}
