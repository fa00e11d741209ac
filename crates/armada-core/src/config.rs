//! Tunable parameters, grouped per component.
//!
//! Every struct has `#[serde(default)]`, so a host may supply a partial JSON
//! document and inherit the remaining values from [`crate::constants`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;
use crate::types::WorldBounds;

/// Configuration rejected by [`ArenaConfig::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must lie in [0, 1], got {value}")]
    NotFraction { field: &'static str, value: f64 },

    #[error("formation scale bounds are inverted: min {min} > max {max}")]
    InvertedScaleBounds { min: f64, max: f64 },

    #[error("wave size bounds are inverted: min {min} > max {max}")]
    InvertedWaveBounds { min: usize, max: usize },

    #[error("{field} must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        min: usize,
        value: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    pub arrival_threshold: f64,
    pub direct_path_max_distance: f64,
    pub waypoint_spacing: f64,
    pub max_waypoints: usize,
    pub avoidance_radius: f64,
    pub look_ahead_secs: f64,
    pub min_look_ahead: f64,
    pub replan_threshold: f64,
    pub avoidance_blend: f64,
    pub steering_rate: f64,
    pub ship_radius: f64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            arrival_threshold: ARRIVAL_THRESHOLD,
            direct_path_max_distance: DIRECT_PATH_MAX_DISTANCE,
            waypoint_spacing: WAYPOINT_SPACING,
            max_waypoints: MAX_WAYPOINTS,
            avoidance_radius: AVOIDANCE_RADIUS,
            look_ahead_secs: LOOK_AHEAD_SECS,
            min_look_ahead: MIN_LOOK_AHEAD,
            replan_threshold: AVOIDANCE_REPLAN_THRESHOLD,
            avoidance_blend: AVOIDANCE_BLEND,
            steering_rate: STEERING_RATE,
            ship_radius: SHIP_RADIUS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationConfig {
    pub spacing: f64,
    pub v_spread_angle_deg: f64,
    pub helix_step_angle: f64,
    pub helix_pitch_factor: f64,
    pub slot_tolerance: f64,
    pub catch_up_max_multiplier: f64,
    pub catch_up_full_distance: f64,
    pub catch_up_seek_weight: f64,
    pub smoothing_rate: f64,
    pub scale_min: f64,
    pub scale_max: f64,
    pub scale_expand_rate: f64,
    pub scale_contract_rate: f64,
    pub leader_min_health: f64,
    pub leader_health_weight: f64,
    pub leader_teamwork_weight: f64,
    pub attrition_ratio: f64,
    pub attrition_min_peak: usize,
    pub max_size: usize,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            spacing: FORMATION_SPACING,
            v_spread_angle_deg: V_SPREAD_ANGLE_DEG,
            helix_step_angle: HELIX_STEP_ANGLE,
            helix_pitch_factor: HELIX_PITCH_FACTOR,
            slot_tolerance: SLOT_TOLERANCE,
            catch_up_max_multiplier: CATCH_UP_MAX_MULTIPLIER,
            catch_up_full_distance: CATCH_UP_FULL_DISTANCE,
            catch_up_seek_weight: CATCH_UP_SEEK_WEIGHT,
            smoothing_rate: SLOT_SMOOTHING_RATE,
            scale_min: FORMATION_SCALE_MIN,
            scale_max: FORMATION_SCALE_MAX,
            scale_expand_rate: FORMATION_SCALE_EXPAND_RATE,
            scale_contract_rate: FORMATION_SCALE_CONTRACT_RATE,
            leader_min_health: LEADER_MIN_HEALTH,
            leader_health_weight: LEADER_HEALTH_WEIGHT,
            leader_teamwork_weight: LEADER_TEAMWORK_WEIGHT,
            attrition_ratio: ATTRITION_RATIO,
            attrition_min_peak: ATTRITION_MIN_PEAK,
            max_size: MAX_FORMATION_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub patrol_waypoint_count: usize,
    pub patrol_radius_min: f64,
    pub patrol_radius_max: f64,
    pub attack_close_factor: f64,
    pub attack_backoff_factor: f64,
    pub weapon_range_factor: f64,
    pub attack_reevaluate_secs: f64,
    pub flee_health_ratio: f64,
    pub flee_caution: f64,
    pub target_lost_secs: f64,
    pub support_trigger_ally_health: f64,
    pub support_trigger_teamwork: f64,
    pub request_support_teamwork: f64,
    pub coordinated_strike_allies: usize,
    pub pursue_timeout_secs: f64,
    pub pursue_base_radius: f64,
    pub pursue_radius_growth: f64,
    pub flee_min_secs: f64,
    pub flee_recover_health: f64,
    pub flee_min_allies: usize,
    pub flee_distance: f64,
    pub flee_threat_gone_factor: f64,
    pub support_select_health: f64,
    pub support_recovered_health: f64,
    pub support_max_secs: f64,
    pub support_guard_offset: f64,
    pub ally_sense_radius: f64,
    pub point_reached_distance: f64,
    pub quick_strike_secs: f64,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            patrol_waypoint_count: PATROL_WAYPOINT_COUNT,
            patrol_radius_min: PATROL_RADIUS_MIN,
            patrol_radius_max: PATROL_RADIUS_MAX,
            attack_close_factor: ATTACK_CLOSE_FACTOR,
            attack_backoff_factor: ATTACK_BACKOFF_FACTOR,
            weapon_range_factor: WEAPON_RANGE_FACTOR,
            attack_reevaluate_secs: ATTACK_REEVALUATE_SECS,
            flee_health_ratio: FLEE_HEALTH_RATIO,
            flee_caution: FLEE_CAUTION,
            target_lost_secs: TARGET_LOST_SECS,
            support_trigger_ally_health: SUPPORT_TRIGGER_ALLY_HEALTH,
            support_trigger_teamwork: SUPPORT_TRIGGER_TEAMWORK,
            request_support_teamwork: REQUEST_SUPPORT_TEAMWORK,
            coordinated_strike_allies: COORDINATED_STRIKE_ALLIES,
            pursue_timeout_secs: PURSUE_TIMEOUT_SECS,
            pursue_base_radius: PURSUE_BASE_RADIUS,
            pursue_radius_growth: PURSUE_RADIUS_GROWTH,
            flee_min_secs: FLEE_MIN_SECS,
            flee_recover_health: FLEE_RECOVER_HEALTH,
            flee_min_allies: FLEE_MIN_ALLIES,
            flee_distance: FLEE_DISTANCE,
            flee_threat_gone_factor: FLEE_THREAT_GONE_FACTOR,
            support_select_health: SUPPORT_SELECT_HEALTH,
            support_recovered_health: SUPPORT_RECOVERED_HEALTH,
            support_max_secs: SUPPORT_MAX_SECS,
            support_guard_offset: SUPPORT_GUARD_OFFSET,
            ally_sense_radius: ALLY_SENSE_RADIUS,
            point_reached_distance: POINT_REACHED_DISTANCE,
            quick_strike_secs: QUICK_STRIKE_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TacticalConfig {
    pub interval_secs: f64,
    pub cohesion_reference_spread: f64,
    pub threat_reference_range: f64,
    pub history_capacity: usize,
    pub flank_distance: f64,
    pub pincer_offset: f64,
    pub pincer_lead_secs: f64,
    pub bombard_range: f64,
    pub cover_height: f64,
    pub caution_nudge: f64,
}

impl Default for TacticalConfig {
    fn default() -> Self {
        Self {
            interval_secs: TACTICAL_INTERVAL_SECS,
            cohesion_reference_spread: COHESION_REFERENCE_SPREAD,
            threat_reference_range: THREAT_REFERENCE_RANGE,
            history_capacity: TACTICAL_HISTORY_CAPACITY,
            flank_distance: FLANK_DISTANCE,
            pincer_offset: PINCER_OFFSET,
            pincer_lead_secs: PINCER_LEAD_SECS,
            bombard_range: BOMBARD_RANGE,
            cover_height: COVER_HEIGHT,
            caution_nudge: CAUTION_NUDGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    pub interval_secs: f64,
    pub separation_radius: f64,
    pub separation_strength: f64,
    pub cohesion_strength: f64,
    pub neighbor_radius: f64,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            interval_secs: SWARM_INTERVAL_SECS,
            separation_radius: SEPARATION_RADIUS,
            separation_strength: SEPARATION_STRENGTH,
            cohesion_strength: COHESION_STRENGTH,
            neighbor_radius: SWARM_NEIGHBOR_RADIUS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Disable to drive the population entirely from the host.
    pub enabled: bool,
    pub base_max_population: usize,
    pub base_interval_secs: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub grid_spacing: f64,
    pub wave_size_min: usize,
    pub wave_size_max: usize,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_max_population: BASE_MAX_POPULATION,
            base_interval_secs: BASE_SPAWN_INTERVAL_SECS,
            min_distance: SPAWN_MIN_DISTANCE,
            max_distance: SPAWN_MAX_DISTANCE,
            grid_spacing: SPAWN_GRID_SPACING,
            wave_size_min: WAVE_SIZE_MIN,
            wave_size_max: WAVE_SIZE_MAX,
        }
    }
}

/// Complete arena configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// RNG seed. Same seed and same inputs = same simulation.
    pub seed: u64,
    pub bounds: WorldBounds,
    /// Inward acceleration per unit of overshoot beyond the bounds.
    pub boundary_push_strength: f64,
    /// Agents beyond `radius * boundary_hard_factor` are snapped back.
    pub boundary_hard_factor: f64,
    pub cluster_radius: f64,
    pub min_cluster_size: usize,
    pub formation_join_radius: f64,
    pub navigator: NavigatorConfig,
    pub formation: FormationConfig,
    pub behavior: BehaviorConfig,
    pub tactical: TacticalConfig,
    pub swarm: SwarmConfig,
    pub spawn: SpawnConfig,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            bounds: WorldBounds::default(),
            boundary_push_strength: BOUNDARY_PUSH_STRENGTH,
            boundary_hard_factor: BOUNDARY_HARD_FACTOR,
            cluster_radius: CLUSTER_RADIUS,
            min_cluster_size: MIN_CLUSTER_SIZE,
            formation_join_radius: FORMATION_JOIN_RADIUS,
            navigator: NavigatorConfig::default(),
            formation: FormationConfig::default(),
            behavior: BehaviorConfig::default(),
            tactical: TacticalConfig::default(),
            swarm: SwarmConfig::default(),
            spawn: SpawnConfig::default(),
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::NotFraction { field, value })
    }
}

impl ArenaConfig {
    /// Check the values the systems divide by or clamp against.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("bounds.radius", self.bounds.radius)?;
        positive("boundary_hard_factor", self.boundary_hard_factor)?;
        positive("cluster_radius", self.cluster_radius)?;
        if self.min_cluster_size < 2 {
            return Err(ConfigError::TooSmall {
                field: "min_cluster_size",
                min: 2,
                value: self.min_cluster_size,
            });
        }

        let nav = &self.navigator;
        positive("navigator.arrival_threshold", nav.arrival_threshold)?;
        positive("navigator.waypoint_spacing", nav.waypoint_spacing)?;
        positive("navigator.avoidance_radius", nav.avoidance_radius)?;
        fraction("navigator.avoidance_blend", nav.avoidance_blend)?;
        if nav.max_waypoints < 1 {
            return Err(ConfigError::TooSmall {
                field: "navigator.max_waypoints",
                min: 1,
                value: nav.max_waypoints,
            });
        }

        let formation = &self.formation;
        positive("formation.spacing", formation.spacing)?;
        positive("formation.slot_tolerance", formation.slot_tolerance)?;
        positive("formation.catch_up_full_distance", formation.catch_up_full_distance)?;
        fraction("formation.catch_up_seek_weight", formation.catch_up_seek_weight)?;
        fraction("formation.leader_min_health", formation.leader_min_health)?;
        fraction("formation.attrition_ratio", formation.attrition_ratio)?;
        positive("formation.scale_min", formation.scale_min)?;
        if formation.scale_min > formation.scale_max {
            return Err(ConfigError::InvertedScaleBounds {
                min: formation.scale_min,
                max: formation.scale_max,
            });
        }
        if formation.max_size < 2 {
            return Err(ConfigError::TooSmall {
                field: "formation.max_size",
                min: 2,
                value: formation.max_size,
            });
        }

        let behavior = &self.behavior;
        positive("behavior.pursue_timeout_secs", behavior.pursue_timeout_secs)?;
        positive("behavior.ally_sense_radius", behavior.ally_sense_radius)?;
        positive("behavior.patrol_radius_max", behavior.patrol_radius_max)?;
        positive("behavior.point_reached_distance", behavior.point_reached_distance)?;
        fraction("behavior.flee_health_ratio", behavior.flee_health_ratio)?;
        fraction("behavior.flee_caution", behavior.flee_caution)?;

        let tactical = &self.tactical;
        positive("tactical.interval_secs", tactical.interval_secs)?;
        positive("tactical.cohesion_reference_spread", tactical.cohesion_reference_spread)?;
        positive("tactical.threat_reference_range", tactical.threat_reference_range)?;

        positive("swarm.interval_secs", self.swarm.interval_secs)?;

        let spawn = &self.spawn;
        positive("spawn.base_interval_secs", spawn.base_interval_secs)?;
        positive("spawn.grid_spacing", spawn.grid_spacing)?;
        if spawn.wave_size_min > spawn.wave_size_max {
            return Err(ConfigError::InvertedWaveBounds {
                min: spawn.wave_size_min,
                max: spawn.wave_size_max,
            });
        }
        Ok(())
    }
}
