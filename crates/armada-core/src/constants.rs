//! Simulation constants and tuning parameters.
//!
//! These are the defaults behind the configuration structs in [`crate::config`].
//! Systems read the config values, never these constants directly, so tests
//! can vary them per case.

/// Default simulation step (seconds).
pub const DEFAULT_DT: f64 = 1.0 / 60.0;

/// Default arena radius (units).
pub const WORLD_RADIUS: f64 = 2_000.0;

/// Bounding radius of a ship used by obstacle avoidance.
pub const SHIP_RADIUS: f64 = 8.0;

// --- Ship classes ---

pub const SCOUT_SPEED: f64 = 140.0;
pub const SCOUT_HEALTH: f64 = 60.0;
pub const SCOUT_PREFERRED_RANGE: f64 = 220.0;
pub const SCOUT_DETECTION_RANGE: f64 = 900.0;

pub const FIGHTER_SPEED: f64 = 110.0;
pub const FIGHTER_HEALTH: f64 = 100.0;
pub const FIGHTER_PREFERRED_RANGE: f64 = 160.0;
pub const FIGHTER_DETECTION_RANGE: f64 = 650.0;

pub const BOMBER_SPEED: f64 = 70.0;
pub const BOMBER_HEALTH: f64 = 180.0;
pub const BOMBER_PREFERRED_RANGE: f64 = 320.0;
pub const BOMBER_DETECTION_RANGE: f64 = 600.0;

pub const INTERCEPTOR_SPEED: f64 = 160.0;
pub const INTERCEPTOR_HEALTH: f64 = 80.0;
pub const INTERCEPTOR_PREFERRED_RANGE: f64 = 110.0;
pub const INTERCEPTOR_DETECTION_RANGE: f64 = 700.0;

// --- Navigator ---

/// A waypoint counts as reached within this distance.
pub const ARRIVAL_THRESHOLD: f64 = 15.0;

/// Destinations closer than this get a direct path.
pub const DIRECT_PATH_MAX_DISTANCE: f64 = 100.0;

/// Approximate spacing of interpolated waypoints on long paths.
pub const WAYPOINT_SPACING: f64 = 80.0;

/// Upper bound on the number of waypoints in one path.
pub const MAX_WAYPOINTS: usize = 32;

/// Obstacles farther than this never produce avoidance.
pub const AVOIDANCE_RADIUS: f64 = 60.0;

/// Ray look-ahead expressed as seconds of travel at current speed.
pub const LOOK_AHEAD_SECS: f64 = 1.0;

/// Minimum ray look-ahead distance.
pub const MIN_LOOK_AHEAD: f64 = 30.0;

/// Avoidance magnitude above which the current path is treated as stale.
pub const AVOIDANCE_REPLAN_THRESHOLD: f64 = 0.7;

/// Interpolation weight of avoidance into velocity.
pub const AVOIDANCE_BLEND: f64 = 0.3;

/// Fraction of the remaining velocity error removed per second of steering.
pub const STEERING_RATE: f64 = 4.0;

// --- Formation ---

/// Distance between neighbouring slots at scale 1.0.
pub const FORMATION_SPACING: f64 = 30.0;

/// Half-angle of the V formation arms (degrees).
pub const V_SPREAD_ANGLE_DEG: f64 = 30.0;

/// Angular step between consecutive helix slots (radians).
pub const HELIX_STEP_ANGLE: f64 = std::f64::consts::FRAC_PI_3;

/// Height gained per helix slot, as a fraction of spacing.
pub const HELIX_PITCH_FACTOR: f64 = 0.4;

/// A member within this distance of its slot is "in position".
pub const SLOT_TOLERANCE: f64 = 15.0;

/// Cap on the catch-up speed multiplier.
pub const CATCH_UP_MAX_MULTIPLIER: f64 = 1.5;

/// Slot distance at which the catch-up multiplier reaches its cap.
pub const CATCH_UP_FULL_DISTANCE: f64 = 150.0;

/// Weight of slot seeking versus formation velocity when catching up.
pub const CATCH_UP_SEEK_WEIGHT: f64 = 0.7;

/// Fraction of velocity error removed per second when following a slot.
pub const SLOT_SMOOTHING_RATE: f64 = 5.0;

pub const FORMATION_SCALE_MIN: f64 = 0.8;
pub const FORMATION_SCALE_MAX: f64 = 1.5;
/// Scale change per second while engaged.
pub const FORMATION_SCALE_EXPAND_RATE: f64 = 0.5;
/// Scale change per second while idle.
pub const FORMATION_SCALE_CONTRACT_RATE: f64 = 0.1;

/// Leader candidates below this health ratio are skipped.
pub const LEADER_MIN_HEALTH: f64 = 0.3;
pub const LEADER_HEALTH_WEIGHT: f64 = 30.0;
pub const LEADER_TEAMWORK_WEIGHT: f64 = 10.0;

/// Formations below this fraction of their peak membership turn defensive.
pub const ATTRITION_RATIO: f64 = 0.5;

/// Peak membership a formation must have reached before attrition applies.
pub const ATTRITION_MIN_PEAK: usize = 4;

/// Maximum members in one formation.
pub const MAX_FORMATION_SIZE: usize = 12;

// --- Behavior ---

pub const PATROL_WAYPOINT_COUNT: usize = 4;
pub const PATROL_RADIUS_MIN: f64 = 100.0;
pub const PATROL_RADIUS_MAX: f64 = 250.0;

/// Close in when beyond this multiple of preferred range.
pub const ATTACK_CLOSE_FACTOR: f64 = 1.2;
/// Back away when inside this multiple of preferred range.
pub const ATTACK_BACKOFF_FACTOR: f64 = 0.8;
/// Weapon range as a multiple of preferred range.
pub const WEAPON_RANGE_FACTOR: f64 = 1.5;
pub const ATTACK_REEVALUATE_SECS: f64 = 2.0;

pub const FLEE_HEALTH_RATIO: f64 = 0.25;
pub const FLEE_CAUTION: f64 = 0.6;
pub const TARGET_LOST_SECS: f64 = 5.0;
pub const SUPPORT_TRIGGER_ALLY_HEALTH: f64 = 0.3;
pub const SUPPORT_TRIGGER_TEAMWORK: f64 = 0.7;
/// Teamwork above which an outnumbered attacker asks for help.
pub const REQUEST_SUPPORT_TEAMWORK: f64 = 0.6;
/// Allies needed for a coordinated strike.
pub const COORDINATED_STRIKE_ALLIES: usize = 2;

pub const PURSUE_TIMEOUT_SECS: f64 = 10.0;
pub const PURSUE_BASE_RADIUS: f64 = 50.0;
pub const PURSUE_RADIUS_GROWTH: f64 = 20.0;

pub const FLEE_MIN_SECS: f64 = 5.0;
pub const FLEE_RECOVER_HEALTH: f64 = 0.6;
pub const FLEE_MIN_ALLIES: usize = 2;
pub const FLEE_DISTANCE: f64 = 300.0;
/// Threat beyond this multiple of detection range counts as gone.
pub const FLEE_THREAT_GONE_FACTOR: f64 = 1.5;

pub const SUPPORT_SELECT_HEALTH: f64 = 0.5;
pub const SUPPORT_RECOVERED_HEALTH: f64 = 0.7;
pub const SUPPORT_MAX_SECS: f64 = 15.0;
pub const SUPPORT_GUARD_OFFSET: f64 = 40.0;

/// Allies within this radius count as "nearby".
pub const ALLY_SENSE_RADIUS: f64 = 200.0;
/// Patrol, search and directive points count as reached within this distance.
pub const POINT_REACHED_DISTANCE: f64 = 40.0;
/// Duration of a hit-and-run pass.
pub const QUICK_STRIKE_SECS: f64 = 3.0;

// --- Tactical ---

pub const TACTICAL_INTERVAL_SECS: f64 = 2.5;
pub const COHESION_REFERENCE_SPREAD: f64 = 100.0;
/// Target distance at which proximity stops contributing to threat.
pub const THREAT_REFERENCE_RANGE: f64 = 600.0;
pub const TACTICAL_HISTORY_CAPACITY: usize = 100;
pub const FLANK_DISTANCE: f64 = 150.0;
pub const PINCER_OFFSET: f64 = 120.0;
pub const PINCER_LEAD_SECS: f64 = 2.0;
pub const BOMBARD_RANGE: f64 = 350.0;
pub const COVER_HEIGHT: f64 = 60.0;
/// Maximum caution increase per defensive order.
pub const CAUTION_NUDGE: f64 = 0.1;

// --- Swarm ---

pub const SWARM_INTERVAL_SECS: f64 = 0.25;
pub const SEPARATION_RADIUS: f64 = 25.0;
pub const SEPARATION_STRENGTH: f64 = 40.0;
pub const COHESION_STRENGTH: f64 = 0.15;
pub const SWARM_NEIGHBOR_RADIUS: f64 = 120.0;

// --- Orchestrator ---

pub const CLUSTER_RADIUS: f64 = 80.0;
pub const MIN_CLUSTER_SIZE: usize = 3;
pub const FORMATION_JOIN_RADIUS: f64 = 80.0;

pub const BASE_MAX_POPULATION: usize = 24;
pub const BASE_SPAWN_INTERVAL_SECS: f64 = 8.0;
pub const SPAWN_MIN_DISTANCE: f64 = 600.0;
pub const SPAWN_MAX_DISTANCE: f64 = 900.0;
pub const SPAWN_GRID_SPACING: f64 = 20.0;
pub const WAVE_SIZE_MIN: usize = 2;
pub const WAVE_SIZE_MAX: usize = 4;

/// Inward acceleration per unit of overshoot beyond the bounds.
pub const BOUNDARY_PUSH_STRENGTH: f64 = 2.0;
/// Agents beyond this multiple of the radius are snapped back.
pub const BOUNDARY_HARD_FACTOR: f64 = 1.2;
