//! Per-ship destination seeking with reactive obstacle avoidance.
//!
//! Paths are straight lines split into evenly spaced waypoints; there is no
//! global search. Avoidance casts a fixed bundle of rays each update and
//! blends a lateral correction into the steered velocity.

use glam::DVec3;

use armada_core::config::NavigatorConfig;
use armada_core::types::{Basis, WorldBounds};

/// A spherical obstacle (usually an allied ship).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub position: DVec3,
    pub radius: f64,
}

/// Read-only input to [`Navigator::update`].
pub struct NavContext<'a> {
    pub position: DVec3,
    pub velocity: DVec3,
    pub basis: Basis,
    pub max_speed: f64,
    pub obstacles: &'a [Obstacle],
    pub bounds: &'a WorldBounds,
}

/// Result of one navigator update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavStatus {
    /// No destination set.
    Idle,
    EnRoute,
    /// An intermediate waypoint was reached this update.
    WaypointReached,
    /// The final waypoint was reached this update.
    DestinationReached,
    /// Destination reached earlier; holding position.
    Holding,
}

#[derive(Debug, Clone, Copy)]
pub struct NavOutput {
    /// Velocity intent for the movement effector.
    pub velocity: DVec3,
    pub status: NavStatus,
    /// Avoidance vector computed this update (length in [0, 1]).
    pub avoidance: DVec3,
}

/// Path-following state for one ship.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    destination: Option<DVec3>,
    path: Vec<DVec3>,
    index: usize,
    stale: bool,
    arrived: bool,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the destination. The path is rebuilt from the ship's position
    /// on the next update.
    pub fn set_destination(&mut self, point: DVec3) {
        self.destination = Some(point);
        self.path.clear();
        self.index = 0;
        self.stale = true;
        self.arrived = false;
    }

    /// Drop the destination; the ship keeps its current velocity.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn destination(&self) -> Option<DVec3> {
        self.destination
    }

    pub fn path(&self) -> &[DVec3] {
        &self.path
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current_waypoint(&self) -> Option<DVec3> {
        self.path.get(self.index).copied()
    }

    /// Whether the path will be recomputed on the next update.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn has_arrived(&self) -> bool {
        self.arrived
    }

    /// Advance along the path and return a velocity intent.
    pub fn update(&mut self, ctx: &NavContext<'_>, dt: f64, cfg: &NavigatorConfig) -> NavOutput {
        let Some(destination) = self.destination else {
            return NavOutput {
                velocity: ctx.velocity,
                status: NavStatus::Idle,
                avoidance: DVec3::ZERO,
            };
        };

        if self.stale {
            self.path = compute_path(ctx.position, destination, cfg);
            self.index = 0;
            self.stale = false;
            tracing::trace!(waypoints = self.path.len(), "path recomputed");
        }

        let mut status = NavStatus::EnRoute;
        if !self.arrived {
            while let Some(waypoint) = self.path.get(self.index) {
                if ctx.position.distance(*waypoint) > cfg.arrival_threshold {
                    break;
                }
                self.index += 1;
                status = NavStatus::WaypointReached;
            }
            if self.index >= self.path.len() && !self.path.is_empty() {
                self.arrived = true;
                status = NavStatus::DestinationReached;
            }
        } else {
            status = NavStatus::Holding;
        }

        let desired = if self.arrived {
            // Gentle station keeping around the destination.
            (destination - ctx.position).clamp_length_max(ctx.max_speed) * 0.5
        } else {
            // An empty path means no path could be built: seek directly.
            let waypoint = self.current_waypoint().unwrap_or(destination);
            let is_final = self.index + 1 >= self.path.len();
            seek(ctx.position, waypoint, ctx.max_speed, is_final, cfg)
        };

        let mut velocity = steer(ctx.velocity, desired, cfg.steering_rate, dt);

        let avoidance = avoidance_vector(
            ctx.position,
            velocity,
            &ctx.basis,
            ctx.obstacles,
            ctx.bounds,
            cfg,
        );
        if avoidance.length() > cfg.replan_threshold && !self.arrived {
            self.stale = true;
        }
        if avoidance != DVec3::ZERO {
            let speed = velocity.length().max(ctx.max_speed * 0.5);
            velocity = velocity.lerp(avoidance * speed, cfg.avoidance_blend);
        }

        NavOutput {
            velocity: velocity.clamp_length_max(ctx.max_speed),
            status,
            avoidance,
        }
    }
}

/// Straight-line path from `from` to `to`, excluding the start point.
///
/// Short hops get a single waypoint; longer ones are split into segments of
/// roughly `waypoint_spacing`. Returns an empty path for non-finite input.
pub fn compute_path(from: DVec3, to: DVec3, cfg: &NavigatorConfig) -> Vec<DVec3> {
    if !from.is_finite() || !to.is_finite() {
        return Vec::new();
    }
    let distance = from.distance(to);
    if distance <= cfg.direct_path_max_distance {
        return vec![to];
    }

    let segments = ((distance / cfg.waypoint_spacing).ceil() as usize).clamp(1, cfg.max_waypoints);
    (1..=segments)
        .map(|k| from.lerp(to, k as f64 / segments as f64))
        .collect()
}

/// The nine avoidance rays: forward, forward±right, forward±up, ±right, ±up.
pub fn ray_bundle(basis: &Basis) -> [DVec3; 9] {
    let f = basis.forward;
    let r = basis.right;
    let u = basis.up;
    [
        f,
        (f + r).normalize_or_zero(),
        (f - r).normalize_or_zero(),
        (f + u).normalize_or_zero(),
        (f - u).normalize_or_zero(),
        r,
        -r,
        u,
        -u,
    ]
}

/// Sum of weighted lateral corrections over all rays that hit an obstacle
/// or leave the world bounds, clamped to unit length.
pub fn avoidance_vector(
    position: DVec3,
    velocity: DVec3,
    basis: &Basis,
    obstacles: &[Obstacle],
    bounds: &WorldBounds,
    cfg: &NavigatorConfig,
) -> DVec3 {
    let look_ahead = (velocity.length() * cfg.look_ahead_secs).max(cfg.min_look_ahead);
    let rays = ray_bundle(basis);
    let mut sum = DVec3::ZERO;

    for obstacle in obstacles {
        let to_obstacle = obstacle.position - position;
        let gap = (to_obstacle.length() - obstacle.radius).max(0.0);
        if gap >= cfg.avoidance_radius || to_obstacle.length_squared() < 1e-9 {
            continue;
        }
        let weight = 1.0 - gap / cfg.avoidance_radius;
        let hit_radius = obstacle.radius + cfg.ship_radius;
        for ray in &rays {
            if ray_hits_sphere(position, *ray, look_ahead, obstacle.position, hit_radius) {
                sum += lateral_away(basis, to_obstacle) * weight;
            }
        }
    }

    let outward = position - bounds.center;
    let gap = (bounds.radius - outward.length()).max(0.0);
    if gap < cfg.avoidance_radius {
        let weight = 1.0 - gap / cfg.avoidance_radius;
        let normal = outward.try_normalize().unwrap_or(basis.forward);
        for ray in &rays {
            let tip = position + *ray * look_ahead;
            if tip.distance(bounds.center) > bounds.radius {
                sum += lateral_away(basis, normal) * weight;
            }
        }
    }

    sum.clamp_length_max(1.0)
}

/// Direction perpendicular to forward pointing away from the obstacle.
/// Derived from forward × (forward × to_obstacle); falls back to the up
/// axis when the obstacle is dead ahead or behind.
fn lateral_away(basis: &Basis, to_obstacle: DVec3) -> DVec3 {
    basis
        .forward
        .cross(basis.forward.cross(to_obstacle))
        .try_normalize()
        .unwrap_or(basis.up)
}

fn ray_hits_sphere(origin: DVec3, dir: DVec3, length: f64, center: DVec3, radius: f64) -> bool {
    let along = (center - origin).dot(dir).clamp(0.0, length);
    let closest = origin + dir * along;
    closest.distance(center) <= radius
}

/// Desired velocity toward a waypoint, slowing on the final approach.
fn seek(position: DVec3, waypoint: DVec3, max_speed: f64, is_final: bool, cfg: &NavigatorConfig) -> DVec3 {
    let to = waypoint - position;
    let distance = to.length();
    if distance < 1e-9 {
        return DVec3::ZERO;
    }
    let slowing = cfg.arrival_threshold * 3.0;
    let speed = if is_final {
        max_speed * (distance / slowing).clamp(0.2, 1.0)
    } else {
        max_speed
    };
    to / distance * speed
}

/// Move `current` toward `desired`, removing `rate` of the error per second.
pub fn steer(current: DVec3, desired: DVec3, rate: f64, dt: f64) -> DVec3 {
    current + (desired - current) * (rate * dt).clamp(0.0, 1.0)
}
