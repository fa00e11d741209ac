//! Fundamental geometric and simulation types.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Stable identifier of a hostile ship. Never reused within one arena.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct AgentId(pub u32);

/// Stable identifier of a formation. Never reused within one arena.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FormationId(pub u32);

/// Identifier of a host-side contact (the player, or anything else the host
/// lets the swarm target). The swarm never owns the contact's lifetime.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TargetId(pub u32);

/// Read-only view of a host entity the swarm may target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: TargetId,
    pub position: DVec3,
    pub velocity: DVec3,
    /// Health as a fraction of maximum (0.0 - 1.0).
    pub health_ratio: f64,
}

impl Contact {
    pub fn new(id: TargetId, position: DVec3, velocity: DVec3) -> Self {
        Self {
            id,
            position,
            velocity,
            health_ratio: 1.0,
        }
    }

    /// Position extrapolated `secs` into the future at constant velocity.
    pub fn predicted_position(&self, secs: f64) -> DVec3 {
        self.position + self.velocity * secs
    }
}

/// Orthonormal orientation frame of a ship.
/// Convention: y is world up; forward is the direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Basis {
    pub forward: DVec3,
    pub right: DVec3,
    pub up: DVec3,
}

impl Default for Basis {
    fn default() -> Self {
        Self {
            forward: DVec3::Z,
            right: DVec3::X,
            up: DVec3::Y,
        }
    }
}

impl Basis {
    /// Build a right-handed frame whose forward axis is `forward`.
    ///
    /// Falls back to the world X axis as the reference "up" when `forward`
    /// is (nearly) vertical, and to the default frame when `forward` is zero.
    pub fn from_forward(forward: DVec3) -> Self {
        let Some(forward) = forward.try_normalize() else {
            return Self::default();
        };
        let reference_up = if forward.dot(DVec3::Y).abs() > 0.999 {
            DVec3::X
        } else {
            DVec3::Y
        };
        let right = reference_up.cross(forward).normalize();
        let up = forward.cross(right).normalize();
        Self { forward, right, up }
    }

    /// Transform a local offset (x = right, y = up, z = forward) into world space.
    pub fn to_world(&self, local: DVec3) -> DVec3 {
        self.right * local.x + self.up * local.y + self.forward * local.z
    }
}

/// Spherical play area supplied by the host game.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub center: DVec3,
    pub radius: f64,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            center: DVec3::ZERO,
            radius: crate::constants::WORLD_RADIUS,
        }
    }
}

impl WorldBounds {
    /// Distance from the bounds center.
    pub fn distance_from_center(&self, point: DVec3) -> f64 {
        point.distance(self.center)
    }

    pub fn contains(&self, point: DVec3) -> bool {
        self.distance_from_center(point) <= self.radius
    }

    /// Project a point onto the sphere if it lies outside; otherwise return it unchanged.
    pub fn clamp(&self, point: DVec3) -> DVec3 {
        let offset = point - self.center;
        if offset.length() <= self.radius {
            return point;
        }
        self.center + offset.normalize_or_zero() * self.radius
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Advance by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.elapsed_secs += dt;
    }
}

/// Personality scalars, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    pub aggressiveness: f64,
    pub caution: f64,
    pub teamwork: f64,
}

impl Default for Personality {
    fn default() -> Self {
        Self {
            aggressiveness: 0.5,
            caution: 0.5,
            teamwork: 0.5,
        }
    }
}

impl Personality {
    pub fn new(aggressiveness: f64, caution: f64, teamwork: f64) -> Self {
        Self {
            aggressiveness: aggressiveness.clamp(0.0, 1.0),
            caution: caution.clamp(0.0, 1.0),
            teamwork: teamwork.clamp(0.0, 1.0),
        }
    }
}
