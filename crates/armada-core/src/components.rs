//! ECS components for hecs entities.
//!
//! Components are plain data structs with no game logic.
//! Behavior lives in `armada-ai` and in the systems of `armada-sim`.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::enums::ShipClass;
use crate::types::{Basis, FormationId, Personality, TargetId};

/// Position, velocity and orientation of a ship.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    pub position: DVec3,
    pub velocity: DVec3,
    pub basis: Basis,
}

impl Kinematics {
    pub fn at(position: DVec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Re-derive the orientation from the current velocity.
    /// A (nearly) stationary ship keeps its previous orientation.
    pub fn align_to_velocity(&mut self) {
        if self.velocity.length_squared() > 1e-6 {
            self.basis = Basis::from_forward(self.velocity);
        }
    }
}

/// Structural integrity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hull {
    pub health: f64,
    pub max_health: f64,
}

impl Hull {
    pub fn new(max_health: f64) -> Self {
        Self {
            health: max_health,
            max_health,
        }
    }

    /// Health as a fraction of maximum, clamped to [0, 1].
    pub fn ratio(&self) -> f64 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }

    pub fn is_destroyed(&self) -> bool {
        self.health <= 0.0
    }
}

/// Fixed identity of the ship's pilot: capability class and personality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pilot {
    pub class: ShipClass,
    pub personality: Personality,
}

/// Targeting memory. The target is a weak reference resolved every tick
/// against the host's contact list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Targeting {
    pub target: Option<TargetId>,
    pub last_known_position: Option<DVec3>,
    /// Seconds since the target was last inside detection range.
    pub time_since_seen: f64,
}

/// Membership of a ship in a formation. Mirrors the formation's slot table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormationLink {
    pub formation: FormationId,
    pub slot: usize,
}
