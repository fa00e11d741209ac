//! Class-specific capability profiles.
//!
//! Consolidates per-class parameters and maneuver functions for the
//! behavior FSM, the navigator and leader election.

use glam::DVec3;

use armada_core::enums::ShipClass;
use armada_core::types::Basis;

/// Input to a maneuver function.
#[derive(Debug, Clone, Copy)]
pub struct ManeuverInput {
    pub position: DVec3,
    pub velocity: DVec3,
    pub basis: Basis,
    pub target_position: DVec3,
    pub target_velocity: DVec3,
    pub preferred_range: f64,
    /// Seconds spent in the current behavior state; drives oscillations.
    pub phase_secs: f64,
}

impl ManeuverInput {
    /// Unit vector from the target toward the ship, or the ship's backward
    /// axis when the two coincide.
    fn from_target(&self) -> DVec3 {
        (self.position - self.target_position)
            .try_normalize()
            .unwrap_or(-self.basis.forward)
    }
}

/// A maneuver returns a world-space point (attack/quick strike) or a
/// world-space offset (evasion) for the navigator.
pub type ManeuverFn = fn(&ManeuverInput) -> DVec3;

/// Behavioral profile for a ship class.
#[derive(Clone, Copy)]
pub struct ClassProfile {
    /// Cruise speed (units/s).
    pub max_speed: f64,
    pub max_health: f64,
    /// Distance the ship tries to hold from its target.
    pub preferred_range: f64,
    /// Targets beyond this range are not visible.
    pub detection_range: f64,
    /// Base bonus in leader election.
    pub leader_bonus: f64,
    /// Destination while inside the preferred engagement band.
    pub attack_maneuver: ManeuverFn,
    /// Offset added to the flee destination.
    pub evasive_maneuver: ManeuverFn,
    /// Destination for a hit-and-run pass.
    pub quick_strike: ManeuverFn,
}

/// Get the profile for a given class.
pub fn get_profile(class: ShipClass) -> ClassProfile {
    use armada_core::constants::*;

    match class {
        ShipClass::Scout => ClassProfile {
            max_speed: SCOUT_SPEED,
            max_health: SCOUT_HEALTH,
            preferred_range: SCOUT_PREFERRED_RANGE,
            detection_range: SCOUT_DETECTION_RANGE,
            leader_bonus: 8.0,
            attack_maneuver: orbit,
            evasive_maneuver: juke,
            quick_strike: strafing_pass,
        },
        ShipClass::Fighter => ClassProfile {
            max_speed: FIGHTER_SPEED,
            max_health: FIGHTER_HEALTH,
            preferred_range: FIGHTER_PREFERRED_RANGE,
            detection_range: FIGHTER_DETECTION_RANGE,
            leader_bonus: 20.0,
            attack_maneuver: flank,
            evasive_maneuver: barrel_roll,
            quick_strike: strafing_pass,
        },
        ShipClass::Bomber => ClassProfile {
            max_speed: BOMBER_SPEED,
            max_health: BOMBER_HEALTH,
            preferred_range: BOMBER_PREFERRED_RANGE,
            detection_range: BOMBER_DETECTION_RANGE,
            leader_bonus: 12.0,
            attack_maneuver: seek_cover,
            evasive_maneuver: climb,
            quick_strike: seek_cover,
        },
        ShipClass::Interceptor => ClassProfile {
            max_speed: INTERCEPTOR_SPEED,
            max_health: INTERCEPTOR_HEALTH,
            preferred_range: INTERCEPTOR_PREFERRED_RANGE,
            detection_range: INTERCEPTOR_DETECTION_RANGE,
            leader_bonus: 15.0,
            attack_maneuver: press,
            evasive_maneuver: afterburner,
            quick_strike: boom_and_zoom,
        },
    }
}

// --- Attack maneuvers (return a destination) ---

/// Circle the target at preferred range.
fn orbit(input: &ManeuverInput) -> DVec3 {
    let radial = input.from_target();
    let tangent = radial.cross(DVec3::Y).try_normalize().unwrap_or(input.basis.right);
    let heading = (radial + tangent * 0.6).normalize();
    input.target_position + heading * input.preferred_range
}

/// Swing out to the target's side, left or right depending on which side
/// the ship is already on.
fn flank(input: &ManeuverInput) -> DVec3 {
    let reference = input
        .target_velocity
        .try_normalize()
        .unwrap_or(-input.from_target());
    let side = reference.cross(DVec3::Y).try_normalize().unwrap_or(input.basis.right);
    let sign = if side.dot(input.position - input.target_position) >= 0.0 {
        1.0
    } else {
        -1.0
    };
    input.target_position + side * sign * input.preferred_range
}

/// Hold at preferred range, elevated above the target.
fn seek_cover(input: &ManeuverInput) -> DVec3 {
    input.target_position
        + input.from_target() * input.preferred_range
        + DVec3::Y * (input.preferred_range * 0.25)
}

/// Close to half the preferred range.
fn press(input: &ManeuverInput) -> DVec3 {
    input.target_position + input.from_target() * (input.preferred_range * 0.5)
}

// --- Quick strikes (return a destination) ---

/// Fly through the target's position and out the far side.
fn strafing_pass(input: &ManeuverInput) -> DVec3 {
    input.target_position - input.from_target() * input.preferred_range
}

/// Dive past the target and climb out.
fn boom_and_zoom(input: &ManeuverInput) -> DVec3 {
    input.target_position - input.from_target() * input.preferred_range
        + DVec3::Y * input.preferred_range
}

// --- Evasive maneuvers (return an offset) ---

/// Lateral sine-wave jink.
fn juke(input: &ManeuverInput) -> DVec3 {
    input.basis.right * (input.phase_secs * 4.0).sin() * 60.0
}

/// Corkscrew around the direction of travel.
fn barrel_roll(input: &ManeuverInput) -> DVec3 {
    let angle = input.phase_secs * 3.0;
    (input.basis.right * angle.cos() + input.basis.up * angle.sin()) * 40.0
}

/// Gain altitude.
fn climb(_input: &ManeuverInput) -> DVec3 {
    DVec3::Y * 50.0
}

/// Straight-line sprint along the current heading.
fn afterburner(input: &ManeuverInput) -> DVec3 {
    input.basis.forward * 80.0
}
