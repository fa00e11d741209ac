//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Capability class of a ship. Fixed at spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShipClass {
    /// Fast, fragile, long sensor range.
    Scout,
    /// Balanced dogfighter, flanks its target.
    Fighter,
    /// Slow, heavy, fights from range and seeks cover.
    Bomber,
    /// Fastest closer, short engagement range.
    Interceptor,
}

impl ShipClass {
    pub const ALL: [ShipClass; 4] = [
        ShipClass::Scout,
        ShipClass::Fighter,
        ShipClass::Bomber,
        ShipClass::Interceptor,
    ];

    /// Scouts and interceptors are the fast classes used for flanking and
    /// hit-and-run tactics.
    pub fn is_fast(self) -> bool {
        matches!(self, ShipClass::Scout | ShipClass::Interceptor)
    }
}

/// Reactive behavior state of a single ship.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorState {
    /// Cycling patrol waypoints around the spawn point.
    #[default]
    Patrol,
    /// Engaging a visible target.
    Attack,
    /// Searching around the target's last known position.
    Pursue,
    /// Retreating toward allies.
    Flee,
    /// Protecting a damaged ally.
    Support,
}

/// Geometric arrangement of a formation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormationShape {
    #[default]
    V,
    Diamond,
    Sphere,
    Helix,
    Line,
    Box,
    Wedge,
    Circle,
}

impl FormationShape {
    pub const ALL: [FormationShape; 8] = [
        FormationShape::V,
        FormationShape::Diamond,
        FormationShape::Sphere,
        FormationShape::Helix,
        FormationShape::Line,
        FormationShape::Box,
        FormationShape::Wedge,
        FormationShape::Circle,
    ];
}

/// Group-level macro tactic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TacticKind {
    DirectAssault,
    Flanking,
    Pincer,
    DefensiveFormation,
    HitAndRun,
    SuppressionBombardment,
}

impl TacticKind {
    pub const ALL: [TacticKind; 6] = [
        TacticKind::DirectAssault,
        TacticKind::Flanking,
        TacticKind::Pincer,
        TacticKind::DefensiveFormation,
        TacticKind::HitAndRun,
        TacticKind::SuppressionBombardment,
    ];
}

/// Kind of an allied notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    TargetSighted,
    EngagingTarget,
    RequestSupport,
    RequestEscort,
}
