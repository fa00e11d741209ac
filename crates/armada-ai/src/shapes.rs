//! Local-space slot layouts for every formation shape.
//!
//! Local frame: x = right, y = up, z = forward, unit = one slot spacing
//! before the formation's scale is applied. Slot 0 belongs to the leader and
//! sits at the origin for every shape except Diamond (front point) and Box
//! (front row, centered).

use std::f64::consts::{PI, TAU};

use glam::DVec3;

use armada_core::config::FormationConfig;
use armada_core::enums::FormationShape;

/// Golden angle in radians, the azimuth step of the Fibonacci sphere.
pub const GOLDEN_ANGLE: f64 = PI * 0.763_932_022_500_210_3; // π(3 − √5)

/// Local offset of slot `index` in a formation of `count` members.
pub fn local_offset(shape: FormationShape, index: usize, count: usize, cfg: &FormationConfig) -> DVec3 {
    debug_assert!(index < count.max(1), "slot {index} outside formation of {count}");
    let spacing = cfg.spacing;
    match shape {
        FormationShape::V => v_slot(index, spacing, cfg.v_spread_angle_deg.to_radians()),
        FormationShape::Diamond => diamond_slot(index, spacing),
        FormationShape::Sphere => sphere_slot(index, count, spacing),
        FormationShape::Helix => helix_slot(index, spacing, cfg),
        FormationShape::Line => line_slot(index, spacing),
        FormationShape::Box => box_slot(index, count, spacing),
        FormationShape::Wedge => wedge_slot(index, spacing),
        FormationShape::Circle => circle_slot(index, count, spacing),
    }
}

/// All local offsets for a formation of `count` members, in slot order.
pub fn local_offsets(shape: FormationShape, count: usize, cfg: &FormationConfig) -> Vec<DVec3> {
    (0..count).map(|i| local_offset(shape, i, count, cfg)).collect()
}

/// Rank behind the leader and lateral side (-1 left, +1 right) for the
/// alternating layouts: 1 → (1, left), 2 → (1, right), 3 → (2, left), …
fn rank_and_side(index: usize) -> (f64, f64) {
    let rank = index.div_ceil(2) as f64;
    let side = if index % 2 == 1 { -1.0 } else { 1.0 };
    (rank, side)
}

fn v_slot(index: usize, spacing: f64, spread: f64) -> DVec3 {
    if index == 0 {
        return DVec3::ZERO;
    }
    let (rank, side) = rank_and_side(index);
    DVec3::new(
        side * rank * spacing * spread.sin(),
        0.0,
        -rank * spacing * spread.cos(),
    )
}

fn diamond_slot(index: usize, spacing: f64) -> DVec3 {
    let ring = (index / 4 + 1) as f64;
    let direction = match index % 4 {
        0 => DVec3::Z,
        1 => DVec3::NEG_X,
        2 => DVec3::X,
        _ => DVec3::NEG_Z,
    };
    direction * spacing * ring
}

fn sphere_slot(index: usize, count: usize, spacing: f64) -> DVec3 {
    if index == 0 {
        return DVec3::ZERO;
    }
    let points = (count - 1) as f64;
    let k = (index - 1) as f64;
    let radius = spacing * (points / 4.0).sqrt().max(1.0);
    let y = 1.0 - 2.0 * (k + 0.5) / points;
    let ring = (1.0 - y * y).max(0.0).sqrt();
    let theta = GOLDEN_ANGLE * k;
    DVec3::new(theta.cos() * ring, y, theta.sin() * ring) * radius
}

fn helix_slot(index: usize, spacing: f64, cfg: &FormationConfig) -> DVec3 {
    let i = index as f64;
    let angle = i * cfg.helix_step_angle;
    DVec3::new(
        spacing * angle.sin(),
        spacing * (1.0 - angle.cos()) + i * spacing * cfg.helix_pitch_factor,
        -i * spacing * 0.5,
    )
}

fn line_slot(index: usize, spacing: f64) -> DVec3 {
    if index == 0 {
        return DVec3::ZERO;
    }
    let (rank, side) = rank_and_side(index);
    DVec3::new(side * rank * spacing, 0.0, 0.0)
}

fn box_slot(index: usize, count: usize, spacing: f64) -> DVec3 {
    let columns = (count as f64).sqrt().ceil().max(1.0) as usize;
    let row = index / columns;
    let column = index % columns;
    let centered = column as f64 - (columns - 1) as f64 / 2.0;
    DVec3::new(centered * spacing, 0.0, -(row as f64) * spacing)
}

fn wedge_slot(index: usize, spacing: f64) -> DVec3 {
    // Row r holds 2r + 1 slots and starts at index r².
    let mut row = 0;
    while (row + 1) * (row + 1) <= index {
        row += 1;
    }
    let within = index - row * row;
    DVec3::new(
        (within as f64 - row as f64) * spacing,
        0.0,
        -(row as f64) * spacing,
    )
}

fn circle_slot(index: usize, count: usize, spacing: f64) -> DVec3 {
    if index == 0 {
        return DVec3::ZERO;
    }
    let points = (count - 1) as f64;
    let radius = (points * spacing / TAU).max(spacing);
    let angle = TAU * (index - 1) as f64 / points;
    DVec3::new(radius * angle.sin(), 0.0, radius * angle.cos())
}
