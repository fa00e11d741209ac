//! Bounds system: keeps agents inside the spherical play area.

use hecs::World;

use armada_core::components::Kinematics;
use armada_core::config::ArenaConfig;

/// Push agents beyond the radius back inward in proportion to their
/// overshoot. Agents past `radius * boundary_hard_factor` are snapped onto
/// that shell and lose their outward velocity.
pub fn run(world: &mut World, dt: f64, config: &ArenaConfig) {
    let bounds = &config.bounds;
    let hard_limit = bounds.radius * config.boundary_hard_factor;

    for (_entity, kin) in world.query_mut::<&mut Kinematics>() {
        let offset = kin.position - bounds.center;
        let distance = offset.length();
        if distance <= bounds.radius || distance < 1e-9 {
            continue;
        }
        let normal = offset / distance;
        kin.velocity -= normal * (distance - bounds.radius) * config.boundary_push_strength * dt;

        if distance > hard_limit {
            kin.position = bounds.center + normal * hard_limit;
            let outward = kin.velocity.dot(normal);
            if outward > 0.0 {
                kin.velocity -= normal * outward;
            }
        }
    }
}
