//! Navigation system: turns intents into velocities and integrates motion.
//!
//! Formation followers cruising in Patrol track their slot; everyone else
//! (leaders, and followers that broke off to fight) follows its navigator.

use armada_ai::navigator::{NavContext, Navigator, Obstacle};
use armada_ai::profiles::get_profile;
use armada_core::components::Kinematics;
use armada_core::config::ArenaConfig;
use armada_core::enums::BehaviorState;

use crate::population::Population;
use crate::systems::roster::AgentRecord;

pub fn run(population: &mut Population, roster: &[AgentRecord], dt: f64, config: &ArenaConfig) {
    let nav = &config.navigator;
    let reach = nav.avoidance_radius + nav.ship_radius;

    for record in roster {
        let Some(entity) = population.entity(record.id) else {
            continue;
        };
        let Ok((kin, navigator)) = population
            .world
            .query_one_mut::<(&mut Kinematics, &mut Navigator)>(entity)
        else {
            continue;
        };
        let max_speed = get_profile(record.class).max_speed;

        let follower = record
            .link
            .filter(|link| link.slot > 0 && record.state == BehaviorState::Patrol)
            .and_then(|link| population.formations.get_mut(&link.formation))
            .and_then(|formation| formation.member_mut(record.id));

        let velocity = match follower {
            Some(member) => member
                .follow(kin.position, kin.velocity, max_speed, dt, &config.formation)
                .clamp_length_max(max_speed * config.formation.catch_up_max_multiplier),
            None => {
                let obstacles: Vec<Obstacle> = roster
                    .iter()
                    .filter(|other| other.id != record.id)
                    .filter(|other| other.position.distance(kin.position) <= reach)
                    .map(|other| Obstacle {
                        position: other.position,
                        radius: nav.ship_radius,
                    })
                    .collect();
                let ctx = NavContext {
                    position: kin.position,
                    velocity: kin.velocity,
                    basis: kin.basis,
                    max_speed,
                    obstacles: &obstacles,
                    bounds: &config.bounds,
                };
                navigator.update(&ctx, dt, nav).velocity
            }
        };

        if velocity.is_finite() {
            kin.velocity = velocity;
        }
        kin.position += kin.velocity * dt;
        kin.align_to_velocity();
    }
}
