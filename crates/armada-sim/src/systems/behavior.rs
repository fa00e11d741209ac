//! Behavior system: resolves targets, runs each agent's state machine and
//! routes its intents to the navigator, the weapons and the outbox.

use glam::DVec3;
use rand::Rng;

use armada_ai::fsm::{AgentSense, AllySense, BehaviorContext, BehaviorMachine, TargetSense};
use armada_ai::navigator::Navigator;
use armada_ai::profiles::get_profile;
use armada_core::components::Targeting;
use armada_core::config::ArenaConfig;
use armada_core::events::Outbox;
use armada_core::types::{Contact, TargetId};

use crate::external::WeaponEffector;
use crate::population::Population;
use crate::systems::roster::AgentRecord;

#[allow(clippy::too_many_arguments)]
pub fn run<R: Rng + ?Sized, W: WeaponEffector + ?Sized>(
    population: &mut Population,
    roster: &[AgentRecord],
    contacts: &[Contact],
    weapons: &mut W,
    rng: &mut R,
    outbox: &mut Outbox,
    dt: f64,
    config: &ArenaConfig,
) {
    for record in roster {
        let Some(entity) = population.entity(record.id) else {
            continue;
        };
        let Ok((targeting, machine, navigator)) = population
            .world
            .query_one_mut::<(&mut Targeting, &mut BehaviorMachine, &mut Navigator)>(entity)
        else {
            continue;
        };

        let profile = get_profile(record.class);
        let target = sense_target(record, targeting, contacts, profile.detection_range, dt);

        let allies: Vec<AllySense> = roster
            .iter()
            .filter(|other| other.id != record.id)
            .filter(|other| other.position.distance(record.position) <= config.behavior.ally_sense_radius)
            .map(|other| AllySense {
                id: other.id,
                position: other.position,
                health_ratio: other.health_ratio,
                target: other.target,
                target_position: other.target.and_then(|t| find_contact(contacts, t)).map(|c| c.position),
            })
            .collect();

        let weapon_ready = weapons.can_attack(record.id);
        let ctx = BehaviorContext {
            agent: AgentSense {
                id: record.id,
                class: record.class,
                position: record.position,
                velocity: record.velocity,
                basis: record.basis,
                health_ratio: record.health_ratio,
                personality: record.personality,
            },
            target,
            time_since_seen: targeting.time_since_seen,
            last_known_position: targeting.last_known_position,
            allies: &allies,
            weapon_ready,
            dt,
        };
        let out = machine.update(&ctx, rng, &config.behavior);

        if let Some(destination) = out.destination {
            let moved = navigator
                .destination()
                .is_none_or(|current| current.distance(destination) > config.navigator.arrival_threshold);
            if moved {
                navigator.set_destination(destination);
            }
        }
        if let Some(adopted) = out.adopt_target {
            targeting.target = Some(adopted);
            targeting.time_since_seen = 0.0;
            targeting.last_known_position = find_contact(contacts, adopted).map(|c| c.position);
        }
        if let Some(target) = out.fire_at.filter(|_| weapon_ready) {
            weapons.attack(record.id, target);
        }
        outbox.extend(out.messages);
    }
}

fn find_contact(contacts: &[Contact], id: TargetId) -> Option<&Contact> {
    contacts.iter().find(|c| c.id == id)
}

/// Resolve the agent's target against the contacts and refresh its memory.
///
/// A target that no longer exists is dropped. An agent without a target
/// acquires the nearest contact inside its detection range. Out of range,
/// the target is reported at its last known position.
fn sense_target(
    record: &AgentRecord,
    targeting: &mut Targeting,
    contacts: &[Contact],
    detection_range: f64,
    dt: f64,
) -> Option<TargetSense> {
    if targeting
        .target
        .is_some_and(|id| find_contact(contacts, id).is_none())
    {
        targeting.target = None;
    }
    if targeting.target.is_none() {
        let nearest = contacts
            .iter()
            .map(|c| (c, c.position.distance(record.position)))
            .filter(|(_, d)| *d <= detection_range)
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.id.cmp(&b.0.id)));
        if let Some((contact, _)) = nearest {
            targeting.target = Some(contact.id);
            targeting.time_since_seen = 0.0;
        }
    }

    let contact = find_contact(contacts, targeting.target?)?;
    let distance = contact.position.distance(record.position);
    let visible = distance <= detection_range;
    if visible {
        targeting.time_since_seen = 0.0;
        targeting.last_known_position = Some(contact.position);
    } else {
        targeting.time_since_seen += dt;
    }

    let (position, velocity) = if visible {
        (contact.position, contact.velocity)
    } else {
        (
            targeting.last_known_position.unwrap_or(contact.position),
            DVec3::ZERO,
        )
    };
    Some(TargetSense {
        id: contact.id,
        position,
        velocity,
        distance,
        visible,
    })
}
