//! Tactical system: evaluates each group at its cadence and applies the
//! resulting orders.
//!
//! Groups are the formations plus one group of all unassigned agents. The
//! target of a group is the contact nearest to its centroid. Orders are
//! collected across all groups and applied after the pass.

use std::collections::BTreeMap;

use glam::DVec3;

use armada_ai::fsm::{BehaviorMachine, Directive};
use armada_ai::tactics::{GroupKey, GroupMember, TacticalCoordinator, TacticalOrder};
use armada_core::components::{Pilot, Targeting};
use armada_core::config::ArenaConfig;
use armada_core::enums::BehaviorState;
use armada_core::state::TacticView;
use armada_core::types::{AgentId, Contact, TargetId};

use crate::population::Population;
use crate::systems::roster::AgentRecord;

pub fn run(
    population: &mut Population,
    coordinator: &mut TacticalCoordinator,
    roster: &[AgentRecord],
    contacts: &[Contact],
    now: f64,
    dt: f64,
    config: &ArenaConfig,
) -> Vec<TacticView> {
    let groups = group_members(roster);
    coordinator.retain_groups(|key| groups.contains_key(&key));

    let mut executed = Vec::new();
    let mut orders: Vec<(GroupKey, TacticalOrder)> = Vec::new();

    for (key, members) in &groups {
        if !coordinator.is_due(*key, dt, &config.tactical) {
            continue;
        }
        let Some(target) = group_target(members, contacts) else {
            continue;
        };

        // The previous decision counts as a success if the group lost nobody since.
        let kept = coordinator
            .pending(*key)
            .map(|record| members.len() >= record.situation.member_count);
        if let Some(kept) = kept {
            coordinator.record_outcome(*key, kept);
        }

        let Some(decision) = coordinator.evaluate(*key, members, target, now, &config.tactical)
        else {
            continue;
        };
        executed.push(TacticView {
            formation: key.formation(),
            tactic: decision.kind,
            effectiveness: decision.effectiveness,
        });
        orders.extend(decision.orders.into_iter().map(|order| (*key, order)));
    }

    for (key, order) in orders {
        apply_order(population, key, order, config);
    }
    executed
}

/// Members per group, each list ordered by agent id.
pub fn group_members(roster: &[AgentRecord]) -> BTreeMap<GroupKey, Vec<GroupMember>> {
    let mut groups: BTreeMap<GroupKey, Vec<GroupMember>> = BTreeMap::new();
    for record in roster {
        let key = match record.link {
            Some(link) => GroupKey::Formation(link.formation),
            None => GroupKey::Unassigned,
        };
        groups.entry(key).or_default().push(GroupMember {
            id: record.id,
            class: record.class,
            position: record.position,
            velocity: record.velocity,
            health_ratio: record.health_ratio,
            personality: record.personality,
        });
    }
    groups
}

/// The contact closest to the group's centroid.
pub fn group_target<'a>(members: &[GroupMember], contacts: &'a [Contact]) -> Option<&'a Contact> {
    if members.is_empty() {
        return None;
    }
    let centroid = members.iter().map(|m| m.position).sum::<DVec3>() / members.len() as f64;
    contacts.iter().min_by(|a, b| {
        a.position
            .distance_squared(centroid)
            .total_cmp(&b.position.distance_squared(centroid))
            .then(a.id.cmp(&b.id))
    })
}

fn apply_order(population: &mut Population, key: GroupKey, order: TacticalOrder, config: &ArenaConfig) {
    match order {
        TacticalOrder::Engage { agent, target } => {
            command(population, agent, Some(target), BehaviorState::Attack, None);
        }
        TacticalOrder::Approach {
            agent,
            target,
            point,
        } => {
            let directive = Some(Directive::Approach(point));
            command(population, agent, Some(target), BehaviorState::Attack, directive);
        }
        TacticalOrder::QuickStrike { agent, target } => {
            let directive = Some(Directive::QuickStrike);
            command(population, agent, Some(target), BehaviorState::Attack, directive);
        }
        TacticalOrder::HoldCover {
            agent,
            target,
            point,
        } => {
            let directive = Some(Directive::HoldCover(point));
            command(population, agent, Some(target), BehaviorState::Attack, directive);
        }
        TacticalOrder::Protect { agent, ally } => {
            let directive = Some(Directive::Protect(ally));
            command(population, agent, None, BehaviorState::Support, directive);
        }
        TacticalOrder::Regroup { agents, shape } => match key.formation() {
            Some(formation) => {
                if let Err(error) = population.change_formation(formation, shape) {
                    tracing::warn!(%error, "regroup order dropped");
                }
            }
            None => {
                population.create_formation(shape, &agents, &config.formation);
            }
        },
        TacticalOrder::NudgeCaution { agent, amount } => {
            let Some(entity) = population.entity(agent) else {
                return;
            };
            if let Ok(mut pilot) = population.world.get::<&mut Pilot>(entity) {
                let caution = (pilot.personality.caution + amount).min(1.0);
                pilot.personality.caution = caution;
            }
        }
    }
}

/// Point an agent at `target` (when given) and request a behavior state.
fn command(
    population: &mut Population,
    agent: AgentId,
    target: Option<TargetId>,
    state: BehaviorState,
    directive: Option<Directive>,
) {
    let Some(entity) = population.entity(agent) else {
        return;
    };
    let Ok((targeting, machine)) = population
        .world
        .query_one_mut::<(&mut Targeting, &mut BehaviorMachine)>(entity)
    else {
        return;
    };
    if !machine.request(state, directive) {
        tracing::trace!(agent = agent.0, ?state, "order ignored while fleeing");
        return;
    }
    if let Some(target) = target {
        if targeting.target != Some(target) {
            targeting.target = Some(target);
            targeting.time_since_seen = 0.0;
        }
    }
}
