//! Group-level tactical coordination.
//!
//! Each group (a formation, or every unassigned ship together) is evaluated
//! on a fixed interval: the situation is summarized, six candidate tactics
//! are scored with fixed formulas, options whose requirements fail are
//! dropped, and the best survivor is turned into per-ship orders.
//!
//! Executed tactics go into a bounded history. The history can be queried
//! for success rates but never influences scoring.

use std::collections::{BTreeMap, VecDeque};

use glam::DVec3;

use armada_core::config::TacticalConfig;
use armada_core::enums::{FormationShape, ShipClass, TacticKind};
use armada_core::types::{AgentId, Contact, FormationId, Personality, TargetId};

/// Identity of a tactical group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    Formation(FormationId),
    /// All ships that currently have no formation.
    Unassigned,
}

impl GroupKey {
    pub fn formation(self) -> Option<FormationId> {
        match self {
            GroupKey::Formation(id) => Some(id),
            GroupKey::Unassigned => None,
        }
    }
}

/// One member of a group as seen by the coordinator.
#[derive(Debug, Clone, Copy)]
pub struct GroupMember {
    pub id: AgentId,
    pub class: ShipClass,
    pub position: DVec3,
    pub velocity: DVec3,
    pub health_ratio: f64,
    pub personality: Personality,
}

/// Member counts per class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounts {
    pub scout: usize,
    pub fighter: usize,
    pub bomber: usize,
    pub interceptor: usize,
}

impl ClassCounts {
    pub fn get(&self, class: ShipClass) -> usize {
        match class {
            ShipClass::Scout => self.scout,
            ShipClass::Fighter => self.fighter,
            ShipClass::Bomber => self.bomber,
            ShipClass::Interceptor => self.interceptor,
        }
    }

    fn add(&mut self, class: ShipClass) {
        match class {
            ShipClass::Scout => self.scout += 1,
            ShipClass::Fighter => self.fighter += 1,
            ShipClass::Bomber => self.bomber += 1,
            ShipClass::Interceptor => self.interceptor += 1,
        }
    }

    pub fn fast(&self) -> usize {
        self.scout + self.interceptor
    }
}

/// Snapshot of a group at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TacticalSituation {
    pub member_count: usize,
    pub avg_health: f64,
    pub avg_distance: f64,
    /// 1.0 for a perfectly tight group, falling toward 0 as members spread.
    pub cohesion: f64,
    /// 0.0 (safe) to 1.0 (badly hurt and close to the target).
    pub threat: f64,
    pub class_counts: ClassCounts,
    pub centroid: DVec3,
}

/// Summarize a non-empty group against its target.
pub fn evaluate_situation(
    members: &[GroupMember],
    target: &Contact,
    cfg: &TacticalConfig,
) -> TacticalSituation {
    let n = members.len().max(1) as f64;
    let mut class_counts = ClassCounts::default();
    let mut centroid = DVec3::ZERO;
    let mut health = 0.0;
    let mut distance = 0.0;
    for member in members {
        class_counts.add(member.class);
        centroid += member.position;
        health += member.health_ratio;
        distance += member.position.distance(target.position);
    }
    centroid /= n;
    let avg_health = health / n;
    let avg_distance = distance / n;

    let displacement = members
        .iter()
        .map(|m| m.position.distance(centroid))
        .sum::<f64>()
        / n;
    let cohesion = 1.0 / (1.0 + displacement / cfg.cohesion_reference_spread);

    let proximity = 1.0 - (avg_distance / cfg.threat_reference_range).min(1.0);
    let threat = 0.5 * (1.0 - avg_health) + 0.5 * proximity;

    TacticalSituation {
        member_count: members.len(),
        avg_health,
        avg_distance,
        cohesion,
        threat,
        class_counts,
        centroid,
    }
}

/// Preconditions of a tactic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Requirements {
    pub min_members: usize,
    pub min_health: f64,
    /// Satisfied when empty or when at least one listed class is present.
    pub any_of_classes: &'static [ShipClass],
}

impl Requirements {
    pub fn satisfied_by(&self, situation: &TacticalSituation) -> bool {
        situation.member_count >= self.min_members
            && situation.avg_health >= self.min_health
            && (self.any_of_classes.is_empty()
                || self
                    .any_of_classes
                    .iter()
                    .any(|c| situation.class_counts.get(*c) > 0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TacticalOption {
    pub kind: TacticKind,
    pub effectiveness: f64,
    pub requirements: Requirements,
}

const FAST_CLASSES: &[ShipClass] = &[ShipClass::Scout, ShipClass::Interceptor];
const BOMBERS: &[ShipClass] = &[ShipClass::Bomber];

/// Score all six tactics for a situation, unfiltered, in [`TacticKind::ALL`] order.
pub fn generate_options(situation: &TacticalSituation, cfg: &TacticalConfig) -> Vec<TacticalOption> {
    let n = situation.member_count.max(1) as f64;
    let h = situation.avg_health;
    let c = situation.cohesion;
    let t = situation.threat;
    let fast = situation.class_counts.fast() as f64 / n;
    let bombers = situation.class_counts.bomber as f64 / n;
    let far = (situation.avg_distance / cfg.threat_reference_range).min(1.0);
    let members = situation.member_count as f64;

    TacticKind::ALL
        .iter()
        .map(|&kind| {
            let (effectiveness, requirements) = match kind {
                TacticKind::DirectAssault => (
                    0.35 + 0.35 * h + 0.05 * members.min(6.0) - 0.25 * t,
                    Requirements {
                        min_members: 1,
                        min_health: 0.3,
                        any_of_classes: &[],
                    },
                ),
                TacticKind::Flanking => (
                    0.25 + 0.35 * fast + 0.2 * c + 0.1 * h,
                    Requirements {
                        min_members: 3,
                        min_health: 0.4,
                        any_of_classes: FAST_CLASSES,
                    },
                ),
                TacticKind::Pincer => (
                    0.3 + 0.04 * members.min(8.0) + 0.2 * c + 0.15 * h,
                    Requirements {
                        min_members: 4,
                        min_health: 0.5,
                        any_of_classes: &[],
                    },
                ),
                TacticKind::DefensiveFormation => (
                    0.15 + 0.55 * t + 0.15 * (1.0 - h),
                    Requirements {
                        min_members: 2,
                        min_health: 0.0,
                        any_of_classes: &[],
                    },
                ),
                TacticKind::HitAndRun => (
                    0.2 + 0.4 * fast + 0.2 * (1.0 - t),
                    Requirements {
                        min_members: 2,
                        min_health: 0.3,
                        any_of_classes: FAST_CLASSES,
                    },
                ),
                TacticKind::SuppressionBombardment => (
                    0.2 + 0.5 * bombers + 0.2 * far,
                    Requirements {
                        min_members: 2,
                        min_health: 0.4,
                        any_of_classes: BOMBERS,
                    },
                ),
            };
            TacticalOption {
                kind,
                effectiveness,
                requirements,
            }
        })
        .collect()
}

/// Drop options whose requirements fail and sort the rest by descending
/// effectiveness. Equal scores keep generation order.
pub fn rank_options(options: Vec<TacticalOption>, situation: &TacticalSituation) -> Vec<TacticalOption> {
    let mut ranked: Vec<_> = options
        .into_iter()
        .filter(|o| o.requirements.satisfied_by(situation))
        .collect();
    ranked.sort_by(|a, b| b.effectiveness.total_cmp(&a.effectiveness));
    ranked
}

/// Instruction for one ship (or a set of ships) produced by a tactic.
#[derive(Debug, Clone, PartialEq)]
pub enum TacticalOrder {
    /// Target `target` and attack.
    Engage { agent: AgentId, target: TargetId },
    /// Target `target`, fly to `point` first, then attack.
    Approach {
        agent: AgentId,
        target: TargetId,
        point: DVec3,
    },
    /// Target `target` and run the class quick-strike pass.
    QuickStrike { agent: AgentId, target: TargetId },
    /// Target `target` and fire from a cover point.
    HoldCover {
        agent: AgentId,
        target: TargetId,
        point: DVec3,
    },
    /// Switch to Support guarding `ally`.
    Protect { agent: AgentId, ally: AgentId },
    /// Gather `agents` into a formation of `shape`.
    Regroup {
        agents: Vec<AgentId>,
        shape: FormationShape,
    },
    /// Raise caution by `amount` (the result stays within [0, 1]).
    NudgeCaution { agent: AgentId, amount: f64 },
}

/// Turn a tactic into orders for the group's members.
pub fn plan_orders(
    kind: TacticKind,
    members: &[GroupMember],
    target: &Contact,
    situation: &TacticalSituation,
    cfg: &TacticalConfig,
) -> Vec<TacticalOrder> {
    let heading = target
        .velocity
        .try_normalize()
        .or_else(|| (target.position - situation.centroid).try_normalize())
        .unwrap_or(DVec3::Z);
    let lateral = heading.cross(DVec3::Y).try_normalize().unwrap_or(DVec3::X);

    match kind {
        TacticKind::DirectAssault => members
            .iter()
            .map(|m| TacticalOrder::Engage {
                agent: m.id,
                target: target.id,
            })
            .collect(),

        TacticKind::Flanking => {
            let mut side = 1.0;
            members
                .iter()
                .map(|m| {
                    if m.class.is_fast() {
                        let point = target.position + lateral * side * cfg.flank_distance;
                        side = -side;
                        TacticalOrder::Approach {
                            agent: m.id,
                            target: target.id,
                            point,
                        }
                    } else {
                        TacticalOrder::Engage {
                            agent: m.id,
                            target: target.id,
                        }
                    }
                })
                .collect()
        }

        TacticKind::Pincer => {
            let predicted = target.predicted_position(cfg.pincer_lead_secs);
            let half = members.len().div_ceil(2);
            members
                .iter()
                .enumerate()
                .map(|(i, m)| {
                    let side = if i < half { 1.0 } else { -1.0 };
                    TacticalOrder::Approach {
                        agent: m.id,
                        target: target.id,
                        point: predicted + lateral * side * cfg.pincer_offset,
                    }
                })
                .collect()
        }

        TacticKind::DefensiveFormation => {
            let mut orders = vec![TacticalOrder::Regroup {
                agents: members.iter().map(|m| m.id).collect(),
                shape: FormationShape::Sphere,
            }];
            orders.extend(members.iter().map(|m| TacticalOrder::NudgeCaution {
                agent: m.id,
                amount: cfg.caution_nudge.min(1.0 - m.personality.caution).max(0.0),
            }));
            orders
        }

        TacticKind::HitAndRun => members
            .iter()
            .filter(|m| m.class.is_fast())
            .map(|m| TacticalOrder::QuickStrike {
                agent: m.id,
                target: target.id,
            })
            .collect(),

        TacticKind::SuppressionBombardment => {
            let bombers: Vec<&GroupMember> = members
                .iter()
                .filter(|m| m.class == ShipClass::Bomber)
                .collect();
            members
                .iter()
                .filter_map(|m| {
                    if m.class == ShipClass::Bomber {
                        let away = (m.position - target.position)
                            .try_normalize()
                            .unwrap_or(-heading);
                        Some(TacticalOrder::HoldCover {
                            agent: m.id,
                            target: target.id,
                            point: target.position
                                + away * cfg.bombard_range
                                + DVec3::Y * cfg.cover_height,
                        })
                    } else {
                        nearest(&bombers, m.position).map(|ally| TacticalOrder::Protect {
                            agent: m.id,
                            ally: ally.id,
                        })
                    }
                })
                .collect()
        }
    }
}

fn nearest<'a>(candidates: &[&'a GroupMember], point: DVec3) -> Option<&'a GroupMember> {
    candidates
        .iter()
        .copied()
        .min_by(|a, b| {
            a.position
                .distance_squared(point)
                .total_cmp(&b.position.distance_squared(point))
                .then(a.id.cmp(&b.id))
        })
}

/// A tactic chosen for one group.
#[derive(Debug, Clone)]
pub struct TacticalDecision {
    pub group: GroupKey,
    pub kind: TacticKind,
    pub effectiveness: f64,
    pub situation: TacticalSituation,
    pub orders: Vec<TacticalOrder>,
}

/// One executed tactic in the history log.
#[derive(Debug, Clone, PartialEq)]
pub struct TacticalRecord {
    pub time: f64,
    pub group: GroupKey,
    pub kind: TacticKind,
    pub effectiveness: f64,
    pub situation: TacticalSituation,
    /// Set later through [`TacticalCoordinator::record_outcome`].
    pub succeeded: Option<bool>,
}

/// Evaluation timers per group plus the execution history.
#[derive(Debug, Clone, Default)]
pub struct TacticalCoordinator {
    timers: BTreeMap<GroupKey, f64>,
    history: VecDeque<TacticalRecord>,
}

impl TacticalCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the group's timer by `dt` and report whether an evaluation is
    /// due. A group seen for the first time is due immediately.
    pub fn is_due(&mut self, group: GroupKey, dt: f64, cfg: &TacticalConfig) -> bool {
        let timer = self.timers.entry(group).or_insert(cfg.interval_secs);
        *timer += dt;
        if *timer >= cfg.interval_secs {
            *timer = 0.0;
            true
        } else {
            false
        }
    }

    /// Drop the timer of a group that no longer exists.
    pub fn forget(&mut self, group: GroupKey) {
        self.timers.remove(&group);
    }

    /// Keep only the timers of groups for which `keep` returns true.
    pub fn retain_groups(&mut self, mut keep: impl FnMut(GroupKey) -> bool) {
        self.timers.retain(|k, _| keep(*k));
    }

    /// Evaluate a group against its target, pick the best feasible tactic
    /// and record it. `None` when the group is empty or nothing is feasible.
    pub fn evaluate(
        &mut self,
        group: GroupKey,
        members: &[GroupMember],
        target: &Contact,
        now: f64,
        cfg: &TacticalConfig,
    ) -> Option<TacticalDecision> {
        if members.is_empty() {
            return None;
        }
        let situation = evaluate_situation(members, target, cfg);
        let options = generate_options(&situation, cfg);
        for option in &options {
            tracing::debug!(
                ?group,
                tactic = ?option.kind,
                score = option.effectiveness,
                feasible = option.requirements.satisfied_by(&situation),
                "tactic scored"
            );
        }

        let best = *rank_options(options, &situation).first()?;
        tracing::debug!(?group, tactic = ?best.kind, score = best.effectiveness, "tactic selected");

        self.history.push_back(TacticalRecord {
            time: now,
            group,
            kind: best.kind,
            effectiveness: best.effectiveness,
            situation,
            succeeded: None,
        });
        while self.history.len() > cfg.history_capacity {
            self.history.pop_front();
        }

        Some(TacticalDecision {
            group,
            kind: best.kind,
            effectiveness: best.effectiveness,
            situation,
            orders: plan_orders(best.kind, members, target, &situation, cfg),
        })
    }

    /// Mark the latest undecided record of `group`. Returns false if there is none.
    pub fn record_outcome(&mut self, group: GroupKey, succeeded: bool) -> bool {
        match self
            .history
            .iter_mut()
            .rev()
            .find(|r| r.group == group && r.succeeded.is_none())
        {
            Some(record) => {
                record.succeeded = Some(succeeded);
                true
            }
            None => false,
        }
    }

    /// Latest undecided record of `group`.
    pub fn pending(&self, group: GroupKey) -> Option<&TacticalRecord> {
        self.history
            .iter()
            .rev()
            .find(|r| r.group == group && r.succeeded.is_none())
    }

    /// Oldest first.
    pub fn history(&self) -> impl Iterator<Item = &TacticalRecord> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Fraction of decided records of `kind` that succeeded.
    pub fn success_rate(&self, kind: TacticKind) -> Option<f64> {
        let (wins, total) = self
            .history
            .iter()
            .filter(|r| r.kind == kind)
            .filter_map(|r| r.succeeded)
            .fold((0usize, 0usize), |(w, t), s| (w + usize::from(s), t + 1));
        (total > 0).then(|| wins as f64 / total as f64)
    }
}
