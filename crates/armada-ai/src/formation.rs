//! Formation geometry: membership, leader election, slot targets and
//! per-member slot following.
//!
//! A formation never reads the ECS. Callers pass lookups that return a
//! [`MemberState`] or [`LeaderCandidate`] for an agent id.

use glam::DVec3;

use armada_core::config::FormationConfig;
use armada_core::enums::{FormationShape, ShipClass};
use armada_core::types::{AgentId, Basis, FormationId};

use crate::profiles::get_profile;
use crate::shapes::local_offset;

/// Per-tick state of a member, supplied by the caller.
#[derive(Debug, Clone, Copy)]
pub struct MemberState {
    pub position: DVec3,
    pub velocity: DVec3,
    pub basis: Basis,
    /// Whether the member currently has an active combat target.
    pub engaged: bool,
}

/// Inputs to leader election.
#[derive(Debug, Clone, Copy)]
pub struct LeaderCandidate {
    pub health_ratio: f64,
    pub class: ShipClass,
    pub teamwork: f64,
}

/// Election score of a candidate, or `None` below the health floor.
pub fn leader_score(candidate: &LeaderCandidate, cfg: &FormationConfig) -> Option<f64> {
    if candidate.health_ratio < cfg.leader_min_health {
        return None;
    }
    Some(
        candidate.health_ratio * cfg.leader_health_weight
            + get_profile(candidate.class).leader_bonus
            + candidate.teamwork * cfg.leader_teamwork_weight,
    )
}

/// Binding of one agent to one slot.
#[derive(Debug, Clone, PartialEq)]
pub struct FormationMember {
    pub agent: AgentId,
    pub slot: usize,
    /// World-space slot position from the last update.
    pub target_position: DVec3,
    /// Velocity of the formation as a whole (the leader's velocity).
    pub formation_velocity: DVec3,
    /// Distance within which the member counts as in position.
    pub tolerance: f64,
    /// Speed multiplier applied while catching up, in [1, cap].
    pub catch_up: f64,
}

impl FormationMember {
    fn new(agent: AgentId, slot: usize, cfg: &FormationConfig) -> Self {
        Self {
            agent,
            slot,
            target_position: DVec3::ZERO,
            formation_velocity: DVec3::ZERO,
            tolerance: cfg.slot_tolerance,
            catch_up: 1.0,
        }
    }

    /// Steer toward the assigned slot and return the new velocity.
    ///
    /// In position: blend toward the formation velocity. Out of position:
    /// seek the slot at up to `catch_up_max_multiplier` × `max_speed`,
    /// mixed with the formation velocity, smoothed over time.
    pub fn follow(
        &mut self,
        position: DVec3,
        velocity: DVec3,
        max_speed: f64,
        dt: f64,
        cfg: &FormationConfig,
    ) -> DVec3 {
        let to_slot = self.target_position - position;
        let distance = to_slot.length();

        let desired = if distance <= self.tolerance {
            self.catch_up = 1.0;
            self.formation_velocity
        } else {
            let reach = (distance / cfg.catch_up_full_distance).min(1.0);
            self.catch_up = 1.0 + (cfg.catch_up_max_multiplier - 1.0) * reach;
            let seek = to_slot / distance * max_speed * self.catch_up;
            seek * cfg.catch_up_seek_weight
                + self.formation_velocity * (1.0 - cfg.catch_up_seek_weight)
        };

        let blend = (cfg.smoothing_rate * dt).clamp(0.0, 1.0);
        velocity.lerp(desired, blend)
    }
}

/// A group of ships holding a shape around a leader in slot 0.
#[derive(Debug, Clone)]
pub struct Formation {
    id: FormationId,
    shape: FormationShape,
    center: DVec3,
    basis: Basis,
    velocity: DVec3,
    scale: f64,
    members: Vec<FormationMember>,
    peak_members: usize,
}

impl Formation {
    pub fn new(id: FormationId, shape: FormationShape) -> Self {
        Self {
            id,
            shape,
            center: DVec3::ZERO,
            basis: Basis::default(),
            velocity: DVec3::ZERO,
            scale: 1.0,
            members: Vec::new(),
            peak_members: 0,
        }
    }

    pub fn id(&self) -> FormationId {
        self.id
    }

    pub fn shape(&self) -> FormationShape {
        self.shape
    }

    pub fn center(&self) -> DVec3 {
        self.center
    }

    /// Facing direction (the leader's forward axis).
    pub fn direction(&self) -> DVec3 {
        self.basis.forward
    }

    pub fn velocity(&self) -> DVec3 {
        self.velocity
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    pub fn peak_members(&self) -> usize {
        self.peak_members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self, cfg: &FormationConfig) -> bool {
        self.members.len() >= cfg.max_size
    }

    pub fn leader(&self) -> Option<AgentId> {
        self.members.first().map(|m| m.agent)
    }

    /// Members in slot order.
    pub fn members(&self) -> &[FormationMember] {
        &self.members
    }

    pub fn member_ids(&self) -> Vec<AgentId> {
        self.members.iter().map(|m| m.agent).collect()
    }

    pub fn member(&self, agent: AgentId) -> Option<&FormationMember> {
        self.members.iter().find(|m| m.agent == agent)
    }

    pub fn member_mut(&mut self, agent: AgentId) -> Option<&mut FormationMember> {
        self.members.iter_mut().find(|m| m.agent == agent)
    }

    pub fn contains(&self, agent: AgentId) -> bool {
        self.member(agent).is_some()
    }

    pub fn slot_of(&self, agent: AgentId) -> Option<usize> {
        self.members.iter().position(|m| m.agent == agent)
    }

    /// Append a member in the next free slot. The first member becomes the
    /// leader. Returns the slot, or `None` when full or already a member.
    pub fn add_member(&mut self, agent: AgentId, cfg: &FormationConfig) -> Option<usize> {
        if self.contains(agent) || self.is_full(cfg) {
            return None;
        }
        let slot = self.members.len();
        self.members.push(FormationMember::new(agent, slot, cfg));
        self.peak_members = self.peak_members.max(self.members.len());
        Some(slot)
    }

    /// Remove a member and re-pack the slots. Losing the leader triggers an
    /// election among the remaining members. Returns whether `agent` was a member.
    pub fn remove_member(
        &mut self,
        agent: AgentId,
        candidates: impl Fn(AgentId) -> Option<LeaderCandidate>,
        cfg: &FormationConfig,
    ) -> bool {
        let Some(index) = self.slot_of(agent) else {
            return false;
        };
        self.members.remove(index);
        if index == 0 && !self.members.is_empty() {
            self.elect_leader(candidates, cfg);
        }
        self.reindex();
        true
    }

    /// Move the best-scoring candidate into slot 0. Ties keep the lower
    /// slot; if nobody clears the health floor the current first member leads.
    pub fn elect_leader(
        &mut self,
        candidates: impl Fn(AgentId) -> Option<LeaderCandidate>,
        cfg: &FormationConfig,
    ) -> Option<AgentId> {
        let mut best: Option<(usize, f64)> = None;
        for (index, member) in self.members.iter().enumerate() {
            let Some(score) = candidates(member.agent).and_then(|c| leader_score(&c, cfg)) else {
                continue;
            };
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((index, score));
            }
        }

        if let Some((index, score)) = best {
            if index != 0 {
                let leader = self.members.remove(index);
                self.members.insert(0, leader);
            }
            tracing::debug!(
                formation = self.id.0,
                leader = self.members[0].agent.0,
                score,
                "leader elected"
            );
        }
        self.reindex();
        self.leader()
    }

    pub fn change_formation(&mut self, shape: FormationShape) {
        if self.shape != shape {
            tracing::debug!(formation = self.id.0, from = ?self.shape, to = ?shape, "formation shape changed");
            self.shape = shape;
        }
    }

    /// Expand while engaged, contract while idle, and switch to Sphere under
    /// heavy attrition. Returns `true` when the shape was force-switched.
    pub fn adjust(&mut self, engaged: bool, dt: f64, cfg: &FormationConfig) -> bool {
        self.scale = if engaged {
            (self.scale + cfg.scale_expand_rate * dt).min(cfg.scale_max)
        } else {
            (self.scale - cfg.scale_contract_rate * dt).max(cfg.scale_min)
        };

        let depleted = self.peak_members >= cfg.attrition_min_peak
            && (self.members.len() as f64) < self.peak_members as f64 * cfg.attrition_ratio;
        if depleted && self.shape != FormationShape::Sphere {
            tracing::debug!(
                formation = self.id.0,
                members = self.members.len(),
                peak = self.peak_members,
                "heavy attrition, switching to sphere"
            );
            self.shape = FormationShape::Sphere;
            return true;
        }
        false
    }

    /// Re-derive the frame from the leader and refresh every slot target.
    /// Does nothing while the leader's state is unavailable.
    pub fn update(&mut self, states: impl Fn(AgentId) -> Option<MemberState>, cfg: &FormationConfig) {
        let Some(leader) = self.leader().and_then(&states) else {
            return;
        };
        self.basis = leader.basis;
        self.velocity = leader.velocity;

        let count = self.members.len();
        let leader_offset = self.world_offset(0, count, cfg);
        self.center = leader.position - leader_offset;

        for slot in 0..count {
            let target = self.center + self.world_offset(slot, count, cfg);
            let member = &mut self.members[slot];
            member.target_position = target;
            member.formation_velocity = self.velocity;
        }
    }

    /// World-space slot targets in slot order.
    pub fn slot_positions(&self) -> Vec<DVec3> {
        self.members.iter().map(|m| m.target_position).collect()
    }

    fn world_offset(&self, slot: usize, count: usize, cfg: &FormationConfig) -> DVec3 {
        self.basis
            .to_world(local_offset(self.shape, slot, count, cfg) * self.scale)
    }

    fn reindex(&mut self) {
        for (slot, member) in self.members.iter_mut().enumerate() {
            member.slot = slot;
        }
    }
}
