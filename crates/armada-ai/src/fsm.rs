//! Per-ship behavior state machine.
//!
//! Each tick the machine runs the current state's action, then checks the
//! transition rules once. Transition rules are a pure function of the
//! machine, the ship, its target and its nearby allies ([`next_state`]).
//! No ECS dependency; the caller supplies a [`BehaviorContext`] and applies
//! the returned [`BehaviorOutput`].

use std::f64::consts::TAU;

use glam::DVec3;
use rand::Rng;

use armada_core::config::BehaviorConfig;
use armada_core::enums::{BehaviorState, MessageKind, ShipClass};
use armada_core::events::{Message, MessagePayload};
use armada_core::types::{AgentId, Basis, Personality, TargetId};

use crate::profiles::{get_profile, ManeuverInput};

/// The ship being updated.
#[derive(Debug, Clone, Copy)]
pub struct AgentSense {
    pub id: AgentId,
    pub class: ShipClass,
    pub position: DVec3,
    pub velocity: DVec3,
    pub basis: Basis,
    pub health_ratio: f64,
    pub personality: Personality,
}

/// The ship's current target as resolved against the host's contacts.
/// While not visible, `position` is the last known position.
#[derive(Debug, Clone, Copy)]
pub struct TargetSense {
    pub id: TargetId,
    pub position: DVec3,
    pub velocity: DVec3,
    pub distance: f64,
    /// Inside the ship's detection range this tick.
    pub visible: bool,
}

/// An allied ship within sensing radius.
#[derive(Debug, Clone, Copy)]
pub struct AllySense {
    pub id: AgentId,
    pub position: DVec3,
    pub health_ratio: f64,
    pub target: Option<TargetId>,
    pub target_position: Option<DVec3>,
}

pub struct BehaviorContext<'a> {
    pub agent: AgentSense,
    /// `None` when the ship has no target or the target no longer exists.
    pub target: Option<TargetSense>,
    pub time_since_seen: f64,
    pub last_known_position: Option<DVec3>,
    pub allies: &'a [AllySense],
    pub weapon_ready: bool,
    pub dt: f64,
}

impl BehaviorContext<'_> {
    fn visible_target(&self) -> Option<&TargetSense> {
        self.target.as_ref().filter(|t| t.visible)
    }

    fn ally(&self, id: AgentId) -> Option<&AllySense> {
        self.allies.iter().find(|a| a.id == id)
    }
}

/// Instruction attached by the tactical coordinator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Directive {
    /// Fly to a point before engaging normally.
    Approach(DVec3),
    /// Run the class quick-strike maneuver for a short pass.
    QuickStrike,
    /// Hold a cover point and fire from range.
    HoldCover(DVec3),
    /// Guard a specific ally while in Support.
    Protect(AgentId),
}

/// What the caller should do this tick.
#[derive(Debug, Clone, Default)]
pub struct BehaviorOutput {
    /// New navigator destination, if the state wants one.
    pub destination: Option<DVec3>,
    pub fire_at: Option<TargetId>,
    /// Replace the ship's target reference.
    pub adopt_target: Option<TargetId>,
    pub messages: Vec<Message>,
    /// `(from, to)` when the state changed this tick.
    pub transition: Option<(BehaviorState, BehaviorState)>,
}

/// Behavior state and the per-state memory that goes with it.
#[derive(Debug, Clone)]
pub struct BehaviorMachine {
    state: BehaviorState,
    pub(crate) time_in_state: f64,
    spawn_point: DVec3,
    patrol: Vec<DVec3>,
    patrol_index: usize,
    reevaluate_timer: f64,
    safety_point: Option<DVec3>,
    protected_ally: Option<AgentId>,
    search_point: Option<DVec3>,
    directive: Option<Directive>,
    directive_timer: f64,
    requested: Option<BehaviorState>,
    initialized: bool,
}

impl BehaviorMachine {
    /// A machine starting in Patrol around `spawn_point`.
    pub fn new(spawn_point: DVec3) -> Self {
        Self::in_state(BehaviorState::Patrol, spawn_point)
    }

    /// A machine starting in `state`. The state's entry runs on the first update.
    pub fn in_state(state: BehaviorState, spawn_point: DVec3) -> Self {
        Self {
            state,
            time_in_state: 0.0,
            spawn_point,
            patrol: Vec::new(),
            patrol_index: 0,
            reevaluate_timer: 0.0,
            safety_point: None,
            protected_ally: None,
            search_point: None,
            directive: None,
            directive_timer: 0.0,
            requested: None,
            initialized: false,
        }
    }

    pub fn state(&self) -> BehaviorState {
        self.state
    }

    pub fn time_in_state(&self) -> f64 {
        self.time_in_state
    }

    pub fn directive(&self) -> Option<Directive> {
        self.directive
    }

    pub fn protected_ally(&self) -> Option<AgentId> {
        self.protected_ally
    }

    pub fn patrol_points(&self) -> &[DVec3] {
        &self.patrol
    }

    pub fn safety_point(&self) -> Option<DVec3> {
        self.safety_point
    }

    /// Ask for `state` at the next transition check, optionally with a
    /// directive. A later request replaces an earlier one.
    ///
    /// Ignored while fleeing; Flee ends only through its own exit rules.
    /// Returns whether the request was accepted.
    pub fn request(&mut self, state: BehaviorState, directive: Option<Directive>) -> bool {
        if self.state == BehaviorState::Flee {
            return false;
        }
        self.requested = Some(state);
        self.directive = directive;
        self.directive_timer = 0.0;
        true
    }

    /// Run one tick: state action, then one transition check.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        ctx: &BehaviorContext<'_>,
        rng: &mut R,
        cfg: &BehaviorConfig,
    ) -> BehaviorOutput {
        let mut out = BehaviorOutput::default();
        if !self.initialized {
            self.initialized = true;
            self.enter(ctx, rng, cfg, &mut out);
        }

        self.time_in_state += ctx.dt;
        self.directive_timer += ctx.dt;

        match self.state {
            BehaviorState::Patrol => self.patrol(ctx, cfg, &mut out),
            BehaviorState::Attack => self.attack(ctx, cfg, &mut out),
            BehaviorState::Pursue => self.pursue(ctx, rng, cfg, &mut out),
            BehaviorState::Flee => self.flee(ctx, &mut out),
            BehaviorState::Support => self.support(ctx, cfg, &mut out),
        }

        let requested = self.requested.take();
        let next = match requested {
            Some(state) => Some(state),
            None => next_state(self, ctx, cfg),
        };
        if let Some(next) = next.filter(|s| *s != self.state) {
            let from = self.state;
            tracing::trace!(agent = ctx.agent.id.0, ?from, to = ?next, "behavior transition");
            self.state = next;
            self.time_in_state = 0.0;
            self.reevaluate_timer = 0.0;
            if requested.is_none() {
                self.directive = None;
            }
            if let (BehaviorState::Patrol, Some(target)) = (from, ctx.visible_target()) {
                out.messages.push(Message::new(
                    MessageKind::TargetSighted,
                    ctx.agent.id,
                    ctx.agent.position,
                    MessagePayload::Target { target: target.id },
                ));
            }
            self.enter(ctx, rng, cfg, &mut out);
            out.transition = Some((from, next));
        }
        out
    }

    fn enter<R: Rng + ?Sized>(
        &mut self,
        ctx: &BehaviorContext<'_>,
        rng: &mut R,
        cfg: &BehaviorConfig,
        out: &mut BehaviorOutput,
    ) {
        let agent = &ctx.agent;
        match self.state {
            BehaviorState::Patrol => {
                self.patrol = patrol_points(self.spawn_point, rng, cfg);
                self.patrol_index = 0;
                out.destination = self.patrol.first().copied();
            }
            BehaviorState::Attack => {
                if let Some(target) = ctx.visible_target() {
                    out.messages.push(Message::new(
                        MessageKind::EngagingTarget,
                        agent.id,
                        agent.position,
                        MessagePayload::Target { target: target.id },
                    ));
                }
            }
            BehaviorState::Pursue => {
                self.search_point = ctx.last_known_position.or(ctx.target.map(|t| t.position));
                out.destination = self.search_point;
            }
            BehaviorState::Flee => {
                self.safety_point = Some(safety_point(ctx, cfg));
                out.destination = self.safety_point;
                out.messages.push(Message::new(
                    MessageKind::RequestEscort,
                    agent.id,
                    agent.position,
                    MessagePayload::Escort {
                        threat: ctx.target.map(|t| t.id),
                    },
                ));
            }
            BehaviorState::Support => {
                self.protected_ally = match self.directive {
                    Some(Directive::Protect(ally)) => Some(ally),
                    _ => weakest_ally(ctx.allies, cfg.support_select_health),
                };
                if let Some(ally) = self.protected_ally.and_then(|id| ctx.ally(id)) {
                    out.adopt_target = ally.target;
                }
            }
        }
    }

    fn patrol(&mut self, ctx: &BehaviorContext<'_>, cfg: &BehaviorConfig, out: &mut BehaviorOutput) {
        if self.patrol.is_empty() {
            return;
        }
        let current = self.patrol[self.patrol_index];
        if ctx.agent.position.distance(current) <= cfg.point_reached_distance {
            self.patrol_index = (self.patrol_index + 1) % self.patrol.len();
            out.destination = Some(self.patrol[self.patrol_index]);
        }
    }

    fn attack(&mut self, ctx: &BehaviorContext<'_>, cfg: &BehaviorConfig, out: &mut BehaviorOutput) {
        let agent = &ctx.agent;
        let Some(target) = ctx.visible_target() else {
            out.destination = ctx.last_known_position;
            return;
        };

        let profile = get_profile(agent.class);
        let preferred = profile.preferred_range;
        let input = ManeuverInput {
            position: agent.position,
            velocity: agent.velocity,
            basis: agent.basis,
            target_position: target.position,
            target_velocity: target.velocity,
            preferred_range: preferred,
            phase_secs: self.time_in_state,
        };

        let band = range_point(agent.position, target.position, preferred, agent.basis);
        let directive = self.directive;
        out.destination = Some(match directive {
            Some(Directive::Approach(point)) => {
                if agent.position.distance(point) <= cfg.point_reached_distance {
                    self.directive = None;
                }
                point
            }
            Some(Directive::HoldCover(point)) => point,
            Some(Directive::QuickStrike) => {
                if self.directive_timer >= cfg.quick_strike_secs {
                    self.directive = None;
                }
                (profile.quick_strike)(&input)
            }
            _ if target.distance > preferred * cfg.attack_close_factor => band,
            _ if target.distance < preferred * cfg.attack_backoff_factor => band,
            _ => (profile.attack_maneuver)(&input),
        });

        if ctx.weapon_ready && target.distance <= preferred * cfg.weapon_range_factor {
            out.fire_at = Some(target.id);
        }

        self.reevaluate_timer += ctx.dt;
        if self.reevaluate_timer >= cfg.attack_reevaluate_secs {
            self.reevaluate_timer = 0.0;
            let allies = ctx.allies.len();
            if allies >= cfg.coordinated_strike_allies {
                out.messages.push(Message::new(
                    MessageKind::EngagingTarget,
                    agent.id,
                    agent.position,
                    MessagePayload::CoordinatedStrike {
                        target: target.id,
                        allies: allies as u32,
                    },
                ));
            } else if agent.personality.teamwork > cfg.request_support_teamwork {
                out.messages.push(Message::new(
                    MessageKind::RequestSupport,
                    agent.id,
                    agent.position,
                    MessagePayload::Target { target: target.id },
                ));
            }
        }
    }

    fn pursue<R: Rng + ?Sized>(
        &mut self,
        ctx: &BehaviorContext<'_>,
        rng: &mut R,
        cfg: &BehaviorConfig,
        out: &mut BehaviorOutput,
    ) {
        let Some(anchor) = ctx.last_known_position.or(ctx.target.map(|t| t.position)) else {
            return;
        };
        let reached = self
            .search_point
            .is_none_or(|p| ctx.agent.position.distance(p) <= cfg.point_reached_distance);
        if reached {
            let radius = cfg.pursue_base_radius + cfg.pursue_radius_growth * self.time_in_state;
            let point = anchor + random_direction(rng) * radius;
            self.search_point = Some(point);
            out.destination = Some(point);
        }
    }

    fn flee(&mut self, ctx: &BehaviorContext<'_>, out: &mut BehaviorOutput) {
        let Some(safety) = self.safety_point else {
            return;
        };
        let agent = &ctx.agent;
        let profile = get_profile(agent.class);
        let threat = ctx.target.map_or(safety, |t| t.position);
        let input = ManeuverInput {
            position: agent.position,
            velocity: agent.velocity,
            basis: agent.basis,
            target_position: threat,
            target_velocity: ctx.target.map_or(DVec3::ZERO, |t| t.velocity),
            preferred_range: profile.preferred_range,
            phase_secs: self.time_in_state,
        };
        out.destination = Some(safety + (profile.evasive_maneuver)(&input));
    }

    fn support(&mut self, ctx: &BehaviorContext<'_>, cfg: &BehaviorConfig, out: &mut BehaviorOutput) {
        let agent = &ctx.agent;
        let Some(ally) = self.protected_ally.and_then(|id| ctx.ally(id)) else {
            return;
        };

        out.destination = Some(match ally.target_position {
            Some(threat) => {
                let line = threat - ally.position;
                let side = line
                    .cross(DVec3::Y)
                    .try_normalize()
                    .unwrap_or(agent.basis.right);
                ally.position + side * cfg.support_guard_offset
            }
            None => {
                let away = (agent.position - ally.position)
                    .try_normalize()
                    .unwrap_or(-agent.basis.forward);
                ally.position + away * cfg.support_guard_offset
            }
        });

        let profile = get_profile(agent.class);
        if let (Some(target), Some(threat)) = (ally.target, ally.target_position) {
            let own = ctx.target.map(|t| t.id);
            if own != Some(target) && agent.position.distance(threat) <= profile.detection_range {
                out.adopt_target = Some(target);
            }
        }

        if let Some(target) = ctx.visible_target() {
            if ctx.weapon_ready
                && target.distance <= profile.preferred_range * cfg.weapon_range_factor
            {
                out.fire_at = Some(target.id);
            }
        }
    }
}

/// Transition rule for the machine's current state. `None` means remain.
pub fn next_state(
    machine: &BehaviorMachine,
    ctx: &BehaviorContext<'_>,
    cfg: &BehaviorConfig,
) -> Option<BehaviorState> {
    let agent = &ctx.agent;
    let visible = ctx.visible_target().is_some();
    match machine.state {
        BehaviorState::Patrol => visible.then_some(BehaviorState::Attack),
        BehaviorState::Attack => {
            if agent.health_ratio < cfg.flee_health_ratio
                && agent.personality.caution > cfg.flee_caution
            {
                return Some(BehaviorState::Flee);
            }
            if ctx.target.is_none() || ctx.time_since_seen > cfg.target_lost_secs {
                return Some(BehaviorState::Pursue);
            }
            let ally_down = ctx
                .allies
                .iter()
                .any(|a| a.health_ratio < cfg.support_trigger_ally_health);
            if ally_down && agent.personality.teamwork > cfg.support_trigger_teamwork {
                return Some(BehaviorState::Support);
            }
            None
        }
        BehaviorState::Pursue => {
            if visible {
                Some(BehaviorState::Attack)
            } else if machine.time_in_state > cfg.pursue_timeout_secs {
                Some(BehaviorState::Patrol)
            } else {
                None
            }
        }
        BehaviorState::Flee => {
            let detection = get_profile(agent.class).detection_range;
            let threat_gone = ctx
                .target
                .is_none_or(|t| t.distance > detection * cfg.flee_threat_gone_factor);
            if threat_gone {
                return Some(BehaviorState::Patrol);
            }
            let recovered = machine.time_in_state >= cfg.flee_min_secs
                && agent.health_ratio > cfg.flee_recover_health
                && ctx.allies.len() >= cfg.flee_min_allies;
            recovered.then_some(BehaviorState::Attack)
        }
        BehaviorState::Support => {
            let done = match machine.protected_ally.and_then(|id| ctx.ally(id)) {
                None => true,
                Some(ally) => {
                    ally.health_ratio > cfg.support_recovered_health
                        || machine.time_in_state > cfg.support_max_secs
                }
            };
            if !done {
                None
            } else if ctx.target.is_some() {
                Some(BehaviorState::Attack)
            } else {
                Some(BehaviorState::Patrol)
            }
        }
    }
}

/// Patrol points on jittered angles and radii around `center`.
fn patrol_points<R: Rng + ?Sized>(center: DVec3, rng: &mut R, cfg: &BehaviorConfig) -> Vec<DVec3> {
    let count = cfg.patrol_waypoint_count.max(1);
    let sector = TAU / count as f64;
    (0..count)
        .map(|i| {
            let angle = sector * i as f64 + rng.gen_range(-0.4..0.4) * sector;
            let radius = if cfg.patrol_radius_max > cfg.patrol_radius_min {
                rng.gen_range(cfg.patrol_radius_min..cfg.patrol_radius_max)
            } else {
                cfg.patrol_radius_max
            };
            let height = rng.gen_range(-0.2..0.2) * radius;
            center + DVec3::new(angle.cos() * radius, height, angle.sin() * radius)
        })
        .collect()
}

/// Uniform random unit vector.
fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> DVec3 {
    let y: f64 = rng.gen_range(-1.0..1.0);
    let theta: f64 = rng.gen_range(0.0..TAU);
    let ring = (1.0 - y * y).sqrt();
    DVec3::new(ring * theta.cos(), y, ring * theta.sin())
}

/// Point at preferred range on the line from the target to the ship.
fn range_point(position: DVec3, target: DVec3, preferred: f64, basis: Basis) -> DVec3 {
    let away = (position - target).try_normalize().unwrap_or(-basis.forward);
    target + away * preferred
}

/// Point `flee_distance` away from the threat, bent toward the allies.
fn safety_point(ctx: &BehaviorContext<'_>, cfg: &BehaviorConfig) -> DVec3 {
    let agent = &ctx.agent;
    let away = ctx
        .target
        .and_then(|t| (agent.position - t.position).try_normalize())
        .unwrap_or(-agent.basis.forward);

    let toward_allies = if ctx.allies.is_empty() {
        DVec3::ZERO
    } else {
        let centroid =
            ctx.allies.iter().map(|a| a.position).sum::<DVec3>() / ctx.allies.len() as f64;
        (centroid - agent.position).normalize_or_zero()
    };

    let direction = (away * 0.7 + toward_allies * 0.3).try_normalize().unwrap_or(away);
    agent.position + direction * cfg.flee_distance
}

/// Lowest-health ally strictly below `threshold`. Ties go to the lower id.
fn weakest_ally(allies: &[AllySense], threshold: f64) -> Option<AgentId> {
    allies
        .iter()
        .filter(|a| a.health_ratio < threshold)
        .min_by(|a, b| {
            a.health_ratio
                .total_cmp(&b.health_ratio)
                .then(a.id.cmp(&b.id))
        })
        .map(|a| a.id)
}
