//! The agent and formation collections.
//!
//! Agents are hecs entities found through an id index; formations live in
//! an ordered table. Every mutation that touches both (joining, leaving,
//! creating a formation) goes through here so `FormationLink` components
//! always mirror the formation slot tables.

use std::collections::BTreeMap;

use glam::DVec3;
use hecs::{Entity, World};

use armada_ai::formation::{Formation, LeaderCandidate, MemberState};
use armada_core::components::*;
use armada_core::config::FormationConfig;
use armada_core::enums::{FormationShape, ShipClass};
use armada_core::types::{AgentId, FormationId, Personality};

use crate::error::ArenaError;
use crate::world_setup;

#[derive(Default)]
pub struct Population {
    pub(crate) world: World,
    pub(crate) index: BTreeMap<AgentId, Entity>,
    pub(crate) formations: BTreeMap<FormationId, Formation>,
    next_agent: u32,
    next_formation: u32,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn entity(&self, agent: AgentId) -> Option<Entity> {
        self.index.get(&agent).copied()
    }

    pub fn contains(&self, agent: AgentId) -> bool {
        self.index.contains_key(&agent)
    }

    /// Live agent ids in ascending order.
    pub fn ids(&self) -> Vec<AgentId> {
        self.index.keys().copied().collect()
    }

    pub fn formations(&self) -> impl Iterator<Item = &Formation> {
        self.formations.values()
    }

    pub fn formation(&self, id: FormationId) -> Option<&Formation> {
        self.formations.get(&id)
    }

    pub fn formation_count(&self) -> usize {
        self.formations.len()
    }

    /// Formation the agent belongs to, if any.
    pub fn link(&self, agent: AgentId) -> Option<FormationLink> {
        let entity = self.entity(agent)?;
        self.world.get::<&FormationLink>(entity).ok().map(|link| *link)
    }

    pub fn hull(&self, agent: AgentId) -> Option<Hull> {
        let entity = self.entity(agent)?;
        self.world.get::<&Hull>(entity).ok().map(|hull| *hull)
    }

    pub fn kinematics(&self, agent: AgentId) -> Option<Kinematics> {
        let entity = self.entity(agent)?;
        self.world.get::<&Kinematics>(entity).ok().map(|kin| *kin)
    }

    pub fn spawn(&mut self, class: ShipClass, position: DVec3, personality: Personality) -> AgentId {
        let id = AgentId(self.next_agent);
        self.next_agent += 1;
        let entity = self
            .world
            .spawn(world_setup::agent_bundle(id, class, position, personality));
        self.index.insert(id, entity);
        id
    }

    /// Overwrite an agent's health, capped at its maximum. Returns the new value.
    pub fn set_health(&mut self, agent: AgentId, health: f64) -> Result<f64, ArenaError> {
        let entity = self.entity(agent).ok_or(ArenaError::UnknownAgent(agent))?;
        let mut hull = self
            .world
            .get::<&mut Hull>(entity)
            .map_err(|_| ArenaError::UnknownAgent(agent))?;
        hull.health = health.min(hull.max_health);
        Ok(hull.health)
    }

    /// Subtract `amount` from an agent's health. Returns the new value.
    pub fn apply_damage(&mut self, agent: AgentId, amount: f64) -> Result<f64, ArenaError> {
        let current = self.hull(agent).ok_or(ArenaError::UnknownAgent(agent))?;
        self.set_health(agent, current.health - amount)
    }

    /// Mark every agent destroyed; cleanup removes them on the next tick.
    pub fn destroy_all(&mut self) {
        for (_entity, hull) in self.world.query_mut::<&mut Hull>() {
            hull.health = 0.0;
        }
    }

    /// Create a formation from the given agents, in order. Unknown agents
    /// and agents already in a formation are skipped, as is everyone past
    /// the size cap. Needs at least two eligible agents.
    pub fn create_formation(
        &mut self,
        shape: FormationShape,
        agents: &[AgentId],
        cfg: &FormationConfig,
    ) -> Option<FormationId> {
        let eligible: Vec<AgentId> = agents
            .iter()
            .copied()
            .filter(|a| self.contains(*a) && self.link(*a).is_none())
            .take(cfg.max_size)
            .collect();
        if eligible.len() < 2 {
            return None;
        }

        let id = FormationId(self.next_formation);
        self.next_formation += 1;
        let mut formation = Formation::new(id, shape);
        for agent in &eligible {
            formation.add_member(*agent, cfg);
        }
        self.formations.insert(id, formation);
        self.sync_links(id);
        self.refresh(id, cfg);

        tracing::info!(
            formation = id.0,
            ?shape,
            members = eligible.len(),
            "formation created"
        );
        Some(id)
    }

    /// Add an unassigned agent to a formation with free capacity.
    pub fn join(&mut self, formation: FormationId, agent: AgentId, cfg: &FormationConfig) -> bool {
        if !self.contains(agent) || self.link(agent).is_some() {
            return false;
        }
        let Some(slot) = self
            .formations
            .get_mut(&formation)
            .and_then(|f| f.add_member(agent, cfg))
        else {
            return false;
        };
        tracing::debug!(formation = formation.0, agent = agent.0, slot, "joined formation");
        self.sync_links(formation);
        self.refresh(formation, cfg);
        true
    }

    /// Take an agent out of its formation, electing a new leader if it led.
    pub fn leave(&mut self, agent: AgentId, cfg: &FormationConfig) -> Option<FormationId> {
        let link = self.link(agent)?;
        let world = &self.world;
        let index = &self.index;
        if let Some(formation) = self.formations.get_mut(&link.formation) {
            formation.remove_member(agent, |id| leader_candidate(world, index, id), cfg);
        }
        if let Some(entity) = self.entity(agent) {
            let removed = self.world.remove_one::<FormationLink>(entity);
            debug_assert!(removed.is_ok(), "linked agent {agent:?} had no FormationLink");
        }
        self.sync_links(link.formation);
        Some(link.formation)
    }

    /// Remove an agent entity. Formation membership must be dropped first.
    pub fn despawn(&mut self, agent: AgentId) -> bool {
        debug_assert!(self.link(agent).is_none(), "despawning a formation member");
        match self.index.remove(&agent) {
            Some(entity) => self.world.despawn(entity).is_ok(),
            None => false,
        }
    }

    /// Remove every formation without members. Returns their ids.
    pub fn dispose_empty_formations(&mut self) -> Vec<FormationId> {
        let empty: Vec<FormationId> = self
            .formations
            .iter()
            .filter(|(_, f)| f.is_empty())
            .map(|(id, _)| *id)
            .collect();
        for id in &empty {
            self.formations.remove(id);
        }
        empty
    }

    pub fn change_formation(&mut self, id: FormationId, shape: FormationShape) -> Result<(), ArenaError> {
        let formation = self
            .formations
            .get_mut(&id)
            .ok_or(ArenaError::UnknownFormation(id))?;
        formation.change_formation(shape);
        Ok(())
    }

    /// Copy the slot table of a formation into its members' links.
    pub(crate) fn sync_links(&mut self, id: FormationId) {
        let Some(formation) = self.formations.get(&id) else {
            return;
        };
        for member in formation.members() {
            let Some(entity) = self.index.get(&member.agent) else {
                continue;
            };
            let link = FormationLink {
                formation: id,
                slot: member.slot,
            };
            let inserted = self.world.insert_one(*entity, link);
            debug_assert!(inserted.is_ok(), "indexed agent {:?} has no entity", member.agent);
        }
    }

    /// Recompute a formation's frame and slot targets from current positions.
    pub(crate) fn refresh(&mut self, id: FormationId, cfg: &FormationConfig) {
        let world = &self.world;
        let index = &self.index;
        if let Some(formation) = self.formations.get_mut(&id) {
            formation.update(|agent| member_state(world, index, agent), cfg);
        }
    }
}

pub(crate) fn leader_candidate(
    world: &World,
    index: &BTreeMap<AgentId, Entity>,
    agent: AgentId,
) -> Option<LeaderCandidate> {
    let entity = *index.get(&agent)?;
    let hull = world.get::<&Hull>(entity).ok()?;
    let pilot = world.get::<&Pilot>(entity).ok()?;
    Some(LeaderCandidate {
        health_ratio: hull.ratio(),
        class: pilot.class,
        teamwork: pilot.personality.teamwork,
    })
}

fn member_state(world: &World, index: &BTreeMap<AgentId, Entity>, agent: AgentId) -> Option<MemberState> {
    let entity = *index.get(&agent)?;
    let kin = world.get::<&Kinematics>(entity).ok()?;
    let targeting = world.get::<&Targeting>(entity).ok()?;
    Some(MemberState {
        position: kin.position,
        velocity: kin.velocity,
        basis: kin.basis,
        engaged: targeting.target.is_some(),
    })
}
