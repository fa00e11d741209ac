//! Collaborators owned by the host game.
//!
//! The arena never talks to the renderer, the weapon system or the allied
//! messaging layer directly. It calls these traits once per tick and the
//! host decides what they do.

use armada_core::events::Message;
use armada_core::types::{AgentId, Contact, TargetId};

/// Allied notification fan-out. Fire-and-forget.
pub trait CommunicationHub {
    fn broadcast(&mut self, message: &Message);
    /// The agent was removed; drop any subscriptions it held.
    fn unregister(&mut self, agent: AgentId);
}

/// Drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHub;

impl CommunicationHub for NullHub {
    fn broadcast(&mut self, _message: &Message) {}
    fn unregister(&mut self, _agent: AgentId) {}
}

/// Keeps everything it receives, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingHub {
    pub messages: Vec<Message>,
    pub unregistered: Vec<AgentId>,
}

impl CommunicationHub for RecordingHub {
    fn broadcast(&mut self, message: &Message) {
        self.messages.push(*message);
    }

    fn unregister(&mut self, agent: AgentId) {
        self.unregistered.push(agent);
    }
}

/// Host-side difficulty curve. The arena reports its population each tick
/// and reads back the level and the spawn multipliers.
pub trait DifficultyScaling {
    fn update(&mut self, population: usize, player: Option<&Contact>, dt: f64);
    fn level(&self) -> u32;
    /// Multiplies `spawn.base_max_population`.
    fn max_population_multiplier(&self) -> f64;
    /// Multiplies `spawn.base_interval_secs`.
    fn spawn_interval_multiplier(&self) -> f64;
}

/// A constant difficulty level. Each level above 1 allows 25% more ships
/// and spawns 15% faster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDifficulty {
    pub level: u32,
}

impl FixedDifficulty {
    pub fn new(level: u32) -> Self {
        Self { level }
    }

    fn steps(&self) -> f64 {
        self.level.saturating_sub(1) as f64
    }
}

impl Default for FixedDifficulty {
    fn default() -> Self {
        Self::new(1)
    }
}

impl DifficultyScaling for FixedDifficulty {
    fn update(&mut self, _population: usize, _player: Option<&Contact>, _dt: f64) {}

    fn level(&self) -> u32 {
        self.level
    }

    fn max_population_multiplier(&self) -> f64 {
        1.0 + 0.25 * self.steps()
    }

    fn spawn_interval_multiplier(&self) -> f64 {
        1.0 / (1.0 + 0.15 * self.steps())
    }
}

/// Weapon system owned by the host. The arena only decides when to fire.
pub trait WeaponEffector {
    fn can_attack(&self, agent: AgentId) -> bool;
    fn attack(&mut self, agent: AgentId, target: TargetId);
}

/// Never ready to fire.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWeapons;

impl WeaponEffector for NoWeapons {
    fn can_attack(&self, _agent: AgentId) -> bool {
        false
    }

    fn attack(&mut self, _agent: AgentId, _target: TargetId) {}
}

/// Always ready; logs every shot.
#[derive(Debug, Clone, Default)]
pub struct RecordingWeapons {
    pub shots: Vec<(AgentId, TargetId)>,
}

impl WeaponEffector for RecordingWeapons {
    fn can_attack(&self, _agent: AgentId) -> bool {
        true
    }

    fn attack(&mut self, agent: AgentId, target: TargetId) {
        self.shots.push((agent, target));
    }
}

/// Everything the host lends the arena for one tick.
pub struct Host<'a> {
    /// Targetable host entities. The first one is the player.
    pub contacts: &'a [Contact],
    pub hub: &'a mut dyn CommunicationHub,
    pub difficulty: &'a mut dyn DifficultyScaling,
    pub weapons: &'a mut dyn WeaponEffector,
}

impl Host<'_> {
    pub fn player(&self) -> Option<&Contact> {
        self.contacts.first()
    }

    pub fn contact(&self, id: TargetId) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }
}
