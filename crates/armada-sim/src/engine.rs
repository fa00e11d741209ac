//! The arena orchestrator.
//!
//! `Orchestrator` owns the hecs world of agents, the formation table, the
//! tactical coordinator and the seeded RNG. It processes host commands,
//! runs every system in a fixed order and produces an `ArenaSnapshot`.
//! Completely headless; the host lends its collaborators per tick.

use std::collections::VecDeque;

use glam::DVec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use armada_ai::tactics::TacticalCoordinator;
use armada_core::commands::ArenaCommand;
use armada_core::config::ArenaConfig;
use armada_core::enums::{FormationShape, ShipClass};
use armada_core::events::Outbox;
use armada_core::state::{ArenaSnapshot, TacticView};
use armada_core::types::{AgentId, FormationId, Personality, SimTime};

use crate::error::ArenaError;
use crate::external::Host;
use crate::population::Population;
use crate::systems;
use crate::world_setup;

/// The arena. Owns every agent and formation.
pub struct Orchestrator {
    config: ArenaConfig,
    population: Population,
    coordinator: TacticalCoordinator,
    rng: ChaCha8Rng,
    time: SimTime,
    outbox: Outbox,
    command_queue: VecDeque<ArenaCommand>,
    despawn_buffer: Vec<AgentId>,
    tactics: Vec<TacticView>,
    spawn_timer: f64,
    swarm_timer: f64,
}

impl Orchestrator {
    /// Validate `config` and build an empty arena seeded from it.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            population: Population::new(),
            coordinator: TacticalCoordinator::new(),
            time: SimTime::default(),
            outbox: Outbox::default(),
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            tactics: Vec::new(),
            spawn_timer: 0.0,
            swarm_timer: 0.0,
        })
    }

    /// Build an arena from a (possibly partial) JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ArenaError> {
        let config: ArenaConfig = serde_json::from_str(json)?;
        Self::new(config)
    }

    /// Queue a host command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: ArenaCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = ArenaCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the arena by `dt` seconds and return the resulting snapshot.
    ///
    /// Queued commands are applied first. A non-positive or non-finite `dt`
    /// applies the commands but runs no systems.
    pub fn tick(&mut self, dt: f64, host: &mut Host<'_>) -> ArenaSnapshot {
        self.process_commands(host);

        if dt > 0.0 && dt.is_finite() {
            self.run_systems(dt, host);
            self.time.advance(dt);
        } else {
            tracing::warn!(dt, "ignoring invalid tick duration");
        }

        let tactics = std::mem::take(&mut self.tactics);
        systems::snapshot::build_snapshot(&self.population, &self.time, host.difficulty.level(), tactics)
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn coordinator(&self) -> &TacticalCoordinator {
        &self.coordinator
    }

    /// Spawn one agent right away. Its position is clamped into the bounds.
    pub fn spawn_agent(
        &mut self,
        class: ShipClass,
        position: DVec3,
        personality: Option<Personality>,
    ) -> AgentId {
        let personality =
            personality.unwrap_or_else(|| world_setup::roll_personality(&mut self.rng));
        let position = self.config.bounds.clamp(position);
        let id = self.population.spawn(class, position, personality);
        tracing::debug!(agent = id.0, ?class, "agent spawned");
        id
    }

    /// Overwrite an agent's health. Zero or less removes it on the next tick.
    pub fn set_health(&mut self, agent: AgentId, health: f64) -> Result<f64, ArenaError> {
        self.population.set_health(agent, health)
    }

    /// Subtract `amount` from an agent's health and return what is left.
    pub fn apply_damage(&mut self, agent: AgentId, amount: f64) -> Result<f64, ArenaError> {
        self.population.apply_damage(agent, amount)
    }

    /// Mark an agent destroyed; it leaves its formation and the arena
    /// during the next tick's cleanup.
    pub fn remove_agent(&mut self, agent: AgentId) -> Result<(), ArenaError> {
        self.population.set_health(agent, 0.0).map(|_| ())
    }

    pub fn change_formation(
        &mut self,
        formation: FormationId,
        shape: FormationShape,
    ) -> Result<(), ArenaError> {
        self.population.change_formation(formation, shape)
    }

    /// Process all queued commands.
    fn process_commands(&mut self, host: &Host<'_>) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command, host);
        }
    }

    /// Handle a single host command. Commands naming unknown ids are dropped.
    fn handle_command(&mut self, command: ArenaCommand, host: &Host<'_>) {
        let result = match command {
            ArenaCommand::SpawnAgent {
                class,
                position,
                personality,
            } => {
                self.spawn_agent(class, position, personality);
                Ok(())
            }
            ArenaCommand::SpawnWave { count } => {
                let reference = host
                    .player()
                    .map(|p| p.position)
                    .unwrap_or(self.config.bounds.center);
                systems::wave_spawner::spawn_wave(
                    &mut self.population,
                    &mut self.rng,
                    reference,
                    count,
                    host.difficulty.level(),
                    &self.config,
                );
                Ok(())
            }
            ArenaCommand::RemoveAgent { agent } => self.remove_agent(agent),
            ArenaCommand::ClearAll => {
                self.population.destroy_all();
                tracing::info!(agents = self.population.len(), "arena cleared");
                Ok(())
            }
            ArenaCommand::ApplyDamage { agent, amount } => self.apply_damage(agent, amount).map(|_| ()),
            ArenaCommand::SetHealth { agent, health } => self.set_health(agent, health).map(|_| ()),
            ArenaCommand::ChangeFormation { formation, shape } => self.change_formation(formation, shape),
        };
        if let Err(error) = result {
            tracing::warn!(%error, "command ignored");
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt: f64, host: &mut Host<'_>) {
        let config = &self.config;

        // 1. Difficulty
        host.difficulty.update(self.population.len(), host.contacts.first(), dt);
        // 2. Cleanup (destroyed agents, empty formations)
        systems::cleanup::run(
            &mut self.population,
            &mut self.coordinator,
            &mut *host.hub,
            &mut self.despawn_buffer,
            &config.formation,
        );
        // 3. Roster snapshot for cross-agent reads
        let roster = systems::roster::take(&self.population);
        // 4. Tactical evaluation and orders
        self.tactics = systems::tactical::run(
            &mut self.population,
            &mut self.coordinator,
            &roster,
            host.contacts,
            self.time.elapsed_secs,
            dt,
            config,
        );
        // Orders changed states and targets; re-read before behavior.
        let roster = systems::roster::take(&self.population);
        // 5. Behavior state machines
        systems::behavior::run(
            &mut self.population,
            &roster,
            host.contacts,
            &mut *host.weapons,
            &mut self.rng,
            &mut self.outbox,
            dt,
            config,
        );
        // 6. Formation adjustment and slot targets
        let roster = systems::roster::take(&self.population);
        systems::formations::run(&mut self.population, &roster, dt, &config.formation);
        // 7. Navigation, formation following, integration
        systems::navigation::run(&mut self.population, &roster, dt, config);
        // 8. Swarm separation and cohesion
        if systems::swarm::run(&mut self.population, &mut self.swarm_timer, dt, &config.swarm) {
            tracing::trace!(agents = self.population.len(), "swarm correction applied");
        }
        // 9. World bounds
        systems::bounds::run(&mut self.population.world, dt, config);
        // 10. Wave spawning
        systems::wave_spawner::run(
            &mut self.population,
            &mut self.rng,
            &mut self.spawn_timer,
            host.contacts.first(),
            &*host.difficulty,
            dt,
            config,
        );
        // 11. Clustering into formations
        systems::clustering::run(&mut self.population, config);
        // 12. Drain the outbox into the hub
        for message in self.outbox.drain() {
            host.hub.broadcast(&message);
        }
    }
}
