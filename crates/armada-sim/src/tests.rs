//! Tests for the orchestrator, its systems and the spawn factories.

use glam::DVec3;
use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use armada_core::commands::ArenaCommand;
use armada_core::components::Kinematics;
use armada_core::config::{ArenaConfig, ConfigError, SpawnConfig};
use armada_core::enums::*;
use armada_core::state::ArenaSnapshot;
use armada_core::types::{AgentId, Contact, FormationId, Personality, TargetId, WorldBounds};

use crate::engine::Orchestrator;
use crate::error::ArenaError;
use crate::external::{FixedDifficulty, Host, RecordingHub, RecordingWeapons};
use crate::systems::{bounds, clustering};
use crate::world_setup;

const DT: f64 = 1.0 / 30.0;
const PLAYER: TargetId = TargetId(1);

/// Host-side collaborators for a test arena.
struct Harness {
    contacts: Vec<Contact>,
    hub: RecordingHub,
    difficulty: FixedDifficulty,
    weapons: RecordingWeapons,
}

impl Harness {
    fn new(contacts: Vec<Contact>) -> Self {
        Self {
            contacts,
            hub: RecordingHub::default(),
            difficulty: FixedDifficulty::new(1),
            weapons: RecordingWeapons::default(),
        }
    }

    fn empty() -> Self {
        Self::new(Vec::new())
    }

    fn with_player(position: DVec3) -> Self {
        Self::new(vec![Contact::new(PLAYER, position, DVec3::ZERO)])
    }

    fn tick_dt(&mut self, arena: &mut Orchestrator, dt: f64) -> ArenaSnapshot {
        let mut host = Host {
            contacts: &self.contacts,
            hub: &mut self.hub,
            difficulty: &mut self.difficulty,
            weapons: &mut self.weapons,
        };
        arena.tick(dt, &mut host)
    }

    fn tick(&mut self, arena: &mut Orchestrator) -> ArenaSnapshot {
        self.tick_dt(arena, DT)
    }
}

/// Default configuration with automatic spawning switched off.
fn quiet_config() -> ArenaConfig {
    ArenaConfig {
        spawn: SpawnConfig {
            enabled: false,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn quiet_arena() -> Orchestrator {
    Orchestrator::new(quiet_config()).unwrap()
}

fn personality(teamwork: f64) -> Option<Personality> {
    Some(Personality::new(0.5, 0.5, teamwork))
}

/// Three fighters close enough to cluster, with rising teamwork.
fn spawn_trio(arena: &mut Orchestrator) -> [AgentId; 3] {
    [
        arena.spawn_agent(ShipClass::Fighter, DVec3::ZERO, personality(0.2)),
        arena.spawn_agent(ShipClass::Fighter, DVec3::new(30.0, 0.0, 0.0), personality(0.1)),
        arena.spawn_agent(ShipClass::Fighter, DVec3::new(0.0, 0.0, 30.0), personality(0.9)),
    ]
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let config = ArenaConfig {
        seed: 12345,
        ..Default::default()
    };
    let mut arena_a = Orchestrator::new(config).unwrap();
    let mut arena_b = Orchestrator::new(config).unwrap();
    let mut host_a = Harness::with_player(DVec3::ZERO);
    let mut host_b = Harness::with_player(DVec3::ZERO);

    arena_a.queue_command(ArenaCommand::SpawnWave { count: 6 });
    arena_b.queue_command(ArenaCommand::SpawnWave { count: 6 });

    for _ in 0..400 {
        let snap_a = host_a.tick(&mut arena_a);
        let snap_b = host_b.tick(&mut arena_b);

        let json_a = serde_json::to_string(&snap_a).unwrap();
        let json_b = serde_json::to_string(&snap_b).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
    assert_eq!(host_a.hub.messages, host_b.hub.messages);
    assert_eq!(host_a.weapons.shots, host_b.weapons.shots);
}

#[test]
fn test_determinism_different_seeds() {
    let mut arena_a = Orchestrator::new(ArenaConfig {
        seed: 111,
        ..quiet_config()
    })
    .unwrap();
    let mut arena_b = Orchestrator::new(ArenaConfig {
        seed: 222,
        ..quiet_config()
    })
    .unwrap();
    let mut host_a = Harness::with_player(DVec3::ZERO);
    let mut host_b = Harness::with_player(DVec3::ZERO);

    arena_a.queue_command(ArenaCommand::SpawnWave { count: 4 });
    arena_b.queue_command(ArenaCommand::SpawnWave { count: 4 });

    let json_a = serde_json::to_string(&host_a.tick(&mut arena_a)).unwrap();
    let json_b = serde_json::to_string(&host_b.tick(&mut arena_b)).unwrap();
    assert_ne!(json_a, json_b, "Different seeds should place waves differently");
}

// ---- Clustering ----

#[test]
fn test_three_nearby_agents_form_one_v_formation() {
    let mut arena = quiet_arena();
    let mut host = Harness::empty();
    let ids = spawn_trio(&mut arena);

    let snap = host.tick(&mut arena);

    assert_eq!(snap.formations.len(), 1);
    let formation = &snap.formations[0];
    assert_eq!(formation.shape, FormationShape::V);
    assert_eq!(formation.members, ids.to_vec());
    assert_eq!(formation.slots.len(), 3);

    for (slot, agent) in snap.agents.iter().enumerate() {
        assert_eq!(agent.formation, Some(formation.id));
        assert_eq!(agent.slot, Some(slot));
    }
}

#[test]
fn test_two_agents_do_not_form_a_formation() {
    let mut arena = quiet_arena();
    let mut host = Harness::empty();
    arena.spawn_agent(ShipClass::Scout, DVec3::ZERO, None);
    arena.spawn_agent(ShipClass::Scout, DVec3::new(20.0, 0.0, 0.0), None);

    let snap = host.tick(&mut arena);
    assert!(snap.formations.is_empty());
    assert!(snap.agents.iter().all(|a| a.formation.is_none()));
}

#[test]
fn test_distant_agents_stay_unassigned() {
    let mut arena = quiet_arena();
    let mut host = Harness::empty();
    arena.spawn_agent(ShipClass::Fighter, DVec3::ZERO, None);
    arena.spawn_agent(ShipClass::Fighter, DVec3::new(400.0, 0.0, 0.0), None);
    arena.spawn_agent(ShipClass::Fighter, DVec3::new(-400.0, 0.0, 0.0), None);

    let snap = host.tick(&mut arena);
    assert!(snap.formations.is_empty());
}

#[test]
fn test_unassigned_agent_joins_nearby_formation() {
    let mut arena = quiet_arena();
    let mut host = Harness::empty();
    spawn_trio(&mut arena);
    host.tick(&mut arena);

    let late = arena.spawn_agent(ShipClass::Bomber, DVec3::new(-40.0, 0.0, 0.0), None);
    let snap = host.tick(&mut arena);

    assert_eq!(snap.formations.len(), 1);
    assert_eq!(snap.formations[0].members.len(), 4);
    assert_eq!(snap.formations[0].members[3], late);
    assert_eq!(arena.population().link(late).map(|l| l.slot), Some(3));
}

#[test]
fn test_single_linkage_chains_clusters() {
    let agents = [
        (AgentId(0), DVec3::ZERO),
        (AgentId(1), DVec3::new(70.0, 0.0, 0.0)),
        (AgentId(2), DVec3::new(140.0, 0.0, 0.0)),
        (AgentId(3), DVec3::new(1_000.0, 0.0, 0.0)),
    ];
    let clusters = clustering::single_linkage(&agents, 80.0);
    assert_eq!(
        clusters,
        vec![vec![AgentId(0), AgentId(1), AgentId(2)], vec![AgentId(3)]]
    );
}

// ---- Removal ----

#[test]
fn test_zero_health_removes_agent_from_formation_and_arena() {
    let mut arena = quiet_arena();
    let mut host = Harness::empty();
    let [_, doomed, _] = spawn_trio(&mut arena);
    host.tick(&mut arena);

    arena.set_health(doomed, 0.0).unwrap();
    let snap = host.tick(&mut arena);

    assert_eq!(snap.agents.len(), 2);
    assert!(snap.agents.iter().all(|a| a.id != doomed));
    assert_eq!(snap.formations.len(), 1);
    assert_eq!(snap.formations[0].members.len(), 2);
    assert!(!snap.formations[0].members.contains(&doomed));
    assert_eq!(host.hub.unregistered, vec![doomed]);

    // Slots stay dense after the removal.
    let slots: Vec<Option<usize>> = snap.agents.iter().map(|a| a.slot).collect();
    assert_eq!(slots, vec![Some(0), Some(1)]);
}

#[test]
fn test_leader_loss_elects_highest_teamwork() {
    let mut arena = quiet_arena();
    let mut host = Harness::empty();
    let [leader, low, high] = spawn_trio(&mut arena);
    host.tick(&mut arena);

    arena.remove_agent(leader).unwrap();
    let snap = host.tick(&mut arena);

    assert_eq!(snap.formations[0].members, vec![high, low]);
}

#[test]
fn test_damage_accumulates_until_removal() {
    let mut arena = quiet_arena();
    let mut host = Harness::empty();
    let agent = arena.spawn_agent(ShipClass::Scout, DVec3::ZERO, None);
    let max = arena.population().hull(agent).unwrap().max_health;

    let left = arena.apply_damage(agent, max * 0.5).unwrap();
    assert!((left - max * 0.5).abs() < 1e-9);
    assert_eq!(host.tick(&mut arena).agents.len(), 1);

    arena.queue_command(ArenaCommand::ApplyDamage {
        agent,
        amount: max,
    });
    assert!(host.tick(&mut arena).agents.is_empty());
    assert!(!arena.population().contains(agent));
}

#[test]
fn test_clear_all_disposes_everything() {
    let mut arena = quiet_arena();
    let mut host = Harness::empty();
    let ids = spawn_trio(&mut arena);
    host.tick(&mut arena);

    arena.queue_command(ArenaCommand::ClearAll);
    let snap = host.tick(&mut arena);

    assert!(snap.agents.is_empty());
    assert!(snap.formations.is_empty());
    assert_eq!(host.hub.unregistered, ids.to_vec());
}

#[test]
fn test_unknown_ids_are_errors() {
    let mut arena = quiet_arena();
    assert!(matches!(
        arena.set_health(AgentId(99), 1.0),
        Err(ArenaError::UnknownAgent(AgentId(99)))
    ));
    assert!(matches!(
        arena.apply_damage(AgentId(99), 1.0),
        Err(ArenaError::UnknownAgent(_))
    ));
    assert!(matches!(
        arena.remove_agent(AgentId(99)),
        Err(ArenaError::UnknownAgent(_))
    ));
    assert!(matches!(
        arena.change_formation(FormationId(5), FormationShape::Box),
        Err(ArenaError::UnknownFormation(FormationId(5)))
    ));
}

#[test]
fn test_commands_with_unknown_ids_are_ignored() {
    let mut arena = quiet_arena();
    let mut host = Harness::empty();
    arena.spawn_agent(ShipClass::Fighter, DVec3::ZERO, None);
    arena.queue_commands([
        ArenaCommand::RemoveAgent { agent: AgentId(42) },
        ArenaCommand::SetHealth {
            agent: AgentId(42),
            health: 0.0,
        },
        ArenaCommand::ChangeFormation {
            formation: FormationId(3),
            shape: FormationShape::Helix,
        },
    ]);
    let snap = host.tick(&mut arena);
    assert_eq!(snap.agents.len(), 1);
}

// ---- Commands ----

#[test]
fn test_spawn_agent_command_uses_given_personality() {
    let mut arena = quiet_arena();
    let mut host = Harness::empty();
    arena.queue_command(ArenaCommand::SpawnAgent {
        class: ShipClass::Interceptor,
        position: DVec3::new(5.0, 5.0, 5.0),
        personality: Some(Personality::new(0.9, 0.1, 0.3)),
    });
    let snap = host.tick(&mut arena);

    assert_eq!(snap.agents.len(), 1);
    assert_eq!(snap.agents[0].class, ShipClass::Interceptor);
    let entity = arena.population().entity(snap.agents[0].id).unwrap();
    let pilot = arena
        .population()
        .world()
        .get::<&armada_core::components::Pilot>(entity)
        .map(|p| *p)
        .unwrap();
    assert_eq!(pilot.personality, Personality::new(0.9, 0.1, 0.3));
}

#[test]
fn test_change_formation_command() {
    let mut arena = quiet_arena();
    let mut host = Harness::empty();
    spawn_trio(&mut arena);
    let id = host.tick(&mut arena).formations[0].id;

    arena.queue_command(ArenaCommand::ChangeFormation {
        formation: id,
        shape: FormationShape::Line,
    });
    let snap = host.tick(&mut arena);
    assert_eq!(snap.formations[0].shape, FormationShape::Line);
}

#[test]
fn test_invalid_dt_runs_commands_only() {
    let mut arena = quiet_arena();
    let mut host = Harness::empty();
    arena.queue_command(ArenaCommand::SpawnAgent {
        class: ShipClass::Fighter,
        position: DVec3::ZERO,
        personality: None,
    });

    let snap = host.tick_dt(&mut arena, f64::NAN);
    assert_eq!(snap.agents.len(), 1);
    assert_eq!(snap.time.tick, 0);

    let snap = host.tick_dt(&mut arena, -1.0);
    assert_eq!(snap.time.tick, 0);
    assert_eq!(host.tick(&mut arena).time.tick, 1);
}

#[test]
fn test_remove_agent_command_takes_effect_at_cleanup() {
    let mut arena = quiet_arena();
    let mut host = Harness::empty();
    let agent = arena.spawn_agent(ShipClass::Fighter, DVec3::ZERO, None);

    arena.queue_command(ArenaCommand::RemoveAgent { agent });
    host.tick_dt(&mut arena, 0.0);
    assert!(arena.population().contains(agent));
    assert_eq!(arena.population().hull(agent).unwrap().health, 0.0);

    host.tick(&mut arena);
    assert!(!arena.population().contains(agent));
    assert_eq!(host.hub.unregistered, vec![agent]);
}

// ---- Spawning ----

#[test]
fn test_spawn_wave_lands_away_from_player_inside_bounds() {
    let mut arena = quiet_arena();
    let player = DVec3::new(100.0, 0.0, -50.0);
    let mut host = Harness::with_player(player);
    arena.queue_command(ArenaCommand::SpawnWave { count: 4 });

    let snap = host.tick_dt(&mut arena, 1e-6);
    assert_eq!(snap.agents.len(), 4);
    let bounds = arena.config().bounds;
    for agent in &snap.agents {
        assert!(bounds.contains(agent.position));
        let distance = agent.position.distance(player);
        assert!(
            (580.0..=920.0).contains(&distance),
            "spawned {distance} from the player"
        );
    }
}

#[test]
fn test_population_cap_is_respected() {
    let config = ArenaConfig {
        spawn: SpawnConfig {
            base_max_population: 6,
            base_interval_secs: 0.1,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut arena = Orchestrator::new(config).unwrap();
    let mut host = Harness::with_player(DVec3::ZERO);

    let mut last = 0;
    for _ in 0..90 {
        last = host.tick(&mut arena).agents.len();
        assert!(last <= 6, "population {last} exceeds the cap");
    }
    assert_eq!(last, 6);
}

#[test]
fn test_difficulty_raises_population_cap() {
    let config = ArenaConfig {
        spawn: SpawnConfig {
            base_max_population: 6,
            base_interval_secs: 0.1,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut arena = Orchestrator::new(config).unwrap();
    let mut host = Harness::with_player(DVec3::ZERO);
    host.difficulty = FixedDifficulty::new(3);

    let mut last = 0;
    for _ in 0..120 {
        let snap = host.tick(&mut arena);
        assert_eq!(snap.difficulty_level, 3);
        last = snap.agents.len();
        assert!(last <= 9);
    }
    assert_eq!(last, 9);
}

#[test]
fn test_no_automatic_spawn_without_player() {
    let config = ArenaConfig {
        spawn: SpawnConfig {
            base_interval_secs: 0.1,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut arena = Orchestrator::new(config).unwrap();
    let mut host = Harness::empty();
    for _ in 0..30 {
        assert!(host.tick(&mut arena).agents.is_empty());
    }
}

#[test]
fn test_wave_grid_is_centered_and_spaced() {
    let center = DVec3::new(10.0, 5.0, -3.0);
    let grid = world_setup::wave_grid(center, 4, 20.0);
    assert_eq!(grid.len(), 4);

    let mean = grid.iter().copied().sum::<DVec3>() / 4.0;
    assert!(mean.distance(center) < 1e-9);
    for (i, a) in grid.iter().enumerate() {
        for b in &grid[i + 1..] {
            assert!(a.distance(*b) >= 20.0 - 1e-9);
        }
    }
    assert!(world_setup::wave_grid(center, 0, 20.0).is_empty());
}

#[test]
fn test_class_weights_follow_level() {
    assert_eq!(world_setup::class_weights(0), [4, 5, 0, 0]);
    assert_eq!(world_setup::class_weights(1), [4, 5, 1, 2]);
    assert_eq!(world_setup::class_weights(10), [4, 5, 5, 6]);

    let mut rng = ChaCha8Rng::seed_from_u64(3);
    for _ in 0..200 {
        let class = world_setup::roll_class(&mut rng, 0);
        assert!(matches!(class, ShipClass::Scout | ShipClass::Fighter));
    }
}

// ---- Combat wiring ----

#[test]
fn test_sighting_player_reaches_hub_and_weapons() {
    let mut arena = quiet_arena();
    let mut host = Harness::with_player(DVec3::new(0.0, 0.0, 100.0));
    let agent = arena.spawn_agent(ShipClass::Fighter, DVec3::ZERO, personality(0.5));

    let snap = host.tick(&mut arena);
    assert_eq!(snap.agents[0].state, BehaviorState::Attack);
    assert_eq!(snap.agents[0].target, Some(PLAYER));
    assert!(host
        .hub
        .messages
        .iter()
        .any(|m| m.kind == MessageKind::TargetSighted && m.sender == agent));

    for _ in 0..5 {
        host.tick(&mut arena);
    }
    assert!(host.weapons.shots.contains(&(agent, PLAYER)));
}

#[test]
fn test_vanished_contact_clears_target() {
    let mut arena = quiet_arena();
    let mut host = Harness::with_player(DVec3::new(0.0, 0.0, 100.0));
    arena.spawn_agent(ShipClass::Fighter, DVec3::ZERO, None);
    host.tick(&mut arena);

    host.contacts.clear();
    let snap = host.tick(&mut arena);
    assert_eq!(snap.agents[0].target, None);
    assert_eq!(snap.agents[0].state, BehaviorState::Pursue);
}

#[test]
fn test_formation_gets_tactic_once_formed() {
    let mut arena = quiet_arena();
    let mut host = Harness::with_player(DVec3::new(0.0, 0.0, 500.0));
    spawn_trio(&mut arena);
    host.tick(&mut arena);

    let formation = arena.population().formations().next().map(|f| f.id()).unwrap();
    let snap = host.tick(&mut arena);

    assert!(snap.tactics.iter().any(|t| t.formation == Some(formation)));
    assert!(arena.coordinator().history_len() >= 2);
}

#[test]
fn test_tactical_orders_do_not_end_flee() {
    let mut arena = quiet_arena();
    let mut host = Harness::with_player(DVec3::new(0.0, 0.0, 200.0));
    let hurt = arena.spawn_agent(
        ShipClass::Fighter,
        DVec3::ZERO,
        Some(Personality::new(0.5, 0.9, 0.5)),
    );
    let healthy = arena.spawn_agent(ShipClass::Fighter, DVec3::new(40.0, 0.0, 0.0), personality(0.5));
    let max_health = arena.population().hull(hurt).unwrap().max_health;
    arena.set_health(hurt, max_health * 0.2).unwrap();

    let mut states = Vec::new();
    for _ in 0..300 {
        let snap = host.tick(&mut arena);
        let view = snap.agents.iter().find(|a| a.id == hurt).unwrap();
        if states.last() != Some(&view.state) {
            states.push(view.state);
        }
    }

    assert!(states.contains(&BehaviorState::Flee), "states: {states:?}");
    // Health never recovers, so Flee may only end in Patrol.
    assert!(
        !states
            .windows(2)
            .any(|w| w == [BehaviorState::Flee, BehaviorState::Attack]),
        "states: {states:?}"
    );
    let escorts = host
        .hub
        .messages
        .iter()
        .filter(|m| m.kind == MessageKind::RequestEscort && m.sender == hurt)
        .count();
    let flee_entries = states.iter().filter(|s| **s == BehaviorState::Flee).count();
    assert!(escorts <= flee_entries);
    assert!(arena.population().contains(healthy));
}

// ---- Bounds ----

#[test]
fn test_bounds_push_back_and_hard_clamp() {
    let config = ArenaConfig {
        bounds: WorldBounds {
            center: DVec3::ZERO,
            radius: 100.0,
        },
        ..Default::default()
    };
    let mut world = World::new();
    let drifting = world.spawn((Kinematics::at(DVec3::new(110.0, 0.0, 0.0)),));
    let escaped = world.spawn((Kinematics {
        position: DVec3::new(0.0, 500.0, 0.0),
        velocity: DVec3::new(0.0, 50.0, 10.0),
        ..Default::default()
    },));

    bounds::run(&mut world, 0.5, &config);

    let kin = *world.get::<&Kinematics>(drifting).unwrap();
    assert_eq!(kin.position, DVec3::new(110.0, 0.0, 0.0));
    assert!(kin.velocity.x < 0.0, "pushed inward");

    let kin = *world.get::<&Kinematics>(escaped).unwrap();
    let hard = 100.0 * config.boundary_hard_factor;
    assert!((kin.position.length() - hard).abs() < 1e-9);
    assert!(kin.velocity.y <= 0.0, "outward velocity removed");
    assert_eq!(kin.velocity.z, 10.0);
}

#[test]
fn test_agents_stay_within_hard_bounds() {
    let config = ArenaConfig {
        bounds: WorldBounds {
            center: DVec3::ZERO,
            radius: 300.0,
        },
        ..quiet_config()
    };
    let mut arena = Orchestrator::new(config).unwrap();
    let mut host = Harness::with_player(DVec3::new(0.0, 0.0, 280.0));
    arena.queue_command(ArenaCommand::SpawnWave { count: 5 });

    let hard = 300.0 * config.boundary_hard_factor + 1e-6;
    for _ in 0..300 {
        let snap = host.tick(&mut arena);
        assert!(snap.agents.iter().all(|a| a.position.length() <= hard));
    }
}

// ---- Configuration ----

#[test]
fn test_from_json_partial_config() {
    let arena = Orchestrator::from_json(r#"{ "seed": 9, "spawn": { "enabled": false } }"#).unwrap();
    assert_eq!(arena.config().seed, 9);
    assert!(!arena.config().spawn.enabled);
    assert_eq!(
        arena.config().spawn.base_max_population,
        SpawnConfig::default().base_max_population
    );
}

#[test]
fn test_config_json_round_trip() {
    let config = ArenaConfig {
        seed: 77,
        ..quiet_config()
    };
    let json = serde_json::to_string(&config).unwrap();
    let arena = Orchestrator::from_json(&json).unwrap();
    let back = arena.config();
    assert_eq!(back.seed, 77);
    assert_eq!(back.spawn, config.spawn);
    assert_eq!(back.bounds, config.bounds);
    assert_eq!(back.formation.max_size, config.formation.max_size);
    assert!((back.formation.helix_step_angle - config.formation.helix_step_angle).abs() < 1e-12);
}

#[test]
fn test_invalid_config_is_rejected() {
    let result = Orchestrator::from_json(r#"{ "bounds": { "center": [0.0, 0.0, 0.0], "radius": -1.0 } }"#);
    assert!(matches!(
        result,
        Err(ArenaError::Config(ConfigError::NotPositive {
            field: "bounds.radius",
            ..
        }))
    ));

    assert!(matches!(
        Orchestrator::from_json("{ not json"),
        Err(ArenaError::Json(_))
    ));
}
