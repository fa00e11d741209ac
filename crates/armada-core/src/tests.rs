#[cfg(test)]
mod tests {
    use glam::DVec3;

    use crate::commands::ArenaCommand;
    use crate::components::{Hull, Kinematics};
    use crate::config::{ArenaConfig, ConfigError};
    use crate::enums::*;
    use crate::events::{Message, MessagePayload, Outbox};
    use crate::state::ArenaSnapshot;
    use crate::types::*;

    fn assert_orthonormal(basis: &Basis) {
        assert!((basis.forward.length() - 1.0).abs() < 1e-9);
        assert!((basis.right.length() - 1.0).abs() < 1e-9);
        assert!((basis.up.length() - 1.0).abs() < 1e-9);
        assert!(basis.forward.dot(basis.right).abs() < 1e-9);
        assert!(basis.forward.dot(basis.up).abs() < 1e-9);
        assert!(basis.right.dot(basis.up).abs() < 1e-9);
    }

    // ---- Basis ----

    #[test]
    fn test_basis_default_is_right_handed() {
        let basis = Basis::default();
        assert_orthonormal(&basis);
        assert_eq!(basis.right.cross(basis.up), basis.forward);
    }

    #[test]
    fn test_basis_from_forward_matches_default_for_z() {
        assert_eq!(Basis::from_forward(DVec3::new(0.0, 0.0, 5.0)), Basis::default());
    }

    #[test]
    fn test_basis_from_forward_arbitrary() {
        let basis = Basis::from_forward(DVec3::new(3.0, -1.0, 2.0));
        assert_orthonormal(&basis);
        assert!(basis.up.y > 0.0, "up should stay on the sky side");
    }

    #[test]
    fn test_basis_from_vertical_forward() {
        let basis = Basis::from_forward(DVec3::Y);
        assert_orthonormal(&basis);
        assert_eq!(basis.forward, DVec3::Y);
    }

    #[test]
    fn test_basis_from_zero_falls_back() {
        assert_eq!(Basis::from_forward(DVec3::ZERO), Basis::default());
    }

    #[test]
    fn test_basis_to_world() {
        let basis = Basis::default();
        let world = basis.to_world(DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(world, DVec3::new(1.0, 2.0, 3.0));

        let turned = Basis::from_forward(DVec3::X);
        let ahead = turned.to_world(DVec3::new(0.0, 0.0, 10.0));
        assert!((ahead - DVec3::new(10.0, 0.0, 0.0)).length() < 1e-9);
    }

    // ---- Bounds, hull, kinematics ----

    #[test]
    fn test_world_bounds_clamp() {
        let bounds = WorldBounds {
            center: DVec3::new(10.0, 0.0, 0.0),
            radius: 100.0,
        };
        let inside = DVec3::new(50.0, 0.0, 0.0);
        assert_eq!(bounds.clamp(inside), inside);
        assert!(bounds.contains(inside));

        let outside = DVec3::new(10.0, 300.0, 0.0);
        assert!(!bounds.contains(outside));
        let clamped = bounds.clamp(outside);
        assert!((clamped - DVec3::new(10.0, 100.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn test_hull_ratio() {
        let mut hull = Hull::new(200.0);
        assert_eq!(hull.ratio(), 1.0);
        hull.health = 50.0;
        assert_eq!(hull.ratio(), 0.25);
        hull.health = -10.0;
        assert_eq!(hull.ratio(), 0.0);
        assert!(hull.is_destroyed());
    }

    #[test]
    fn test_kinematics_keeps_basis_when_stationary() {
        let mut kin = Kinematics::at(DVec3::ZERO);
        kin.velocity = DVec3::new(0.0, 0.0, -20.0);
        kin.align_to_velocity();
        assert_eq!(kin.basis.forward, DVec3::NEG_Z);

        kin.velocity = DVec3::ZERO;
        kin.align_to_velocity();
        assert_eq!(kin.basis.forward, DVec3::NEG_Z);
    }

    #[test]
    fn test_personality_is_clamped() {
        let p = Personality::new(1.5, -0.2, 0.4);
        assert_eq!(p.aggressiveness, 1.0);
        assert_eq!(p.caution, 0.0);
        assert_eq!(p.teamwork, 0.4);
    }

    #[test]
    fn test_sim_time_advance() {
        let mut time = SimTime::default();
        time.advance(0.5);
        time.advance(0.25);
        assert_eq!(time.tick, 2);
        assert_eq!(time.elapsed_secs, 0.75);
    }

    // ---- Outbox ----

    #[test]
    fn test_outbox_drains_in_order() {
        let mut outbox = Outbox::default();
        outbox.push(Message::new(
            MessageKind::TargetSighted,
            AgentId(1),
            DVec3::ZERO,
            MessagePayload::Target { target: TargetId(7) },
        ));
        outbox.push(Message::new(
            MessageKind::RequestEscort,
            AgentId(2),
            DVec3::ONE,
            MessagePayload::Escort { threat: None },
        ));
        assert_eq!(outbox.len(), 2);

        let drained = outbox.drain();
        assert!(outbox.is_empty());
        assert_eq!(drained[0].sender, AgentId(1));
        assert_eq!(drained[1].kind, MessageKind::RequestEscort);
    }

    // ---- Config ----

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(ArenaConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_partial_json_config_inherits_defaults() {
        let json = r#"{ "seed": 7, "formation": { "spacing": 45.0 } }"#;
        let config: ArenaConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.formation.spacing, 45.0);
        assert_eq!(
            config.formation.slot_tolerance,
            ArenaConfig::default().formation.slot_tolerance
        );
        assert_eq!(config.navigator, ArenaConfig::default().navigator);
    }

    #[test]
    fn test_config_rejects_inverted_scale_bounds() {
        let mut config = ArenaConfig::default();
        config.formation.scale_min = 2.0;
        config.formation.scale_max = 1.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvertedScaleBounds { min: 2.0, max: 1.0 })
        );
    }

    #[test]
    fn test_config_rejects_zero_spacing() {
        let mut config = ArenaConfig::default();
        config.navigator.waypoint_spacing = 0.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NotPositive {
                field: "navigator.waypoint_spacing",
                ..
            }
        ));
        assert!(err.to_string().contains("waypoint_spacing"));
    }

    #[test]
    fn test_config_rejects_tiny_clusters() {
        let mut config = ArenaConfig::default();
        config.min_cluster_size = 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooSmall { field: "min_cluster_size", .. })
        ));
    }

    // ---- Serde ----

    #[test]
    fn test_command_json_shape() {
        let cmd = ArenaCommand::SetHealth {
            agent: AgentId(3),
            health: 0.0,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"type\":\"SetHealth\""));
        let back: ArenaCommand = serde_json::from_str(&json).unwrap();
        assert!(matches!(
            back,
            ArenaCommand::SetHealth { agent: AgentId(3), .. }
        ));
    }

    #[test]
    fn test_empty_snapshot_serializes() {
        let snapshot = ArenaSnapshot::default();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: ArenaSnapshot = serde_json::from_str(&json).unwrap();
        assert!(back.agents.is_empty());
        assert_eq!(back.time.tick, 0);
    }
}
