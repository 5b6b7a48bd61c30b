//! Scenario tests covering the end-to-end flows in `spec.md` §8.

#[cfg(test)]
mod scenarios {
    use retailsim_agents::PersonaTable;
    use retailsim_core::ShopperState;
    use retailsim_nav::scene::{Roi, SceneObject};
    use retailsim_core::Vector2;

    use crate::config::SimulatorConfig;
    use crate::lanestate::{DesiredState, LaneRef};
    use crate::simulator::Simulator;

    fn forced_persona(checkout_probability: f64) -> PersonaTable {
        let mut table = PersonaTable::default();
        table.fast_buyer.probability = 1.0;
        table.fast_buyer.stops = (1, 1);
        table.fast_buyer.speed = (1.2, 1.3);
        table.fast_buyer.stay_minutes = (0.02, 0.03); // ~1.2-1.8s
        table.fast_buyer.checkout_probability = checkout_probability;
        table.browser.probability = 0.0;
        table.family.probability = 0.0;
        table.staff.probability = 0.0;
        table
    }

    fn checkout_scene() -> (Vec<SceneObject>, Vec<Roi>) {
        let objects = vec![SceneObject {
            name: "register-1".into(),
            kind: "checkout".into(),
            position: Vector2::new(10.0, 7.0),
            scale: Vector2::new(0.8, 0.8),
            rotation_y: 0.0,
        }];
        let rois = vec![
            Roi {
                name: "Checkout 1 - Queue".into(),
                vertices: vec![
                    Vector2::new(9.0, 8.0),
                    Vector2::new(11.0, 8.0),
                    Vector2::new(11.0, 10.0),
                    Vector2::new(9.0, 10.0),
                ],
            },
            Roi {
                name: "Checkout 1 - Service".into(),
                vertices: vec![
                    Vector2::new(9.0, 6.0),
                    Vector2::new(11.0, 6.0),
                    Vector2::new(11.0, 8.0),
                    Vector2::new(9.0, 8.0),
                ],
            },
        ];
        (objects, rois)
    }

    /// Scenario 1: single shopper, empty store, will_checkout=false.
    #[test]
    fn single_shopper_without_checkout_exits_within_30s() {
        let config = SimulatorConfig {
            personas: forced_persona(0.0),
            auto_spawn_cashiers: false,
            seed: Some(42),
            ..SimulatorConfig::default()
        };
        let mut sim = Simulator::init_from_scene(config, &[], &[]).unwrap();
        sim.spawn_agent().unwrap();

        for _ in 0..300 {
            sim.update(0.1);
            if sim.get_diagnostics().total_exited == 1 {
                break;
            }
        }

        let diag = sim.get_diagnostics();
        assert_eq!(diag.total_exited, 1);
        assert_eq!(diag.live_shoppers, 0);
    }

    /// Scenario 2: shopper + one cashier, full checkout flow.
    #[test]
    fn shopper_with_checkout_completes_full_queue_flow() {
        let (objects, rois) = checkout_scene();
        let config = SimulatorConfig {
            personas: forced_persona(1.0),
            seed: Some(7),
            ..SimulatorConfig::default()
        };
        let mut sim = Simulator::init_from_scene(config, &objects, &rois).unwrap();
        assert_eq!(sim.cashiers().len(), 1);
        sim.spawn_agent().unwrap();

        let mut saw_service = false;
        for _ in 0..8000 {
            sim.update(0.1);
            if sim.shoppers().iter().any(|s| s.state == ShopperState::Service) {
                saw_service = true;
            }
            if sim.get_diagnostics().total_exited == 1 {
                break;
            }
        }

        assert!(saw_service, "shopper never reached SERVICE");
        assert_eq!(sim.get_diagnostics().total_exited, 1);
    }

    /// A shopper crossing WalkingToQueue -> InQueue records a queue-entry
    /// event, which feeds `LaneMetrics::inflow_rate` (`spec.md` §4.8).
    #[test]
    fn reaching_in_queue_drives_lane_metrics_inflow_rate() {
        let (objects, rois) = checkout_scene();
        let config = SimulatorConfig {
            personas: forced_persona(1.0),
            seed: Some(13),
            ..SimulatorConfig::default()
        };
        let mut sim = Simulator::init_from_scene(config, &objects, &rois).unwrap();
        sim.spawn_agent().unwrap();

        let mut saw_nonzero_inflow = false;
        for _ in 0..8000 {
            sim.update(0.1);
            if sim.lane_metrics().inflow_rate > 0.0 {
                saw_nonzero_inflow = true;
                break;
            }
        }

        assert!(saw_nonzero_inflow, "queue entry never registered in lane metrics");
    }

    /// Scenario 3: two shoppers contend for one lane; never both in service.
    #[test]
    fn two_shoppers_never_share_a_service_slot() {
        let (objects, rois) = checkout_scene();
        let config = SimulatorConfig {
            personas: forced_persona(1.0),
            seed: Some(11),
            ..SimulatorConfig::default()
        };
        let mut sim = Simulator::init_from_scene(config, &objects, &rois).unwrap();
        sim.spawn_agent().unwrap();
        sim.spawn_agent().unwrap();

        for _ in 0..12000 {
            sim.update(0.1);
            let in_service = sim
                .shoppers()
                .iter()
                .filter(|s| s.state == ShopperState::Service)
                .count();
            assert!(in_service <= 1, "two shoppers occupied SERVICE simultaneously");
            if sim.get_diagnostics().total_exited == 2 {
                break;
            }
        }

        assert_eq!(sim.get_diagnostics().total_exited, 2);
    }

    /// Scenario 6: manual lane close while a shopper is mid-service.
    #[test]
    fn manual_lane_close_waits_for_in_flight_service_then_closes() {
        let (objects, rois) = checkout_scene();
        let config = SimulatorConfig {
            personas: forced_persona(1.0),
            seed: Some(5),
            ..SimulatorConfig::default()
        };
        let mut sim = Simulator::init_from_scene(config, &objects, &rois).unwrap();
        sim.spawn_agent().unwrap();

        // Run until the shopper reaches SERVICE, then issue the close.
        let mut closed_while_serving = false;
        for _ in 0..8000 {
            sim.update(0.1);
            if !closed_while_serving
                && sim.shoppers().iter().any(|s| s.state == ShopperState::Service)
            {
                let outcome = sim
                    .set_lane_state(LaneRef::DisplayIndex(1), DesiredState::Closed)
                    .unwrap();
                assert!(!outcome, "first close request should not be idempotent");
                closed_while_serving = true;
            }
            if closed_while_serving && sim.get_diagnostics().total_exited == 1 {
                break;
            }
        }

        assert!(closed_while_serving);
        assert_eq!(sim.get_diagnostics().total_exited, 1);

        // The cashier must leave after finishing the in-flight service.
        let mut cashier_left = false;
        for _ in 0..3000 {
            sim.update(0.1);
            if sim.cashiers()[0].state == retailsim_core::CashierState::Done
                || sim.cashiers()[0].state == retailsim_core::CashierState::Leave
            {
                cashier_left = true;
                break;
            }
        }
        assert!(cashier_left, "cashier never left after manual close");
    }

    #[test]
    fn spawn_agent_respects_max_occupancy() {
        let config = SimulatorConfig {
            personas: forced_persona(0.0),
            auto_spawn_cashiers: false,
            max_occupancy: 1,
            seed: Some(3),
            ..SimulatorConfig::default()
        };
        let mut sim = Simulator::init_from_scene(config, &[], &[]).unwrap();
        assert!(sim.spawn_agent().is_some());
        assert!(sim.spawn_agent().is_none());
    }

    #[test]
    fn empty_scene_has_no_lanes_and_shoppers_skip_queueing() {
        let config = SimulatorConfig {
            personas: forced_persona(1.0),
            auto_spawn_cashiers: false,
            seed: Some(9),
            ..SimulatorConfig::default()
        };
        let mut sim = Simulator::init_from_scene(config, &[], &[]).unwrap();
        sim.spawn_agent().unwrap();
        for _ in 0..300 {
            sim.update(0.1);
            if sim.get_diagnostics().total_exited == 1 {
                break;
            }
        }
        assert_eq!(sim.get_diagnostics().total_exited, 1);
    }
}
