//! Unit tests for retailsim-agents.

#[cfg(test)]
mod persona_tests {
    use crate::persona::PersonaTable;
    use retailsim_core::SimRng;

    #[test]
    fn pick_distribution_roughly_matches_weights() {
        let table = PersonaTable::default();
        let (mut rng, _) = SimRng::new(Some(42));
        let mut fast_buyer = 0;
        let n = 4000;
        for _ in 0..n {
            if table.pick(&mut rng) == crate::persona::Persona::FastBuyer {
                fast_buyer += 1;
            }
        }
        let frac = fast_buyer as f32 / n as f32;
        assert!((frac - 0.3).abs() < 0.05, "fast_buyer fraction was {frac}");
    }

    #[test]
    fn pick_falls_back_to_browser_when_table_is_zeroed() {
        let mut table = PersonaTable::default();
        table.fast_buyer.probability = 0.0;
        table.browser.probability = 0.0;
        table.family.probability = 0.0;
        table.staff.probability = 0.0;
        let (mut rng, _) = SimRng::new(Some(1));
        assert_eq!(table.pick(&mut rng), crate::persona::Persona::Browser);
    }

    #[test]
    fn sampled_num_stops_stays_in_range() {
        let table = PersonaTable::default();
        let (mut rng, _) = SimRng::new(Some(9));
        let cfg = table.config(crate::persona::Persona::Family);
        for _ in 0..200 {
            let stops = cfg.sample_num_stops(&mut rng);
            assert!(stops >= cfg.stops.0 && stops <= cfg.stops.1);
        }
    }
}

#[cfg(test)]
mod antiglitch_tests {
    use crate::antiglitch::{AntiGlitch, RecoveryAction};
    use retailsim_core::{AgentId, AgentRng, ShopperState, Vector2};
    use retailsim_nav::NavGrid;

    fn empty_world() -> NavGrid {
        NavGrid::build(20.0, 20.0, 0.5, 0.5, &[], &[]).unwrap()
    }

    #[test]
    fn a_stationary_agent_eventually_escalates_past_a_nudge() {
        let grid = empty_world();
        let mut rng = AgentRng::new(7, AgentId(1));
        let mut ag = AntiGlitch::default();
        let pos = Vector2::new(5.0, 5.0);

        let mut saw_nudge = false;
        let mut saw_stronger = false;
        for _ in 0..60 {
            let action = ag.evaluate(
                pos,
                Vector2::ZERO,
                0.5,
                &grid,
                &mut rng,
                ShopperState::Browsing,
                None,
                false,
            );
            match action {
                RecoveryAction::Nudge(_) => saw_nudge = true,
                RecoveryAction::NudgeReplan { .. } | RecoveryAction::Warp(_) | RecoveryAction::ResetPath => {
                    saw_stronger = true;
                }
                RecoveryAction::None => {}
            }
        }
        assert!(saw_nudge, "expected at least one Nudge recovery action");
        assert!(saw_stronger, "expected escalation past a plain nudge");
    }

    #[test]
    fn a_moving_agent_never_triggers_recovery() {
        let grid = empty_world();
        let mut rng = AgentRng::new(3, AgentId(2));
        let mut ag = AntiGlitch::default();
        let mut pos = Vector2::new(2.0, 2.0);
        for _ in 0..40 {
            let vel = Vector2::new(1.0, 0.0);
            pos += vel.scale(0.5);
            let action = ag.evaluate(pos, vel, 0.5, &grid, &mut rng, ShopperState::Browsing, None, false);
            assert_eq!(action, RecoveryAction::None);
        }
    }
}

#[cfg(test)]
mod shopper_tests {
    use crate::config::ShopperConfig;
    use crate::persona::PersonaTable;
    use crate::shopper::{Shopper, ShopperContext};
    use retailsim_core::{AgentId, ShopperState, SimRng, Vector2};
    use retailsim_nav::{AStar, GateManager, NavGrid};
    use retailsim_queue::QueueManager;

    fn empty_world() -> NavGrid {
        NavGrid::build(20.0, 20.0, 0.5, 0.5, &[], &[]).unwrap()
    }

    /// A persona table with every probability collapsed onto `fast_buyer`
    /// and its ranges narrowed so test runs are fast and deterministic in
    /// shape (exact draws still vary with the seed, not in structure).
    fn quick_persona(checkout_probability: f64) -> PersonaTable {
        let mut table = PersonaTable::default();
        table.fast_buyer.probability = 1.0;
        table.fast_buyer.stops = (0, 0);
        table.fast_buyer.speed = (1.0, 1.01);
        table.fast_buyer.stay_minutes = (0.001, 0.002);
        table.fast_buyer.checkout_probability = checkout_probability;
        table.browser.probability = 0.0;
        table.family.probability = 0.0;
        table.staff.probability = 0.0;
        table
    }

    #[allow(clippy::too_many_arguments)]
    fn run_ticks(
        shopper: &mut Shopper,
        grid: &NavGrid,
        astar: &AStar,
        gates: &GateManager,
        queue: &mut QueueManager,
        sim_rng: &mut SimRng,
        config: &ShopperConfig,
        dt: f32,
        max_iters: usize,
    ) {
        for _ in 0..max_iters {
            if shopper.is_done() {
                return;
            }
            let mut ctx = ShopperContext {
                grid,
                astar,
                gates,
                queue,
                sim_rng,
                config,
                neighbors: &[],
            };
            shopper.update(dt, &mut ctx);
        }
    }

    #[test]
    fn spawn_delay_expires_into_entering() {
        let grid = empty_world();
        let astar = AStar::new(true);
        let gates = GateManager::new();
        let mut queue = QueueManager::new(&[], Vector2::new(10.0, 0.5));
        let config = ShopperConfig::default();
        let table = quick_persona(0.0);
        let (mut sim_rng, _) = SimRng::new(Some(5));

        let mut shopper = Shopper::spawn(
            AgentId(1),
            grid.entrance_pos,
            &table,
            &config,
            11,
            &mut sim_rng,
        );
        assert_eq!(shopper.state, ShopperState::Spawn);

        run_ticks(&mut shopper, &grid, &astar, &gates, &mut queue, &mut sim_rng, &config, 0.1, 50);
        assert_ne!(shopper.state, ShopperState::Spawn);
    }

    #[test]
    fn shopper_without_checkout_intent_exits_without_queueing() {
        let grid = empty_world();
        let astar = AStar::new(true);
        let gates = GateManager::new();
        let mut queue = QueueManager::new(&[], Vector2::new(10.0, 0.5));
        let config = ShopperConfig::default();
        let table = quick_persona(0.0);
        let (mut sim_rng, _) = SimRng::new(Some(21));

        let mut shopper = Shopper::spawn(
            AgentId(1),
            grid.entrance_pos,
            &table,
            &config,
            22,
            &mut sim_rng,
        );

        run_ticks(&mut shopper, &grid, &astar, &gates, &mut queue, &mut sim_rng, &config, 0.1, 5000);
        assert!(shopper.is_done(), "shopper never reached DONE, stuck in {:?}", shopper.state);
        assert!(shopper.queue_lane.is_none());
    }

    #[test]
    fn shopper_with_checkout_intent_completes_full_queue_flow() {
        let grid = empty_world();
        let astar = AStar::new(true);
        let gates = GateManager::new();
        let mut queue = QueueManager::new(&[Vector2::new(10.0, 9.0)], Vector2::new(10.0, 0.5));
        queue.set_lane_open(retailsim_core::LaneId(0), true);
        let config = ShopperConfig::default();
        let table = quick_persona(1.0);
        let (mut sim_rng, _) = SimRng::new(Some(99));

        let mut shopper = Shopper::spawn(
            AgentId(1),
            grid.entrance_pos,
            &table,
            &config,
            100,
            &mut sim_rng,
        );

        run_ticks(&mut shopper, &grid, &astar, &gates, &mut queue, &mut sim_rng, &config, 0.1, 8000);
        assert!(shopper.is_done(), "shopper never reached DONE, stuck in {:?}", shopper.state);
    }
}

#[cfg(test)]
mod cashier_tests {
    use crate::cashier::{Cashier, ManualCommand};
    use crate::config::CashierConfig;
    use retailsim_core::{AgentId, CashierState, LaneId, Vector2};

    fn run_until<F: Fn(&Cashier) -> bool>(cashier: &mut Cashier, dt: f32, max_iters: usize, lane_occupied: bool, done: F) {
        for _ in 0..max_iters {
            if done(cashier) {
                return;
            }
            cashier.update(dt, lane_occupied);
        }
    }

    #[test]
    fn cashier_walks_to_anchor_then_starts_working() {
        let config = CashierConfig::default();
        let mut cashier = Cashier::spawn(AgentId(1), LaneId(0), Vector2::new(10.0, 9.0), &config, 5);
        assert_eq!(cashier.state, CashierState::Arrive);

        run_until(&mut cashier, 0.1, 2000, false, |c| c.state == CashierState::Working);
        assert_eq!(cashier.state, CashierState::Working);
    }

    #[test]
    fn lane_opens_after_sustained_time_in_service_area() {
        let config = CashierConfig::default();
        let mut cashier = Cashier::spawn(AgentId(2), LaneId(0), Vector2::new(10.0, 9.0), &config, 6);
        run_until(&mut cashier, 0.1, 2000, false, |c| c.state == CashierState::Working);
        assert!(!cashier.is_open());

        for _ in 0..1300 {
            cashier.update(0.1, true);
            if cashier.state != CashierState::Working {
                break;
            }
        }
        assert!(cashier.is_open(), "lane never opened after 130s of working");
    }

    #[test]
    fn manual_close_while_working_waits_for_lane_to_clear_then_leaves() {
        let config = CashierConfig::default();
        let mut cashier = Cashier::spawn(AgentId(3), LaneId(0), Vector2::new(10.0, 9.0), &config, 7);
        run_until(&mut cashier, 0.1, 2000, false, |c| c.state == CashierState::Working);

        cashier.handle_command(ManualCommand::Close).unwrap();
        // Lane still occupied: cashier must keep working, not leave yet.
        for _ in 0..20 {
            cashier.update(0.1, true);
        }
        assert_eq!(cashier.state, CashierState::Working);

        run_until(&mut cashier, 0.1, 3000, false, |c| c.state == CashierState::Done);
        assert_eq!(cashier.state, CashierState::Done);
    }

    #[test]
    fn manual_command_rejected_in_wrong_state() {
        let config = CashierConfig::default();
        let mut cashier = Cashier::spawn(AgentId(4), LaneId(0), Vector2::new(10.0, 9.0), &config, 8);
        // Fresh cashier is ARRIVE; OPEN only makes sense from OFFSHIFT/DONE/LEAVE/BREAK.
        assert!(cashier.handle_command(ManualCommand::Open).is_err());
    }

    #[test]
    fn manual_open_from_off_shift_sends_cashier_back_to_arrive() {
        let config = CashierConfig::default();
        let mut cashier = Cashier::spawn(AgentId(5), LaneId(0), Vector2::new(10.0, 9.0), &config, 9);
        cashier.state = CashierState::OffShift;
        cashier.handle_command(ManualCommand::Open).unwrap();
        assert_eq!(cashier.state, CashierState::Arrive);
    }
}
