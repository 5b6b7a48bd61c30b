//! `Simulator` — owns every subsystem and drives the per-tick update loop
//! (`spec.md` §4.10).

use tracing::{debug, warn};

use retailsim_agents::{Cashier, ManualCommand, Shopper, ShopperContext};
use retailsim_core::{AgentId, SimClock, SimRng, Vector2};
use retailsim_nav::{AStar, GateManager, NavGrid};
use retailsim_nav::scene::{Roi, SceneObject};
use retailsim_queue::QueueManager;

use crate::config::SimulatorConfig;
use crate::diagnostics::{Diagnostics, GateViolation, SafeWaypointBucketSizes};
use crate::error::SimResult;
use crate::idconfusion::IDConfusion;
use crate::lanestate::{DesiredState, LaneMetrics, LaneRef, LaneStateController};
use crate::track::{self, TrackMessage};

/// How long a gate-violation entry survives in the diagnostics ring before
/// housekeeping trims it (`spec.md` §7: "trimmed to last 60 s periodically").
const GATE_VIOLATION_RETENTION_SECS: f64 = 60.0;

/// Owns `NavGrid`, `AStar`, `GateManager`, `QueueManager`, every live
/// `Shopper`/`Cashier`, the `LaneStateController`, `IDConfusion`, and the
/// single seeded `SimRng` — equivalent to `dt_sim::Sim<B, R>` in the teacher
/// workspace, generalized from its backend-generic design to one concrete
/// venue-simulation backend since there is only ever one kind of "world"
/// here.
pub struct Simulator {
    config: SimulatorConfig,
    grid: NavGrid,
    astar: AStar,
    gates: GateManager,
    queue: QueueManager,
    lane_state: LaneStateController,
    id_confusion: IDConfusion,

    shoppers: Vec<Shopper>,
    cashiers: Vec<Cashier>,

    sim_rng: SimRng,
    global_seed: u64,
    clock: SimClock,
    next_agent_id: u32,

    total_spawned: u64,
    total_exited: u64,
    recent_gate_violations: Vec<GateViolation>,
    heatmap: Option<Vec<f32>>,
    lane_metrics: LaneMetrics,
}

impl Simulator {
    /// Build a fresh simulator from a scene. Constructs the RNG from
    /// `config.seed` (or a randomly chosen one if `None`), builds the grid,
    /// gates, and queue manager, and — if `config.auto_spawn_cashiers` —
    /// spawns one cashier per derived lane.
    pub fn init_from_scene(
        config: SimulatorConfig,
        objects: &[SceneObject],
        rois: &[Roi],
    ) -> SimResult<Self> {
        let (sim_rng, global_seed) = SimRng::new(config.seed);
        let grid = NavGrid::build(config.world_w, config.world_d, config.res, config.inflation, objects, rois)?;

        let mut gates = GateManager::new();
        let zb = &grid.zone_bounds;
        gates.add_gate(GateManager::default_cashier_gate(
            zb.checkout_min_x,
            zb.checkout_max_x,
            zb.cashier_line_z,
            zb.bypass_corridor_x,
        ));

        let lane_positions: Vec<Vector2> = grid.cashiers.iter().map(|c| c.pos).collect();
        let lane_xs: Vec<f32> = lane_positions.iter().map(|p| p.x).collect();
        let mut queue = QueueManager::new(&lane_positions, grid.entrance_pos);
        queue.max_queue_slots = config.max_queue_slots;
        queue.service_time = config.service_time.clone();

        let lane_state = LaneStateController::new(&lane_xs, config.lane_state.clone());

        let mut sim = Simulator {
            astar: AStar::new(true),
            gates,
            queue,
            lane_state,
            id_confusion: IDConfusion::new(),
            shoppers: Vec::new(),
            cashiers: Vec::new(),
            sim_rng,
            global_seed,
            clock: SimClock::new(),
            next_agent_id: 1,
            total_spawned: 0,
            total_exited: 0,
            recent_gate_violations: Vec::new(),
            heatmap: None,
            lane_metrics: LaneMetrics::default(),
            grid,
            config,
        };

        if sim.config.auto_spawn_cashiers {
            let cashier_positions: Vec<Vector2> = sim.grid.cashiers.iter().map(|c| c.pos).collect();
            for (lane_id, pos) in cashier_positions.into_iter().enumerate() {
                let id = sim.alloc_agent_id();
                let cashier = Cashier::spawn(
                    id,
                    retailsim_core::LaneId(lane_id as u32),
                    pos,
                    &sim.config.cashier,
                    sim.global_seed,
                );
                sim.cashiers.push(cashier);
            }
        }

        Ok(sim)
    }

    fn alloc_agent_id(&mut self) -> AgentId {
        let id = AgentId(self.next_agent_id);
        self.next_agent_id += 1;
        id
    }

    /// Spawn a new shopper at the scene's entrance. `None` if
    /// `max_occupancy` (live shoppers, not cashiers) has been reached
    /// (`spec.md` §4.10, §7).
    pub fn spawn_agent(&mut self) -> Option<AgentId> {
        let live = self.shoppers.iter().filter(|s| !s.is_done()).count() as u32;
        if live >= self.config.max_occupancy {
            return None;
        }
        let id = self.alloc_agent_id();
        let shopper = Shopper::spawn(
            id,
            self.grid.entrance_pos,
            &self.config.personas,
            &self.config.shopper,
            self.global_seed,
            &mut self.sim_rng,
        );
        self.shoppers.push(shopper);
        self.total_spawned += 1;
        Some(id)
    }

    /// Advance the simulator by `dt` seconds, per `spec.md` §4.10's six
    /// ordered steps.
    pub fn update(&mut self, dt: f32) {
        self.clock.advance(dt);

        // Step 1: queue subsystem tick. The queue is demand-driven (slots
        // are promoted lazily on `is_at_front` queries, service timers tick
        // only for the occupying shopper) so there is no separate passive
        // state to advance here; this step exists as an explicit hook
        // matching the teacher's phased tick, kept for parity with
        // `spec.md`'s ordering even though it is currently a no-op.

        // Step 2: shopper FSM ticks. Neighbor positions are snapshotted
        // once at the start of the step so every shopper in this tick sees
        // the same frozen crowd (`spec.md` §5).
        let neighbors: Vec<(Vector2, f32)> = self
            .shoppers
            .iter()
            .filter(|s| s.spawned && !s.is_done())
            .map(|s| (s.pos, s.bounding_box.0.max(s.bounding_box.2) * 0.5))
            .collect();

        for shopper in &mut self.shoppers {
            if shopper.is_done() {
                continue;
            }
            let was_walking_to_queue = shopper.state == retailsim_core::ShopperState::WalkingToQueue;
            let mut ctx = ShopperContext {
                grid: &self.grid,
                astar: &self.astar,
                gates: &self.gates,
                queue: &mut self.queue,
                sim_rng: &mut self.sim_rng,
                config: &self.config.shopper,
                neighbors: &neighbors,
            };
            shopper.update(dt, &mut ctx);

            if was_walking_to_queue && shopper.state == retailsim_core::ShopperState::InQueue {
                self.lane_state.record_queue_entry(self.clock.elapsed_secs);
            }

            if let Some(bypass) = shopper.pending_bypass() {
                self.recent_gate_violations.push(GateViolation {
                    agent_id: shopper.id.0,
                    at: shopper.pos,
                    bypass_point: bypass,
                    elapsed_secs: self.clock.elapsed_secs,
                });
                warn!(agent = shopper.id.0, "gate violation, routing via bypass");
            }

            if shopper.is_done() {
                self.total_exited += 1;
            }
        }

        // Step 3: cashier FSM ticks, lane hysteresis, transition logging.
        for cashier in &mut self.cashiers {
            let lane_occupied = self
                .queue
                .lane(cashier.lane_id)
                .map(|l| l.is_serving())
                .unwrap_or(false);
            let was_open = cashier.is_open();
            cashier.update(dt, lane_occupied);
            self.queue.set_lane_open(cashier.lane_id, cashier.is_open());
            self.lane_state.sync_actual_open(cashier.lane_id, cashier.is_open());
            if was_open != cashier.is_open() {
                debug!(lane = cashier.lane_id.0, open = cashier.is_open(), "lane hysteresis transition");
            }
        }

        let queue_lengths: Vec<usize> = (0..self.queue.lane_count())
            .map(|i| {
                self.queue
                    .lane(retailsim_core::LaneId(i as u32))
                    .map(|l| l.waiting_len())
                    .unwrap_or(0)
            })
            .collect();
        self.lane_metrics = self.lane_state.tick(self.clock.elapsed_secs, &queue_lengths);

        // Step 4: ID confusion tick.
        if self.config.id_confusion.enabled {
            let shopper_pairs: Vec<(AgentId, Vector2)> = self
                .shoppers
                .iter()
                .filter(|s| !s.is_done())
                .map(|s| (s.id, s.pos))
                .collect();
            let cashier_pairs: Vec<(AgentId, Vector2)> =
                self.cashiers.iter().map(|c| (c.id, c.pos)).collect();
            self.id_confusion.tick(
                dt,
                &self.config.id_confusion,
                &shopper_pairs,
                &cashier_pairs,
                &mut self.sim_rng,
            );
        }

        // Step 5: ~1% chance per tick to run housekeeping.
        if self.sim_rng.gen_bool(self.config.housekeeping_probability) {
            self.run_housekeeping();
        }

        // Step 6: heatmap (optional).
        if let Some(heatmap) = &mut self.heatmap {
            for shopper in self.shoppers.iter().filter(|s| !s.is_done()) {
                let (gx, gz) = self.grid.world_to_cell(shopper.pos);
                if let Some(cell) = heatmap.get_mut(gz * self.grid.gw + gx) {
                    *cell += dt;
                }
            }
            for cashier in &self.cashiers {
                let (gx, gz) = self.grid.world_to_cell(cashier.pos);
                if let Some(cell) = heatmap.get_mut(gz * self.grid.gw + gx) {
                    *cell += dt;
                }
            }
        }
    }

    fn run_housekeeping(&mut self) {
        let cutoff = self.clock.elapsed_secs - GATE_VIOLATION_RETENTION_SECS;
        self.recent_gate_violations.retain(|v| v.elapsed_secs >= cutoff);
        self.shoppers.retain(|s| !s.is_done());
        debug!(
            live_shoppers = self.shoppers.len(),
            violations = self.recent_gate_violations.len(),
            "housekeeping pass"
        );
    }

    /// Enable or disable the optional per-cell dwell-time heatmap.
    pub fn set_heatmap_enabled(&mut self, enabled: bool) {
        self.heatmap = if enabled {
            Some(vec![0.0; self.grid.gw * self.grid.gd])
        } else {
            None
        };
    }

    pub fn heatmap(&self) -> Option<&[f32]> {
        self.heatmap.as_deref()
    }

    /// Build this tick's track stream, applying ID-confusion swaps and
    /// occlusions (`spec.md` §3, §4.9, §6).
    pub fn track_messages(&mut self, device_id: &str, venue_id: &str) -> Vec<TrackMessage> {
        let timestamp_ms = self.clock.timestamp_ms();
        let noise = self.config.track_position_noise_sigma;
        let mut messages = Vec::with_capacity(self.shoppers.len() + self.cashiers.len());

        for shopper in self.shoppers.iter().filter(|s| s.spawned && !s.is_done()) {
            let nearest_cashier = self
                .cashiers
                .iter()
                .min_by(|a, b| {
                    a.pos.distance(shopper.pos).partial_cmp(&b.pos.distance(shopper.pos)).unwrap()
                });
            let effective_id = match nearest_cashier {
                Some(cashier) => self.id_confusion.effective_id(shopper.id, cashier.id),
                None => Some(shopper.id),
            };
            let Some(effective_id) = effective_id else { continue };

            let mut msg = track::shopper_track(shopper, device_id, venue_id, timestamp_ms, noise, &mut self.sim_rng);
            if effective_id != shopper.id {
                msg.id = format!("person-{}", effective_id.0);
            }
            messages.push(msg);
        }

        for cashier in &self.cashiers {
            let nearest_shopper = self
                .shoppers
                .iter()
                .filter(|s| !s.is_done())
                .min_by(|a, b| {
                    a.pos.distance(cashier.pos).partial_cmp(&b.pos.distance(cashier.pos)).unwrap()
                });
            let effective_id = match nearest_shopper {
                Some(shopper) => self.id_confusion.effective_id(cashier.id, shopper.id),
                None => Some(cashier.id),
            };
            let Some(effective_id) = effective_id else { continue };

            let mut msg = track::cashier_track(cashier, device_id, venue_id, timestamp_ms, noise, &mut self.sim_rng);
            if effective_id != cashier.id {
                msg.id = format!("cashier-{}", effective_id.0);
            }
            messages.push(msg);
        }

        messages
    }

    /// Issue a manual lane-state command (`spec.md` §6, §4.8).
    pub fn set_lane_state(&mut self, lane_ref: LaneRef, desired: DesiredState) -> SimResult<bool> {
        let outcome = self.lane_state.set_lane_state(lane_ref, desired)?;
        if !outcome.idempotent {
            let cmd = match desired {
                DesiredState::Open => ManualCommand::Open,
                DesiredState::Closed => ManualCommand::Close,
            };
            if let Some(cashier) = self.cashiers.iter_mut().find(|c| c.lane_id == outcome.lane_id) {
                // Best-effort: the command may not apply to the cashier's
                // current shift state (e.g. already mid-Leave); ignore.
                let _ = cashier.handle_command(cmd);
            }
        }
        Ok(outcome.idempotent)
    }

    pub fn get_diagnostics(&self) -> Diagnostics {
        let sw = &self.grid.safe_waypoints;
        Diagnostics {
            total_spawned: self.total_spawned,
            total_exited: self.total_exited,
            live_shoppers: self.shoppers.iter().filter(|s| !s.is_done()).count(),
            live_cashiers: self.cashiers.len(),
            recent_gate_violations: self.recent_gate_violations.clone(),
            lane_states: self.lane_state.lanes().to_vec(),
            safe_waypoint_bucket_sizes: SafeWaypointBucketSizes {
                entrance: sw.entrance.len(),
                bypass: sw.bypass.len(),
                shopping: sw.shopping.len(),
                aisles: sw.aisles.len(),
                queue: sw.queue.len(),
            },
        }
    }

    /// This tick's rolling-window lane metrics (`spec.md` §4.8).
    pub fn lane_metrics(&self) -> LaneMetrics {
        self.lane_metrics
    }

    /// A human-readable "open another lane" suggestion, or `None` when no
    /// lane is closed or demand is within thresholds (`spec.md` §4.8).
    pub fn lane_suggestion(&self) -> Option<String> {
        self.lane_state.suggest(self.lane_metrics)
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn shoppers(&self) -> &[Shopper] {
        &self.shoppers
    }

    pub fn cashiers(&self) -> &[Cashier] {
        &self.cashiers
    }
}
