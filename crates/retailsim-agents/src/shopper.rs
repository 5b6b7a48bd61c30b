//! `Shopper` — persona, FSM, steering, and local avoidance (`spec.md` §4.6).

use retailsim_core::{AgentId, AgentRng, LaneId, ShopperState, SimRng, Vector2};
use retailsim_nav::{AStar, GateManager, NavGrid};
use retailsim_queue::QueueManager;

use crate::antiglitch::{AntiGlitch, RecoveryAction};
use crate::config::ShopperConfig;
use crate::path::{direct_fallback, plan_through};
use crate::persona::{Persona, PersonaTable};

const WAYPOINT_REACHED_DIST: f32 = 0.5;
const AVOIDANCE_BASE_STRENGTH: f32 = 0.5;
const AVOIDANCE_OVERLAP_STRENGTH: f32 = 1.0;
const AVOIDANCE_LOWPASS: f32 = 0.5;
const AVOIDANCE_CROWD_THRESHOLD: usize = 3;
const AVOIDANCE_CROWD_DAMP: f32 = 0.3;
const BLOCKED_FRAMES_FORCE_REPLAN: u32 = 10;

/// Borrowed handles a `Shopper::update` call needs for this tick. Bundled
/// per `spec.md`'s design note: the simulator owns every subsystem and
/// hands shoppers immutable borrows of the read-only ones (grid, planner,
/// gates) and mutable borrows only of the ones they actually mutate (queue,
/// the single shared RNG for A* tie-breaking).
pub struct ShopperContext<'a> {
    pub grid: &'a NavGrid,
    pub astar: &'a AStar,
    pub gates: &'a GateManager,
    pub queue: &'a mut QueueManager,
    pub sim_rng: &'a mut SimRng,
    pub config: &'a ShopperConfig,
    /// `(position, radius)` of every other live, spawned, non-DONE agent.
    pub neighbors: &'a [(Vector2, f32)],
}

#[derive(Clone, Debug)]
pub struct Shopper {
    pub id: AgentId,
    pub persona: Persona,
    pub base_speed: f32,
    pub num_stops: u32,
    pub target_stay_time: f32,
    pub will_checkout: bool,

    pub pos: Vector2,
    pub vel: Vector2,
    pub heading: f32,

    pub state: ShopperState,
    state_elapsed: f32,

    path: Vec<Vector2>,
    path_index: usize,

    browsing_stops: Vec<Vector2>,
    stop_index: usize,
    is_dwelling: bool,
    dwell_timer: f32,
    dwell_duration: f32,
    total_browsing_time: f32,

    pub queue_lane: Option<LaneId>,

    space_multiplier: f32,
    space_multiplier_timer: f32,

    spawn_delay: f32,
    pub spawned: bool,

    blocked_frames: u32,
    needs_replan: bool,
    /// Set when a gate denies a crossing; the next replan inserts this as a
    /// leading waypoint so the new route actually crosses at the gate's
    /// permitted bypass point instead of immediately re-proposing the same
    /// denied move.
    pending_bypass: Option<Vector2>,
    smoothed_avoidance: Vector2,

    wobble_phase: f32,
    wobble_freq: f32,

    pub bounding_box: (f32, f32, f32),

    rng: AgentRng,
    anti_glitch: AntiGlitch,
}

impl Shopper {
    /// Spawn a shopper at `entrance_pos`. All spawn-time sampling (persona,
    /// speed, stop count, stay time, checkout intent, spawn delay) draws
    /// from the simulator's single `SimRng`, since spawning is a globally
    /// ordered event; the `AgentRng` derived here is reserved for this
    /// shopper's own subsequent per-tick draws (stop shuffling, dwell
    /// duration, wobble phase, anti-glitch nudges).
    pub fn spawn(
        id: AgentId,
        entrance_pos: Vector2,
        personas: &PersonaTable,
        config: &ShopperConfig,
        global_seed: u64,
        sim_rng: &mut SimRng,
    ) -> Self {
        let persona = personas.pick(sim_rng);
        let pc = personas.config(persona);
        let base_speed = pc.sample_speed(sim_rng);
        let num_stops = pc.sample_num_stops(sim_rng);
        let target_stay_time = pc.sample_target_stay_secs(sim_rng);
        let will_checkout = pc.sample_will_checkout(sim_rng);
        let spawn_delay = sim_rng.gen_range(config.spawn_delay.0..=config.spawn_delay.1);

        let mut rng = AgentRng::new(global_seed, id);
        let wobble_phase = rng.gen_range(0.0..std::f32::consts::TAU);
        let wobble_freq = rng.gen_range(config.wobble_freq.0..config.wobble_freq.1);
        let bounding_box = {
            let w = rng.gen_range(0.4..0.6);
            let h = rng.gen_range(1.6..1.9);
            (w, h, w)
        };

        Shopper {
            id,
            persona,
            base_speed,
            num_stops,
            target_stay_time,
            will_checkout,
            pos: entrance_pos,
            vel: Vector2::ZERO,
            heading: 0.0,
            state: ShopperState::Spawn,
            state_elapsed: 0.0,
            path: Vec::new(),
            path_index: 0,
            browsing_stops: Vec::new(),
            stop_index: 0,
            is_dwelling: false,
            dwell_timer: 0.0,
            dwell_duration: 0.0,
            total_browsing_time: 0.0,
            queue_lane: None,
            space_multiplier: 1.0,
            space_multiplier_timer: 0.0,
            spawn_delay,
            spawned: false,
            blocked_frames: 0,
            needs_replan: false,
            pending_bypass: None,
            smoothed_avoidance: Vector2::ZERO,
            wobble_phase,
            wobble_freq,
            bounding_box,
            rng,
            anti_glitch: AntiGlitch::new(&config.anti_glitch),
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == ShopperState::Done
    }

    /// The bypass point from the most recent gate denial, if one hasn't yet
    /// been consumed by a replan. Surfaced for the simulator's
    /// gate-violation diagnostics ring.
    pub fn pending_bypass(&self) -> Option<Vector2> {
        self.pending_bypass
    }

    pub fn color(&self) -> &'static str {
        match self.persona {
            Persona::FastBuyer => "orange",
            Persona::Browser => "blue",
            Persona::Family => "green",
            Persona::Staff => "yellow",
        }
    }

    fn transition(&mut self, next: ShopperState) {
        self.state = next;
        self.state_elapsed = 0.0;
    }

    pub fn update(&mut self, dt: f32, ctx: &mut ShopperContext) {
        self.state_elapsed += dt;
        if self.space_multiplier_timer > 0.0 {
            self.space_multiplier_timer -= dt;
            if self.space_multiplier_timer <= 0.0 {
                self.space_multiplier = 1.0;
            }
        }

        match self.state {
            ShopperState::Spawn => self.tick_spawn(dt),
            ShopperState::Entering => self.tick_entering(dt, ctx),
            ShopperState::Browsing => self.tick_browsing(dt, ctx),
            ShopperState::WalkingToQueue => self.tick_walking_to_queue(dt, ctx),
            ShopperState::InQueue => self.tick_in_queue(dt, ctx),
            ShopperState::Service => self.tick_service(dt, ctx),
            ShopperState::Exiting => self.tick_exiting(dt, ctx),
            ShopperState::Done => {}
        }
    }

    fn tick_spawn(&mut self, dt: f32) {
        self.spawn_delay -= dt;
        if self.spawn_delay <= 0.0 {
            self.spawned = true;
            self.transition(ShopperState::Entering);
        }
    }

    fn tick_entering(&mut self, dt: f32, ctx: &mut ShopperContext) {
        if self.path.is_empty() && self.path_index == 0 && self.state_elapsed == dt {
            let zb = &ctx.grid.zone_bounds;
            let legs = [
                Vector2::new(zb.bypass_corridor_x, 3.0),
                Vector2::new(zb.bypass_corridor_x, zb.shopping_min_z),
            ];
            self.plan_path(&legs, ctx);
        }
        if self.follow_path(dt, ctx, self.base_speed) {
            self.transition(ShopperState::Browsing);
        }
    }

    fn tick_browsing(&mut self, dt: f32, ctx: &mut ShopperContext) {
        if self.state_elapsed == dt {
            self.start_browsing(ctx);
        }
        self.total_browsing_time += dt;

        if self.total_browsing_time > self.target_stay_time {
            if self.will_checkout {
                self.transition(ShopperState::WalkingToQueue);
            } else {
                self.transition(ShopperState::Exiting);
            }
            return;
        }

        if self.is_dwelling {
            self.dwell_timer += dt;
            self.vel = Vector2::ZERO;
            if self.dwell_timer >= self.dwell_duration {
                self.is_dwelling = false;
                self.stop_index += 1;
            }
            return;
        }

        if self.path.is_empty() && !self.advance_to_next_stop(ctx) {
            // No stops left to plan; wait out the remaining stay time idle.
            self.vel = Vector2::ZERO;
            return;
        }

        if self.follow_path(dt, ctx, self.base_speed) {
            self.is_dwelling = true;
            self.dwell_timer = 0.0;
            self.dwell_duration = self
                .rng
                .gen_range(ctx.config.browsing_dwell.0..ctx.config.browsing_dwell.1);
        }
    }

    fn start_browsing(&mut self, ctx: &mut ShopperContext) {
        let mut pool: Vec<Vector2> = ctx
            .grid
            .safe_waypoints
            .shopping
            .iter()
            .chain(ctx.grid.safe_waypoints.aisles.iter())
            .copied()
            .collect();
        self.rng.shuffle(&mut pool);
        pool.truncate(self.num_stops as usize);
        self.browsing_stops = pool;
        self.stop_index = 0;
    }

    /// Plan to the next not-yet-visited stop, skipping any whose planning
    /// fails, until one succeeds or the list is exhausted.
    fn advance_to_next_stop(&mut self, ctx: &mut ShopperContext) -> bool {
        while self.stop_index < self.browsing_stops.len() {
            let stop = self.browsing_stops[self.stop_index];
            let planned = plan_through(
                ctx.astar,
                ctx.grid,
                self.pos,
                &[stop],
                ctx.config.agent_radius,
                ctx.sim_rng,
            );
            match planned {
                Some(path) => {
                    self.path = path;
                    self.path_index = 0;
                    return true;
                }
                None => self.stop_index += 1,
            }
        }
        false
    }

    fn tick_walking_to_queue(&mut self, dt: f32, ctx: &mut ShopperContext) {
        if self.queue_lane.is_none() {
            self.queue_lane = ctx.queue.start_queue_decision(self.id, ctx.sim_rng);
            if self.queue_lane.is_none() {
                // No lane available at all: queue subsystem has zero lanes,
                // spec.md §7 says shoppers skip queuing, i.e. exit.
                self.transition(ShopperState::Exiting);
                return;
            }
        }
        if self.state_elapsed > ctx.config.queue_walk_timeout {
            ctx.queue.remove_agent(self.id);
            self.queue_lane = None;
            self.transition(ShopperState::Exiting);
            return;
        }
        let Some(target) = ctx.queue.target_position(self.id) else {
            return;
        };
        if self.plan_path_if_stale(target, ctx) {
            // replanned this tick
        }
        let reached = self.follow_path(dt, ctx, self.base_speed);
        if reached && self.pos.distance(target) < WAYPOINT_REACHED_DIST {
            ctx.queue.set_in_queue(self.id);
            self.transition(ShopperState::InQueue);
        }
    }

    fn tick_in_queue(&mut self, dt: f32, ctx: &mut ShopperContext) {
        if self.state_elapsed > ctx.config.queue_wait_timeout {
            ctx.queue.remove_agent(self.id);
            self.queue_lane = None;
            self.transition(ShopperState::Exiting);
            return;
        }
        if ctx.queue.is_at_front(self.id) {
            ctx.queue.start_service(self.id, &mut self.rng);
            self.transition(ShopperState::Service);
            return;
        }
        let Some(target) = ctx.queue.target_position(self.id) else {
            return;
        };
        self.steer_to_point(dt, ctx, target, 1.0);
    }

    fn tick_service(&mut self, dt: f32, ctx: &mut ShopperContext) {
        self.vel = Vector2::ZERO;
        if ctx.queue.update_service(self.id, dt) {
            ctx.queue.complete_service(self.id);
            self.queue_lane = None;
            // Leave the path empty so tick_exiting's first-tick branch plans
            // a proper obstacle-aware route instead of a naive direct line.
            self.path.clear();
            self.path_index = 0;
            self.transition(ShopperState::Exiting);
        }
    }

    fn tick_exiting(&mut self, dt: f32, ctx: &mut ShopperContext) {
        if self.path.is_empty() && self.path_index == 0 && self.state_elapsed == dt {
            let legs = [
                Vector2::new(self.pos.x, ctx.config.exit_corridor_z),
                ctx.grid.entrance_pos,
            ];
            self.plan_path(&legs, ctx);
        }
        if self.follow_path(dt, ctx, self.base_speed * 1.5) {
            self.transition(ShopperState::Done);
        }
    }

    fn plan_path(&mut self, legs: &[Vector2], ctx: &mut ShopperContext) {
        let full_legs: Vec<Vector2> = match self.pending_bypass.take() {
            Some(bypass) => std::iter::once(bypass).chain(legs.iter().copied()).collect(),
            None => legs.to_vec(),
        };
        let planned = plan_through(
            ctx.astar,
            ctx.grid,
            self.pos,
            &full_legs,
            ctx.config.agent_radius,
            ctx.sim_rng,
        );
        self.path = planned.unwrap_or_else(|| direct_fallback(*full_legs.last().unwrap()));
        self.path_index = 0;
    }

    /// Used by WALKING_TO_QUEUE: the target refreshes every tick as queue
    /// position changes, so replan only when it has moved meaningfully.
    fn plan_path_if_stale(&mut self, target: Vector2, ctx: &mut ShopperContext) -> bool {
        let stale = self.path.is_empty()
            || self.needs_replan
            || self.path.last().map(|p| p.distance(target) > 0.75).unwrap_or(true);
        if stale {
            self.needs_replan = false;
            self.plan_path(&[target], ctx);
            true
        } else {
            false
        }
    }

    fn is_near_cashiers(&self, ctx: &ShopperContext) -> bool {
        self.state == ShopperState::Exiting
            && self.pos.z < ctx.grid.zone_bounds.cashier_line_z + 3.0
    }

    fn macro_direction(&self, ctx: &ShopperContext) -> Option<Vector2> {
        match self.state {
            ShopperState::Exiting => Some((ctx.grid.entrance_pos - self.pos).normalized()),
            ShopperState::WalkingToQueue | ShopperState::InQueue | ShopperState::Service => {
                Some(Vector2::new(0.0, -1.0))
            }
            _ => None,
        }
    }

    /// Advance along `self.path` this tick. Returns `true` once the cursor
    /// is past the last waypoint and the agent has actually arrived there —
    /// keeps steering toward the final waypoint instead of stopping dead the
    /// tick the cursor runs out, since AStar waypoints are grid-cell centers
    /// and rarely land exactly on the requested goal.
    fn follow_path(&mut self, dt: f32, ctx: &mut ShopperContext, speed: f32) -> bool {
        let Some(&last) = self.path.last() else {
            return true;
        };
        let idx = self.path_index.min(self.path.len() - 1);
        let target = self.path[idx];
        self.steer_and_step(dt, ctx, target, speed, true);
        if self.pos.distance(target) < WAYPOINT_REACHED_DIST && self.path_index < self.path.len() {
            self.path_index += 1;
        }
        self.path_index >= self.path.len() && self.pos.distance(last) < WAYPOINT_REACHED_DIST
    }

    /// Used by IN_QUEUE: steer directly toward a single refreshed target,
    /// no path-index bookkeeping.
    fn steer_to_point(&mut self, dt: f32, ctx: &mut ShopperContext, target: Vector2, speed: f32) {
        self.steer_and_step(dt, ctx, target, speed, false);
    }

    fn steer_and_step(
        &mut self,
        dt: f32,
        ctx: &mut ShopperContext,
        target: Vector2,
        speed: f32,
        with_wobble: bool,
    ) {
        let to_target = target - self.pos;
        let dir = to_target.normalized();

        let mut desired = dir.scale(speed.clamp(ctx.config.min_speed, ctx.config.max_speed));

        if with_wobble {
            let t = self.state_elapsed;
            let wobble_mag = ctx.config.wobble_amplitude
                * (t * self.wobble_freq * std::f32::consts::TAU + self.wobble_phase).sin();
            desired += dir.perp().scale(wobble_mag);
        }

        let avoidance = self.compute_avoidance(ctx);
        self.smoothed_avoidance =
            self.smoothed_avoidance.scale(AVOIDANCE_LOWPASS) + avoidance.scale(1.0 - AVOIDANCE_LOWPASS);
        desired += self.smoothed_avoidance;

        self.vel = desired;
        if self.vel.length() > 1e-6 {
            self.heading = self.vel.z.atan2(self.vel.x);
        }

        let near_cashiers = self.is_near_cashiers(ctx);
        let macro_dir = self.macro_direction(ctx);
        let recovery = self.anti_glitch.evaluate(
            self.pos,
            self.vel,
            dt,
            ctx.grid,
            &mut self.rng,
            self.state,
            macro_dir,
            near_cashiers,
        );
        self.apply_recovery(recovery);

        self.step_resolution(dt, ctx);
    }

    fn compute_avoidance(&self, ctx: &ShopperContext) -> Vector2 {
        let my_radius = ctx.config.personal_space_radius * self.space_multiplier;
        let mut accum = Vector2::ZERO;
        let mut count = 0usize;
        for &(other_pos, other_radius) in ctx.neighbors {
            let min_dist = my_radius + other_radius;
            let d = self.pos.distance(other_pos);
            if d < min_dist && d > 1e-4 {
                let overlap = (min_dist - d) / min_dist;
                let away = (self.pos - other_pos).normalized();
                accum += away.scale(AVOIDANCE_BASE_STRENGTH * overlap + AVOIDANCE_OVERLAP_STRENGTH * overlap);
                count += 1;
            }
        }
        if count >= AVOIDANCE_CROWD_THRESHOLD {
            accum = accum.scale(AVOIDANCE_CROWD_DAMP);
        }
        accum
    }

    fn apply_recovery(&mut self, action: RecoveryAction) {
        match action {
            RecoveryAction::None => {}
            RecoveryAction::Nudge(offset) => {
                self.pos += offset;
            }
            RecoveryAction::NudgeReplan {
                nudge,
                space_multiplier,
                space_duration,
            } => {
                self.pos += nudge;
                self.space_multiplier = space_multiplier;
                self.space_multiplier_timer = space_duration;
                self.needs_replan = true;
                self.path.clear();
                self.path_index = 0;
            }
            RecoveryAction::Warp(target) => {
                self.pos = target;
                self.path.clear();
                self.path_index = 0;
            }
            RecoveryAction::ResetPath => {
                self.path.clear();
                self.path_index = 0;
                self.blocked_frames = 0;
            }
        }
    }

    /// `spec.md` §4.6 step resolution: propose, gate-check, body-radius
    /// test with axis-slide fallback, then commit.
    fn step_resolution(&mut self, dt: f32, ctx: &mut ShopperContext) {
        let proposed = self.pos + self.vel.scale(dt);

        if let Err(bypass) = ctx.gates.check_crossing(self.pos, proposed, self.state) {
            self.vel = Vector2::ZERO;
            self.needs_replan = true;
            self.pending_bypass = Some(bypass);
            self.path.clear();
            self.path_index = 0;
            self.clamp_to_bounds(ctx);
            return;
        }

        let r = ctx.config.agent_radius;
        if self.body_radius_ok(ctx.grid, proposed, r) {
            self.pos = proposed;
            self.blocked_frames = 0;
        } else {
            let slide_x = Vector2::new(proposed.x, self.pos.z);
            let slide_z = Vector2::new(self.pos.x, proposed.z);
            if self.body_radius_ok(ctx.grid, slide_x, r) {
                self.pos = slide_x;
                self.blocked_frames = 0;
            } else if self.body_radius_ok(ctx.grid, slide_z, r) {
                self.pos = slide_z;
                self.blocked_frames = 0;
            } else {
                self.blocked_frames += 1;
                if self.blocked_frames >= BLOCKED_FRAMES_FORCE_REPLAN {
                    self.path.clear();
                    self.path_index = 0;
                    self.blocked_frames = 0;
                }
            }
        }
        self.clamp_to_bounds(ctx);
    }

    fn body_radius_ok(&self, grid: &NavGrid, p: Vector2, r: f32) -> bool {
        grid.is_walkable_world(p)
            && grid.is_walkable_world(p + Vector2::new(r, 0.0))
            && grid.is_walkable_world(p - Vector2::new(r, 0.0))
            && grid.is_walkable_world(p + Vector2::new(0.0, r))
            && grid.is_walkable_world(p - Vector2::new(0.0, r))
    }

    fn clamp_to_bounds(&mut self, ctx: &ShopperContext) {
        self.pos = self.pos.clamp_bounds(
            Vector2::new(0.5, 0.5),
            Vector2::new(ctx.grid.world_w - 0.5, ctx.grid.world_d - 0.5),
        );
    }
}
