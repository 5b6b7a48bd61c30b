//! `Cashier` — shift FSM, micro-motion, and lane-open ground truth
//! (`spec.md` §4.7).

use retailsim_core::{AgentId, AgentRng, CashierState, LaneId, Vector2};

use crate::config::CashierConfig;

const WALK_SPEED: (f32, f32) = (0.7, 1.3);
const MICRO_SHIFT_SPEED: f32 = 0.1;
const ARRIVAL_DIST: f32 = 0.1;
const BREAK_CHECK_INTERVAL: f32 = 60.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ManualCommand {
    Open,
    Close,
}

#[derive(Clone, Debug)]
pub struct Cashier {
    pub id: AgentId,
    pub lane_id: LaneId,
    pub anchor: Vector2,
    pub service_half_extent: f32,
    pub staff_exit: Vector2,

    pub pos: Vector2,
    pub state: CashierState,
    state_elapsed: f32,

    shift_duration: f32,
    pending_close: bool,

    time_in_service_area: f32,
    time_outside_service_area: f32,
    is_open: bool,

    break_check_timer: f32,

    walk_from: Vector2,
    walk_speed: f32,

    micro_shift_target: Option<Vector2>,
    micro_shift_timer: f32,
    next_micro_shift_in: f32,

    rng: AgentRng,
}

impl Cashier {
    pub fn spawn(
        id: AgentId,
        lane_id: LaneId,
        cashier_pos: Vector2,
        config: &CashierConfig,
        global_seed: u64,
    ) -> Self {
        let anchor = cashier_pos + Vector2::new(0.0, 0.5);
        let staff_exit = cashier_pos + Vector2::new(0.0, -3.0);
        let mut rng = AgentRng::new(global_seed, id);
        let shift_duration = rng.gen_range(config.shift_minutes.0..config.shift_minutes.1) * 60.0;
        let next_micro_shift_in =
            rng.gen_range(config.micro_shift_interval.0..config.micro_shift_interval.1);

        Cashier {
            id,
            lane_id,
            anchor,
            service_half_extent: config.service_area_size / 2.0,
            staff_exit,
            pos: staff_exit,
            state: CashierState::Arrive,
            state_elapsed: 0.0,
            shift_duration,
            pending_close: false,
            time_in_service_area: 0.0,
            time_outside_service_area: 0.0,
            is_open: false,
            break_check_timer: 0.0,
            walk_from: staff_exit,
            walk_speed: rng.gen_range(WALK_SPEED.0..WALK_SPEED.1),
            micro_shift_target: None,
            micro_shift_timer: 0.0,
            next_micro_shift_in,
            rng,
        }
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    fn transition(&mut self, next: CashierState) {
        self.state = next;
        self.state_elapsed = 0.0;
    }

    fn in_service_area(&self) -> bool {
        (self.pos.x - self.anchor.x).abs() <= self.service_half_extent
            && (self.pos.z - self.anchor.z).abs() <= self.service_half_extent
    }

    pub fn handle_command(&mut self, cmd: ManualCommand) -> Result<(), &'static str> {
        use CashierState::*;
        match (cmd, self.state) {
            (ManualCommand::Open, OffShift) | (ManualCommand::Open, Done) => {
                self.walk_from = self.pos;
                self.transition(Arrive);
                Ok(())
            }
            (ManualCommand::Open, Leave) | (ManualCommand::Open, Break) => {
                self.walk_from = self.pos;
                self.transition(Return);
                Ok(())
            }
            (ManualCommand::Close, Working) => {
                self.pending_close = true;
                Ok(())
            }
            (ManualCommand::Close, Arrive) | (ManualCommand::Close, Return) => {
                self.walk_from = self.pos;
                self.transition(Leave);
                Ok(())
            }
            _ => Err("invalid command for current cashier state"),
        }
    }

    /// `lane_occupied`: whether this cashier's lane currently holds a
    /// shopper in its service slot (queried from `QueueManager` by the
    /// caller, since `Cashier` does not own queue state).
    pub fn update(&mut self, dt: f32, lane_occupied: bool) {
        self.state_elapsed += dt;
        match self.state {
            CashierState::OffShift => {}
            CashierState::Arrive => self.tick_walk(dt, self.anchor, CashierState::Working),
            CashierState::Return => self.tick_walk(dt, self.anchor, CashierState::Working),
            CashierState::Working => self.tick_working(dt, lane_occupied),
            CashierState::Break => self.tick_break(dt),
            CashierState::Leave => self.tick_walk(dt, self.staff_exit, CashierState::Done),
            CashierState::Done => {}
        }
        self.update_lane_open(dt);
    }

    fn tick_walk(&mut self, dt: f32, goal: Vector2, on_arrival: CashierState) {
        let to_goal = goal - self.pos;
        let dist = to_goal.length();
        if dist <= ARRIVAL_DIST {
            self.pos = goal;
            if on_arrival == CashierState::Working {
                self.time_in_service_area = 0.0;
            }
            self.transition(on_arrival);
            return;
        }
        let step = to_goal.normalized().scale((self.walk_speed * dt).min(dist));
        self.pos += step;
    }

    fn tick_working(&mut self, dt: f32, lane_occupied: bool) {
        if let Some(target) = self.micro_shift_target {
            let to_target = target - self.pos;
            if to_target.length() <= ARRIVAL_DIST || self.micro_shift_timer <= 0.0 {
                self.micro_shift_target = None;
            } else {
                self.pos += to_target.normalized().scale((MICRO_SHIFT_SPEED * dt).min(to_target.length()));
                self.micro_shift_timer -= dt;
            }
        } else {
            self.next_micro_shift_in -= dt;
            if self.next_micro_shift_in <= 0.0 {
                let r = 0.2_f32;
                let angle: f32 = self.rng.gen_range(0.0..std::f32::consts::TAU);
                let radius: f32 = self.rng.gen_range(0.0..r);
                self.micro_shift_target =
                    Some(self.anchor + Vector2::new(angle.cos(), angle.sin()).scale(radius));
                self.micro_shift_timer = self.rng.gen_range(2.0..6.0);
                self.next_micro_shift_in = self.rng.gen_range(30.0..180.0);
            }
            let jitter = Vector2::new(self.rng.gen_gaussian(0.0, 0.04), self.rng.gen_gaussian(0.0, 0.04));
            self.pos += jitter;
        }

        self.pos = self.pos.clamp_bounds(
            Vector2::new(self.anchor.x - self.service_half_extent, self.anchor.z - self.service_half_extent),
            Vector2::new(self.anchor.x + self.service_half_extent, self.anchor.z + self.service_half_extent),
        );

        self.break_check_timer += dt;
        if self.break_check_timer >= BREAK_CHECK_INTERVAL {
            self.break_check_timer = 0.0;
            let per_check_probability = 0.15 / (3600.0 / BREAK_CHECK_INTERVAL as f64);
            if !self.pending_close && self.rng.gen_bool(per_check_probability) {
                let break_minutes: f32 = self.rng.gen_range(2.0..10.0);
                self.break_minutes_remaining(break_minutes);
                self.transition(CashierState::Break);
                return;
            }
        }

        if self.state_elapsed >= self.shift_duration {
            self.pending_close = true;
        }

        if self.pending_close && !lane_occupied {
            self.walk_from = self.pos;
            self.transition(CashierState::Leave);
        }
    }

    fn break_minutes_remaining(&mut self, minutes: f32) {
        self.micro_shift_timer = minutes * 60.0;
    }

    fn tick_break(&mut self, dt: f32) {
        self.micro_shift_timer -= dt;
        if self.micro_shift_timer <= 0.0 {
            self.walk_from = self.pos;
            self.transition(CashierState::Return);
        }
    }

    fn update_lane_open(&mut self, dt: f32) {
        if self.state == CashierState::Working && self.in_service_area() {
            self.time_in_service_area += dt;
            self.time_outside_service_area = 0.0;
        } else {
            self.time_outside_service_area += dt;
            self.time_in_service_area = 0.0;
        }

        if self.time_in_service_area >= 120.0 {
            self.is_open = true;
        } else if self.time_outside_service_area > 180.0 {
            self.is_open = false;
        }
    }
}
