//! `AntiGlitch` — per-agent stuck/oscillation detection and graduated
//! recovery ladder (`spec.md` §4.5).

use std::collections::VecDeque;

use retailsim_core::{AgentRng, ShopperState, Vector2};
use retailsim_nav::NavGrid;

use crate::config::AntiGlitchConfig;

const RECOVERY_COOLDOWN: f32 = 0.5;

/// What the caller (`Shopper::update`) must do in response to this tick's
/// anti-glitch evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RecoveryAction {
    None,
    /// Nudge `pos` by this offset; no replan.
    Nudge(Vector2),
    /// Larger nudge plus a forced replan plus a temporary personal-space
    /// shrink (multiplier, duration in seconds).
    NudgeReplan {
        nudge: Vector2,
        space_multiplier: f32,
        space_duration: f32,
    },
    /// Warp straight to this world point (a safe waypoint or nearest
    /// walkable cell).
    Warp(Vector2),
    /// Clear the path and reset the stuck counter; replans from current pose.
    ResetPath,
}

/// Per-agent history and stuck/oscillation bookkeeping.
#[derive(Clone, Debug)]
pub struct AntiGlitch {
    history: VecDeque<(Vector2, f32)>,
    low_speed_time: f32,
    stuck_counter: f32,
    elapsed_since_last_recovery: f32,
    config: AntiGlitchConfig,
}

impl Default for AntiGlitch {
    fn default() -> Self {
        Self::new(&AntiGlitchConfig::default())
    }
}

impl AntiGlitch {
    pub fn new(config: &AntiGlitchConfig) -> Self {
        AntiGlitch {
            history: VecDeque::with_capacity(config.oscillation_window),
            low_speed_time: 0.0,
            stuck_counter: 0.0,
            elapsed_since_last_recovery: RECOVERY_COOLDOWN,
            config: config.clone(),
        }
    }

    pub fn stuck_counter(&self) -> f32 {
        self.stuck_counter
    }

    /// Evaluate this tick's position/velocity and return the recovery
    /// action (if any) the caller must apply.
    ///
    /// `macro_direction` is a unit vector toward the agent's current
    /// macro-objective (entrance for EXITING, away from the cashier line
    /// otherwise); used to bias warp-target selection. `near_cashiers`
    /// implements the special rule in `spec.md` §4.5 step 6: EXITING agents
    /// with `z < 12` are only ever nudged, never warped, and their counter
    /// is capped at 3.
    #[allow(clippy::too_many_arguments)]
    pub fn evaluate(
        &mut self,
        pos: Vector2,
        vel: Vector2,
        dt: f32,
        grid: &NavGrid,
        rng: &mut AgentRng,
        _state: ShopperState,
        macro_direction: Option<Vector2>,
        near_cashiers_while_exiting: bool,
    ) -> RecoveryAction {
        self.elapsed_since_last_recovery += dt;

        self.history.push_back((pos, self.total_elapsed() + dt));
        if self.history.len() > self.config.oscillation_window {
            self.history.pop_front();
        }

        if vel.length() < self.config.stuck_speed {
            self.low_speed_time += dt;
        } else {
            self.low_speed_time = (self.low_speed_time - 2.0 * dt).max(0.0);
        }

        let oscillating = self.is_oscillating();
        if self.low_speed_time > self.config.stuck_time || oscillating {
            self.stuck_counter += 1.0;
        } else {
            self.stuck_counter = (self.stuck_counter - 0.5).max(0.0);
        }

        if near_cashiers_while_exiting {
            self.stuck_counter = self.stuck_counter.min(3.0);
        }

        if self.stuck_counter <= 0.0 || self.elapsed_since_last_recovery < RECOVERY_COOLDOWN {
            return RecoveryAction::None;
        }

        self.elapsed_since_last_recovery = 0.0;

        if self.stuck_counter <= 3.0 {
            RecoveryAction::Nudge(random_nudge(rng, 0.5))
        } else if self.stuck_counter <= 6.0 {
            RecoveryAction::NudgeReplan {
                nudge: random_nudge(rng, 0.8),
                space_multiplier: 0.5,
                space_duration: 2.0,
            }
        } else if self.stuck_counter <= self.config.max_attempts {
            if near_cashiers_while_exiting {
                RecoveryAction::Nudge(random_nudge(rng, 0.5))
            } else {
                let target = self
                    .pick_warp_target(grid, pos, macro_direction)
                    .unwrap_or(pos);
                RecoveryAction::Warp(target)
            }
        } else {
            self.stuck_counter = 0.0;
            RecoveryAction::ResetPath
        }
    }

    fn total_elapsed(&self) -> f32 {
        self.history.back().map(|(_, t)| *t).unwrap_or(0.0)
    }

    fn is_oscillating(&self) -> bool {
        if self.history.len() < 2 {
            return false;
        }
        let span = self.history.back().unwrap().1 - self.history.front().unwrap().1;
        if span < 3.0 {
            return false;
        }
        let n = self.history.len() as f32;
        let mean_x: f32 = self.history.iter().map(|(p, _)| p.x).sum::<f32>() / n;
        let mean_z: f32 = self.history.iter().map(|(p, _)| p.z).sum::<f32>() / n;
        let variance: f32 = self
            .history
            .iter()
            .map(|(p, _)| (p.x - mean_x).powi(2) + (p.z - mean_z).powi(2))
            .sum::<f32>()
            / n;
        variance.sqrt() < self.config.oscillation_threshold
    }

    /// Pick a safe waypoint 3-15 m from `pos`, preferring ones aligned with
    /// `macro_direction`. Falls back to the nearest walkable cell.
    fn pick_warp_target(
        &self,
        grid: &NavGrid,
        pos: Vector2,
        macro_direction: Option<Vector2>,
    ) -> Option<Vector2> {
        let candidates: Vec<Vector2> = grid
            .safe_waypoints
            .entrance
            .iter()
            .chain(grid.safe_waypoints.bypass.iter())
            .chain(grid.safe_waypoints.shopping.iter())
            .chain(grid.safe_waypoints.aisles.iter())
            .chain(grid.safe_waypoints.queue.iter())
            .copied()
            .filter(|&wp| {
                let d = pos.distance(wp);
                (3.0..=15.0).contains(&d)
            })
            .collect();

        if candidates.is_empty() {
            return grid.find_nearest_walkable(pos, 15.0);
        }

        let best = candidates.iter().max_by(|a, b| {
            let score_a = warp_alignment_score(pos, **a, macro_direction);
            let score_b = warp_alignment_score(pos, **b, macro_direction);
            score_a.partial_cmp(&score_b).unwrap()
        });
        best.copied()
    }
}

fn warp_alignment_score(pos: Vector2, candidate: Vector2, macro_direction: Option<Vector2>) -> f32 {
    match macro_direction {
        Some(dir) => (candidate - pos).normalized().dot(dir),
        None => 0.0,
    }
}

fn random_nudge(rng: &mut AgentRng, max: f32) -> Vector2 {
    Vector2::new(rng.gen_range(-max..max), rng.gen_range(-max..max))
}
