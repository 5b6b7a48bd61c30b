//! `Diagnostics` — `get_diagnostics()`'s return value (`spec.md` §4.10/§8,
//! concretized per `SPEC_FULL.md` §12).

use retailsim_core::Vector2;

use crate::lanestate::LaneState;

/// A gate crossing denial retained in the bounded recent-violations ring
/// (`spec.md` §7: "trimmed to last 60 s periodically").
#[derive(Clone, Debug)]
pub struct GateViolation {
    pub agent_id: u32,
    pub at: Vector2,
    pub bypass_point: Vector2,
    pub elapsed_secs: f64,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SafeWaypointBucketSizes {
    pub entrance: usize,
    pub bypass: usize,
    pub shopping: usize,
    pub aisles: usize,
    pub queue: usize,
}

#[derive(Clone, Debug)]
pub struct Diagnostics {
    pub total_spawned: u64,
    pub total_exited: u64,
    pub live_shoppers: usize,
    pub live_cashiers: usize,
    pub recent_gate_violations: Vec<GateViolation>,
    pub lane_states: Vec<LaneState>,
    pub safe_waypoint_bucket_sizes: SafeWaypointBucketSizes,
}
