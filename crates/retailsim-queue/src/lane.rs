//! Per-lane geometry and open/closed state (`spec.md` §4.4, §4.8).

use retailsim_core::{AgentId, Vector2};

/// Fixed geometric positions for one checkout lane, derived once at scene
/// build time from the cashier's x and the cashier line's z.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LaneGeometry {
    pub lane_x: f32,
    pub cashier_z: f32,
    pub service_z: f32,
    pub slot_spacing: f32,
    pub queue_start_z: f32,
}

impl LaneGeometry {
    pub fn new(lane_x: f32, cashier_z: f32) -> Self {
        Self {
            lane_x,
            cashier_z,
            service_z: cashier_z + 1.5,
            slot_spacing: 0.6,
            queue_start_z: cashier_z + 3.0,
        }
    }
}

/// Per-lane queue state: one service slot plus an ordered waiting list.
/// `LaneStateController` (in `retailsim-sim`) owns `is_open`'s ground truth;
/// `QueueManager` only reads it when routing new arrivals.
#[derive(Clone, Debug, Default)]
pub struct Lane {
    pub(crate) service_slot: Option<AgentId>,
    pub(crate) service_elapsed: f32,
    pub(crate) service_duration: f32,
    pub(crate) waiting: Vec<AgentId>,
    pub(crate) is_open: bool,
}

impl Lane {
    pub fn waiting_len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_serving(&self) -> bool {
        self.service_slot.is_some()
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }
}

pub(crate) fn target_for_slot(geom: &LaneGeometry, slot_index: usize) -> Vector2 {
    Vector2::new(
        geom.lane_x,
        geom.queue_start_z + slot_index as f32 * geom.slot_spacing,
    )
}
