//! `LaneStateController` — lane indexing, commands, and rolling aggregate
//! metrics (`spec.md` §4.8).

use std::collections::VecDeque;

use retailsim_core::LaneId;
use uuid::Uuid;

use crate::config::LaneStateConfig;
use crate::error::{SimError, SimResult};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DesiredState {
    Open,
    Closed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LaneStatus {
    Closed,
    Opening,
    Open,
    Closing,
}

/// Either canonical key a caller may use to refer to a lane (`spec.md` §6).
#[derive(Clone, Debug)]
pub enum LaneRef {
    Uuid(Uuid),
    DisplayIndex(u32),
}

#[derive(Clone, Debug)]
pub struct LaneState {
    pub lane_id: LaneId,
    pub uuid: Uuid,
    /// 1-based ordinal, sorted by x at construction time (`spec.md` §9
    /// glossary: "display index").
    pub display_index: u32,
    pub desired_state: DesiredState,
    pub status: LaneStatus,
}

pub struct SetLaneStateOutcome {
    pub lane_id: LaneId,
    pub status: LaneStatus,
    pub idempotent: bool,
}

/// Outcome of a `set_lane_state`/`tick` window scan.
#[derive(Clone, Copy, Debug, Default)]
pub struct LaneMetrics {
    pub open_lanes: u32,
    pub total_queue_count: u32,
    pub avg_queue_per_lane: f32,
    pub inflow_rate: f32,
}

/// Indexes lanes by UUID and by position-sorted display index, tracks each
/// lane's desired/actual open status, and derives rolling-window aggregate
/// metrics from queue-entry events (`spec.md` §4.8).
#[derive(Debug)]
pub struct LaneStateController {
    lanes: Vec<LaneState>,
    config: LaneStateConfig,
    /// `(elapsed_secs_at_entry)` timestamps within the rolling window, used
    /// to compute `inflow_rate`.
    entry_events: VecDeque<f64>,
}

impl LaneStateController {
    /// `lane_xs` is the lane's x-coordinate in NavGrid order (index ==
    /// `LaneId`); used only to assign `display_index` by x-sort rank.
    pub fn new(lane_xs: &[f32], config: LaneStateConfig) -> Self {
        let mut order: Vec<usize> = (0..lane_xs.len()).collect();
        order.sort_by(|&a, &b| lane_xs[a].partial_cmp(&lane_xs[b]).unwrap());
        let mut display_index = vec![0u32; lane_xs.len()];
        for (rank, &idx) in order.iter().enumerate() {
            display_index[idx] = (rank + 1) as u32;
        }

        let lanes = (0..lane_xs.len())
            .map(|i| LaneState {
                lane_id: LaneId(i as u32),
                uuid: Uuid::new_v4(),
                display_index: display_index[i],
                desired_state: DesiredState::Open,
                status: LaneStatus::Closed,
            })
            .collect();

        LaneStateController { lanes, config, entry_events: VecDeque::new() }
    }

    pub fn lanes(&self) -> &[LaneState] {
        &self.lanes
    }

    fn resolve(&self, lane_ref: &LaneRef) -> Option<usize> {
        match lane_ref {
            LaneRef::Uuid(u) => self.lanes.iter().position(|l| l.uuid == *u),
            LaneRef::DisplayIndex(i) => self.lanes.iter().position(|l| l.display_index == *i),
        }
    }

    /// Idempotent: re-issuing the same desired state on a lane already
    /// matching it is a no-op and reports `idempotent: true`.
    pub fn set_lane_state(
        &mut self,
        lane_ref: LaneRef,
        desired: DesiredState,
    ) -> SimResult<SetLaneStateOutcome> {
        let idx = self.resolve(&lane_ref).ok_or_else(|| {
            SimError::UnknownLane(match lane_ref {
                LaneRef::Uuid(u) => u.to_string(),
                LaneRef::DisplayIndex(i) => i.to_string(),
            })
        })?;
        let lane = &mut self.lanes[idx];
        let idempotent = lane.desired_state == desired;
        lane.desired_state = desired;
        if !idempotent {
            lane.status = match (desired, lane.status) {
                (DesiredState::Open, LaneStatus::Closed | LaneStatus::Closing) => LaneStatus::Opening,
                (DesiredState::Closed, LaneStatus::Open | LaneStatus::Opening) => LaneStatus::Closing,
                (_, unchanged) => unchanged,
            };
        }
        Ok(SetLaneStateOutcome { lane_id: lane.lane_id, status: lane.status, idempotent })
    }

    /// Resync `status` from the cashier's actual (hysteresis-debounced)
    /// `is_open` ground truth. Called once per tick per lane.
    pub fn sync_actual_open(&mut self, lane_id: LaneId, is_open: bool) {
        let Some(lane) = self.lanes.iter_mut().find(|l| l.lane_id == lane_id) else {
            return;
        };
        lane.status = match (lane.desired_state, is_open) {
            (DesiredState::Open, true) => LaneStatus::Open,
            (DesiredState::Open, false) => LaneStatus::Opening,
            (DesiredState::Closed, false) => LaneStatus::Closed,
            (DesiredState::Closed, true) => LaneStatus::Closing,
        };
    }

    pub fn record_queue_entry(&mut self, elapsed_secs: f64) {
        self.entry_events.push_back(elapsed_secs);
    }

    /// Drop entries older than the rolling window and compute aggregate
    /// metrics as of `elapsed_secs`. `queue_lengths` is each lane's current
    /// `waiting.len()`, in lane order.
    pub fn tick(&mut self, elapsed_secs: f64, queue_lengths: &[usize]) -> LaneMetrics {
        let window = self.config.window_secs as f64;
        while let Some(&front) = self.entry_events.front() {
            if elapsed_secs - front > window {
                self.entry_events.pop_front();
            } else {
                break;
            }
        }

        let open_lanes = self.lanes.iter().filter(|l| l.status == LaneStatus::Open).count() as u32;
        let total_queue_count: u32 = queue_lengths.iter().map(|&n| n as u32).sum();
        let lane_count = self.lanes.len().max(1) as f32;
        let avg_queue_per_lane = total_queue_count as f32 / lane_count;
        let inflow_rate = self.entry_events.len() as f32 / self.config.window_secs.max(1.0);

        LaneMetrics { open_lanes, total_queue_count, avg_queue_per_lane, inflow_rate }
    }

    /// A human-readable suggestion when demand is outstripping open lanes,
    /// or `None` when no lane is closed or demand is within thresholds.
    pub fn suggest(&self, metrics: LaneMetrics) -> Option<String> {
        let any_closed = self.lanes.iter().any(|l| l.status == LaneStatus::Closed);
        if !any_closed {
            return None;
        }
        if metrics.avg_queue_per_lane > self.config.avg_queue_threshold
            || metrics.inflow_rate > self.config.inflow_rate_threshold
        {
            return Some(format!(
                "open another lane: avg_queue_per_lane={:.1}, inflow_rate={:.2}/s",
                metrics.avg_queue_per_lane, metrics.inflow_rate
            ));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_index_follows_x_sort_order() {
        let ctrl = LaneStateController::new(&[10.0, 2.0, 6.0], LaneStateConfig::default());
        assert_eq!(ctrl.lanes[0].display_index, 3);
        assert_eq!(ctrl.lanes[1].display_index, 1);
        assert_eq!(ctrl.lanes[2].display_index, 2);
    }

    #[test]
    fn repeated_set_lane_state_is_idempotent() {
        let mut ctrl = LaneStateController::new(&[0.0], LaneStateConfig::default());
        let first = ctrl
            .set_lane_state(LaneRef::DisplayIndex(1), DesiredState::Closed)
            .unwrap();
        assert!(!first.idempotent);
        let second = ctrl
            .set_lane_state(LaneRef::DisplayIndex(1), DesiredState::Closed)
            .unwrap();
        assert!(second.idempotent);
    }

    #[test]
    fn unknown_lane_ref_is_an_error() {
        let mut ctrl = LaneStateController::new(&[0.0], LaneStateConfig::default());
        assert!(ctrl
            .set_lane_state(LaneRef::DisplayIndex(99), DesiredState::Open)
            .is_err());
    }

    #[test]
    fn suggestion_only_fires_when_a_lane_is_closed_and_demand_is_high() {
        // Fresh lanes start CLOSED (no cashier has confirmed presence yet),
        // so a closed lane always exists here; the gate is the demand check.
        let ctrl = LaneStateController::new(&[0.0, 1.0], LaneStateConfig::default());
        let low = LaneMetrics { open_lanes: 1, total_queue_count: 1, avg_queue_per_lane: 0.5, inflow_rate: 0.1 };
        assert!(ctrl.suggest(low).is_none());

        let high = LaneMetrics { open_lanes: 1, total_queue_count: 20, avg_queue_per_lane: 10.0, inflow_rate: 2.0 };
        assert!(ctrl.suggest(high).is_some());
    }

    #[test]
    fn no_suggestion_once_every_lane_is_open() {
        let mut ctrl = LaneStateController::new(&[0.0], LaneStateConfig::default());
        ctrl.lanes[0].status = LaneStatus::Open;
        let high = LaneMetrics { open_lanes: 1, total_queue_count: 20, avg_queue_per_lane: 10.0, inflow_rate: 2.0 };
        assert!(ctrl.suggest(high).is_none());
    }
}
