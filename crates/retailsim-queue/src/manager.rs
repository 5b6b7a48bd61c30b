//! `QueueManager` — owns every lane's service slot and waiting list
//! (`spec.md` §4.4).

use std::collections::HashMap;

use retailsim_core::{AgentId, AgentRng, LaneId, SimRng, Vector2};

use crate::lane::{target_for_slot, Lane, LaneGeometry};
use crate::service::ServiceTimeModel;

/// Where an agent currently sits relative to a lane, used only to answer
/// `remove_agent` and `is_at_front` in O(1) instead of scanning every lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Service,
    Waiting,
}

#[derive(Clone, Debug)]
pub struct QueueManager {
    geometry: Vec<LaneGeometry>,
    lanes: Vec<Lane>,
    membership: HashMap<AgentId, (LaneId, Slot)>,
    pub max_queue_slots: usize,
    pub service_time: ServiceTimeModel,
    /// Returned by `complete_service` — a point near the entrance to walk
    /// toward on exit.
    pub exit_anchor: Vector2,
}

impl QueueManager {
    pub fn new(lane_positions: &[Vector2], exit_anchor: Vector2) -> Self {
        let geometry: Vec<LaneGeometry> = lane_positions
            .iter()
            .map(|p| LaneGeometry::new(p.x, p.z))
            .collect();
        let lanes = vec![Lane::default(); geometry.len()];
        Self {
            geometry,
            lanes,
            membership: HashMap::new(),
            max_queue_slots: 8,
            service_time: ServiceTimeModel::default(),
            exit_anchor,
        }
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn lane(&self, lane: LaneId) -> Option<&Lane> {
        self.lanes.get(lane.0 as usize)
    }

    pub fn geometry(&self, lane: LaneId) -> Option<&LaneGeometry> {
        self.geometry.get(lane.0 as usize)
    }

    /// Ground truth for "is this lane open", updated externally by
    /// `LaneStateController` each tick.
    pub fn set_lane_open(&mut self, lane: LaneId, open: bool) {
        if let Some(l) = self.lanes.get_mut(lane.0 as usize) {
            l.is_open = open;
        }
    }

    /// Pick a lane for a newly-deciding shopper, uniformly among open lanes
    /// (falling back to all lanes if none are open), preferring one whose
    /// waiting list has room. `None` if every candidate lane is already at
    /// `max_queue_slots` (caller should retry next tick).
    pub fn start_queue_decision(&mut self, agent: AgentId, rng: &mut SimRng) -> Option<LaneId> {
        if self.lanes.is_empty() {
            return None;
        }
        let open_indices: Vec<usize> = self
            .lanes
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_open)
            .map(|(i, _)| i)
            .collect();
        let candidates: Vec<usize> = if open_indices.is_empty() {
            (0..self.lanes.len()).collect()
        } else {
            open_indices
        };
        let available: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&i| self.lanes[i].waiting.len() < self.max_queue_slots)
            .collect();
        if available.is_empty() {
            return None;
        }
        let pick = available[rng.gen_range(0..available.len())];
        let lane_id = LaneId(pick as u32);
        let lane = &mut self.lanes[pick];
        if lane.service_slot.is_none() && lane.waiting.is_empty() {
            lane.service_slot = Some(agent);
            self.membership.insert(agent, (lane_id, Slot::Service));
        } else {
            lane.waiting.push(agent);
            self.membership.insert(agent, (lane_id, Slot::Waiting));
        }
        Some(lane_id)
    }

    /// World point the agent should walk to this tick.
    pub fn target_position(&self, agent: AgentId) -> Option<Vector2> {
        let (lane_id, slot) = *self.membership.get(&agent)?;
        let geom = self.geometry.get(lane_id.0 as usize)?;
        match slot {
            Slot::Service => Some(Vector2::new(geom.lane_x, geom.service_z)),
            Slot::Waiting => {
                let lane = &self.lanes[lane_id.0 as usize];
                let idx = lane.waiting.iter().position(|&a| a == agent)?;
                Some(target_for_slot(geom, idx))
            }
        }
    }

    /// `true` if already in service; otherwise promotes the head of
    /// waiting into a just-freed service slot before answering.
    pub fn is_at_front(&mut self, agent: AgentId) -> bool {
        let Some(&(lane_id, slot)) = self.membership.get(&agent) else {
            return false;
        };
        if slot == Slot::Service {
            return true;
        }
        let lane = &mut self.lanes[lane_id.0 as usize];
        if lane.service_slot.is_none() && lane.waiting.first() == Some(&agent) {
            lane.waiting.remove(0);
            lane.service_slot = Some(agent);
            self.membership.insert(agent, (lane_id, Slot::Service));
            true
        } else {
            false
        }
    }

    /// Marks that the agent has physically arrived at its current target
    /// (state-transition signal for the caller; no queue bookkeeping needed
    /// since position within the lane is tracked by `membership` already).
    pub fn set_in_queue(&mut self, _agent: AgentId) {}

    /// Opens the service timer for an agent already in the service slot,
    /// sampling a duration from the configured `ServiceTimeModel`.
    pub fn start_service(&mut self, agent: AgentId, rng: &mut AgentRng) {
        let Some(&(lane_id, Slot::Service)) = self.membership.get(&agent) else {
            return;
        };
        let duration = self.service_time.sample(rng);
        let lane = &mut self.lanes[lane_id.0 as usize];
        lane.service_elapsed = 0.0;
        lane.service_duration = duration;
    }

    /// Advance the service timer. Returns `true` once elapsed has reached
    /// the sampled duration.
    pub fn update_service(&mut self, agent: AgentId, dt: f32) -> bool {
        let Some(&(lane_id, Slot::Service)) = self.membership.get(&agent) else {
            return false;
        };
        let lane = &mut self.lanes[lane_id.0 as usize];
        if lane.service_slot != Some(agent) {
            return false;
        }
        lane.service_elapsed += dt;
        lane.service_elapsed >= lane.service_duration
    }

    /// Frees the service slot and returns the exit anchor.
    pub fn complete_service(&mut self, agent: AgentId) -> Vector2 {
        self.remove_agent(agent);
        self.exit_anchor
    }

    /// Idempotent removal from both the service slot and the waiting list.
    pub fn remove_agent(&mut self, agent: AgentId) {
        let Some((lane_id, slot)) = self.membership.remove(&agent) else {
            return;
        };
        let lane = &mut self.lanes[lane_id.0 as usize];
        match slot {
            Slot::Service => {
                if lane.service_slot == Some(agent) {
                    lane.service_slot = None;
                    lane.service_elapsed = 0.0;
                    lane.service_duration = 0.0;
                }
            }
            Slot::Waiting => {
                lane.waiting.retain(|&a| a != agent);
            }
        }
    }
}
