//! `TrackMessage` — the external per-tick agent contract (`spec.md` §3, §6).

use retailsim_agents::{Cashier, Shopper};
use retailsim_core::{CashierState, ShopperState, SimRng, Vector2};

#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

/// `metadata` beyond `state` and `persona`/`lane_id` is non-contractual
/// (`spec.md` §9 open question); this struct carries exactly the two
/// guaranteed fields plus one optional each, nothing more.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackMetadata {
    pub state: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub persona: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub lane_id: Option<u32>,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackMessage {
    pub id: String,
    pub device_id: String,
    pub venue_id: String,
    pub timestamp_ms: u64,
    pub position: Position3,
    pub velocity: Position3,
    pub object_type: &'static str,
    pub color: &'static str,
    pub bounding_box: BoundingBox,
    pub metadata: TrackMetadata,
}

fn maybe_noisy(p: Vector2, sigma: Option<f32>, rng: &mut SimRng) -> Vector2 {
    match sigma {
        Some(s) if s > 0.0 => {
            Vector2::new(p.x + rng.gen_gaussian(0.0, s), p.z + rng.gen_gaussian(0.0, s))
        }
        _ => p,
    }
}

#[allow(clippy::too_many_arguments)]
pub fn shopper_track(
    shopper: &Shopper,
    device_id: &str,
    venue_id: &str,
    timestamp_ms: u64,
    noise_sigma: Option<f32>,
    rng: &mut SimRng,
) -> TrackMessage {
    let pos = maybe_noisy(shopper.pos, noise_sigma, rng);
    let (w, h, d) = shopper.bounding_box;
    TrackMessage {
        id: format!("person-{}", shopper.id.0),
        device_id: device_id.to_string(),
        venue_id: venue_id.to_string(),
        timestamp_ms,
        position: Position3 { x: pos.x, y: 0.0, z: pos.z },
        velocity: Position3 { x: shopper.vel.x, y: 0.0, z: shopper.vel.z },
        object_type: "person",
        color: shopper.color(),
        bounding_box: BoundingBox { width: w, height: h, depth: d },
        metadata: TrackMetadata {
            state: shopper_state_str(shopper.state).to_string(),
            persona: Some(shopper.persona.as_str().to_string()),
            lane_id: shopper.queue_lane.map(|l| l.0),
        },
    }
}

#[allow(clippy::too_many_arguments)]
pub fn cashier_track(
    cashier: &Cashier,
    device_id: &str,
    venue_id: &str,
    timestamp_ms: u64,
    noise_sigma: Option<f32>,
    rng: &mut SimRng,
) -> TrackMessage {
    let pos = maybe_noisy(cashier.pos, noise_sigma, rng);
    TrackMessage {
        id: format!("cashier-{}", cashier.id.0),
        device_id: device_id.to_string(),
        venue_id: venue_id.to_string(),
        timestamp_ms,
        position: Position3 { x: pos.x, y: 0.0, z: pos.z },
        velocity: Position3 { x: 0.0, y: 0.0, z: 0.0 },
        object_type: "person",
        color: "purple",
        bounding_box: BoundingBox { width: 0.5, height: 1.8, depth: 0.5 },
        metadata: TrackMetadata {
            state: cashier_state_str(cashier.state).to_string(),
            persona: None,
            lane_id: Some(cashier.lane_id.0),
        },
    }
}

fn shopper_state_str(state: ShopperState) -> &'static str {
    state.as_str()
}

fn cashier_state_str(state: CashierState) -> &'static str {
    state.as_str()
}
