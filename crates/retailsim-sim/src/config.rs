//! `SimulatorConfig` — aggregates every sub-crate's configuration into the
//! one struct a host application constructs (`spec.md` §6).

use retailsim_agents::{CashierConfig, PersonaTable, ShopperConfig};
use retailsim_queue::ServiceTimeModel;

/// Rolling-window and suggestion thresholds for [`crate::lanestate::LaneStateController`].
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LaneStateConfig {
    pub window_secs: f32,
    pub avg_queue_threshold: f32,
    pub inflow_rate_threshold: f32,
}

impl Default for LaneStateConfig {
    fn default() -> Self {
        LaneStateConfig {
            window_secs: 120.0,
            avg_queue_threshold: 4.0,
            inflow_rate_threshold: 0.5,
        }
    }
}

/// `spec.md` §4.9: per-(shopper,cashier)-pair ID confusion.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IdConfusionConfig {
    pub enabled: bool,
    pub proximity: f32,
    pub probability_per_sec: f64,
    pub swap_duration: (f32, f32),
    pub occlusion_duration: (f32, f32),
}

impl Default for IdConfusionConfig {
    fn default() -> Self {
        IdConfusionConfig {
            enabled: true,
            proximity: 0.6,
            probability_per_sec: 0.03,
            swap_duration: (1.0, 3.0),
            occlusion_duration: (0.5, 2.0),
        }
    }
}

/// Every external configuration knob the simulator exposes, per `spec.md`
/// §6. Mirrors `dt_core::SimConfig`'s role in the teacher workspace: one
/// struct, `Default` giving the documented values, optional
/// `serde::Deserialize` so a host can load it from TOML/JSON.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulatorConfig {
    pub world_w: f32,
    pub world_d: f32,
    pub res: f32,
    pub inflation: f32,
    pub max_occupancy: u32,
    pub shopper: ShopperConfig,
    pub cashier: CashierConfig,
    pub personas: PersonaTable,
    pub service_time: ServiceTimeModel,
    pub max_queue_slots: usize,
    pub lane_state: LaneStateConfig,
    pub id_confusion: IdConfusionConfig,
    /// Per-tick probability of running housekeeping (`spec.md` §4.10 step 5).
    pub housekeeping_probability: f64,
    /// Fixed seed, or `None` for a randomly chosen one.
    pub seed: Option<u64>,
    /// Whether `Simulator::init_from_scene` spawns one cashier per derived lane.
    pub auto_spawn_cashiers: bool,
    /// Optional position-noise sigma applied independently per axis when
    /// materializing track messages (`spec.md` §6), `None` disables it.
    pub track_position_noise_sigma: Option<f32>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            world_w: 20.0,
            world_d: 20.0,
            res: 0.5,
            inflation: 0.5,
            max_occupancy: 200,
            shopper: ShopperConfig::default(),
            cashier: CashierConfig::default(),
            personas: PersonaTable::default(),
            service_time: ServiceTimeModel::default(),
            max_queue_slots: 8,
            lane_state: LaneStateConfig::default(),
            id_confusion: IdConfusionConfig::default(),
            housekeeping_probability: 0.01,
            seed: None,
            auto_spawn_cashiers: true,
            track_position_noise_sigma: Some(0.02),
        }
    }
}
