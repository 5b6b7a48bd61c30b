//! Behavioral constants shared by `Shopper` and `Cashier` (`spec.md` §6).

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShopperConfig {
    pub max_speed: f32,
    pub min_speed: f32,
    pub personal_space_radius: f32,
    pub agent_radius: f32,
    pub browsing_dwell: (f32, f32),
    pub queue_walk_timeout: f32,
    pub queue_wait_timeout: f32,
    pub exit_corridor_z: f32,
    pub wobble_amplitude: f32,
    pub wobble_freq: (f32, f32),
    pub spawn_delay: (f32, f32),
    pub anti_glitch: AntiGlitchConfig,
}

impl Default for ShopperConfig {
    fn default() -> Self {
        ShopperConfig {
            max_speed: 1.5,
            min_speed: 0.3,
            personal_space_radius: 0.5,
            agent_radius: 0.25,
            browsing_dwell: (3.0, 15.0),
            queue_walk_timeout: 30.0,
            queue_wait_timeout: 120.0,
            exit_corridor_z: 3.0,
            wobble_amplitude: 0.08,
            wobble_freq: (1.5, 2.5),
            spawn_delay: (0.0, 2.0),
            anti_glitch: AntiGlitchConfig::default(),
        }
    }
}

/// `spec.md` §4.5/§6: stuck/oscillation detection thresholds.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AntiGlitchConfig {
    pub stuck_speed: f32,
    pub stuck_time: f32,
    pub oscillation_window: usize,
    pub oscillation_threshold: f32,
    pub max_attempts: f32,
}

impl Default for AntiGlitchConfig {
    fn default() -> Self {
        AntiGlitchConfig {
            stuck_speed: 0.05,
            stuck_time: 2.0,
            oscillation_window: 10,
            oscillation_threshold: 0.3,
            max_attempts: 10.0,
        }
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CashierConfig {
    pub shift_minutes: (f32, f32),
    pub break_probability_per_hour: f64,
    pub break_minutes: (f32, f32),
    pub jitter_sigma: f32,
    pub service_area_size: f32,
    pub micro_shift_radius: f32,
    pub micro_shift_interval: (f32, f32),
    pub micro_shift_duration: (f32, f32),
    pub open_confirm_window: f32,
    pub close_grace_window: f32,
}

impl Default for CashierConfig {
    fn default() -> Self {
        CashierConfig {
            shift_minutes: (30.0, 180.0),
            break_probability_per_hour: 0.15,
            break_minutes: (2.0, 10.0),
            jitter_sigma: 0.04,
            service_area_size: 1.5,
            micro_shift_radius: 0.2,
            micro_shift_interval: (30.0, 180.0),
            micro_shift_duration: (2.0, 6.0),
            open_confirm_window: 120.0,
            close_grace_window: 180.0,
        }
    }
}
