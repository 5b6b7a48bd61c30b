//! Checkout service-time models (`spec.md` §6, §9, §12).

use retailsim_core::AgentRng;

/// How long a checkout takes. `Fixed` is the "simple" contract the
/// simulator actually wires up by default; `BasketWeighted` is the
/// configurable refinement `spec.md` §9 mentions without fully specifying.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ServiceTimeModel {
    Fixed(f32),
    BasketWeighted {
        small: (f32, f32),
        medium: (f32, f32),
        large: (f32, f32),
        /// `(small, medium, large)`, must sum to 1.0.
        weights: (f32, f32, f32),
        friction_probability: f64,
        friction_range: (f32, f32),
    },
}

impl Default for ServiceTimeModel {
    fn default() -> Self {
        ServiceTimeModel::Fixed(15.0)
    }
}

impl ServiceTimeModel {
    pub fn default_basket_weighted() -> Self {
        ServiceTimeModel::BasketWeighted {
            small: (20.0, 60.0),
            medium: (45.0, 120.0),
            large: (90.0, 240.0),
            weights: (0.35, 0.45, 0.20),
            friction_probability: 0.08,
            friction_range: (15.0, 60.0),
        }
    }

    /// Draw a service duration in seconds from the per-agent RNG.
    pub fn sample(&self, rng: &mut AgentRng) -> f32 {
        match self {
            ServiceTimeModel::Fixed(secs) => *secs,
            ServiceTimeModel::BasketWeighted {
                small,
                medium,
                large,
                weights,
                friction_probability,
                friction_range,
            } => {
                let roll: f32 = rng.gen_range(0.0..1.0);
                let base = if roll < weights.0 {
                    rng.gen_range(small.0..small.1)
                } else if roll < weights.0 + weights.1 {
                    rng.gen_range(medium.0..medium.1)
                } else {
                    rng.gen_range(large.0..large.1)
                };
                if rng.gen_bool(*friction_probability) {
                    base + rng.gen_range(friction_range.0..friction_range.1)
                } else {
                    base
                }
            }
        }
    }
}
