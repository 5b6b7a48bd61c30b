//! Shopper personas and their spawn-time configuration (`spec.md` §6).

use retailsim_core::SimRng;

#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Persona {
    FastBuyer,
    Browser,
    Family,
    Staff,
}

impl Persona {
    pub fn as_str(self) -> &'static str {
        match self {
            Persona::FastBuyer => "fast_buyer",
            Persona::Browser => "browser",
            Persona::Family => "family",
            Persona::Staff => "staff",
        }
    }
}

/// Per-persona spawn-time ranges. `stay_time` is in minutes (matching the
/// cashier shift/break ranges, which are explicitly minutes in `spec.md`
/// §6); everywhere else in the simulator durations are seconds, so callers
/// must convert with `PersonaConfig::sample_target_stay_secs`.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PersonaConfig {
    pub probability: f32,
    pub stops: (u32, u32),
    pub speed: (f32, f32),
    pub stay_minutes: (f32, f32),
    pub checkout_probability: f64,
}

impl PersonaConfig {
    pub fn sample_num_stops(&self, rng: &mut SimRng) -> u32 {
        rng.gen_range(self.stops.0..=self.stops.1)
    }

    pub fn sample_speed(&self, rng: &mut SimRng) -> f32 {
        rng.gen_range(self.speed.0..self.speed.1)
    }

    pub fn sample_target_stay_secs(&self, rng: &mut SimRng) -> f32 {
        rng.gen_range(self.stay_minutes.0..self.stay_minutes.1) * 60.0
    }

    pub fn sample_will_checkout(&self, rng: &mut SimRng) -> bool {
        rng.gen_bool(self.checkout_probability)
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PersonaTable {
    pub fast_buyer: PersonaConfig,
    pub browser: PersonaConfig,
    pub family: PersonaConfig,
    pub staff: PersonaConfig,
}

impl Default for PersonaTable {
    fn default() -> Self {
        PersonaTable {
            fast_buyer: PersonaConfig {
                probability: 0.3,
                stops: (1, 3),
                speed: (1.0, 1.3),
                stay_minutes: (2.0, 5.0),
                checkout_probability: 0.9,
            },
            browser: PersonaConfig {
                probability: 0.4,
                stops: (4, 8),
                speed: (0.7, 1.0),
                stay_minutes: (5.0, 15.0),
                checkout_probability: 0.85,
            },
            family: PersonaConfig {
                probability: 0.2,
                stops: (3, 6),
                speed: (0.5, 0.8),
                stay_minutes: (8.0, 20.0),
                checkout_probability: 0.95,
            },
            staff: PersonaConfig {
                probability: 0.1,
                stops: (0, 2),
                speed: (1.0, 1.2),
                stay_minutes: (30.0, 60.0),
                checkout_probability: 0.0,
            },
        }
    }
}

impl PersonaTable {
    pub fn config(&self, persona: Persona) -> &PersonaConfig {
        match persona {
            Persona::FastBuyer => &self.fast_buyer,
            Persona::Browser => &self.browser,
            Persona::Family => &self.family,
            Persona::Staff => &self.staff,
        }
    }

    /// Weighted pick by `probability`. Falls back to `Browser` if the table
    /// was misconfigured with zero total weight.
    pub fn pick(&self, rng: &mut SimRng) -> Persona {
        let total = self.fast_buyer.probability
            + self.browser.probability
            + self.family.probability
            + self.staff.probability;
        if total <= 0.0 {
            return Persona::Browser;
        }
        let roll = rng.gen_range(0.0..total);
        let mut acc = self.fast_buyer.probability;
        if roll < acc {
            return Persona::FastBuyer;
        }
        acc += self.browser.probability;
        if roll < acc {
            return Persona::Browser;
        }
        acc += self.family.probability;
        if roll < acc {
            return Persona::Family;
        }
        Persona::Staff
    }
}
