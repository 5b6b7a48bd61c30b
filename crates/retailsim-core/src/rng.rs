//! Deterministic per-agent and simulation-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each agent gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (agent_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive agent IDs uniformly across the seed space.
//! Agents never share RNG state, and because ticks are single-threaded and
//! iteration order is stable (insertion order), every stochastic draw in
//! `spec.md` §9 — persona pick, stop count, dwell duration, micro-shift
//! interval, confusion roll — happens in the same relative order across
//! runs with the same seed, which is what the byte-identical reproducibility
//! property in `spec.md` §8 requires.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::AgentId;

const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG, derived once at spawn from the simulator's
/// global seed and the agent's id.
#[derive(Clone, Debug)]
pub struct AgentRng(SmallRng);

impl AgentRng {
    pub fn new(global_seed: u64, agent: AgentId) -> Self {
        let seed = global_seed ^ (agent.0 as u64).wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Choose a random element from a non-empty slice. `None` if empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }

    /// Shuffle a mutable slice in-place (Fisher-Yates).
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }

    /// Sample `N(mean, sigma)`. Used for cashier micro-motion jitter and
    /// track-message position noise (`spec.md` §4.7, §6).
    #[inline]
    pub fn gen_gaussian(&mut self, mean: f32, sigma: f32) -> f32 {
        Normal::new(mean, sigma).unwrap().sample(&mut self.0)
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG for global operations (arrival scheduling, spawn
/// delays, A* tie-breaking, ID-confusion rolls) — every draw that isn't
/// logically owned by one specific agent.
pub struct SimRng(SmallRng);

impl SimRng {
    /// `seed = None` draws a seed from OS entropy (`spec.md` §6: "integer
    /// (fixed) or null (random)").
    pub fn new(seed: Option<u64>) -> (Self, u64) {
        let seed = seed.unwrap_or_else(|| rand::thread_rng().r#gen());
        (SimRng(SmallRng::seed_from_u64(seed)), seed)
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    #[inline]
    pub fn gen_gaussian(&mut self, mean: f32, sigma: f32) -> f32 {
        Normal::new(mean, sigma).unwrap().sample(&mut self.0)
    }
}
