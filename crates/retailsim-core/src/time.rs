//! Simulation time model.
//!
//! # Design
//!
//! Unlike `dt-core`'s hourly-resolution `Tick`, this simulator ticks at a
//! fixed real-time rate (default 10 Hz, i.e. `dt = 0.1 s`) driven externally
//! by the tick driver calling `update(dt)`. `Tick` here is still a
//! monotonically increasing counter — one per `update()` call — so
//! event-bounded logic (lane hysteresis windows, timeouts) can be expressed
//! either in elapsed simulated seconds (accumulated from `dt`) or in tick
//! counts, without depending on wall-clock time.

use std::fmt;

/// An absolute simulation tick counter — one per call to `update(dt)`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    #[inline]
    pub fn next(self) -> Tick {
        Tick(self.0 + 1)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Tracks elapsed simulated time as a virtual clock driven purely by the
/// `dt` sequence passed to `update()`. Never reads the wall clock — this is
/// what makes the byte-identical reproducibility property in `spec.md` §8
/// possible: two runs fed the same `dt` sequence produce the same
/// `elapsed_secs()` at every tick regardless of how long the host process
/// actually took.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    pub current_tick: Tick,
    /// Total simulated seconds elapsed since tick 0.
    pub elapsed_secs: f64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by one tick of `dt` seconds.
    #[inline]
    pub fn advance(&mut self, dt: f32) {
        self.current_tick = self.current_tick.next();
        self.elapsed_secs += dt as f64;
    }

    /// Current simulated time in milliseconds, used as the track message
    /// `timestamp_ms` field.
    #[inline]
    pub fn timestamp_ms(&self) -> u64 {
        (self.elapsed_secs * 1000.0).round() as u64
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1}s)", self.current_tick, self.elapsed_secs)
    }
}
