//! Simulation time model.
//!
//! # Design
//!
//! Time is a monotonically increasing `Tick` counter plus the accumulated
//! simulated seconds.  Each tick may advance by a different `dt` (the host
//! decides, typically its frame time), so `SimClock` sums the `dt`s rather
//! than multiplying a fixed step.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Tracks the current tick and the simulated seconds elapsed since tick 0.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// The current tick, advanced by [`SimClock::advance`] after each step.
    pub current_tick: Tick,
    /// Sum of every `dt` applied so far, in seconds.
    pub elapsed_secs: f64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by one tick of length `dt` seconds.
    #[inline]
    pub fn advance(&mut self, dt: f32) {
        self.current_tick = Tick(self.current_tick.0 + 1);
        self.elapsed_secs += dt as f64;
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.3} s)", self.current_tick, self.elapsed_secs)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Run-level configuration: population, seed, step size, and output cadence.
///
/// Flocking behaviour itself is tuned through [`Params`][crate::Params];
/// `SimConfig` only covers how the run is driven.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Number of agents seeded by `Sim::initialize`.
    pub population: usize,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Seconds per tick used by `Sim::run`.  `Sim::tick` takes its own `dt`.
    pub dt: f32,

    /// Total ticks for `Sim::run`.
    pub total_ticks: u64,

    /// Worker thread count for the parallel backend.  `None` uses Rayon's
    /// global pool (all logical cores).
    pub num_threads: Option<usize>,

    /// Emit a pose snapshot every N ticks.  0 disables snapshots.
    pub output_interval_ticks: u64,

    /// Radius of the sphere, centred on `Params::wall_center`, inside which
    /// agents spawn.
    pub seed_radius: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            population:            256,
            seed:                  42,
            dt:                    1.0 / 60.0,
            total_ticks:           600,
            num_threads:           None,
            output_interval_ticks: 1,
            seed_radius:           1.0,
        }
    }
}

impl SimConfig {
    /// The tick at which `Sim::run` stops (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// `true` if a snapshot is due at `tick`.
    #[inline]
    pub fn snapshot_due(&self, tick: Tick) -> bool {
        self.output_interval_ticks > 0 && tick.0 % self.output_interval_ticks == 0
    }
}
