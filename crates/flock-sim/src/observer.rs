//! Simulation observer trait for progress reporting and data collection.

use flock_agent::Pose;
use flock_core::Tick;

/// What happened during one tick.  Passed to
/// [`SimObserver::on_tick_end`] and returned by [`Sim::tick`][crate::Sim::tick].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TickSummary {
    /// The tick that was just processed.
    pub tick:           Tick,
    /// Simulated seconds elapsed once this tick completed.
    pub elapsed_secs:   f64,
    pub agents:         usize,
    /// Obstacles active during this tick.
    pub obstacles:      usize,
    /// Mean neighbor-set size across the population.
    pub mean_neighbors: f64,
    /// Mean post-integration speed across the population.
    pub mean_speed:     f64,
}

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
///         if tick.0 % self.interval == 0 {
///             println!("{tick}: mean speed {:.2}", summary.mean_speed);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before parameters or obstacles
    /// are refreshed.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once every agent has been committed.
    fn on_tick_end(&mut self, _tick: Tick, _summary: &TickSummary) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks`
    /// ticks) with one pose per agent, indexed by `AgentId`.
    fn on_snapshot(&mut self, _tick: Tick, _poses: &[Pose]) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
