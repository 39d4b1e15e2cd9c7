//! The `Backend` trait: how a tick's two phases are dispatched.

use flock_agent::{AgentStore, FlockView};
use flock_behavior::{ForceModel, Integrator, ObstacleSet};
use flock_core::{Params, Quat, Tick};

use crate::SimResult;

/// Everything a backend needs for one tick.  Built by [`Sim`][crate::Sim]
/// after the obstacle refresh; shared read-only by every agent.
pub struct StepInput<'a> {
    pub tick:       Tick,
    pub dt:         f32,
    pub model:      &'a ForceModel,
    pub integrator: &'a Integrator,
    pub obstacles:  &'a ObstacleSet,
}

/// Aggregates gathered while stepping, for tick summaries.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StepStats {
    pub agents:          usize,
    /// Sum of every agent's neighbor-set size.
    pub total_neighbors: u64,
    /// Sum of every agent's post-integration speed.
    pub speed_sum:       f64,
}

impl StepStats {
    pub fn mean_neighbors(&self) -> f64 {
        if self.agents == 0 { 0.0 } else { self.total_neighbors as f64 / self.agents as f64 }
    }

    pub fn mean_speed(&self) -> f64 {
        if self.agents == 0 { 0.0 } else { self.speed_sum / self.agents as f64 }
    }
}

/// An execution strategy for the evaluate/commit tick.
///
/// Implementations must finish evaluating every agent before committing any,
/// so that no force reads a position or velocity from the tick in progress.
pub trait Backend: Send {
    /// Short label for logs.
    fn name(&self) -> &'static str;

    /// Take ownership of a seeded population, replacing any previous one.
    ///
    /// Fails without starting a run if storage cannot be allocated.
    fn load(&mut self, store: AgentStore, params: &Params) -> SimResult<()>;

    /// Use a dedicated pool of `threads` workers.  Backends that do not run
    /// on a pool ignore it.
    fn configure_threads(&mut self, _threads: usize) -> SimResult<()> {
        Ok(())
    }

    /// Number of agents currently loaded.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Advance every agent by one tick.
    fn step(&mut self, input: &StepInput<'_>) -> StepStats;

    /// Current positions and velocities.
    fn view(&self) -> FlockView<'_>;

    /// Current headings, indexed like [`view`](Self::view).
    fn orientations(&self) -> &[Quat];

    /// Free all agent storage.  The backend is empty afterwards.
    fn release(&mut self);
}
