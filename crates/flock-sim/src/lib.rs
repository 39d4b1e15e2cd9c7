//! `flock-sim`: tick loop orchestrator for the `flock` boids simulation.
//!
//! # Two-phase tick
//!
//! ```text
//! tick(dt):
//!   ⓪ Params    : apply any bundle staged since the previous tick.
//!   ① Obstacles : poll the ObstacleProvider into the tick's ObstacleSet.
//!   ② Evaluate  : ForceModel::steer for every agent, written to a force
//!                 buffer.  Reads only pre-tick state.
//!   ③ Commit    : Integrator for every agent, consuming its force slot.
//! ```
//!
//! Phase ③ never starts for any agent before phase ② has finished for all
//! agents.  Both backends enforce this; they differ in how they dispatch the
//! work:
//!
//! | Backend              | Storage                 | Dispatch                                  |
//! |----------------------|-------------------------|-------------------------------------------|
//! | [`SequentialBackend`]| live `AgentStore`       | agent by agent (evaluate on Rayon with `parallel`) |
//! | [`ParallelBackend`]  | fixed flat buffers      | Rayon, fixed-size batches, both passes    |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | Runs the sequential backend's evaluate phase on Rayon.   |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use flock_core::{Params, SimConfig};
//! use flock_sim::{NoopObserver, ParallelBackend, Sim};
//!
//! let config = SimConfig { population: 16_384, ..SimConfig::default() };
//! let mut sim = Sim::initialize(config, Params::default(), ParallelBackend::new())?;
//! sim.run(&mut NoopObserver)?;
//! sim.shutdown();
//! ```

pub mod backend;
pub mod builder;
pub mod error;
pub mod observer;
pub mod parallel;
pub mod sequential;
pub mod sim;

#[cfg(test)]
mod tests;

pub use backend::{Backend, StepInput, StepStats};
pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver, TickSummary};
pub use parallel::{DEFAULT_BATCH_SIZE, ParallelBackend};
pub use sequential::SequentialBackend;
pub use sim::Sim;
