use std::collections::TryReserveError;

use flock_core::FlockError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("{what} length {got} does not match agent count {expected}")]
    AgentCountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("cannot allocate {what} for {agents} agents: {source}")]
    Allocation {
        what:   &'static str,
        agents: usize,
        source: TryReserveError,
    },

    #[error("cannot build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid time step {0}")]
    InvalidStep(f32),

    #[error("simulation has been shut down")]
    ShutDown,

    #[error(transparent)]
    Core(#[from] FlockError),
}

pub type SimResult<T> = Result<T, SimError>;
