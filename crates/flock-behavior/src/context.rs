//! Read-only simulation state passed to every force evaluation.

use flock_agent::FlockView;
use flock_core::Tick;

use crate::ObstacleSet;

/// A read-only snapshot of one tick, shared immutably by every agent's
/// force evaluation.
///
/// The backend builds it after the obstacle refresh and before the evaluate
/// phase; nothing it borrows can change until the commit phase starts.
#[derive(Copy, Clone)]
pub struct FlockContext<'a> {
    /// Current simulation tick.
    pub tick: Tick,

    /// Pre-tick position and velocity of every agent.
    pub flock: FlockView<'a>,

    /// Repeller positions refreshed for this tick.
    pub obstacles: &'a ObstacleSet,
}

impl<'a> FlockContext<'a> {
    #[inline]
    pub fn new(tick: Tick, flock: FlockView<'a>, obstacles: &'a ObstacleSet) -> Self {
        Self { tick, flock, obstacles }
    }
}
