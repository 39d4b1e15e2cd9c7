//! Agent-by-agent backend over a live `AgentStore`.

use flock_agent::{AgentStore, FlockView, Pose};
use flock_behavior::{FlockContext, ForceModel};
use flock_core::{AgentId, Params, Quat, Vec3};

use crate::{Backend, SimResult, StepInput, StepStats};

/// Backend for small populations.
///
/// The population is a live collection: agents may be spawned and despawned
/// between ticks.  Each tick still runs as evaluate-all then commit-all, so
/// agent order never affects the result.
#[derive(Default)]
pub struct SequentialBackend {
    store: AgentStore,
}

impl SequentialBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &AgentStore {
        &self.store
    }

    /// Register a new agent.  Takes effect from the next tick.
    pub fn spawn(&mut self, position: Vec3, velocity: Vec3) -> AgentId {
        self.store.push(position, velocity)
    }

    /// Remove an agent; the last agent takes over its id.
    pub fn despawn(&mut self, agent: AgentId) -> Option<Pose> {
        self.store.swap_remove(agent)
    }
}

impl Backend for SequentialBackend {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn load(&mut self, store: AgentStore, _params: &Params) -> SimResult<()> {
        self.store = store;
        Ok(())
    }

    fn len(&self) -> usize {
        self.store.len()
    }

    fn step(&mut self, input: &StepInput<'_>) -> StepStats {
        // Explicit field borrows so the borrow checker sees disjoint access.
        let AgentStore { position, velocity, force, orientation } = &mut self.store;

        // ── Phase 1: evaluate every agent against the pre-tick snapshot ───
        let total_neighbors = {
            let ctx = FlockContext::new(
                input.tick,
                FlockView::new(&position[..], &velocity[..]),
                input.obstacles,
            );
            evaluate(input.model, &ctx, force)
        };

        // ── Phase 2: commit ───────────────────────────────────────────────
        let integrator = input.integrator;
        let mut speed_sum = 0.0f64;
        for i in 0..position.len() {
            orientation[i] = integrator.integrate(
                &mut position[i],
                &mut velocity[i],
                force[i],
                input.dt,
            );
            force[i] = Vec3::ZERO;
            speed_sum += velocity[i].length() as f64;
        }

        StepStats {
            agents: position.len(),
            total_neighbors,
            speed_sum,
        }
    }

    fn view(&self) -> FlockView<'_> {
        self.store.view()
    }

    fn orientations(&self) -> &[Quat] {
        &self.store.orientation
    }

    fn release(&mut self) {
        self.store = AgentStore::default();
    }
}

/// Write every agent's steering force into `force`; return the total
/// neighbor count.
#[cfg(not(feature = "parallel"))]
fn evaluate(model: &ForceModel, ctx: &FlockContext<'_>, force: &mut [Vec3]) -> u64 {
    force
        .iter_mut()
        .enumerate()
        .map(|(i, slot)| {
            let steering = model.steer(AgentId(i as u32), ctx);
            *slot = steering.force;
            steering.neighbors as u64
        })
        .sum()
}

#[cfg(feature = "parallel")]
fn evaluate(model: &ForceModel, ctx: &FlockContext<'_>, force: &mut [Vec3]) -> u64 {
    use rayon::prelude::*;

    force
        .par_iter_mut()
        .enumerate()
        .map(|(i, slot)| {
            let steering = model.steer(AgentId(i as u32), ctx);
            *slot = steering.force;
            steering.neighbors as u64
        })
        .sum()
}
