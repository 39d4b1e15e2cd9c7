//! Data-parallel backend over fixed-capacity flat buffers.
//!
//! # Buffers
//!
//! | Buffer        | Written by        | Read by                      |
//! |---------------|-------------------|------------------------------|
//! | `position`    | integrate pass    | force pass (all agents)      |
//! | `velocity`    | integrate pass    | force pass (all agents)      |
//! | `force`       | force pass        | integrate pass (same agent)  |
//! | `ramp`        | integrate pass    | integrate pass (same agent)  |
//! | `orientation` | integrate pass    | population sink              |
//!
//! Each pass splits the population into batches of `batch_size` agents and
//! hands batches to Rayon.  Within a pass no agent writes another agent's
//! slot, so no locking is needed.  The force pass's parallel iterator
//! completes before the integrate pass starts, which is the only ordering
//! the model requires.

use flock_agent::{AgentStore, FlockView};
use flock_behavior::{FlockContext, SpeedRamp};
use flock_core::{AgentId, Params, Quat, Vec3};
use rayon::prelude::*;

use crate::{Backend, SimError, SimResult, StepInput, StepStats};

/// Agents per dispatched batch.
pub const DEFAULT_BATCH_SIZE: usize = 256;

/// Backend for large populations (tens of thousands of agents).
///
/// The population size is fixed between [`load`](Backend::load) calls;
/// changing it means loading a freshly seeded store.
pub struct ParallelBackend {
    batch_size:  usize,
    pool:        Option<rayon::ThreadPool>,

    position:    Vec<Vec3>,
    velocity:    Vec<Vec3>,
    orientation: Vec<Quat>,
    force:       Vec<Vec3>,
    ramp:        Vec<SpeedRamp>,
}

impl Default for ParallelBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ParallelBackend {
    /// Backend on Rayon's global pool with [`DEFAULT_BATCH_SIZE`].
    pub fn new() -> Self {
        Self {
            batch_size:  DEFAULT_BATCH_SIZE,
            pool:        None,
            position:    Vec::new(),
            velocity:    Vec::new(),
            orientation: Vec::new(),
            force:       Vec::new(),
            ramp:        Vec::new(),
        }
    }

    /// Override the batch size (minimum 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of batches each pass dispatches.
    #[inline]
    pub fn batch_count(&self) -> usize {
        self.position.len().div_ceil(self.batch_size)
    }

    /// Force-scratch buffer.  All zero between ticks.
    pub fn force_buffer(&self) -> &[Vec3] {
        &self.force
    }

    /// Per-agent max-speed ramp state.
    pub fn ramps(&self) -> &[SpeedRamp] {
        &self.ramp
    }

    /// Buffer capacity in agents (what was allocated at load time).
    pub fn capacity(&self) -> usize {
        self.force.capacity()
    }
}

impl Backend for ParallelBackend {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn load(&mut self, store: AgentStore, params: &Params) -> SimResult<()> {
        self.release();
        let agents = store.len();

        let mut force = Vec::new();
        force
            .try_reserve_exact(agents)
            .map_err(|source| SimError::Allocation { what: "force buffer", agents, source })?;
        force.resize(agents, Vec3::ZERO);

        let mut ramp = Vec::new();
        ramp
            .try_reserve_exact(agents)
            .map_err(|source| SimError::Allocation { what: "speed ramp buffer", agents, source })?;
        let (_, max_speed) = params.speed_limits();
        ramp.resize(agents, SpeedRamp::settled(max_speed));

        let AgentStore { position, velocity, orientation, .. } = store;
        self.position = position;
        self.velocity = velocity;
        self.orientation = orientation;
        self.force = force;
        self.ramp = ramp;
        Ok(())
    }

    fn configure_threads(&mut self, threads: usize) -> SimResult<()> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("flock-worker-{i}"))
            .build()?;
        self.pool = Some(pool);
        Ok(())
    }

    fn len(&self) -> usize {
        self.position.len()
    }

    fn step(&mut self, input: &StepInput<'_>) -> StepStats {
        let batch = self.batch_size;
        let Self { pool, position, velocity, orientation, force, ramp, .. } = self;
        let agents = position.len();

        let mut passes = || {
            // ── Pass 1: force ─────────────────────────────────────────────
            let total_neighbors: u64 = {
                let ctx = FlockContext::new(
                    input.tick,
                    FlockView::new(&position[..], &velocity[..]),
                    input.obstacles,
                );
                force
                    .par_chunks_mut(batch)
                    .enumerate()
                    .map(|(b, chunk)| {
                        let base = b * batch;
                        let mut neighbors = 0u64;
                        for (j, slot) in chunk.iter_mut().enumerate() {
                            let steering = input.model.steer(AgentId((base + j) as u32), &ctx);
                            *slot = steering.force;
                            neighbors += steering.neighbors as u64;
                        }
                        neighbors
                    })
                    .sum()
            };

            // ── Pass 2: integrate ─────────────────────────────────────────
            let integrator = input.integrator;
            let batch_speeds: Vec<f64> = position
                .par_chunks_mut(batch)
                .zip(velocity.par_chunks_mut(batch))
                .zip(orientation.par_chunks_mut(batch))
                .zip(force.par_chunks_mut(batch))
                .zip(ramp.par_chunks_mut(batch))
                .map(|((((p, v), o), f), r)| {
                    let mut speed_sum = 0.0f64;
                    for j in 0..p.len() {
                        o[j] = integrator.integrate_ramped(&mut p[j], &mut v[j], f[j], input.dt, &mut r[j]);
                        f[j] = Vec3::ZERO;
                        speed_sum += v[j].length() as f64;
                    }
                    speed_sum
                })
                .collect();

            // Summed in batch order so the statistic is reproducible.
            (total_neighbors, batch_speeds.iter().sum::<f64>())
        };

        let (total_neighbors, speed_sum) = match pool {
            Some(pool) => pool.install(passes),
            None => passes(),
        };

        StepStats { agents, total_neighbors, speed_sum }
    }

    fn view(&self) -> FlockView<'_> {
        FlockView::new(&self.position, &self.velocity)
    }

    fn orientations(&self) -> &[Quat] {
        &self.orientation
    }

    fn release(&mut self) {
        self.position = Vec::new();
        self.velocity = Vec::new();
        self.orientation = Vec::new();
        self.force = Vec::new();
        self.ramp = Vec::new();
    }
}
