//! The `Sim` struct and its tick loop.

use flock_agent::{FlockView, Pose};
use flock_behavior::{ForceModel, Integrator, NoObstacles, ObstacleProvider, ObstacleSet};
use flock_core::{Params, SimClock, SimConfig};
use tracing::{info, trace, warn};

use crate::{Backend, SimBuilder, SimError, SimObserver, SimResult, StepInput, TickSummary};

/// The main simulation runner.
///
/// `Sim<B, P>` owns the population (through its [`Backend`]), the active
/// [`Params`], and the obstacle provider, and drives the tick loop:
///
/// 1. **Params**: a bundle staged with [`stage_params`](Self::stage_params)
///    replaces the active one, so every agent of a tick sees exactly one
///    configuration.
/// 2. **Obstacles**: the provider is polled once into the tick's
///    [`ObstacleSet`].
/// 3. **Step**: the backend evaluates every agent's steering force, then
///    commits every agent.
///
/// Create via [`Sim::initialize`] or [`SimBuilder`].
pub struct Sim<B: Backend, P: ObstacleProvider = NoObstacles> {
    /// Run-level configuration (population, seed, step size, …).
    pub config: SimConfig,

    /// Current tick and elapsed simulated seconds.
    pub clock: SimClock,

    params:     Params,
    pending:    Option<Params>,
    model:      ForceModel,
    integrator: Integrator,

    obstacles: ObstacleSet,
    provider:  P,

    backend: B,

    /// Reused for snapshot callbacks.
    pose_buf: Vec<Pose>,
    running:  bool,
}

impl<B: Backend> Sim<B> {
    /// Seed `config.population` agents and load them into `backend`.
    ///
    /// Fails, without starting a run, if the population cannot be allocated
    /// or the configuration is unusable.
    pub fn initialize(config: SimConfig, params: Params, backend: B) -> SimResult<Self> {
        SimBuilder::new(config, params, backend).build()
    }
}

impl<B: Backend, P: ObstacleProvider> Sim<B, P> {
    /// Assemble a sim around a backend that already holds its population.
    pub(crate) fn assemble(config: SimConfig, params: Params, backend: B, provider: P) -> Self {
        log_issues(&params);
        info!(
            backend = backend.name(),
            agents = backend.len(),
            seed = config.seed,
            "simulation initialized"
        );
        Self {
            config,
            clock: SimClock::new(),
            model: ForceModel::new(&params),
            integrator: Integrator::new(&params),
            params,
            pending: None,
            obstacles: ObstacleSet::new(),
            provider,
            backend,
            pose_buf: Vec::new(),
            running: true,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// The parameters used by the most recent (or next, if none staged) tick.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Replace the parameters from the next tick on.
    ///
    /// Staging twice before a tick keeps only the later bundle.
    pub fn stage_params(&mut self, params: Params) {
        self.pending = Some(params);
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable backend access between ticks, e.g. to spawn agents into a
    /// [`SequentialBackend`][crate::SequentialBackend].
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Obstacles seen by the most recent tick.
    pub fn obstacles(&self) -> &ObstacleSet {
        &self.obstacles
    }

    pub fn model(&self) -> &ForceModel {
        &self.model
    }

    /// Current positions and velocities.
    pub fn view(&self) -> FlockView<'_> {
        self.backend.view()
    }

    /// `(position, orientation)` per agent, indexed by `AgentId`.
    pub fn poses(&self) -> impl Iterator<Item = Pose> + '_ {
        poses_of(&self.backend)
    }

    /// `false` once [`shutdown`](Self::shutdown) has been called.
    pub fn is_running(&self) -> bool {
        self.running
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Advance every agent by `dt` seconds.
    ///
    /// `dt` may vary between ticks.  A zero `dt` refreshes obstacles and
    /// orientations without moving anything.
    pub fn tick(&mut self, dt: f32) -> SimResult<TickSummary> {
        if !self.running {
            return Err(SimError::ShutDown);
        }
        if !dt.is_finite() || dt < 0.0 {
            return Err(SimError::InvalidStep(dt));
        }
        let now = self.clock.current_tick;

        // ── Phase 0: staged parameters ────────────────────────────────────
        if let Some(params) = self.pending.take() {
            self.apply_params(params);
        }

        // ── Phase 1: obstacle refresh ─────────────────────────────────────
        self.obstacles.refresh(&mut self.provider, now);

        // ── Phase 2 + 3: evaluate, then commit ────────────────────────────
        let stats = self.backend.step(&StepInput {
            tick:       now,
            dt,
            model:      &self.model,
            integrator: &self.integrator,
            obstacles:  &self.obstacles,
        });

        self.clock.advance(dt);

        let summary = TickSummary {
            tick:           now,
            elapsed_secs:   self.clock.elapsed_secs,
            agents:         stats.agents,
            obstacles:      self.obstacles.len(),
            mean_neighbors: stats.mean_neighbors(),
            mean_speed:     stats.mean_speed(),
        };
        trace!(
            tick = %now,
            agents = summary.agents,
            obstacles = summary.obstacles,
            mean_neighbors = summary.mean_neighbors,
            mean_speed = summary.mean_speed,
            "tick complete"
        );
        Ok(summary)
    }

    /// Run the simulation from the current tick to `config.end_tick()` with
    /// `config.dt` per tick.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.clock.current_tick < self.config.end_tick() {
            self.observed_tick(observer)?;
        }
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.observed_tick(observer)?;
        }
        Ok(())
    }

    /// Release backend storage.  Further ticks fail with
    /// [`SimError::ShutDown`].  Calling this twice is harmless.
    pub fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        self.backend.release();
        self.obstacles.clear();
        self.pose_buf = Vec::new();
        self.running = false;
        info!(tick = %self.clock.current_tick, elapsed_secs = self.clock.elapsed_secs, "simulation shut down");
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn observed_tick<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);
        let summary = self.tick(self.config.dt)?;
        observer.on_tick_end(now, &summary);
        if self.config.snapshot_due(now) {
            self.pose_buf.clear();
            self.pose_buf.extend(poses_of(&self.backend));
            observer.on_snapshot(now, &self.pose_buf);
        }
        Ok(())
    }

    fn apply_params(&mut self, params: Params) {
        log_issues(&params);
        self.model = ForceModel::new(&params);
        self.integrator = Integrator::new(&params);
        self.params = params;
    }
}

fn log_issues(params: &Params) {
    for issue in params.issues() {
        warn!(%issue, "parameter adjusted");
    }
}

fn poses_of<B: Backend>(backend: &B) -> impl Iterator<Item = Pose> + '_ {
    let view = backend.view();
    view.positions
        .iter()
        .zip(backend.orientations())
        .map(|(&position, &orientation)| Pose { position, orientation })
}
