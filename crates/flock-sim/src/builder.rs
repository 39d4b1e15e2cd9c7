//! Fluent builder for constructing a [`Sim`].

use flock_agent::{AgentStore, AgentStoreBuilder};
use flock_behavior::{NoObstacles, ObstacleProvider};
use flock_core::{Params, SimConfig};

use crate::{Backend, Sim, SimError, SimResult};

/// Fluent builder for [`Sim<B, P>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: population, seed, step size, …
/// - [`Params`]: the initial flocking parameters
/// - `B: Backend`: where agent state lives and how ticks are dispatched
///
/// # Optional inputs (have defaults)
///
/// | Method            | Default                                             |
/// |-------------------|-----------------------------------------------------|
/// | `.store(s)`       | `config.population` agents seeded from `config.seed` |
/// | `.obstacles(p)`   | [`NoObstacles`]                                     |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, Params::default(), ParallelBackend::new())
///     .obstacles(StaticObstacles(vec![Obstacle::point(Vec3::ZERO)]))
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<B: Backend, P: ObstacleProvider = NoObstacles> {
    config:   SimConfig,
    params:   Params,
    backend:  B,
    store:    Option<AgentStore>,
    provider: P,
}

impl<B: Backend> SimBuilder<B> {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, params: Params, backend: B) -> Self {
        Self {
            config,
            params,
            backend,
            store:    None,
            provider: NoObstacles,
        }
    }
}

impl<B: Backend, P: ObstacleProvider> SimBuilder<B, P> {
    /// Supply an already-populated store (must hold `config.population`
    /// agents).
    pub fn store(mut self, store: AgentStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Supply the obstacle provider polled at the start of every tick.
    pub fn obstacles<Q: ObstacleProvider>(self, provider: Q) -> SimBuilder<B, Q> {
        SimBuilder {
            config:   self.config,
            params:   self.params,
            backend:  self.backend,
            store:    self.store,
            provider,
        }
    }

    /// Validate inputs, seed and load the population, and return a
    /// ready-to-run [`Sim`].
    pub fn build(mut self) -> SimResult<Sim<B, P>> {
        // ── Validate ──────────────────────────────────────────────────────
        let dt = self.config.dt;
        if !dt.is_finite() || dt < 0.0 {
            return Err(SimError::InvalidStep(dt));
        }
        if self.config.num_threads == Some(0) {
            return Err(SimError::Config("num_threads must be at least 1".into()));
        }

        // ── Resolve the population ────────────────────────────────────────
        let store = match self.store {
            Some(s) => {
                if s.len() != self.config.population {
                    return Err(SimError::AgentCountMismatch {
                        expected: self.config.population,
                        got:      s.len(),
                        what:     "agent store",
                    });
                }
                s
            }
            None => AgentStoreBuilder::new(self.config.population, self.config.seed)
                .seed_volume(self.params.wall_center, self.config.seed_radius)
                .init_speed(self.params.init_speed)
                .build()?,
        };

        // ── Hand it to the backend ────────────────────────────────────────
        if let Some(threads) = self.config.num_threads {
            self.backend.configure_threads(threads)?;
        }
        self.backend.load(store, &self.params)?;

        Ok(Sim::assemble(self.config, self.params, self.backend, self.provider))
    }
}
