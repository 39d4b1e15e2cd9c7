//! Fluent builder for seeding an `AgentStore`.
//!
//! # Usage
//!
//! ```rust
//! use flock_agent::AgentStoreBuilder;
//! use flock_core::Vec3;
//!
//! let store = AgentStoreBuilder::new(1_000, /*seed=*/ 42)
//!     .seed_volume(Vec3::ZERO, 2.0)
//!     .init_speed(2.0)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(store.len(), 1_000);
//! assert!(store.position.iter().all(|p| p.length() <= 2.0 + 1e-4));
//! ```

use flock_core::{AgentId, AgentRng, FlockError, FlockResult, Vec3};

use crate::AgentStore;

/// Fluent builder for a seeded [`AgentStore`].
///
/// Each agent draws from its own [`AgentRng`], so agent `i` spawns at the
/// same place with the same heading regardless of the population size.
pub struct AgentStoreBuilder {
    count:       usize,
    seed:        u64,
    center:      Vec3,
    radius:      f32,
    init_speed:  f32,
}

impl AgentStoreBuilder {
    /// Create a builder for `count` agents using `seed` as the global RNG seed.
    ///
    /// Defaults: unit seed sphere at the origin, initial speed 1.
    pub fn new(count: usize, seed: u64) -> Self {
        Self {
            count,
            seed,
            center:     Vec3::ZERO,
            radius:     1.0,
            init_speed: 1.0,
        }
    }

    /// Spawn positions are uniform inside the sphere `(center, radius)`.
    pub fn seed_volume(mut self, center: Vec3, radius: f32) -> Self {
        self.center = center;
        self.radius = radius.max(0.0);
        self
    }

    /// Initial velocity magnitude; the direction is uniformly random.
    pub fn init_speed(mut self, speed: f32) -> Self {
        self.init_speed = speed;
        self
    }

    /// Allocate all SoA arrays and seed every agent.
    ///
    /// Fails with [`FlockError::Allocation`] if storage for `count` agents
    /// cannot be reserved; no partial store is returned.
    pub fn build(self) -> FlockResult<AgentStore> {
        let mut store = AgentStore::try_with_capacity(self.count).map_err(|source| {
            FlockError::Allocation { agents: self.count, source }
        })?;

        let count = u32::try_from(self.count)
            .map_err(|_| FlockError::Config(format!("population {} exceeds u32", self.count)))?;

        for i in 0..count {
            let mut rng = AgentRng::new(self.seed, AgentId(i));
            let position = self.center + rng.in_unit_sphere() * self.radius;
            let velocity = rng.unit_vector() * self.init_speed;
            store.push(position, velocity);
        }

        Ok(store)
    }
}
