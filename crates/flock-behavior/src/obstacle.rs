//! Repeller obstacles and the provider seam that supplies them each tick.
//!
//! The core never discovers obstacles on its own.  The host injects an
//! [`ObstacleProvider`]; the simulation polls it once per tick, before the
//! evaluate phase, and copies the result into a reusable [`ObstacleSet`].

use flock_core::{Tick, Vec3};
use tracing::debug;

// ── Obstacle ──────────────────────────────────────────────────────────────────

/// A spherical repeller.  `radius == 0` is a point.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Obstacle {
    pub center: Vec3,
    pub radius: f32,
}

impl Obstacle {
    #[inline]
    pub fn point(center: Vec3) -> Self {
        Self { center, radius: 0.0 }
    }

    #[inline]
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self { center, radius: radius.max(0.0) }
    }

    /// Closest point of the obstacle to `p`.
    ///
    /// For points inside the sphere this is `p` itself.
    pub fn nearest_point(&self, p: Vec3) -> Vec3 {
        if self.radius <= 0.0 {
            return self.center;
        }
        let offset = p - self.center;
        let dist = offset.length();
        if dist <= self.radius {
            p
        } else {
            self.center + offset * (self.radius / dist)
        }
    }
}

// ── ObstacleSet ───────────────────────────────────────────────────────────────

/// Per-tick snapshot of every repeller.  An empty set is valid and common.
#[derive(Clone, Debug, Default)]
pub struct ObstacleSet {
    obstacles: Vec<Obstacle>,
}

impl ObstacleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(obstacles: Vec<Obstacle>) -> Self {
        Self { obstacles }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Obstacle> {
        self.obstacles.iter()
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
    }

    /// Replace the contents with whatever `provider` reports for `tick`.
    ///
    /// An unavailable provider leaves the set empty for this tick.  Returns
    /// `false` in that case.
    pub fn refresh<P: ObstacleProvider + ?Sized>(&mut self, provider: &mut P, tick: Tick) -> bool {
        self.obstacles.clear();
        match provider.poll(tick, &mut self.obstacles) {
            Ok(()) => true,
            Err(Unavailable) => {
                self.obstacles.clear();
                debug!(%tick, "obstacle provider unavailable; using empty set");
                false
            }
        }
    }
}

impl<'a> IntoIterator for &'a ObstacleSet {
    type Item = &'a Obstacle;
    type IntoIter = std::slice::Iter<'a, Obstacle>;

    fn into_iter(self) -> Self::IntoIter {
        self.obstacles.iter()
    }
}

// ── ObstacleProvider ──────────────────────────────────────────────────────────

/// Marker returned by a provider that cannot report obstacles this tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Unavailable;

/// Source of current repeller positions, polled once per tick.
///
/// # Example
///
/// ```rust
/// use flock_behavior::{FnObstacles, Obstacle, ObstacleSet, Unavailable};
/// use flock_core::{Tick, Vec3};
///
/// // A repeller orbiting the origin.
/// let mut provider = FnObstacles(|tick: Tick, out: &mut Vec<Obstacle>| -> Result<(), Unavailable> {
///     let a = tick.0 as f32 * 0.1;
///     out.push(Obstacle::point(Vec3::new(a.cos(), 0.0, a.sin())));
///     Ok(())
/// });
/// let mut set = ObstacleSet::new();
/// assert!(set.refresh(&mut provider, Tick(0)));
/// assert_eq!(set.len(), 1);
/// ```
pub trait ObstacleProvider: Send {
    /// Append the obstacles active at `tick` to `out` (which arrives empty).
    fn poll(&mut self, tick: Tick, out: &mut Vec<Obstacle>) -> Result<(), Unavailable>;
}

/// Provider for scenes without repellers.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoObstacles;

impl ObstacleProvider for NoObstacles {
    fn poll(&mut self, _tick: Tick, _out: &mut Vec<Obstacle>) -> Result<(), Unavailable> {
        Ok(())
    }
}

/// Provider for a fixed list of repellers.
#[derive(Clone, Debug, Default)]
pub struct StaticObstacles(pub Vec<Obstacle>);

impl ObstacleProvider for StaticObstacles {
    fn poll(&mut self, _tick: Tick, out: &mut Vec<Obstacle>) -> Result<(), Unavailable> {
        out.extend_from_slice(&self.0);
        Ok(())
    }
}

/// Adapts a closure into an [`ObstacleProvider`].
pub struct FnObstacles<F>(pub F);

impl<F> ObstacleProvider for FnObstacles<F>
where
    F: FnMut(Tick, &mut Vec<Obstacle>) -> Result<(), Unavailable> + Send,
{
    fn poll(&mut self, tick: Tick, out: &mut Vec<Obstacle>) -> Result<(), Unavailable> {
        (self.0)(tick, out)
    }
}
