//! Range + field-of-view neighbor predicate.
//!
//! Agent `b` is a neighbor of agent `a` when
//!
//! ```text
//! |b.pos − a.pos| < neighbor_distance
//!     AND dot(normalize(a.vel), normalize(b.pos − a.pos)) > cos(neighbor_fov)
//! ```
//!
//! With per-rule radii the scan uses the widest one and each rule keeps only
//! the neighbors inside its own radius.
//!
//! The scan is exhaustive and visits agents in ascending id order, which
//! fixes the floating-point summation order of every rule that averages over
//! neighbors.

use flock_agent::FlockView;
use flock_core::math::normalize_or_skip;
use flock_core::{AgentId, Params, Vec3};

/// Neighbor predicate derived from the flocking radii and `neighbor_fov`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NeighborQuery {
    radius_sq: f32,
    /// `None` means the cone covers every direction.
    cos_fov:   Option<f32>,
}

impl NeighborQuery {
    /// `fov_degrees` is the half-angle of the forward cone; 180 or more means
    /// omnidirectional.  A non-positive `radius` matches nothing.
    pub fn new(radius: f32, fov_degrees: f32) -> Self {
        let radius = if radius.is_finite() { radius.max(0.0) } else { 0.0 };
        let cos_fov = if fov_degrees >= 180.0 {
            None
        } else {
            Some(fov_degrees.to_radians().cos())
        };
        Self { radius_sq: radius * radius, cos_fov }
    }

    /// Scan wide enough for every flocking rule's radius.
    pub fn from_params(params: &Params) -> Self {
        Self::new(params.rule_radii().scan(), params.neighbor_fov)
    }

    /// Does an agent at `origin` heading along `forward` sense `other`?
    ///
    /// A `None` forward (zero velocity) skips the cone test.  Coincident
    /// agents are in range with no defined bearing, so they pass it too.
    #[inline]
    pub fn accepts(&self, origin: Vec3, forward: Option<Vec3>, other: Vec3) -> bool {
        let to = other - origin;
        if to.length_squared() >= self.radius_sq {
            return false;
        }
        match (self.cos_fov, forward, normalize_or_skip(to)) {
            (Some(cos_fov), Some(fwd), Some(dir)) => fwd.dot(dir) > cos_fov,
            _ => true,
        }
    }

    /// Call `f` for every neighbor of `agent`, in ascending id order.
    /// `agent` itself is never reported.
    #[inline]
    pub fn for_each_neighbor(&self, agent: AgentId, flock: &FlockView<'_>, mut f: impl FnMut(AgentId)) {
        let i = agent.index();
        let origin = flock.positions[i];
        let forward = normalize_or_skip(flock.velocities[i]);
        for (j, &other) in flock.positions.iter().enumerate() {
            if j != i && self.accepts(origin, forward, other) {
                f(AgentId(j as u32));
            }
        }
    }

    /// Collect the neighbor set of `agent`.
    pub fn neighbors(&self, agent: AgentId, flock: &FlockView<'_>) -> Vec<AgentId> {
        let mut out = Vec::new();
        self.for_each_neighbor(agent, flock, |n| out.push(n));
        out
    }
}
