//! Core agent storage: `AgentStore` (SoA data) and `FlockView` (read snapshot).
//!
//! # Why a separate view type?
//!
//! The evaluate phase of a tick reads every agent's position and velocity
//! while writing each agent's own force slot.  Borrowing the whole store
//! immutably would forbid that write.  `FlockView` borrows only the two
//! read-side arrays, so the force array can be borrowed mutably alongside it:
//!
//! ```ignore
//! let AgentStore { position, velocity, force, .. } = &mut store;
//! let view = FlockView::new(position, velocity);
//! for (i, f) in force.iter_mut().enumerate() {
//!     *f = model.steer(AgentId(i as u32), &view, ...).force;
//! }
//! ```

use std::collections::TryReserveError;

use flock_core::math::look_rotation;
use flock_core::{AgentId, Quat, Vec3};

// ── Pose ──────────────────────────────────────────────────────────────────────

/// What a renderer needs for one agent: where it is and which way it faces.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    pub position:    Vec3,
    pub orientation: Quat,
}

// ── FlockView ─────────────────────────────────────────────────────────────────

/// Read-only snapshot of every agent's kinematic state for one tick.
///
/// Both slices have the same length; `AgentId(i)` indexes both.
#[derive(Copy, Clone, Debug)]
pub struct FlockView<'a> {
    pub positions:  &'a [Vec3],
    pub velocities: &'a [Vec3],
}

impl<'a> FlockView<'a> {
    /// # Panics
    /// Panics in debug mode if the slices differ in length.
    #[inline]
    pub fn new(positions: &'a [Vec3], velocities: &'a [Vec3]) -> Self {
        debug_assert_eq!(positions.len(), velocities.len());
        Self { positions, velocities }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn position(&self, agent: AgentId) -> Vec3 {
        self.positions[agent.index()]
    }

    #[inline]
    pub fn velocity(&self, agent: AgentId) -> Vec3 {
        self.velocities[agent.index()]
    }
}

// ── AgentStore ────────────────────────────────────────────────────────────────

/// Structure-of-Arrays storage for all agent state.
///
/// Every `Vec` field has exactly `len()` elements; the `AgentId` value is the
/// index into all of them:
///
/// ```ignore
/// let pos = store.position[agent.index()];  // O(1), cache-friendly
/// ```
///
/// The population is a live collection: hosts may [`push`](Self::push) and
/// [`swap_remove`](Self::swap_remove) agents between ticks.  Within a tick the
/// backend treats it as a fixed snapshot.
#[derive(Clone, Debug, Default)]
pub struct AgentStore {
    /// World-space position.
    pub position: Vec<Vec3>,

    /// Velocity.  `min_speed ≤ |v| ≤ max_speed` after every integration step.
    pub velocity: Vec<Vec3>,

    /// Steering acceleration accumulated during the evaluate phase and
    /// consumed (then zeroed) by integration.
    pub force: Vec<Vec3>,

    /// Heading derived from the post-clamp velocity.
    pub orientation: Vec<Quat>,
}

impl AgentStore {
    /// Empty store with room for `capacity` agents.
    ///
    /// Fails instead of aborting if the allocation cannot be satisfied.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut store = Self::default();
        store.position.try_reserve_exact(capacity)?;
        store.velocity.try_reserve_exact(capacity)?;
        store.force.try_reserve_exact(capacity)?;
        store.orientation.try_reserve_exact(capacity)?;
        Ok(store)
    }

    /// Number of agents.
    #[inline]
    pub fn len(&self) -> usize {
        self.position.len()
    }

    /// `true` if there are no agents.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    /// Iterator over all `AgentId`s in ascending index order.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        (0..self.len() as u32).map(AgentId)
    }

    /// Read-only kinematic snapshot.
    #[inline]
    pub fn view(&self) -> FlockView<'_> {
        FlockView::new(&self.position, &self.velocity)
    }

    /// Position and heading of one agent.
    #[inline]
    pub fn pose(&self, agent: AgentId) -> Pose {
        Pose {
            position:    self.position[agent.index()],
            orientation: self.orientation[agent.index()],
        }
    }

    /// Append an agent and return its id.  The orientation is derived from
    /// `velocity`; the force slot starts at zero.
    pub fn push(&mut self, position: Vec3, velocity: Vec3) -> AgentId {
        let id = AgentId(self.len() as u32);
        self.position.push(position);
        self.velocity.push(velocity);
        self.force.push(Vec3::ZERO);
        self.orientation.push(look_rotation(velocity, Vec3::Y));
        id
    }

    /// Remove `agent`, moving the last agent into its slot.
    ///
    /// Returns the removed pose, or `None` if `agent` is out of range.  The
    /// agent that previously had id `len() - 1` now has id `agent`.
    pub fn swap_remove(&mut self, agent: AgentId) -> Option<Pose> {
        let i = agent.index();
        if i >= self.len() {
            return None;
        }
        let position = self.position.swap_remove(i);
        self.velocity.swap_remove(i);
        self.force.swap_remove(i);
        let orientation = self.orientation.swap_remove(i);
        Some(Pose { position, orientation })
    }
}
