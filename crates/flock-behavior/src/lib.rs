//! `flock-behavior`: the flocking model itself.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                         |
//! |---------------|------------------------------------------------------------------|
//! | [`context`]   | `FlockContext<'a>`: read-only tick snapshot shared by all agents |
//! | [`obstacle`]  | `Obstacle`, `ObstacleSet`, `ObstacleProvider` + stock providers  |
//! | [`neighbor`]  | `NeighborQuery`: range + field-of-view neighbor predicate       |
//! | [`force`]     | `ForceModel`: separation, alignment, cohesion, walls, repulsion |
//! | [`integrate`] | `Integrator`, `SpeedRamp`: force → velocity → position          |
//!
//! # Design notes
//!
//! Every tick runs in two phases, whichever backend drives it:
//!
//! 1. **Evaluate**: for every agent, `ForceModel::steer` reads the shared
//!    `FlockContext` and returns that agent's steering force.  No mutation.
//!
//! 2. **Commit**: for every agent, `Integrator::integrate` consumes its force
//!    and updates only that agent's own position, velocity, and heading.
//!
//! Because phase 1 never observes a value written by phase 2 of the same
//! tick, results do not depend on agent order or thread scheduling.

pub mod context;
pub mod force;
pub mod integrate;
pub mod neighbor;
pub mod obstacle;


pub use context::FlockContext;
pub use force::{Contributions, ForceModel, Steering};
pub use integrate::{Integrator, SpeedRamp};
pub use neighbor::NeighborQuery;
pub use obstacle::{
    FnObstacles, NoObstacles, Obstacle, ObstacleProvider, ObstacleSet, StaticObstacles,
    Unavailable,
};
