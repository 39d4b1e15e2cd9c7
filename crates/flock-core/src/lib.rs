//! `flock-core`: foundational types for the `flock` boids simulation.
//!
//! This crate is a dependency of every other `flock-*` crate.  It intentionally
//! has no `flock-*` dependencies and minimal external ones (`glam`, `rand`
//! and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`                                             |
//! | [`math`]        | `normalize_or_skip`, `clamp_length`, `look_rotation`  |
//! | [`params`]      | `Params`, `RuleSet`, `RuleRadii`, `ParamIssue`        |
//! | [`time`]        | `Tick`, `SimClock`, `SimConfig`                       |
//! | [`rng`]         | `AgentRng` (per-agent spawn randomness)               |
//! | [`error`]       | `FlockError`, `FlockResult`                           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required to load `Params` from JSON files.                 |

pub mod error;
pub mod ids;
pub mod math;
pub mod params;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{FlockError, FlockResult};
pub use ids::AgentId;
pub use params::{ParamIssue, Params, RuleRadii, RuleSet};
pub use rng::AgentRng;
pub use time::{SimClock, SimConfig, Tick};

pub use glam::{Quat, Vec3};
