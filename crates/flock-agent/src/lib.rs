//! `flock-agent`: Structure-of-Arrays agent storage for the `flock` simulation.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`store`]       | `AgentStore` (SoA arrays), `FlockView` (read snapshot), `Pose` |
//! | [`builder`]     | `AgentStoreBuilder` (seeded population construction)      |

pub mod builder;
pub mod store;


pub use builder::AgentStoreBuilder;
pub use store::{AgentStore, FlockView, Pose};
