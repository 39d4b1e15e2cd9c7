//! `flock-output`: simulation output writers for the `flock` workspace.
//!
//! Two backends are provided:
//!
//! | Feature   | Backend | Files created                              |
//! |-----------|---------|--------------------------------------------|
//! | *(none)*  | CSV     | `agent_poses.csv`, `tick_summaries.csv`    |
//! | `sqlite`  | SQLite  | `output.db`                                |
//!
//! Both implement [`PoseWriter`] and are driven by [`SimOutputObserver`],
//! which implements `flock_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use flock_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer);
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{AgentPoseRow, TickSummaryRow};
pub use writer::PoseWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
