//! The `PoseWriter` trait implemented by all backend writers.

use crate::{AgentPoseRow, OutputResult, TickSummaryRow};

/// Trait implemented by the CSV and SQLite writers.
///
/// Errors are returned to the caller; [`SimOutputObserver`][crate::SimOutputObserver]
/// stores the first one for [`take_error`][crate::SimOutputObserver::take_error].
pub trait PoseWriter {
    /// Write one snapshot's worth of agent poses.
    fn write_poses(&mut self, rows: &[AgentPoseRow]) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying handles.  Safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
