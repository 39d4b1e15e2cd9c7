//! `SimOutputObserver<W>` bridges `SimObserver` to a `PoseWriter`.

use flock_agent::Pose;
use flock_core::Tick;
use flock_sim::{SimObserver, TickSummary};

use crate::row::{AgentPoseRow, TickSummaryRow};
use crate::writer::PoseWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes pose snapshots and tick summaries to any
/// [`PoseWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: PoseWriter> {
    writer:     W,
    rows:       Vec<AgentPoseRow>,
    last_error: Option<OutputError>,
}

impl<W: PoseWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            rows:       Vec::new(),
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: PoseWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, _tick: Tick, summary: &TickSummary) {
        let result = self.writer.write_tick_summary(&TickSummaryRow::from(summary));
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, poses: &[Pose]) {
        if poses.is_empty() {
            return;
        }
        self.rows.clear();
        self.rows.extend(
            poses
                .iter()
                .enumerate()
                .map(|(i, pose)| AgentPoseRow::from_pose(i as u32, tick, pose)),
        );
        let result = self.writer.write_poses(&self.rows);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
