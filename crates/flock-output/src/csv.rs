//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `agent_poses.csv`
//! - `tick_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::PoseWriter;
use crate::{AgentPoseRow, OutputResult, TickSummaryRow};

pub const POSE_HEADER: [&str; 9] = ["agent_id", "tick", "x", "y", "z", "qx", "qy", "qz", "qw"];
pub const SUMMARY_HEADER: [&str; 6] =
    ["tick", "sim_time_secs", "agents", "obstacles", "mean_neighbors", "mean_speed"];

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    poses:     Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut poses = Writer::from_path(dir.join("agent_poses.csv"))?;
        poses.write_record(POSE_HEADER)?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(SUMMARY_HEADER)?;

        Ok(Self {
            poses,
            summaries,
            finished: false,
        })
    }
}

impl PoseWriter for CsvWriter {
    fn write_poses(&mut self, rows: &[AgentPoseRow]) -> OutputResult<()> {
        for row in rows {
            self.poses.write_record(&[
                row.agent_id.to_string(),
                row.tick.to_string(),
                row.x.to_string(),
                row.y.to_string(),
                row.z.to_string(),
                row.qx.to_string(),
                row.qy.to_string(),
                row.qz.to_string(),
                row.qw.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.sim_time_secs.to_string(),
            row.agents.to_string(),
            row.obstacles.to_string(),
            row.mean_neighbors.to_string(),
            row.mean_speed.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.poses.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
