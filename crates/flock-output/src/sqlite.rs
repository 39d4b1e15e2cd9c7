//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! two tables: `agent_poses` and `tick_summaries`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::PoseWriter;
use crate::{AgentPoseRow, OutputResult, TickSummaryRow};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS agent_poses (
                 agent_id INTEGER NOT NULL,
                 tick     INTEGER NOT NULL,
                 x  REAL NOT NULL, y  REAL NOT NULL, z  REAL NOT NULL,
                 qx REAL NOT NULL, qy REAL NOT NULL, qz REAL NOT NULL, qw REAL NOT NULL
             );
             CREATE TABLE IF NOT EXISTS tick_summaries (
                 tick           INTEGER PRIMARY KEY,
                 sim_time_secs  REAL    NOT NULL,
                 agents         INTEGER NOT NULL,
                 obstacles      INTEGER NOT NULL,
                 mean_neighbors REAL    NOT NULL,
                 mean_speed     REAL    NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl PoseWriter for SqliteWriter {
    fn write_poses(&mut self, rows: &[AgentPoseRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO agent_poses (agent_id, tick, x, y, z, qx, qy, qz, qw) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.agent_id,
                    row.tick as i64,
                    row.x as f64,
                    row.y as f64,
                    row.z as f64,
                    row.qx as f64,
                    row.qy as f64,
                    row.qz as f64,
                    row.qw as f64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_summaries \
             (tick, sim_time_secs, agents, obstacles, mean_neighbors, mean_speed) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                row.tick as i64,
                row.sim_time_secs,
                row.agents as i64,
                row.obstacles as i64,
                row.mean_neighbors,
                row.mean_speed,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
