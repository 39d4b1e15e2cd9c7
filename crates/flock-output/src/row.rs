//! Plain data row types written by output backends.

use flock_agent::Pose;
use flock_core::Tick;
use flock_sim::TickSummary;

/// One agent's pose at a given tick: the population sink contract.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentPoseRow {
    pub agent_id: u32,
    pub tick:     u64,
    pub x:        f32,
    pub y:        f32,
    pub z:        f32,
    /// Orientation quaternion, vector part first.
    pub qx:       f32,
    pub qy:       f32,
    pub qz:       f32,
    pub qw:       f32,
}

impl AgentPoseRow {
    pub fn from_pose(agent_id: u32, tick: Tick, pose: &Pose) -> Self {
        let [x, y, z] = pose.position.to_array();
        let [qx, qy, qz, qw] = pose.orientation.to_array();
        Self { agent_id, tick: tick.0, x, y, z, qx, qy, qz, qw }
    }
}

/// Summary statistics for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummaryRow {
    pub tick:           u64,
    pub sim_time_secs:  f64,
    pub agents:         u64,
    pub obstacles:      u64,
    pub mean_neighbors: f64,
    pub mean_speed:     f64,
}

impl From<&TickSummary> for TickSummaryRow {
    fn from(s: &TickSummary) -> Self {
        Self {
            tick:           s.tick.0,
            sim_time_secs:  s.elapsed_secs,
            agents:         s.agents as u64,
            obstacles:      s.obstacles as u64,
            mean_neighbors: s.mean_neighbors,
            mean_speed:     s.mean_speed,
        }
    }
}
