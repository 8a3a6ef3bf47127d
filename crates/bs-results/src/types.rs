//! Result data types.

use bs_integrator::{RunStats, Trajectory};
use bs_project::{Project, RunMode};
use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub run_id: RunId,
    pub project_name: String,
    /// RFC 3339, UTC
    pub timestamp: String,
    pub mode: RunMode,
    pub start: f64,
    pub dt: f64,
    pub end: f64,
    pub output_stride: usize,
    pub dof_count: usize,
    pub snapshot_count: usize,
    pub solver_version: String,
    pub stats: RunStats,
}

impl RunManifest {
    /// Describe a finished run of `project`, stamped with the current time.
    pub fn for_run(
        run_id: RunId,
        project: &Project,
        trajectory: &Trajectory,
        solver_version: &str,
    ) -> Self {
        Self {
            run_id,
            project_name: project.name.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            mode: project.run.mode,
            start: project.run.start,
            dt: project.run.dt,
            end: project.run.end,
            output_stride: project.run.output_every,
            dof_count: project.problem.dof_count(),
            snapshot_count: trajectory.len(),
            solver_version: solver_version.to_string(),
            stats: trajectory.stats.clone(),
        }
    }
}

/// One retained state, stored as one line of `snapshots.jsonl`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotRecord {
    pub index: usize,
    pub time_s: f64,
    pub values: Vec<f64>,
}

pub fn snapshots_from_trajectory(trajectory: &Trajectory) -> Vec<SnapshotRecord> {
    trajectory
        .times
        .iter()
        .zip(&trajectory.states)
        .enumerate()
        .map(|(index, (&time_s, state))| SnapshotRecord {
            index,
            time_s,
            values: state.iter().copied().collect(),
        })
        .collect()
}

/// `(time, value)` history of one dof, or `None` if a snapshot is too short.
pub fn dof_series(records: &[SnapshotRecord], dof: usize) -> Option<Vec<(f64, f64)>> {
    records
        .iter()
        .map(|r| r.values.get(dof).map(|&v| (r.time_s, v)))
        .collect()
}
