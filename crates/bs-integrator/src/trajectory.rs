//! Output sequence of a run.

use crate::stats::RunStats;
use nalgebra::DVector;

/// Retained snapshots of the global state.
///
/// `states[0]` is the initial state; `times[i]` is the time of `states[i]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
    pub times: Vec<f64>,
    pub states: Vec<DVector<f64>>,
    pub stats: RunStats,
}

impl Trajectory {
    /// Result of a run whose start time lies after its end time.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn final_state(&self) -> Option<&DVector<f64>> {
        self.states.last()
    }

    /// History of one degree of freedom across the retained snapshots.
    pub fn dof_series(&self, dof: usize) -> Option<Vec<f64>> {
        self.states.iter().map(|s| s.get(dof).copied()).collect()
    }
}
