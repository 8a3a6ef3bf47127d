//! Time grid shared by output sizing and stepping.
//!
//! The step count is an integer derived once from `(end - start) / dt`.
//! Times are computed as `start + i*dt`, never by repeated addition, so the
//! sizing pass and the stepping pass cannot disagree.

use crate::error::{IntegratorError, IntegratorResult};

/// Relative slack for snapping `(end - start) / dt` to the nearest integer.
const STEP_SNAP_TOL: f64 = 1e-9;

/// Upper bound on the number of steps in one run.
pub const MAX_STEPS: usize = 100_000_000;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeGrid {
    start: f64,
    dt: f64,
    steps: usize,
}

impl TimeGrid {
    /// Grid of all `start + i*dt <= end`, requiring `start <= end`.
    ///
    /// A ratio within `STEP_SNAP_TOL` of an integer counts as that integer, so
    /// `end` is reached even when `(end - start) / dt` is off by rounding.
    pub fn new(start: f64, dt: f64, end: f64) -> IntegratorResult<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(IntegratorError::InvalidArg {
                what: "start and end times must be finite",
            });
        }
        if !dt.is_finite() || dt <= 0.0 {
            return Err(IntegratorError::InvalidArg {
                what: "time step must be finite and positive",
            });
        }
        if start > end {
            return Err(IntegratorError::InvalidArg {
                what: "start time after end time",
            });
        }

        let ratio = (end - start) / dt;
        let nearest = ratio.round();
        let steps = if (ratio - nearest).abs() <= STEP_SNAP_TOL * nearest.max(1.0) {
            nearest
        } else {
            ratio.floor()
        };
        if !steps.is_finite() || steps > MAX_STEPS as f64 {
            return Err(IntegratorError::InvalidArg {
                what: "too many time steps",
            });
        }

        Ok(Self {
            start,
            dt,
            steps: steps as usize,
        })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Number of steps after the initial state.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Number of time points including the initial one.
    pub fn point_count(&self) -> usize {
        self.steps + 1
    }

    pub fn time_at(&self, step: usize) -> f64 {
        self.start + step as f64 * self.dt
    }

    pub fn last_time(&self) -> f64 {
        self.time_at(self.steps)
    }

    /// Number of retained snapshots for a given output stride.
    pub fn output_len(&self, stride: usize) -> usize {
        self.steps / stride.max(1) + 1
    }

    /// Output slot of `step`, if that step is retained.
    pub fn output_slot(&self, step: usize, stride: usize) -> Option<usize> {
        let stride = stride.max(1);
        (step % stride == 0).then_some(step / stride)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn every_retained_step_has_a_slot(
            start in -10.0_f64..10.0,
            span in 0.0_f64..10.0,
            dt in 0.01_f64..2.0,
            stride in 1usize..7,
        ) {
            let grid = TimeGrid::new(start, dt, start + span).unwrap();
            let len = grid.output_len(stride);
            let mut filled = 0;
            for step in 0..=grid.steps() {
                if let Some(slot) = grid.output_slot(step, stride) {
                    prop_assert!(slot < len);
                    filled += 1;
                }
            }
            prop_assert_eq!(filled, len);
            prop_assert!(grid.last_time() <= start + span + 1e-9 * (1.0 + span.abs()));
        }
    }
}
