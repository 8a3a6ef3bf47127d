//! Run and nonlinear-loop options.

use crate::error::{IntegratorError, IntegratorResult};

/// Whether the inner loop may iterate more than once per step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Linearity {
    /// Exactly one solve per step.
    #[default]
    Linear,
    /// Repeat until the relative change drops to the tolerance.
    Nonlinear,
}

impl Linearity {
    pub fn is_linear(self) -> bool {
        matches!(self, Linearity::Linear)
    }
}

/// Options for one integration run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunOptions {
    /// Start time (seconds)
    pub start: f64,
    /// Fixed time step (seconds)
    pub dt: f64,
    /// Final time, inclusive (seconds)
    pub end: f64,
    /// Keep every N-th step; 0 is treated as 1
    pub output_stride: usize,
    /// 0 is quiet; above 0 logs every nonlinear iteration at info level
    pub verbosity: u8,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            start: 0.0,
            dt: 1e-3,
            end: 1.0,
            output_stride: 1,
            verbosity: 0,
        }
    }
}

impl RunOptions {
    pub fn new(start: f64, dt: f64, end: f64) -> Self {
        Self {
            start,
            dt,
            end,
            ..Self::default()
        }
    }

    pub fn with_output_stride(mut self, stride: usize) -> Self {
        self.output_stride = stride;
        self
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Stride with the 0 → 1 normalisation applied.
    pub fn stride(&self) -> usize {
        self.output_stride.max(1)
    }
}

/// Nonlinear loop settings.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NonlinearSettings {
    /// Relative-change threshold at or below which an iteration converges
    pub tolerance: f64,
    /// Maximum iterations per step
    pub max_iterations: usize,
    /// Consecutive non-decreasing relative changes tolerated before giving up
    /// (`None` disables the check)
    pub stall_limit: Option<usize>,
}

impl Default for NonlinearSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-5,
            max_iterations: 100,
            stall_limit: Some(10),
        }
    }
}

impl NonlinearSettings {
    pub fn validate(&self) -> IntegratorResult<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(IntegratorError::InvalidArg {
                what: "tolerance must be finite and positive",
            });
        }
        if self.max_iterations == 0 {
            return Err(IntegratorError::InvalidArg {
                what: "max_iterations must be positive",
            });
        }
        if self.stall_limit == Some(0) {
            return Err(IntegratorError::InvalidArg {
                what: "stall_limit must be positive",
            });
        }
        Ok(())
    }
}
