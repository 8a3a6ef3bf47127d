//! Error types for time integration.

use bs_formulation::FormulationError;
use bs_linalg::LinalgError;
use thiserror::Error;

/// Errors encountered while constructing or running the integrator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegratorError {
    #[error("Invalid constancy flags: expected 0 or 3 entries, got {len}")]
    InvalidConstancyFlags { len: usize },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Initial state has {actual} entries but the formulation has {expected} dofs")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error(
        "Convergence failed at step {step} (t = {time}): {iterations} iterations, relative change {relative_change:e}"
    )]
    ConvergenceFailed {
        step: usize,
        time: f64,
        iterations: usize,
        relative_change: f64,
    },

    #[error(
        "Nonlinear iteration stagnated at step {step} (t = {time}) after {iterations} iterations, relative change {relative_change:e}"
    )]
    Stagnated {
        step: usize,
        time: f64,
        iterations: usize,
        relative_change: f64,
    },

    #[error("Non-finite {what} at step {step} (t = {time})")]
    NonFinite {
        what: &'static str,
        step: usize,
        time: f64,
    },

    #[error("Formulation error: {0}")]
    Formulation(#[from] FormulationError),

    #[error("Linear algebra error: {0}")]
    Linalg(#[from] LinalgError),
}

pub type IntegratorResult<T> = Result<T, IntegratorError>;

impl IntegratorError {
    /// True for failures of the nonlinear loop rather than of the setup.
    pub fn is_convergence_failure(&self) -> bool {
        matches!(
            self,
            IntegratorError::ConvergenceFailed { .. } | IntegratorError::Stagnated { .. }
        )
    }
}
