//! Error types for linear-algebra operations.

use bs_core::CoreError;
use thiserror::Error;

/// Errors raised by factorization and solve calls.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinalgError {
    #[error("Matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("Cannot factorize an empty matrix")]
    Empty,

    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Singular matrix of dimension {dimension}")]
    Singular { dimension: usize },

    #[error("Solver not factorized; call factorize() first")]
    NotFactorized,

    #[error("Non-finite entries in {what}")]
    NonFinite { what: &'static str },
}

pub type LinalgResult<T> = Result<T, LinalgError>;

impl From<LinalgError> for CoreError {
    fn from(e: LinalgError) -> Self {
        match e {
            LinalgError::NotSquare { .. } => CoreError::InvalidArg {
                what: "matrix shape",
            },
            LinalgError::Empty => CoreError::InvalidArg {
                what: "empty matrix",
            },
            LinalgError::DimensionMismatch { what, .. } => CoreError::InvalidArg { what },
            LinalgError::Singular { .. } => CoreError::Invariant {
                what: "non-singular operator",
            },
            LinalgError::NotFactorized => CoreError::Invariant {
                what: "factorization present",
            },
            LinalgError::NonFinite { what } => CoreError::NonFinite {
                what,
                value: f64::NAN,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = LinalgError::NotSquare { rows: 2, cols: 3 };
        assert!(err.to_string().contains("2x3"));
    }

    #[test]
    fn error_conversion() {
        let core: CoreError = LinalgError::Singular { dimension: 4 }.into();
        assert!(matches!(core, CoreError::Invariant { .. }));
    }
}
