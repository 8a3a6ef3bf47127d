//! Error types for operator assembly.

use bs_core::error::CoreError;
use bs_linalg::LinalgError;
use thiserror::Error;

/// Errors that can occur while assembling or querying operators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulationError {
    #[error("Operator not assembled: {what}")]
    NotAssembled { what: &'static str },

    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Constraint on dof {dof} is out of range for {dofs} dofs")]
    ConstraintOutOfRange { dof: usize, dofs: usize },

    #[error("Linear algebra error: {0}")]
    Linalg(#[from] LinalgError),
}

pub type FormulationResult<T> = Result<T, FormulationError>;

impl From<FormulationError> for CoreError {
    fn from(e: FormulationError) -> Self {
        match e {
            FormulationError::NotAssembled { what } => CoreError::Invariant { what },
            FormulationError::NonPhysical { what } => CoreError::InvalidArg { what },
            FormulationError::InvalidArg { what } => CoreError::InvalidArg { what },
            FormulationError::DimensionMismatch {
                what,
                expected,
                actual,
            } => CoreError::IndexOob {
                what,
                index: actual,
                len: expected,
            },
            FormulationError::ConstraintOutOfRange { dof, dofs } => CoreError::IndexOob {
                what: "constraint dof",
                index: dof,
                len: dofs,
            },
            FormulationError::Linalg(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FormulationError::NotAssembled { what: "stiffness" };
        assert!(err.to_string().contains("stiffness"));
    }

    #[test]
    fn error_conversion() {
        let err = FormulationError::ConstraintOutOfRange { dof: 5, dofs: 3 };
        let core: CoreError = err.into();
        assert!(matches!(core, CoreError::IndexOob { index: 5, len: 3, .. }));
    }
}
