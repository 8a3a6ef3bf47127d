//! Factorize-once, solve-many linear solvers.
//!
//! ## Workflow
//! 1. `factorize(matrix)` decomposes the left-hand side
//! 2. `solve(rhs)` runs forward/backward substitution on the cached factors
//! 3. Repeat `solve()` with new right-hand sides without re-factorizing

use crate::error::{LinalgError, LinalgResult};
use nalgebra::linalg::LU;
use nalgebra::{DMatrix, DVector, Dyn};

/// A linear solver that keeps its factorization between solves.
///
/// The integrator decides when the factorization is stale; implementations only
/// guarantee that `solve` uses the factors of the most recent `factorize` call.
pub trait LinearSolver {
    /// Factorize `matrix`, replacing any previous factorization.
    fn factorize(&mut self, matrix: &DMatrix<f64>) -> LinalgResult<()>;

    /// Solve `A x = rhs` with the cached factorization of `A`.
    fn solve(&self, rhs: &DVector<f64>) -> LinalgResult<DVector<f64>>;

    /// Returns true if the solver holds a valid factorization.
    fn is_factorized(&self) -> bool;

    /// Number of factorizations performed over the solver's lifetime.
    fn factorization_count(&self) -> usize;

    /// Drop the cached factorization.
    fn reset(&mut self);
}

/// Dense LU (partial pivoting) solver backed by `nalgebra`.
#[derive(Debug, Default)]
pub struct DenseLu {
    /// Cached LU factors.
    factorization: Option<LU<f64, Dyn, Dyn>>,
    /// Matrix dimension (N×N).
    dimension: usize,
    factorizations: usize,
}

impl DenseLu {
    /// Creates a new solver (unfactorized).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

impl LinearSolver for DenseLu {
    fn factorize(&mut self, matrix: &DMatrix<f64>) -> LinalgResult<()> {
        if matrix.nrows() != matrix.ncols() {
            return Err(LinalgError::NotSquare {
                rows: matrix.nrows(),
                cols: matrix.ncols(),
            });
        }
        if matrix.nrows() == 0 {
            return Err(LinalgError::Empty);
        }
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(LinalgError::NonFinite {
                what: "left-hand side",
            });
        }

        // A failed factorization must not leave stale factors behind.
        self.factorization = None;
        self.dimension = matrix.nrows();

        let lu = matrix.clone().lu();
        self.factorizations += 1;
        if !lu.is_invertible() {
            return Err(LinalgError::Singular {
                dimension: self.dimension,
            });
        }

        tracing::trace!(dimension = self.dimension, "LU factorization computed");
        self.factorization = Some(lu);
        Ok(())
    }

    fn solve(&self, rhs: &DVector<f64>) -> LinalgResult<DVector<f64>> {
        let lu = self
            .factorization
            .as_ref()
            .ok_or(LinalgError::NotFactorized)?;

        if rhs.len() != self.dimension {
            return Err(LinalgError::DimensionMismatch {
                what: "right-hand side",
                expected: self.dimension,
                actual: rhs.len(),
            });
        }

        let solution = lu.solve(rhs).ok_or(LinalgError::Singular {
            dimension: self.dimension,
        })?;

        // Pivots that are tiny but nonzero pass is_invertible and blow up here.
        if solution.iter().any(|v| !v.is_finite()) {
            return Err(LinalgError::Singular {
                dimension: self.dimension,
            });
        }

        Ok(solution)
    }

    fn is_factorized(&self) -> bool {
        self.factorization.is_some()
    }

    fn factorization_count(&self) -> usize {
        self.factorizations
    }

    fn reset(&mut self) {
        self.factorization = None;
        self.dimension = 0;
    }
}
