//! Backward Euler system construction.

use crate::error::{LinalgError, LinalgResult};
use nalgebra::{DMatrix, DVector};

fn check_square(what: &'static str, m: &DMatrix<f64>, n: usize) -> LinalgResult<()> {
    if m.nrows() != m.ncols() {
        return Err(LinalgError::NotSquare {
            rows: m.nrows(),
            cols: m.ncols(),
        });
    }
    if m.nrows() != n {
        return Err(LinalgError::DimensionMismatch {
            what,
            expected: n,
            actual: m.nrows(),
        });
    }
    Ok(())
}

/// Left-hand side `C + dt*K` of the implicit Euler update.
pub fn implicit_euler_lhs(
    damping: &DMatrix<f64>,
    stiffness: &DMatrix<f64>,
    dt: f64,
) -> LinalgResult<DMatrix<f64>> {
    let n = damping.nrows();
    check_square("damping", damping, n)?;
    check_square("stiffness", stiffness, n)?;
    Ok(damping + stiffness * dt)
}

/// Right-hand side `C*x_prev + dt*rhs` of the implicit Euler update.
pub fn implicit_euler_rhs(
    damping: &DMatrix<f64>,
    x_prev: &DVector<f64>,
    rhs: &DVector<f64>,
    dt: f64,
) -> LinalgResult<DVector<f64>> {
    let n = damping.nrows();
    if x_prev.len() != n {
        return Err(LinalgError::DimensionMismatch {
            what: "previous state",
            expected: n,
            actual: x_prev.len(),
        });
    }
    if rhs.len() != n {
        return Err(LinalgError::DimensionMismatch {
            what: "load vector",
            expected: n,
            actual: rhs.len(),
        });
    }
    Ok(damping * x_prev + rhs * dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lhs_combines_operators() {
        let c = DMatrix::identity(2, 2);
        let k = DMatrix::from_row_slice(2, 2, &[2.0, -1.0, -1.0, 2.0]);
        let lhs = implicit_euler_lhs(&c, &k, 0.5).unwrap();
        assert_eq!(lhs, DMatrix::from_row_slice(2, 2, &[2.0, -0.5, -0.5, 2.0]));
    }

    #[test]
    fn lhs_rejects_mismatched_shapes() {
        let c = DMatrix::identity(2, 2);
        let k = DMatrix::identity(3, 3);
        let err = implicit_euler_lhs(&c, &k, 1.0).unwrap_err();
        assert!(matches!(
            err,
            LinalgError::DimensionMismatch {
                what: "stiffness",
                ..
            }
        ));
    }

    #[test]
    fn rhs_scales_load_by_dt() {
        let c = DMatrix::from_diagonal(&DVector::from_row_slice(&[1.0, 0.0]));
        let x = DVector::from_row_slice(&[3.0, 7.0]);
        let f = DVector::from_row_slice(&[1.0, 2.0]);
        let b = implicit_euler_rhs(&c, &x, &f, 0.1).unwrap();
        assert!((b[0] - 3.1).abs() < 1e-14);
        assert!((b[1] - 0.2).abs() < 1e-14);
    }
}
