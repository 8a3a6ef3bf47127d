//! Dense linear-algebra backend for the implicit time integrator.
//!
//! Vector and matrix arithmetic come straight from `nalgebra`. This crate adds
//! the pieces the integrator needs on top of it: a [`LinearSolver`] abstraction
//! that separates factorization from triangular solves, so an unchanged
//! left-hand side is decomposed once and reused, and the helpers that build
//! the backward Euler system `(C + dt*K) x = C x_prev + dt*rhs`.

pub mod error;
pub mod operator;
pub mod solver;

pub use error::{LinalgError, LinalgResult};
pub use nalgebra::{DMatrix, DVector, DVectorView};
pub use operator::{implicit_euler_lhs, implicit_euler_rhs};
pub use solver::{DenseLu, LinearSolver};
