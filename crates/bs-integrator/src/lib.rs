//! bs-integrator: fixed-step implicit Euler for `C dx/dt + K x = rhs`.
//!
//! The [`ImplicitEuler`] driver owns a [`Formulation`](bs_formulation::Formulation)
//! and the global state vector. Per step it reassembles whatever the
//! [`ConstancyFlags`] do not mark as constant, reuses the factorization of
//! `C + dt*K` while K and C are unchanged, and runs a fixed-point loop for
//! nonlinear problems.
//!
//! ```text
//! let mut ie = ImplicitEuler::new(formulation, x0, &[false, true, true])?;
//! let traj = ie.run_nonlinear(&RunOptions::new(0.0, 0.01, 1.0))?;
//! ```

pub mod cache;
pub mod constancy;
pub mod convergence;
pub mod error;
pub mod euler;
pub mod options;
pub mod schedule;
pub mod stats;
pub mod trajectory;

// Re-exports
pub use constancy::ConstancyFlags;
pub use error::{IntegratorError, IntegratorResult};
pub use euler::ImplicitEuler;
pub use options::{Linearity, NonlinearSettings, RunOptions};
pub use schedule::TimeGrid;
pub use stats::{RunStats, StepProgress};
pub use trajectory::Trajectory;
