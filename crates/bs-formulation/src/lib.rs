//! bs-formulation: operator providers for the implicit time integrator.
//!
//! A formulation owns its state variables ([`FieldSet`]) and assembles the
//! operators of `C dx/dt + K x = rhs` on request:
//! - [`MatrixFormulation`]: user-supplied constant operators
//! - [`ScalarDecay`]: one-dof relaxation `dx/dt = -rate * x + forcing`
//! - [`HeatRod`]: 1-D linear finite elements with optional
//!   temperature-dependent conductivity
//!
//! All of them implement the [`Formulation`] trait. Time enters only through
//! the [`AssemblyContext`] passed to each assembly call.

pub mod common;
pub mod constraint;
pub mod context;
pub mod decay;
pub mod error;
pub mod field;
pub mod heat_rod;
pub mod matrix;
pub mod traits;

// Re-exports
pub use constraint::{BoundaryValue, ConstraintSet, DirichletConstraint};
pub use context::AssemblyContext;
pub use decay::ScalarDecay;
pub use error::{FormulationError, FormulationResult};
pub use field::{Field, FieldSet};
pub use heat_rod::{Conductivity, HeatRod, HeatRodParams};
pub use matrix::MatrixFormulation;
pub use traits::{Formulation, OperatorStore};
