//! Dirichlet constraints with time-dependent prescribed values.
//!
//! Constraints are imposed by row replacement:
//! - stiffness: the constrained row becomes the identity row
//! - damping: the constrained row becomes zero
//! - load vector: the constrained entry becomes the prescribed value
//!
//! With `leftmat = C + dt*K` and right-hand side `C*x + dt*rhs`, a constrained
//! row then reads `dt * x_i = dt * value`, which pins the dof exactly.

use crate::common::{check_finite, check_positive};
use crate::error::{FormulationError, FormulationResult};
use nalgebra::{DMatrix, DVector};
use std::f64::consts::TAU;

/// Prescribed value as a function of time.
#[derive(Clone, Debug, PartialEq)]
pub enum BoundaryValue {
    /// Same value at all times.
    Constant(f64),
    /// Linear ramp from `from` (t = 0) to `to` (t >= duration), then held.
    Ramp { from: f64, to: f64, duration: f64 },
    /// `mean + amplitude * sin(2*pi*t / period)`.
    Sine {
        mean: f64,
        amplitude: f64,
        period: f64,
    },
}

impl BoundaryValue {
    pub fn validate(&self) -> FormulationResult<()> {
        match *self {
            BoundaryValue::Constant(v) => check_finite(v, "boundary value"),
            BoundaryValue::Ramp { from, to, duration } => {
                check_finite(from, "ramp start value")?;
                check_finite(to, "ramp end value")?;
                check_finite(duration, "ramp duration")?;
                if duration < 0.0 {
                    return Err(FormulationError::NonPhysical {
                        what: "ramp duration",
                    });
                }
                Ok(())
            }
            BoundaryValue::Sine {
                mean,
                amplitude,
                period,
            } => {
                check_finite(mean, "sine mean")?;
                check_finite(amplitude, "sine amplitude")?;
                check_positive(period, "sine period")
            }
        }
    }

    /// Value at time `t`.
    pub fn at(&self, t: f64) -> f64 {
        match *self {
            BoundaryValue::Constant(v) => v,
            BoundaryValue::Ramp { from, to, duration } => {
                if duration <= 0.0 {
                    return to;
                }
                let s = (t / duration).clamp(0.0, 1.0);
                from + (to - from) * s
            }
            BoundaryValue::Sine {
                mean,
                amplitude,
                period,
            } => mean + amplitude * (TAU * t / period).sin(),
        }
    }

    /// True when the value does not depend on time.
    pub fn is_constant(&self) -> bool {
        match *self {
            BoundaryValue::Constant(_) => true,
            BoundaryValue::Ramp { from, to, duration } => from == to || duration <= 0.0,
            BoundaryValue::Sine { amplitude, .. } => amplitude == 0.0,
        }
    }
}

/// A single pinned degree of freedom.
#[derive(Clone, Debug, PartialEq)]
pub struct DirichletConstraint {
    pub dof: usize,
    pub value: BoundaryValue,
}

/// All Dirichlet constraints of one formulation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConstraintSet {
    constraints: Vec<DirichletConstraint>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and collect constraints for a system with `dofs` unknowns.
    ///
    /// A dof constrained twice keeps the last value given.
    pub fn from_constraints(
        dofs: usize,
        constraints: impl IntoIterator<Item = DirichletConstraint>,
    ) -> FormulationResult<Self> {
        let mut set = Self::new();
        for c in constraints {
            set.add(dofs, c)?;
        }
        Ok(set)
    }

    pub fn add(&mut self, dofs: usize, constraint: DirichletConstraint) -> FormulationResult<()> {
        if constraint.dof >= dofs {
            return Err(FormulationError::ConstraintOutOfRange {
                dof: constraint.dof,
                dofs,
            });
        }
        constraint.value.validate()?;
        self.constraints.retain(|c| c.dof != constraint.dof);
        self.constraints.push(constraint);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DirichletConstraint> {
        self.constraints.iter()
    }

    pub fn is_constrained(&self, dof: usize) -> bool {
        self.constraints.iter().any(|c| c.dof == dof)
    }

    /// Replace constrained rows of a stiffness matrix with identity rows.
    pub fn apply_to_stiffness(&self, k: &mut DMatrix<f64>) {
        for c in &self.constraints {
            k.row_mut(c.dof).fill(0.0);
            k[(c.dof, c.dof)] = 1.0;
        }
    }

    /// Zero the constrained rows of a damping matrix.
    pub fn apply_to_damping(&self, c_mat: &mut DMatrix<f64>) {
        for c in &self.constraints {
            c_mat.row_mut(c.dof).fill(0.0);
        }
    }

    /// Write the prescribed values at time `t` into a load vector.
    pub fn apply_to_rhs(&self, rhs: &mut DVector<f64>, t: f64) {
        for c in &self.constraints {
            rhs[c.dof] = c.value.at(t);
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn ramp_stays_between_its_endpoints(
            from in -100.0_f64..100.0,
            to in -100.0_f64..100.0,
            duration in 0.0_f64..10.0,
            t in -5.0_f64..20.0,
        ) {
            let ramp = BoundaryValue::Ramp { from, to, duration };
            prop_assert!(ramp.validate().is_ok());
            let v = ramp.at(t);
            prop_assert!(v >= from.min(to) - 1e-12 && v <= from.max(to) + 1e-12);
            prop_assert!((ramp.at(duration + 1.0) - to).abs() <= 1e-12);
        }

        #[test]
        fn sine_stays_within_its_amplitude(
            mean in -10.0_f64..10.0,
            amplitude in 0.0_f64..10.0,
            period in 0.01_f64..10.0,
            t in 0.0_f64..100.0,
        ) {
            let sine = BoundaryValue::Sine { mean, amplitude, period };
            prop_assert!((sine.at(t) - mean).abs() <= amplitude + 1e-12);
        }
    }
}
