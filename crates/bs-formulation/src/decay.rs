//! Scalar relaxation `dx/dt = -rate * x + forcing`.

use crate::common::check_finite;
use crate::context::AssemblyContext;
use crate::error::FormulationResult;
use crate::field::FieldSet;
use crate::traits::{Formulation, OperatorStore};
use nalgebra::{DMatrix, DVector};

/// One-dof decay problem with C = 1, K = rate and rhs = forcing.
#[derive(Clone, Debug)]
pub struct ScalarDecay {
    rate: f64,
    forcing: f64,
    fields: FieldSet,
    store: OperatorStore,
}

impl ScalarDecay {
    pub fn new(rate: f64) -> FormulationResult<Self> {
        Self::with_forcing(rate, 0.0)
    }

    pub fn with_forcing(rate: f64, forcing: f64) -> FormulationResult<Self> {
        check_finite(rate, "decay rate")?;
        check_finite(forcing, "forcing")?;
        Ok(Self {
            rate,
            forcing,
            fields: FieldSet::single("x", 1)?,
            store: OperatorStore::default(),
        })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Exact backward Euler iterate after `steps` steps of size `dt`.
    pub fn backward_euler_value(&self, x0: f64, dt: f64, steps: usize) -> f64 {
        let mut x = x0;
        for _ in 0..steps {
            x = (x + dt * self.forcing) / (1.0 + dt * self.rate);
        }
        x
    }
}

impl Formulation for ScalarDecay {
    fn name(&self) -> &str {
        "scalar_decay"
    }

    fn fields(&self) -> &FieldSet {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut FieldSet {
        &mut self.fields
    }

    fn clear_cache(&mut self) {
        self.store.clear();
    }

    fn assemble_stiffness(&mut self, _ctx: &AssemblyContext) -> FormulationResult<()> {
        self.store.set_stiffness(DMatrix::from_element(1, 1, self.rate));
        Ok(())
    }

    fn assemble_damping(&mut self, _ctx: &AssemblyContext) -> FormulationResult<()> {
        self.store.set_damping(DMatrix::from_element(1, 1, 1.0));
        Ok(())
    }

    fn assemble_rhs(&mut self, _ctx: &AssemblyContext) -> FormulationResult<()> {
        self.store.set_rhs(DVector::from_element(1, self.forcing));
        Ok(())
    }

    fn refresh_rhs_constraints(&mut self, _ctx: &AssemblyContext) -> FormulationResult<()> {
        // No constrained dofs; only check that there is an rhs to refresh.
        self.store.rhs().map(|_| ())
    }

    fn stiffness(&self) -> FormulationResult<&DMatrix<f64>> {
        self.store.stiffness()
    }

    fn damping(&self) -> FormulationResult<&DMatrix<f64>> {
        self.store.damping()
    }

    fn rhs(&self) -> FormulationResult<&DVector<f64>> {
        self.store.rhs()
    }
}
