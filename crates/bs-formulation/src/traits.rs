//! Operator provider interface consumed by the time integrator.

use crate::context::AssemblyContext;
use crate::error::{FormulationError, FormulationResult};
use crate::field::FieldSet;
use nalgebra::{DMatrix, DVector};

/// A discretized system `C dx/dt + K x = rhs` that can (re)assemble its operators.
///
/// Assembly is side-effecting: `assemble_*` refreshes an internal cache and
/// the accessors return the cached operator. Operators may depend on the
/// current field values (nonlinear problems) and on `ctx.time`.
///
/// Constrained rows follow the convention documented in
/// [`crate::constraint`]: identity rows in K, zero rows in C, prescribed
/// values in rhs.
pub trait Formulation {
    /// Formulation name for logging.
    fn name(&self) -> &str;

    /// State variables the formulation is defined over.
    fn fields(&self) -> &FieldSet;

    /// Mutable access so the integrator can broadcast new states.
    fn fields_mut(&mut self) -> &mut FieldSet;

    /// Total number of unknowns.
    fn dof_count(&self) -> usize {
        self.fields().dof_count()
    }

    /// Drop any cached operators left over from a previous run.
    fn clear_cache(&mut self);

    /// Rebuild the stiffness operator K.
    fn assemble_stiffness(&mut self, ctx: &AssemblyContext) -> FormulationResult<()>;

    /// Rebuild the damping/mass operator C.
    fn assemble_damping(&mut self, ctx: &AssemblyContext) -> FormulationResult<()>;

    /// Rebuild the load vector rhs, including constraint values.
    fn assemble_rhs(&mut self, ctx: &AssemblyContext) -> FormulationResult<()>;

    /// Update only the constrained entries of the cached load vector.
    ///
    /// Cheaper than [`Formulation::assemble_rhs`]; used when the load shape is
    /// constant but boundary values move in time.
    fn refresh_rhs_constraints(&mut self, ctx: &AssemblyContext) -> FormulationResult<()>;

    fn stiffness(&self) -> FormulationResult<&DMatrix<f64>>;

    fn damping(&self) -> FormulationResult<&DMatrix<f64>>;

    fn rhs(&self) -> FormulationResult<&DVector<f64>>;
}

impl<F: Formulation + ?Sized> Formulation for Box<F> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fields(&self) -> &FieldSet {
        (**self).fields()
    }

    fn fields_mut(&mut self) -> &mut FieldSet {
        (**self).fields_mut()
    }

    fn dof_count(&self) -> usize {
        (**self).dof_count()
    }

    fn clear_cache(&mut self) {
        (**self).clear_cache()
    }

    fn assemble_stiffness(&mut self, ctx: &AssemblyContext) -> FormulationResult<()> {
        (**self).assemble_stiffness(ctx)
    }

    fn assemble_damping(&mut self, ctx: &AssemblyContext) -> FormulationResult<()> {
        (**self).assemble_damping(ctx)
    }

    fn assemble_rhs(&mut self, ctx: &AssemblyContext) -> FormulationResult<()> {
        (**self).assemble_rhs(ctx)
    }

    fn refresh_rhs_constraints(&mut self, ctx: &AssemblyContext) -> FormulationResult<()> {
        (**self).refresh_rhs_constraints(ctx)
    }

    fn stiffness(&self) -> FormulationResult<&DMatrix<f64>> {
        (**self).stiffness()
    }

    fn damping(&self) -> FormulationResult<&DMatrix<f64>> {
        (**self).damping()
    }

    fn rhs(&self) -> FormulationResult<&DVector<f64>> {
        (**self).rhs()
    }
}

/// Cached operators shared by the concrete formulations.
#[derive(Clone, Debug, Default)]
pub struct OperatorStore {
    stiffness: Option<DMatrix<f64>>,
    damping: Option<DMatrix<f64>>,
    rhs: Option<DVector<f64>>,
}

impl OperatorStore {
    pub fn clear(&mut self) {
        self.stiffness = None;
        self.damping = None;
        self.rhs = None;
    }

    pub fn set_stiffness(&mut self, k: DMatrix<f64>) {
        self.stiffness = Some(k);
    }

    pub fn set_damping(&mut self, c: DMatrix<f64>) {
        self.damping = Some(c);
    }

    pub fn set_rhs(&mut self, rhs: DVector<f64>) {
        self.rhs = Some(rhs);
    }

    pub fn stiffness(&self) -> FormulationResult<&DMatrix<f64>> {
        self.stiffness
            .as_ref()
            .ok_or(FormulationError::NotAssembled { what: "stiffness" })
    }

    pub fn damping(&self) -> FormulationResult<&DMatrix<f64>> {
        self.damping
            .as_ref()
            .ok_or(FormulationError::NotAssembled { what: "damping" })
    }

    pub fn rhs(&self) -> FormulationResult<&DVector<f64>> {
        self.rhs
            .as_ref()
            .ok_or(FormulationError::NotAssembled { what: "rhs" })
    }

    pub fn rhs_mut(&mut self) -> FormulationResult<&mut DVector<f64>> {
        self.rhs
            .as_mut()
            .ok_or(FormulationError::NotAssembled { what: "rhs" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_reports_missing_operators() {
        let mut store = OperatorStore::default();
        assert_eq!(
            store.stiffness().unwrap_err(),
            FormulationError::NotAssembled { what: "stiffness" }
        );

        store.set_rhs(DVector::zeros(2));
        assert!(store.rhs().is_ok());
        store.clear();
        assert!(store.rhs().is_err());
    }
}
