//! Formulation built from user-supplied constant operators.

use crate::common::check_all_finite;
use crate::constraint::{ConstraintSet, DirichletConstraint};
use crate::context::AssemblyContext;
use crate::error::{FormulationError, FormulationResult};
use crate::field::FieldSet;
use crate::traits::{Formulation, OperatorStore};
use nalgebra::{DMatrix, DVector};

/// Constant K, C and load vector with optional Dirichlet constraints.
///
/// Only the constraint values can vary in time; everything else is fixed at
/// construction, which makes this the reference problem for linear runs.
#[derive(Clone, Debug)]
pub struct MatrixFormulation {
    name: String,
    stiffness: DMatrix<f64>,
    damping: DMatrix<f64>,
    load: DVector<f64>,
    constraints: ConstraintSet,
    fields: FieldSet,
    store: OperatorStore,
}

fn check_operator(what: &'static str, m: &DMatrix<f64>, n: usize) -> FormulationResult<()> {
    if m.nrows() != n || m.ncols() != n {
        return Err(FormulationError::DimensionMismatch {
            what,
            expected: n,
            actual: if m.nrows() != n { m.nrows() } else { m.ncols() },
        });
    }
    check_all_finite(m.as_slice(), what)
}

impl MatrixFormulation {
    /// Create a formulation over a single field named `"u"`.
    pub fn new(
        name: impl Into<String>,
        stiffness: DMatrix<f64>,
        damping: DMatrix<f64>,
        load: DVector<f64>,
    ) -> FormulationResult<Self> {
        let n = load.len();
        if n == 0 {
            return Err(FormulationError::InvalidArg {
                what: "empty load vector",
            });
        }
        check_operator("stiffness", &stiffness, n)?;
        check_operator("damping", &damping, n)?;
        check_all_finite(load.as_slice(), "load")?;

        Ok(Self {
            name: name.into(),
            stiffness,
            damping,
            load,
            constraints: ConstraintSet::new(),
            fields: FieldSet::single("u", n)?,
            store: OperatorStore::default(),
        })
    }

    /// Replace the default single field with a custom layout.
    pub fn with_fields<S: Into<String>>(
        mut self,
        layout: impl IntoIterator<Item = (S, usize)>,
    ) -> FormulationResult<Self> {
        let fields = FieldSet::new(layout)?;
        if fields.dof_count() != self.load.len() {
            return Err(FormulationError::DimensionMismatch {
                what: "field layout",
                expected: self.load.len(),
                actual: fields.dof_count(),
            });
        }
        self.fields = fields;
        Ok(self)
    }

    pub fn with_constraints(
        mut self,
        constraints: impl IntoIterator<Item = DirichletConstraint>,
    ) -> FormulationResult<Self> {
        self.constraints = ConstraintSet::from_constraints(self.load.len(), constraints)?;
        Ok(self)
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }
}

impl Formulation for MatrixFormulation {
    fn name(&self) -> &str {
        &self.name
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
        let mut k = self.stiffness.clone();
        self.constraints.apply_to_stiffness(&mut k);
        self.store.set_stiffness(k);
        Ok(())
    }

    fn assemble_damping(&mut self, _ctx: &AssemblyContext) -> FormulationResult<()> {
        let mut c = self.damping.clone();
        self.constraints.apply_to_damping(&mut c);
        self.store.set_damping(c);
        Ok(())
    }

    fn assemble_rhs(&mut self, ctx: &AssemblyContext) -> FormulationResult<()> {
        let mut rhs = self.load.clone();
        self.constraints.apply_to_rhs(&mut rhs, ctx.time);
        self.store.set_rhs(rhs);
        Ok(())
    }

    fn refresh_rhs_constraints(&mut self, ctx: &AssemblyContext) -> FormulationResult<()> {
        let rhs = self.store.rhs_mut()?;
        self.constraints.apply_to_rhs(rhs, ctx.time);
        Ok(())
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
