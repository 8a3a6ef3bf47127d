//! Instrumented formulations shared by the integrator tests.

#![allow(dead_code)]

use bs_formulation::{
    AssemblyContext, FieldSet, Formulation, FormulationResult, OperatorStore,
};
use nalgebra::{DMatrix, DVector};

/// Calls made on a wrapped formulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub clear_cache: usize,
    pub stiffness: usize,
    pub damping: usize,
    pub rhs: usize,
    pub refresh: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.clear_cache + self.stiffness + self.damping + self.rhs + self.refresh
    }
}

/// Forwards every call to `inner` and counts it.
pub struct Counting<F> {
    pub inner: F,
    pub calls: CallCounts,
}

impl<F> Counting<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            calls: CallCounts::default(),
        }
    }
}

impl<F: Formulation> Formulation for Counting<F> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fields(&self) -> &FieldSet {
        self.inner.fields()
    }

    fn fields_mut(&mut self) -> &mut FieldSet {
        self.inner.fields_mut()
    }

    fn clear_cache(&mut self) {
        self.calls.clear_cache += 1;
        self.inner.clear_cache();
    }

    fn assemble_stiffness(&mut self, ctx: &AssemblyContext) -> FormulationResult<()> {
        self.calls.stiffness += 1;
        self.inner.assemble_stiffness(ctx)
    }

    fn assemble_damping(&mut self, ctx: &AssemblyContext) -> FormulationResult<()> {
        self.calls.damping += 1;
        self.inner.assemble_damping(ctx)
    }

    fn assemble_rhs(&mut self, ctx: &AssemblyContext) -> FormulationResult<()> {
        self.calls.rhs += 1;
        self.inner.assemble_rhs(ctx)
    }

    fn refresh_rhs_constraints(&mut self, ctx: &AssemblyContext) -> FormulationResult<()> {
        self.calls.refresh += 1;
        self.inner.refresh_rhs_constraints(ctx)
    }

    fn stiffness(&self) -> FormulationResult<&DMatrix<f64>> {
        self.inner.stiffness()
    }

    fn damping(&self) -> FormulationResult<&DMatrix<f64>> {
        self.inner.damping()
    }

    fn rhs(&self) -> FormulationResult<&DVector<f64>> {
        self.inner.rhs()
    }
}

/// One-dof system with C = 1, K = `stiffness` and a scripted load.
///
/// The script receives the number of previous rhs assemblies, which lets a
/// test build loads that never settle.
pub struct Scripted {
    stiffness: f64,
    script: Box<dyn FnMut(usize) -> f64>,
    assemblies: usize,
    fields: FieldSet,
    store: OperatorStore,
}

impl Scripted {
    pub fn new(stiffness: f64, script: impl FnMut(usize) -> f64 + 'static) -> Self {
        Self {
            stiffness,
            script: Box::new(script),
            assemblies: 0,
            fields: FieldSet::single("x", 1).unwrap(),
            store: OperatorStore::default(),
        }
    }

    /// Load alternating between `+amplitude` and `-amplitude`.
    pub fn alternating(amplitude: f64) -> Self {
        Self::new(0.0, move |n| if n % 2 == 0 { amplitude } else { -amplitude })
    }

    /// Load growing by one on every assembly.
    pub fn creeping() -> Self {
        Self::new(0.0, |n| n as f64 + 1.0)
    }
}

impl Formulation for Scripted {
    fn name(&self) -> &str {
        "scripted"
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
        self.store
            .set_stiffness(DMatrix::from_element(1, 1, self.stiffness));
        Ok(())
    }

    fn assemble_damping(&mut self, _ctx: &AssemblyContext) -> FormulationResult<()> {
        self.store.set_damping(DMatrix::identity(1, 1));
        Ok(())
    }

    fn assemble_rhs(&mut self, _ctx: &AssemblyContext) -> FormulationResult<()> {
        let value = (self.script)(self.assemblies);
        self.assemblies += 1;
        self.store.set_rhs(DVector::from_element(1, value));
        Ok(())
    }

    fn refresh_rhs_constraints(&mut self, _ctx: &AssemblyContext) -> FormulationResult<()> {
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
