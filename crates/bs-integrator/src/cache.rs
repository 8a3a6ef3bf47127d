//! Operator cache deciding when to reassemble and refactorize.
//!
//! Every reassembly of K or C bumps a generation counter. The factorization of
//! `C + dt*K` is tagged with the generation it was built from and is reused
//! verbatim while the tag matches. Invalidating the cache at the start of a
//! run forces a full first assembly.

use crate::constancy::ConstancyFlags;
use crate::error::IntegratorResult;
use bs_linalg::{DMatrix, DVector, LinearSolver, implicit_euler_lhs};

#[derive(Debug)]
pub struct OperatorCache<S> {
    solver: S,
    generation: u64,
    factorized_generation: Option<u64>,
    stiffness_assembled: bool,
    damping_assembled: bool,
    rhs_assembled: bool,
}

impl<S: LinearSolver> OperatorCache<S> {
    pub fn new(solver: S) -> Self {
        Self {
            solver,
            generation: 0,
            factorized_generation: None,
            stiffness_assembled: false,
            damping_assembled: false,
            rhs_assembled: false,
        }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Forget everything assembled or factorized so far.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.factorized_generation = None;
        self.stiffness_assembled = false;
        self.damping_assembled = false;
        self.rhs_assembled = false;
        self.solver.reset();
    }

    pub fn needs_stiffness(&self, flags: ConstancyFlags) -> bool {
        !flags.stiffness || !self.stiffness_assembled
    }

    pub fn needs_damping(&self, flags: ConstancyFlags) -> bool {
        !flags.damping || !self.damping_assembled
    }

    pub fn needs_rhs(&self, flags: ConstancyFlags) -> bool {
        !flags.rhs || !self.rhs_assembled
    }

    pub fn mark_stiffness_assembled(&mut self) {
        self.stiffness_assembled = true;
        self.generation += 1;
    }

    pub fn mark_damping_assembled(&mut self) {
        self.damping_assembled = true;
        self.generation += 1;
    }

    pub fn mark_rhs_assembled(&mut self) {
        self.rhs_assembled = true;
    }

    /// True when the cached factorization matches the current K and C.
    pub fn lhs_is_current(&self) -> bool {
        self.factorized_generation == Some(self.generation) && self.solver.is_factorized()
    }

    /// Build and factorize `C + dt*K`, tagging it with the current generation.
    pub fn refactorize(
        &mut self,
        damping: &DMatrix<f64>,
        stiffness: &DMatrix<f64>,
        dt: f64,
    ) -> IntegratorResult<()> {
        self.factorized_generation = None;
        let lhs = implicit_euler_lhs(damping, stiffness, dt)?;
        self.solver.factorize(&lhs)?;
        self.factorized_generation = Some(self.generation);
        Ok(())
    }

    pub fn solve(&self, rhs: &DVector<f64>) -> IntegratorResult<DVector<f64>> {
        Ok(self.solver.solve(rhs)?)
    }
}
