//! Counters and progress events reported by a run.

use bs_core::timing::PerfStats;

/// What a run did, for diagnostics and instrumentation.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunStats {
    /// Steps taken after the initial state
    pub steps: usize,
    /// Linear solves over all steps and iterations
    pub solves: usize,
    /// Nonlinear iterations over all steps (equals `solves`)
    pub nonlinear_iterations: usize,
    /// Largest iteration count of a single step
    pub max_iterations_in_step: usize,
    pub stiffness_assemblies: usize,
    pub damping_assemblies: usize,
    pub rhs_assemblies: usize,
    /// Constraint-only refreshes of a constant rhs
    pub constraint_refreshes: usize,
    /// Builds of `C + dt*K` (each followed by a factorization)
    pub factorizations: usize,
    pub timing: PerfStats,
}

/// Emitted after every committed step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepProgress {
    pub step: usize,
    pub total_steps: usize,
    pub time: f64,
    pub iterations: usize,
    pub relative_change: f64,
    pub fraction_complete: f64,
}
