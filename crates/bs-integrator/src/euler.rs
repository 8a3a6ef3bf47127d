//! Fixed-step implicit Euler driver with an inner fixed-point loop.
//!
//! Each step solves
//!
//! ```text
//! (C + dt*K) x_next = C*x + dt*rhs
//! ```
//!
//! where K, C and rhs are assembled at the new time from the latest iterate.
//! Linear runs solve once per step; nonlinear runs repeat the solve until
//! `|x_next - x_prev_iterate| / |x_next|` drops to the tolerance.

use crate::cache::OperatorCache;
use crate::constancy::ConstancyFlags;
use crate::convergence::{ConvergenceMonitor, Verdict};
use crate::error::{IntegratorError, IntegratorResult};
use crate::options::{Linearity, NonlinearSettings, RunOptions};
use crate::schedule::TimeGrid;
use crate::stats::{RunStats, StepProgress};
use crate::trajectory::Trajectory;
use bs_core::numeric::relative_change;
use bs_core::timing::Timer;
use bs_formulation::{AssemblyContext, Formulation};
use bs_linalg::{DenseLu, LinearSolver, implicit_euler_rhs};
use nalgebra::DVector;

/// Output slots reserved up front; longer trajectories grow on demand.
const MAX_PREALLOCATED_OUTPUTS: usize = 1 << 16;

/// Converged result of one time step.
struct StepOutcome {
    state: DVector<f64>,
    iterations: usize,
    relative_change: f64,
}

/// Implicit Euler integrator owning its formulation and global state.
///
/// The formulation is borrowed exclusively for the integrator's lifetime; the
/// integrator alone decides when cached operators and factorizations are
/// stale.
pub struct ImplicitEuler<F, S = DenseLu> {
    formulation: F,
    state: DVector<f64>,
    constancy: ConstancyFlags,
    settings: NonlinearSettings,
    cache: OperatorCache<S>,
}

impl<F: Formulation> ImplicitEuler<F, DenseLu> {
    /// Create an integrator with the dense LU backend.
    ///
    /// `constancy` is `[rhs, stiffness, damping]`; an empty slice means
    /// nothing is constant and any other length than 0 or 3 is rejected.
    pub fn new(formulation: F, initial_state: DVector<f64>, constancy: &[bool]) -> IntegratorResult<Self> {
        Self::with_solver(formulation, initial_state, constancy, DenseLu::new())
    }
}

impl<F: Formulation, S: LinearSolver> ImplicitEuler<F, S> {
    /// Create an integrator with a caller-provided linear solver.
    pub fn with_solver(
        formulation: F,
        initial_state: DVector<f64>,
        constancy: &[bool],
        solver: S,
    ) -> IntegratorResult<Self> {
        let constancy = ConstancyFlags::from_slice(constancy)?;

        let expected = formulation.dof_count();
        if initial_state.len() != expected {
            return Err(IntegratorError::DimensionMismatch {
                expected,
                actual: initial_state.len(),
            });
        }
        if initial_state.iter().any(|v| !v.is_finite()) {
            return Err(IntegratorError::InvalidArg {
                what: "initial state must be finite",
            });
        }

        Ok(Self {
            formulation,
            state: initial_state,
            constancy,
            settings: NonlinearSettings::default(),
            cache: OperatorCache::new(solver),
        })
    }

    /// Replace the nonlinear loop settings.
    pub fn with_settings(mut self, settings: NonlinearSettings) -> IntegratorResult<Self> {
        settings.validate()?;
        self.settings = settings;
        Ok(self)
    }

    /// Current global state (initial state until a run commits a step).
    pub fn state(&self) -> &DVector<f64> {
        &self.state
    }

    pub fn constancy(&self) -> ConstancyFlags {
        self.constancy
    }

    pub fn settings(&self) -> &NonlinearSettings {
        &self.settings
    }

    pub fn formulation(&self) -> &F {
        &self.formulation
    }

    pub fn formulation_mut(&mut self) -> &mut F {
        &mut self.formulation
    }

    pub fn into_formulation(self) -> F {
        self.formulation
    }

    pub fn solver(&self) -> &S {
        self.cache.solver()
    }

    /// Run with exactly one solve per step.
    pub fn run_linear(&mut self, opts: &RunOptions) -> IntegratorResult<Trajectory> {
        self.run(Linearity::Linear, opts)
    }

    /// Run with the nonlinear loop iterating to the tolerance.
    ///
    /// Convergence is judged on the change between two iterates, so even a
    /// system whose operators do not depend on the state takes two
    /// iterations per step: one solve, then a confirming solve with zero
    /// relative change. Both give the same state as [`Self::run_linear`].
    pub fn run_nonlinear(&mut self, opts: &RunOptions) -> IntegratorResult<Trajectory> {
        self.run(Linearity::Nonlinear, opts)
    }

    pub fn run(&mut self, linearity: Linearity, opts: &RunOptions) -> IntegratorResult<Trajectory> {
        self.run_with_progress(linearity, opts, None)
    }

    /// Run and report every committed step to `progress`.
    ///
    /// On success the integrator state is the last computed step. On error the
    /// state keeps the last committed step.
    pub fn run_with_progress(
        &mut self,
        linearity: Linearity,
        opts: &RunOptions,
        mut progress: Option<&mut dyn FnMut(StepProgress)>,
    ) -> IntegratorResult<Trajectory> {
        if opts.start > opts.end {
            return Ok(Trajectory::empty());
        }

        let grid = TimeGrid::new(opts.start, opts.dt, opts.end)?;
        let stride = opts.stride();
        let run_timer = Timer::start("run");

        // Fields see the initial state before the first assembly.
        self.formulation.fields_mut().set_from_global(&self.state)?;

        // Remove leftovers from any previous run.
        self.formulation.clear_cache();
        self.cache.invalidate();

        tracing::info!(
            formulation = self.formulation.name(),
            ?linearity,
            "Implicit Euler for {} timesteps in range {} to {} sec",
            grid.point_count(),
            opts.start,
            opts.end
        );

        let mut stats = RunStats::default();
        let output_len = grid.output_len(stride);
        let reserve = output_len.min(MAX_PREALLOCATED_OUTPUTS);
        let mut times = Vec::with_capacity(reserve);
        let mut states = Vec::with_capacity(reserve);
        times.push(grid.time_at(0));
        states.push(self.state.clone());

        for step in 1..=grid.steps() {
            let time = grid.time_at(step);
            let outcome = self.advance(linearity, opts.verbosity, step, time, grid.dt(), &mut stats)?;

            self.state = outcome.state;
            stats.steps += 1;
            stats.max_iterations_in_step = stats.max_iterations_in_step.max(outcome.iterations);

            if linearity.is_linear() {
                tracing::debug!(step, time, "step committed");
            } else {
                tracing::debug!(
                    step,
                    time,
                    iterations = outcome.iterations,
                    relative_change = outcome.relative_change,
                    "step committed ({} NL it)",
                    outcome.iterations
                );
            }

            if grid.output_slot(step, stride).is_some() {
                times.push(time);
                states.push(self.state.clone());
            }

            if let Some(cb) = progress.as_mut() {
                cb(StepProgress {
                    step,
                    total_steps: grid.steps(),
                    time,
                    iterations: outcome.iterations,
                    relative_change: outcome.relative_change,
                    fraction_complete: step as f64 / grid.steps() as f64,
                });
            }
        }

        debug_assert_eq!(states.len(), output_len);
        stats.timing.steps = stats.steps;
        run_timer.stop_into(&mut stats.timing.total_s);

        Ok(Trajectory {
            times,
            states,
            stats,
        })
    }

    /// Run the inner loop for one step and return the converged state.
    fn advance(
        &mut self,
        linearity: Linearity,
        verbosity: u8,
        step: usize,
        time: f64,
        dt: f64,
        stats: &mut RunStats,
    ) -> IntegratorResult<StepOutcome> {
        let settings = self.settings.clone();
        let mut monitor = ConvergenceMonitor::new(&settings, linearity, step, time);
        let mut x_next = self.state.clone();

        loop {
            let ctx = AssemblyContext {
                time,
                dt,
                step,
                iteration: monitor.iterations(),
            };
            let x_iterate = x_next.clone();

            self.refresh_operators(&ctx, stats)?;

            if !self.cache.lhs_is_current() {
                tracing::debug!(step, iteration = ctx.iteration, "refactorizing C + dt*K");
                let timer = Timer::start("factorization");
                self.cache.refactorize(
                    self.formulation.damping()?,
                    self.formulation.stiffness()?,
                    dt,
                )?;
                timer.stop_into(&mut stats.timing.factorization_s);
                stats.factorizations += 1;
            }

            let b = implicit_euler_rhs(
                self.formulation.damping()?,
                &self.state,
                self.formulation.rhs()?,
                dt,
            )?;
            if b.iter().any(|v| !v.is_finite()) {
                return Err(IntegratorError::NonFinite {
                    what: "right-hand side",
                    step,
                    time,
                });
            }

            let timer = Timer::start("solve");
            x_next = self.cache.solve(&b)?;
            timer.stop_into(&mut stats.timing.solve_s);
            stats.solves += 1;
            stats.nonlinear_iterations += 1;

            if x_next.iter().any(|v| !v.is_finite()) {
                return Err(IntegratorError::NonFinite {
                    what: "state",
                    step,
                    time,
                });
            }

            // Solution-dependent terms see the latest estimate next iteration.
            self.formulation.fields_mut().set_from_global(&x_next)?;

            let change = relative_change((&x_next - &x_iterate).norm(), x_next.norm());
            if !linearity.is_linear() && verbosity > 0 {
                tracing::info!(step, iteration = ctx.iteration, relative_change = change);
            } else {
                tracing::trace!(step, iteration = ctx.iteration, relative_change = change);
            }

            let verdict = monitor.record(change).inspect_err(|e| {
                tracing::warn!(step, time, error = %e, "nonlinear loop failed");
            })?;
            if verdict == Verdict::Converged {
                return Ok(StepOutcome {
                    state: x_next,
                    iterations: monitor.iterations(),
                    relative_change: change,
                });
            }
        }
    }

    /// Reassemble the operators that are not constant or not yet built.
    fn refresh_operators(&mut self, ctx: &AssemblyContext, stats: &mut RunStats) -> IntegratorResult<()> {
        let timer = Timer::start("assembly");

        if self.cache.needs_stiffness(self.constancy) {
            self.formulation.assemble_stiffness(ctx)?;
            self.cache.mark_stiffness_assembled();
            stats.stiffness_assemblies += 1;
        }
        if self.cache.needs_damping(self.constancy) {
            self.formulation.assemble_damping(ctx)?;
            self.cache.mark_damping_assembled();
            stats.damping_assemblies += 1;
        }
        if self.cache.needs_rhs(self.constancy) {
            self.formulation.assemble_rhs(ctx)?;
            self.cache.mark_rhs_assembled();
            stats.rhs_assemblies += 1;
        } else {
            self.formulation.refresh_rhs_constraints(ctx)?;
            stats.constraint_refreshes += 1;
        }

        timer.stop_into(&mut stats.timing.assembly_s);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bs_formulation::ScalarDecay;

    fn decay() -> ImplicitEuler<ScalarDecay> {
        ImplicitEuler::new(
            ScalarDecay::new(1.0).unwrap(),
            DVector::from_element(1, 1.0),
            &[],
        )
        .unwrap()
    }

    #[test]
    fn halves_every_step() {
        let mut ie = decay();
        let traj = ie.run_linear(&RunOptions::new(0.0, 1.0, 3.0)).unwrap();
        let values: Vec<f64> = traj.states.iter().map(|s| s[0]).collect();
        assert_eq!(values, vec![1.0, 0.5, 0.25, 0.125]);
        assert_eq!(traj.times, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(ie.state()[0], 0.125);
    }

    #[test]
    fn reversed_range_is_empty_and_leaves_state() {
        let mut ie = decay();
        let traj = ie.run_nonlinear(&RunOptions::new(2.0, 1.0, 1.0)).unwrap();
        assert!(traj.is_empty());
        assert_eq!(ie.state()[0], 1.0);
    }

    #[test]
    fn invalid_time_step_is_an_error() {
        let mut ie = decay();
        let err = ie.run_linear(&RunOptions::new(0.0, 0.0, 1.0)).unwrap_err();
        assert!(matches!(err, IntegratorError::InvalidArg { .. }));
    }

    #[test]
    fn construction_validates_inputs() {
        let err = ImplicitEuler::new(
            ScalarDecay::new(1.0).unwrap(),
            DVector::from_element(1, 1.0),
            &[true, false],
        )
        .err()
        .unwrap();
        assert_eq!(err, IntegratorError::InvalidConstancyFlags { len: 2 });

        let err = ImplicitEuler::new(ScalarDecay::new(1.0).unwrap(), DVector::zeros(2), &[])
            .err()
            .unwrap();
        assert_eq!(
            err,
            IntegratorError::DimensionMismatch {
                expected: 1,
                actual: 2
            }
        );
    }

    #[test]
    fn progress_reports_every_step() {
        let mut ie = decay();
        let mut seen = Vec::new();
        let mut record = |p: StepProgress| seen.push((p.step, p.fraction_complete));
        ie.run_with_progress(
            Linearity::Linear,
            &RunOptions::new(0.0, 1.0, 4.0).with_output_stride(3),
            Some(&mut record),
        )
        .unwrap();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[3], (4, 1.0));
    }
}
