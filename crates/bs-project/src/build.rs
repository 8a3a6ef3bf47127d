//! Turn a validated project into a ready-to-run integrator.

use crate::schema::{
    BoundaryDef, ConductivityDef, InitialDef, ProblemDef, Project, RunDef, RunMode, SolverDef,
};
use crate::{ProjectError, ProjectResult};
use bs_formulation::{
    BoundaryValue, Conductivity, DirichletConstraint, Formulation, HeatRod, HeatRodParams,
    MatrixFormulation, ScalarDecay,
};
use bs_integrator::{ImplicitEuler, Linearity, NonlinearSettings, RunOptions};
use nalgebra::{DMatrix, DVector};

/// Integrator over a formulation chosen at runtime.
pub type ProjectIntegrator = ImplicitEuler<Box<dyn Formulation>>;

impl From<&BoundaryDef> for BoundaryValue {
    fn from(def: &BoundaryDef) -> Self {
        match *def {
            BoundaryDef::Constant { value } => BoundaryValue::Constant(value),
            BoundaryDef::Ramp { from, to, duration } => BoundaryValue::Ramp { from, to, duration },
            BoundaryDef::Sine {
                mean,
                amplitude,
                period,
            } => BoundaryValue::Sine {
                mean,
                amplitude,
                period,
            },
        }
    }
}

impl From<&ConductivityDef> for Conductivity {
    fn from(def: &ConductivityDef) -> Self {
        match *def {
            ConductivityDef::Constant { value } => Conductivity::Constant(value),
            ConductivityDef::Linear { k0, beta } => Conductivity::Linear { k0, beta },
        }
    }
}

impl From<RunMode> for Linearity {
    fn from(mode: RunMode) -> Self {
        match mode {
            RunMode::Linear => Linearity::Linear,
            RunMode::Nonlinear => Linearity::Nonlinear,
        }
    }
}

impl From<&RunDef> for RunOptions {
    fn from(run: &RunDef) -> Self {
        RunOptions::new(run.start, run.dt, run.end)
            .with_output_stride(run.output_every)
            .with_verbosity(run.verbosity)
    }
}

impl From<&SolverDef> for NonlinearSettings {
    fn from(solver: &SolverDef) -> Self {
        NonlinearSettings {
            tolerance: solver.tolerance,
            max_iterations: solver.max_iterations,
            stall_limit: solver.stall_limit,
        }
    }
}

fn dense(rows: &[Vec<f64>], n: usize) -> DMatrix<f64> {
    DMatrix::from_fn(n, n, |i, j| rows[i][j])
}

/// Build the formulation a problem definition describes.
pub fn build_formulation(problem: &ProblemDef) -> ProjectResult<Box<dyn Formulation>> {
    let formulation: Box<dyn Formulation> = match problem {
        ProblemDef::HeatRod {
            length,
            elements,
            capacity,
            conductivity,
            source,
            lumped_mass,
            left,
            right,
        } => Box::new(HeatRod::new(HeatRodParams {
            length: *length,
            elements: *elements,
            capacity: *capacity,
            conductivity: conductivity.into(),
            source: *source,
            lumped_mass: *lumped_mass,
            left: left.as_ref().map(BoundaryValue::from),
            right: right.as_ref().map(BoundaryValue::from),
        })?),
        ProblemDef::ScalarDecay { rate, forcing } => {
            Box::new(ScalarDecay::with_forcing(*rate, *forcing)?)
        }
        ProblemDef::Matrix {
            stiffness,
            damping,
            load,
            fields,
            constraints,
        } => {
            let n = load.len();
            if stiffness.len() != n
                || damping.len() != n
                || stiffness.iter().chain(damping).any(|row| row.len() != n)
            {
                return Err(ProjectError::Build {
                    what: "matrix problem operators must be square and match the load",
                });
            }
            let mut f = MatrixFormulation::new(
                "matrix",
                dense(stiffness, n),
                dense(damping, n),
                DVector::from_column_slice(load),
            )?;
            if !fields.is_empty() {
                f = f.with_fields(fields.iter().map(|fd| (fd.name.clone(), fd.dofs)))?;
            }
            f = f.with_constraints(constraints.iter().map(|c| DirichletConstraint {
                dof: c.dof,
                value: BoundaryValue::from(&c.value),
            }))?;
            Box::new(f)
        }
    };
    Ok(formulation)
}

/// Global initial state for a problem with `dofs` unknowns.
pub fn initial_state(initial: &InitialDef, dofs: usize) -> ProjectResult<DVector<f64>> {
    match initial {
        InitialDef::Uniform { value } => Ok(DVector::from_element(dofs, *value)),
        InitialDef::Values { values } => {
            if values.len() != dofs {
                return Err(ProjectError::Build {
                    what: "initial values do not match the problem size",
                });
            }
            Ok(DVector::from_column_slice(values))
        }
    }
}

/// Build the integrator for a project, with its solver settings applied.
pub fn build_integrator(project: &Project) -> ProjectResult<ProjectIntegrator> {
    let formulation = build_formulation(&project.problem)?;
    let x0 = initial_state(&project.initial, formulation.dof_count())?;
    tracing::debug!(
        project = %project.name,
        problem = project.problem.kind(),
        dofs = x0.len(),
        "built formulation"
    );
    let integrator = ImplicitEuler::new(formulation, x0, &project.constancy)?
        .with_settings(NonlinearSettings::from(&project.solver))?;
    Ok(integrator)
}

/// Run options and mode described by the project's `run` section.
pub fn run_plan(project: &Project) -> (Linearity, RunOptions) {
    (project.run.mode.into(), RunOptions::from(&project.run))
}
