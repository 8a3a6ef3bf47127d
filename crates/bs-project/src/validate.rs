//! Project validation logic.

use crate::schema::{
    BoundaryDef, ConductivityDef, InitialDef, ProblemDef, Project, RunDef, SolverDef,
};
use std::collections::HashSet;

/// Newest project file version this crate understands.
pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Dimension mismatch in {field}: expected {expected}, got {actual}")]
    DimensionMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("Duplicate name: {name} in {context}")]
    DuplicateName { name: String, context: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    validate_problem(&project.problem)?;
    validate_initial(&project.initial, project.problem.dof_count())?;
    validate_run(&project.run)?;
    validate_solver(&project.solver)?;

    if !project.constancy.is_empty() && project.constancy.len() != 3 {
        return Err(ValidationError::DimensionMismatch {
            field: "constancy".to_string(),
            expected: 3,
            actual: project.constancy.len(),
        });
    }

    Ok(())
}

fn validate_problem(problem: &ProblemDef) -> Result<(), ValidationError> {
    match problem {
        ProblemDef::HeatRod {
            length,
            elements,
            capacity,
            conductivity,
            source,
            left,
            right,
            ..
        } => {
            validate_positive_finite("problem.length", *length)?;
            validate_positive_finite("problem.capacity", *capacity)?;
            validate_finite("problem.source", *source)?;
            if *elements == 0 {
                return Err(ValidationError::InvalidValue {
                    field: "problem.elements".to_string(),
                    value: elements.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
            match conductivity {
                ConductivityDef::Constant { value } => {
                    validate_positive_finite("problem.conductivity.value", *value)?
                }
                ConductivityDef::Linear { k0, beta } => {
                    validate_positive_finite("problem.conductivity.k0", *k0)?;
                    validate_finite("problem.conductivity.beta", *beta)?;
                }
            }
            if let Some(b) = left {
                validate_boundary("problem.left", b)?;
            }
            if let Some(b) = right {
                validate_boundary("problem.right", b)?;
            }
            Ok(())
        }
        ProblemDef::ScalarDecay { rate, forcing } => {
            validate_finite("problem.rate", *rate)?;
            validate_finite("problem.forcing", *forcing)
        }
        ProblemDef::Matrix {
            stiffness,
            damping,
            load,
            fields,
            constraints,
        } => {
            let n = load.len();
            if n == 0 {
                return Err(ValidationError::InvalidValue {
                    field: "problem.load".to_string(),
                    value: "[]".to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
            for (i, v) in load.iter().enumerate() {
                validate_finite(&format!("problem.load[{i}]"), *v)?;
            }
            validate_square("problem.stiffness", stiffness, n)?;
            validate_square("problem.damping", damping, n)?;

            if !fields.is_empty() {
                let mut names = HashSet::new();
                for f in fields {
                    if !names.insert(&f.name) {
                        return Err(ValidationError::DuplicateName {
                            name: f.name.clone(),
                            context: "problem.fields".to_string(),
                        });
                    }
                    if f.dofs == 0 {
                        return Err(ValidationError::InvalidValue {
                            field: format!("problem.fields '{}' dofs", f.name),
                            value: "0".to_string(),
                            reason: "must be at least 1".to_string(),
                        });
                    }
                }
                let total: usize = fields.iter().map(|f| f.dofs).sum();
                if total != n {
                    return Err(ValidationError::DimensionMismatch {
                        field: "problem.fields".to_string(),
                        expected: n,
                        actual: total,
                    });
                }
            }

            for c in constraints {
                if c.dof >= n {
                    return Err(ValidationError::InvalidValue {
                        field: "problem.constraints dof".to_string(),
                        value: c.dof.to_string(),
                        reason: format!("must be below {n}"),
                    });
                }
                validate_boundary(&format!("problem.constraints[{}]", c.dof), &c.value)?;
            }
            Ok(())
        }
    }
}

fn validate_square(field: &str, rows: &[Vec<f64>], n: usize) -> Result<(), ValidationError> {
    if rows.len() != n {
        return Err(ValidationError::DimensionMismatch {
            field: format!("{field} rows"),
            expected: n,
            actual: rows.len(),
        });
    }
    for (i, row) in rows.iter().enumerate() {
        if row.len() != n {
            return Err(ValidationError::DimensionMismatch {
                field: format!("{field} row {i}"),
                expected: n,
                actual: row.len(),
            });
        }
        for (j, v) in row.iter().enumerate() {
            validate_finite(&format!("{field}[{i}][{j}]"), *v)?;
        }
    }
    Ok(())
}

fn validate_boundary(field: &str, boundary: &BoundaryDef) -> Result<(), ValidationError> {
    match boundary {
        BoundaryDef::Constant { value } => validate_finite(field, *value),
        BoundaryDef::Ramp { from, to, duration } => {
            validate_finite(&format!("{field}.from"), *from)?;
            validate_finite(&format!("{field}.to"), *to)?;
            validate_non_negative_finite(&format!("{field}.duration"), *duration)
        }
        BoundaryDef::Sine {
            mean,
            amplitude,
            period,
        } => {
            validate_finite(&format!("{field}.mean"), *mean)?;
            validate_finite(&format!("{field}.amplitude"), *amplitude)?;
            validate_positive_finite(&format!("{field}.period"), *period)
        }
    }
}

fn validate_initial(initial: &InitialDef, dofs: usize) -> Result<(), ValidationError> {
    match initial {
        InitialDef::Uniform { value } => validate_finite("initial.value", *value),
        InitialDef::Values { values } => {
            if values.len() != dofs {
                return Err(ValidationError::DimensionMismatch {
                    field: "initial.values".to_string(),
                    expected: dofs,
                    actual: values.len(),
                });
            }
            for (i, v) in values.iter().enumerate() {
                validate_finite(&format!("initial.values[{i}]"), *v)?;
            }
            Ok(())
        }
    }
}

fn validate_run(run: &RunDef) -> Result<(), ValidationError> {
    validate_finite("run.start", run.start)?;
    validate_finite("run.end", run.end)?;
    validate_positive_finite("run.dt", run.dt)?;
    if run.output_every == 0 {
        return Err(ValidationError::InvalidValue {
            field: "run.output_every".to_string(),
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn validate_solver(solver: &SolverDef) -> Result<(), ValidationError> {
    validate_positive_finite("solver.tolerance", solver.tolerance)?;
    if solver.max_iterations == 0 {
        return Err(ValidationError::InvalidValue {
            field: "solver.max_iterations".to_string(),
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if solver.stall_limit == Some(0) {
        return Err(ValidationError::InvalidValue {
            field: "solver.stall_limit".to_string(),
            value: "0".to_string(),
            reason: "must be at least 1 (omit to disable)".to_string(),
        });
    }
    Ok(())
}

fn validate_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be finite".to_string(),
        });
    }
    Ok(())
}

fn validate_positive_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be positive and finite".to_string(),
        });
    }
    Ok(())
}

fn validate_non_negative_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be non-negative and finite".to_string(),
        });
    }
    Ok(())
}
