//! Project schema definitions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    pub problem: ProblemDef,
    pub initial: InitialDef,
    pub run: RunDef,
    /// `[rhs, stiffness, damping]`; empty means nothing is constant.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constancy: Vec<bool>,
    #[serde(default)]
    pub solver: SolverDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProblemDef {
    HeatRod {
        length: f64,
        elements: usize,
        #[serde(default = "default_capacity")]
        capacity: f64,
        conductivity: ConductivityDef,
        #[serde(default)]
        source: f64,
        #[serde(default)]
        lumped_mass: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        left: Option<BoundaryDef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        right: Option<BoundaryDef>,
    },
    ScalarDecay {
        rate: f64,
        #[serde(default)]
        forcing: f64,
    },
    Matrix {
        /// Row-major K
        stiffness: Vec<Vec<f64>>,
        /// Row-major C
        damping: Vec<Vec<f64>>,
        load: Vec<f64>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        fields: Vec<FieldDef>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        constraints: Vec<ConstraintDef>,
    },
}

fn default_capacity() -> f64 {
    1.0
}

impl ProblemDef {
    pub fn kind(&self) -> &'static str {
        match self {
            ProblemDef::HeatRod { .. } => "heat_rod",
            ProblemDef::ScalarDecay { .. } => "scalar_decay",
            ProblemDef::Matrix { .. } => "matrix",
        }
    }

    /// Number of unknowns the problem defines.
    pub fn dof_count(&self) -> usize {
        match self {
            ProblemDef::HeatRod { elements, .. } => elements + 1,
            ProblemDef::ScalarDecay { .. } => 1,
            ProblemDef::Matrix { load, .. } => load.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConductivityDef {
    Constant { value: f64 },
    Linear { k0: f64, beta: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoundaryDef {
    Constant {
        value: f64,
    },
    Ramp {
        from: f64,
        to: f64,
        duration: f64,
    },
    Sine {
        mean: f64,
        amplitude: f64,
        period: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub dofs: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConstraintDef {
    pub dof: usize,
    pub value: BoundaryDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InitialDef {
    Uniform { value: f64 },
    Values { values: Vec<f64> },
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    #[default]
    Linear,
    Nonlinear,
}

impl RunMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RunMode::Linear => "linear",
            RunMode::Nonlinear => "nonlinear",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunDef {
    #[serde(default)]
    pub mode: RunMode,
    #[serde(default)]
    pub start: f64,
    pub dt: f64,
    pub end: f64,
    #[serde(default = "default_output_every")]
    pub output_every: usize,
    #[serde(default)]
    pub verbosity: u8,
}

fn default_output_every() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverDef {
    pub tolerance: f64,
    pub max_iterations: usize,
    pub stall_limit: Option<usize>,
}

impl Default for SolverDef {
    fn default() -> Self {
        Self {
            tolerance: 1e-5,
            max_iterations: 100,
            stall_limit: Some(10),
        }
    }
}
