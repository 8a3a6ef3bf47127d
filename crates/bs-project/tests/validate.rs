use bs_project::ValidationError;
use bs_project::schema::*;

fn decay_project() -> Project {
    bs_project::parse_yaml(
        r#"
version: 1
name: decay
problem: { type: scalar_decay, rate: 1.0 }
initial: { type: uniform, value: 1.0 }
run: { dt: 0.5, end: 2.0 }
"#,
    )
    .unwrap()
}

fn matrix_problem(stiffness: Vec<Vec<f64>>) -> ProblemDef {
    ProblemDef::Matrix {
        stiffness,
        damping: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        load: vec![0.0, 1.0],
        fields: vec![],
        constraints: vec![],
    }
}

#[test]
fn constancy_must_have_three_entries() {
    let mut p = decay_project();
    p.constancy = vec![true, true];
    assert_eq!(
        bs_project::validate_project(&p).unwrap_err(),
        ValidationError::DimensionMismatch {
            field: "constancy".to_string(),
            expected: 3,
            actual: 2
        }
    );
    p.constancy = vec![true, true, false];
    assert!(bs_project::validate_project(&p).is_ok());
}

#[test]
fn initial_values_must_match_the_dof_count() {
    let mut p = decay_project();
    p.initial = InitialDef::Values {
        values: vec![1.0, 2.0],
    };
    assert!(matches!(
        bs_project::validate_project(&p),
        Err(ValidationError::DimensionMismatch { expected: 1, actual: 2, .. })
    ));
}

#[test]
fn matrix_operators_must_be_square() {
    let mut p = decay_project();
    p.initial = InitialDef::Uniform { value: 0.0 };
    p.problem = matrix_problem(vec![vec![1.0, 0.0], vec![0.0]]);
    assert!(matches!(
        bs_project::validate_project(&p),
        Err(ValidationError::DimensionMismatch { .. })
    ));

    p.problem = matrix_problem(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    assert!(bs_project::validate_project(&p).is_ok());
}

#[test]
fn field_layout_must_cover_the_system() {
    let mut p = decay_project();
    p.problem = ProblemDef::Matrix {
        stiffness: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        damping: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        load: vec![0.0, 0.0],
        fields: vec![
            FieldDef {
                name: "a".to_string(),
                dofs: 1,
            },
            FieldDef {
                name: "a".to_string(),
                dofs: 1,
            },
        ],
        constraints: vec![],
    };
    assert!(matches!(
        bs_project::validate_project(&p),
        Err(ValidationError::DuplicateName { .. })
    ));
}

#[test]
fn non_physical_values_are_rejected() {
    let cases = [
        "problem: { type: heat_rod, length: 0.0, elements: 4, conductivity: { type: constant, value: 1.0 } }",
        "problem: { type: heat_rod, length: 1.0, elements: 0, conductivity: { type: constant, value: 1.0 } }",
        "problem: { type: heat_rod, length: 1.0, elements: 4, conductivity: { type: constant, value: -1.0 } }",
        "problem: { type: heat_rod, length: 1.0, elements: 4, conductivity: { type: constant, value: 1.0 }, left: { type: sine, mean: 0.0, amplitude: 1.0, period: 0.0 } }",
    ];
    for problem in cases {
        let yaml = format!(
            "version: 1\nname: bad\n{problem}\ninitial: {{ type: uniform, value: 0.0 }}\nrun: {{ dt: 0.1, end: 1.0 }}\n"
        );
        let err = bs_project::parse_yaml(&yaml).unwrap_err();
        assert!(
            matches!(
                err,
                bs_project::ProjectError::Validation(ValidationError::InvalidValue { .. })
            ),
            "{problem}: {err}"
        );
    }
}

#[test]
fn run_and_solver_sections_are_checked() {
    let mut p = decay_project();
    p.run.dt = -1.0;
    assert!(bs_project::validate_project(&p).is_err());

    let mut p = decay_project();
    p.run.output_every = 0;
    assert!(bs_project::validate_project(&p).is_err());

    let mut p = decay_project();
    p.solver.stall_limit = Some(0);
    assert!(bs_project::validate_project(&p).is_err());

    // A reversed range is a valid, empty run.
    let mut p = decay_project();
    p.run.start = 5.0;
    assert!(bs_project::validate_project(&p).is_ok());
}

#[test]
fn newer_versions_are_rejected() {
    let mut p = decay_project();
    p.version = bs_project::LATEST_VERSION + 1;
    assert!(matches!(
        bs_project::validate_project(&p),
        Err(ValidationError::UnsupportedVersion { .. })
    ));
}
