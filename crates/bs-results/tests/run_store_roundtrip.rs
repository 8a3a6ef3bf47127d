use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use bs_results::{RunManifest, RunStore, compute_run_id, dof_series, snapshots_from_trajectory};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

const PROJECT: &str = "version: 1
name: decay
problem: { type: scalar_decay, rate: 1.0 }
initial: { type: uniform, value: 1.0 }
run: { dt: 1.0, end: 3.0, output_every: 2 }
";

#[test]
fn run_save_list_load_roundtrip() {
    let project_dir = unique_temp_dir("bs_results_project");
    fs::create_dir_all(&project_dir).expect("failed to create temp project dir");
    let project_path = project_dir.join("project.yaml");
    fs::write(&project_path, PROJECT).expect("failed to write project file");

    let project = bs_project::load(&project_path).expect("failed to load project");
    let mut ie = bs_project::build_integrator(&project).expect("failed to build");
    let (linearity, opts) = bs_project::run_plan(&project);
    let traj = ie.run(linearity, &opts).expect("run failed");

    let run_id = compute_run_id(&project, "test");
    let store = RunStore::for_project(&project_path).expect("failed to create run store");
    assert!(store.root_dir().starts_with(&project_dir));
    assert!(!store.has_run(&run_id));

    let manifest = RunManifest::for_run(run_id.clone(), &project, &traj, "test");
    let records = snapshots_from_trajectory(&traj);
    store.save_run(&manifest, &records).expect("failed to save run");

    let runs = store.list_runs().expect("failed to list runs");
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].run_id, run_id);
    assert_eq!(runs[0].snapshot_count, 2);
    assert_eq!(runs[0].stats.steps, 3);
    assert!(chrono::DateTime::parse_from_rfc3339(&runs[0].timestamp).is_ok());

    let loaded = store.load_snapshots(&run_id).expect("failed to load records");
    assert_eq!(loaded, records);
    assert_eq!(
        dof_series(&loaded, 0).unwrap(),
        vec![(0.0, 1.0), (2.0, 0.25)]
    );
    assert!(dof_series(&loaded, 1).is_none());

    let _ = fs::remove_dir_all(&project_dir);
}
