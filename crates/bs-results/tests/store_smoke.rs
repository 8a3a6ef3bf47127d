use bs_integrator::RunStats;
use bs_project::RunMode;
use bs_results::*;

fn manifest(run_id: &str, timestamp: &str) -> RunManifest {
    RunManifest {
        run_id: run_id.to_string(),
        project_name: "decay".to_string(),
        timestamp: timestamp.to_string(),
        mode: RunMode::Linear,
        start: 0.0,
        dt: 1.0,
        end: 1.0,
        output_stride: 1,
        dof_count: 1,
        snapshot_count: 2,
        solver_version: "v1".to_string(),
        stats: RunStats::default(),
    }
}

fn fresh_store(name: &str) -> RunStore {
    let dir = std::env::temp_dir().join(format!("bs_results_{}_{}", std::process::id(), name));
    let _ = std::fs::remove_dir_all(&dir);
    RunStore::new(dir).unwrap()
}

#[test]
fn save_and_load_run() {
    let store = fresh_store("save_load");
    let records = vec![
        SnapshotRecord {
            index: 0,
            time_s: 0.0,
            values: vec![1.0],
        },
        SnapshotRecord {
            index: 1,
            time_s: 1.0,
            values: vec![0.5],
        },
    ];

    let m = manifest("test_run_123", "2026-02-25T12:00:00Z");
    store.save_run(&m, &records).unwrap();

    assert!(store.has_run("test_run_123"));
    assert_eq!(store.load_manifest("test_run_123").unwrap(), m);
    assert_eq!(store.load_snapshots("test_run_123").unwrap(), records);
}

#[test]
fn list_runs_oldest_first() {
    let store = fresh_store("list");
    store
        .save_run(&manifest("late", "2026-02-25T13:00:00Z"), &[])
        .unwrap();
    store
        .save_run(&manifest("early", "2026-02-25T12:00:00Z"), &[])
        .unwrap();
    // Directories without a manifest are ignored.
    std::fs::create_dir_all(store.root_dir().join("partial")).unwrap();

    let ids: Vec<_> = store
        .list_runs()
        .unwrap()
        .into_iter()
        .map(|m| m.run_id)
        .collect();
    assert_eq!(ids, vec!["early", "late"]);

    store.delete_run("early").unwrap();
    assert!(!store.has_run("early"));
    assert_eq!(store.list_runs().unwrap().len(), 1);
}

#[test]
fn missing_run_is_reported() {
    let store = fresh_store("missing");
    assert!(matches!(
        store.load_manifest("nope"),
        Err(ResultsError::RunNotFound { .. })
    ));
    assert!(matches!(
        store.load_snapshots("nope"),
        Err(ResultsError::RunNotFound { .. })
    ));
}

#[test]
fn corrupt_snapshot_line_is_located() {
    let store = fresh_store("corrupt");
    store
        .save_run(&manifest("bad", "2026-02-25T12:00:00Z"), &[])
        .unwrap();
    std::fs::write(
        store.root_dir().join("bad").join("snapshots.jsonl"),
        "{\"index\":0,\"time_s\":0.0,\"values\":[1.0]}\nnot json\n",
    )
    .unwrap();

    match store.load_snapshots("bad") {
        Err(ResultsError::CorruptSnapshot { line, .. }) => assert_eq!(line, 2),
        other => panic!("unexpected: {other:?}"),
    }
}
