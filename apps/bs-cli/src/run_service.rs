//! Run execution and caching.

use crate::error::AppResult;
use bs_integrator::StepProgress;
use bs_results::{RunManifest, RunStore, SnapshotRecord};
use std::path::Path;
use std::time::Instant;

/// Version mixed into run ids, so a new solver never reuses old results.
pub const SOLVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct RunRequest<'a> {
    pub project_path: &'a Path,
    pub use_cache: bool,
}

#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub loaded_from_cache: bool,
    pub elapsed_s: f64,
}

/// Load a cached run or execute and store a fresh one.
pub fn ensure_run_with_progress(
    request: &RunRequest,
    progress: Option<&mut dyn FnMut(StepProgress)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();

    let project = bs_project::load(request.project_path)?;
    let run_id = bs_results::compute_run_id(&project, SOLVER_VERSION);
    let store = RunStore::for_project(request.project_path)?;

    if request.use_cache && store.has_run(&run_id) {
        tracing::info!(%run_id, "loading cached run");
        let manifest = store.load_manifest(&run_id)?;
        return Ok(RunResponse {
            run_id,
            manifest,
            loaded_from_cache: true,
            elapsed_s: started.elapsed().as_secs_f64(),
        });
    }

    let mut integrator = bs_project::build_integrator(&project)?;
    let (linearity, opts) = bs_project::run_plan(&project);
    let trajectory = integrator.run_with_progress(linearity, &opts, progress)?;

    let manifest = RunManifest::for_run(run_id.clone(), &project, &trajectory, SOLVER_VERSION);
    let records = bs_results::snapshots_from_trajectory(&trajectory);
    store.delete_run(&run_id)?;
    store.save_run(&manifest, &records)?;
    tracing::info!(%run_id, snapshots = records.len(), "run stored");

    Ok(RunResponse {
        run_id,
        manifest,
        loaded_from_cache: false,
        elapsed_s: started.elapsed().as_secs_f64(),
    })
}

/// Stored runs of a project, most recent first.
pub fn list_runs(project_path: &Path) -> AppResult<Vec<RunManifest>> {
    let store = RunStore::for_project(project_path)?;
    let mut runs = store.list_runs()?;
    runs.reverse();
    Ok(runs)
}

pub fn load_run(project_path: &Path, run_id: &str) -> AppResult<(RunManifest, Vec<SnapshotRecord>)> {
    let store = RunStore::for_project(project_path)?;
    let manifest = store.load_manifest(run_id)?;
    let records = store.load_snapshots(run_id)?;
    Ok((manifest, records))
}
