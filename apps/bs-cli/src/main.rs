use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

mod error;
mod run_service;

use bs_integrator::StepProgress;
use error::{AppError, AppResult};
use run_service::RunRequest;

#[derive(Parser)]
#[command(name = "bs-cli")]
#[command(about = "Backstep CLI - fixed-step implicit Euler runs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and structure
    Validate {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
    },
    /// Run the project's integration
    Run {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
        /// Print assembly, factorization and solve timings
        #[arg(long)]
        timing: bool,
    },
    /// List cached runs for a project
    Runs {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
    },
    /// Show details of a cached run
    ShowRun {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
        /// Run ID to display
        run_id: String,
    },
    /// Export the history of one degree of freedom as CSV
    Export {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Global dof index
        #[arg(long)]
        dof: usize,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Run {
            project_path,
            no_cache,
            timing,
        } => cmd_run(&project_path, !no_cache, timing),
        Commands::Runs { project_path } => cmd_runs(&project_path),
        Commands::ShowRun {
            project_path,
            run_id,
        } => cmd_show_run(&project_path, &run_id),
        Commands::Export {
            project_path,
            run_id,
            dof,
            output,
        } => cmd_export(&project_path, &run_id, dof, output.as_deref()),
    }
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = bs_project::load(project_path)?;
    println!("✓ Project is valid");
    println!(
        "  {} ({}, {} dofs)",
        project.name,
        project.problem.kind(),
        project.problem.dof_count()
    );
    Ok(())
}

fn cmd_run(project_path: &Path, use_cache: bool, timing: bool) -> AppResult<()> {
    if timing {
        bs_core::timing::enable_timing();
    }
    println!("Running project: {}", project_path.display());

    let request = RunRequest {
        project_path,
        use_cache,
    };

    let mut last_emit = Instant::now();
    let mut last_fraction = -1.0f64;
    let response = run_service::ensure_run_with_progress(
        &request,
        Some(&mut |p: StepProgress| {
            let emit_now = (p.fraction_complete - last_fraction).abs() >= 0.005
                || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&p);
                last_fraction = p.fraction_complete;
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Run completed: {}", response.run_id);
    }

    let m = &response.manifest;
    println!("  Mode: {}", m.mode.as_str());
    println!("  Steps: {}", m.stats.steps);
    println!("  Snapshots: {}", m.snapshot_count);
    println!("  Solves: {}", m.stats.solves);
    println!("  Factorizations: {}", m.stats.factorizations);
    println!("  Wall time: {:.3}s", response.elapsed_s);
    m.stats.timing.print_summary();

    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_cli_progress(p: &StepProgress) {
    let width = 28usize;
    let filled = ((p.fraction_complete * width as f64).round() as usize).min(width);
    let bar = format!(
        "{}{}",
        "#".repeat(filled),
        "-".repeat(width.saturating_sub(filled))
    );
    print!(
        "\r[{}] {:>6.2}%  t={:.4}s  step={}/{}  iters={}  change={:.2e}",
        bar,
        p.fraction_complete * 100.0,
        p.time,
        p.step,
        p.total_steps,
        p.iterations,
        p.relative_change
    );
    let _ = io::stdout().flush();
}

fn cmd_runs(project_path: &Path) -> AppResult<()> {
    let runs = run_service::list_runs(project_path)?;

    if runs.is_empty() {
        println!("No cached runs found for: {}", project_path.display());
    } else {
        println!("Cached runs:");
        for manifest in runs {
            println!(
                "  {} ({}, {}, {} snapshots)",
                manifest.run_id,
                manifest.timestamp,
                manifest.mode.as_str(),
                manifest.snapshot_count
            );
        }
    }
    Ok(())
}

fn cmd_show_run(project_path: &Path, run_id: &str) -> AppResult<()> {
    println!("Loading run: {}", run_id);

    let (manifest, records) = run_service::load_run(project_path, run_id)?;

    println!("\nRun Summary:");
    println!("  Project: {}", manifest.project_name);
    println!("  Created: {}", manifest.timestamp);
    println!("  Mode: {}", manifest.mode.as_str());
    println!(
        "  Range: {} - {} s (dt = {} s, every {} steps)",
        manifest.start, manifest.end, manifest.dt, manifest.output_stride
    );
    println!("  Dofs: {}", manifest.dof_count);
    println!("  Snapshots: {}", records.len());

    let s = &manifest.stats;
    println!("\nStatistics:");
    println!("  Steps: {}", s.steps);
    println!("  Nonlinear iterations: {}", s.nonlinear_iterations);
    println!("  Max iterations in a step: {}", s.max_iterations_in_step);
    println!(
        "  Assemblies (K/C/rhs): {}/{}/{}",
        s.stiffness_assemblies, s.damping_assemblies, s.rhs_assemblies
    );
    println!("  Constraint refreshes: {}", s.constraint_refreshes);
    println!("  Factorizations: {}", s.factorizations);

    if let Some(last) = records.last() {
        let preview: Vec<String> = last.values.iter().take(8).map(|v| format!("{v:.6}")).collect();
        let more = if last.values.len() > 8 { ", ..." } else { "" };
        println!("\nFinal state (t = {} s):", last.time_s);
        println!("  [{}{}]", preview.join(", "), more);
    }

    Ok(())
}

fn cmd_export(project_path: &Path, run_id: &str, dof: usize, output: Option<&Path>) -> AppResult<()> {
    let (manifest, records) = run_service::load_run(project_path, run_id)?;

    let series = bs_results::dof_series(&records, dof).ok_or_else(|| {
        AppError::InvalidInput(format!(
            "dof {} out of range (run has {} dofs)",
            dof, manifest.dof_count
        ))
    })?;

    let mut csv = String::from("time_s,value\n");
    for (t, val) in &series {
        csv.push_str(&format!("{},{}\n", t, val));
    }

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!(
            "✓ Exported {} data points to {}",
            series.len(),
            path.display()
        );
    } else {
        print!("{}", csv);
    }

    Ok(())
}
