//! Lightweight performance timing utilities.
//!
//! This module provides simple timing infrastructure for measuring
//! where runtime is being spent. Can be enabled/disabled via the `BS_TIMING`
//! environment variable or programmatically.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable performance timing globally.
pub fn enable_timing() {
    ENABLED.store(true, Ordering::Relaxed);
}

/// Disable performance timing globally.
pub fn disable_timing() {
    ENABLED.store(false, Ordering::Relaxed);
}

/// Check if timing is enabled.
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed) || std::env::var("BS_TIMING").is_ok()
}

/// A simple timer that measures elapsed time.
pub struct Timer {
    label: &'static str,
    start: Instant,
    enabled: bool,
}

impl Timer {
    /// Create and start a new timer with the given label.
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
            enabled: is_enabled(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Stop the timer and return elapsed time in seconds.
    /// If timing is disabled, returns None.
    pub fn stop(self) -> Option<f64> {
        if self.enabled {
            Some(self.start.elapsed().as_secs_f64())
        } else {
            None
        }
    }

    /// Stop the timer and add the elapsed seconds to `total`.
    pub fn stop_into(self, total: &mut f64) {
        if let Some(elapsed) = self.stop() {
            *total += elapsed;
        }
    }
}

/// Wall-clock totals for the phases of an implicit time run.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerfStats {
    pub assembly_s: f64,
    pub factorization_s: f64,
    pub solve_s: f64,
    pub total_s: f64,
    pub steps: usize,
}

impl PerfStats {
    /// Print a formatted summary of the statistics.
    pub fn print_summary(&self) {
        if !is_enabled() {
            return;
        }

        println!("\n=== Performance Summary ===");

        if self.total_s > 0.0 {
            println!("Run total:           {:.3}s", self.total_s);
            if self.steps > 0 {
                println!("  Steps:             {}", self.steps);
                println!(
                    "  Avg step time:     {:.4}s",
                    self.total_s / self.steps as f64
                );
            }
        }

        if self.assembly_s > 0.0 {
            println!("Operator assembly:   {:.3}s", self.assembly_s);
        }

        if self.factorization_s > 0.0 {
            println!("Factorization:       {:.3}s", self.factorization_s);
        }

        if self.solve_s > 0.0 {
            println!("Triangular solves:   {:.3}s", self.solve_s);
        }

        println!("==========================\n");
    }
}
