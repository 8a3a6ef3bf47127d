//! Per-step bookkeeping of the nonlinear fixed-point loop.

use crate::error::{IntegratorError, IntegratorResult};
use crate::options::{Linearity, NonlinearSettings};

/// Outcome of one recorded iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Converged,
}

/// Tracks relative changes within one time step and decides when to stop.
///
/// Linear runs always stop after the first iteration. Nonlinear runs stop when
/// the relative change is at or below the tolerance, and fail on a NaN change,
/// an exhausted iteration budget, or a stalled sequence. An infinite change
/// (the iterate collapsed onto zero) is only a large change.
#[derive(Debug)]
pub struct ConvergenceMonitor<'a> {
    settings: &'a NonlinearSettings,
    linearity: Linearity,
    step: usize,
    time: f64,
    iterations: usize,
    last: f64,
    stalled: usize,
}

impl<'a> ConvergenceMonitor<'a> {
    pub fn new(settings: &'a NonlinearSettings, linearity: Linearity, step: usize, time: f64) -> Self {
        Self {
            settings,
            linearity,
            step,
            time,
            iterations: 0,
            last: f64::INFINITY,
            stalled: 0,
        }
    }

    /// Iterations recorded so far.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn record(&mut self, relative_change: f64) -> IntegratorResult<Verdict> {
        self.iterations += 1;

        if relative_change.is_nan() {
            return Err(IntegratorError::NonFinite {
                what: "relative change",
                step: self.step,
                time: self.time,
            });
        }

        let previous = self.last;
        self.last = relative_change;

        if self.linearity.is_linear() || relative_change <= self.settings.tolerance {
            return Ok(Verdict::Converged);
        }

        if self.iterations >= self.settings.max_iterations {
            return Err(IntegratorError::ConvergenceFailed {
                step: self.step,
                time: self.time,
                iterations: self.iterations,
                relative_change,
            });
        }

        if previous.is_finite() && relative_change >= previous {
            self.stalled += 1;
        } else {
            self.stalled = 0;
        }
        if let Some(limit) = self.settings.stall_limit
            && self.stalled >= limit
        {
            return Err(IntegratorError::Stagnated {
                step: self.step,
                time: self.time,
                iterations: self.iterations,
                relative_change,
            });
        }

        Ok(Verdict::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(stall_limit: Option<usize>) -> NonlinearSettings {
        NonlinearSettings {
            tolerance: 1e-6,
            max_iterations: 5,
            stall_limit,
        }
    }

    #[test]
    fn linear_stops_after_one_iteration() {
        let s = settings(None);
        let mut m = ConvergenceMonitor::new(&s, Linearity::Linear, 1, 0.1);
        assert_eq!(m.record(0.9).unwrap(), Verdict::Converged);
        assert_eq!(m.iterations(), 1);
    }

    #[test]
    fn nonlinear_stops_at_tolerance() {
        let s = settings(None);
        let mut m = ConvergenceMonitor::new(&s, Linearity::Nonlinear, 1, 0.1);
        assert_eq!(m.record(0.5).unwrap(), Verdict::Continue);
        assert_eq!(m.record(1e-3).unwrap(), Verdict::Continue);
        assert_eq!(m.record(1e-6).unwrap(), Verdict::Converged);
        assert_eq!(m.iterations(), 3);
    }

    #[test]
    fn budget_exhaustion_fails() {
        let s = settings(None);
        let mut m = ConvergenceMonitor::new(&s, Linearity::Nonlinear, 2, 0.2);
        for i in 0..4 {
            assert_eq!(m.record(0.5 / (i + 1) as f64).unwrap(), Verdict::Continue);
        }
        let err = m.record(0.01).unwrap_err();
        assert_eq!(
            err,
            IntegratorError::ConvergenceFailed {
                step: 2,
                time: 0.2,
                iterations: 5,
                relative_change: 0.01
            }
        );
    }

    #[test]
    fn stall_detection() {
        let s = settings(Some(2));
        let mut m = ConvergenceMonitor::new(&s, Linearity::Nonlinear, 1, 0.1);
        assert_eq!(m.record(0.5).unwrap(), Verdict::Continue);
        assert_eq!(m.record(0.5).unwrap(), Verdict::Continue);
        let err = m.record(0.6).unwrap_err();
        assert!(matches!(err, IntegratorError::Stagnated { iterations: 3, .. }));
    }

    #[test]
    fn infinite_change_is_not_fatal() {
        let s = settings(Some(1));
        let mut m = ConvergenceMonitor::new(&s, Linearity::Linear, 1, 0.1);
        assert_eq!(m.record(f64::INFINITY).unwrap(), Verdict::Converged);

        let mut m = ConvergenceMonitor::new(&s, Linearity::Nonlinear, 1, 0.1);
        assert_eq!(m.record(f64::INFINITY).unwrap(), Verdict::Continue);
        assert_eq!(m.record(0.0).unwrap(), Verdict::Converged);
        assert_eq!(m.iterations(), 2);
    }

    #[test]
    fn nan_change_is_reported() {
        let s = settings(None);
        let mut m = ConvergenceMonitor::new(&s, Linearity::Linear, 1, 0.1);
        let err = m.record(f64::NAN).unwrap_err();
        assert!(matches!(err, IntegratorError::NonFinite { .. }));
    }
}
