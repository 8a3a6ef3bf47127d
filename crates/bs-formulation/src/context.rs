//! Explicit assembly context threaded through every operator call.

/// Where in the run an assembly request comes from.
///
/// Time-dependent terms (boundary schedules, sources) read `time` from here;
/// there is no process-wide "current time".
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AssemblyContext {
    /// Time at the end of the step being solved (seconds).
    pub time: f64,
    /// Fixed step size (seconds).
    pub dt: f64,
    /// Step index, 0 for the initial state.
    pub step: usize,
    /// Nonlinear iteration within the step, starting at 0.
    pub iteration: usize,
}

impl AssemblyContext {
    /// Context for a standalone evaluation at time `time`.
    pub fn at_time(time: f64) -> Self {
        Self {
            time,
            dt: 0.0,
            step: 0,
            iteration: 0,
        }
    }
}
