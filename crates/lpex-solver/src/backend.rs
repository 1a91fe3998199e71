//! The seam between the modeling façade and the numeric solver.

use std::time::Duration;

use crate::error::SolveError;
use crate::lp::LpProblem;

/// What a backend concluded about an [`LpProblem`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendOutcome {
    /// Optimal values, one per variable column.
    Optimal { values: Vec<f64> },
    Infeasible,
    Unbounded,
    /// The time limit passed before the backend reached a verdict.
    TimedOut,
    /// The backend stopped without a verdict for another reason.
    NotSolved,
}

/// An LP/MIP solving engine.
///
/// Implementations run simplex for continuous problems and
/// branch-and-bound when [`LpProblem::has_integer_variables`] is true.
/// Failures other than infeasibility, unboundedness or a timeout are
/// reported as [`SolveError`]. Tie-breaking between several optimal points
/// is up to the backend.
pub trait SolverBackend {
    /// Short identifier used in logs and errors.
    fn name(&self) -> &'static str;

    /// Solve `problem` once.
    fn solve(&self, problem: &LpProblem, options: &SolveOptions) -> Result<BackendOutcome, SolveError>;
}

impl<B: SolverBackend + ?Sized> SolverBackend for &B {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn solve(&self, problem: &LpProblem, options: &SolveOptions) -> Result<BackendOutcome, SolveError> {
        (**self).solve(problem, options)
    }
}

impl<B: SolverBackend + ?Sized> SolverBackend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn solve(&self, problem: &LpProblem, options: &SolveOptions) -> Result<BackendOutcome, SolveError> {
        (**self).solve(problem, options)
    }
}

/// Options passed through to the backend on every solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOptions {
    /// Wall-clock limit for a single solve. `None` means no limit.
    pub time_limit: Option<Duration>,
    /// Snap integer variables to the nearest integer in the reported values.
    pub round_integers: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            time_limit: None,
            round_integers: true,
        }
    }
}

impl SolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop waiting for the backend after `limit`.
    ///
    /// With [`MicrolpBackend`](crate::MicrolpBackend) the solve keeps running
    /// on a detached worker thread after the deadline until it finishes on
    /// its own; only its result is discarded.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_integer_rounding(mut self, enabled: bool) -> Self {
        self.round_integers = enabled;
        self
    }
}
