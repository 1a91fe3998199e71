use tracing::{debug, warn};

use crate::backend::{BackendOutcome, SolveOptions, SolverBackend};
use crate::error::SolveError;
use crate::lp::LpProblem;
use crate::microlp_backend::MicrolpBackend;
use crate::program::Program;
use crate::solution::Solution;
use crate::variable::Point;

/// Solve `program` with the default backend and options.
pub fn solve(program: &Program) -> Result<Solution, SolveError> {
    Solver::new().solve(program)
}

/// Translates programs into backend input and backend results into
/// [`Solution`]s.
///
/// A solver holds no state between calls, so one instance may solve any
/// number of programs, from several threads if the backend is `Sync`.
#[derive(Debug, Clone, Default)]
pub struct Solver<B = MicrolpBackend> {
    backend: B,
    options: SolveOptions,
}

impl Solver<MicrolpBackend> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<B: SolverBackend> Solver<B> {
    pub fn with_backend<C: SolverBackend>(self, backend: C) -> Solver<C> {
        Solver {
            backend,
            options: self.options,
        }
    }

    pub fn with_options(mut self, options: SolveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &SolveOptions {
        &self.options
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Solve `program` with a single backend call.
    ///
    /// Infeasible, unbounded and timed-out programs come back as a
    /// [`Solution`] status; only backend failures are errors. Nothing is
    /// retried.
    pub fn solve(&self, program: &Program) -> Result<Solution, SolveError> {
        if program.objective().is_none() {
            warn!(
                component = "solve",
                program = program.name(),
                "No objective set, solving for feasibility only"
            );
        }

        // rows without variables never reach the backend
        if let Some(c) = program
            .constraints()
            .iter()
            .find(|c| c.lhs().is_constant() && !c.is_satisfied(&Point::new()))
        {
            debug!(
                component = "solve",
                program = program.name(),
                constraint = c.name(),
                "Constant constraint is violated"
            );
            return Ok(Solution::infeasible());
        }

        let problem = LpProblem::from_program(program);
        debug!(
            component = "solve",
            operation = "lower",
            program = program.name(),
            backend = self.backend.name(),
            variables = problem.num_variables() as u64,
            constraints = problem.num_constraints() as u64,
            "Lowered program"
        );

        let outcome = self.backend.solve(&problem, &self.options)?;
        let solution = match outcome {
            BackendOutcome::Optimal { values } => {
                if values.len() != program.num_variables() {
                    return Err(SolveError::Backend {
                        backend: self.backend.name(),
                        message: format!(
                            "returned {} values for {} variables",
                            values.len(),
                            program.num_variables()
                        ),
                    });
                }
                let point: Point = program.variables().iter().cloned().zip(values).collect();
                let objective_value = match program.objective() {
                    Some(objective) => objective.expression.evaluate(&point).map_err(|e| SolveError::Backend {
                        backend: self.backend.name(),
                        message: e.to_string(),
                    })?,
                    None => 0.0,
                };
                Solution::optimal(point, objective_value)
            }
            BackendOutcome::Infeasible => Solution::infeasible(),
            BackendOutcome::Unbounded => Solution::unbounded(),
            BackendOutcome::TimedOut => Solution::timeout(),
            BackendOutcome::NotSolved => Solution::not_solved(),
        };

        debug!(
            component = "solve",
            program = program.name(),
            status = solution.status.as_str(),
            objective = solution.objective_value,
            "Solved"
        );
        Ok(solution)
    }
}
