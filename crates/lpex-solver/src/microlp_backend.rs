//! Default backend built on the pure-Rust `microlp` solver.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;

use microlp::{ComparisonOp, OptimizationDirection, Problem};
use tracing::{debug, warn};

use crate::backend::{BackendOutcome, SolveOptions, SolverBackend};
use crate::constraint::ConstraintOp;
use crate::error::SolveError;
use crate::lp::{LpProblem, LpVariable};
use crate::program::Sense;

const BACKEND: &str = "microlp";

/// Simplex and branch-and-bound through `microlp`.
///
/// microlp has no time limit of its own. When one is requested the solve
/// runs on a worker thread and the backend stops waiting at the deadline;
/// the abandoned worker finishes in the background and its result is
/// dropped.
///
/// microlp takes integer bounds as `i32`. A finite integer bound outside
/// that range is an error. A missing integer bound is replaced by the `i32`
/// extreme, and an optimum that lands on that stand-in is an error rather
/// than a silently clamped value. A problem whose integer points all lie
/// beyond the `i32` range reports infeasible.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicrolpBackend;

impl MicrolpBackend {
    pub fn new() -> Self {
        Self
    }
}

impl SolverBackend for MicrolpBackend {
    fn name(&self) -> &'static str {
        BACKEND
    }

    fn solve(&self, problem: &LpProblem, options: &SolveOptions) -> Result<BackendOutcome, SolveError> {
        let columns: Vec<Column> = problem.variables.iter().map(Column::from_variable).collect();
        if let Some(empty) = problem.variables.iter().zip(&columns).find(|(_, c)| c.lower > c.upper) {
            debug!(
                component = "microlp",
                operation = "build",
                variable = %empty.0.name,
                "Integer variable has no integral value inside its bounds"
            );
            return Ok(BackendOutcome::Infeasible);
        }

        if problem.constraints.is_empty() {
            return Ok(solve_bounds_only(problem, &columns));
        }

        let (model, handles, ranges) = build_problem(problem, &columns)?;
        debug!(
            component = "microlp",
            operation = "solve",
            variables = problem.num_variables() as u64,
            constraints = problem.num_constraints() as u64,
            integer = problem.has_integer_variables(),
            "Solving with microlp"
        );

        let result = match options.time_limit {
            None => run(&model, &handles),
            Some(limit) => {
                let (tx, rx) = mpsc::channel();
                thread::Builder::new()
                    .name("lpex-microlp".to_string())
                    .spawn(move || {
                        // The receiver is gone once the deadline has passed.
                        let _ = tx.send(run(&model, &handles));
                    })
                    .map_err(|e| SolveError::Backend {
                        backend: BACKEND,
                        message: format!("cannot start worker: {}", e),
                    })?;

                match rx.recv_timeout(limit) {
                    Ok(result) => result,
                    Err(RecvTimeoutError::Timeout) => {
                        warn!(
                            component = "microlp",
                            operation = "solve",
                            limit_ms = limit.as_millis() as u64,
                            "Time limit reached"
                        );
                        return Ok(BackendOutcome::TimedOut);
                    }
                    Err(RecvTimeoutError::Disconnected) => {
                        return Err(SolveError::Worker { backend: BACKEND });
                    }
                }
            }
        };

        match result {
            Ok(mut values) => {
                check_integer_limits(problem, &ranges, &values)?;
                if options.round_integers {
                    for (value, column) in values.iter_mut().zip(&columns) {
                        if column.integer {
                            *value = value.round();
                        }
                    }
                }
                Ok(BackendOutcome::Optimal { values })
            }
            Err(microlp::Error::Infeasible) => Ok(BackendOutcome::Infeasible),
            Err(microlp::Error::Unbounded) => Ok(BackendOutcome::Unbounded),
            Err(microlp::Error::InternalError(message)) => Err(SolveError::Backend {
                backend: BACKEND,
                message,
            }),
        }
    }
}

/// Effective bounds of a column; integer bounds are tightened to integers.
#[derive(Debug, Clone, Copy)]
struct Column {
    lower: f64,
    upper: f64,
    integer: bool,
}

impl Column {
    fn from_variable(variable: &LpVariable) -> Self {
        if variable.integer {
            Self {
                lower: variable.lower.ceil(),
                upper: variable.upper.floor(),
                integer: true,
            }
        } else {
            Self {
                lower: variable.lower,
                upper: variable.upper,
                integer: false,
            }
        }
    }
}

/// Integer bounds as microlp takes them. `open_*` marks an infinite bound
/// standing in as the `i32` extreme.
#[derive(Debug, Clone, Copy, PartialEq)]
struct IntegerRange {
    lower: i32,
    upper: i32,
    open_below: bool,
    open_above: bool,
}

impl IntegerRange {
    fn new(variable: &LpVariable, column: &Column) -> Result<Self, SolveError> {
        let (lower, open_below) = integer_bound(variable, column.lower, i32::MIN)?;
        let (upper, open_above) = integer_bound(variable, column.upper, i32::MAX)?;
        Ok(Self {
            lower,
            upper,
            open_below,
            open_above,
        })
    }
}

fn integer_bound(variable: &LpVariable, bound: f64, stand_in: i32) -> Result<(i32, bool), SolveError> {
    if bound.is_infinite() {
        return Ok((stand_in, true));
    }
    if bound < i32::MIN as f64 || bound > i32::MAX as f64 {
        return Err(SolveError::Backend {
            backend: BACKEND,
            message: format!(
                "bound {} of integer variable '{}' is outside the supported range [{}, {}]",
                bound,
                variable.name,
                i32::MIN,
                i32::MAX
            ),
        });
    }
    Ok((bound as i32, false))
}

/// Reject optima pinned to an `i32` stand-in bound; the true optimum lies
/// beyond what microlp can represent.
fn check_integer_limits(problem: &LpProblem, ranges: &[Option<IntegerRange>], values: &[f64]) -> Result<(), SolveError> {
    for ((variable, range), &value) in problem.variables.iter().zip(ranges).zip(values) {
        let Some(range) = range else { continue };
        let pinned = (range.open_above && value >= range.upper as f64 - 0.5)
            || (range.open_below && value <= range.lower as f64 + 0.5);
        if pinned {
            warn!(
                component = "microlp",
                operation = "solve",
                variable = %variable.name,
                value,
                "Integer variable reached the i32 limit"
            );
            return Err(SolveError::Backend {
                backend: BACKEND,
                message: format!("integer variable '{}' reached the i32 limit at {}", variable.name, value),
            });
        }
    }
    Ok(())
}

type Built = (Problem, Vec<microlp::Variable>, Vec<Option<IntegerRange>>);

fn build_problem(problem: &LpProblem, columns: &[Column]) -> Result<Built, SolveError> {
    let direction = match problem.objective.sense {
        Sense::Maximize => OptimizationDirection::Maximize,
        Sense::Minimize => OptimizationDirection::Minimize,
    };
    let mut model = Problem::new(direction);

    let mut handles = Vec::with_capacity(columns.len());
    let mut ranges = Vec::with_capacity(columns.len());
    for ((variable, column), &cost) in problem.variables.iter().zip(columns).zip(&problem.objective.coefficients) {
        if column.integer {
            let range = IntegerRange::new(variable, column)?;
            handles.push(model.add_integer_var(cost, (range.lower, range.upper)));
            ranges.push(Some(range));
        } else {
            handles.push(model.add_var(cost, (column.lower, column.upper)));
            ranges.push(None);
        }
    }

    for constraint in &problem.constraints {
        let terms: Vec<(microlp::Variable, f64)> = constraint
            .coefficients
            .iter()
            .enumerate()
            .filter(|(_, c)| **c != 0.0)
            .map(|(j, &c)| (handles[j], c))
            .collect();
        let op = match constraint.op {
            ConstraintOp::Le => ComparisonOp::Le,
            ConstraintOp::Ge => ComparisonOp::Ge,
            ConstraintOp::Eq => ComparisonOp::Eq,
        };
        model.add_constraint(terms, op, constraint.rhs);
    }

    Ok((model, handles, ranges))
}

fn run(model: &Problem, handles: &[microlp::Variable]) -> Result<Vec<f64>, microlp::Error> {
    let solution = model.solve()?;
    Ok(handles.iter().map(|&v| solution[v]).collect())
}

/// With no rows each column is optimized on its own against its bounds.
fn solve_bounds_only(problem: &LpProblem, columns: &[Column]) -> BackendOutcome {
    let mut values = Vec::with_capacity(columns.len());
    for (column, &cost) in columns.iter().zip(&problem.objective.coefficients) {
        let improving = match problem.objective.sense {
            Sense::Maximize => cost,
            Sense::Minimize => -cost,
        };
        let value = if improving > 0.0 {
            column.upper
        } else if improving < 0.0 {
            column.lower
        } else if column.lower.is_finite() {
            column.lower
        } else if column.upper.is_finite() {
            column.upper
        } else {
            0.0
        };
        if !value.is_finite() {
            return BackendOutcome::Unbounded;
        }
        values.push(value);
    }
    BackendOutcome::Optimal { values }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::lp::{LpConstraint, LpObjective};

    fn variable(name: &str, lower: f64, upper: f64, integer: bool) -> LpVariable {
        LpVariable {
            name: name.to_string(),
            lower,
            upper,
            integer,
        }
    }

    #[test]
    fn test_simple_maximization() {
        // Maximize: 3x + 2y
        // Subject to:
        //   x + y <= 4
        //   x <= 3
        //   y <= 3
        // Optimal: x=3, y=1, obj=11
        let problem = LpProblem {
            variables: vec![
                variable("x", 0.0, f64::INFINITY, false),
                variable("y", 0.0, f64::INFINITY, false),
            ],
            objective: LpObjective {
                coefficients: vec![3.0, 2.0],
                sense: Sense::Maximize,
            },
            constraints: vec![
                LpConstraint {
                    name: "sum".to_string(),
                    coefficients: vec![1.0, 1.0],
                    op: ConstraintOp::Le,
                    rhs: 4.0,
                },
                LpConstraint {
                    name: "x_max".to_string(),
                    coefficients: vec![1.0, 0.0],
                    op: ConstraintOp::Le,
                    rhs: 3.0,
                },
                LpConstraint {
                    name: "y_max".to_string(),
                    coefficients: vec![0.0, 1.0],
                    op: ConstraintOp::Le,
                    rhs: 3.0,
                },
            ],
        };

        let outcome = MicrolpBackend.solve(&problem, &SolveOptions::default()).unwrap();
        let BackendOutcome::Optimal { values } = outcome else {
            panic!("expected optimal, got {:?}", outcome);
        };
        assert!((values[0] - 3.0).abs() < 1e-6, "x = {} (expected 3)", values[0]);
        assert!((values[1] - 1.0).abs() < 1e-6, "y = {} (expected 1)", values[1]);
    }

    #[test]
    fn test_infeasible() {
        // x >= 5
        // x <= 3
        let problem = LpProblem {
            variables: vec![variable("x", 0.0, f64::INFINITY, false)],
            objective: LpObjective {
                coefficients: vec![1.0],
                sense: Sense::Minimize,
            },
            constraints: vec![
                LpConstraint {
                    name: "lower".to_string(),
                    coefficients: vec![1.0],
                    op: ConstraintOp::Ge,
                    rhs: 5.0,
                },
                LpConstraint {
                    name: "upper".to_string(),
                    coefficients: vec![1.0],
                    op: ConstraintOp::Le,
                    rhs: 3.0,
                },
            ],
        };

        let outcome = MicrolpBackend.solve(&problem, &SolveOptions::default()).unwrap();
        assert_eq!(outcome, BackendOutcome::Infeasible);
    }

    #[test]
    fn test_bounds_only() {
        let problem = LpProblem {
            variables: vec![
                variable("a", 1.0, 4.0, false),
                variable("b", -2.0, 9.5, true),
                variable("c", 0.0, f64::INFINITY, false),
            ],
            objective: LpObjective {
                coefficients: vec![1.0, 2.0, 0.0],
                sense: Sense::Maximize,
            },
            constraints: Vec::new(),
        };

        let outcome = MicrolpBackend.solve(&problem, &SolveOptions::default()).unwrap();
        assert_eq!(outcome, BackendOutcome::Optimal { values: vec![4.0, 9.0, 0.0] });
    }

    #[test]
    fn test_bounds_only_unbounded() {
        let problem = LpProblem {
            variables: vec![variable("a", 0.0, f64::INFINITY, false)],
            objective: LpObjective {
                coefficients: vec![1.0],
                sense: Sense::Maximize,
            },
            constraints: Vec::new(),
        };

        let outcome = MicrolpBackend.solve(&problem, &SolveOptions::default()).unwrap();
        assert_eq!(outcome, BackendOutcome::Unbounded);
    }

    #[test]
    fn test_integer_without_integral_point() {
        let problem = LpProblem {
            variables: vec![variable("n", 0.2, 0.8, true)],
            objective: LpObjective {
                coefficients: vec![1.0],
                sense: Sense::Minimize,
            },
            constraints: Vec::new(),
        };

        let outcome = MicrolpBackend.solve(&problem, &SolveOptions::default()).unwrap();
        assert_eq!(outcome, BackendOutcome::Infeasible);
    }

    fn one_row(variable: LpVariable, sense: Sense, op: ConstraintOp, rhs: f64) -> LpProblem {
        LpProblem {
            variables: vec![variable],
            objective: LpObjective {
                coefficients: vec![1.0],
                sense,
            },
            constraints: vec![LpConstraint {
                name: "row".to_string(),
                coefficients: vec![1.0],
                op,
                rhs,
            }],
        }
    }

    #[test]
    fn test_integer_bound_outside_i32_range() {
        let problem = one_row(variable("n", 0.0, 5e9, true), Sense::Maximize, ConstraintOp::Le, 10.0);

        let err = MicrolpBackend.solve(&problem, &SolveOptions::default()).unwrap_err();
        assert!(matches!(err, SolveError::Backend { ref message, .. } if message.contains("'n'")));
    }

    #[test]
    fn test_open_integer_bound_reaching_i32_limit() {
        // n <= 5e9 only through a row, so the column upper bound is the i32 stand-in
        let problem = one_row(variable("n", 0.0, f64::INFINITY, true), Sense::Maximize, ConstraintOp::Le, 5e9);

        let err = MicrolpBackend.solve(&problem, &SolveOptions::default()).unwrap_err();
        assert!(matches!(err, SolveError::Backend { ref message, .. } if message.contains("i32 limit")));
    }

    #[test]
    fn test_free_integer_inside_i32_range() {
        let problem = one_row(
            variable("n", f64::NEG_INFINITY, f64::INFINITY, true),
            Sense::Minimize,
            ConstraintOp::Ge,
            -10.5,
        );

        let outcome = MicrolpBackend.solve(&problem, &SolveOptions::default()).unwrap();
        assert_eq!(outcome, BackendOutcome::Optimal { values: vec![-10.0] });
    }

    /// Integer knapsack large enough that branch-and-bound cannot finish
    /// before a zero deadline.
    fn knapsack() -> LpProblem {
        let n = 16;
        let weights: Vec<f64> = (0..n).map(|i| 31.0 + 7.0 * i as f64).collect();
        let values: Vec<f64> = weights.iter().enumerate().map(|(i, w)| w * 1.1 + (i % 3) as f64).collect();
        LpProblem {
            variables: (0..n).map(|i| variable(&format!("item{}", i), 0.0, 10.0, true)).collect(),
            objective: LpObjective {
                coefficients: values,
                sense: Sense::Maximize,
            },
            constraints: vec![
                LpConstraint {
                    name: "capacity".to_string(),
                    coefficients: weights,
                    op: ConstraintOp::Le,
                    rhs: 1999.5,
                },
                LpConstraint {
                    name: "count".to_string(),
                    coefficients: vec![1.0; n],
                    op: ConstraintOp::Le,
                    rhs: 23.5,
                },
            ],
        }
    }

    #[test]
    fn test_zero_time_limit_times_out() {
        let options = SolveOptions::new().with_time_limit(Duration::ZERO);

        let outcome = MicrolpBackend.solve(&knapsack(), &options).unwrap();
        assert_eq!(outcome, BackendOutcome::TimedOut);
    }
}
