//! Linear and mixed-integer programs: build them from typed expressions,
//! solve them through a pluggable backend, and sample their feasible region.
//!
//! ```
//! use lpex_solver::{Program, SolveStatus, solve};
//!
//! let mut program = Program::new("forge");
//! let x = program.continuous("x").unwrap();
//! let y = program.continuous("y").unwrap();
//! program.maximize(1900.0 * &x + 2100.0 * &y).unwrap();
//! program.le("ore", 2.0 * &x + 3.0 * &y, 10.0).unwrap();
//!
//! let solution = solve(&program).unwrap();
//! assert_eq!(solution.status, SolveStatus::Optimal);
//! ```

mod backend;
mod constraint;
mod error;
mod expression;
mod lp;
mod microlp_backend;
mod program;
mod region;
mod sample;
mod solution;
mod solve;
mod variable;

pub use backend::{BackendOutcome, SolveOptions, SolverBackend};
pub use constraint::{Constraint, ConstraintOp, ConstraintViolation, FEASIBILITY_TOLERANCE};
pub use error::{ModelError, SampleError, SolveError};
pub use expression::Expression;
pub use lp::{LpConstraint, LpObjective, LpProblem, LpVariable};
pub use microlp_backend::MicrolpBackend;
pub use program::{Objective, Program, Sense};
pub use region::{BoundaryLine, boundary_line, feasible_vertices};
pub use sample::{FeasibilityGrid, GridAxis, MAX_GRID_POINTS, SampleSpec, sample_feasible_region};
pub use solution::{Solution, SolveStatus};
pub use solve::{Solver, solve};
pub use variable::{Bounds, Point, VarKind, Variable};
