use thiserror::Error;

/// Errors raised while building or evaluating a [`Program`](crate::Program).
///
/// All of these are caller mistakes in the model definition. The program is
/// left exactly as it was before the failing call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Variable '{name}' is already declared")]
    DuplicateVariable { name: String },
    #[error("Variable '{name}' is not declared in this program")]
    UnknownVariable { name: String },
    #[error("No value given for variable '{name}'")]
    UnboundVariable { name: String },
    #[error("Objective is already set for program '{program}'")]
    ObjectiveAlreadySet { program: String },
    #[error("Constraint '{name}' is already declared")]
    DuplicateConstraint { name: String },
    #[error("Invalid bounds for variable '{name}': [{lower}, {upper}]")]
    InvalidBounds { name: String, lower: f64, upper: f64 },
    #[error("Non-finite number in {context}")]
    NonFinite { context: String },
}

/// Errors raised by a solver backend.
///
/// Infeasibility, unboundedness and timeouts are not errors: they come back
/// as a [`SolveStatus`](crate::SolveStatus) on the solution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("Backend '{backend}' failed: {message}")]
    Backend { backend: &'static str, message: String },
    #[error("Backend '{backend}' worker stopped without a result")]
    Worker { backend: &'static str },
}

/// Errors raised by the feasible-region sampler and the 2D region helpers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SampleError {
    #[error("Sampling needs 2 or 3 axes, got {0}")]
    AxisCount(usize),
    #[error("Variable '{0}' is selected as an axis more than once")]
    DuplicateAxis(String),
    #[error("Invalid range for axis '{name}': [{min}, {max}]")]
    InvalidRange { name: String, min: f64, max: f64 },
    #[error("Resolution must be at least 1")]
    ZeroResolution,
    #[error("Grid of {resolution} points over {axes} axes exceeds the sampling limit")]
    GridTooLarge { resolution: usize, axes: usize },
    #[error(transparent)]
    Model(#[from] ModelError),
}
