use crate::constraint::ConstraintOp;
use crate::program::{Program, Sense};

/// A program lowered to the dense form handed to a [`SolverBackend`](crate::SolverBackend).
///
/// Column `j` of every coefficient vector belongs to `variables[j]`, which is
/// the program's declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct LpProblem {
    /// Variable columns
    pub variables: Vec<LpVariable>,
    /// Objective function coefficients
    pub objective: LpObjective,
    /// Constraint rows
    pub constraints: Vec<LpConstraint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LpVariable {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
    pub integer: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LpObjective {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    pub sense: Sense,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LpConstraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    pub op: ConstraintOp,
    /// Right-hand side with the expression's constant moved across
    pub rhs: f64,
}

impl LpProblem {
    /// Lower `program`, keeping only constraints with at least one variable term.
    ///
    /// A program without an objective becomes a feasibility problem: all
    /// objective coefficients zero, minimized.
    pub fn from_program(program: &Program) -> Self {
        let n = program.num_variables();
        let variables = program
            .variables()
            .iter()
            .map(|v| LpVariable {
                name: v.name().to_string(),
                lower: v.lower(),
                upper: v.upper(),
                integer: v.is_integer(),
            })
            .collect();

        let objective = match program.objective() {
            Some(objective) => {
                let mut coefficients = vec![0.0; n];
                for (v, c) in objective.expression.terms() {
                    coefficients[v.index()] = c;
                }
                LpObjective {
                    coefficients,
                    sense: objective.sense,
                }
            }
            None => LpObjective {
                coefficients: vec![0.0; n],
                sense: Sense::Minimize,
            },
        };

        let constraints = program
            .constraints()
            .iter()
            .filter(|c| !c.lhs().is_constant())
            .map(|c| {
                let mut coefficients = vec![0.0; n];
                for (v, coef) in c.lhs().terms() {
                    coefficients[v.index()] = coef;
                }
                LpConstraint {
                    name: c.name().to_string(),
                    coefficients,
                    op: c.op(),
                    rhs: c.normalized_rhs(),
                }
            })
            .collect();

        Self {
            variables,
            objective,
            constraints,
        }
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn has_integer_variables(&self) -> bool {
        self.variables.iter().any(|v| v.integer)
    }
}
