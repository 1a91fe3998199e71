use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::constraint::{Constraint, ConstraintOp, ConstraintViolation, FEASIBILITY_TOLERANCE};
use crate::error::ModelError;
use crate::expression::Expression;
use crate::variable::{Bounds, Point, VarKind, Variable};

static NEXT_PROGRAM_ID: AtomicU64 = AtomicU64::new(1);

/// Optimization direction of the objective.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sense {
    Maximize,
    Minimize,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::Maximize => f.write_str("maximize"),
            Sense::Minimize => f.write_str("minimize"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub expression: Expression,
    pub sense: Sense,
}

/// A linear or mixed-integer program.
///
/// Built incrementally: declare variables, set the objective, add
/// constraints. Solving and sampling only borrow the program, so once it is
/// shared it can no longer change. Every builder method validates its input
/// before touching the program; a failed call leaves it as it was.
///
/// Not `Clone`: variable handles identify their program, and a copy would
/// accept handles declared later in the original.
#[derive(Debug)]
pub struct Program {
    id: u64,
    name: String,
    variables: Vec<Variable>,
    variable_index: HashMap<String, usize>,
    objective: Option<Objective>,
    constraints: Vec<Constraint>,
    constraint_names: HashSet<String>,
    next_auto_name: usize,
}

impl Program {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NEXT_PROGRAM_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            variables: Vec::new(),
            variable_index: HashMap::new(),
            objective: None,
            constraints: Vec::new(),
            constraint_names: HashSet::new(),
            next_auto_name: 1,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a decision variable.
    pub fn add_variable(&mut self, name: impl Into<String>, bounds: Bounds, kind: VarKind) -> Result<Variable, ModelError> {
        let name = name.into();
        if self.variable_index.contains_key(&name) {
            return Err(ModelError::DuplicateVariable { name });
        }
        if !bounds.is_valid() {
            return Err(ModelError::InvalidBounds {
                name,
                lower: bounds.lower,
                upper: bounds.upper,
            });
        }

        let index = self.variables.len();
        let variable = Variable::new(self.id, index, name.clone(), bounds, kind);
        self.variable_index.insert(name, index);
        self.variables.push(variable.clone());
        Ok(variable)
    }

    /// Continuous variable with the default bounds `[0, +inf)`.
    pub fn continuous(&mut self, name: impl Into<String>) -> Result<Variable, ModelError> {
        self.add_variable(name, Bounds::default(), VarKind::Continuous)
    }

    /// Integer variable with the default bounds `[0, +inf)`.
    pub fn integer(&mut self, name: impl Into<String>) -> Result<Variable, ModelError> {
        self.add_variable(name, Bounds::default(), VarKind::Integer)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variable_index.get(name).map(|&i| &self.variables[i])
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// True if any variable is integer-valued.
    pub fn is_mixed_integer(&self) -> bool {
        self.variables.iter().any(Variable::is_integer)
    }

    /// Set the objective. It can be set only once per program.
    pub fn set_objective(&mut self, expression: Expression, sense: Sense) -> Result<(), ModelError> {
        if self.objective.is_some() {
            return Err(ModelError::ObjectiveAlreadySet {
                program: self.name.clone(),
            });
        }
        self.ensure_owned(&expression)?;
        if !expression.is_finite() {
            return Err(ModelError::NonFinite {
                context: format!("objective of '{}'", self.name),
            });
        }
        self.objective = Some(Objective { expression, sense });
        Ok(())
    }

    pub fn maximize(&mut self, expression: impl Into<Expression>) -> Result<(), ModelError> {
        self.set_objective(expression.into(), Sense::Maximize)
    }

    pub fn minimize(&mut self, expression: impl Into<Expression>) -> Result<(), ModelError> {
        self.set_objective(expression.into(), Sense::Minimize)
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    /// Append a constraint `expression op rhs`.
    ///
    /// Without a name the constraint is called `c1`, `c2`, ... skipping any
    /// name already taken.
    pub fn add_constraint(
        &mut self,
        expression: impl Into<Expression>,
        op: ConstraintOp,
        rhs: f64,
        name: Option<&str>,
    ) -> Result<&Constraint, ModelError> {
        let expression = expression.into();
        self.ensure_owned(&expression)?;

        let (name, next_auto_name) = match name {
            Some(name) if self.constraint_names.contains(name) => {
                return Err(ModelError::DuplicateConstraint { name: name.to_string() });
            }
            Some(name) => (name.to_string(), self.next_auto_name),
            None => self.auto_name(),
        };
        if !expression.is_finite() || !rhs.is_finite() {
            return Err(ModelError::NonFinite {
                context: format!("constraint '{}'", name),
            });
        }

        self.next_auto_name = next_auto_name;
        self.constraint_names.insert(name.clone());
        self.constraints.push(Constraint::new(name, expression, op, rhs));
        let index = self.constraints.len() - 1;
        Ok(&self.constraints[index])
    }

    /// `expression <= rhs`
    pub fn le(&mut self, name: &str, expression: impl Into<Expression>, rhs: f64) -> Result<&Constraint, ModelError> {
        self.add_constraint(expression, ConstraintOp::Le, rhs, Some(name))
    }

    /// `expression >= rhs`
    pub fn ge(&mut self, name: &str, expression: impl Into<Expression>, rhs: f64) -> Result<&Constraint, ModelError> {
        self.add_constraint(expression, ConstraintOp::Ge, rhs, Some(name))
    }

    /// `expression = rhs`
    pub fn eq(&mut self, name: &str, expression: impl Into<Expression>, rhs: f64) -> Result<&Constraint, ModelError> {
        self.add_constraint(expression, ConstraintOp::Eq, rhs, Some(name))
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name() == name)
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Whether `point` satisfies every constraint, every variable bound and
    /// the integrality of integer variables.
    pub fn is_feasible(&self, point: &Point) -> bool {
        let within_domain = self.variables.iter().all(|v| match point.get(v) {
            Some(value) => {
                v.bounds().contains(value, FEASIBILITY_TOLERANCE)
                    && (!v.is_integer() || (value - value.round()).abs() <= FEASIBILITY_TOLERANCE)
            }
            None => false,
        });
        within_domain && self.constraints.iter().all(|c| c.is_satisfied(point))
    }

    /// Constraints violated by `point`, worst first.
    pub fn violations(&self, point: &Point) -> Result<Vec<ConstraintViolation>, ModelError> {
        let mut violations = Vec::new();
        for c in &self.constraints {
            if let Some(violation) = c.violation(point)? {
                violations.push(violation);
            }
        }

        violations.sort_by(|a, b| b.violation_amount.total_cmp(&a.violation_amount));
        Ok(violations)
    }

    /// Names of the constraints that hold with equality at `point`.
    pub fn binding_constraints(&self, point: &Point) -> Result<Vec<String>, ModelError> {
        let mut binding = Vec::new();
        for c in &self.constraints {
            if c.slack(point)?.abs() <= FEASIBILITY_TOLERANCE {
                binding.push(c.name().to_string());
            }
        }
        Ok(binding)
    }

    /// Whether `variable` was declared by this program.
    pub fn owns(&self, variable: &Variable) -> bool {
        variable.program_id() == self.id
            && self
                .variables
                .get(variable.index())
                .is_some_and(|declared| declared.same_declaration(variable))
    }

    fn ensure_owned(&self, expression: &Expression) -> Result<(), ModelError> {
        match expression.variables().find(|v| !self.owns(v)) {
            Some(foreign) => Err(ModelError::UnknownVariable {
                name: foreign.name().to_string(),
            }),
            None => Ok(()),
        }
    }

    /// First free `cN` name and the counter value to resume from.
    fn auto_name(&self) -> (String, usize) {
        let mut counter = self.next_auto_name;
        loop {
            let candidate = format!("c{}", counter);
            counter += 1;
            if !self.constraint_names.contains(&candidate) {
                return (candidate, counter);
            }
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Program: {}", self.name)?;
        match &self.objective {
            Some(objective) => writeln!(f, "  {} {}", objective.sense, objective.expression)?,
            None => writeln!(f, "  (no objective)")?,
        }
        writeln!(f, "  subject to")?;
        for c in &self.constraints {
            writeln!(f, "    {}", c)?;
        }
        for v in &self.variables {
            let kind = match v.kind() {
                VarKind::Continuous => "continuous",
                VarKind::Integer => "integer",
            };
            writeln!(f, "    {} <= {} <= {} ({})", v.lower(), v.name(), v.upper(), kind)?;
        }
        Ok(())
    }
}
