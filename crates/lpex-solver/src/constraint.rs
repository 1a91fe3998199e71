use std::fmt;

use crate::error::ModelError;
use crate::expression::Expression;
use crate::variable::Point;

/// Absolute tolerance used when checking constraints against a point.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl ConstraintOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ConstraintOp::Le => "<=",
            ConstraintOp::Ge => ">=",
            ConstraintOp::Eq => "=",
        }
    }

    /// Whether `lhs op rhs` holds within `tolerance`.
    pub fn holds(self, lhs: f64, rhs: f64, tolerance: f64) -> bool {
        match self {
            ConstraintOp::Le => lhs <= rhs + tolerance,
            ConstraintOp::Ge => lhs >= rhs - tolerance,
            ConstraintOp::Eq => (lhs - rhs).abs() <= tolerance,
        }
    }
}

impl fmt::Display for ConstraintOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A named linear constraint `lhs op rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    name: String,
    lhs: Expression,
    op: ConstraintOp,
    rhs: f64,
}

impl Constraint {
    pub fn new(name: impl Into<String>, lhs: Expression, op: ConstraintOp, rhs: f64) -> Self {
        Self {
            name: name.into(),
            lhs,
            op,
            rhs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lhs(&self) -> &Expression {
        &self.lhs
    }

    pub fn op(&self) -> ConstraintOp {
        self.op
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    /// Right-hand side with the constant term of the lhs moved across.
    pub fn normalized_rhs(&self) -> f64 {
        self.rhs - self.lhs.constant_term()
    }

    /// Evaluate the constraint at `point`, reporting missing variables.
    pub fn check(&self, point: &Point) -> Result<bool, ModelError> {
        let lhs = self.lhs.evaluate(point)?;
        Ok(self.op.holds(lhs, self.rhs, FEASIBILITY_TOLERANCE))
    }

    /// Whether `point` satisfies the constraint.
    ///
    /// A point that leaves a referenced variable without a value cannot
    /// witness feasibility, so it reports `false`.
    pub fn is_satisfied(&self, point: &Point) -> bool {
        self.check(point).unwrap_or(false)
    }

    /// Signed distance from the boundary at `point`.
    ///
    /// Non-negative when satisfied for `<=` and `>=`; for `=` it is the
    /// negated absolute deviation, so zero means tight.
    pub fn slack(&self, point: &Point) -> Result<f64, ModelError> {
        let lhs = self.lhs.evaluate(point)?;
        Ok(match self.op {
            ConstraintOp::Le => self.rhs - lhs,
            ConstraintOp::Ge => lhs - self.rhs,
            ConstraintOp::Eq => -(lhs - self.rhs).abs(),
        })
    }

    /// Describe how `point` violates the constraint, if it does.
    pub fn violation(&self, point: &Point) -> Result<Option<ConstraintViolation>, ModelError> {
        let actual = self.lhs.evaluate(point)?;
        if self.op.holds(actual, self.rhs, FEASIBILITY_TOLERANCE) {
            return Ok(None);
        }

        let (amount, description) = match self.op {
            ConstraintOp::Le => {
                let amount = actual - self.rhs;
                (amount, format!("{} exceeds maximum of {:.2} by {:.2}", self.name, self.rhs, amount))
            }
            ConstraintOp::Ge => {
                let amount = self.rhs - actual;
                (amount, format!("{} is below minimum of {:.2} by {:.2}", self.name, self.rhs, amount))
            }
            ConstraintOp::Eq => {
                let amount = (actual - self.rhs).abs();
                (amount, format!("{} requires exactly {:.2} but got {:.2}", self.name, self.rhs, actual))
            }
        };

        Ok(Some(ConstraintViolation {
            constraint: self.name.clone(),
            required: self.rhs,
            actual,
            violation_amount: amount,
            description,
        }))
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {} {}", self.name, self.lhs, self.op, self.rhs)
    }
}

/// Information about a violated constraint
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintViolation {
    /// Constraint name
    pub constraint: String,
    /// Required value (from constraint RHS)
    pub required: f64,
    /// Actual value of the left-hand side
    pub actual: f64,
    /// How much the constraint is violated by
    pub violation_amount: f64,
    /// Human-readable description of what's wrong
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Program;

    #[test]
    fn test_is_satisfied_per_operator() {
        let mut program = Program::new("ops");
        let x = program.continuous("x").unwrap();
        let at_two = Point::new().with(&x, 2.0);

        let le = Constraint::new("le", Expression::from(&x), ConstraintOp::Le, 2.0);
        let ge = Constraint::new("ge", Expression::from(&x), ConstraintOp::Ge, 3.0);
        let eq = Constraint::new("eq", Expression::from(&x), ConstraintOp::Eq, 2.0);

        assert!(le.is_satisfied(&at_two));
        assert!(!ge.is_satisfied(&at_two));
        assert!(eq.is_satisfied(&at_two));
    }

    #[test]
    fn test_tolerance_absorbs_round_off() {
        let mut program = Program::new("tol");
        let x = program.continuous("x").unwrap();
        let y = program.continuous("y").unwrap();
        let c = Constraint::new("time", 20.0 * &x + 30.0 * &y, ConstraintOp::Le, 1200.0);

        let point = Point::new().with(&x, 15.000000001).with(&y, 30.0);
        assert!(c.is_satisfied(&point));
    }

    #[test]
    fn test_missing_variable_is_not_satisfied() {
        let mut program = Program::new("missing");
        let x = program.continuous("x").unwrap();
        let c = Constraint::new("c", Expression::from(&x), ConstraintOp::Le, 1.0);

        assert!(!c.is_satisfied(&Point::new()));
        assert!(c.check(&Point::new()).is_err());
    }

    #[test]
    fn test_constant_moves_to_rhs() {
        let mut program = Program::new("rhs");
        let x = program.continuous("x").unwrap();
        let c = Constraint::new("c", &x + 4.0, ConstraintOp::Le, 10.0);

        assert_eq!(c.normalized_rhs(), 6.0);
        assert!(c.is_satisfied(&Point::new().with(&x, 6.0)));
        assert!(!c.is_satisfied(&Point::new().with(&x, 6.5)));
    }

    #[test]
    fn test_violation_report() {
        let mut program = Program::new("violation");
        let x = program.continuous("x").unwrap();
        let c = Constraint::new("demand", Expression::from(&x), ConstraintOp::Ge, 5.0);

        let violation = c.violation(&Point::new().with(&x, 1.0)).unwrap().unwrap();
        assert_eq!(violation.constraint, "demand");
        assert_eq!(violation.violation_amount, 4.0);
        assert_eq!(violation.description, "demand is below minimum of 5.00 by 4.00");

        assert!(c.violation(&Point::new().with(&x, 5.0)).unwrap().is_none());
    }

    #[test]
    fn test_slack() {
        let mut program = Program::new("slack");
        let x = program.continuous("x").unwrap();
        let le = Constraint::new("le", Expression::from(&x), ConstraintOp::Le, 4.0);
        let eq = Constraint::new("eq", Expression::from(&x), ConstraintOp::Eq, 4.0);
        let point = Point::new().with(&x, 3.0);

        assert_eq!(le.slack(&point).unwrap(), 1.0);
        assert_eq!(eq.slack(&point).unwrap(), -1.0);
    }
}
