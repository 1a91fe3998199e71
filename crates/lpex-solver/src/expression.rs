use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use crate::error::ModelError;
use crate::variable::{Point, Variable};

/// A linear combination of variables plus a constant term.
///
/// Expressions are values: every operation returns a new expression and
/// leaves its inputs untouched. Coefficients that are exactly zero are not
/// stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expression {
    coefficients: BTreeMap<Variable, f64>,
    constant: f64,
}

impl Expression {
    /// The zero expression.
    pub fn zero() -> Self {
        Self::default()
    }

    /// An expression with no variable terms.
    pub fn constant(value: f64) -> Self {
        Self {
            coefficients: BTreeMap::new(),
            constant: value,
        }
    }

    /// `coefficient * variable`
    pub fn term(variable: &Variable, coefficient: f64) -> Self {
        let mut coefficients = BTreeMap::new();
        if coefficient != 0.0 {
            coefficients.insert(variable.clone(), coefficient);
        }
        Self {
            coefficients,
            constant: 0.0,
        }
    }

    /// Sum of `coefficient * variable` over `terms`, plus `constant`.
    pub fn linear<'a>(terms: impl IntoIterator<Item = (&'a Variable, f64)>, constant: f64) -> Self {
        let mut expression = Self::constant(constant);
        for (variable, coefficient) in terms {
            expression.accumulate(variable, coefficient);
        }
        expression
    }

    pub fn constant_term(&self) -> f64 {
        self.constant
    }

    /// Coefficient of `variable`, zero when absent.
    pub fn coefficient(&self, variable: &Variable) -> f64 {
        self.coefficients.get(variable).copied().unwrap_or(0.0)
    }

    /// Non-zero terms in declaration order.
    pub fn terms(&self) -> impl Iterator<Item = (&Variable, f64)> {
        self.coefficients.iter().map(|(v, &c)| (v, c))
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.coefficients.keys()
    }

    pub fn num_terms(&self) -> usize {
        self.coefficients.len()
    }

    /// True when the expression has no variable terms.
    pub fn is_constant(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// `self + other`
    pub fn add(&self, other: &Expression) -> Expression {
        let mut sum = self.clone();
        for (variable, coefficient) in other.terms() {
            sum.accumulate(variable, coefficient);
        }
        sum.constant += other.constant;
        sum
    }

    /// `self - other`
    pub fn sub(&self, other: &Expression) -> Expression {
        self.add(&other.scale(-1.0))
    }

    /// `factor * self`
    pub fn scale(&self, factor: f64) -> Expression {
        if factor == 0.0 {
            return Self::zero();
        }
        Self {
            coefficients: self
                .coefficients
                .iter()
                .map(|(v, &c)| (v.clone(), c * factor))
                .collect(),
            constant: self.constant * factor,
        }
    }

    /// Value of the expression at `point`.
    ///
    /// Every variable with a non-zero coefficient must have a value in the
    /// point; extra entries in the point are ignored.
    pub fn evaluate(&self, point: &Point) -> Result<f64, ModelError> {
        let mut total = self.constant;
        for (variable, coefficient) in self.terms() {
            let value = point.get(variable).ok_or_else(|| ModelError::UnboundVariable {
                name: variable.name().to_string(),
            })?;
            total += coefficient * value;
        }
        Ok(total)
    }

    /// True if every coefficient and the constant are finite.
    pub fn is_finite(&self) -> bool {
        self.constant.is_finite() && self.coefficients.values().all(|c| c.is_finite())
    }

    fn accumulate(&mut self, variable: &Variable, coefficient: f64) {
        if coefficient == 0.0 {
            return;
        }
        let entry = self.coefficients.entry(variable.clone()).or_insert(0.0);
        *entry += coefficient;
        if *entry == 0.0 {
            self.coefficients.remove(variable);
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (variable, coefficient) in self.terms() {
            let magnitude = coefficient.abs();
            if first {
                if coefficient < 0.0 {
                    f.write_str("-")?;
                }
            } else if coefficient < 0.0 {
                f.write_str(" - ")?;
            } else {
                f.write_str(" + ")?;
            }
            if magnitude != 1.0 {
                write!(f, "{}*", magnitude)?;
            }
            write!(f, "{}", variable)?;
            first = false;
        }
        if first {
            write!(f, "{}", self.constant)
        } else if self.constant > 0.0 {
            write!(f, " + {}", self.constant)
        } else if self.constant < 0.0 {
            write!(f, " - {}", -self.constant)
        } else {
            Ok(())
        }
    }
}

impl From<&Variable> for Expression {
    fn from(variable: &Variable) -> Self {
        Expression::term(variable, 1.0)
    }
}

impl From<Variable> for Expression {
    fn from(variable: Variable) -> Self {
        Expression::term(&variable, 1.0)
    }
}

impl From<&Expression> for Expression {
    fn from(expression: &Expression) -> Self {
        expression.clone()
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Expression::constant(value)
    }
}

impl<T: Into<Expression>> Add<T> for Expression {
    type Output = Expression;

    fn add(self, rhs: T) -> Expression {
        Expression::add(&self, &rhs.into())
    }
}

impl<T: Into<Expression>> Sub<T> for Expression {
    type Output = Expression;

    fn sub(self, rhs: T) -> Expression {
        Expression::sub(&self, &rhs.into())
    }
}

impl Add<&Expression> for &Expression {
    type Output = Expression;

    fn add(self, rhs: &Expression) -> Expression {
        Expression::add(self, rhs)
    }
}

impl Sub<&Expression> for &Expression {
    type Output = Expression;

    fn sub(self, rhs: &Expression) -> Expression {
        Expression::sub(self, rhs)
    }
}

impl Mul<f64> for Expression {
    type Output = Expression;

    fn mul(self, rhs: f64) -> Expression {
        self.scale(rhs)
    }
}

impl Mul<Expression> for f64 {
    type Output = Expression;

    fn mul(self, rhs: Expression) -> Expression {
        rhs.scale(self)
    }
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        self.scale(-1.0)
    }
}

impl Mul<f64> for &Variable {
    type Output = Expression;

    fn mul(self, rhs: f64) -> Expression {
        Expression::term(self, rhs)
    }
}

impl Mul<&Variable> for f64 {
    type Output = Expression;

    fn mul(self, rhs: &Variable) -> Expression {
        Expression::term(rhs, self)
    }
}

impl<T: Into<Expression>> Add<T> for &Variable {
    type Output = Expression;

    fn add(self, rhs: T) -> Expression {
        Expression::from(self) + rhs
    }
}

impl<T: Into<Expression>> Sub<T> for &Variable {
    type Output = Expression;

    fn sub(self, rhs: T) -> Expression {
        Expression::from(self) - rhs
    }
}
