use std::fmt;

use crate::variable::{Point, Variable};

/// The result of solving a program
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Solution status
    pub status: SolveStatus,
    /// Optimal value of each variable, present only when optimal
    pub values: Option<Point>,
    /// Optimal objective value, present only when optimal
    pub objective_value: Option<f64>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    /// An optimal solution was found
    Optimal,
    /// The problem is infeasible (no solution exists)
    Infeasible,
    /// The problem is unbounded
    Unbounded,
    /// The backend stopped without a verdict
    NotSolved,
    /// The time limit passed before the backend reached a verdict
    Timeout,
}

impl SolveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::NotSolved => "not_solved",
            SolveStatus::Timeout => "timeout",
        }
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Solution {
    pub fn optimal(values: Point, objective_value: f64) -> Self {
        Self {
            status: SolveStatus::Optimal,
            values: Some(values),
            objective_value: Some(objective_value),
        }
    }

    pub fn infeasible() -> Self {
        Self::without_values(SolveStatus::Infeasible)
    }

    pub fn unbounded() -> Self {
        Self::without_values(SolveStatus::Unbounded)
    }

    pub fn timeout() -> Self {
        Self::without_values(SolveStatus::Timeout)
    }

    pub fn not_solved() -> Self {
        Self::without_values(SolveStatus::NotSolved)
    }

    fn without_values(status: SolveStatus) -> Self {
        Self {
            status,
            values: None,
            objective_value: None,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }

    /// Optimal value of `variable`.
    pub fn value(&self, variable: &Variable) -> Option<f64> {
        self.values.as_ref().and_then(|values| values.get(variable))
    }

    /// Optimal value of the variable called `name`.
    pub fn value_of(&self, name: &str) -> Option<f64> {
        self.values.as_ref().and_then(|values| values.get_named(name))
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status: {}", self.status.as_str().to_uppercase())?;
        if let Some(objective) = self.objective_value {
            writeln!(f, "Objective: {:.4}", objective)?;
        }
        if let Some(values) = &self.values {
            for (variable, value) in values.iter() {
                writeln!(f, "  {:20} {:12.4}", variable.name(), value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Program;

    #[test]
    fn test_non_optimal_solutions_are_empty() {
        for solution in [
            Solution::infeasible(),
            Solution::unbounded(),
            Solution::timeout(),
            Solution::not_solved(),
        ] {
            assert!(!solution.is_optimal());
            assert!(solution.values.is_none());
            assert!(solution.objective_value.is_none());
        }
    }

    #[test]
    fn test_value_lookup() {
        let mut program = Program::new("lookup");
        let x = program.continuous("x").unwrap();
        let solution = Solution::optimal(Point::new().with(&x, 2.5), 5.0);

        assert_eq!(solution.value(&x), Some(2.5));
        assert_eq!(solution.value_of("x"), Some(2.5));
        assert_eq!(solution.value_of("y"), None);
    }

    #[test]
    fn test_display() {
        let mut program = Program::new("display");
        let x = program.continuous("x").unwrap();
        let text = Solution::optimal(Point::new().with(&x, 2.0), 4.0).to_string();

        assert!(text.starts_with("Status: OPTIMAL\nObjective: 4.0000\n"));
        assert!(text.contains("x"));
        assert_eq!(Solution::infeasible().to_string(), "Status: INFEASIBLE\n");
    }
}
