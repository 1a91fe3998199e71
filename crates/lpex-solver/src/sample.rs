//! Grid sampling of a program's feasible region for plotting.
//!
//! The grid only approximates the region for display. It never takes part
//! in finding the optimum, so the resolution changes the picture and nothing
//! else.

use crate::constraint::FEASIBILITY_TOLERANCE;
use crate::error::{ModelError, SampleError};
use crate::program::Program;
use crate::variable::{Point, Variable};

/// Largest number of grid points a single request may produce.
pub const MAX_GRID_POINTS: usize = 1 << 24;

#[derive(Debug, Clone)]
struct AxisSpec {
    variable: Variable,
    min: f64,
    max: f64,
}

/// Which variables to sweep, over which ranges, and at what resolution.
#[derive(Debug, Clone)]
pub struct SampleSpec {
    axes: Vec<AxisSpec>,
    resolution: usize,
    fixed: Point,
    respect_bounds: bool,
    respect_integrality: bool,
}

impl SampleSpec {
    /// `resolution` evenly spaced points per axis, ends included.
    pub fn new(resolution: usize) -> Self {
        Self {
            axes: Vec::new(),
            resolution,
            fixed: Point::new(),
            respect_bounds: false,
            respect_integrality: false,
        }
    }

    /// Sweep `variable` over `[min, max]`. Axes keep the order they are added in.
    pub fn axis(mut self, variable: &Variable, min: f64, max: f64) -> Self {
        self.axes.push(AxisSpec {
            variable: variable.clone(),
            min,
            max,
        });
        self
    }

    /// Hold a variable that is not an axis at `value` (default 0).
    pub fn fix(mut self, variable: &Variable, value: f64) -> Self {
        self.fixed.insert(variable, value);
        self
    }

    /// Also treat points outside variable bounds as infeasible.
    pub fn respect_bounds(mut self, enabled: bool) -> Self {
        self.respect_bounds = enabled;
        self
    }

    /// Treat non-integral coordinates of integer variables as infeasible.
    pub fn respect_integrality(mut self, enabled: bool) -> Self {
        self.respect_integrality = enabled;
        self
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }
}

/// Sampled coordinates along one axis.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct GridAxis {
    pub name: String,
    pub values: Vec<f64>,
}

/// Feasibility of every grid point, row-major with the first axis slowest.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct FeasibilityGrid {
    axes: Vec<GridAxis>,
    cells: Vec<bool>,
    /// Integer variables sampled as if continuous.
    relaxed_integer_axes: Vec<String>,
}

impl FeasibilityGrid {
    pub fn axes(&self) -> &[GridAxis] {
        &self.axes
    }

    pub fn shape(&self) -> Vec<usize> {
        self.axes.iter().map(|a| a.values.len()).collect()
    }

    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn relaxed_integer_axes(&self) -> &[String] {
        &self.relaxed_integer_axes
    }

    /// Flat index of a grid position, `None` if out of range.
    pub fn flat_index(&self, position: &[usize]) -> Option<usize> {
        if position.len() != self.axes.len() {
            return None;
        }
        let mut flat = 0;
        for (axis, &i) in self.axes.iter().zip(position) {
            if i >= axis.values.len() {
                return None;
            }
            flat = flat * axis.values.len() + i;
        }
        Some(flat)
    }

    pub fn get(&self, position: &[usize]) -> Option<bool> {
        self.flat_index(position).map(|i| self.cells[i])
    }

    /// Coordinates of the cell at `flat`.
    pub fn coordinates(&self, flat: usize) -> Option<Vec<f64>> {
        if flat >= self.cells.len() {
            return None;
        }
        let mut rest = flat;
        let mut coordinates = vec![0.0; self.axes.len()];
        for (k, axis) in self.axes.iter().enumerate().rev() {
            let n = axis.values.len();
            coordinates[k] = axis.values[rest % n];
            rest /= n;
        }
        Some(coordinates)
    }

    /// Coordinates of every feasible cell, in grid order.
    pub fn feasible_points(&self) -> impl Iterator<Item = Vec<f64>> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, feasible)| **feasible)
            .filter_map(|(i, _)| self.coordinates(i))
    }

    pub fn feasible_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}

/// Evaluate every constraint of `program` on an evenly spaced grid.
///
/// Variables that are not axes take their value from
/// [`SampleSpec::fix`], or 0.
pub fn sample_feasible_region(program: &Program, spec: &SampleSpec) -> Result<FeasibilityGrid, SampleError> {
    if !(2..=3).contains(&spec.axes.len()) {
        return Err(SampleError::AxisCount(spec.axes.len()));
    }
    if spec.resolution == 0 {
        return Err(SampleError::ZeroResolution);
    }
    for (k, axis) in spec.axes.iter().enumerate() {
        ensure_declared(program, &axis.variable)?;
        if spec.axes[..k].iter().any(|a| a.variable == axis.variable) {
            return Err(SampleError::DuplicateAxis(axis.variable.name().to_string()));
        }
        if !axis.min.is_finite() || !axis.max.is_finite() || axis.min > axis.max {
            return Err(SampleError::InvalidRange {
                name: axis.variable.name().to_string(),
                min: axis.min,
                max: axis.max,
            });
        }
    }
    for (variable, _) in spec.fixed.iter() {
        ensure_declared(program, variable)?;
    }
    let total = match spec.resolution.checked_pow(spec.axes.len() as u32) {
        Some(total) if total <= MAX_GRID_POINTS => total,
        _ => {
            return Err(SampleError::GridTooLarge {
                resolution: spec.resolution,
                axes: spec.axes.len(),
            });
        }
    };

    let axes: Vec<GridAxis> = spec
        .axes
        .iter()
        .map(|a| GridAxis {
            name: a.variable.name().to_string(),
            values: linspace(a.min, a.max, spec.resolution),
        })
        .collect();
    let relaxed_integer_axes = if spec.respect_integrality {
        Vec::new()
    } else {
        spec.axes
            .iter()
            .filter(|a| a.variable.is_integer())
            .map(|a| a.variable.name().to_string())
            .collect()
    };

    let mut point: Point = program.variables().iter().map(|v| (v.clone(), 0.0)).collect();
    point.merge(&spec.fixed);

    let mut cells = Vec::with_capacity(total);
    for flat in 0..total {
        let mut rest = flat;
        for k in (0..spec.axes.len()).rev() {
            let value = axes[k].values[rest % spec.resolution];
            rest /= spec.resolution;
            point.insert(&spec.axes[k].variable, value);
        }
        cells.push(is_cell_feasible(program, spec, &point));
    }

    Ok(FeasibilityGrid {
        axes,
        cells,
        relaxed_integer_axes,
    })
}

fn is_cell_feasible(program: &Program, spec: &SampleSpec, point: &Point) -> bool {
    if spec.respect_integrality
        && spec.axes.iter().any(|a| {
            let value = point.get(&a.variable).unwrap_or(0.0);
            a.variable.is_integer() && (value - value.round()).abs() > FEASIBILITY_TOLERANCE
        })
    {
        return false;
    }
    if spec.respect_bounds
        && program
            .variables()
            .iter()
            .any(|v| !v.bounds().contains(point.get(v).unwrap_or(0.0), FEASIBILITY_TOLERANCE))
    {
        return false;
    }
    program.constraints().iter().all(|c| c.is_satisfied(point))
}

pub(crate) fn ensure_declared(program: &Program, variable: &Variable) -> Result<(), ModelError> {
    if program.owns(variable) {
        Ok(())
    } else {
        Err(ModelError::UnknownVariable {
            name: variable.name().to_string(),
        })
    }
}

fn linspace(min: f64, max: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![min];
    }
    let step = (max - min) / (n - 1) as f64;
    (0..n)
        .map(|i| if i == n - 1 { max } else { min + step * i as f64 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bounds, VarKind};

    fn pans() -> (Program, Variable, Variable) {
        let mut program = Program::new("pans");
        let x = program.continuous("x").unwrap();
        let y = program.continuous("y").unwrap();
        program.le("hours", &x + &y, 6.0).unwrap();
        program.le("x_demand", &x, 4.0).unwrap();
        program.le("y_demand", &y, 4.0).unwrap();
        (program, x, y)
    }

    #[test]
    fn test_linspace_includes_ends() {
        assert_eq!(linspace(0.0, 6.0, 7), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
    }

    #[test]
    fn test_grid_marks_cells() {
        let (program, x, y) = pans();
        let spec = SampleSpec::new(7).axis(&x, 0.0, 6.0).axis(&y, 0.0, 6.0);

        let grid = sample_feasible_region(&program, &spec).unwrap();

        assert_eq!(grid.shape(), vec![7, 7]);
        assert_eq!(grid.get(&[5, 5]), Some(false));
        assert_eq!(grid.get(&[2, 2]), Some(true));
        assert_eq!(grid.get(&[2, 4]), Some(true));
        assert_eq!(grid.get(&[3, 4]), Some(false));
        assert_eq!(grid.get(&[7, 0]), None);
    }

    #[test]
    fn test_row_major_layout() {
        let (program, x, y) = pans();
        let spec = SampleSpec::new(3).axis(&x, 0.0, 2.0).axis(&y, 10.0, 12.0);

        let grid = sample_feasible_region(&program, &spec).unwrap();

        assert_eq!(grid.coordinates(0), Some(vec![0.0, 10.0]));
        assert_eq!(grid.coordinates(1), Some(vec![0.0, 11.0]));
        assert_eq!(grid.coordinates(3), Some(vec![1.0, 10.0]));
        assert_eq!(grid.flat_index(&[1, 2]), Some(5));
        assert_eq!(grid.coordinates(9), None);
    }

    #[test]
    fn test_three_axes_with_fixed_value() {
        let mut program = Program::new("fuel");
        let a = program.continuous("a").unwrap();
        let b = program.continuous("b").unwrap();
        let c = program.continuous("c").unwrap();
        let d = program.continuous("d").unwrap();
        program.le("mineral", 8.0 * &a + 5.0 * &b + 4.0 * &c + &d, 120.0).unwrap();

        let spec = SampleSpec::new(4).axis(&a, 0.0, 15.0).axis(&b, 0.0, 24.0).axis(&c, 0.0, 30.0);
        let free = sample_feasible_region(&program, &spec).unwrap();
        let crowded = sample_feasible_region(&program, &spec.clone().fix(&d, 100.0)).unwrap();

        assert_eq!(free.len(), 64);
        assert!(crowded.feasible_count() < free.feasible_count());
        for point in free.feasible_points() {
            assert!(8.0 * point[0] + 5.0 * point[1] + 4.0 * point[2] <= 120.0 + 1e-9);
        }
    }

    #[test]
    fn test_axis_validation() {
        let (program, x, y) = pans();

        let err = sample_feasible_region(&program, &SampleSpec::new(5).axis(&x, 0.0, 1.0)).unwrap_err();
        assert_eq!(err, SampleError::AxisCount(1));

        let spec = SampleSpec::new(5).axis(&x, 0.0, 1.0).axis(&x, 0.0, 1.0);
        let err = sample_feasible_region(&program, &spec).unwrap_err();
        assert_eq!(err, SampleError::DuplicateAxis("x".to_string()));

        let spec = SampleSpec::new(5).axis(&x, 2.0, 1.0).axis(&y, 0.0, 1.0);
        assert!(matches!(
            sample_feasible_region(&program, &spec),
            Err(SampleError::InvalidRange { .. })
        ));

        let spec = SampleSpec::new(0).axis(&x, 0.0, 1.0).axis(&y, 0.0, 1.0);
        assert_eq!(sample_feasible_region(&program, &spec).unwrap_err(), SampleError::ZeroResolution);
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let mut program = Program::new("huge");
        let a = program.continuous("a").unwrap();
        let b = program.continuous("b").unwrap();
        let c = program.continuous("c").unwrap();

        // 2^66 points overflow usize
        let spec = SampleSpec::new(1 << 22).axis(&a, 0.0, 1.0).axis(&b, 0.0, 1.0).axis(&c, 0.0, 1.0);
        assert_eq!(
            sample_feasible_region(&program, &spec).unwrap_err(),
            SampleError::GridTooLarge {
                resolution: 1 << 22,
                axes: 3
            }
        );

        // fits in usize but not under the cap
        let spec = SampleSpec::new(4097).axis(&a, 0.0, 1.0).axis(&b, 0.0, 1.0);
        assert!(matches!(
            sample_feasible_region(&program, &spec),
            Err(SampleError::GridTooLarge { axes: 2, .. })
        ));
    }

    #[test]
    fn test_foreign_axis() {
        let (program, x, _) = pans();
        let (_, _, other_y) = pans();

        let spec = SampleSpec::new(3).axis(&x, 0.0, 1.0).axis(&other_y, 0.0, 1.0);
        let err = sample_feasible_region(&program, &spec).unwrap_err();
        assert_eq!(err, SampleError::Model(ModelError::UnknownVariable { name: "y".to_string() }));
    }

    #[test]
    fn test_integer_axes_are_flagged_or_enforced() {
        let mut program = Program::new("buses");
        let g = program.integer("g").unwrap();
        let p = program.integer("p").unwrap();
        program.ge("capacity", 60.0 * &g + 40.0 * &p, 600.0).unwrap();

        let spec = SampleSpec::new(17).axis(&g, 0.0, 8.0).axis(&p, 0.0, 16.0);
        let relaxed = sample_feasible_region(&program, &spec).unwrap();
        assert_eq!(relaxed.relaxed_integer_axes(), &["g".to_string(), "p".to_string()]);
        // g = 7.5 is feasible only in the relaxation
        assert_eq!(relaxed.get(&[15, 9]), Some(true));

        let strict = sample_feasible_region(&program, &spec.respect_integrality(true)).unwrap();
        assert!(strict.relaxed_integer_axes().is_empty());
        assert_eq!(strict.get(&[15, 9]), Some(false));
        assert_eq!(strict.get(&[16, 6]), Some(true));
    }

    #[test]
    fn test_respect_bounds() {
        let mut program = Program::new("bounded");
        let x = program.add_variable("x", Bounds::at_most(4.0), VarKind::Continuous).unwrap();
        let y = program.add_variable("y", Bounds::at_most(4.0), VarKind::Continuous).unwrap();
        program.le("hours", &x + &y, 6.0).unwrap();

        let spec = SampleSpec::new(7).axis(&x, 0.0, 6.0).axis(&y, 0.0, 6.0);
        assert_eq!(sample_feasible_region(&program, &spec).unwrap().get(&[5, 0]), Some(true));

        let bounded = sample_feasible_region(&program, &spec.respect_bounds(true)).unwrap();
        assert_eq!(bounded.get(&[5, 0]), Some(false));
        assert_eq!(bounded.get(&[2, 4]), Some(true));
    }
}
