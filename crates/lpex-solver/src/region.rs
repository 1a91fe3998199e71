//! Closed-form geometry of two-variable slices, for drawing boundary lines
//! and shading polygons.

use crate::constraint::{Constraint, FEASIBILITY_TOLERANCE};
use crate::error::SampleError;
use crate::program::Program;
use crate::sample::ensure_declared;
use crate::variable::{Point, Variable};

const PARALLEL_EPSILON: f64 = 1e-12;
const MERGE_EPSILON: f64 = 1e-7;

/// The line `a*x + b*y = c` in the plane of two variables.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryLine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl BoundaryLine {
    /// `y` on the line at `x`; `None` for vertical lines.
    pub fn y_at(&self, x: f64) -> Option<f64> {
        (self.b != 0.0).then(|| (self.c - self.a * x) / self.b)
    }

    /// `x` on the line at `y`; `None` for horizontal lines.
    pub fn x_at(&self, y: f64) -> Option<f64> {
        (self.a != 0.0).then(|| (self.c - self.b * y) / self.a)
    }

    /// Neither variable appears, so there is no line to draw.
    pub fn is_degenerate(&self) -> bool {
        self.a == 0.0 && self.b == 0.0
    }

    fn intersect(&self, other: &BoundaryLine) -> Option<(f64, f64)> {
        let det = self.a * other.b - other.a * self.b;
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }
        let x = (self.c * other.b - other.c * self.b) / det;
        let y = (self.a * other.c - other.a * self.c) / det;
        Some((x, y))
    }
}

/// Line traced by `constraint` in the `(x, y)` plane, other variables held
/// at their values in `fixed` (default 0).
pub fn boundary_line(constraint: &Constraint, x: &Variable, y: &Variable, fixed: &Point) -> Result<BoundaryLine, SampleError> {
    if x == y {
        return Err(SampleError::DuplicateAxis(x.name().to_string()));
    }
    let mut c = constraint.normalized_rhs();
    for (v, coefficient) in constraint.lhs().terms() {
        if v != x && v != y {
            c -= coefficient * fixed.get(v).unwrap_or(0.0);
        }
    }
    Ok(BoundaryLine {
        a: constraint.lhs().coefficient(x),
        b: constraint.lhs().coefficient(y),
        c,
    })
}

/// Vertices of the feasible polygon in the `(x, y)` plane, counter-clockwise.
///
/// Candidates are the pairwise intersections of every constraint boundary
/// and every finite bound of `x` and `y`; the ones satisfying all
/// constraints and both variables' bounds are kept. An unbounded region
/// yields only its finite corners.
pub fn feasible_vertices(program: &Program, x: &Variable, y: &Variable, fixed: &Point) -> Result<Vec<(f64, f64)>, SampleError> {
    ensure_declared(program, x)?;
    ensure_declared(program, y)?;
    for (v, _) in fixed.iter() {
        ensure_declared(program, v)?;
    }

    let mut lines = Vec::new();
    for constraint in program.constraints() {
        let line = boundary_line(constraint, x, y, fixed)?;
        if !line.is_degenerate() {
            lines.push(line);
        }
    }
    for bound in [x.lower(), x.upper()] {
        if bound.is_finite() {
            lines.push(BoundaryLine { a: 1.0, b: 0.0, c: bound });
        }
    }
    for bound in [y.lower(), y.upper()] {
        if bound.is_finite() {
            lines.push(BoundaryLine { a: 0.0, b: 1.0, c: bound });
        }
    }

    let mut point: Point = program.variables().iter().map(|v| (v.clone(), 0.0)).collect();
    point.merge(fixed);

    let mut vertices: Vec<(f64, f64)> = Vec::new();
    for (i, first) in lines.iter().enumerate() {
        for second in &lines[i + 1..] {
            let Some((vx, vy)) = first.intersect(second) else {
                continue;
            };
            if vertices
                .iter()
                .any(|&(ux, uy)| (ux - vx).abs() < MERGE_EPSILON && (uy - vy).abs() < MERGE_EPSILON)
            {
                continue;
            }
            point.insert(x, vx);
            point.insert(y, vy);
            let in_bounds = x.bounds().contains(vx, FEASIBILITY_TOLERANCE) && y.bounds().contains(vy, FEASIBILITY_TOLERANCE);
            if in_bounds && program.constraints().iter().all(|c| c.is_satisfied(&point)) {
                vertices.push((vx, vy));
            }
        }
    }

    sort_counter_clockwise(&mut vertices);
    Ok(vertices)
}

fn sort_counter_clockwise(vertices: &mut [(f64, f64)]) {
    if vertices.is_empty() {
        return;
    }
    let n = vertices.len() as f64;
    let cx = vertices.iter().map(|v| v.0).sum::<f64>() / n;
    let cy = vertices.iter().map(|v| v.1).sum::<f64>() / n;
    vertices.sort_by(|p, q| {
        let angle_p = (p.1 - cy).atan2(p.0 - cx);
        let angle_q = (q.1 - cy).atan2(q.0 - cx);
        angle_p.total_cmp(&angle_q)
    });
}
