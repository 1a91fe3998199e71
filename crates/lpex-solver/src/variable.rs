use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Whether a decision variable may take fractional values.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VarKind {
    #[default]
    Continuous,
    Integer,
}

/// Inclusive bounds of a decision variable.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Default for Bounds {
    /// Non-negative and unbounded above.
    fn default() -> Self {
        Self {
            lower: 0.0,
            upper: f64::INFINITY,
        }
    }
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// `0 <= x <= upper`
    pub fn at_most(upper: f64) -> Self {
        Self { lower: 0.0, upper }
    }

    /// No bound in either direction.
    pub fn free() -> Self {
        Self {
            lower: f64::NEG_INFINITY,
            upper: f64::INFINITY,
        }
    }

    pub fn contains(&self, value: f64, tolerance: f64) -> bool {
        value >= self.lower - tolerance && value <= self.upper + tolerance
    }

    pub(crate) fn is_valid(&self) -> bool {
        !self.lower.is_nan() && !self.upper.is_nan() && self.lower <= self.upper
    }
}

struct VariableData {
    program: u64,
    index: usize,
    name: String,
    bounds: Bounds,
    kind: VarKind,
}

/// Handle to a decision variable declared in a [`Program`](crate::Program).
///
/// Handles are cheap to clone. Two handles are equal only when they come from
/// the same program and the same declaration, so a variable of one program
/// never stands in for a same-named variable of another.
#[derive(Clone)]
pub struct Variable {
    inner: Arc<VariableData>,
}

impl Variable {
    pub(crate) fn new(program: u64, index: usize, name: String, bounds: Bounds, kind: VarKind) -> Self {
        Self {
            inner: Arc::new(VariableData {
                program,
                index,
                name,
                bounds,
                kind,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn bounds(&self) -> Bounds {
        self.inner.bounds
    }

    pub fn lower(&self) -> f64 {
        self.inner.bounds.lower
    }

    pub fn upper(&self) -> f64 {
        self.inner.bounds.upper
    }

    pub fn kind(&self) -> VarKind {
        self.inner.kind
    }

    pub fn is_integer(&self) -> bool {
        self.inner.kind == VarKind::Integer
    }

    /// Declaration position inside the owning program.
    pub fn index(&self) -> usize {
        self.inner.index
    }

    pub(crate) fn program_id(&self) -> u64 {
        self.inner.program
    }

    /// Same handle allocation, not merely the same `(program, index)` key.
    pub(crate) fn same_declaration(&self, other: &Variable) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn key(&self) -> (u64, usize) {
        (self.inner.program, self.inner.index)
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Variable {}

impl PartialOrd for Variable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Variable {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("name", &self.inner.name)
            .field("bounds", &self.inner.bounds)
            .field("kind", &self.inner.kind)
            .finish()
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.name)
    }
}

/// An assignment of numeric values to variables.
///
/// Used both as the input of expression evaluation and as the value map of
/// an optimal [`Solution`](crate::Solution). Iteration follows declaration
/// order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Point {
    values: BTreeMap<Variable, f64>,
}

impl Point {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value of a variable, returning the previous one.
    pub fn insert(&mut self, variable: &Variable, value: f64) -> Option<f64> {
        self.values.insert(variable.clone(), value)
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, variable: &Variable, value: f64) -> Self {
        self.insert(variable, value);
        self
    }

    pub fn get(&self, variable: &Variable) -> Option<f64> {
        self.values.get(variable).copied()
    }

    /// Look a value up by variable name.
    pub fn get_named(&self, name: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(v, _)| v.name() == name)
            .map(|(_, &value)| value)
    }

    pub fn contains(&self, variable: &Variable) -> bool {
        self.values.contains_key(variable)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, f64)> {
        self.values.iter().map(|(v, &value)| (v, value))
    }

    /// Values of `other` override values already present.
    pub fn merge(&mut self, other: &Point) {
        for (v, value) in other.iter() {
            self.values.insert(v.clone(), value);
        }
    }
}

impl FromIterator<(Variable, f64)> for Point {
    fn from_iter<I: IntoIterator<Item = (Variable, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl Extend<(Variable, f64)> for Point {
    fn extend<I: IntoIterator<Item = (Variable, f64)>>(&mut self, iter: I) {
        self.values.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Point {
    type Item = (&'a Variable, &'a f64);
    type IntoIter = btree_map::Iter<'a, Variable, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Point {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (variable, value) in &self.values {
            map.serialize_entry(variable.name(), value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_ignores_name() {
        let a = Variable::new(1, 0, "x".to_string(), Bounds::default(), VarKind::Continuous);
        let b = Variable::new(2, 0, "x".to_string(), Bounds::default(), VarKind::Continuous);
        let a2 = a.clone();

        assert_eq!(a, a2);
        assert_ne!(a, b);
    }

    #[test]
    fn test_point_iterates_in_declaration_order() {
        let x = Variable::new(7, 0, "x".to_string(), Bounds::default(), VarKind::Continuous);
        let y = Variable::new(7, 1, "y".to_string(), Bounds::default(), VarKind::Integer);

        let point = Point::new().with(&y, 2.0).with(&x, 1.0);
        let names: Vec<&str> = point.iter().map(|(v, _)| v.name()).collect();

        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(point.get_named("y"), Some(2.0));
        assert_eq!(point.get_named("z"), None);
    }

    #[test]
    fn test_bounds_validity() {
        assert!(Bounds::default().is_valid());
        assert!(Bounds::free().is_valid());
        assert!(!Bounds::new(3.0, 1.0).is_valid());
        assert!(!Bounds::new(f64::NAN, 1.0).is_valid());
        assert!(Bounds::at_most(4.0).contains(4.0000001, 1e-6));
        assert!(!Bounds::at_most(4.0).contains(-0.1, 1e-6));
    }
}
