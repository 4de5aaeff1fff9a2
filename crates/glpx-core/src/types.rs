use std::collections::{BTreeMap, HashMap};

use glpx_solver::{BoundKind, VariableKind};
use serde::Serialize;

use crate::ids::Variable;

/// Lower and upper bound of a row or column; `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Bounds {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl Bounds {
    /// Infinite values are stored as absent bounds.
    pub fn new(lower: Option<f64>, upper: Option<f64>) -> Self {
        Self {
            lower: lower.filter(|lb| !lb.is_infinite()),
            upper: upper.filter(|ub| !ub.is_infinite()),
        }
    }

    pub fn free() -> Self {
        Self::default()
    }

    /// Fixed at `value`.
    pub fn fixed(value: f64) -> Self {
        Self::new(Some(value), Some(value))
    }

    pub fn kind(&self) -> BoundKind {
        BoundKind::classify(self.lower, self.upper)
    }

    /// Reads an engine bound triple, keeping only the bounds the type carries.
    pub(crate) fn from_engine(kind: i32, lower: f64, upper: f64) -> Self {
        match BoundKind::from_code(kind) {
            Some(kind) => Self::new(
                Some(lower).filter(|_| kind.has_lower()),
                Some(upper).filter(|_| kind.has_upper()),
            ),
            None => Self::free(),
        }
    }

    pub(crate) fn first_nan(&self) -> Option<f64> {
        [self.lower, self.upper]
            .into_iter()
            .flatten()
            .find(|value| value.is_nan())
    }
}

/// Properties of a new column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableProperties {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    /// Objective coefficient; the engine default is 0.
    pub objective: Option<f64>,
    pub kind: Option<VariableKind>,
    pub name: Option<String>,
}

impl VariableProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lower(mut self, lower: f64) -> Self {
        self.lower = Some(lower);
        self
    }

    pub fn with_upper(mut self, upper: f64) -> Self {
        self.upper = Some(upper);
        self
    }

    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower = Some(lower);
        self.upper = Some(upper);
        self
    }

    pub fn with_objective(mut self, objective: f64) -> Self {
        self.objective = Some(objective);
        self
    }

    pub fn with_kind(mut self, kind: VariableKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.lower, self.upper)
    }
}

/// Properties of a new row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintProperties {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub coefficients: Coefficients,
    pub name: Option<String>,
}

impl ConstraintProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lower(mut self, lower: f64) -> Self {
        self.lower = Some(lower);
        self
    }

    pub fn with_upper(mut self, upper: f64) -> Self {
        self.upper = Some(upper);
        self
    }

    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower = Some(lower);
        self.upper = Some(upper);
        self
    }

    pub fn with_coefficients(mut self, coefficients: impl Into<Coefficients>) -> Self {
        self.coefficients = coefficients.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.lower, self.upper)
    }
}

/// A batch of coefficient deltas for one row.
///
/// A list may name the same variable more than once; its deltas add up.
#[derive(Debug, Clone, PartialEq)]
pub enum Coefficients {
    List(Vec<(Variable, f64)>),
    Map(BTreeMap<Variable, f64>),
}

impl Coefficients {
    pub fn len(&self) -> usize {
        match self {
            Coefficients::List(pairs) => pairs.len(),
            Coefficients::Map(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pairs in application order.
    pub fn pairs(&self) -> Vec<(Variable, f64)> {
        match self {
            Coefficients::List(pairs) => pairs.clone(),
            Coefficients::Map(map) => map.iter().map(|(&v, &c)| (v, c)).collect(),
        }
    }
}

impl Default for Coefficients {
    fn default() -> Self {
        Coefficients::List(Vec::new())
    }
}

impl From<Vec<(Variable, f64)>> for Coefficients {
    fn from(pairs: Vec<(Variable, f64)>) -> Self {
        Coefficients::List(pairs)
    }
}

impl From<&[(Variable, f64)]> for Coefficients {
    fn from(pairs: &[(Variable, f64)]) -> Self {
        Coefficients::List(pairs.to_vec())
    }
}

impl<const N: usize> From<[(Variable, f64); N]> for Coefficients {
    fn from(pairs: [(Variable, f64); N]) -> Self {
        Coefficients::List(pairs.to_vec())
    }
}

impl From<BTreeMap<Variable, f64>> for Coefficients {
    fn from(map: BTreeMap<Variable, f64>) -> Self {
        Coefficients::Map(map)
    }
}

impl From<HashMap<Variable, f64>> for Coefficients {
    fn from(map: HashMap<Variable, f64>) -> Self {
        Coefficients::Map(map.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::ids::ModelId;
    use glpx_abi::codes::*;

    #[test]
    fn test_bound_kind_classification() {
        assert_eq!(Bounds::free().kind(), BoundKind::Free);
        assert_eq!(Bounds::new(None, Some(4.0)).kind(), BoundKind::Upper);
        assert_eq!(Bounds::new(Some(1.0), None).kind(), BoundKind::Lower);
        assert_eq!(Bounds::fixed(2.0).kind(), BoundKind::Fixed);
        assert_eq!(Bounds::new(Some(0.0), Some(1.0)).kind(), BoundKind::Double);
        // Inverted pairs are left for the engine to report.
        assert_eq!(Bounds::new(Some(3.0), Some(1.0)).kind(), BoundKind::Double);
    }

    #[test]
    fn test_infinite_bounds_are_absent() {
        let bounds = Bounds::new(Some(f64::NEG_INFINITY), Some(f64::INFINITY));
        assert_eq!(bounds, Bounds::free());
    }

    #[test]
    fn test_from_engine_drops_unused_bounds() {
        let bounds = Bounds::from_engine(GLP_UP, -f64::MAX, 4.0);
        assert_eq!(bounds, Bounds::new(None, Some(4.0)));
        let bounds = Bounds::from_engine(GLP_FX, 2.0, 2.0);
        assert_eq!(bounds, Bounds::fixed(2.0));
        assert_eq!(Bounds::from_engine(GLP_FR, 0.0, 0.0), Bounds::free());
    }

    #[test]
    fn test_first_nan() {
        assert!(Bounds::new(Some(f64::NAN), None).first_nan().is_some());
        assert!(Bounds::new(Some(0.0), Some(1.0)).first_nan().is_none());
    }

    #[test]
    fn test_coefficient_sources() {
        let model = ModelId::next();
        let x = Variable::new(model, 1);
        let y = Variable::new(model, 2);
        let list = Coefficients::from(vec![(y, 1.0), (x, 2.0), (y, 3.0)]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.pairs()[0], (y, 1.0));

        let map: HashMap<Variable, f64> = [(y, 1.0), (x, 2.0)].into_iter().collect();
        let map = Coefficients::from(map);
        assert_eq!(map.pairs(), vec![(x, 2.0), (y, 1.0)]);
        assert!(Coefficients::default().is_empty());
    }
}
