//! Model module for building and solving linear and mixed-integer programs.
//!
//! This module provides the core [`Model`] type. Its methods are split by
//! concern:
//!
//! - [`error`]: Model error types
//! - [`builder`]: Creation of variables and constraints
//! - [`entity`]: Bounds, names, objective coefficients and kinds
//! - [`constraint`]: Coefficient accumulation and row synchronization
//! - [`solve`]: Solver entry points
//! - [`decode`]: Statuses, values, tableau rows and columns, unbounded ray
//! - [`pretty`]: Text reports
//! - [`io`]: LP and MPS serialization

mod builder;
mod constraint;
mod decode;
mod entity;
mod error;
mod io;
mod pretty;
mod solve;

use std::collections::BTreeMap;

use glpx_abi::{Engine, Problem};
use glpx_solver::Sense;

use crate::ids::{Constraint, Entity, ModelId, Variable};
use crate::types::Bounds;

pub use error::ModelError;
pub use pretty::{format_number, SolutionKind, SolutionView, ValueView};

#[derive(Debug, Clone)]
pub(crate) struct RowState {
    pub(crate) bounds: Bounds,
    /// Column index to coefficient; never holds an exact zero.
    pub(crate) coefficients: BTreeMap<u32, f64>,
    pub(crate) dirty: bool,
}

impl RowState {
    fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            coefficients: BTreeMap::new(),
            dirty: false,
        }
    }
}

/// A linear or mixed-integer program held by the engine.
///
/// The model exclusively owns its engine problem and deletes it on drop.
/// Variables are the problem's columns and constraints its rows, both
/// numbered from 1 in creation order. Row coefficients are kept locally and
/// sent to the engine in one call per dirty row before every solve or write.
pub struct Model {
    id: ModelId,
    pub(crate) problem: Problem,
    pub(crate) columns: Vec<Bounds>,
    pub(crate) rows: Vec<RowState>,
}

impl Model {
    /// Create an empty model on `engine`.
    ///
    /// Fails with `ENGINE_NOT_READY` when the engine was never initialized.
    pub fn new(engine: &Engine) -> Result<Self, ModelError> {
        let problem = Problem::new(engine)?;
        let model = Self {
            id: ModelId::next(),
            problem,
            columns: Vec::new(),
            rows: Vec::new(),
        };
        tracing::debug!(
            component = "model",
            operation = "create",
            status = "success",
            model_id = model.id.inner(),
            "Created model"
        );
        Ok(model)
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn name(&self) -> Result<Option<String>, ModelError> {
        Ok(self.problem.name()?)
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), ModelError> {
        Ok(self.problem.set_name(name)?)
    }

    pub fn sense(&self) -> Result<Sense, ModelError> {
        Ok(Sense::decode("glp_get_obj_dir", self.problem.obj_dir()?)?)
    }

    pub fn set_sense(&mut self, sense: Sense) -> Result<(), ModelError> {
        self.problem.set_obj_dir(sense.code())?;
        tracing::debug!(
            component = "model",
            operation = "set_sense",
            status = "success",
            sense = sense.as_str(),
            "Set objective sense"
        );
        Ok(())
    }

    pub fn num_variables(&self) -> usize {
        self.columns.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.rows.len()
    }

    /// Nonzero count of the engine's matrix, as of the last flush.
    pub fn num_nonzeros(&self) -> Result<u32, ModelError> {
        Ok(self.problem.num_nz()?)
    }

    /// Integer columns, binary ones included.
    pub fn num_integer(&self) -> Result<u32, ModelError> {
        Ok(self.problem.num_int()?)
    }

    pub fn num_binary(&self) -> Result<u32, ModelError> {
        Ok(self.problem.num_bin()?)
    }

    /// Variables in column order.
    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        (1..=self.columns.len() as u32).map(move |j| Variable::new(self.id, j))
    }

    /// Constraints in row order.
    pub fn constraints(&self) -> impl Iterator<Item = Constraint> + '_ {
        (1..=self.rows.len() as u32).map(move |i| Constraint::new(self.id, i))
    }

    /// Variables followed by constraints.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.variables()
            .map(Entity::from)
            .chain(self.constraints().map(Entity::from))
    }

    /// The variable at 0-based `position`.
    pub fn variable(&self, position: usize) -> Option<Variable> {
        (position < self.columns.len()).then(|| Variable::new(self.id, position as u32 + 1))
    }

    /// The constraint at 0-based `position`.
    pub fn constraint(&self, position: usize) -> Option<Constraint> {
        (position < self.rows.len()).then(|| Constraint::new(self.id, position as u32 + 1))
    }

    pub(crate) fn column_of(&self, x: Variable) -> Result<u32, ModelError> {
        if x.model() == self.id && x.index() >= 1 && x.index() as usize <= self.columns.len() {
            Ok(x.index())
        } else {
            Err(ModelError::ForeignEntity { entity: x.into() })
        }
    }

    pub(crate) fn row_of(&self, c: Constraint) -> Result<u32, ModelError> {
        if c.model() == self.id && c.index() >= 1 && c.index() as usize <= self.rows.len() {
            Ok(c.index())
        } else {
            Err(ModelError::ForeignEntity { entity: c.into() })
        }
    }

    pub(crate) fn check_entity(&self, entity: Entity) -> Result<Entity, ModelError> {
        match entity {
            Entity::Variable(x) => self.column_of(x).map(|_| entity),
            Entity::Constraint(c) => self.row_of(c).map(|_| entity),
        }
    }

    pub(crate) fn variable_handle(&self, j: u32) -> Variable {
        Variable::new(self.id, j)
    }

    pub(crate) fn constraint_handle(&self, i: u32) -> Constraint {
        Constraint::new(self.id, i)
    }
}

pub(crate) fn check_number(field: &'static str, value: f64) -> Result<f64, ModelError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ModelError::NonNumeric { field, value })
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("id", &self.id)
            .field("variables", &self.columns.len())
            .field("constraints", &self.rows.len())
            .field("problem", &self.problem)
            .finish()
    }
}
