//! Bounds, names, objective coefficients and kinds of variables and constraints.

use glpx_solver::{BoundKind, VariableKind};

use crate::ids::{Entity, Variable};
use crate::model::error::ModelError;
use crate::model::{check_number, Model};
use crate::types::Bounds;

impl Model {
    /// Bounds as last set through this model.
    pub fn bounds(&self, entity: impl Into<Entity>) -> Result<Bounds, ModelError> {
        Ok(match self.check_entity(entity.into())? {
            Entity::Variable(x) => self.columns[x.index() as usize - 1],
            Entity::Constraint(c) => self.rows[c.index() as usize - 1].bounds,
        })
    }

    /// Set both bounds; `None` (or an infinite value) leaves that side open.
    ///
    /// Setting the pair already in place makes no engine call.
    pub fn set_bounds(
        &mut self,
        entity: impl Into<Entity>,
        lower: Option<f64>,
        upper: Option<f64>,
    ) -> Result<(), ModelError> {
        let entity = self.check_entity(entity.into())?;
        let bounds = Bounds::new(lower, upper);
        if let Some(value) = bounds.first_nan() {
            return Err(ModelError::NonNumeric {
                field: "bound",
                value,
            });
        }
        if self.bounds(entity)? == bounds {
            return Ok(());
        }

        let kind = bounds.kind().code();
        let lb = bounds.lower.unwrap_or(0.0);
        let ub = bounds.upper.unwrap_or(0.0);
        match entity {
            Entity::Variable(x) => {
                self.problem.set_col_bnds(x.index(), kind, lb, ub)?;
                self.columns[x.index() as usize - 1] = bounds;
            }
            Entity::Constraint(c) => {
                self.problem.set_row_bnds(c.index(), kind, lb, ub)?;
                self.rows[c.index() as usize - 1].bounds = bounds;
            }
        }
        tracing::trace!(
            component = "model",
            operation = "set_bounds",
            status = "success",
            entity = %entity,
            kind = bounds.kind().as_str(),
            "Set bounds"
        );
        Ok(())
    }

    pub fn set_lower(&mut self, entity: impl Into<Entity>, lower: Option<f64>) -> Result<(), ModelError> {
        let entity = entity.into();
        let upper = self.bounds(entity)?.upper;
        self.set_bounds(entity, lower, upper)
    }

    pub fn set_upper(&mut self, entity: impl Into<Entity>, upper: Option<f64>) -> Result<(), ModelError> {
        let entity = entity.into();
        let lower = self.bounds(entity)?.lower;
        self.set_bounds(entity, lower, upper)
    }

    pub fn bound_kind(&self, entity: impl Into<Entity>) -> Result<BoundKind, ModelError> {
        Ok(self.bounds(entity)?.kind())
    }

    /// Name stored in the engine, if any.
    pub fn entity_name(&self, entity: impl Into<Entity>) -> Result<Option<String>, ModelError> {
        Ok(match self.check_entity(entity.into())? {
            Entity::Variable(x) => self.problem.col_name(x.index())?,
            Entity::Constraint(c) => self.problem.row_name(c.index())?,
        })
    }

    /// Names longer than 255 bytes or holding control characters are rejected.
    pub fn set_entity_name(&mut self, entity: impl Into<Entity>, name: &str) -> Result<(), ModelError> {
        match self.check_entity(entity.into())? {
            Entity::Variable(x) => self.problem.set_col_name(x.index(), name)?,
            Entity::Constraint(c) => self.problem.set_row_name(c.index(), name)?,
        }
        Ok(())
    }

    /// Name, or the `x_j` / `r_i` label used for unnamed columns and rows.
    pub fn label(&self, entity: impl Into<Entity>) -> Result<String, ModelError> {
        let entity = entity.into();
        Ok(match self.entity_name(entity)? {
            Some(name) => name,
            None => match entity {
                Entity::Variable(x) => format!("x_{}", x.index()),
                Entity::Constraint(c) => format!("r_{}", c.index()),
            },
        })
    }

    pub fn objective(&self, x: Variable) -> Result<f64, ModelError> {
        let j = self.column_of(x)?;
        Ok(self.problem.obj_coef(j)?)
    }

    pub fn set_objective(&mut self, x: Variable, coefficient: f64) -> Result<(), ModelError> {
        let j = self.column_of(x)?;
        let coefficient = check_number("objective", coefficient)?;
        Ok(self.problem.set_obj_coef(j, coefficient)?)
    }

    /// Constant term of the objective.
    pub fn objective_constant(&self) -> Result<f64, ModelError> {
        Ok(self.problem.obj_coef(0)?)
    }

    pub fn set_objective_constant(&mut self, constant: f64) -> Result<(), ModelError> {
        let constant = check_number("objective", constant)?;
        Ok(self.problem.set_obj_coef(0, constant)?)
    }

    /// Kind as the engine reports it; an integer column bounded by `[0, 1]`
    /// reads as binary.
    pub fn kind(&self, x: Variable) -> Result<VariableKind, ModelError> {
        let j = self.column_of(x)?;
        Ok(VariableKind::decode("glp_get_col_kind", self.problem.col_kind(j)?)?)
    }

    /// Setting a variable binary also sets its bounds to `[0, 1]`.
    pub fn set_kind(&mut self, x: Variable, kind: VariableKind) -> Result<(), ModelError> {
        let j = self.column_of(x)?;
        self.problem.set_col_kind(j, kind.code())?;
        if kind == VariableKind::Binary {
            self.columns[j as usize - 1] = Bounds::new(Some(0.0), Some(1.0));
        }
        Ok(())
    }
}
