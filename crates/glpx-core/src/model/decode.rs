//! Reading solutions back from the engine.
//!
//! Nothing here is cached: every call asks the engine. Rows and columns share
//! one combined index space, rows first (`1..=m`) then columns
//! (`m+1..=m+n`).

use glpx_solver::{BasisStatus, DecodeError, Status};

use crate::ids::Entity;
use crate::model::error::ModelError;
use crate::model::Model;

impl Model {
    /// Status of the basic solution.
    pub fn status(&self) -> Result<Status, ModelError> {
        Ok(Status::decode("glp_get_status", self.problem.status()?)?)
    }

    pub fn primal_status(&self) -> Result<Status, ModelError> {
        Ok(Status::decode("glp_get_prim_stat", self.problem.prim_stat()?)?)
    }

    pub fn dual_status(&self) -> Result<Status, ModelError> {
        Ok(Status::decode("glp_get_dual_stat", self.problem.dual_stat()?)?)
    }

    pub fn objective_value(&self) -> Result<f64, ModelError> {
        Ok(self.problem.obj_val()?)
    }

    pub fn interior_status(&self) -> Result<Status, ModelError> {
        Ok(Status::decode("glp_ipt_status", self.problem.ipt_status()?)?)
    }

    pub fn interior_objective_value(&self) -> Result<f64, ModelError> {
        Ok(self.problem.ipt_obj_val()?)
    }

    pub fn mip_status(&self) -> Result<Status, ModelError> {
        Ok(Status::decode("glp_mip_status", self.problem.mip_status()?)?)
    }

    pub fn mip_objective_value(&self) -> Result<f64, ModelError> {
        Ok(self.problem.mip_obj_val()?)
    }

    /// Primal value of a column, or activity of a row, in the basic solution.
    pub fn value(&self, entity: impl Into<Entity>) -> Result<f64, ModelError> {
        Ok(match self.check_entity(entity.into())? {
            Entity::Variable(x) => self.problem.col_prim(x.index())?,
            Entity::Constraint(c) => self.problem.row_prim(c.index())?,
        })
    }

    /// Reduced cost of a column, or shadow price of a row.
    pub fn dual(&self, entity: impl Into<Entity>) -> Result<f64, ModelError> {
        Ok(match self.check_entity(entity.into())? {
            Entity::Variable(x) => self.problem.col_dual(x.index())?,
            Entity::Constraint(c) => self.problem.row_dual(c.index())?,
        })
    }

    pub fn basis_status(&self, entity: impl Into<Entity>) -> Result<BasisStatus, ModelError> {
        Ok(match self.check_entity(entity.into())? {
            Entity::Variable(x) => {
                BasisStatus::decode("glp_get_col_stat", self.problem.col_stat(x.index())?)?
            }
            Entity::Constraint(c) => {
                BasisStatus::decode("glp_get_row_stat", self.problem.row_stat(c.index())?)?
            }
        })
    }

    pub fn interior_value(&self, entity: impl Into<Entity>) -> Result<f64, ModelError> {
        Ok(match self.check_entity(entity.into())? {
            Entity::Variable(x) => self.problem.ipt_col_prim(x.index())?,
            Entity::Constraint(c) => self.problem.ipt_row_prim(c.index())?,
        })
    }

    pub fn interior_dual(&self, entity: impl Into<Entity>) -> Result<f64, ModelError> {
        Ok(match self.check_entity(entity.into())? {
            Entity::Variable(x) => self.problem.ipt_col_dual(x.index())?,
            Entity::Constraint(c) => self.problem.ipt_row_dual(c.index())?,
        })
    }

    pub fn mip_value(&self, entity: impl Into<Entity>) -> Result<f64, ModelError> {
        Ok(match self.check_entity(entity.into())? {
            Entity::Variable(x) => self.problem.mip_col_val(x.index())?,
            Entity::Constraint(c) => self.problem.mip_row_val(c.index())?,
        })
    }

    /// Row of the simplex tableau expressing basic `entity` through the
    /// nonbasic entities.
    pub fn tableau_row(&self, entity: impl Into<Entity>) -> Result<Vec<(Entity, f64)>, ModelError> {
        let entity = self.check_entity(entity.into())?;
        self.require_basis()?;
        if !self.basis_status(entity)?.is_basic() {
            return Err(ModelError::NotBasic { entity });
        }
        let raw = self.problem.eval_tab_row(self.combined_index(entity))?;
        self.resolve_pairs(raw)
    }

    /// Column of the simplex tableau for nonbasic `entity`, over the basic
    /// entities.
    pub fn tableau_column(
        &self,
        entity: impl Into<Entity>,
    ) -> Result<Vec<(Entity, f64)>, ModelError> {
        let entity = self.check_entity(entity.into())?;
        self.require_basis()?;
        if self.basis_status(entity)?.is_basic() {
            return Err(ModelError::NotNonbasic { entity });
        }
        let raw = self.problem.eval_tab_col(self.combined_index(entity))?;
        self.resolve_pairs(raw)
    }

    /// Entity along which the last simplex run found the problem unbounded.
    pub fn unbounded_ray(&self) -> Result<Entity, ModelError> {
        match self.problem.unbnd_ray()? {
            0 => Err(ModelError::NoRay),
            k => Ok(self.entity_at(i64::from(k))?),
        }
    }

    /// Resolves a combined 1-based index.
    pub fn entity_at(&self, k: i64) -> Result<Entity, DecodeError> {
        let m = self.rows.len() as i64;
        let n = self.columns.len() as i64;
        if k >= 1 && k <= m {
            Ok(self.constraint_handle(k as u32).into())
        } else if k > m && k <= m + n {
            Ok(self.variable_handle((k - m) as u32).into())
        } else {
            Err(DecodeError::IndexOutOfRange {
                index: k,
                total: (m + n) as u32,
            })
        }
    }

    pub(crate) fn combined_index(&self, entity: Entity) -> u32 {
        match entity {
            Entity::Constraint(c) => c.index(),
            Entity::Variable(x) => self.rows.len() as u32 + x.index(),
        }
    }

    fn require_basis(&self) -> Result<(), ModelError> {
        if self.problem.bf_exists()? {
            Ok(())
        } else {
            Err(ModelError::NoBasis)
        }
    }

    fn resolve_pairs(&self, raw: Vec<(i32, f64)>) -> Result<Vec<(Entity, f64)>, ModelError> {
        raw.into_iter()
            .filter(|&(k, _)| k > 0)
            .map(|(k, value)| Ok((self.entity_at(i64::from(k))?, value)))
            .collect()
    }
}
