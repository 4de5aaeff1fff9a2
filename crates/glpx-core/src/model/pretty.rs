//! Text reports of solutions and of the simplex tableau.

use glpx_solver::Status;
use serde::Serialize;

use crate::ids::Entity;
use crate::model::error::ModelError;
use crate::model::Model;

const UNBOUNDED: &str = "problem is unbounded";
const NO_FEASIBLE: &str = "problem has no feasible solution";

/// Which of the engine's three solutions to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionKind {
    Basic,
    Interior,
    Mip,
}

impl SolutionKind {
    /// Solve that produces this solution.
    pub fn solver(self) -> &'static str {
        match self {
            SolutionKind::Basic => "simplex",
            SolutionKind::Interior => "interior",
            SolutionKind::Mip => "intopt",
        }
    }
}

/// One row or column of a [`SolutionView`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueView {
    pub name: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dual: Option<f64>,
}

/// Serializable snapshot of one solution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolutionView {
    pub kind: SolutionKind,
    pub status: Status,
    pub objective_value: f64,
    pub variables: Vec<ValueView>,
    pub constraints: Vec<ValueView>,
}

/// Shortest decimal rendering; negative zero prints as `0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

impl Model {
    /// `status = …`, one `name = value` line per variable, then `value = …`.
    ///
    /// Fails while the basic solution is undefined or infeasible.
    pub fn solution_report(&self) -> Result<String, ModelError> {
        let status = self.status()?;
        match status {
            Status::Undefined | Status::Infeasible => Err(ModelError::StatusUnavailable {
                status,
                solve: SolutionKind::Basic.solver(),
            }),
            Status::Unbounded => Ok(UNBOUNDED.to_string()),
            Status::NoFeasible => Ok(NO_FEASIBLE.to_string()),
            Status::Feasible | Status::Optimal => self.render(
                status,
                |entity| self.value(entity),
                self.objective_value()?,
                format_number,
            ),
        }
    }

    /// Interior-point counterpart of [`Model::solution_report`], with values
    /// rounded to six decimals.
    ///
    /// Only an optimal interior solution renders; the method never stops at a
    /// merely feasible point, so any status other than `optimal` or
    /// `no_feasible` is unavailable.
    pub fn interior_report(&self) -> Result<String, ModelError> {
        let status = self.interior_status()?;
        match status {
            Status::Optimal => self.render(
                status,
                |entity| self.interior_value(entity),
                self.interior_objective_value()?,
                |value| format_number(round6(value)),
            ),
            Status::NoFeasible => Ok(NO_FEASIBLE.to_string()),
            _ => Err(ModelError::StatusUnavailable {
                status,
                solve: SolutionKind::Interior.solver(),
            }),
        }
    }

    /// Integer-solution counterpart of [`Model::solution_report`].
    ///
    /// A MIP solution is `undefined`, `feasible`, `optimal` or `no_feasible`;
    /// anything but the last three is unavailable.
    pub fn mip_report(&self) -> Result<String, ModelError> {
        let status = self.mip_status()?;
        match status {
            Status::Feasible | Status::Optimal => self.render(
                status,
                |entity| self.mip_value(entity),
                self.mip_objective_value()?,
                format_number,
            ),
            Status::NoFeasible => Ok(NO_FEASIBLE.to_string()),
            _ => Err(ModelError::StatusUnavailable {
                status,
                solve: SolutionKind::Mip.solver(),
            }),
        }
    }

    fn render(
        &self,
        status: Status,
        value: impl Fn(Entity) -> Result<f64, ModelError>,
        objective: f64,
        format: impl Fn(f64) -> String,
    ) -> Result<String, ModelError> {
        let mut lines = Vec::with_capacity(self.num_variables() + 2);
        lines.push(format!("status = {}", status));
        for x in self.variables() {
            lines.push(format!("{} = {}", self.label(x)?, format(value(x.into())?)));
        }
        lines.push(format!("value = {}", format(objective)));
        Ok(lines.join("\n"))
    }

    /// The simplex tableau with default number formatting.
    pub fn tableau(&self) -> Result<String, ModelError> {
        self.tableau_with(format_number)
    }

    /// One `name = coef name + … + value` line per basic entity, then the
    /// objective row `z` over the nonbasic entities.
    ///
    /// Constraint coefficients and duals are negated relative to those of
    /// variables, following the engine's sign convention for auxiliary
    /// variables.
    pub fn tableau_with(&self, format: impl Fn(f64) -> String) -> Result<String, ModelError> {
        if !self.problem.bf_exists()? {
            return Err(ModelError::NoBasis);
        }
        let signed = |entity: Entity, value: f64| {
            if entity.is_variable() {
                value
            } else {
                -value
            }
        };

        let mut lines = Vec::new();
        let mut objective_terms = Vec::new();
        for entity in self.entities() {
            if self.basis_status(entity)?.is_basic() {
                let mut terms = Vec::new();
                for (other, coefficient) in self.tableau_row(entity)? {
                    terms.push(format!(
                        "{} {}",
                        format(signed(other, coefficient)),
                        self.label(other)?
                    ));
                }
                terms.push(format(self.value(entity)?));
                lines.push(format!("{} = {}", self.label(entity)?, terms.join(" + ")));
            } else {
                objective_terms.push(format!(
                    "{} {}",
                    format(signed(entity, self.dual(entity)?)),
                    self.label(entity)?
                ));
            }
        }
        objective_terms.push(format(self.objective_value()?));
        lines.push(format!("z = {}", objective_terms.join(" + ")));
        Ok(lines.join("\n"))
    }

    /// Every row and column value of one solution.
    pub fn solution_view(&self, kind: SolutionKind) -> Result<SolutionView, ModelError> {
        let (status, objective_value) = match kind {
            SolutionKind::Basic => (self.status()?, self.objective_value()?),
            SolutionKind::Interior => (self.interior_status()?, self.interior_objective_value()?),
            SolutionKind::Mip => (self.mip_status()?, self.mip_objective_value()?),
        };
        let view = |entity: Entity| -> Result<ValueView, ModelError> {
            let (value, dual) = match kind {
                SolutionKind::Basic => (self.value(entity)?, Some(self.dual(entity)?)),
                SolutionKind::Interior => {
                    (self.interior_value(entity)?, Some(self.interior_dual(entity)?))
                }
                SolutionKind::Mip => (self.mip_value(entity)?, None),
            };
            Ok(ValueView {
                name: self.label(entity)?,
                value,
                dual,
            })
        };
        Ok(SolutionView {
            kind,
            status,
            objective_value,
            variables: self
                .variables()
                .map(|x| view(x.into()))
                .collect::<Result<_, _>>()?,
            constraints: self
                .constraints()
                .map(|c| view(c.into()))
                .collect::<Result<_, _>>()?,
        })
    }
}
