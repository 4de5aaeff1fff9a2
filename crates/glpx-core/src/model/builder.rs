//! Model builder methods for adding variables and constraints.
//!
//! Every creation call validates its whole input first, then appends one
//! contiguous block of columns or rows with a single engine call.

use std::collections::{BTreeMap, HashSet};

use glpx_abi::validate_name;

use crate::ids::{Constraint, Variable};
use crate::model::constraint::apply_delta;
use crate::model::error::ModelError;
use crate::model::{check_number, Model, RowState};
use crate::types::{Bounds, ConstraintProperties, VariableProperties};

impl Model {
    /// Add one variable.
    pub fn add_variable(&mut self, props: VariableProperties) -> Result<Variable, ModelError> {
        let first = self.create_variables(vec![props])?;
        Ok(self.variable_handle(first))
    }

    /// Add `count` variables sharing `props`.
    ///
    /// With a base name, variable `k` of the block is named `base_k`.
    pub fn add_variables(
        &mut self,
        count: usize,
        props: &VariableProperties,
    ) -> Result<Vec<Variable>, ModelError> {
        let batch = (0..count)
            .map(|k| VariableProperties {
                name: props.name.as_ref().map(|base| format!("{base}_{k}")),
                ..props.clone()
            })
            .collect();
        self.add_variables_from(batch)
    }

    /// Add one variable per property record, in order.
    pub fn add_variables_from(
        &mut self,
        props: Vec<VariableProperties>,
    ) -> Result<Vec<Variable>, ModelError> {
        let count = props.len() as u32;
        let first = self.create_variables(props)?;
        Ok((first..first + count).map(|j| self.variable_handle(j)).collect())
    }

    /// Add one variable per key, sharing `props`.
    ///
    /// Variables are named `base[key]` when `props` carries a base name and
    /// after the bare key otherwise.
    pub fn add_variables_keyed<K: AsRef<str>>(
        &mut self,
        keys: &[K],
        props: &VariableProperties,
    ) -> Result<BTreeMap<String, Variable>, ModelError> {
        let records = keys.iter().map(|key| {
            let key = key.as_ref();
            let record = VariableProperties {
                name: Some(keyed_name(props.name.as_deref(), key)),
                ..props.clone()
            };
            (key.to_string(), record)
        });
        self.add_variables_named(records)
    }

    /// Add one variable per `(key, props)` record, in iteration order.
    ///
    /// A record without a name is named after its key.
    pub fn add_variables_named<K, I>(
        &mut self,
        records: I,
    ) -> Result<BTreeMap<String, Variable>, ModelError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, VariableProperties)>,
    {
        let (keys, batch) = split_keyed(records, |props, key| {
            props.name.get_or_insert_with(|| key.to_string());
        })?;
        let created = self.add_variables_from(batch)?;
        Ok(keys.into_iter().zip(created).collect())
    }

    /// Add one constraint.
    pub fn add_constraint(&mut self, props: ConstraintProperties) -> Result<Constraint, ModelError> {
        let first = self.create_constraints(vec![props])?;
        Ok(self.constraint_handle(first))
    }

    /// Add `count` constraints sharing `props`, named `base_k` like
    /// [`Model::add_variables`].
    pub fn add_constraints(
        &mut self,
        count: usize,
        props: &ConstraintProperties,
    ) -> Result<Vec<Constraint>, ModelError> {
        let batch = (0..count)
            .map(|k| ConstraintProperties {
                name: props.name.as_ref().map(|base| format!("{base}_{k}")),
                ..props.clone()
            })
            .collect();
        self.add_constraints_from(batch)
    }

    pub fn add_constraints_from(
        &mut self,
        props: Vec<ConstraintProperties>,
    ) -> Result<Vec<Constraint>, ModelError> {
        let count = props.len() as u32;
        let first = self.create_constraints(props)?;
        Ok((first..first + count)
            .map(|i| self.constraint_handle(i))
            .collect())
    }

    pub fn add_constraints_keyed<K: AsRef<str>>(
        &mut self,
        keys: &[K],
        props: &ConstraintProperties,
    ) -> Result<BTreeMap<String, Constraint>, ModelError> {
        let records = keys.iter().map(|key| {
            let key = key.as_ref();
            let record = ConstraintProperties {
                name: Some(keyed_name(props.name.as_deref(), key)),
                ..props.clone()
            };
            (key.to_string(), record)
        });
        self.add_constraints_named(records)
    }

    pub fn add_constraints_named<K, I>(
        &mut self,
        records: I,
    ) -> Result<BTreeMap<String, Constraint>, ModelError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ConstraintProperties)>,
    {
        let (keys, batch) = split_keyed(records, |props, key| {
            props.name.get_or_insert_with(|| key.to_string());
        })?;
        let created = self.add_constraints_from(batch)?;
        Ok(keys.into_iter().zip(created).collect())
    }

    fn validate_variable(props: &VariableProperties) -> Result<(), ModelError> {
        validate_bounds(&props.bounds())?;
        if let Some(objective) = props.objective {
            check_number("objective", objective)?;
        }
        if let Some(name) = &props.name {
            validate_name(name)?;
        }
        Ok(())
    }

    fn validate_constraint(&self, props: &ConstraintProperties) -> Result<(), ModelError> {
        validate_bounds(&props.bounds())?;
        for (x, coefficient) in props.coefficients.pairs() {
            self.column_of(x)?;
            check_number("coefficient", coefficient)?;
        }
        if let Some(name) = &props.name {
            validate_name(name)?;
        }
        Ok(())
    }

    /// Appends the columns and returns the index of the first one.
    fn create_variables(&mut self, batch: Vec<VariableProperties>) -> Result<u32, ModelError> {
        for props in &batch {
            Self::validate_variable(props)?;
        }
        let count = batch.len() as u32;
        let first = self.problem.add_cols(count)?;
        // New columns start fixed at zero.
        self.columns
            .extend((0..count).map(|_| Bounds::fixed(0.0)));

        for (j, props) in (first..).zip(batch) {
            let x = self.variable_handle(j);
            if let Some(objective) = props.objective {
                self.set_objective(x, objective)?;
            }
            self.set_bounds(x, props.lower, props.upper)?;
            if let Some(kind) = props.kind {
                self.set_kind(x, kind)?;
            }
            if let Some(name) = &props.name {
                self.set_entity_name(x, name)?;
            }
        }

        tracing::debug!(
            component = "model",
            operation = "add_variables",
            status = "success",
            first,
            count,
            "Added variables"
        );
        Ok(first)
    }

    /// Appends the rows and returns the index of the first one.
    fn create_constraints(&mut self, batch: Vec<ConstraintProperties>) -> Result<u32, ModelError> {
        for props in &batch {
            self.validate_constraint(props)?;
        }
        let count = batch.len() as u32;
        let first = self.problem.add_rows(count)?;
        // New rows start free.
        self.rows
            .extend((0..count).map(|_| RowState::new(Bounds::free())));

        for (i, props) in (first..).zip(batch) {
            let c = self.constraint_handle(i);
            self.set_bounds(c, props.lower, props.upper)?;
            let row = &mut self.rows[i as usize - 1];
            for (x, coefficient) in props.coefficients.pairs() {
                apply_delta(row, x.index(), coefficient);
            }
            if let Some(name) = &props.name {
                self.set_entity_name(c, name)?;
            }
        }

        tracing::debug!(
            component = "model",
            operation = "add_constraints",
            status = "success",
            first,
            count,
            "Added constraints"
        );
        Ok(first)
    }
}

fn validate_bounds(bounds: &Bounds) -> Result<(), ModelError> {
    match bounds.first_nan() {
        Some(value) => Err(ModelError::NonNumeric {
            field: "bound",
            value,
        }),
        None => Ok(()),
    }
}

fn keyed_name(base: Option<&str>, key: &str) -> String {
    match base {
        Some(base) => format!("{base}[{key}]"),
        None => key.to_string(),
    }
}

/// Splits keyed records, rejecting duplicate keys before anything else runs.
fn split_keyed<K, P, I>(
    records: I,
    mut name_from_key: impl FnMut(&mut P, &str),
) -> Result<(Vec<String>, Vec<P>), ModelError>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, P)>,
{
    let mut seen = HashSet::new();
    let mut keys = Vec::new();
    let mut batch = Vec::new();
    for (key, mut props) in records {
        let key = key.into();
        if !seen.insert(key.clone()) {
            return Err(ModelError::DuplicateKey { key });
        }
        name_from_key(&mut props, &key);
        keys.push(key);
        batch.push(props);
    }
    Ok((keys, batch))
}
