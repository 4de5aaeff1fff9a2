//! Row coefficients: local accumulation and lazy synchronization.

use std::time::Instant;

use crate::ids::{Constraint, Variable};
use crate::model::error::ModelError;
use crate::model::{check_number, Model, RowState};
use crate::types::Coefficients;

/// Adds `delta` to the row's entry for `column`.
///
/// A zero delta changes nothing; an entry that cancels to exactly zero is
/// removed.
pub(crate) fn apply_delta(row: &mut RowState, column: u32, delta: f64) {
    if delta == 0.0 {
        return;
    }
    let entry = row.coefficients.entry(column).or_insert(0.0);
    *entry += delta;
    if *entry == 0.0 {
        row.coefficients.remove(&column);
    }
    row.dirty = true;
}

impl Model {
    /// Add `delta` to the coefficient of `x` in `c`.
    pub fn accumulate(&mut self, c: Constraint, x: Variable, delta: f64) -> Result<(), ModelError> {
        let i = self.row_of(c)?;
        let j = self.column_of(x)?;
        let delta = check_number("coefficient", delta)?;
        apply_delta(&mut self.rows[i as usize - 1], j, delta);
        Ok(())
    }

    /// Add a batch of deltas to `c`, pair by pair.
    ///
    /// The batch is validated as a whole first; a rejected batch leaves the
    /// row untouched.
    pub fn accumulate_all(
        &mut self,
        c: Constraint,
        coefficients: impl Into<Coefficients>,
    ) -> Result<(), ModelError> {
        let i = self.row_of(c)?;
        let pairs = coefficients.into().pairs();
        let mut deltas = Vec::with_capacity(pairs.len());
        for (x, delta) in pairs {
            deltas.push((self.column_of(x)?, check_number("coefficient", delta)?));
        }
        let row = &mut self.rows[i as usize - 1];
        for (j, delta) in deltas {
            apply_delta(row, j, delta);
        }
        Ok(())
    }

    /// Current local coefficient of `x` in `c`; 0 when absent.
    pub fn coefficient(&self, c: Constraint, x: Variable) -> Result<f64, ModelError> {
        let i = self.row_of(c)?;
        let j = self.column_of(x)?;
        Ok(self.rows[i as usize - 1]
            .coefficients
            .get(&j)
            .copied()
            .unwrap_or(0.0))
    }

    /// Nonzero coefficients of `c`, ordered by column.
    pub fn coefficients(&self, c: Constraint) -> Result<Vec<(Variable, f64)>, ModelError> {
        let i = self.row_of(c)?;
        Ok(self.rows[i as usize - 1]
            .coefficients
            .iter()
            .map(|(&j, &value)| (self.variable_handle(j), value))
            .collect())
    }

    /// True when `c` has edits the engine has not seen.
    pub fn is_dirty(&self, c: Constraint) -> Result<bool, ModelError> {
        let i = self.row_of(c)?;
        Ok(self.rows[i as usize - 1].dirty)
    }

    /// Send the row of `c` to the engine if it changed.
    ///
    /// Returns whether an engine call was made. The index and value arrays
    /// live in engine memory only for the duration of the call.
    pub fn flush(&mut self, c: Constraint) -> Result<bool, ModelError> {
        let i = self.row_of(c)?;
        self.flush_row(i)
    }

    /// Flush every dirty row. Called before every solve and write.
    pub fn update(&mut self) -> Result<usize, ModelError> {
        let started = Instant::now();
        let mut flushed = 0;
        for i in 1..=self.rows.len() as u32 {
            if self.flush_row(i)? {
                flushed += 1;
            }
        }
        if flushed > 0 {
            tracing::debug!(
                component = "model",
                operation = "update",
                status = "success",
                rows = flushed,
                duration_ms = started.elapsed().as_secs_f64() * 1000.0,
                "Flushed dirty rows"
            );
        }
        Ok(flushed)
    }

    fn flush_row(&mut self, i: u32) -> Result<bool, ModelError> {
        let row = &self.rows[i as usize - 1];
        if !row.dirty {
            return Ok(false);
        }
        let len = row.coefficients.len();
        // Slot 0 is unused by the engine.
        let mut indices = Vec::with_capacity(len + 1);
        let mut values = Vec::with_capacity(len + 1);
        indices.push(0);
        values.push(0.0);
        for (&j, &value) in &row.coefficients {
            indices.push(j as i32);
            values.push(value);
        }

        {
            let bridge = self.problem.bridge();
            let ind = bridge.alloc_ints(len + 1)?;
            let val = bridge.alloc_doubles(len + 1)?;
            ind.write_i32s(0, &indices)?;
            val.write_f64s(0, &values)?;
            self.problem.set_mat_row(i, len, &ind, &val)?;
        }

        self.rows[i as usize - 1].dirty = false;
        tracing::trace!(
            component = "model",
            operation = "flush",
            status = "success",
            row = i,
            len,
            "Flushed row"
        );
        Ok(true)
    }
}
