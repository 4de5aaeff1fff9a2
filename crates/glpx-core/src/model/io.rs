//! LP and MPS serialization through the engine's own readers and writers.

use std::io::Write;
use std::path::Path;

use glpx_abi::Engine;
use glpx_solver::MpsFormat;
use tempfile::NamedTempFile;

use crate::model::error::ModelError;
use crate::model::{Model, RowState};
use crate::types::Bounds;

/// A fresh file in the temporary directory, created exclusively under a
/// random name and removed on drop.
fn temp_file(suffix: &str) -> Result<NamedTempFile, ModelError> {
    tempfile::Builder::new()
        .prefix("glpx-")
        .suffix(suffix)
        .tempfile()
        .map_err(|err| io_error("create temporary file", err))
}

fn temp_file_with(suffix: &str, text: &str) -> Result<NamedTempFile, ModelError> {
    let mut file = temp_file(suffix)?;
    file.write_all(text.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|err| io_error("write temporary file", err))?;
    Ok(file)
}

fn read_temp(file: &NamedTempFile) -> Result<String, ModelError> {
    std::fs::read_to_string(file.path()).map_err(|err| io_error("read temporary file", err))
}

fn io_error(operation: &'static str, err: std::io::Error) -> ModelError {
    tracing::warn!(
        component = "model",
        operation,
        status = "error",
        error = %err,
        "Temporary file operation failed"
    );
    ModelError::Io {
        operation,
        message: err.to_string(),
    }
}

fn mps_label(format: MpsFormat) -> &'static str {
    match format {
        MpsFormat::Deck => "fixed mps",
        MpsFormat::File => "free mps",
    }
}

impl Model {
    /// Write the model in CPLEX LP format.
    pub fn write_lp(&mut self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        self.update()?;
        let code = self.problem.write_lp(path.as_ref())?;
        check_written("lp", code)
    }

    pub fn write_mps(&mut self, path: impl AsRef<Path>, format: MpsFormat) -> Result<(), ModelError> {
        self.update()?;
        let code = self.problem.write_mps(format.code(), path.as_ref())?;
        check_written(mps_label(format), code)
    }

    /// The model as CPLEX LP text.
    pub fn to_lp(&mut self) -> Result<String, ModelError> {
        let file = temp_file(".lp")?;
        self.write_lp(file.path())?;
        read_temp(&file)
    }

    /// The model as free MPS text.
    pub fn to_mps(&mut self) -> Result<String, ModelError> {
        let file = temp_file(".mps")?;
        self.write_mps(file.path(), MpsFormat::File)?;
        read_temp(&file)
    }

    /// Build a model from CPLEX LP text.
    pub fn from_lp(engine: &Engine, text: &str) -> Result<Self, ModelError> {
        let file = temp_file_with(".lp", text)?;
        Self::read_lp(engine, file.path())
    }

    /// Build a model from MPS text.
    pub fn from_mps(engine: &Engine, text: &str, format: MpsFormat) -> Result<Self, ModelError> {
        let file = temp_file_with(".mps", text)?;
        Self::read_mps(engine, file.path(), format)
    }

    pub fn read_lp(engine: &Engine, path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let mut model = Self::new(engine)?;
        let code = model.problem.read_lp(path.as_ref())?;
        check_read("lp", code)?;
        model.rebuild()?;
        Ok(model)
    }

    pub fn read_mps(
        engine: &Engine,
        path: impl AsRef<Path>,
        format: MpsFormat,
    ) -> Result<Self, ModelError> {
        let mut model = Self::new(engine)?;
        let code = model.problem.read_mps(format.code(), path.as_ref())?;
        check_read(mps_label(format), code)?;
        model.rebuild()?;
        Ok(model)
    }

    /// Reloads bounds and coefficients from the engine after a read.
    ///
    /// Rows come back clean: the engine already holds their coefficients.
    fn rebuild(&mut self) -> Result<(), ModelError> {
        let m = self.problem.num_rows();
        let n = self.problem.num_cols();

        self.columns = (1..=n)
            .map(|j| {
                let (kind, lb, ub) = self.problem.col_bnds(j)?;
                Ok(Bounds::from_engine(kind, lb, ub))
            })
            .collect::<Result<_, ModelError>>()?;

        self.rows = (1..=m)
            .map(|i| {
                let (kind, lb, ub) = self.problem.row_bnds(i)?;
                let mut row = RowState::new(Bounds::from_engine(kind, lb, ub));
                row.coefficients = self
                    .problem
                    .mat_row(i)?
                    .into_iter()
                    .filter(|&(_, value)| value != 0.0)
                    .collect();
                Ok(row)
            })
            .collect::<Result<_, ModelError>>()?;

        tracing::debug!(
            component = "model",
            operation = "read",
            status = "success",
            variables = n,
            constraints = m,
            "Rebuilt model from engine problem"
        );
        Ok(())
    }
}

fn check_written(format: &'static str, code: i32) -> Result<(), ModelError> {
    if code == 0 {
        Ok(())
    } else {
        tracing::warn!(
            component = "model",
            operation = "write",
            status = "error",
            format,
            code,
            "Engine writer failed"
        );
        Err(ModelError::WriteFailed { format, code })
    }
}

fn check_read(format: &'static str, code: i32) -> Result<(), ModelError> {
    if code == 0 {
        Ok(())
    } else {
        tracing::warn!(
            component = "model",
            operation = "read",
            status = "error",
            format,
            code,
            "Engine reader failed"
        );
        Err(ModelError::ReadFailed { format, code })
    }
}
