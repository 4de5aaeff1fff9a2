//! Solver entry points.

use std::time::Instant;

use glpx_abi::{Abi, Buffer, RawTree};
use glpx_solver::{
    InteriorOptions, InteriorReturn, IntoptOptions, IntoptReturn, ReturnCode, SimplexOptions,
    SimplexReturn, SolverConfig, Tree, TreeCallback, TreeError,
};

use crate::model::error::ModelError;
use crate::model::Model;

impl Model {
    /// Solve the LP relaxation with the primal/dual simplex method.
    pub fn simplex(&mut self, options: &SimplexOptions) -> Result<SimplexReturn, ModelError> {
        let code = self.run(&SolverConfig::Simplex(options.clone()))?;
        Ok(SimplexReturn::decode("glp_simplex", code)?)
    }

    /// Solve the LP relaxation in exact rational arithmetic.
    pub fn exact(&mut self, options: &SimplexOptions) -> Result<SimplexReturn, ModelError> {
        let code = self.run(&SolverConfig::Exact(options.clone()))?;
        Ok(SimplexReturn::decode("glp_exact", code)?)
    }

    /// Solve the LP relaxation with the interior-point method.
    pub fn interior(&mut self, options: &InteriorOptions) -> Result<InteriorReturn, ModelError> {
        let code = self.run(&SolverConfig::Interior(options.clone()))?;
        Ok(InteriorReturn::decode("glp_interior", code)?)
    }

    /// Solve the MIP with branch-and-cut.
    ///
    /// Without presolve the engine needs an optimal LP basis, so run
    /// [`Model::simplex`] first. If the options carry a callback and it
    /// fails, the search is stopped and its error returned.
    pub fn intopt(&mut self, options: &IntoptOptions) -> Result<IntoptReturn, ModelError> {
        let code = self.run(&SolverConfig::Intopt(options.clone()))?;
        Ok(IntoptReturn::decode("glp_intopt", code)?)
    }

    /// Solve with whichever mode `config` selects.
    pub fn solve(&mut self, config: &SolverConfig) -> Result<ReturnCode, ModelError> {
        let code = self.run(config)?;
        Ok(config.decode_return(code)?)
    }

    fn run(&mut self, config: &SolverConfig) -> Result<i32, ModelError> {
        self.update()?;
        let started = Instant::now();
        let code = {
            let bridge = self.problem.bridge();
            let record = config.marshal(&bridge)?;
            let parm = record.buffer();
            match config {
                SolverConfig::Simplex(_) => self.problem.simplex(parm)?,
                SolverConfig::Exact(_) => self.problem.exact(parm)?,
                SolverConfig::Interior(_) => self.problem.interior(parm)?,
                SolverConfig::Intopt(options) => match &options.callback {
                    Some(callback) => self.search(parm, callback)?,
                    None => self.problem.intopt(parm, None)?,
                },
            }
        };
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        match config.decode_return(code) {
            Ok(decoded) if decoded.is_ok() => tracing::debug!(
                component = "solver",
                operation = config.name(),
                status = "success",
                return_code = decoded.as_str(),
                duration_ms,
                variables = self.num_variables(),
                constraints = self.num_constraints(),
                "Solve finished"
            ),
            Ok(decoded) => tracing::warn!(
                component = "solver",
                operation = config.name(),
                status = "error",
                return_code = decoded.as_str(),
                duration_ms,
                "Solver returned a failure code"
            ),
            Err(_) => tracing::warn!(
                component = "solver",
                operation = config.name(),
                status = "error",
                code,
                duration_ms,
                "Solver returned an unmapped code"
            ),
        }
        Ok(code)
    }

    /// Branch-and-cut with `callback` hooked into the driver. The first
    /// callback error terminates the search; later invocations are skipped.
    fn search(&self, parm: &Buffer<'_>, callback: &TreeCallback) -> Result<i32, ModelError> {
        let mut invocations = 0u32;
        let mut failure: Option<TreeError> = None;
        let mut hook = |abi: &dyn Abi, raw: &RawTree| {
            invocations += 1;
            if failure.is_some() {
                return;
            }
            let outcome = Tree::new(abi, raw).and_then(|mut tree| callback.invoke(&mut tree));
            if let Err(err) = outcome {
                if let Err(stop) = abi.ios_terminate(raw) {
                    tracing::warn!(
                        component = "solver",
                        operation = "intopt",
                        error = %stop,
                        "Could not terminate the search"
                    );
                }
                failure = Some(err);
            }
        };
        let code = self.problem.intopt(parm, Some(&mut hook))?;
        tracing::debug!(
            component = "solver",
            operation = "intopt",
            invocations,
            "Search callback finished"
        );
        match failure {
            Some(err) => {
                tracing::warn!(
                    component = "solver",
                    operation = "intopt",
                    status = "error",
                    error = %err,
                    "Search callback failed"
                );
                Err(err.into())
            }
            None => Ok(code),
        }
    }
}
