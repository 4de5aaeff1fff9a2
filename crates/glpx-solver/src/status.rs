//! Solution statuses and solver return codes.

use std::str::FromStr;

use glpx_abi::codes::*;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, DecodeError};
use crate::tags::tags;

tags! {
    /// Status of a basic, interior-point or integer solution.
    pub enum Status ("status") {
        Undefined = GLP_UNDEF => "undefined",
        Feasible = GLP_FEAS => "feasible",
        Infeasible = GLP_INFEAS => "infeasible",
        NoFeasible = GLP_NOFEAS => "no_feasible",
        Optimal = GLP_OPT => "optimal",
        Unbounded = GLP_UNBND => "unbounded",
    }
}

impl Status {
    pub fn is_optimal(self) -> bool {
        matches!(self, Status::Optimal)
    }

    /// True when values can be read from the solution.
    pub fn has_solution(self) -> bool {
        matches!(self, Status::Optimal | Status::Feasible)
    }
}

tags! {
    /// Position of a row or column relative to the basis.
    pub enum BasisStatus ("basis status") {
        Basic = GLP_BS => "basic",
        LowerBound = GLP_NL => "lower-bound",
        UpperBound = GLP_NU => "upper-bound",
        /// Nonbasic free (unbounded) entity.
        Free = GLP_NF => "free",
        /// Nonbasic fixed entity.
        Fixed = GLP_NS => "fixed",
    }
}

impl BasisStatus {
    pub fn is_basic(self) -> bool {
        matches!(self, BasisStatus::Basic)
    }
}

tags! {
    /// Return code of the primal/dual and exact simplex solvers.
    pub enum SimplexReturn ("simplex return code") {
        Ok = GLP_OK => "ok",
        BasisInvalid = GLP_EBADB => "basis_invalid",
        BasisSingular = GLP_ESING => "basis_singular",
        BasisIllConditioned = GLP_ECOND => "basis_ill_conditioned",
        BoundsIncorrect = GLP_EBOUND => "bounds_incorrect",
        Failure = GLP_EFAIL => "failure",
        ObjectiveLower = GLP_EOBJLL => "objective_lower",
        ObjectiveUpper = GLP_EOBJUL => "objective_upper",
        IterationLimit = GLP_EITLIM => "iteration_limit",
        TimeLimit = GLP_ETMLIM => "time_limit",
        NoPrimalFeasible = GLP_ENOPFS => "no_primal_feasible",
        NoDualFeasible = GLP_ENODFS => "no_dual_feasible",
    }
}

tags! {
    /// Return code of the interior-point solver.
    pub enum InteriorReturn ("interior return code") {
        Ok = GLP_OK => "ok",
        /// The problem has no rows or columns.
        NoData = GLP_EFAIL => "no_data",
        NoConvergence = GLP_ENOCVG => "no_convergence",
        IterationLimit = GLP_EITLIM => "iteration_limit",
        Instability = GLP_EINSTAB => "instability",
    }
}

tags! {
    /// Return code of the branch-and-cut solver.
    pub enum IntoptReturn ("intopt return code") {
        Ok = GLP_OK => "ok",
        BoundsIncorrect = GLP_EBOUND => "bounds_incorrect",
        NoRootBasis = GLP_EROOT => "no_root_basis",
        NoPrimalFeasible = GLP_ENOPFS => "no_primal_feasible",
        NoDualFeasible = GLP_ENODFS => "no_dual_feasible",
        Failure = GLP_EFAIL => "failure",
        MipGapTolerance = GLP_EMIPGAP => "mip_gap_tolerance",
        TimeLimit = GLP_ETMLIM => "time_limit",
        Stopped = GLP_ESTOP => "stopped",
    }
}

/// Decoded return code of any solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ReturnCode {
    Simplex(SimplexReturn),
    Interior(InteriorReturn),
    Intopt(IntoptReturn),
}

impl ReturnCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ReturnCode::Simplex(code) => code.as_str(),
            ReturnCode::Interior(code) => code.as_str(),
            ReturnCode::Intopt(code) => code.as_str(),
        }
    }

    /// Raw engine code.
    pub fn code(self) -> i32 {
        match self {
            ReturnCode::Simplex(code) => code.code(),
            ReturnCode::Interior(code) => code.code(),
            ReturnCode::Intopt(code) => code.code(),
        }
    }

    pub fn is_ok(self) -> bool {
        self.code() == GLP_OK
    }
}

impl std::fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<SimplexReturn> for ReturnCode {
    fn from(code: SimplexReturn) -> Self {
        ReturnCode::Simplex(code)
    }
}

impl From<InteriorReturn> for ReturnCode {
    fn from(code: InteriorReturn) -> Self {
        ReturnCode::Interior(code)
    }
}

impl From<IntoptReturn> for ReturnCode {
    fn from(code: IntoptReturn) -> Self {
        ReturnCode::Intopt(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_decoding() {
        assert_eq!(Status::decode("glp_get_status", GLP_OPT), Ok(Status::Optimal));
        assert_eq!(
            Status::decode("glp_get_status", GLP_NOFEAS).map(Status::as_str),
            Ok("no_feasible")
        );
        assert!(Status::decode("glp_get_status", 0).is_err());
        assert!(Status::Feasible.has_solution());
        assert!(!Status::Unbounded.has_solution());
    }

    #[test]
    fn test_basis_status_tags() {
        assert_eq!(BasisStatus::LowerBound.as_str(), "lower-bound");
        assert_eq!(BasisStatus::decode("glp_get_col_stat", GLP_NS), Ok(BasisStatus::Fixed));
        assert!(BasisStatus::Basic.is_basic());
    }

    #[test]
    fn test_return_codes_are_per_call() {
        // GLP_EFAIL means different things to different solvers.
        assert_eq!(SimplexReturn::from_code(GLP_EFAIL), Some(SimplexReturn::Failure));
        assert_eq!(InteriorReturn::from_code(GLP_EFAIL), Some(InteriorReturn::NoData));
        assert_eq!(IntoptReturn::from_code(GLP_EFAIL), Some(IntoptReturn::Failure));
        // Codes outside a call's table are rejected.
        assert_eq!(SimplexReturn::from_code(GLP_EROOT), None);
        assert_eq!(
            InteriorReturn::decode("glp_interior", GLP_ENOPFS),
            Err(DecodeError::UnknownCode {
                call: "glp_interior",
                code: GLP_ENOPFS
            })
        );
        assert_eq!(IntoptReturn::from_code(GLP_EMIPGAP), Some(IntoptReturn::MipGapTolerance));
    }

    #[test]
    fn test_return_code_union() {
        let code = ReturnCode::from(SimplexReturn::NoPrimalFeasible);
        assert_eq!(code.as_str(), "no_primal_feasible");
        assert_eq!(code.code(), GLP_ENOPFS);
        assert!(!code.is_ok());
        assert!(ReturnCode::from(IntoptReturn::Ok).is_ok());
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"no_primal_feasible\"");
    }
}
