use glpx_abi::layout::smcp;
use glpx_abi::{AbiResult, Bridge};
use serde::{Deserialize, Serialize};

use super::{parse_double, parse_flag, parse_int, parse_tag};
use crate::error::ConfigError;
use crate::record::{ParamRecord, RecordKind};
use crate::tags::{MessageLevel, Method, Pricing, RatioTest};

/// Options of the simplex and exact simplex solvers (`glp_smcp`).
///
/// Time values are in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimplexOptions {
    pub msg_level: Option<MessageLevel>,
    pub method: Option<Method>,
    pub pricing: Option<Pricing>,
    pub ratio_test: Option<RatioTest>,
    /// Primal feasibility tolerance.
    pub tol_primal: Option<f64>,
    /// Dual feasibility tolerance.
    pub tol_dual: Option<f64>,
    pub tol_pivot: Option<f64>,
    /// Objective lower limit (dual simplex only).
    pub obj_lower: Option<f64>,
    /// Objective upper limit (dual simplex only).
    pub obj_upper: Option<f64>,
    pub iteration_limit: Option<i32>,
    pub time_limit: Option<i32>,
    pub log_frequency: Option<i32>,
    pub log_delay: Option<i32>,
    pub presolve: Option<bool>,
}

impl SimplexOptions {
    pub const KEYS: &'static [&'static str] = &[
        "msg_level",
        "method",
        "pricing",
        "ratio_test",
        "tol_primal",
        "tol_dual",
        "tol_pivot",
        "obj_lower",
        "obj_upper",
        "iteration_limit",
        "time_limit",
        "log_frequency",
        "log_delay",
        "presolve",
    ];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_msg_level(mut self, level: MessageLevel) -> Self {
        self.msg_level = Some(level);
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_pricing(mut self, pricing: Pricing) -> Self {
        self.pricing = Some(pricing);
        self
    }

    pub fn with_ratio_test(mut self, ratio_test: RatioTest) -> Self {
        self.ratio_test = Some(ratio_test);
        self
    }

    pub fn with_tol_primal(mut self, tol: f64) -> Self {
        self.tol_primal = Some(tol);
        self
    }

    pub fn with_tol_dual(mut self, tol: f64) -> Self {
        self.tol_dual = Some(tol);
        self
    }

    pub fn with_tol_pivot(mut self, tol: f64) -> Self {
        self.tol_pivot = Some(tol);
        self
    }

    pub fn with_obj_lower(mut self, limit: f64) -> Self {
        self.obj_lower = Some(limit);
        self
    }

    pub fn with_obj_upper(mut self, limit: f64) -> Self {
        self.obj_upper = Some(limit);
        self
    }

    pub fn with_iteration_limit(mut self, limit: i32) -> Self {
        self.iteration_limit = Some(limit);
        self
    }

    /// Set the time limit in milliseconds.
    pub fn with_time_limit(mut self, ms: i32) -> Self {
        self.time_limit = Some(ms);
        self
    }

    pub fn with_log_frequency(mut self, ms: i32) -> Self {
        self.log_frequency = Some(ms);
        self
    }

    pub fn with_log_delay(mut self, ms: i32) -> Self {
        self.log_delay = Some(ms);
        self
    }

    pub fn with_presolve(mut self, enabled: bool) -> Self {
        self.presolve = Some(enabled);
        self
    }

    /// Sets one option from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "msg_level" => self.msg_level = Some(parse_tag(value)?),
            "method" => self.method = Some(parse_tag(value)?),
            "pricing" => self.pricing = Some(parse_tag(value)?),
            "ratio_test" => self.ratio_test = Some(parse_tag(value)?),
            "tol_primal" => self.tol_primal = Some(parse_double("tol_primal", value)?),
            "tol_dual" => self.tol_dual = Some(parse_double("tol_dual", value)?),
            "tol_pivot" => self.tol_pivot = Some(parse_double("tol_pivot", value)?),
            "obj_lower" => self.obj_lower = Some(parse_double("obj_lower", value)?),
            "obj_upper" => self.obj_upper = Some(parse_double("obj_upper", value)?),
            "iteration_limit" => {
                self.iteration_limit = Some(parse_int("iteration_limit", value)?)
            }
            "time_limit" => self.time_limit = Some(parse_int("time_limit", value)?),
            "log_frequency" => self.log_frequency = Some(parse_int("log_frequency", value)?),
            "log_delay" => self.log_delay = Some(parse_int("log_delay", value)?),
            "presolve" => self.presolve = Some(parse_flag("presolve", value)?),
            _ => {
                return Err(ConfigError::UnknownOption {
                    solver: "simplex",
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Builds a `glp_smcp` with these options over the engine defaults.
    pub fn marshal<'a>(&self, bridge: &Bridge<'a>) -> AbiResult<ParamRecord<'a>> {
        let record = ParamRecord::new(bridge, RecordKind::Smcp)?;
        record.int_opt(smcp::MSG_LEV, self.msg_level.map(MessageLevel::code))?;
        record.int_opt(smcp::METH, self.method.map(Method::code))?;
        record.int_opt(smcp::PRICING, self.pricing.map(Pricing::code))?;
        record.int_opt(smcp::R_TEST, self.ratio_test.map(RatioTest::code))?;
        record.double_opt(smcp::TOL_BND, self.tol_primal)?;
        record.double_opt(smcp::TOL_DJ, self.tol_dual)?;
        record.double_opt(smcp::TOL_PIV, self.tol_pivot)?;
        record.double_opt(smcp::OBJ_LL, self.obj_lower)?;
        record.double_opt(smcp::OBJ_UL, self.obj_upper)?;
        record.int_opt(smcp::IT_LIM, self.iteration_limit)?;
        record.int_opt(smcp::TM_LIM, self.time_limit)?;
        record.int_opt(smcp::OUT_FRQ, self.log_frequency)?;
        record.int_opt(smcp::OUT_DLY, self.log_delay)?;
        record.flag_opt(smcp::PRESOLVE, self.presolve)?;
        Ok(record)
    }
}
