use glpx_abi::layout::iocp;
use glpx_abi::{AbiResult, Bridge};
use serde::{Deserialize, Serialize};

use super::{parse_double, parse_flag, parse_int, parse_tag};
use crate::error::{ConfigError, TreeError};
use crate::record::{ParamRecord, RecordKind};
use crate::tags::{Backtracking, Branching, MessageLevel, Preprocessing};
use crate::tree::{Tree, TreeCallback};

/// Options of the branch-and-cut solver (`glp_iocp`).
///
/// Time values are in milliseconds. Cut and heuristic switches are flags.
/// The search-tree callback is not part of the serialized options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntoptOptions {
    pub msg_level: Option<MessageLevel>,
    pub branching: Option<Branching>,
    pub backtracking: Option<Backtracking>,
    /// Integer feasibility tolerance.
    pub tol_integer: Option<f64>,
    /// Relative objective tolerance for pruning.
    pub tol_objective: Option<f64>,
    pub time_limit: Option<i32>,
    pub log_frequency: Option<i32>,
    pub log_delay: Option<i32>,
    pub preprocessing: Option<Preprocessing>,
    /// Relative MIP gap tolerance.
    pub mip_gap: Option<f64>,
    pub cuts_mir: Option<bool>,
    pub cuts_gomory: Option<bool>,
    pub cuts_cover: Option<bool>,
    pub cuts_clique: Option<bool>,
    pub presolve: Option<bool>,
    pub binarize: Option<bool>,
    /// Feasibility pump heuristic.
    pub heuristic_fp: Option<bool>,
    /// Proximity search heuristic.
    pub heuristic_ps: Option<bool>,
    pub proxy_time_limit: Option<i32>,
    /// Simple rounding heuristic.
    pub heuristic_rounding: Option<bool>,
    #[serde(skip)]
    pub callback: Option<TreeCallback>,
}

impl IntoptOptions {
    pub const KEYS: &'static [&'static str] = &[
        "msg_level",
        "branching",
        "backtracking",
        "tol_integer",
        "tol_objective",
        "time_limit",
        "log_frequency",
        "log_delay",
        "preprocessing",
        "mip_gap",
        "cuts_mir",
        "cuts_gomory",
        "cuts_cover",
        "cuts_clique",
        "presolve",
        "binarize",
        "heuristic_fp",
        "heuristic_ps",
        "proxy_time_limit",
        "heuristic_rounding",
    ];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_msg_level(mut self, level: MessageLevel) -> Self {
        self.msg_level = Some(level);
        self
    }

    pub fn with_branching(mut self, branching: Branching) -> Self {
        self.branching = Some(branching);
        self
    }

    pub fn with_backtracking(mut self, backtracking: Backtracking) -> Self {
        self.backtracking = Some(backtracking);
        self
    }

    pub fn with_tol_integer(mut self, tol: f64) -> Self {
        self.tol_integer = Some(tol);
        self
    }

    pub fn with_tol_objective(mut self, tol: f64) -> Self {
        self.tol_objective = Some(tol);
        self
    }

    /// Set the time limit in milliseconds.
    pub fn with_time_limit(mut self, ms: i32) -> Self {
        self.time_limit = Some(ms);
        self
    }

    pub fn with_preprocessing(mut self, preprocessing: Preprocessing) -> Self {
        self.preprocessing = Some(preprocessing);
        self
    }

    pub fn with_mip_gap(mut self, gap: f64) -> Self {
        self.mip_gap = Some(gap);
        self
    }

    /// Enables or disables all four cut families at once.
    pub fn with_cuts(mut self, enabled: bool) -> Self {
        self.cuts_mir = Some(enabled);
        self.cuts_gomory = Some(enabled);
        self.cuts_cover = Some(enabled);
        self.cuts_clique = Some(enabled);
        self
    }

    pub fn with_presolve(mut self, enabled: bool) -> Self {
        self.presolve = Some(enabled);
        self
    }

    pub fn with_binarize(mut self, enabled: bool) -> Self {
        self.binarize = Some(enabled);
        self
    }

    pub fn with_heuristic_fp(mut self, enabled: bool) -> Self {
        self.heuristic_fp = Some(enabled);
        self
    }

    pub fn with_heuristic_ps(mut self, enabled: bool) -> Self {
        self.heuristic_ps = Some(enabled);
        self
    }

    pub fn with_heuristic_rounding(mut self, enabled: bool) -> Self {
        self.heuristic_rounding = Some(enabled);
        self
    }

    /// Runs `callback` at every point the branch-and-cut driver offers one.
    /// An error from it stops the search and is returned from the solve.
    pub fn with_callback(
        mut self,
        callback: impl FnMut(&mut Tree<'_>) -> Result<(), TreeError> + 'static,
    ) -> Self {
        self.callback = Some(TreeCallback::new(callback));
        self
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "msg_level" => self.msg_level = Some(parse_tag(value)?),
            "branching" => self.branching = Some(parse_tag(value)?),
            "backtracking" => self.backtracking = Some(parse_tag(value)?),
            "tol_integer" => self.tol_integer = Some(parse_double("tol_integer", value)?),
            "tol_objective" => self.tol_objective = Some(parse_double("tol_objective", value)?),
            "time_limit" => self.time_limit = Some(parse_int("time_limit", value)?),
            "log_frequency" => self.log_frequency = Some(parse_int("log_frequency", value)?),
            "log_delay" => self.log_delay = Some(parse_int("log_delay", value)?),
            "preprocessing" => self.preprocessing = Some(parse_tag(value)?),
            "mip_gap" => self.mip_gap = Some(parse_double("mip_gap", value)?),
            "cuts_mir" => self.cuts_mir = Some(parse_flag("cuts_mir", value)?),
            "cuts_gomory" => self.cuts_gomory = Some(parse_flag("cuts_gomory", value)?),
            "cuts_cover" => self.cuts_cover = Some(parse_flag("cuts_cover", value)?),
            "cuts_clique" => self.cuts_clique = Some(parse_flag("cuts_clique", value)?),
            "presolve" => self.presolve = Some(parse_flag("presolve", value)?),
            "binarize" => self.binarize = Some(parse_flag("binarize", value)?),
            "heuristic_fp" => self.heuristic_fp = Some(parse_flag("heuristic_fp", value)?),
            "heuristic_ps" => self.heuristic_ps = Some(parse_flag("heuristic_ps", value)?),
            "proxy_time_limit" => {
                self.proxy_time_limit = Some(parse_int("proxy_time_limit", value)?)
            }
            "heuristic_rounding" => {
                self.heuristic_rounding = Some(parse_flag("heuristic_rounding", value)?)
            }
            _ => {
                return Err(ConfigError::UnknownOption {
                    solver: "intopt",
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn marshal<'a>(&self, bridge: &Bridge<'a>) -> AbiResult<ParamRecord<'a>> {
        let record = ParamRecord::new(bridge, RecordKind::Iocp)?;
        record.int_opt(iocp::MSG_LEV, self.msg_level.map(MessageLevel::code))?;
        record.int_opt(iocp::BR_TECH, self.branching.map(Branching::code))?;
        record.int_opt(iocp::BT_TECH, self.backtracking.map(Backtracking::code))?;
        record.double_opt(iocp::TOL_INT, self.tol_integer)?;
        record.double_opt(iocp::TOL_OBJ, self.tol_objective)?;
        record.int_opt(iocp::TM_LIM, self.time_limit)?;
        record.int_opt(iocp::OUT_FRQ, self.log_frequency)?;
        record.int_opt(iocp::OUT_DLY, self.log_delay)?;
        record.int_opt(iocp::PP_TECH, self.preprocessing.map(Preprocessing::code))?;
        record.double_opt(iocp::MIP_GAP, self.mip_gap)?;
        record.flag_opt(iocp::MIR_CUTS, self.cuts_mir)?;
        record.flag_opt(iocp::GMI_CUTS, self.cuts_gomory)?;
        record.flag_opt(iocp::COV_CUTS, self.cuts_cover)?;
        record.flag_opt(iocp::CLQ_CUTS, self.cuts_clique)?;
        record.flag_opt(iocp::PRESOLVE, self.presolve)?;
        record.flag_opt(iocp::BINARIZE, self.binarize)?;
        record.flag_opt(iocp::FP_HEUR, self.heuristic_fp)?;
        record.flag_opt(iocp::PS_HEUR, self.heuristic_ps)?;
        record.int_opt(iocp::PS_TM_LIM, self.proxy_time_limit)?;
        record.flag_opt(iocp::SR_HEUR, self.heuristic_rounding)?;
        Ok(record)
    }
}
