//! Semantic tags and their engine codes.
//!
//! Each tag enum knows its code, its canonical string and the aliases it
//! accepts. Forward lookups (tag to code) are total; reverse lookups are
//! per call and fail with [`DecodeError::UnknownCode`] on an unmapped code.

use std::str::FromStr;

use glpx_abi::codes::*;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, DecodeError};

macro_rules! tags {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($option:literal) {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $code:expr => $tag:literal $(| $alias:literal)*,
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "&'static str")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)*
        }

        impl $name {
            /// Option or quantity name used in error messages.
            pub const OPTION: &'static str = $option;

            /// Every value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            /// Engine code.
            pub fn code(self) -> i32 {
                match self {
                    $($name::$variant => $code,)*
                }
            }

            /// Canonical tag.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $tag,)*
                }
            }

            /// Reverse lookup; `None` when no value carries `code`.
            pub fn from_code(code: i32) -> Option<Self> {
                Self::ALL.iter().copied().find(|value| value.code() == code)
            }

            /// Reverse lookup for the result of `call`.
            pub fn decode(call: &'static str, code: i32) -> Result<Self, DecodeError> {
                Self::from_code(code).ok_or(DecodeError::UnknownCode { call, code })
            }
        }

        impl FromStr for $name {
            type Err = ConfigError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($tag $(| $alias)* => Ok($name::$variant),)*
                    _ => Err(ConfigError::UnknownValue {
                        option: $option,
                        value: value.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ConfigError;

            fn try_from(value: String) -> Result<Self, ConfigError> {
                value.parse()
            }
        }

        impl From<$name> for &'static str {
            fn from(value: $name) -> Self {
                value.as_str()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use tags;

tags! {
    /// Engine verbosity.
    pub enum MessageLevel ("msg_level") {
        Off = GLP_MSG_OFF => "off",
        Error = GLP_MSG_ERR => "error" | "err",
        On = GLP_MSG_ON => "on",
        All = GLP_MSG_ALL => "all",
        Debug = GLP_MSG_DBG => "debug" | "dbg",
    }
}

tags! {
    /// Simplex phase strategy.
    pub enum Method ("method") {
        Primal = GLP_PRIMAL => "primal",
        Dual = GLP_DUAL => "dual",
        /// Dual simplex, falling back to primal on failure.
        DualPrimal = GLP_DUALP => "dual_primal" | "dualp",
    }
}

tags! {
    pub enum Pricing ("pricing") {
        Standard = GLP_PT_STD => "std" | "standard",
        /// Projected steepest edge.
        SteepestEdge = GLP_PT_PSE => "pse",
    }
}

tags! {
    pub enum RatioTest ("ratio_test") {
        Standard = GLP_RT_STD => "std" | "standard",
        Harris = GLP_RT_HAR => "harris" | "har",
        FlipFlop = GLP_RT_FLIP => "flipflop" | "flip",
    }
}

tags! {
    /// Interior-point column ordering.
    pub enum Ordering ("ordering") {
        None = GLP_ORD_NONE => "none",
        Qmd = GLP_ORD_QMD => "qmd",
        Amd = GLP_ORD_AMD => "amd",
        Symamd = GLP_ORD_SYMAMD => "symamd",
    }
}

tags! {
    /// Branching variable selection.
    pub enum Branching ("branching") {
        FirstFractional = GLP_BR_FFV => "ffv" | "first_fractional",
        LastFractional = GLP_BR_LFV => "lfv" | "last_fractional",
        MostFractional = GLP_BR_MFV => "mfv" | "most_fractional",
        DriebeckTomlin = GLP_BR_DTH => "dth" | "driebeck_tomlin",
        HybridPseudocost = GLP_BR_PCH => "pch" | "hybrid_pseudocost",
    }
}

tags! {
    /// Active-node selection.
    pub enum Backtracking ("backtracking") {
        DepthFirst = GLP_BT_DFS => "dfs" | "depth_first",
        BreadthFirst = GLP_BT_BFS => "bfs" | "breadth_first",
        BestBound = GLP_BT_BLB => "blb" | "best_bound",
        BestProjection = GLP_BT_BPH => "bph" | "best_projection",
    }
}

tags! {
    /// MIP preprocessing level.
    pub enum Preprocessing ("preprocessing") {
        None = GLP_PP_NONE => "none",
        Root = GLP_PP_ROOT => "root",
        All = GLP_PP_ALL => "all",
    }
}

tags! {
    pub enum VariableKind ("kind") {
        Continuous = GLP_CV => "continuous" | "c" | "cont",
        Integer = GLP_IV => "integer" | "i" | "int",
        Binary = GLP_BV => "binary" | "b" | "bin",
    }
}

tags! {
    /// Which bounds of a row or column are finite.
    pub enum BoundKind ("bound kind") {
        Free = GLP_FR => "free",
        Lower = GLP_LO => "lower",
        Upper = GLP_UP => "upper",
        Double = GLP_DB => "double",
        Fixed = GLP_FX => "fixed",
    }
}

tags! {
    /// Objective direction.
    pub enum Sense ("sense") {
        Minimize = GLP_MIN => "min" | "minimize",
        Maximize = GLP_MAX => "max" | "maximize",
    }
}

tags! {
    /// MPS dialect.
    pub enum MpsFormat ("mps format") {
        /// Fixed-column MPS.
        Deck = GLP_MPS_DECK => "deck" | "fixed",
        /// Free MPS.
        File = GLP_MPS_FILE => "file" | "free",
    }
}

tags! {
    /// Why the branch-and-cut driver called back.
    pub enum Reason ("callback reason") {
        /// Lazy constraints may be added.
        RowGeneration = GLP_IROWGEN => "row",
        /// A better integer feasible solution was found.
        Improved = GLP_IBINGO => "improved" | "bingo",
        Heuristic = GLP_IHEUR => "heuristic",
        CutGeneration = GLP_ICUTGEN => "cut",
        Branch = GLP_IBRANCH => "branch",
        Select = GLP_ISELECT => "select",
        Preprocessing = GLP_IPREPRO => "preprocessing",
    }
}

tags! {
    /// Where a row of the current subproblem came from.
    pub enum RowOrigin ("row origin") {
        Regular = GLP_RF_REG => "regular",
        Lazy = GLP_RF_LAZY => "lazy",
        Cut = GLP_RF_CUT => "cut",
    }
}

tags! {
    /// Family of a cutting plane.
    pub enum RowClass ("row class") {
        Gomory = GLP_RF_GMI => "gomory",
        Mir = GLP_RF_MIR => "mir",
        Cover = GLP_RF_COV => "cover",
        Clique = GLP_RF_CLQ => "clique",
    }
}

tags! {
    /// Which child of a branch the search visits first.
    pub enum BranchDirection ("branch direction") {
        Down = GLP_DN_BRNCH => "down",
        Up = GLP_UP_BRNCH => "up",
        /// Left to the driver's backtracking heuristic.
        General = GLP_NO_BRNCH => "general" | "auto",
    }
}

impl Default for Sense {
    fn default() -> Self {
        Sense::Minimize
    }
}

impl Default for VariableKind {
    fn default() -> Self {
        VariableKind::Continuous
    }
}

impl Default for MpsFormat {
    fn default() -> Self {
        MpsFormat::File
    }
}

impl BoundKind {
    /// Classifies a bound pair by presence and equality.
    ///
    /// Inverted pairs classify as double-bounded; the engine reports them when
    /// solving.
    #[allow(clippy::float_cmp)]
    pub fn classify(lower: Option<f64>, upper: Option<f64>) -> Self {
        match (lower, upper) {
            (None, None) => BoundKind::Free,
            (Some(_), None) => BoundKind::Lower,
            (None, Some(_)) => BoundKind::Upper,
            (Some(lb), Some(ub)) if lb == ub => BoundKind::Fixed,
            (Some(_), Some(_)) => BoundKind::Double,
        }
    }

    pub fn has_lower(self) -> bool {
        matches!(self, BoundKind::Lower | BoundKind::Double | BoundKind::Fixed)
    }

    pub fn has_upper(self) -> bool {
        matches!(self, BoundKind::Upper | BoundKind::Double | BoundKind::Fixed)
    }
}
