//! Integer codes of the GLPK binary contract.
//!
//! These mirror the `#define`s of `glpk.h`. Semantic tags and the translation
//! between tags and codes live in `glpx-solver`; this module only names the
//! numbers that cross the ABI.

/// Objective direction.
pub const GLP_MIN: i32 = 1;
pub const GLP_MAX: i32 = 2;

/// Row/column bound types.
pub const GLP_FR: i32 = 1;
pub const GLP_LO: i32 = 2;
pub const GLP_UP: i32 = 3;
pub const GLP_DB: i32 = 4;
pub const GLP_FX: i32 = 5;

/// Basis status of a row or column.
pub const GLP_BS: i32 = 1;
pub const GLP_NL: i32 = 2;
pub const GLP_NU: i32 = 3;
pub const GLP_NF: i32 = 4;
pub const GLP_NS: i32 = 5;

/// Column kinds.
pub const GLP_CV: i32 = 1;
pub const GLP_IV: i32 = 2;
pub const GLP_BV: i32 = 3;

/// Solution status.
pub const GLP_UNDEF: i32 = 1;
pub const GLP_FEAS: i32 = 2;
pub const GLP_INFEAS: i32 = 3;
pub const GLP_NOFEAS: i32 = 4;
pub const GLP_OPT: i32 = 5;
pub const GLP_UNBND: i32 = 6;

/// Flags.
pub const GLP_OFF: i32 = 0;
pub const GLP_ON: i32 = 1;

/// Message levels.
pub const GLP_MSG_OFF: i32 = 0;
pub const GLP_MSG_ERR: i32 = 1;
pub const GLP_MSG_ON: i32 = 2;
pub const GLP_MSG_ALL: i32 = 3;
pub const GLP_MSG_DBG: i32 = 4;

/// Simplex method options.
pub const GLP_PRIMAL: i32 = 1;
pub const GLP_DUALP: i32 = 2;
pub const GLP_DUAL: i32 = 3;

/// Pricing techniques.
pub const GLP_PT_STD: i32 = 0x11;
pub const GLP_PT_PSE: i32 = 0x22;

/// Ratio tests.
pub const GLP_RT_STD: i32 = 0x11;
pub const GLP_RT_HAR: i32 = 0x22;
pub const GLP_RT_FLIP: i32 = 0x33;

/// Interior-point ordering algorithms.
pub const GLP_ORD_NONE: i32 = 0;
pub const GLP_ORD_QMD: i32 = 1;
pub const GLP_ORD_AMD: i32 = 2;
pub const GLP_ORD_SYMAMD: i32 = 3;

/// Branching techniques.
pub const GLP_BR_FFV: i32 = 1;
pub const GLP_BR_LFV: i32 = 2;
pub const GLP_BR_MFV: i32 = 3;
pub const GLP_BR_DTH: i32 = 4;
pub const GLP_BR_PCH: i32 = 5;

/// Backtracking techniques.
pub const GLP_BT_DFS: i32 = 1;
pub const GLP_BT_BFS: i32 = 2;
pub const GLP_BT_BLB: i32 = 3;
pub const GLP_BT_BPH: i32 = 4;

/// MIP preprocessing levels.
pub const GLP_PP_NONE: i32 = 0;
pub const GLP_PP_ROOT: i32 = 1;
pub const GLP_PP_ALL: i32 = 2;

/// MPS flavours.
pub const GLP_MPS_DECK: i32 = 1;
pub const GLP_MPS_FILE: i32 = 2;

/// Return codes of the solver entry points.
pub const GLP_OK: i32 = 0;
pub const GLP_EBADB: i32 = 0x01;
pub const GLP_ESING: i32 = 0x02;
pub const GLP_ECOND: i32 = 0x03;
pub const GLP_EBOUND: i32 = 0x04;
pub const GLP_EFAIL: i32 = 0x05;
pub const GLP_EOBJLL: i32 = 0x06;
pub const GLP_EOBJUL: i32 = 0x07;
pub const GLP_EITLIM: i32 = 0x08;
pub const GLP_ETMLIM: i32 = 0x09;
pub const GLP_ENOPFS: i32 = 0x0A;
pub const GLP_ENODFS: i32 = 0x0B;
pub const GLP_EROOT: i32 = 0x0C;
pub const GLP_ESTOP: i32 = 0x0D;
pub const GLP_EMIPGAP: i32 = 0x0E;
pub const GLP_ENOFEAS: i32 = 0x0F;
pub const GLP_ENOCVG: i32 = 0x10;
pub const GLP_EINSTAB: i32 = 0x11;
pub const GLP_EDATA: i32 = 0x12;
pub const GLP_ERANGE: i32 = 0x13;

/// Reasons the branch-and-cut driver calls back.
pub const GLP_IROWGEN: i32 = 0x01;
pub const GLP_IBINGO: i32 = 0x02;
pub const GLP_IHEUR: i32 = 0x03;
pub const GLP_ICUTGEN: i32 = 0x04;
pub const GLP_IBRANCH: i32 = 0x05;
pub const GLP_ISELECT: i32 = 0x06;
pub const GLP_IPREPRO: i32 = 0x07;

/// Branch selection for `glp_ios_branch_upon`.
pub const GLP_NO_BRNCH: i32 = 0;
pub const GLP_DN_BRNCH: i32 = 1;
pub const GLP_UP_BRNCH: i32 = 2;

/// Row origin flags reported by `glp_ios_row_attr`.
pub const GLP_RF_REG: i32 = 0;
pub const GLP_RF_LAZY: i32 = 1;
pub const GLP_RF_CUT: i32 = 2;

/// Cut classes reported by `glp_ios_row_attr`.
pub const GLP_RF_GMI: i32 = 1;
pub const GLP_RF_MIR: i32 = 2;
pub const GLP_RF_COV: i32 = 3;
pub const GLP_RF_CLQ: i32 = 4;

/// Longest row/column/problem name the engine accepts, in bytes.
pub const MAX_NAME_LEN: usize = 255;
