//! Byte layouts of the engine's control records.
//!
//! The records are mirrored as `#[repr(C)]` structs so field offsets follow the
//! target's C ABI; only the offsets and sizes are used, the structs are never
//! instantiated.

use std::ffi::{c_char, c_int, c_void};
use std::mem::{offset_of, size_of};

/// Encoding of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// Signed C `int`.
    I32,
    /// IEEE double.
    F64,
    /// On/off switch stored as a C `int` holding 0 or 1.
    Flag,
}

impl Width {
    /// Bytes occupied by a field of this width.
    pub const fn size(self) -> usize {
        match self {
            Width::I32 | Width::Flag => size_of::<c_int>(),
            Width::F64 => size_of::<f64>(),
        }
    }
}

/// One addressable field of a control record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub offset: usize,
    pub width: Width,
}

macro_rules! field {
    ($record:ty, $name:ident, $width:ident) => {
        Field {
            name: stringify!($name),
            offset: offset_of!($record, $name),
            width: Width::$width,
        }
    };
}

#[repr(C)]
#[allow(dead_code)]
struct Smcp {
    msg_lev: c_int,
    meth: c_int,
    pricing: c_int,
    r_test: c_int,
    tol_bnd: f64,
    tol_dj: f64,
    tol_piv: f64,
    obj_ll: f64,
    obj_ul: f64,
    it_lim: c_int,
    tm_lim: c_int,
    out_frq: c_int,
    out_dly: c_int,
    presolve: c_int,
    excl: c_int,
    shift: c_int,
    aorn: c_int,
    foo_bar: [f64; 33],
}

#[repr(C)]
#[allow(dead_code)]
struct Iptcp {
    msg_lev: c_int,
    ord_alg: c_int,
    foo_bar: [f64; 48],
}

#[repr(C)]
#[allow(dead_code)]
struct Iocp {
    msg_lev: c_int,
    br_tech: c_int,
    bt_tech: c_int,
    tol_int: f64,
    tol_obj: f64,
    tm_lim: c_int,
    out_frq: c_int,
    out_dly: c_int,
    cb_func: Option<unsafe extern "C" fn(*mut c_void, *mut c_void)>,
    cb_info: *mut c_void,
    cb_size: c_int,
    pp_tech: c_int,
    mip_gap: f64,
    mir_cuts: c_int,
    gmi_cuts: c_int,
    cov_cuts: c_int,
    clq_cuts: c_int,
    presolve: c_int,
    binarize: c_int,
    fp_heur: c_int,
    ps_heur: c_int,
    ps_tm_lim: c_int,
    sr_heur: c_int,
    use_sol: c_int,
    save_sol: *const c_char,
    alien: c_int,
    flip: c_int,
    foo_bar: [f64; 23],
}

#[repr(C)]
#[allow(dead_code)]
struct Attr {
    level: c_int,
    origin: c_int,
    klass: c_int,
    foo_bar: [f64; 7],
}

/// `glp_smcp`, the simplex and exact simplex control record.
pub mod smcp {
    use super::*;

    pub const SIZE: usize = size_of::<Smcp>();

    pub const MSG_LEV: Field = field!(Smcp, msg_lev, I32);
    pub const METH: Field = field!(Smcp, meth, I32);
    pub const PRICING: Field = field!(Smcp, pricing, I32);
    pub const R_TEST: Field = field!(Smcp, r_test, I32);
    pub const TOL_BND: Field = field!(Smcp, tol_bnd, F64);
    pub const TOL_DJ: Field = field!(Smcp, tol_dj, F64);
    pub const TOL_PIV: Field = field!(Smcp, tol_piv, F64);
    pub const OBJ_LL: Field = field!(Smcp, obj_ll, F64);
    pub const OBJ_UL: Field = field!(Smcp, obj_ul, F64);
    pub const IT_LIM: Field = field!(Smcp, it_lim, I32);
    pub const TM_LIM: Field = field!(Smcp, tm_lim, I32);
    pub const OUT_FRQ: Field = field!(Smcp, out_frq, I32);
    pub const OUT_DLY: Field = field!(Smcp, out_dly, I32);
    pub const PRESOLVE: Field = field!(Smcp, presolve, Flag);
}

/// `glp_iptcp`, the interior-point control record.
pub mod iptcp {
    use super::*;

    pub const SIZE: usize = size_of::<Iptcp>();

    pub const MSG_LEV: Field = field!(Iptcp, msg_lev, I32);
    pub const ORD_ALG: Field = field!(Iptcp, ord_alg, I32);
}

/// `glp_iocp`, the branch-and-cut control record.
pub mod iocp {
    use super::*;

    pub const SIZE: usize = size_of::<Iocp>();

    pub const MSG_LEV: Field = field!(Iocp, msg_lev, I32);
    pub const BR_TECH: Field = field!(Iocp, br_tech, I32);
    pub const BT_TECH: Field = field!(Iocp, bt_tech, I32);
    pub const TOL_INT: Field = field!(Iocp, tol_int, F64);
    pub const TOL_OBJ: Field = field!(Iocp, tol_obj, F64);
    pub const TM_LIM: Field = field!(Iocp, tm_lim, I32);
    pub const OUT_FRQ: Field = field!(Iocp, out_frq, I32);
    pub const OUT_DLY: Field = field!(Iocp, out_dly, I32);
    pub const PP_TECH: Field = field!(Iocp, pp_tech, I32);
    pub const MIP_GAP: Field = field!(Iocp, mip_gap, F64);
    pub const MIR_CUTS: Field = field!(Iocp, mir_cuts, Flag);
    pub const GMI_CUTS: Field = field!(Iocp, gmi_cuts, Flag);
    pub const COV_CUTS: Field = field!(Iocp, cov_cuts, Flag);
    pub const CLQ_CUTS: Field = field!(Iocp, clq_cuts, Flag);
    pub const PRESOLVE: Field = field!(Iocp, presolve, Flag);
    pub const BINARIZE: Field = field!(Iocp, binarize, Flag);
    pub const FP_HEUR: Field = field!(Iocp, fp_heur, Flag);
    pub const PS_HEUR: Field = field!(Iocp, ps_heur, Flag);
    pub const PS_TM_LIM: Field = field!(Iocp, ps_tm_lim, I32);
    pub const SR_HEUR: Field = field!(Iocp, sr_heur, Flag);

    /// Offset of the callback function pointer.
    pub const CB_FUNC: usize = offset_of!(Iocp, cb_func);
    /// Offset of the opaque pointer handed back to the callback.
    pub const CB_INFO: usize = offset_of!(Iocp, cb_info);
}

/// `glp_attr`, the row attributes filled by `glp_ios_row_attr`.
pub mod attr {
    use super::*;

    pub const SIZE: usize = size_of::<Attr>();

    pub const LEVEL: Field = field!(Attr, level, I32);
    pub const ORIGIN: Field = field!(Attr, origin, I32);
    pub const KLASS: Field = field!(Attr, klass, I32);
}
