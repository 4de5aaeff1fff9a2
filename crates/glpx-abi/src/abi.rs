//! The engine's binary contract as a trait.
//!
//! Every GLPK entry point the binding uses appears here with integer handles in
//! place of raw pointers: a [`RawProb`] names a problem object and a [`Ptr`]
//! names an address inside engine-visible memory obtained from [`Abi::malloc`].
//! Implementations validate both against their own registries, so a stale or
//! foreign handle yields an error instead of touching memory.

use crate::error::AbiResult;

/// Opaque problem handle. Not `Clone`: exactly one owner deletes it.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct RawProb(pub(crate) usize);

impl RawProb {
    /// Address of the underlying engine object (for logging only).
    pub fn addr(&self) -> usize {
        self.0
    }
}

/// Search tree handed to a branch-and-cut callback.
///
/// Only valid while the callback that received it runs. Not `Clone`, so it
/// cannot outlive the borrow the callback gets.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct RawTree(pub(crate) usize);

impl RawTree {
    /// Address of the underlying engine object (for logging only).
    pub fn addr(&self) -> usize {
        self.0
    }
}

/// Address inside engine-visible memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ptr(pub(crate) usize);

impl Ptr {
    pub fn addr(self) -> usize {
        self.0
    }

    /// The address `offset` bytes past this one.
    pub fn offset(self, offset: usize) -> Ptr {
        Ptr(self.0 + offset)
    }
}

/// Low-level access to a GLPK-compatible engine.
///
/// Row and column indices are 1-based as in GLPK. Implementations do not check
/// index ranges: the engine aborts the process on a bad index, so callers
/// (see [`crate::Problem`]) validate before calling.
pub trait Abi {
    /// Version string reported by the engine.
    fn version(&self) -> String;
    /// Enables or disables the engine's terminal output.
    fn term_out(&self, on: bool);

    // Memory.
    fn malloc(&self, size: usize) -> AbiResult<Ptr>;
    fn free(&self, ptr: Ptr) -> AbiResult<()>;
    fn write_bytes(&self, ptr: Ptr, bytes: &[u8]) -> AbiResult<()>;
    fn read_bytes(&self, ptr: Ptr, len: usize) -> AbiResult<Vec<u8>>;
    /// Number of allocations made through [`Abi::malloc`] and not yet freed.
    fn live_allocations(&self) -> usize;

    // Problem objects.
    fn create_prob(&self) -> AbiResult<RawProb>;
    fn delete_prob(&self, prob: RawProb) -> AbiResult<()>;
    fn set_prob_name(&self, prob: &RawProb, name: Ptr) -> AbiResult<()>;
    fn get_prob_name(&self, prob: &RawProb) -> AbiResult<Option<String>>;
    fn set_obj_dir(&self, prob: &RawProb, dir: i32) -> AbiResult<()>;
    fn get_obj_dir(&self, prob: &RawProb) -> AbiResult<i32>;

    // Rows and columns.
    fn add_rows(&self, prob: &RawProb, count: i32) -> AbiResult<i32>;
    fn add_cols(&self, prob: &RawProb, count: i32) -> AbiResult<i32>;
    fn set_row_name(&self, prob: &RawProb, i: i32, name: Ptr) -> AbiResult<()>;
    fn set_col_name(&self, prob: &RawProb, j: i32, name: Ptr) -> AbiResult<()>;
    fn get_row_name(&self, prob: &RawProb, i: i32) -> AbiResult<Option<String>>;
    fn get_col_name(&self, prob: &RawProb, j: i32) -> AbiResult<Option<String>>;
    fn set_row_bnds(&self, prob: &RawProb, i: i32, kind: i32, lb: f64, ub: f64)
        -> AbiResult<()>;
    fn set_col_bnds(&self, prob: &RawProb, j: i32, kind: i32, lb: f64, ub: f64)
        -> AbiResult<()>;
    fn get_row_type(&self, prob: &RawProb, i: i32) -> AbiResult<i32>;
    fn get_row_lb(&self, prob: &RawProb, i: i32) -> AbiResult<f64>;
    fn get_row_ub(&self, prob: &RawProb, i: i32) -> AbiResult<f64>;
    fn get_col_type(&self, prob: &RawProb, j: i32) -> AbiResult<i32>;
    fn get_col_lb(&self, prob: &RawProb, j: i32) -> AbiResult<f64>;
    fn get_col_ub(&self, prob: &RawProb, j: i32) -> AbiResult<f64>;
    fn set_obj_coef(&self, prob: &RawProb, j: i32, coef: f64) -> AbiResult<()>;
    fn get_obj_coef(&self, prob: &RawProb, j: i32) -> AbiResult<f64>;
    fn set_col_kind(&self, prob: &RawProb, j: i32, kind: i32) -> AbiResult<()>;
    fn get_col_kind(&self, prob: &RawProb, j: i32) -> AbiResult<i32>;

    // Constraint matrix. `ind` and `val` point at 1-based arrays, slot 0 unused.
    fn set_mat_row(&self, prob: &RawProb, i: i32, len: i32, ind: Ptr, val: Ptr)
        -> AbiResult<()>;
    fn get_mat_row(&self, prob: &RawProb, i: i32, ind: Ptr, val: Ptr) -> AbiResult<i32>;
    fn get_num_rows(&self, prob: &RawProb) -> AbiResult<i32>;
    fn get_num_cols(&self, prob: &RawProb) -> AbiResult<i32>;
    fn get_num_nz(&self, prob: &RawProb) -> AbiResult<i32>;
    fn get_num_int(&self, prob: &RawProb) -> AbiResult<i32>;
    fn get_num_bin(&self, prob: &RawProb) -> AbiResult<i32>;

    // Control records and solvers.
    fn init_smcp(&self, parm: Ptr) -> AbiResult<()>;
    fn init_iptcp(&self, parm: Ptr) -> AbiResult<()>;
    fn init_iocp(&self, parm: Ptr) -> AbiResult<()>;
    fn simplex(&self, prob: &RawProb, parm: Ptr) -> AbiResult<i32>;
    fn exact(&self, prob: &RawProb, parm: Ptr) -> AbiResult<i32>;
    fn interior(&self, prob: &RawProb, parm: Ptr) -> AbiResult<i32>;
    /// Runs branch-and-cut, calling `callback` at every point the driver
    /// offers one.
    fn intopt(
        &self,
        prob: &RawProb,
        parm: Ptr,
        callback: Option<&mut dyn FnMut(&RawTree)>,
    ) -> AbiResult<i32>;

    // Search tree, usable only from inside an `intopt` callback. Node
    // arguments are reference numbers the tree itself handed out; the engine
    // aborts on any other, so callers validate first.
    fn ios_reason(&self, tree: &RawTree) -> AbiResult<i32>;
    /// Rows and columns of the problem the tree is solving.
    fn ios_problem_size(&self, tree: &RawTree) -> AbiResult<(i32, i32)>;
    /// Fills a `glp_attr` record at `attr`.
    fn ios_row_attr(&self, tree: &RawTree, i: i32, attr: Ptr) -> AbiResult<()>;
    fn ios_mip_gap(&self, tree: &RawTree) -> AbiResult<f64>;
    /// Offers the 1-based column values at `x`; 0 means accepted.
    fn ios_heur_sol(&self, tree: &RawTree, x: Ptr) -> AbiResult<i32>;
    fn ios_can_branch(&self, tree: &RawTree, j: i32) -> AbiResult<bool>;
    fn ios_branch_upon(&self, tree: &RawTree, j: i32, sel: i32) -> AbiResult<()>;
    fn ios_select_node(&self, tree: &RawTree, p: i32) -> AbiResult<()>;
    fn ios_terminate(&self, tree: &RawTree) -> AbiResult<()>;
    /// Active, current and total node counts.
    fn ios_tree_size(&self, tree: &RawTree) -> AbiResult<(i32, i32, i32)>;
    fn ios_curr_node(&self, tree: &RawTree) -> AbiResult<i32>;
    fn ios_best_node(&self, tree: &RawTree) -> AbiResult<i32>;
    fn ios_next_node(&self, tree: &RawTree, p: i32) -> AbiResult<i32>;
    fn ios_prev_node(&self, tree: &RawTree, p: i32) -> AbiResult<i32>;
    fn ios_up_node(&self, tree: &RawTree, p: i32) -> AbiResult<i32>;
    fn ios_node_level(&self, tree: &RawTree, p: i32) -> AbiResult<i32>;
    fn ios_node_bound(&self, tree: &RawTree, p: i32) -> AbiResult<f64>;
    fn ios_pool_size(&self, tree: &RawTree) -> AbiResult<i32>;
    fn ios_clear_pool(&self, tree: &RawTree) -> AbiResult<()>;

    // Basic solution.
    fn get_status(&self, prob: &RawProb) -> AbiResult<i32>;
    fn get_prim_stat(&self, prob: &RawProb) -> AbiResult<i32>;
    fn get_dual_stat(&self, prob: &RawProb) -> AbiResult<i32>;
    fn get_obj_val(&self, prob: &RawProb) -> AbiResult<f64>;
    fn get_row_stat(&self, prob: &RawProb, i: i32) -> AbiResult<i32>;
    fn get_row_prim(&self, prob: &RawProb, i: i32) -> AbiResult<f64>;
    fn get_row_dual(&self, prob: &RawProb, i: i32) -> AbiResult<f64>;
    fn get_col_stat(&self, prob: &RawProb, j: i32) -> AbiResult<i32>;
    fn get_col_prim(&self, prob: &RawProb, j: i32) -> AbiResult<f64>;
    fn get_col_dual(&self, prob: &RawProb, j: i32) -> AbiResult<f64>;
    fn get_unbnd_ray(&self, prob: &RawProb) -> AbiResult<i32>;

    // Interior-point solution.
    fn ipt_status(&self, prob: &RawProb) -> AbiResult<i32>;
    fn ipt_obj_val(&self, prob: &RawProb) -> AbiResult<f64>;
    fn ipt_row_prim(&self, prob: &RawProb, i: i32) -> AbiResult<f64>;
    fn ipt_row_dual(&self, prob: &RawProb, i: i32) -> AbiResult<f64>;
    fn ipt_col_prim(&self, prob: &RawProb, j: i32) -> AbiResult<f64>;
    fn ipt_col_dual(&self, prob: &RawProb, j: i32) -> AbiResult<f64>;

    // Integer solution.
    fn mip_status(&self, prob: &RawProb) -> AbiResult<i32>;
    fn mip_obj_val(&self, prob: &RawProb) -> AbiResult<f64>;
    fn mip_row_val(&self, prob: &RawProb, i: i32) -> AbiResult<f64>;
    fn mip_col_val(&self, prob: &RawProb, j: i32) -> AbiResult<f64>;

    // Basis factorization and tableau.
    fn bf_exists(&self, prob: &RawProb) -> AbiResult<bool>;
    fn eval_tab_row(&self, prob: &RawProb, k: i32, ind: Ptr, val: Ptr) -> AbiResult<i32>;
    fn eval_tab_col(&self, prob: &RawProb, k: i32, ind: Ptr, val: Ptr) -> AbiResult<i32>;

    // Files. `fname` points at a NUL-terminated path.
    fn write_lp(&self, prob: &RawProb, fname: Ptr) -> AbiResult<i32>;
    fn read_lp(&self, prob: &RawProb, fname: Ptr) -> AbiResult<i32>;
    fn write_mps(&self, prob: &RawProb, fmt: i32, fname: Ptr) -> AbiResult<i32>;
    fn read_mps(&self, prob: &RawProb, fmt: i32, fname: Ptr) -> AbiResult<i32>;
}
