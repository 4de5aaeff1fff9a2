//! GLPK loaded at runtime from its shared library.
//!
//! This module contains unsafe code for interacting with the C library.
#![allow(unsafe_code)]

use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::any::Any;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::ffi::{c_char, c_int, c_void, CStr};
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::path::Path;
use std::ptr::NonNull;

use libloading::{Library, Symbol};
use tracing::{debug, trace, warn};

use crate::abi::{Abi, Ptr, RawProb, RawTree};
use crate::error::{AbiError, AbiResult, EngineError};
use crate::layout::{attr, iocp, iptcp, smcp};

type Prob = *mut c_void;
type TreePtr = *mut c_void;
type CallbackFn = unsafe extern "C" fn(TreePtr, *mut c_void);

#[cfg(target_os = "windows")]
const DEFAULT_NAMES: &[&str] = &["glpk.dll", "glpk_5_0.dll", "glpk_4_65.dll"];
#[cfg(target_os = "macos")]
const DEFAULT_NAMES: &[&str] = &["libglpk.dylib", "libglpk.40.dylib"];
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const DEFAULT_NAMES: &[&str] = &["libglpk.so.40", "libglpk.so"];

unsafe fn load_symbol<T: Copy>(lib: &Library, name: &'static str) -> Result<T, EngineError> {
    let symbol: Symbol<'_, T> =
        lib.get(name.as_bytes())
            .map_err(|_| EngineError::SymbolMissing {
                symbol: name.trim_end_matches('\0').to_string(),
            })?;
    Ok(*symbol)
}

macro_rules! glpk_api {
    ($($name:ident: fn($($arg:ty),*) $(-> $ret:ty)?;)*) => {
        struct Api {
            $($name: unsafe extern "C" fn($($arg),*) $(-> $ret)?,)*
        }

        impl Api {
            unsafe fn load(lib: &Library) -> Result<Self, EngineError> {
                Ok(Self {
                    $($name: load_symbol(lib, concat!("glp_", stringify!($name), "\0"))?,)*
                })
            }
        }
    };
}

glpk_api! {
    version: fn() -> *const c_char;
    term_out: fn(c_int) -> c_int;
    create_prob: fn() -> Prob;
    delete_prob: fn(Prob);
    set_prob_name: fn(Prob, *const c_char);
    get_prob_name: fn(Prob) -> *const c_char;
    set_obj_dir: fn(Prob, c_int);
    get_obj_dir: fn(Prob) -> c_int;
    add_rows: fn(Prob, c_int) -> c_int;
    add_cols: fn(Prob, c_int) -> c_int;
    set_row_name: fn(Prob, c_int, *const c_char);
    set_col_name: fn(Prob, c_int, *const c_char);
    get_row_name: fn(Prob, c_int) -> *const c_char;
    get_col_name: fn(Prob, c_int) -> *const c_char;
    set_row_bnds: fn(Prob, c_int, c_int, f64, f64);
    set_col_bnds: fn(Prob, c_int, c_int, f64, f64);
    get_row_type: fn(Prob, c_int) -> c_int;
    get_row_lb: fn(Prob, c_int) -> f64;
    get_row_ub: fn(Prob, c_int) -> f64;
    get_col_type: fn(Prob, c_int) -> c_int;
    get_col_lb: fn(Prob, c_int) -> f64;
    get_col_ub: fn(Prob, c_int) -> f64;
    set_obj_coef: fn(Prob, c_int, f64);
    get_obj_coef: fn(Prob, c_int) -> f64;
    set_col_kind: fn(Prob, c_int, c_int);
    get_col_kind: fn(Prob, c_int) -> c_int;
    set_mat_row: fn(Prob, c_int, c_int, *const c_int, *const f64);
    get_mat_row: fn(Prob, c_int, *mut c_int, *mut f64) -> c_int;
    get_num_rows: fn(Prob) -> c_int;
    get_num_cols: fn(Prob) -> c_int;
    get_num_nz: fn(Prob) -> c_int;
    get_num_int: fn(Prob) -> c_int;
    get_num_bin: fn(Prob) -> c_int;
    init_smcp: fn(*mut c_void);
    init_iptcp: fn(*mut c_void);
    init_iocp: fn(*mut c_void);
    simplex: fn(Prob, *const c_void) -> c_int;
    exact: fn(Prob, *const c_void) -> c_int;
    interior: fn(Prob, *const c_void) -> c_int;
    intopt: fn(Prob, *const c_void) -> c_int;
    get_status: fn(Prob) -> c_int;
    get_prim_stat: fn(Prob) -> c_int;
    get_dual_stat: fn(Prob) -> c_int;
    get_obj_val: fn(Prob) -> f64;
    get_row_stat: fn(Prob, c_int) -> c_int;
    get_row_prim: fn(Prob, c_int) -> f64;
    get_row_dual: fn(Prob, c_int) -> f64;
    get_col_stat: fn(Prob, c_int) -> c_int;
    get_col_prim: fn(Prob, c_int) -> f64;
    get_col_dual: fn(Prob, c_int) -> f64;
    get_unbnd_ray: fn(Prob) -> c_int;
    ipt_status: fn(Prob) -> c_int;
    ipt_obj_val: fn(Prob) -> f64;
    ipt_row_prim: fn(Prob, c_int) -> f64;
    ipt_row_dual: fn(Prob, c_int) -> f64;
    ipt_col_prim: fn(Prob, c_int) -> f64;
    ipt_col_dual: fn(Prob, c_int) -> f64;
    mip_status: fn(Prob) -> c_int;
    mip_obj_val: fn(Prob) -> f64;
    mip_row_val: fn(Prob, c_int) -> f64;
    mip_col_val: fn(Prob, c_int) -> f64;
    bf_exists: fn(Prob) -> c_int;
    eval_tab_row: fn(Prob, c_int, *mut c_int, *mut f64) -> c_int;
    eval_tab_col: fn(Prob, c_int, *mut c_int, *mut f64) -> c_int;
    write_lp: fn(Prob, *const c_void, *const c_char) -> c_int;
    read_lp: fn(Prob, *const c_void, *const c_char) -> c_int;
    write_mps: fn(Prob, c_int, *const c_void, *const c_char) -> c_int;
    read_mps: fn(Prob, c_int, *const c_void, *const c_char) -> c_int;
    ios_reason: fn(TreePtr) -> c_int;
    ios_get_prob: fn(TreePtr) -> Prob;
    ios_row_attr: fn(TreePtr, c_int, *mut c_void);
    ios_mip_gap: fn(TreePtr) -> f64;
    ios_heur_sol: fn(TreePtr, *const f64) -> c_int;
    ios_can_branch: fn(TreePtr, c_int) -> c_int;
    ios_branch_upon: fn(TreePtr, c_int, c_int);
    ios_select_node: fn(TreePtr, c_int);
    ios_terminate: fn(TreePtr);
    ios_tree_size: fn(TreePtr, *mut c_int, *mut c_int, *mut c_int);
    ios_curr_node: fn(TreePtr) -> c_int;
    ios_best_node: fn(TreePtr) -> c_int;
    ios_next_node: fn(TreePtr, c_int) -> c_int;
    ios_prev_node: fn(TreePtr, c_int) -> c_int;
    ios_up_node: fn(TreePtr, c_int) -> c_int;
    ios_node_level: fn(TreePtr, c_int) -> c_int;
    ios_node_bound: fn(TreePtr, c_int) -> f64;
    ios_pool_size: fn(TreePtr) -> c_int;
    ios_clear_pool: fn(TreePtr);
}

struct Allocation {
    base: NonNull<u8>,
    layout: Layout,
}

/// GLPK shared library with its entry points resolved.
///
/// Problem handles and buffers are checked against the registries below before
/// any raw pointer reaches the library.
pub struct NativeGlpk {
    api: Api,
    allocations: RefCell<BTreeMap<usize, Allocation>>,
    problems: RefCell<HashSet<usize>>,
    /// Trees of the callbacks currently running, innermost last.
    trees: RefCell<Vec<usize>>,
    // Declared last so it is dropped after everything that points into it.
    _library: Library,
}

impl NativeGlpk {
    /// Opens the first default library name that loads.
    pub fn open_default() -> Result<Self, EngineError> {
        let mut tried = Vec::new();
        let mut reason = String::new();
        for name in DEFAULT_NAMES {
            tried.push((*name).to_string());
            // SAFETY: loading GLPK runs no initialization code with preconditions.
            match unsafe { Library::new(*name) } {
                Ok(library) => return Self::from_library(library, name),
                Err(err) => reason = err.to_string(),
            }
        }
        Err(EngineError::LibraryNotFound { tried, reason })
    }

    /// Opens the library at `path`.
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        let shown = path.display().to_string();
        // SAFETY: as in `open_default`.
        match unsafe { Library::new(path) } {
            Ok(library) => Self::from_library(library, &shown),
            Err(err) => Err(EngineError::LibraryNotFound {
                tried: vec![shown],
                reason: err.to_string(),
            }),
        }
    }

    fn from_library(library: Library, name: &str) -> Result<Self, EngineError> {
        // SAFETY: every symbol is declared with its C prototype from glpk.h.
        let api = unsafe { Api::load(&library)? };
        debug!(
            component = "engine",
            operation = "load_library",
            status = "success",
            library = name,
            "Resolved GLPK entry points"
        );
        Ok(Self {
            api,
            allocations: RefCell::new(BTreeMap::new()),
            problems: RefCell::new(HashSet::new()),
            trees: RefCell::new(Vec::new()),
            _library: library,
        })
    }

    fn prob(&self, prob: &RawProb) -> AbiResult<Prob> {
        if self.problems.borrow().contains(&prob.0) {
            Ok(prob.0 as Prob)
        } else {
            Err(AbiError::UnknownProblem)
        }
    }

    /// Accepts only the tree of the innermost running callback.
    fn tree(&self, tree: &RawTree) -> AbiResult<TreePtr> {
        if self.trees.borrow().last() == Some(&tree.0) {
            Ok(tree.0 as TreePtr)
        } else {
            Err(AbiError::UnknownTree)
        }
    }

    /// Resolves `[ptr, ptr + len)` to a pointer derived from its allocation.
    fn span(&self, ptr: Ptr, len: usize) -> AbiResult<*mut u8> {
        let addr = ptr.addr();
        let allocations = self.allocations.borrow();
        let (&start, allocation) = allocations
            .range(..=addr)
            .next_back()
            .ok_or(AbiError::InvalidPointer { addr })?;
        let offset = addr - start;
        match offset.checked_add(len) {
            Some(end) if end <= allocation.layout.size() => {
                // SAFETY: offset lies within the allocation.
                Ok(unsafe { allocation.base.as_ptr().add(offset) })
            }
            _ => Err(AbiError::InvalidPointer { addr }),
        }
    }

    /// Resolves a NUL-terminated string inside one allocation.
    fn c_str(&self, ptr: Ptr) -> AbiResult<*const c_char> {
        let addr = ptr.addr();
        let base = self.span(ptr, 1)?;
        let allocations = self.allocations.borrow();
        let (&start, allocation) = allocations
            .range(..=addr)
            .next_back()
            .ok_or(AbiError::InvalidPointer { addr })?;
        let remaining = allocation.layout.size() - (addr - start);
        // SAFETY: `base` is valid for `remaining` bytes.
        let bytes = unsafe { std::slice::from_raw_parts(base, remaining) };
        if bytes.contains(&0) {
            Ok(base as *const c_char)
        } else {
            Err(AbiError::InvalidPointer { addr })
        }
    }

    /// Checks that `ptr` holds a 1-based array of `count` elements of `T`.
    fn array<T>(&self, ptr: Ptr, count: usize) -> AbiResult<*mut T> {
        Ok(self.span(ptr, (count + 1) * std::mem::size_of::<T>())? as *mut T)
    }

    fn num_rows(&self, prob: Prob) -> usize {
        // SAFETY: `prob` is registered.
        usize::try_from(unsafe { (self.api.get_num_rows)(prob) }).unwrap_or(0)
    }

    fn num_cols(&self, prob: Prob) -> usize {
        // SAFETY: `prob` is registered.
        usize::try_from(unsafe { (self.api.get_num_cols)(prob) }).unwrap_or(0)
    }
}

impl Drop for NativeGlpk {
    fn drop(&mut self) {
        let problems = std::mem::take(self.problems.get_mut());
        for prob in problems {
            // SAFETY: registered handles are live until deleted here.
            unsafe { (self.api.delete_prob)(prob as Prob) };
        }
        let allocations = std::mem::take(self.allocations.get_mut());
        for (_, allocation) in allocations {
            // SAFETY: allocated by `malloc` with this layout.
            unsafe { dealloc(allocation.base.as_ptr(), allocation.layout) };
        }
    }
}

/// State shared with [`tree_callback`] through `cb_info`.
struct CallbackSlot<'a> {
    glpk: &'a NativeGlpk,
    callback: &'a mut dyn FnMut(&RawTree),
    panic: Option<Box<dyn Any + Send>>,
}

/// Entry point GLPK calls back into during `glp_intopt`.
///
/// A panic must not unwind through the C frames, so it is caught, the search
/// is terminated, and the payload is rethrown once `glp_intopt` returns.
unsafe extern "C" fn tree_callback(tree: TreePtr, info: *mut c_void) {
    // SAFETY: `info` is the slot installed by `CallbackGuard`, which lives for
    // the whole `glp_intopt` call.
    let slot = unsafe { &mut *(info as *mut CallbackSlot<'_>) };
    if slot.panic.is_some() {
        return;
    }
    let glpk = slot.glpk;
    let raw = RawTree(tree as usize);
    glpk.trees.borrow_mut().push(raw.0);
    let outcome = catch_unwind(AssertUnwindSafe(|| (slot.callback)(&raw)));
    glpk.trees.borrow_mut().pop();
    if let Err(payload) = outcome {
        warn!(
            component = "engine",
            operation = "intopt_callback",
            status = "error",
            "Callback panicked; terminating the search"
        );
        slot.panic = Some(payload);
        // SAFETY: `tree` is the live tree this callback was handed.
        unsafe { (glpk.api.ios_terminate)(tree) };
    }
}

/// Points a `glp_iocp` record at [`tree_callback`] for one `glp_intopt` call
/// and clears it again on drop.
struct CallbackGuard<'a> {
    record: *mut u8,
    slot: *mut CallbackSlot<'a>,
}

impl<'a> CallbackGuard<'a> {
    /// `record` must cover a whole `glp_iocp`.
    fn install(
        glpk: &'a NativeGlpk,
        record: *mut u8,
        callback: &'a mut dyn FnMut(&RawTree),
    ) -> Self {
        let slot = Box::into_raw(Box::new(CallbackSlot {
            glpk,
            callback,
            panic: None,
        }));
        // SAFETY: both fields lie inside the record; the buffer only
        // guarantees 8-byte alignment, so write unaligned.
        unsafe {
            record
                .add(iocp::CB_FUNC)
                .cast::<Option<CallbackFn>>()
                .write_unaligned(Some(tree_callback as CallbackFn));
            record
                .add(iocp::CB_INFO)
                .cast::<*mut c_void>()
                .write_unaligned(slot.cast::<c_void>());
        }
        Self { record, slot }
    }

    fn take_panic(&mut self) -> Option<Box<dyn Any + Send>> {
        // SAFETY: the slot stays allocated until drop.
        unsafe { (*self.slot).panic.take() }
    }
}

impl Drop for CallbackGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: as in `install`; the slot came from `Box::into_raw` and is
        // released exactly once, after the engine stopped calling back.
        unsafe {
            self.record
                .add(iocp::CB_FUNC)
                .cast::<Option<CallbackFn>>()
                .write_unaligned(None);
            self.record
                .add(iocp::CB_INFO)
                .cast::<*mut c_void>()
                .write_unaligned(std::ptr::null_mut());
            drop(Box::from_raw(self.slot));
        }
    }
}

/// Calls an entry point that only takes the problem and plain values.
macro_rules! call {
    ($self:ident . $name:ident ($prob:expr $(, $arg:expr)*)) => {{
        let prob = $self.prob($prob)?;
        // SAFETY: `prob` is a registered, live problem object.
        Ok::<_, AbiError>(unsafe { ($self.api.$name)(prob $(, $arg)*) })
    }};
}

/// Calls a search-tree entry point after checking the tree handle.
macro_rules! ios {
    ($self:ident . $name:ident ($tree:expr $(, $arg:expr)*)) => {{
        let tree = $self.tree($tree)?;
        // SAFETY: `tree` belongs to the running callback.
        Ok::<_, AbiError>(unsafe { ($self.api.$name)(tree $(, $arg)*) })
    }};
}

impl NativeGlpk {
    fn tree_problem(&self, tree: &RawTree) -> AbiResult<Prob> {
        ios!(self.ios_get_prob(tree))
    }
}

impl Abi for NativeGlpk {
    fn version(&self) -> String {
        // SAFETY: glp_version returns a static NUL-terminated string.
        unsafe { CStr::from_ptr((self.api.version)()) }
            .to_string_lossy()
            .into_owned()
    }

    fn term_out(&self, on: bool) {
        // SAFETY: plain flag argument.
        unsafe { (self.api.term_out)(c_int::from(on)) };
    }

    fn malloc(&self, size: usize) -> AbiResult<Ptr> {
        let layout = Layout::from_size_align(size.max(1), 8)
            .map_err(|_| AbiError::AllocationFailed { size })?;
        // SAFETY: layout has non-zero size.
        let base = NonNull::new(unsafe { alloc_zeroed(layout) })
            .ok_or(AbiError::AllocationFailed { size })?;
        let addr = base.as_ptr() as usize;
        self.allocations
            .borrow_mut()
            .insert(addr, Allocation { base, layout });
        Ok(Ptr(addr))
    }

    fn free(&self, ptr: Ptr) -> AbiResult<()> {
        let allocation = self
            .allocations
            .borrow_mut()
            .remove(&ptr.addr())
            .ok_or(AbiError::InvalidPointer { addr: ptr.addr() })?;
        // SAFETY: allocated by `malloc` with this layout and removed from the registry.
        unsafe { dealloc(allocation.base.as_ptr(), allocation.layout) };
        Ok(())
    }

    fn write_bytes(&self, ptr: Ptr, bytes: &[u8]) -> AbiResult<()> {
        let dst = self.span(ptr, bytes.len())?;
        // SAFETY: `dst` is valid for `bytes.len()` bytes and cannot overlap a Rust slice.
        unsafe { std::ptr::copy_nonoverlapping(bytes.as_ptr(), dst, bytes.len()) };
        Ok(())
    }

    fn read_bytes(&self, ptr: Ptr, len: usize) -> AbiResult<Vec<u8>> {
        let src = self.span(ptr, len)?;
        // SAFETY: `src` is valid for `len` bytes.
        Ok(unsafe { std::slice::from_raw_parts(src, len) }.to_vec())
    }

    fn live_allocations(&self) -> usize {
        self.allocations.borrow().len()
    }

    fn create_prob(&self) -> AbiResult<RawProb> {
        // SAFETY: no arguments.
        let prob = unsafe { (self.api.create_prob)() };
        let addr = prob as usize;
        self.problems.borrow_mut().insert(addr);
        trace!(component = "engine", operation = "create_prob", addr, "Created problem object");
        Ok(RawProb(addr))
    }

    fn delete_prob(&self, prob: RawProb) -> AbiResult<()> {
        let raw = self.prob(&prob)?;
        self.problems.borrow_mut().remove(&prob.0);
        // SAFETY: registered and now unregistered, so deleted exactly once.
        unsafe { (self.api.delete_prob)(raw) };
        trace!(component = "engine", operation = "delete_prob", addr = prob.0, "Deleted problem object");
        Ok(())
    }

    fn set_prob_name(&self, prob: &RawProb, name: Ptr) -> AbiResult<()> {
        let name = self.c_str(name)?;
        call!(self.set_prob_name(prob, name))
    }

    fn get_prob_name(&self, prob: &RawProb) -> AbiResult<Option<String>> {
        let raw: *const c_char = call!(self.get_prob_name(prob))?;
        Ok(owned(raw))
    }

    fn set_obj_dir(&self, prob: &RawProb, dir: i32) -> AbiResult<()> {
        call!(self.set_obj_dir(prob, dir))
    }

    fn get_obj_dir(&self, prob: &RawProb) -> AbiResult<i32> {
        call!(self.get_obj_dir(prob))
    }

    fn add_rows(&self, prob: &RawProb, count: i32) -> AbiResult<i32> {
        call!(self.add_rows(prob, count))
    }

    fn add_cols(&self, prob: &RawProb, count: i32) -> AbiResult<i32> {
        call!(self.add_cols(prob, count))
    }

    fn set_row_name(&self, prob: &RawProb, i: i32, name: Ptr) -> AbiResult<()> {
        let name = self.c_str(name)?;
        call!(self.set_row_name(prob, i, name))
    }

    fn set_col_name(&self, prob: &RawProb, j: i32, name: Ptr) -> AbiResult<()> {
        let name = self.c_str(name)?;
        call!(self.set_col_name(prob, j, name))
    }

    fn get_row_name(&self, prob: &RawProb, i: i32) -> AbiResult<Option<String>> {
        let raw: *const c_char = call!(self.get_row_name(prob, i))?;
        Ok(owned(raw))
    }

    fn get_col_name(&self, prob: &RawProb, j: i32) -> AbiResult<Option<String>> {
        let raw: *const c_char = call!(self.get_col_name(prob, j))?;
        Ok(owned(raw))
    }

    fn set_row_bnds(&self, prob: &RawProb, i: i32, kind: i32, lb: f64, ub: f64) -> AbiResult<()> {
        call!(self.set_row_bnds(prob, i, kind, lb, ub))
    }

    fn set_col_bnds(&self, prob: &RawProb, j: i32, kind: i32, lb: f64, ub: f64) -> AbiResult<()> {
        call!(self.set_col_bnds(prob, j, kind, lb, ub))
    }

    fn get_row_type(&self, prob: &RawProb, i: i32) -> AbiResult<i32> {
        call!(self.get_row_type(prob, i))
    }

    fn get_row_lb(&self, prob: &RawProb, i: i32) -> AbiResult<f64> {
        call!(self.get_row_lb(prob, i))
    }

    fn get_row_ub(&self, prob: &RawProb, i: i32) -> AbiResult<f64> {
        call!(self.get_row_ub(prob, i))
    }

    fn get_col_type(&self, prob: &RawProb, j: i32) -> AbiResult<i32> {
        call!(self.get_col_type(prob, j))
    }

    fn get_col_lb(&self, prob: &RawProb, j: i32) -> AbiResult<f64> {
        call!(self.get_col_lb(prob, j))
    }

    fn get_col_ub(&self, prob: &RawProb, j: i32) -> AbiResult<f64> {
        call!(self.get_col_ub(prob, j))
    }

    fn set_obj_coef(&self, prob: &RawProb, j: i32, coef: f64) -> AbiResult<()> {
        call!(self.set_obj_coef(prob, j, coef))
    }

    fn get_obj_coef(&self, prob: &RawProb, j: i32) -> AbiResult<f64> {
        call!(self.get_obj_coef(prob, j))
    }

    fn set_col_kind(&self, prob: &RawProb, j: i32, kind: i32) -> AbiResult<()> {
        call!(self.set_col_kind(prob, j, kind))
    }

    fn get_col_kind(&self, prob: &RawProb, j: i32) -> AbiResult<i32> {
        call!(self.get_col_kind(prob, j))
    }

    fn set_mat_row(&self, prob: &RawProb, i: i32, len: i32, ind: Ptr, val: Ptr) -> AbiResult<()> {
        let count = usize::try_from(len).unwrap_or(0);
        let ind = self.array::<c_int>(ind, count)? as *const c_int;
        let val = self.array::<f64>(val, count)? as *const f64;
        call!(self.set_mat_row(prob, i, len, ind, val))
    }

    fn get_mat_row(&self, prob: &RawProb, i: i32, ind: Ptr, val: Ptr) -> AbiResult<i32> {
        let raw = self.prob(prob)?;
        let cols = self.num_cols(raw);
        let ind = self.array::<c_int>(ind, cols)?;
        let val = self.array::<f64>(val, cols)?;
        call!(self.get_mat_row(prob, i, ind, val))
    }

    fn get_num_rows(&self, prob: &RawProb) -> AbiResult<i32> {
        call!(self.get_num_rows(prob))
    }

    fn get_num_cols(&self, prob: &RawProb) -> AbiResult<i32> {
        call!(self.get_num_cols(prob))
    }

    fn get_num_nz(&self, prob: &RawProb) -> AbiResult<i32> {
        call!(self.get_num_nz(prob))
    }

    fn get_num_int(&self, prob: &RawProb) -> AbiResult<i32> {
        call!(self.get_num_int(prob))
    }

    fn get_num_bin(&self, prob: &RawProb) -> AbiResult<i32> {
        call!(self.get_num_bin(prob))
    }

    fn init_smcp(&self, parm: Ptr) -> AbiResult<()> {
        let parm = self.span(parm, smcp::SIZE)? as *mut c_void;
        // SAFETY: `parm` covers a whole glp_smcp.
        unsafe { (self.api.init_smcp)(parm) };
        Ok(())
    }

    fn init_iptcp(&self, parm: Ptr) -> AbiResult<()> {
        let parm = self.span(parm, iptcp::SIZE)? as *mut c_void;
        // SAFETY: `parm` covers a whole glp_iptcp.
        unsafe { (self.api.init_iptcp)(parm) };
        Ok(())
    }

    fn init_iocp(&self, parm: Ptr) -> AbiResult<()> {
        let parm = self.span(parm, iocp::SIZE)? as *mut c_void;
        // SAFETY: `parm` covers a whole glp_iocp.
        unsafe { (self.api.init_iocp)(parm) };
        Ok(())
    }

    fn simplex(&self, prob: &RawProb, parm: Ptr) -> AbiResult<i32> {
        let parm = self.span(parm, smcp::SIZE)? as *const c_void;
        call!(self.simplex(prob, parm))
    }

    fn exact(&self, prob: &RawProb, parm: Ptr) -> AbiResult<i32> {
        let parm = self.span(parm, smcp::SIZE)? as *const c_void;
        call!(self.exact(prob, parm))
    }

    fn interior(&self, prob: &RawProb, parm: Ptr) -> AbiResult<i32> {
        let parm = self.span(parm, iptcp::SIZE)? as *const c_void;
        call!(self.interior(prob, parm))
    }

    fn intopt(
        &self,
        prob: &RawProb,
        parm: Ptr,
        callback: Option<&mut dyn FnMut(&RawTree)>,
    ) -> AbiResult<i32> {
        let record = self.span(parm, iocp::SIZE)?;
        let raw = self.prob(prob)?;
        let Some(callback) = callback else {
            // SAFETY: `record` covers a whole glp_iocp and `raw` is registered.
            return Ok(unsafe { (self.api.intopt)(raw, record as *const c_void) });
        };
        let mut guard = CallbackGuard::install(self, record, callback);
        // SAFETY: as above; the guard keeps the callback slot alive until the
        // engine returns.
        let code = unsafe { (self.api.intopt)(raw, record as *const c_void) };
        if let Some(payload) = guard.take_panic() {
            drop(guard);
            resume_unwind(payload);
        }
        Ok(code)
    }

    fn get_status(&self, prob: &RawProb) -> AbiResult<i32> {
        call!(self.get_status(prob))
    }

    fn get_prim_stat(&self, prob: &RawProb) -> AbiResult<i32> {
        call!(self.get_prim_stat(prob))
    }

    fn get_dual_stat(&self, prob: &RawProb) -> AbiResult<i32> {
        call!(self.get_dual_stat(prob))
    }

    fn get_obj_val(&self, prob: &RawProb) -> AbiResult<f64> {
        call!(self.get_obj_val(prob))
    }

    fn get_row_stat(&self, prob: &RawProb, i: i32) -> AbiResult<i32> {
        call!(self.get_row_stat(prob, i))
    }

    fn get_row_prim(&self, prob: &RawProb, i: i32) -> AbiResult<f64> {
        call!(self.get_row_prim(prob, i))
    }

    fn get_row_dual(&self, prob: &RawProb, i: i32) -> AbiResult<f64> {
        call!(self.get_row_dual(prob, i))
    }

    fn get_col_stat(&self, prob: &RawProb, j: i32) -> AbiResult<i32> {
        call!(self.get_col_stat(prob, j))
    }

    fn get_col_prim(&self, prob: &RawProb, j: i32) -> AbiResult<f64> {
        call!(self.get_col_prim(prob, j))
    }

    fn get_col_dual(&self, prob: &RawProb, j: i32) -> AbiResult<f64> {
        call!(self.get_col_dual(prob, j))
    }

    fn get_unbnd_ray(&self, prob: &RawProb) -> AbiResult<i32> {
        call!(self.get_unbnd_ray(prob))
    }

    fn ipt_status(&self, prob: &RawProb) -> AbiResult<i32> {
        call!(self.ipt_status(prob))
    }

    fn ipt_obj_val(&self, prob: &RawProb) -> AbiResult<f64> {
        call!(self.ipt_obj_val(prob))
    }

    fn ipt_row_prim(&self, prob: &RawProb, i: i32) -> AbiResult<f64> {
        call!(self.ipt_row_prim(prob, i))
    }

    fn ipt_row_dual(&self, prob: &RawProb, i: i32) -> AbiResult<f64> {
        call!(self.ipt_row_dual(prob, i))
    }

    fn ipt_col_prim(&self, prob: &RawProb, j: i32) -> AbiResult<f64> {
        call!(self.ipt_col_prim(prob, j))
    }

    fn ipt_col_dual(&self, prob: &RawProb, j: i32) -> AbiResult<f64> {
        call!(self.ipt_col_dual(prob, j))
    }

    fn mip_status(&self, prob: &RawProb) -> AbiResult<i32> {
        call!(self.mip_status(prob))
    }

    fn mip_obj_val(&self, prob: &RawProb) -> AbiResult<f64> {
        call!(self.mip_obj_val(prob))
    }

    fn mip_row_val(&self, prob: &RawProb, i: i32) -> AbiResult<f64> {
        call!(self.mip_row_val(prob, i))
    }

    fn mip_col_val(&self, prob: &RawProb, j: i32) -> AbiResult<f64> {
        call!(self.mip_col_val(prob, j))
    }

    fn bf_exists(&self, prob: &RawProb) -> AbiResult<bool> {
        let exists: c_int = call!(self.bf_exists(prob))?;
        Ok(exists != 0)
    }

    fn eval_tab_row(&self, prob: &RawProb, k: i32, ind: Ptr, val: Ptr) -> AbiResult<i32> {
        let raw = self.prob(prob)?;
        let cols = self.num_cols(raw);
        let ind = self.array::<c_int>(ind, cols)?;
        let val = self.array::<f64>(val, cols)?;
        call!(self.eval_tab_row(prob, k, ind, val))
    }

    fn eval_tab_col(&self, prob: &RawProb, k: i32, ind: Ptr, val: Ptr) -> AbiResult<i32> {
        let raw = self.prob(prob)?;
        let rows = self.num_rows(raw);
        let ind = self.array::<c_int>(ind, rows)?;
        let val = self.array::<f64>(val, rows)?;
        call!(self.eval_tab_col(prob, k, ind, val))
    }

    fn write_lp(&self, prob: &RawProb, fname: Ptr) -> AbiResult<i32> {
        let fname = self.c_str(fname)?;
        call!(self.write_lp(prob, std::ptr::null(), fname))
    }

    fn read_lp(&self, prob: &RawProb, fname: Ptr) -> AbiResult<i32> {
        let fname = self.c_str(fname)?;
        call!(self.read_lp(prob, std::ptr::null(), fname))
    }

    fn write_mps(&self, prob: &RawProb, fmt: i32, fname: Ptr) -> AbiResult<i32> {
        let fname = self.c_str(fname)?;
        call!(self.write_mps(prob, fmt, std::ptr::null(), fname))
    }

    fn read_mps(&self, prob: &RawProb, fmt: i32, fname: Ptr) -> AbiResult<i32> {
        let fname = self.c_str(fname)?;
        call!(self.read_mps(prob, fmt, std::ptr::null(), fname))
    }

    fn ios_reason(&self, tree: &RawTree) -> AbiResult<i32> {
        ios!(self.ios_reason(tree))
    }

    fn ios_problem_size(&self, tree: &RawTree) -> AbiResult<(i32, i32)> {
        let prob = self.tree_problem(tree)?;
        // SAFETY: the tree's problem object lives as long as the tree.
        Ok(unsafe { ((self.api.get_num_rows)(prob), (self.api.get_num_cols)(prob)) })
    }

    fn ios_row_attr(&self, tree: &RawTree, i: i32, attr: Ptr) -> AbiResult<()> {
        let attr = self.span(attr, attr::SIZE)? as *mut c_void;
        ios!(self.ios_row_attr(tree, i, attr))
    }

    fn ios_mip_gap(&self, tree: &RawTree) -> AbiResult<f64> {
        ios!(self.ios_mip_gap(tree))
    }

    fn ios_heur_sol(&self, tree: &RawTree, x: Ptr) -> AbiResult<i32> {
        let prob = self.tree_problem(tree)?;
        let x = self.array::<f64>(x, self.num_cols(prob))? as *const f64;
        ios!(self.ios_heur_sol(tree, x))
    }

    fn ios_can_branch(&self, tree: &RawTree, j: i32) -> AbiResult<bool> {
        let can: c_int = ios!(self.ios_can_branch(tree, j))?;
        Ok(can != 0)
    }

    fn ios_branch_upon(&self, tree: &RawTree, j: i32, sel: i32) -> AbiResult<()> {
        ios!(self.ios_branch_upon(tree, j, sel))
    }

    fn ios_select_node(&self, tree: &RawTree, p: i32) -> AbiResult<()> {
        ios!(self.ios_select_node(tree, p))
    }

    fn ios_terminate(&self, tree: &RawTree) -> AbiResult<()> {
        ios!(self.ios_terminate(tree))
    }

    fn ios_tree_size(&self, tree: &RawTree) -> AbiResult<(i32, i32, i32)> {
        let (mut active, mut current, mut total): (c_int, c_int, c_int) = (0, 0, 0);
        ios!(self.ios_tree_size(tree, &mut active, &mut current, &mut total))?;
        Ok((active, current, total))
    }

    fn ios_curr_node(&self, tree: &RawTree) -> AbiResult<i32> {
        ios!(self.ios_curr_node(tree))
    }

    fn ios_best_node(&self, tree: &RawTree) -> AbiResult<i32> {
        ios!(self.ios_best_node(tree))
    }

    fn ios_next_node(&self, tree: &RawTree, p: i32) -> AbiResult<i32> {
        ios!(self.ios_next_node(tree, p))
    }

    fn ios_prev_node(&self, tree: &RawTree, p: i32) -> AbiResult<i32> {
        ios!(self.ios_prev_node(tree, p))
    }

    fn ios_up_node(&self, tree: &RawTree, p: i32) -> AbiResult<i32> {
        ios!(self.ios_up_node(tree, p))
    }

    fn ios_node_level(&self, tree: &RawTree, p: i32) -> AbiResult<i32> {
        ios!(self.ios_node_level(tree, p))
    }

    fn ios_node_bound(&self, tree: &RawTree, p: i32) -> AbiResult<f64> {
        ios!(self.ios_node_bound(tree, p))
    }

    fn ios_pool_size(&self, tree: &RawTree) -> AbiResult<i32> {
        ios!(self.ios_pool_size(tree))
    }

    fn ios_clear_pool(&self, tree: &RawTree) -> AbiResult<()> {
        ios!(self.ios_clear_pool(tree))
    }
}

/// Copies an engine-owned, possibly NULL string.
fn owned(raw: *const c_char) -> Option<String> {
    if raw.is_null() {
        return None;
    }
    // SAFETY: GLPK returns NUL-terminated strings valid until the next mutation.
    Some(unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned())
}
