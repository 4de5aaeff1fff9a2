//! Deterministic in-memory engine for tests.
//!
//! [`FakeEngine`] implements [`Abi`] over its own byte heap. It keeps problem
//! data the way GLPK does (bound-type aware getters, binary columns reported as
//! `GLP_BV`), counts calls per entry point, records the last control record it
//! was handed, and answers every solve with a scripted [`FakeSolution`]. An
//! `intopt` with a callback walks a scripted [`FakeTree`] and records what the
//! callback did in a [`FakeTreeLog`]. Misuse that would abort the real engine
//! panics here.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::abi::{Abi, Ptr, RawProb, RawTree};
use crate::codes::*;
use crate::error::{AbiError, AbiResult};
use crate::layout::{attr, iocp, iptcp, smcp, Field};

/// Outcome applied to a problem by its next solve.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeSolution {
    pub return_code: i32,
    pub status: i32,
    pub prim_stat: i32,
    pub dual_stat: i32,
    pub obj_val: f64,
    /// Per-row values, row `i` at position `i - 1`. Missing rows read as basic / 0.
    pub row_stat: Vec<i32>,
    pub row_prim: Vec<f64>,
    pub row_dual: Vec<f64>,
    /// Per-column values. Missing columns read as nonbasic on lower bound / 0.
    pub col_stat: Vec<i32>,
    pub col_prim: Vec<f64>,
    pub col_dual: Vec<f64>,
    pub unbnd_ray: i32,
    pub bf_exists: bool,
    /// Tableau rows keyed by combined index of the basic entity.
    pub tab_rows: HashMap<i32, Vec<(i32, f64)>>,
    /// Tableau columns keyed by combined index of the nonbasic entity.
    pub tab_cols: HashMap<i32, Vec<(i32, f64)>>,
    pub ipt_status: i32,
    pub ipt_obj_val: f64,
    pub ipt_row_prim: Vec<f64>,
    pub ipt_row_dual: Vec<f64>,
    pub ipt_col_prim: Vec<f64>,
    pub ipt_col_dual: Vec<f64>,
    pub mip_status: i32,
    pub mip_obj_val: f64,
    pub mip_row_val: Vec<f64>,
    pub mip_col_val: Vec<f64>,
}

impl Default for FakeSolution {
    fn default() -> Self {
        Self {
            return_code: GLP_OK,
            status: GLP_UNDEF,
            prim_stat: GLP_UNDEF,
            dual_stat: GLP_UNDEF,
            obj_val: 0.0,
            row_stat: Vec::new(),
            row_prim: Vec::new(),
            row_dual: Vec::new(),
            col_stat: Vec::new(),
            col_prim: Vec::new(),
            col_dual: Vec::new(),
            unbnd_ray: 0,
            bf_exists: false,
            tab_rows: HashMap::new(),
            tab_cols: HashMap::new(),
            ipt_status: GLP_UNDEF,
            ipt_obj_val: 0.0,
            ipt_row_prim: Vec::new(),
            ipt_row_dual: Vec::new(),
            ipt_col_prim: Vec::new(),
            ipt_col_dual: Vec::new(),
            mip_status: GLP_UNDEF,
            mip_obj_val: 0.0,
            mip_row_val: Vec::new(),
            mip_col_val: Vec::new(),
        }
    }
}

/// Node of a scripted search tree; reference number `p` sits at `p - 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeNode {
    pub level: i32,
    pub bound: f64,
    /// Reference number of the parent, 0 for the root.
    pub parent: i32,
    pub active: bool,
}

/// Search tree the next `intopt` with a callback walks through.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FakeTree {
    /// One callback invocation per reason code, in order.
    pub reasons: Vec<i32>,
    pub nodes: Vec<FakeNode>,
    /// Current subproblem outside `GLP_ISELECT`, 0 for none.
    pub current: i32,
    pub best: i32,
    pub gap: f64,
    /// Columns `glp_ios_can_branch` accepts.
    pub branchable: Vec<i32>,
    /// `(level, origin, klass)` per row; missing rows read as regular rows of level 0.
    pub row_attrs: Vec<(i32, i32, i32)>,
    pub pool_size: i32,
}

/// What the callbacks of the last `intopt` did to the tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FakeTreeLog {
    pub invocations: usize,
    /// Solutions offered through `glp_ios_heur_sol`, without slot 0.
    pub heuristic: Vec<Vec<f64>>,
    pub branched: Vec<(i32, i32)>,
    pub selected: Vec<i32>,
    pub pool_cleared: usize,
    pub terminated: bool,
}

/// The invocation currently inside a callback.
struct ActiveTree {
    id: usize,
    prob: usize,
    reason: i32,
    branched: bool,
    selected: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FakeRow {
    name: Option<String>,
    kind: i32,
    lb: f64,
    ub: f64,
    coefs: Vec<(i32, f64)>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FakeCol {
    name: Option<String>,
    kind: i32,
    lb: f64,
    ub: f64,
    obj: f64,
    integer: bool,
}

impl FakeCol {
    fn is_binary(&self) -> bool {
        self.integer && self.kind == GLP_DB && self.lb == 0.0 && self.ub == 1.0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FakeProblem {
    name: Option<String>,
    dir: i32,
    obj0: f64,
    rows: Vec<FakeRow>,
    cols: Vec<FakeCol>,
    #[serde(skip)]
    solution: Option<FakeSolution>,
}

#[derive(Serialize, Deserialize)]
struct FakeFile {
    format: String,
    problem: FakeProblem,
}

struct State {
    heap: Vec<u8>,
    allocations: BTreeMap<usize, usize>,
    problems: HashMap<usize, FakeProblem>,
    next_prob: usize,
    calls: HashMap<&'static str, usize>,
    script: FakeSolution,
    last_params: Option<Vec<u8>>,
    malloc_budget: Option<usize>,
    tree_script: FakeTree,
    tree: Option<ActiveTree>,
    tree_log: FakeTreeLog,
    next_tree: usize,
}

/// In-memory engine; clones share state.
#[derive(Clone)]
pub struct FakeEngine {
    state: Rc<RefCell<State>>,
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                // Address 0 stays unused so no allocation looks like NULL.
                heap: vec![0; 8],
                allocations: BTreeMap::new(),
                problems: HashMap::new(),
                next_prob: 1,
                calls: HashMap::new(),
                script: FakeSolution::default(),
                last_params: None,
                malloc_budget: None,
                tree_script: FakeTree::default(),
                tree: None,
                tree_log: FakeTreeLog::default(),
                next_tree: 0,
            })),
        }
    }

    /// Outcome every following solve produces.
    pub fn script(&self, solution: FakeSolution) {
        self.state.borrow_mut().script = solution;
    }

    /// Search tree every following `intopt` with a callback walks.
    pub fn script_tree(&self, tree: FakeTree) {
        self.state.borrow_mut().tree_script = tree;
    }

    /// Callback effects recorded during the most recent `intopt`.
    pub fn tree_log(&self) -> FakeTreeLog {
        self.state.borrow().tree_log.clone()
    }

    /// Number of calls made to `entry` (GLPK name without the `glp_` prefix).
    pub fn calls(&self, entry: &str) -> usize {
        self.state.borrow().calls.get(entry).copied().unwrap_or(0)
    }

    pub fn reset_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Bytes of the control record passed to the most recent solve.
    pub fn last_params(&self) -> Option<Vec<u8>> {
        self.state.borrow().last_params.clone()
    }

    /// Lets `count` more allocations succeed, then fails every further one.
    pub fn fail_malloc_after(&self, count: usize) {
        self.state.borrow_mut().malloc_budget = Some(count);
    }

    /// Number of problem objects not yet deleted.
    pub fn live_problems(&self) -> usize {
        self.state.borrow().problems.len()
    }

    fn enter(&self, entry: &'static str) -> std::cell::RefMut<'_, State> {
        let mut state = self.state.borrow_mut();
        *state.calls.entry(entry).or_insert(0) += 1;
        state
    }
}

impl State {
    fn span(&self, ptr: Ptr, len: usize) -> AbiResult<std::ops::Range<usize>> {
        let addr = ptr.addr();
        let (&start, &size) = self
            .allocations
            .range(..=addr)
            .next_back()
            .ok_or(AbiError::InvalidPointer { addr })?;
        match addr.checked_add(len) {
            Some(end) if end <= start + size => Ok(addr..end),
            _ => Err(AbiError::InvalidPointer { addr }),
        }
    }

    fn c_str(&self, ptr: Ptr) -> AbiResult<String> {
        let addr = ptr.addr();
        let (&start, &size) = self
            .allocations
            .range(..=addr)
            .next_back()
            .ok_or(AbiError::InvalidPointer { addr })?;
        let end = start + size;
        if addr >= end {
            return Err(AbiError::InvalidPointer { addr });
        }
        let bytes = &self.heap[addr..end];
        let nul = bytes
            .iter()
            .position(|&b| b == 0)
            .ok_or(AbiError::InvalidPointer { addr })?;
        Ok(String::from_utf8_lossy(&bytes[..nul]).into_owned())
    }

    fn put_i32(&mut self, ptr: Ptr, value: i32) -> AbiResult<()> {
        let span = self.span(ptr, 4)?;
        self.heap[span].copy_from_slice(&value.to_ne_bytes());
        Ok(())
    }

    fn put_f64(&mut self, ptr: Ptr, value: f64) -> AbiResult<()> {
        let span = self.span(ptr, 8)?;
        self.heap[span].copy_from_slice(&value.to_ne_bytes());
        Ok(())
    }

    fn get_i32(&self, ptr: Ptr) -> AbiResult<i32> {
        let span = self.span(ptr, 4)?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.heap[span]);
        Ok(i32::from_ne_bytes(raw))
    }

    fn get_f64(&self, ptr: Ptr) -> AbiResult<f64> {
        let span = self.span(ptr, 8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&self.heap[span]);
        Ok(f64::from_ne_bytes(raw))
    }

    fn put_int_field(&mut self, parm: Ptr, field: Field, value: i32) -> AbiResult<()> {
        self.put_i32(parm.offset(field.offset), value)
    }

    fn put_double_field(&mut self, parm: Ptr, field: Field, value: f64) -> AbiResult<()> {
        self.put_f64(parm.offset(field.offset), value)
    }

    fn prob(&self, prob: &RawProb) -> AbiResult<&FakeProblem> {
        self.problems.get(&prob.0).ok_or(AbiError::UnknownProblem)
    }

    fn prob_mut(&mut self, prob: &RawProb) -> AbiResult<&mut FakeProblem> {
        self.problems.get_mut(&prob.0).ok_or(AbiError::UnknownProblem)
    }

    fn tree(&self, tree: &RawTree) -> AbiResult<&ActiveTree> {
        self.tree
            .as_ref()
            .filter(|active| active.id == tree.0)
            .ok_or(AbiError::UnknownTree)
    }

    fn tree_mut(&mut self, tree: &RawTree) -> AbiResult<&mut ActiveTree> {
        self.tree
            .as_mut()
            .filter(|active| active.id == tree.0)
            .ok_or(AbiError::UnknownTree)
    }

    /// Rows and columns of the problem under the running tree.
    fn tree_size(&self, tree: &RawTree) -> AbiResult<(i32, i32)> {
        let prob = self.tree(tree)?.prob;
        let p = self.problems.get(&prob).ok_or(AbiError::UnknownProblem)?;
        Ok((p.rows.len() as i32, p.cols.len() as i32))
    }

    fn node(&self, entry: &str, p: i32) -> &FakeNode {
        match usize::try_from(p) {
            Ok(k) if k >= 1 && k <= self.tree_script.nodes.len() => &self.tree_script.nodes[k - 1],
            _ => panic!("glp_{}: p = {}; invalid subproblem reference number", entry, p),
        }
    }

    /// Active node after (or, with `backward`, before) `p`; `p = 0` starts at an end.
    fn walk(&self, entry: &str, p: i32, backward: bool) -> i32 {
        if p != 0 {
            assert!(
                self.node(entry, p).active,
                "glp_{}: p = {}; subproblem not in the active list",
                entry,
                p
            );
        }
        let active = |k: &usize| self.tree_script.nodes[*k].active;
        let count = self.tree_script.nodes.len();
        let found = match (backward, p) {
            (false, 0) => (0..count).find(active),
            (false, p) => (p as usize..count).find(active),
            (true, 0) => (0..count).rev().find(active),
            (true, p) => (0..p as usize - 1).rev().find(active),
        };
        found.map_or(0, |k| k as i32 + 1)
    }

    fn solve(&mut self, prob: &RawProb, parm: Ptr, size: usize) -> AbiResult<i32> {
        let span = self.span(parm, size)?;
        self.last_params = Some(self.heap[span].to_vec());
        let script = self.script.clone();
        let code = script.return_code;
        self.prob_mut(prob)?.solution = Some(script);
        Ok(code)
    }
}

impl FakeProblem {
    fn row(&self, entry: &str, i: i32) -> &FakeRow {
        match usize::try_from(i) {
            Ok(i) if i >= 1 && i <= self.rows.len() => &self.rows[i - 1],
            _ => panic!("glp_{}: i = {}; row number out of range", entry, i),
        }
    }

    fn row_mut(&mut self, entry: &str, i: i32) -> &mut FakeRow {
        match usize::try_from(i) {
            Ok(i) if i >= 1 && i <= self.rows.len() => &mut self.rows[i - 1],
            _ => panic!("glp_{}: i = {}; row number out of range", entry, i),
        }
    }

    fn col(&self, entry: &str, j: i32) -> &FakeCol {
        match usize::try_from(j) {
            Ok(j) if j >= 1 && j <= self.cols.len() => &self.cols[j - 1],
            _ => panic!("glp_{}: j = {}; column number out of range", entry, j),
        }
    }

    fn col_mut(&mut self, entry: &str, j: i32) -> &mut FakeCol {
        match usize::try_from(j) {
            Ok(j) if j >= 1 && j <= self.cols.len() => &mut self.cols[j - 1],
            _ => panic!("glp_{}: j = {}; column number out of range", entry, j),
        }
    }

    fn solution(&self) -> FakeSolution {
        self.solution.clone().unwrap_or_default()
    }

    fn total(&self) -> i32 {
        (self.rows.len() + self.cols.len()) as i32
    }
}

fn lower(kind: i32, lb: f64) -> f64 {
    if kind == GLP_FR || kind == GLP_UP {
        -f64::MAX
    } else {
        lb
    }
}

fn upper(kind: i32, lb: f64, ub: f64) -> f64 {
    match kind {
        GLP_FR | GLP_LO => f64::MAX,
        GLP_FX => lb,
        _ => ub,
    }
}

fn at<T: Copy>(values: &[T], index: i32, default: T) -> T {
    usize::try_from(index - 1)
        .ok()
        .and_then(|i| values.get(i).copied())
        .unwrap_or(default)
}

fn file_tag(kind: &str, fmt: i32) -> String {
    match (kind, fmt) {
        ("mps", GLP_MPS_DECK) => "mps-deck".to_string(),
        ("mps", _) => "mps-file".to_string(),
        _ => "lp".to_string(),
    }
}

impl Abi for FakeEngine {
    fn version(&self) -> String {
        "fake-5.0".to_string()
    }

    fn term_out(&self, _on: bool) {
        self.enter("term_out");
    }

    fn malloc(&self, size: usize) -> AbiResult<Ptr> {
        let mut state = self.enter("malloc");
        if let Some(budget) = state.malloc_budget.as_mut() {
            if *budget == 0 {
                return Err(AbiError::AllocationFailed { size });
            }
            *budget -= 1;
        }
        // Keep every block 8-aligned and at least one byte long so addresses stay unique.
        let start = state.heap.len().next_multiple_of(8);
        let size = size.max(1);
        state.heap.resize(start + size, 0);
        state.allocations.insert(start, size);
        Ok(Ptr(start))
    }

    fn free(&self, ptr: Ptr) -> AbiResult<()> {
        let mut state = self.enter("free");
        match state.allocations.remove(&ptr.addr()) {
            Some(_) => Ok(()),
            None => Err(AbiError::InvalidPointer { addr: ptr.addr() }),
        }
    }

    fn write_bytes(&self, ptr: Ptr, bytes: &[u8]) -> AbiResult<()> {
        let mut state = self.state.borrow_mut();
        let span = state.span(ptr, bytes.len())?;
        state.heap[span].copy_from_slice(bytes);
        Ok(())
    }

    fn read_bytes(&self, ptr: Ptr, len: usize) -> AbiResult<Vec<u8>> {
        let state = self.state.borrow();
        let span = state.span(ptr, len)?;
        Ok(state.heap[span].to_vec())
    }

    fn live_allocations(&self) -> usize {
        self.state.borrow().allocations.len()
    }

    fn create_prob(&self) -> AbiResult<RawProb> {
        let mut state = self.enter("create_prob");
        let id = state.next_prob;
        state.next_prob += 1;
        state.problems.insert(
            id,
            FakeProblem {
                dir: GLP_MIN,
                ..FakeProblem::default()
            },
        );
        Ok(RawProb(id))
    }

    fn delete_prob(&self, prob: RawProb) -> AbiResult<()> {
        let mut state = self.enter("delete_prob");
        state
            .problems
            .remove(&prob.0)
            .map(|_| ())
            .ok_or(AbiError::UnknownProblem)
    }

    fn set_prob_name(&self, prob: &RawProb, name: Ptr) -> AbiResult<()> {
        let mut state = self.enter("set_prob_name");
        let name = state.c_str(name)?;
        state.prob_mut(prob)?.name = Some(name).filter(|n| !n.is_empty());
        Ok(())
    }

    fn get_prob_name(&self, prob: &RawProb) -> AbiResult<Option<String>> {
        let state = self.enter("get_prob_name");
        Ok(state.prob(prob)?.name.clone())
    }

    fn set_obj_dir(&self, prob: &RawProb, dir: i32) -> AbiResult<()> {
        let mut state = self.enter("set_obj_dir");
        assert!(
            dir == GLP_MIN || dir == GLP_MAX,
            "glp_set_obj_dir: dir = {}; invalid parameter",
            dir
        );
        state.prob_mut(prob)?.dir = dir;
        Ok(())
    }

    fn get_obj_dir(&self, prob: &RawProb) -> AbiResult<i32> {
        let state = self.enter("get_obj_dir");
        Ok(state.prob(prob)?.dir)
    }

    fn add_rows(&self, prob: &RawProb, count: i32) -> AbiResult<i32> {
        let mut state = self.enter("add_rows");
        assert!(count >= 1, "glp_add_rows: nrs = {}; invalid number", count);
        let p = state.prob_mut(prob)?;
        let first = p.rows.len() as i32 + 1;
        for _ in 0..count {
            p.rows.push(FakeRow {
                kind: GLP_FR,
                ..FakeRow::default()
            });
        }
        Ok(first)
    }

    fn add_cols(&self, prob: &RawProb, count: i32) -> AbiResult<i32> {
        let mut state = self.enter("add_cols");
        assert!(count >= 1, "glp_add_cols: ncs = {}; invalid number", count);
        let p = state.prob_mut(prob)?;
        let first = p.cols.len() as i32 + 1;
        for _ in 0..count {
            // GLPK starts new columns fixed at zero.
            p.cols.push(FakeCol {
                kind: GLP_FX,
                ..FakeCol::default()
            });
        }
        Ok(first)
    }

    fn set_row_name(&self, prob: &RawProb, i: i32, name: Ptr) -> AbiResult<()> {
        let mut state = self.enter("set_row_name");
        let name = state.c_str(name)?;
        state.prob_mut(prob)?.row_mut("set_row_name", i).name = Some(name).filter(|n| !n.is_empty());
        Ok(())
    }

    fn set_col_name(&self, prob: &RawProb, j: i32, name: Ptr) -> AbiResult<()> {
        let mut state = self.enter("set_col_name");
        let name = state.c_str(name)?;
        state.prob_mut(prob)?.col_mut("set_col_name", j).name = Some(name).filter(|n| !n.is_empty());
        Ok(())
    }

    fn get_row_name(&self, prob: &RawProb, i: i32) -> AbiResult<Option<String>> {
        let state = self.enter("get_row_name");
        Ok(state.prob(prob)?.row("get_row_name", i).name.clone())
    }

    fn get_col_name(&self, prob: &RawProb, j: i32) -> AbiResult<Option<String>> {
        let state = self.enter("get_col_name");
        Ok(state.prob(prob)?.col("get_col_name", j).name.clone())
    }

    fn set_row_bnds(&self, prob: &RawProb, i: i32, kind: i32, lb: f64, ub: f64) -> AbiResult<()> {
        let mut state = self.enter("set_row_bnds");
        let row = state.prob_mut(prob)?.row_mut("set_row_bnds", i);
        row.kind = kind;
        row.lb = lb;
        row.ub = ub;
        Ok(())
    }

    fn set_col_bnds(&self, prob: &RawProb, j: i32, kind: i32, lb: f64, ub: f64) -> AbiResult<()> {
        let mut state = self.enter("set_col_bnds");
        let col = state.prob_mut(prob)?.col_mut("set_col_bnds", j);
        col.kind = kind;
        col.lb = lb;
        col.ub = ub;
        Ok(())
    }

    fn get_row_type(&self, prob: &RawProb, i: i32) -> AbiResult<i32> {
        let state = self.enter("get_row_type");
        Ok(state.prob(prob)?.row("get_row_type", i).kind)
    }

    fn get_row_lb(&self, prob: &RawProb, i: i32) -> AbiResult<f64> {
        let state = self.enter("get_row_lb");
        let row = state.prob(prob)?.row("get_row_lb", i);
        Ok(lower(row.kind, row.lb))
    }

    fn get_row_ub(&self, prob: &RawProb, i: i32) -> AbiResult<f64> {
        let state = self.enter("get_row_ub");
        let row = state.prob(prob)?.row("get_row_ub", i);
        Ok(upper(row.kind, row.lb, row.ub))
    }

    fn get_col_type(&self, prob: &RawProb, j: i32) -> AbiResult<i32> {
        let state = self.enter("get_col_type");
        Ok(state.prob(prob)?.col("get_col_type", j).kind)
    }

    fn get_col_lb(&self, prob: &RawProb, j: i32) -> AbiResult<f64> {
        let state = self.enter("get_col_lb");
        let col = state.prob(prob)?.col("get_col_lb", j);
        Ok(lower(col.kind, col.lb))
    }

    fn get_col_ub(&self, prob: &RawProb, j: i32) -> AbiResult<f64> {
        let state = self.enter("get_col_ub");
        let col = state.prob(prob)?.col("get_col_ub", j);
        Ok(upper(col.kind, col.lb, col.ub))
    }

    fn set_obj_coef(&self, prob: &RawProb, j: i32, coef: f64) -> AbiResult<()> {
        let mut state = self.enter("set_obj_coef");
        let p = state.prob_mut(prob)?;
        if j == 0 {
            p.obj0 = coef;
        } else {
            p.col_mut("set_obj_coef", j).obj = coef;
        }
        Ok(())
    }

    fn get_obj_coef(&self, prob: &RawProb, j: i32) -> AbiResult<f64> {
        let state = self.enter("get_obj_coef");
        let p = state.prob(prob)?;
        Ok(if j == 0 { p.obj0 } else { p.col("get_obj_coef", j).obj })
    }

    fn set_col_kind(&self, prob: &RawProb, j: i32, kind: i32) -> AbiResult<()> {
        let mut state = self.enter("set_col_kind");
        let col = state.prob_mut(prob)?.col_mut("set_col_kind", j);
        match kind {
            GLP_CV => col.integer = false,
            GLP_IV => col.integer = true,
            GLP_BV => {
                col.integer = true;
                col.kind = GLP_DB;
                col.lb = 0.0;
                col.ub = 1.0;
            }
            _ => panic!("glp_set_col_kind: j = {}; kind = {}; invalid column kind", j, kind),
        }
        Ok(())
    }

    fn get_col_kind(&self, prob: &RawProb, j: i32) -> AbiResult<i32> {
        let state = self.enter("get_col_kind");
        let col = state.prob(prob)?.col("get_col_kind", j);
        Ok(if col.is_binary() {
            GLP_BV
        } else if col.integer {
            GLP_IV
        } else {
            GLP_CV
        })
    }

    fn set_mat_row(&self, prob: &RawProb, i: i32, len: i32, ind: Ptr, val: Ptr) -> AbiResult<()> {
        let mut state = self.enter("set_mat_row");
        let mut coefs = Vec::new();
        for k in 1..=len as usize {
            let j = state.get_i32(ind.offset(4 * k))?;
            let v = state.get_f64(val.offset(8 * k))?;
            coefs.push((j, v));
        }
        let p = state.prob_mut(prob)?;
        let cols = p.cols.len() as i32;
        let mut seen = std::collections::HashSet::new();
        for &(j, _) in &coefs {
            assert!(
                j >= 1 && j <= cols,
                "glp_set_mat_row: i = {}; ind[] = {}; column index out of range",
                i,
                j
            );
            assert!(
                seen.insert(j),
                "glp_set_mat_row: i = {}; ind[] = {}; duplicate column indices not allowed",
                i,
                j
            );
        }
        coefs.retain(|&(_, v)| v != 0.0);
        p.row_mut("set_mat_row", i).coefs = coefs;
        Ok(())
    }

    fn get_mat_row(&self, prob: &RawProb, i: i32, ind: Ptr, val: Ptr) -> AbiResult<i32> {
        let mut state = self.enter("get_mat_row");
        let coefs = state.prob(prob)?.row("get_mat_row", i).coefs.clone();
        for (k, &(j, v)) in coefs.iter().enumerate() {
            state.put_i32(ind.offset(4 * (k + 1)), j)?;
            state.put_f64(val.offset(8 * (k + 1)), v)?;
        }
        Ok(coefs.len() as i32)
    }

    fn get_num_rows(&self, prob: &RawProb) -> AbiResult<i32> {
        let state = self.enter("get_num_rows");
        Ok(state.prob(prob)?.rows.len() as i32)
    }

    fn get_num_cols(&self, prob: &RawProb) -> AbiResult<i32> {
        let state = self.enter("get_num_cols");
        Ok(state.prob(prob)?.cols.len() as i32)
    }

    fn get_num_nz(&self, prob: &RawProb) -> AbiResult<i32> {
        let state = self.enter("get_num_nz");
        Ok(state.prob(prob)?.rows.iter().map(|r| r.coefs.len() as i32).sum())
    }

    fn get_num_int(&self, prob: &RawProb) -> AbiResult<i32> {
        let state = self.enter("get_num_int");
        Ok(state.prob(prob)?.cols.iter().filter(|c| c.integer).count() as i32)
    }

    fn get_num_bin(&self, prob: &RawProb) -> AbiResult<i32> {
        let state = self.enter("get_num_bin");
        Ok(state.prob(prob)?.cols.iter().filter(|c| c.is_binary()).count() as i32)
    }

    fn init_smcp(&self, parm: Ptr) -> AbiResult<()> {
        let mut state = self.enter("init_smcp");
        state.span(parm, smcp::SIZE)?;
        state.put_int_field(parm, smcp::MSG_LEV, GLP_MSG_ALL)?;
        state.put_int_field(parm, smcp::METH, GLP_PRIMAL)?;
        state.put_int_field(parm, smcp::PRICING, GLP_PT_PSE)?;
        state.put_int_field(parm, smcp::R_TEST, GLP_RT_HAR)?;
        state.put_double_field(parm, smcp::TOL_BND, 1e-7)?;
        state.put_double_field(parm, smcp::TOL_DJ, 1e-7)?;
        state.put_double_field(parm, smcp::TOL_PIV, 1e-10)?;
        state.put_double_field(parm, smcp::OBJ_LL, -f64::MAX)?;
        state.put_double_field(parm, smcp::OBJ_UL, f64::MAX)?;
        state.put_int_field(parm, smcp::IT_LIM, i32::MAX)?;
        state.put_int_field(parm, smcp::TM_LIM, i32::MAX)?;
        state.put_int_field(parm, smcp::OUT_FRQ, 5000)?;
        state.put_int_field(parm, smcp::OUT_DLY, 0)?;
        state.put_int_field(parm, smcp::PRESOLVE, GLP_OFF)
    }

    fn init_iptcp(&self, parm: Ptr) -> AbiResult<()> {
        let mut state = self.enter("init_iptcp");
        state.span(parm, iptcp::SIZE)?;
        state.put_int_field(parm, iptcp::MSG_LEV, GLP_MSG_ALL)?;
        state.put_int_field(parm, iptcp::ORD_ALG, GLP_ORD_AMD)
    }

    fn init_iocp(&self, parm: Ptr) -> AbiResult<()> {
        let mut state = self.enter("init_iocp");
        state.span(parm, iocp::SIZE)?;
        state.put_int_field(parm, iocp::MSG_LEV, GLP_MSG_ALL)?;
        state.put_int_field(parm, iocp::BR_TECH, GLP_BR_DTH)?;
        state.put_int_field(parm, iocp::BT_TECH, GLP_BT_BLB)?;
        state.put_double_field(parm, iocp::TOL_INT, 1e-5)?;
        state.put_double_field(parm, iocp::TOL_OBJ, 1e-7)?;
        state.put_int_field(parm, iocp::TM_LIM, i32::MAX)?;
        state.put_int_field(parm, iocp::OUT_FRQ, 5000)?;
        state.put_int_field(parm, iocp::OUT_DLY, 10000)?;
        state.put_int_field(parm, iocp::PP_TECH, GLP_PP_ALL)?;
        state.put_double_field(parm, iocp::MIP_GAP, 0.0)?;
        state.put_int_field(parm, iocp::PS_TM_LIM, 60000)?;
        state.put_int_field(parm, iocp::SR_HEUR, GLP_ON)
    }

    fn simplex(&self, prob: &RawProb, parm: Ptr) -> AbiResult<i32> {
        self.enter("simplex").solve(prob, parm, smcp::SIZE)
    }

    fn exact(&self, prob: &RawProb, parm: Ptr) -> AbiResult<i32> {
        self.enter("exact").solve(prob, parm, smcp::SIZE)
    }

    fn interior(&self, prob: &RawProb, parm: Ptr) -> AbiResult<i32> {
        self.enter("interior").solve(prob, parm, iptcp::SIZE)
    }

    fn intopt(
        &self,
        prob: &RawProb,
        parm: Ptr,
        callback: Option<&mut dyn FnMut(&RawTree)>,
    ) -> AbiResult<i32> {
        let (code, reasons) = {
            let mut state = self.enter("intopt");
            let code = state.solve(prob, parm, iocp::SIZE)?;
            state.tree_log = FakeTreeLog::default();
            (code, state.tree_script.reasons.clone())
        };
        let Some(callback) = callback else {
            return Ok(code);
        };
        for reason in reasons {
            let raw = {
                let mut state = self.state.borrow_mut();
                state.next_tree += 1;
                let id = state.next_tree;
                state.tree = Some(ActiveTree {
                    id,
                    prob: prob.0,
                    reason,
                    branched: false,
                    selected: false,
                });
                state.tree_log.invocations += 1;
                RawTree(id)
            };
            callback(&raw);
            let mut state = self.state.borrow_mut();
            state.tree = None;
            if state.tree_log.terminated {
                return Ok(GLP_ESTOP);
            }
        }
        Ok(code)
    }

    fn get_status(&self, prob: &RawProb) -> AbiResult<i32> {
        let state = self.enter("get_status");
        Ok(state.prob(prob)?.solution().status)
    }

    fn get_prim_stat(&self, prob: &RawProb) -> AbiResult<i32> {
        let state = self.enter("get_prim_stat");
        Ok(state.prob(prob)?.solution().prim_stat)
    }

    fn get_dual_stat(&self, prob: &RawProb) -> AbiResult<i32> {
        let state = self.enter("get_dual_stat");
        Ok(state.prob(prob)?.solution().dual_stat)
    }

    fn get_obj_val(&self, prob: &RawProb) -> AbiResult<f64> {
        let state = self.enter("get_obj_val");
        Ok(state.prob(prob)?.solution().obj_val)
    }

    fn get_row_stat(&self, prob: &RawProb, i: i32) -> AbiResult<i32> {
        let state = self.enter("get_row_stat");
        let p = state.prob(prob)?;
        p.row("get_row_stat", i);
        Ok(at(&p.solution().row_stat, i, GLP_BS))
    }

    fn get_row_prim(&self, prob: &RawProb, i: i32) -> AbiResult<f64> {
        let state = self.enter("get_row_prim");
        let p = state.prob(prob)?;
        p.row("get_row_prim", i);
        Ok(at(&p.solution().row_prim, i, 0.0))
    }

    fn get_row_dual(&self, prob: &RawProb, i: i32) -> AbiResult<f64> {
        let state = self.enter("get_row_dual");
        let p = state.prob(prob)?;
        p.row("get_row_dual", i);
        Ok(at(&p.solution().row_dual, i, 0.0))
    }

    fn get_col_stat(&self, prob: &RawProb, j: i32) -> AbiResult<i32> {
        let state = self.enter("get_col_stat");
        let p = state.prob(prob)?;
        p.col("get_col_stat", j);
        Ok(at(&p.solution().col_stat, j, GLP_NL))
    }

    fn get_col_prim(&self, prob: &RawProb, j: i32) -> AbiResult<f64> {
        let state = self.enter("get_col_prim");
        let p = state.prob(prob)?;
        p.col("get_col_prim", j);
        Ok(at(&p.solution().col_prim, j, 0.0))
    }

    fn get_col_dual(&self, prob: &RawProb, j: i32) -> AbiResult<f64> {
        let state = self.enter("get_col_dual");
        let p = state.prob(prob)?;
        p.col("get_col_dual", j);
        Ok(at(&p.solution().col_dual, j, 0.0))
    }

    fn get_unbnd_ray(&self, prob: &RawProb) -> AbiResult<i32> {
        let state = self.enter("get_unbnd_ray");
        Ok(state.prob(prob)?.solution().unbnd_ray)
    }

    fn ipt_status(&self, prob: &RawProb) -> AbiResult<i32> {
        let state = self.enter("ipt_status");
        Ok(state.prob(prob)?.solution().ipt_status)
    }

    fn ipt_obj_val(&self, prob: &RawProb) -> AbiResult<f64> {
        let state = self.enter("ipt_obj_val");
        Ok(state.prob(prob)?.solution().ipt_obj_val)
    }

    fn ipt_row_prim(&self, prob: &RawProb, i: i32) -> AbiResult<f64> {
        let state = self.enter("ipt_row_prim");
        let p = state.prob(prob)?;
        p.row("ipt_row_prim", i);
        Ok(at(&p.solution().ipt_row_prim, i, 0.0))
    }

    fn ipt_row_dual(&self, prob: &RawProb, i: i32) -> AbiResult<f64> {
        let state = self.enter("ipt_row_dual");
        let p = state.prob(prob)?;
        p.row("ipt_row_dual", i);
        Ok(at(&p.solution().ipt_row_dual, i, 0.0))
    }

    fn ipt_col_prim(&self, prob: &RawProb, j: i32) -> AbiResult<f64> {
        let state = self.enter("ipt_col_prim");
        let p = state.prob(prob)?;
        p.col("ipt_col_prim", j);
        Ok(at(&p.solution().ipt_col_prim, j, 0.0))
    }

    fn ipt_col_dual(&self, prob: &RawProb, j: i32) -> AbiResult<f64> {
        let state = self.enter("ipt_col_dual");
        let p = state.prob(prob)?;
        p.col("ipt_col_dual", j);
        Ok(at(&p.solution().ipt_col_dual, j, 0.0))
    }

    fn mip_status(&self, prob: &RawProb) -> AbiResult<i32> {
        let state = self.enter("mip_status");
        Ok(state.prob(prob)?.solution().mip_status)
    }

    fn mip_obj_val(&self, prob: &RawProb) -> AbiResult<f64> {
        let state = self.enter("mip_obj_val");
        Ok(state.prob(prob)?.solution().mip_obj_val)
    }

    fn mip_row_val(&self, prob: &RawProb, i: i32) -> AbiResult<f64> {
        let state = self.enter("mip_row_val");
        let p = state.prob(prob)?;
        p.row("mip_row_val", i);
        Ok(at(&p.solution().mip_row_val, i, 0.0))
    }

    fn mip_col_val(&self, prob: &RawProb, j: i32) -> AbiResult<f64> {
        let state = self.enter("mip_col_val");
        let p = state.prob(prob)?;
        p.col("mip_col_val", j);
        Ok(at(&p.solution().mip_col_val, j, 0.0))
    }

    fn bf_exists(&self, prob: &RawProb) -> AbiResult<bool> {
        let state = self.enter("bf_exists");
        Ok(state.prob(prob)?.solution().bf_exists)
    }

    fn eval_tab_row(&self, prob: &RawProb, k: i32, ind: Ptr, val: Ptr) -> AbiResult<i32> {
        let mut state = self.enter("eval_tab_row");
        let p = state.prob(prob)?;
        assert!(
            k >= 1 && k <= p.total(),
            "glp_eval_tab_row: k = {}; variable number out of range",
            k
        );
        let solution = p.solution();
        assert!(
            solution.bf_exists,
            "glp_eval_tab_row: basis factorization does not exist"
        );
        let entries = solution
            .tab_rows
            .get(&k)
            .unwrap_or_else(|| panic!("glp_eval_tab_row: k = {}; variable is not basic", k))
            .clone();
        for (pos, &(index, value)) in entries.iter().enumerate() {
            state.put_i32(ind.offset(4 * (pos + 1)), index)?;
            state.put_f64(val.offset(8 * (pos + 1)), value)?;
        }
        Ok(entries.len() as i32)
    }

    fn eval_tab_col(&self, prob: &RawProb, k: i32, ind: Ptr, val: Ptr) -> AbiResult<i32> {
        let mut state = self.enter("eval_tab_col");
        let p = state.prob(prob)?;
        assert!(
            k >= 1 && k <= p.total(),
            "glp_eval_tab_col: k = {}; variable number out of range",
            k
        );
        let solution = p.solution();
        assert!(
            solution.bf_exists,
            "glp_eval_tab_col: basis factorization does not exist"
        );
        let entries = solution
            .tab_cols
            .get(&k)
            .unwrap_or_else(|| panic!("glp_eval_tab_col: k = {}; variable must be non-basic", k))
            .clone();
        for (pos, &(index, value)) in entries.iter().enumerate() {
            state.put_i32(ind.offset(4 * (pos + 1)), index)?;
            state.put_f64(val.offset(8 * (pos + 1)), value)?;
        }
        Ok(entries.len() as i32)
    }

    fn write_lp(&self, prob: &RawProb, fname: Ptr) -> AbiResult<i32> {
        let state = self.enter("write_lp");
        write_file(&state, prob, fname, file_tag("lp", 0))
    }

    fn read_lp(&self, prob: &RawProb, fname: Ptr) -> AbiResult<i32> {
        let mut state = self.enter("read_lp");
        read_file(&mut state, prob, fname, file_tag("lp", 0))
    }

    fn write_mps(&self, prob: &RawProb, fmt: i32, fname: Ptr) -> AbiResult<i32> {
        let state = self.enter("write_mps");
        write_file(&state, prob, fname, file_tag("mps", fmt))
    }

    fn read_mps(&self, prob: &RawProb, fmt: i32, fname: Ptr) -> AbiResult<i32> {
        let mut state = self.enter("read_mps");
        read_file(&mut state, prob, fname, file_tag("mps", fmt))
    }

    fn ios_reason(&self, tree: &RawTree) -> AbiResult<i32> {
        let state = self.enter("ios_reason");
        Ok(state.tree(tree)?.reason)
    }

    fn ios_problem_size(&self, tree: &RawTree) -> AbiResult<(i32, i32)> {
        self.enter("ios_get_prob").tree_size(tree)
    }

    fn ios_row_attr(&self, tree: &RawTree, i: i32, out: Ptr) -> AbiResult<()> {
        let mut state = self.enter("ios_row_attr");
        let (rows, _) = state.tree_size(tree)?;
        assert!(
            i >= 1 && i <= rows,
            "glp_ios_row_attr: i = {}; row number out of range",
            i
        );
        state.span(out, attr::SIZE)?;
        let (level, origin, klass) = at(&state.tree_script.row_attrs, i, (0, GLP_RF_REG, 0));
        state.put_int_field(out, attr::LEVEL, level)?;
        state.put_int_field(out, attr::ORIGIN, origin)?;
        state.put_int_field(out, attr::KLASS, klass)
    }

    fn ios_mip_gap(&self, tree: &RawTree) -> AbiResult<f64> {
        let state = self.enter("ios_mip_gap");
        state.tree(tree)?;
        Ok(state.tree_script.gap)
    }

    fn ios_heur_sol(&self, tree: &RawTree, x: Ptr) -> AbiResult<i32> {
        let mut state = self.enter("ios_heur_sol");
        let prob = state.tree(tree)?.prob;
        let integer: Vec<bool> = state
            .problems
            .get(&prob)
            .ok_or(AbiError::UnknownProblem)?
            .cols
            .iter()
            .map(|c| c.integer)
            .collect();
        let values = (1..=integer.len())
            .map(|j| state.get_f64(x.offset(8 * j)))
            .collect::<AbiResult<Vec<f64>>>()?;
        let rejected = values
            .iter()
            .zip(&integer)
            .any(|(v, &int)| int && v.fract() != 0.0);
        state.tree_log.heuristic.push(values);
        Ok(i32::from(rejected))
    }

    fn ios_can_branch(&self, tree: &RawTree, j: i32) -> AbiResult<bool> {
        let state = self.enter("ios_can_branch");
        let (_, cols) = state.tree_size(tree)?;
        assert!(
            j >= 1 && j <= cols,
            "glp_ios_can_branch: j = {}; column number out of range",
            j
        );
        Ok(state.tree_script.branchable.contains(&j))
    }

    fn ios_branch_upon(&self, tree: &RawTree, j: i32, sel: i32) -> AbiResult<()> {
        let mut state = self.enter("ios_branch_upon");
        let (_, cols) = state.tree_size(tree)?;
        assert!(
            j >= 1 && j <= cols,
            "glp_ios_branch_upon: j = {}; column number out of range",
            j
        );
        assert!(
            matches!(sel, GLP_NO_BRNCH | GLP_DN_BRNCH | GLP_UP_BRNCH),
            "glp_ios_branch_upon: sel = {}: invalid branch selection flag",
            sel
        );
        assert!(
            state.tree_script.branchable.contains(&j),
            "glp_ios_branch_upon: j = {}; cannot branch upon specified variable",
            j
        );
        let active = state.tree_mut(tree)?;
        assert!(!active.branched, "glp_ios_branch_upon: branching variable already chosen");
        active.branched = true;
        state.tree_log.branched.push((j, sel));
        Ok(())
    }

    fn ios_select_node(&self, tree: &RawTree, p: i32) -> AbiResult<()> {
        let mut state = self.enter("ios_select_node");
        state.tree(tree)?;
        assert!(
            state.node("ios_select_node", p).active,
            "glp_ios_select_node: p = {}; subproblem not in the active list",
            p
        );
        let active = state.tree_mut(tree)?;
        assert!(!active.selected, "glp_ios_select_node: subproblem already selected");
        active.selected = true;
        state.tree_log.selected.push(p);
        Ok(())
    }

    fn ios_terminate(&self, tree: &RawTree) -> AbiResult<()> {
        let mut state = self.enter("ios_terminate");
        state.tree(tree)?;
        state.tree_log.terminated = true;
        Ok(())
    }

    fn ios_tree_size(&self, tree: &RawTree) -> AbiResult<(i32, i32, i32)> {
        let state = self.enter("ios_tree_size");
        state.tree(tree)?;
        let nodes = &state.tree_script.nodes;
        let active = nodes.iter().filter(|node| node.active).count() as i32;
        Ok((active, nodes.len() as i32, nodes.len() as i32))
    }

    fn ios_curr_node(&self, tree: &RawTree) -> AbiResult<i32> {
        let state = self.enter("ios_curr_node");
        let reason = state.tree(tree)?.reason;
        Ok(if reason == GLP_ISELECT {
            0
        } else {
            state.tree_script.current
        })
    }

    fn ios_best_node(&self, tree: &RawTree) -> AbiResult<i32> {
        let state = self.enter("ios_best_node");
        state.tree(tree)?;
        Ok(state.tree_script.best)
    }

    fn ios_next_node(&self, tree: &RawTree, p: i32) -> AbiResult<i32> {
        let state = self.enter("ios_next_node");
        state.tree(tree)?;
        Ok(state.walk("ios_next_node", p, false))
    }

    fn ios_prev_node(&self, tree: &RawTree, p: i32) -> AbiResult<i32> {
        let state = self.enter("ios_prev_node");
        state.tree(tree)?;
        Ok(state.walk("ios_prev_node", p, true))
    }

    fn ios_up_node(&self, tree: &RawTree, p: i32) -> AbiResult<i32> {
        let state = self.enter("ios_up_node");
        state.tree(tree)?;
        Ok(state.node("ios_up_node", p).parent)
    }

    fn ios_node_level(&self, tree: &RawTree, p: i32) -> AbiResult<i32> {
        let state = self.enter("ios_node_level");
        state.tree(tree)?;
        Ok(state.node("ios_node_level", p).level)
    }

    fn ios_node_bound(&self, tree: &RawTree, p: i32) -> AbiResult<f64> {
        let state = self.enter("ios_node_bound");
        state.tree(tree)?;
        Ok(state.node("ios_node_bound", p).bound)
    }

    fn ios_pool_size(&self, tree: &RawTree) -> AbiResult<i32> {
        let state = self.enter("ios_pool_size");
        assert_eq!(
            state.tree(tree)?.reason,
            GLP_ICUTGEN,
            "glp_ios_pool_size: operation not allowed"
        );
        Ok(state.tree_script.pool_size)
    }

    fn ios_clear_pool(&self, tree: &RawTree) -> AbiResult<()> {
        let mut state = self.enter("ios_clear_pool");
        assert_eq!(
            state.tree(tree)?.reason,
            GLP_ICUTGEN,
            "glp_ios_clear_pool: operation not allowed"
        );
        state.tree_script.pool_size = 0;
        state.tree_log.pool_cleared += 1;
        Ok(())
    }
}

fn write_file(state: &State, prob: &RawProb, fname: Ptr, format: String) -> AbiResult<i32> {
    let path = state.c_str(fname)?;
    let file = FakeFile {
        format,
        problem: state.prob(prob)?.clone(),
    };
    let written = serde_json::to_string_pretty(&file)
        .ok()
        .and_then(|text| std::fs::write(&path, text).ok());
    Ok(if written.is_some() { 0 } else { 1 })
}

fn read_file(state: &mut State, prob: &RawProb, fname: Ptr, format: String) -> AbiResult<i32> {
    let path = state.c_str(fname)?;
    let parsed = std::fs::read_to_string(&path)
        .ok()
        .and_then(|text| serde_json::from_str::<FakeFile>(&text).ok())
        .filter(|file| file.format == format);
    let target = state.prob_mut(prob)?;
    // The engine erases the problem object before reading.
    *target = FakeProblem {
        dir: GLP_MIN,
        ..FakeProblem::default()
    };
    match parsed {
        Some(file) => {
            *target = file.problem;
            Ok(0)
        }
        None => Ok(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_kind_reported_for_unit_integer_column() {
        let fake = FakeEngine::new();
        let prob = fake.create_prob().unwrap();
        fake.add_cols(&prob, 2).unwrap();
        fake.set_col_kind(&prob, 1, GLP_BV).unwrap();
        fake.set_col_kind(&prob, 2, GLP_IV).unwrap();
        assert_eq!(fake.get_col_kind(&prob, 1).unwrap(), GLP_BV);
        assert_eq!(fake.get_col_kind(&prob, 2).unwrap(), GLP_IV);
        assert_eq!(fake.get_num_int(&prob).unwrap(), 2);
        assert_eq!(fake.get_num_bin(&prob).unwrap(), 1);
        fake.delete_prob(prob).unwrap();
        assert_eq!(fake.live_problems(), 0);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_bound_getters_follow_type() {
        let fake = FakeEngine::new();
        let prob = fake.create_prob().unwrap();
        fake.add_rows(&prob, 1).unwrap();
        fake.set_row_bnds(&prob, 1, GLP_UP, 0.0, 4.0).unwrap();
        assert_eq!(fake.get_row_lb(&prob, 1).unwrap(), -f64::MAX);
        assert_eq!(fake.get_row_ub(&prob, 1).unwrap(), 4.0);
        fake.set_row_bnds(&prob, 1, GLP_FX, 2.0, 9.0).unwrap();
        assert_eq!(fake.get_row_ub(&prob, 1).unwrap(), 2.0);
        fake.delete_prob(prob).unwrap();
    }

    #[test]
    fn test_counts_calls() {
        let fake = FakeEngine::new();
        let prob = fake.create_prob().unwrap();
        fake.get_num_rows(&prob).unwrap();
        fake.get_num_rows(&prob).unwrap();
        assert_eq!(fake.calls("get_num_rows"), 2);
        assert_eq!(fake.calls("create_prob"), 1);
        fake.reset_calls();
        assert_eq!(fake.calls("create_prob"), 0);
        fake.delete_prob(prob).unwrap();
    }

    #[test]
    fn test_malloc_budget() {
        let fake = FakeEngine::new();
        fake.fail_malloc_after(1);
        let first = fake.malloc(4).unwrap();
        assert!(fake.malloc(4).is_err());
        fake.free(first).unwrap();
        assert_eq!(fake.live_allocations(), 0);
    }

    #[test]
    fn test_unknown_pointer_rejected() {
        let fake = FakeEngine::new();
        let ptr = fake.malloc(4).unwrap();
        assert!(fake.write_bytes(ptr, &[0; 8]).is_err());
        fake.free(ptr).unwrap();
        assert!(fake.free(ptr).is_err());
    }

    #[test]
    #[should_panic(expected = "row number out of range")]
    fn test_out_of_range_row_aborts() {
        let fake = FakeEngine::new();
        let prob = fake.create_prob().unwrap();
        let _ = fake.get_row_type(&prob, 1);
    }

    fn node(level: i32, parent: i32, active: bool) -> FakeNode {
        FakeNode {
            level,
            bound: 0.0,
            parent,
            active,
        }
    }

    /// Runs `intopt` on a two-column problem with `tree` scripted.
    fn search(fake: &FakeEngine, tree: FakeTree, mut body: impl FnMut(&RawTree)) -> i32 {
        fake.script_tree(tree);
        let prob = fake.create_prob().unwrap();
        fake.add_cols(&prob, 2).unwrap();
        let parm = fake.malloc(iocp::SIZE).unwrap();
        fake.init_iocp(parm).unwrap();
        let mut hook = |raw: &RawTree| body(raw);
        let code = fake.intopt(&prob, parm, Some(&mut hook)).unwrap();
        fake.free(parm).unwrap();
        fake.delete_prob(prob).unwrap();
        code
    }

    #[test]
    fn test_tree_handle_valid_only_inside_callback() {
        let fake = FakeEngine::new();
        let tree = FakeTree {
            reasons: vec![GLP_IROWGEN, GLP_IHEUR],
            ..FakeTree::default()
        };
        let mut ids = Vec::new();
        search(&fake, tree, |raw| {
            assert!(fake.ios_reason(raw).is_ok());
            let other = RawTree(raw.0 + 1);
            assert_eq!(fake.ios_reason(&other), Err(AbiError::UnknownTree));
            ids.push(raw.0);
        });
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(fake.ios_reason(&RawTree(ids[1])), Err(AbiError::UnknownTree));
    }

    #[test]
    fn test_node_walk_visits_active_list() {
        let fake = FakeEngine::new();
        let tree = FakeTree {
            reasons: vec![GLP_ISELECT],
            nodes: vec![
                node(0, 0, false),
                node(1, 1, true),
                node(1, 1, false),
                node(2, 3, true),
            ],
            ..FakeTree::default()
        };
        search(&fake, tree, |raw| {
            let mut forward = Vec::new();
            let mut p = 0;
            loop {
                p = fake.ios_next_node(raw, p).unwrap();
                if p == 0 {
                    break;
                }
                forward.push(p);
            }
            assert_eq!(forward, vec![2, 4]);
            assert_eq!(fake.ios_prev_node(raw, 0).unwrap(), 4);
            assert_eq!(fake.ios_prev_node(raw, 4).unwrap(), 2);
            assert_eq!(fake.ios_prev_node(raw, 2).unwrap(), 0);
            assert_eq!(fake.ios_up_node(raw, 4).unwrap(), 3);
            assert_eq!(fake.ios_curr_node(raw).unwrap(), 0);
            assert_eq!(fake.ios_tree_size(raw).unwrap(), (2, 4, 4));
        });
    }

    #[test]
    #[should_panic(expected = "operation not allowed")]
    fn test_cut_pool_outside_cut_generation_aborts() {
        let fake = FakeEngine::new();
        let tree = FakeTree {
            reasons: vec![GLP_IHEUR],
            ..FakeTree::default()
        };
        search(&fake, tree, |raw| {
            let _ = fake.ios_pool_size(raw);
        });
    }

    #[test]
    #[should_panic(expected = "branching variable already chosen")]
    fn test_second_branch_aborts() {
        let fake = FakeEngine::new();
        let tree = FakeTree {
            reasons: vec![GLP_IBRANCH],
            branchable: vec![1],
            ..FakeTree::default()
        };
        search(&fake, tree, |raw| {
            let _ = fake.ios_branch_upon(raw, 1, GLP_DN_BRNCH);
            let _ = fake.ios_branch_upon(raw, 1, GLP_UP_BRNCH);
        });
    }
}
