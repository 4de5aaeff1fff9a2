//! Owned engine problem object with checked indices.

use std::path::Path;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::abi::{Abi, RawProb, RawTree};
use crate::engine::Engine;
use crate::error::{AbiError, AbiResult};
use crate::layout::{iocp, iptcp, smcp};
use crate::memory::{Bridge, Buffer};

/// Exclusively owned GLPK problem object, deleted on drop.
///
/// Every index is range-checked here because the engine aborts the process
/// on an out-of-range row or column.
pub struct Problem {
    abi: Rc<dyn Abi>,
    raw: RawProb,
    rows: u32,
    cols: u32,
}

impl Problem {
    pub fn new(engine: &Engine) -> AbiResult<Self> {
        let abi = engine.abi()?;
        let raw = abi.create_prob()?;
        debug!(
            component = "problem",
            operation = "create",
            status = "success",
            addr = raw.addr(),
            "Created engine problem"
        );
        Ok(Self {
            abi,
            raw,
            rows: 0,
            cols: 0,
        })
    }

    pub fn abi(&self) -> &dyn Abi {
        self.abi.as_ref()
    }

    pub fn bridge(&self) -> Bridge<'_> {
        Bridge::new(self.abi.as_ref())
    }

    pub fn num_rows(&self) -> u32 {
        self.rows
    }

    pub fn num_cols(&self) -> u32 {
        self.cols
    }

    fn row(&self, i: u32) -> AbiResult<i32> {
        if i >= 1 && i <= self.rows {
            Ok(i as i32)
        } else {
            Err(AbiError::RowOutOfRange {
                index: i,
                rows: self.rows,
            })
        }
    }

    fn col(&self, j: u32) -> AbiResult<i32> {
        if j >= 1 && j <= self.cols {
            Ok(j as i32)
        } else {
            Err(AbiError::ColumnOutOfRange {
                index: j,
                cols: self.cols,
            })
        }
    }

    fn entity(&self, k: u32) -> AbiResult<i32> {
        let total = self.rows + self.cols;
        if k >= 1 && k <= total {
            Ok(k as i32)
        } else {
            Err(AbiError::EntityOutOfRange { index: k, total })
        }
    }

    fn check_buffer(&self, buffer: &Buffer<'_>, needed: usize) -> AbiResult<()> {
        if !buffer.belongs_to(self.abi.as_ref()) {
            return Err(AbiError::ForeignBuffer);
        }
        if buffer.size() < needed {
            return Err(AbiError::BufferTooSmall {
                needed,
                size: buffer.size(),
            });
        }
        Ok(())
    }

    pub fn name(&self) -> AbiResult<Option<String>> {
        self.abi.get_prob_name(&self.raw)
    }

    pub fn set_name(&self, name: &str) -> AbiResult<()> {
        let name = self.bridge().name(name)?;
        self.abi.set_prob_name(&self.raw, name.ptr())
    }

    pub fn obj_dir(&self) -> AbiResult<i32> {
        self.abi.get_obj_dir(&self.raw)
    }

    pub fn set_obj_dir(&self, dir: i32) -> AbiResult<()> {
        self.abi.set_obj_dir(&self.raw, dir)
    }

    /// Appends `count` rows and returns the index of the first one.
    pub fn add_rows(&mut self, count: u32) -> AbiResult<u32> {
        if count == 0 {
            return Ok(self.rows + 1);
        }
        let (batch, total) = grown("rows", self.rows, count)?;
        let first = self.abi.add_rows(&self.raw, batch)? as u32;
        self.rows = total;
        trace!(component = "problem", operation = "add_rows", first, count, "Added rows");
        Ok(first)
    }

    /// Appends `count` columns and returns the index of the first one.
    pub fn add_cols(&mut self, count: u32) -> AbiResult<u32> {
        if count == 0 {
            return Ok(self.cols + 1);
        }
        let (batch, total) = grown("columns", self.cols, count)?;
        let first = self.abi.add_cols(&self.raw, batch)? as u32;
        self.cols = total;
        trace!(component = "problem", operation = "add_cols", first, count, "Added columns");
        Ok(first)
    }

    pub fn row_name(&self, i: u32) -> AbiResult<Option<String>> {
        self.abi.get_row_name(&self.raw, self.row(i)?)
    }

    pub fn set_row_name(&self, i: u32, name: &str) -> AbiResult<()> {
        let i = self.row(i)?;
        let name = self.bridge().name(name)?;
        self.abi.set_row_name(&self.raw, i, name.ptr())
    }

    pub fn col_name(&self, j: u32) -> AbiResult<Option<String>> {
        self.abi.get_col_name(&self.raw, self.col(j)?)
    }

    pub fn set_col_name(&self, j: u32, name: &str) -> AbiResult<()> {
        let j = self.col(j)?;
        let name = self.bridge().name(name)?;
        self.abi.set_col_name(&self.raw, j, name.ptr())
    }

    pub fn set_row_bnds(&self, i: u32, kind: i32, lb: f64, ub: f64) -> AbiResult<()> {
        self.abi.set_row_bnds(&self.raw, self.row(i)?, kind, lb, ub)
    }

    pub fn set_col_bnds(&self, j: u32, kind: i32, lb: f64, ub: f64) -> AbiResult<()> {
        self.abi.set_col_bnds(&self.raw, self.col(j)?, kind, lb, ub)
    }

    /// Bound type and both bounds of row `i`, as the engine reports them.
    pub fn row_bnds(&self, i: u32) -> AbiResult<(i32, f64, f64)> {
        let i = self.row(i)?;
        Ok((
            self.abi.get_row_type(&self.raw, i)?,
            self.abi.get_row_lb(&self.raw, i)?,
            self.abi.get_row_ub(&self.raw, i)?,
        ))
    }

    /// Bound type and both bounds of column `j`, as the engine reports them.
    pub fn col_bnds(&self, j: u32) -> AbiResult<(i32, f64, f64)> {
        let j = self.col(j)?;
        Ok((
            self.abi.get_col_type(&self.raw, j)?,
            self.abi.get_col_lb(&self.raw, j)?,
            self.abi.get_col_ub(&self.raw, j)?,
        ))
    }

    /// Objective coefficient of column `j`; `j == 0` is the constant term.
    pub fn obj_coef(&self, j: u32) -> AbiResult<f64> {
        let j = if j == 0 { 0 } else { self.col(j)? };
        self.abi.get_obj_coef(&self.raw, j)
    }

    pub fn set_obj_coef(&self, j: u32, coef: f64) -> AbiResult<()> {
        let j = if j == 0 { 0 } else { self.col(j)? };
        self.abi.set_obj_coef(&self.raw, j, coef)
    }

    pub fn col_kind(&self, j: u32) -> AbiResult<i32> {
        self.abi.get_col_kind(&self.raw, self.col(j)?)
    }

    pub fn set_col_kind(&self, j: u32, kind: i32) -> AbiResult<()> {
        self.abi.set_col_kind(&self.raw, self.col(j)?, kind)
    }

    /// Replaces row `i` with the `len` entries held in slots `1..=len` of `ind`
    /// and `val`.
    ///
    /// Column indices are checked for range and uniqueness first; the engine
    /// aborts on either.
    pub fn set_mat_row(&self, i: u32, len: usize, ind: &Buffer<'_>, val: &Buffer<'_>) -> AbiResult<()> {
        let row = self.row(i)?;
        self.check_buffer(ind, (len + 1) * 4)?;
        self.check_buffer(val, (len + 1) * 8)?;
        let mut seen = std::collections::HashSet::with_capacity(len);
        for column in ind.read_i32s(1, len)? {
            let column = u32::try_from(column).unwrap_or(0);
            self.col(column)?;
            if !seen.insert(column) {
                return Err(AbiError::DuplicateColumn { row: i, column });
            }
        }
        trace!(component = "problem", operation = "set_mat_row", row = i, len, "Setting row");
        self.abi
            .set_mat_row(&self.raw, row, len as i32, ind.ptr(), val.ptr())
    }

    /// Nonzero entries of row `i` as `(column, value)` pairs.
    pub fn mat_row(&self, i: u32) -> AbiResult<Vec<(u32, f64)>> {
        let row = self.row(i)?;
        let bridge = self.bridge();
        let slots = self.cols as usize + 1;
        let ind = bridge.alloc_ints(slots)?;
        let val = bridge.alloc_doubles(slots)?;
        let len = self.abi.get_mat_row(&self.raw, row, ind.ptr(), val.ptr())?;
        let len = usize::try_from(len).unwrap_or(0);
        let columns = ind.read_i32s(1, len)?;
        let values = val.read_f64s(1, len)?;
        Ok(columns
            .into_iter()
            .map(|j| j as u32)
            .zip(values)
            .collect())
    }

    pub fn num_nz(&self) -> AbiResult<u32> {
        Ok(self.abi.get_num_nz(&self.raw)? as u32)
    }

    pub fn num_int(&self) -> AbiResult<u32> {
        Ok(self.abi.get_num_int(&self.raw)? as u32)
    }

    pub fn num_bin(&self) -> AbiResult<u32> {
        Ok(self.abi.get_num_bin(&self.raw)? as u32)
    }

    pub fn simplex(&self, parm: &Buffer<'_>) -> AbiResult<i32> {
        self.check_buffer(parm, smcp::SIZE)?;
        self.abi.simplex(&self.raw, parm.ptr())
    }

    pub fn exact(&self, parm: &Buffer<'_>) -> AbiResult<i32> {
        self.check_buffer(parm, smcp::SIZE)?;
        self.abi.exact(&self.raw, parm.ptr())
    }

    pub fn interior(&self, parm: &Buffer<'_>) -> AbiResult<i32> {
        self.check_buffer(parm, iptcp::SIZE)?;
        self.abi.interior(&self.raw, parm.ptr())
    }

    /// Runs branch-and-cut; `callback` gets the engine and the search tree
    /// at every point the driver offers one.
    pub fn intopt(
        &self,
        parm: &Buffer<'_>,
        callback: Option<&mut dyn FnMut(&dyn Abi, &RawTree)>,
    ) -> AbiResult<i32> {
        self.check_buffer(parm, iocp::SIZE)?;
        let abi = self.abi.as_ref();
        match callback {
            Some(callback) => {
                let mut forward = |tree: &RawTree| callback(abi, tree);
                self.abi.intopt(&self.raw, parm.ptr(), Some(&mut forward))
            }
            None => self.abi.intopt(&self.raw, parm.ptr(), None),
        }
    }

    pub fn status(&self) -> AbiResult<i32> {
        self.abi.get_status(&self.raw)
    }

    pub fn prim_stat(&self) -> AbiResult<i32> {
        self.abi.get_prim_stat(&self.raw)
    }

    pub fn dual_stat(&self) -> AbiResult<i32> {
        self.abi.get_dual_stat(&self.raw)
    }

    pub fn obj_val(&self) -> AbiResult<f64> {
        self.abi.get_obj_val(&self.raw)
    }

    pub fn row_stat(&self, i: u32) -> AbiResult<i32> {
        self.abi.get_row_stat(&self.raw, self.row(i)?)
    }

    pub fn row_prim(&self, i: u32) -> AbiResult<f64> {
        self.abi.get_row_prim(&self.raw, self.row(i)?)
    }

    pub fn row_dual(&self, i: u32) -> AbiResult<f64> {
        self.abi.get_row_dual(&self.raw, self.row(i)?)
    }

    pub fn col_stat(&self, j: u32) -> AbiResult<i32> {
        self.abi.get_col_stat(&self.raw, self.col(j)?)
    }

    pub fn col_prim(&self, j: u32) -> AbiResult<f64> {
        self.abi.get_col_prim(&self.raw, self.col(j)?)
    }

    pub fn col_dual(&self, j: u32) -> AbiResult<f64> {
        self.abi.get_col_dual(&self.raw, self.col(j)?)
    }

    /// Combined index of the unbounded ray's entity, 0 when there is none.
    pub fn unbnd_ray(&self) -> AbiResult<u32> {
        Ok(u32::try_from(self.abi.get_unbnd_ray(&self.raw)?).unwrap_or(0))
    }

    pub fn ipt_status(&self) -> AbiResult<i32> {
        self.abi.ipt_status(&self.raw)
    }

    pub fn ipt_obj_val(&self) -> AbiResult<f64> {
        self.abi.ipt_obj_val(&self.raw)
    }

    pub fn ipt_row_prim(&self, i: u32) -> AbiResult<f64> {
        self.abi.ipt_row_prim(&self.raw, self.row(i)?)
    }

    pub fn ipt_row_dual(&self, i: u32) -> AbiResult<f64> {
        self.abi.ipt_row_dual(&self.raw, self.row(i)?)
    }

    pub fn ipt_col_prim(&self, j: u32) -> AbiResult<f64> {
        self.abi.ipt_col_prim(&self.raw, self.col(j)?)
    }

    pub fn ipt_col_dual(&self, j: u32) -> AbiResult<f64> {
        self.abi.ipt_col_dual(&self.raw, self.col(j)?)
    }

    pub fn mip_status(&self) -> AbiResult<i32> {
        self.abi.mip_status(&self.raw)
    }

    pub fn mip_obj_val(&self) -> AbiResult<f64> {
        self.abi.mip_obj_val(&self.raw)
    }

    pub fn mip_row_val(&self, i: u32) -> AbiResult<f64> {
        self.abi.mip_row_val(&self.raw, self.row(i)?)
    }

    pub fn mip_col_val(&self, j: u32) -> AbiResult<f64> {
        self.abi.mip_col_val(&self.raw, self.col(j)?)
    }

    pub fn bf_exists(&self) -> AbiResult<bool> {
        self.abi.bf_exists(&self.raw)
    }

    /// Row of the simplex tableau for basic entity `k` as raw `(index, value)`
    /// pairs, read from slots `1..=len` of buffers sized `cols + 1`.
    ///
    /// The caller must have checked that a factorization exists and that `k`
    /// is basic.
    pub fn eval_tab_row(&self, k: u32) -> AbiResult<Vec<(i32, f64)>> {
        let k = self.entity(k)?;
        self.eval_tab(k, self.cols as usize + 1, |abi, raw, ind, val| {
            abi.eval_tab_row(raw, k, ind, val)
        })
    }

    /// Column of the simplex tableau for nonbasic entity `k`, from buffers
    /// sized `rows + 1`.
    pub fn eval_tab_col(&self, k: u32) -> AbiResult<Vec<(i32, f64)>> {
        let k = self.entity(k)?;
        self.eval_tab(k, self.rows as usize + 1, |abi, raw, ind, val| {
            abi.eval_tab_col(raw, k, ind, val)
        })
    }

    fn eval_tab(
        &self,
        k: i32,
        slots: usize,
        eval: impl FnOnce(&dyn Abi, &RawProb, crate::Ptr, crate::Ptr) -> AbiResult<i32>,
    ) -> AbiResult<Vec<(i32, f64)>> {
        let bridge = self.bridge();
        let ind = bridge.alloc_ints(slots)?;
        let val = bridge.alloc_doubles(slots)?;
        let len = eval(self.abi.as_ref(), &self.raw, ind.ptr(), val.ptr())?;
        let len = usize::try_from(len).unwrap_or(0).min(slots - 1);
        let indices = ind.read_i32s(1, len)?;
        let values = val.read_f64s(1, len)?;
        trace!(component = "problem", operation = "eval_tab", k, len, "Evaluated tableau");
        Ok(indices.into_iter().zip(values).collect())
    }

    pub fn write_lp(&self, path: &Path) -> AbiResult<i32> {
        let fname = self.bridge().path(path)?;
        self.abi.write_lp(&self.raw, fname.ptr())
    }

    pub fn write_mps(&self, fmt: i32, path: &Path) -> AbiResult<i32> {
        let fname = self.bridge().path(path)?;
        self.abi.write_mps(&self.raw, fmt, fname.ptr())
    }

    /// Replaces the problem with the contents of an LP file.
    pub fn read_lp(&mut self, path: &Path) -> AbiResult<i32> {
        let code = {
            let fname = self.bridge().path(path)?;
            self.abi.read_lp(&self.raw, fname.ptr())?
        };
        self.refresh()?;
        Ok(code)
    }

    /// Replaces the problem with the contents of an MPS file.
    pub fn read_mps(&mut self, fmt: i32, path: &Path) -> AbiResult<i32> {
        let code = {
            let fname = self.bridge().path(path)?;
            self.abi.read_mps(&self.raw, fmt, fname.ptr())?
        };
        self.refresh()?;
        Ok(code)
    }

    fn refresh(&mut self) -> AbiResult<()> {
        self.rows = u32::try_from(self.abi.get_num_rows(&self.raw)?).unwrap_or(0);
        self.cols = u32::try_from(self.abi.get_num_cols(&self.raw)?).unwrap_or(0);
        Ok(())
    }
}

/// Engine batch size and new total for appending `count` to `existing`.
///
/// The engine counts rows and columns in a C `int`.
fn grown(kind: &'static str, existing: u32, count: u32) -> AbiResult<(i32, u32)> {
    let overflow = AbiError::CountOverflow {
        kind,
        existing,
        count,
    };
    let batch = i32::try_from(count).map_err(|_| overflow.clone())?;
    let total = existing
        .checked_add(count)
        .filter(|&total| i32::try_from(total).is_ok())
        .ok_or(overflow)?;
    Ok((batch, total))
}

impl Drop for Problem {
    fn drop(&mut self) {
        let raw = std::mem::replace(&mut self.raw, RawProb(0));
        let addr = raw.addr();
        match self.abi.delete_prob(raw) {
            Ok(()) => trace!(
                component = "problem",
                operation = "delete",
                addr,
                "Deleted engine problem"
            ),
            Err(err) => warn!(
                component = "problem",
                operation = "delete",
                addr,
                error = %err,
                "Failed to delete engine problem"
            ),
        }
    }
}

impl std::fmt::Debug for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Problem")
            .field("addr", &self.raw.addr())
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::*;
    use crate::fake::{FakeEngine, FakeSolution};

    fn setup() -> (FakeEngine, Problem) {
        let fake = FakeEngine::new();
        let engine = Engine::with_abi(fake.clone());
        let problem = Problem::new(&engine).unwrap();
        (fake, problem)
    }

    #[test]
    fn test_problem_deleted_on_drop() {
        let (fake, problem) = setup();
        assert_eq!(fake.live_problems(), 1);
        drop(problem);
        assert_eq!(fake.live_problems(), 0);
        assert_eq!(fake.calls("delete_prob"), 1);
    }

    #[test]
    fn test_new_requires_ready_engine() {
        let err = Problem::new(&Engine::new()).unwrap_err();
        assert_eq!(err.code(), "ENGINE_NOT_READY");
    }

    #[test]
    fn test_index_checks_precede_engine_calls() {
        let (fake, mut problem) = setup();
        assert_eq!(problem.add_rows(2).unwrap(), 1);
        assert_eq!(problem.add_cols(1).unwrap(), 1);
        assert!(matches!(
            problem.row_stat(3),
            Err(AbiError::RowOutOfRange { index: 3, rows: 2 })
        ));
        assert!(matches!(
            problem.col_prim(0),
            Err(AbiError::ColumnOutOfRange { index: 0, cols: 1 })
        ));
        assert!(matches!(
            problem.eval_tab_row(4),
            Err(AbiError::EntityOutOfRange { index: 4, total: 3 })
        ));
        assert_eq!(fake.calls("get_row_stat"), 0);
        assert_eq!(fake.calls("eval_tab_row"), 0);
    }

    #[test]
    fn test_add_beyond_engine_int_range_rejected() {
        let (fake, mut problem) = setup();
        let err = problem.add_cols(i32::MAX as u32 + 1).unwrap_err();
        assert_eq!(err.code(), "ABI_COUNT_OVERFLOW");
        assert_eq!(fake.calls("add_cols"), 0);

        problem.add_rows(2).unwrap();
        assert_eq!(
            problem.add_rows(i32::MAX as u32).unwrap_err(),
            AbiError::CountOverflow {
                kind: "rows",
                existing: 2,
                count: i32::MAX as u32
            }
        );
        assert!(problem.add_rows(u32::MAX).is_err());
        assert_eq!(fake.calls("add_rows"), 1);
        assert_eq!(problem.num_rows(), 2);
    }

    #[test]
    fn test_add_zero_is_noop() {
        let (fake, mut problem) = setup();
        assert_eq!(problem.add_cols(0).unwrap(), 1);
        assert_eq!(fake.calls("add_cols"), 0);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_set_and_read_matrix_row() {
        let (fake, mut problem) = setup();
        problem.add_rows(1).unwrap();
        problem.add_cols(3).unwrap();
        {
            let bridge = problem.bridge();
            let ind = bridge.alloc_ints(3).unwrap();
            let val = bridge.alloc_doubles(3).unwrap();
            ind.write_i32s(1, &[3, 1]).unwrap();
            val.write_f64s(1, &[2.5, -1.0]).unwrap();
            problem.set_mat_row(1, 2, &ind, &val).unwrap();
        }
        assert_eq!(problem.mat_row(1).unwrap(), vec![(3, 2.5), (1, -1.0)]);
        assert_eq!(problem.num_nz().unwrap(), 2);
        assert_eq!(fake.live_allocations(), 0);
    }

    #[test]
    fn test_set_mat_row_rejects_duplicates() {
        let (fake, mut problem) = setup();
        problem.add_rows(1).unwrap();
        problem.add_cols(2).unwrap();
        let bridge = problem.bridge();
        let ind = bridge.alloc_ints(3).unwrap();
        let val = bridge.alloc_doubles(3).unwrap();
        ind.write_i32s(1, &[2, 2]).unwrap();
        let err = problem.set_mat_row(1, 2, &ind, &val).unwrap_err();
        assert_eq!(err, AbiError::DuplicateColumn { row: 1, column: 2 });
        assert_eq!(fake.calls("set_mat_row"), 0);
    }

    #[test]
    fn test_foreign_buffer_rejected() {
        let (_fake, mut problem) = setup();
        problem.add_rows(1).unwrap();
        let other = FakeEngine::new();
        let bridge = Bridge::new(&other);
        let ind = bridge.alloc_ints(1).unwrap();
        let val = bridge.alloc_doubles(1).unwrap();
        assert_eq!(
            problem.set_mat_row(1, 0, &ind, &val).unwrap_err(),
            AbiError::ForeignBuffer
        );
    }

    #[test]
    fn test_solver_rejects_undersized_record() {
        let (_fake, problem) = setup();
        let parm = problem.bridge().alloc(16).unwrap();
        assert!(matches!(
            problem.simplex(&parm).unwrap_err(),
            AbiError::BufferTooSmall { .. }
        ));
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_tableau_buffers_released() {
        let (fake, mut problem) = setup();
        problem.add_rows(1).unwrap();
        problem.add_cols(2).unwrap();
        let mut solution = FakeSolution {
            bf_exists: true,
            ..FakeSolution::default()
        };
        solution.tab_rows.insert(1, vec![(2, 0.5), (3, -1.0)]);
        fake.script(solution);
        {
            let parm = problem
                .bridge()
                .record(smcp::SIZE, |abi, ptr| abi.init_smcp(ptr))
                .unwrap();
            assert_eq!(problem.simplex(&parm).unwrap(), GLP_OK);
        }
        assert_eq!(problem.eval_tab_row(1).unwrap(), vec![(2, 0.5), (3, -1.0)]);
        assert_eq!(fake.live_allocations(), 0);
    }

    #[test]
    fn test_invalid_name_never_reaches_engine() {
        let (fake, mut problem) = setup();
        problem.add_cols(1).unwrap();
        assert!(problem.set_col_name(1, "bad\nname").is_err());
        assert_eq!(fake.calls("set_col_name"), 0);
        assert_eq!(fake.live_allocations(), 0);
    }
}
