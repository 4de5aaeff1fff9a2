//! Branch-and-cut search tree as seen from an `intopt` callback.
//!
//! A [`Tree`] wraps the engine's tree for the length of one callback
//! invocation. The engine aborts the process on a bad row, column or node
//! reference, on a decision outside its callback reason, and on a decision
//! taken twice, so every such check happens here first and fails with a
//! [`TreeError`] instead.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use glpx_abi::layout::attr;
use glpx_abi::{Abi, AbiError, Bridge, RawTree};
use tracing::trace;

use crate::error::TreeError;
use crate::tags::{BranchDirection, Reason, RowClass, RowOrigin};

static NEXT_STAMP: AtomicU64 = AtomicU64::new(1);

/// Subproblem of the search tree, valid during the invocation that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    reference: i32,
    active: bool,
    stamp: u64,
}

impl Node {
    /// The engine's reference number.
    pub fn reference(self) -> i32 {
        self.reference
    }

    /// Whether the node is in the active list (not yet branched on).
    pub fn is_active(self) -> bool {
        self.active
    }
}

/// Attributes of a row of the current subproblem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowAttribute {
    /// Tree level the row was added at; 0 for rows of the original problem.
    pub level: i32,
    pub origin: RowOrigin,
    /// Cut family, for rows that are cuts.
    pub class: Option<RowClass>,
}

/// Node counts of the search tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeSize {
    pub active: i32,
    /// Nodes currently in the tree, active or not.
    pub current: i32,
    /// Nodes created since the search began.
    pub total: i32,
}

/// The search tree during one callback invocation.
pub struct Tree<'a> {
    abi: &'a dyn Abi,
    raw: &'a RawTree,
    stamp: u64,
    reason: Reason,
    rows: u32,
    cols: u32,
    branched: bool,
    selected: bool,
    terminated: bool,
}

impl<'a> Tree<'a> {
    pub fn new(abi: &'a dyn Abi, raw: &'a RawTree) -> Result<Self, TreeError> {
        let reason = Reason::decode("glp_ios_reason", abi.ios_reason(raw)?)?;
        let (rows, cols) = abi.ios_problem_size(raw)?;
        Ok(Self {
            abi,
            raw,
            stamp: NEXT_STAMP.fetch_add(1, Ordering::Relaxed),
            reason,
            rows: u32::try_from(rows).unwrap_or(0),
            cols: u32::try_from(cols).unwrap_or(0),
            branched: false,
            selected: false,
            terminated: false,
        })
    }

    pub fn reason(&self) -> Reason {
        self.reason
    }

    /// Rows of the current subproblem, cuts and lazy rows included.
    pub fn num_rows(&self) -> u32 {
        self.rows
    }

    pub fn num_cols(&self) -> u32 {
        self.cols
    }

    pub fn size(&self) -> Result<TreeSize, TreeError> {
        let (active, current, total) = self.abi.ios_tree_size(self.raw)?;
        Ok(TreeSize {
            active,
            current,
            total,
        })
    }

    /// Relative gap between the incumbent and the best bound.
    pub fn gap(&self) -> Result<f64, TreeError> {
        Ok(self.abi.ios_mip_gap(self.raw)?)
    }

    pub fn row_attribute(&self, i: u32) -> Result<RowAttribute, TreeError> {
        let row = self.row(i)?;
        let buffer = Bridge::new(self.abi).alloc(attr::SIZE)?;
        self.abi.ios_row_attr(self.raw, row, buffer.ptr())?;
        let class = match buffer.read_i32(attr::KLASS.offset)? {
            0 => None,
            code => Some(RowClass::decode("glp_ios_row_attr", code)?),
        };
        Ok(RowAttribute {
            level: buffer.read_i32(attr::LEVEL.offset)?,
            origin: RowOrigin::decode("glp_ios_row_attr", buffer.read_i32(attr::ORIGIN.offset)?)?,
            class,
        })
    }

    /// Offers an integer feasible point, one value per column. Returns whether
    /// the engine accepted it as a new incumbent.
    pub fn set_heuristic_solution(&mut self, values: &[f64]) -> Result<bool, TreeError> {
        if values.len() != self.cols as usize {
            return Err(TreeError::SolutionLength {
                expected: self.cols,
                got: values.len(),
            });
        }
        let x = Bridge::new(self.abi).alloc_doubles(values.len() + 1)?;
        x.write_f64s(1, values)?;
        let accepted = self.abi.ios_heur_sol(self.raw, x.ptr())? == 0;
        trace!(
            component = "tree",
            operation = "heuristic_solution",
            accepted,
            "Offered heuristic solution"
        );
        Ok(accepted)
    }

    /// Whether column `j` is fractional at the current node and may be branched on.
    pub fn can_branch(&self, j: u32) -> Result<bool, TreeError> {
        let col = self.col(j)?;
        Ok(self.abi.ios_can_branch(self.raw, col)?)
    }

    /// Chooses the branching column for the current node.
    pub fn branch_upon(&mut self, j: u32, direction: BranchDirection) -> Result<(), TreeError> {
        self.require("branch_upon", Reason::Branch)?;
        if self.branched {
            return Err(TreeError::Repeated {
                operation: "branch_upon",
            });
        }
        if !self.can_branch(j)? {
            return Err(TreeError::NotBranchable { column: j });
        }
        self.abi
            .ios_branch_upon(self.raw, self.col(j)?, direction.code())?;
        self.branched = true;
        Ok(())
    }

    /// Chooses the active node to solve next.
    pub fn select(&mut self, node: Node) -> Result<(), TreeError> {
        self.require("select", Reason::Select)?;
        let reference = self.active(node)?;
        if self.selected {
            return Err(TreeError::Repeated {
                operation: "select",
            });
        }
        self.abi.ios_select_node(self.raw, reference)?;
        self.selected = true;
        Ok(())
    }

    /// Stops the search; `intopt` then returns `stopped`.
    pub fn terminate(&mut self) -> Result<(), TreeError> {
        if !self.terminated {
            self.abi.ios_terminate(self.raw)?;
            self.terminated = true;
        }
        Ok(())
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// The subproblem being solved; `None` while a node is being selected.
    pub fn current_node(&self) -> Result<Option<Node>, TreeError> {
        let p = self.abi.ios_curr_node(self.raw)?;
        Ok(self.node(p, true))
    }

    /// Active node with the best local bound.
    pub fn best_node(&self) -> Result<Option<Node>, TreeError> {
        let p = self.abi.ios_best_node(self.raw)?;
        Ok(self.node(p, true))
    }

    pub fn first_node(&self) -> Result<Option<Node>, TreeError> {
        let p = self.abi.ios_next_node(self.raw, 0)?;
        Ok(self.node(p, true))
    }

    pub fn last_node(&self) -> Result<Option<Node>, TreeError> {
        let p = self.abi.ios_prev_node(self.raw, 0)?;
        Ok(self.node(p, true))
    }

    /// Active node after `node` in the active list.
    pub fn next_node(&self, node: Node) -> Result<Option<Node>, TreeError> {
        let p = self.abi.ios_next_node(self.raw, self.active(node)?)?;
        Ok(self.node(p, true))
    }

    pub fn previous_node(&self, node: Node) -> Result<Option<Node>, TreeError> {
        let p = self.abi.ios_prev_node(self.raw, self.active(node)?)?;
        Ok(self.node(p, true))
    }

    /// Parent of `node`; `None` for the root. A parent has children, so it is
    /// never active.
    pub fn parent(&self, node: Node) -> Result<Option<Node>, TreeError> {
        let p = self.abi.ios_up_node(self.raw, self.current(node)?)?;
        Ok(self.node(p, false))
    }

    /// Depth of `node`; the root is level 0.
    pub fn node_level(&self, node: Node) -> Result<i32, TreeError> {
        Ok(self.abi.ios_node_level(self.raw, self.current(node)?)?)
    }

    /// Local bound of `node`.
    pub fn node_bound(&self, node: Node) -> Result<f64, TreeError> {
        Ok(self.abi.ios_node_bound(self.raw, self.current(node)?)?)
    }

    /// Cuts waiting in the pool; only during cut generation.
    pub fn cut_pool_size(&self) -> Result<i32, TreeError> {
        self.require("cut_pool_size", Reason::CutGeneration)?;
        Ok(self.abi.ios_pool_size(self.raw)?)
    }

    pub fn clear_cut_pool(&mut self) -> Result<(), TreeError> {
        self.require("clear_cut_pool", Reason::CutGeneration)?;
        Ok(self.abi.ios_clear_pool(self.raw)?)
    }

    fn require(&self, operation: &'static str, reason: Reason) -> Result<(), TreeError> {
        if self.reason == reason {
            Ok(())
        } else {
            Err(TreeError::NotAllowed {
                operation,
                reason: self.reason,
            })
        }
    }

    fn row(&self, i: u32) -> Result<i32, TreeError> {
        if (1..=self.rows).contains(&i) {
            Ok(i as i32)
        } else {
            Err(AbiError::RowOutOfRange {
                index: i,
                rows: self.rows,
            }
            .into())
        }
    }

    fn col(&self, j: u32) -> Result<i32, TreeError> {
        if (1..=self.cols).contains(&j) {
            Ok(j as i32)
        } else {
            Err(AbiError::ColumnOutOfRange {
                index: j,
                cols: self.cols,
            }
            .into())
        }
    }

    fn node(&self, reference: i32, active: bool) -> Option<Node> {
        (reference != 0).then_some(Node {
            reference,
            active,
            stamp: self.stamp,
        })
    }

    /// Reference of a node from this invocation.
    fn current(&self, node: Node) -> Result<i32, TreeError> {
        if node.stamp == self.stamp {
            Ok(node.reference)
        } else {
            Err(TreeError::StaleNode {
                reference: node.reference,
            })
        }
    }

    fn active(&self, node: Node) -> Result<i32, TreeError> {
        let reference = self.current(node)?;
        if node.active {
            Ok(reference)
        } else {
            Err(TreeError::InactiveNode { reference })
        }
    }
}

impl std::fmt::Debug for Tree<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("reason", &self.reason)
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("terminated", &self.terminated)
            .finish()
    }
}

type Callback = dyn FnMut(&mut Tree<'_>) -> Result<(), TreeError>;

/// User hook run at every point the branch-and-cut driver offers one.
///
/// Clones share the closure. An error returned from it terminates the search
/// and surfaces from `intopt`.
#[derive(Clone)]
pub struct TreeCallback(Rc<RefCell<Callback>>);

impl TreeCallback {
    pub fn new(callback: impl FnMut(&mut Tree<'_>) -> Result<(), TreeError> + 'static) -> Self {
        Self(Rc::new(RefCell::new(callback)))
    }

    /// Runs the closure. A call from inside the closure itself fails with
    /// [`TreeError::Repeated`].
    pub fn invoke(&self, tree: &mut Tree<'_>) -> Result<(), TreeError> {
        let mut callback = self
            .0
            .try_borrow_mut()
            .map_err(|_| TreeError::Repeated {
                operation: "callback",
            })?;
        (*callback)(tree)
    }
}

impl PartialEq for TreeCallback {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for TreeCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TreeCallback(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glpx_abi::codes::*;
    use glpx_abi::fake::{FakeEngine, FakeNode, FakeTree};
    use glpx_abi::layout::iocp;

    fn node(level: i32, bound: f64, parent: i32, active: bool) -> FakeNode {
        FakeNode {
            level,
            bound,
            parent,
            active,
        }
    }

    /// Root 1 branched into 2 and 3; 3 branched into 4 and 5.
    fn scripted(reasons: Vec<i32>) -> FakeTree {
        FakeTree {
            reasons,
            nodes: vec![
                node(0, 10.0, 0, false),
                node(1, 9.0, 1, true),
                node(1, 9.5, 1, false),
                node(2, 8.0, 3, true),
                node(2, 9.25, 3, true),
            ],
            current: 5,
            best: 5,
            gap: 0.125,
            branchable: vec![2],
            row_attrs: vec![(0, GLP_RF_REG, 0), (2, GLP_RF_CUT, GLP_RF_MIR)],
            pool_size: 3,
        }
    }

    /// Runs `intopt` on a fresh 2-row, 3-column integer problem, handing each
    /// invocation to `body`.
    fn walk(fake: &FakeEngine, mut body: impl FnMut(&mut Tree<'_>)) -> i32 {
        let prob = fake.create_prob().unwrap();
        fake.add_rows(&prob, 2).unwrap();
        fake.add_cols(&prob, 3).unwrap();
        for j in 1..=3 {
            fake.set_col_kind(&prob, j, GLP_IV).unwrap();
        }
        let bridge = Bridge::new(fake);
        let parm = bridge
            .record(iocp::SIZE, |abi, ptr| abi.init_iocp(ptr))
            .unwrap();
        let mut hook = |raw: &RawTree| {
            let mut tree = Tree::new(fake, raw).unwrap();
            body(&mut tree);
        };
        let code = fake.intopt(&prob, parm.ptr(), Some(&mut hook)).unwrap();
        drop(parm);
        fake.delete_prob(prob).unwrap();
        code
    }

    #[test]
    fn test_reasons_follow_the_driver() {
        let fake = FakeEngine::new();
        fake.script_tree(scripted(vec![GLP_IPREPRO, GLP_IROWGEN, GLP_IHEUR, GLP_IBRANCH]));
        let mut seen = Vec::new();
        let code = walk(&fake, |tree| seen.push(tree.reason()));
        assert_eq!(code, GLP_OK);
        assert_eq!(
            seen,
            vec![
                Reason::Preprocessing,
                Reason::RowGeneration,
                Reason::Heuristic,
                Reason::Branch
            ]
        );
        assert_eq!(fake.tree_log().invocations, 4);
        assert_eq!(fake.live_allocations(), 0);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_navigation_and_node_data() {
        let fake = FakeEngine::new();
        fake.script_tree(scripted(vec![GLP_IROWGEN]));
        walk(&fake, |tree| {
            assert_eq!(tree.num_rows(), 2);
            assert_eq!(tree.num_cols(), 3);
            assert_eq!(
                tree.size().unwrap(),
                TreeSize {
                    active: 3,
                    current: 5,
                    total: 5
                }
            );
            assert_eq!(tree.gap().unwrap(), 0.125);

            let first = tree.first_node().unwrap().unwrap();
            assert_eq!(first.reference(), 2);
            let second = tree.next_node(first).unwrap().unwrap();
            assert_eq!(second.reference(), 4);
            let last = tree.last_node().unwrap().unwrap();
            assert_eq!(last.reference(), 5);
            assert_eq!(tree.previous_node(last).unwrap(), Some(second));
            assert_eq!(tree.next_node(last).unwrap(), None);

            let current = tree.current_node().unwrap().unwrap();
            assert_eq!(tree.best_node().unwrap(), Some(current));
            assert_eq!(tree.node_level(current).unwrap(), 2);
            assert_eq!(tree.node_bound(current).unwrap(), 9.25);

            let parent = tree.parent(current).unwrap().unwrap();
            assert_eq!(parent.reference(), 3);
            assert!(!parent.is_active());
            let root = tree.parent(parent).unwrap().unwrap();
            assert_eq!(tree.node_level(root).unwrap(), 0);
            assert_eq!(tree.parent(root).unwrap(), None);
        });
    }

    #[test]
    fn test_row_attributes_decode() {
        let fake = FakeEngine::new();
        fake.script_tree(scripted(vec![GLP_ICUTGEN]));
        walk(&fake, |tree| {
            assert_eq!(
                tree.row_attribute(1).unwrap(),
                RowAttribute {
                    level: 0,
                    origin: RowOrigin::Regular,
                    class: None
                }
            );
            assert_eq!(
                tree.row_attribute(2).unwrap(),
                RowAttribute {
                    level: 2,
                    origin: RowOrigin::Cut,
                    class: Some(RowClass::Mir)
                }
            );
            assert_eq!(tree.row_attribute(3).unwrap_err().code(), "ABI_ROW_OUT_OF_RANGE");
        });
        assert_eq!(fake.calls("ios_row_attr"), 2);
        assert_eq!(fake.live_allocations(), 0);
    }

    #[test]
    fn test_branching_is_checked_before_the_engine() {
        let fake = FakeEngine::new();
        fake.script_tree(scripted(vec![GLP_IHEUR, GLP_IBRANCH]));
        walk(&fake, |tree| match tree.reason() {
            Reason::Heuristic => {
                let err = tree.branch_upon(2, BranchDirection::Up).unwrap_err();
                assert_eq!(
                    err,
                    TreeError::NotAllowed {
                        operation: "branch_upon",
                        reason: Reason::Heuristic
                    }
                );
            }
            _ => {
                assert!(!tree.can_branch(1).unwrap());
                assert_eq!(
                    tree.branch_upon(1, BranchDirection::Down),
                    Err(TreeError::NotBranchable { column: 1 })
                );
                assert_eq!(
                    tree.branch_upon(4, BranchDirection::Down).unwrap_err().code(),
                    "ABI_COLUMN_OUT_OF_RANGE"
                );
                tree.branch_upon(2, BranchDirection::Up).unwrap();
                assert_eq!(
                    tree.branch_upon(2, BranchDirection::Down),
                    Err(TreeError::Repeated {
                        operation: "branch_upon"
                    })
                );
            }
        });
        assert_eq!(fake.calls("ios_branch_upon"), 1);
        assert_eq!(fake.tree_log().branched, vec![(2, GLP_UP_BRNCH)]);
    }

    #[test]
    fn test_select_needs_an_active_node() {
        let fake = FakeEngine::new();
        fake.script_tree(scripted(vec![GLP_ISELECT]));
        walk(&fake, |tree| {
            assert_eq!(tree.current_node().unwrap(), None);
            let best = tree.best_node().unwrap().unwrap();
            let parent = tree.parent(best).unwrap().unwrap();
            assert_eq!(
                tree.select(parent),
                Err(TreeError::InactiveNode { reference: 3 })
            );
            assert_eq!(
                tree.next_node(parent),
                Err(TreeError::InactiveNode { reference: 3 })
            );
            tree.select(best).unwrap();
            assert_eq!(
                tree.select(best),
                Err(TreeError::Repeated {
                    operation: "select"
                })
            );
        });
        assert_eq!(fake.tree_log().selected, vec![5]);
    }

    #[test]
    fn test_nodes_do_not_outlive_their_invocation() {
        let fake = FakeEngine::new();
        fake.script_tree(scripted(vec![GLP_IROWGEN, GLP_IROWGEN]));
        let mut kept: Option<Node> = None;
        walk(&fake, |tree| match kept {
            None => kept = tree.current_node().unwrap(),
            Some(old) => {
                assert_eq!(
                    tree.node_level(old),
                    Err(TreeError::StaleNode { reference: 5 })
                );
            }
        });
        assert_eq!(fake.calls("ios_node_level"), 0);
    }

    #[test]
    fn test_heuristic_solution_length_and_verdict() {
        let fake = FakeEngine::new();
        fake.script_tree(scripted(vec![GLP_IHEUR]));
        walk(&fake, |tree| {
            assert_eq!(
                tree.set_heuristic_solution(&[1.0, 2.0]),
                Err(TreeError::SolutionLength {
                    expected: 3,
                    got: 2
                })
            );
            assert!(tree.set_heuristic_solution(&[1.0, 0.0, 2.0]).unwrap());
            assert!(!tree.set_heuristic_solution(&[1.5, 0.0, 2.0]).unwrap());
        });
        assert_eq!(
            fake.tree_log().heuristic,
            vec![vec![1.0, 0.0, 2.0], vec![1.5, 0.0, 2.0]]
        );
        assert_eq!(fake.live_allocations(), 0);
    }

    #[test]
    fn test_cut_pool_only_during_cut_generation() {
        let fake = FakeEngine::new();
        fake.script_tree(scripted(vec![GLP_IROWGEN, GLP_ICUTGEN]));
        walk(&fake, |tree| match tree.reason() {
            Reason::CutGeneration => {
                assert_eq!(tree.cut_pool_size().unwrap(), 3);
                tree.clear_cut_pool().unwrap();
                assert_eq!(tree.cut_pool_size().unwrap(), 0);
            }
            _ => {
                assert_eq!(tree.cut_pool_size().unwrap_err().code(), "TREE_NOT_ALLOWED");
                assert_eq!(tree.clear_cut_pool().unwrap_err().code(), "TREE_NOT_ALLOWED");
            }
        });
        assert_eq!(fake.tree_log().pool_cleared, 1);
    }

    #[test]
    fn test_terminate_stops_the_search() {
        let fake = FakeEngine::new();
        fake.script_tree(scripted(vec![GLP_IPREPRO, GLP_IROWGEN, GLP_IBRANCH]));
        let code = walk(&fake, |tree| {
            tree.terminate().unwrap();
            tree.terminate().unwrap();
            assert!(tree.is_terminated());
        });
        assert_eq!(code, GLP_ESTOP);
        assert_eq!(fake.tree_log().invocations, 1);
        assert_eq!(fake.calls("ios_terminate"), 1);
    }

    #[test]
    fn test_callback_shares_closure_across_clones() {
        let fake = FakeEngine::new();
        fake.script_tree(scripted(vec![GLP_IROWGEN, GLP_IHEUR]));
        let count = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&count);
        let callback = TreeCallback::new(move |_| {
            *seen.borrow_mut() += 1;
            Ok(())
        });
        let other = callback.clone();
        assert_eq!(callback, other);
        assert_ne!(callback, TreeCallback::new(|_| Ok(())));
        walk(&fake, |tree| other.invoke(tree).unwrap());
        assert_eq!(*count.borrow(), 2);
        assert_eq!(format!("{:?}", callback), "TreeCallback(..)");
    }
}
