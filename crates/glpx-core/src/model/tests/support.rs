use glpx_abi::codes::*;
use glpx_abi::fake::{FakeEngine, FakeSolution};
use glpx_abi::Engine;

use crate::ids::{Constraint, Variable};
use crate::model::Model;
use crate::types::{ConstraintProperties, VariableProperties};

pub(super) fn setup() -> (FakeEngine, Model) {
    let fake = FakeEngine::new();
    let engine = Engine::with_abi(fake.clone());
    let model = Model::new(&engine).unwrap();
    (fake, model)
}

/// max x + y subject to x + 2y <= 4, 3x + y <= 6, x, y >= 0.
pub(super) fn small_lp(model: &mut Model) -> (Vec<Variable>, Vec<Constraint>) {
    model.set_sense(glpx_solver::Sense::Maximize).unwrap();
    let x = model
        .add_variable(VariableProperties::new().with_lower(0.0).with_objective(1.0).with_name("x"))
        .unwrap();
    let y = model
        .add_variable(VariableProperties::new().with_lower(0.0).with_objective(1.0).with_name("y"))
        .unwrap();
    let c1 = model
        .add_constraint(
            ConstraintProperties::new()
                .with_upper(4.0)
                .with_coefficients([(x, 1.0), (y, 2.0)])
                .with_name("c1"),
        )
        .unwrap();
    let c2 = model
        .add_constraint(
            ConstraintProperties::new()
                .with_upper(6.0)
                .with_coefficients([(x, 3.0), (y, 1.0)])
                .with_name("c2"),
        )
        .unwrap();
    (vec![x, y], vec![c1, c2])
}

/// Optimal basis of [`small_lp`]: x and y basic, both rows at their upper bound.
pub(super) fn small_lp_optimum() -> FakeSolution {
    FakeSolution {
        status: GLP_OPT,
        prim_stat: GLP_FEAS,
        dual_stat: GLP_FEAS,
        obj_val: 2.8,
        row_stat: vec![GLP_NU, GLP_NU],
        row_prim: vec![4.0, 6.0],
        row_dual: vec![0.4, 0.2],
        col_stat: vec![GLP_BS, GLP_BS],
        col_prim: vec![1.6, 1.2],
        col_dual: vec![0.0, 0.0],
        bf_exists: true,
        // Combined indices: rows 1..=2, columns 3..=4.
        tab_rows: [(3, vec![(1, -0.2), (2, 0.4)]), (4, vec![(1, 0.6), (2, -0.2)])]
            .into_iter()
            .collect(),
        tab_cols: [(1, vec![(3, -0.2), (4, 0.6)]), (2, vec![(3, 0.4), (4, -0.2)])]
            .into_iter()
            .collect(),
        ..FakeSolution::default()
    }
}
