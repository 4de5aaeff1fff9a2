use std::cell::RefCell;
use std::rc::Rc;

use glpx_core::{
    BasisStatus, ConstraintProperties, Engine, Entity, InteriorOptions, IntoptOptions, Model,
    MpsFormat, Reason, Sense, SimplexOptions, Status, VariableKind, VariableProperties,
};
use glpx_solver::{InteriorReturn, IntoptReturn, MessageLevel, Method, SimplexReturn};

const TOL: f64 = 1e-6;

fn native() -> Option<Engine> {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
    match Engine::load() {
        Ok(engine) => Some(engine),
        Err(err) => {
            eprintln!("skipping: {}", err);
            None
        }
    }
}

fn quiet() -> SimplexOptions {
    SimplexOptions::new().with_msg_level(MessageLevel::Off)
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < TOL,
        "expected {} but got {}",
        expected,
        actual
    );
}

fn sorted(mut pairs: Vec<(Entity, f64)>) -> Vec<(Entity, f64)> {
    pairs.sort_by_key(|&(entity, _)| (entity.is_variable(), entity.index()));
    pairs
}

fn assert_pairs(actual: Vec<(Entity, f64)>, expected: Vec<(Entity, f64)>) {
    let actual = sorted(actual);
    let expected = sorted(expected);
    assert_eq!(actual.len(), expected.len(), "{:?} vs {:?}", actual, expected);
    for ((entity, value), (want, want_value)) in actual.into_iter().zip(expected) {
        assert_eq!(entity, want);
        assert_close(value, want_value);
    }
}

/// Minimize x0 + x1 subject to x0 + 2 x1 = 1, x >= 0.
fn equality_lp(model: &mut Model) -> (Vec<glpx_core::Variable>, glpx_core::Constraint) {
    let xs = model
        .add_variables(
            2,
            &VariableProperties::new()
                .with_lower(0.0)
                .with_objective(1.0)
                .with_name("x"),
        )
        .unwrap();
    let c = model
        .add_constraint(ConstraintProperties::new().with_bounds(1.0, 1.0))
        .unwrap();
    model.accumulate_all(c, [(xs[0], 1.0), (xs[1], 2.0)]).unwrap();
    (xs, c)
}

#[test]
fn test_minimize_negative_objective_under_budget() {
    let Some(engine) = native() else { return };
    let mut model = Model::new(&engine).unwrap();
    let xs = model
        .add_variables(2, &VariableProperties::new().with_lower(0.0).with_objective(-1.0))
        .unwrap();
    model
        .add_constraint(
            ConstraintProperties::new()
                .with_upper(1.0)
                .with_coefficients([(xs[0], 1.0), (xs[1], 1.0)]),
        )
        .unwrap();

    assert_eq!(model.simplex(&quiet()).unwrap(), SimplexReturn::Ok);
    assert_eq!(model.status().unwrap(), Status::Optimal);
    assert_close(model.objective_value().unwrap(), -1.0);
    assert_close(model.value(xs[0]).unwrap() + model.value(xs[1]).unwrap(), 1.0);
}

#[test]
fn test_textbook_maximization() {
    let Some(engine) = native() else { return };
    let mut model = Model::new(&engine).unwrap();
    model.set_sense(Sense::Maximize).unwrap();
    let x = model
        .add_variables_from(
            [5.0, 4.0, 3.0]
                .iter()
                .enumerate()
                .map(|(k, &c)| {
                    VariableProperties::new()
                        .with_lower(0.0)
                        .with_objective(c)
                        .with_name(format!("x{}", k + 1))
                })
                .collect(),
        )
        .unwrap();
    for (row, ub) in [([2.0, 3.0, 1.0], 5.0), ([4.0, 1.0, 2.0], 11.0), ([3.0, 4.0, 2.0], 8.0)] {
        let coefficients: Vec<_> = x.iter().copied().zip(row).collect();
        model
            .add_constraint(
                ConstraintProperties::new()
                    .with_upper(ub)
                    .with_coefficients(coefficients),
            )
            .unwrap();
    }

    assert_eq!(model.simplex(&quiet()).unwrap(), SimplexReturn::Ok);
    assert_eq!(model.status().unwrap(), Status::Optimal);
    assert_close(model.objective_value().unwrap(), 13.0);
    assert_close(model.value(x[0]).unwrap(), 2.0);
    assert_close(model.value(x[1]).unwrap(), 0.0);
    assert_close(model.value(x[2]).unwrap(), 1.0);
    assert!(model
        .solution_report()
        .unwrap()
        .starts_with("status = optimal\nx1 = "));
}

#[test]
fn test_unbounded_ray_is_the_variable() {
    let Some(engine) = native() else { return };
    let mut model = Model::new(&engine).unwrap();
    model.set_sense(Sense::Maximize).unwrap();
    let x = model
        .add_variable(VariableProperties::new().with_objective(0.1))
        .unwrap();

    assert_eq!(model.simplex(&quiet()).unwrap(), SimplexReturn::Ok);
    assert_eq!(model.status().unwrap(), Status::Unbounded);
    assert_eq!(model.primal_status().unwrap(), Status::Feasible);
    assert_eq!(model.dual_status().unwrap(), Status::NoFeasible);
    assert_eq!(model.unbounded_ray().unwrap(), Entity::from(x));
    assert_eq!(model.solution_report().unwrap(), "problem is unbounded");
}

#[test]
fn test_infeasible_ray_is_the_constraint() {
    let Some(engine) = native() else { return };
    let mut model = Model::new(&engine).unwrap();
    let x = model
        .add_variable(VariableProperties::new().with_lower(1.0).with_objective(0.1))
        .unwrap();
    let c = model
        .add_constraint(
            ConstraintProperties::new()
                .with_upper(0.0)
                .with_coefficients([(x, 1.0)]),
        )
        .unwrap();

    model.simplex(&quiet().with_method(Method::Dual)).unwrap();
    assert_eq!(model.primal_status().unwrap(), Status::NoFeasible);
    assert_eq!(model.dual_status().unwrap(), Status::Feasible);
    assert_eq!(model.unbounded_ray().unwrap(), Entity::from(c));
}

#[test]
fn test_tableau_rows_and_columns() {
    let Some(engine) = native() else { return };
    let mut model = Model::new(&engine).unwrap();
    model.set_sense(Sense::Maximize).unwrap();
    let x = model
        .add_variables_from(vec![
            VariableProperties::new().with_lower(0.0).with_objective(1.0),
            VariableProperties::new().with_lower(0.0).with_objective(2.0),
        ])
        .unwrap();
    let s = model
        .add_constraints_from(vec![
            ConstraintProperties::new()
                .with_upper(2.0)
                .with_coefficients([(x[0], 1.0), (x[1], 2.0)]),
            ConstraintProperties::new()
                .with_upper(2.0)
                .with_coefficients([(x[0], 2.0), (x[1], 1.0)]),
        ])
        .unwrap();

    model.simplex(&quiet()).unwrap();
    assert_close(model.objective_value().unwrap(), 2.0);
    assert_close(model.value(x[0]).unwrap(), 0.0);
    assert_close(model.value(x[1]).unwrap(), 1.0);
    assert_close(model.value(s[0]).unwrap(), 2.0);
    assert_close(model.value(s[1]).unwrap(), 1.0);

    assert_eq!(model.basis_status(x[0]).unwrap(), BasisStatus::LowerBound);
    assert_pairs(
        model.tableau_column(x[0]).unwrap(),
        vec![(x[1].into(), -0.5), (s[1].into(), 1.5)],
    );

    assert_eq!(model.basis_status(x[1]).unwrap(), BasisStatus::Basic);
    assert_pairs(
        model.tableau_row(x[1]).unwrap(),
        vec![(s[0].into(), 0.5), (x[0].into(), -0.5)],
    );

    assert_eq!(model.basis_status(s[0]).unwrap(), BasisStatus::UpperBound);
    assert_pairs(
        model.tableau_column(s[0]).unwrap(),
        vec![(x[1].into(), 0.5), (s[1].into(), 0.5)],
    );

    assert_eq!(model.basis_status(s[1]).unwrap(), BasisStatus::Basic);
    assert_pairs(
        model.tableau_row(s[1]).unwrap(),
        vec![(s[0].into(), 0.5), (x[0].into(), 1.5)],
    );

    assert_eq!(
        model.tableau_row(x[0]).unwrap_err().code(),
        "ENTITY_NOT_BASIC"
    );
    // Two basic entities plus the objective row.
    assert_eq!(model.tableau().unwrap().lines().count(), 3);
}

#[test]
fn test_simplex_then_flip_sense() {
    let Some(engine) = native() else { return };
    let mut model = Model::new(&engine).unwrap();
    let (xs, c) = equality_lp(&mut model);

    assert_eq!(model.status().unwrap(), Status::Undefined);
    assert_eq!(model.simplex(&quiet()).unwrap(), SimplexReturn::Ok);
    assert_close(model.objective_value().unwrap(), 0.5);
    assert_close(model.value(xs[1]).unwrap(), 0.5);
    assert_close(model.dual(c).unwrap(), 0.5);
    assert_close(model.dual(xs[0]).unwrap(), 0.5);
    assert_eq!(model.basis_status(c).unwrap(), BasisStatus::Fixed);

    model.set_sense(Sense::Maximize).unwrap();
    model.simplex(&quiet()).unwrap();
    assert_close(model.objective_value().unwrap(), 1.0);
    assert_close(model.value(xs[0]).unwrap(), 1.0);
    assert_close(model.dual(xs[1]).unwrap(), -1.0);
    assert_eq!(model.basis_status(xs[0]).unwrap(), BasisStatus::Basic);
}

#[test]
fn test_exact_simplex() {
    let Some(engine) = native() else { return };
    let mut model = Model::new(&engine).unwrap();
    let (xs, c) = equality_lp(&mut model);
    assert_eq!(model.exact(&quiet()).unwrap(), SimplexReturn::Ok);
    assert_eq!(model.status().unwrap(), Status::Optimal);
    assert_close(model.objective_value().unwrap(), 0.5);
    assert_close(model.value(c).unwrap(), 1.0);
    assert_close(model.value(xs[1]).unwrap(), 0.5);
}

#[test]
fn test_interior_point() {
    let Some(engine) = native() else { return };
    let mut model = Model::new(&engine).unwrap();
    let (xs, c) = equality_lp(&mut model);
    let options = InteriorOptions::new().with_msg_level(MessageLevel::Off);

    assert_eq!(model.interior_status().unwrap(), Status::Undefined);
    assert_eq!(model.interior(&options).unwrap(), InteriorReturn::Ok);
    assert_eq!(model.interior_status().unwrap(), Status::Optimal);
    assert_close(model.interior_objective_value().unwrap(), 0.5);
    assert_close(model.interior_value(xs[1]).unwrap(), 0.5);
    assert_close(model.interior_dual(c).unwrap(), 0.5);

    model.set_sense(Sense::Maximize).unwrap();
    model.interior(&options).unwrap();
    assert_eq!(
        model.interior_report().unwrap(),
        "status = optimal\nx_0 = 1\nx_1 = 0\nvalue = 1"
    );
}

#[test]
fn test_interior_point_infeasible() {
    let Some(engine) = native() else { return };
    let mut model = Model::new(&engine).unwrap();
    let x = model
        .add_variable(VariableProperties::new().with_lower(1.0).with_objective(0.1))
        .unwrap();
    model
        .add_constraint(
            ConstraintProperties::new()
                .with_upper(0.0)
                .with_coefficients([(x, 1.0)]),
        )
        .unwrap();
    let options = InteriorOptions::new().with_msg_level(MessageLevel::Off);
    assert_eq!(model.interior(&options).unwrap(), InteriorReturn::Ok);
    assert_eq!(model.interior_status().unwrap(), Status::NoFeasible);
    assert_eq!(
        model.interior_report().unwrap(),
        "problem has no feasible solution"
    );
}

#[test]
fn test_branch_and_cut() {
    let Some(engine) = native() else { return };
    let mut model = Model::new(&engine).unwrap();
    model.set_sense(Sense::Maximize).unwrap();
    let xs = model
        .add_variables(
            2,
            &VariableProperties::new()
                .with_lower(0.0)
                .with_objective(1.0)
                .with_kind(VariableKind::Integer),
        )
        .unwrap();
    model
        .add_constraint(
            ConstraintProperties::new()
                .with_upper(3.0)
                .with_coefficients([(xs[0], 2.0), (xs[1], 2.0)]),
        )
        .unwrap();
    assert_eq!(model.num_integer().unwrap(), 2);

    let options = IntoptOptions::new()
        .with_msg_level(MessageLevel::Off)
        .with_presolve(true);
    assert_eq!(model.intopt(&options).unwrap(), IntoptReturn::Ok);
    assert_eq!(model.mip_status().unwrap(), Status::Optimal);
    assert_close(model.mip_objective_value().unwrap(), 1.0);
    let total = model.mip_value(xs[0]).unwrap() + model.mip_value(xs[1]).unwrap();
    assert_close(total, 1.0);
}

/// max 0.6 x + 0.5 y subject to 2 x + 2 y <= 3, x, y >= 0 integer. The LP
/// relaxation is fractional, so the search has to branch.
fn fractional_mip(engine: &Engine) -> Model {
    let mut model = Model::new(engine).unwrap();
    model.set_sense(Sense::Maximize).unwrap();
    let x = model
        .add_variable(
            VariableProperties::new()
                .with_lower(0.0)
                .with_objective(0.6)
                .with_kind(VariableKind::Integer),
        )
        .unwrap();
    let y = model
        .add_variable(
            VariableProperties::new()
                .with_lower(0.0)
                .with_objective(0.5)
                .with_kind(VariableKind::Integer),
        )
        .unwrap();
    model
        .add_constraint(
            ConstraintProperties::new()
                .with_upper(3.0)
                .with_coefficients([(x, 2.0), (y, 2.0)]),
        )
        .unwrap();
    assert_eq!(model.simplex(&quiet()).unwrap(), SimplexReturn::Ok);
    model
}

#[test]
fn test_branch_and_cut_callback_observes_search() {
    let Some(engine) = native() else { return };
    let mut model = fractional_mip(&engine);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let options = IntoptOptions::new()
        .with_msg_level(MessageLevel::Off)
        .with_callback(move |tree| {
            assert_eq!(tree.num_cols(), 2);
            if tree.reason() != Reason::Select {
                let node = tree.current_node()?.expect("a node is being solved");
                assert!(tree.node_level(node)? >= 0);
            }
            let size = tree.size()?;
            assert!(size.active <= size.current && size.current <= size.total);
            sink.borrow_mut().push(tree.reason());
            Ok(())
        });

    assert_eq!(model.intopt(&options).unwrap(), IntoptReturn::Ok);
    assert_close(model.mip_objective_value().unwrap(), 0.6);
    let seen = seen.borrow();
    assert_eq!(seen.first(), Some(&Reason::Preprocessing));
    assert!(seen.contains(&Reason::Branch), "{:?}", seen);
}

#[test]
fn test_branch_and_cut_callback_terminates_search() {
    let Some(engine) = native() else { return };
    let mut model = fractional_mip(&engine);
    let options = IntoptOptions::new()
        .with_msg_level(MessageLevel::Off)
        .with_callback(|tree| tree.terminate());
    assert_eq!(model.intopt(&options).unwrap(), IntoptReturn::Stopped);
}

#[test]
fn test_branch_and_cut_callback_error_is_returned() {
    let Some(engine) = native() else { return };
    let mut model = fractional_mip(&engine);
    let options = IntoptOptions::new()
        .with_msg_level(MessageLevel::Off)
        .with_callback(|tree| tree.cut_pool_size().map(drop));
    let err = model.intopt(&options).unwrap_err();
    assert_eq!(err.code(), "TREE_NOT_ALLOWED");

    // The model stays usable after a stopped search.
    let retry = IntoptOptions::new()
        .with_msg_level(MessageLevel::Off)
        .with_presolve(true);
    assert_eq!(model.intopt(&retry).unwrap(), IntoptReturn::Ok);
    assert_close(model.mip_objective_value().unwrap(), 0.6);
}

fn textbook(engine: &Engine) -> Model {
    let mut model = Model::new(engine).unwrap();
    model.set_sense(Sense::Maximize).unwrap();
    let x = model
        .add_variables_keyed(
            &["a", "b", "c"],
            &VariableProperties::new().with_bounds(0.0, 10.0).with_objective(1.0),
        )
        .unwrap();
    let c = model
        .add_constraint(ConstraintProperties::new().with_upper(8.0))
        .unwrap();
    model.accumulate_all(c, [(x["a"], 2.0), (x["c"], 0.5)]).unwrap();
    model
        .add_constraint(
            ConstraintProperties::new()
                .with_lower(-3.0)
                .with_coefficients([(x["b"], 1.0), (x["c"], -1.0)]),
        )
        .unwrap();
    model
}

fn assert_same_shape(original: &Model, copy: &Model) {
    assert_eq!(copy.num_variables(), original.num_variables());
    assert_eq!(copy.num_constraints(), original.num_constraints());
    for (a, b) in original.variables().zip(copy.variables()) {
        assert_eq!(copy.bounds(b).unwrap(), original.bounds(a).unwrap());
        assert_close(copy.objective(b).unwrap(), original.objective(a).unwrap());
    }
    for (a, b) in original.constraints().zip(copy.constraints()) {
        assert_eq!(copy.bounds(b).unwrap(), original.bounds(a).unwrap());
        let want = original.coefficients(a).unwrap();
        let got = copy.coefficients(b).unwrap();
        assert_eq!(got.len(), want.len());
        for ((x, value), (y, expected)) in got.into_iter().zip(want) {
            assert_eq!(x.index(), y.index());
            assert_close(value, expected);
        }
    }
}

#[test]
fn test_lp_roundtrip() {
    let Some(engine) = native() else { return };
    let mut model = textbook(&engine);
    let text = model.to_lp().unwrap();
    assert!(text.contains("Maximize"));
    let copy = Model::from_lp(&engine, &text).unwrap();
    assert_same_shape(&model, &copy);
    assert_eq!(copy.sense().unwrap(), Sense::Maximize);
}

#[test]
fn test_mps_roundtrip() {
    let Some(engine) = native() else { return };
    let mut model = textbook(&engine);
    let text = model.to_mps().unwrap();
    let copy = Model::from_mps(&engine, &text, MpsFormat::File).unwrap();
    assert_same_shape(&model, &copy);
}

#[test]
fn test_malformed_lp_rejected() {
    let Some(engine) = native() else { return };
    let err = Model::from_lp(&engine, "this is not an lp file").unwrap_err();
    assert_eq!(err.code(), "READ_FAILED");
}

#[test]
fn test_no_engine_memory_leaks() {
    let Some(engine) = native() else { return };
    {
        let mut model = textbook(&engine);
        model.simplex(&quiet()).unwrap();
        let _ = model.to_lp().unwrap();
    }
    assert_eq!(engine.info().unwrap().live_allocations, 0);
}
