use super::*;
use crate::types::{ConstraintProperties, VariableProperties};
use glpx_solver::{BoundKind, VariableKind};

#[test]
fn test_block_creation_uses_one_engine_call() {
    let (fake, mut model) = setup();
    let xs = model
        .add_variables(3, &VariableProperties::new().with_lower(0.0).with_name("x"))
        .unwrap();
    assert_eq!(xs.len(), 3);
    assert_eq!(fake.calls("add_cols"), 1);
    assert_eq!(model.num_variables(), 3);
    let labels: Vec<String> = xs.iter().map(|&x| model.label(x).unwrap()).collect();
    assert_eq!(labels, vec!["x_0", "x_1", "x_2"]);
    assert_eq!(xs[2].index(), 3);
}

#[test]
fn test_empty_block_is_a_no_op() {
    let (fake, mut model) = setup();
    let xs = model.add_variables(0, &VariableProperties::new()).unwrap();
    let cs = model.add_constraints(0, &ConstraintProperties::new()).unwrap();
    assert!(xs.is_empty());
    assert!(cs.is_empty());
    assert_eq!(fake.calls("add_cols"), 0);
    assert_eq!(fake.calls("add_rows"), 0);
}

#[test]
fn test_keyed_creation_names_after_base_and_key() {
    let (_fake, mut model) = setup();
    let flows = model
        .add_variables_keyed(&["north", "south"], &VariableProperties::new().with_name("flow"))
        .unwrap();
    assert_eq!(flows.len(), 2);
    assert_eq!(model.label(flows["north"]).unwrap(), "flow[north]");
    assert_eq!(model.label(flows["south"]).unwrap(), "flow[south]");
    assert!(flows["north"].index() < flows["south"].index());

    let limits = model
        .add_constraints_keyed(&["a"], &ConstraintProperties::new().with_upper(1.0))
        .unwrap();
    assert_eq!(model.entity_name(limits["a"]).unwrap().as_deref(), Some("a"));
}

#[test]
fn test_named_records_fall_back_to_key() {
    let (_fake, mut model) = setup();
    let vars = model
        .add_variables_named(vec![
            ("cap", VariableProperties::new().with_upper(3.0)),
            ("y", VariableProperties::new().with_name("why")),
        ])
        .unwrap();
    assert_eq!(model.label(vars["cap"]).unwrap(), "cap");
    assert_eq!(model.label(vars["y"]).unwrap(), "why");
    assert_eq!(model.bounds(vars["cap"]).unwrap(), Bounds::new(None, Some(3.0)));
}

#[test]
fn test_duplicate_key_rejected_before_engine() {
    let (fake, mut model) = setup();
    let err = model
        .add_variables_keyed(&["a", "b", "a"], &VariableProperties::new())
        .unwrap_err();
    assert_eq!(err, ModelError::DuplicateKey { key: "a".to_string() });
    assert_eq!(fake.calls("add_cols"), 0);
    assert_eq!(model.num_variables(), 0);

    let err = model
        .add_constraints_named(vec![
            ("r", ConstraintProperties::new()),
            ("r", ConstraintProperties::new()),
        ])
        .unwrap_err();
    assert_eq!(err.code(), "KEY_DUPLICATE");
    assert_eq!(fake.calls("add_rows"), 0);
}

#[test]
fn test_non_numeric_input_rejected_before_engine() {
    let (fake, mut model) = setup();
    let err = model
        .add_variable(VariableProperties::new().with_lower(f64::NAN))
        .unwrap_err();
    assert_eq!(err.code(), "VALUE_NON_NUMERIC");

    let err = model
        .add_variables_from(vec![
            VariableProperties::new().with_objective(1.0),
            VariableProperties::new().with_objective(f64::INFINITY),
        ])
        .unwrap_err();
    assert_eq!(
        err,
        ModelError::NonNumeric {
            field: "objective",
            value: f64::INFINITY
        }
    );
    assert_eq!(fake.calls("add_cols"), 0);
    assert_eq!(model.num_variables(), 0);
}

#[test]
fn test_invalid_name_rejected_before_engine() {
    let (fake, mut model) = setup();
    let err = model
        .add_variable(VariableProperties::new().with_name("bad\nname"))
        .unwrap_err();
    assert_eq!(err.code(), "ABI_INVALID_NAME");
    assert_eq!(fake.calls("add_cols"), 0);
}

#[test]
fn test_properties_applied_in_order() {
    let (_fake, mut model) = setup();
    let x = model
        .add_variable(
            VariableProperties::new()
                .with_objective(2.5)
                .with_bounds(1.0, 10.0)
                .with_kind(VariableKind::Integer)
                .with_name("units"),
        )
        .unwrap();
    assert_eq!(model.objective(x).unwrap(), 2.5);
    assert_eq!(model.bounds(x).unwrap(), Bounds::new(Some(1.0), Some(10.0)));
    assert_eq!(model.bound_kind(x).unwrap(), BoundKind::Double);
    assert_eq!(model.kind(x).unwrap(), VariableKind::Integer);
    assert_eq!(model.entity_name(x).unwrap().as_deref(), Some("units"));
    assert_eq!(model.num_integer().unwrap(), 1);
    assert_eq!(model.num_binary().unwrap(), 0);
}

#[test]
fn test_binary_kind_bounds_to_unit_interval() {
    let (_fake, mut model) = setup();
    let x = model
        .add_variable(VariableProperties::new().with_kind(VariableKind::Binary))
        .unwrap();
    assert_eq!(model.bounds(x).unwrap(), Bounds::new(Some(0.0), Some(1.0)));
    assert_eq!(model.kind(x).unwrap(), VariableKind::Binary);
    assert_eq!(model.num_binary().unwrap(), 1);
    assert_eq!(model.num_integer().unwrap(), 1);
}

#[test]
fn test_new_variable_defaults_to_free() {
    let (fake, mut model) = setup();
    let x = model.add_variable(VariableProperties::new()).unwrap();
    assert_eq!(model.bounds(x).unwrap(), Bounds::free());
    assert_eq!(model.kind(x).unwrap(), VariableKind::Continuous);
    assert_eq!(model.objective(x).unwrap(), 0.0);
    // The engine starts columns fixed at zero, so freeing one takes a call.
    assert_eq!(fake.calls("set_col_bnds"), 1);
    assert_eq!(model.label(x).unwrap(), "x_1");
}

#[test]
fn test_new_constraint_defaults_to_free() {
    let (fake, mut model) = setup();
    let c = model.add_constraint(ConstraintProperties::new()).unwrap();
    assert_eq!(model.bounds(c).unwrap(), Bounds::free());
    assert_eq!(fake.calls("set_row_bnds"), 0);
    assert_eq!(model.label(c).unwrap(), "r_1");
}

#[test]
fn test_infinite_bounds_stored_as_absent() {
    let (_fake, mut model) = setup();
    let x = model
        .add_variable(
            VariableProperties::new()
                .with_lower(f64::NEG_INFINITY)
                .with_upper(4.0),
        )
        .unwrap();
    assert_eq!(model.bounds(x).unwrap(), Bounds::new(None, Some(4.0)));
    assert_eq!(model.bound_kind(x).unwrap(), BoundKind::Upper);
}

#[test]
fn test_unchanged_bounds_skip_engine() {
    let (fake, mut model) = setup();
    let x = model
        .add_variable(VariableProperties::new().with_bounds(0.0, 10.0))
        .unwrap();
    fake.reset_calls();

    model.set_bounds(x, Some(0.0), Some(10.0)).unwrap();
    assert_eq!(fake.calls("set_col_bnds"), 0);

    model.set_upper(x, Some(5.0)).unwrap();
    assert_eq!(fake.calls("set_col_bnds"), 1);
    assert_eq!(model.bounds(x).unwrap(), Bounds::new(Some(0.0), Some(5.0)));

    model.set_lower(x, None).unwrap();
    assert_eq!(model.bound_kind(x).unwrap(), BoundKind::Upper);
    model.set_bounds(x, Some(2.0), Some(2.0)).unwrap();
    assert_eq!(model.bound_kind(x).unwrap(), BoundKind::Fixed);
    assert_eq!(fake.calls("set_col_bnds"), 3);
}

#[test]
fn test_nan_bound_rejected_on_update() {
    let (fake, mut model) = setup();
    let c = model.add_constraint(ConstraintProperties::new()).unwrap();
    let err = model.set_bounds(c, Some(f64::NAN), None).unwrap_err();
    assert_eq!(err.code(), "VALUE_NON_NUMERIC");
    assert_eq!(fake.calls("set_row_bnds"), 0);
    assert_eq!(model.bounds(c).unwrap(), Bounds::free());
}

#[test]
fn test_constraint_coefficients_stay_local_until_flush() {
    let (fake, mut model) = setup();
    let x = model.add_variable(VariableProperties::new()).unwrap();
    let y = model.add_variable(VariableProperties::new()).unwrap();
    let c = model
        .add_constraint(
            ConstraintProperties::new()
                .with_bounds(1.0, 8.0)
                .with_coefficients([(x, 1.0), (y, 2.0), (x, 0.5)]),
        )
        .unwrap();
    assert_eq!(model.coefficient(c, x).unwrap(), 1.5);
    assert_eq!(model.coefficient(c, y).unwrap(), 2.0);
    assert!(model.is_dirty(c).unwrap());
    assert_eq!(fake.calls("set_mat_row"), 0);
    assert_eq!(model.num_nonzeros().unwrap(), 0);
}

#[test]
fn test_constraint_with_foreign_variable_rejected() {
    let (fake, mut model) = setup();
    let (_other_fake, mut other) = setup();
    let stranger = other.add_variable(VariableProperties::new()).unwrap();
    let err = model
        .add_constraint(ConstraintProperties::new().with_coefficients([(stranger, 1.0)]))
        .unwrap_err();
    assert_eq!(err, ModelError::ForeignEntity { entity: stranger.into() });
    assert_eq!(fake.calls("add_rows"), 0);
}

#[test]
fn test_objective_constant() {
    let (_fake, mut model) = setup();
    model.set_objective_constant(7.0).unwrap();
    assert_eq!(model.objective_constant().unwrap(), 7.0);
    let err = model.set_objective_constant(f64::NAN).unwrap_err();
    assert_eq!(err.code(), "VALUE_NON_NUMERIC");
}
