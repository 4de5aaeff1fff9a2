use super::support::small_lp;
use super::*;
use glpx_abi::Abi;
use glpx_solver::MpsFormat;

#[test]
fn test_lp_text_roundtrip() {
    let (fake, mut model) = setup();
    let (xs, cs) = small_lp(&mut model);
    let text = model.to_lp().unwrap();
    assert!(!model.is_dirty(cs[0]).unwrap());
    assert_eq!(fake.calls("write_lp"), 1);

    let engine = Engine::with_abi(fake.clone());
    let copy = Model::from_lp(&engine, &text).unwrap();
    assert_eq!(copy.num_variables(), 2);
    assert_eq!(copy.num_constraints(), 2);
    assert_eq!(copy.sense().unwrap(), Sense::Maximize);

    let x = copy.variable(0).unwrap();
    let c2 = copy.constraint(1).unwrap();
    assert_ne!(Entity::from(x), Entity::from(xs[0]));
    assert_eq!(copy.label(x).unwrap(), "x");
    assert_eq!(copy.objective(x).unwrap(), 1.0);
    assert_eq!(copy.bounds(x).unwrap(), Bounds::new(Some(0.0), None));
    assert_eq!(copy.bounds(c2).unwrap(), Bounds::new(None, Some(6.0)));
    assert_eq!(
        copy.coefficients(c2).unwrap(),
        vec![(x, 3.0), (copy.variable(1).unwrap(), 1.0)]
    );
    assert!(!copy.is_dirty(c2).unwrap());
    assert_eq!(fake.live_allocations(), 0);
}

#[test]
fn test_rebuilt_model_flushes_only_new_edits() {
    let (fake, mut model) = setup();
    small_lp(&mut model);
    let text = model.to_lp().unwrap();
    let engine = Engine::with_abi(fake.clone());
    let mut copy = Model::from_lp(&engine, &text).unwrap();
    fake.reset_calls();

    assert_eq!(copy.update().unwrap(), 0);
    let c1 = copy.constraint(0).unwrap();
    let y = copy.variable(1).unwrap();
    copy.accumulate(c1, y, 1.0).unwrap();
    assert_eq!(copy.update().unwrap(), 1);
    assert_eq!(fake.calls("set_mat_row"), 1);
    assert_eq!(copy.coefficient(c1, y).unwrap(), 3.0);
}

#[test]
fn test_mps_text_roundtrip() {
    let (fake, mut model) = setup();
    small_lp(&mut model);
    let text = model.to_mps().unwrap();
    assert_eq!(fake.calls("write_mps"), 1);

    let engine = Engine::with_abi(fake.clone());
    let copy = Model::from_mps(&engine, &text, MpsFormat::File).unwrap();
    assert_eq!(copy.num_constraints(), 2);
    assert_eq!(copy.label(copy.constraint(0).unwrap()).unwrap(), "c1");
}

#[test]
fn test_reader_failure_reported() {
    let (fake, mut model) = setup();
    small_lp(&mut model);
    let text = model.to_mps().unwrap();
    let engine = Engine::with_abi(fake.clone());

    let err = Model::from_lp(&engine, &text).unwrap_err();
    assert_eq!(err, ModelError::ReadFailed { format: "lp", code: 1 });

    let err = Model::from_mps(&engine, &text, MpsFormat::Deck).unwrap_err();
    assert_eq!(
        err,
        ModelError::ReadFailed {
            format: "fixed mps",
            code: 1
        }
    );
    assert_eq!(err.to_string(), "[READ_FAILED] fixed mps reading failed (engine status 1)");
    // Failed reads drop their problem.
    assert_eq!(fake.live_problems(), 1);
}

#[test]
fn test_writer_failure_reported() {
    let (_fake, mut model) = setup();
    small_lp(&mut model);
    let path = std::env::temp_dir()
        .join("glpx-missing-directory")
        .join("model.lp");
    let err = model.write_lp(&path).unwrap_err();
    assert_eq!(err, ModelError::WriteFailed { format: "lp", code: 1 });
}

#[test]
fn test_write_and_read_paths() {
    let (fake, mut model) = setup();
    small_lp(&mut model);
    let path = std::env::temp_dir().join(format!("glpx-paths-{}.mps", std::process::id()));
    model.write_mps(&path, MpsFormat::Deck).unwrap();

    let engine = Engine::with_abi(fake.clone());
    let copy = Model::read_mps(&engine, &path, MpsFormat::Deck);
    std::fs::remove_file(&path).unwrap();
    let copy = copy.unwrap();
    assert_eq!(copy.num_variables(), 2);
    assert_eq!(copy.label(copy.variable(1).unwrap()).unwrap(), "y");
}
