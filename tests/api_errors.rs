#![allow(non_snake_case)]

use qpbarrier::{algebra::*, problem::*, solver::*};
use ConstraintSense::*;

fn small_data() -> (CscMatrix<f64>, CscMatrix<f64>) {
    let A = CscMatrix::from(&[[1., 1.], [1., 0.]]);
    let Q = CscMatrix::identity(2);
    (A, Q)
}

#[test]
fn test_shape_errors() {
    let (A, Q) = small_data();
    let mm = ObjectiveSense::Minimize;
    let ones = [1., 1.];
    let zeros = [0., 0.];
    let s = DefaultSettings::default;

    // rhs too short
    let r = solve(mm, &A, &[LessEqual, Equal], &[1.], &ones, &Q, &zeros, &ones, s());
    assert!(matches!(r, Err(ProblemError::ShapeError(_))));

    // sense too long
    let r = solve(mm, &A, &[LessEqual, Equal, Equal], &ones, &ones, &Q, &zeros, &ones, s());
    assert!(matches!(r, Err(ProblemError::ShapeError(_))));

    // Q of the wrong size
    let Q3 = CscMatrix::identity(3);
    let r = solve(mm, &A, &[LessEqual, Equal], &ones, &ones, &Q3, &zeros, &ones, s());
    assert!(matches!(r, Err(ProblemError::ShapeError(_))));

    // NaN in the objective
    let r = solve(mm, &A, &[LessEqual, Equal], &ones, &[f64::NAN, 1.], &Q, &zeros, &ones, s());
    match r {
        Err(ProblemError::ShapeError(msg)) => assert!(msg.starts_with("c ")),
        _ => panic!("NaN objective accepted"),
    }
}

#[test]
fn test_bad_sparse_format() {
    // row indices out of order
    let A = CscMatrix::new(2, 1, vec![0, 2], vec![1, 0], vec![1., 1.]);

    let r = QPProblem::build(
        ObjectiveSense::Minimize,
        &A,
        &[LessEqual, LessEqual],
        &[1., 1.],
        &[1.],
        &CscMatrix::identity(1),
        &[0.],
        &[1.],
    );
    assert!(matches!(r, Err(ProblemError::Sparse(_))));
}

#[test]
fn test_bound_errors() {
    let (A, Q) = small_data();
    let r = QPProblem::build(
        ObjectiveSense::Minimize,
        &A,
        &[LessEqual, Equal],
        &[1., 1.],
        &[1., 1.],
        &Q,
        &[0., 1.5],
        &[1., 1.],
    );
    match r {
        Err(ProblemError::InfeasibleBoundsError {
            index,
            lower,
            upper,
        }) => {
            assert_eq!(index, 1);
            assert_eq!(lower, 1.5);
            assert_eq!(upper, 1.);
        }
        _ => panic!("crossed bounds accepted"),
    }

    // equal bounds are fine
    let r = QPProblem::build(
        ObjectiveSense::Minimize,
        &A,
        &[LessEqual, Equal],
        &[1., 1.],
        &[1., 1.],
        &Q,
        &[0., 1.],
        &[1., 1.],
    );
    assert!(r.is_ok());
}

#[test]
fn test_density_errors() {
    let (A, Q) = small_data();
    let settings = DefaultSettingsBuilder::default()
        .max_sparse_density(0.5)
        .build()
        .unwrap();

    // A is 3/4 dense
    let r = solve(
        ObjectiveSense::Minimize,
        &A,
        &[LessEqual, Equal],
        &[1., 1.],
        &[1., 1.],
        &Q,
        &[0., 0.],
        &[1., 1.],
        settings,
    );
    match r {
        Err(ProblemError::Sparse(SparseFormatError::TooDenseForSparsePath {
            density,
            max_density,
        })) => {
            assert_eq!(density, 0.75);
            assert_eq!(max_density, 0.5);
        }
        _ => panic!("dense data accepted"),
    }
}

#[test]
fn test_settings_errors() {
    assert!(DefaultSettingsBuilder::<f64>::default()
        .max_step_fraction(1.5)
        .build()
        .is_err());

    let (A, Q) = small_data();
    let settings = DefaultSettings {
        tol_feas: -1.,
        ..DefaultSettings::default()
    };
    let problem = QPProblem::build(
        ObjectiveSense::Minimize,
        &A,
        &[LessEqual, Equal],
        &[1., 1.],
        &[1., 1.],
        &Q,
        &[0., 0.],
        &[1., 1.],
    )
    .unwrap();
    assert!(matches!(
        QPSolver::new(&problem, settings),
        Err(ProblemError::Settings(_))
    ));
}
