#![allow(non_snake_case)]

use qpbarrier::{algebra::*, problem::*, solver::*};
use ConstraintSense::*;

fn quiet() -> DefaultSettings<f64> {
    DefaultSettingsBuilder::default()
        .verbose(false)
        .build()
        .unwrap()
}

// x1 + 2 x2 <= 4, 3 x1 + x2 <= 6, x >= 0
fn lp_data() -> (CscMatrix<f64>, [ConstraintSense; 2], [f64; 2]) {
    let A = CscMatrix::new(
        2,                    // m
        2,                    // n
        vec![0, 2, 4],        // colptr
        vec![0, 1, 0, 1],     // rowval
        vec![1., 3., 2., 1.], // nzval
    );
    (A, [LessEqual, LessEqual], [4., 6.])
}

#[test]
fn test_lp_maximize_vertex() {
    let (A, sense, b) = lp_data();
    let Q = CscMatrix::zeros(2, 2);
    let inf = f64::INFINITY;

    let result = solve(
        ObjectiveSense::Maximize,
        &A,
        &sense,
        &b,
        &[1., 1.],
        &Q,
        &[0., 0.],
        &[inf, inf],
        quiet(),
    )
    .unwrap();

    assert_eq!(result.status, QPStatus::Optimal);
    assert!(result.x.dist(&[1.6, 1.2]) < 1e-6);
    assert!((result.objective - 2.8).abs() < 1e-6);

    // both rows bind, with multipliers of the sign of a maximization
    assert!(result.y.iter().all(|&y| y < 0.));
    assert!(result.y.dist(&[-0.4, -0.2]) < 1e-6);
}

#[test]
fn test_lp_minimize_vertex() {
    let (A, sense, b) = lp_data();
    let Q = CscMatrix::zeros(2, 2);
    let inf = f64::INFINITY;

    let result = solve(
        ObjectiveSense::Minimize,
        &A,
        &sense,
        &b,
        &[-1., -1.],
        &Q,
        &[0., 0.],
        &[inf, inf],
        quiet(),
    )
    .unwrap();

    assert_eq!(result.status, QPStatus::Optimal);
    assert!(result.x.dist(&[1.6, 1.2]) < 1e-6);
    assert!((result.objective + 2.8).abs() < 1e-6);
}

#[test]
fn test_lp_active_bound() {
    // min -x1 - 0.5 x2 s.t. x1 + x2 <= 1.5, 0 <= x <= 1
    let A = CscMatrix::from(&[[1., 1.]]);
    let Q = CscMatrix::zeros(2, 2);

    let result = solve(
        ObjectiveSense::Minimize,
        &A,
        &[LessEqual],
        &[1.5],
        &[-1., -0.5],
        &Q,
        &[0., 0.],
        &[1., 1.],
        quiet(),
    )
    .unwrap();

    assert_eq!(result.status, QPStatus::Optimal);
    assert!((result.x[0] - 1.).abs() < 1e-7);
    assert!((result.x[1] - 0.5).abs() < 1e-6);
    assert!((result.objective + 1.25).abs() < 1e-6);

    // upper bound on x1 is active, so its multiplier is negative
    assert!((result.y[0] - 0.5).abs() < 1e-5);
    assert!((result.z[0] + 0.5).abs() < 1e-5);
    assert!(result.z[1].abs() < 1e-5);
}

#[test]
fn test_lp_unbounded() {
    // x1 - x2 <= 1 leaves x1 = x2 -> ∞ feasible
    let A = CscMatrix::from(&[[1., -1.]]);
    let Q = CscMatrix::zeros(2, 2);
    let inf = f64::INFINITY;

    let result = solve(
        ObjectiveSense::Minimize,
        &A,
        &[LessEqual],
        &[1.],
        &[-1., 0.],
        &Q,
        &[0., 0.],
        &[inf, inf],
        quiet(),
    )
    .unwrap();

    assert_eq!(result.status, QPStatus::Unbounded);
    assert_eq!(result.objective, -inf);
    assert!(result.x.iter().all(|x| x.is_nan()));

    // and the same problem as a maximization
    let result = solve(
        ObjectiveSense::Maximize,
        &A,
        &[LessEqual],
        &[1.],
        &[1., 0.],
        &Q,
        &[0., 0.],
        &[inf, inf],
        quiet(),
    )
    .unwrap();

    assert_eq!(result.status, QPStatus::Unbounded);
    assert_eq!(result.objective, inf);
}

#[test]
fn test_lp_infeasible() {
    // x1 + x2 >= 3 and x1 + x2 <= 1
    let A = CscMatrix::from(&[[1., 1.], [1., 1.]]);
    let Q = CscMatrix::zeros(2, 2);
    let inf = f64::INFINITY;

    let result = solve(
        ObjectiveSense::Minimize,
        &A,
        &[GreaterEqual, LessEqual],
        &[3., 1.],
        &[1., 1.],
        &Q,
        &[-inf, -inf],
        &[inf, inf],
        quiet(),
    )
    .unwrap();

    assert_eq!(result.status, QPStatus::Infeasible);
    assert!(result.objective.is_nan());
}

#[test]
fn test_lp_free_equality() {
    // min x1 + x2 s.t. x1 - x2 = 0, x1 + x2 >= 2, x free
    let A = CscMatrix::from(&[[1., -1.], [1., 1.]]);
    let Q = CscMatrix::zeros(2, 2);
    let inf = f64::INFINITY;

    let result = solve(
        ObjectiveSense::Minimize,
        &A,
        &[Equal, GreaterEqual],
        &[0., 2.],
        &[1., 1.],
        &Q,
        &[-inf, -inf],
        &[inf, inf],
        quiet(),
    )
    .unwrap();

    assert_eq!(result.status, QPStatus::Optimal);
    assert!(result.x.dist(&[1., 1.]) < 1e-6);
    assert!((result.objective - 2.).abs() < 1e-6);
    assert_eq!(result.z, vec![0., 0.]);
}
