#![allow(non_snake_case)]

use qpbarrier::{algebra::*, problem::*, solver::*};
use ConstraintSense::*;

// minimize ½xᵀQx with Q = 2I
// subject to 0.1 x1 + 0.5 x2 >= r, x1 + x2 = 1, 0 <= x <= 1
fn portfolio_data() -> (CscMatrix<f64>, CscMatrix<f64>, [ConstraintSense; 2]) {
    let Q = CscMatrix::new(
        2,             // m
        2,             // n
        vec![0, 1, 2], // colptr
        vec![0, 1],    // rowval
        vec![2., 2.],  // nzval
    );
    let A = CscMatrix::from(&[[0.1, 0.5], [1., 1.]]);
    (Q, A, [GreaterEqual, Equal])
}

fn quiet() -> DefaultSettings<f64> {
    DefaultSettingsBuilder::default()
        .verbose(false)
        .build()
        .unwrap()
}

fn solve_portfolio(r: f64, settings: DefaultSettings<f64>) -> SolveResult<f64> {
    let (Q, A, sense) = portfolio_data();
    solve(
        ObjectiveSense::Minimize,
        &A,
        &sense,
        &[r, 1.],
        &[0., 0.],
        &Q,
        &[0., 0.],
        &[1., 1.],
        settings,
    )
    .unwrap()
}

#[test]
fn test_portfolio_optimum() {
    let result = solve_portfolio(0.3, quiet());

    assert_eq!(result.status, QPStatus::Optimal);
    assert!(result.x.dist(&[0.5, 0.5]) < 1e-6);
    assert!((result.objective - 0.5).abs() < 1e-6);
    assert!(result.iterations > 0);
    assert!(result.r_prim < 1e-6 && result.r_dual < 1e-6);

    // stationarity Qx + c + Aᵀy - z = 0
    let (Q, A, _) = portfolio_data();
    let mut g = vec![0.; 2];
    Q.gemv(&mut g, &result.x, 1., 0.);
    A.t().gemv(&mut g, &result.y, 1., 1.);
    g.axpby(-1., &result.z, 1.);
    assert!(g.norm_inf() < 1e-5);

    // the budget multiplier pays for the marginal unit of wealth
    assert!((result.y[1] + 1.).abs() < 1e-5);
}

#[test]
fn test_portfolio_return_out_of_reach() {
    // 0.1 + 0.5 < 0.7, detected before any iteration
    let result = solve_portfolio(0.7, quiet());
    assert_eq!(result.status, QPStatus::Infeasible);
    assert_eq!(result.iterations, 0);
    assert!(result.x.iter().all(|x| x.is_nan()));
    assert!(result.objective.is_nan());

    // the box alone allows 0.6, but the budget caps the return at 0.5
    let result = solve_portfolio(0.55, quiet());
    assert_eq!(result.status, QPStatus::Infeasible);
    assert!(result.iterations > 0);
    assert!(result.x.iter().all(|x| x.is_nan()));
    assert!(result.objective.is_nan());
}

#[test]
fn test_portfolio_presolve_disabled() {
    let settings = DefaultSettingsBuilder::default()
        .verbose(false)
        .presolve_enable(false)
        .build()
        .unwrap();

    let result = solve_portfolio(0.3, settings.clone());
    assert_eq!(result.status, QPStatus::Optimal);
    assert!(result.x.dist(&[0.5, 0.5]) < 1e-6);

    // the interior point method finds the infeasibility on its own
    let result = solve_portfolio(0.7, settings);
    assert_eq!(result.status, QPStatus::Infeasible);
    assert!(result.iterations > 0);
}

#[test]
fn test_portfolio_iteration_limit() {
    let settings = DefaultSettingsBuilder::default()
        .verbose(false)
        .max_iter(1)
        .build()
        .unwrap();

    let result = solve_portfolio(0.3, settings);
    assert_eq!(result.status, QPStatus::IterationLimit);
    assert_eq!(result.iterations, 1);
    assert!(result.x.is_finite());
    assert!(result.objective.is_finite());
}

#[test]
fn test_portfolio_tolerance_shortcut() {
    let settings = DefaultSettingsBuilder::default()
        .verbose(false)
        .tolerance(1e-4)
        .build()
        .unwrap();
    assert_eq!(settings.tol_gap_abs, 1e-4);
    assert_eq!(settings.tol_feas, 1e-4);

    // polishing recovers the optimum from the looser stopping point
    let result = solve_portfolio(0.3, settings);
    assert_eq!(result.status, QPStatus::Optimal);
    assert!(result.x.dist(&[0.5, 0.5]) < 1e-6);
}

#[test]
fn test_portfolio_weakly_active_return() {
    // at r = 0.3 the return row binds but its multiplier is zero
    let result = solve_portfolio(0.3, quiet());
    assert_eq!(result.status, QPStatus::Optimal);
    assert!(result.x.dist(&[0.5, 0.5]) < 1e-9);
    assert!(result.y[0].abs() < 1e-9);
    assert!((result.y[1] + 1.).abs() < 1e-9);
    assert!((result.objective - 0.5).abs() < 1e-9);

    // without polishing the interior point stays close, not exact
    let settings = DefaultSettingsBuilder::default()
        .verbose(false)
        .tolerance(1e-4)
        .polish_enable(false)
        .build()
        .unwrap();
    let result = solve_portfolio(0.3, settings);
    assert_eq!(result.status, QPStatus::Optimal);
    assert!(result.x.dist(&[0.5, 0.5]) < 1e-2);
}

#[test]
fn test_scaling_invariance() {
    let (Q, A, sense) = portfolio_data();
    let c = [0.1, -0.2];

    let solve_scaled = |k: f64| {
        let mut Qk = Q.clone();
        Qk.scale(k);
        let mut ck = c.to_vec();
        ck.scale(k);
        solve(
            ObjectiveSense::Minimize,
            &A,
            &sense,
            &[0.3, 1.],
            &ck,
            &Qk,
            &[0., 0.],
            &[1., 1.],
            quiet(),
        )
        .unwrap()
    };

    let r1 = solve_scaled(1.);
    let r3 = solve_scaled(3.);
    assert_eq!(r1.status, QPStatus::Optimal);
    assert_eq!(r3.status, QPStatus::Optimal);
    assert!(r1.x.dist(&r3.x) < 1e-6);
    assert!((3. * r1.objective - r3.objective).abs() < 1e-6);
}

#[test]
fn test_symmetrize_idempotent() {
    let (_, A, sense) = portfolio_data();
    // same quadratic form as 2I + [0 1; 1 0]
    let Q = CscMatrix::from(&[[2., 2.], [0., 2.]]);

    let build = |Q: &CscMatrix<f64>| {
        QPProblem::build(
            ObjectiveSense::Minimize,
            &A,
            &sense,
            &[0.3, 1.],
            &[0., 0.],
            Q,
            &[0., 0.],
            &[1., 1.],
        )
        .unwrap()
    };

    let p1 = build(&Q);
    let p2 = build(p1.Q());
    assert_eq!(p1, p2);
    assert!(p1.Q().is_symmetric(0.));

    let r1 = QPSolver::new(&p1, quiet()).unwrap().solve();
    let r2 = QPSolver::new(&p2, quiet()).unwrap().solve();
    assert_eq!(r1.status, QPStatus::Optimal);
    assert_eq!(r1.x, r2.x);
}

#[test]
fn test_repeated_solve() {
    let (Q, A, sense) = portfolio_data();
    let problem = QPProblem::build(
        ObjectiveSense::Minimize,
        &A,
        &sense,
        &[0.3, 1.],
        &[0.05, 0.],
        &Q,
        &[0., 0.],
        &[1., 1.],
    )
    .unwrap();

    let mut solver = QPSolver::new(&problem, quiet()).unwrap();
    let r1 = solver.solve();
    let r2 = solver.solve();

    assert_eq!(r1.status, QPStatus::Optimal);
    assert_eq!(r1.x, r2.x);
    assert_eq!(r1.y, r2.y);
    assert_eq!(r1.objective, r2.objective);
    assert_eq!(r1.iterations, r2.iterations);
}

#[test]
fn test_fixed_variable() {
    let (Q, A, sense) = portfolio_data();
    let result = solve(
        ObjectiveSense::Minimize,
        &A,
        &sense,
        &[0.2, 1.],
        &[0., 0.],
        &Q,
        &[0., 0.4],
        &[1., 0.4],
        quiet(),
    )
    .unwrap();

    assert_eq!(result.status, QPStatus::Optimal);
    assert_eq!(result.x[1], 0.4);
    assert!((result.x[0] - 0.6).abs() < 1e-6);
    // 0.36 + 0.16
    assert!((result.objective - 0.52).abs() < 1e-6);

    // the pinned variable carries the remaining stationarity
    let mut g = vec![0.; 2];
    Q.gemv(&mut g, &result.x, 1., 0.);
    A.t().gemv(&mut g, &result.y, 1., 1.);
    g.axpby(-1., &result.z, 1.);
    assert!(g.norm_inf() < 1e-5);
}
