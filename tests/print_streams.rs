#![allow(non_snake_case)]

use qpbarrier::{algebra::*, io::ConfigurablePrintTarget, problem::*, solver::*};
use ConstraintSense::*;

fn test_problem() -> QPProblem<f64> {
    let Q = CscMatrix::identity(2);
    let A = CscMatrix::from(&[[1., 1.], [1., 0.]]);
    QPProblem::build(
        ObjectiveSense::Minimize,
        &A,
        &[Equal, LessEqual],
        &[1., 5.],
        &[0., 0.],
        &Q,
        &[0., 0.],
        &[1., 1.],
    )
    .unwrap()
}

#[test]
fn test_print_to_stdout() {
    let problem = test_problem();
    let mut solver = QPSolver::new(&problem, DefaultSettings::default()).unwrap();
    solver.print_to_stdout();
    let result = solver.solve();
    assert_eq!(result.status, QPStatus::Optimal);
}

#[test]
fn test_print_to_buffer() {
    let problem = test_problem();
    let mut solver = QPSolver::new(&problem, DefaultSettings::default()).unwrap();
    solver.print_to_buffer();
    solver.solve();

    let text = solver.get_print_buffer().unwrap();
    assert!(text.contains("qpbarrier"));
    // x1 <= 5 can never bind within the box
    assert!(text.contains("presolve: removed 0 variables, 1 constraints"));
    assert!(text.contains("Solved"));
    // only the budget row is active at (0.5, 0.5)
    assert!(text.contains("polish: applied with 1 active rows"));
}

#[test]
fn test_print_quiet() {
    let problem = test_problem();
    let settings = DefaultSettingsBuilder::default()
        .verbose(false)
        .build()
        .unwrap();
    let mut solver = QPSolver::new(&problem, settings).unwrap();
    solver.print_to_buffer();
    solver.solve();
    assert_eq!(solver.get_print_buffer().unwrap(), "");
}

#[test]
fn test_print_to_file() {
    use std::io::{Read, Seek};

    let problem = test_problem();
    let mut solver = QPSolver::new(&problem, DefaultSettings::default()).unwrap();
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut file2 = file.reopen().unwrap();
    solver.print_to_file(file.into_file());
    solver.solve();

    file2.seek(std::io::SeekFrom::Start(0)).unwrap();
    let mut result = String::new();
    file2.read_to_string(&mut result).unwrap();
    assert!(result.contains("qpbarrier"));
}

#[test]
fn test_print_to_stream() {
    use std::io::{Read, Seek};

    let problem = test_problem();
    let mut solver = QPSolver::new(&problem, DefaultSettings::default()).unwrap();
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut file2 = file.reopen().unwrap();
    solver.print_to_stream(Box::new(file.into_file()));
    solver.solve();

    file2.seek(std::io::SeekFrom::Start(0)).unwrap();
    let mut result = String::new();
    file2.read_to_string(&mut result).unwrap();
    assert!(result.contains("qpbarrier"));
    assert!(solver.get_print_buffer().is_err());
}

#[test]
fn test_conic_solver_print_to_buffer() {
    let P = CscMatrix::identity(1);
    let A = CscMatrix::identity(1);
    let cones = [NonnegativeConeT(1)];
    let mut solver =
        DefaultSolver::new(&P, &[0.], &A, &[1.], &cones, DefaultSettings::default()).unwrap();
    solver.print_to_buffer();
    solver.solve();

    let text = solver.get_print_buffer().unwrap();
    assert!(text.contains("qpbarrier"));
    assert!(!text.contains("presolve: removed"));
}
