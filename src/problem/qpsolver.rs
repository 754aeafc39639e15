#![allow(non_snake_case)]

use super::polish::polish;
use super::presolve::{presolve, Mapping, PresolveOutcome, ReducedProblem};
use super::report::{report, QPStatus, SolveResult};
use super::{ConstraintSense, ObjectiveSense, ProblemError, QPProblem};
use crate::algebra::*;
use crate::io::{ConfigurablePrintTarget, PrintTarget};
use crate::solver::{
    DefaultSettings, DefaultSolution, DefaultSolver, IPSolver, PresolveStats, SolverStatus,
};
use crate::timers::*;
use std::fs::File;
use std::io::Write;

/// Interior point solver for a [`QPProblem`]
///
/// Every call to [`solve`](QPSolver::solve) starts from scratch.   No
/// state is carried between solves other than the print target.
///
/// ```no_run
/// use qpbarrier::algebra::*;
/// use qpbarrier::problem::*;
/// use qpbarrier::solver::*;
///
/// let Q = CscMatrix::from(&[[2., 0.], [0., 2.]]);
/// let A = CscMatrix::from(&[[1., 1.]]);
/// let problem = QPProblem::build(
///     ObjectiveSense::Minimize,
///     &A,
///     &[ConstraintSense::Equal],
///     &[1.],
///     &[0., 0.],
///     &Q,
///     &[0., 0.],
///     &[1., 1.],
/// )
/// .unwrap();
///
/// let mut solver = QPSolver::new(&problem, DefaultSettings::default()).unwrap();
/// let result = solver.solve();
/// assert_eq!(result.status, QPStatus::Optimal);
/// ```
pub struct QPSolver<'a, T: FloatT = f64> {
    problem: &'a QPProblem<T>,
    settings: DefaultSettings<T>,
    stream: PrintTarget,
}

impl<'a, T> QPSolver<'a, T>
where
    T: FloatT,
{
    /// Fails if the settings are invalid or if `A` or `Q` exceed
    /// the `max_sparse_density` setting.
    pub fn new(
        problem: &'a QPProblem<T>,
        settings: DefaultSettings<T>,
    ) -> Result<Self, ProblemError> {
        settings.validate()?;
        problem.A().check_density(settings.max_sparse_density)?;
        problem.Q().check_density(settings.max_sparse_density)?;

        Ok(Self {
            problem,
            settings,
            stream: PrintTarget::default(),
        })
    }

    pub fn settings(&self) -> &DefaultSettings<T> {
        &self.settings
    }

    /// Presolve, solve and report.   Infeasibility, unboundedness, limits
    /// and numerical failures are all reported through the result status.
    pub fn solve(&mut self) -> SolveResult<T> {
        let (m, n) = (self.problem.ncons(), self.problem.nvars());
        let mut timers = Timers::default();

        let outcome;
        timeit! {timers => "presolve"; {
            outcome = presolve(self.problem, &self.settings);
        }}
        let presolve_time = timers.total_time().as_secs_f64();

        let (reduced, mapping) = match outcome {
            PresolveOutcome::Reduced(reduced, mapping) => (reduced, mapping),
            PresolveOutcome::Infeasible(reason) => {
                self.print_line(format_args!("presolve: {reason}. Problem is infeasible"));
                let mut result = SolveResult::without_point(QPStatus::Infeasible, n, m);
                result.solve_time = presolve_time;
                return result;
            }
        };

        let mut result = if reduced.nvars() == 0 {
            self.solve_trivial(&mapping)
        } else {
            self.solve_reduced(reduced, &mapping)
        };
        result.solve_time += presolve_time;
        result
    }

    // every variable was pinned, and with them every row was decided
    fn solve_trivial(&mut self, mapping: &Mapping<T>) -> SolveResult<T> {
        self.print_line(format_args!(
            "presolve: all variables fixed. Problem is solved"
        ));
        let mut solution = DefaultSolution::<T>::new(0, 0);
        solution.status = SolverStatus::Solved;
        solution.r_prim = T::zero();
        solution.r_dual = T::zero();
        report(self.problem, mapping, &solution, &self.settings)
    }

    fn solve_reduced(
        &mut self,
        mut reduced: ReducedProblem<T>,
        mapping: &Mapping<T>,
    ) -> SolveResult<T> {
        let solver = DefaultSolver::new_with_ordering(
            &reduced.P,
            &reduced.q,
            &reduced.A,
            &reduced.b,
            &reduced.cones,
            self.settings.clone(),
            reduced.perm.take(),
        );

        let mut solver = match solver {
            Ok(solver) => solver,
            Err(e) => {
                self.print_line(format_args!("setup failed: {e}"));
                let (m, n) = (self.problem.ncons(), self.problem.nvars());
                return SolveResult::without_point(QPStatus::NumericalError, n, m);
            }
        };

        solver.data.presolve = Some(PresolveStats {
            removed_variables: mapping.removed_variables(),
            removed_constraints: mapping.removed_rows.len(),
        });

        solver.info.stream = std::mem::take(&mut self.stream);
        solver.solve();
        self.stream = std::mem::take(&mut solver.info.stream);

        let mut solution = solver.solution;
        if self.settings.polish_enable && solution.status == SolverStatus::Solved {
            let mut timers = Timers::default();
            let status;
            timeit! {timers => "polish"; {
                status = polish(&reduced, &mut solution, &self.settings);
            }}
            solution.solve_time += timers.total_time().as_secs_f64();
            self.print_line(format_args!("polish: {status}"));
        }

        report(self.problem, mapping, &solution, &self.settings)
    }

    fn print_line(&mut self, args: std::fmt::Arguments) {
        if self.settings.verbose {
            // print errors are never fatal to the solve
            let _ = writeln!(self.stream, "{args}");
        }
    }
}

impl<T> ConfigurablePrintTarget for QPSolver<'_, T>
where
    T: FloatT,
{
    fn print_to_stdout(&mut self) {
        self.stream.print_to_stdout()
    }
    fn print_to_file(&mut self, file: File) {
        self.stream.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.stream.print_to_stream(stream)
    }
    fn print_to_buffer(&mut self) {
        self.stream.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.stream.get_print_buffer()
    }
}

/// Build and solve a quadratic program in one call.
///
/// ```text
///  minimize / maximize   cᵀx + ½xᵀQx
///  subject to            a_iᵀx {≤, ≥, =} b_i
///                        l ≤ x ≤ u
/// ```
///
/// Returns an error only for malformed input.   See [`QPProblem::build`]
/// and [`QPSolver::new`].
#[allow(clippy::too_many_arguments)]
pub fn solve<T: FloatT>(
    direction: ObjectiveSense,
    A: &CscMatrix<T>,
    sense: &[ConstraintSense],
    b: &[T],
    c: &[T],
    Q: &CscMatrix<T>,
    l: &[T],
    u: &[T],
    settings: DefaultSettings<T>,
) -> Result<SolveResult<T>, ProblemError> {
    let problem = QPProblem::build(direction, A, sense, b, c, Q, l, u)?;
    let mut solver = QPSolver::new(&problem, settings)?;
    Ok(solver.solve())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::DefaultSettingsBuilder;
    use ConstraintSense::*;

    fn quiet() -> DefaultSettings<f64> {
        DefaultSettingsBuilder::default()
            .verbose(false)
            .build()
            .unwrap()
    }

    #[test]
    fn test_all_variables_fixed() {
        let A = CscMatrix::from(&[[1., 1.]]);
        let Q = CscMatrix::from(&[[2., 0.], [0., 2.]]);
        let result = solve(
            ObjectiveSense::Minimize,
            &A,
            &[Equal],
            &[1.],
            &[1., 0.],
            &Q,
            &[0.25, 0.75],
            &[0.25, 0.75],
            quiet(),
        )
        .unwrap();

        assert_eq!(result.status, QPStatus::Optimal);
        assert_eq!(result.x, vec![0.25, 0.75]);
        assert_eq!(result.iterations, 0);
        // 0.25 + 0.0625 + 0.5625
        assert!((result.objective - 0.875).abs() < 1e-14);
        // the row is dropped, so every multiplier sits on a bound
        assert_eq!(result.y, vec![0.]);
        assert_eq!(result.z, vec![1.5, 1.5]);
    }

    #[test]
    fn test_density_rejected() {
        let A = CscMatrix::from(&[[1., 1.]]);
        let Q = CscMatrix::<f64>::zeros(2, 2);
        let problem = QPProblem::build(
            ObjectiveSense::Minimize,
            &A,
            &[LessEqual],
            &[1.],
            &[1., 1.],
            &Q,
            &[0., 0.],
            &[1., 1.],
        )
        .unwrap();
        let settings = DefaultSettingsBuilder::default()
            .max_sparse_density(0.5)
            .build()
            .unwrap();

        assert!(matches!(
            QPSolver::new(&problem, settings),
            Err(ProblemError::Sparse(_))
        ));
    }

    #[test]
    fn test_presolve_message() {
        let A = CscMatrix::from(&[[1., 1.]]);
        let Q = CscMatrix::<f64>::zeros(2, 2);
        let problem = QPProblem::build(
            ObjectiveSense::Minimize,
            &A,
            &[GreaterEqual],
            &[3.],
            &[1., 1.],
            &Q,
            &[0., 0.],
            &[1., 1.],
        )
        .unwrap();

        let mut solver = QPSolver::new(&problem, DefaultSettings::default()).unwrap();
        solver.print_to_buffer();
        let result = solver.solve();

        assert_eq!(result.status, QPStatus::Infeasible);
        assert!(result.x.iter().all(|x| x.is_nan()));
        assert!(result.objective.is_nan());
        let text = solver.get_print_buffer().unwrap();
        assert!(text.contains("constraint 0"));
    }
}
