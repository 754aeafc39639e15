use super::*;
use crate::qdldl::QDLDLError;
use crate::solver::core::{
    cones::{CompositeCone, SupportedConeT},
    traits::ProblemData,
    SettingsError, Solver,
};
use thiserror::Error;

use crate::algebra::*;
use crate::io::ConfigurablePrintTarget;
use crate::timers::*;
use std::io::Write;

/// Interior point solver for
/// `min ½xᵀPx + qᵀx  s.t.  Ax + s = b,  s ∈ K`
/// with `K` a product of zero and nonnegative cones.
pub type DefaultSolver<T = f64> = Solver<
    DefaultProblemData<T>,
    DefaultVariables<T>,
    DefaultResiduals<T>,
    DefaultKKTSystem<T>,
    CompositeCone<T>,
    DefaultInfo<T>,
    DefaultSolution<T>,
    DefaultSettings<T>,
>;

/// Errors raised while setting up a [`DefaultSolver`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Bad problem data: {0}")]
    BadProblemData(String),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("KKT factorization failed: {0}")]
    Factorization(#[from] QDLDLError),
}

impl<T> DefaultSolver<T>
where
    T: FloatT,
{
    /// Set up a solver.  Only the upper triangle of `P` is read.
    pub fn new(
        P: &CscMatrix<T>,
        q: &[T],
        A: &CscMatrix<T>,
        b: &[T],
        cone_types: &[SupportedConeT],
        settings: DefaultSettings<T>,
    ) -> Result<Self, SolverError> {
        Self::new_with_ordering(P, q, A, b, cone_types, settings, None)
    }

    /// Set up a solver with a given fill reducing permutation of the
    /// KKT matrix `[P Aᵀ; A -I]`.  With `None` an AMD ordering is used.
    pub fn new_with_ordering(
        P: &CscMatrix<T>,
        q: &[T],
        A: &CscMatrix<T>,
        b: &[T],
        cone_types: &[SupportedConeT],
        settings: DefaultSettings<T>,
        perm: Option<Vec<usize>>,
    ) -> Result<Self, SolverError> {
        settings.validate()?;
        check_dimensions(P, q, A, b, cone_types)?;

        let mut timers = Timers::default();
        timers.start_as_current("setup");
        let parts = Self::setup_parts(P, q, A, b, cone_types, &settings, perm, &mut timers);
        timers.stop_current();
        let (data, cones, kktsystem) = parts?;

        let (n, m) = (data.n, data.m);
        Ok(Self {
            data,
            variables: DefaultVariables::new(n, m),
            residuals: DefaultResiduals::new(n, m),
            kktsystem,
            step_lhs: DefaultVariables::new(n, m),
            step_rhs: DefaultVariables::new(n, m),
            prev_vars: DefaultVariables::new(n, m),
            info: DefaultInfo::new(),
            solution: DefaultSolution::new(n, m),
            cones,
            settings,
            timers: Some(timers),
        })
    }

    // Scaled problem data, cones, and a factored KKT system.  Data is
    // equilibrated once here so that repeated solves reuse it.
    #[allow(clippy::too_many_arguments)]
    fn setup_parts(
        P: &CscMatrix<T>,
        q: &[T],
        A: &CscMatrix<T>,
        b: &[T],
        cone_types: &[SupportedConeT],
        settings: &DefaultSettings<T>,
        perm: Option<Vec<usize>>,
        timers: &mut Timers,
    ) -> Result<(DefaultProblemData<T>, CompositeCone<T>, DefaultKKTSystem<T>), SolverError> {
        let cones = CompositeCone::new(cone_types);
        let mut data = DefaultProblemData::new(P, q, A, b);

        timeit! {timers => "equilibration"; {
            data.equilibrate(&cones, settings);
        }}

        let kktsystem;
        timeit! {timers => "kktinit"; {
            kktsystem = DefaultKKTSystem::new(&data, &cones, settings, perm);
        }}

        Ok((data, cones, kktsystem?))
    }
}

impl<T> ConfigurablePrintTarget for DefaultSolver<T>
where
    T: FloatT,
{
    fn print_to_stdout(&mut self) {
        self.info.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.info.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.info.print_to_stream(stream)
    }
    fn print_to_buffer(&mut self) {
        self.info.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.info.get_print_buffer()
    }
}

fn check_dimensions<T: FloatT>(
    P: &CscMatrix<T>,
    q: &[T],
    A: &CscMatrix<T>,
    b: &[T],
    cone_types: &[SupportedConeT],
) -> Result<(), SolverError> {
    let (m, n) = A.size();
    let cone_rows: usize = cone_types.iter().map(|c| c.nvars()).sum();

    let problem = if P.size() != (n, n) {
        Some(format!("P is {:?} but A has {n} columns", P.size()))
    } else if q.len() != n {
        Some(format!("q has length {} but A has {n} columns", q.len()))
    } else if b.len() != m {
        Some(format!("b has length {} but A has {m} rows", b.len()))
    } else if cone_rows != m {
        Some(format!("cones cover {cone_rows} rows but A has {m}"))
    } else if P.check_format().is_err() || A.check_format().is_err() {
        Some("P and A must be valid CSC matrices".to_string())
    } else {
        None
    };

    match problem {
        Some(msg) => Err(SolverError::BadProblemData(msg)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::core::IPSolver;
    use crate::solver::{SolverStatus, SupportedConeT::*};

    fn quiet() -> DefaultSettings<f64> {
        DefaultSettingsBuilder::default()
            .verbose(false)
            .build()
            .unwrap()
    }

    #[test]
    fn test_conic_qp() {
        // min x1^2 + x2^2 - x1 s.t. x1 + x2 = 1, x >= 0
        let P = CscMatrix::from(&[[2., 0.], [0., 2.]]);
        let q = [-1., 0.];
        let A = CscMatrix::from(&[[1., 1.], [-1., 0.], [0., -1.]]);
        let b = [1., 0., 0.];
        let cones = [ZeroConeT(1), NonnegativeConeT(2)];

        let mut solver = DefaultSolver::new(&P, &q, &A, &b, &cones, quiet()).unwrap();
        solver.solve();

        assert_eq!(solver.solution.status, SolverStatus::Solved);
        assert!((solver.solution.x[0] - 0.75).abs() < 1e-6);
        assert!((solver.solution.x[1] - 0.25).abs() < 1e-6);
        // 0.75^2 + 0.25^2 - 0.75
        assert!((solver.solution.obj_val + 0.125).abs() < 1e-6);
    }

    #[test]
    fn test_conic_lp_infeasible() {
        // x <= -1 and x >= 0
        let P = CscMatrix::<f64>::zeros(1, 1);
        let A = CscMatrix::from(&[[1.], [-1.]]);
        let cones = [NonnegativeConeT(2)];

        let mut solver = DefaultSolver::new(&P, &[1.], &A, &[-1., 0.], &cones, quiet()).unwrap();
        solver.solve();
        assert_eq!(solver.solution.status, SolverStatus::PrimalInfeasible);
        assert!(solver.solution.obj_val.is_nan());
    }

    #[test]
    fn test_bad_dimensions() {
        let P = CscMatrix::<f64>::identity(2);
        let A = CscMatrix::from(&[[1., 1.]]);

        let err = DefaultSolver::new(&P, &[1.], &A, &[1.], &[ZeroConeT(1)], quiet());
        assert!(matches!(err, Err(SolverError::BadProblemData(_))));

        let err = DefaultSolver::new(&P, &[1., 1.], &A, &[1.], &[ZeroConeT(2)], quiet());
        assert!(matches!(err, Err(SolverError::BadProblemData(_))));

        let settings = DefaultSettings {
            max_step_fraction: 2.,
            ..quiet()
        };
        let err = DefaultSolver::new(&P, &[1., 1.], &A, &[1.], &[ZeroConeT(1)], settings);
        assert!(matches!(err, Err(SolverError::Settings(_))));
    }
}
