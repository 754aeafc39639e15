use self::internal::*;
use super::cones::Cone;
use super::traits::*;
use crate::algebra::*;
use crate::timers::*;

/// Termination state of the interior point method
#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
pub enum SolverStatus {
    /// The solver has not been run
    #[default]
    Unsolved,
    /// Converged to an optimal point within tolerance
    Solved,
    /// A certificate of primal infeasibility was found
    PrimalInfeasible,
    /// A certificate of dual infeasibility (unboundedness) was found
    DualInfeasible,
    /// Stopped at the iteration limit
    MaxIterations,
    /// Stopped at the time limit
    MaxTime,
    /// A factorization, solve or cone update failed
    NumericalError,
    /// The step length collapsed or the residuals stopped improving
    InsufficientProgress,
}

impl SolverStatus {
    pub(crate) fn is_infeasible(&self) -> bool {
        matches!(self, Self::PrimalInfeasible | Self::DualInfeasible)
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Predictor (affine) or corrector (combined) phase of an iteration
#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
pub enum StepDirection {
    Affine,
    Combined,
}

/// Homogeneous embedding interior point solver, generic over the
/// components that make up a particular problem format.
///
/// See [`DefaultSolver`](crate::solver::implementations::default::DefaultSolver)
/// for the concrete instance used throughout the crate.
pub struct Solver<D, V, R, K, C, I, SO, SE> {
    pub data: D,
    pub variables: V,
    pub residuals: R,
    pub kktsystem: K,
    pub cones: C,
    pub step_lhs: V,
    pub step_rhs: V,
    pub prev_vars: V,
    pub info: I,
    pub solution: SO,
    pub settings: SE,
    pub timers: Option<Timers>,
}

/// Interior point solvers that can be run to completion
pub trait IPSolver<T, D, V, R, K, C, I, SO, SE> {
    /// Iterate until a termination condition is met.   The outcome
    /// is written to the `solution` field.
    fn solve(&mut self);
}

// scalars carried from one iteration to the next
struct IterState<T> {
    iter: u32,
    μ: T,
    α: T,
    σ: T,
}

impl<T, D, V, R, K, C, I, SO, SE> IPSolver<T, D, V, R, K, C, I, SO, SE>
    for Solver<D, V, R, K, C, I, SO, SE>
where
    T: FloatT,
    D: ProblemData<T, V = V>,
    V: Variables<T, D = D, R = R, C = C, SE = SE>,
    R: Residuals<T, D = D, V = V>,
    K: KKTSystem<T, D = D, V = V, C = C, SE = SE>,
    C: Cone<T>,
    I: Info<T, D = D, V = V, R = R, C = C, SE = SE>,
    SO: Solution<T, D = D, V = V, I = I>,
    SE: Settings<T>,
{
    fn solve(&mut self) {
        let mut state = IterState {
            iter: 0,
            μ: T::zero(),
            α: T::zero(),
            σ: T::one(),
        };

        // held outside of self while running so that it can be
        // borrowed alongside the other fields
        let mut timers = self.timers.take().unwrap_or_default();

        // output failures never affect the solve
        notimeit! {timers; {
            let _ = self.print_preamble();
        }}

        self.info.reset(&mut timers);

        timeit! {timers => "solve"; {
            let started;
            timeit!{timers => "default start"; {
                started = self.default_start();
            }}

            if started {
                timeit!{timers => "IP iteration"; {
                    self.iterate(&mut timers, &mut state);
                }}
            } else {
                self.info.set_status(SolverStatus::NumericalError);
            }
        }}

        // no step was taken after the last status line, so
        // record the final scalars and print it again
        if state.α == T::zero() {
            self.info.save_scalars(state.μ, state.α, state.σ, state.iter);
            notimeit! {timers; {
                let _ = self.info.print_status(&self.settings);
            }}
        }

        self.info.finalize(&mut timers);
        self.solution
            .finalize(&self.data, &mut self.variables, &self.info);
        let _ = self.info.print_footer(&self.settings);

        self.timers.replace(timers);
    }
}

// helper methods live on a trait in a private module, where T is
// bound by the trait parameter
mod internal {
    use super::super::cones::Cone;
    use super::super::traits::*;
    use super::*;
    use std::io::Write;

    pub(super) trait IPSolverInternals<T> {
        fn print_preamble(&mut self) -> std::io::Result<()>;
        fn default_start(&mut self) -> bool;
        fn iterate(&mut self, timers: &mut Timers, state: &mut IterState<T>);
        fn predictor_corrector_step(
            &mut self,
            timers: &mut Timers,
            state: &mut IterState<T>,
        ) -> Result<(), SolverStatus>;
        fn solve_step(&mut self, timers: &mut Timers, direction: StepDirection) -> bool;
        fn step_length(&mut self, direction: StepDirection) -> T;
    }

    impl<T, D, V, R, K, C, I, SO, SE> IPSolverInternals<T> for Solver<D, V, R, K, C, I, SO, SE>
    where
        T: FloatT,
        D: ProblemData<T, V = V>,
        V: Variables<T, D = D, R = R, C = C, SE = SE>,
        R: Residuals<T, D = D, V = V>,
        K: KKTSystem<T, D = D, V = V, C = C, SE = SE>,
        C: Cone<T>,
        I: Info<T, D = D, V = V, R = R, C = C, SE = SE>,
        SO: Solution<T, D = D, V = V, I = I>,
        SE: Settings<T>,
    {
        fn print_preamble(&mut self) -> std::io::Result<()> {
            if self.settings.core().verbose {
                let out = self.info.print_target();
                let rule = "-".repeat(61);
                writeln!(out, "{rule}")?;
                writeln!(
                    out,
                    "        qpbarrier v{}  -  sparse interior point QP solver     \n",
                    crate::VERSION
                )?;
                writeln!(out, "{rule}")?;
            }
            self.info
                .print_configuration(&self.settings, &self.data, &self.cones)?;
            self.info.print_status_header(&self.settings)
        }

        // Starting point from the KKT system with identity scalings,
        // shifted into the cone interior.
        fn default_start(&mut self) -> bool {
            self.cones.reset_scaling();

            let is_ok = self
                .kktsystem
                .update(&self.data, &self.cones, &self.settings)
                && self
                    .kktsystem
                    .solve_initial_point(&mut self.variables, &self.data, &self.settings);

            if is_ok {
                self.variables.symmetric_initialization(&mut self.cones);
            }
            is_ok
        }

        // Main loop.   Returns once a status has been assigned.
        fn iterate(&mut self, timers: &mut Timers, state: &mut IterState<T>) {
            loop {
                self.residuals.update(&self.variables, &self.data);
                state.μ = self.variables.calc_mu(&self.residuals, &self.cones);

                self.info
                    .save_scalars(state.μ, state.α, state.σ, state.iter);
                self.info
                    .update(&self.data, &self.variables, &self.residuals, timers);
                notimeit! {timers; {
                    let _ = self.info.print_status(&self.settings);
                }}

                if self
                    .info
                    .check_termination(&self.residuals, &self.settings, state.iter)
                {
                    // the previous iterate was better than the current one
                    if self.info.get_status() == SolverStatus::InsufficientProgress {
                        self.info
                            .reset_to_prev_iterate(&mut self.variables, &self.prev_vars);
                    }
                    return;
                }

                if let Err(status) = self.predictor_corrector_step(timers, state) {
                    self.info.set_status(status);
                    state.α = T::zero();
                    return;
                }
            }
        }

        // One predictor-corrector iteration, ending with the iterate
        // advanced by the combined step.
        fn predictor_corrector_step(
            &mut self,
            timers: &mut Timers,
            state: &mut IterState<T>,
        ) -> Result<(), SolverStatus> {
            if !self.variables.scale_cones(&mut self.cones, state.μ) {
                return Err(SolverStatus::NumericalError);
            }

            // only iterations that reach a KKT update are counted
            state.iter += 1;

            let updated;
            timeit! {timers => "kkt update"; {
                updated = self.kktsystem.update(&self.data, &self.cones, &self.settings);
            }}
            if !updated {
                return Err(SolverStatus::NumericalError);
            }

            // predictor
            self.step_rhs
                .affine_step_rhs(&self.residuals, &self.variables, &self.cones);
            if !self.solve_step(timers, StepDirection::Affine) {
                return Err(SolverStatus::NumericalError);
            }

            let α_aff = self.step_length(StepDirection::Affine);
            state.α = α_aff;
            state.σ = (T::one() - α_aff).powi(3);

            // corrector.   The second order term is damped on the first
            // iteration, where the starting point may be badly centred.
            let m = if state.iter > 1 { T::one() } else { α_aff };
            self.step_rhs.combined_step_rhs(
                &self.residuals,
                &self.variables,
                &mut self.cones,
                &mut self.step_lhs,
                state.σ,
                state.μ,
                m,
            );
            if !self.solve_step(timers, StepDirection::Combined) {
                return Err(SolverStatus::NumericalError);
            }

            state.α = self.step_length(StepDirection::Combined);
            if state.α <= T::max(T::zero(), self.settings.core().min_terminate_step_length) {
                return Err(SolverStatus::InsufficientProgress);
            }

            self.info
                .save_prev_iterate(&self.variables, &mut self.prev_vars);
            self.variables.add_step(&self.step_lhs, state.α);

            Ok(())
        }

        fn solve_step(&mut self, timers: &mut Timers, direction: StepDirection) -> bool {
            let is_ok;
            timeit! {timers => "kkt solve"; {
                is_ok = self.kktsystem.solve(
                    &mut self.step_lhs,
                    &self.step_rhs,
                    &self.data,
                    &self.variables,
                    &mut self.cones,
                    direction,
                    &self.settings,
                );
            }}
            is_ok
        }

        // largest step along step_lhs that keeps the iterate interior
        fn step_length(&mut self, direction: StepDirection) -> T {
            self.variables
                .calc_step_length(&self.step_lhs, &mut self.cones, &self.settings, direction)
        }
    }
}
