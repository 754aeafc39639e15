//! Component traits of the interior point solver.
//!
//! A problem format is supported by a family of mutually associated
//! types, one per trait below, which together parameterize
//! [`Solver`](crate::solver::core::Solver).   The crate provides a single
//! family, found in [`default`](crate::solver::implementations::default).

use super::{cones::Cone, CoreSettings};
use super::{SolverStatus, StepDirection};
use crate::algebra::*;
use crate::timers::*;

/// Problem data in the solver's internal form
pub trait ProblemData<T: FloatT> {
    type V: Variables<T>;
    type C: Cone<T>;
    type SE: Settings<T>;

    /// Rescale the data in place ahead of the first iteration
    fn equilibrate(&mut self, cones: &Self::C, settings: &Self::SE);
}

/// Iterates of the embedding, also used for step directions and
/// right hand sides of the Newton system.
pub trait Variables<T: FloatT> {
    type D: ProblemData<T>;
    type R: Residuals<T>;
    type C: Cone<T>;
    type SE: Settings<T>;

    /// Complementarity measure `μ` of the current iterate
    fn calc_mu(&mut self, residuals: &Self::R, cones: &Self::C) -> T;

    /// Right hand side of the predictor system
    fn affine_step_rhs(&mut self, residuals: &Self::R, variables: &Self, cones: &Self::C);

    /// Right hand side of the corrector system with centering `σ`.
    /// `step` holds the predictor direction on entry and may be
    /// overwritten.
    #[allow(clippy::too_many_arguments)]
    fn combined_step_rhs(
        &mut self,
        residuals: &Self::R,
        variables: &Self,
        cones: &mut Self::C,
        step: &mut Self,
        σ: T,
        μ: T,
        m: T,
    );

    /// Longest step in `[0,1]` along `step_lhs` that stays interior
    fn calc_step_length(
        &self,
        step_lhs: &Self,
        cones: &mut Self::C,
        settings: &Self::SE,
        step_direction: StepDirection,
    ) -> T;

    /// `self += α * step_lhs`
    fn add_step(&mut self, step_lhs: &Self, α: T);

    /// Shift `(s,z)` into the interior of the cones
    fn symmetric_initialization(&mut self, cones: &mut Self::C);

    fn copy_from(&mut self, src: &Self);

    /// Update the cone scalings at the current iterate.
    /// Returns `false` on failure.
    fn scale_cones(&self, cones: &mut Self::C, μ: T) -> bool;
}

/// Residuals of the embedding at a given iterate
pub trait Residuals<T: FloatT> {
    type D: ProblemData<T>;
    type V: Variables<T>;

    fn update(&mut self, variables: &Self::V, data: &Self::D);
}

/// Linear system solved for each Newton direction.   All methods
/// return `false` if the factorization or solve failed.
pub trait KKTSystem<T: FloatT> {
    type D: ProblemData<T>;
    type V: Variables<T>;
    type C: Cone<T>;
    type SE: Settings<T>;

    /// Refactor with the current cone scalings
    fn update(&mut self, data: &Self::D, cones: &Self::C, settings: &Self::SE) -> bool;

    /// Solve for the direction `step_lhs` given `step_rhs`
    #[allow(clippy::too_many_arguments)]
    fn solve(
        &mut self,
        step_lhs: &mut Self::V,
        step_rhs: &Self::V,
        data: &Self::D,
        variables: &Self::V,
        cones: &mut Self::C,
        step_direction: StepDirection,
        settings: &Self::SE,
    ) -> bool;

    /// Solve for an unshifted starting point
    fn solve_initial_point(
        &mut self,
        variables: &mut Self::V,
        data: &Self::D,
        settings: &Self::SE,
    ) -> bool;
}

/// Progress output.   Every method writes to [`print_target`](InfoPrint::print_target)
/// and does nothing unless the settings ask for verbose output.
pub trait InfoPrint<T>
where
    T: FloatT,
{
    type D: ProblemData<T>;
    type C: Cone<T>;
    type SE: Settings<T>;

    /// Problem dimensions and settings, once per solve
    fn print_configuration(
        &mut self,
        settings: &Self::SE,
        data: &Self::D,
        cones: &Self::C,
    ) -> std::io::Result<()>;

    /// Column titles for the iteration log
    fn print_status_header(&mut self, settings: &Self::SE) -> std::io::Result<()>;

    /// One line of the iteration log
    fn print_status(&mut self, settings: &Self::SE) -> std::io::Result<()>;

    /// Final status and timings
    fn print_footer(&mut self, settings: &Self::SE) -> std::io::Result<()>;

    fn print_target(&mut self) -> &mut dyn std::io::Write;
}

/// Progress tracking and termination tests
pub trait Info<T>: InfoPrint<T>
where
    T: FloatT,
{
    type V: Variables<T>;
    type R: Residuals<T>;

    /// Clear all progress and restart the solve timers
    fn reset(&mut self, timers: &mut Timers);

    /// Record the solve time at exit
    fn finalize(&mut self, timers: &mut Timers);

    /// Recompute objective values, gaps and residual norms
    fn update(&mut self, data: &Self::D, variables: &Self::V, residuals: &Self::R, timers: &Timers);

    /// Assign a status and return `true` if the solver should stop
    fn check_termination(&mut self, residuals: &Self::R, settings: &Self::SE, iter: u32) -> bool;

    fn save_prev_iterate(&mut self, variables: &Self::V, prev_variables: &mut Self::V);
    fn reset_to_prev_iterate(&mut self, variables: &mut Self::V, prev_variables: &Self::V);

    /// Keep the gap `μ`, step length `α` and centering `σ` of the
    /// latest iteration for display
    fn save_scalars(&mut self, μ: T, α: T, σ: T, iter: u32);

    fn get_status(&self) -> SolverStatus;
    fn set_status(&mut self, status: SolverStatus);
}

/// Output of a solve
pub trait Solution<T: FloatT> {
    type D: ProblemData<T>;
    type V: Variables<T>;
    type I: Info<T>;

    /// Fill in from the final iterate, which is unscaled in place
    fn finalize(&mut self, data: &Self::D, variables: &mut Self::V, info: &Self::I);
}

/// Solver settings.   Implementations may carry any options of their
/// own, but must expose a [`CoreSettings`] for the shared iteration.
pub trait Settings<T: FloatT> {
    fn core(&self) -> &CoreSettings<T>;
    fn core_mut(&mut self) -> &mut CoreSettings<T>;
}
