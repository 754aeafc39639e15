#![allow(non_snake_case)]

//! Mapping of conic solver results back to the original problem.

use super::presolve::{Mapping, RowOrigin};
use super::{ObjectiveSense, QPProblem};
use crate::algebra::*;
use crate::solver::{is_infinite_bound, DefaultSettings, DefaultSolution, SolverStatus};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Status of a [`SolveResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum QPStatus {
    /// An optimal solution was found
    Optimal,
    /// No point satisfies the constraints and bounds
    Infeasible,
    /// The objective is unbounded in the optimization direction
    Unbounded,
    /// Stopped on the iteration or time limit.   The last iterate is returned.
    IterationLimit,
    /// The solver failed for numerical reasons
    NumericalError,
}

impl std::fmt::Display for QPStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl From<SolverStatus> for QPStatus {
    fn from(status: SolverStatus) -> Self {
        match status {
            SolverStatus::Solved => QPStatus::Optimal,
            SolverStatus::PrimalInfeasible => QPStatus::Infeasible,
            SolverStatus::DualInfeasible => QPStatus::Unbounded,
            SolverStatus::MaxIterations | SolverStatus::MaxTime => QPStatus::IterationLimit,
            SolverStatus::Unsolved
            | SolverStatus::NumericalError
            | SolverStatus::InsufficientProgress => QPStatus::NumericalError,
        }
    }
}

/// Outcome of solving a [`QPProblem`]
///
/// Multipliers satisfy `Qx + c + Aᵀy − z = 0` at an optimal point.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult<T = f64> {
    pub status: QPStatus,
    /// primal solution, one entry per variable
    pub x: Vec<T>,
    /// `cᵀx + ½xᵀQx` evaluated on the original data
    pub objective: T,
    pub iterations: u32,
    /// primal residual of the conic problem
    pub r_prim: T,
    /// dual residual of the conic problem
    pub r_dual: T,
    /// constraint multipliers, zero on rows removed by presolve
    pub y: Vec<T>,
    /// variable bound multipliers
    pub z: Vec<T>,
    /// total time in seconds, presolve included
    pub solve_time: f64,
}

impl<T: FloatT> SolveResult<T> {
    /// A result carrying no point, as for infeasible or failed solves
    pub(crate) fn without_point(status: QPStatus, n: usize, m: usize) -> Self {
        Self {
            status,
            x: vec![T::nan(); n],
            objective: T::nan(),
            iterations: 0,
            r_prim: T::nan(),
            r_dual: T::nan(),
            y: vec![T::nan(); m],
            z: vec![T::nan(); n],
            solve_time: 0.0,
        }
    }
}

/// Build a [`SolveResult`] for `problem` from the conic `solution` of
/// the problem reduced by `mapping`.
pub fn report<T: FloatT>(
    problem: &QPProblem<T>,
    mapping: &Mapping<T>,
    solution: &DefaultSolution<T>,
    settings: &DefaultSettings<T>,
) -> SolveResult<T> {
    let (m, n) = (problem.ncons(), problem.nvars());
    let status = QPStatus::from(solution.status);

    let mut result = SolveResult::without_point(status, n, m);
    result.iterations = solution.iterations;
    result.r_prim = solution.r_prim;
    result.r_dual = solution.r_dual;
    result.solve_time = solution.solve_time;

    match status {
        QPStatus::Optimal | QPStatus::IterationLimit => {}
        QPStatus::Unbounded => {
            result.objective = match problem.direction() {
                ObjectiveSense::Minimize => T::neg_infinity(),
                ObjectiveSense::Maximize => T::infinity(),
            };
            return result;
        }
        QPStatus::Infeasible | QPStatus::NumericalError => return result,
    }

    // expand to original indices
    let mut x: Vec<T> = mapping
        .fixed
        .iter()
        .map(|f| f.unwrap_or(T::zero()))
        .collect();
    for (k, &j) in mapping.col_map.iter().enumerate() {
        x[j] = solution.x[k];
    }
    snap_to_bounds(&mut x, problem.l(), problem.u(), settings.bound_snap_tol);

    let (objective, Qx) = problem.objective_and_Qx(&x);

    // conic duals satisfy sgn(Qx + c) + Aᵀ_conic z = 0
    let sgn: T = problem.direction().sign();
    let mut y = vec![T::zero(); m];
    let mut zbound = vec![T::zero(); n];
    for (k, origin) in mapping.rows.iter().enumerate() {
        let zk = sgn * solution.z[k];
        match *origin {
            RowOrigin::Constraint { index, negated } => {
                y[index] = if negated { -zk } else { zk };
            }
            RowOrigin::Upper(j) => zbound[j] -= zk,
            RowOrigin::Lower(j) => zbound[j] += zk,
        }
    }

    // pinned variables take whatever stationarity leaves over
    if mapping.fixed.iter().any(|f| f.is_some()) {
        let mut grad = Qx;
        grad.axpby(T::one(), problem.c(), T::one());
        problem.A().t().gemv(&mut grad, &y, T::one(), T::one());
        for (j, f) in mapping.fixed.iter().enumerate() {
            if f.is_some() {
                zbound[j] = grad[j];
            }
        }
    }

    result.x = x;
    result.objective = objective;
    result.y = y;
    result.z = zbound;
    result
}

fn snap_to_bounds<T: FloatT>(x: &mut [T], l: &[T], u: &[T], tol: T) {
    for (xj, (&lj, &uj)) in x.iter_mut().zip(l.iter().zip(u.iter())) {
        if !is_infinite_bound(lj) && (*xj - lj).abs() <= tol * T::max(T::one(), lj.abs()) {
            *xj = lj;
        } else if !is_infinite_bound(uj) && (*xj - uj).abs() <= tol * T::max(T::one(), uj.abs()) {
            *xj = uj;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_map() {
        assert_eq!(QPStatus::from(SolverStatus::Solved), QPStatus::Optimal);
        assert_eq!(
            QPStatus::from(SolverStatus::PrimalInfeasible),
            QPStatus::Infeasible
        );
        assert_eq!(
            QPStatus::from(SolverStatus::DualInfeasible),
            QPStatus::Unbounded
        );
        assert_eq!(
            QPStatus::from(SolverStatus::MaxTime),
            QPStatus::IterationLimit
        );
        assert_eq!(
            QPStatus::from(SolverStatus::InsufficientProgress),
            QPStatus::NumericalError
        );
    }

    #[test]
    fn test_snap_to_bounds() {
        let inf = f64::INFINITY;
        let mut x = vec![1e-9, 0.5, 100. + 1e-7, 3., -2e-9];
        let l = [0., 0., -inf, -inf, 0.];
        let u = [1., 1., 100., inf, inf];
        snap_to_bounds(&mut x, &l, &u, 1e-8);
        assert_eq!(x, vec![0., 0.5, 100., 3., 0.]);
        assert!(x[4].is_sign_positive());
    }
}
