#![allow(non_snake_case)]

//! Active set polishing of an optimal conic solution.
//!
//! Interior point iterates approach the boundary without reaching it, so
//! a solution accepted at `tol_gap_abs` can still sit some distance from
//! the true optimum when a constraint is weakly active.   Polishing
//! guesses the active set from the final iterate, solves the equality
//! constrained problem
//!
//! ```text
//!  [P  Aₐᵀ] [x]   [-q]
//!  [Aₐ  0 ] [y] = [bₐ]
//! ```
//!
//! and keeps the result only if it is primal and dual feasible.

use super::presolve::ReducedProblem;
use crate::algebra::*;
use crate::solver::core::cones::{CompositeCone, Cone};
use crate::solver::core::kktsolvers::{direct::DirectLDLKKTSolver, KKTSolver};
use crate::solver::{DefaultSettings, DefaultSolution, SupportedConeT};
use std::iter::zip;

// an active row with a negative multiplier is released and the
// system solved again, at most this many times in total
const MAX_PASSES: usize = 3;

/// Outcome of [`polish`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolishStatus {
    /// The solution was replaced by the solution of the active set system
    Applied { active_rows: usize },
    /// No equality rows and no inequality guessed active
    NoActiveRows,
    /// The active set system could not be factored or solved
    Failed,
    /// The polished point missed the feasibility tolerance
    Rejected,
}

impl std::fmt::Display for PolishStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Applied { active_rows } => write!(f, "applied with {active_rows} active rows"),
            Self::NoActiveRows => write!(f, "skipped, no active rows"),
            Self::Failed => write!(f, "failed, active set system is singular"),
            Self::Rejected => write!(f, "rejected, polished point is infeasible"),
        }
    }
}

/// Replace an optimal `solution` of `reduced` by the exact optimum of
/// its active set, where that optimum is feasible.   The solution is
/// left untouched unless the result is [`PolishStatus::Applied`].
///
/// Equality rows are always active.   An inequality row is active when
/// its slack is smaller than its multiplier.
pub fn polish<T: FloatT>(
    reduced: &ReducedProblem<T>,
    solution: &mut DefaultSolution<T>,
    settings: &DefaultSettings<T>,
) -> PolishStatus {
    let m = reduced.b.len();

    let mut is_eq = vec![false; m];
    let mut start = 0;
    for cone in &reduced.cones {
        let dim = cone.nvars();
        if let SupportedConeT::ZeroConeT(_) = cone {
            is_eq[start..start + dim].fill(true);
        }
        start += dim;
    }

    let mut active: Vec<bool> = (0..m)
        .map(|i| is_eq[i] || solution.s[i] < solution.z[i])
        .collect();

    let ztol = settings.tol_feas * T::max(T::one(), solution.z.norm_inf());

    for _ in 0..MAX_PASSES {
        let rows: Vec<usize> = (0..m).filter(|&i| active[i]).collect();
        if rows.is_empty() {
            return PolishStatus::NoActiveRows;
        }

        let Some((x, y)) = solve_active_set(reduced, &active, settings) else {
            return PolishStatus::Failed;
        };

        let mut released = false;
        for (&i, &yi) in zip(&rows, &y) {
            if !is_eq[i] && yi < -ztol {
                active[i] = false;
                released = true;
            }
        }
        if released {
            continue;
        }

        let mut z = vec![T::zero(); m];
        for (&i, &yi) in zip(&rows, &y) {
            z[i] = if is_eq[i] { yi } else { T::max(yi, T::zero()) };
        }

        let Some(s) = feasible_slacks(reduced, &x, &active, settings.tol_feas) else {
            return PolishStatus::Rejected;
        };
        if !is_dual_feasible(reduced, &x, &z, settings.tol_feas) {
            return PolishStatus::Rejected;
        }

        let objective = reduced.P.quad_form(&x, &x) / (2.0).as_T() + reduced.q.dot(&x);
        solution.x = x;
        solution.s = s;
        solution.z = z;
        solution.obj_val = objective;
        solution.obj_val_dual = objective;

        return PolishStatus::Applied {
            active_rows: rows.len(),
        };
    }

    PolishStatus::Rejected
}

// The active set system is a KKT system with a zero cone over the active
// rows, so it is factored with the same static shift and refined in the
// same way as the interior point steps.
fn solve_active_set<T: FloatT>(
    reduced: &ReducedProblem<T>,
    active: &[bool],
    settings: &DefaultSettings<T>,
) -> Option<(Vec<T>, Vec<T>)> {
    let Aa = reduced.A.select_rows(active);
    let ba = reduced.b.select(active);
    let (ma, n) = Aa.size();

    let mut cones = CompositeCone::<T>::new(&[SupportedConeT::ZeroConeT(ma)]);
    cones.reset_scaling();

    let mut kkt = DirectLDLKKTSolver::new(&reduced.P, &Aa, &cones, settings, None).ok()?;
    if !kkt.update(&cones, settings) {
        return None;
    }

    let mut rhsx = reduced.q.clone();
    rhsx.negate();
    kkt.setrhs(&rhsx, &ba);

    let mut x = vec![T::zero(); n];
    let mut y = vec![T::zero(); ma];
    kkt.solve(Some(x.as_mut_slice()), Some(y.as_mut_slice()), settings)
        .then_some((x, y))
}

// s = b - Ax, or None if a row is violated.   Active rows must hold with
// equality and the rest with s ≥ 0, to within tol·(1 + |bᵢ|).  Rows that
// pass are set exactly onto their cone.
fn feasible_slacks<T: FloatT>(
    reduced: &ReducedProblem<T>,
    x: &[T],
    active: &[bool],
    tol: T,
) -> Option<Vec<T>> {
    let mut s = reduced.b.clone();
    reduced.A.gemv(&mut s, x, -T::one(), T::one());

    for ((si, &bi), &is_active) in s.iter_mut().zip(&reduced.b).zip(active) {
        let rowtol = tol * (T::one() + bi.abs());
        if is_active {
            if si.abs() > rowtol {
                return None;
            }
            *si = T::zero();
        } else {
            if si.is_nan() || *si < -rowtol {
                return None;
            }
            *si = T::max(*si, T::zero());
        }
    }
    Some(s)
}

// ‖Px + q + Aᵀz‖∞ ≤ tol·(1 + ‖q‖∞)
fn is_dual_feasible<T: FloatT>(reduced: &ReducedProblem<T>, x: &[T], z: &[T], tol: T) -> bool {
    let mut r = reduced.q.clone();
    reduced.P.sym().symv(&mut r, x, T::one(), T::one());
    reduced.A.t().gemv(&mut r, z, T::one(), T::one());
    r.norm_inf() <= tol * (T::one() + reduced.q.norm_inf())
}
