#![allow(non_snake_case)]

//! Reduction of a [`QPProblem`] to conic standard form.
//!
//! Presolve eliminates pinned variables and rows whose feasibility is
//! already decided by the variable bounds, and then writes what remains
//! as
//!
//! ```text
//!  minimize   ½xᵀPx + qᵀx
//!  subject to Ax + s = b,  s ∈ {0}ᵖ × R₊ᵠ
//! ```
//!
//! with equality rows first, then inequality rows, then finite upper and
//! finite lower variable bounds.   A fill reducing ordering of the KKT
//! matrix of the reduced problem is computed here once.

use super::{ConstraintSense, QPProblem};
use crate::algebra::*;
use crate::qdldl;
use crate::solver::core::kktsolvers::direct::assemble_kkt_matrix;
use crate::solver::{is_infinite_bound, DefaultSettings, SupportedConeT};

/// Origin of a row of the reduced conic problem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrigin {
    /// Linear constraint `index`, negated when it was a `≥` row
    Constraint { index: usize, negated: bool },
    /// Upper bound `x_j ≤ u_j` of original variable `j`
    Upper(usize),
    /// Lower bound `−x_j ≤ −l_j` of original variable `j`
    Lower(usize),
}

/// Conic problem data produced by [`presolve`]
#[derive(Debug, Clone)]
pub struct ReducedProblem<T: FloatT = f64> {
    /// upper triangle of the quadratic term
    pub P: CscMatrix<T>,
    pub q: Vec<T>,
    pub A: CscMatrix<T>,
    pub b: Vec<T>,
    pub cones: Vec<SupportedConeT>,
    /// AMD ordering of the KKT matrix, if one could be computed
    pub perm: Option<Vec<usize>>,
}

impl<T: FloatT> ReducedProblem<T> {
    pub fn nvars(&self) -> usize {
        self.A.n
    }
    pub fn nrows(&self) -> usize {
        self.A.m
    }
}

/// Map from the reduced problem back to the original one
#[derive(Debug, Clone)]
pub struct Mapping<T: FloatT = f64> {
    /// original index of each reduced variable
    pub col_map: Vec<usize>,
    /// value of each variable eliminated as pinned, by original index
    pub fixed: Vec<Option<T>>,
    /// origin of each reduced conic row
    pub rows: Vec<RowOrigin>,
    /// linear constraints removed as redundant
    pub removed_rows: Vec<usize>,
}

impl<T: FloatT> Mapping<T> {
    /// Number of eliminated variables
    pub fn removed_variables(&self) -> usize {
        self.fixed.iter().filter(|v| v.is_some()).count()
    }
}

/// Result of [`presolve`]
#[derive(Debug, Clone)]
pub enum PresolveOutcome<T: FloatT = f64> {
    Reduced(ReducedProblem<T>, Mapping<T>),
    /// The problem can not be feasible.   Carries a description.
    Infeasible(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowAction {
    Keep,
    Drop,
    Infeasible,
}

/// Bounds on `aᵀx` over the box of the free variables.
///
/// Infinite contributions are counted separately so that a single
/// infinite bound does not swamp the finite part.
#[derive(Debug, Clone, Copy)]
struct Activity<T> {
    lo: T,
    hi: T,
    lo_inf: usize,
    hi_inf: usize,
    nfree: usize,
}

impl<T: FloatT> Activity<T> {
    fn new() -> Self {
        Self {
            lo: T::zero(),
            hi: T::zero(),
            lo_inf: 0,
            hi_inf: 0,
            nfree: 0,
        }
    }

    fn push(&mut self, a: T, l: T, u: T) {
        self.nfree += 1;
        let (at_lo, at_hi) = if a > T::zero() { (l, u) } else { (u, l) };

        if is_infinite_bound(at_lo) {
            self.lo_inf += 1;
        } else {
            self.lo += a * at_lo;
        }
        if is_infinite_bound(at_hi) {
            self.hi_inf += 1;
        } else {
            self.hi += a * at_hi;
        }
    }

    fn lower(&self) -> T {
        if self.lo_inf > 0 {
            T::neg_infinity()
        } else {
            self.lo
        }
    }

    fn upper(&self) -> T {
        if self.hi_inf > 0 {
            T::infinity()
        } else {
            self.hi
        }
    }
}

fn classify_row<T: FloatT>(
    sense: ConstraintSense,
    b: T,
    activity: &Activity<T>,
    enable: bool,
    feas_tol: T,
) -> RowAction {
    use ConstraintSense::*;

    if is_infinite_bound(b) {
        return match sense {
            LessEqual if b > T::zero() => RowAction::Drop,
            GreaterEqual if b < T::zero() => RowAction::Drop,
            _ => RowAction::Infeasible,
        };
    }
    if !enable {
        return RowAction::Keep;
    }

    let margin = feas_tol * T::max(T::one(), b.abs());
    let (lo, hi) = (activity.lower(), activity.upper());

    let violated = match sense {
        LessEqual => lo > b + margin,
        GreaterEqual => hi < b - margin,
        Equal => lo > b + margin || hi < b - margin,
    };
    if violated {
        return RowAction::Infeasible;
    }

    // a row without free entries is now satisfied to within the margin
    if activity.nfree == 0 {
        return RowAction::Drop;
    }

    let redundant = match sense {
        LessEqual => hi <= b,
        GreaterEqual => lo >= b,
        Equal => false,
    };
    if redundant {
        RowAction::Drop
    } else {
        RowAction::Keep
    }
}

/// Reduce `problem` to conic standard form.
///
/// Returns [`PresolveOutcome::Infeasible`] when some constraint is
/// violated by more than `presolve_feas_tol·max(1,|b|)` at every point
/// of the variable box, or when an equality or a row in its binding
/// direction has an infinite right hand side.
pub fn presolve<T: FloatT>(
    problem: &QPProblem<T>,
    settings: &DefaultSettings<T>,
) -> PresolveOutcome<T> {
    let (m, n) = (problem.ncons(), problem.nvars());
    let (l, u) = (problem.l(), problem.u());
    let enable = settings.presolve_enable;
    let sgn: T = problem.direction().sign();

    // pinned variables
    let fixed: Vec<Option<T>> = (0..n)
        .map(|j| (enable && l[j] == u[j]).then_some(l[j]))
        .collect();
    let free: Vec<bool> = fixed.iter().map(|f| f.is_none()).collect();
    let col_map: Vec<usize> = (0..n).filter(|&j| free[j]).collect();
    let mut reduced_col = vec![usize::MAX; n];
    for (k, &j) in col_map.iter().enumerate() {
        reduced_col[j] = k;
    }
    let xf: Vec<T> = fixed.iter().map(|f| f.unwrap_or(T::zero())).collect();

    // q = sgn(c + Q xf) on the free columns
    let mut cfull = problem.c().to_vec();
    problem.Q().gemv(&mut cfull, &xf, T::one(), T::one());
    let mut q = cfull.select(&free);
    q.scale(sgn);

    let mut P = problem.Q().select_columns(&free).select_rows(&free);
    P.scale(sgn);
    let P = P.to_triu();

    // rhs shifted by the pinned values, and row activities
    let At = problem.A().transpose();
    let mut brhs = problem.b().to_vec();
    let mut activity = vec![Activity::<T>::new(); m];

    for (i, act) in activity.iter_mut().enumerate() {
        for ptr in At.colptr[i]..At.colptr[i + 1] {
            let (j, a) = (At.rowval[ptr], At.nzval[ptr]);
            if a == T::zero() {
                continue;
            }
            match fixed[j] {
                Some(v) => {
                    if !is_infinite_bound(brhs[i]) {
                        brhs[i] -= a * v;
                    }
                }
                None => act.push(a, l[j], u[j]),
            }
        }
    }

    let mut keep_eq = vec![];
    let mut keep_ineq = vec![];
    let mut removed_rows = vec![];

    for i in 0..m {
        let sense = problem.sense()[i];
        match classify_row(sense, brhs[i], &activity[i], enable, settings.presolve_feas_tol) {
            RowAction::Keep if sense == ConstraintSense::Equal => keep_eq.push(i),
            RowAction::Keep => keep_ineq.push(i),
            RowAction::Drop => removed_rows.push(i),
            RowAction::Infeasible => {
                return PresolveOutcome::Infeasible(format!(
                    "constraint {i} can not be satisfied within the variable bounds"
                ));
            }
        }
    }

    // conic rows in cone order
    let mut rows = Vec::with_capacity(keep_eq.len() + keep_ineq.len() + 2 * col_map.len());
    rows.extend(keep_eq.iter().map(|&index| RowOrigin::Constraint {
        index,
        negated: false,
    }));
    rows.extend(keep_ineq.iter().map(|&index| RowOrigin::Constraint {
        index,
        negated: problem.sense()[index] == ConstraintSense::GreaterEqual,
    }));
    rows.extend(
        col_map
            .iter()
            .filter(|&&j| !is_infinite_bound(u[j]))
            .map(|&j| RowOrigin::Upper(j)),
    );
    rows.extend(
        col_map
            .iter()
            .filter(|&&j| !is_infinite_bound(l[j]))
            .map(|&j| RowOrigin::Lower(j)),
    );

    let (mut I, mut J, mut V) = (vec![], vec![], vec![]);
    let mut b = Vec::with_capacity(rows.len());

    for (k, origin) in rows.iter().enumerate() {
        match *origin {
            RowOrigin::Constraint { index, negated } => {
                let sign = if negated { -T::one() } else { T::one() };
                for ptr in At.colptr[index]..At.colptr[index + 1] {
                    let j = At.rowval[ptr];
                    if free[j] {
                        I.push(k);
                        J.push(reduced_col[j]);
                        V.push(sign * At.nzval[ptr]);
                    }
                }
                b.push(sign * brhs[index]);
            }
            RowOrigin::Upper(j) => {
                I.push(k);
                J.push(reduced_col[j]);
                V.push(T::one());
                b.push(u[j]);
            }
            RowOrigin::Lower(j) => {
                I.push(k);
                J.push(reduced_col[j]);
                V.push(-T::one());
                b.push(-l[j]);
            }
        }
    }

    // indices are in range by construction
    let A = match CscMatrix::from_triplets(rows.len(), col_map.len(), &I, &J, &V) {
        Ok(A) => A,
        Err(_) => unreachable!(),
    };

    let mut cones = vec![];
    if !keep_eq.is_empty() {
        cones.push(SupportedConeT::ZeroConeT(keep_eq.len()));
    }
    if rows.len() > keep_eq.len() {
        cones.push(SupportedConeT::NonnegativeConeT(rows.len() - keep_eq.len()));
    }

    let perm = kkt_ordering(&P, &A, settings.amd_dense_scale);

    let reduced = ReducedProblem {
        P,
        q,
        A,
        b,
        cones,
        perm,
    };
    let mapping = Mapping {
        col_map,
        fixed,
        rows,
        removed_rows,
    };
    PresolveOutcome::Reduced(reduced, mapping)
}

// The ordering is only a hint.   If AMD fails the factorisation
// computes its own.
fn kkt_ordering<T: FloatT>(
    P: &CscMatrix<T>,
    A: &CscMatrix<T>,
    amd_dense_scale: f64,
) -> Option<Vec<usize>> {
    if A.n + A.m == 0 {
        return None;
    }
    let (K, _) = assemble_kkt_matrix(P, A);
    qdldl::amd_ordering(&K, amd_dense_scale)
        .ok()
        .map(|(perm, _)| perm)
}
