#![allow(non_snake_case)]

use crate::algebra::*;
use crate::solver::{is_infinite_bound, SettingsError};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Direction of optimization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ObjectiveSense {
    #[default]
    Minimize,
    Maximize,
}

impl ObjectiveSense {
    /// +1 when minimizing, -1 when maximizing
    pub(crate) fn sign<T: FloatT>(&self) -> T {
        match self {
            ObjectiveSense::Minimize => T::one(),
            ObjectiveSense::Maximize => -T::one(),
        }
    }
}

/// Sense of a linear constraint `aᵀx {≤, ≥, =} b`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConstraintSense {
    LessEqual,
    GreaterEqual,
    Equal,
}

/// Error type returned when a problem can not be built or solved
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    /// Dimensions of the problem data are inconsistent, or data contains NaN
    #[error("Bad problem shape: {0}")]
    ShapeError(String),
    /// A variable has lower bound above its upper bound
    #[error("Variable {index} has lower bound {lower} above upper bound {upper}")]
    InfeasibleBoundsError { index: usize, lower: f64, upper: f64 },
    /// Sparse matrix data is malformed or too dense
    #[error(transparent)]
    Sparse(#[from] SparseFormatError),
    /// Settings failed validation
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// A convex quadratic program
///
/// ```text
///  minimize / maximize   cᵀx + ½xᵀQx
///  subject to            a_iᵀx {≤, ≥, =} b_i
///                        l ≤ x ≤ u
/// ```
///
/// Bounds of magnitude at least [`get_infinity`](crate::solver::get_infinity)
/// are treated as absent.   The problem is immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct QPProblem<T: FloatT = f64> {
    direction: ObjectiveSense,
    A: CscMatrix<T>,
    sense: Vec<ConstraintSense>,
    b: Vec<T>,
    c: Vec<T>,
    Q: CscMatrix<T>,
    l: Vec<T>,
    u: Vec<T>,
}

impl<T> QPProblem<T>
where
    T: FloatT,
{
    /// Validate the problem data and assemble a `QPProblem`.
    ///
    /// If `Q` is not symmetric to within `1e-12·max(1, max|Q|)` it is
    /// replaced by its symmetric part `(Q + Qᵀ)/2`.   A `Q` that is already
    /// symmetric to within that tolerance is kept exactly as given, so
    /// building from the `Q` of a built problem reproduces it bit for bit.
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        direction: ObjectiveSense,
        A: &CscMatrix<T>,
        sense: &[ConstraintSense],
        b: &[T],
        c: &[T],
        Q: &CscMatrix<T>,
        l: &[T],
        u: &[T],
    ) -> Result<Self, ProblemError> {
        let (m, n) = A.size();

        if n == 0 {
            return shape_error("the problem has no variables");
        }
        if sense.len() != m {
            return shape_error(&format!("sense has length {}, expected {m}", sense.len()));
        }
        if b.len() != m {
            return shape_error(&format!("b has length {}, expected {m}", b.len()));
        }
        if !Q.is_square() {
            return shape_error(&format!("Q is {}x{} and not square", Q.m, Q.n));
        }
        if Q.n != n {
            return shape_error(&format!("Q has dimension {}, expected {n}", Q.n));
        }
        for (v, name) in [(c, "c"), (l, "l"), (u, "u")] {
            if v.len() != n {
                return shape_error(&format!("{name} has length {}, expected {n}", v.len()));
            }
        }

        A.check_format()?;
        Q.check_format()?;

        for (v, name) in [
            (&A.nzval[..], "A"),
            (b, "b"),
            (c, "c"),
            (&Q.nzval[..], "Q"),
            (l, "l"),
            (u, "u"),
        ] {
            if v.iter().any(|x| x.is_nan()) {
                return shape_error(&format!("{name} contains NaN"));
            }
        }

        for (index, (&lj, &uj)) in l.iter().zip(u.iter()).enumerate() {
            // also rejects bounds that leave no finite value
            let unbounded_above = is_infinite_bound(lj) && lj > T::zero();
            let unbounded_below = is_infinite_bound(uj) && uj < T::zero();
            if lj > uj || unbounded_above || unbounded_below {
                return Err(ProblemError::InfeasibleBoundsError {
                    index,
                    lower: lj.to_f64().unwrap_or(f64::NAN),
                    upper: uj.to_f64().unwrap_or(f64::NAN),
                });
            }
        }

        let Q = symmetrize_if_needed(Q);

        Ok(Self {
            direction,
            A: A.clone(),
            sense: sense.to_vec(),
            b: b.to_vec(),
            c: c.to_vec(),
            Q,
            l: l.to_vec(),
            u: u.to_vec(),
        })
    }

    /// Number of variables `N`
    pub fn nvars(&self) -> usize {
        self.A.n
    }

    /// Number of linear constraints `M`
    pub fn ncons(&self) -> usize {
        self.A.m
    }

    pub fn direction(&self) -> ObjectiveSense {
        self.direction
    }
    pub fn A(&self) -> &CscMatrix<T> {
        &self.A
    }
    pub fn sense(&self) -> &[ConstraintSense] {
        &self.sense
    }
    pub fn b(&self) -> &[T] {
        &self.b
    }
    pub fn c(&self) -> &[T] {
        &self.c
    }
    /// The symmetric quadratic term, with both triangles stored
    pub fn Q(&self) -> &CscMatrix<T> {
        &self.Q
    }
    pub fn l(&self) -> &[T] {
        &self.l
    }
    pub fn u(&self) -> &[T] {
        &self.u
    }

    /// The objective `cᵀx + ½xᵀQx` at `x`, together with `Qx`
    pub(crate) fn objective_and_Qx(&self, x: &[T]) -> (T, Vec<T>) {
        let mut Qx = vec![T::zero(); self.nvars()];
        self.Q.gemv(&mut Qx, x, T::one(), T::zero());
        let half: T = (0.5).as_T();
        let obj = self.c.dot(x) + half * x.dot(&Qx);
        (obj, Qx)
    }
}

fn shape_error<S>(msg: &str) -> Result<S, ProblemError> {
    Err(ProblemError::ShapeError(msg.to_string()))
}

fn symmetrize_if_needed<T: FloatT>(Q: &CscMatrix<T>) -> CscMatrix<T> {
    let maxabs = Q.nzval.norm_inf();
    let tol = T::max(T::one(), maxabs) * (1e-12).as_T();

    if Q.max_asymmetry() > tol {
        Q.symmetrize()
    } else {
        Q.clone()
    }
}
