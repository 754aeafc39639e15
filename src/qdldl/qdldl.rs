#![allow(non_snake_case)]
use crate::algebra::*;
use derive_builder::Builder;
use std::iter::zip;
use thiserror::Error;

/// Failures of [`QDLDLFactorisation`] construction or refactoring
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QDLDLError {
    #[error("matrix is not square, or sign vector has the wrong length")]
    IncompatibleDimension,
    #[error("matrix has a column with no entries")]
    EmptyColumn,
    #[error("matrix has entries below the diagonal")]
    NotUpperTriangular,
    #[error("factorization hit a zero pivot")]
    ZeroPivot,
    #[error("factorization hit a non-finite pivot")]
    NonFinitePivot,
    #[error("ordering is not a permutation of the matrix indices")]
    InvalidPermutation,
    #[error("AMD ordering failed")]
    OrderingFailed,
}

/// Options for [`QDLDLFactorisation`]
#[derive(Builder, Debug, Clone)]
pub struct QDLDLSettings<T: FloatT> {
    /// multiplier on the AMD dense row threshold
    #[builder(default = "1.0")]
    pub amd_dense_scale: f64,
    /// fill reducing ordering.   AMD is used if absent.
    #[builder(default = "None", setter(strip_option))]
    pub perm: Option<Vec<usize>>,
    /// expected sign of each pivot, all positive if absent
    #[builder(default = "None", setter(strip_option))]
    pub Dsigns: Option<Vec<i8>>,
    /// replace pivots of the wrong sign or too small magnitude
    #[builder(default = "true")]
    pub regularize_enable: bool,
    #[builder(default = "(1e-12).as_T()")]
    pub regularize_eps: T,
    #[builder(default = "(1e-7).as_T()")]
    pub regularize_delta: T,
}

impl<T> Default for QDLDLSettings<T>
where
    T: FloatT,
{
    fn default() -> QDLDLSettings<T> {
        match QDLDLSettingsBuilder::<T>::default().build() {
            Ok(settings) => settings,
            Err(_) => unreachable!(),
        }
    }
}

/// `PAPᵀ = LDLᵀ` factors of a symmetric quasidefinite matrix `A`,
/// given by its upper triangle.
///
/// The symbolic analysis is done once at construction.   Values of `A`
/// can then be changed through [`update_values`](Self::update_values)
/// and [`offset_values`](Self::offset_values) and the numeric factors
/// recomputed with [`refactor`](Self::refactor).
#[derive(Debug)]
pub struct QDLDLFactorisation<T = f64> {
    pub perm: Vec<usize>,
    /// strictly lower triangular, with implied unit diagonal
    pub L: CscMatrix<T>,
    pub D: Vec<T>,
    pub Dinv: Vec<T>,
    workspace: Workspace<T>,
}

// Pivot replacement rule.   A pivot d with expected sign σ is replaced
// by σ·delta whenever σ·d < eps.
#[derive(Debug, Clone, Copy)]
struct PivotRule<T> {
    enable: bool,
    eps: T,
    delta: T,
}

impl<T: FloatT> PivotRule<T> {
    fn apply(&self, d: &mut T, sign: i8) -> Result<(), QDLDLError> {
        if !d.is_finite() {
            return Err(QDLDLError::NonFinitePivot);
        }
        let σ = if sign < 0 { -T::one() } else { T::one() };
        if self.enable && *d * σ < self.eps {
            *d = self.delta * σ;
        }
        if *d == T::zero() {
            return Err(QDLDLError::ZeroPivot);
        }
        Ok(())
    }
}

#[derive(Debug)]
struct Workspace<T> {
    etree: Vec<Option<usize>>,

    // PAPᵀ, triu, and where each input entry lives in it
    PAPt: CscMatrix<T>,
    AtoPAPt: Vec<usize>,

    // pivot signs in permuted order
    Dsigns: Vec<i8>,
    rule: PivotRule<T>,
    positive_inertia: usize,

    // scratch for one row of L
    yvals: Vec<T>,
    ymarked: Vec<bool>,
    ypattern: Vec<usize>,
    path: Vec<usize>,
    // next free slot in each column of L
    Lnext: Vec<usize>,
}

impl<T> QDLDLFactorisation<T>
where
    T: FloatT,
{
    /// Factor the triu matrix `A`.   The ordering is taken from
    /// `opts.perm` if provided and computed with AMD otherwise.
    pub fn new(A: &CscMatrix<T>, opts: Option<QDLDLSettings<T>>) -> Result<Self, QDLDLError> {
        check_structure(A)?;
        let opts = opts.unwrap_or_default();
        let n = A.n;

        // for no reordering pass (0..n) explicitly
        let (perm, iperm) = match opts.perm {
            Some(perm) if perm.len() == n => {
                let iperm = invperm(&perm)?;
                (perm, iperm)
            }
            Some(_) => return Err(QDLDLError::InvalidPermutation),
            None => amd_ordering(A, opts.amd_dense_scale)?,
        };

        let Dsigns = match opts.Dsigns {
            Some(signs) if signs.len() == n => perm.iter().map(|&p| signs[p]).collect(),
            Some(_) => return Err(QDLDLError::IncompatibleDimension),
            None => vec![1_i8; n],
        };

        let (PAPt, AtoPAPt) = permute_symmetric(A, &iperm);
        let (etree, Lnz) = etree(&PAPt);

        let mut L = CscMatrix::spalloc(n, n, Lnz.iter().sum());
        L.colptr[0] = 0;
        for j in 0..n {
            L.colptr[j + 1] = L.colptr[j] + Lnz[j];
        }

        let mut factors = Self {
            perm,
            L,
            D: vec![T::zero(); n],
            Dinv: vec![T::zero(); n],
            workspace: Workspace {
                etree,
                PAPt,
                AtoPAPt,
                Dsigns,
                rule: PivotRule {
                    enable: opts.regularize_enable,
                    eps: opts.regularize_eps,
                    delta: opts.regularize_delta,
                },
                positive_inertia: 0,
                yvals: vec![T::zero(); n],
                ymarked: vec![false; n],
                ypattern: vec![0; n],
                path: vec![0; n],
                Lnext: vec![0; n],
            },
        };
        factors.refactor()?;
        Ok(factors)
    }

    /// Number of positive entries in `D`
    pub fn positive_inertia(&self) -> usize {
        self.workspace.positive_inertia
    }

    /// Solve `Ax = b` in place
    pub fn solve(&mut self, b: &mut [T]) {
        assert_eq!(b.len(), self.D.len());

        let y = &mut self.workspace.yvals;
        permute(y, b, &self.perm);
        ldl_solve(&self.L, &self.Dinv, y);
        ipermute(b, y, &self.perm);
    }

    /// Overwrite entries of `A`.   The `indices` are positions in the
    /// `nzval` field of the matrix passed at construction.
    pub fn update_values(&mut self, indices: &[usize], values: &[T]) {
        let ws = &mut self.workspace;
        for (&idx, &v) in zip(indices, values) {
            ws.PAPt.nzval[ws.AtoPAPt[idx]] = v;
        }
    }

    /// Add `offset` to the entries at `indices`, with the sign of
    /// the corresponding entry of `signs`
    pub fn offset_values(&mut self, indices: &[usize], offset: T, signs: &[i8]) {
        assert_eq!(indices.len(), signs.len());
        let ws = &mut self.workspace;
        for (&idx, &sign) in zip(indices, signs) {
            let v = &mut ws.PAPt.nzval[ws.AtoPAPt[idx]];
            if sign < 0 {
                *v -= offset;
            } else {
                *v += offset;
            }
        }
    }

    /// Recompute the numeric factors from the current values of `A`
    pub fn refactor(&mut self) -> Result<(), QDLDLError> {
        let npos = numeric_factor(&mut self.L, &mut self.D, &mut self.Dinv, &mut self.workspace)?;
        self.workspace.positive_inertia = npos;
        Ok(())
    }
}

fn check_structure<T: FloatT>(A: &CscMatrix<T>) -> Result<(), QDLDLError> {
    if !A.is_square() {
        Err(QDLDLError::IncompatibleDimension)
    } else if !A.is_triu() {
        Err(QDLDLError::NotUpperTriangular)
    } else if A.colptr.windows(2).any(|c| c[0] == c[1]) {
        Err(QDLDLError::EmptyColumn)
    } else {
        Ok(())
    }
}

// Elimination tree of a triu matrix, and the number of
// entries in each column of its L factor.
fn etree<T: FloatT>(A: &CscMatrix<T>) -> (Vec<Option<usize>>, Vec<usize>) {
    let n = A.n;
    let mut parent = vec![None; n];
    let mut Lnz = vec![0; n];
    let mut visited = vec![0; n];

    for j in 0..n {
        visited[j] = j;
        for &row in &A.rowval[A.colptr[j]..A.colptr[j + 1]] {
            // climb from row towards the root, stopping at
            // a node already reached from column j
            let mut i = row;
            while visited[i] != j {
                let next = *parent[i].get_or_insert(j);
                Lnz[i] += 1;
                visited[i] = j;
                i = next;
            }
        }
    }
    (parent, Lnz)
}

// Up-looking numeric factorization.   Row k of L solves the
// triangular system formed by the previous rows against the part
// of column k of A above the diagonal.   Returns the number of
// positive pivots.
fn numeric_factor<T: FloatT>(
    L: &mut CscMatrix<T>,
    D: &mut [T],
    Dinv: &mut [T],
    ws: &mut Workspace<T>,
) -> Result<usize, QDLDLError> {
    let Workspace {
        etree,
        PAPt: A,
        Dsigns,
        rule,
        yvals,
        ymarked,
        ypattern,
        path,
        Lnext,
        ..
    } = ws;

    let n = A.n;
    Lnext.copy_from_slice(&L.colptr[0..n]);
    yvals.fill(T::zero());
    ymarked.fill(false);
    let mut npos = 0;

    for k in 0..n {
        D[k] = T::zero();
        let mut nnz_y = 0;

        // scatter column k into y and collect the pattern of
        // row k of L in topological order
        for idx in A.colptr[k]..A.colptr[k + 1] {
            let i = A.rowval[idx];
            if i == k {
                D[k] = A.nzval[idx];
                continue;
            }
            yvals[i] = A.nzval[idx];

            let mut depth = 0;
            let mut node = Some(i);
            while let Some(p) = node {
                if p >= k || ymarked[p] {
                    break;
                }
                ymarked[p] = true;
                path[depth] = p;
                depth += 1;
                node = etree[p];
            }
            while depth > 0 {
                depth -= 1;
                ypattern[nnz_y] = path[depth];
                nnz_y += 1;
            }
        }

        for &c in ypattern[0..nnz_y].iter().rev() {
            let yc = yvals[c];
            let slot = Lnext[c];
            for j in L.colptr[c]..slot {
                yvals[L.rowval[j]] -= L.nzval[j] * yc;
            }
            let lkc = yc * Dinv[c];
            L.rowval[slot] = k;
            L.nzval[slot] = lkc;
            D[k] -= yc * lkc;
            Lnext[c] += 1;

            yvals[c] = T::zero();
            ymarked[c] = false;
        }

        rule.apply(&mut D[k], Dsigns[k])?;
        if D[k] > T::zero() {
            npos += 1;
        }
        Dinv[k] = D[k].recip();
    }

    Ok(npos)
}

// x = (L+I)⁻ᵀ D⁻¹ (L+I)⁻¹ x
fn ldl_solve<T: FloatT>(L: &CscMatrix<T>, Dinv: &[T], x: &mut [T]) {
    let (Lp, Li, Lx) = (&L.colptr, &L.rowval, &L.nzval);
    let n = x.len();

    for j in 0..n {
        let xj = x[j];
        for k in Lp[j]..Lp[j + 1] {
            x[Li[k]] -= Lx[k] * xj;
        }
    }

    x.hadamard(Dinv);

    for j in (0..n).rev() {
        let dot = (Lp[j]..Lp[j + 1]).fold(T::zero(), |acc, k| acc + Lx[k] * x[Li[k]]);
        x[j] -= dot;
    }
}

/// Inverse of a permutation vector
pub fn invperm(p: &[usize]) -> Result<Vec<usize>, QDLDLError> {
    let n = p.len();
    let mut inv = vec![usize::MAX; n];
    for (i, &j) in p.iter().enumerate() {
        match inv.get_mut(j) {
            Some(slot) if *slot == usize::MAX => *slot = i,
            _ => return Err(QDLDLError::InvalidPermutation),
        }
    }
    Ok(inv)
}

// x = b[p]
pub(crate) fn permute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    for (xi, &pi) in zip(x, p) {
        *xi = b[pi];
    }
}

// x[p] = b
pub(crate) fn ipermute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    for (&bi, &pi) in zip(b, p) {
        x[pi] = bi;
    }
}

// Upper triangle of PAPᵀ from the upper triangle of A, along with
// the position in the result of every entry of A.   Rows within each
// column of the result are not sorted.
fn permute_symmetric<T: FloatT>(A: &CscMatrix<T>, iperm: &[usize]) -> (CscMatrix<T>, Vec<usize>) {
    let n = A.n;
    let mut P = CscMatrix::<T>::spalloc(n, n, A.nnz());
    let mut AtoPAPt = vec![0; A.nnz()];

    // (row, col) in PAPᵀ of entry idx of A, folded into the triu part
    let target = |col: usize, idx: usize| {
        let (r, c) = (iperm[A.rowval[idx]], iperm[col]);
        (r.min(c), r.max(c))
    };

    let mut count = vec![0; n];
    for col in 0..n {
        for idx in A.colptr[col]..A.colptr[col + 1] {
            count[target(col, idx).1] += 1;
        }
    }
    P.colptr[0] = 0;
    for j in 0..n {
        P.colptr[j + 1] = P.colptr[j] + count[j];
    }

    let mut next = P.colptr[0..n].to_vec();
    for col in 0..n {
        for idx in A.colptr[col]..A.colptr[col + 1] {
            let (r, c) = target(col, idx);
            let dest = next[c];
            P.rowval[dest] = r;
            P.nzval[dest] = A.nzval[idx];
            AtoPAPt[idx] = dest;
            next[c] += 1;
        }
    }
    (P, AtoPAPt)
}

/// Approximate minimum degree ordering of a symmetric matrix given
/// by its upper triangle.   Returns the permutation and its inverse.
///
/// `amd_dense_scale` multiplies the AMD dense row threshold.   Values
/// around 1.5 work well for the KKT systems of quadratic programs.
pub fn amd_ordering<T: FloatT>(
    A: &CscMatrix<T>,
    amd_dense_scale: f64,
) -> Result<(Vec<usize>, Vec<usize>), QDLDLError> {
    if !A.is_square() {
        return Err(QDLDLError::IncompatibleDimension);
    }
    if A.n == 0 {
        return Ok((vec![], vec![]));
    }
    let mut control = amd::Control::default();
    control.dense *= amd_dense_scale;
    let (perm, iperm, _info) = amd::order(A.nrows(), &A.colptr, &A.rowval, &control)
        .map_err(|_| QDLDLError::OrderingFailed)?;
    Ok((perm, iperm))
}

#[path = "test.rs"]
#[cfg(test)]
mod test;
