#![allow(non_snake_case)]

use super::ldlsolvers::qdldl::*;
use super::*;
use crate::qdldl::QDLDLError;
use crate::solver::core::kktsolvers::KKTSolver;
use crate::solver::core::{cones::*, CoreSettings};
use std::iter::zip;

type BoxedDirectLDLSolver<T> = Box<dyn DirectLDLSolver<T> + Send>;

/// [`KKTSolver`] based on an LDL factorization of the full
/// quasidefinite KKT matrix.
///
/// Each refactorization first adds a static shift to the diagonal,
/// positive on the `P` block and negative on the `-Hs` block, and
/// each solve is polished by iterative refinement against the
/// unshifted matrix.
pub struct DirectLDLKKTSolver<T> {
    m: usize,
    n: usize,

    // solution and rhs of the full system
    x: Vec<T>,
    b: Vec<T>,

    // workspace for refinement, also used to hold
    // the unshifted diagonal while refactoring
    work1: Vec<T>,
    work2: Vec<T>,

    map: KKTDataMap,

    // -Hs, as written into the KKT matrix
    Hs: Vec<T>,

    // unshifted upper triangle of the KKT matrix
    KKT: CscMatrix<T>,

    ldlsolver: BoxedDirectLDLSolver<T>,
}

impl<T> DirectLDLKKTSolver<T>
where
    T: FloatT,
{
    pub fn new(
        P: &CscMatrix<T>,
        A: &CscMatrix<T>,
        cones: &CompositeCone<T>,
        settings: &CoreSettings<T>,
        perm: Option<Vec<usize>>,
    ) -> Result<Self, QDLDLError> {
        let (m, n) = A.size();
        assert_eq!(cones.numel(), m);
        let dim = m + n;

        let (KKT, map) = assemble_kkt_matrix(P, A);
        let ldlsolver = QDLDLDirectLDLSolver::<T>::new(&KKT, &kkt_signs(m, n), settings, perm)?;

        Ok(Self {
            m,
            n,
            x: vec![T::zero(); dim],
            b: vec![T::zero(); dim],
            work1: vec![T::zero(); dim],
            work2: vec![T::zero(); dim],
            map,
            Hs: vec![T::zero(); m],
            KKT,
            ldlsolver: Box::new(ldlsolver),
        })
    }

    fn shift_and_refactor(&mut self, settings: &CoreSettings<T>) -> bool {
        if !settings.static_regularization_enable {
            return self.ldlsolver.refactor(&self.KKT);
        }

        let diag = &self.map.diag;
        let (unshifted, shifted) = (&mut self.work1, &mut self.work2);

        for (d, &idx) in zip(unshifted.iter_mut(), diag) {
            *d = self.KKT.nzval[idx];
        }
        let ϵ = settings.static_regularization_constant
            + settings.static_regularization_proportional * unshifted.norm_inf();

        // quasidefinite signs:  + on the first n, - on the rest
        let n = self.n;
        for (i, (s, &d)) in zip(shifted.iter_mut(), unshifted.iter()).enumerate() {
            *s = if i < n { d + ϵ } else { d - ϵ };
        }
        write_values(&mut self.KKT, &mut self.ldlsolver, diag, shifted);

        let is_ok = self.ldlsolver.refactor(&self.KKT);

        // refinement works against the unshifted matrix.   The
        // factorization keeps its own shifted copy.
        for (&idx, &d) in zip(diag, unshifted.iter()) {
            self.KKT.nzval[idx] = d;
        }

        is_ok
    }

    // Improve x as a solution of KKT*x = b.   Stops when the residual
    // is within tolerance or improves by less than the stop ratio.
    fn iterative_refinement(&mut self, settings: &CoreSettings<T>) -> bool {
        let (x, b) = (&mut self.x, &self.b);
        let (e, xnew) = (&mut self.work1, &mut self.work2);
        let K = &self.KKT;

        let tol = settings.iterative_refinement_abstol
            + settings.iterative_refinement_reltol * b.norm_inf();

        let mut norme = residual(e, b, K, x);

        for _ in 0..settings.iterative_refinement_max_iter {
            if !norme.is_finite() {
                return false;
            }
            if norme <= tol {
                break;
            }

            // xnew = x + K \ e
            self.ldlsolver.solve(xnew, e);
            xnew.axpby(T::one(), x, T::one());

            let prev = norme;
            norme = residual(e, b, K, xnew);
            let ratio = prev / norme;

            // take any improvement, but stop if it was small
            if ratio > T::one() {
                std::mem::swap(x, xnew);
            }
            if ratio < settings.iterative_refinement_stop_ratio {
                break;
            }
        }

        x.is_finite()
    }
}

impl<T> KKTSolver<T> for DirectLDLKKTSolver<T>
where
    T: FloatT,
{
    fn update(&mut self, cones: &CompositeCone<T>, settings: &CoreSettings<T>) -> bool {
        cones.get_Hs(&mut self.Hs);
        self.Hs.negate();

        write_values(&mut self.KKT, &mut self.ldlsolver, &self.map.Hs, &self.Hs);

        self.shift_and_refactor(settings)
    }

    fn setrhs(&mut self, rhsx: &[T], rhsz: &[T]) {
        let (bx, bz) = self.b.split_at_mut(self.n);
        bx.copy_from(rhsx);
        bz.copy_from(rhsz);
    }

    fn solve(
        &mut self,
        lhsx: Option<&mut [T]>,
        lhsz: Option<&mut [T]>,
        settings: &CoreSettings<T>,
    ) -> bool {
        self.ldlsolver.solve(&mut self.x, &self.b);

        let is_ok = if settings.iterative_refinement_enable {
            self.iterative_refinement(settings)
        } else {
            self.x.is_finite()
        };
        if !is_ok {
            return false;
        }

        let (x, z) = self.x.split_at(self.n);
        if let Some(v) = lhsx {
            v.copy_from(x);
        }
        if let Some(v) = lhsz {
            v.copy_from(&z[..self.m]);
        }
        true
    }
}

// Writes values into both the held KKT matrix and the
// permuted copy inside the factorization
fn write_values<T: FloatT>(
    KKT: &mut CscMatrix<T>,
    ldlsolver: &mut BoxedDirectLDLSolver<T>,
    index: &[usize],
    values: &[T],
) {
    for (&idx, &v) in zip(index, values) {
        KKT.nzval[idx] = v;
    }
    ldlsolver.update_values(index, values);
}

// e = b - Kξ, returning ‖e‖∞.   K holds the upper triangle only.
fn residual<T: FloatT>(e: &mut [T], b: &[T], K: &CscMatrix<T>, ξ: &[T]) -> T {
    e.copy_from(b);
    K.sym().symv(e, ξ, -T::one(), T::one());
    e.norm_inf()
}

// expected signs of D in K = LDLᵀ
fn kkt_signs(m: usize, n: usize) -> Vec<i8> {
    let mut signs = vec![1_i8; n + m];
    signs[n..].fill(-1);
    signs
}
