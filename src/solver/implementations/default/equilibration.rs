#![allow(non_snake_case)]
use super::DefaultSettings;
use crate::algebra::*;

/// Diagonal scalings of the problem data.
///
/// The solver works on the scaled problem with
///
/// ```text
///   P̂ = c·DPD    q̂ = c·Dq    Â = EAD    b̂ = Eb
/// ```
///
/// where `D = diag(d)` acts on variables and `E = diag(e)` on rows.
#[derive(Debug, Clone)]
pub struct DefaultEquilibrationData<T> {
    pub d: Vec<T>,
    pub dinv: Vec<T>,
    pub e: Vec<T>,
    pub einv: Vec<T>,
    /// objective scaling
    pub c: T,
}

impl<T> DefaultEquilibrationData<T>
where
    T: FloatT,
{
    /// Identity scaling for `n` variables and `m` rows
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            d: vec![T::one(); n],
            dinv: vec![T::one(); n],
            e: vec![T::one(); m],
            einv: vec![T::one(); m],
            c: T::one(),
        }
    }

    /// Modified Ruiz equilibration of `[P Aᵀ; A 0]`, applied in place to
    /// the data and accumulated into the scalings held here.
    ///
    /// Each pass rescales every row and column of the KKT matrix by the
    /// inverse square root of its infinity norm, clipped to the allowed
    /// range, and then rescales the objective so that `P` and `q` are of
    /// unit size.   `P` must be triu.
    pub(crate) fn ruiz(
        &mut self,
        P: &mut CscMatrix<T>,
        A: &mut CscMatrix<T>,
        q: &mut [T],
        b: &mut [T],
        settings: &DefaultSettings<T>,
    ) {
        let (lo, hi) = (
            settings.equilibrate_min_scaling,
            settings.equilibrate_max_scaling,
        );
        let clamp = |s: T| s.clip(lo, hi, T::one(), hi);

        // the inverse vectors are free until the end, so work in them
        let (dstep, estep) = (&mut self.dinv, &mut self.einv);

        for _ in 0..settings.equilibrate_max_iter {
            // infinity norms of the KKT columns.  the lower rows
            // [A 0] have the norms of the rows of A
            P.col_norms_sym(dstep);
            A.col_norms_accum(dstep);
            A.row_norms(estep);

            dstep.scalarop(|x| clamp(x).sqrt().recip());
            estep.scalarop(|x| clamp(x).sqrt().recip());

            P.lrscale(dstep, dstep);
            A.lrscale(estep, dstep);
            q.hadamard(dstep);
            b.hadamard(estep);
            self.d.hadamard(dstep);
            self.e.hadamard(estep);

            // objective scaling from the mean column size of P
            // and the size of q.   dstep is reused for P norms
            P.col_norms_sym(dstep);
            let (Pmean, qmax) = (dstep.mean(), q.norm_inf());
            if Pmean != T::zero() && qmax != T::zero() {
                let cstep = clamp(T::max(Pmean, qmax)).recip();
                P.scale(cstep);
                q.scale(cstep);
                self.c *= cstep;
            }
        }

        self.dinv.scalarop_from(T::recip, &self.d);
        self.einv.scalarop_from(T::recip, &self.e);
    }
}
