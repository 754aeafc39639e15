#![allow(non_snake_case)]
use crate::algebra::*;
use crate::qdldl::*;
use crate::solver::core::kktsolvers::direct::DirectLDLSolver;
use crate::solver::core::CoreSettings;

/// [`DirectLDLSolver`] backed by the crate's own QDLDL factorization
pub struct QDLDLDirectLDLSolver<T> {
    factors: QDLDLFactorisation<T>,
}

impl<T> QDLDLDirectLDLSolver<T>
where
    T: FloatT,
{
    /// Factor `KKT`, using `perm` as the ordering if given and
    /// an AMD ordering otherwise.
    pub fn new(
        KKT: &CscMatrix<T>,
        Dsigns: &[i8],
        settings: &CoreSettings<T>,
        perm: Option<Vec<usize>>,
    ) -> Result<Self, QDLDLError> {
        if !KKT.is_square() {
            return Err(QDLDLError::IncompatibleDimension);
        }

        let opts = QDLDLSettings {
            perm,
            Dsigns: Some(Dsigns.to_vec()),
            regularize_enable: settings.dynamic_regularization_enable,
            regularize_eps: settings.dynamic_regularization_eps,
            regularize_delta: settings.dynamic_regularization_delta,
            amd_dense_scale: settings.amd_dense_scale,
            ..QDLDLSettings::default()
        };

        Ok(Self {
            factors: QDLDLFactorisation::<T>::new(KKT, Some(opts))?,
        })
    }
}

impl<T> DirectLDLSolver<T> for QDLDLDirectLDLSolver<T>
where
    T: FloatT,
{
    fn update_values(&mut self, index: &[usize], values: &[T]) {
        self.factors.update_values(index, values);
    }

    fn solve(&mut self, x: &mut [T], b: &[T]) {
        x.copy_from(b);
        self.factors.solve(x);
    }

    // The factorization holds its own permuted copy of the matrix,
    // kept current through update_values, so `_kkt` is not read.
    fn refactor(&mut self, _kkt: &CscMatrix<T>) -> bool {
        self.factors.refactor().is_ok() && self.factors.Dinv.is_finite()
    }
}
