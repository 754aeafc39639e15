use super::*;
use crate::{algebra::*, solver::CoreSettings};
use itertools::izip;
use std::iter::zip;

/// The nonnegative orthant `{s : s ≥ 0}`, self-dual.
///
/// The scaling is `W = diag(w)` with `w = sqrt(s./z)`, and the scaled
/// point is `λ = sqrt(s.*z)`.
pub struct NonnegativeCone<T> {
    w: Vec<T>,
    λ: Vec<T>,
}

impl<T> NonnegativeCone<T>
where
    T: FloatT,
{
    pub fn new(dim: usize) -> Self {
        Self {
            w: vec![T::one(); dim],
            λ: vec![T::zero(); dim],
        }
    }
}

impl<T> Cone<T> for NonnegativeCone<T>
where
    T: FloatT,
{
    fn degree(&self) -> usize {
        self.w.len()
    }

    fn numel(&self) -> usize {
        self.w.len()
    }

    fn margins(&mut self, z: &mut [T], _side: ConeSide) -> (T, T) {
        let positive = z
            .iter()
            .filter(|&&zi| zi > T::zero())
            .fold(T::zero(), |acc, &zi| acc + zi);
        (z.minimum(), positive)
    }

    fn unit_shift(&self, z: &mut [T], α: T, _side: ConeSide) {
        z.translate(α);
    }

    fn reset_scaling(&mut self) {
        self.w.set(T::one());
    }

    fn update_scaling(&mut self, s: &[T], z: &[T], _μ: T) -> bool {
        // negated test so that NaN also fails
        if !zip(s, z).all(|(&si, &zi)| si > T::zero() && zi > T::zero()) {
            return false;
        }
        for (w, λ, &si, &zi) in izip!(&mut self.w, &mut self.λ, s, z) {
            *w = (si / zi).sqrt();
            *λ = (si * zi).sqrt();
        }
        true
    }

    fn get_Hs(&self, Hsblock: &mut [T]) {
        assert_eq!(Hsblock.len(), self.w.len());
        Hsblock.scalarop_from(|w| w * w, &self.w);
    }

    fn mul_Hs(&mut self, y: &mut [T], x: &[T], _work: &mut [T]) {
        // w*(w*x) rather than (w*w)*x
        for (yi, &wi, &xi) in izip!(y, &self.w, x) {
            *yi = wi * (wi * xi);
        }
    }

    fn affine_ds(&self, ds: &mut [T], _s: &[T]) {
        assert_eq!(ds.len(), self.λ.len());
        ds.scalarop_from(|λ| λ * λ, &self.λ);
    }

    fn centering_shift(&mut self, shift: &mut [T], step_z: &mut [T], step_s: &mut [T], σμ: T) {
        // diagonal W cancels in W⁻ᵀΔs ∘ WΔz
        for (out, &dz, &ds) in izip!(shift, &*step_z, &*step_s) {
            *out = dz * ds - σμ;
        }
    }

    fn Δs_offset(&mut self, out: &mut [T], ds: &[T], _work: &mut [T], z: &[T]) {
        for (o, &dsi, &zi) in izip!(out, ds, z) {
            *o = dsi / zi;
        }
    }

    fn step_length(
        &mut self,
        dz: &[T],
        ds: &[T],
        z: &[T],
        s: &[T],
        _settings: &CoreSettings<T>,
        αmax: T,
    ) -> (T, T) {
        assert_eq!(dz.len(), z.len());
        assert_eq!(ds.len(), s.len());
        (max_step(z, dz, αmax), max_step(s, ds, αmax))
    }
}

// Largest α ≤ αmax keeping v + α dv ≥ 0.  On ties the first
// blocking entry wins, since only a strictly smaller ratio replaces it.
fn max_step<T: FloatT>(v: &[T], dv: &[T], αmax: T) -> T {
    zip(v, dv)
        .filter(|&(_, &dvi)| dvi < T::zero())
        .map(|(&vi, &dvi)| -vi / dvi)
        .fold(αmax, |α, αi| if αi < α { αi } else { α })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonnegative_step_length() {
        let settings = CoreSettings::<f64>::default();
        let mut K = NonnegativeCone::<f64>::new(3);

        let z = [1., 2., 4.];
        let s = [1., 1., 1.];
        let dz = [-2., -4., 1.];
        let ds = [1., -0.25, 0.];

        let (αz, αs) = K.step_length(&dz, &ds, &z, &s, &settings, 1.0);
        assert_eq!(αz, 0.5);
        assert_eq!(αs, 1.0);

        let (αz, _) = K.step_length(&dz, &ds, &z, &s, &settings, 0.1);
        assert_eq!(αz, 0.1);
    }

    #[test]
    fn test_nonnegative_scaling() {
        let mut K = NonnegativeCone::<f64>::new(2);
        assert!(K.update_scaling(&[4., 1.], &[1., 9.], 1.0));

        let mut Hs = [0.; 2];
        K.get_Hs(&mut Hs);
        assert!((Hs[0] - 4.).abs() < 1e-14);
        assert!((Hs[1] - 1. / 9.).abs() < 1e-14);

        let mut ds = [0.; 2];
        K.affine_ds(&mut ds, &[4., 1.]);
        assert!((ds[0] - 4.).abs() < 1e-14);
        assert!((ds[1] - 9.).abs() < 1e-14);

        assert!(!K.update_scaling(&[0., 1.], &[1., 1.], 1.0));
        assert!(!K.update_scaling(&[f64::NAN, 1.], &[1., 1.], 1.0));

        K.reset_scaling();
        K.get_Hs(&mut Hs);
        assert_eq!(Hs, [1., 1.]);
    }

    #[test]
    fn test_nonnegative_margins() {
        let mut K = NonnegativeCone::<f64>::new(3);
        let mut z = [-1., 2., 3.];
        assert_eq!(K.margins(&mut z, ConeSide::Primal), (-1., 5.));
    }
}
