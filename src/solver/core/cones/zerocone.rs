use super::*;
use crate::{algebra::*, solver::CoreSettings};
use core::marker::PhantomData;

/// The cone `{0}`, used for equality rows.  Its dual is the whole
/// space, so the multipliers on these rows are free.
pub struct ZeroCone<T: FloatT = f64> {
    dim: usize,
    phantom: PhantomData<T>,
}

impl<T> ZeroCone<T>
where
    T: FloatT,
{
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            phantom: PhantomData,
        }
    }
}

impl<T> Cone<T> for ZeroCone<T>
where
    T: FloatT,
{
    fn degree(&self) -> usize {
        0
    }

    fn numel(&self) -> usize {
        self.dim
    }

    fn margins(&mut self, _z: &mut [T], _side: ConeSide) -> (T, T) {
        (T::max_value(), T::zero())
    }

    fn unit_shift(&self, z: &mut [T], _α: T, side: ConeSide) {
        if side == ConeSide::Primal {
            z.set(T::zero());
        }
    }

    fn reset_scaling(&mut self) {}

    fn update_scaling(&mut self, _s: &[T], _z: &[T], _μ: T) -> bool {
        true
    }

    fn get_Hs(&self, Hsblock: &mut [T]) {
        Hsblock.set(T::zero());
    }

    fn mul_Hs(&mut self, y: &mut [T], _x: &[T], _work: &mut [T]) {
        y.set(T::zero());
    }

    fn affine_ds(&self, ds: &mut [T], _s: &[T]) {
        ds.set(T::zero());
    }

    fn centering_shift(&mut self, shift: &mut [T], _step_z: &mut [T], _step_s: &mut [T], _σμ: T) {
        shift.set(T::zero());
    }

    fn Δs_offset(&mut self, out: &mut [T], _ds: &[T], _work: &mut [T], _z: &[T]) {
        out.set(T::zero());
    }

    fn step_length(
        &mut self,
        _dz: &[T],
        _ds: &[T],
        _z: &[T],
        _s: &[T],
        _settings: &CoreSettings<T>,
        αmax: T,
    ) -> (T, T) {
        (αmax, αmax)
    }
}

#[test]
fn test_zero_cone() {
    let mut K = ZeroCone::<f64>::new(2);
    assert_eq!((K.degree(), K.numel()), (0, 2));

    let mut z = [1., -2.];
    K.unit_shift(&mut z, 5., ConeSide::Dual);
    assert_eq!(z, [1., -2.]);
    K.unit_shift(&mut z, 5., ConeSide::Primal);
    assert_eq!(z, [0., 0.]);

    let settings = CoreSettings::<f64>::default();
    let (αz, αs) = K.step_length(&[-1., -1.], &[-1., -1.], &[0., 0.], &[0., 0.], &settings, 0.7);
    assert_eq!((αz, αs), (0.7, 0.7));
}
