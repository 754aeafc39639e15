use super::*;
use crate::solver::CoreSettings;
use std::ops::Range;

// one constituent cone and the slice of s and z it owns
struct ConeBlock<T: FloatT> {
    cone: SupportedCone<T>,
    rng: Range<usize>,
}

/// The product of the cones listed for the constraint rows.
pub struct CompositeCone<T: FloatT = f64> {
    blocks: Vec<ConeBlock<T>>,
    numel: usize,
    degree: usize,
}

impl<T> CompositeCone<T>
where
    T: FloatT,
{
    pub fn new(types: &[SupportedConeT]) -> Self {
        let mut blocks = Vec::with_capacity(types.len());
        let mut start = 0;
        let mut degree = 0;

        for t in types {
            let cone = SupportedCone::from(t);
            let stop = start + cone.numel();
            degree += cone.degree();
            blocks.push(ConeBlock {
                cone,
                rng: start..stop,
            });
            start = stop;
        }

        Self {
            blocks,
            numel: start,
            degree,
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &SupportedCone<T>> {
        self.blocks.iter().map(|b| &b.cone)
    }

    #[cfg(test)]
    fn ranges(&self) -> Vec<Range<usize>> {
        self.blocks.iter().map(|b| b.rng.clone()).collect()
    }
}

impl<T> Cone<T> for CompositeCone<T>
where
    T: FloatT,
{
    fn degree(&self) -> usize {
        self.degree
    }

    fn numel(&self) -> usize {
        self.numel
    }

    fn margins(&mut self, z: &mut [T], side: ConeSide) -> (T, T) {
        self.blocks
            .iter_mut()
            .fold((T::max_value(), T::zero()), |(α, β), b| {
                let (αi, βi) = b.cone.margins(&mut z[b.rng.clone()], side);
                (T::min(α, αi), β + βi)
            })
    }

    fn unit_shift(&self, z: &mut [T], α: T, side: ConeSide) {
        for b in &self.blocks {
            b.cone.unit_shift(&mut z[b.rng.clone()], α, side);
        }
    }

    fn reset_scaling(&mut self) {
        for b in &mut self.blocks {
            b.cone.reset_scaling();
        }
    }

    fn update_scaling(&mut self, s: &[T], z: &[T], μ: T) -> bool {
        self.blocks.iter_mut().all(|b| {
            let r = b.rng.clone();
            b.cone.update_scaling(&s[r.clone()], &z[r], μ)
        })
    }

    fn get_Hs(&self, Hsblock: &mut [T]) {
        for b in &self.blocks {
            b.cone.get_Hs(&mut Hsblock[b.rng.clone()]);
        }
    }

    fn mul_Hs(&mut self, y: &mut [T], x: &[T], work: &mut [T]) {
        for b in &mut self.blocks {
            let r = b.rng.clone();
            b.cone.mul_Hs(&mut y[r.clone()], &x[r.clone()], &mut work[r]);
        }
    }

    fn affine_ds(&self, ds: &mut [T], s: &[T]) {
        for b in &self.blocks {
            let r = b.rng.clone();
            b.cone.affine_ds(&mut ds[r.clone()], &s[r]);
        }
    }

    fn centering_shift(&mut self, shift: &mut [T], step_z: &mut [T], step_s: &mut [T], σμ: T) {
        for b in &mut self.blocks {
            let r = b.rng.clone();
            b.cone.centering_shift(
                &mut shift[r.clone()],
                &mut step_z[r.clone()],
                &mut step_s[r],
                σμ,
            );
        }
    }

    fn Δs_offset(&mut self, out: &mut [T], ds: &[T], work: &mut [T], z: &[T]) {
        for b in &mut self.blocks {
            let r = b.rng.clone();
            b.cone
                .Δs_offset(&mut out[r.clone()], &ds[r.clone()], &mut work[r.clone()], &z[r]);
        }
    }

    fn step_length(
        &mut self,
        dz: &[T],
        ds: &[T],
        z: &[T],
        s: &[T],
        settings: &CoreSettings<T>,
        αmax: T,
    ) -> (T, T) {
        // z and s limits are kept apart here and combined by the caller
        let (mut αz, mut αs) = (αmax, αmax);

        for b in &mut self.blocks {
            let r = b.rng.clone();
            let (αzi, αsi) = b.cone.step_length(
                &dz[r.clone()],
                &ds[r.clone()],
                &z[r.clone()],
                &s[r],
                settings,
                αmax,
            );
            αz = T::min(αz, αzi);
            αs = T::min(αs, αsi);
        }
        (αz, αs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_layout() {
        let K = CompositeCone::<f64>::new(&[
            SupportedConeT::ZeroConeT(2),
            SupportedConeT::NonnegativeConeT(3),
        ]);

        assert_eq!(K.len(), 2);
        assert_eq!(K.numel(), 5);
        assert_eq!(K.degree(), 3);
        assert_eq!(K.ranges(), vec![0..2, 2..5]);

        let tags: Vec<_> = K.iter().map(|c| c.as_tag()).collect();
        assert_eq!(
            tags,
            vec![SupportedConeTag::ZeroCone, SupportedConeTag::NonnegativeCone]
        );
    }

    #[test]
    fn test_composite_shift_to_interior() {
        let mut K = CompositeCone::<f64>::new(&[
            SupportedConeT::ZeroConeT(1),
            SupportedConeT::NonnegativeConeT(2),
        ]);

        // the primal shift zeros the equality slacks
        let mut s = [3., -1., 2.];
        let (α, β) = K.margins(&mut s, ConeSide::Primal);
        assert_eq!((α, β), (-1., 2.));
        K.unit_shift(&mut s, 2., ConeSide::Primal);
        assert_eq!(s, [0., 1., 4.]);

        // the dual shift leaves equality multipliers free
        let mut z = [3., -1., 2.];
        K.unit_shift(&mut z, 2., ConeSide::Dual);
        assert_eq!(z, [3., 1., 4.]);
    }

    #[test]
    fn test_composite_empty() {
        let K = CompositeCone::<f64>::new(&[]);
        assert!(K.is_empty());
        assert_eq!((K.numel(), K.degree()), (0, 0));
    }
}
