use super::{AsFloatT, FloatT, ScalarMath, VectorMath};
use std::iter::zip;

impl<T: FloatT> VectorMath for [T] {
    type T = T;

    fn copy_from(&mut self, src: &[T]) -> &mut Self {
        self.copy_from_slice(src);
        self
    }

    fn set(&mut self, c: T) -> &mut Self {
        self.fill(c);
        self
    }

    fn scale(&mut self, c: T) -> &mut Self {
        self.iter_mut().for_each(|x| *x *= c);
        self
    }

    fn translate(&mut self, c: T) -> &mut Self {
        self.iter_mut().for_each(|x| *x += c);
        self
    }

    fn negate(&mut self) -> &mut Self {
        self.scalarop(|x| -x)
    }

    fn recip(&mut self) -> &mut Self {
        self.scalarop(T::recip)
    }

    fn sqrt(&mut self) -> &mut Self {
        self.scalarop(T::sqrt)
    }

    fn rsqrt(&mut self) -> &mut Self {
        self.scalarop(|x| x.sqrt().recip())
    }

    fn hadamard(&mut self, y: &[T]) -> &mut Self {
        assert_eq!(self.len(), y.len());
        zip(self.iter_mut(), y).for_each(|(x, &y)| *x *= y);
        self
    }

    fn clip(&mut self, min_thresh: T, max_thresh: T, min_new: T, max_new: T) -> &mut Self {
        self.scalarop(|x| x.clip(min_thresh, max_thresh, min_new, max_new))
    }

    fn scalarop(&mut self, op: impl Fn(T) -> T) -> &mut Self {
        self.iter_mut().for_each(|x| *x = op(*x));
        self
    }

    fn scalarop_from(&mut self, op: impl Fn(T) -> T, src: &[T]) -> &mut Self {
        assert_eq!(self.len(), src.len());
        zip(self.iter_mut(), src).for_each(|(x, &v)| *x = op(v));
        self
    }

    fn select(&self, index: &[bool]) -> Vec<T> {
        assert_eq!(self.len(), index.len());
        zip(self, index)
            .filter_map(|(&x, &keep)| keep.then_some(x))
            .collect()
    }

    fn axpby(&mut self, a: T, x: &[T], b: T) -> &mut Self {
        assert_eq!(self.len(), x.len());
        zip(self.iter_mut(), x).for_each(|(y, &x)| *y = a * x + b * *y);
        self
    }

    fn waxpby(&mut self, a: T, x: &[T], b: T, y: &[T]) -> &mut Self {
        assert_eq!(self.len(), x.len());
        assert_eq!(self.len(), y.len());
        for (w, (&x, &y)) in zip(self.iter_mut(), zip(x, y)) {
            *w = a * x + b * y;
        }
        self
    }

    fn dot(&self, y: &[T]) -> T {
        assert_eq!(self.len(), y.len());
        pairwise_sum(self.len(), |i| self[i] * y[i])
    }

    fn sum(&self) -> T {
        pairwise_sum(self.len(), |i| self[i])
    }

    fn sumsq(&self) -> T {
        self.dot(self)
    }

    fn mean(&self) -> T {
        match self.len() {
            0 => T::zero(),
            n => self.sum() / n.as_T(),
        }
    }

    fn minimum(&self) -> T {
        self.iter().fold(T::infinity(), |acc, &x| T::min(acc, x))
    }

    fn maximum(&self) -> T {
        self.iter().fold(T::neg_infinity(), |acc, &x| T::max(acc, x))
    }

    fn norm(&self) -> T {
        self.sumsq().sqrt()
    }

    fn norm_scaled(&self, v: &[T]) -> T {
        assert_eq!(self.len(), v.len());
        pairwise_sum(self.len(), |i| (self[i] * v[i]).powi(2)).sqrt()
    }

    fn norm_inf(&self) -> T {
        // T::max would silently drop NaNs
        let mut out = T::zero();
        for &x in self {
            if x.is_nan() {
                return T::nan();
            }
            out = T::max(out, x.abs());
        }
        out
    }

    fn norm_inf_diff(&self, b: &[T]) -> T {
        assert_eq!(self.len(), b.len());
        zip(self, b).fold(T::zero(), |acc, (&x, &y)| T::max(acc, (x - y).abs()))
    }

    fn dist(&self, y: &[T]) -> T {
        assert_eq!(self.len(), y.len());
        pairwise_sum(self.len(), |i| (self[i] - y[i]).powi(2)).sqrt()
    }

    fn is_finite(&self) -> bool {
        self.iter().all(|x| x.is_finite())
    }
}

// Sum of f(i) over 0..n by recursive halving.   Rounding error grows
// with log(n) instead of n.
fn pairwise_sum<T, F>(n: usize, f: F) -> T
where
    T: FloatT,
    F: Fn(usize) -> T,
{
    const BLOCK: usize = 32;

    fn sum_range<T: FloatT, F: Fn(usize) -> T>(f: &F, lo: usize, hi: usize) -> T {
        if hi - lo < BLOCK {
            (lo..hi).fold(T::zero(), |acc, i| acc + f(i))
        } else {
            let mid = lo + (hi - lo) / 2;
            sum_range(f, lo, mid) + sum_range(f, mid, hi)
        }
    }

    sum_range(&f, 0, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_and_axpby() {
        let x = vec![1., 2., 3., 4.];
        let mut y = vec![4., 5., 6., 7.];
        assert_eq!(x.dot(&y), 60.);

        y.axpby(2., &x, -1.);
        assert_eq!(y, vec![-2., -1., 0., 1.]);
    }

    #[test]
    fn test_pairwise_mean() {
        let x = vec![1., 2., 3., 4., 5.];
        assert_eq!(x.mean(), 3.);
        assert_eq!(x[0..0].mean(), 0.);

        // sequential summation of this many f32s drifts well away
        let x = vec![1.5f32; 10_000_000];
        assert_eq!(x.mean(), 1.5f32);
    }

    #[test]
    fn test_sum_all_lengths() {
        let x: Vec<f64> = (1..=200).map(|i| i as f64).collect();
        for n in 0..=x.len() {
            let expected = (n * (n + 1) / 2) as f64;
            assert_eq!(x[0..n].sum(), expected);
        }
    }

    #[test]
    fn test_norms() {
        let x = vec![3., -4., 0.];
        assert_eq!(x.norm(), 5.);
        assert_eq!(x.norm_inf(), 4.);
        assert_eq!(x.norm_scaled(&[1., 0., 1.]), 3.);
        assert_eq!(x.dist(&[0., 0., 0.]), 5.);
        assert_eq!(x.norm_inf_diff(&[3., 4., 1.]), 8.);
        assert!([1., f64::NAN].norm_inf().is_nan());
        assert_eq!(x.minimum(), -4.);
        assert_eq!(x.maximum(), 3.);
    }

    #[test]
    fn test_elementwise() {
        let mut x = vec![4., 1., 0.25];
        x.rsqrt();
        assert_eq!(x, vec![0.5, 1., 2.]);
        x.clip(0.75, 1.5, 0.75, 1.5);
        assert_eq!(x, vec![0.75, 1., 1.5]);
        assert_eq!(x.select(&[true, false, true]), vec![0.75, 1.5]);
    }
}
