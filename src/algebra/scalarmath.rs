use super::{FloatT, ScalarMath};

impl<T: FloatT> ScalarMath for T {
    type T = T;

    fn clip(&self, min_thresh: T, max_thresh: T, min_new: T, max_new: T) -> T {
        match *self {
            v if v < min_thresh => min_new,
            v if v > max_thresh => max_new,
            v => v,
        }
    }
}

#[test]
fn test_scalar_clip() {
    // the thresholds used by equilibration
    assert_eq!(0.5_f64.clip(1e-4, 1e4, 1.0, 1e4), 0.5);
    assert_eq!(1e-6_f64.clip(1e-4, 1e4, 1.0, 1e4), 1.0);
    assert_eq!(1e6_f64.clip(1e-4, 1e4, 1.0, 1e4), 1e4);
}
