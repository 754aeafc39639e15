use crate::algebra::{AsFloatT, FloatT};
use crate::solver::utils::atomic::{AtomicF64, Ordering};
use crate::solver::_INFINITY_DEFAULT;
use lazy_static::lazy_static;

lazy_static! {
    static ref INFINITY: AtomicF64 = AtomicF64::new(_INFINITY_DEFAULT);
}

/// Revert the infinite bound threshold to its default value.
pub fn default_infinity() {
    INFINITY.store(_INFINITY_DEFAULT, Ordering::Relaxed);
}
/// Set the infinite bound threshold to a new value.   Bounds and right
/// hand sides with magnitude at least this large are treated as infinite.
pub fn set_infinity(v: f64) {
    INFINITY.store(v, Ordering::Relaxed);
}
/// Get the current infinite bound threshold.
pub fn get_infinity() -> f64 {
    INFINITY.load(Ordering::Relaxed)
}

/// True if `v` should be treated as an infinite bound.
pub(crate) fn is_infinite_bound<T: FloatT>(v: T) -> bool {
    v.abs() >= get_infinity().as_T()
}
