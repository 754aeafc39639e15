#![allow(non_snake_case)]
use num_traits::{Float, FloatConst, FromPrimitive, NumAssign};
use std::fmt::{Debug, Display, LowerExp};

/// Scalar type of all solver arithmetic, implemented for `f32` and `f64`.
///
/// This is a blanket alias for the [`num_traits`] bounds the solver
/// needs, so any type meeting them qualifies.
pub trait FloatT:
    'static
    + Send
    + Sync
    + Float
    + FloatConst
    + NumAssign
    + Default
    + FromPrimitive
    + Display
    + LowerExp
    + Debug
{
}

impl<T> FloatT for T where
    T: 'static
        + Send
        + Sync
        + Float
        + FloatConst
        + NumAssign
        + Default
        + FromPrimitive
        + Display
        + LowerExp
        + Debug
{
}

/// Lossy conversion of primitive constants into a [`FloatT`], so that
/// generic code can write `(0.5).as_T()` or `n.as_T()`.
pub trait AsFloatT<T>: 'static {
    fn as_T(&self) -> T;
}

macro_rules! impl_as_float {
    ($($ty:ty => $from:ident),+ $(,)?) => {$(
        impl<T: FromPrimitive + 'static> AsFloatT<T> for $ty {
            #[inline]
            fn as_T(&self) -> T {
                // f32 and f64 accept every primitive, rounding if needed
                T::$from(*self).unwrap_or_else(|| unreachable!())
            }
        }
    )+};
}

impl_as_float!(
    u32 => from_u32,
    u64 => from_u64,
    usize => from_usize,
    f32 => from_f32,
    f64 => from_f64,
);

#[test]
fn test_as_float() {
    let x: f64 = 3usize.as_T();
    assert_eq!(x, 3.0);
    let y: f32 = (0.25f64).as_T();
    assert_eq!(y, 0.25f32);
}
