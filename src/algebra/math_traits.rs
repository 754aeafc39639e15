use super::FloatT;

// Solver arithmetic on vectors and sparse matrices is expressed
// through the traits below.  Slices and CscMatrix implement them
// for any FloatT.

/// Thresholding of a single value
pub trait ScalarMath {
    type T: FloatT;

    /// `min_new` below `min_thresh`, `max_new` above `max_thresh`,
    /// and the value itself otherwise.
    fn clip(
        &self,
        min_thresh: Self::T,
        max_thresh: Self::T,
        min_new: Self::T,
        max_new: Self::T,
    ) -> Self::T;
}

/// Dense vector arithmetic on slices.
///
/// The in-place operations return `&mut Self` so they can be chained,
/// as in `v.scale(2.).translate(1.)`.
pub trait VectorMath {
    type T;

    // ---- elementwise, in place ----

    fn copy_from(&mut self, src: &Self) -> &mut Self;
    fn set(&mut self, c: Self::T) -> &mut Self;
    fn scale(&mut self, c: Self::T) -> &mut Self;
    /// Add `c` to every entry
    fn translate(&mut self, c: Self::T) -> &mut Self;
    fn negate(&mut self) -> &mut Self;
    fn recip(&mut self) -> &mut Self;
    fn sqrt(&mut self) -> &mut Self;
    /// `1/sqrt(v)` entrywise
    fn rsqrt(&mut self) -> &mut Self;
    /// Entrywise product with `y`
    fn hadamard(&mut self, y: &Self) -> &mut Self;
    /// [`ScalarMath::clip`] applied entrywise
    fn clip(
        &mut self,
        min_thresh: Self::T,
        max_thresh: Self::T,
        min_new: Self::T,
        max_new: Self::T,
    ) -> &mut Self;
    /// `v[i] = op(v[i])`
    fn scalarop(&mut self, op: impl Fn(Self::T) -> Self::T) -> &mut Self;
    /// `v[i] = op(src[i])`
    fn scalarop_from(&mut self, op: impl Fn(Self::T) -> Self::T, src: &Self) -> &mut Self;

    /// The entries at which `index` is true, in order
    fn select(&self, index: &[bool]) -> Vec<Self::T>;

    // ---- BLAS-like ----

    /// `self = a*x + b*self`
    fn axpby(&mut self, a: Self::T, x: &Self, b: Self::T) -> &mut Self;
    /// `self = a*x + b*y`
    fn waxpby(&mut self, a: Self::T, x: &Self, b: Self::T, y: &Self) -> &mut Self;
    fn dot(&self, y: &Self) -> Self::T;

    // ---- reductions ----

    fn sum(&self) -> Self::T;
    fn sumsq(&self) -> Self::T;
    fn mean(&self) -> Self::T;
    fn minimum(&self) -> Self::T;
    fn maximum(&self) -> Self::T;
    /// Euclidean norm
    fn norm(&self) -> Self::T;
    /// Euclidean norm of `self ∘ v`
    fn norm_scaled(&self, v: &Self) -> Self::T;
    /// Largest absolute entry.   NaN if any entry is NaN.
    fn norm_inf(&self) -> Self::T;
    /// Largest absolute difference to `b`
    fn norm_inf_diff(&self, b: &Self) -> Self::T;
    /// Euclidean distance to `y`
    fn dist(&self, y: &Self) -> Self::T;
    fn is_finite(&self) -> bool;
}

/// `y = a*M*x + b*y` for a matrix or matrix view `M`
pub trait MatrixVectorMultiply {
    type T: FloatT;

    fn gemv(&self, y: &mut [Self::T], x: &[Self::T], a: Self::T, b: Self::T);
}

/// `y = a*M*x + b*y` for a symmetric `M` held as its upper triangle
pub trait SymMatrixVectorMultiply {
    type T: FloatT;

    fn symv(&self, y: &mut [Self::T], x: &[Self::T], a: Self::T, b: Self::T);
}

/// Scaling and norm computations on sparse matrices
pub trait MatrixMath {
    type T: FloatT;

    fn scale(&mut self, c: Self::T);
    fn negate(&mut self);

    /// Column infinity norms of a symmetric matrix held as one triangle
    fn col_norms_sym(&self, norms: &mut [Self::T]);

    /// Raise `norms[j]` to the infinity norm of column `j` where that
    /// is larger.   Existing values act as a floor.
    fn col_norms_accum(&self, norms: &mut [Self::T]);

    /// Row infinity norms
    fn row_norms(&self, norms: &mut [Self::T]);

    /// `M = diag(l) * M * diag(r)`
    fn lrscale(&mut self, l: &[Self::T], r: &[Self::T]);

    /// `yᵀMx` for a symmetric `M` held as its upper triangle
    fn quad_form(&self, y: &[Self::T], x: &[Self::T]) -> Self::T;
}
