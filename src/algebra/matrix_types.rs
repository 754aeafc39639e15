#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sparse matrix in compressed sparse column (CSC) format.
///
/// The nonzeros of column `j` are `nzval[colptr[j]..colptr[j+1]]`, at the
/// rows listed in the same range of `rowval`.  For the 3 x 3 matrix
/// ```text
/// A = [1.  3.  5.]
///     [2.  0.  6.]
///     [0.  4.  7.]
/// ```
/// the fields are
/// ```no_run
/// use qpbarrier::algebra::CscMatrix;
///
/// let A: CscMatrix<f64> = CscMatrix::new(
///     3,
///     3,
///     vec![0, 2, 4, 7],
///     vec![0, 1, 0, 2, 0, 1, 2],
///     vec![1., 2., 3., 4., 5., 6., 7.],
/// );
/// assert!(A.check_format().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CscMatrix<T = f64> {
    /// rows
    pub m: usize,
    /// columns
    pub n: usize,
    /// Column starts, length `n+1`, ending at the number of nonzeros
    pub colptr: Vec<usize>,
    /// Row index of each nonzero, increasing within a column
    pub rowval: Vec<usize>,
    pub nzval: Vec<T>,
}

/// Lazy transpose, as returned by [`CscMatrix::t`]
#[derive(Debug, Clone, Copy)]
pub struct Adjoint<'a, M> {
    pub src: &'a M,
}

/// A symmetric matrix held as its upper triangle, as returned
/// by [`CscMatrix::sym`]
#[derive(Debug, Clone, Copy)]
pub struct Symmetric<'a, M> {
    pub src: &'a M,
}

/// Dimension queries
pub trait ShapedMatrix {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    fn size(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }
    fn is_square(&self) -> bool {
        self.nrows() == self.ncols()
    }
}
