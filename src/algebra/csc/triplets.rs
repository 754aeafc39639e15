#![allow(non_snake_case)]

use crate::algebra::{AsFloatT, CscMatrix, FloatT, SparseFormatError};

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// Build an `m x n` matrix from coordinate triplets `(I[k], J[k], V[k])`.
    ///
    /// Entries sharing the same `(row, col)` index are summed.   The result
    /// has row indices sorted within each column.
    ///
    /// Returns [`SparseFormatError::DimensionError`] if any index lies outside
    /// of the declared shape, or [`SparseFormatError::IncompatibleDimension`]
    /// if the three inputs have different lengths.
    ///
    /// ```no_run
    /// use qpbarrier::algebra::CscMatrix;
    /// let A = CscMatrix::from_triplets(2, 2, &[0, 1, 1], &[0, 1, 1], &[1., 2., 3.]).unwrap();
    /// assert_eq!(A.get_entry((1, 1)), Some(5.));
    /// ```
    pub fn from_triplets(
        m: usize,
        n: usize,
        I: &[usize],
        J: &[usize],
        V: &[T],
    ) -> Result<Self, SparseFormatError> {
        if I.len() != J.len() || I.len() != V.len() {
            return Err(SparseFormatError::IncompatibleDimension);
        }
        if let Some(k) = (0..I.len()).find(|&k| I[k] >= m || J[k] >= n) {
            return Err(SparseFormatError::DimensionError {
                row: I[k],
                col: J[k],
                m,
                n,
            });
        }

        // stable ordering by (col,row) keeps duplicates adjacent
        let mut order: Vec<usize> = (0..I.len()).collect();
        order.sort_by_key(|&k| (J[k], I[k]));

        let mut colptr = vec![0; n + 1];
        let mut rowval: Vec<usize> = Vec::with_capacity(order.len());
        let mut nzval: Vec<T> = Vec::with_capacity(order.len());
        let mut last: Option<(usize, usize)> = None;

        for &k in order.iter() {
            if last == Some((I[k], J[k])) {
                if let Some(v) = nzval.last_mut() {
                    *v += V[k];
                }
                continue;
            }
            rowval.push(I[k]);
            nzval.push(V[k]);
            colptr[J[k] + 1] += 1;
            last = Some((I[k], J[k]));
        }

        for col in 0..n {
            colptr[col + 1] += colptr[col];
        }

        Ok(CscMatrix::new(m, n, colptr, rowval, nzval))
    }

    /// Iterate over the structural nonzeros as `(row, col, value)`,
    /// ordered by row and then by column.
    pub fn iter_row_major(&self) -> RowMajorIter<T> {
        RowMajorIter {
            At: self.transpose(),
            row: 0,
            ptr: 0,
        }
    }

    /// Fraction of entries that are structural nonzeros
    pub fn density(&self) -> f64 {
        let total = self.m * self.n;
        if total == 0 {
            0.0
        } else {
            self.nnz() as f64 / total as f64
        }
    }

    /// Fails with [`SparseFormatError::TooDenseForSparsePath`] if the
    /// density of the matrix exceeds `max_density`.   Dense data is never
    /// converted implicitly.
    pub fn check_density(&self, max_density: f64) -> Result<(), SparseFormatError> {
        let density = self.density();
        if density > max_density {
            return Err(SparseFormatError::TooDenseForSparsePath {
                density,
                max_density,
            });
        }
        Ok(())
    }

    /// Largest value of `|M[i,j] - M[j,i]|` over the stored entries
    /// of a square matrix.
    pub fn max_asymmetry(&self) -> T {
        assert_eq!(self.m, self.n);
        let Mt = self.transpose();
        let mut out = T::zero();

        // both matrices have sorted rows, so walk
        // each pair of columns as a merge
        for col in 0..self.n {
            let (mut p, pend) = (self.colptr[col], self.colptr[col + 1]);
            let (mut q, qend) = (Mt.colptr[col], Mt.colptr[col + 1]);
            while p < pend || q < qend {
                let rp = if p < pend { self.rowval[p] } else { usize::MAX };
                let rq = if q < qend { Mt.rowval[q] } else { usize::MAX };
                let diff = if rp == rq {
                    let d = self.nzval[p] - Mt.nzval[q];
                    p += 1;
                    q += 1;
                    d
                } else if rp < rq {
                    p += 1;
                    self.nzval[p - 1]
                } else {
                    q += 1;
                    Mt.nzval[q - 1]
                };
                out = T::max(out, T::abs(diff));
            }
        }
        out
    }

    /// True if the matrix is square and `|M[i,j] - M[j,i]| <= tol` everywhere
    pub fn is_symmetric(&self, tol: T) -> bool {
        self.m == self.n && self.max_asymmetry() <= tol
    }

    /// The symmetric part `(M + Mᵀ)/2` of a square matrix.
    pub fn symmetrize(&self) -> Self {
        assert_eq!(self.m, self.n);
        let half: T = (0.5).as_T();
        let nnz = self.nnz();

        let mut I = Vec::with_capacity(2 * nnz);
        let mut J = Vec::with_capacity(2 * nnz);
        let mut V = Vec::with_capacity(2 * nnz);

        for col in 0..self.n {
            for ptr in self.colptr[col]..self.colptr[col + 1] {
                let row = self.rowval[ptr];
                let v = self.nzval[ptr] * half;
                I.extend([row, col]);
                J.extend([col, row]);
                V.extend([v, v]);
            }
        }
        // indices come from a valid matrix, so this can not fail
        match Self::from_triplets(self.m, self.n, &I, &J, &V) {
            Ok(S) => S,
            Err(_) => unreachable!(),
        }
    }
}

/// Row-major iterator over the nonzeros of a [`CscMatrix`].
///
/// Produced by [`CscMatrix::iter_row_major`].
pub struct RowMajorIter<T> {
    At: CscMatrix<T>,
    row: usize,
    ptr: usize,
}

impl<T: FloatT> Iterator for RowMajorIter<T> {
    type Item = (usize, usize, T);

    fn next(&mut self) -> Option<Self::Item> {
        // columns of the transpose are rows of the source
        while self.row < self.At.n {
            if self.ptr < self.At.colptr[self.row + 1] {
                let k = self.ptr;
                self.ptr += 1;
                return Some((self.row, self.At.rowval[k], self.At.nzval[k]));
            }
            self.row += 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triplets_sum_duplicates() {
        let I = [2, 0, 1, 0, 2];
        let J = [1, 0, 1, 0, 1];
        let V = [1., 2., 3., 4., 5.];
        let A = CscMatrix::from_triplets(3, 2, &I, &J, &V).unwrap();

        assert!(A.check_format().is_ok());
        assert_eq!(A.nnz(), 3);
        assert_eq!(A.get_entry((0, 0)), Some(6.));
        assert_eq!(A.get_entry((1, 1)), Some(3.));
        assert_eq!(A.get_entry((2, 1)), Some(6.));
    }

    #[test]
    fn test_triplets_out_of_shape() {
        let err = CscMatrix::from_triplets(2, 2, &[0, 2], &[0, 1], &[1., 1.]).unwrap_err();
        assert_eq!(
            err,
            SparseFormatError::DimensionError {
                row: 2,
                col: 1,
                m: 2,
                n: 2
            }
        );

        let err = CscMatrix::from_triplets(2, 2, &[0], &[0, 1], &[1.]).unwrap_err();
        assert_eq!(err, SparseFormatError::IncompatibleDimension);
    }

    #[test]
    fn test_row_major_order() {
        let A = CscMatrix::from(&[[0., 1., 2.], [3., 0., 0.], [0., 4., 5.]]);
        let entries: Vec<_> = A.iter_row_major().collect();
        assert_eq!(
            entries,
            vec![
                (0, 1, 1.),
                (0, 2, 2.),
                (1, 0, 3.),
                (2, 1, 4.),
                (2, 2, 5.)
            ]
        );
    }

    #[test]
    fn test_density_limit() {
        let A = CscMatrix::from(&[[1., 1.], [1., 0.]]);
        assert_eq!(A.density(), 0.75);
        assert!(A.check_density(1.0).is_ok());
        assert!(matches!(
            A.check_density(0.5),
            Err(SparseFormatError::TooDenseForSparsePath { .. })
        ));
    }

    #[test]
    fn test_symmetrize() {
        let Q = CscMatrix::from(&[[2., 1.], [0., 2.]]);
        assert_eq!(Q.max_asymmetry(), 1.);

        let S = Q.symmetrize();
        assert!(!Q.is_symmetric(0.5));
        assert!(S.is_symmetric(0.));
        assert_eq!(S.max_asymmetry(), 0.);
        assert_eq!(S.get_entry((0, 1)), Some(0.5));
        assert_eq!(S.get_entry((1, 0)), Some(0.5));
        assert_eq!(S.get_entry((1, 1)), Some(2.));
    }
}
