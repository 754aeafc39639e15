#![allow(non_snake_case)]

use crate::algebra::{Adjoint, CscMatrix, FloatT, ShapedMatrix, SparseFormatError, Symmetric};

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// Assemble a matrix from its raw CSC fields.
    ///
    /// # Panics
    /// Panics if the array lengths disagree with each other or with `n`.
    /// Row bounds and ordering are not checked here; see
    /// [`check_format`](CscMatrix::check_format).
    pub fn new(m: usize, n: usize, colptr: Vec<usize>, rowval: Vec<usize>, nzval: Vec<T>) -> Self {
        assert_eq!(colptr.len(), n + 1);
        assert_eq!(rowval.len(), nzval.len());
        assert_eq!(colptr[n], rowval.len());
        Self {
            m,
            n,
            colptr,
            rowval,
            nzval,
        }
    }

    /// An `m x n` matrix with room for `nnz` entries.  All columns
    /// except the last are empty, so callers must fill `colptr`.
    pub fn spalloc(m: usize, n: usize, nnz: usize) -> Self {
        let mut colptr = vec![0; n + 1];
        colptr[n] = nnz;
        Self::new(m, n, colptr, vec![0; nnz], vec![T::zero(); nnz])
    }

    /// An `m x n` matrix with no stored entries
    pub fn zeros(m: usize, n: usize) -> Self {
        Self::spalloc(m, n, 0)
    }

    pub fn identity(n: usize) -> Self {
        Self::new(n, n, (0..=n).collect(), (0..n).collect(), vec![T::one(); n])
    }

    pub fn nnz(&self) -> usize {
        self.colptr[self.n]
    }

    pub fn t(&self) -> Adjoint<'_, Self> {
        Adjoint { src: self }
    }

    /// View an upper triangular matrix as the symmetric matrix it stores
    pub fn sym(&self) -> Symmetric<'_, Self> {
        debug_assert!(self.is_triu());
        Symmetric { src: self }
    }

    /// Check array lengths, column pointers, and row indices.
    pub fn check_format(&self) -> Result<(), SparseFormatError> {
        let lengths_ok = self.rowval.len() == self.nzval.len()
            && self.colptr.len() == self.n + 1
            && self.colptr[self.n] == self.rowval.len();
        if !lengths_ok {
            return Err(SparseFormatError::IncompatibleDimension);
        }
        if self.colptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(SparseFormatError::BadColptr);
        }
        let unsorted = self
            .colptr
            .windows(2)
            .any(|w| self.rowval[w[0]..w[1]].windows(2).any(|r| r[0] >= r[1]));
        if unsorted {
            return Err(SparseFormatError::BadRowOrdering);
        }
        if self.rowval.iter().any(|&r| r >= self.m) {
            return Err(SparseFormatError::BadRowval);
        }
        Ok(())
    }

    /// Explicit transpose, with sorted row indices
    pub fn transpose(&self) -> Self {
        // bucket sort by row: count, prefix sum, scatter
        let mut next = vec![0; self.m + 1];
        for &row in &self.rowval {
            next[row + 1] += 1;
        }
        for row in 0..self.m {
            next[row + 1] += next[row];
        }
        let colptr = next.clone();

        let nnz = self.nnz();
        let mut rowval = vec![0; nnz];
        let mut nzval = vec![T::zero(); nnz];
        for col in 0..self.n {
            for p in self.colptr[col]..self.colptr[col + 1] {
                let dest = &mut next[self.rowval[p]];
                rowval[*dest] = col;
                nzval[*dest] = self.nzval[p];
                *dest += 1;
            }
        }
        Self::new(self.n, self.m, colptr, rowval, nzval)
    }

    /// The rows `i` with `keep[i]`, renumbered in order
    ///
    /// # Panics
    /// Panics if `keep` does not have one entry per row.
    pub fn select_rows(&self, keep: &[bool]) -> Self {
        assert_eq!(keep.len(), self.m);

        let mut newrow = vec![None; self.m];
        let mut count = 0;
        for (slot, _) in newrow.iter_mut().zip(keep).filter(|(_, k)| **k) {
            *slot = Some(count);
            count += 1;
        }

        self.filter_map_entries(count, self.n, |row, col| newrow[row].map(|r| (r, col)))
    }

    /// The columns `j` with `keep[j]`, renumbered in order
    ///
    /// # Panics
    /// Panics if `keep` does not have one entry per column.
    pub fn select_columns(&self, keep: &[bool]) -> Self {
        assert_eq!(keep.len(), self.n);

        let mut newcol = vec![None; self.n];
        let mut count = 0;
        for (slot, _) in newcol.iter_mut().zip(keep).filter(|(_, k)| **k) {
            *slot = Some(count);
            count += 1;
        }

        self.filter_map_entries(self.m, count, |row, col| newcol[col].map(|c| (row, c)))
    }

    /// Entries on or above the diagonal
    pub fn to_triu(&self) -> Self {
        assert!(self.is_square());
        self.filter_map_entries(self.m, self.n, |row, col| (row <= col).then_some((row, col)))
    }

    /// Entries on or below the diagonal
    pub fn to_tril(&self) -> Self {
        assert!(self.is_square());
        self.filter_map_entries(self.m, self.n, |row, col| (row >= col).then_some((row, col)))
    }

    pub fn is_triu(&self) -> bool {
        // structural entries count even if zero valued
        self.colptr
            .windows(2)
            .enumerate()
            .all(|(col, w)| self.rowval[w[0]..w[1]].iter().all(|&row| row <= col))
    }

    /// The stored value at `(row, col)`, or `None` for a structural zero.
    ///
    /// # Panics
    /// Panics if the index is out of bounds.
    pub fn get_entry(&self, (row, col): (usize, usize)) -> Option<T> {
        assert!(row < self.m && col < self.n);
        let range = self.colptr[col]..self.colptr[col + 1];
        let rows = &self.rowval[range.clone()];
        rows.binary_search(&row)
            .ok()
            .map(|k| self.nzval[range.start + k])
    }

    // Map each entry to a new position or drop it.  `f` must keep
    // columns in order and rows increasing within each column.
    fn filter_map_entries<F>(&self, m: usize, n: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> Option<(usize, usize)>,
    {
        let mut colptr = vec![0; n + 1];
        let mut rowval = Vec::with_capacity(self.nnz());
        let mut nzval = Vec::with_capacity(self.nnz());

        for col in 0..self.n {
            for p in self.colptr[col]..self.colptr[col + 1] {
                if let Some((r, c)) = f(self.rowval[p], col) {
                    rowval.push(r);
                    nzval.push(self.nzval[p]);
                    colptr[c + 1] += 1;
                }
            }
        }
        for c in 0..n {
            colptr[c + 1] += colptr[c];
        }
        Self::new(m, n, colptr, rowval, nzval)
    }
}

impl<T> ShapedMatrix for CscMatrix<T> {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
}

/// Sparse matrix from a dense row-major array.  Zeros are not stored.
///
/// ```no_run
/// use qpbarrier::algebra::CscMatrix;
/// let A = CscMatrix::from(&[[1., 0.], [2., 3.]]);
/// assert_eq!(A.nnz(), 3);
/// ```
impl<T, const M: usize, const N: usize> From<&[[T; N]; M]> for CscMatrix<T>
where
    T: FloatT,
{
    fn from(rows: &[[T; N]; M]) -> Self {
        let mut colptr = Vec::with_capacity(N + 1);
        let mut rowval = Vec::new();
        let mut nzval = Vec::new();

        colptr.push(0);
        for col in 0..N {
            for (row, v) in rows.iter().map(|r| r[col]).enumerate() {
                if v != T::zero() {
                    rowval.push(row);
                    nzval.push(v);
                }
            }
            colptr.push(rowval.len());
        }
        Self::new(M, N, colptr, rowval, nzval)
    }
}
