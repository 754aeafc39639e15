#![allow(non_snake_case)]

use crate::algebra::*;

/// Positions of the data entries within `nzval` of the assembled KKT
/// matrix, so that values can be updated without reassembly.
pub struct KKTDataMap {
    /// entries of P, in CSC order
    pub P: Vec<usize>,
    /// entries of A, in CSC order
    pub A: Vec<usize>,
    /// the -Hs diagonal of the lower right block
    pub Hs: Vec<usize>,
    /// the full diagonal, including structural zeros
    pub diag: Vec<usize>,
}

/// Assemble the upper triangle of
///
/// ```text
///     [ P   Aᵀ ]
///     [ A  -Hs ]
/// ```
///
/// with an explicit entry at every diagonal position.   `P` must be
/// triu.   The `Hs` values are left at zero and set on each update.
/// Every supported cone has a diagonal `Hs` block, so the lower right
/// block is diagonal.
pub(crate) fn assemble_kkt_matrix<T: FloatT>(
    P: &CscMatrix<T>,
    A: &CscMatrix<T>,
) -> (CscMatrix<T>, KKTDataMap) {
    let (m, n) = A.size();
    assert_eq!(P.size(), (n, n));
    let dim = m + n;

    let missing_diag: Vec<bool> = (0..n).map(|j| !ends_on_diagonal(P, j)).collect();

    // column counts, then starts by prefix sum
    let mut colptr = vec![0usize; dim + 1];
    for j in 0..n {
        colptr[j + 1] = P.colptr[j + 1] - P.colptr[j] + usize::from(missing_diag[j]);
    }
    for &i in &A.rowval {
        colptr[n + i + 1] += 1;
    }
    for count in &mut colptr[(n + 1)..] {
        *count += 1;
    }
    for j in 0..dim {
        colptr[j + 1] += colptr[j];
    }

    let nnz = colptr[dim];
    let mut rowval = vec![0usize; nnz];
    let mut nzval = vec![T::zero(); nnz];

    let mut map = KKTDataMap {
        P: vec![0; P.nnz()],
        A: vec![0; A.nnz()],
        Hs: vec![0; m],
        diag: vec![0; dim],
    };

    // next free slot in each column.   Entries must be pushed
    // into each column in increasing row order.
    let mut next = colptr[0..dim].to_vec();
    let mut push = |col: usize, row: usize, val: T| {
        let dest = next[col];
        rowval[dest] = row;
        nzval[dest] = val;
        next[col] += 1;
        dest
    };

    // P, closing each column with a structural zero if its
    // diagonal entry is absent
    for j in 0..n {
        for k in P.colptr[j]..P.colptr[j + 1] {
            map.P[k] = push(j, P.rowval[k], P.nzval[k]);
        }
        if missing_diag[j] {
            push(j, j, T::zero());
        }
    }

    // Aᵀ.  Visiting the columns of A in order keeps the
    // rows of each KKT column sorted.
    for j in 0..n {
        for k in A.colptr[j]..A.colptr[j + 1] {
            map.A[k] = push(n + A.rowval[k], j, A.nzval[k]);
        }
    }

    for (i, idx) in map.Hs.iter_mut().enumerate() {
        *idx = push(n + i, n + i, T::zero());
    }

    // triu, so the diagonal is last in every column
    for (j, idx) in map.diag.iter_mut().enumerate() {
        *idx = colptr[j + 1] - 1;
    }

    (CscMatrix::new(dim, dim, colptr, rowval, nzval), map)
}

// true if column j of a triu matrix holds a diagonal entry
fn ends_on_diagonal<T: FloatT>(M: &CscMatrix<T>, j: usize) -> bool {
    let (start, stop) = (M.colptr[j], M.colptr[j + 1]);
    stop > start && M.rowval[stop - 1] == j
}

#[test]
fn test_kkt_assembly_upper() {
    // P with one missing diagonal entry
    let P = CscMatrix::from(&[
        [1., 2., 4.], //
        [0., 0., 5.], //
        [0., 0., 6.], //
    ]);
    let A = CscMatrix::from(&[
        [7., 0., 8.],  //
        [0., 9., 10.], //
        [1., 2., 3.],
    ]);

    let K_expected = CscMatrix::from(&[
        [1., 2., 4., 7., 0., 1.],  //
        [0., 0., 5., 0., 9., 2.],  //
        [0., 0., 6., 8., 10., 3.], //
        [0., 0., 0., -1., 0., 0.], //
        [0., 0., 0., 0., -1., 0.], //
        [0., 0., 0., 0., 0., -1.], //
    ]);

    let (mut K, map) = assemble_kkt_matrix(&P, &A);
    assert!(K.check_format().is_ok());

    // one extra entry for the structural zero at (1,1)
    assert_eq!(K.nnz(), K_expected.nnz() + 1);
    for &i in map.Hs.iter() {
        K.nzval[i] = -1.;
    }
    for r in 0..6 {
        for c in 0..6 {
            let v = K.get_entry((r, c)).unwrap_or(0.);
            let v_expected = K_expected.get_entry((r, c)).unwrap_or(0.);
            assert_eq!(v, v_expected);
        }
    }

    for (col, &idx) in map.diag.iter().enumerate() {
        assert_eq!(K.rowval[idx], col);
        assert!(idx < K.colptr[col + 1] && idx >= K.colptr[col]);
    }

    for (k, &idx) in map.A.iter().enumerate() {
        assert_eq!(K.nzval[idx], A.nzval[k]);
    }
    for (k, &idx) in map.P.iter().enumerate() {
        assert_eq!(K.nzval[idx], P.nzval[k]);
    }
    assert!(K.is_triu());
}

#[test]
fn test_kkt_assembly_lp() {
    // no quadratic term at all
    let P = CscMatrix::<f64>::zeros(2, 2);
    let A = CscMatrix::from(&[[1., 1.]]);
    let (K, map) = assemble_kkt_matrix(&P, &A);
    assert_eq!(K.nnz(), 5);
    assert_eq!(map.diag, vec![0, 1, 4]);
    assert_eq!(map.Hs, vec![4]);
}
