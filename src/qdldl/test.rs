use super::*;
use crate::algebra::{CscMatrix, VectorMath};

fn test_matrix_4x4() -> CscMatrix<f64> {
    // A =
    //[ 8.0  -3.0   2.0    ⋅ ]
    //[  ⋅    8.0  -1.0    ⋅ ]
    //[  ⋅     ⋅    8.0  -1.0]
    //[  ⋅     ⋅     ⋅    1.0]
    CscMatrix::new(
        4,
        4,
        vec![0, 1, 3, 6, 8],
        vec![0, 0, 1, 0, 1, 2, 2, 3],
        vec![8., -3., 8., 2., -1., 8., -1., 1.],
    )
}

// [2 1; 1 -1], needing a negative pivot
fn test_matrix_quasidef() -> CscMatrix<f64> {
    CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![2., 1., -1.])
}

#[test]
fn test_invperm() {
    assert_eq!(invperm(&[3, 0, 2, 1]).unwrap(), vec![1, 3, 2, 0]);
    assert!(invperm(&[3, 0, 2, 0]).is_err());
    assert!(invperm(&[4, 0, 2, 1]).is_err());
    assert!(invperm(&[0, 0]).is_err());
    assert!(invperm(&[]).unwrap().is_empty());
}

#[test]
fn test_permute() {
    let perm = vec![3, 0, 2, 1];
    let b = vec![1., 2., 3., 4.];
    let mut x = vec![0.; 4];
    let mut y = vec![0.; 4];

    permute(&mut x, &b, &perm);
    assert_eq!(x, vec![4., 1., 3., 2.]);

    ipermute(&mut y, &x, &perm);
    assert_eq!(y, b);
}

#[test]
fn test_ldl_solve_from_factors() {
    //L =
    //[ ⋅    ⋅     ⋅    ⋅ ]
    //[1.0   ⋅     ⋅    ⋅ ]
    //[2.0  1.0    ⋅    ⋅ ]
    //[ ⋅   7.0  -3.0   ⋅ ]
    let L = CscMatrix::new(
        4,
        4,
        vec![0, 2, 4, 5, 5],
        vec![1, 2, 2, 3, 3],
        vec![1., 2., 1., 7., -3.],
    );
    let Dinv = [0.25, -1.0, -0.5, 1.0];

    // (I+L)*D*(I+L)' * [-3,2,1,4] = b
    let mut b = vec![4., -27., -1., -279.];
    ldl_solve(&L, &Dinv, &mut b);
    assert_eq!(b, vec![-3., 2., 1., 4.]);
}

#[test]
fn test_etree() {
    let (parent, Lnz) = etree(&test_matrix_4x4());
    assert_eq!(parent, vec![Some(1), Some(2), Some(3), None]);
    assert_eq!(Lnz, vec![2, 1, 1, 0]);
}

#[test]
fn test_amd() {
    let A = test_matrix_4x4();
    let (perm, iperm) = amd_ordering(&A, 1.5).unwrap();
    assert_eq!(invperm(&perm).unwrap(), iperm);

    let (perm, _) = amd_ordering(&CscMatrix::<f64>::zeros(0, 0), 1.5).unwrap();
    assert!(perm.is_empty());

    assert_eq!(
        amd_ordering(&CscMatrix::<f64>::zeros(2, 3), 1.5).unwrap_err(),
        QDLDLError::IncompatibleDimension
    );
}

#[test]
fn test_permute_symmetric() {
    // identity ordering changes nothing
    let A = test_matrix_4x4();
    let (P, AtoPAPt) = permute_symmetric(&A, &[0, 1, 2, 3]);
    assert_eq!(P, A);
    assert_eq!(AtoPAPt, (0..A.nnz()).collect::<Vec<_>>());

    // label entries by position so that moves are visible
    let mut A = test_matrix_4x4();
    for (i, v) in A.nzval.iter_mut().enumerate() {
        *v = i as f64 + 1.;
    }
    let iperm = invperm(&[2, 3, 0, 1]).unwrap();
    let (P, AtoPAPt) = permute_symmetric(&A, &iperm);

    assert_eq!(P.colptr, vec![0, 1, 3, 5, 8]);
    assert_eq!(P.rowval, vec![0, 0, 1, 2, 0, 2, 3, 0]);
    assert_eq!(P.nzval, vec![6.0, 7.0, 8.0, 1.0, 4.0, 2.0, 3.0, 5.0]);
    for (idx, &dest) in AtoPAPt.iter().enumerate() {
        assert_eq!(P.nzval[dest], A.nzval[idx]);
    }
}

#[test]
fn test_settings_builder() {
    let opts = QDLDLSettings::<f64>::default();
    assert_eq!(opts.regularize_eps, 1e-12);
    assert!(opts.perm.is_none());

    let opts = QDLDLSettingsBuilder::default()
        .perm(vec![0, 1, 2, 3])
        .regularize_eps(1e-3)
        .regularize_delta(1e-3)
        .build()
        .unwrap();
    assert_eq!(opts.regularize_eps, 1e-3);
    assert_eq!(opts.regularize_delta, 1e-3);
    assert_eq!(opts.perm, Some(vec![0, 1, 2, 3]));
}

#[test]
fn test_solve_with_orderings() {
    let A = test_matrix_4x4();
    let x = [1., -2., 3., -4.];

    // natural, AMD and a user supplied ordering
    for perm in [Some(vec![0, 1, 2, 3]), None, Some(vec![3, 0, 2, 1])] {
        let opts = QDLDLSettings {
            perm,
            ..QDLDLSettings::default()
        };
        let mut factors = QDLDLFactorisation::new(&A, Some(opts)).unwrap();

        let mut b = [20.0, -22.0, 32.0, -7.0];
        factors.solve(&mut b);
        assert!(b.norm_inf_diff(&x) <= 1e-8);
        assert_eq!(factors.positive_inertia(), 4);

        // solves can be repeated
        let mut b = [20.0, -22.0, 32.0, -7.0];
        factors.solve(&mut b);
        assert!(b.norm_inf_diff(&x) <= 1e-8);
    }
}

#[test]
fn test_bad_permutation_length() {
    let opts = QDLDLSettingsBuilder::<f64>::default()
        .perm(vec![0, 1, 2])
        .build()
        .unwrap();
    assert_eq!(
        QDLDLFactorisation::new(&test_matrix_4x4(), Some(opts)).unwrap_err(),
        QDLDLError::InvalidPermutation
    );
}

#[test]
fn test_quasidefinite_signs() {
    let opts = QDLDLSettingsBuilder::<f64>::default()
        .Dsigns(vec![1, -1])
        .build()
        .unwrap();
    let mut factors = QDLDLFactorisation::new(&test_matrix_quasidef(), Some(opts)).unwrap();
    assert_eq!(factors.positive_inertia(), 1);

    // [2 1; 1 -1] * [1; 2] = [4; -1]
    let mut b = [4., -1.];
    factors.solve(&mut b);
    assert!(b.norm_inf_diff(&[1., 2.]) <= 1e-12);
}

#[test]
fn test_update_and_refactor() {
    let opts = QDLDLSettingsBuilder::<f64>::default()
        .perm(vec![0, 1])
        .Dsigns(vec![1, -1])
        .build()
        .unwrap();
    let mut factors = QDLDLFactorisation::new(&test_matrix_quasidef(), Some(opts)).unwrap();

    // change to [3 1; 1 -2], then shift the diagonal
    // by +1 and -1 according to the signs
    factors.update_values(&[0, 2], &[2., -1.]);
    factors.offset_values(&[0, 2], 1.0, &[1, -1]);
    factors.refactor().unwrap();

    // [3 1; 1 -2] * [1; 1] = [4; -1]
    let mut b = [4., -1.];
    factors.solve(&mut b);
    assert!(b.norm_inf_diff(&[1., 1.]) <= 1e-12);
}

#[test]
fn test_bad_numeric_pivot() {
    let opts = QDLDLSettingsBuilder::default()
        .regularize_enable(false)
        .build()
        .unwrap();

    let mut A = test_matrix_4x4();
    A.nzval[0] = 0.;
    assert!(QDLDLFactorisation::new(&A, Some(opts.clone())).is_err());

    let mut A = test_matrix_4x4();
    *A.nzval.last_mut().unwrap() = 0.;
    assert!(QDLDLFactorisation::new(&A, Some(opts)).is_err());

    let mut A = test_matrix_4x4();
    A.nzval[2] = f64::NAN;
    assert_eq!(
        QDLDLFactorisation::new(&A, None).unwrap_err(),
        QDLDLError::NonFinitePivot
    );
}

#[test]
fn test_dynamic_regularization() {
    // a zero pivot is replaced when regularization is on
    let mut A = test_matrix_quasidef();
    A.nzval[0] = 0.;
    let factors = QDLDLFactorisation::new(&A, None).unwrap();
    assert!(factors.D.iter().all(|d| *d != 0.));
}

#[test]
fn test_structure_errors() {
    let A = CscMatrix::from(&[
        //
        [1.0, 3.0, 5.0],
        [2.0, 3.0, 6.0],
        [1.0, 4.0, 7.0],
    ]);
    assert_eq!(
        QDLDLFactorisation::new(&A, None).unwrap_err(),
        QDLDLError::NotUpperTriangular
    );

    let A = CscMatrix::from(&[
        //
        [1.0, 0.0, 5.0],
        [0.0, 0.0, 6.0],
        [0.0, 0.0, 7.0],
    ]);
    assert_eq!(
        QDLDLFactorisation::new(&A, None).unwrap_err(),
        QDLDLError::EmptyColumn
    );
}
