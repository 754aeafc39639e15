#![allow(non_snake_case)]

use crate::algebra::*;
use std::iter::zip;

impl<T: FloatT> MatrixVectorMultiply for CscMatrix<T> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        assert_eq!(x.len(), self.n);
        assert_eq!(y.len(), self.m);

        scale_output(y, b);
        if a == T::zero() {
            return;
        }
        // scatter each column into y
        for (col, &xj) in x.iter().enumerate() {
            let axj = a * xj;
            let (rows, vals) = self.column(col);
            for (&row, &v) in zip(rows, vals) {
                y[row] += v * axj;
            }
        }
    }
}

impl<T: FloatT> MatrixVectorMultiply for Adjoint<'_, CscMatrix<T>> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        let M = self.src;
        assert_eq!(x.len(), M.m);
        assert_eq!(y.len(), M.n);

        scale_output(y, b);
        if a == T::zero() {
            return;
        }
        // each output entry is a column dot product
        for (col, yj) in y.iter_mut().enumerate() {
            let (rows, vals) = M.column(col);
            let acc = zip(rows, vals).fold(T::zero(), |acc, (&row, &v)| acc + v * x[row]);
            *yj += a * acc;
        }
    }
}

impl<T: FloatT> SymMatrixVectorMultiply for Symmetric<'_, CscMatrix<T>> {
    type T = T;

    fn symv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        let M = self.src;
        assert!(M.is_square());
        assert_eq!(x.len(), M.n);
        assert_eq!(y.len(), M.n);

        scale_output(y, b);

        // stored entry (row,col) also stands in for (col,row)
        for col in 0..M.n {
            let (rows, vals) = M.column(col);
            for (&row, &v) in zip(rows, vals) {
                y[row] += a * v * x[col];
                if row != col {
                    y[col] += a * v * x[row];
                }
            }
        }
    }
}

impl<T: FloatT> MatrixMath for CscMatrix<T> {
    type T = T;

    fn scale(&mut self, c: T) {
        self.nzval.scale(c);
    }

    fn negate(&mut self) {
        self.nzval.negate();
    }

    fn col_norms_sym(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.n);
        norms.fill(T::zero());

        for col in 0..self.n {
            let (rows, vals) = self.column(col);
            for (&row, &v) in zip(rows, vals) {
                let v = v.abs();
                norms[col] = T::max(norms[col], v);
                norms[row] = T::max(norms[row], v);
            }
        }
    }

    fn col_norms_accum(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.n);

        for (col, norm) in norms.iter_mut().enumerate() {
            let (_, vals) = self.column(col);
            *norm = vals.iter().fold(*norm, |acc, &v| T::max(acc, v.abs()));
        }
    }

    fn row_norms(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.m);
        norms.fill(T::zero());

        for (&row, &v) in zip(&self.rowval, &self.nzval) {
            norms[row] = T::max(norms[row], v.abs());
        }
    }

    fn lrscale(&mut self, l: &[T], r: &[T]) {
        assert_eq!(l.len(), self.m);
        assert_eq!(r.len(), self.n);

        for (col, &rc) in r.iter().enumerate() {
            let range = self.colptr[col]..self.colptr[col + 1];
            for (v, &row) in zip(&mut self.nzval[range.clone()], &self.rowval[range]) {
                *v *= l[row] * rc;
            }
        }
    }

    fn quad_form(&self, y: &[T], x: &[T]) -> T {
        assert!(self.is_square());
        assert_eq!(x.len(), self.n);
        assert_eq!(y.len(), self.n);

        let mut out = T::zero();
        for col in 0..self.n {
            let (rows, vals) = self.column(col);
            // strictly upper entries appear twice in the full matrix
            let (mut Mx, mut My) = (T::zero(), T::zero());
            for (&row, &v) in zip(rows, vals) {
                assert!(row <= col, "quad_form requires a triu matrix");
                if row == col {
                    out += v * x[col] * y[col];
                } else {
                    Mx += v * x[row];
                    My += v * y[row];
                }
            }
            out += Mx * y[col] + My * x[col];
        }
        out
    }
}

impl<T: FloatT> CscMatrix<T> {
    // row indices and values of one column
    fn column(&self, col: usize) -> (&[usize], &[T]) {
        let range = self.colptr[col]..self.colptr[col + 1];
        (&self.rowval[range.clone()], &self.nzval[range])
    }
}

// y = b*y, with b = 0 clearing any NaN already in y
fn scale_output<T: FloatT>(y: &mut [T], b: T) {
    if b == T::zero() {
        y.fill(T::zero());
    } else if b != T::one() {
        y.scale(b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_matrix() -> CscMatrix<f64> {
        // A = [-1.  ⋅   2.]
        //     [ 3.  4.  ⋅ ]
        CscMatrix::from(&[[-1., 0., 2.], [3., 4., 0.]])
    }

    #[test]
    fn test_gemv() {
        let A = test_matrix();
        let x = vec![1., 2., 3.];
        let mut y = vec![1., 1.];
        A.gemv(&mut y, &x, 2.0, -1.0);
        assert_eq!(y, vec![9., 21.]);

        let mut z = vec![f64::NAN; 3];
        A.t().gemv(&mut z, &[1., 2.], 1.0, 0.0);
        assert_eq!(z, vec![5., 8., 2.]);
    }

    #[test]
    fn test_symv_and_quad_form() {
        // symmetric [4 1; 1 3] stored as triu
        let P = CscMatrix::from(&[[4., 1.], [0., 3.]]);
        let x = vec![1., 2.];
        let mut y = vec![0.; 2];
        P.sym().symv(&mut y, &x, 1.0, 0.0);
        assert_eq!(y, vec![6., 7.]);
        assert_eq!(P.quad_form(&x, &x), 20.);
    }

    #[test]
    fn test_norms_and_scaling() {
        let mut A = test_matrix();
        let mut cn = vec![2.5; 3];
        let mut rn = vec![0.; 2];
        A.col_norms_accum(&mut cn);
        A.row_norms(&mut rn);
        assert_eq!(cn, vec![3., 4., 2.5]);
        assert_eq!(rn, vec![2., 4.]);

        A.lrscale(&[2., 1.], &[1., 0.5, 1.]);
        assert_eq!(A.nzval, vec![-2., 3., 2., 4.]);
    }
}
