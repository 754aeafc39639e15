#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use crate::solver::core::{cones::CompositeCone, traits::ProblemData};
use crate::solver::get_infinity;

/// Conic problem data `(P, q, A, b)` as seen by the solver, after scaling.
#[derive(Debug, Clone)]
pub struct DefaultProblemData<T> {
    /// upper triangle of the quadratic term
    pub P: CscMatrix<T>,
    pub q: Vec<T>,
    pub A: CscMatrix<T>,
    pub b: Vec<T>,
    pub n: usize,
    pub m: usize,
    pub equilibration: DefaultEquilibrationData<T>,

    // norms of the scaled q and b, used for relative residuals
    pub normq: T,
    pub normb: T,

    /// counts of eliminated rows and columns, if the problem was presolved
    pub presolve: Option<PresolveStats>,
}

/// Summary of the reductions made before the problem reached the solver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresolveStats {
    pub removed_variables: usize,
    pub removed_constraints: usize,
}

impl<T> DefaultProblemData<T>
where
    T: FloatT,
{
    /// Copies the data.   Only the upper triangle of `P` is kept, and
    /// entries of `b` are capped at the infinity threshold so that such
    /// rows are never active.   Dimensions are checked by the caller.
    pub fn new(P: &CscMatrix<T>, q: &[T], A: &CscMatrix<T>, b: &[T]) -> Self {
        let (m, n) = A.size();
        let cap: T = get_infinity().as_T();

        let mut data = Self {
            P: P.to_triu(),
            q: q.to_vec(),
            A: A.clone(),
            b: b.iter().map(|&v| T::min(v, cap)).collect(),
            n,
            m,
            equilibration: DefaultEquilibrationData::new(n, m),
            normq: T::zero(),
            normb: T::zero(),
            presolve: None,
        };
        data.update_norms();
        data
    }

    fn update_norms(&mut self) {
        self.normq = self.q.norm_inf();
        self.normb = self.b.norm_inf();
    }
}

impl<T> ProblemData<T> for DefaultProblemData<T>
where
    T: FloatT,
{
    type V = DefaultVariables<T>;
    type C = CompositeCone<T>;
    type SE = DefaultSettings<T>;

    // Zero and nonnegative cones are invariant under positive
    // diagonal scaling, so the row scaling needs no adjustment
    // per cone.
    fn equilibrate(&mut self, _cones: &CompositeCone<T>, settings: &DefaultSettings<T>) {
        if !settings.equilibrate_enable {
            return;
        }
        self.equilibration
            .ruiz(&mut self.P, &mut self.A, &mut self.q, &mut self.b, settings);
        self.update_norms();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::SupportedConeT::*;

    #[test]
    fn test_equilibrate_scales_consistently() {
        let P = CscMatrix::from(&[[4., 1.], [1., 2.]]);
        let A = CscMatrix::from(&[[100., 1.], [0., -1.]]);
        let q = vec![1., 1.];
        let b = vec![1e3, 0.];

        let cones = CompositeCone::new(&[ZeroConeT(1), NonnegativeConeT(1)]);
        let mut data = DefaultProblemData::new(&P, &q, &A, &b);
        let settings = DefaultSettings::<f64>::default();
        data.equilibrate(&cones, &settings);

        let equil = &data.equilibration;

        // scaled A is E*A*D, entry by entry
        for (r, c, v) in [(0, 0, 100.), (0, 1, 1.), (1, 1, -1.)] {
            let scaled = data.A.get_entry((r, c)).unwrap();
            let expected = equil.e[r] * v * equil.d[c];
            assert!((scaled - expected).abs() <= 1e-12 * expected.abs());
        }

        // scaled q is c*D*q
        for (i, qi) in q.iter().enumerate() {
            let expected = equil.c * equil.d[i] * qi;
            assert!((data.q[i] - expected).abs() <= 1e-12 * expected.abs());
        }

        for (d, dinv) in equil.d.iter().zip(equil.dinv.iter()) {
            assert!((d * dinv - 1.).abs() < 1e-14);
        }
        assert!(equil.c > 0.);
        assert_eq!(data.normb, data.b.norm_inf());
    }

    #[test]
    fn test_equilibrate_disabled() {
        let P = CscMatrix::from(&[[4., 0.], [0., 2.]]);
        let A = CscMatrix::from(&[[100., 1.]]);
        let mut data = DefaultProblemData::new(&P, &[1., 1.], &A, &[3.]);
        let settings = crate::solver::DefaultSettingsBuilder::default()
            .equilibrate_enable(false)
            .build()
            .unwrap();
        let cones = CompositeCone::new(&[NonnegativeConeT(1)]);
        data.equilibrate(&cones, &settings);

        assert_eq!(data.A, A);
        assert_eq!(data.equilibration.d, vec![1., 1.]);
        assert_eq!(data.equilibration.c, 1.);
    }

    #[test]
    fn test_infinite_rhs_capped() {
        let P = CscMatrix::<f64>::zeros(1, 1);
        let A = CscMatrix::from(&[[1.]]);
        let data = DefaultProblemData::new(&P, &[1.], &A, &[f64::INFINITY]);
        assert_eq!(data.b[0], get_infinity());
        assert_eq!(data.normb, get_infinity());
    }
}
