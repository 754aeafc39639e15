#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use crate::solver::core::traits::Residuals;

// ---------------
// Residuals type for default problem format
// ---------------

/// Residuals of the homogeneous embedding at the current iterate.
///
/// With `P` symmetric,
///
/// ```text
/// rx = -Px - Aᵀz - qτ
/// rz =  Ax + s - bτ
/// rτ =  qᵀx + bᵀz + κ + xᵀPx/τ
/// ```
#[derive(Debug, Clone)]
pub struct DefaultResiduals<T> {
    pub rx: Vec<T>,
    pub rz: Vec<T>,
    pub rτ: T,

    // the τ-free parts, -Aᵀz and Ax + s, for the certificate tests
    pub rx_inf: Vec<T>,
    pub rz_inf: Vec<T>,

    // unaffected by equilibration
    pub dot_qx: T,
    pub dot_bz: T,
    pub dot_sz: T,
    pub dot_xPx: T,

    pub Px: Vec<T>,
}

impl<T> DefaultResiduals<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize) -> Self {
        let zero = T::zero();
        Self {
            rx: vec![zero; n],
            rz: vec![zero; m],
            rτ: T::one(),
            rx_inf: vec![zero; n],
            rz_inf: vec![zero; m],
            dot_qx: zero,
            dot_bz: zero,
            dot_sz: zero,
            dot_xPx: zero,
            Px: vec![zero; n],
        }
    }
}

impl<T> Residuals<T> for DefaultResiduals<T>
where
    T: FloatT,
{
    type D = DefaultProblemData<T>;
    type V = DefaultVariables<T>;

    fn update(&mut self, variables: &DefaultVariables<T>, data: &DefaultProblemData<T>) {
        let DefaultVariables { x, s, z, τ, κ } = variables;
        let (one, zero) = (T::one(), T::zero());

        data.P.sym().symv(&mut self.Px, x, one, zero);
        self.dot_qx = data.q.dot(x);
        self.dot_bz = data.b.dot(z);
        self.dot_sz = s.dot(z);
        self.dot_xPx = x.dot(&self.Px);

        data.A.t().gemv(&mut self.rx_inf, z, -one, zero);
        self.rz_inf.copy_from(s);
        data.A.gemv(&mut self.rz_inf, x, one, one);

        self.rx.waxpby(-one, &self.Px, -*τ, &data.q);
        self.rx.axpby(one, &self.rx_inf, one);
        self.rz.waxpby(one, &self.rz_inf, -*τ, &data.b);
        self.rτ = self.dot_qx + self.dot_bz + *κ + self.dot_xPx / *τ;
    }
}
