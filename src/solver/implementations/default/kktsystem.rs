use super::*;
use crate::qdldl::QDLDLError;
use crate::solver::core::{
    cones::{CompositeCone, Cone},
    kktsolvers::{direct::*, *},
    traits::{KKTSystem, Settings},
    StepDirection,
};

use crate::algebra::*;

type BoxedKKTSolver<T> = Box<dyn KKTSolver<T> + Send>;

/// Newton system of the homogeneous embedding.
///
/// Each direction is found from two solves with the same factored
/// matrix `K = [P Aᵀ; A -Hs]`.   One has the constant right hand side
/// `[-q; b]` and is computed once per factorization.   The other has
/// the variable part of the right hand side.   Δτ then follows from a
/// scalar equation and the two are combined.
pub struct DefaultKKTSystem<T> {
    kktsolver: BoxedKKTSolver<T>,

    // K \ [-q; b]
    x_const: Vec<T>,
    z_const: Vec<T>,

    // K \ (variable rhs)
    x_var: Vec<T>,
    z_var: Vec<T>,

    rhs_x: Vec<T>,
    rhs_z: Vec<T>,

    // the constant term c in Hs*Δz + Δs = -c
    ds_offset: Vec<T>,
}

impl<T> DefaultKKTSystem<T>
where
    T: FloatT,
{
    /// Assemble and factor the KKT matrix, optionally with a
    /// precomputed fill reducing ordering `perm`.
    pub fn new(
        data: &DefaultProblemData<T>,
        cones: &CompositeCone<T>,
        settings: &DefaultSettings<T>,
        perm: Option<Vec<usize>>,
    ) -> Result<Self, QDLDLError> {
        let (m, n) = (data.m, data.n);
        let kktsolver = DirectLDLKKTSolver::<T>::new(&data.P, &data.A, cones, settings, perm)?;

        Ok(Self {
            kktsolver: Box::new(kktsolver),
            x_const: vec![T::zero(); n],
            z_const: vec![T::zero(); m],
            x_var: vec![T::zero(); n],
            z_var: vec![T::zero(); m],
            rhs_x: vec![T::zero(); n],
            rhs_z: vec![T::zero(); m],
            ds_offset: vec![T::zero(); m],
        })
    }

    fn solve_constant_rhs(
        &mut self,
        data: &DefaultProblemData<T>,
        settings: &DefaultSettings<T>,
    ) -> bool {
        self.rhs_x.scalarop_from(|q| -q, &data.q);
        self.kktsolver.setrhs(&self.rhs_x, &data.b);
        self.kktsolver.solve(
            Some(&mut self.x_const),
            Some(&mut self.z_const),
            settings.core(),
        )
    }

    // Δτ from the scalar equation that closes the embedding.
    // Uses rhs_x as workspace.
    fn tau_step(
        &mut self,
        rhs: &DefaultVariables<T>,
        data: &DefaultProblemData<T>,
        variables: &DefaultVariables<T>,
    ) -> T {
        let (P, q, b) = (&data.P, &data.q, &data.b);
        let (τ, κ) = (variables.τ, variables.κ);
        let (x1, z1) = (&self.x_var, &self.z_var);
        let (x2, z2) = (&self.x_const, &self.z_const);

        // ξ = x/τ
        let ξ = &mut self.rhs_x;
        ξ.scalarop_from(|x| x / τ, &variables.x);

        let two: T = (2.).as_T();
        let num = rhs.τ - rhs.κ / τ + q.dot(x1) + b.dot(z1) + two * P.quad_form(ξ, x1);

        // (ξ-x2)ᵀP(ξ-x2) - x2ᵀPx2 = ξᵀPξ - 2ξᵀPx2
        ξ.axpby(-T::one(), x2, T::one());
        let den = κ / τ - q.dot(x2) - b.dot(z2) + P.quad_form(ξ, ξ) - P.quad_form(x2, x2);

        num / den
    }

    // LP start:  x and -s from K \ [0; b], z from K \ [-q; 0]
    fn lp_initial_point(
        &mut self,
        variables: &mut DefaultVariables<T>,
        data: &DefaultProblemData<T>,
        settings: &DefaultSettings<T>,
    ) -> bool {
        self.rhs_x.set(T::zero());
        self.kktsolver.setrhs(&self.rhs_x, &data.b);
        let is_ok = self.kktsolver.solve(
            Some(&mut variables.x),
            Some(&mut variables.s),
            settings.core(),
        );
        variables.s.negate();
        if !is_ok {
            return false;
        }

        self.rhs_x.scalarop_from(|q| -q, &data.q);
        self.rhs_z.set(T::zero());
        self.kktsolver.setrhs(&self.rhs_x, &self.rhs_z);
        self.kktsolver
            .solve(None, Some(&mut variables.z), settings.core())
    }

    // QP start:  (x,z) from K \ [-q; b] and s = -z
    fn qp_initial_point(
        &mut self,
        variables: &mut DefaultVariables<T>,
        data: &DefaultProblemData<T>,
        settings: &DefaultSettings<T>,
    ) -> bool {
        self.rhs_x.scalarop_from(|q| -q, &data.q);
        self.kktsolver.setrhs(&self.rhs_x, &data.b);
        let is_ok = self.kktsolver.solve(
            Some(&mut variables.x),
            Some(&mut variables.z),
            settings.core(),
        );
        variables.s.scalarop_from(|z| -z, &variables.z);
        is_ok
    }
}

impl<T> KKTSystem<T> for DefaultKKTSystem<T>
where
    T: FloatT,
{
    type D = DefaultProblemData<T>;
    type V = DefaultVariables<T>;
    type C = CompositeCone<T>;
    type SE = DefaultSettings<T>;

    fn update(
        &mut self,
        data: &DefaultProblemData<T>,
        cones: &CompositeCone<T>,
        settings: &DefaultSettings<T>,
    ) -> bool {
        self.kktsolver.update(cones, settings.core()) && self.solve_constant_rhs(data, settings)
    }

    fn solve(
        &mut self,
        lhs: &mut DefaultVariables<T>,
        rhs: &DefaultVariables<T>,
        data: &DefaultProblemData<T>,
        variables: &DefaultVariables<T>,
        cones: &mut CompositeCone<T>,
        step_direction: StepDirection,
        settings: &DefaultSettings<T>,
    ) -> bool {
        // the affine offset is just s
        match step_direction {
            StepDirection::Affine => {
                self.ds_offset.copy_from(&variables.s);
            }
            StepDirection::Combined => {
                cones.Δs_offset(&mut self.ds_offset, &rhs.s, &mut lhs.z, &variables.z);
            }
        }

        self.rhs_x.copy_from(&rhs.x);
        self.rhs_z
            .waxpby(T::one(), &self.ds_offset, -T::one(), &rhs.z);
        self.kktsolver.setrhs(&self.rhs_x, &self.rhs_z);
        if !self
            .kktsolver
            .solve(Some(&mut self.x_var), Some(&mut self.z_var), settings.core())
        {
            return false;
        }

        lhs.τ = self.tau_step(rhs, data, variables);
        lhs.x.waxpby(T::one(), &self.x_var, lhs.τ, &self.x_const);
        lhs.z.waxpby(T::one(), &self.z_var, lhs.τ, &self.z_const);

        // Δs = -(Hs*Δz + c)
        cones.mul_Hs(&mut lhs.s, &lhs.z, &mut self.rhs_z);
        lhs.s.axpby(-T::one(), &self.ds_offset, -T::one());

        lhs.κ = -(rhs.κ + variables.κ * lhs.τ) / variables.τ;

        // a vanishing denominator in Δτ shows up here
        lhs.τ.is_finite() && lhs.κ.is_finite()
    }

    fn solve_initial_point(
        &mut self,
        variables: &mut DefaultVariables<T>,
        data: &DefaultProblemData<T>,
        settings: &DefaultSettings<T>,
    ) -> bool {
        if data.P.nnz() == 0 {
            self.lp_initial_point(variables, data, settings)
        } else {
            self.qp_initial_point(variables, data, settings)
        }
    }
}
