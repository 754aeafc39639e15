use super::*;
use crate::algebra::*;
use crate::solver::core::{
    cones::{CompositeCone, Cone, ConeSide},
    traits::{Settings, Variables},
    StepDirection,
};

/// Iterate of the homogeneous embedding: `(x, s, z, τ, κ)`.
///
/// The same type also holds step directions and right hand sides.
#[derive(Clone)]
pub struct DefaultVariables<T> {
    pub x: Vec<T>,
    pub s: Vec<T>,
    pub z: Vec<T>,
    pub τ: T,
    pub κ: T,
}

impl<T: std::fmt::Debug> std::fmt::Debug for DefaultVariables<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultVariables")
            .field("x", &self.x)
            .field("s", &self.s)
            .field("z", &self.z)
            .field("τ", &self.τ)
            .field("κ", &self.κ)
            .finish()
    }
}

impl<T> DefaultVariables<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            x: vec![T::zero(); n],
            s: vec![T::zero(); m],
            z: vec![T::zero(); m],
            τ: T::one(),
            κ: T::one(),
        }
    }

    // Divide out τ (or κ for a certificate) and undo equilibration
    pub(crate) fn unscale(&mut self, data: &DefaultProblemData<T>, is_infeasible: bool) {
        let eq = &data.equilibration;
        let h = T::recip(if is_infeasible { self.κ } else { self.τ });

        self.x.hadamard(&eq.d).scale(h);
        self.z.hadamard(&eq.e).scale(h / eq.c);
        self.s.hadamard(&eq.einv).scale(h);
        self.τ *= h;
        self.κ *= h;
    }
}

impl<T> Variables<T> for DefaultVariables<T>
where
    T: FloatT,
{
    type D = DefaultProblemData<T>;
    type R = DefaultResiduals<T>;
    type C = CompositeCone<T>;
    type SE = DefaultSettings<T>;

    fn calc_mu(&mut self, residuals: &DefaultResiduals<T>, cones: &CompositeCone<T>) -> T {
        let complementarity = residuals.dot_sz + self.τ * self.κ;
        complementarity / (cones.degree() + 1).as_T()
    }

    fn affine_step_rhs(
        &mut self,
        residuals: &DefaultResiduals<T>,
        variables: &Self,
        cones: &CompositeCone<T>,
    ) {
        self.x.copy_from(&residuals.rx);
        self.z.copy_from(&residuals.rz);
        self.τ = residuals.rτ;
        self.κ = variables.τ * variables.κ;
        cones.affine_ds(&mut self.s, &variables.s);
    }

    fn combined_step_rhs(
        &mut self,
        residuals: &DefaultResiduals<T>,
        variables: &Self,
        cones: &mut CompositeCone<T>,
        step: &mut Self,
        σ: T,
        μ: T,
        m: T,
    ) {
        let σμ = σ * μ;
        let keep = T::one() - σ;

        self.x.axpby(keep, &residuals.rx, T::zero());
        self.τ = keep * residuals.rτ;
        self.κ = variables.τ * variables.κ + m * step.τ * step.κ - σμ;

        // second order correction, damped by m
        if m != T::one() {
            step.z.scale(m);
        }

        // self.s still holds λ∘λ from the affine rhs.  Use self.z as
        // scratch for the shift before it takes the scaled rz.
        cones.centering_shift(&mut self.z, &mut step.z, &mut step.s, σμ);
        self.s.axpby(T::one(), &self.z, T::one());
        self.z.axpby(keep, &residuals.rz, T::zero());
    }

    /// Ratio tests run separately over `s` and `z`, and the step taken
    /// is the smaller of the two: `τ` and `κ` are shared by the primal and
    /// dual parts of the embedding, so both must move by the same `α`.
    fn calc_step_length(
        &self,
        step: &Self,
        cones: &mut CompositeCone<T>,
        settings: &DefaultSettings<T>,
        step_direction: StepDirection,
    ) -> T {
        let ratio = |v: T, dv: T| {
            if dv < T::zero() {
                -v / dv
            } else {
                T::max_value()
            }
        };
        let αmax = [ratio(self.τ, step.τ), ratio(self.κ, step.κ), T::one()].minimum();

        let (αz, αs) =
            cones.step_length(&step.z, &step.s, &self.z, &self.s, settings.core(), αmax);

        // primal and dual take the same step
        let α = T::min(αz, αs);
        match step_direction {
            StepDirection::Combined => α * settings.core().max_step_fraction,
            StepDirection::Affine => α,
        }
    }

    fn add_step(&mut self, step: &Self, α: T) {
        self.x.axpby(α, &step.x, T::one());
        self.s.axpby(α, &step.s, T::one());
        self.z.axpby(α, &step.z, T::one());
        self.τ += α * step.τ;
        self.κ += α * step.κ;
    }

    fn symmetric_initialization(&mut self, cones: &mut CompositeCone<T>) {
        push_into_cone(&mut self.s, cones, ConeSide::Primal);
        push_into_cone(&mut self.z, cones, ConeSide::Dual);
        self.τ = T::one();
        self.κ = T::one();
    }

    fn copy_from(&mut self, src: &Self) {
        self.x.copy_from(&src.x);
        self.s.copy_from(&src.s);
        self.z.copy_from(&src.z);
        self.τ = src.τ;
        self.κ = src.κ;
    }

    fn scale_cones(&self, cones: &mut CompositeCone<T>, μ: T) -> bool {
        cones.update_scaling(&self.s, &self.z, μ)
    }
}

// Shift v along the cone's unit element until its smallest margin is
// at least max(1, 0.1 * (sum of positive parts) / degree).
fn push_into_cone<T>(v: &mut [T], cones: &mut CompositeCone<T>, side: ConeSide)
where
    T: FloatT,
{
    let (margin, positive) = cones.margins(v, side);

    // degree zero gives NaN, and max then returns one
    let target = T::max(T::one(), positive * (0.1).as_T() / cones.degree().as_T());

    if margin <= T::zero() {
        // two shifts, since adding target - margin in one go loses
        // the small entries when margin is large and negative
        cones.unit_shift(v, -margin, side);
        cones.unit_shift(v, target, side);
    } else {
        // a zero shift still clears the equality slacks
        let shift = T::max(target - margin, T::zero());
        cones.unit_shift(v, shift, side);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::SupportedConeT::*;

    #[test]
    fn test_symmetric_initialization() {
        let mut cones = CompositeCone::<f64>::new(&[ZeroConeT(1), NonnegativeConeT(2)]);
        let mut vars = DefaultVariables::<f64>::new(1, 3);
        vars.s = vec![3., -1., 2.];
        vars.z = vec![4., 0.5, 1.];
        vars.τ = 7.;

        vars.symmetric_initialization(&mut cones);

        // zero cone slack forced to zero, nonnegative parts pushed inside
        assert_eq!(vars.s[0], 0.);
        assert!(vars.s[1] > 0. && vars.s[2] > 0.);
        assert!(vars.z[1] > 0. && vars.z[2] > 0.);
        assert_eq!((vars.τ, vars.κ), (1., 1.));
    }

    #[test]
    fn test_step_length_single_alpha() {
        let mut cones = CompositeCone::<f64>::new(&[NonnegativeConeT(2)]);
        let settings = DefaultSettings::<f64>::default();

        let mut vars = DefaultVariables::<f64>::new(1, 2);
        vars.s = vec![1., 1.];
        vars.z = vec![1., 1.];

        // s blocks at 0.5, z at 0.25, and τ,κ never block
        let mut step = DefaultVariables::<f64>::new(1, 2);
        step.s = vec![-2., 0.];
        step.z = vec![0., -4.];

        let α = vars.calc_step_length(&step, &mut cones, &settings, StepDirection::Affine);
        assert_eq!(α, 0.25);

        let α = vars.calc_step_length(&step, &mut cones, &settings, StepDirection::Combined);
        assert_eq!(α, 0.25 * 0.99);

        // τ blocks first
        step.τ = -8.;
        let α = vars.calc_step_length(&step, &mut cones, &settings, StepDirection::Affine);
        assert_eq!(α, 0.125);
    }

    #[test]
    fn test_add_step() {
        let mut vars = DefaultVariables::<f64>::new(2, 1);
        let mut step = DefaultVariables::<f64>::new(2, 1);
        step.x = vec![1., -1.];
        step.s = vec![2.];
        step.z = vec![-2.];
        step.τ = 4.;
        step.κ = 2.;

        vars.add_step(&step, 0.5);
        assert_eq!(vars.x, vec![0.5, -0.5]);
        assert_eq!(vars.s, vec![1.]);
        assert_eq!(vars.z, vec![-1.]);
        assert_eq!((vars.τ, vars.κ), (3., 2.));
    }
}
