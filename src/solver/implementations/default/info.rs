use super::*;
use crate::algebra::*;
use crate::io::PrintTarget;
use crate::solver::core::{traits::Info, SolverStatus};
use crate::solver::traits::Variables;
use crate::timers::*;

/// Objective values, gaps and relative residuals of one iterate,
/// all in terms of the unscaled problem.
#[derive(Default, Debug, Clone, Copy)]
pub struct ConvergenceMeasures<T> {
    pub cost_primal: T,
    pub cost_dual: T,
    pub res_primal: T,
    pub res_dual: T,
    pub gap_abs: T,
    pub gap_rel: T,
}

/// Progress of the interior point method and its termination status
#[derive(Default, Debug)]
pub struct DefaultInfo<T> {
    pub μ: T,
    pub sigma: T,
    pub step_length: T,
    pub iterations: u32,

    /// measures at the current iterate
    pub measures: ConvergenceMeasures<T>,
    /// relative residuals of the infeasibility certificates
    pub res_primal_inf: T,
    pub res_dual_inf: T,
    /// κ/τ
    pub ktratio: T,

    pub solve_time: f64,
    pub status: SolverStatus,

    // measures at the last accepted iterate
    prev: ConvergenceMeasures<T>,

    pub(crate) stream: PrintTarget,
}

impl<T> DefaultInfo<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn check_convergence(
        &mut self,
        residuals: &DefaultResiduals<T>,
        settings: &DefaultSettings<T>,
    ) {
        let m = &self.measures;
        let gap_ok = m.gap_abs < settings.tol_gap_abs || m.gap_rel < settings.tol_gap_rel;
        let feas_ok = m.res_primal < settings.tol_feas && m.res_dual < settings.tol_feas;

        if self.ktratio <= T::one() && gap_ok && feas_ok {
            self.status = SolverStatus::Solved;
            return;
        }

        // a certificate is only trusted once τ has collapsed
        if self.ktratio <= settings.tol_ktratio.recip() * (1000.0).as_T() {
            return;
        }

        // bᵀz < 0 with Aᵀz ≈ 0, or qᵀx < 0 with Px ≈ 0, Ax + s ≈ 0
        let (abs, rel) = (settings.tol_infeas_abs, settings.tol_infeas_rel);
        let (bz, qx) = (residuals.dot_bz, residuals.dot_qx);

        if bz < -abs && self.res_primal_inf < -rel * bz {
            self.status = SolverStatus::PrimalInfeasible;
        } else if qx < -abs && self.res_dual_inf < -rel * qx {
            self.status = SolverStatus::DualInfeasible;
        }
    }

    // Residuals grew since the last iterate.   Stop if they blew up,
    // or if the gap had already converged and τ is dominating κ.
    fn check_progress(&mut self, settings: &DefaultSettings<T>) {
        let (now, prev) = (&self.measures, &self.prev);
        let hundred: T = (100.).as_T();

        let stalled_at_tolerance = self.ktratio < T::epsilon() * hundred
            && (prev.gap_abs < settings.tol_gap_abs || prev.gap_rel < settings.tol_gap_rel);

        let diverged = (now.res_dual > settings.tol_feas && now.res_dual > prev.res_dual * hundred)
            || (now.res_primal > settings.tol_feas && now.res_primal > prev.res_primal * hundred);

        if stalled_at_tolerance || diverged {
            self.status = SolverStatus::InsufficientProgress;
        }
    }
}

impl<T> Info<T> for DefaultInfo<T>
where
    T: FloatT,
{
    type V = DefaultVariables<T>;
    type R = DefaultResiduals<T>;

    fn reset(&mut self, timers: &mut Timers) {
        self.status = SolverStatus::Unsolved;
        self.iterations = 0;
        self.solve_time = 0f64;

        timers.reset_timer("solve");
    }

    fn finalize(&mut self, timers: &mut Timers) {
        self.solve_time = timers.total_time().as_secs_f64();
    }

    fn update(
        &mut self,
        data: &DefaultProblemData<T>,
        variables: &DefaultVariables<T>,
        residuals: &DefaultResiduals<T>,
        timers: &Timers,
    ) {
        // everything is measured at x/τ, z/τ, s/τ in the original
        // scaling.   Inner products are unaffected by D and E, but
        // not by the cost scaling c.
        let τinv = variables.τ.recip();
        let equil = &data.equilibration;
        let (dinv, einv, c) = (&equil.dinv, &equil.einv, equil.c);

        let half_xPx = residuals.dot_xPx * τinv * τinv / (2.).as_T();
        let cost_primal = (residuals.dot_qx * τinv + half_xPx) / c;
        let cost_dual = (-residuals.dot_bz * τinv - half_xPx) / c;

        let normx = variables.x.norm_scaled(dinv) * τinv;
        let normz = variables.z.norm_scaled(einv) * τinv;
        let norms = variables.s.norm_scaled(einv) * τinv;
        let floor = |v: T| T::max(T::one(), v);

        let gap_abs = (cost_primal - cost_dual).abs();
        let gap_rel = gap_abs / floor(T::min(cost_primal.abs(), cost_dual.abs()));

        self.measures = ConvergenceMeasures {
            cost_primal,
            cost_dual,
            res_primal: residuals.rz.norm_scaled(einv) * τinv / floor(data.normb + normx + norms),
            res_dual: residuals.rx.norm_scaled(dinv) * τinv / floor(data.normq + normx + normz),
            gap_abs,
            gap_rel,
        };

        self.res_primal_inf = residuals.rx_inf.norm_scaled(dinv) / floor(normz);
        self.res_dual_inf = T::max(
            residuals.Px.norm_scaled(dinv) / floor(normx),
            residuals.rz_inf.norm_scaled(einv) / floor(normx + norms),
        );

        self.ktratio = variables.κ / variables.τ;
        self.solve_time = timers.running_time("solve").as_secs_f64();
    }

    fn check_termination(
        &mut self,
        residuals: &DefaultResiduals<T>,
        settings: &DefaultSettings<T>,
        iter: u32,
    ) -> bool {
        self.check_convergence(residuals, settings);

        let got_worse = self.measures.res_dual > self.prev.res_dual
            || self.measures.res_primal > self.prev.res_primal;
        if self.status == SolverStatus::Unsolved && iter > 1 && got_worse {
            self.check_progress(settings);
        }

        if self.status == SolverStatus::Unsolved {
            if self.iterations == settings.max_iter {
                self.status = SolverStatus::MaxIterations;
            } else if self.solve_time > settings.time_limit {
                self.status = SolverStatus::MaxTime;
            }
        }

        self.status != SolverStatus::Unsolved
    }

    fn save_prev_iterate(&mut self, variables: &Self::V, prev_variables: &mut Self::V) {
        self.prev = self.measures;
        prev_variables.copy_from(variables);
    }

    fn reset_to_prev_iterate(&mut self, variables: &mut Self::V, prev_variables: &Self::V) {
        self.measures = self.prev;
        variables.copy_from(prev_variables);
    }

    fn save_scalars(&mut self, μ: T, α: T, σ: T, iter: u32) {
        self.μ = μ;
        self.step_length = α;
        self.sigma = σ;
        self.iterations = iter;
    }

    fn get_status(&self) -> SolverStatus {
        self.status
    }

    fn set_status(&mut self, status: SolverStatus) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converged_info() -> DefaultInfo<f64> {
        DefaultInfo::<f64> {
            measures: ConvergenceMeasures {
                gap_abs: 1e-10,
                gap_rel: 1e-10,
                res_primal: 1e-10,
                res_dual: 1e-10,
                ..Default::default()
            },
            ktratio: 1e-3,
            ..DefaultInfo::new()
        }
    }

    #[test]
    fn test_termination_solved() {
        let settings = DefaultSettings::<f64>::default();
        let residuals = DefaultResiduals::<f64>::new(1, 1);

        let mut info = converged_info();
        assert!(info.check_termination(&residuals, &settings, 5));
        assert_eq!(info.get_status(), SolverStatus::Solved);

        // large κ/τ blocks a Solved status
        let mut info = DefaultInfo::<f64> {
            ktratio: 2.,
            ..converged_info()
        };
        assert!(!info.check_termination(&residuals, &settings, 5));
    }

    #[test]
    fn test_termination_infeasible() {
        let settings = DefaultSettings::<f64>::default();
        let mut residuals = DefaultResiduals::<f64>::new(1, 1);
        residuals.dot_bz = -1.;

        let mut info = DefaultInfo::<f64> {
            ktratio: 1e12,
            res_primal_inf: 1e-12,
            ..DefaultInfo::new()
        };
        assert!(info.check_termination(&residuals, &settings, 5));
        assert_eq!(info.get_status(), SolverStatus::PrimalInfeasible);

        residuals.dot_bz = 0.;
        residuals.dot_qx = -1.;
        let mut info = DefaultInfo::<f64> {
            ktratio: 1e12,
            res_dual_inf: 1e-12,
            ..DefaultInfo::new()
        };
        assert!(info.check_termination(&residuals, &settings, 5));
        assert_eq!(info.get_status(), SolverStatus::DualInfeasible);
    }

    #[test]
    fn test_termination_diverging() {
        let settings = DefaultSettings::<f64>::default();
        let residuals = DefaultResiduals::<f64>::new(1, 1);

        let mut info = DefaultInfo::<f64>::new();
        info.ktratio = 1.;
        info.measures.gap_abs = 1.;
        info.measures.gap_rel = 1.;
        info.measures.res_primal = 1e-3;
        let mut vars = DefaultVariables::<f64>::new(1, 1);
        let mut prev = DefaultVariables::<f64>::new(1, 1);
        info.save_prev_iterate(&vars, &mut prev);

        info.measures.res_primal = 1.;
        assert!(info.check_termination(&residuals, &settings, 4));
        assert_eq!(info.get_status(), SolverStatus::InsufficientProgress);

        info.reset_to_prev_iterate(&mut vars, &prev);
        assert_eq!(info.measures.res_primal, 1e-3);
    }

    #[test]
    fn test_termination_limits() {
        let settings = DefaultSettingsBuilder::<f64>::default()
            .max_iter(3)
            .build()
            .unwrap();
        let residuals = DefaultResiduals::<f64>::new(1, 1);

        let mut info = DefaultInfo::<f64>::new();
        info.ktratio = 1.;
        info.measures.gap_abs = 1.;
        info.measures.gap_rel = 1.;
        info.save_scalars(1., 1., 1., 3);
        assert!(info.check_termination(&residuals, &settings, 3));
        assert_eq!(info.get_status(), SolverStatus::MaxIterations);
    }
}
