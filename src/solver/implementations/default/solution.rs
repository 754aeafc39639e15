use super::*;
use crate::{
    algebra::*,
    solver::core::{traits::Solution, SolverStatus},
};

/// Result of a solve of the conic problem, in the units of the
/// data passed to the solver.
///
/// When the status is infeasible, `x`, `z` and `s` hold a certificate
/// normalized by κ and both objectives are NaN.
#[derive(Debug, Clone)]
pub struct DefaultSolution<T> {
    pub x: Vec<T>,
    /// Constraint multipliers
    pub z: Vec<T>,
    /// Constraint slacks, `s = b - Ax`
    pub s: Vec<T>,
    pub status: SolverStatus,
    pub obj_val: T,
    pub obj_val_dual: T,
    /// Seconds, including setup
    pub solve_time: f64,
    pub iterations: u32,
    pub r_prim: T,
    pub r_dual: T,
}

impl<T> DefaultSolution<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            x: vec![T::zero(); n],
            z: vec![T::zero(); m],
            s: vec![T::zero(); m],
            status: SolverStatus::Unsolved,
            obj_val: T::nan(),
            obj_val_dual: T::nan(),
            solve_time: 0.0,
            iterations: 0,
            r_prim: T::nan(),
            r_dual: T::nan(),
        }
    }
}

impl<T> Solution<T> for DefaultSolution<T>
where
    T: FloatT,
{
    type D = DefaultProblemData<T>;
    type V = DefaultVariables<T>;
    type I = DefaultInfo<T>;

    fn finalize(
        &mut self,
        data: &DefaultProblemData<T>,
        variables: &mut DefaultVariables<T>,
        info: &DefaultInfo<T>,
    ) {
        let certificate = info.status.is_infeasible();
        let measures = &info.measures;

        self.status = info.status;
        self.iterations = info.iterations;
        self.solve_time = info.solve_time;
        self.r_prim = measures.res_primal;
        self.r_dual = measures.res_dual;
        (self.obj_val, self.obj_val_dual) = if certificate {
            (T::nan(), T::nan())
        } else {
            (measures.cost_primal, measures.cost_dual)
        };

        variables.unscale(data, certificate);
        self.x.copy_from(&variables.x);
        self.z.copy_from(&variables.z);
        self.s.copy_from(&variables.s);
    }
}
