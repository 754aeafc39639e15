use crate::algebra::*;

pub mod ldlsolvers;

mod directldlkktsolver;
mod kkt_assembly;
pub use directldlkktsolver::*;
pub(crate) use kkt_assembly::*;

/// Sparse LDL factorization engine behind [`DirectLDLKKTSolver`]
pub trait DirectLDLSolver<T: FloatT> {
    /// Overwrite entries of the held matrix by their `nzval` index
    /// in the unpermuted KKT matrix
    fn update_values(&mut self, index: &[usize], values: &[T]);
    /// `x = K \ b` with the most recent factors
    fn solve(&mut self, x: &mut [T], b: &[T]);
    fn refactor(&mut self, kkt: &CscMatrix<T>) -> bool;
}
