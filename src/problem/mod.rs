//! Row and bound oriented quadratic programs.
//!
//! A [`QPProblem`] is built once from raw arrays, validated, and then
//! solved by a [`QPSolver`] (or the [`solve`] shortcut).   Each solve
//! runs a presolve pass, the interior point method on the reduced conic
//! problem, an optional polish of an optimal point, and a report step
//! that maps the result back to the original variables and constraints.

mod builder;
#[cfg(feature = "serde")]
mod json;
mod polish;
pub mod presolve;
mod qpsolver;
pub mod report;

pub use builder::*;
pub use polish::PolishStatus;
pub use presolve::{presolve, PresolveOutcome};
pub use qpsolver::*;
pub use report::{QPStatus, SolveResult};
