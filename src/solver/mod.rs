//! Interior point solver for conic programs in standard form.
//!
//! This module contains the main types and traits for the homogeneous
//! embedding interior point method.   Problems are posed in the form
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize} & \frac{1}{2}x^T P x + q^T x\\\\\[2ex\]
//!  \text{subject to} & Ax + s = b \\\\\[1ex\]
//!         & s \in \mathcal{K}
//!  \end{array}
//! $$
//!
//! where $\mathcal{K}$ is a product of zero cones (equalities) and
//! nonnegative cones (inequalities).   Most users should not build these
//! problems by hand, and should use the row and bound oriented
//! [`QPProblem`](crate::problem::QPProblem) interface instead.
//!
//! The solver comes with a [default implementation](crate::solver::implementations::default)
//! of all required [traits](crate::solver::core::traits).

pub(crate) const _INFINITY_DEFAULT: f64 = 1e20;

// internal module structure
pub(crate) mod core;
pub mod implementations;
pub(crate) mod utils;

pub use crate::solver::utils::infbounds::*;

//allows declaration of cone constraints
pub use crate::solver::core::cones::{SupportedConeT, SupportedConeT::*};

//user facing traits required to interact with solver
pub use crate::solver::core::{IPSolver, SolverStatus};

pub use crate::solver::core::traits;
pub use crate::solver::core::{CoreSettings, SettingsError};

pub use crate::solver::implementations::default;
pub use crate::solver::implementations::default::*;
