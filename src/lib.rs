//! __qpbarrier__ is a sparse interior point solver for convex quadratic programs
//! given in the natural "rows and bounds" form:
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize (or maximize)} & c^T x + \frac{1}{2}x^T Q x\\\\\[2ex\]
//!  \text{subject to} & a_i^T x \; \\{\le, \ge, =\\} \; b_i, \quad i = 1,\dots,M \\\\\[1ex\]
//!         & l \le x \le u
//!  \end{array}
//! $$
//!
//! with $Q$ symmetric and positive semidefinite (negative semidefinite when
//! maximizing).
//!
//! A problem is assembled and validated once as an immutable
//! [`QPProblem`](crate::problem::QPProblem), simplified by a presolve pass
//! that substitutes pinned variables and drops rows made redundant by the
//! variable bounds, and then handed to a homogeneous embedding
//! predictor-corrector interior point method operating on the conic
//! standard form
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize} & \frac{1}{2}x^T P x + q^T x\\\\\[2ex\]
//!  \text{subject to} & Ax + s = b \\\\\[1ex\]
//!         & s \in \\{0\\}^p \times \mathbb{R}^q_+
//!  \end{array}
//! $$
//!
//! Each iteration factors a sparse quasidefinite KKT system with an LDL
//! factorization using a fill reducing ordering that is computed once per
//! solve.   Infeasible and unbounded problems are detected from
//! certificates produced by the same iteration.
//!
//! # Example
//!
//! ```no_run
//! use qpbarrier::algebra::*;
//! use qpbarrier::problem::*;
//! use qpbarrier::solver::*;
//!
//! // minimize x1^2 + x2^2
//! // subject to 0.1 x1 + 0.5 x2 >= 0.3,  x1 + x2 = 1,  0 <= x <= 1
//! let Q = CscMatrix::from(&[[2., 0.], [0., 2.]]);
//! let A = CscMatrix::from(&[[0.1, 0.5], [1., 1.]]);
//! let sense = [ConstraintSense::GreaterEqual, ConstraintSense::Equal];
//!
//! let result = qpbarrier::problem::solve(
//!     ObjectiveSense::Minimize,
//!     &A, &sense, &[0.3, 1.0],
//!     &[0., 0.], &Q,
//!     &[0., 0.], &[1., 1.],
//!     DefaultSettings::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(result.status, QPStatus::Optimal);
//! ```

//Rust hates greek characters
#![allow(confusable_idents)]

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod algebra;
pub mod io;
pub mod problem;
pub mod qdldl;
pub mod solver;
pub mod timers;
