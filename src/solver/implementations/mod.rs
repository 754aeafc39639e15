//! Solver implementations for particular problem formats.
//!
//! The [default](crate::solver::implementations::default) implementation
//! solves conic programs over products of zero and nonnegative cones.

pub mod default;
