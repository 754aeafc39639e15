//! Sparse $LDL^T$ factorization of symmetric quasidefinite matrices.
//!
//! The factorization follows the QDLDL algorithm: an elimination tree
//! is computed once from the sparsity pattern of a fill reducing
//! permutation of the input, after which the numeric factors can be
//! recomputed any number of times for matrices sharing that pattern.

#![allow(clippy::module_inception)]
mod qdldl;
pub use qdldl::*;
