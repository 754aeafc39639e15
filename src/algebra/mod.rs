//! Sparse matrix and vector algebra used throughout the solver.
//!
//! All internal matrix data is held in compressed sparse column format
//! ([`CscMatrix`]).   Vector and matrix operations go through the traits
//! defined in this module, which are implemented generically for any
//! floating point type satisfying [`FloatT`].

// first import and flatten the solver's collection
// of core numeric types and matrix / vector traits.

mod error_types;
mod floats;
mod math_traits;
mod matrix_types;
mod scalarmath;
mod vecmath;
pub use error_types::*;
pub use floats::*;
pub use math_traits::*;
pub use matrix_types::*;

// sparse matrix implementation
mod csc;
pub use csc::*;
