use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
/// Error type returned by sparse matrix assembly operations.
pub enum SparseFormatError {
    /// Matrix dimension fields and/or array lengths are incompatible
    #[error("Matrix dimension fields and/or array lengths are incompatible")]
    IncompatibleDimension,
    /// A triplet index lies outside the declared matrix shape
    #[error("Entry ({row},{col}) lies outside of a {m}x{n} matrix")]
    DimensionError {
        row: usize,
        col: usize,
        m: usize,
        n: usize,
    },
    /// Data is not sorted by row index within each column
    #[error("Data is not sorted by row index within each column")]
    BadRowOrdering,
    #[error("Row value exceeds the matrix row dimension")]
    /// Row value exceeds the matrix row dimension
    BadRowval,
    #[error("Bad column pointer values")]
    /// Matrix column pointer values are defective
    BadColptr,
    /// Matrix fill exceeds the configured limit for sparse processing
    #[error("Matrix density {density:.3} exceeds the sparse limit {max_density:.3}")]
    TooDenseForSparsePath { density: f64, max_density: f64 },
}
