//! Error types for labor sampling.
//!
//! Every check runs before output buffers are allocated, so a call either
//! returns the whole sample or one of these errors.

use thiserror::Error;

/// Errors surfaced by the sampling entry points.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LaborError {
    /// A seed row does not name a row of the adjacency.
    #[error("seed row {row} is out of range (num_rows = {num_rows})")]
    RowOutOfRange { row: i64, num_rows: usize },

    /// An adjacency entry names a column outside `[0, num_cols)`.
    #[error("column index {col} at edge {edge} is out of range (num_cols = {num_cols})")]
    ColumnOutOfRange {
        col: i64,
        edge: usize,
        num_cols: usize,
    },

    /// Two arrays that must line up do not.
    #[error("shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The CSR row pointer is not a valid offsets array.
    #[error("malformed row pointer at position {position}: {reason}")]
    MalformedRowPointer {
        position: usize,
        reason: &'static str,
    },

    /// A weight is negative, NaN or infinite.
    #[error("edge weight {value} at edge {edge} must be finite and >= 0")]
    NumericDomain { edge: usize, value: f64 },

    /// The requested mode cannot run with the supplied inputs.
    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(&'static str),
}

/// Result alias for labor sampling.
pub type Result<T> = std::result::Result<T, LaborError>;
