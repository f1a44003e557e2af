use std::fmt;

use crate::tensor::Variance;

#[derive(Debug)]
pub enum TensorError {
    /// Rank, dimension, variance or component-count inconsistency.
    ShapeMismatch(String),
    IndexOutOfRange {
        index: Vec<usize>,
        dimensions: Vec<usize>,
    },
    VarianceViolation {
        position: usize,
        expected: Variance,
        found: Variance,
    },
    SingularMetric,
    DegenerateDimension {
        required: usize,
        found: usize,
    },
    InvalidArgument(String),
    Json(serde_json::Error),
}

impl fmt::Display for TensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TensorError::ShapeMismatch(msg) => write!(f, "shape mismatch: {msg}"),
            TensorError::IndexOutOfRange { index, dimensions } => {
                write!(f, "index {index:?} out of range for dimensions {dimensions:?}")
            }
            TensorError::VarianceViolation {
                position,
                expected,
                found,
            } => write!(
                f,
                "variance violation at index {position}: expected {expected}, found {found}"
            ),
            TensorError::SingularMetric => write!(f, "metric is singular at this point"),
            TensorError::DegenerateDimension { required, found } => write!(
                f,
                "degenerate dimension: requires n >= {required}, got n = {found}"
            ),
            TensorError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            TensorError::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for TensorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TensorError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TensorError {
    fn from(e: serde_json::Error) -> Self {
        TensorError::Json(e)
    }
}

pub type Result<T> = std::result::Result<T, TensorError>;
