//! Error types for LQR construction.

use sk_core::SkError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LqrError {
    #[error("Dimension mismatch for {what}: expected {expected:?}, got {actual:?}")]
    Dimension {
        what: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Numeric error: {what}")]
    Numeric { what: String },

    #[error("Riccati iteration did not converge after {iterations} iterations (last change {change:e})")]
    ConvergenceFailed { iterations: usize, change: f64 },

    #[error("Coordinate {index} out of range for state dimension {dim}")]
    CoordinateOutOfRange { index: usize, dim: usize },

    #[error(transparent)]
    Core(#[from] SkError),
}

pub type LqrResult<T> = Result<T, LqrError>;

/// Check a matrix shape, naming it in the error.
pub(crate) fn expect_shape(
    what: &'static str,
    expected: (usize, usize),
    actual: (usize, usize),
) -> LqrResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(LqrError::Dimension {
            what,
            expected,
            actual,
        })
    }
}
