//! Dense matrix engine: transition matrices, powers, convergence and
//! periods.
//!
//! Every operation is O(n³) per multiplication on dense storage; intended
//! for chains up to a few thousand states.

pub mod dense;
pub mod period;
pub mod power;

pub use dense::TransitionMatrix;
pub use period::{SubMatrix, period, sub_matrix};
pub use power::{PowerIteration, distribution, power, power_iterate};

use markov_core::{ErrorCode, GraphError};

/// Errors from the matrix engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatrixError {
    /// Operands of different sizes.
    #[error("dimension mismatch: {left}x{left} vs {right}x{right}")]
    DimensionMismatch { left: usize, right: usize },

    /// Invalid argument, allocation failure or bad vertex id.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl MatrixError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::DimensionMismatch { .. } => ErrorCode::DimensionMismatch,
            Self::Graph(err) => err.code(),
        }
    }
}
