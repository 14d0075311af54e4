#![forbid(unsafe_code)]
//! markov-analysis library.
//!
//! Structure and long-run behaviour of a Markov chain given as a
//! [`markov_core::WeightedDigraph`]:
//!
//! - [`graph`]: communicating classes, their condensation, transitive
//!   reduction, class kinds and summary statistics.
//! - [`matrix`]: dense transition matrices, powers, power-iteration
//!   convergence, class submatrices and periods.
//! - [`pipeline`]: [`ChainAnalysis::run`], all of the above in one call.
//!
//! Every stage returns a typed error and never a partial result.

pub mod graph;
pub mod matrix;
pub mod pipeline;

pub use graph::{ChainStats, Class, ClassKind, Link, LinkSet, Partition};
pub use matrix::{MatrixError, PowerIteration, SubMatrix, TransitionMatrix};
pub use pipeline::{ChainAnalysis, ClassAnalysis};

use markov_core::{ErrorCode, GraphError};

/// Error from any analysis stage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

impl AnalysisError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Graph(err) => err.code(),
            Self::Matrix(err) => err.code(),
        }
    }
}
