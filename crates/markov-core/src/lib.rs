#![forbid(unsafe_code)]
//! markov-core library.
//!
//! Leaf data structures for Markov chain analysis: the weighted transition
//! graph, its text loader, the stochastic (row-sum) validator, error codes
//! and the analysis configuration.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums per module; `anyhow::Result` only at
//!   the configuration-file boundary.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).
//! - **Numbering**: vertices are 0-based everywhere in the API. Only the text
//!   format and human-facing reports use 1-based ids.

pub mod config;
pub mod error;
pub mod graph;
pub mod load;
pub mod validate;

pub use config::{AnalysisConfig, ReductionMode};
pub use error::{ErrorCode, GraphError};
pub use graph::{Adjacency, Edge, EdgeOutcome, EdgeRejection, WeightedDigraph};
pub use load::{EdgePolicy, LoadError, LoadReport};
pub use validate::{MarkovCheck, MarkovReport, ToleranceBand, VertexSum};
