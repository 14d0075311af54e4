//! Stochastic (row-sum) validation.
//!
//! A transition graph describes a Markov chain when the outgoing
//! probabilities of every vertex sum to 1. Floating-point input rarely sums
//! exactly, so the check accepts any sum inside a tolerance band
//! `[lo, hi]` (the CLI default is `[0.99, 1.00]`).
//!
//! Validation is advisory: nothing downstream requires a valid chain, and
//! neither [`check_all`] nor [`report`] mutates the graph.

use serde::Serialize;
use tracing::debug;

use crate::error::GraphError;
use crate::graph::WeightedDigraph;

/// Inclusive band `[lo, hi]` a vertex's outgoing sum must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ToleranceBand {
    pub lo: f64,
    pub hi: f64,
}

impl ToleranceBand {
    /// Create a band.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidArgument`] if either bound is not finite
    /// or `lo > hi`.
    pub fn new(lo: f64, hi: f64) -> Result<Self, GraphError> {
        if !lo.is_finite() || !hi.is_finite() {
            return Err(GraphError::InvalidArgument(format!(
                "tolerance bounds must be finite, got [{lo}, {hi}]"
            )));
        }
        if lo > hi {
            return Err(GraphError::InvalidArgument(format!(
                "tolerance lower bound {lo} exceeds upper bound {hi}"
            )));
        }
        Ok(Self { lo, hi })
    }

    /// Return `true` if `sum` lies inside the band.
    #[must_use]
    pub fn contains(&self, sum: f64) -> bool {
        sum >= self.lo && sum <= self.hi
    }
}

/// Outcome of [`check_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkovCheck {
    /// `true` iff every vertex passes.
    pub is_markov: bool,
    /// Number of vertices whose outgoing sum lies outside the band.
    pub bad_count: usize,
}

/// One line of a [`MarkovReport`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VertexSum {
    /// 1-based vertex id.
    pub vertex: usize,
    /// Sum of the vertex's outgoing probabilities.
    pub sum: f64,
    /// Whether `sum` lies inside the band.
    pub ok: bool,
}

/// Per-vertex detail behind a [`MarkovCheck`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkovReport {
    pub band: ToleranceBand,
    pub vertices: Vec<VertexSum>,
}

impl MarkovReport {
    /// Collapse the report into a pass/fail summary.
    #[must_use]
    pub fn check(&self) -> MarkovCheck {
        let bad_count = self.vertices.iter().filter(|v| !v.ok).count();
        MarkovCheck {
            is_markov: bad_count == 0,
            bad_count,
        }
    }

    /// Vertices that failed the check.
    pub fn bad_vertices(&self) -> impl Iterator<Item = &VertexSum> + '_ {
        self.vertices.iter().filter(|v| !v.ok)
    }
}

/// Check that every vertex's outgoing probabilities sum into `[lo, hi]`.
///
/// # Errors
///
/// Returns [`GraphError::InvalidArgument`] for an invalid band or an empty
/// graph.
pub fn check_all(graph: &WeightedDigraph, lo: f64, hi: f64) -> Result<MarkovCheck, GraphError> {
    Ok(report(graph, lo, hi)?.check())
}

/// Compute each vertex's outgoing sum and whether it passes.
///
/// # Errors
///
/// Returns [`GraphError::InvalidArgument`] for an invalid band or an empty
/// graph; no partial report is produced.
pub fn report(graph: &WeightedDigraph, lo: f64, hi: f64) -> Result<MarkovReport, GraphError> {
    let band = ToleranceBand::new(lo, hi)?;
    if graph.is_empty() {
        return Err(GraphError::InvalidArgument(
            "cannot validate an empty graph".to_string(),
        ));
    }

    let vertices: Vec<VertexSum> = graph
        .vertices()
        .map(|v| {
            let sum = graph.out_weight(v);
            VertexSum {
                vertex: v + 1,
                sum,
                ok: band.contains(sum),
            }
        })
        .collect();

    let report = MarkovReport { band, vertices };
    debug!(bad = report.check().bad_count, "markov check complete");
    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
