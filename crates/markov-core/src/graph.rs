//! Weighted transition graph.
//!
//! # Overview
//!
//! [`WeightedDigraph`] is the adjacency-list form of a discrete-time Markov
//! chain: `n` vertices numbered `0..n`, and for each vertex the list of its
//! outgoing transitions `u → v` with probability `p`.
//!
//! ## Edge order
//!
//! Outgoing edges are kept in **insertion order**. Every traversal in the
//! workspace (class decomposition, condensation, matrix construction) walks
//! edges in that order, so results are reproducible from the input alone.
//!
//! ## Rejected edges
//!
//! [`WeightedDigraph::add_edge`] never fails. An edge with an endpoint
//! outside `0..n` or a probability outside `[0, 1]` is not inserted; the
//! call returns [`EdgeOutcome::Rejected`] and the graph counts it, so a
//! caller that loads many edges can tell a partial load from a full one.
//!
//! ## Parallel edges
//!
//! Several edges between the same pair are kept as distinct entries.

use std::fmt;
use std::ops::Range;

use serde::Serialize;

use crate::error::GraphError;

// ---------------------------------------------------------------------------
// Edge
// ---------------------------------------------------------------------------

/// A directed transition `from → to` with probability `weight`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Edge {
    /// Source vertex (0-based).
    pub from: usize,
    /// Target vertex (0-based).
    pub to: usize,
    /// Transition probability in `[0, 1]`.
    pub weight: f64,
}

/// Why an edge was not inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeRejection {
    /// Source vertex outside `0..n`.
    SourceOutOfRange,
    /// Target vertex outside `0..n`.
    TargetOutOfRange,
    /// Probability outside `[0, 1]` or not a number.
    WeightOutOfRange,
}

impl fmt::Display for EdgeRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::SourceOutOfRange => "source vertex out of range",
            Self::TargetOutOfRange => "target vertex out of range",
            Self::WeightOutOfRange => "probability outside [0, 1]",
        };
        f.write_str(msg)
    }
}

/// Result of [`WeightedDigraph::add_edge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// The edge was appended to its source's list.
    Accepted,
    /// The edge was dropped.
    Rejected(EdgeRejection),
}

impl EdgeOutcome {
    /// Return `true` if the edge was inserted.
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

// ---------------------------------------------------------------------------
// Adjacency
// ---------------------------------------------------------------------------

/// Read-only successor access used by the class decomposition.
///
/// Implementors expose vertices `0..vertex_count()` and, for each one, its
/// successors by position. `successor` may return ids outside the vertex
/// range; consumers must treat that as a structural inconsistency.
pub trait Adjacency {
    /// Number of vertices.
    fn vertex_count(&self) -> usize;

    /// Number of outgoing edges of `v` (0 for an unknown vertex).
    fn out_degree(&self, v: usize) -> usize;

    /// Target of the `nth` outgoing edge of `v`, in traversal order.
    fn successor(&self, v: usize, nth: usize) -> Option<usize>;
}

// ---------------------------------------------------------------------------
// WeightedDigraph
// ---------------------------------------------------------------------------

/// Directed graph of weighted transitions with a fixed vertex count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightedDigraph {
    adjacency: Vec<Vec<Edge>>,
    edge_count: usize,
    rejected_count: usize,
}

impl WeightedDigraph {
    /// Create a graph with `n` vertices and no edges.
    ///
    /// `n = 0` is allowed and yields an empty graph; the validator and the
    /// class decomposition reject it.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Allocation`] if the adjacency table cannot be
    /// reserved.
    pub fn new(n: usize) -> Result<Self, GraphError> {
        let mut adjacency: Vec<Vec<Edge>> = Vec::new();
        adjacency
            .try_reserve_exact(n)
            .map_err(|_| GraphError::Allocation {
                what: "adjacency table",
                count: n,
            })?;
        adjacency.resize_with(n, Vec::new);

        Ok(Self {
            adjacency,
            edge_count: 0,
            rejected_count: 0,
        })
    }

    /// Build a graph from `(from, to, weight)` triples (0-based).
    ///
    /// Invalid triples are rejected exactly as with [`Self::add_edge`].
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Allocation`] if the graph cannot be created.
    pub fn from_edges(
        n: usize,
        edges: impl IntoIterator<Item = (usize, usize, f64)>,
    ) -> Result<Self, GraphError> {
        let mut graph = Self::new(n)?;
        for (from, to, weight) in edges {
            let _ = graph.add_edge(from, to, weight);
        }
        Ok(graph)
    }

    /// Append the edge `from → to` with probability `weight`.
    ///
    /// Out-of-range endpoints and probabilities outside `[0, 1]` are not
    /// inserted; the returned outcome says why and the rejection is counted
    /// in [`Self::rejected_count`].
    pub fn add_edge(&mut self, from: usize, to: usize, weight: f64) -> EdgeOutcome {
        let n = self.adjacency.len();
        let rejection = if from >= n {
            Some(EdgeRejection::SourceOutOfRange)
        } else if to >= n {
            Some(EdgeRejection::TargetOutOfRange)
        } else if !(0.0..=1.0).contains(&weight) {
            Some(EdgeRejection::WeightOutOfRange)
        } else {
            None
        };

        if let Some(reason) = rejection {
            self.rejected_count += 1;
            return EdgeOutcome::Rejected(reason);
        }

        self.adjacency[from].push(Edge { from, to, weight });
        self.edge_count += 1;
        EdgeOutcome::Accepted
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of accepted edges.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Number of edges rejected by [`Self::add_edge`] so far.
    #[must_use]
    pub const fn rejected_count(&self) -> usize {
        self.rejected_count
    }

    /// Return `true` if the graph has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Vertex ids `0..n`.
    #[must_use]
    pub fn vertices(&self) -> Range<usize> {
        0..self.adjacency.len()
    }

    /// Outgoing edges of `v` in insertion order (empty for an unknown vertex).
    ///
    /// The iterator borrows the graph and can be recreated at will.
    pub fn edges_from(&self, v: usize) -> impl Iterator<Item = &Edge> + '_ {
        self.adjacency.get(v).into_iter().flatten()
    }

    /// All edges, grouped by source vertex in ascending order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.adjacency.iter().flatten()
    }

    /// Sum of the outgoing probabilities of `v`.
    #[must_use]
    pub fn out_weight(&self, v: usize) -> f64 {
        self.edges_from(v).map(|e| e.weight).sum()
    }

    /// Return `true` if `v` has an edge to itself.
    #[must_use]
    pub fn has_self_loop(&self, v: usize) -> bool {
        self.edges_from(v).any(|e| e.to == v)
    }

    /// BLAKE3 fingerprint of the vertex count and ordered edge list.
    ///
    /// Compare against a stored value to decide whether cached analysis
    /// results are still valid.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.vertex_count() as u64).to_le_bytes());
        for edge in self.edges() {
            hasher.update(&(edge.from as u64).to_le_bytes());
            hasher.update(&(edge.to as u64).to_le_bytes());
            hasher.update(&edge.weight.to_bits().to_le_bytes());
        }
        format!("blake3:{}", hasher.finalize())
    }
}

impl Adjacency for WeightedDigraph {
    fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    fn out_degree(&self, v: usize) -> usize {
        self.adjacency.get(v).map_or(0, Vec::len)
    }

    fn successor(&self, v: usize, nth: usize) -> Option<usize> {
        self.adjacency.get(v)?.get(nth).map(|e| e.to)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
