//! Summary statistics for a transition graph and its class structure.
//!
//! - **density**: `edge_count / (vertex_count * (vertex_count - 1))`, zero
//!   for graphs with fewer than two vertices. Self-loops and parallel edges
//!   count, so the value can exceed 1.0 for multigraphs.
//! - **weakly_connected_count**: components of the graph with edge
//!   directions ignored.
//! - **reduction_ratio**: share of class links removed by the reduction.

use petgraph::algo::connected_components;
use serde::Serialize;

use markov_core::WeightedDigraph;

use super::classify::ClassKind;
use super::condense::LinkSet;
use super::partition::Partition;
use super::to_petgraph;

/// Counts describing one analysed chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainStats {
    pub vertex_count: usize,
    pub edge_count: usize,
    /// Edges the graph refused on insertion.
    pub rejected_edge_count: usize,
    pub self_loop_count: usize,
    pub density: f64,
    pub class_count: usize,
    /// Classes with more than one vertex.
    pub multi_vertex_class_count: usize,
    pub transient_count: usize,
    /// Closed classes, absorbing ones included.
    pub recurrent_count: usize,
    pub absorbing_count: usize,
    pub weakly_connected_count: usize,
    pub link_count: usize,
    pub reduced_link_count: usize,
}

impl ChainStats {
    /// Gather statistics from the analysis stages.
    #[must_use]
    pub fn compute(
        graph: &WeightedDigraph,
        partition: &Partition,
        kinds: &[ClassKind],
        links: &LinkSet,
        reduced: &LinkSet,
    ) -> Self {
        let vertex_count = graph.vertex_count();
        let edge_count = graph.edge_count();
        let count = |pred: fn(ClassKind) -> bool| kinds.iter().filter(|&&k| pred(k)).count();

        Self {
            vertex_count,
            edge_count,
            rejected_edge_count: graph.rejected_count(),
            self_loop_count: graph.vertices().filter(|&v| graph.has_self_loop(v)).count(),
            density: compute_density(vertex_count, edge_count),
            class_count: partition.class_count(),
            multi_vertex_class_count: partition.multi_vertex_count(),
            transient_count: count(|k| k == ClassKind::Transient),
            recurrent_count: count(ClassKind::is_closed),
            absorbing_count: count(|k| k == ClassKind::Absorbing),
            weakly_connected_count: connected_components(&to_petgraph(graph)),
            link_count: links.len(),
            reduced_link_count: reduced.len(),
        }
    }

    /// Return `true` if the whole chain is one communicating class.
    #[must_use]
    pub const fn is_irreducible(&self) -> bool {
        self.class_count == 1
    }

    /// Fraction of class links removed by the reduction; 0.0 with no links.
    #[must_use]
    pub fn reduction_ratio(&self) -> f64 {
        if self.link_count == 0 {
            return 0.0;
        }
        let removed = self.link_count.saturating_sub(self.reduced_link_count);
        removed as f64 / self.link_count as f64
    }
}

fn compute_density(vertex_count: usize, edge_count: usize) -> f64 {
    if vertex_count < 2 {
        return 0.0_f64;
    }
    let max_edges = (vertex_count * (vertex_count - 1)) as f64;
    edge_count as f64 / max_edges
}
